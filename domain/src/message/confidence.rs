//! Confidence interval value object

use serde::{Deserialize, Serialize};

fn self_reported() -> String {
    "self_reported".to_string()
}

/// A confidence estimate with bounds, tagged with how it was derived.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ConfidenceInterval {
    pub mean: f64,
    pub lower: f64,
    pub upper: f64,
    #[serde(default = "self_reported")]
    pub method: String,
}

impl ConfidenceInterval {
    /// Create an interval; every bound is clamped to [0, 1] and ordered.
    pub fn new(mean: f64, lower: f64, upper: f64, method: impl Into<String>) -> Self {
        let mean = mean.clamp(0.0, 1.0);
        Self {
            mean,
            lower: lower.clamp(0.0, 1.0).min(mean),
            upper: upper.clamp(0.0, 1.0).max(mean),
            method: method.into(),
        }
    }

    /// A degenerate interval where all bounds equal `mean`.
    pub fn point(mean: f64) -> Self {
        Self::new(mean, mean, mean, self_reported())
    }

    /// Symmetric band of `width` around `mean`, clipped to [0, 1].
    pub fn banded(mean: f64, width: f64, method: impl Into<String>) -> Self {
        Self::new(mean, mean - width, mean + width, method)
    }

    pub fn width(&self) -> f64 {
        self.upper - self.lower
    }
}

impl Default for ConfidenceInterval {
    fn default() -> Self {
        Self::point(0.5)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_bounds_are_clipped_and_ordered() {
        let ci = ConfidenceInterval::banded(0.95, 0.1, "weighted");
        assert_eq!(ci.mean, 0.95);
        assert!((ci.lower - 0.85).abs() < 1e-9);
        assert_eq!(ci.upper, 1.0);

        let odd = ConfidenceInterval::new(0.5, 0.7, 0.2, "x");
        assert_eq!(odd.lower, 0.5);
        assert_eq!(odd.upper, 0.5);
    }

    #[test]
    fn test_deserialize_without_method_tag() {
        let ci: ConfidenceInterval =
            serde_json::from_str(r#"{"mean":0.8,"lower":0.7,"upper":0.9}"#).unwrap();
        assert_eq!(ci.method, "self_reported");
    }
}
