//! Position extraction
//!
//! A participant's position is its effective vote: the content of its
//! final conclusion step, or of its last step when nothing is marked as a
//! conclusion. Kept apart from the consensus methods so it can be swapped
//! or tested on its own.

use crate::message::{Message, ReasoningStep};

fn position_step(message: &Message) -> Option<&ReasoningStep> {
    message
        .reasoning
        .final_conclusion()
        .or_else(|| message.reasoning.steps.last())
}

/// The text a participant effectively votes for (trimmed; empty for an empty chain).
pub fn extract_position(message: &Message) -> String {
    position_step(message)
        .map(|step| step.content.trim().to_string())
        .unwrap_or_default()
}

/// The participant's own confidence in its position.
///
/// Taken from the step the position came from; a message with no steps
/// falls back to `1 - uncertainty.total`.
pub fn position_confidence(message: &Message) -> f64 {
    position_step(message)
        .map(|step| step.confidence.mean)
        .unwrap_or(1.0 - message.uncertainty.total)
        .clamp(0.0, 1.0)
}

/// Count identical positions, in first-seen order.
pub fn tally<'a, I>(positions: I) -> Vec<(String, usize)>
where
    I: IntoIterator<Item = &'a str>,
{
    let mut counts: Vec<(String, usize)> = Vec::new();
    for position in positions {
        match counts.iter_mut().find(|(p, _)| p == position) {
            Some((_, n)) => *n += 1,
            None => counts.push((position.to_string(), 1)),
        }
    }
    counts
}

/// The most frequent entry of a tally; ties go to the first seen.
pub fn modal(counts: &[(String, usize)]) -> Option<(&str, usize)> {
    counts
        .iter()
        .fold(None::<&(String, usize)>, |best, entry| match best {
            Some(b) if b.1 >= entry.1 => Some(b),
            _ => Some(entry),
        })
        .map(|(p, n)| (p.as_str(), *n))
}
