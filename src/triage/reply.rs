//! First-reply rendering.

use crate::base::types::Priority;

const GREETING: &str = "Thank you for reporting this issue.";
const CLOSING: &str = "We'll provide updates as we investigate further. Please feel free to add any additional details that might help us resolve this faster.";

/// Skills named in the assignment sentence.
const MAX_LISTED_SKILLS: usize = 3;

/// The urgency sentence for `priority`, with `score` to one decimal place.
pub fn urgency_sentence(priority: Priority, score: f64) -> String {
    match priority {
        Priority::P0 => format!("We've identified this as a critical issue (priority score: {score:.1}/100) and are addressing it immediately."),
        Priority::P1 => format!("We've identified this as a high-priority issue (priority score: {score:.1}/100) and will address it promptly."),
        Priority::P2 => format!("We've identified this as a medium-priority issue (priority score: {score:.1}/100) and will address it soon."),
        Priority::P3 => format!("We've identified this as a low-priority issue (priority score: {score:.1}/100) and will address it in due course."),
    }
}

/// Render the acknowledgement sent to the ticket author.
pub fn compose(priority: Priority, score: f64, assignee_name: &str, matched_skills: &[String]) -> String {
    let listed = matched_skills.iter().take(MAX_LISTED_SKILLS).map(String::as_str).collect::<Vec<_>>().join(", ");

    format!(
        "{GREETING} {} Our specialist {assignee_name} has been assigned because of their expertise in {listed}. {CLOSING}",
        urgency_sentence(priority, score)
    )
}
