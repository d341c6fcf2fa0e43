//! User interaction capability: confirm intent, report failure.

pub const DELETE_CONFIRMATION: &str = "Are you sure you want to delete this monitor?";
pub const DELETE_FAILED_MESSAGE: &str = "Error: Could not delete monitor.";

/// Alert text for a failed create.
#[must_use]
pub fn add_failed_message(detail: &str) -> String {
    format!("Error: Could not add monitor. {detail}")
}

/// Blocking user dialogs as seen by the client core.
pub trait Interaction {
    /// Ask the user to confirm a destructive action. `false` means declined.
    fn confirm(&mut self, message: &str) -> bool;

    /// Tell the user an action failed.
    fn report_failure(&mut self, message: &str);
}
