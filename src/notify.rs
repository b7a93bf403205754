//! Outbound notification hooks fired after appointment updates.
//!
//! Both effects are declared hook points for external collaborators: the
//! patient-facing message would go to an SMS provider, and the invalidation
//! signal would refresh any admin dashboard view. The default implementation
//! only logs.

use chrono::{DateTime, Utc};

use crate::models::ChangeKind;

/// External notification collaborator.
pub trait Notifier: Send + Sync {
    /// Deliver a status-change message to the patient.
    fn notify_patient(&self, patient_id: &str, message: &str);

    /// Signal admin-facing views that appointment data changed.
    fn invalidate_admin_view(&self);
}

/// Default notifier: logs instead of delivering.
pub struct LogNotifier;

impl Notifier for LogNotifier {
    fn notify_patient(&self, patient_id: &str, message: &str) {
        tracing::info!(patient_id, message, "patient notification (not delivered)");
    }

    fn invalidate_admin_view(&self) {
        tracing::debug!("admin view invalidated");
    }
}

/// Builds the patient-facing message for a lifecycle change.
pub fn change_message(
    kind: ChangeKind,
    physician: &str,
    schedule: DateTime<Utc>,
    cancellation_reason: Option<&str>,
) -> String {
    let when = schedule.format("%B %-d, %Y at %-I:%M %p UTC");
    match kind {
        ChangeKind::Schedule => format!(
            "Greetings from Caredesk. Your appointment with {physician} is confirmed for {when}."
        ),
        ChangeKind::Cancel => format!(
            "Greetings from Caredesk. We regret to inform you that your appointment for {when} \
             has been cancelled. Reason: {}.",
            cancellation_reason.unwrap_or("not provided")
        ),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn schedule_message_names_physician_and_time() {
        let schedule = Utc.with_ymd_and_hms(2024, 5, 1, 10, 0, 0).unwrap();
        let message = change_message(ChangeKind::Schedule, "Dr. John Green", schedule, None);
        assert!(message.contains("Dr. John Green"));
        assert!(message.contains("May 1, 2024"));
        assert!(message.contains("confirmed"));
    }

    #[test]
    fn cancel_message_includes_reason() {
        let schedule = Utc.with_ymd_and_hms(2024, 5, 1, 10, 0, 0).unwrap();
        let message = change_message(
            ChangeKind::Cancel,
            "Dr. John Green",
            schedule,
            Some("physician unavailable"),
        );
        assert!(message.contains("cancelled"));
        assert!(message.contains("physician unavailable"));
    }

    #[test]
    fn cancel_message_without_reason_says_not_provided() {
        let schedule = Utc.with_ymd_and_hms(2024, 5, 1, 10, 0, 0).unwrap();
        let message = change_message(ChangeKind::Cancel, "Dr. John Green", schedule, None);
        assert!(message.contains("not provided"));
    }
}
