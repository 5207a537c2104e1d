use tracing::{error, info, warn};

use satb_domain::Severity;

/// Transient, auto-dismissing user messages. Fire-and-forget.
pub trait NotificationSink {
    fn notify(&self, message: &str, severity: Severity);
}

/// Sends notifications to the log, for hosts without a display surface.
#[derive(Debug, Default, Clone, Copy)]
pub struct TracingSink;

impl NotificationSink for TracingSink {
    fn notify(&self, message: &str, severity: Severity) {
        match severity {
            Severity::Info | Severity::Success => info!(%severity, "{message}"),
            Severity::Warning => warn!("{message}"),
            Severity::Error => error!("{message}"),
        }
    }
}
