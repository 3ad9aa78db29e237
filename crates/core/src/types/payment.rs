//! Payment status reported by the gateway.

use serde::{Deserialize, Serialize};

/// Status of a gateway payment, as reported by the payment details API.
///
/// The gateway vocabulary is larger than what the webhook flow acts on;
/// anything that is not approved/pending/rejected is preserved verbatim in
/// [`PaymentStatus::Other`] so it can be logged.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum PaymentStatus {
    Approved,
    Pending,
    Rejected,
    Other(String),
}

impl PaymentStatus {
    /// The gateway wire name for this status.
    #[must_use]
    pub fn as_str(&self) -> &str {
        match self {
            Self::Approved => "approved",
            Self::Pending => "pending",
            Self::Rejected => "rejected",
            Self::Other(raw) => raw,
        }
    }

    /// Whether this status ends the order's checkout lifecycle.
    ///
    /// Terminal statuses delete the stash entry after the email is sent;
    /// `pending` keeps it so a later terminal notification still finds it.
    #[must_use]
    pub const fn is_terminal(&self) -> bool {
        matches!(self, Self::Approved | Self::Rejected)
    }
}

impl From<String> for PaymentStatus {
    fn from(raw: String) -> Self {
        match raw.as_str() {
            "approved" => Self::Approved,
            "pending" => Self::Pending,
            "rejected" => Self::Rejected,
            _ => Self::Other(raw),
        }
    }
}

impl From<PaymentStatus> for String {
    fn from(status: PaymentStatus) -> Self {
        status.as_str().to_string()
    }
}

impl std::fmt::Display for PaymentStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn known_statuses_parse() {
        assert_eq!(
            PaymentStatus::from("approved".to_string()),
            PaymentStatus::Approved
        );
        assert_eq!(
            PaymentStatus::from("pending".to_string()),
            PaymentStatus::Pending
        );
        assert_eq!(
            PaymentStatus::from("rejected".to_string()),
            PaymentStatus::Rejected
        );
    }

    #[test]
    fn unknown_status_is_preserved() {
        let status = PaymentStatus::from("in_mediation".to_string());
        assert_eq!(status, PaymentStatus::Other("in_mediation".to_string()));
        assert_eq!(status.as_str(), "in_mediation");
        assert!(!status.is_terminal());
    }

    #[test]
    fn terminal_statuses() {
        assert!(PaymentStatus::Approved.is_terminal());
        assert!(PaymentStatus::Rejected.is_terminal());
        assert!(!PaymentStatus::Pending.is_terminal());
    }

    #[test]
    fn serde_uses_wire_names() {
        let json = serde_json::to_string(&PaymentStatus::Approved).unwrap();
        assert_eq!(json, "\"approved\"");

        let parsed: PaymentStatus = serde_json::from_str("\"rejected\"").unwrap();
        assert_eq!(parsed, PaymentStatus::Rejected);
    }
}
