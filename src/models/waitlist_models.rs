use chrono::{DateTime, SecondsFormat, Utc};
use serde::{Deserialize, Serialize};

/// Local storage key holding the JSON list of waitlist entries.
pub const WAITLIST_STORAGE_KEY: &str = "apx_waitlist";
/// Tag sent to the form endpoint so it knows where the signup came from.
pub const SUBMISSION_SOURCE: &str = "landing_page";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WaitlistEntry {
    pub email: String,
    pub timestamp: String, // ISO-8601, UTC, millisecond precision
}

/// Body POSTed to the remote form endpoint.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FormSubmission {
    pub email: String,
    pub source: String,
    pub timestamp: String,
}

impl FormSubmission {
    pub fn from_entry(entry: &WaitlistEntry) -> Self {
        Self {
            email: entry.email.clone(),
            source: SUBMISSION_SOURCE.to_string(),
            timestamp: entry.timestamp.clone(),
        }
    }
}

/// `2026-02-13T08:22:00.000Z` style timestamp.
pub fn iso_timestamp(at: DateTime<Utc>) -> String {
    at.to_rfc3339_opts(SecondsFormat::Millis, true)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn timestamps_use_millis_and_z() {
        let at = Utc.with_ymd_and_hms(2026, 2, 13, 8, 22, 0).unwrap();
        assert_eq!(iso_timestamp(at), "2026-02-13T08:22:00.000Z");
    }

    #[test]
    fn submission_carries_source_tag() {
        let entry = WaitlistEntry {
            email: "buyer@example.com".to_string(),
            timestamp: "2026-02-13T08:22:00.000Z".to_string(),
        };
        let body = serde_json::to_value(FormSubmission::from_entry(&entry)).unwrap();
        assert_eq!(
            body,
            serde_json::json!({
                "email": "buyer@example.com",
                "source": "landing_page",
                "timestamp": "2026-02-13T08:22:00.000Z",
            })
        );
    }
}
