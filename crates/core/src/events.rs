//! Log event definitions.
//!
//! One `LogEvent` is one row of the append-only `log_datas` table. The
//! wire shape is exactly the five stored columns.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize};
use validator::Validate;

use crate::error::{Error, Result, ValidationErrorCode};

/// Conventional event types emitted by the photo-filter client.
///
/// The vocabulary is open: the log accepts any non-empty type string.
pub mod event_types {
    pub const OPEN_LINK: &str = "openLink";
    pub const CAMERA_ACCESS_ATTEMPT: &str = "cameraAccessAttempt";
    pub const CAMERA_ACCESS: &str = "cameraAccess";
    pub const MOBILE_OPEN: &str = "mobile_open";
    pub const DESKTOP_OPEN: &str = "desktop_open";
    pub const PHOTO_CAPTURE: &str = "photoCapture";
    pub const FILTER_USED: &str = "filterUsed";
    pub const MEDIA_CAPTURED: &str = "mediaCaptured";
    pub const SHARE_OPENED: &str = "shareOpened";
    pub const SHARE: &str = "share";
}

/// A single row of the analytics log.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Validate)]
pub struct LogEvent {
    /// Resolved user identifier (authenticated id or temporary UUID).
    /// Signed-in clients may send the id as a JSON number.
    #[serde(deserialize_with = "string_or_number")]
    #[validate(length(min = 1, max = 128))]
    pub user: String,
    /// Event kind
    #[serde(rename = "type")]
    #[validate(length(min = 1, max = 64))]
    pub event_type: String,
    /// Emission time on the client
    pub timestamp: DateTime<Utc>,
    /// Persistent device identifier
    #[validate(length(min = 1, max = 30))]
    pub session: String,
    /// Filter the event concerns, if any
    #[validate(length(max = 128))]
    pub filter: Option<String>,
}

/// Accepts a string or a JSON number and keeps its text form.
fn string_or_number<'de, D>(deserializer: D) -> std::result::Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Id {
        Text(String),
        Number(serde_json::Number),
    }

    Ok(match Id::deserialize(deserializer)? {
        Id::Text(id) => id,
        Id::Number(id) => id.to_string(),
    })
}

impl LogEvent {
    /// Creates an event stamped with the current time.
    pub fn new(
        user: impl Into<String>,
        event_type: impl Into<String>,
        session: impl Into<String>,
        filter: Option<String>,
    ) -> Self {
        Self {
            user: user.into(),
            event_type: event_type.into(),
            timestamp: Utc::now(),
            session: session.into(),
            filter,
        }
    }

    /// Overrides the timestamp.
    pub fn at(mut self, timestamp: DateTime<Utc>) -> Self {
        self.timestamp = timestamp;
        self
    }

    /// Returns the filter id when set and non-empty.
    pub fn filter_id(&self) -> Option<&str> {
        self.filter.as_deref().filter(|f| !f.is_empty())
    }
}

/// Validate a log event before it is appended.
pub fn validate_log_event(event: &LogEvent) -> Result<()> {
    event.validate().map_err(|e| {
        Error::validation_code(ValidationErrorCode::InvalidFormat, format!("{}", e))
    })?;

    if event.user.trim().is_empty() {
        return Err(Error::validation_code(
            ValidationErrorCode::InvalidFormat,
            "user is required",
        ));
    }
    if event.event_type.trim().is_empty() {
        return Err(Error::validation_code(
            ValidationErrorCode::InvalidFormat,
            "type is required",
        ));
    }
    if event.session.trim().is_empty() {
        return Err(Error::validation_code(
            ValidationErrorCode::InvalidFormat,
            "session is required",
        ));
    }

    Ok(())
}

/// Parse a log event from a JSON request body.
pub fn parse_log_event(bytes: &[u8]) -> Result<LogEvent> {
    let event: LogEvent = serde_json::from_slice(bytes).map_err(|e| {
        Error::validation_code(
            ValidationErrorCode::InvalidFormat,
            format!("invalid log event: {}", e),
        )
    })?;
    validate_log_event(&event)?;
    Ok(event)
}
