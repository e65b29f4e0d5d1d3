//! Emitter configuration.

use analytics_core::event_types;
use serde::{Deserialize, Serialize};

/// Client emitter configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EmitterConfig {
    /// Log append endpoint
    #[serde(default = "default_endpoint")]
    pub endpoint: String,
    /// Request timeout in milliseconds
    #[serde(default = "default_request_timeout_ms")]
    pub request_timeout_ms: u64,
    /// Synthetic first-visit events
    #[serde(default)]
    pub burst: BurstConfig,
}

fn default_endpoint() -> String {
    "http://localhost:8080/logs".to_string()
}

fn default_request_timeout_ms() -> u64 {
    5000
}

impl Default for EmitterConfig {
    fn default() -> Self {
        Self {
            endpoint: default_endpoint(),
            request_timeout_ms: default_request_timeout_ms(),
            burst: BurstConfig::default(),
        }
    }
}

/// Whether synthetic events are ever emitted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BurstMode {
    /// One burst on the first qualifying event of a cold profile
    #[default]
    OncePerProfile,
    /// Only the events the caller asks for
    Disabled,
}

/// A companion event scheduled alongside the first qualifying event.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CompanionEvent {
    #[serde(rename = "type")]
    pub event_type: String,
    #[serde(default)]
    pub delay_ms: u64,
}

impl CompanionEvent {
    pub fn new(event_type: impl Into<String>, delay_ms: u64) -> Self {
        Self {
            event_type: event_type.into(),
            delay_ms,
        }
    }
}

/// First-visit burst configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BurstConfig {
    #[serde(default)]
    pub mode: BurstMode,
    /// Event types that may start the burst (empty = any type)
    #[serde(default)]
    pub trigger_types: Vec<String>,
    /// Companion events emitted on mobile devices
    #[serde(default = "default_companions")]
    pub companions: Vec<CompanionEvent>,
    /// Also record one `mobile_open` / `desktop_open` event
    #[serde(default = "default_true")]
    pub record_device_type: bool,
}

fn default_companions() -> Vec<CompanionEvent> {
    vec![
        CompanionEvent::new(event_types::CAMERA_ACCESS, 0),
        CompanionEvent::new(event_types::MEDIA_CAPTURED, 100),
    ]
}

fn default_true() -> bool {
    true
}

impl Default for BurstConfig {
    fn default() -> Self {
        Self {
            mode: BurstMode::default(),
            trigger_types: Vec::new(),
            companions: default_companions(),
            record_device_type: true,
        }
    }
}

impl BurstConfig {
    /// A configuration that never emits synthetic events.
    pub fn disabled() -> Self {
        Self {
            mode: BurstMode::Disabled,
            ..Self::default()
        }
    }

    /// Check if `event_type` may start the burst.
    pub fn is_trigger(&self, event_type: &str) -> bool {
        self.mode == BurstMode::OncePerProfile
            && (self.trigger_types.is_empty() || self.trigger_types.iter().any(|t| t == event_type))
    }
}
