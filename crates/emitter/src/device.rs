//! Device classification from the user agent.

use analytics_core::event_types;
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::sync::LazyLock;

/// Tokens that mark a phone or tablet browser.
static MOBILE_UA: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)Android|iPhone|iPad|iPod|BlackBerry|IEMobile|Opera Mini|Mobile|Tablet")
        .expect("mobile user agent pattern is valid")
});

/// Coarse device class. Only decides which companion events are emitted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DeviceClass {
    Mobile,
    Desktop,
}

impl DeviceClass {
    /// Classifies a user agent string. Empty or unknown agents are desktop.
    pub fn from_user_agent(user_agent: &str) -> Self {
        if MOBILE_UA.is_match(user_agent) {
            Self::Mobile
        } else {
            Self::Desktop
        }
    }

    pub fn is_mobile(&self) -> bool {
        matches!(self, Self::Mobile)
    }

    /// Event type recorded once per profile for this class.
    pub fn open_event_type(&self) -> &'static str {
        match self {
            Self::Mobile => event_types::MOBILE_OPEN,
            Self::Desktop => event_types::DESKTOP_OPEN,
        }
    }
}
