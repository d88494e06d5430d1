//! Smart-alert throttling: issue derivation, the 30-minute per-domain
//! window, the bounded history, and the fixed message table.


use std::collections::VecDeque;
use std::sync::Mutex;

use chrono::Utc;
use dashmap::DashMap;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::config::RUNTIME_CONFIG;

/// Domains that never receive alerts.
const EXCLUDED_DOMAINS: &[&str] = &["localhost", "127.0.0.1", "chrome", "extension"];

const LOCATION_KEYWORDS: &[&str] = &[
    "map", "weather", "travel", "dating", "location", "gps", "near", "track",
];
const DATA_KEYWORDS: &[&str] = &[
    "video", "stream", "watch", "play", "tube", "movie", "media", "download",
];
const SAFETY_KEYWORDS: &[&str] = &["download", "free", "prize", "deal", "win", "money"];

/// Score below which a site is considered a safety concern.
const CONCERN_SCORE: u8 = 60;

#[derive(Debug, Clone, Copy, Serialize, Deserialize, Default, PartialEq, Eq)]
pub struct IssueFlags {
    pub tracking_location_likely: bool,
    pub high_data_usage_likely: bool,
    pub safety_risk: bool,
}

impl IssueFlags {
    pub fn any(&self) -> bool {
        self.tracking_location_likely || self.high_data_usage_likely || self.safety_risk
    }
}

/// Independently derived issue flags for a domain at a given score.
pub fn derive_issues(domain: &str, score: u8) -> IssueFlags {
    let has = |keywords: &[&str]| keywords.iter().any(|k| domain.contains(k));
    IssueFlags {
        tracking_location_likely: has(LOCATION_KEYWORDS) || score < CONCERN_SCORE,
        high_data_usage_likely: has(DATA_KEYWORDS),
        safety_risk: score < CONCERN_SCORE || has(SAFETY_KEYWORDS),
    }
}

/// Human-readable issue list; the generic entry guarantees every domain
/// can still receive one notification type.
pub fn issue_labels(flags: &IssueFlags) -> Vec<String> {
    let mut issues = Vec::new();
    if flags.tracking_location_likely {
        issues.push("Location tracking detected".to_string());
    }
    if flags.high_data_usage_likely {
        issues.push("High data usage detected".to_string());
    }
    if flags.safety_risk {
        issues.push("Safety concerns detected".to_string());
    }
    if issues.is_empty() {
        issues.push("Privacy monitoring active".to_string());
    }
    issues
}

/// Fixed eight-branch message table over the three issue flags.
pub fn compose_message(domain: &str, flags: &IssueFlags) -> String {
    match (
        flags.tracking_location_likely,
        flags.high_data_usage_likely,
        flags.safety_risk,
    ) {
        (true, true, true) => format!(
            "Warning: {domain} may be tracking your location, using high data, and poses security risks."
        ),
        (true, true, false) => {
            format!("{domain} appears to be tracking location and using significant data.")
        }
        (true, false, true) => {
            format!("Caution: {domain} may track your location and has security concerns.")
        }
        (false, true, true) => format!("{domain} is using high data and may pose security risks."),
        (true, false, false) => format!("{domain} appears to be accessing your location."),
        (false, true, false) => format!("High data usage detected on {domain}."),
        (false, false, true) => {
            format!("Exercise caution on {domain} - security concerns detected.")
        }
        (false, false, false) => {
            format!("Shield is monitoring {domain} for privacy and security.")
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NotificationRecord {
    pub id: String,
    pub domain: String,
    pub message: String,
    pub timestamp_ms: i64,
    pub issues: Vec<String>,
}

/// A user-visible alert handed to the display surface.
#[derive(Debug, Clone, Serialize)]
pub struct Notification {
    pub title: String,
    pub message: String,
    pub buttons: Vec<String>,
    /// Set when the user is expected to copy the URL manually.
    pub copyable_url: Option<String>,
}

/// Display surface collaborator. Button clicks route back through the
/// message protocol.
pub trait NotificationSink: Send + Sync {
    fn show(&self, notification: Notification);
}

/// Sink used when no display surface is attached.
pub struct NullSink;

impl NotificationSink for NullSink {
    fn show(&self, notification: Notification) {
        log::debug!("notification dropped (no sink): {}", notification.title);
    }
}

/// Gates user-visible alerts: at most one per domain per throttle window,
/// history bounded to the newest entries.
pub struct NotificationThrottler {
    recent: DashMap<String, i64>,
    history: Mutex<VecDeque<NotificationRecord>>,
}

impl Default for NotificationThrottler {
    fn default() -> Self {
        Self::new()
    }
}

impl NotificationThrottler {
    pub fn new() -> Self {
        NotificationThrottler {
            recent: DashMap::new(),
            history: Mutex::new(VecDeque::new()),
        }
    }

    /// Decides whether an alert for `domain` may surface now. Returns the
    /// recorded notification, or `None` when throttled or excluded.
    pub fn maybe_notify(
        &self,
        domain: &str,
        flags: IssueFlags,
    ) -> Option<NotificationRecord> {
        if EXCLUDED_DOMAINS.iter().any(|d| domain.contains(d)) {
            log::debug!("skipping notification for excluded domain: {domain}");
            return None;
        }

        let now = Utc::now().timestamp_millis();
        let window_ms = (RUNTIME_CONFIG.notification_throttle_secs * 1000) as i64;
        if let Some(last) = self.recent.get(domain) {
            if now - *last < window_ms {
                log::debug!("skipping notification for recently notified domain: {domain}");
                return None;
            }
        }
        self.recent.insert(domain.to_string(), now);

        let record = NotificationRecord {
            id: format!("smart-alert-{}", Uuid::new_v4()),
            domain: domain.to_string(),
            message: compose_message(domain, &flags),
            timestamp_ms: now,
            issues: issue_labels(&flags),
        };
        self.record(record.clone());
        Some(record)
    }

    fn record(&self, record: NotificationRecord) {
        let mut history = match self.history.lock() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        };
        history.push_back(record);
        while history.len() > RUNTIME_CONFIG.notification_history_limit {
            history.pop_front();
        }
    }

    pub fn history(&self) -> Vec<NotificationRecord> {
        let history = match self.history.lock() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        };
        history.iter().cloned().collect()
    }

    /// Test hook: pretends `domain` was last notified at `timestamp_ms`.
    #[cfg(test)]
    pub(crate) fn backdate(&self, domain: &str, timestamp_ms: i64) {
        self.recent.insert(domain.to_string(), timestamp_ms);
    }
}
