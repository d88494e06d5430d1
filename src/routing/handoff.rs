// src/routing/handoff.rs

use std::sync::Arc;
use std::time::Duration;

use dashmap::DashMap;
use serde::Serialize;
use tokio_util::sync::CancellationToken;
use uuid::Uuid;

use crate::config::RUNTIME_CONFIG;
use crate::notify::{Notification, NotificationSink};

use super::types::TabId;

/// Lifecycle of one anonymizing-browser open attempt.
#[derive(Debug, Clone, Copy, Serialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum HandoffState {
    Pending,
    Confirmed,
    TimedOut,
    FallbackNotified,
    Superseded,
}

/// One open attempt handed to the external opener.
#[derive(Debug, Clone)]
pub struct OpenRequest {
    pub id: String,
    pub url: String,
}

/// External collaborator that tries to hand a URL to the anonymizing
/// browser. Best effort only: the open may silently go nowhere.
pub trait ExternalOpener: Send + Sync {
    fn open(&self, url: &str) -> Result<OpenRequest, String>;
    /// Whether the request visibly navigated away to the external target.
    fn has_navigated(&self, request: &OpenRequest) -> bool;
    fn cancel(&self, request: &OpenRequest);
}

/// Drives the open → confirm-or-timeout → fallback state machine, one
/// attempt per tab; a newer navigation for the same tab preempts an
/// in-flight attempt.
pub struct BrowserHandoff {
    opener: Arc<dyn ExternalOpener>,
    sink: Arc<dyn NotificationSink>,
    active: DashMap<TabId, CancellationToken>,
}

impl BrowserHandoff {
    pub fn new(opener: Arc<dyn ExternalOpener>, sink: Arc<dyn NotificationSink>) -> Self {
        BrowserHandoff {
            opener,
            sink,
            active: DashMap::new(),
        }
    }

    /// Registers a new attempt for the tab, cancelling any pending one.
    /// Runs synchronously so a navigation that resolves a different mode
    /// before the launch task is ever polled still preempts it.
    pub fn begin(&self, tab: TabId) -> CancellationToken {
        let token = CancellationToken::new();
        if let Some(prev) = self.active.insert(tab, token.clone()) {
            prev.cancel();
        }
        token
    }

    pub async fn launch(&self, tab: TabId, url: &str, token: CancellationToken) -> HandoffState {
        if token.is_cancelled() {
            return HandoffState::Superseded;
        }

        let request = match self.opener.open(url) {
            Ok(request) => request,
            Err(err) => {
                log::warn!("anonymizing browser open failed for {url}: {err}");
                self.notify_manual(url);
                return HandoffState::FallbackNotified;
            }
        };
        log::debug!("handoff {} pending for tab {tab}", request.id);

        let mut state = HandoffState::Pending;
        tokio::select! {
            _ = token.cancelled() => {
                self.opener.cancel(&request);
                state = HandoffState::Superseded;
            }
            _ = tokio::time::sleep(Duration::from_millis(RUNTIME_CONFIG.handoff_timeout_ms)) => {
                if self.opener.has_navigated(&request) {
                    state = HandoffState::Confirmed;
                } else {
                    state = HandoffState::TimedOut;
                }
            }
        }

        if state == HandoffState::TimedOut {
            // The deep link went nowhere; cancel it and fall back to
            // manual instructions with a copyable URL.
            self.opener.cancel(&request);
            self.notify_manual(url);
            state = HandoffState::FallbackNotified;
        }

        // Only drop the slot if it is still ours; a newer launch for this
        // tab will have cancelled our token and replaced the entry.
        if !token.is_cancelled() {
            self.active.remove_if(&tab, |_, t| !t.is_cancelled());
        }
        log::debug!("handoff for tab {tab} finished: {state:?}");
        state
    }

    /// Cancels the in-flight attempt for a tab, if any.
    pub fn preempt(&self, tab: TabId) {
        if let Some((_, token)) = self.active.remove(&tab) {
            token.cancel();
        }
    }

    fn notify_manual(&self, url: &str) {
        self.sink.show(Notification {
            title: "Open in Anonymizing Browser".to_string(),
            message: format!("Please open your anonymizing browser manually and navigate to: {url}"),
            buttons: vec!["Copy URL".to_string()],
            copyable_url: Some(url.to_string()),
        });
    }
}

/// Opener used when no external browser integration is attached.
pub struct NullOpener;

impl ExternalOpener for NullOpener {
    fn open(&self, url: &str) -> Result<OpenRequest, String> {
        Ok(OpenRequest {
            id: Uuid::new_v4().to_string(),
            url: url.to_string(),
        })
    }

    fn has_navigated(&self, _request: &OpenRequest) -> bool {
        false
    }

    fn cancel(&self, _request: &OpenRequest) {}
}
