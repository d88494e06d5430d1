// src/routing/policy.rs

use std::sync::Arc;

use crate::config::{Settings, RUNTIME_CONFIG};
use crate::notify::{Notification, NotificationSink};
use crate::scoring::features::hostname_of;

use super::egress::EgressController;
use super::handoff::{BrowserHandoff, HandoffState};
use super::types::{vpn_provider_display_name, DomainRule, NetworkMode, TabId};

/// Resolves the one active network mode for a navigation. First applicable
/// rule wins:
/// 1. a per-domain proxy override, regardless of score;
/// 2. auto-secure for high-risk scores, using the preferred network;
/// 3. direct, which requires an explicit clear of the shared egress.
pub fn resolve_mode(rule: Option<&DomainRule>, settings: &Settings, score: u8) -> NetworkMode {
    if let Some(rule) = rule {
        if rule.use_proxy {
            return rule.proxy_type.unwrap_or(NetworkMode::AnonymizingBrowser);
        }
    }
    if settings.routing.auto_secure_high_risk && score < RUNTIME_CONFIG.auto_secure_threshold {
        return settings.routing.preferred_network;
    }
    NetworkMode::Direct
}

/// Applies resolved modes to the shared egress configuration and raises
/// the actionable notifications for the modes the system cannot drive
/// itself. All failures degrade to notifications; navigation is never
/// blocked.
pub struct PolicyEngine {
    egress: EgressController,
    handoff: Arc<BrowserHandoff>,
    sink: Arc<dyn NotificationSink>,
}

impl PolicyEngine {
    pub fn new(
        egress: EgressController,
        handoff: Arc<BrowserHandoff>,
        sink: Arc<dyn NotificationSink>,
    ) -> Self {
        PolicyEngine {
            egress,
            handoff,
            sink,
        }
    }

    /// Re-runs resolution for a completed navigation and applies the
    /// outcome. The egress configuration is shared across tabs, so this
    /// can affect concurrently open tabs on other domains.
    pub async fn on_navigation_committed(
        &self,
        tab: TabId,
        url: &str,
        settings: &Settings,
        score: u8,
    ) -> NetworkMode {
        let domain = match hostname_of(url) {
            Some(domain) => domain,
            None => {
                log::debug!("ignoring navigation to unparsable url: {url}");
                return NetworkMode::Direct;
            }
        };
        let mode = resolve_mode(settings.rule_for(&domain), settings, score);
        log::debug!("resolved {mode:?} for {domain} (tab {tab}, score {score})");
        self.apply_mode(tab, url, mode, settings).await;
        mode
    }

    pub async fn apply_mode(&self, tab: TabId, url: &str, mode: NetworkMode, settings: &Settings) {
        // A mode change for this tab preempts any handoff still pending.
        self.handoff.preempt(tab);

        match mode {
            NetworkMode::Direct => {
                self.egress.clear(tab);
            }
            NetworkMode::Socks => match settings.routing.socks_proxy.clone() {
                Some(config) => {
                    self.egress.apply(tab, config);
                }
                None => {
                    log::warn!("socks mode resolved but no proxy is configured");
                    self.sink.show(Notification {
                        title: "SOCKS Proxy Not Configured".to_string(),
                        message: "Add a SOCKS proxy in Shield's network settings to secure this site.".to_string(),
                        buttons: vec!["Open Settings".to_string()],
                        copyable_url: None,
                    });
                    self.egress.clear(tab);
                }
            },
            NetworkMode::AnonymizingBrowser => {
                // The token is registered before the task is spawned so a
                // newer navigation can supersede a launch that has not
                // been polled yet.
                let token = self.handoff.begin(tab);
                let handoff = Arc::clone(&self.handoff);
                let url = url.to_string();
                tokio::spawn(async move {
                    let state = handoff.launch(tab, &url, token).await;
                    if state == HandoffState::Superseded {
                        log::debug!("handoff for tab {tab} superseded");
                    }
                });
            }
            NetworkMode::Vpn => {
                self.notify_vpn(url, settings);
            }
        }
    }

    /// The system cannot launch or verify an external VPN client; it can
    /// only ask the user to connect.
    fn notify_vpn(&self, url: &str, settings: &Settings) {
        let name = vpn_provider_display_name(&settings.vpn.provider);
        let message = if settings.vpn.enabled && !settings.vpn.provider.is_empty() {
            format!("Please make sure {name} is connected before accessing this site.")
        } else {
            format!("{name} is not configured. Set up a VPN to secure this site.")
        };
        self.sink.show(Notification {
            title: format!("Activate {name}"),
            message,
            buttons: vec!["Connect".to_string(), "Open Settings".to_string()],
            copyable_url: Some(url.to_string()),
        });
    }
}
