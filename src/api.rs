// src/api.rs

use std::sync::Arc;
use std::time::Duration;

use serde_json::{json, Value};
use tokio::sync::RwLock;

use crate::config::{Settings, SettingsUpdate, RUNTIME_CONFIG};
use crate::notify::{derive_issues, Notification, NotificationSink, NotificationThrottler};
use crate::probe::{check_connection, ConnectivityProbe};
use crate::routing::egress::{EgressController, ProxyConfigurator};
use crate::routing::handoff::{BrowserHandoff, ExternalOpener};
use crate::routing::interception::{decide, decide_within_budget, InterceptDecision};
use crate::routing::policy::PolicyEngine;
use crate::routing::types::{vpn_provider_display_name, NetworkMode, TabId};
use crate::scoring::{hostname_of, RiskEngine, DEFAULT_SCORE};
use crate::store::SettingsStore;

/// External seams the embedding shell must provide.
pub struct Collaborators {
    pub configurator: Arc<dyn ProxyConfigurator>,
    pub opener: Arc<dyn ExternalOpener>,
    pub sink: Arc<dyn NotificationSink>,
    pub probe: Arc<dyn ConnectivityProbe>,
    pub store: Arc<dyn SettingsStore>,
}

/// Wires the engines together and speaks the string-action message
/// protocol the browser shell uses.
pub struct ShieldCore {
    engine: RiskEngine,
    policy: PolicyEngine,
    throttler: NotificationThrottler,
    settings: RwLock<Settings>,
    store: Arc<dyn SettingsStore>,
    probe: Arc<dyn ConnectivityProbe>,
    sink: Arc<dyn NotificationSink>,
}

impl ShieldCore {
    /// Must run inside a tokio runtime; the egress worker is spawned here.
    pub fn new(collaborators: Collaborators) -> Self {
        let settings = match collaborators.store.load() {
            Ok(Some(settings)) => settings,
            Ok(None) => Settings::default(),
            Err(err) => {
                log::warn!("failed to load settings, starting from defaults: {err}");
                Settings::default()
            }
        };

        let egress = EgressController::new(collaborators.configurator);
        let handoff = Arc::new(BrowserHandoff::new(
            collaborators.opener,
            Arc::clone(&collaborators.sink),
        ));
        let policy = PolicyEngine::new(egress, handoff, Arc::clone(&collaborators.sink));

        ShieldCore {
            engine: RiskEngine::new(),
            policy,
            throttler: NotificationThrottler::new(),
            settings: RwLock::new(settings),
            store: collaborators.store,
            probe: collaborators.probe,
            sink: collaborators.sink,
        }
    }

    /// Scores a navigation and applies the resolved network mode.
    pub async fn on_navigation_committed(&self, tab: TabId, url: &str) -> NetworkMode {
        let score = self.engine.score(url);
        let settings = self.settings.read().await;
        self.policy
            .on_navigation_committed(tab, url, &settings, score)
            .await
    }

    /// Verdict for one intercepted request, bounded by the decision
    /// budget. Counters accumulate on the in-memory settings.
    pub async fn decide_request(&self, url: &str, initiator_domain: Option<&str>) -> InterceptDecision {
        let budget = Duration::from_millis(RUNTIME_CONFIG.intercept_budget_ms);
        let verdict = decide_within_budget(
            async {
                let settings = self.settings.read().await;
                let rule = initiator_domain.and_then(|domain| settings.rule_for(domain));
                decide(url, &settings, rule)
            },
            budget,
        )
        .await;

        let mut settings = self.settings.write().await;
        settings.counters.record(&verdict);
        verdict
    }

    /// Dispatches one protocol message. Unknown actions and handler
    /// failures come back as `{"success": false, "error": ..}`.
    pub async fn handle(&self, action: &str, payload: Value) -> Value {
        match action {
            "calculateSafetyScore" => self.calculate_safety_score(payload).await,
            "getLastScoreComponents" => self.last_score_components(payload).await,
            "updateProxySettings" => self.update_proxy_settings(payload).await,
            "activateVpn" => self.activate_vpn().await,
            "setupShieldVpn" => self.setup_shield_vpn().await,
            "launchAnonymizingBrowser" => self.launch_anonymizing_browser(payload).await,
            "checkConnectionStatus" => self.check_connection_status().await,
            "getSettings" => self.get_settings().await,
            "updateSettings" => self.update_settings(payload).await,
            "getStats" => self.get_stats().await,
            "getNotificationHistory" => self.notification_history(),
            _ => {
                log::debug!("unknown action: {action}");
                json!({ "success": false, "error": format!("unknown action: {action}") })
            }
        }
    }

    async fn calculate_safety_score(&self, payload: Value) -> Value {
        let url = match payload.get("url").and_then(Value::as_str) {
            Some(url) => url,
            None => {
                return json!({ "score": DEFAULT_SCORE, "error": "missing url" });
            }
        };
        let score = self.engine.score(url);

        if let Some(domain) = hostname_of(url) {
            let settings = self.settings.read().await;
            if settings.notifications.enabled && settings.notifications.smart_alerts {
                // Even a domain with no detected issues gets the generic
                // monitoring message; the throttler substitutes it.
                let flags = derive_issues(&domain, score);
                if let Some(record) = self.throttler.maybe_notify(&domain, flags) {
                    self.sink.show(Notification {
                        title: format!("Shield Alert: {domain}"),
                        message: record.message.clone(),
                        buttons: vec!["View Details".to_string()],
                        copyable_url: None,
                    });
                }
            }
        }

        json!({ "score": score })
    }

    async fn last_score_components(&self, payload: Value) -> Value {
        let domain = match payload.get("domain").and_then(Value::as_str) {
            Some(domain) => domain,
            None => return json!({ "success": false, "error": "missing domain" }),
        };
        match self.engine.components_for(domain) {
            Some(components) => json!({ "success": true, "components": components }),
            None => json!({
                "success": false,
                "error": format!("no cached breakdown for {domain}"),
            }),
        }
    }

    /// Merges `useProxy`/`proxyType` into the domain's rule, leaving its
    /// other override fields untouched.
    async fn update_proxy_settings(&self, payload: Value) -> Value {
        let domain = match payload.get("domain").and_then(Value::as_str) {
            Some(domain) => domain.to_string(),
            None => return json!({ "success": false, "error": "missing domain" }),
        };
        let use_proxy = match payload.get("useProxy").and_then(Value::as_bool) {
            Some(use_proxy) => use_proxy,
            None => return json!({ "success": false, "error": "missing useProxy" }),
        };
        let proxy_type: Option<NetworkMode> = match payload.get("proxyType") {
            None | Some(Value::Null) => None,
            Some(value) => match serde_json::from_value(value.clone()) {
                Ok(mode) => Some(mode),
                Err(err) => {
                    return json!({ "success": false, "error": format!("invalid proxyType: {err}") })
                }
            },
        };

        let mut settings = self.settings.write().await;
        let rule = settings.rule_mut(&domain);
        rule.use_proxy = use_proxy;
        rule.proxy_type = proxy_type;
        self.persist(&settings)
    }

    async fn activate_vpn(&self) -> Value {
        let settings = self.settings.read().await;
        if !settings.vpn.enabled || settings.vpn.provider.is_empty() {
            return json!({
                "success": false,
                "needsConfig": true,
                "message": "No VPN is configured. Set one up in Shield's settings.",
            });
        }
        let name = vpn_provider_display_name(&settings.vpn.provider);
        self.sink.show(Notification {
            title: format!("Activate {name}"),
            message: format!("Please make sure {name} is connected."),
            buttons: vec!["Connect".to_string(), "Open Settings".to_string()],
            copyable_url: None,
        });
        json!({ "success": true, "provider": name })
    }

    async fn setup_shield_vpn(&self) -> Value {
        let mut settings = self.settings.write().await;
        settings.vpn.enabled = true;
        settings.vpn.provider = "shield".to_string();
        let saved = self.persist(&settings);
        if saved.get("success") == Some(&Value::Bool(true)) {
            json!({ "success": true, "provider": "Shield VPN" })
        } else {
            saved
        }
    }

    async fn launch_anonymizing_browser(&self, payload: Value) -> Value {
        let url = match payload.get("url").and_then(Value::as_str) {
            Some(url) => url.to_string(),
            None => return json!({ "success": false, "error": "missing url" }),
        };
        let tab = payload.get("tab").and_then(Value::as_u64).unwrap_or(0) as TabId;

        let settings = self.settings.read().await;
        self.policy
            .apply_mode(tab, &url, NetworkMode::AnonymizingBrowser, &settings)
            .await;
        json!({ "success": true })
    }

    async fn check_connection_status(&self) -> Value {
        let baseline = match self.store.load_status_snapshot() {
            Ok(snapshot) => snapshot.and_then(|report| report.initial_ip),
            Err(err) => {
                log::debug!("no prior connection snapshot: {err}");
                None
            }
        };

        let settings = self.settings.read().await;
        let report = check_connection(&settings, self.probe.as_ref(), baseline.as_deref()).await;
        if let Err(err) = self.store.save_status_snapshot(&report) {
            log::warn!("failed to persist connection snapshot: {err}");
        }
        match serde_json::to_value(&report) {
            Ok(value) => value,
            Err(err) => json!({ "success": false, "error": err.to_string() }),
        }
    }

    async fn get_settings(&self) -> Value {
        let settings = self.settings.read().await;
        match serde_json::to_value(&*settings) {
            Ok(value) => json!({ "success": true, "settings": value }),
            Err(err) => json!({ "success": false, "error": err.to_string() }),
        }
    }

    async fn update_settings(&self, payload: Value) -> Value {
        let update: SettingsUpdate = match serde_json::from_value(payload) {
            Ok(update) => update,
            Err(err) => {
                return json!({ "success": false, "error": format!("invalid update: {err}") })
            }
        };
        let mut settings = self.settings.write().await;
        settings.apply(update);
        self.persist(&settings)
    }

    async fn get_stats(&self) -> Value {
        let settings = self.settings.read().await;
        json!({ "success": true, "blocked": settings.counters })
    }

    fn notification_history(&self) -> Value {
        json!({ "success": true, "history": self.throttler.history() })
    }

    /// Saves through the store; the in-memory settings stay authoritative
    /// either way.
    fn persist(&self, settings: &Settings) -> Value {
        match self.store.save(settings) {
            Ok(()) => json!({ "success": true }),
            Err(err) => {
                log::warn!("failed to persist settings: {err}");
                json!({ "success": false, "error": err })
            }
        }
    }
}
