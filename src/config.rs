// src/config.rs

use std::collections::HashMap;

use lazy_static::lazy_static;
use serde::{Deserialize, Serialize};

use crate::routing::types::{DomainRule, NetworkMode, SocksProxyConfig};

/// Bumped whenever the persisted settings layout changes shape.
pub const SETTINGS_SCHEMA_VERSION: u32 = 2;

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct BlockingSettings {
    pub ad_blocking: bool,
    pub https_upgrade: bool,
    pub javascript_control: bool,
}

impl Default for BlockingSettings {
    fn default() -> Self {
        BlockingSettings {
            ad_blocking: true,
            https_upgrade: true,
            javascript_control: false,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct RoutingSettings {
    pub preferred_network: NetworkMode,
    pub auto_secure_high_risk: bool,
    pub socks_proxy_enabled: bool,
    pub socks_proxy: Option<SocksProxyConfig>,
    pub anonymizing_browser_path: String,
    pub auto_launch_anonymizing_browser: bool,
}

impl Default for RoutingSettings {
    fn default() -> Self {
        RoutingSettings {
            preferred_network: NetworkMode::Direct,
            auto_secure_high_risk: false,
            socks_proxy_enabled: false,
            socks_proxy: None,
            anonymizing_browser_path: String::new(),
            auto_launch_anonymizing_browser: false,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct VpnSettings {
    pub enabled: bool,
    pub provider: String,
    pub app_path: String,
    pub protocol: String,
    pub kill_switch: bool,
}

impl Default for VpnSettings {
    fn default() -> Self {
        VpnSettings {
            enabled: false,
            provider: String::new(),
            app_path: String::new(),
            protocol: "auto".into(),
            kill_switch: true,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
pub struct DnsSettings {
    pub dns_over_https: bool,
    pub provider: String,
    pub custom_dns: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct NotificationSettings {
    pub enabled: bool,
    pub smart_alerts: bool,
}

impl Default for NotificationSettings {
    fn default() -> Self {
        NotificationSettings {
            enabled: true,
            smart_alerts: true,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
pub struct BlockedCounters {
    pub ads: u64,
    pub trackers: u64,
    pub https_upgrades: u64,
    pub fingerprinting_attempts: u64,
}

/// Process-wide persisted settings. Field groups are updated through
/// [`SettingsUpdate`]; there is deliberately no partial-object merge.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Settings {
    pub version: u32,
    pub blocking: BlockingSettings,
    pub routing: RoutingSettings,
    pub vpn: VpnSettings,
    pub dns: DnsSettings,
    pub notifications: NotificationSettings,
    #[serde(default)]
    pub domain_rules: HashMap<String, DomainRule>,
    #[serde(default)]
    pub counters: BlockedCounters,
}

impl Default for Settings {
    fn default() -> Self {
        Settings {
            version: SETTINGS_SCHEMA_VERSION,
            blocking: BlockingSettings::default(),
            routing: RoutingSettings::default(),
            vpn: VpnSettings::default(),
            dns: DnsSettings::default(),
            notifications: NotificationSettings::default(),
            domain_rules: HashMap::new(),
            counters: BlockedCounters::default(),
        }
    }
}

/// Typed update operation for one settings field group.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "snake_case", tag = "group", content = "value")]
pub enum SettingsUpdate {
    Blocking(BlockingSettings),
    Routing(RoutingSettings),
    Vpn(VpnSettings),
    Dns(DnsSettings),
    Notifications(NotificationSettings),
}

impl Settings {
    pub fn apply(&mut self, update: SettingsUpdate) {
        match update {
            SettingsUpdate::Blocking(group) => self.blocking = group,
            SettingsUpdate::Routing(group) => self.routing = group,
            SettingsUpdate::Vpn(group) => self.vpn = group,
            SettingsUpdate::Dns(group) => self.dns = group,
            SettingsUpdate::Notifications(group) => self.notifications = group,
        }
    }

    /// Per-domain override, if one was ever created. Keys are
    /// case-sensitive hostnames; absence means inherit global policy.
    pub fn rule_for(&self, domain: &str) -> Option<&DomainRule> {
        self.domain_rules.get(domain)
    }

    /// Lazily creates the rule entry on first override for a domain.
    pub fn rule_mut(&mut self, domain: &str) -> &mut DomainRule {
        self.domain_rules.entry(domain.to_string()).or_default()
    }
}

#[derive(Debug, Clone)]
pub struct RuntimeConfig {
    // Caching
    pub score_cache_size: usize, // Default: 512 entries

    // Notifications
    pub notification_history_limit: usize, // Default: 20
    pub notification_throttle_secs: u64,   // Default: 30 minutes

    // Routing
    pub handoff_timeout_ms: u64,   // Default: 1000
    pub intercept_budget_ms: u64,  // Default: 200
    pub auto_secure_threshold: u8, // Scores below this get auto-secured

    // Connection probe
    pub dns_leak_latency_floor_ms: u64, // Default: 50
}

impl Default for RuntimeConfig {
    fn default() -> Self {
        RuntimeConfig {
            score_cache_size: 512,
            notification_history_limit: 20,
            notification_throttle_secs: 30 * 60,
            handoff_timeout_ms: 1000,
            intercept_budget_ms: 200,
            auto_secure_threshold: 40,
            dns_leak_latency_floor_ms: 50,
        }
    }
}

// Global runtime tuning
lazy_static! {
    pub static ref RUNTIME_CONFIG: RuntimeConfig = RuntimeConfig::default();
}
