use serde::{Deserialize, Serialize};

/// Tab identifier supplied by the embedding browser shell.
pub type TabId = u32;

/// The transport carrying traffic for the current navigation. Exactly one
/// mode is active for the shared egress configuration at any time.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "snake_case")]
pub enum NetworkMode {
    #[default]
    Direct,
    AnonymizingBrowser,
    Socks,
    Vpn,
}

/// Per-domain override. Created lazily on first override; a missing rule
/// means "inherit global policy".
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
pub struct DomainRule {
    pub allow_ads: bool,
    pub allow_trackers: bool,
    pub block_javascript: bool,
    pub use_proxy: bool,
    pub proxy_type: Option<NetworkMode>,
    pub blocked: bool,
}

/// Structured SOCKS egress configuration.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct SocksProxyConfig {
    pub host: String,
    pub port: u16,
    /// SOCKS protocol version, 4 or 5.
    pub version: u8,
    pub username: Option<String>,
    pub password: Option<String>,
}

impl SocksProxyConfig {
    pub fn scheme(&self) -> String {
        format!("socks{}", self.version)
    }
}

/// Display name for a configured VPN provider.
pub fn vpn_provider_display_name(provider: &str) -> &'static str {
    match provider {
        "nord" => "NordVPN",
        "express" => "ExpressVPN",
        "proton" => "ProtonVPN",
        "surfshark" => "Surfshark",
        "shield" => "Shield VPN",
        _ => "your VPN",
    }
}
