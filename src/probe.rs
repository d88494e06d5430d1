// src/probe.rs

use std::time::Instant;

use async_trait::async_trait;
use chrono::Utc;
use serde::{Deserialize, Serialize};

use crate::config::{Settings, RUNTIME_CONFIG};

/// External collaborator answering "what does the network look like from
/// here". Both probes go over the wire and can fail or stall.
#[async_trait]
pub trait ConnectivityProbe: Send + Sync {
    /// Public IP as seen from outside any tunnel.
    async fn lookup_public_ip(&self) -> Result<String, String>;
    /// Round-trip latency of one uncached DNS resolution.
    async fn dns_probe_latency_ms(&self) -> Result<u64, String>;
}

/// Terminal state of one connection check. Callers must branch on this,
/// not on `is_connected` alone.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum ConnectionStatus {
    NotConfigured,
    Error,
    Disconnected,
    Connected,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ConnectionStatusReport {
    pub is_connected: bool,
    /// Baseline IP captured while the VPN was known to be down.
    pub initial_ip: Option<String>,
    pub current_ip: Option<String>,
    pub provider: String,
    pub provider_name: String,
    pub dns_leak_check_passed: Option<bool>,
    pub response_time_ms: Option<u64>,
    /// RFC 3339 wall-clock time of the check.
    pub timestamp: String,
    pub status: ConnectionStatus,
}

impl ConnectionStatusReport {
    fn base(settings: &Settings, status: ConnectionStatus) -> Self {
        ConnectionStatusReport {
            is_connected: false,
            initial_ip: None,
            current_ip: None,
            provider: settings.vpn.provider.clone(),
            provider_name: crate::routing::types::vpn_provider_display_name(
                &settings.vpn.provider,
            )
            .to_string(),
            dns_leak_check_passed: None,
            response_time_ms: None,
            timestamp: Utc::now().to_rfc3339(),
            status,
        }
    }
}

/// Runs one connection check. `baseline_ip` is the IP recorded before the
/// VPN came up; when absent, the current IP becomes the baseline and the
/// check reports disconnected.
pub async fn check_connection(
    settings: &Settings,
    probe: &dyn ConnectivityProbe,
    baseline_ip: Option<&str>,
) -> ConnectionStatusReport {
    if !settings.vpn.enabled || settings.vpn.provider.is_empty() {
        return ConnectionStatusReport::base(settings, ConnectionStatus::NotConfigured);
    }

    let started = Instant::now();
    let current_ip = match probe.lookup_public_ip().await {
        Ok(ip) => ip,
        Err(err) => {
            log::warn!("public ip lookup failed: {err}");
            return ConnectionStatusReport::base(settings, ConnectionStatus::Error);
        }
    };
    let response_time_ms = started.elapsed().as_millis() as u64;

    // Suspiciously fast resolution suggests a local resolver outside the
    // tunnel is answering.
    let dns_leak_check_passed = match probe.dns_probe_latency_ms().await {
        Ok(latency) => Some(latency >= RUNTIME_CONFIG.dns_leak_latency_floor_ms),
        Err(err) => {
            log::debug!("dns probe failed, leaving leak check inconclusive: {err}");
            None
        }
    };

    let initial_ip = baseline_ip.unwrap_or(&current_ip).to_string();
    let status = if initial_ip == current_ip {
        ConnectionStatus::Disconnected
    } else {
        ConnectionStatus::Connected
    };

    let mut report = ConnectionStatusReport::base(settings, status);
    report.is_connected = status == ConnectionStatus::Connected;
    report.initial_ip = Some(initial_ip);
    report.current_ip = Some(current_ip);
    report.dns_leak_check_passed = dns_leak_check_passed;
    report.response_time_ms = Some(response_time_ms);
    report
}
