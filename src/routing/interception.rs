// src/routing/interception.rs

use std::future::Future;
use std::time::Duration;

use serde::Serialize;

use crate::config::{BlockedCounters, Settings};
use crate::scoring::features::hostname_of;
use crate::scoring::tables::{AD_DOMAINS, TRACKER_DOMAINS};

use super::types::DomainRule;

#[derive(Debug, Clone, Copy, Serialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum BlockReason {
    Ad,
    Tracker,
    DomainBlocked,
}

/// Verdict for one intercepted request.
#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case", tag = "decision")]
pub enum InterceptDecision {
    Allow,
    Block { reason: BlockReason },
    RedirectHttps { url: String },
}

fn is_local(hostname: &str) -> bool {
    hostname == "localhost" || hostname == "127.0.0.1"
}

/// Allow/block/upgrade decision for a request. `rule` is the override for
/// the initiating page's domain, not the request target. Unparsable URLs
/// are allowed through untouched.
pub fn decide(url: &str, settings: &Settings, rule: Option<&DomainRule>) -> InterceptDecision {
    let hostname = match hostname_of(url) {
        Some(hostname) => hostname,
        None => return InterceptDecision::Allow,
    };

    if rule.map(|r| r.blocked).unwrap_or(false) {
        return InterceptDecision::Block {
            reason: BlockReason::DomainBlocked,
        };
    }

    if settings.blocking.https_upgrade && !is_local(&hostname) {
        if let Some((scheme, rest)) = url.split_once("://") {
            if scheme.eq_ignore_ascii_case("http") {
                return InterceptDecision::RedirectHttps {
                    url: format!("https://{rest}"),
                };
            }
        }
    }

    if settings.blocking.ad_blocking {
        let allow_ads = rule.map(|r| r.allow_ads).unwrap_or(false);
        if !allow_ads && AD_DOMAINS.iter().any(|d| hostname.contains(d)) {
            return InterceptDecision::Block {
                reason: BlockReason::Ad,
            };
        }

        let allow_trackers = rule.map(|r| r.allow_trackers).unwrap_or(false);
        if !allow_trackers && TRACKER_DOMAINS.iter().any(|d| hostname.contains(d)) {
            return InterceptDecision::Block {
                reason: BlockReason::Tracker,
            };
        }
    }

    InterceptDecision::Allow
}

/// Runs a decision under the interception's blocking budget. The default
/// policy on budget exhaustion is allow: a stalled decision path must
/// never hang navigation.
pub async fn decide_within_budget<F>(decision: F, budget: Duration) -> InterceptDecision
where
    F: Future<Output = InterceptDecision>,
{
    match tokio::time::timeout(budget, decision).await {
        Ok(decision) => decision,
        Err(_) => {
            log::warn!("interception decision exceeded its budget, defaulting to allow");
            InterceptDecision::Allow
        }
    }
}

impl BlockedCounters {
    /// Accumulates the per-category counters for a verdict.
    pub fn record(&mut self, decision: &InterceptDecision) {
        match decision {
            InterceptDecision::Block {
                reason: BlockReason::Ad,
            } => self.ads += 1,
            InterceptDecision::Block {
                reason: BlockReason::Tracker,
            } => self.trackers += 1,
            InterceptDecision::RedirectHttps { .. } => self.https_upgrades += 1,
            _ => {}
        }
    }
}
