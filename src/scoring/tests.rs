#![cfg(test)]

use super::cache::ScoreCache;
use super::engine::{finalize, weigh, RawSignals, RiskEngine, DEFAULT_SCORE};
use super::features::parse_url;
use super::tables::WEIGHTS;

#[test]
fn parse_url_extracts_hostname_and_lexical_features() {
    let features = parse_url("https://user:pw@a.b.Login-Example123.com:8443/path?q=1").unwrap();
    assert!(features.scheme_secure);
    assert_eq!(features.hostname, "a.b.login-example123.com");
    assert_eq!(features.base_label, "a");
    assert_eq!(features.tld, "com");
    assert_eq!(features.subdomain_depth, 3);
    assert_eq!(features.hyphen_count, 1);
}

#[test]
fn parse_url_counts_base_label_randomness() {
    let features = parse_url("http://x9z_7a.example.com").unwrap();
    assert_eq!(features.digit_count, 2);
    assert_eq!(features.special_char_count, 1);
    assert!(!features.scheme_secure);
}

#[test]
fn parse_url_rejects_garbage() {
    assert!(parse_url("not a url").is_none());
    assert!(parse_url("").is_none());
    assert!(parse_url("https://").is_none());
    assert!(parse_url("://missing-scheme.com").is_none());
}

#[test]
fn score_is_deterministic() {
    let engine = RiskEngine::new();
    let first = engine.score("https://some-ordinary-site.com");
    for _ in 0..5 {
        assert_eq!(engine.score("https://some-ordinary-site.com"), first);
    }
}

#[test]
fn literal_test_domains_have_fixed_scores() {
    let engine = RiskEngine::new();
    for scheme in ["http", "https"] {
        assert_eq!(engine.score(&format!("{scheme}://test-low-safety.com")), 30);
        assert_eq!(engine.score(&format!("{scheme}://test-medium-safety.com")), 65);
        assert_eq!(engine.score(&format!("{scheme}://test-high-safety.com")), 95);
    }
}

#[test]
fn malformed_urls_score_neutral_default() {
    let engine = RiskEngine::new();
    assert_eq!(engine.score("not a url"), DEFAULT_SCORE);
    assert_eq!(engine.score(""), DEFAULT_SCORE);
    assert_eq!(engine.score("https://"), DEFAULT_SCORE);
}

#[test]
fn weighted_formula_matches_reference_values() {
    let raw = RawSignals {
        https: 1.0,
        domain: 1.5,
        tld: 1.0,
        trackers: 0.0,
        phishing: 0.0,
        complexity: 0.0,
        age: 0.0,
    };
    let weighted_sum = weigh(&raw);
    assert!((weighted_sum - 0.575).abs() < 1e-9);
    assert_eq!(finalize(weighted_sum), 89);
}

#[test]
fn weights_sum_to_one() {
    let total = WEIGHTS.https
        + WEIGHTS.domain
        + WEIGHTS.tld
        + WEIGHTS.trackers
        + WEIGHTS.phishing
        + WEIGHTS.complexity
        + WEIGHTS.age;
    assert!((total - 1.0).abs() < 1e-9);
}

#[test]
fn known_site_matches_suffix_and_records_breakdown() {
    let engine = RiskEngine::new();
    assert_eq!(engine.score("https://github.com"), 91);
    assert_eq!(engine.score("http://api.github.com/repos"), 91);

    let components = engine.components_for("api.github.com").unwrap();
    assert!(components.known_site);
    assert!(components.raw.is_none());
    assert_eq!(components.matched_domain.as_deref(), Some("github.com"));
    assert_eq!(components.score, 91);
}

#[test]
fn composite_breakdown_is_cached() {
    let engine = RiskEngine::new();
    let score = engine.score("https://some-ordinary-site.com");
    let components = engine.components_for("some-ordinary-site.com").unwrap();
    assert!(!components.known_site);
    assert_eq!(components.score, score);
    assert!(components.https_used);
    assert_eq!(components.tld, "com");
    let raw = components.raw.unwrap();
    assert_eq!(raw.https, 1.0);
}

#[test]
fn tracker_host_saturates_at_zero() {
    let engine = RiskEngine::new();
    // -10 for the tracker list hit, -15 for the "analytics" substring.
    assert_eq!(engine.score("https://google-analytics.com"), 0);
}

#[test]
fn phishing_lexicon_drags_score_down() {
    let engine = RiskEngine::new();
    let benign = engine.score("https://quiet-garden.com");
    let phishy = engine.score("https://secure-login-verify-bank-account.com");
    assert!(phishy < benign);
    assert!(phishy < 40);
}

#[test]
fn typosquat_without_brand_is_penalized_harder() {
    let engine = RiskEngine::new();
    let squat = engine.score("https://amazn.io");
    let with_brand = engine.score("https://amazn-amazon.io");
    assert!(squat < with_brand);
}

#[test]
fn all_scores_stay_in_range() {
    let engine = RiskEngine::new();
    let urls = [
        "https://google.com",
        "http://login-verify-account.tk",
        "https://aaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaa-1234567890.xyz",
        "https://a.b.c.d.e.f.example.info",
        "http://weird_host-99.gq",
        "not a url at all",
    ];
    for url in urls {
        let score = engine.score(url);
        assert!(score <= 100, "score {score} out of range for {url}");
    }
}

#[test]
fn cache_overwrites_and_stays_bounded() {
    let cache = ScoreCache::new(4);
    let engine = RiskEngine::new();
    engine.score("https://site-a.com");
    let first = engine.components_for("site-a.com").unwrap().timestamp_ms;
    engine.score("https://site-a.com");
    let second = engine.components_for("site-a.com").unwrap().timestamp_ms;
    assert!(second >= first);

    for i in 0..10 {
        let components = engine.components_for("site-a.com");
        if let Some(c) = components {
            cache.put(&format!("host{i}.com"), c);
        }
    }
    assert!(cache.len() <= 4);
}
