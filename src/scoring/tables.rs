//! Curated reference tables. Static and versioned with the crate; the
//! engine never fetches reputation data at runtime.

use serde::Serialize;

/// Fixed hostnames used to exercise the full score range in tests and
/// manual QA.
pub const TEST_DOMAIN_SCORES: &[(&str, u8)] = &[
    ("test-low-safety.com", 30),
    ("test-medium-safety.com", 65),
    ("test-high-safety.com", 95),
];

/// Well-known sites with fixed reputation scores. Matched exact-or-suffix
/// before any signal computation runs.
pub const KNOWN_SITE_SCORES: &[(&str, u8)] = &[
    ("google.com", 95),
    ("facebook.com", 85),
    ("bing.com", 90),
    ("amazon.com", 92),
    ("wikipedia.org", 88),
    ("reddit.com", 75),
    ("twitter.com", 70),
    ("ebay.com", 78),
    ("netflix.com", 90),
    ("imgur.com", 72),
    ("nytimes.com", 85),
    ("cnn.com", 82),
    ("craigslist.org", 62),
    ("wordpress.com", 75),
    ("youtube.com", 88),
    ("instagram.com", 78),
    ("github.com", 91),
    ("microsoft.com", 94),
    ("apple.com", 93),
    ("example.xyz", 35),
    ("phishing-example.ml", 15),
    ("login-verify-account.tk", 10),
];

pub const HIGH_SAFETY_DOMAINS: &[&str] = &[
    "google.com", "microsoft.com", "apple.com", "amazon.com", "github.com",
    "youtube.com", "linkedin.com", "netflix.com", "adobe.com", "zoom.us",
    "salesforce.com", "slack.com", "dropbox.com", "office.com", "ibm.com",
    "cloudflare.com", "akamai.com", "fastly.com", "twilio.com", "shopify.com",
];

pub const MEDIUM_SAFETY_DOMAINS: &[&str] = &[
    "wikipedia.org", "reddit.com", "twitter.com", "instagram.com", "facebook.com",
    "medium.com", "quora.com", "tumblr.com", "pinterest.com", "ebay.com",
    "etsy.com", "wordpress.com", "yelp.com", "buzzfeed.com", "nytimes.com",
    "cnn.com", "bbc.com", "yahoo.com", "bing.com", "imdb.com",
];

pub const LOW_SAFETY_DOMAINS: &[&str] = &[
    "example.xyz", "test123.tk", "free-stuff.ml", "win-prize.ga", "get-rich.cf",
    "freemoney.xyz", "adware.tk", "malware.ml", "phishing.ga", "scam.cf",
];

pub const HIGH_SAFETY_TLDS: &[&str] = &["gov", "edu", "mil"];
pub const MEDIUM_SAFETY_TLDS: &[&str] = &["org", "io", "co", "net"];
pub const LOW_SAFETY_TLDS: &[&str] = &[
    "xyz", "tk", "ml", "ga", "cf", "pw", "top", "gq", "info",
];

pub const AD_DOMAINS: &[&str] = &[
    "doubleclick.net",
    "googleadservices.com",
    "googlesyndication.com",
    "adnxs.com",
    "rubiconproject.com",
    "advertising.com",
    "pubmatic.com",
    "taboola.com",
    "outbrain.com",
];

pub const TRACKER_DOMAINS: &[&str] = &[
    "google-analytics.com",
    "facebook.net",
    "facebook.com/tr",
    "bat.bing.com",
    "connect.facebook.net",
    "analytics.twitter.com",
    "sb.scorecardresearch.com",
    "hotjar.com",
    "pixel.advertising.com",
];

pub const SUSPICIOUS_TERMS: &[&str] = &[
    "secure", "login", "signin", "account", "verify", "bank", "paypal", "confirm",
];

/// Common typo-squats of popular brands. A variant hit without the genuine
/// brand name present is weighted much harder.
pub const BRAND_VARIANTS: &[(&str, &[&str])] = &[
    ("google", &["gogle", "goggle", "g00gle", "googel"]),
    ("facebook", &["faceb00k", "facebock", "faceboook", "facebok"]),
    ("amazon", &["amaz0n", "amazn", "amazzon", "amason"]),
    ("microsoft", &["micr0soft", "microsfot", "microsft", "microssoft"]),
    ("apple", &["appl", "appel", "appl3", "aple"]),
    ("paypal", &["payp4l", "paypall", "paypa1", "paypai"]),
    ("netflix", &["netfllx", "netfl1x", "n3tflix", "netflixx"]),
];

#[derive(Debug, Clone, Copy, Serialize)]
pub struct SignalWeights {
    pub https: f64,
    pub domain: f64,
    pub tld: f64,
    pub trackers: f64,
    pub phishing: f64,
    pub complexity: f64,
    pub age: f64,
}

pub const WEIGHTS: SignalWeights = SignalWeights {
    https: 0.15,
    domain: 0.25,
    tld: 0.05,
    trackers: 0.15,
    phishing: 0.25,
    complexity: 0.05,
    age: 0.10,
};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReputationTier {
    High,
    Medium,
    Low,
}

/// True when `hostname` equals `candidate` or is a subdomain of it.
pub fn suffix_match(hostname: &str, candidate: &str) -> bool {
    if hostname == candidate {
        return true;
    }
    hostname.len() > candidate.len()
        && hostname.ends_with(candidate)
        && hostname.as_bytes()[hostname.len() - candidate.len() - 1] == b'.'
}

/// Reputation tier for a hostname, high before medium before low.
pub fn domain_tier(hostname: &str) -> Option<ReputationTier> {
    if HIGH_SAFETY_DOMAINS.iter().any(|d| suffix_match(hostname, d)) {
        return Some(ReputationTier::High);
    }
    if MEDIUM_SAFETY_DOMAINS.iter().any(|d| suffix_match(hostname, d)) {
        return Some(ReputationTier::Medium);
    }
    if LOW_SAFETY_DOMAINS.iter().any(|d| suffix_match(hostname, d)) {
        return Some(ReputationTier::Low);
    }
    None
}

pub fn tld_tier(tld: &str) -> Option<ReputationTier> {
    if HIGH_SAFETY_TLDS.contains(&tld) {
        Some(ReputationTier::High)
    } else if MEDIUM_SAFETY_TLDS.contains(&tld) {
        Some(ReputationTier::Medium)
    } else if LOW_SAFETY_TLDS.contains(&tld) {
        Some(ReputationTier::Low)
    } else {
        None
    }
}

/// Exact-or-suffix match against the curated reputation table.
pub fn known_site_score(hostname: &str) -> Option<(&'static str, u8)> {
    KNOWN_SITE_SCORES
        .iter()
        .find(|(site, _)| suffix_match(hostname, site))
        .map(|(site, score)| (*site, *score))
}

pub fn test_domain_score(hostname: &str) -> Option<u8> {
    TEST_DOMAIN_SCORES
        .iter()
        .find(|(domain, _)| hostname == *domain)
        .map(|(_, score)| *score)
}
