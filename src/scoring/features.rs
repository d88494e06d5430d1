use lazy_static::lazy_static;
use regex::Regex;
use serde::Serialize;

lazy_static! {
    static ref DIGIT_RE: Regex = Regex::new(r"\d").expect("digit regex");
    static ref SPECIAL_RE: Regex = Regex::new(r"[^a-zA-Z0-9]").expect("special char regex");
}

/// Lexical features of a single URL, extracted once and shared by every
/// scoring signal. Pure data, no I/O.
#[derive(Debug, Clone, Serialize)]
pub struct UrlFeatures {
    pub scheme_secure: bool,
    pub hostname: String,
    /// Leftmost dot-separated label of the hostname.
    pub base_label: String,
    /// Rightmost label, e.g. "com".
    pub tld: String,
    /// Label count minus one.
    pub subdomain_depth: usize,
    pub hyphen_count: usize,
    /// Digits in the base label.
    pub digit_count: usize,
    /// Non-alphanumeric characters in the base label.
    pub special_char_count: usize,
}

/// Parses a URL into its hostname and lexical features. Returns `None`
/// for anything that does not look like `scheme://host...`; callers then
/// take the default-score path.
pub fn parse_url(url: &str) -> Option<UrlFeatures> {
    let trimmed = url.trim();
    let (scheme, rest) = trimmed.split_once("://")?;
    if scheme.is_empty() || !scheme.chars().all(|c| c.is_ascii_alphanumeric() || c == '+' || c == '-' || c == '.') {
        return None;
    }

    let authority = rest
        .split(['/', '?', '#'])
        .next()
        .unwrap_or_default();
    // Strip userinfo and port.
    let host = authority.rsplit('@').next().unwrap_or(authority);
    let host = host.split(':').next().unwrap_or_default();
    if host.is_empty() {
        return None;
    }

    let hostname = host.to_ascii_lowercase();
    let labels: Vec<&str> = hostname.split('.').collect();
    let base_label = labels.first().copied().unwrap_or_default().to_string();
    let tld = labels.last().copied().unwrap_or_default().to_string();

    Some(UrlFeatures {
        scheme_secure: scheme.eq_ignore_ascii_case("https"),
        subdomain_depth: labels.len().saturating_sub(1),
        hyphen_count: hostname.matches('-').count(),
        digit_count: DIGIT_RE.find_iter(&base_label).count(),
        special_char_count: SPECIAL_RE.find_iter(&base_label).count(),
        hostname,
        base_label,
        tld,
    })
}

/// Hostname of a URL, or `None` when unparsable.
pub fn hostname_of(url: &str) -> Option<String> {
    parse_url(url).map(|features| features.hostname)
}
