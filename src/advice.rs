// src/advice.rs

use async_trait::async_trait;

/// Text generation backend. Treated as unreliable; callers always have a
/// canned fallback.
#[async_trait]
pub trait AdviceGenerator: Send + Sync {
    async fn generate(&self, prompt: &str) -> Result<String, String>;
}

pub const FALLBACK_ADVICE: &str =
    "I can help you stay safe while browsing. What would you like to know about online security?";

fn safety_level(score: u8) -> &'static str {
    if score >= 80 {
        "high"
    } else if score >= 60 {
        "medium"
    } else {
        "low"
    }
}

/// Assembles the advisory prompt for the current site.
pub fn build_prompt(domain: &str, score: u8, issues: &[String]) -> String {
    let issues = if issues.is_empty() {
        "none detected".to_string()
    } else {
        issues.join(", ")
    };
    format!(
        "You are a browsing safety assistant. The user is on {domain}, which has a \
         safety score of {score}/100 ({} safety). Detected issues: {issues}. \
         Give two or three short, practical tips for staying safe on this site.",
        safety_level(score)
    )
}

/// Asks the generator for advice; any failure falls back to the canned
/// response rather than surfacing an error to the user.
pub async fn advise_with_fallback(
    generator: &dyn AdviceGenerator,
    domain: &str,
    score: u8,
    issues: &[String],
) -> String {
    let prompt = build_prompt(domain, score, issues);
    match generator.generate(&prompt).await {
        Ok(advice) if !advice.trim().is_empty() => advice,
        Ok(_) => {
            log::debug!("advice generator returned empty text for {domain}");
            FALLBACK_ADVICE.to_string()
        }
        Err(err) => {
            log::warn!("advice generation failed for {domain}: {err}");
            FALLBACK_ADVICE.to_string()
        }
    }
}
