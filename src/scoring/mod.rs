//! Domain risk scoring: feature extraction, the seven-signal composite
//! score, and the bounded per-domain breakdown cache.

pub mod cache;
pub mod engine;
pub mod features;
pub mod tables;
#[cfg(test)]
mod tests;

pub use engine::{RiskEngine, ScoreComponents, DEFAULT_SCORE};
pub use features::{hostname_of, parse_url, UrlFeatures};
