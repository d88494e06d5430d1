//! Shield core: URL risk scoring, network routing policy, smart-alert
//! throttling, and the message protocol the browser shell talks to.

pub mod advice;
pub mod api;
pub mod config;
pub mod notify;
pub mod probe;
pub mod routing;
pub mod scoring;
pub mod store;

pub use api::{Collaborators, ShieldCore};
pub use config::{Settings, SettingsUpdate};
pub use routing::{InterceptDecision, NetworkMode};
pub use scoring::{RiskEngine, ScoreComponents};
