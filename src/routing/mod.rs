//! Network routing policy: mode resolution, the serialized egress queue,
//! the anonymizing-browser handoff, and request interception verdicts.

pub mod egress;
pub mod handoff;
pub mod interception;
pub mod policy;
pub mod types;

pub use egress::{EgressController, ProxyConfigurator};
pub use handoff::{BrowserHandoff, ExternalOpener, HandoffState};
pub use interception::{decide, decide_within_budget, InterceptDecision};
pub use policy::{resolve_mode, PolicyEngine};
pub use types::{DomainRule, NetworkMode, SocksProxyConfig, TabId};
