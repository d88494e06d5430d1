// src/routing/egress.rs

use std::sync::{Arc, Mutex};

use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;
use uuid::Uuid;

use super::types::{SocksProxyConfig, TabId};

/// External collaborator owning the browser's shared proxy configuration.
/// Apply is synchronous; there is no polling.
pub trait ProxyConfigurator: Send + Sync {
    fn apply(&self, config: &SocksProxyConfig) -> Result<(), String>;
    fn clear(&self) -> Result<(), String>;
}

#[derive(Debug, Clone)]
pub enum EgressAction {
    Apply(SocksProxyConfig),
    Clear,
}

struct EgressCommand {
    id: String,
    tab: TabId,
    action: EgressAction,
    token: CancellationToken,
}

/// Serializes apply/clear operations on the single shared egress
/// configuration: one worker, FIFO, one in-flight operation at a time.
/// The egress resource holds one authoritative desired state, so a newer
/// request supersedes any older still-queued one regardless of tab.
#[derive(Clone)]
pub struct EgressController {
    tx: mpsc::UnboundedSender<EgressCommand>,
    last_pending: Arc<Mutex<Option<CancellationToken>>>,
}

impl EgressController {
    pub fn new(configurator: Arc<dyn ProxyConfigurator>) -> Self {
        let (tx, mut rx) = mpsc::unbounded_channel::<EgressCommand>();
        tokio::spawn(async move {
            while let Some(cmd) = rx.recv().await {
                if cmd.token.is_cancelled() {
                    log::debug!("egress request {} superseded before apply", cmd.id);
                    continue;
                }
                let result = match &cmd.action {
                    EgressAction::Apply(config) => {
                        log::debug!(
                            "applying {} proxy {}:{} for tab {}",
                            config.scheme(),
                            config.host,
                            config.port,
                            cmd.tab
                        );
                        configurator.apply(config)
                    }
                    EgressAction::Clear => configurator.clear(),
                };
                if let Err(err) = result {
                    // Degraded, not fatal: navigation proceeds regardless.
                    log::warn!("egress request {} failed: {}", cmd.id, err);
                }
            }
        });
        EgressController {
            tx,
            last_pending: Arc::new(Mutex::new(None)),
        }
    }

    /// Enqueues an apply for the shared egress configuration.
    pub fn apply(&self, tab: TabId, config: SocksProxyConfig) -> String {
        self.submit(tab, EgressAction::Apply(config))
    }

    /// Enqueues an unconditional clear.
    pub fn clear(&self, tab: TabId) -> String {
        self.submit(tab, EgressAction::Clear)
    }

    fn submit(&self, tab: TabId, action: EgressAction) -> String {
        let token = CancellationToken::new();
        {
            let mut last = match self.last_pending.lock() {
                Ok(guard) => guard,
                Err(poisoned) => poisoned.into_inner(),
            };
            if let Some(prev) = last.replace(token.clone()) {
                prev.cancel();
            }
        }
        let id = Uuid::new_v4().to_string();
        let cmd = EgressCommand {
            id: id.clone(),
            tab,
            action,
            token,
        };
        if self.tx.send(cmd).is_err() {
            log::warn!("egress worker is gone, dropping request {}", id);
        }
        id
    }
}
