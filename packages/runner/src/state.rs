use std::sync::Arc;
use std::time::{Instant, SystemTime};

use crate::config::Config;
use crate::credentials::{CredentialResolver, EnvCredentialResolver};
use crate::executor::{SqlxExecutor, StatementExecutor};
use crate::handler::LifecycleHandler;
use crate::notifier::{HttpNotifier, ResponseNotifier};

#[derive(Clone)]
pub struct AppState {
    started_at: Instant,
    started_at_system: SystemTime,
    handler: Arc<LifecycleHandler>,
}

impl AppState {
    pub fn new(handler: LifecycleHandler) -> Self {
        Self {
            started_at: Instant::now(),
            started_at_system: SystemTime::now(),
            handler: Arc::new(handler),
        }
    }

    /// Production wiring: environment credentials, sqlx execution, HTTPS callbacks.
    pub fn from_config(config: &Config) -> Self {
        let resolver: Arc<dyn CredentialResolver> = Arc::new(EnvCredentialResolver);
        let executor: Arc<dyn StatementExecutor> = Arc::new(SqlxExecutor);
        let notifier: Arc<dyn ResponseNotifier> = Arc::new(HttpNotifier::new(
            config.callback_timeout,
            config.callback_retries,
        ));
        Self::new(LifecycleHandler::new(config, resolver, executor, notifier))
    }

    pub fn uptime_seconds(&self) -> u64 {
        self.started_at.elapsed().as_secs()
    }

    pub fn started_at_system(&self) -> SystemTime {
        self.started_at_system
    }

    pub fn handler(&self) -> Arc<LifecycleHandler> {
        Arc::clone(&self.handler)
    }
}
