use std::sync::Arc;
use tokio::sync::RwLock;

use crate::auth::SessionCodec;
use crate::config::Config;
use crate::db::Store;
use crate::services::{AuthService, SeaOrmAuthService};

/// Process-wide dependencies, constructed once at startup and shared by the
/// API, the scheduler, and the CLI paths. The signing secret is resolved
/// here and never changes for the lifetime of the process.
#[derive(Clone)]
pub struct SharedState {
    pub config: Arc<RwLock<Config>>,

    pub store: Store,

    pub sessions: Arc<SessionCodec>,

    pub auth_service: Arc<dyn AuthService>,
}

impl SharedState {
    pub async fn new(config: Config) -> anyhow::Result<Self> {
        let store = Store::with_pool_options(
            &config.general.database_path,
            config.general.max_db_connections,
            config.general.min_db_connections,
        )
        .await?;

        let (secret, _) = Config::resolve_jwt_secret();
        let sessions = Arc::new(SessionCodec::new(&secret));

        let auth_service: Arc<dyn AuthService> = Arc::new(SeaOrmAuthService::new(
            store.clone(),
            config.security.clone(),
        ));

        Ok(Self {
            config: Arc::new(RwLock::new(config)),
            store,
            sessions,
            auth_service,
        })
    }

    pub async fn config(&self) -> Config {
        self.config.read().await.clone()
    }
}
