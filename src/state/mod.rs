use std::sync::Arc;

use hmac::digest::InvalidLength;

use crate::{
    config::AppConfig,
    dao::{archive::Archive, collection::Collection, models::Entity, store::DocumentStore},
    session::SessionKey,
};

/// Shared handle passed to every handler.
pub type SharedState = Arc<AppState>;

/// Central application state: the store handle and the loaded configuration.
///
/// Nothing here is mutated after startup.
pub struct AppState {
    store: Arc<dyn DocumentStore>,
    config: AppConfig,
    session_key: SessionKey,
}

impl AppState {
    /// Construct a new [`AppState`] wrapped in an [`Arc`] so it can be cloned cheaply.
    pub fn new(store: Arc<dyn DocumentStore>, config: AppConfig) -> Result<SharedState, InvalidLength> {
        let session_key = SessionKey::new(&config.secret_key)?;
        Ok(Arc::new(Self {
            store,
            config,
            session_key,
        }))
    }

    /// Raw document store.
    pub fn store(&self) -> Arc<dyn DocumentStore> {
        Arc::clone(&self.store)
    }

    /// Typed collection of `T`.
    pub fn collection<T: Entity>(&self) -> Collection<T> {
        Collection::new(self.store())
    }

    /// Archive sink for deleted entities.
    pub fn archive(&self) -> Archive {
        Archive::new(self.store())
    }

    /// Loaded configuration.
    pub fn config(&self) -> &AppConfig {
        &self.config
    }

    /// Signer for session cookies.
    pub fn session_key(&self) -> &SessionKey {
        &self.session_key
    }
}

/// In-memory state used by unit tests across the crate.
#[cfg(all(test, feature = "memory-store"))]
pub(crate) fn memory_state(vars: &[(&str, &str)]) -> SharedState {
    use crate::dao::memory::MemoryStore;

    let lookup = |key: &str| {
        vars.iter()
            .find(|(name, _)| *name == key)
            .map(|(_, value)| value.to_string())
            .or_else(|| (key == "SECRET_KEY").then(|| "test-secret".to_owned()))
    };
    let config = AppConfig::from_lookup(lookup).expect("test configuration is valid");
    AppState::new(Arc::new(MemoryStore::new()), config).expect("any key length is accepted")
}
