//! Shared handler state.

use std::sync::Arc;

use warden_application::AuthOrchestrator;
use warden_application::ports::ProviderGateway;
use warden_infrastructure::ServerSettings;

/// State cloned into every handler.
#[derive(Clone)]
pub struct AppState {
    /// The authentication engine.
    pub engine: AuthOrchestrator,
    /// Authorization-code exchange with the identity providers.
    pub gateway: Arc<dyn ProviderGateway>,
    /// Listener, cookie and front-end origin settings.
    pub server: Arc<ServerSettings>,
}

impl AppState {
    /// Creates the state.
    pub fn new(
        engine: AuthOrchestrator,
        gateway: Arc<dyn ProviderGateway>,
        server: ServerSettings,
    ) -> Self {
        Self {
            engine,
            gateway,
            server: Arc::new(server),
        }
    }
}
