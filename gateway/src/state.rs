//! Process-wide shared state handed to every route handler.

use std::sync::Arc;

use bridge_common::ChecksumProvider;
use bridge_common::GatewayConfig;
use bridge_common::StubChecksumProvider;
use bridge_core::VendorClient;

#[derive(Clone)]
pub struct AppState {
    pub config: Arc<GatewayConfig>,
    checksum_provider: Arc<dyn ChecksumProvider>,
}

impl AppState {
    pub fn new(config: GatewayConfig) -> Self {
        Self {
            config: Arc::new(config),
            checksum_provider: Arc::new(StubChecksumProvider),
        }
    }

    /// A fresh vendor client for one request. `reqwest::Client` is itself
    /// cheap to clone (it wraps an `Arc`), so there's no pooling concern in
    /// building one per call.
    pub fn vendor_client(&self) -> VendorClient {
        VendorClient::new(
            self.config.vendor_base_url.clone(),
            self.config.access_token.clone().unwrap_or_default(),
            self.config.client_version.clone(),
            self.checksum_provider.clone(),
        )
    }
}
