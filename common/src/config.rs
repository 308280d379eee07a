use std::time::Duration;

use env_flags::env_flags;

env_flags! {
    /// Overrides credential-file/keychain lookup. Acquiring a token when
    /// this is unset is an external concern (OAuth browser flow, keychain).
    pub CURSOR_ACCESS_TOKEN: Option<&str> = None;

    pub PORT: u16 = 17937, |value| value.parse::<u16>();

    pub CURSOR_DEBUG: bool = false, |value| value.parse::<bool>();

    pub CURSOR_BASE_URL: &str = "https://api2.cursor.sh";

    pub CURSOR_CLIENT_VERSION: &str = "0.1.0";

    pub SESSION_TIMEOUT_MS: Duration = Duration::from_millis(120_000), |value| {
        value.parse().map(Duration::from_millis)
    };

    pub LISTENER_IDLE_TIMEOUT_MS: Duration = Duration::from_millis(120_000), |value| {
        value.parse().map(Duration::from_millis)
    };
}

/// Resolved configuration for one gateway process. `GatewayConfig::load`
/// reads environment overrides; callers that need a token from somewhere
/// other than `CURSOR_ACCESS_TOKEN` (keychain, OAuth cache) must set
/// `access_token` themselves afterward.
#[derive(Debug, Clone)]
pub struct GatewayConfig {
    pub access_token: Option<String>,
    pub port: u16,
    pub debug: bool,
    pub vendor_base_url: String,
    pub client_version: String,
    pub session_timeout: Duration,
    pub listener_idle_timeout: Duration,
}

impl GatewayConfig {
    pub fn load() -> Self {
        Self {
            access_token: CURSOR_ACCESS_TOKEN.map(str::to_string),
            port: *PORT,
            debug: *CURSOR_DEBUG,
            vendor_base_url: CURSOR_BASE_URL.to_string(),
            client_version: CURSOR_CLIENT_VERSION.to_string(),
            session_timeout: *SESSION_TIMEOUT_MS,
            listener_idle_timeout: *LISTENER_IDLE_TIMEOUT_MS,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn load_falls_back_to_documented_defaults() {
        let config = GatewayConfig::load();
        assert_eq!(config.vendor_base_url, "https://api2.cursor.sh");
        assert_eq!(config.session_timeout, Duration::from_millis(120_000));
    }
}
