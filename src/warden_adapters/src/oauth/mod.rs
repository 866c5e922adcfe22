pub mod facebook;
pub mod google;

use std::sync::Arc;
use std::time::Duration;

use serde::Deserialize;
use warden_core::OAuthProviders;

use facebook::{FacebookConfig, FacebookOAuthProvider};
use google::{GoogleConfig, GoogleOAuthProvider};

pub const DEFAULT_OAUTH_TIMEOUT_SECONDS: u64 = 10;

#[derive(Debug, Clone, Deserialize)]
pub struct OAuthSettings {
    #[serde(default = "default_timeout_seconds")]
    pub timeout_seconds: u64,
    #[serde(default)]
    pub google: Option<GoogleConfig>,
    #[serde(default)]
    pub facebook: Option<FacebookConfig>,
}

impl Default for OAuthSettings {
    fn default() -> Self {
        Self {
            timeout_seconds: DEFAULT_OAUTH_TIMEOUT_SECONDS,
            google: None,
            facebook: None,
        }
    }
}

fn default_timeout_seconds() -> u64 {
    DEFAULT_OAUTH_TIMEOUT_SECONDS
}

/// Registers every provider that has configuration. All of them share one
/// HTTP client.
pub fn build_oauth_providers(settings: &OAuthSettings) -> Result<OAuthProviders, reqwest::Error> {
    let client = reqwest::Client::builder()
        .timeout(Duration::from_secs(settings.timeout_seconds))
        .build()?;

    let mut providers = OAuthProviders::new();
    if let Some(google) = &settings.google {
        providers = providers.with_provider(Arc::new(GoogleOAuthProvider::new(
            client.clone(),
            google.clone(),
        )));
    }
    if let Some(facebook) = &settings.facebook {
        providers = providers.with_provider(Arc::new(FacebookOAuthProvider::new(
            client.clone(),
            facebook.clone(),
        )));
    }
    Ok(providers)
}
