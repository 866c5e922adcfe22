use secrecy::{ExposeSecret, Secret};
use serde::{Deserialize, de::DeserializeOwned};
use warden_core::{Email, OAuthClaims, OAuthError, OAuthProvider};

pub const FACEBOOK_GRAPH_URL: &str = "https://graph.facebook.com";
const PROFILE_FIELDS: &str = "id,first_name,last_name,email,picture";

#[derive(Debug, Clone, Deserialize)]
pub struct FacebookConfig {
    pub app_id: String,
    pub app_secret: Secret<String>,
    #[serde(default = "default_graph_url")]
    pub graph_url: String,
}

fn default_graph_url() -> String {
    FACEBOOK_GRAPH_URL.to_owned()
}

/// Verifies Facebook user access tokens through the Graph API.
pub struct FacebookOAuthProvider {
    client: reqwest::Client,
    config: FacebookConfig,
}

#[derive(Debug, Deserialize)]
struct DebugTokenResponse {
    data: DebugTokenData,
}

#[derive(Debug, Deserialize)]
struct DebugTokenData {
    #[serde(default)]
    is_valid: bool,
    app_id: Option<String>,
}

#[derive(Debug, Deserialize)]
struct Profile {
    email: Option<String>,
    #[serde(default)]
    first_name: String,
    #[serde(default)]
    last_name: String,
    picture: Option<Picture>,
}

#[derive(Debug, Deserialize)]
struct Picture {
    data: PictureData,
}

#[derive(Debug, Deserialize)]
struct PictureData {
    url: Option<String>,
}

impl FacebookOAuthProvider {
    pub fn new(client: reqwest::Client, config: FacebookConfig) -> Self {
        Self { client, config }
    }

    fn app_access_token(&self) -> String {
        format!(
            "{}|{}",
            self.config.app_id,
            self.config.app_secret.expose_secret()
        )
    }

    async fn get_json<T: DeserializeOwned>(
        &self,
        endpoint: &str,
        query: &[(&str, &str)],
    ) -> Result<T, OAuthError> {
        let response = self
            .client
            .get(format!("{}/{endpoint}", self.config.graph_url))
            .query(query)
            .send()
            .await
            .map_err(|e| OAuthError::Transport(e.to_string()))?;

        let status = response.status();
        if status.is_server_error() {
            return Err(OAuthError::Transport(format!(
                "{endpoint} request failed with status {status}"
            )));
        }
        if !status.is_success() {
            return Err(OAuthError::Rejected(format!(
                "{endpoint} request failed with status {status}"
            )));
        }

        response
            .json::<T>()
            .await
            .map_err(|e| OAuthError::Rejected(e.to_string()))
    }
}

#[async_trait::async_trait]
impl OAuthProvider for FacebookOAuthProvider {
    fn name(&self) -> &'static str {
        "facebook"
    }

    #[tracing::instrument(name = "Verifying Facebook access token", skip_all)]
    async fn verify_id_token(&self, token: &str) -> Result<OAuthClaims, OAuthError> {
        let app_token = self.app_access_token();
        let debug: DebugTokenResponse = self
            .get_json(
                "debug_token",
                &[("input_token", token), ("access_token", &app_token)],
            )
            .await?;

        if !debug.data.is_valid {
            return Err(OAuthError::Rejected("token is invalid".to_owned()));
        }
        if debug.data.app_id.as_deref() != Some(self.config.app_id.as_str()) {
            return Err(OAuthError::Rejected(
                "token was issued for another app".to_owned(),
            ));
        }

        let profile: Profile = self
            .get_json("me", &[("fields", PROFILE_FIELDS), ("access_token", token)])
            .await?;

        let email = profile
            .email
            .as_deref()
            .filter(|email| !email.trim().is_empty())
            .ok_or(OAuthError::MissingEmail)?;
        let email = Email::try_from(email).map_err(|e| OAuthError::Rejected(e.to_string()))?;

        Ok(OAuthClaims {
            email,
            first_name: profile.first_name,
            last_name: profile.last_name,
            avatar_url: profile
                .picture
                .and_then(|picture| picture.data.url)
                .filter(|url| !url.is_empty()),
        })
    }
}
