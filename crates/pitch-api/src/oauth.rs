use async_trait::async_trait;
use reqwest::{Client, Url, header::ACCEPT};
use tracing::debug;

use pitch_types::api::{GithubEmail, GithubProfile, GithubTokenResponse, IdentityAssertion};

use crate::auth::AuthError;

const AUTHORIZE_URL: &str = "https://github.com/login/oauth/authorize";
const TOKEN_URL: &str = "https://github.com/login/oauth/access_token";
const USER_URL: &str = "https://api.github.com/user";
const EMAILS_URL: &str = "https://api.github.com/user/emails";

/// The third-party side of the sign-in handshake.
#[async_trait]
pub trait IdentityProvider: Send + Sync {
    /// Where to send the browser to start the handshake.
    fn authorize_url(&self, state: &str) -> String;

    /// Trades the callback `code` for the user's identity.
    async fn exchange(&self, code: &str) -> Result<IdentityAssertion, AuthError>;
}

pub struct GithubProvider {
    client: Client,
    client_id: String,
    client_secret: String,
    redirect_uri: String,
    authorize_endpoint: Url,
}

impl GithubProvider {
    pub fn new(client_id: String, client_secret: String, redirect_uri: String) -> anyhow::Result<Self> {
        let client = Client::builder()
            .user_agent(concat!("pitchdeck/", env!("CARGO_PKG_VERSION")))
            .build()?;

        Ok(Self {
            client,
            client_id,
            client_secret,
            redirect_uri,
            authorize_endpoint: Url::parse(AUTHORIZE_URL)?,
        })
    }

    /// Primary verified address, for accounts that keep their profile email private.
    async fn primary_email(&self, access_token: &str) -> Result<Option<String>, AuthError> {
        let emails: Vec<GithubEmail> = self
            .client
            .get(EMAILS_URL)
            .bearer_auth(access_token)
            .send()
            .await?
            .error_for_status()?
            .json()
            .await?;

        Ok(emails.into_iter().find(|e| e.primary && e.verified).map(|e| e.email))
    }
}

#[async_trait]
impl IdentityProvider for GithubProvider {
    fn authorize_url(&self, state: &str) -> String {
        let mut url = self.authorize_endpoint.clone();
        url.query_pairs_mut()
            .append_pair("client_id", &self.client_id)
            .append_pair("redirect_uri", &self.redirect_uri)
            .append_pair("scope", "read:user user:email")
            .append_pair("state", state);
        url.into()
    }

    async fn exchange(&self, code: &str) -> Result<IdentityAssertion, AuthError> {
        let token: GithubTokenResponse = self
            .client
            .post(TOKEN_URL)
            .header(ACCEPT, "application/json")
            .form(&[
                ("client_id", self.client_id.as_str()),
                ("client_secret", self.client_secret.as_str()),
                ("code", code),
                ("redirect_uri", self.redirect_uri.as_str()),
            ])
            .send()
            .await?
            .error_for_status()?
            .json()
            .await?;

        let profile: GithubProfile = self
            .client
            .get(USER_URL)
            .bearer_auth(&token.access_token)
            .send()
            .await?
            .error_for_status()?
            .json()
            .await?;

        debug!("GitHub handshake completed for {} ({})", profile.login, profile.id);

        let fallback_email = if profile.email.is_none() {
            self.primary_email(&token.access_token).await?
        } else {
            None
        };

        Ok(IdentityAssertion::from_github(profile, fallback_email))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn authorize_url_carries_state_and_redirect() {
        let provider = GithubProvider::new(
            "client-123".into(),
            "secret".into(),
            "http://localhost:3000/auth/callback/github".into(),
        )
        .unwrap();

        let url = Url::parse(&provider.authorize_url("abc 123")).unwrap();
        assert_eq!(url.host_str(), Some("github.com"));
        let pairs: Vec<(String, String)> = url.query_pairs().into_owned().collect();
        assert!(pairs.contains(&("client_id".into(), "client-123".into())));
        assert!(pairs.contains(&("state".into(), "abc 123".into())));
        assert!(pairs.contains(&(
            "redirect_uri".into(),
            "http://localhost:3000/auth/callback/github".into()
        )));
    }
}
