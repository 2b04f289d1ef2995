//! OAuth 2.0 HTTP client
//!
//! Builds the provider authorization URL, exchanges authorization codes and
//! refresh tokens at the token endpoint, and fetches the signed-in user's
//! identity. Remote errors are surfaced verbatim with status context and
//! never retried here.

use docrouter_domain::{DocRouterError, Result, TokenEndpointResponse, TokenSet};
use reqwest::Client;
use serde::Deserialize;
use tracing::debug;

use super::flow::PendingFlow;

const GOOGLE_AUTHORIZATION_ENDPOINT: &str = "https://accounts.google.com/o/oauth2/v2/auth";
const GOOGLE_TOKEN_ENDPOINT: &str = "https://oauth2.googleapis.com/token";
const GOOGLE_USERINFO_ENDPOINT: &str = "https://www.googleapis.com/oauth2/v3/userinfo";

const OAUTH_SCOPES: &str =
    "https://www.googleapis.com/auth/drive.file https://www.googleapis.com/auth/userinfo.email";

const HTTP_TIMEOUT_SECS: u64 = 30;

/// Identity claims fetched after a successful exchange
#[derive(Debug, Clone, Deserialize)]
pub struct UserInfo {
    /// Stable subject identifier
    pub sub: String,
    /// Account email
    pub email: String,
}

/// OAuth 2.0 client for the authorization-code and refresh-token grants
#[derive(Debug, Clone)]
pub struct OAuthHttpClient {
    http: Client,
    client_id: String,
    client_secret: String,
    authorization_endpoint: String,
    token_endpoint: String,
    userinfo_endpoint: String,
}

impl OAuthHttpClient {
    /// Create a client against the Google endpoints.
    #[must_use]
    pub fn new(client_id: String, client_secret: String) -> Self {
        Self::with_endpoints(
            client_id,
            client_secret,
            GOOGLE_AUTHORIZATION_ENDPOINT.to_string(),
            GOOGLE_TOKEN_ENDPOINT.to_string(),
            GOOGLE_USERINFO_ENDPOINT.to_string(),
        )
    }

    /// Create a client against explicit endpoints (tests, other providers).
    #[must_use]
    pub fn with_endpoints(
        client_id: String,
        client_secret: String,
        authorization_endpoint: String,
        token_endpoint: String,
        userinfo_endpoint: String,
    ) -> Self {
        let http = Client::builder()
            .timeout(std::time::Duration::from_secs(HTTP_TIMEOUT_SECS))
            .build()
            .unwrap_or_else(|_| Client::new());

        Self {
            http,
            client_id,
            client_secret,
            authorization_endpoint,
            token_endpoint,
            userinfo_endpoint,
        }
    }

    /// Build the authorization URL embedding the flow's redirect URI, state
    /// nonce, and PKCE challenge.
    #[must_use]
    pub fn authorization_url(&self, redirect_uri: &str, flow: &PendingFlow) -> String {
        let params = [
            ("client_id", self.client_id.as_str()),
            ("response_type", "code"),
            ("redirect_uri", redirect_uri),
            ("scope", OAUTH_SCOPES),
            ("access_type", "offline"),
            ("prompt", "consent"),
            ("state", flow.state.as_str()),
            ("code_challenge", flow.code_challenge.as_str()),
            ("code_challenge_method", flow.challenge_method()),
        ];

        let query = params
            .iter()
            .map(|(k, v)| format!("{k}={}", urlencoding::encode(v)))
            .collect::<Vec<_>>()
            .join("&");

        format!("{}?{}", self.authorization_endpoint, query)
    }

    /// Exchange an authorization code for a token record.
    ///
    /// # Errors
    /// Returns `TokenExchangeFailed` for non-2xx or unparsable responses and
    /// for exchanges that yield no refresh token (the record would be
    /// unrefreshable).
    pub async fn exchange_code(
        &self,
        code: &str,
        redirect_uri: &str,
        code_verifier: &str,
    ) -> Result<TokenSet> {
        let params = [
            ("grant_type", "authorization_code"),
            ("code", code),
            ("client_id", self.client_id.as_str()),
            ("client_secret", self.client_secret.as_str()),
            ("redirect_uri", redirect_uri),
            ("code_verifier", code_verifier),
        ];

        let response = self
            .http
            .post(&self.token_endpoint)
            .form(&params)
            .send()
            .await
            .map_err(|err| DocRouterError::Network(err.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(DocRouterError::TokenExchangeFailed(format!("status {status}: {body}")));
        }

        let parsed: TokenEndpointResponse = response
            .json()
            .await
            .map_err(|err| DocRouterError::TokenExchangeFailed(err.to_string()))?;

        let refresh_token = parsed.refresh_token.filter(|t| !t.is_empty()).ok_or_else(|| {
            DocRouterError::TokenExchangeFailed("no refresh token issued".to_string())
        })?;

        debug!("authorization code exchanged");

        Ok(TokenSet::new(parsed.access_token, refresh_token, parsed.expires_in))
    }

    /// Exchange a refresh token for a fresh token record.
    ///
    /// A newly returned refresh token replaces the previous one; otherwise
    /// the previous token is carried forward.
    ///
    /// # Errors
    /// Returns `TokenExchangeFailed` for non-2xx or unparsable responses and
    /// for refreshes that yield no usable access token.
    pub async fn refresh(&self, tokens: &TokenSet) -> Result<TokenSet> {
        if tokens.refresh_token.is_empty() {
            return Err(DocRouterError::TokenExchangeFailed(
                "no refresh token available".to_string(),
            ));
        }

        let params = [
            ("grant_type", "refresh_token"),
            ("client_id", self.client_id.as_str()),
            ("client_secret", self.client_secret.as_str()),
            ("refresh_token", tokens.refresh_token.as_str()),
        ];

        let response = self
            .http
            .post(&self.token_endpoint)
            .form(&params)
            .send()
            .await
            .map_err(|err| DocRouterError::Network(err.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(DocRouterError::TokenExchangeFailed(format!("status {status}: {body}")));
        }

        let parsed: TokenEndpointResponse = response
            .json()
            .await
            .map_err(|err| DocRouterError::TokenExchangeFailed(err.to_string()))?;

        if parsed.access_token.is_empty() {
            return Err(DocRouterError::TokenExchangeFailed(
                "refresh yielded no access token".to_string(),
            ));
        }

        let refresh_token = parsed
            .refresh_token
            .filter(|t| !t.is_empty())
            .unwrap_or_else(|| tokens.refresh_token.clone());

        debug!("access token refreshed");

        Ok(TokenSet::new(parsed.access_token, refresh_token, parsed.expires_in))
    }

    /// Fetch the identity claims for an access token.
    ///
    /// # Errors
    /// Returns `AuthorizationFailed` for non-2xx or unparsable responses.
    pub async fn fetch_userinfo(&self, access_token: &str) -> Result<UserInfo> {
        let response = self
            .http
            .get(&self.userinfo_endpoint)
            .bearer_auth(access_token)
            .send()
            .await
            .map_err(|err| DocRouterError::Network(err.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            return Err(DocRouterError::AuthorizationFailed(format!(
                "identity fetch failed with status {status}"
            )));
        }

        response.json().await.map_err(|err| DocRouterError::AuthorizationFailed(err.to_string()))
    }
}

#[cfg(test)]
mod tests {
    //! Unit tests for the OAuth HTTP client.
    use super::*;

    fn test_client() -> OAuthHttpClient {
        OAuthHttpClient::new("client_123".to_string(), "secret_456".to_string())
    }

    /// Validates `OAuthHttpClient::authorization_url` behavior for the URL
    /// assembly scenario.
    ///
    /// Assertions:
    /// - Ensures the URL targets the authorization endpoint.
    /// - Ensures redirect URI, state, offline access, and PKCE parameters are
    ///   all present and encoded.
    #[test]
    fn authorization_url_contains_flow_parameters() {
        let client = test_client();
        let flow = PendingFlow::generate().unwrap();

        let url = client.authorization_url("http://127.0.0.1:49152/oauth2redirect", &flow);

        assert!(url.starts_with("https://accounts.google.com/o/oauth2/v2/auth?"));
        assert!(url.contains("client_id=client_123"));
        assert!(url.contains("response_type=code"));
        assert!(url.contains("redirect_uri=http%3A%2F%2F127.0.0.1%3A49152%2Foauth2redirect"));
        assert!(url.contains("access_type=offline"));
        assert!(url.contains("prompt=consent"));
        assert!(url.contains(&format!("state={}", flow.state)));
        assert!(url.contains(&format!("code_challenge={}", flow.code_challenge)));
        assert!(url.contains("code_challenge_method=S256"));
    }

    /// Validates `OAuthHttpClient::refresh` behavior for the empty refresh
    /// token scenario.
    ///
    /// Assertions:
    /// - Ensures the call fails with `TokenExchangeFailed` before any network
    ///   activity.
    #[tokio::test]
    async fn refresh_with_empty_token_fails_fast() {
        let client = test_client();
        let tokens = TokenSet::new("access".to_string(), String::new(), 3600);

        let result = client.refresh(&tokens).await;
        assert!(matches!(result, Err(DocRouterError::TokenExchangeFailed(_))));
    }
}
