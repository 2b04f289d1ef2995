//! Google sign-in orchestration and token lifecycle
//!
//! Owns the signed-in account list and the session state machine:
//! `SignedOut → SigningIn → Ready`, with `SigningIn → SignedOut` on any
//! failure. A token record is only persisted after a fully successful
//! exchange; no exit path leaves stale partial tokens behind.
//!
//! Refresh is on-use, not timer-driven: `valid_access_token` refreshes
//! synchronously when the record expires within the safety margin, and
//! refresh exchanges are serialized per account so concurrent callers never
//! race duplicate refreshes against a possibly single-use refresh token.

use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use async_trait::async_trait;
use dashmap::DashMap;
use docrouter_core::ports::{AccessTokenProvider, LinkOpener};
use docrouter_domain::constants::{LOOPBACK_CALLBACK_PATH, REFRESH_THRESHOLD_SECONDS};
use docrouter_domain::{DocRouterError, GoogleAccount, Result, SessionState, TokenSet};
use tokio::sync::{Mutex, RwLock};
use tracing::{debug, info, warn};
use url::Url;

use super::client::{OAuthHttpClient, UserInfo};
use super::flow::PendingFlow;
use super::listener::LoopbackListener;
use super::store::AccountStore;
use crate::config::AppConfig;

/// Authenticator for Google accounts
///
/// One instance per process, passed by handle to every consumer; there is no
/// ambient global. Cancelling a pending `sign_in` future tears down its
/// loopback listener (the listener's socket is scoped to the call).
pub struct GoogleAuthenticator {
    config: AppConfig,
    oauth: OAuthHttpClient,
    opener: Arc<dyn LinkOpener>,
    store: AccountStore,
    accounts: RwLock<Vec<GoogleAccount>>,
    signing_in: AtomicBool,
    refresh_locks: DashMap<String, Arc<Mutex<()>>>,
}

impl GoogleAuthenticator {
    /// Create an authenticator, restoring persisted accounts.
    #[must_use]
    pub fn new(
        config: AppConfig,
        oauth: OAuthHttpClient,
        store: AccountStore,
        opener: Arc<dyn LinkOpener>,
    ) -> Self {
        let accounts = store.load();
        if !accounts.is_empty() {
            info!(count = accounts.len(), "restored signed-in accounts");
        }

        Self {
            config,
            oauth,
            opener,
            store,
            accounts: RwLock::new(accounts),
            signing_in: AtomicBool::new(false),
            refresh_locks: DashMap::new(),
        }
    }

    /// Current session state.
    pub async fn session_state(&self) -> SessionState {
        if self.signing_in.load(Ordering::SeqCst) {
            return SessionState::SigningIn;
        }
        if self.accounts.read().await.is_empty() {
            SessionState::SignedOut
        } else {
            SessionState::Ready
        }
    }

    /// Snapshot of the signed-in accounts.
    pub async fn accounts(&self) -> Vec<GoogleAccount> {
        self.accounts.read().await.clone()
    }

    /// Run one interactive sign-in flow.
    ///
    /// Binds the loopback listener, opens the user's browser at the
    /// authorization URL, awaits the redirect callback, validates the state
    /// nonce, exchanges the code, fetches the account identity, and persists
    /// the account. The listener is released on every exit path.
    ///
    /// # Errors
    /// `MissingConfiguration` before any network call when credentials are
    /// absent; otherwise the sign-in failure taxonomy (`BindFailed`,
    /// `InvalidRedirect`, `AuthorizationFailed`, `Cancelled`,
    /// `TokenExchangeFailed`).
    pub async fn sign_in(&self) -> Result<GoogleAccount> {
        self.config.require_configured()?;

        self.signing_in.store(true, Ordering::SeqCst);
        let result = self.run_sign_in().await;
        self.signing_in.store(false, Ordering::SeqCst);

        match &result {
            Ok(account) => info!(email = %account.email, "sign-in complete"),
            Err(DocRouterError::Cancelled) => debug!("sign-in cancelled"),
            Err(err) => warn!(error = %err, "sign-in failed"),
        }

        result
    }

    async fn run_sign_in(&self) -> Result<GoogleAccount> {
        let listener = LoopbackListener::bind(LOOPBACK_CALLBACK_PATH).await?;
        let flow = PendingFlow::generate()?;
        let redirect_uri = listener.redirect_uri();

        let result = self.complete_sign_in(&listener, &flow, &redirect_uri).await;

        // Release the ephemeral port on success, failure, and cancellation
        // alike; leaking it would shadow later sign-in attempts.
        listener.shutdown();
        result
    }

    async fn complete_sign_in(
        &self,
        listener: &LoopbackListener,
        flow: &PendingFlow,
        redirect_uri: &str,
    ) -> Result<GoogleAccount> {
        let auth_url = self.oauth.authorization_url(redirect_uri, flow);
        self.opener.open_url(&auth_url)?;

        let callback = listener.wait_for_callback().await?;
        let code = validate_callback(&callback, &flow.state)?;

        let tokens = self.oauth.exchange_code(&code, redirect_uri, &flow.code_verifier).await?;
        let identity = self.oauth.fetch_userinfo(&tokens.access_token).await?;

        self.upsert_account(identity, tokens).await
    }

    async fn upsert_account(&self, identity: UserInfo, tokens: TokenSet) -> Result<GoogleAccount> {
        let mut accounts = self.accounts.write().await;

        let account = match accounts.iter_mut().find(|a| a.id == identity.sub) {
            Some(existing) => {
                existing.email = identity.email;
                existing.tokens = tokens;
                existing.clone()
            }
            None => {
                let account = GoogleAccount::new(identity.sub, identity.email, tokens);
                accounts.push(account.clone());
                account
            }
        };

        self.store.save(&accounts)?;
        Ok(account)
    }

    /// Return an access token valid for immediate use, refreshing first when
    /// the cached one expires within the safety margin.
    ///
    /// Concurrent callers for the same account serialize on a per-account
    /// lock; the second caller waits for the first refresh's result instead
    /// of issuing a duplicate exchange.
    ///
    /// # Errors
    /// `NotSignedIn` for unknown accounts; `TokenExchangeFailed` /
    /// `Network` when the refresh exchange fails.
    pub async fn valid_access_token(&self, account_id: &str) -> Result<String> {
        {
            let accounts = self.accounts.read().await;
            let account =
                accounts.iter().find(|a| a.id == account_id).ok_or(DocRouterError::NotSignedIn)?;
            if !account.tokens.is_expired(REFRESH_THRESHOLD_SECONDS) {
                return Ok(account.tokens.access_token.clone());
            }
        }

        let lock = self.refresh_lock(account_id);
        let _guard = lock.lock().await;

        // Re-check under the lock: the caller ahead of us may have already
        // refreshed this account.
        let current = {
            let accounts = self.accounts.read().await;
            accounts
                .iter()
                .find(|a| a.id == account_id)
                .map(|a| a.tokens.clone())
                .ok_or(DocRouterError::NotSignedIn)?
        };

        if !current.is_expired(REFRESH_THRESHOLD_SECONDS) {
            return Ok(current.access_token);
        }

        let refreshed = self.oauth.refresh(&current).await?;
        let access_token = refreshed.access_token.clone();

        {
            let mut accounts = self.accounts.write().await;
            let account = accounts
                .iter_mut()
                .find(|a| a.id == account_id)
                .ok_or(DocRouterError::NotSignedIn)?;
            account.tokens = refreshed;
            self.store.save(&accounts)?;
        }

        debug!(account = %account_id, "access token refreshed on use");
        Ok(access_token)
    }

    /// Discard an account's token record and persist the change. No network
    /// call is involved.
    pub async fn sign_out(&self, account_id: &str) -> Result<()> {
        let mut accounts = self.accounts.write().await;
        let before = accounts.len();
        accounts.retain(|a| a.id != account_id);

        if accounts.len() != before {
            info!(account = %account_id, "signed out");
        }
        self.refresh_locks.remove(account_id);
        self.store.save(&accounts)
    }

    /// Record an account's preferred upload folder by name, clearing any
    /// cached folder id so the next upload re-resolves it.
    pub async fn set_preferred_folder_name(
        &self,
        account_id: &str,
        folder_name: Option<String>,
    ) -> Result<()> {
        let mut accounts = self.accounts.write().await;
        let account = accounts
            .iter_mut()
            .find(|a| a.id == account_id)
            .ok_or(DocRouterError::NotSignedIn)?;

        account.preferred_folder_name = folder_name;
        account.preferred_folder_id = None;
        self.store.save(&accounts)
    }

    /// Cache the resolved Drive folder id for an account.
    pub async fn cache_preferred_folder_id(
        &self,
        account_id: &str,
        folder_id: String,
    ) -> Result<()> {
        let mut accounts = self.accounts.write().await;
        let account = accounts
            .iter_mut()
            .find(|a| a.id == account_id)
            .ok_or(DocRouterError::NotSignedIn)?;

        account.preferred_folder_id = Some(folder_id);
        self.store.save(&accounts)
    }

    fn refresh_lock(&self, account_id: &str) -> Arc<Mutex<()>> {
        self.refresh_locks
            .entry(account_id.to_string())
            .or_insert_with(|| Arc::new(Mutex::new(())))
            .clone()
    }
}

#[async_trait]
impl AccessTokenProvider for GoogleAuthenticator {
    async fn access_token(&self, account_id: &str) -> Result<String> {
        self.valid_access_token(account_id).await
    }
}

/// Validate a callback URL against the expected state nonce and extract the
/// authorization code.
///
/// Fails closed on any mismatch: an unparsable URL, a missing or different
/// nonce, or a provider-reported error all reject the flow.
fn validate_callback(callback: &str, expected_state: &str) -> Result<String> {
    let url = Url::parse(callback)
        .map_err(|err| DocRouterError::InvalidRedirect(format!("unparsable callback: {err}")))?;

    let params: HashMap<String, String> = url.query_pairs().into_owned().collect();

    match params.get("state") {
        Some(state) if state == expected_state => {}
        Some(_) => {
            return Err(DocRouterError::InvalidRedirect("state nonce mismatch".to_string()));
        }
        None => return Err(DocRouterError::InvalidRedirect("missing state nonce".to_string())),
    }

    if let Some(error) = params.get("error") {
        // The provider reports a user-dismissed consent screen as
        // access_denied; that is cancellation, not a fault.
        if error == "access_denied" {
            return Err(DocRouterError::Cancelled);
        }
        return Err(DocRouterError::AuthorizationFailed(error.clone()));
    }

    params
        .get("code")
        .cloned()
        .ok_or_else(|| DocRouterError::InvalidRedirect("missing authorization code".to_string()))
}
