//! Interactive account selection for the terminal

use std::io::Write;
use std::sync::Arc;

use async_trait::async_trait;
use docrouter_core::ports::AccountSelector;
use docrouter_domain::{DocRouterError, GoogleAccount, Result};
use docrouter_infra::GoogleAuthenticator;

/// Selects an account on stdin when more than one is signed in
///
/// With a single account there is nothing to ask; with none the caller gets
/// `NoAccounts` so the surface can steer the user to `sign-in`.
pub struct PromptAccountSelector {
    authenticator: Arc<GoogleAuthenticator>,
}

impl PromptAccountSelector {
    pub fn new(authenticator: Arc<GoogleAuthenticator>) -> Self {
        Self { authenticator }
    }
}

#[async_trait]
impl AccountSelector for PromptAccountSelector {
    async fn select_account(&self, file_name: &str) -> Result<GoogleAccount> {
        let accounts = self.authenticator.accounts().await;

        if accounts.is_empty() {
            return Err(DocRouterError::NoAccounts);
        }
        if accounts.len() == 1 {
            return Ok(accounts.into_iter().next().ok_or(DocRouterError::NoAccounts)?);
        }

        let file_name = file_name.to_string();
        tokio::task::spawn_blocking(move || prompt(&accounts, &file_name))
            .await
            .map_err(|err| DocRouterError::Internal(err.to_string()))?
    }
}

fn prompt(accounts: &[GoogleAccount], file_name: &str) -> Result<GoogleAccount> {
    eprintln!("Choose an account for {file_name}:");
    for (index, account) in accounts.iter().enumerate() {
        eprintln!("  [{}] {}", index + 1, account.email);
    }
    eprint!("Selection (empty to cancel): ");
    let _ = std::io::stderr().flush();

    let mut line = String::new();
    std::io::stdin()
        .read_line(&mut line)
        .map_err(|err| DocRouterError::Io(err.to_string()))?;

    let trimmed = line.trim();
    if trimmed.is_empty() {
        return Err(DocRouterError::Cancelled);
    }

    trimmed
        .parse::<usize>()
        .ok()
        .and_then(|choice| choice.checked_sub(1))
        .and_then(|index| accounts.get(index).cloned())
        .ok_or(DocRouterError::Cancelled)
}
