//! Single-use loopback redirect listener
//!
//! Binds an ephemeral port on the loopback interface, hands out the exact
//! redirect URI to register for one OAuth flow, and resolves a single waiter
//! with the first callback URL that hits the registered path. Any other path
//! is answered 404 and malformed requests 400, neither resolving the waiter.
//! Connections arriving after the first valid match are answered and
//! discarded.
//!
//! The waiter is a one-shot: a second concurrent `wait_for_callback` is
//! rejected with `Closed` instead of silently displacing the first.

use std::sync::{Arc, Mutex as StdMutex};

use axum::extract::RawQuery;
use axum::response::Html;
use axum::routing::get;
use axum::Router;
use docrouter_domain::{DocRouterError, Result};
use tokio::net::TcpListener;
use tokio::sync::oneshot;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use tracing::{debug, error};

const SUCCESS_PAGE: &str = r#"<!DOCTYPE html>
<html>
<head><title>Authorization Complete</title></head>
<body><h1>Authorization complete</h1><p>You may return to docrouter and close this window.</p></body>
</html>"#;

type CallbackSender = Arc<StdMutex<Option<oneshot::Sender<String>>>>;

/// Loopback HTTP listener that captures exactly one OAuth redirect
pub struct LoopbackListener {
    port: u16,
    callback_path: String,
    waiter: StdMutex<Option<oneshot::Receiver<String>>>,
    cancel_token: CancellationToken,
    shutdown_tx: StdMutex<Option<oneshot::Sender<()>>>,
    handle: StdMutex<Option<JoinHandle<()>>>,
}

impl LoopbackListener {
    /// Bind an OS-assigned ephemeral port on the loopback interface and start
    /// serving the callback path.
    ///
    /// # Errors
    /// Returns `BindFailed` when no local port can be bound.
    pub async fn bind(path: &str) -> Result<Self> {
        let callback_path =
            if path.starts_with('/') { path.to_string() } else { format!("/{path}") };

        let listener = TcpListener::bind("127.0.0.1:0")
            .await
            .map_err(|err| DocRouterError::BindFailed(err.to_string()))?;
        let port = listener
            .local_addr()
            .map_err(|err| DocRouterError::BindFailed(err.to_string()))?
            .port();

        let (callback_tx, callback_rx) = oneshot::channel::<String>();
        let sender: CallbackSender = Arc::new(StdMutex::new(Some(callback_tx)));

        let handler_sender = sender.clone();
        let handler_path = callback_path.clone();
        let app = Router::new().route(
            &callback_path,
            get(move |RawQuery(query): RawQuery| {
                let sender = handler_sender.clone();
                let path = handler_path.clone();
                async move { handle_callback(port, &path, query, &sender) }
            }),
        );

        let (shutdown_tx, shutdown_rx) = oneshot::channel();

        let handle = tokio::spawn(async move {
            if let Err(err) = axum::serve(listener, app)
                .with_graceful_shutdown(async move {
                    let _ = shutdown_rx.await;
                })
                .await
            {
                error!(error = %err, "loopback listener error");
            }
        });

        debug!(port, path = %callback_path, "loopback listener bound");

        Ok(Self {
            port,
            callback_path,
            waiter: StdMutex::new(Some(callback_rx)),
            cancel_token: CancellationToken::new(),
            shutdown_tx: StdMutex::new(Some(shutdown_tx)),
            handle: StdMutex::new(Some(handle)),
        })
    }

    /// The redirect URI to register for this flow only.
    #[must_use]
    pub fn redirect_uri(&self) -> String {
        format!("http://127.0.0.1:{}{}", self.port, self.callback_path)
    }

    /// Suspend until the first valid callback arrives, returning its full URL
    /// including the query string.
    ///
    /// # Errors
    /// Returns `Cancelled` when [`cancel`](Self::cancel) tears the flow down,
    /// and `Closed` when the listener shut down without a callback or when a
    /// waiter was already consumed (concurrent waits are not supported).
    pub async fn wait_for_callback(&self) -> Result<String> {
        let receiver = {
            let mut guard = self.waiter.lock().expect("waiter poisoned");
            guard.take().ok_or(DocRouterError::Closed)?
        };

        tokio::select! {
            () = self.cancel_token.cancelled() => Err(DocRouterError::Cancelled),
            result = receiver => result.map_err(|_| DocRouterError::Closed),
        }
    }

    /// Fail any in-flight wait with `Cancelled` and release the socket.
    pub fn cancel(&self) {
        self.cancel_token.cancel();
        self.shutdown();
    }

    /// Release the socket. Safe to call multiple times.
    pub fn shutdown(&self) {
        if let Some(tx) = self.shutdown_tx.lock().expect("shutdown poisoned").take() {
            let _ = tx.send(());
        }
    }
}

impl Drop for LoopbackListener {
    fn drop(&mut self) {
        self.cancel_token.cancel();
        if let Some(tx) = self.shutdown_tx.lock().expect("shutdown poisoned").take() {
            let _ = tx.send(());
        }
        if let Some(handle) = self.handle.lock().expect("handle poisoned").take() {
            if !handle.is_finished() {
                handle.abort();
            }
        }
    }
}

fn handle_callback(
    port: u16,
    path: &str,
    query: Option<String>,
    sender: &CallbackSender,
) -> Html<&'static str> {
    let url = match query {
        Some(query) => format!("http://127.0.0.1:{port}{path}?{query}"),
        None => format!("http://127.0.0.1:{port}{path}"),
    };

    // Only the first valid request resolves the waiter; later ones are
    // answered and discarded.
    if let Some(tx) = sender.lock().expect("callback sender poisoned").take() {
        let _ = tx.send(url);
    } else {
        debug!("discarding extra callback request");
    }

    Html(SUCCESS_PAGE)
}
