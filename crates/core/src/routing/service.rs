//! File routing service - core orchestration logic

use std::path::{Path, PathBuf};
use std::sync::Arc;

use docrouter_domain::{ConversionTarget, DocRouterError, FileKind, Result, RouterEvent};
use tokio::sync::broadcast;
use tracing::{debug, warn};

use crate::ports::{
    AccountSelector, LinkOpener, ReplacementProtocol, UploadMarkerStore, Uploader,
};

const EVENT_CHANNEL_CAPACITY: usize = 64;

/// File routing service
///
/// Classifies incoming files and drives them through account selection,
/// upload, and the replacement protocol, emitting lifecycle events along the
/// way. Files route independently; each spawned flow runs to its terminal
/// event without blocking the others.
pub struct RouterService {
    selector: Arc<dyn AccountSelector>,
    uploader: Arc<dyn Uploader>,
    replacement: Arc<dyn ReplacementProtocol>,
    markers: Arc<dyn UploadMarkerStore>,
    opener: Arc<dyn LinkOpener>,
    events: broadcast::Sender<RouterEvent>,
}

impl RouterService {
    /// Create a new router service.
    pub fn new(
        selector: Arc<dyn AccountSelector>,
        uploader: Arc<dyn Uploader>,
        replacement: Arc<dyn ReplacementProtocol>,
        markers: Arc<dyn UploadMarkerStore>,
        opener: Arc<dyn LinkOpener>,
    ) -> Self {
        let (events, _) = broadcast::channel(EVENT_CHANNEL_CAPACITY);
        Self { selector, uploader, replacement, markers, opener, events }
    }

    /// Subscribe to routing lifecycle events.
    pub fn subscribe(&self) -> broadcast::Receiver<RouterEvent> {
        self.events.subscribe()
    }

    /// Accept a file for routing on its own task.
    ///
    /// Returns `false` (emitting nothing) when the file is unrecognized;
    /// `true` when a routing flow was started. The flow's outcome arrives on
    /// the event stream.
    pub fn handle_file(self: Arc<Self>, path: PathBuf) -> bool {
        let Some(kind) = FileKind::classify(&path) else {
            debug!(path = %path.display(), "ignoring unrecognized file");
            return false;
        };

        tokio::spawn(async move {
            self.process(&path, kind).await;
        });
        true
    }

    /// Route a file inline, awaiting its terminal event.
    ///
    /// Same classification contract as [`handle_file`](Self::handle_file);
    /// intended for callers that process files sequentially.
    pub async fn route(&self, path: &Path) -> bool {
        let Some(kind) = FileKind::classify(path) else {
            debug!(path = %path.display(), "ignoring unrecognized file");
            return false;
        };

        self.process(path, kind).await;
        true
    }

    /// Drive one classified file to a terminal event.
    pub async fn process(&self, path: &Path, kind: FileKind) {
        match ConversionTarget::for_kind(kind) {
            None => self.open_shortcut(path).await,
            Some(target) => self.upload_and_replace(path, target).await,
        }
    }

    async fn open_shortcut(&self, path: &Path) {
        self.emit(RouterEvent::Started("Opening remote document".to_string()));

        let outcome = self
            .replacement
            .load_shortcut(path)
            .and_then(|link| self.opener.open_url(&link.document_url).map(|()| link.document_url));

        match outcome {
            Ok(url) => self.emit(RouterEvent::Finished(format!("Opened {url}"))),
            Err(err) => self.fail(err),
        }
    }

    async fn upload_and_replace(&self, path: &Path, target: ConversionTarget) {
        let file_name =
            path.file_name().and_then(|name| name.to_str()).unwrap_or("file").to_string();

        // A file that already carries an upload marker was routed before;
        // open the existing remote document instead of uploading again.
        if let Some(marker) = self.markers.load(path) {
            self.emit(RouterEvent::Started(format!("Opening {file_name} remotely")));
            match self.opener.open_url(&marker.document_url) {
                Ok(()) => {
                    self.emit(RouterEvent::Finished(format!("Opened {}", marker.document_url)));
                }
                Err(err) => self.fail(err),
            }
            return;
        }

        self.emit(RouterEvent::Started(format!("Uploading {file_name}")));

        match self.run_upload(path, target, &file_name).await {
            Ok(url) => self.emit(RouterEvent::Finished(format!("Rerouted {file_name} to {url}"))),
            Err(err) => self.fail(err),
        }
    }

    async fn run_upload(
        &self,
        path: &Path,
        target: ConversionTarget,
        file_name: &str,
    ) -> Result<String> {
        let account = self.selector.select_account(file_name).await?;
        let uploaded = self.uploader.upload_and_convert(path, target, &account).await?;

        self.replacement.apply(path, &uploaded, &account, target).await?;
        self.opener.open_url(&uploaded.remote_view_url)?;

        Ok(uploaded.remote_view_url)
    }

    fn fail(&self, err: DocRouterError) {
        match err {
            // User cancellation is a silent no-op for logging purposes; the
            // event still carries it so the surface can decide.
            DocRouterError::Cancelled => debug!("routing flow cancelled by user"),
            ref other => warn!(error = %other, "routing flow failed"),
        }
        self.emit(RouterEvent::Failed(err));
    }

    fn emit(&self, event: RouterEvent) {
        // Send only fails when nobody is subscribed, which is fine.
        let _ = self.events.send(event);
    }
}

#[cfg(test)]
mod tests {
    //! Unit tests for routing::service.
    use std::path::PathBuf;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Mutex;

    use async_trait::async_trait;
    use chrono::Utc;
    use docrouter_domain::{
        DocumentMarker, GoogleAccount, ReplacementOutcome, ShortcutFile, TokenSet, UploadResult,
    };

    use super::*;

    fn test_account() -> GoogleAccount {
        GoogleAccount::new(
            "sub-1".to_string(),
            "user@example.com".to_string(),
            TokenSet::new("access".to_string(), "refresh".to_string(), 3600),
        )
    }

    fn test_upload_result() -> UploadResult {
        UploadResult {
            remote_id: "abc123".to_string(),
            remote_view_url: "https://docs.example/abc123".to_string(),
        }
    }

    struct StubSelector {
        outcome: Result<GoogleAccount>,
    }

    #[async_trait]
    impl AccountSelector for StubSelector {
        async fn select_account(&self, _file_name: &str) -> Result<GoogleAccount> {
            self.outcome.clone()
        }
    }

    struct StubUploader {
        calls: AtomicUsize,
        outcome: Result<UploadResult>,
    }

    #[async_trait]
    impl Uploader for StubUploader {
        async fn upload_and_convert(
            &self,
            _path: &std::path::Path,
            _target: ConversionTarget,
            _account: &GoogleAccount,
        ) -> Result<UploadResult> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            self.outcome.clone()
        }
    }

    #[derive(Default)]
    struct StubReplacement {
        applied: Mutex<Vec<PathBuf>>,
        shortcut: Option<ShortcutFile>,
    }

    #[async_trait]
    impl ReplacementProtocol for StubReplacement {
        async fn apply(
            &self,
            original: &std::path::Path,
            _remote: &UploadResult,
            _account: &GoogleAccount,
            _target: ConversionTarget,
        ) -> Result<ReplacementOutcome> {
            self.applied.lock().unwrap().push(original.to_path_buf());
            Ok(ReplacementOutcome {
                trashed_path: original.to_path_buf(),
                shortcut_path: original.with_extension("xlsx.gdoc"),
            })
        }

        async fn restore(&self, _shortcut: &std::path::Path) -> Result<PathBuf> {
            Err(DocRouterError::Internal("not used".to_string()))
        }

        fn load_shortcut(&self, path: &std::path::Path) -> Result<ShortcutFile> {
            self.shortcut
                .clone()
                .ok_or_else(|| DocRouterError::InvalidShortcut(path.display().to_string()))
        }
    }

    #[derive(Default)]
    struct StubMarkers {
        marker: Option<DocumentMarker>,
    }

    impl UploadMarkerStore for StubMarkers {
        fn load(&self, _path: &std::path::Path) -> Option<DocumentMarker> {
            self.marker.clone()
        }

        fn save(&self, _path: &std::path::Path, _marker: &DocumentMarker) -> Result<()> {
            Ok(())
        }

        fn clear(&self, _path: &std::path::Path) {}
    }

    #[derive(Default)]
    struct StubOpener {
        opened: Mutex<Vec<String>>,
    }

    impl LinkOpener for StubOpener {
        fn open_url(&self, url: &str) -> Result<()> {
            self.opened.lock().unwrap().push(url.to_string());
            Ok(())
        }
    }

    struct Fixture {
        service: Arc<RouterService>,
        uploader: Arc<StubUploader>,
        replacement: Arc<StubReplacement>,
        opener: Arc<StubOpener>,
    }

    fn fixture(
        selector_outcome: Result<GoogleAccount>,
        uploader_outcome: Result<UploadResult>,
        marker: Option<DocumentMarker>,
        shortcut: Option<ShortcutFile>,
    ) -> Fixture {
        let uploader =
            Arc::new(StubUploader { calls: AtomicUsize::new(0), outcome: uploader_outcome });
        let replacement = Arc::new(StubReplacement { applied: Mutex::new(Vec::new()), shortcut });
        let opener = Arc::new(StubOpener::default());

        let service = Arc::new(RouterService::new(
            Arc::new(StubSelector { outcome: selector_outcome }),
            uploader.clone(),
            replacement.clone(),
            Arc::new(StubMarkers { marker }),
            opener.clone(),
        ));

        Fixture { service, uploader, replacement, opener }
    }

    fn drain(rx: &mut broadcast::Receiver<RouterEvent>) -> Vec<RouterEvent> {
        let mut events = Vec::new();
        while let Ok(event) = rx.try_recv() {
            events.push(event);
        }
        events
    }

    /// Validates `RouterService::route` behavior for the unrecognized file
    /// scenario.
    ///
    /// Assertions:
    /// - Ensures `route` returns false for an unsupported extension.
    /// - Ensures no event is emitted (silent ignore).
    #[tokio::test]
    async fn unrecognized_file_is_silently_ignored() {
        let fx = fixture(Ok(test_account()), Ok(test_upload_result()), None, None);
        let mut rx = fx.service.subscribe();

        let accepted = fx.service.route(Path::new("archive.zip")).await;

        assert!(!accepted);
        assert!(drain(&mut rx).is_empty());
    }

    /// Validates `RouterService::route` behavior for the happy-path upload
    /// scenario.
    ///
    /// Assertions:
    /// - Confirms events arrive in Started → Finished order.
    /// - Confirms the uploader ran exactly once and the replacement was
    ///   applied to the routed path.
    /// - Confirms the remote link was opened.
    #[tokio::test]
    async fn spreadsheet_uploads_and_replaces() {
        let fx = fixture(Ok(test_account()), Ok(test_upload_result()), None, None);
        let mut rx = fx.service.subscribe();

        let accepted = fx.service.route(Path::new("report.xlsx")).await;
        assert!(accepted);

        let events = drain(&mut rx);
        assert!(matches!(&events[0], RouterEvent::Started(msg) if msg.contains("report.xlsx")));
        assert!(matches!(&events[1], RouterEvent::Finished(_)));

        assert_eq!(fx.uploader.calls.load(Ordering::SeqCst), 1);
        assert_eq!(
            fx.replacement.applied.lock().unwrap().as_slice(),
            &[PathBuf::from("report.xlsx")]
        );
        assert_eq!(
            fx.opener.opened.lock().unwrap().as_slice(),
            &["https://docs.example/abc123".to_string()]
        );
    }

    /// Validates failure mapping for the no-accounts scenario.
    ///
    /// Assertions:
    /// - Confirms the terminal event is `Failed(NoAccounts)`.
    /// - Ensures the uploader never ran.
    #[tokio::test]
    async fn no_accounts_fails_with_distinct_kind() {
        let fx =
            fixture(Err(DocRouterError::NoAccounts), Ok(test_upload_result()), None, None);
        let mut rx = fx.service.subscribe();

        fx.service.route(Path::new("report.xlsx")).await;

        let events = drain(&mut rx);
        assert!(matches!(&events[1], RouterEvent::Failed(DocRouterError::NoAccounts)));
        assert_eq!(fx.uploader.calls.load(Ordering::SeqCst), 0);
    }

    /// Validates failure mapping for the user-cancelled selection scenario.
    ///
    /// Assertions:
    /// - Confirms the terminal event is `Failed(Cancelled)`.
    #[tokio::test]
    async fn cancelled_selection_is_non_alarming_failure() {
        let fx = fixture(Err(DocRouterError::Cancelled), Ok(test_upload_result()), None, None);
        let mut rx = fx.service.subscribe();

        fx.service.route(Path::new("notes.docx")).await;

        let events = drain(&mut rx);
        assert!(matches!(&events[1], RouterEvent::Failed(DocRouterError::Cancelled)));
    }

    /// Validates the upload-failure scenario.
    ///
    /// Assertions:
    /// - Confirms the terminal event carries the upload error.
    /// - Ensures the replacement protocol never ran.
    #[tokio::test]
    async fn failed_upload_never_touches_the_original() {
        let fx = fixture(
            Ok(test_account()),
            Err(DocRouterError::UploadFailed("status 500".to_string())),
            None,
            None,
        );
        let mut rx = fx.service.subscribe();

        fx.service.route(Path::new("report.xlsx")).await;

        let events = drain(&mut rx);
        assert!(matches!(&events[1], RouterEvent::Failed(DocRouterError::UploadFailed(_))));
        assert!(fx.replacement.applied.lock().unwrap().is_empty());
    }

    /// Validates the prior-upload marker short-circuit scenario.
    ///
    /// Assertions:
    /// - Confirms the marker's URL was opened without any upload.
    #[tokio::test]
    async fn marker_short_circuits_to_remote_link() {
        let marker = DocumentMarker {
            document_url: "https://docs.example/existing".to_string(),
            account_id: "sub-1".to_string(),
            account_email: "user@example.com".to_string(),
            uploaded_at: Utc::now(),
            tool_version: "0.1.0".to_string(),
        };
        let fx = fixture(Ok(test_account()), Ok(test_upload_result()), Some(marker), None);
        let mut rx = fx.service.subscribe();

        fx.service.route(Path::new("report.xlsx")).await;

        let events = drain(&mut rx);
        assert!(matches!(&events[1], RouterEvent::Finished(_)));
        assert_eq!(fx.uploader.calls.load(Ordering::SeqCst), 0);
        assert_eq!(
            fx.opener.opened.lock().unwrap().as_slice(),
            &["https://docs.example/existing".to_string()]
        );
    }

    /// Validates the shortcut-opening scenario.
    ///
    /// Assertions:
    /// - Confirms the shortcut's remote URL was opened.
    /// - Confirms the flow finished.
    #[tokio::test]
    async fn shortcut_opens_remote_document() {
        let shortcut = ShortcutFile {
            document_url: "https://docs.example/linked".to_string(),
            original_filename: "report.xlsx".to_string(),
            uploaded_at: Utc::now(),
            tool_version: "0.1.0".to_string(),
            account_id: "sub-1".to_string(),
            account_email: "user@example.com".to_string(),
            original_content_hash: None,
            original_type_hint: None,
            original_size_bytes: None,
            original_metadata: None,
        };
        let fx = fixture(Ok(test_account()), Ok(test_upload_result()), None, Some(shortcut));
        let mut rx = fx.service.subscribe();

        fx.service.route(Path::new("report.xlsx.gdoc")).await;

        let events = drain(&mut rx);
        assert!(matches!(&events[1], RouterEvent::Finished(_)));
        assert_eq!(
            fx.opener.opened.lock().unwrap().as_slice(),
            &["https://docs.example/linked".to_string()]
        );
    }

    /// Validates `RouterService::handle_file` behavior for the spawned-flow
    /// scenario.
    ///
    /// Assertions:
    /// - Ensures an unrecognized file is rejected synchronously.
    /// - Ensures a recognized file is accepted and reaches a terminal event.
    #[tokio::test]
    async fn handle_file_spawns_flow() {
        let fx = fixture(Ok(test_account()), Ok(test_upload_result()), None, None);
        let mut rx = fx.service.subscribe();

        assert!(!fx.service.clone().handle_file(PathBuf::from("archive.zip")));
        assert!(fx.service.clone().handle_file(PathBuf::from("report.xlsx")));

        let mut saw_terminal = false;
        for _ in 0..2 {
            match rx.recv().await.unwrap() {
                RouterEvent::Finished(_) | RouterEvent::Failed(_) => saw_terminal = true,
                RouterEvent::Started(_) => {}
            }
        }
        assert!(saw_terminal);
    }
}
