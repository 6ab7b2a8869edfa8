//! # Session
//!
//! Everything one CLI invocation works with, built once before the command
//! runs.
//!
//! ## Startup Sequence
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  1. SuiteConfig::load (--config, suite.toml, SUITE_* env)               │
//! │  2. CLI flag overrides (--data-dir, --output-dir, --offline)            │
//! │  3. Open the key/value store (FileStore, or MemoryStore --ephemeral)    │
//! │  4. CompanyProfile::load + seeded AppState (+ --records file)           │
//! │  5. DocumentService with an AssetResolver using the fetch timeout       │
//! │  6. Ctrl+C cancels in-flight image fetches                              │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use std::path::PathBuf;
use std::sync::Arc;

use suite_docs::{AssetResolver, DocumentService, HttpImageFetcher};
use suite_store::{
    AppState, CompanyProfile, FileStore, KeyValueStore, MemoryStore, RecordsFile, SuiteConfig,
};
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

use crate::error::CliResult;

/// Options that shape the session, independent of the command.
#[derive(Debug, Clone, Default)]
pub struct SessionOptions {
    pub config: Option<PathBuf>,
    pub records: Option<PathBuf>,
    pub data_dir: Option<PathBuf>,
    pub output_dir: Option<PathBuf>,
    pub offline: bool,
    pub ephemeral: bool,
}

/// Loaded configuration, application state and the document pipeline.
pub struct Session {
    pub config: SuiteConfig,
    pub state: AppState,
    pub documents: DocumentService,
    pub cancel: CancellationToken,
}

impl Session {
    pub async fn open(options: SessionOptions) -> CliResult<Self> {
        let mut config = match &options.config {
            Some(path) => SuiteConfig::load(Some(path.clone()))?,
            None => SuiteConfig::load_or_default(None),
        };

        if let Some(dir) = options.data_dir {
            config.storage.data_dir = dir;
        }
        if let Some(dir) = options.output_dir {
            config.render.output_dir = dir;
        }
        if options.offline {
            config.render.remote_images = false;
        }

        let store: Arc<dyn KeyValueStore> = if options.ephemeral {
            debug!("Using in-memory store");
            Arc::new(MemoryStore::new())
        } else {
            Arc::new(FileStore::open(&config.storage.data_dir)?)
        };

        let mut state = AppState::seeded(CompanyProfile::load(store));
        if let Some(path) = &options.records {
            state.merge(RecordsFile::read(path).await?);
        }

        let resolver = AssetResolver::new(Arc::new(HttpImageFetcher::new()?), config.fetch_timeout())
            .with_remote(config.render.remote_images);
        let documents = DocumentService::new(resolver, config.render.output_dir.clone());

        let cancel = CancellationToken::new();
        spawn_interrupt_watcher(cancel.clone());

        info!(
            data_dir = %config.storage.data_dir.display(),
            output_dir = %config.render.output_dir.display(),
            remote_images = config.render.remote_images,
            "Session ready"
        );

        Ok(Session {
            config,
            state,
            documents,
            cancel,
        })
    }
}

/// Cancels pending work on Ctrl+C.
fn spawn_interrupt_watcher(cancel: CancellationToken) {
    tokio::spawn(async move {
        match tokio::signal::ctrl_c().await {
            Ok(()) => {
                warn!("Interrupted, cancelling pending image fetches");
                cancel.cancel();
            }
            Err(e) => debug!(error = %e, "Ctrl+C handler unavailable"),
        }
    });
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_ephemeral_offline_session() {
        let dir = tempfile::tempdir().unwrap();
        let session = Session::open(SessionOptions {
            output_dir: Some(dir.path().to_path_buf()),
            offline: true,
            ephemeral: true,
            ..SessionOptions::default()
        })
        .await
        .unwrap();

        assert!(!session.config.render.remote_images);
        assert_eq!(session.documents.output_dir(), dir.path());
        assert_eq!(session.state.quotations.len(), 2);
        assert_eq!(session.state.company.details().name, "Streamline Suite");
    }

    #[tokio::test]
    async fn test_profile_persists_in_data_dir() {
        let dir = tempfile::tempdir().unwrap();
        let options = SessionOptions {
            data_dir: Some(dir.path().join("data")),
            offline: true,
            ..SessionOptions::default()
        };

        let mut session = Session::open(options.clone()).await.unwrap();
        session
            .state
            .company
            .update(suite_store::CompanyUpdate {
                name: Some("Acme Ltd".to_string()),
                ..Default::default()
            })
            .unwrap();

        let reopened = Session::open(options).await.unwrap();
        assert_eq!(reopened.state.company.details().name, "Acme Ltd");
    }
}
