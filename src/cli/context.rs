use std::future::Future;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use serde_json::json;

use crate::adapters::console::stderr_console::StderrConsole;
use crate::adapters::navigation::terminal_navigator::TerminalNavigator;
use crate::adapters::session::stored_session::StoredSession;
use crate::adapters::storage::file_kv_store::FileKvStore;
use crate::adapters::transport::reqwest_transport::ReqwestTransport;
use crate::cli::Cli;
use crate::config::app_config::{AppConfig, validate_base_url};
use crate::core::errors::{Result, VerseError};
use crate::core::models::log_entry::LogLevel;
use crate::core::services::api_client::BackendApi;
use crate::core::services::logger::{Logger, meta};
use crate::core::services::request_pipeline::RequestPipeline;

/// Everything a command needs, wired once per invocation.
pub struct AppContext {
    pub data_dir: PathBuf,
    pub base_url: String,
    pub logger: Arc<Logger>,
    pub api: BackendApi<ReqwestTransport>,
    runtime: tokio::runtime::Runtime,
}

impl AppContext {
    /// Resolve the data directory, load the configuration and build the
    /// services on top of it.
    pub fn build(args: &Cli) -> Result<Self> {
        let data_dir = resolve_data_dir(args.data_dir.as_deref())?;
        let config = AppConfig::load(&data_dir)?;

        let base_url = match &args.base_url {
            Some(url) => {
                validate_base_url(url)?;
                url.clone()
            }
            None => config.api.base_url.clone(),
        };

        let store = Arc::new(FileKvStore::new(
            data_dir.join("storage"),
            config.storage.max_value_bytes,
        ));

        let logger = Arc::new(Logger::new(store.clone(), Arc::new(StderrConsole)));
        logger.set_level(effective_level(args, config.logging.level));
        logger.set_console_enabled(!args.quiet);
        if let Err(e) = logger.restore() {
            logger.warn(
                "Could not restore previous logs",
                meta(json!({ "error": e.to_string() })),
            );
        }

        let transport = ReqwestTransport::new(&base_url, config.timeout())?;
        let pipeline = RequestPipeline::new(
            transport,
            Arc::new(StoredSession::new(store)),
            Arc::new(TerminalNavigator),
        );
        let api = BackendApi::new(pipeline, Arc::clone(&logger));

        let runtime = tokio::runtime::Builder::new_current_thread()
            .enable_all()
            .build()
            .map_err(|e| VerseError::Transport {
                reason: format!("Failed to create async runtime: {e}"),
            })?;

        logger.info(
            "Application starting",
            meta(json!({
                "version": env!("CARGO_PKG_VERSION"),
                "base_url": base_url,
            })),
        );

        Ok(Self {
            data_dir,
            base_url,
            logger,
            api,
            runtime,
        })
    }

    /// Drive a backend call to completion.
    pub fn block_on<F: Future>(&self, future: F) -> F::Output {
        self.runtime.block_on(future)
    }

    /// Fail early when a command needs a session and none is stored.
    pub fn require_session(&self) -> Result<()> {
        if self.api.pipeline().has_session() {
            Ok(())
        } else {
            self.logger.debug("Blocked: no stored session", None);
            Err(VerseError::NotLoggedIn)
        }
    }
}

impl Drop for AppContext {
    fn drop(&mut self) {
        // Pending archive writes must land before the process exits.
        self.logger.flush();
    }
}

/// `--data-dir` / `VERSE_DATA_DIR` when given, else the platform data
/// directory.
fn resolve_data_dir(custom: Option<&Path>) -> Result<PathBuf> {
    if let Some(dir) = custom {
        return Ok(dir.to_path_buf());
    }
    dirs::data_dir()
        .map(|d| d.join("verse"))
        .ok_or_else(|| VerseError::InvalidConfig {
            detail: "Could not determine a data directory. Pass --data-dir or set VERSE_DATA_DIR."
                .into(),
        })
}

/// `--verbose` wins over `--log-level`, which wins over the config file.
fn effective_level(args: &Cli, configured: LogLevel) -> LogLevel {
    if args.verbose {
        LogLevel::Debug
    } else {
        args.log_level.unwrap_or(configured)
    }
}
