///! Logging setup
///! Console output plus an optional daily-rotated JSON log file

use std::io;

use tracing_appender::{non_blocking, non_blocking::WorkerGuard, rolling};
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter, Layer, Registry};

use crate::config::LoggingConfig;

const LOG_FILE_NAME: &str = "ovirt-exporter.log";

type BoxedLayer = Box<dyn Layer<Registry> + Send + Sync>;

impl LoggingConfig {
    /// Install the global subscriber
    ///
    /// `RUST_LOG` takes precedence over the configured level. The returned
    /// guard flushes the log file and must be kept alive until exit.
    pub fn init(&self) -> Result<Option<WorkerGuard>, Box<dyn std::error::Error + Send + Sync>> {
        let env_filter = EnvFilter::try_from_default_env().or_else(|_| EnvFilter::try_new(&self.level))?;

        let mut layers: Vec<BoxedLayer> = Vec::new();

        let console = fmt::layer().with_target(true).with_level(true).with_writer(io::stdout);
        if self.json_format {
            layers.push(console.json().boxed());
        } else {
            layers.push(console.with_ansi(true).boxed());
        }

        let mut guard = None;
        if self.file_logging_enabled {
            let (writer, file_guard) = non_blocking(rolling::daily(&self.log_dir, LOG_FILE_NAME));
            layers.push(
                fmt::layer()
                    .with_target(true)
                    .with_thread_ids(true)
                    .with_ansi(false)
                    .json()
                    .with_writer(writer)
                    .boxed(),
            );
            guard = Some(file_guard);
        }

        tracing_subscriber::registry().with(layers).with(env_filter).try_init()?;

        tracing::info!("Logging initialized - level: {}", self.level);
        Ok(guard)
    }

    /// Same configuration with the level forced to debug
    pub fn with_debug(mut self, debug: bool) -> Self {
        if debug {
            self.level = "debug".to_string();
        }
        self
    }
}
