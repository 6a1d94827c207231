pub mod api;
pub mod config;
pub mod pipeline;

use std::sync::Arc;

use tracing_subscriber::EnvFilter;

use crate::api::AppState;
use crate::config::AppConfig;

/// Install the global fmt subscriber. `RUST_LOG` wins over the default filter.
pub fn init_tracing() {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new(config::default_log_filter())),
        )
        .init();
}

/// Build the production pipeline from `config` and serve until Ctrl-C.
pub async fn run(config: AppConfig) -> Result<(), String> {
    tracing::info!(
        "{} starting v{}",
        config::APP_NAME,
        config::APP_VERSION
    );

    let pipeline = pipeline::processor::build_pipeline(&config).map_err(|e| e.to_string())?;
    let state = AppState::new(Arc::new(pipeline)).with_max_upload_bytes(config.max_upload_bytes);

    api::serve_until_ctrl_c(state, config.bind_addr).await
}
