use report_simplifier::config::AppConfig;

#[tokio::main]
async fn main() {
    report_simplifier::init_tracing();

    let config = match AppConfig::from_env() {
        Ok(config) => config,
        Err(e) => {
            tracing::error!("Configuration error: {e}");
            std::process::exit(1);
        }
    };

    if let Err(e) = report_simplifier::run(config).await {
        tracing::error!("Report simplifier failed: {e}");
        std::process::exit(1);
    }
}
