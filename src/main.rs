use anyhow::{Context, Result};
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;
use tempo_tarifs::config::Config;
use tempo_tarifs::logging::{get_logger, init_logging};
use tempo_tarifs::tempo::{HttpTransport, ReqwestTransport};
use tempo_tarifs::{TempoError, TempoIntegration};

#[tokio::main]
async fn main() -> Result<()> {
    // Explicit path as first argument, otherwise the default search paths
    let (config, config_path) = match std::env::args().nth(1).map(PathBuf::from) {
        Some(path) => {
            let config = Config::from_file(&path).with_context(|| {
                format!("Failed to load configuration from {}", path.display())
            })?;
            (config, Some(path))
        }
        None => (
            Config::load().context("Failed to load configuration")?,
            Config::locate().map(PathBuf::from),
        ),
    };
    config.validate().context("Invalid configuration")?;

    init_logging(&config.logging).context("Failed to initialize logging")?;
    let logger = get_logger("main");
    logger.info(&format!(
        "Tempo Tarifs {} starting up",
        env!("CARGO_PKG_VERSION")
    ));

    let transport: Arc<dyn HttpTransport> = Arc::new(ReqwestTransport::with_default_client()?);
    let retry = Duration::from_secs(config.startup_retry_seconds.max(1));

    // Nothing answering at startup is not fatal; keep trying until interrupted
    let integration = loop {
        tokio::select! {
            setup = TempoIntegration::setup(config.clone(), transport.clone()) => match setup {
                Ok(integration) => break Arc::new(integration),
                Err(TempoError::NotReady { message }) => {
                    logger.warn(&format!("Setup not ready ({}); retrying in {:?}", message, retry));
                }
                Err(e) => return Err(anyhow::anyhow!("Setup failed: {}", e)),
            },
            _ = tokio::signal::ctrl_c() => {
                logger.info("Interrupted before setup completed");
                return Ok(());
            }
        }
        tokio::select! {
            _ = tokio::time::sleep(retry) => {}
            _ = tokio::signal::ctrl_c() => {
                logger.info("Interrupted before setup completed");
                return Ok(());
            }
        }
    };

    #[cfg(feature = "web")]
    let web_task = {
        let integration = integration.clone();
        let host = config.web.host.clone();
        let port = config.web.port;
        let web_logger = get_logger("web");
        tokio::spawn(async move {
            if let Err(e) = tempo_tarifs::web::serve(integration, config_path, &host, port).await {
                web_logger.error(&format!("Web server error: {}", e));
            }
        })
    };

    tokio::signal::ctrl_c()
        .await
        .context("Failed to listen for shutdown signal")?;
    logger.info("Shutdown signal received");

    #[cfg(feature = "web")]
    web_task.abort();
    integration.unload().await;
    logger.info("Shutdown complete");
    Ok(())
}
