//! Window system demo binary.
//!
//! ```bash
//! cargo run -p ui-client
//! UI_DEMO_SLOW_LATENCY_MS=200 RUST_LOG=ui=debug cargo run -p ui-client
//! ```

use anyhow::Result;
use ui_client::{ClientConfig, demo, logging};
use ui_content::ContentFactory;
use ui_runtime::UiRuntime;

#[tokio::main]
async fn main() -> Result<()> {
    // Load .env file if it exists (silently ignore if not found)
    let _ = dotenvy::dotenv();

    let config = ClientConfig::from_env();
    let _guard = logging::setup_logging(config.session_id.as_deref(), config.log_to_stderr)?;

    let factory = ContentFactory::new(&config.data_dir);
    let catalog = factory.load_catalog()?;
    let layout = factory.load_layout()?;
    tracing::info!(data_dir = %factory.data_dir().display(), kinds = catalog.len(), "content loaded");

    let runtime = UiRuntime::builder()
        .config(config.ui.clone().with_base_layout(layout))
        .catalog(catalog)
        .loader(demo::demo_loader(&config))
        .build()?;
    let handle = runtime.handle();
    let logger = demo::spawn_event_logger(&handle);

    let snapshot = demo::run_scenario(&handle).await?;
    println!("{}", serde_json::to_string_pretty(&snapshot)?);

    drop(handle);
    runtime.shutdown().await?;
    logger.await?;

    tracing::info!("demo shutdown complete");
    Ok(())
}
