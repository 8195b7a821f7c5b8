#[cfg(feature = "http_api")]
#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    use section_scheduler::{ServiceConfig, http_api};
    use tracing::info;

    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .init();

    let config = ServiceConfig::from_env()?;
    let addr = config.socket_addr()?;
    let catalog = config.load_catalog()?;
    info!(
        courses = catalog.course_count(),
        term = catalog.term_label().unwrap_or_default(),
        "catalog ready"
    );

    info!(%addr, "section-scheduler HTTP API listening");
    let state = http_api::AppState::new(catalog).with_limits(config.limits);
    http_api::serve(addr, state).await?;
    Ok(())
}

#[cfg(not(feature = "http_api"))]
fn main() {
    eprintln!("Rebuild with the `http_api` feature to enable the HTTP server.");
}
