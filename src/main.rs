mod config;
mod db;
mod error;
mod models;
mod scrape;
#[cfg(test)]
mod test_support;
mod web;

use config::Config;
use error::Result;
use web::AppState;

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize logging (info and above unless RUST_LOG says otherwise)
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive(tracing::Level::INFO.into()),
        )
        .with_writer(std::io::stderr)
        .init();

    // Parse command line arguments
    let args: Vec<String> = std::env::args().collect();

    // Load configuration
    let config = Config::load()?;

    // Check for --scrape flag (headless scrape)
    let headless_scrape = args.len() >= 2 && args[1] == "--scrape";

    let state = AppState::new(config).await?;

    // If headless scrape, scrape once and exit
    if headless_scrape {
        let report = scrape::run_scrape(
            &state.fetcher,
            &state.repository,
            state.config.scrape_concurrency,
        )
        .await?;
        println!(
            "Scraped {}: found {}, saved {}, failed {}",
            state.fetcher.source_url(),
            report.found,
            report.saved,
            report.failed
        );
        return Ok(());
    }

    let addr = state.config.bind_addr();
    let listener = tokio::net::TcpListener::bind(&addr).await?;
    tracing::info!("App listening on {}", addr);

    axum::serve(listener, web::router(state)).await?;

    Ok(())
}
