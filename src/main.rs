use std::io::{self, Write};
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use email_harvester::config::{ConfigManager, FileConfigManager};
use email_harvester::fetch::HttpFetcher;
use email_harvester::harvest::HarvestOrchestrator;
use email_harvester::report::{FileReportWriter, ReportSink};

#[tokio::main]
async fn main() -> email_harvester::error::Result<()> {
    tracing_subscriber::fmt::init();

    let config_manager = FileConfigManager::new(PathBuf::from("config.toml"));
    let config = config_manager.load_config().await?;

    // query from the first argument, or an interactive prompt
    let query = match std::env::args().nth(1) {
        Some(query) => query,
        None => {
            print!("Enter your search query (e.g. dentists in Dubai): ");
            io::stdout().flush()?;
            let mut line = String::new();
            io::stdin().read_line(&mut line)?;
            line.trim().to_string()
        }
    };

    tracing::info!("Starting Email Harvester");

    let fetcher = Arc::new(HttpFetcher::new(Duration::from_secs(
        config.stealth.request_timeout_secs,
    )));
    let orchestrator = HarvestOrchestrator::new(&config, fetcher)?;

    // ctrl-c stops launching new work at the next boundary
    let cancel = orchestrator.cancel_handle();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            tracing::warn!("Ctrl-C received, stopping after in-flight work");
            cancel.cancel();
        }
    });

    let (results, report) = orchestrator.run(&query).await?;

    if results.is_empty() {
        tracing::warn!("No emails found. Try a broader search query.");
    }

    let writer = FileReportWriter::new(config.output.directory.clone(), &config.output.format)?;
    let path = writer.persist(&report, &results).await?;
    tracing::info!(
        "{} unique emails saved to {}",
        report.total_emails,
        path.display()
    );

    Ok(())
}
