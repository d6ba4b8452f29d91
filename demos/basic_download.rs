//! Minimal downloader usage: pass a document code or URL on the command
//! line, watch progress events on stderr, get a PDF.
//!
//! ```sh
//! cargo run --example basic_download -- 3995949474894
//! ```

use doc88_dl::{Config, DocDownloader, Event, FailureMode};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "doc88_dl=info".into()),
        )
        .init();

    let input = std::env::args()
        .nth(1)
        .ok_or("usage: basic_download <p_code or document URL>")?;

    let mut config = Config::default();
    // Abort on the first broken page; switch to BestEffort to keep going.
    config.download.failure_mode = FailureMode::FailFast;

    let downloader = DocDownloader::new(config)?;

    let mut events = downloader.subscribe();
    tokio::spawn(async move {
        while let Ok(event) = events.recv().await {
            match event {
                Event::MetadataResolved {
                    name, total_pages, ..
                } => eprintln!("{name}: {total_pages} pages"),
                Event::PageComplete {
                    completed, total, ..
                } => eprintln!("  {completed}/{total}"),
                Event::PageFailed { index, error } => {
                    eprintln!("  page {index} failed: {error}");
                }
                _ => {}
            }
        }
    });

    let artifact = downloader.download(&input).await?;
    println!("{}", artifact.display());
    Ok(())
}
