// src/main.rs
// =============================================================================
// This is the entry point of link-spider.
//
// What happens here:
// 1. Parse command-line arguments using clap
// 2. Set up logging (stderr only, stdout is reserved for records)
// 3. Start the crawl and a writer that prints each record as a JSON line
// 4. Stop when the crawl runs dry or when the parent sends SIGINT/SIGTERM
// 5. Exit with proper code (0 = finished or interrupted, 2 = error)
//
// Rust concepts used:
// - async/await: the crawl workers and the writer run concurrently
// - tokio::select!: whichever finishes first (crawl or signal) wins
// - Result<T, E>: For error handling
// =============================================================================

// Module declarations - tells Rust about our other source files
mod cli;   // src/cli.rs - command-line parsing
mod crawl; // src/crawl/ - frontier, workers and the crawl supervisor
mod page;  // src/page/ - fetching and parsing single pages

use anyhow::{Context, Result};
use clap::Parser;
use cli::Cli;
use crawl::LinkRecord;
use env_logger::Env;
use page::HttpSource;
use tokio::io::AsyncWriteExt;
use tokio::sync::mpsc::{self, UnboundedReceiver};
use url::Url;

#[tokio::main]
async fn main() {
    let exit_code = match run().await {
        Ok(code) => code,
        Err(e) => {
            // If an unexpected error occurred, print it and exit with code 2
            eprintln!("Error: {:#}", e);
            2
        }
    };

    std::process::exit(exit_code);
}

async fn run() -> Result<i32> {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    // Refuse to start on a URL we could never fetch
    Url::parse(&cli.start_url).with_context(|| format!("Invalid URL '{}'", cli.start_url))?;

    let source = HttpSource::new(cli.fetch_config()).context("failed to build HTTP client")?;
    let settings = cli.crawl_settings();

    let (records_tx, records_rx) = mpsc::unbounded_channel();
    let writer = tokio::spawn(write_records(records_rx));

    tokio::select! {
        summary = crawl::crawl(settings, source, records_tx) => {
            log::debug!("{summary:?}");
        }
        signal = shutdown_signal() => {
            // Dropping the crawl future aborts every worker
            log::info!("received {signal}, stopping crawl");
        }
    }

    // The workers held the only senders, so the writer ends after printing
    // whatever is still buffered.
    writer.await.context("record writer panicked")??;

    Ok(0)
}

// RUST_LOG wins if set; otherwise warnings only, or info with --verbose
fn init_logging(verbose: bool) {
    let default_filter = if verbose { "info" } else { "warn" };
    let env = Env::default().filter_or("RUST_LOG", default_filter);
    env_logger::init_from_env(env);
}

// Prints one JSON object per line on stdout
//
// Every line is flushed right away: the parent process reads our output
// line by line while we are still crawling.
async fn write_records(mut records: UnboundedReceiver<LinkRecord>) -> Result<()> {
    let mut stdout = tokio::io::stdout();

    while let Some(record) = records.recv().await {
        let mut line = serde_json::to_vec(&record)?;
        line.push(b'\n');
        stdout.write_all(&line).await?;
        stdout.flush().await?;
    }

    Ok(())
}

// Resolves when the parent asks us to stop
#[cfg(unix)]
async fn shutdown_signal() -> &'static str {
    use tokio::signal::unix::{signal, SignalKind};

    match signal(SignalKind::terminate()) {
        Ok(mut terminate) => tokio::select! {
            _ = ctrl_c() => "SIGINT",
            _ = terminate.recv() => "SIGTERM",
        },
        Err(e) => {
            log::warn!("cannot listen for SIGTERM: {e}");
            ctrl_c().await;
            "SIGINT"
        }
    }
}

#[cfg(not(unix))]
async fn shutdown_signal() -> &'static str {
    ctrl_c().await;
    "Ctrl-C"
}

// If the handler can't be installed we never resolve, instead of
// pretending a signal arrived.
async fn ctrl_c() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        log::warn!("cannot listen for Ctrl-C: {e}");
        std::future::pending::<()>().await;
    }
}

// -----------------------------------------------------------------------------
// NOTES:
//
// 1. Why a channel between the crawl and stdout?
//    - 50 workers writing to stdout directly could interleave half lines
//    - With one writer task, every record is one complete line
//
// 2. Why do logs go to stderr?
//    - env_logger writes to stderr by default
//    - The parent parses stdout as JSON, so nothing else may end up there
//
// 3. What does `??` do?
//    - writer.await gives Result<Result<()>, JoinError>
//    - The first ? handles the task panicking, the second the write failing
// -----------------------------------------------------------------------------
