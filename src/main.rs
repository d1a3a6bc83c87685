//! Ethereum Vanity Key Search CLI
//!
//! Usage:
//!   vanity-search -p dead -s beef                  # 0xdead...beef
//!   vanity-search --repeated-prefix 5 -l 10        # 0xaaaaa..., 0x11111..., ...
//!   vanity-search -m key-mutation -p 0xace -s 000  # 16 key variants per seed
//!   vanity-search -m adjacent-run -n 6             # 6 identical leading chars

use std::process;
use std::sync::Arc;

use clap::Parser;
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

use vanity_search::worker::format_number;
use vanity_search::{Config, Coordinator, SearchState, SearchSummary};

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(
            log_filter(std::env::var(EnvFilter::DEFAULT_ENV).ok().as_deref()),
        )
        .init();

    let config = Config::parse();

    let settings = match config.settings() {
        Ok(settings) => settings,
        Err(e) => {
            eprintln!("Configuration error: {}", e);
            process::exit(1);
        }
    };

    println!("Ethereum Vanity Key Search");
    println!("==========================");
    println!("Mode:       {}", settings.spec.mode());
    println!("Patterns:   {}", settings.spec.describe());
    println!("Difficulty: {}", settings.spec.difficulty_description());
    println!("Workers:    {}", settings.workers);
    println!("Limit:      {} match(es)", settings.limit);
    println!("Output:     {}", settings.output.display());
    println!();

    let output = settings.output.clone();
    let coordinator = Coordinator::new(settings);
    ctrlc_handler(coordinator.state());

    println!("Searching... (Press Ctrl+C to stop)\n");

    match coordinator.run() {
        Ok(summary) => {
            print_summary(&summary);
            println!("Results saved to {}", output.display());
        }
        Err(e) => {
            error!("search aborted: {}", e);
            eprintln!("Fatal: {}", e);
            process::exit(1);
        }
    }
}

fn print_summary(summary: &SearchSummary) {
    let secs = summary.elapsed.as_secs_f64();
    let rate = if secs > 0.0 {
        summary.generated as f64 / secs
    } else {
        0.0
    };

    println!("\n--- Final Statistics ---");
    println!("Total keys generated: {}", format_number(summary.generated));
    println!("Total matches found:  {}", summary.found);
    println!("Matches saved:        {}", summary.written);
    println!("Time elapsed:         {:.2}s", secs);
    println!("Average speed:        {}/s", format_number(rate as u64));
}

fn ctrlc_handler(state: Arc<SearchState>) {
    ctrlc::set_handler(move || {
        info!("interrupt received, stopping workers");
        state.stop();
    })
    .expect("Error setting Ctrl-C handler");
}

/// Uses `RUST_LOG` as given, falling back to `info` when unset or invalid.
fn log_filter(directives: Option<&str>) -> EnvFilter {
    directives
        .and_then(|d| EnvFilter::try_new(d).ok())
        .unwrap_or_else(|| EnvFilter::new("info"))
}
