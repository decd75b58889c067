use clap::Parser;
use tracing_subscriber::EnvFilter;

use try_cli::Cli;

/// Filter env var; falls back to `RUST_LOG`.
const LOG_ENV: &str = "TRY_LOG";

fn init_tracing(verbose: bool) {
    let filter = if verbose {
        EnvFilter::new("try_cli=debug")
    } else {
        dotenvy::var(LOG_ENV)
            .or_else(|_| dotenvy::var("RUST_LOG"))
            .ok()
            .and_then(|directives| EnvFilter::try_new(directives).ok())
            .unwrap_or_else(|| EnvFilter::new("warn"))
    };
    // stdout carries only the shell line, so logs always go to stderr.
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .try_init();
}

#[tokio::main]
async fn main() {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    if let Err(e) = try_cli::run(cli).await {
        eprintln!("error: {e:#}");
        std::process::exit(1);
    }
}
