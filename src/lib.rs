pub mod catalog; // Classes, builds, analysis context
pub mod cli;
pub mod commands;
pub mod config;
pub mod core_state;
pub mod journal; // Scan history
pub mod pipeline; // Classify → analyze/compare
pub mod render;
pub mod share;
pub mod store; // Local key-value persistence

use clap::Parser;
use tracing_subscriber::EnvFilter;

/// Install the global subscriber. Logs go to stderr so `--json` output stays parseable.
pub fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new(config::default_log_filter())),
        )
        .with_writer(std::io::stderr)
        .try_init();
}

/// Parse the command line, run it, print the reply. Returns the exit code.
pub fn run() -> i32 {
    init_tracing();
    tracing::debug!("{} starting v{}", config::APP_NAME, config::APP_VERSION);

    let cli = cli::Cli::parse();
    match cli::dispatch(cli) {
        Ok(reply) => {
            if reply.text.ends_with('\n') {
                print!("{}", reply.text);
            } else {
                println!("{}", reply.text);
            }
            reply.code
        }
        Err(message) => {
            eprintln!("Error: {message}");
            1
        }
    }
}
