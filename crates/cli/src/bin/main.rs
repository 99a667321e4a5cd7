//! Binary entry point for the loginsrv-check CLI.

use loginsrv_cli::cmd::App;
use tracing_subscriber::EnvFilter;

fn main() {
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();
    if let Err(e) = App::run() {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }
}
