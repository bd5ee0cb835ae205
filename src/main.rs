//! Serves the demo pages on :8085.
//!
//!   cargo run
//!   curl http://localhost:8085/
//!   curl http://localhost:8085/about

use std::process::ExitCode;

use tracing::error;

#[tokio::main]
async fn main() -> ExitCode {
    tracing_subscriber::fmt::init();
    layered::middleware::install_panic_hook();

    match layered::Server::bind(layered::app::ADDR).serve(layered::app::app()).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            error!("{e}");
            ExitCode::FAILURE
        }
    }
}
