//! intunewin-packager - wrap a Win32 installer into an .intunewin archive.
//!
//! This binary validates the inputs, runs the packaging tool as a background
//! job and exits 0 only when the package was created.

use std::process;

/// Core INFO events are hidden unless `RUST_LOG` asks for them, so `--quiet`
/// and `--json` runs only surface warnings and errors
const DEFAULT_LOG_FILTER: &str = "warn";

#[tokio::main]
async fn main() {
    // Initialize logging
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(DEFAULT_LOG_FILTER))
        .init();

    // Run CLI and get exit code
    let exit_code = match intunewin_packager::cli::run().await {
        Ok(code) => code,
        Err(e) => {
            eprintln!("Error: {}", e);
            if let Some(hint) = e.recovery_suggestion() {
                eprintln!("Hint: {}", hint);
            }
            1
        }
    };

    process::exit(exit_code);
}
