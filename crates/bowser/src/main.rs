//! Bowser CLI - sentinel-driven subtree sync
//!
//! Binary name: `bowser`

use std::process;

mod cli;

use cli::handlers::run_cli;

#[tokio::main]
async fn main() {
    if let Err(err) = run_cli().await {
        #[allow(clippy::print_stderr)]
        {
            eprintln!("Error: {err}");
        }

        let code = err
            .downcast_ref::<bowser_core::Error>()
            .map(bowser_core::Error::exit_code)
            .unwrap_or(1);

        #[allow(clippy::exit)]
        process::exit(code);
    }
}
