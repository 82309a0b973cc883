//! Stateflow CLI - Validate @StateFlow directive blocks and render them as ASCII

mod cli;

use clap::Parser;

fn main() {
    let cli_args = cli::Cli::parse();

    // Logging is installed by `run` from the CLI flags and environment
    let app = cli::StateFlowApp::new();

    if let Err(e) = app.run(cli_args) {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }
}
