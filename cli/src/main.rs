//! platform-deploy - build and deploy hooks for Magento on a managed platform

use std::process::ExitCode;

use clap::Parser;

use platform_deploy::cli::Cli;
use platform_deploy::output::json;

#[tokio::main(flavor = "current_thread")]
async fn main() -> ExitCode {
    let cli = Cli::parse();
    let as_json = cli.json();
    match cli.run().await {
        Ok(code) => code,
        Err(e) => {
            match json::format_error(&format!("{e:#}"), json::error_code(&e)) {
                Ok(text) if as_json => println!("{text}"),
                _ => eprintln!("Error: {e:#}"),
            }
            ExitCode::FAILURE
        }
    }
}
