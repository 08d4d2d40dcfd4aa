use std::process::ExitCode;

use clap::Parser;
use console::style;
use oai::cli::Cli;
use oai::{commands, init_logging, AppContext};
use tracing::debug;

#[tokio::main(flavor = "current_thread")]
async fn main() -> ExitCode {
    dotenv::dotenv().ok(); // Load .env file if present

    let cli = Cli::parse();
    init_logging(cli.verbose, cli.quiet);
    debug!(command = ?cli.command, "Parsed command line");

    let result = async move {
        let cx = AppContext::from_cli(&cli)?;
        let mut stdout = std::io::stdout();
        commands::run(&cx, cli.command, &mut stdout).await
    }
    .await;

    match result {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("{} {:#}", style("Error:").red().bold(), e);
            ExitCode::FAILURE
        }
    }
}
