use std::process::ExitCode;

use yt_transcript::cli::{self, Cli, Outcome};
use yt_transcript::config::Config;
use yt_transcript::{logging, output};

#[tokio::main]
async fn main() -> ExitCode {
    logging::init();

    let outcome = match Cli::parse_args() {
        Ok(cli) => cli::execute(cli, Config::load).await,
        Err(err) => Outcome::failure(err.to_string().trim()),
    };

    if let Err(err) = output::print_to_console(&outcome.document) {
        tracing::error!("Failed to write output: {:#}", err);
        return ExitCode::FAILURE;
    }

    outcome.exit_code()
}
