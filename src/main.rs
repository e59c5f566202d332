use clap::Parser;
use media_renamer::cli::{Args, RunOutcome, run_cli};
use media_renamer::output::OutputFormatter;
use std::process::ExitCode;

fn main() -> ExitCode {
    env_logger::init();

    let args = Args::parse();

    match run_cli(&args) {
        Ok(RunOutcome::CompletedWithFailures) => ExitCode::from(2),
        Ok(_) => ExitCode::SUCCESS,
        Err(e) => {
            OutputFormatter::error(&e);
            ExitCode::FAILURE
        }
    }
}
