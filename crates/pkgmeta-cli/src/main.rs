use clap::Parser;
use cli::{Args, Commands};
use error::CliResult;
use logging::setup_logging;
use tracing::error;
use utils::COLOR;

mod check;
mod cli;
mod error;
mod inspect;
mod logging;
mod utils;

fn run(args: Args) -> CliResult<i32> {
    match args.command {
        Commands::Inspect { file } => {
            inspect::inspect(&file, args.json)?;
            Ok(0)
        }
        Commands::Validate { file } => inspect::validate(&file, args.json),
        Commands::Check { file, installed } => check::check(&file, &installed, args.json),
    }
}

fn main() {
    let args = Args::parse();

    setup_logging(&args);

    if args.no_color {
        let mut color = COLOR.write().unwrap();
        *color = false;
    }

    let code = match run(args) {
        Ok(code) => code,
        Err(err) => {
            error!("{err}");
            1
        }
    };

    std::process::exit(code);
}
