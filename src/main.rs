use std::path::PathBuf;
use std::process::ExitCode;

use clap::{ArgAction, Parser};
use log::LevelFilter;

use rbswap::file::{SwapReport, check_file, swap_file};

/// Swap the red and blue channels of a 4-channel image, in place.
///
/// RGBA becomes BGRA and BGRA becomes RGBA. Green, alpha, dimensions, and
/// sample depth are kept. The file is rewritten in the format its extension
/// names.
#[derive(Parser, Debug)]
#[command(name = "rbswap", version)]
struct Cli {
    /// Image file to rewrite
    path: PathBuf,

    /// Decode and validate only; never write
    #[arg(long)]
    check: bool,

    /// More log output (-v info, -vv debug, -vvv trace)
    #[arg(short, long, action = ArgAction::Count, conflicts_with = "quiet")]
    verbose: u8,

    /// Only log errors
    #[arg(short, long)]
    quiet: bool,
}

impl Cli {
    fn log_level(&self) -> LevelFilter {
        if self.quiet {
            return LevelFilter::Error;
        }
        match self.verbose {
            0 => LevelFilter::Warn,
            1 => LevelFilter::Info,
            2 => LevelFilter::Debug,
            _ => LevelFilter::Trace,
        }
    }
}

fn init_logger(level: LevelFilter) {
    // RUST_LOG, when set, wins over the command-line level.
    env_logger::Builder::new()
        .filter_level(level)
        .format_timestamp(None)
        .parse_default_env()
        .init();
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    init_logger(cli.log_level());

    let result = if cli.check {
        check_file(&cli.path)
    } else {
        swap_file(&cli.path)
    };

    match result {
        Ok(SwapReport {
            width,
            height,
            color,
            format,
        }) => {
            if cli.check {
                println!(
                    "{}: {width}x{height} {color:?} {format:?}, ok to swap",
                    cli.path.display()
                );
            }
            ExitCode::SUCCESS
        }
        Err(e) => {
            eprintln!("rbswap: {e}");
            ExitCode::FAILURE
        }
    }
}
