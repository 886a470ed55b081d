// jeongsan - reconcile shop orders against bank deposits

mod exit_codes;
mod logging;
mod recon;

use std::path::PathBuf;
use std::process::ExitCode;

use clap::{Parser, Subcommand, ValueEnum};
use jeongsan_recon::{ReconError, Source};

use exit_codes::{recon_exit_code, EXIT_SUCCESS, EXIT_USAGE};

#[derive(Parser)]
#[command(name = "jeongsan")]
#[command(about = "Reconcile shop order exports against bank deposit statements")]
#[command(long_version = long_version())]
#[command(version)]
struct Cli {
    /// More log output (-v info, -vv debug, -vvv trace)
    #[arg(long, short = 'v', action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    /// Only print errors
    #[arg(long, short = 'q', global = true, conflicts_with = "verbose")]
    quiet: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Match orders to deposits and write the four-sheet settlement workbook
    #[command(after_help = "\
Examples:
  jeongsan run --orders 주문.xlsx --deposits 통장.xls
  jeongsan run --orders orders.csv --deposits bank.csv --output 5월정산.xlsx
  jeongsan run --orders orders.csv --deposits bank.csv --config shop.toml --json
  jeongsan run --orders orders.csv --deposits bank.csv --strict")]
    Run {
        /// Order export from the shop site (csv, tsv, xlsx, xls, ods)
        #[arg(long)]
        orders: PathBuf,

        /// Bank statement (csv, tsv, xlsx, xls, ods)
        #[arg(long)]
        deposits: PathBuf,

        /// TOML config with column rules and matching policy
        #[arg(long, short = 'c', env = "JEONGSAN_CONFIG")]
        config: Option<PathBuf>,

        /// Output workbook path
        #[arg(long, short = 'o', default_value = "정산결과.xlsx")]
        output: PathBuf,

        /// Print the full result as JSON to stdout
        #[arg(long)]
        json: bool,

        /// Write the full result as JSON to a file
        #[arg(long, value_name = "FILE")]
        json_output: Option<PathBuf>,

        /// Exit 7 when any row is unmatched, overpaid or underpaid
        #[arg(long)]
        strict: bool,
    },

    /// Check a config file without running
    #[command(after_help = "\
Examples:
  jeongsan validate shop.toml")]
    Validate {
        /// Path to the TOML config file
        config: PathBuf,
    },

    /// Show which column each required field resolves to
    #[command(after_help = "\
Examples:
  jeongsan columns 통장.xls --source deposits
  jeongsan columns orders.csv --config shop.toml")]
    Columns {
        /// Input file to inspect
        file: PathBuf,

        /// Which side the file belongs to
        #[arg(long, short = 's', value_enum, default_value = "orders")]
        source: SourceArg,

        /// TOML config with column rules
        #[arg(long, short = 'c', env = "JEONGSAN_CONFIG")]
        config: Option<PathBuf>,
    },
}

#[derive(Clone, Copy, ValueEnum)]
enum SourceArg {
    Orders,
    Deposits,
}

impl From<SourceArg> for Source {
    fn from(arg: SourceArg) -> Self {
        match arg {
            SourceArg::Orders => Source::Orders,
            SourceArg::Deposits => Source::Deposits,
        }
    }
}

fn long_version() -> &'static str {
    concat!(
        env!("CARGO_PKG_VERSION"),
        "\nengine:  jeongsan-recon ",
        env!("CARGO_PKG_VERSION"),
    )
}

#[derive(Debug)]
pub struct CliError {
    pub code: u8,
    pub message: String,
    pub hint: Option<String>,
}

impl CliError {
    pub fn new(code: u8, msg: impl Into<String>) -> Self {
        Self { code, message: msg.into(), hint: None }
    }

    pub fn usage(msg: impl Into<String>) -> Self {
        Self::new(EXIT_USAGE, msg)
    }

    /// Add a hint to an existing error.
    pub fn with_hint(mut self, hint: impl Into<String>) -> Self {
        self.hint = Some(hint.into());
        self
    }
}

impl From<ReconError> for CliError {
    fn from(err: ReconError) -> Self {
        let code = recon_exit_code(&err);
        let hint = match &err {
            ReconError::Schema { source, .. } => Some(format!(
                "run `jeongsan columns <FILE> --source {source}` to see how headers resolve"
            )),
            ReconError::ConfigParse(_) | ReconError::ConfigValidation(_) => {
                Some("check the config with `jeongsan validate <CONFIG>`".to_string())
            }
            _ => None,
        };
        Self { code, message: err.to_string(), hint }
    }
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    logging::init(cli.verbose, cli.quiet);

    let result = match cli.command {
        Commands::Run {
            orders,
            deposits,
            config,
            output,
            json,
            json_output,
            strict,
        } => recon::cmd_run(recon::RunArgs {
            orders,
            deposits,
            config,
            output,
            json,
            json_output,
            strict,
            quiet: cli.quiet,
        }),
        Commands::Validate { config } => recon::cmd_validate(config),
        Commands::Columns { file, source, config } => {
            recon::cmd_columns(file, source.into(), config)
        }
    };

    match result {
        Ok(()) => ExitCode::from(EXIT_SUCCESS),
        Err(CliError { code, message, hint }) => {
            if !message.is_empty() {
                eprintln!("error: {}", message);
            }
            if let Some(hint) = hint {
                eprintln!("hint:  {}", hint);
            }
            ExitCode::from(code)
        }
    }
}
