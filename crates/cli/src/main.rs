// millcard CLI - machine service status and cotton-press bale log

mod exit_codes;
mod press;
mod status;

use std::path::PathBuf;
use std::process::ExitCode;

use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use millcard_config::{ConfigError, DataSource, Settings};
use millcard_io::{CsvDirSource, WorkbookSource};
use millcard_recon::{ReconError, ServiceSource};

use exit_codes::{recon_exit_code, EXIT_CONFIG, EXIT_SOURCE, EXIT_SUCCESS, EXIT_USAGE};
use press::PressCommands;

#[derive(Parser)]
#[command(name = "millcard")]
#[command(about = "Machine-card service status and cotton-press bale log")]
#[command(version)]
struct Cli {
    /// Settings file (default: ~/.config/millcard/settings.toml)
    #[arg(long, global = true, env = "MILLCARD_SETTINGS")]
    settings: Option<PathBuf>,

    /// Workbook holding the service plan and card sheets
    #[arg(long, global = true, conflicts_with = "csv_dir")]
    workbook: Option<PathBuf>,

    /// Directory of CSV exports (plan.csv, card_<n>.csv)
    #[arg(long, global = true)]
    csv_dir: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Service status of one machine card at its current tonnage
    #[command(after_help = "\
Examples:
  millcard status 7 --tons 1500
  millcard status 7 --tons 1500 --view all --json
  millcard status 7 --tons 1500 --view range:1000..3000 --output status.xlsx
  millcard status 7 --tons 1500 --outstanding-only --fail-on-outstanding")]
    Status {
        /// Card (machine) number
        card: String,

        /// Cumulative tonnage of the machine
        #[arg(long, short = 't')]
        tons: f64,

        /// Bands to report: current, lower, higher, all, range:MIN..MAX
        #[arg(long, short = 'v', default_value = "current")]
        view: millcard_recon::ViewSelection,

        /// Only print rows with services still outstanding
        #[arg(long)]
        outstanding_only: bool,

        /// Exit with code 5 when any service is outstanding
        #[arg(long)]
        fail_on_outstanding: bool,

        /// Output JSON to stdout instead of a table
        #[arg(long)]
        json: bool,

        /// Also write rows to a .csv or .xlsx file
        #[arg(long, short = 'o')]
        output: Option<PathBuf>,
    },

    /// List the maintenance plan bands
    #[command(after_help = "\
Examples:
  millcard bands
  millcard bands --tons 1500 --view higher --json")]
    Bands {
        /// Select bands relative to this tonnage
        #[arg(long, short = 't', requires = "view")]
        tons: Option<f64>,

        /// Bands to list: current, lower, higher, all, range:MIN..MAX
        #[arg(long, short = 'v')]
        view: Option<millcard_recon::ViewSelection>,

        #[arg(long)]
        json: bool,
    },

    /// Check settings, vocabulary and data source without reconciling
    Validate,

    /// Cotton-press bale log
    #[command(subcommand)]
    Press(PressCommands),
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

    pub fn args(msg: impl Into<String>) -> Self {
        Self::new(EXIT_USAGE, msg)
    }

    pub fn io(msg: impl Into<String>) -> Self {
        Self::new(EXIT_SOURCE, msg)
    }

    pub fn recon(err: ReconError) -> Self {
        let hint = match &err {
            ReconError::NotFound { .. } => {
                Some("check the card number and the sheet/file naming in settings".to_string())
            }
            _ => None,
        };
        Self { code: recon_exit_code(&err), message: err.to_string(), hint }
    }

    pub fn config(err: ConfigError) -> Self {
        Self::new(EXIT_CONFIG, err.to_string())
    }

    /// Add a hint to an existing error.
    pub fn with_hint(mut self, hint: impl Into<String>) -> Self {
        self.hint = Some(hint.into());
        self
    }
}

/// Either kind of data source, behind one handle.
pub enum Source {
    Workbook(WorkbookSource),
    CsvDir(CsvDirSource),
}

impl Source {
    pub fn service(&self) -> &dyn ServiceSource {
        match self {
            Self::Workbook(s) => s,
            Self::CsvDir(s) => s,
        }
    }

    pub fn card_ids(&self) -> Result<Vec<String>, ReconError> {
        match self {
            Self::Workbook(s) => s.card_ids(),
            Self::CsvDir(s) => s.card_ids(),
        }
    }

    pub fn describe(&self) -> String {
        match self {
            Self::Workbook(s) => format!("workbook {}", s.path.display()),
            Self::CsvDir(s) => format!("csv directory {}", s.dir.display()),
        }
    }
}

/// Settings plus the command-line overrides that apply to every command.
pub struct Context {
    pub settings: Settings,
    workbook: Option<PathBuf>,
    csv_dir: Option<PathBuf>,
}

impl Context {
    fn load(cli: &Cli) -> Result<Self, CliError> {
        let settings = Settings::load(cli.settings.as_deref()).map_err(CliError::config)?;
        Ok(Self {
            settings,
            workbook: cli.workbook.clone(),
            csv_dir: cli.csv_dir.clone(),
        })
    }

    /// Command-line paths win over the settings file.
    pub fn source(&self) -> Result<Source, CliError> {
        let vocabulary = self.settings.vocabulary().map_err(CliError::config)?;
        let data_source = match (&self.workbook, &self.csv_dir) {
            (Some(path), _) => DataSource::Workbook(path.clone()),
            (None, Some(dir)) => DataSource::CsvDir(dir.clone()),
            (None, None) => self.settings.data_source().ok_or_else(|| {
                CliError::args("no data source configured")
                    .with_hint("pass --workbook or --csv-dir, or set source.workbook in settings.toml")
            })?,
        };

        let src = &self.settings.source;
        Ok(match data_source {
            DataSource::Workbook(path) => {
                let mut source = WorkbookSource::new(path).with_vocabulary(vocabulary);
                source.plan_sheet = src.plan_sheet.clone();
                source.card_sheet_pattern = src.card_sheet_pattern.clone();
                Source::Workbook(source)
            }
            DataSource::CsvDir(dir) => {
                let mut source = CsvDirSource::new(dir).with_vocabulary(vocabulary);
                source.plan_file = src.plan_file.clone();
                source.card_file_pattern = src.card_file_pattern.clone();
                Source::CsvDir(source)
            }
        })
    }
}

fn init_tracing() {
    let filter = EnvFilter::try_from_env("MILLCARD_LOG").unwrap_or_else(|_| EnvFilter::new("warn"));
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .try_init();
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    init_tracing();

    let result = Context::load(&cli).and_then(|ctx| match cli.command {
        Commands::Status {
            card,
            tons,
            view,
            outstanding_only,
            fail_on_outstanding,
            json,
            output,
        } => status::cmd_status(&ctx, status::StatusArgs {
            card,
            tons,
            view,
            outstanding_only,
            fail_on_outstanding,
            json,
            output,
        }),
        Commands::Bands { tons, view, json } => status::cmd_bands(&ctx, tons, view, json),
        Commands::Validate => status::cmd_validate(&ctx),
        Commands::Press(cmd) => press::cmd_press(&ctx, cmd),
    });

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
