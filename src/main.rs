use std::path::{Path, PathBuf};

use clap::{Parser, Subcommand, ValueEnum};
use monday_tools::api::{BoardApi, MondayClient};
use monday_tools::config::Settings;
use monday_tools::duplicate::{self, DuplicateOptions};
use monday_tools::generate;
use monday_tools::io::TableFormat;
use monday_tools::model::SyncReport;
use monday_tools::plan::{self, Plan, SubItemSpec};
use monday_tools::sync::{self, SyncOptions};
use monday_tools::{Result, ToolError};
use tracing_subscriber::EnvFilter;

fn main() {
    let cli = Cli::parse();
    if let Err(error) = run(cli) {
        eprintln!("error: {error}");
        std::process::exit(1);
    }
}

fn run(cli: Cli) -> Result<()> {
    init_logging(cli.verbose)?;
    let settings = || Settings::load_with_dotenv(cli.config.as_deref());

    match cli.command {
        Command::Boards => list_boards(&settings()?),
        Command::Generate(args) => execute_generate(args),
        Command::Sync(args) => execute_sync(args, &settings()?),
        Command::AddSubitems(args) => execute_add_subitems(args, &settings()?),
        Command::Duplicate(args) => execute_duplicate(args, &settings()?),
    }
}

fn init_logging(verbose: bool) -> Result<()> {
    let filter = if verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"))
    };
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .try_init()
        .map_err(|error| ToolError::Logging(error.to_string()))
}

fn list_boards(settings: &Settings) -> Result<()> {
    let client = MondayClient::from_settings(settings)?;
    let boards = client.list_boards()?;
    println!("Found {} boards", boards.len());
    for board in boards {
        println!("- {} (ID: {})", board.name, board.id);
    }
    Ok(())
}

fn execute_generate(args: GenerateArgs) -> Result<()> {
    let plan = Plan::load(&args.plan)?;
    let written = generate::generate_boards(
        &args.master,
        &plan,
        args.department.as_deref(),
        &args.output_dir,
        args.format.into(),
    )?;
    for path in written {
        println!("Generated {}", path.display());
    }
    Ok(())
}

fn execute_sync(args: SyncArgs, settings: &Settings) -> Result<()> {
    let plan = Plan::load(&args.plan)?;
    let client = MondayClient::from_settings(settings)?;
    let options = SyncOptions::from_settings(settings);

    let report = match (&args.department, &args.input) {
        (Some(department), Some(input)) => {
            sync::sync_department(&client, &plan, department, input, &options)?
        }
        (Some(department), None) => {
            let input = sync::department_board_file(&args.dir, department).ok_or_else(|| {
                ToolError::MissingInput(
                    args.dir
                        .join(format!("{}.csv", plan::board_file_stem(department))),
                )
            })?;
            sync::sync_department(&client, &plan, department, &input, &options)?
        }
        (None, Some(_)) => {
            return Err(ToolError::InvalidInput(
                "--input requires --department".into(),
            ));
        }
        (None, None) => sync::sync_all(&client, &plan, &args.dir, &options)?,
    };

    print_report(&report);
    Ok(())
}

fn execute_add_subitems(args: AddSubitemsArgs, settings: &Settings) -> Result<()> {
    let tasks = load_tasks(args.plan.as_deref(), args.department.as_deref())?;
    let client = MondayClient::from_settings(settings)?;
    let options = SyncOptions::from_settings(settings);
    let report = sync::add_subitems(&client, &args.board, &args.input, &tasks, &options)?;
    print_report(&report);
    Ok(())
}

fn execute_duplicate(args: DuplicateArgs, settings: &Settings) -> Result<()> {
    let mut plan = Plan::load(&args.plan)?;
    if let Some(source) = args.source {
        plan.duplication.source_board = source;
    }
    if let Some(target) = args.target {
        plan.duplication.target_board = target;
    }
    if let Some(department) = args.department {
        plan.duplication.department = department;
    }

    let client = MondayClient::from_settings(settings)?;
    let options = DuplicateOptions::from_settings(settings);
    let report = duplicate::duplicate_board(&client, &plan, &options)?;
    print_report(&report);
    Ok(())
}

/// Tasks of `department` from the plan, or the built-in milestones.
fn load_tasks(plan_path: Option<&Path>, department: Option<&str>) -> Result<Vec<SubItemSpec>> {
    match (plan_path, department) {
        (Some(path), Some(department)) => {
            Ok(Plan::load(path)?.department(department)?.sub_items.clone())
        }
        (None, Some(_)) => Err(ToolError::InvalidInput(
            "--department requires --plan".into(),
        )),
        _ => Ok(plan::default_tasks()),
    }
}

fn print_report(report: &SyncReport) {
    println!("{report}");
    for failure in &report.failures {
        println!("  failed: {failure}");
    }
}

#[derive(Parser)]
#[command(
    author,
    version,
    about = "Build Monday.com boards, items and dated subitems from spreadsheets."
)]
struct Cli {
    /// Settings file layered over monday_api_config.json (default: monday.toml).
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Log at debug level regardless of RUST_LOG.
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// List the boards visible to the API token.
    Boards,
    /// Write department board files from the master sheet.
    Generate(GenerateArgs),
    /// Create items and dated subitems from department board files.
    Sync(SyncArgs),
    /// Add items and dated subitems from a Monday export to an existing board.
    AddSubitems(AddSubitemsArgs),
    /// Copy the items of one board into another.
    Duplicate(DuplicateArgs),
}

#[derive(clap::Args)]
struct GenerateArgs {
    /// Master sheet (.csv or .xlsx).
    #[arg(long)]
    master: PathBuf,

    /// Plan file describing departments and lead times.
    #[arg(long, default_value = "monday_config.json")]
    plan: PathBuf,

    /// Only generate this department.
    #[arg(long)]
    department: Option<String>,

    #[arg(long, default_value = ".")]
    output_dir: PathBuf,

    #[arg(long, value_enum, default_value_t = OutputFormat::Csv)]
    format: OutputFormat,
}

#[derive(clap::Args)]
struct SyncArgs {
    #[arg(long, default_value = "monday_config.json")]
    plan: PathBuf,

    /// Only sync this department.
    #[arg(long)]
    department: Option<String>,

    /// Board file for --department (default: <dir>/<department>_board.csv or .xlsx).
    #[arg(long)]
    input: Option<PathBuf>,

    /// Directory holding the generated board files.
    #[arg(long, default_value = ".")]
    dir: PathBuf,
}

#[derive(clap::Args)]
struct AddSubitemsArgs {
    /// Board name, or part of it.
    #[arg(long)]
    board: String,

    /// Monday export (.csv or .xlsx).
    #[arg(long)]
    input: PathBuf,

    /// Plan file to take the tasks from; built-in milestones otherwise.
    #[arg(long)]
    plan: Option<PathBuf>,

    #[arg(long)]
    department: Option<String>,
}

#[derive(clap::Args)]
struct DuplicateArgs {
    #[arg(long, default_value = "monday_config.json")]
    plan: PathBuf,

    /// Source board name (overrides the plan).
    #[arg(long)]
    source: Option<String>,

    /// Target board name (overrides the plan).
    #[arg(long)]
    target: Option<String>,

    /// Department whose tasks become subitems (overrides the plan).
    #[arg(long)]
    department: Option<String>,
}

#[derive(Copy, Clone, Debug, ValueEnum)]
enum OutputFormat {
    Csv,
    Xlsx,
}

impl From<OutputFormat> for TableFormat {
    fn from(format: OutputFormat) -> Self {
        match format {
            OutputFormat::Csv => TableFormat::Csv,
            OutputFormat::Xlsx => TableFormat::Xlsx,
        }
    }
}
