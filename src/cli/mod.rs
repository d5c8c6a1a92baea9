pub mod output;

use std::{
    io::{self, BufRead, Write},
    path::PathBuf,
    sync::Arc,
};

use anyhow::Result;
use clap::{Parser, Subcommand, ValueEnum};
use tracing::level_filters::LevelFilter;

use crate::{
    store::{file_store::FileStore, memory::MemoryStore, KeyValueStore},
    tracker::{
        config::{RecomputeTrigger, TrackerConfig},
        error::TrackerError,
        retention::{RetentionPolicy, WindowBoundary, DEFAULT_RETENTION_DAYS},
        Tracker,
    },
    utils::{
        clock::DefaultClock,
        dir::{create_application_default_path, ensure_dir},
        logging::{enable_logging, CLI_PREFIX},
        time::CalendarZone,
    },
};

#[derive(Parser, Debug)]
#[command(name = "Pointlog", version, long_about = None)]
#[command(about = "Track daily food points against a goal", long_about = None)]
struct Args {
    #[command(subcommand)]
    commands: Commands,
    #[arg(
        long,
        global = true,
        help = "Application directory. By default tries to save into $XDG_STATE_HOME or $HOME/.local/state"
    )]
    dir: Option<PathBuf>,
    #[arg(long, global = true, help = "Keep everything in memory, nothing is saved")]
    ephemeral: bool,
    #[arg(long, global = true, help = "Print diagnostics to the console")]
    log: bool,
    #[command(flatten)]
    tracking: TrackingOptions,
}

#[derive(Debug, Clone, Copy, clap::Args)]
struct TrackingOptions {
    #[arg(long, global = true, value_enum, default_value_t = Zone::Local, help = "Calendar used to decide which day an entry belongs to")]
    zone: Zone,
    #[arg(long = "retention-days", global = true, default_value_t = DEFAULT_RETENTION_DAYS, help = "Days of history kept")]
    retention_days: u64,
    #[arg(long, global = true, value_enum, default_value_t = Boundary::Inclusive, help = "Whether the oldest day of the window is kept")]
    boundary: Boundary,
    #[arg(long, global = true, value_enum, default_value_t = Recompute::OnLoad, help = "When the active day and history are recomputed")]
    recompute: Recompute,
}

#[derive(Subcommand, Debug)]
enum Commands {
    #[command(about = "Manage recipes")]
    Recipe {
        #[command(subcommand)]
        command: RecipeCommand,
    },
    #[command(about = "Log a recipe for today")]
    Log { id: String },
    #[command(about = "Remove an entry from today's log by its position")]
    Unlog { index: usize },
    #[command(about = "Show today's log and previous days")]
    Today,
    #[command(about = "Manage the daily goal")]
    Goal {
        #[command(subcommand)]
        command: GoalCommand,
    },
}

#[derive(Subcommand, Debug)]
enum RecipeCommand {
    #[command(about = "Add a recipe")]
    Add { name: String, points: String },
    #[command(about = "List recipes, optionally filtered by name")]
    List {
        #[arg(short, long)]
        search: Option<String>,
    },
    #[command(about = "Remove a recipe")]
    Remove {
        id: String,
        #[arg(short, long, help = "Don't ask for confirmation")]
        yes: bool,
    },
}

#[derive(Subcommand, Debug)]
enum GoalCommand {
    #[command(about = "Set the daily goal")]
    Set { value: String },
    #[command(about = "Show the daily goal")]
    Show,
}

#[derive(Debug, Clone, Copy, ValueEnum)]
enum Zone {
    Local,
    Utc,
}

#[derive(Debug, Clone, Copy, ValueEnum)]
enum Boundary {
    Inclusive,
    Exclusive,
}

#[derive(Debug, Clone, Copy, ValueEnum)]
enum Recompute {
    OnLoad,
    OnDateChange,
}

impl From<Zone> for CalendarZone {
    fn from(value: Zone) -> Self {
        match value {
            Zone::Local => Self::Local,
            Zone::Utc => Self::Utc,
        }
    }
}

impl From<Boundary> for WindowBoundary {
    fn from(value: Boundary) -> Self {
        match value {
            Boundary::Inclusive => Self::Inclusive,
            Boundary::Exclusive => Self::Exclusive,
        }
    }
}

impl From<Recompute> for RecomputeTrigger {
    fn from(value: Recompute) -> Self {
        match value {
            Recompute::OnLoad => Self::OnLoad,
            Recompute::OnDateChange => Self::OnDateChange,
        }
    }
}

impl From<TrackingOptions> for TrackerConfig {
    fn from(value: TrackingOptions) -> Self {
        TrackerConfig {
            zone: value.zone.into(),
            retention: RetentionPolicy {
                days: value.retention_days,
                boundary: value.boundary.into(),
            },
            recompute: value.recompute.into(),
        }
    }
}

pub async fn run_cli() -> Result<()> {
    let args = Args::parse();

    let app_dir = match args.dir {
        Some(dir) => ensure_dir(dir)?,
        None => create_application_default_path()?,
    };

    let logging_level = if args.log {
        Some(LevelFilter::TRACE)
    } else {
        None
    };
    enable_logging(CLI_PREFIX, &app_dir, logging_level, args.log)?;

    let config = TrackerConfig::from(args.tracking);
    if args.ephemeral {
        run_command(MemoryStore::new(), config, args.commands).await
    } else {
        let store = FileStore::new(app_dir.join("store"))?;
        run_command(store, config, args.commands).await
    }
}

async fn run_command(
    store: impl KeyValueStore,
    config: TrackerConfig,
    command: Commands,
) -> Result<()> {
    let mut tracker = Tracker::open(store, Arc::new(DefaultClock), config).await;

    match command {
        Commands::Recipe { command } => process_recipe_command(&mut tracker, command).await,
        Commands::Log { id } => {
            tracker.log_recipe(&id).await?;
            output::print_today(&tracker.today_summary());
            Ok(())
        }
        Commands::Unlog { index } => {
            tracker.remove_log_entry(index).await?;
            output::print_today(&tracker.today_summary());
            Ok(())
        }
        Commands::Today => {
            output::print_today(&tracker.today_summary());
            output::print_history(tracker.logs().historical_summaries());
            Ok(())
        }
        Commands::Goal { command } => match command {
            GoalCommand::Set { value } => {
                tracker.set_goal(&value).await?;
                println!("Daily goal saved!");
                Ok(())
            }
            GoalCommand::Show => {
                output::print_goal(tracker.goal().raw());
                Ok(())
            }
        },
    }
}

async fn process_recipe_command<S: KeyValueStore>(
    tracker: &mut Tracker<S>,
    command: RecipeCommand,
) -> Result<()> {
    match command {
        RecipeCommand::Add { name, points } => {
            tracker.add_recipe(&name, &points).await?;
            if let Some(recipe) = tracker.recipes().list().last() {
                output::print_recipes([recipe]);
            }
            Ok(())
        }
        RecipeCommand::List { search } => {
            let query = search.unwrap_or_default();
            output::print_recipes(tracker.recipes().search(&query));
            Ok(())
        }
        RecipeCommand::Remove { id, yes } => {
            let name = match tracker.recipes().find(&id) {
                Some(recipe) => recipe.name.clone(),
                None => return Err(TrackerError::RecipeNotFound(id).into()),
            };
            if !yes && !confirm(&format!("Are you sure you want to remove \"{name}\"?"))? {
                println!("Cancelled");
                return Ok(());
            }
            tracker.remove_recipe(&id).await?;
            Ok(())
        }
    }
}

fn confirm(question: &str) -> Result<bool> {
    print!("{question} [y/N] ");
    io::stdout().flush()?;
    let mut answer = String::new();
    io::stdin().lock().read_line(&mut answer)?;
    Ok(matches!(answer.trim(), "y" | "Y" | "yes"))
}
