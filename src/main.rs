use std::path::PathBuf;

use chrono::{NaiveDate, NaiveTime};
use clap::{Parser, Subcommand};
use daytask::clock::{Clock, FixedClock, SystemClock};
use daytask::error::Result;
use daytask::model::{CategoryFilter, NewTask, TaskPatch};
use daytask::output::Format;
use daytask::store::categories::DEFAULT_CATEGORIES;
use daytask::store::repo::{DIR_ENV, find_repo_root};

#[derive(Parser)]
#[command(
    name = "daytask",
    version,
    about = "Personal task tracker with categories and a daily streak"
)]
struct Cli {
    /// Output format
    #[arg(long, global = true, value_enum, default_value = "json")]
    format: Format,
    /// Shorthand for --format pretty
    #[arg(long, global = true, hide = true)]
    pretty: bool,
    /// Treat this RFC 3339 instant as the current time
    #[arg(long, global = true, value_parser = parse_clock)]
    now: Option<FixedClock>,
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Initialize a new .daytask/ directory here
    Init,
    /// Add a task
    Add {
        /// Task title
        title: String,
        /// Task description
        #[arg(long, short)]
        description: Option<String>,
        /// Category label (must already exist)
        #[arg(long, short, default_value = DEFAULT_CATEGORIES[0])]
        category: String,
        /// Due date (YYYY-MM-DD)
        #[arg(long)]
        due: Option<NaiveDate>,
        /// Time of day (HH:MM)
        #[arg(long, value_parser = parse_time)]
        time: Option<NaiveTime>,
        /// Let the configured advisor clean up the title and pick a category
        #[arg(long)]
        advise: bool,
    },
    /// List tasks, newest first
    List {
        /// Only tasks in this category ("all" for every task)
        #[arg(long)]
        category: Option<CategoryFilter>,
    },
    /// Display a single task
    Show {
        /// Task ID or unique prefix
        id: String,
    },
    /// Mark a task complete, or incomplete again
    Toggle {
        /// Task ID or unique prefix
        id: String,
    },
    /// Edit task fields
    Edit {
        /// Task ID or unique prefix
        id: String,
        /// New title
        #[arg(long)]
        title: Option<String>,
        /// New description
        #[arg(long, short)]
        description: Option<String>,
        /// New category
        #[arg(long, short)]
        category: Option<String>,
        /// New due date (YYYY-MM-DD)
        #[arg(long)]
        due: Option<NaiveDate>,
        /// New time of day (HH:MM)
        #[arg(long, value_parser = parse_time)]
        time: Option<NaiveTime>,
    },
    /// Delete a task
    Delete {
        /// Task ID or unique prefix
        id: String,
    },
    /// Ask the advisor to clean up a task's title and category
    Advise {
        /// Task ID or unique prefix
        id: String,
    },
    /// Manage categories
    Category {
        #[command(subcommand)]
        action: CategoryAction,
    },
    /// Show the daily streak
    Streak,
    /// Daily goals: progress and streak
    Summary,
    /// Show or change settings
    Config {
        #[command(subcommand)]
        action: ConfigAction,
    },
}

#[derive(Subcommand)]
enum CategoryAction {
    /// List categories, marking defaults and custom ones
    List,
    /// Add a custom category
    Add { name: String },
    /// Delete a custom category (defaults are protected)
    Delete { name: String },
}

#[derive(Subcommand)]
enum ConfigAction {
    /// Show current settings
    Show,
    /// Configure the categorization advisor command
    Advisor {
        /// Shell command that reads a request on stdin and prints a suggestion
        #[arg(long, conflicts_with = "clear", required_unless_present = "clear")]
        command: Option<String>,
        /// Disable the advisor
        #[arg(long)]
        clear: bool,
    },
}

fn parse_clock(s: &str) -> std::result::Result<FixedClock, String> {
    FixedClock::parse(s).map_err(|e| format!("expected an RFC 3339 timestamp: {e}"))
}

fn parse_time(s: &str) -> std::result::Result<NaiveTime, String> {
    NaiveTime::parse_from_str(s, "%H:%M")
        .or_else(|_| NaiveTime::parse_from_str(s, "%H:%M:%S"))
        .map_err(|e| format!("expected HH:MM: {e}"))
}

fn run(cli: Cli, format: Format) -> Result<()> {
    let root = match cli.command {
        Commands::Init => match std::env::var_os(DIR_ENV) {
            Some(dir) => PathBuf::from(dir),
            None => std::env::current_dir()?,
        },
        _ => find_repo_root()?,
    };
    let clock: Box<dyn Clock> = match cli.now {
        Some(fixed) => Box::new(fixed),
        None => Box::new(SystemClock),
    };
    let clock = clock.as_ref();

    match cli.command {
        Commands::Init => daytask::commands::init::run(&root),
        Commands::Add {
            title,
            description,
            category,
            due,
            time,
            advise,
        } => {
            let new = NewTask {
                title,
                description,
                category,
                due_date: due,
                time,
            };
            daytask::commands::add::run(&root, clock, new, advise, format)
        }
        Commands::List { category } => daytask::commands::list::run(
            &root,
            clock,
            category.unwrap_or_default(),
            format,
        ),
        Commands::Show { id } => daytask::commands::show::run(&root, &id, format),
        Commands::Toggle { id } => daytask::commands::toggle::run(&root, clock, &id, format),
        Commands::Edit {
            id,
            title,
            description,
            category,
            due,
            time,
        } => {
            let patch = TaskPatch {
                title,
                description,
                category,
                due_date: due,
                time,
            };
            daytask::commands::edit::run(&root, &id, patch, format)
        }
        Commands::Delete { id } => daytask::commands::delete::run(&root, clock, &id, format),
        Commands::Advise { id } => daytask::commands::advise::run(&root, &id, format),
        Commands::Category { action } => match action {
            CategoryAction::List => daytask::commands::category::list(&root, format),
            CategoryAction::Add { name } => daytask::commands::category::add(&root, &name, format),
            CategoryAction::Delete { name } => {
                daytask::commands::category::delete(&root, &name, format)
            }
        },
        Commands::Streak => daytask::commands::streak::run(&root, clock, format),
        Commands::Summary => daytask::commands::summary::run(&root, clock, format),
        Commands::Config { action } => match action {
            ConfigAction::Show => daytask::commands::config::show(&root, format),
            ConfigAction::Advisor { command, clear } => {
                let command = if clear { None } else { command };
                daytask::commands::config::set_advisor(&root, command, format)
            }
        },
    }
}

fn main() {
    daytask::logging::init();
    let cli = Cli::parse();
    let format = if cli.pretty {
        Format::Pretty
    } else {
        cli.format
    };
    if let Err(e) = run(cli, format) {
        match format {
            Format::Json => {
                eprintln!(
                    "{}",
                    serde_json::json!({
                        "error": e.code(),
                        "message": e.to_string()
                    })
                );
            }
            _ => eprintln!("error: {e}"),
        }
        std::process::exit(1);
    }
}
