//! Command-line front end for the duty roster.
//!
//! # Responsibility
//! - Map subcommands onto roster core services.
//! - Own process bootstrap: configuration, logging, store handle lifecycle.
//!
//! # Invariants
//! - Records are printed as JSON on stdout; errors go to stderr with exit
//!   status 1.
//! - The store connection is opened once per invocation and closed on exit.

use chrono::NaiveDate;
use clap::{Args, Parser, Subcommand};
use log::{info, warn};
use roster_core::db::open_db;
use roster_core::{
    default_log_level, init_logging, PeriodInput, PriestId, PriestService, RangeQuery,
    ScheduleService, SqlitePeriodRepository, SqlitePriestRepository,
};
use rusqlite::Connection;
use serde::Serialize;
use std::error::Error;
use std::path::PathBuf;
use std::process::ExitCode;
use uuid::Uuid;

type CliResult<T> = Result<T, Box<dyn Error>>;

#[derive(Parser, Debug)]
#[command(name = "roster", version, about = "Clergy duty roster")]
struct Cli {
    /// SQLite database file.
    #[arg(long, env = "ROSTER_DB", default_value = "roster.sqlite3")]
    db: PathBuf,

    /// Absolute directory for rotating log files; logging is off when unset.
    #[arg(long, env = "ROSTER_LOG_DIR")]
    log_dir: Option<String>,

    /// trace|debug|info|warn|error
    #[arg(long, env = "ROSTER_LOG_LEVEL")]
    log_level: Option<String>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Print core linkage info.
    Ping,
    /// Manage the priest directory.
    #[command(subcommand)]
    Priest(PriestCommand),
    /// Manage duty periods.
    #[command(subcommand)]
    Period(PeriodCommand),
    /// List duty periods, optionally filtered.
    Schedule {
        /// Keep periods ending on or after this date.
        #[arg(long)]
        from: Option<NaiveDate>,
        /// Keep periods starting on or before this date.
        #[arg(long)]
        to: Option<NaiveDate>,
        /// Keep periods this priest takes part in.
        #[arg(long)]
        priest: Option<PriestId>,
    },
}

#[derive(Subcommand, Debug)]
enum PriestCommand {
    Add { name: String },
    Rename { id: PriestId, name: String },
    Delete { id: PriestId },
    List,
}

#[derive(Subcommand, Debug)]
enum PeriodCommand {
    Add(PeriodArgs),
    Update {
        id: Uuid,
        #[command(flatten)]
        period: PeriodArgs,
    },
    Delete {
        id: Uuid,
    },
}

#[derive(Args, Debug)]
struct PeriodArgs {
    /// First day, YYYY-MM-DD.
    start_date: NaiveDate,
    /// Last day (inclusive), YYYY-MM-DD.
    end_date: NaiveDate,
    #[arg(long)]
    serving: PriestId,
    #[arg(long)]
    church_duty: PriestId,
    #[arg(long)]
    city_duty: PriestId,
}

impl From<PeriodArgs> for PeriodInput {
    fn from(value: PeriodArgs) -> Self {
        Self {
            start_date: value.start_date,
            end_date: value.end_date,
            serving_priest: value.serving,
            church_duty_priest: value.church_duty,
            city_duty_priest: value.city_duty,
        }
    }
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    if let Some(log_dir) = cli.log_dir.as_deref() {
        let level = cli.log_level.as_deref().unwrap_or(default_log_level());
        if let Err(err) = init_logging(level, log_dir) {
            eprintln!("logging disabled: {err}");
        }
    }

    match run(cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            warn!("event=cli_command module=cli status=error error={err}");
            eprintln!("error: {err}");
            ExitCode::FAILURE
        }
    }
}

fn run(cli: Cli) -> CliResult<()> {
    if let Command::Ping = cli.command {
        println!("roster_core ping={}", roster_core::ping());
        println!("roster_core version={}", roster_core::core_version());
        return Ok(());
    }

    let mut conn = open_db(&cli.db)?;
    match cli.command {
        Command::Ping => Ok(()),
        Command::Priest(command) => run_priest(&conn, command),
        Command::Period(command) => run_period(&mut conn, command),
        Command::Schedule { from, to, priest } => {
            let service = ScheduleService::new(SqlitePeriodRepository::try_new(&mut conn)?);
            let periods = service.query_periods(&RangeQuery {
                start_date: from,
                end_date: to,
                priest_id: priest,
            })?;
            info!(
                "event=schedule_query module=cli status=ok count={}",
                periods.len()
            );
            print_json(&periods)
        }
    }
}

fn run_priest(conn: &Connection, command: PriestCommand) -> CliResult<()> {
    let service = PriestService::new(SqlitePriestRepository::try_new(conn)?);
    match command {
        PriestCommand::Add { name } => print_json(&service.register(&name)?),
        PriestCommand::Rename { id, name } => print_json(&service.rename(id, &name)?),
        PriestCommand::Delete { id } => {
            service.delete(id)?;
            info!("event=priest_delete module=cli status=ok");
            Ok(())
        }
        PriestCommand::List => print_json(&service.list()?),
    }
}

fn run_period(conn: &mut Connection, command: PeriodCommand) -> CliResult<()> {
    let mut service = ScheduleService::new(SqlitePeriodRepository::try_new(conn)?);
    match command {
        PeriodCommand::Add(args) => print_json(&service.create_period(&args.into())?),
        PeriodCommand::Update { id, period } => {
            print_json(&service.update_period(id, &period.into())?)
        }
        PeriodCommand::Delete { id } => {
            service.delete_period(id)?;
            info!("event=period_delete module=cli status=ok");
            Ok(())
        }
    }
}

fn print_json<T: Serialize + ?Sized>(value: &T) -> CliResult<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}
