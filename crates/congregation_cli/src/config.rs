//! Command-line arguments and their resolution into runtime settings.

use anyhow::{Context, Result};
use chrono::NaiveDate;
use clap::{Args, Parser, Subcommand};
use congregation_core::{
    ClassId, LogLevel, LogTarget, LoggingConfig, MeetingId, MemberId, ReportSettings,
};
use std::path::PathBuf;

const DEFAULT_DB_FILE: &str = "congregation.db";
/// Offsets beyond +-18h are rejected rather than silently clamped.
const MAX_UTC_OFFSET_MINUTES: i32 = 18 * 60;

#[derive(Parser, Debug)]
#[command(
    name = "congregation",
    about = "Congregation membership and attendance tracking",
    version
)]
pub struct CliArgs {
    #[arg(
        long,
        env = "CONGREGATION_DB",
        value_name = "FILE",
        global = true,
        help = "SQLite database file (created and migrated on first use)"
    )]
    pub db: Option<PathBuf>,

    #[arg(
        long,
        env = "CONGREGATION_LOG_LEVEL",
        value_name = "LEVEL",
        global = true,
        help = "trace|debug|info|warn|error"
    )]
    pub log_level: Option<String>,

    #[arg(
        long,
        env = "CONGREGATION_LOG_DIR",
        value_name = "DIR",
        global = true,
        help = "Write rolling log files here instead of stderr"
    )]
    pub log_dir: Option<PathBuf>,

    #[arg(
        long,
        env = "CONGREGATION_UTC_OFFSET_MINUTES",
        value_name = "MINUTES",
        global = true,
        allow_hyphen_values = true,
        help = "Fixed UTC offset used for report calendar days"
    )]
    pub utc_offset_minutes: Option<i32>,

    #[arg(
        long,
        env = "CONGREGATION_USER",
        value_name = "USER_ID",
        global = true,
        help = "User id stamped on recorded attendance"
    )]
    pub user: Option<String>,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Manage members.
    Member {
        #[command(subcommand)]
        command: MemberCommand,
    },
    /// Manage classes.
    Class {
        #[command(subcommand)]
        command: ClassCommand,
    },
    /// Manage meetings.
    Meeting {
        #[command(subcommand)]
        command: MeetingCommand,
    },
    /// Record one attendance sheet.
    Attend(AttendArgs),
    /// Print the attendance report.
    Report(ReportArgs),
}

#[derive(Subcommand, Debug)]
pub enum MemberCommand {
    Add(MemberArgs),
    Update {
        id: MemberId,
        #[command(flatten)]
        member: MemberArgs,
    },
    List {
        #[arg(long)]
        active_only: bool,
    },
    Deactivate {
        id: MemberId,
    },
    Reactivate {
        id: MemberId,
    },
    Delete {
        id: MemberId,
    },
}

#[derive(Args, Debug)]
pub struct MemberArgs {
    #[arg(long)]
    pub name: String,
    #[arg(long)]
    pub phone: Option<String>,
    #[arg(long, value_name = "YYYY-MM-DD")]
    pub birth_date: NaiveDate,
    #[arg(long, value_name = "YYYY-MM-DD")]
    pub joined_on: NaiveDate,
    #[arg(long)]
    pub professed: bool,
    #[arg(long)]
    pub inactive: bool,
}

#[derive(Subcommand, Debug)]
pub enum ClassCommand {
    Add { name: String },
    Rename { id: ClassId, name: String },
    Delete { id: ClassId },
    List,
}

#[derive(Subcommand, Debug)]
pub enum MeetingCommand {
    Add {
        name: String,
        #[arg(long, value_name = "YYYY-MM-DD")]
        date: Option<NaiveDate>,
    },
    Update {
        id: MeetingId,
        name: String,
        #[arg(long, value_name = "YYYY-MM-DD")]
        date: Option<NaiveDate>,
    },
    Delete {
        id: MeetingId,
    },
    List,
}

#[derive(Args, Debug)]
pub struct AttendArgs {
    #[arg(long)]
    pub meeting: MeetingId,
    #[arg(long)]
    pub class: ClassId,
    /// Present member; repeat for each member.
    #[arg(long = "member", value_name = "MEMBER_ID", num_args = 1..)]
    pub members: Vec<MemberId>,
}

#[derive(Args, Debug)]
pub struct ReportArgs {
    /// First day, inclusive. Defaults to 29 days before `--to`.
    #[arg(long, value_name = "YYYY-MM-DD")]
    pub from: Option<NaiveDate>,
    /// Last day, inclusive. Defaults to today.
    #[arg(long, value_name = "YYYY-MM-DD")]
    pub to: Option<NaiveDate>,
    #[arg(long)]
    pub meeting: Option<MeetingId>,
    #[arg(long)]
    pub class: Option<ClassId>,
    /// Print the report as JSON.
    #[arg(long)]
    pub json: bool,
}

/// Settings resolved from flags, environment and defaults.
#[derive(Debug, Clone)]
pub struct CliConfig {
    pub db_path: PathBuf,
    pub logging: LoggingConfig,
    pub report: ReportSettings,
    pub user: Option<String>,
}

impl CliConfig {
    pub fn from_args(args: &CliArgs) -> Result<Self> {
        let target = match &args.log_dir {
            Some(dir) => LogTarget::directory(dir).context("invalid --log-dir")?,
            None => LogTarget::Stderr,
        };
        let level = match args.log_level.as_deref() {
            Some(value) => LogLevel::parse(value).context("invalid --log-level")?,
            None if target == LogTarget::Stderr => LogLevel::Warn,
            None => LogLevel::build_default(),
        };

        let utc_offset_minutes = args.utc_offset_minutes.unwrap_or(0);
        anyhow::ensure!(
            utc_offset_minutes.abs() <= MAX_UTC_OFFSET_MINUTES,
            "--utc-offset-minutes must be within +-{MAX_UTC_OFFSET_MINUTES}, got {utc_offset_minutes}"
        );

        Ok(Self {
            db_path: args
                .db
                .clone()
                .unwrap_or_else(|| PathBuf::from(DEFAULT_DB_FILE)),
            logging: LoggingConfig::new(level, target),
            report: ReportSettings::with_offset_minutes(utc_offset_minutes),
            user: args.user.clone(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::{CliArgs, CliConfig, Command};
    use clap::Parser;
    use congregation_core::{LogLevel, LogTarget};

    #[test]
    fn defaults_log_warnings_to_stderr() {
        let args = CliArgs::try_parse_from(["congregation", "class", "list"]).unwrap();
        let config = CliConfig::from_args(&args).unwrap();
        assert_eq!(config.logging.target, LogTarget::Stderr);
        assert_eq!(config.logging.level, LogLevel::Warn);
        assert_eq!(config.report.utc_offset_minutes, 0);
    }

    #[test]
    fn parses_report_filters_and_negative_offset() {
        let args = CliArgs::try_parse_from([
            "congregation",
            "report",
            "--from",
            "2024-05-01",
            "--to",
            "2024-05-31",
            "--json",
            "--utc-offset-minutes",
            "-180",
        ])
        .unwrap();
        let config = CliConfig::from_args(&args).unwrap();
        assert_eq!(config.report.utc_offset_minutes, -180);
        match args.command {
            Command::Report(report) => {
                assert!(report.json);
                assert_eq!(report.from.unwrap().to_string(), "2024-05-01");
            }
            other => panic!("unexpected command {other:?}"),
        }
    }

    #[test]
    fn rejects_out_of_range_offset_and_relative_log_dir() {
        let args = CliArgs::try_parse_from([
            "congregation",
            "class",
            "list",
            "--utc-offset-minutes",
            "2000",
        ])
        .unwrap();
        assert!(CliConfig::from_args(&args).is_err());

        let args =
            CliArgs::try_parse_from(["congregation", "class", "list", "--log-dir", "logs"]).unwrap();
        assert!(CliConfig::from_args(&args).is_err());
    }
}
