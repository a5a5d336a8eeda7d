//! `congregation` command-line entry point.
//!
//! # Responsibility
//! - Resolve configuration, start logging and open the live store.
//! - Drive the same attendance sheet and reports views the core exposes.

mod config;

use anyhow::{Context, Result};
use clap::Parser;
use config::{
    AttendArgs, ClassCommand, CliArgs, CliConfig, Command, MeetingCommand, MemberArgs,
    MemberCommand, ReportArgs,
};
use congregation_core::{
    init_logging, AttendanceReport, AttendanceSheet, AttendanceSheetMount, LiveStore, MemberInput,
    ReportsMount, ReportsView, Selector, Snapshot, SnapshotQuery, StaticIdentity,
};
use log::{error, info};
use std::process::ExitCode;
use std::time::Instant;

fn main() -> ExitCode {
    let args = CliArgs::parse();
    match run(args) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            error!("event=cli_exit module=cli status=error error={err}");
            eprintln!("error: {err:#}");
            ExitCode::FAILURE
        }
    }
}

fn run(args: CliArgs) -> Result<()> {
    let config = CliConfig::from_args(&args)?;
    init_logging(&config.logging).context("failed to start logging")?;

    let started_at = Instant::now();
    let mut store = LiveStore::open(&config.db_path)
        .with_context(|| format!("failed to open `{}`", config.db_path.display()))?;

    match args.command {
        Command::Member { command } => run_member(&mut store, command)?,
        Command::Class { command } => run_class(&mut store, command)?,
        Command::Meeting { command } => run_meeting(&mut store, command)?,
        Command::Attend(attend) => run_attend(&mut store, &config, attend)?,
        Command::Report(report) => run_report(&mut store, &config, report)?,
    }

    info!(
        "event=cli_command module=cli status=ok duration_ms={}",
        started_at.elapsed().as_millis()
    );
    Ok(())
}

fn member_input(args: MemberArgs) -> MemberInput {
    MemberInput {
        full_name: args.name,
        phone: args.phone,
        birth_date: args.birth_date,
        joined_on: args.joined_on,
        is_active: !args.inactive,
        is_professed: args.professed,
    }
}

fn run_member(store: &mut LiveStore, command: MemberCommand) -> Result<()> {
    match command {
        MemberCommand::Add(args) => {
            let member = store.create_member(&member_input(args))?;
            println!("{}", member.id);
        }
        MemberCommand::Update { id, member } => {
            store.update_member(id, &member_input(member))?;
        }
        MemberCommand::List { active_only } => {
            let Snapshot::Members(members) = store.load(&SnapshotQuery::Members)? else {
                anyhow::bail!("unexpected snapshot for members query");
            };
            for member in members
                .iter()
                .filter(|member| !active_only || member.is_active)
            {
                println!(
                    "{}\t{}\t{}\t{}",
                    member.id,
                    member.full_name,
                    if member.is_active { "active" } else { "inactive" },
                    member.phone.as_deref().unwrap_or("-")
                );
            }
        }
        MemberCommand::Deactivate { id } => store.deactivate_member(id)?,
        MemberCommand::Reactivate { id } => store.reactivate_member(id)?,
        MemberCommand::Delete { id } => store.delete_member(id)?,
    }
    Ok(())
}

fn run_class(store: &mut LiveStore, command: ClassCommand) -> Result<()> {
    match command {
        ClassCommand::Add { name } => println!("{}", store.create_class(&name)?.id),
        ClassCommand::Rename { id, name } => {
            store.rename_class(id, &name)?;
        }
        ClassCommand::Delete { id } => store.delete_class(id)?,
        ClassCommand::List => {
            let Snapshot::Classes(classes) = store.load(&SnapshotQuery::Classes)? else {
                anyhow::bail!("unexpected snapshot for classes query");
            };
            for class in classes {
                println!("{}\t{}", class.id, class.name);
            }
        }
    }
    Ok(())
}

fn run_meeting(store: &mut LiveStore, command: MeetingCommand) -> Result<()> {
    match command {
        MeetingCommand::Add { name, date } => {
            println!("{}", store.create_meeting(&name, date)?.id);
        }
        MeetingCommand::Update { id, name, date } => {
            store.update_meeting(id, &name, date)?;
        }
        MeetingCommand::Delete { id } => store.delete_meeting(id)?,
        MeetingCommand::List => {
            let Snapshot::Meetings(meetings) = store.load(&SnapshotQuery::Meetings)? else {
                anyhow::bail!("unexpected snapshot for meetings query");
            };
            for meeting in meetings {
                let date = meeting
                    .scheduled_on
                    .map(|day| day.to_string())
                    .unwrap_or_else(|| "-".to_string());
                println!("{}\t{}\t{}", meeting.id, meeting.name, date);
            }
        }
    }
    Ok(())
}

fn run_attend(store: &mut LiveStore, config: &CliConfig, args: AttendArgs) -> Result<()> {
    let identity = config
        .user
        .as_deref()
        .map(StaticIdentity::signed_in)
        .unwrap_or_else(StaticIdentity::signed_out);

    let mount = AttendanceSheetMount::mount(store, AttendanceSheet::new());
    mount.select_meeting(Some(args.meeting));
    mount.select_class(Some(args.class));
    for member_id in args.members {
        mount.set_present(member_id, true);
    }
    let saved = mount.save(store, &identity);
    mount.unmount(store);

    println!("recorded {} attendance record(s)", saved?);
    Ok(())
}

fn run_report(store: &mut LiveStore, config: &CliConfig, args: ReportArgs) -> Result<()> {
    let to = args.to.unwrap_or_else(|| config.report.today());
    let mut mount = ReportsMount::mount(store, ReportsView::new(config.report, to));
    if let Some(from) = args.from {
        mount.set_date_range(store, from, to);
    }
    mount.set_meeting(Selector::from(args.meeting));
    mount.set_class(Selector::from(args.class));

    let report = mount.report();
    let notification = mount.take_notification();
    mount.unmount(store);

    if let Some(message) = notification {
        anyhow::bail!(message);
    }
    let report = report.context("attendance did not load")?;
    if args.json {
        println!("{}", serde_json::to_string_pretty(&report)?);
    } else {
        print_report(&report);
    }
    Ok(())
}

fn print_report(report: &AttendanceReport) {
    let stats = &report.stats;
    println!("total presences:    {}", stats.total_presences);
    println!("meetings held:      {}", stats.unique_meetings);
    println!("average attendance: {:.1}", stats.average_attendance);
    println!("attendance rate:    {:.1}%", stats.attendance_rate);

    println!();
    println!("by member:");
    for summary in &report.members {
        println!("  {:<32} {}", summary.member_name, summary.total_count);
    }

    println!();
    println!("by day:");
    for point in &report.series {
        println!("  {}  {}", point.date_label, point.count);
    }

    println!();
    println!("records:");
    for row in &report.records {
        println!(
            "  {}  {}  {}  {}",
            row.date, row.member_name, row.meeting_name, row.class_name
        );
    }
}
