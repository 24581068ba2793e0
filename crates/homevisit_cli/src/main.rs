//! `homevisit` command-line front end.
//!
//! # Responsibility
//! - Resolve configuration from defaults, a JSON file, environment and flags.
//! - Drive the boundary API and print its plain-data responses.

use chrono::NaiveDate;
use clap::{Args, Parser, Subcommand};
use homevisit_api as api;
use homevisit_core::{CaseloadConfig, CaseloadReport, ChildIdentity};
use std::path::PathBuf;
use std::process::ExitCode;

#[derive(Debug, Parser)]
#[command(name = "homevisit", version, about = "Home-visit caseload records")]
struct Cli {
    /// JSON config file.
    #[arg(long, global = true)]
    config: Option<PathBuf>,
    /// Directory holding the child, visit log and notes tables.
    #[arg(long, global = true)]
    data_dir: Option<PathBuf>,
    #[arg(long, global = true)]
    log_level: Option<String>,
    /// Absolute directory for rolling log files; logging is off without it.
    #[arg(long, global = true)]
    log_dir: Option<PathBuf>,
    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Args)]
struct ChildArgs {
    /// Mother (guardian) ID.
    #[arg(long)]
    guardian: String,
    #[arg(long)]
    first: String,
    #[arg(long)]
    last: String,
}

impl ChildArgs {
    fn identity(&self) -> ChildIdentity {
        ChildIdentity::new(&self.guardian, self.first.as_str(), self.last.as_str())
    }
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Print a child's profile.
    Profile(ChildArgs),
    /// List logged visits for a child.
    Visits(ChildArgs),
    /// Log a visit for the child's assigned nurse.
    LogVisit {
        #[command(flatten)]
        child: ChildArgs,
        /// Visit time; defaults to now.
        #[arg(long)]
        at: Option<String>,
    },
    /// Delete a logged visit.
    DeleteVisit {
        #[command(flatten)]
        child: ChildArgs,
        #[arg(long)]
        nurse: String,
        #[arg(long)]
        at: String,
    },
    /// Print a child's note.
    Note(ChildArgs),
    /// Replace a child's note.
    SaveNote {
        #[command(flatten)]
        child: ChildArgs,
        #[arg(long)]
        text: String,
    },
    /// Assign a nurse and log the assignment as a visit.
    Assign {
        #[command(flatten)]
        child: ChildArgs,
        #[arg(long)]
        nurse: String,
        /// Visit time; defaults to now.
        #[arg(long)]
        at: Option<String>,
    },
    /// Print caseload statistics.
    Report {
        /// Reference date (YYYY-MM-DD); defaults to today.
        #[arg(long)]
        today: Option<NaiveDate>,
    },
    /// List children living in a town.
    Town { town: String },
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    let config = match resolve_config(&cli) {
        Ok(config) => config,
        Err(message) => {
            eprintln!("{message}");
            return ExitCode::FAILURE;
        }
    };

    if let Some(log_dir) = config.log_dir.as_deref() {
        let error = api::init_logging(&config.log_level, log_dir);
        if !error.is_empty() {
            eprintln!("logging disabled: {error}");
        }
    }

    if run(&cli.command, &config) {
        ExitCode::SUCCESS
    } else {
        ExitCode::FAILURE
    }
}

fn resolve_config(cli: &Cli) -> Result<CaseloadConfig, String> {
    let mut config = match cli.config.as_deref() {
        Some(path) => CaseloadConfig::from_json_file(path).map_err(|err| err.to_string())?,
        None => CaseloadConfig::default(),
    };
    config.apply_env();
    if let Some(data_dir) = &cli.data_dir {
        config.data_dir = data_dir.clone();
    }
    if let Some(level) = &cli.log_level {
        config.log_level = level.clone();
    }
    if let Some(log_dir) = &cli.log_dir {
        config.log_dir = Some(log_dir.clone());
    }
    Ok(config)
}

/// Runs one command; returns whether it succeeded.
fn run(command: &Command, config: &CaseloadConfig) -> bool {
    match command {
        Command::Profile(child) => {
            let response = api::child_profile(config, &child.identity());
            if response.ok {
                println!("{}\n\n{}", response.title, response.text);
            }
            report_failure(response.ok, &response.message)
        }
        Command::Visits(child) => {
            let response = api::visits_list(config, &child.identity());
            for item in &response.items {
                println!("{}\t{}", item.nurse_name, item.visit_time);
            }
            print_message(&response.message);
            response.ok
        }
        Command::LogVisit { child, at } => {
            let at = at.clone().unwrap_or_else(api::current_visit_time);
            let response = api::visit_log(config, &child.identity(), &at);
            print_message(&response.message);
            response.ok
        }
        Command::DeleteVisit { child, nurse, at } => {
            let response = api::visit_delete(config, &child.identity(), nurse, at);
            print_message(&response.message);
            response.ok
        }
        Command::Note(child) => {
            let response = api::note_get(config, &child.identity());
            match &response.text {
                Some(text) => println!("{text}"),
                None if response.ok => println!("(no notes)"),
                None => {}
            }
            report_failure(response.ok, &response.message)
        }
        Command::SaveNote { child, text } => {
            let response = api::note_save(config, &child.identity(), text);
            print_message(&response.message);
            response.ok
        }
        Command::Assign { child, nurse, at } => {
            let at = at.clone().unwrap_or_else(api::current_visit_time);
            let response = api::nurse_assign(config, &child.identity(), nurse, &at);
            print_message(&response.message);
            response.ok
        }
        Command::Report { today } => {
            let today = today.unwrap_or_else(|| chrono::Local::now().date_naive());
            let response = api::caseload_report(config, today);
            if let Some(report) = &response.report {
                print_report(report);
            }
            report_failure(response.ok, &response.message)
        }
        Command::Town { town } => {
            let response = api::town_children(config, town);
            for item in &response.items {
                println!("{}\t{}", item.display_name, item.guardian_id);
            }
            print_message(&response.message);
            response.ok
        }
    }
}

fn print_report(report: &CaseloadReport) {
    println!("Total children: {}", report.total_count);
    println!(
        "Assigned to nurses: {} ({:.1}%)",
        report.assigned_count, report.assigned_percentage
    );
    println!(
        "Unassigned: {} ({:.1}%)",
        report.unassigned_count, report.unassigned_percentage
    );
    if let Some(average) = report.average_age_years {
        println!("Average age: {average:.1} years");
    }
    if let Some(youngest) = &report.youngest {
        println!(
            "Youngest: {} ({})",
            youngest.identity.display_name(),
            youngest.date_of_birth
        );
    }
    if let Some(oldest) = &report.oldest {
        println!(
            "Oldest: {} ({})",
            oldest.identity.display_name(),
            oldest.date_of_birth
        );
    }
    for town in &report.counts_by_town {
        println!("{}\t{}", town.town, town.count);
    }
}

fn print_message(message: &str) {
    if !message.is_empty() {
        println!("{message}");
    }
}

fn report_failure(ok: bool, message: &str) -> bool {
    if !ok {
        eprintln!("{message}");
    }
    ok
}

#[cfg(test)]
mod tests {
    use super::{resolve_config, Cli, Command};
    use clap::{CommandFactory, Parser};
    use std::path::PathBuf;

    #[test]
    fn cli_definition_is_consistent() {
        Cli::command().debug_assert();
    }

    #[test]
    fn delete_visit_parses_identity_and_tuple() {
        let cli = Cli::parse_from([
            "homevisit",
            "--data-dir",
            "/srv/caseload",
            "delete-visit",
            "--guardian",
            "117",
            "--first",
            "Ana",
            "--last",
            "Lee",
            "--nurse",
            "Nurse A",
            "--at",
            "2024-01-05 09:00",
        ]);
        let Command::DeleteVisit { child, nurse, at } = &cli.command else {
            panic!("unexpected command: {:?}", cli.command);
        };
        assert_eq!(child.identity().guardian_id, "117");
        assert_eq!(nurse, "Nurse A");
        assert_eq!(at, "2024-01-05 09:00");

        let config = resolve_config(&cli).unwrap();
        assert_eq!(config.data_dir, PathBuf::from("/srv/caseload"));
    }

    #[test]
    fn report_accepts_reference_date() {
        let cli = Cli::parse_from(["homevisit", "report", "--today", "2024-01-01"]);
        assert!(matches!(cli.command, Command::Report { today: Some(_) }));
    }
}
