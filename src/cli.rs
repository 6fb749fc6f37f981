use std::path::PathBuf;

use bto_allocation::error::AppError;
use bto_allocation::workflows::allocation::{FlatType, ProjectSort};
use chrono::NaiveDate;
use clap::{Args, Parser, Subcommand, ValueEnum};

use crate::commands::{self, Session};

#[derive(Parser, Debug)]
#[command(
    name = "bto-portal",
    about = "Query BTO projects, eligibility, and manager reports from a dataset export",
    version
)]
struct Cli {
    #[command(flatten)]
    global: GlobalArgs,
    #[command(subcommand)]
    command: Command,
}

#[derive(Args, Debug)]
pub(crate) struct GlobalArgs {
    /// Directory holding ApplicantList, OfficerList, ManagerList and ProjectList (overrides BTO_DATA_DIR)
    #[arg(long, global = true)]
    pub(crate) data_dir: Option<PathBuf>,
    /// Evaluation date (YYYY-MM-DD, defaults to today)
    #[arg(long, global = true, value_parser = parse_date)]
    pub(crate) today: Option<NaiveDate>,
    /// Emit JSON instead of plain lines
    #[arg(long, global = true)]
    pub(crate) json: bool,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// List the projects an applicant may browse
    Projects(ProjectsArgs),
    /// Check whether an applicant may apply for a flat type in a project
    Eligibility(EligibilityArgs),
    /// Generate a manager's application report
    Report(ReportArgs),
}

#[derive(Args, Debug)]
pub(crate) struct ProjectsArgs {
    /// Applicant NRIC
    #[arg(long)]
    pub(crate) applicant: String,
    /// Only list projects in this neighbourhood
    #[arg(long)]
    pub(crate) neighbourhood: Option<String>,
    /// Only list projects with units of this flat type left (repeatable)
    #[arg(long = "flat-type", value_parser = parse_flat_type)]
    pub(crate) flat_types: Vec<FlatType>,
    #[arg(long, value_enum, default_value_t = SortOrder::Name)]
    pub(crate) sort: SortOrder,
}

#[derive(Args, Debug)]
pub(crate) struct EligibilityArgs {
    /// Applicant NRIC
    #[arg(long)]
    pub(crate) applicant: String,
    /// Project name or number
    #[arg(long)]
    pub(crate) project: String,
    #[arg(long, value_parser = parse_flat_type)]
    pub(crate) flat_type: FlatType,
}

#[derive(Args, Debug)]
pub(crate) struct ReportArgs {
    /// Manager NRIC
    #[arg(long)]
    pub(crate) manager: String,
    /// Filter category: none, marital, flat_type, neighbourhood, age
    #[arg(long, default_value = "none")]
    pub(crate) category: String,
    /// Filter value, e.g. "30-40" for age
    #[arg(long, default_value = "")]
    pub(crate) value: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub(crate) enum SortOrder {
    /// Project name, Z to A
    Name,
    /// Lowest eligible price first
    Price,
}

impl From<SortOrder> for ProjectSort {
    fn from(value: SortOrder) -> Self {
        match value {
            SortOrder::Name => ProjectSort::NameDescending,
            SortOrder::Price => ProjectSort::PriceAscending,
        }
    }
}

pub(crate) fn run() -> Result<(), AppError> {
    let cli = Cli::parse();
    let session = Session::open(&cli.global)?;

    match cli.command {
        Command::Projects(args) => commands::run_projects(&session, args),
        Command::Eligibility(args) => commands::run_eligibility(&session, args),
        Command::Report(args) => commands::run_report(&session, args),
    }
}

fn parse_date(raw: &str) -> Result<NaiveDate, String> {
    NaiveDate::parse_from_str(raw.trim(), "%Y-%m-%d")
        .map_err(|err| format!("failed to parse '{raw}' as YYYY-MM-DD ({err})"))
}

fn parse_flat_type(raw: &str) -> Result<FlatType, String> {
    raw.parse::<FlatType>().map_err(|err| err.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn cli_definition_is_consistent() {
        Cli::command().debug_assert();
    }

    #[test]
    fn parses_repeated_flat_types_and_global_flags() {
        let cli = Cli::try_parse_from([
            "bto-portal",
            "projects",
            "--applicant",
            "S1234567A",
            "--flat-type",
            "2-room",
            "--flat-type",
            "3-room",
            "--sort",
            "price",
            "--json",
            "--today",
            "2025-03-01",
        ])
        .expect("arguments parse");

        assert!(cli.global.json);
        assert_eq!(cli.global.today, NaiveDate::from_ymd_opt(2025, 3, 1));
        match cli.command {
            Command::Projects(args) => {
                assert_eq!(args.flat_types, vec![FlatType::TwoRoom, FlatType::ThreeRoom]);
                assert_eq!(ProjectSort::from(args.sort), ProjectSort::PriceAscending);
            }
            other => panic!("expected projects command, got {other:?}"),
        }
    }

    #[test]
    fn rejects_unknown_flat_type() {
        let result = Cli::try_parse_from([
            "bto-portal",
            "eligibility",
            "--applicant",
            "S1234567A",
            "--project",
            "Acacia Breeze",
            "--flat-type",
            "5-room",
        ]);
        assert!(result.is_err());
    }
}
