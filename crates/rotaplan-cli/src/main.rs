//! rotaplan CLI - Teacher Rotation Engine
//!
//! Command-line interface for normalizing the class tables, auditing them
//! against the teacher table, and solving weekly rotations.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use rotaplan_core::{
    Finding, PolicyVariant, Renderer, Roster, Severity, SolveOptions,
};
use rotaplan_render::{RotationWorkbook, TextSummary};
use rotaplan_solver::{RotationSolver, SolveOutcome, SolveReport};
use rotaplan_tables::{
    apply_assignments, audit_roster, normalize_classes, read_table, read_teacher_table,
    write_assignments_csv_file, write_sessions_csv, TeacherTable,
};

#[derive(Parser)]
#[command(name = "rotaplan")]
#[command(author, version, about = "Teacher rotation engine", long_about = None)]
struct Cli {
    /// Verbose output (-v info, -vv debug, -vvv trace)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Solve a weekly rotation from the class and teacher tables
    Solve {
        /// Class table (.csv or .xlsx)
        #[arg(long, value_name = "FILE")]
        classes: PathBuf,

        /// Teacher table (.csv or .xlsx)
        #[arg(long, value_name = "FILE")]
        teachers: PathBuf,

        /// Rule configuration to compile (overrides the config file)
        #[arg(long)]
        policy: Option<PolicyVariant>,

        /// Search-entropy seed; omitted means non-reproducible
        #[arg(long)]
        seed: Option<u64>,

        /// Wall-clock budget for each solve attempt, in seconds
        #[arg(long)]
        time_budget_secs: Option<u64>,

        /// TOML file with thresholds, weights and policy
        #[arg(long, value_name = "FILE")]
        config: Option<PathBuf>,

        /// Write the rotation workbook (.xlsx) here
        #[arg(short, long, value_name = "FILE")]
        output: Option<PathBuf>,

        /// Also write the raw assignment table as CSV
        #[arg(long, value_name = "FILE")]
        assignments_csv: Option<PathBuf>,

        /// Output format for the run summary (text, json)
        #[arg(long, default_value = "text")]
        format: String,

        /// Solve once with the configured policy, skipping the fallback
        #[arg(long)]
        no_fallback: bool,
    },

    /// Audit the tables and report integrity findings without solving
    Check {
        /// Class table (.csv or .xlsx)
        #[arg(long, value_name = "FILE")]
        classes: PathBuf,

        /// Teacher table (.csv or .xlsx)
        #[arg(long, value_name = "FILE")]
        teachers: PathBuf,

        /// Output format (text, json)
        #[arg(long, default_value = "text")]
        format: String,
    },

    /// Expand the class table into one row per atomic session
    Normalize {
        /// Class table (.csv or .xlsx)
        #[arg(long, value_name = "FILE")]
        classes: PathBuf,

        /// Output CSV (stdout if not specified)
        #[arg(short, long, value_name = "FILE")]
        output: Option<PathBuf>,
    },
}

/// Exit codes, rustc-style: 0 unless something errored
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum ExitCode {
    Success = 0,
    Failure = 1,
}

impl ExitCode {
    fn from_error_count(count: usize) -> Self {
        if count > 0 {
            ExitCode::Failure
        } else {
            ExitCode::Success
        }
    }

    fn exit(self) -> ! {
        std::process::exit(self as i32)
    }
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let level = match cli.verbose {
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace",
    };
    tracing_subscriber::registry()
        .with(fmt::layer().with_writer(std::io::stderr))
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level)))
        .init();

    match cli.command {
        Some(Commands::Solve {
            classes,
            teachers,
            policy,
            seed,
            time_budget_secs,
            config,
            output,
            assignments_csv,
            format,
            no_fallback,
        }) => run_solve(
            &classes,
            &teachers,
            policy,
            seed,
            time_budget_secs,
            config.as_deref(),
            output.as_deref(),
            assignments_csv.as_deref(),
            &format,
            no_fallback,
        ),
        Some(Commands::Check { classes, teachers, format }) => {
            run_check(&classes, &teachers, &format)
        }
        Some(Commands::Normalize { classes, output }) => {
            run_normalize(&classes, output.as_deref())
        }
        None => {
            println!("rotaplan - Teacher Rotation Engine");
            println!("Run with --help for usage information");
            Ok(())
        }
    }
}

fn load_inputs(
    classes: &Path,
    teachers: &Path,
) -> Result<(Vec<rotaplan_core::ClassSession>, TeacherTable, Vec<Finding>)> {
    let class_table = read_table(classes)
        .with_context(|| format!("reading class table {}", classes.display()))?;
    let teacher_raw = read_table(teachers)
        .with_context(|| format!("reading teacher table {}", teachers.display()))?;

    let normalized = normalize_classes(&class_table).context("normalizing class table")?;
    let teacher_table = read_teacher_table(&teacher_raw).context("reading teacher table")?;

    let mut findings = normalized.findings;
    findings.extend(teacher_table.findings.clone());
    findings.extend(audit_roster(&normalized.sessions, &teacher_table));

    Ok((normalized.sessions, teacher_table, findings))
}

#[allow(clippy::too_many_arguments)]
fn run_solve(
    classes: &Path,
    teachers: &Path,
    policy: Option<PolicyVariant>,
    seed: Option<u64>,
    time_budget_secs: Option<u64>,
    config: Option<&Path>,
    output: Option<&Path>,
    assignments_csv: Option<&Path>,
    format: &str,
    no_fallback: bool,
) -> Result<()> {
    let mut options = match config {
        Some(path) => {
            let text = std::fs::read_to_string(path)
                .with_context(|| format!("reading config {}", path.display()))?;
            toml::from_str::<SolveOptions>(&text)
                .with_context(|| format!("parsing config {}", path.display()))?
        }
        None => SolveOptions::default(),
    };
    if let Some(policy) = policy {
        options.policy = policy;
    }
    if let Some(seed) = seed {
        options.seed = Some(seed);
    }
    if let Some(secs) = time_budget_secs {
        options.time_budget_secs = secs;
    }

    let (sessions, teacher_table, mut findings) = load_inputs(classes, teachers)?;
    let roster = Roster::new(sessions, teacher_table.teachers);

    let solver = RotationSolver::new(options);
    let report = if no_fallback {
        solver.solve(&roster)?
    } else {
        solver.solve_with_fallback(&roster)?
    };
    findings.extend(report.findings.clone());

    let merged = apply_assignments(&roster.sessions, &report.assignments);

    if let Some(path) = output {
        RotationWorkbook::new()
            .with_findings(findings.clone())
            .save(path, &roster.sessions, &report.assignments)
            .with_context(|| format!("writing workbook {}", path.display()))?;
    }
    if let Some(path) = assignments_csv {
        write_assignments_csv_file(path, &report.assignments)
            .with_context(|| format!("writing assignment CSV {}", path.display()))?;
    }

    match format {
        "json" => print_solve_json(&report, &findings, &merged.unfilled)?,
        _ => print_solve_text(&roster, &report, &findings)?,
    }

    if report.assignments.is_empty() {
        eprintln!("could not generate an allocation (the relaxed policy also found nothing)");
        ExitCode::Failure.exit();
    }
    ExitCode::Success.exit();
}

fn print_solve_text(roster: &Roster, report: &SolveReport, findings: &[Finding]) -> Result<()> {
    for finding in findings {
        eprintln!("{finding}");
    }
    let summary = TextSummary::new().render(&roster.sessions, &report.assignments)?;
    print!("{summary}");
    println!(
        "policy: {} (attempts: {}), seed: {}, outcome: {}",
        report.policy,
        report
            .attempts
            .iter()
            .map(|p| p.as_str())
            .collect::<Vec<_>>()
            .join(" -> "),
        report.seed,
        outcome_str(report.outcome),
    );
    Ok(())
}

fn print_solve_json(
    report: &SolveReport,
    findings: &[Finding],
    unfilled: &[rotaplan_core::ClassSession],
) -> Result<()> {
    let mut unfilled_groups: Vec<&str> = unfilled.iter().map(|s| s.group.as_str()).collect();
    unfilled_groups.sort_unstable();
    unfilled_groups.dedup();

    let json = serde_json::json!({
        "outcome": outcome_str(report.outcome),
        "policy": report.policy.as_str(),
        "attempts": report.attempts.iter().map(|p| p.as_str()).collect::<Vec<_>>(),
        "seed": report.seed,
        "objective": report.objective,
        "elapsed_ms": report.elapsed.as_millis() as u64,
        "assignments": report.assignments,
        "loads": report
            .loads
            .iter()
            .map(|l| {
                serde_json::json!({
                    "teacher": l.teacher,
                    "groups": l.groups,
                    "weighted_sessions": l.weighted_sessions,
                })
            })
            .collect::<Vec<_>>(),
        "unfilled_groups": unfilled_groups,
        "findings": findings,
    });
    println!("{}", serde_json::to_string_pretty(&json)?);
    Ok(())
}

fn outcome_str(outcome: SolveOutcome) -> &'static str {
    match outcome {
        SolveOutcome::Optimal => "optimal",
        SolveOutcome::Feasible => "feasible",
        SolveOutcome::NoSolution => "no-solution",
    }
}

fn run_check(classes: &Path, teachers: &Path, format: &str) -> Result<()> {
    let (_, _, findings) = load_inputs(classes, teachers)?;

    match format {
        "json" => println!("{}", serde_json::to_string_pretty(&findings)?),
        _ => {
            if findings.is_empty() {
                println!("no findings");
            }
            for finding in &findings {
                println!("{finding}");
                for note in &finding.notes {
                    println!("  note: {note}");
                }
            }
        }
    }

    let errors = findings.iter().filter(|f| f.severity == Severity::Error).count();
    ExitCode::from_error_count(errors).exit();
}

fn run_normalize(classes: &Path, output: Option<&Path>) -> Result<()> {
    let table = read_table(classes)
        .with_context(|| format!("reading class table {}", classes.display()))?;
    let normalized = normalize_classes(&table).context("normalizing class table")?;

    for finding in &normalized.findings {
        eprintln!("{finding}");
    }

    match output {
        Some(path) => {
            let file = std::fs::File::create(path)
                .with_context(|| format!("creating {}", path.display()))?;
            write_sessions_csv(file, &normalized.sessions)?;
        }
        None => write_sessions_csv(std::io::stdout().lock(), &normalized.sessions)?,
    }
    Ok(())
}
