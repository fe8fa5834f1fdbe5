// splitbook CLI - headless month-end report runner
// One subcommand per report kind, plus the manual-journal builder.

mod exit_codes;

use std::path::{Path, PathBuf};
use std::process::ExitCode;

use clap::{Parser, Subcommand, ValueEnum};

use splitbook_engine::journal::{
    build_entry, EntryDirection, JournalRequest, DEFERRAL_TEMPLATE, JOURNAL_HEADERS,
    RECOGNITION_TEMPLATE,
};
use splitbook_engine::report::{run_join_report, run_rule_report, run_single_input};
use splitbook_engine::rules::RuleOutcome;
use splitbook_engine::{
    EngineError, ReportKind, ReportProfile, RunOutput, Severity, SheetDoc, Table,
};

use exit_codes::{engine_exit_code, EXIT_IO_READ, EXIT_IO_WRITE, EXIT_SUCCESS, EXIT_USAGE};

#[derive(Parser)]
#[command(name = "splitbook")]
#[command(about = "Back-office report splitter: bank partitions, reclassification, cross-checks")]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Split a receivables ageing dump into one sheet per bank
    #[command(after_help = "\
Examples:
  splitbook ageing antiguedad.txt
  splitbook ageing antiguedad.txt -o salida.xlsx
  splitbook ageing antiguedad.txt --profile custom.toml --json")]
    Ageing {
        /// Tab-delimited input file
        input: PathBuf,

        /// Output workbook (default: <input>_<suffix>.xlsx)
        #[arg(long, short = 'o')]
        output: Option<PathBuf>,

        /// TOML profile overriding the built-in column indices
        #[arg(long)]
        profile: Option<PathBuf>,

        /// Print a JSON summary to stdout
        #[arg(long)]
        json: bool,
    },

    /// Reclassify an OTC dump and flag alert codes
    #[command(after_help = "\
Exit code stays 0 when the alert code is found; the status line (and the
JSON summary) carries the count instead.

Examples:
  splitbook otc reporte_otc.txt
  splitbook otc reporte_otc.txt --json")]
    Otc {
        /// Tab-delimited report dump (preamble included)
        input: PathBuf,

        #[arg(long, short = 'o')]
        output: Option<PathBuf>,

        #[arg(long)]
        profile: Option<PathBuf>,

        #[arg(long)]
        json: bool,
    },

    /// Group unidentified receipts by bank, normalizing date columns
    #[command(after_help = "\
Examples:
  splitbook unidentify ingresos.xlsx
  splitbook unidentify ingresos.xlsx --sheet Marzo")]
    Unidentify {
        /// Input workbook
        input: PathBuf,

        /// Sheet to read (default: first sheet)
        #[arg(long)]
        sheet: Option<String>,

        #[arg(long, short = 'o')]
        output: Option<PathBuf>,

        #[arg(long)]
        profile: Option<PathBuf>,

        #[arg(long)]
        json: bool,
    },

    /// Cross-check a deposit statement against the detraction master
    #[command(after_help = "\
The master workbook must match the expected 21-column layout exactly;
any renamed or reordered column aborts the run before the cross-check.

Examples:
  splitbook detraction constancias.xlsx maestro.xlsx
  splitbook detraction constancias.xlsx maestro.xlsx -o nuevos.xlsx")]
    Detraction {
        /// Deposit statement workbook (downloaded constancias)
        deposits: PathBuf,

        /// Master ledger workbook
        master: PathBuf,

        #[arg(long, short = 'o')]
        output: Option<PathBuf>,

        #[arg(long)]
        profile: Option<PathBuf>,

        #[arg(long)]
        json: bool,
    },

    /// Split write-off rows by currency into the manual-journal layout
    #[command(name = "write-off", after_help = "\
Zero-amount rows are dropped, the rest sorted ascending by amount, and
one workbook is written per currency with data.

Examples:
  splitbook write-off castigos.xlsx
  splitbook write-off castigos.xlsx --json")]
    WriteOff {
        /// Input workbook
        input: PathBuf,

        #[arg(long)]
        profile: Option<PathBuf>,

        #[arg(long)]
        json: bool,
    },

    /// Build a balanced two-line manual journal entry as CSV
    #[command(after_help = "\
Examples:
  splitbook journal --template recognition --amount 1500.50 --memo 'ingresos marzo'
  splitbook journal --template deferral --direction reverse --amount 800 --memo 'extorno' -o asiento.csv")]
    Journal {
        /// Account-pair template
        #[arg(long, value_enum)]
        template: TemplateArg,

        /// Post the movement or reverse a prior posting
        #[arg(long, value_enum, default_value = "post")]
        direction: DirectionArg,

        /// Entry amount (must be positive)
        #[arg(long)]
        amount: f64,

        /// Memo text carried on both lines
        #[arg(long)]
        memo: String,

        /// Income-line sector (default 90)
        #[arg(long, default_value = "")]
        sector: String,

        /// Income-line activity code (default 9053)
        #[arg(long, default_value = "")]
        code_activity: String,

        /// Income-line cost center (default 9115)
        #[arg(long, default_value = "")]
        cost_center: String,

        /// Income-line location (default 024)
        #[arg(long, default_value = "")]
        location: String,

        /// Output CSV (default: Asiento_<template>_<yyyymmdd>.csv)
        #[arg(long, short = 'o')]
        output: Option<PathBuf>,
    },
}

#[derive(Clone, Copy, ValueEnum)]
enum TemplateArg {
    /// Deferred revenue: 4000411 against 3500600
    Deferral,
    /// Income recognition: 4000415 against 1651111
    Recognition,
}

#[derive(Clone, Copy, ValueEnum)]
enum DirectionArg {
    Post,
    Reverse,
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    let result = match cli.command {
        Commands::Ageing {
            input,
            output,
            profile,
            json,
        } => cmd_delimited_partition(ReportProfile::ageing, input, output, profile, json),
        Commands::Otc {
            input,
            output,
            profile,
            json,
        } => cmd_otc(input, output, profile, json),
        Commands::Unidentify {
            input,
            sheet,
            output,
            profile,
            json,
        } => cmd_unidentify(input, sheet, output, profile, json),
        Commands::Detraction {
            deposits,
            master,
            output,
            profile,
            json,
        } => cmd_detraction(deposits, master, output, profile, json),
        Commands::WriteOff {
            input,
            profile,
            json,
        } => cmd_write_off(input, profile, json),
        Commands::Journal {
            template,
            direction,
            amount,
            memo,
            sector,
            code_activity,
            cost_center,
            location,
            output,
        } => cmd_journal(
            template,
            direction,
            amount,
            memo,
            sector,
            code_activity,
            cost_center,
            location,
            output,
        ),
    };

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

#[derive(Debug)]
pub struct CliError {
    pub code: u8,
    pub message: String,
    pub hint: Option<String>,
}

impl CliError {
    fn args(msg: impl Into<String>) -> Self {
        Self {
            code: EXIT_USAGE,
            message: msg.into(),
            hint: None,
        }
    }

    fn read(msg: impl Into<String>) -> Self {
        Self {
            code: EXIT_IO_READ,
            message: msg.into(),
            hint: None,
        }
    }

    fn write(msg: impl Into<String>) -> Self {
        Self {
            code: EXIT_IO_WRITE,
            message: msg.into(),
            hint: None,
        }
    }
}

impl From<EngineError> for CliError {
    fn from(err: EngineError) -> Self {
        Self {
            code: engine_exit_code(&err),
            message: err.to_string(),
            hint: None,
        }
    }
}

// ============================================================================
// Report commands
// ============================================================================

fn cmd_delimited_partition(
    builtin: fn() -> ReportProfile,
    input: PathBuf,
    output: Option<PathBuf>,
    profile_path: Option<PathBuf>,
    json: bool,
) -> Result<(), CliError> {
    let profile = load_profile(builtin, profile_path)?;
    let content = splitbook_io::text::read_file_as_utf8(&input).map_err(CliError::read)?;
    let table = Table::from_delimited_text(&content)?;

    let run = run_single_input(&profile, &table)?;
    let out_path = output.unwrap_or_else(|| default_output(&input, &profile.suffix));
    let outputs = write_single_workbook(&run.sheets, &out_path)?;
    finish(&run, &outputs, json)
}

fn cmd_otc(
    input: PathBuf,
    output: Option<PathBuf>,
    profile_path: Option<PathBuf>,
    json: bool,
) -> Result<(), CliError> {
    let profile = load_profile(ReportProfile::otc, profile_path)?;
    if profile.kind != ReportKind::Otc {
        return Err(CliError::args(format!(
            "profile '{}' is not an otc profile",
            profile.name
        )));
    }
    let content = splitbook_io::text::read_file_as_utf8(&input).map_err(CliError::read)?;
    let all_rows = Table::rows_from_delimited_text(&content)?;

    let run = run_rule_report(&profile, &all_rows)?;
    let out_path = output.unwrap_or_else(|| default_output(&input, &profile.suffix));
    let outputs = write_single_workbook(&run.sheets, &out_path)?;
    finish(&run, &outputs, json)
}

fn cmd_unidentify(
    input: PathBuf,
    sheet: Option<String>,
    output: Option<PathBuf>,
    profile_path: Option<PathBuf>,
    json: bool,
) -> Result<(), CliError> {
    let profile = load_profile(ReportProfile::unidentified, profile_path)?;
    if let Some(ref name) = sheet {
        require_sheet(&input, name)?;
    }
    let raw = splitbook_io::xlsx::read_sheet_rows(&input, sheet.as_deref())
        .map_err(CliError::read)?;
    let table = Table::from_sheet_rows(raw)?;

    let run = run_single_input(&profile, &table)?;
    let out_path = output.unwrap_or_else(|| default_output(&input, &profile.suffix));
    let outputs = write_single_workbook(&run.sheets, &out_path)?;
    finish(&run, &outputs, json)
}

fn cmd_detraction(
    deposits: PathBuf,
    master: PathBuf,
    output: Option<PathBuf>,
    profile_path: Option<PathBuf>,
    json: bool,
) -> Result<(), CliError> {
    let profile = load_profile(ReportProfile::detraction, profile_path)?;

    let primary_raw = splitbook_io::xlsx::read_sheet_rows(&deposits, None).map_err(CliError::read)?;
    let primary = Table::from_sheet_rows(primary_raw)?;

    if let Some(ref name) = profile.reference_sheet {
        require_sheet(&master, name)?;
    }
    let reference_raw =
        splitbook_io::xlsx::read_sheet_rows(&master, profile.reference_sheet.as_deref())
            .map_err(CliError::read)?;
    let reference = Table::from_sheet_rows(reference_raw)?;

    let run = run_join_report(&profile, &primary, &reference)?;
    let out_path = output.unwrap_or_else(|| default_output(&deposits, &profile.suffix));
    let outputs = write_single_workbook(&run.sheets, &out_path)?;
    finish(&run, &outputs, json)
}

fn cmd_write_off(
    input: PathBuf,
    profile_path: Option<PathBuf>,
    json: bool,
) -> Result<(), CliError> {
    let profile = load_profile(ReportProfile::write_off, profile_path)?;
    let raw = splitbook_io::xlsx::read_sheet_rows(&input, None).map_err(CliError::read)?;
    let table = Table::from_sheet_rows(raw)?;

    let run = run_single_input(&profile, &table)?;

    // One workbook per currency sheet, named after the currency.
    let mut outputs = Vec::new();
    for sheet in &run.sheets {
        let currency = sheet.name.strip_prefix("Reporte ").unwrap_or(&sheet.name);
        let stem = file_stem(&input);
        let name = format!("{stem}_{currency}_{}.xlsx", profile.suffix);
        let path = input.with_file_name(name);
        splitbook_io::xlsx::write_workbook(std::slice::from_ref(sheet), &path)
            .map_err(CliError::write)?;
        outputs.push(path);
    }
    finish(&run, &outputs, json)
}

#[allow(clippy::too_many_arguments)]
fn cmd_journal(
    template: TemplateArg,
    direction: DirectionArg,
    amount: f64,
    memo: String,
    sector: String,
    code_activity: String,
    cost_center: String,
    location: String,
    output: Option<PathBuf>,
) -> Result<(), CliError> {
    let (template_name, template) = match template {
        TemplateArg::Deferral => ("deferral", DEFERRAL_TEMPLATE),
        TemplateArg::Recognition => ("recognition", RECOGNITION_TEMPLATE),
    };
    let direction = match direction {
        DirectionArg::Post => EntryDirection::Post,
        DirectionArg::Reverse => EntryDirection::Reverse,
    };
    let request = JournalRequest {
        sector,
        code_activity,
        cost_center,
        location,
        amount,
        memo,
    };
    let lines = build_entry(template, direction, &request)?;

    let path = output.unwrap_or_else(|| {
        let stamp = chrono::Local::now().format("%Y%m%d");
        PathBuf::from(format!("Asiento_{template_name}_{stamp}.csv"))
    });
    splitbook_io::csv::export_journal(&JOURNAL_HEADERS, &lines, &path).map_err(CliError::write)?;
    eprintln!("wrote {}", path.display());
    Ok(())
}

// ============================================================================
// Shared plumbing
// ============================================================================

fn load_profile(
    builtin: fn() -> ReportProfile,
    profile_path: Option<PathBuf>,
) -> Result<ReportProfile, CliError> {
    match profile_path {
        None => Ok(builtin()),
        Some(path) => {
            let content = std::fs::read_to_string(&path).map_err(|e| {
                CliError::read(format!("cannot read profile {}: {e}", path.display()))
            })?;
            Ok(ReportProfile::from_toml(&content)?)
        }
    }
}

/// Fail early with the sheet registry when a named sheet is absent, so
/// the error carries the exact name instead of a mid-read failure.
fn require_sheet(path: &Path, name: &str) -> Result<(), CliError> {
    let names = splitbook_io::xlsx::sheet_names(path).map_err(CliError::read)?;
    if names.iter().any(|n| n == name) {
        Ok(())
    } else {
        Err(EngineError::UnknownSheet(name.to_string()).into())
    }
}

fn file_stem(path: &Path) -> String {
    path.file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_else(|| "salida".to_string())
}

fn default_output(input: &Path, suffix: &str) -> PathBuf {
    input.with_file_name(format!("{}_{suffix}.xlsx", file_stem(input)))
}

/// Write all sheets into one workbook. A run with no sheets (e.g. a
/// cross-check that found nothing new) writes no file.
fn write_single_workbook(sheets: &[SheetDoc], path: &Path) -> Result<Vec<PathBuf>, CliError> {
    if sheets.is_empty() {
        return Ok(vec![]);
    }
    splitbook_io::xlsx::write_workbook(sheets, path).map_err(CliError::write)?;
    Ok(vec![path.to_path_buf()])
}

#[derive(serde::Serialize)]
struct RunSummary<'a> {
    severity: Severity,
    message: &'a str,
    outputs: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    outcome: Option<&'a RuleOutcome>,
}

fn finish(run: &RunOutput, outputs: &[PathBuf], json: bool) -> Result<(), CliError> {
    for path in outputs {
        eprintln!("wrote {}", path.display());
    }
    match run.status.severity {
        Severity::Warning => eprintln!("warning: {}", run.status.message),
        Severity::Success => eprintln!("{}", run.status.message),
    }

    if json {
        let summary = RunSummary {
            severity: run.status.severity,
            message: &run.status.message,
            outputs: outputs.iter().map(|p| p.display().to_string()).collect(),
            outcome: run.outcome.as_ref(),
        };
        let rendered = serde_json::to_string_pretty(&summary)
            .map_err(|e| CliError::write(format!("JSON serialization error: {e}")))?;
        println!("{rendered}");
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_output_keeps_directory_and_stem() {
        let out = default_output(Path::new("/data/antiguedad.txt"), "AgeingReport");
        assert_eq!(out, PathBuf::from("/data/antiguedad_AgeingReport.xlsx"));
    }

    #[test]
    fn default_output_without_extension() {
        let out = default_output(Path::new("reporte"), "OTC_Reporte");
        assert_eq!(out, PathBuf::from("reporte_OTC_Reporte.xlsx"));
    }

    #[test]
    fn builtin_profile_used_when_no_override() {
        let profile = load_profile(ReportProfile::ageing, None).unwrap();
        assert_eq!(profile.kind, ReportKind::Ageing);
    }

    #[test]
    fn profile_override_is_parsed_and_validated() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("bad.toml");
        std::fs::write(&path, "name = \"x\"\nkind = \"ageing\"\nsuffix = \"S\"\n").unwrap();
        let err = load_profile(ReportProfile::ageing, Some(path)).unwrap_err();
        assert_eq!(err.code, exit_codes::EXIT_REPORT_PROFILE);
    }
}
