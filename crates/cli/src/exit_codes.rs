//! CLI Exit Code Registry
//!
//! This is the single source of truth for all CLI exit codes.
//! Exit codes are part of the shell contract — month-end batch scripts
//! rely on them.
//!
//! # Exit Code Ranges
//!
//! | Range   | Domain           | Description                              |
//! |---------|------------------|------------------------------------------|
//! | 0       | Universal        | Success (warnings included)              |
//! | 1       | Universal        | General error (unspecified)              |
//! | 2       | Universal        | CLI usage error (bad args, missing file) |
//! | 3-9     | report           | Report pipeline codes                    |
//! | 10-19   | io               | File read/write codes                    |
//!
//! # Adding New Exit Codes
//!
//! 1. Add the constant in the appropriate range
//! 2. Document what triggers it
//! 3. Update the table above
//! 4. Wire it into the relevant command's error handling

use splitbook_engine::EngineError;

// =============================================================================
// Universal (0-2)
// =============================================================================

/// Success - command completed without errors. Alert warnings still
/// exit 0; they change the status line, not the shell contract.
pub const EXIT_SUCCESS: u8 = 0;

/// General error - unspecified failure.
/// Avoid using this; prefer a specific error code.
pub const EXIT_ERROR: u8 = 1;

/// Usage error - bad arguments, missing required options.
pub const EXIT_USAGE: u8 = 2;

// =============================================================================
// Report pipeline (3-9)
// =============================================================================

/// Input parsed to zero rows.
pub const EXIT_REPORT_EMPTY: u8 = 3;

/// A configured column index lies beyond the header row.
pub const EXIT_REPORT_MISSING_COLUMN: u8 = 4;

/// Reference schema mismatch (wrong column count or a renamed column).
pub const EXIT_REPORT_SCHEMA: u8 = 5;

/// Profile TOML failed to parse or validate.
pub const EXIT_REPORT_PROFILE: u8 = 6;

/// Named sheet absent from the workbook.
pub const EXIT_REPORT_SHEET: u8 = 7;

// =============================================================================
// IO (10-19)
// =============================================================================

/// Cannot read an input file.
pub const EXIT_IO_READ: u8 = 10;

/// Cannot write an output file.
pub const EXIT_IO_WRITE: u8 = 11;

/// Map an engine error to its exit code.
pub fn engine_exit_code(err: &EngineError) -> u8 {
    match err {
        EngineError::EmptyInput => EXIT_REPORT_EMPTY,
        EngineError::MissingColumn { .. } => EXIT_REPORT_MISSING_COLUMN,
        EngineError::StructureMismatch { .. } | EngineError::ColumnCountMismatch { .. } => {
            EXIT_REPORT_SCHEMA
        }
        EngineError::ConfigParse(_) | EngineError::ConfigValidation(_) => EXIT_REPORT_PROFILE,
        EngineError::UnknownSheet(_) => EXIT_REPORT_SHEET,
    }
}
