//! `splitbook-engine` — tabular reclassification and partitioning engine.
//!
//! Pure engine crate: receives parsed tables, returns annotated output
//! sheets plus a run status. No CLI or IO dependencies; the workbook
//! reader/writer collaborators live in `splitbook-io`.

pub mod assemble;
pub mod cell;
pub mod error;
pub mod join;
pub mod journal;
pub mod partition;
pub mod profile;
pub mod report;
pub mod rules;
pub mod schema;
pub mod table;

pub use assemble::{CellStyle, SheetDoc, StyledCell};
pub use cell::{CellValue, CoerceKind};
pub use error::EngineError;
pub use profile::{ReportKind, ReportProfile};
pub use report::{RunOutput, RunStatus, Severity};
pub use table::Table;
