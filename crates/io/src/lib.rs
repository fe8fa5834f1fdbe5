//! `splitbook-io` — file IO for the report engine.
//!
//! The engine crate works on logical tables and annotated sheets; this
//! crate owns the byte-level boundaries: delimited text decoding, the
//! workbook reader/writer pair, and the journal CSV export.

pub mod csv;
pub mod text;
pub mod xlsx;
