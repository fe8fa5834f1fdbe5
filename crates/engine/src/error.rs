use std::fmt;

#[derive(Debug)]
pub enum EngineError {
    /// TOML parse / deserialization error.
    ConfigParse(String),
    /// Profile validation error (bad column index, empty rule value, etc.).
    ConfigValidation(String),
    /// Zero usable rows after parsing the input.
    EmptyInput,
    /// The classification column index does not resolve against the header.
    MissingColumn { index: usize, header_len: usize },
    /// Reference dataset header does not match the expected schema.
    /// `position` is 1-indexed, matching how operators read column numbers.
    StructureMismatch {
        position: usize,
        expected: String,
        found: String,
    },
    /// Expected and found header sequences have different lengths.
    ColumnCountMismatch { expected: usize, found: usize },
    /// A named sheet does not exist in the input workbook.
    UnknownSheet(String),
}

impl fmt::Display for EngineError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::ConfigParse(msg) => write!(f, "profile parse error: {msg}"),
            Self::ConfigValidation(msg) => write!(f, "profile validation error: {msg}"),
            Self::EmptyInput => write!(f, "input contains no usable rows"),
            Self::MissingColumn { index, header_len } => write!(
                f,
                "classification column index {index} does not exist (header has {header_len} columns)"
            ),
            Self::StructureMismatch {
                position,
                expected,
                found,
            } => write!(
                f,
                "reference file structure mismatch at column {position}: expected '{expected}', found '{found}'"
            ),
            Self::ColumnCountMismatch { expected, found } => write!(
                f,
                "reference file has wrong column count: expected {expected}, found {found}"
            ),
            Self::UnknownSheet(name) => write!(f, "sheet '{name}' does not exist in the workbook"),
        }
    }
}

impl std::error::Error for EngineError {}
