//! CSV record parsing into an in-memory dataset.
//!
//! Input format: a header line `id,<features...>,<target>` followed by data
//! rows. The first column is an opaque record id, the last column is the
//! numeric target, and everything in between is a numeric feature. Fields
//! are comma-separated and trimmed; quoting is not supported.

use std::collections::HashSet;
use std::fmt;

use ndarray::{Array1, Array2};

/// Errors produced while parsing a record file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DatasetError {
    /// Input had no header line.
    MissingHeader,
    /// Header must contain an id column, at least one feature, and a target.
    HeaderTooNarrow { columns: usize },
    /// Input had a header but no data rows.
    NoRecords,
    /// A row's field count does not match the header.
    ArityMismatch {
        line: usize,
        expected: usize,
        found: usize,
    },
    /// A record id was empty.
    EmptyId { line: usize },
    /// A record id appeared more than once.
    DuplicateId { line: usize, id: String },
    /// A numeric cell failed to parse.
    InvalidNumber {
        line: usize,
        column: String,
        value: String,
    },
}

impl fmt::Display for DatasetError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DatasetError::MissingHeader => write!(f, "input has no header line"),
            DatasetError::HeaderTooNarrow { columns } => write!(
                f,
                "header has {columns} columns (need id, at least one feature, and a target)"
            ),
            DatasetError::NoRecords => write!(f, "input has no data rows"),
            DatasetError::ArityMismatch {
                line,
                expected,
                found,
            } => write!(
                f,
                "line {line}: expected {expected} fields, found {found}"
            ),
            DatasetError::EmptyId { line } => write!(f, "line {line}: empty record id"),
            DatasetError::DuplicateId { line, id } => {
                write!(f, "line {line}: duplicate record id '{id}'")
            }
            DatasetError::InvalidNumber {
                line,
                column,
                value,
            } => write!(f, "line {line}: column '{column}': invalid number '{value}'"),
        }
    }
}

impl std::error::Error for DatasetError {}

/// Parsed record file: ids, named features, and targets.
#[derive(Debug, Clone, PartialEq)]
pub struct Dataset {
    /// Record ids in file order.
    pub ids: Vec<String>,
    /// Feature column names from the header.
    pub feature_names: Vec<String>,
    /// Target column name from the header.
    pub target_name: String,
    /// Feature matrix, one row per record.
    pub features: Array2<f64>,
    /// Target values, one per record.
    pub targets: Array1<f64>,
}

impl Dataset {
    /// Parse CSV contents into a dataset.
    ///
    /// Blank lines are skipped and CRLF line endings are tolerated. Record
    /// ids must be unique and every row must match the header arity.
    pub fn from_csv(contents: &str) -> Result<Self, DatasetError> {
        let mut lines = contents
            .lines()
            .enumerate()
            .map(|(idx, line)| (idx + 1, line.trim_end_matches('\r')))
            .filter(|(_, line)| !line.trim().is_empty());

        let (_, header) = lines.next().ok_or(DatasetError::MissingHeader)?;
        let columns: Vec<String> = header.split(',').map(|col| col.trim().to_string()).collect();
        if columns.len() < 3 {
            return Err(DatasetError::HeaderTooNarrow {
                columns: columns.len(),
            });
        }
        let feature_names = columns[1..columns.len() - 1].to_vec();
        let target_name = columns[columns.len() - 1].clone();

        let mut ids = Vec::new();
        let mut rows: Vec<Vec<f64>> = Vec::new();
        let mut targets = Vec::new();
        let mut seen = HashSet::new();

        for (line_no, line) in lines {
            let fields: Vec<&str> = line.split(',').map(str::trim).collect();
            if fields.len() != columns.len() {
                return Err(DatasetError::ArityMismatch {
                    line: line_no,
                    expected: columns.len(),
                    found: fields.len(),
                });
            }

            let id = fields[0];
            if id.is_empty() {
                return Err(DatasetError::EmptyId { line: line_no });
            }
            if !seen.insert(id.to_string()) {
                return Err(DatasetError::DuplicateId {
                    line: line_no,
                    id: id.to_string(),
                });
            }

            let mut row = Vec::with_capacity(feature_names.len());
            for (name, value) in feature_names.iter().zip(&fields[1..fields.len() - 1]) {
                row.push(parse_number(line_no, name, value)?);
            }
            let target = parse_number(line_no, &target_name, fields[fields.len() - 1])?;

            ids.push(id.to_string());
            rows.push(row);
            targets.push(target);
        }

        if rows.is_empty() {
            return Err(DatasetError::NoRecords);
        }

        let mut features = Array2::zeros((rows.len(), feature_names.len()));
        for (i, row) in rows.iter().enumerate() {
            for (j, value) in row.iter().enumerate() {
                features[[i, j]] = *value;
            }
        }

        Ok(Self {
            ids,
            feature_names,
            target_name,
            features,
            targets: Array1::from_vec(targets),
        })
    }

    /// Number of records.
    pub fn len(&self) -> usize {
        self.ids.len()
    }

    /// True when the dataset holds no records (unreachable via `from_csv`).
    pub fn is_empty(&self) -> bool {
        self.ids.is_empty()
    }

    /// Number of feature columns.
    pub fn feature_count(&self) -> usize {
        self.feature_names.len()
    }
}

fn parse_number(line: usize, column: &str, value: &str) -> Result<f64, DatasetError> {
    value
        .parse::<f64>()
        .map_err(|_| DatasetError::InvalidNumber {
            line,
            column: column.to_string(),
            value: value.to_string(),
        })
}
