//! Memory trace reader.
//!
//! A trace is a sequence of `<op> <addr>` records, where `op` is `r` or `w` and `addr` is a
//! 32-bit hexadecimal address with an optional `0x` prefix. Tokens are separated by any
//! whitespace; line breaks carry no meaning.

use std::fs;
use std::path::Path;

use crate::common::data::AccessType;
use crate::common::error::TraceError;

/// One memory access of a trace.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct TraceRecord {
    /// Read or write.
    pub op: AccessType,
    /// Byte address.
    pub addr: u32,
}

impl TraceRecord {
    /// Creates a read record.
    pub const fn read(addr: u32) -> Self {
        Self {
            op: AccessType::Read,
            addr,
        }
    }

    /// Creates a write record.
    pub const fn write(addr: u32) -> Self {
        Self {
            op: AccessType::Write,
            addr,
        }
    }
}

fn parse_op(record: usize, token: &str) -> Result<AccessType, TraceError> {
    match token {
        "r" => Ok(AccessType::Read),
        "w" => Ok(AccessType::Write),
        _ => Err(TraceError::IllegalOp {
            record,
            token: token.to_string(),
        }),
    }
}

fn parse_addr(record: usize, token: &str) -> Result<u32, TraceError> {
    let digits = token
        .strip_prefix("0x")
        .or_else(|| token.strip_prefix("0X"))
        .unwrap_or(token);
    if digits.is_empty() || !digits.bytes().all(|b| b.is_ascii_hexdigit()) {
        return Err(TraceError::BadAddress {
            record,
            token: token.to_string(),
        });
    }
    u32::from_str_radix(digits, 16).map_err(|_| TraceError::BadAddress {
        record,
        token: token.to_string(),
    })
}

/// Parses a whole trace.
///
/// # Errors
///
/// Returns the first malformed record as a [`TraceError`].
pub fn parse_trace(input: &str) -> Result<Vec<TraceRecord>, TraceError> {
    let mut tokens = input.split_whitespace();
    let mut records = Vec::new();
    while let Some(op_token) = tokens.next() {
        let record = records.len();
        let op = parse_op(record, op_token)?;
        let addr_token = tokens.next().ok_or(TraceError::MissingAddress { record })?;
        let addr = parse_addr(record, addr_token)?;
        records.push(TraceRecord { op, addr });
    }
    Ok(records)
}

/// A trace loaded from disk.
#[derive(Clone, Debug, Default)]
pub struct TraceReader {
    records: Vec<TraceRecord>,
}

impl TraceReader {
    /// Reads and parses the trace file at `path`.
    ///
    /// # Errors
    ///
    /// Returns [`TraceError::Io`] if the file cannot be read, or the first parse error.
    pub fn from_path(path: impl AsRef<Path>) -> Result<Self, TraceError> {
        let text = fs::read_to_string(path)?;
        Self::from_str_records(&text)
    }

    /// Parses a trace held in memory.
    ///
    /// # Errors
    ///
    /// Returns the first parse error.
    pub fn from_str_records(text: &str) -> Result<Self, TraceError> {
        Ok(Self {
            records: parse_trace(text)?,
        })
    }

    /// Parsed records in trace order.
    pub fn records(&self) -> &[TraceRecord] {
        &self.records
    }

    /// Number of records.
    pub fn len(&self) -> usize {
        self.records.len()
    }

    /// Returns `true` for an empty trace.
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Consumes the reader, yielding its records.
    pub fn into_records(self) -> Vec<TraceRecord> {
        self.records
    }
}
