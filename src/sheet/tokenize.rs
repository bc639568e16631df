// src/sheet/tokenize.rs

use anyhow::{Context, Result};

use crate::config::TokenizerMode;

/// One spreadsheet line, quote characters removed.
pub type RawRow = Vec<String>;

/// All lines of an export; row 0 is normally the header.
pub type RowMatrix = Vec<RawRow>;

/// Naive CSV split: lines on `\n`, cells on `,`, every `"` dropped.
///
/// Quoted fields holding commas or newlines are split apart; downstream
/// consumers rely on that output, so it stays. A `\r` left over from a CRLF
/// line ending is removed with the terminator.
pub fn tokenize(raw: &str) -> RowMatrix {
    raw.split('\n')
        .map(|line| line.strip_suffix('\r').unwrap_or(line))
        .map(|line| line.split(',').map(|cell| cell.replace('"', "")).collect())
        .collect()
}

/// RFC-4180 parse. Rows may differ in length; no header handling.
pub fn tokenize_strict(raw: &str) -> Result<RowMatrix> {
    let mut reader = csv::ReaderBuilder::new()
        .has_headers(false)
        .flexible(true)
        .from_reader(raw.as_bytes());

    let mut rows = Vec::new();
    for (i, record) in reader.records().enumerate() {
        let record = record.with_context(|| format!("parsing csv record {}", i + 1))?;
        rows.push(record.iter().map(str::to_string).collect());
    }
    Ok(rows)
}

pub fn tokenize_with(mode: TokenizerMode, raw: &str) -> Result<RowMatrix> {
    match mode {
        TokenizerMode::Legacy => Ok(tokenize(raw)),
        TokenizerMode::Strict => tokenize_strict(raw),
    }
}

/// Drop rows in which every cell is empty or whitespace.
pub fn sanitize(matrix: RowMatrix) -> RowMatrix {
    matrix
        .into_iter()
        .filter(|row| row.iter().any(|cell| !cell.trim().is_empty()))
        .collect()
}
