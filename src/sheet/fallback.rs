// src/sheet/fallback.rs

use once_cell::sync::Lazy;

use super::tokenize::RowMatrix;

static FALLBACK_ROWS: &[&[&str]] = &[
    &["id", "task", "completed", "created_date"],
    &["1", "Learn APIs", "FALSE", "2024-07-13"],
    &["2", "Build a REST API with Google Sheets", "FALSE", "2024-07-14"],
    &["3", "Deploy the API", "FALSE", "2024-07-15"],
];

static FALLBACK: Lazy<RowMatrix> = Lazy::new(|| {
    FALLBACK_ROWS
        .iter()
        .map(|row| row.iter().map(|c| c.to_string()).collect())
        .collect()
});

/// Demo rows served whenever the live sheet can't be read. Built once and
/// shared for the life of the process.
pub fn fallback_matrix() -> &'static RowMatrix {
    &FALLBACK
}
