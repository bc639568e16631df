// src/sheet/mod.rs

pub mod append;
pub mod fallback;
pub mod fetch;
pub mod records;
pub mod tokenize;

pub use append::{AppendAdapter, NewTask};
pub use fallback::fallback_matrix;
pub use fetch::{build_client, FetchOutcome, SheetFetcher};
pub use records::{to_records, FieldValue, Record};
pub use tokenize::{sanitize, tokenize, tokenize_strict, tokenize_with, RawRow, RowMatrix};
