// src/sheet/records.rs

use serde::ser::{Serialize, SerializeMap, Serializer};

use super::tokenize::RowMatrix;

/// A single coerced cell.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FieldValue {
    Id(i64),
    Flag(bool),
    Text(String),
}

impl Serialize for FieldValue {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            FieldValue::Id(n) => serializer.serialize_i64(*n),
            FieldValue::Flag(b) => serializer.serialize_bool(*b),
            FieldValue::Text(s) => serializer.serialize_str(s),
        }
    }
}

/// One data row keyed by normalized header name, in header order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Record {
    fields: Vec<(String, FieldValue)>,
}

impl Record {
    pub fn new() -> Self {
        Self::default()
    }

    /// Set `name`; an existing field with the same name is overwritten in
    /// place.
    pub fn insert(&mut self, name: impl Into<String>, value: FieldValue) {
        let name = name.into();
        match self.fields.iter_mut().find(|(k, _)| *k == name) {
            Some((_, slot)) => *slot = value,
            None => self.fields.push((name, value)),
        }
    }

    pub fn get(&self, name: &str) -> Option<&FieldValue> {
        self.fields.iter().find(|(k, _)| k == name).map(|(_, v)| v)
    }

    pub fn id(&self) -> Option<i64> {
        match self.get("id") {
            Some(FieldValue::Id(n)) => Some(*n),
            _ => None,
        }
    }

    pub fn len(&self) -> usize {
        self.fields.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }
}

impl Serialize for Record {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.fields.len()))?;
        for (k, v) in &self.fields {
            map.serialize_entry(k, v)?;
        }
        map.end()
    }
}

/// Turn a header row plus data rows into typed records.
///
/// Short rows are padded with empty strings, long rows truncated to the
/// header width. `id` falls back to the row's 1-based data position when
/// the cell holds no integer; `completed` is true only for a
/// case-insensitive `"true"`.
pub fn to_records(matrix: &RowMatrix) -> Vec<Record> {
    let Some((header, rows)) = matrix.split_first() else {
        return Vec::new();
    };
    let names: Vec<String> = header.iter().map(|h| h.trim().to_lowercase()).collect();

    rows.iter()
        .enumerate()
        .map(|(i, row)| {
            let position = i as i64 + 1;
            let mut record = Record::new();
            for (col, name) in names.iter().enumerate() {
                let raw = row.get(col).map(String::as_str).unwrap_or("");
                record.insert(name.clone(), coerce(name, raw, position));
            }
            record
        })
        .collect()
}

fn coerce(name: &str, raw: &str, position: i64) -> FieldValue {
    match name {
        "id" => FieldValue::Id(parse_leading_int(raw).unwrap_or(position)),
        "completed" => FieldValue::Flag(raw.eq_ignore_ascii_case("true")),
        _ => FieldValue::Text(raw.to_string()),
    }
}

/// Integer prefix of `raw`: surrounding whitespace skipped, optional sign,
/// then the longest run of ASCII digits. `"12abc"` is 12, `"abc"` is None.
pub fn parse_leading_int(raw: &str) -> Option<i64> {
    let s = raw.trim();
    let (negative, digits) = match s.as_bytes().first() {
        Some(b'-') => (true, &s[1..]),
        Some(b'+') => (false, &s[1..]),
        _ => (false, s),
    };
    let end = digits
        .bytes()
        .position(|b| !b.is_ascii_digit())
        .unwrap_or(digits.len());
    if end == 0 {
        return None;
    }
    let n: i64 = digits[..end].parse().ok()?;
    Some(if negative { -n } else { n })
}
