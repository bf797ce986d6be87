use super::LoadError;
use chrono::{DateTime, Utc};
use csv::StringRecord;
use std::io::Read;
use std::path::Path;
use tracing::info;

/// The listings file exactly as read: a header row plus untyped records.
///
/// Typing happens after schema validation, which needs the headers alone.
#[derive(Debug, Clone)]
pub struct ListingsTable {
    headers: StringRecord,
    rows: Vec<StringRecord>,
    loaded_at: DateTime<Utc>,
}

impl ListingsTable {
    pub fn from_path<P: AsRef<Path>>(path: P) -> Result<Self, LoadError> {
        let path = path.as_ref();
        let file = std::fs::File::open(path).map_err(|err| LoadError::io(path, err))?;
        let table = Self::from_reader(file).map_err(|err| LoadError::csv(path, err))?;

        info!(
            path = %path.display(),
            rows = table.len(),
            columns = table.headers.len(),
            "listings table loaded"
        );
        Ok(table)
    }

    pub fn from_reader<R: Read>(reader: R) -> Result<Self, csv::Error> {
        let mut csv_reader = csv::ReaderBuilder::new()
            .trim(csv::Trim::All)
            .from_reader(reader);

        let headers = csv_reader.headers()?.clone();
        let rows = csv_reader
            .records()
            .collect::<Result<Vec<_>, csv::Error>>()?;

        Ok(Self {
            headers,
            rows,
            loaded_at: Utc::now(),
        })
    }

    pub fn column_index(&self, name: &str) -> Option<usize> {
        self.headers.iter().position(|header| header == name)
    }

    pub fn has_column(&self, name: &str) -> bool {
        self.column_index(name).is_some()
    }

    pub fn rows(&self) -> &[StringRecord] {
        &self.rows
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn loaded_at(&self) -> DateTime<Utc> {
        self.loaded_at
    }
}
