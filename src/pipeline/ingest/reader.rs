//! Tabular source reading. Rows come back as field-name keyed records with no
//! entity semantics attached.

use std::fs::File;
use std::io::Read;
use std::path::{Path, PathBuf};
use std::rc::Rc;

use csv::{ReaderBuilder, StringRecord, StringRecordsIntoIter, Trim};

use super::IngestError;

/// A CSV file on disk. Every call to [`RecordSource::records`] starts a fresh
/// pass from the top of the file.
#[derive(Debug, Clone)]
pub struct RecordSource {
    path: PathBuf,
}

impl RecordSource {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn records(&self) -> Result<Records<File>, IngestError> {
        let file = File::open(&self.path).map_err(|source| IngestError::SourceAccess {
            path: self.path.clone(),
            source,
        })?;
        Records::from_reader(file, self.path.clone())
    }
}

/// One data row. Columns missing from the end of the line read as `""`.
#[derive(Debug, Clone)]
pub struct Record {
    headers: Rc<StringRecord>,
    values: StringRecord,
    line: u64,
}

impl Record {
    /// Value of the named field, or `""` if the row or header lacks it.
    pub fn get(&self, field: &str) -> &str {
        self.headers
            .iter()
            .position(|h| h == field)
            .and_then(|i| self.values.get(i))
            .unwrap_or("")
    }

    /// Value of the named field when non-empty.
    pub fn field(&self, field: &str) -> Option<&str> {
        Some(self.get(field)).filter(|v| !v.is_empty())
    }

    /// Line number in the source file.
    pub fn line(&self) -> u64 {
        self.line
    }
}

/// Lazy iterator over the data rows of one source.
pub struct Records<R: Read> {
    origin: PathBuf,
    headers: Rc<StringRecord>,
    inner: StringRecordsIntoIter<R>,
}

impl<R: Read> Records<R> {
    pub fn from_reader(reader: R, origin: PathBuf) -> Result<Self, IngestError> {
        let mut rdr = ReaderBuilder::new()
            .has_headers(true)
            .flexible(true)
            .trim(Trim::All)
            .from_reader(reader);
        let headers = rdr
            .headers()
            .map_err(|source| IngestError::Csv {
                path: origin.clone(),
                source,
            })?
            .clone();
        Ok(Self {
            origin,
            headers: Rc::new(headers),
            inner: rdr.into_records(),
        })
    }
}

impl<R: Read> Iterator for Records<R> {
    type Item = Result<Record, IngestError>;

    fn next(&mut self) -> Option<Self::Item> {
        loop {
            let values = match self.inner.next()? {
                Ok(values) => values,
                Err(source) => {
                    return Some(Err(IngestError::Csv {
                        path: self.origin.clone(),
                        source,
                    }))
                }
            };
            // whitespace-only lines
            if values.iter().all(str::is_empty) {
                continue;
            }
            let line = values.position().map_or(0, |p| p.line());
            return Some(Ok(Record {
                headers: Rc::clone(&self.headers),
                values,
                line,
            }));
        }
    }
}
