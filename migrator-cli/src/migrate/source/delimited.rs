//! Delimited text (CSV) record source

use std::fs::File;
use std::io::{self, Read};
use std::path::{Path, PathBuf};

use csv::{ReaderBuilder, StringRecordsIntoIter};

use crate::migrate::Record;
use crate::migrate::error::{MigrateError, Result};

use super::RecordSource;

/// Reader options for delimited files
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CsvOptions {
    /// Line buffer size in bytes
    pub max_line_length: usize,
    /// Field separator
    pub delimiter: u8,
    /// Quoting character
    pub enclosure: u8,
    /// Escape character inside quoted fields; `None` disables escaping
    ///
    /// An escape only stops the following enclosure from closing the field.
    /// Both bytes are kept in the value.
    pub escape: Option<u8>,
}

impl Default for CsvOptions {
    fn default() -> Self {
        CsvOptions {
            max_line_length: 4096,
            delimiter: b',',
            enclosure: b'"',
            escape: Some(b'\\'),
        }
    }
}

/// Headerless CSV file; rows may have differing widths
#[derive(Debug, Clone)]
pub struct CsvSource {
    path: PathBuf,
    options: CsvOptions,
}

impl CsvSource {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        CsvSource {
            path: path.into(),
            options: CsvOptions::default(),
        }
    }

    pub fn with_options(mut self, options: CsvOptions) -> Self {
        self.options = options;
        self
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn options(&self) -> &CsvOptions {
        &self.options
    }
}

impl RecordSource for CsvSource {
    type Cursor = CsvCursor;

    fn open(&self) -> Result<CsvCursor> {
        if self.options.max_line_length == 0 {
            return Err(MigrateError::SourceOpen {
                path: self.path.clone(),
                source: io::Error::new(
                    io::ErrorKind::InvalidInput,
                    "max_line_length must be greater than zero",
                ),
            });
        }

        let file = File::open(&self.path).map_err(|source| MigrateError::SourceOpen {
            path: self.path.clone(),
            source,
        })?;

        // Escapes are rewritten into doubled enclosures before parsing, so
        // the reader itself never drops a byte
        let reader = ReaderBuilder::new()
            .has_headers(false)
            .flexible(true)
            .buffer_capacity(self.options.max_line_length)
            .delimiter(self.options.delimiter)
            .quote(self.options.enclosure)
            .double_quote(true)
            .escape(None)
            .from_reader(EscapedEnclosures::new(file, &self.options));

        log::debug!("Opened {}", self.path.display());

        Ok(CsvCursor {
            records: reader.into_records(),
            read: 0,
        })
    }

    fn describe(&self) -> String {
        self.path.display().to_string()
    }
}

/// Open CSV file; the handle closes when this is dropped
pub struct CsvCursor {
    records: StringRecordsIntoIter<EscapedEnclosures<File>>,
    read: u64,
}

/// Rewrites `<escape><enclosure>` inside quoted fields to
/// `<escape><enclosure><enclosure>`
///
/// The csv reader then reads the doubled enclosure as a literal one, which
/// leaves the escape and the enclosure in the value and keeps every other
/// escape byte untouched.
struct EscapedEnclosures<R> {
    inner: R,
    escape: Option<u8>,
    enclosure: u8,
    delimiter: u8,
    in_quotes: bool,
    field_start: bool,
    just_closed: bool,
    after_escape: bool,
    pending: Vec<u8>,
    pos: usize,
}

impl<R: Read> EscapedEnclosures<R> {
    fn new(inner: R, options: &CsvOptions) -> Self {
        EscapedEnclosures {
            inner,
            escape: options.escape.filter(|e| *e != options.enclosure),
            enclosure: options.enclosure,
            delimiter: options.delimiter,
            in_quotes: false,
            field_start: true,
            just_closed: false,
            after_escape: false,
            pending: Vec::new(),
            pos: 0,
        }
    }

    fn push(&mut self, b: u8) {
        self.pending.push(b);

        if self.in_quotes {
            if self.after_escape {
                self.after_escape = false;
                if b == self.enclosure {
                    self.pending.push(self.enclosure);
                }
            } else if Some(b) == self.escape {
                self.after_escape = true;
            } else if b == self.enclosure {
                self.in_quotes = false;
                self.just_closed = true;
            }
            return;
        }

        if b == self.enclosure && (self.field_start || self.just_closed) {
            self.in_quotes = true;
            self.just_closed = false;
            self.field_start = false;
            return;
        }
        self.just_closed = false;
        self.field_start = b == self.delimiter || b == b'\n' || b == b'\r';
    }
}

impl<R: Read> Read for EscapedEnclosures<R> {
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        if self.escape.is_none() {
            return self.inner.read(buf);
        }

        while self.pos == self.pending.len() {
            self.pending.clear();
            self.pos = 0;

            let mut chunk = [0u8; 4096];
            let n = self.inner.read(&mut chunk)?;
            if n == 0 {
                return Ok(0);
            }
            for &b in &chunk[..n] {
                self.push(b);
            }
        }

        let n = buf.len().min(self.pending.len() - self.pos);
        buf[..n].copy_from_slice(&self.pending[self.pos..self.pos + n]);
        self.pos += n;
        Ok(n)
    }
}

impl Iterator for CsvCursor {
    type Item = Result<Record>;

    fn next(&mut self) -> Option<Self::Item> {
        let next = self.records.next()?;
        self.read += 1;
        Some(
            next.map(|row| row.iter().map(str::to_string).collect())
                .map_err(|e| MigrateError::SourceRead {
                    record: self.read,
                    source: Box::new(e),
                }),
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    fn write_csv(content: &str) -> tempfile::NamedTempFile {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(content.as_bytes()).unwrap();
        file
    }

    fn read_all(source: &CsvSource) -> Vec<Record> {
        source.open().unwrap().map(|r| r.unwrap()).collect()
    }

    #[test]
    fn test_reads_rows_without_header() {
        let file = write_csv("Jane,Doe\nJohn,Smith\n");
        let rows = read_all(&CsvSource::new(file.path()));

        assert_eq!(rows.len(), 2);
        assert_eq!(rows[0], vec!["Jane", "Doe"]);
        assert_eq!(rows[1], vec!["John", "Smith"]);
    }

    #[test]
    fn test_rows_may_differ_in_width() {
        let file = write_csv("a,b,c\nd\n");
        let rows = read_all(&CsvSource::new(file.path()));

        assert_eq!(rows[0].len(), 3);
        assert_eq!(rows[1], vec!["d"]);
    }

    #[test]
    fn test_quoted_fields_keep_delimiters() {
        let file = write_csv("\"Doe, Jane\",\"say \"\"hi\"\"\"\n");
        let rows = read_all(&CsvSource::new(file.path()));

        assert_eq!(rows[0], vec!["Doe, Jane", "say \"hi\""]);
    }

    #[test]
    fn test_custom_delimiter_and_enclosure() {
        let file = write_csv("'Doe; Jane';42\n");
        let options = CsvOptions {
            delimiter: b';',
            enclosure: b'\'',
            ..CsvOptions::default()
        };
        let rows = read_all(&CsvSource::new(file.path()).with_options(options));

        assert_eq!(rows[0], vec!["Doe; Jane", "42"]);
    }

    #[test]
    fn test_missing_file_is_source_open_error() {
        let source = CsvSource::new("/definitely/not/here.csv");
        match source.open() {
            Err(MigrateError::SourceOpen { path, .. }) => {
                assert_eq!(path, PathBuf::from("/definitely/not/here.csv"));
            }
            other => panic!("expected SourceOpen, got {:?}", other.map(|_| ())),
        }
    }

    #[test]
    fn test_backslashes_in_quoted_fields_are_kept() {
        let file = write_csv("\"C:\\temp\\new\",x\n");
        let rows = read_all(&CsvSource::new(file.path()));

        assert_eq!(rows[0], vec!["C:\\temp\\new", "x"]);
    }

    #[test]
    fn test_escaped_enclosure_does_not_close_field() {
        let file = write_csv("\"say \\\"hi\\\", ok\",2\n\"end\\\\\",3\n");
        let rows = read_all(&CsvSource::new(file.path()));

        assert_eq!(rows[0], vec!["say \\\"hi\\\", ok", "2"]);
        assert_eq!(rows[1], vec!["end\\\\", "3"]);
    }

    #[test]
    fn test_escape_can_be_disabled() {
        let file = write_csv("\"a\\\",b\n");
        let options = CsvOptions {
            escape: None,
            ..CsvOptions::default()
        };
        let rows = read_all(&CsvSource::new(file.path()).with_options(options));

        assert_eq!(rows[0], vec!["a\\", "b"]);
    }

    #[test]
    fn test_zero_line_length_is_rejected() {
        let file = write_csv("a,b\nc,d\n");
        let options = CsvOptions {
            max_line_length: 0,
            ..CsvOptions::default()
        };
        let source = CsvSource::new(file.path()).with_options(options);

        assert!(matches!(source.open(), Err(MigrateError::SourceOpen { .. })));
    }

    #[test]
    fn test_small_line_length_still_reads_long_rows() {
        let file = write_csv("abcdefghij,klmnopqrst\nu,v\n");
        let options = CsvOptions {
            max_line_length: 1,
            ..CsvOptions::default()
        };
        let rows = read_all(&CsvSource::new(file.path()).with_options(options));

        assert_eq!(rows, vec![vec!["abcdefghij", "klmnopqrst"], vec!["u", "v"]]);
    }

    #[test]
    fn test_empty_file_yields_no_records() {
        let file = write_csv("");
        assert!(read_all(&CsvSource::new(file.path())).is_empty());
    }
}
