//! Fixture sink - accumulates entities and writes one keyed document
//!
//! Layout of the document:
//!
//! ```yaml
//! Person:
//!   Person_1:
//!     first_name: Jane
//!     last_name: Doe
//!   Person_2:
//!     first_name: John
//!     last_name: Smith
//! ```
//!
//! An empty run produces an empty mapping (`{}`).

use std::fs::{self, File};
use std::io::Write;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use serde::ser::{Serialize, SerializeMap, Serializer};

use crate::migrate::error::{MigrateError, Result};
use crate::migrate::inflector::Inflector;
use crate::migrate::{Entity, FieldMap, RunOptions};

use super::{FixtureEncoder, Sink, SinkAction};

/// Two-level keyed fixture structure
#[derive(Debug, Clone, PartialEq)]
pub struct FixtureDocument {
    type_name: String,
    entries: Vec<FieldMap>,
}

impl FixtureDocument {
    pub fn new(type_name: impl Into<String>, entries: Vec<FieldMap>) -> Self {
        FixtureDocument {
            type_name: type_name.into(),
            entries,
        }
    }

    /// Build from entities, underscore-casing every field name
    pub fn from_entities<E: Entity>(type_name: &str, entities: &[E], inflector: &dyn Inflector) -> Self {
        let entries = entities
            .iter()
            .map(|e| e.to_field_map().map_keys(|k| inflector.underscore(k)))
            .collect();
        FixtureDocument::new(type_name, entries)
    }

    pub fn type_name(&self) -> &str {
        &self.type_name
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// `(key, fields)` pairs, keys numbered from 1 in accumulation order
    pub fn entries(&self) -> impl Iterator<Item = (String, &FieldMap)> {
        self.entries
            .iter()
            .enumerate()
            .map(|(i, fields)| (format!("{}_{}", self.type_name, i + 1), fields))
    }
}

/// Inner `{Type_n: fields}` mapping
struct Entries<'a>(&'a FixtureDocument);

impl Serialize for Entries<'_> {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.0.len()))?;
        for (key, fields) in self.0.entries() {
            map.serialize_entry(&key, fields)?;
        }
        map.end()
    }
}

impl Serialize for FixtureDocument {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        if self.entries.is_empty() {
            return serializer.serialize_map(Some(0))?.end();
        }
        let mut map = serializer.serialize_map(Some(1))?;
        map.serialize_entry(&self.type_name, &Entries(self))?;
        map.end()
    }
}

/// Holds every entity of a run and serializes them when closed
///
/// In dry mode the document goes to the report writer and nothing touches
/// the filesystem. Otherwise it is written to
/// `<fixture_dir>/<name>.<extension>`, where the name defaults to the
/// underscored type name.
pub struct FixtureSink<E> {
    entities: Vec<E>,
    fixture_dir: PathBuf,
    name: Option<String>,
    encoder: Box<dyn FixtureEncoder>,
    inflector: Arc<dyn Inflector>,
    report: Box<dyn Write>,
}

impl<E: Entity> FixtureSink<E> {
    pub fn new(
        fixture_dir: impl Into<PathBuf>,
        encoder: Box<dyn FixtureEncoder>,
        inflector: Arc<dyn Inflector>,
    ) -> Self {
        FixtureSink {
            entities: Vec::new(),
            fixture_dir: fixture_dir.into(),
            name: None,
            encoder,
            inflector,
            report: Box::new(std::io::stdout()),
        }
    }

    /// Override the fixture file name (without extension)
    pub fn with_name(mut self, name: Option<String>) -> Self {
        self.name = name;
        self
    }

    /// Where dry-run documents are written instead of a file
    pub fn with_report(mut self, report: Box<dyn Write>) -> Self {
        self.report = report;
        self
    }

    pub fn len(&self) -> usize {
        self.entities.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entities.is_empty()
    }

    /// Destination path for a given type name
    pub fn destination(&self, type_name: &str) -> PathBuf {
        let name = self
            .name
            .clone()
            .unwrap_or_else(|| self.inflector.underscore(type_name));
        self.fixture_dir
            .join(format!("{}.{}", name, self.encoder.extension()))
    }

    /// Encode everything accumulated so far and emit it
    pub fn finalize(&mut self, type_name: &str, dry: bool) -> Result<Option<PathBuf>> {
        let document = FixtureDocument::from_entities(type_name, &self.entities, self.inflector.as_ref());
        let encoded = self.encoder.encode(&document)?;

        if dry {
            self.report
                .write_all(encoded.as_bytes())
                .and_then(|_| self.report.flush())
                .map_err(MigrateError::Report)?;
            return Ok(None);
        }

        let path = self.destination(type_name);
        write_fixture(&path, &encoded)?;
        log::info!("Wrote {} {} fixture(s) to {}", document.len(), type_name, path.display());
        Ok(Some(path))
    }
}

fn write_fixture(path: &Path, encoded: &str) -> Result<()> {
    if let Some(dir) = path.parent() {
        if !dir.as_os_str().is_empty() {
            fs::create_dir_all(dir).map_err(|source| MigrateError::DestinationOpen {
                path: path.to_path_buf(),
                source,
            })?;
        }
    }

    let mut file = File::create(path).map_err(|source| MigrateError::DestinationOpen {
        path: path.to_path_buf(),
        source,
    })?;
    file.write_all(encoded.as_bytes())
        .map_err(|source| MigrateError::DestinationWrite {
            path: path.to_path_buf(),
            source,
        })
}

impl<E: Entity> Sink<E> for FixtureSink<E> {
    fn accept(&mut self, entity: E, record: u64, options: &RunOptions) -> Result<SinkAction> {
        if options.debug {
            log::debug!("Accumulating object from record {}", record);
        }
        self.entities.push(entity);
        Ok(SinkAction::Accumulated)
    }

    fn close(&mut self, type_name: &str, options: &RunOptions) -> Result<Option<PathBuf>> {
        self.finalize(type_name, options.dry)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::migrate::inflector::DefaultInflector;
    use crate::migrate::sink::YamlEncoder;
    use crate::migrate::{DynamicEntity, Value};
    use std::sync::Mutex;

    /// Report writer the test can read back after the sink is done with it
    #[derive(Clone, Default)]
    struct SharedBuffer(Arc<Mutex<Vec<u8>>>);

    impl Write for SharedBuffer {
        fn write(&mut self, buf: &[u8]) -> std::io::Result<usize> {
            self.0.lock().unwrap().extend_from_slice(buf);
            Ok(buf.len())
        }

        fn flush(&mut self) -> std::io::Result<()> {
            Ok(())
        }
    }

    impl SharedBuffer {
        fn contents(&self) -> String {
            String::from_utf8(self.0.lock().unwrap().clone()).unwrap()
        }
    }

    fn person(first: &str, last: &str) -> DynamicEntity {
        let mut e = DynamicEntity::new("Person");
        e.set("FirstName", Value::from(first));
        e.set("lastName", Value::from(last));
        e
    }

    fn sink(dir: &Path) -> FixtureSink<DynamicEntity> {
        FixtureSink::new(dir, Box::new(YamlEncoder), Arc::new(DefaultInflector))
    }

    #[test]
    fn test_document_keys_are_numbered_and_underscored() {
        let entities = vec![person("Jane", "Doe"), person("John", "Smith")];
        let doc = FixtureDocument::from_entities("Person", &entities, &DefaultInflector);

        let entries: Vec<_> = doc.entries().collect();
        assert_eq!(entries[0].0, "Person_1");
        assert_eq!(entries[1].0, "Person_2");
        assert_eq!(entries[1].1.get("first_name"), Some(&Value::from("John")));
        assert_eq!(entries[1].1.get("last_name"), Some(&Value::from("Smith")));
    }

    #[test]
    fn test_empty_document_is_empty_mapping() {
        let doc = FixtureDocument::new("Person", vec![]);
        assert_eq!(serde_yaml::to_string(&doc).unwrap(), "{}\n");
        assert_eq!(serde_json::to_value(&doc).unwrap(), serde_json::json!({}));
    }

    #[test]
    fn test_finalize_writes_default_named_file() {
        let dir = tempfile::tempdir().unwrap();
        let fixtures = dir.path().join("fixtures");
        let mut sink = sink(&fixtures);
        let opts = RunOptions::default();

        sink.accept(person("Jane", "Doe"), 1, &opts).unwrap();
        let written = sink.close("PersonAddress", &opts).unwrap();

        let expected = fixtures.join("person_address.yml");
        assert_eq!(written, Some(expected.clone()));
        let content = fs::read_to_string(&expected).unwrap();
        assert!(content.starts_with("PersonAddress:\n  PersonAddress_1:\n"));
    }

    #[test]
    fn test_debug_accept_accumulates_like_quiet_accept() {
        let dir = tempfile::tempdir().unwrap();
        let mut sink = sink(dir.path());
        let loud = RunOptions { dry: false, debug: true };

        assert_eq!(sink.accept(person("Jane", "Doe"), 1, &loud).unwrap(), SinkAction::Accumulated);
        assert_eq!(
            sink.accept(person("John", "Smith"), 2, &RunOptions::default()).unwrap(),
            SinkAction::Accumulated
        );
        assert_eq!(sink.len(), 2);
    }

    #[test]
    fn test_finalize_uses_supplied_name() {
        let dir = tempfile::tempdir().unwrap();
        let mut sink = sink(dir.path()).with_name(Some("people".to_string()));

        sink.finalize("Person", false).unwrap();
        assert_eq!(fs::read_to_string(dir.path().join("people.yml")).unwrap(), "{}\n");
    }

    #[test]
    fn test_dry_run_reports_and_writes_nothing() {
        let dir = tempfile::tempdir().unwrap();
        let report = SharedBuffer::default();
        let mut sink = sink(dir.path()).with_report(Box::new(report.clone()));
        let opts = RunOptions { dry: true, debug: false };

        sink.accept(person("Jane", "Doe"), 1, &opts).unwrap();
        let written = sink.close("Person", &opts).unwrap();

        assert_eq!(written, None);
        assert!(!dir.path().join("person.yml").exists());
        assert_eq!(
            report.contents(),
            "Person:\n  Person_1:\n    first_name: Jane\n    last_name: Doe\n"
        );
    }

    #[test]
    fn test_unopenable_destination_is_fatal() {
        let dir = tempfile::tempdir().unwrap();
        // A regular file where the fixture directory should be
        let blocker = dir.path().join("fixtures");
        fs::write(&blocker, "not a directory").unwrap();
        let mut sink = sink(&blocker);

        let err = sink.finalize("Person", false).unwrap_err();
        assert!(matches!(err, MigrateError::DestinationOpen { .. }));
    }
}
