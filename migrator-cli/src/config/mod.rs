//! Migration configuration files
//!
//! One TOML file describes one migration: where the CSV lives, which entity
//! the rows become, which hooks run and where fixtures or committed rows go.
//! Relative paths are resolved against the directory holding the file.

use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result, bail};
use serde::Deserialize;

use crate::migrate::{
    CsvOptions, DynamicEntity, EntityBuilder, EntityRegistry, FieldHooks, FieldMapping,
    FixtureFormat, Inflector, ObjectHooks, library,
};

const DEFAULT_FIXTURE_DIR: &str = "data/fixtures";
const STORE_FILE_NAME: &str = "store.db";

/// Top-level migration file
#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct MigrationConfig {
    pub source: SourceConfig,
    pub entity: EntityConfig,
    #[serde(default)]
    pub hooks: HooksConfig,
    #[serde(default)]
    pub fixture: FixtureConfig,
    #[serde(default)]
    pub store: StoreConfig,
    /// Directory relative paths resolve against
    #[serde(skip)]
    base_dir: PathBuf,
}

/// `[source]` - the CSV file and its reader options
#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct SourceConfig {
    pub file: PathBuf,
    #[serde(default)]
    pub delimiter: Option<char>,
    #[serde(default)]
    pub enclosure: Option<char>,
    #[serde(default)]
    pub escape: Option<char>,
    #[serde(default)]
    pub max_line_length: Option<usize>,
}

/// `[entity]` - target type and positional field list
#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct EntityConfig {
    pub class: String,
    pub fields: FieldMapping,
}

/// `[hooks]` - hook names per field, and object hooks
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct HooksConfig {
    #[serde(default)]
    pub fields: BTreeMap<String, HookList>,
    #[serde(default)]
    pub object: HookList,
}

/// A single hook name or a list of them; always read as a list
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(from = "OneOrMany")]
pub struct HookList(pub Vec<String>);

#[derive(Deserialize)]
#[serde(untagged)]
enum OneOrMany {
    One(String),
    Many(Vec<String>),
}

impl From<OneOrMany> for HookList {
    fn from(value: OneOrMany) -> Self {
        match value {
            OneOrMany::One(s) => HookList(vec![s]),
            OneOrMany::Many(v) => HookList(v),
        }
    }
}

/// `[fixture]` - fixture output
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct FixtureConfig {
    #[serde(default)]
    pub dir: Option<PathBuf>,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub format: FixtureFormat,
}

/// `[store]` - SQLite database for committed entities
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct StoreConfig {
    #[serde(default)]
    pub database: Option<PathBuf>,
}

impl MigrationConfig {
    /// Load and validate a migration file
    pub fn load(path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path)
            .with_context(|| format!("Failed to read migration config: {}", path.display()))?;
        let base_dir = path
            .parent()
            .map(Path::to_path_buf)
            .unwrap_or_default();
        Self::from_toml(&content, base_dir)
            .with_context(|| format!("Invalid migration config: {}", path.display()))
    }

    /// Parse from TOML text, resolving relative paths against `base_dir`
    pub fn from_toml(content: &str, base_dir: impl Into<PathBuf>) -> Result<Self> {
        let mut config: MigrationConfig =
            toml::from_str(content).context("Failed to parse migration config")?;
        config.base_dir = base_dir.into();
        config.validate()?;
        Ok(config)
    }

    fn validate(&self) -> Result<()> {
        if self.entity.class.trim().is_empty() {
            bail!("entity.class cannot be empty");
        }
        if self.entity.fields.fields().next().is_none() {
            bail!("entity.fields must name at least one field");
        }
        self.csv_options()?;
        if let Some(name) = &self.fixture.name {
            if name.trim().is_empty() || name.contains(['/', '\\']) {
                bail!("fixture.name must be a plain file name, got '{}'", name);
            }
        }
        Ok(())
    }

    fn resolve(&self, path: &Path) -> PathBuf {
        if path.is_absolute() {
            path.to_path_buf()
        } else {
            self.base_dir.join(path)
        }
    }

    /// CSV file path
    pub fn source_file(&self) -> PathBuf {
        self.resolve(&self.source.file)
    }

    /// Reader options, falling back to defaults for unset values
    pub fn csv_options(&self) -> Result<CsvOptions> {
        let defaults = CsvOptions::default();
        let max_line_length = self.source.max_line_length.unwrap_or(defaults.max_line_length);
        if max_line_length == 0 {
            bail!("source.max_line_length must be greater than zero");
        }
        Ok(CsvOptions {
            max_line_length,
            delimiter: ascii_byte("source.delimiter", self.source.delimiter)?
                .unwrap_or(defaults.delimiter),
            enclosure: ascii_byte("source.enclosure", self.source.enclosure)?
                .unwrap_or(defaults.enclosure),
            escape: ascii_byte("source.escape", self.source.escape)?.or(defaults.escape),
        })
    }

    /// Directory fixture files are written to
    pub fn fixture_dir(&self) -> PathBuf {
        match &self.fixture.dir {
            Some(dir) => self.resolve(dir),
            None => self.base_dir.join(DEFAULT_FIXTURE_DIR),
        }
    }

    /// SQLite database path; defaults to the user data directory
    pub fn database_path(&self) -> PathBuf {
        match &self.store.database {
            Some(db) => self.resolve(db),
            None => dirs::data_dir()
                .map(|d| d.join("csv-migrator").join(STORE_FILE_NAME))
                .unwrap_or_else(|| self.base_dir.join(STORE_FILE_NAME)),
        }
    }

    /// Field hooks resolved through the built-in hook library
    pub fn field_hooks(&self) -> FieldHooks {
        let mut hooks = FieldHooks::new();
        for (field, names) in &self.hooks.fields {
            hooks.set(field.clone(), names.0.iter().map(|n| library::field_hook(n)).collect());
        }
        hooks
    }

    /// Object hooks resolved through the built-in hook library
    pub fn object_hooks(&self) -> ObjectHooks<DynamicEntity> {
        self.hooks.object.0.iter().map(|n| library::object_hook(n)).collect()
    }

    /// Registry holding the schemaless entity type this file describes
    pub fn registry(&self, inflector: &dyn Inflector) -> EntityRegistry<DynamicEntity> {
        let type_name = inflector.camelize(self.entity.class.trim());
        EntityRegistry::new().with(DynamicEntity::entity_type(
            type_name,
            self.entity.fields.fields().map(str::to_string),
        ))
    }

    /// Entity builder with mapping and hooks resolved
    pub fn entity_builder(&self, inflector: &dyn Inflector) -> Result<EntityBuilder<DynamicEntity>> {
        let builder = EntityBuilder::from_registry(
            &self.registry(inflector),
            self.entity.class.trim(),
            self.entity.fields.clone(),
            self.field_hooks(),
            self.object_hooks(),
            inflector,
        )?;
        Ok(builder)
    }
}

fn ascii_byte(key: &str, value: Option<char>) -> Result<Option<u8>> {
    match value {
        None => Ok(None),
        Some(c) if c.is_ascii() => Ok(Some(c as u8)),
        Some(c) => bail!("{} must be a single ASCII character, got '{}'", key, c),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::migrate::{DefaultInflector, Value};

    const FULL: &str = r#"
[source]
file = "people.csv"
delimiter = ";"
enclosure = "'"

[entity]
class = "person"
fields = ["first_name", "", "last_name"]

[hooks]
object = "set:origin=csv"

[hooks.fields]
last_name = ["trim", "upper"]
first_name = "trim"

[fixture]
dir = "out"
name = "people"
format = "json"

[store]
database = "/tmp/migrated.db"
"#;

    #[test]
    fn test_parse_full_config() {
        let config = MigrationConfig::from_toml(FULL, "/work").unwrap();

        assert_eq!(config.source_file(), PathBuf::from("/work/people.csv"));
        assert_eq!(config.fixture_dir(), PathBuf::from("/work/out"));
        assert_eq!(config.database_path(), PathBuf::from("/tmp/migrated.db"));
        assert_eq!(config.fixture.format, FixtureFormat::Json);
        assert_eq!(config.fixture.name.as_deref(), Some("people"));

        let options = config.csv_options().unwrap();
        assert_eq!(options.delimiter, b';');
        assert_eq!(options.enclosure, b'\'');
        assert_eq!(options.escape, Some(b'\\'));
        assert_eq!(options.max_line_length, 4096);
    }

    #[test]
    fn test_single_hook_name_becomes_list() {
        let config = MigrationConfig::from_toml(FULL, "/work").unwrap();

        assert_eq!(config.hooks.fields["first_name"], HookList(vec!["trim".to_string()]));
        assert_eq!(config.hooks.object, HookList(vec!["set:origin=csv".to_string()]));
    }

    #[test]
    fn test_entity_builder_from_config() {
        let config = MigrationConfig::from_toml(FULL, "/work").unwrap();
        let builder = config.entity_builder(&DefaultInflector).unwrap();
        assert_eq!(builder.type_name(), "Person");

        let record = vec!["  Jane ".to_string(), "skip".to_string(), " doe ".to_string()];
        let entity = builder.build(&record, false);
        assert_eq!(entity.get("first_name"), Some(&Value::from("Jane")));
        assert_eq!(entity.get("last_name"), Some(&Value::from("DOE")));
        assert_eq!(entity.get("origin"), Some(&Value::from("csv")));
        assert_eq!(entity.fields().len(), 3);
    }

    #[test]
    fn test_defaults() {
        let config = MigrationConfig::from_toml(
            "[source]\nfile = \"a.csv\"\n[entity]\nclass = \"person\"\nfields = [\"name\"]\n",
            "base",
        )
        .unwrap();

        assert_eq!(config.fixture_dir(), PathBuf::from("base/data/fixtures"));
        assert_eq!(config.fixture.format, FixtureFormat::Yaml);
        assert_eq!(config.csv_options().unwrap(), CsvOptions::default());
        assert!(config.field_hooks().fields().next().is_none());
    }

    #[test]
    fn test_rejects_multibyte_delimiter() {
        let err = MigrationConfig::from_toml(
            "[source]\nfile = \"a.csv\"\ndelimiter = \"§\"\n[entity]\nclass = \"p\"\nfields = [\"n\"]\n",
            "",
        )
        .unwrap_err();
        assert!(err.to_string().contains("source.delimiter"));
    }

    #[test]
    fn test_rejects_empty_field_list() {
        let result = MigrationConfig::from_toml(
            "[source]\nfile = \"a.csv\"\n[entity]\nclass = \"p\"\nfields = [\"\", \"\"]\n",
            "",
        );
        assert!(result.is_err());
    }

    #[test]
    fn test_rejects_unknown_keys() {
        let result = MigrationConfig::from_toml(
            "[source]\nfile = \"a.csv\"\nheader = true\n[entity]\nclass = \"p\"\nfields = [\"n\"]\n",
            "",
        );
        assert!(result.is_err());
    }
}
