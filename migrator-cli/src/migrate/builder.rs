//! Entity builder - turns one record into one populated entity

use std::sync::Arc;

use crate::migrate::error::{MigrateError, Result};
use crate::migrate::inflector::Inflector;
use crate::migrate::{EntityRegistry, EntityType, FieldHooks, FieldMapping, ObjectHooks, SetterFn, Value};

/// A mapped column with its setter resolved up front
struct ResolvedColumn<E> {
    column: usize,
    field: String,
    accessor: String,
    setter: Arc<SetterFn<E>>,
}

/// Builds entities of one type from records, running the hook pipeline
///
/// Setters are resolved when the builder is created, so an unknown field is
/// reported before any record is read.
pub struct EntityBuilder<E> {
    entity_type: EntityType<E>,
    columns: Vec<ResolvedColumn<E>>,
    field_hooks: FieldHooks,
    object_hooks: ObjectHooks<E>,
}

impl<E> EntityBuilder<E> {
    pub fn new(
        entity_type: EntityType<E>,
        mapping: FieldMapping,
        field_hooks: FieldHooks,
        object_hooks: ObjectHooks<E>,
        inflector: &dyn Inflector,
    ) -> Result<Self> {
        let mut columns = Vec::with_capacity(mapping.len());
        for (column, field) in mapping.columns() {
            let setter = entity_type
                .setter_for(field)
                .ok_or_else(|| MigrateError::UnknownField {
                    type_name: entity_type.name().to_string(),
                    field: field.to_string(),
                })?;
            columns.push(ResolvedColumn {
                column,
                field: field.to_string(),
                accessor: inflector.setter_name(field),
                setter,
            });
        }

        for field in field_hooks.fields() {
            if !entity_type.has_field(field) {
                log::warn!(
                    "Field hooks registered for '{}' which is not a field of {}",
                    field,
                    entity_type.name()
                );
            }
        }

        Ok(EntityBuilder {
            entity_type,
            columns,
            field_hooks,
            object_hooks,
        })
    }

    /// Resolve `class_name` (camelized first) in `registry` and build for it
    pub fn from_registry(
        registry: &EntityRegistry<E>,
        class_name: &str,
        mapping: FieldMapping,
        field_hooks: FieldHooks,
        object_hooks: ObjectHooks<E>,
        inflector: &dyn Inflector,
    ) -> Result<Self> {
        let type_name = inflector.camelize(class_name);
        let entity_type = registry
            .get(&type_name)
            .cloned()
            .ok_or(MigrateError::UnknownEntityType(type_name))?;
        Self::new(entity_type, mapping, field_hooks, object_hooks, inflector)
    }

    pub fn type_name(&self) -> &str {
        self.entity_type.name()
    }

    /// Build one entity from a record
    ///
    /// Columns past the mapping and mapped slots missing from a short record
    /// are ignored.
    pub fn build(&self, record: &[String], debug: bool) -> E {
        if debug {
            log::debug!("$object = new {}();", self.entity_type.name());
        }
        let mut entity = self.entity_type.create();

        for resolved in &self.columns {
            let Some(raw) = record.get(resolved.column) else {
                continue;
            };
            let value = self
                .field_hooks
                .apply(&resolved.field, Value::String(raw.clone()), debug);
            if debug {
                log::debug!("$object->{}({});", resolved.accessor, value);
            }
            (resolved.setter)(&mut entity, value);
        }

        self.object_hooks.apply(&mut entity, debug);
        entity
    }
}
