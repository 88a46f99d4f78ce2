//! Target entity contract, typed entity definitions and the type registry

use std::collections::HashMap;
use std::sync::Arc;

use super::{FieldMap, Value};

/// Capability every migrated entity exposes for serialization
pub trait Entity {
    /// Field values keyed by native field name
    fn to_field_map(&self) -> FieldMap;
}

/// Setter signature stored in an entity type's setter table
pub type SetterFn<E> = dyn Fn(&mut E, Value) + Send + Sync;

/// A typed entity definition: a factory and one setter per field
pub struct EntityType<E> {
    name: String,
    factory: Arc<dyn Fn() -> E + Send + Sync>,
    setters: HashMap<String, Arc<SetterFn<E>>>,
}

impl<E> EntityType<E> {
    /// Define an entity type with a no-argument factory
    pub fn new(name: impl Into<String>, factory: impl Fn() -> E + Send + Sync + 'static) -> Self {
        EntityType {
            name: name.into(),
            factory: Arc::new(factory),
            setters: HashMap::new(),
        }
    }

    /// Register the setter for `field`
    pub fn setter(
        mut self,
        field: impl Into<String>,
        setter: impl Fn(&mut E, Value) + Send + Sync + 'static,
    ) -> Self {
        self.setters.insert(field.into(), Arc::new(setter));
        self
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Construct a fresh, unpopulated instance
    pub fn create(&self) -> E {
        (self.factory)()
    }

    /// Setter for `field`, if the type declares one
    pub fn setter_for(&self, field: &str) -> Option<Arc<SetterFn<E>>> {
        self.setters.get(field).cloned()
    }

    pub fn has_field(&self, field: &str) -> bool {
        self.setters.contains_key(field)
    }
}

impl<E> Clone for EntityType<E> {
    fn clone(&self) -> Self {
        EntityType {
            name: self.name.clone(),
            factory: Arc::clone(&self.factory),
            setters: self.setters.clone(),
        }
    }
}

impl<E> std::fmt::Debug for EntityType<E> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let mut fields: Vec<_> = self.setters.keys().collect();
        fields.sort();
        f.debug_struct("EntityType")
            .field("name", &self.name)
            .field("fields", &fields)
            .finish()
    }
}

/// Entity types keyed by type name
#[derive(Debug)]
pub struct EntityRegistry<E> {
    types: HashMap<String, EntityType<E>>,
}

impl<E> EntityRegistry<E> {
    pub fn new() -> Self {
        EntityRegistry {
            types: HashMap::new(),
        }
    }

    pub fn register(&mut self, entity_type: EntityType<E>) -> &mut Self {
        self.types.insert(entity_type.name().to_string(), entity_type);
        self
    }

    /// Builder-style [`EntityRegistry::register`]
    pub fn with(mut self, entity_type: EntityType<E>) -> Self {
        self.register(entity_type);
        self
    }

    pub fn get(&self, name: &str) -> Option<&EntityType<E>> {
        self.types.get(name)
    }

    pub fn names(&self) -> Vec<&str> {
        let mut names: Vec<_> = self.types.keys().map(|k| k.as_str()).collect();
        names.sort();
        names
    }
}

impl<E> Default for EntityRegistry<E> {
    fn default() -> Self {
        Self::new()
    }
}

/// Schemaless entity: a type name and an ordered bag of fields
///
/// Used when migrating arbitrary CSV files without a compiled entity type.
#[derive(Debug, Clone, PartialEq)]
pub struct DynamicEntity {
    type_name: String,
    fields: FieldMap,
}

impl DynamicEntity {
    pub fn new(type_name: impl Into<String>) -> Self {
        DynamicEntity {
            type_name: type_name.into(),
            fields: FieldMap::new(),
        }
    }

    pub fn type_name(&self) -> &str {
        &self.type_name
    }

    pub fn get(&self, field: &str) -> Option<&Value> {
        self.fields.get(field)
    }

    pub fn set(&mut self, field: impl Into<String>, value: Value) {
        self.fields.set(field, value);
    }

    pub fn remove(&mut self, field: &str) -> Option<Value> {
        self.fields.remove(field)
    }

    pub fn fields(&self) -> &FieldMap {
        &self.fields
    }

    /// Entity type whose setters write straight into the field bag
    pub fn entity_type<I, S>(type_name: impl Into<String>, fields: I) -> EntityType<DynamicEntity>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let type_name = type_name.into();
        let factory_name = type_name.clone();
        let mut entity_type = EntityType::new(type_name, move || DynamicEntity::new(factory_name.clone()));
        for field in fields {
            let field: String = field.into();
            let key = field.clone();
            entity_type = entity_type.setter(field, move |e: &mut DynamicEntity, v| e.set(key.clone(), v));
        }
        entity_type
    }
}

impl Entity for DynamicEntity {
    fn to_field_map(&self) -> FieldMap {
        self.fields.clone()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Debug, Default)]
    struct Person {
        first_name: String,
    }

    #[test]
    fn test_entity_type_create_and_set() {
        let person = EntityType::new("Person", Person::default)
            .setter("first_name", |p: &mut Person, v| p.first_name = v.to_string());

        let mut p = person.create();
        let setter = person.setter_for("first_name").unwrap();
        setter(&mut p, Value::from("Jane"));

        assert_eq!(p.first_name, "Jane");
        assert!(person.setter_for("last_name").is_none());
    }

    #[test]
    fn test_registry_lookup() {
        let registry = EntityRegistry::new().with(EntityType::new("Person", Person::default));
        assert!(registry.get("Person").is_some());
        assert!(registry.get("person").is_none());
        assert_eq!(registry.names(), vec!["Person"]);
    }

    #[test]
    fn test_dynamic_entity_type() {
        let ty = DynamicEntity::entity_type("Person", ["first_name", "last_name"]);
        let mut e = ty.create();
        assert_eq!(e.type_name(), "Person");
        assert!(e.fields().is_empty());

        (ty.setter_for("last_name").unwrap())(&mut e, Value::from("Doe"));
        assert_eq!(e.get("last_name"), Some(&Value::from("Doe")));
        assert!(ty.has_field("first_name"));
        assert!(!ty.has_field("age"));
    }
}
