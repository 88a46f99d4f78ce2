//! Field and object hook registries
//!
//! A hook slot is always an ordered list of entries. An entry is either a
//! callable or a placeholder for something that could not be resolved to a
//! callable (an unknown hook name in a config file, for example). Placeholders
//! are skipped and the value passes through untouched.

use std::collections::HashMap;
use std::sync::Arc;

use super::Value;

/// One entry in a hook slot
pub enum Hook<F: ?Sized> {
    /// An invocable transformer
    Callable(Arc<F>),
    /// Something registered as a hook that cannot be invoked
    NotCallable(String),
}

impl<F: ?Sized> Hook<F> {
    pub fn is_callable(&self) -> bool {
        matches!(self, Hook::Callable(_))
    }
}

impl<F: ?Sized> Clone for Hook<F> {
    fn clone(&self) -> Self {
        match self {
            Hook::Callable(f) => Hook::Callable(Arc::clone(f)),
            Hook::NotCallable(name) => Hook::NotCallable(name.clone()),
        }
    }
}

impl<F: ?Sized> std::fmt::Debug for Hook<F> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Hook::Callable(_) => write!(f, "Callable(..)"),
            Hook::NotCallable(name) => write!(f, "NotCallable({:?})", name),
        }
    }
}

/// Value transformer signature
pub type FieldHookFn = dyn Fn(Value) -> Value + Send + Sync;

/// Whole-entity transformer signature
pub type ObjectHookFn<E> = dyn Fn(&mut E) + Send + Sync;

pub type FieldHook = Hook<FieldHookFn>;
pub type ObjectHook<E> = Hook<ObjectHookFn<E>>;

impl FieldHook {
    /// Wrap a closure as a callable field hook
    pub fn new(f: impl Fn(Value) -> Value + Send + Sync + 'static) -> Self {
        Hook::Callable(Arc::new(f))
    }
}

impl<E> ObjectHook<E> {
    /// Wrap a closure as a callable object hook
    pub fn object(f: impl Fn(&mut E) + Send + Sync + 'static) -> Self {
        Hook::Callable(Arc::new(f))
    }
}

/// Field hooks keyed by field identifier
#[derive(Debug, Clone, Default)]
pub struct FieldHooks {
    hooks: HashMap<String, Vec<FieldHook>>,
}

impl FieldHooks {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a hook to a field's chain
    pub fn add(&mut self, field: impl Into<String>, hook: FieldHook) -> &mut Self {
        self.hooks.entry(field.into()).or_default().push(hook);
        self
    }

    /// Replace a field's whole chain
    pub fn set(&mut self, field: impl Into<String>, hooks: Vec<FieldHook>) -> &mut Self {
        self.hooks.insert(field.into(), hooks);
        self
    }

    /// Builder-style [`FieldHooks::add`]
    pub fn with(mut self, field: impl Into<String>, hook: FieldHook) -> Self {
        self.add(field, hook);
        self
    }

    pub fn get(&self, field: &str) -> &[FieldHook] {
        self.hooks.get(field).map(|v| v.as_slice()).unwrap_or(&[])
    }

    pub fn has(&self, field: &str) -> bool {
        !self.get(field).is_empty()
    }

    pub fn fields(&self) -> impl Iterator<Item = &str> {
        self.hooks.keys().map(|k| k.as_str())
    }

    /// Run a field's chain over `value`, each hook receiving the previous output
    pub fn apply(&self, field: &str, mut value: Value, debug: bool) -> Value {
        for hook in self.get(field) {
            match hook {
                Hook::Callable(f) => {
                    if debug {
                        log::debug!("Running hook for {}", field);
                    }
                    value = f(value);
                }
                Hook::NotCallable(name) => {
                    if debug {
                        log::debug!("Field hook for {} is not callable ({})", field, name);
                    }
                }
            }
        }
        value
    }
}

/// Ordered whole-entity hooks
pub struct ObjectHooks<E> {
    hooks: Vec<ObjectHook<E>>,
}

impl<E> ObjectHooks<E> {
    pub fn new() -> Self {
        ObjectHooks { hooks: Vec::new() }
    }

    pub fn add(&mut self, hook: ObjectHook<E>) -> &mut Self {
        self.hooks.push(hook);
        self
    }

    /// Builder-style [`ObjectHooks::add`]
    pub fn with(mut self, hook: ObjectHook<E>) -> Self {
        self.hooks.push(hook);
        self
    }

    pub fn len(&self) -> usize {
        self.hooks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.hooks.is_empty()
    }

    /// Run every hook against `entity` in declared order
    pub fn apply(&self, entity: &mut E, debug: bool) {
        for hook in &self.hooks {
            match hook {
                Hook::Callable(f) => {
                    if debug {
                        log::debug!("Running object hook");
                    }
                    f(entity);
                }
                Hook::NotCallable(name) => {
                    if debug {
                        log::debug!("Object hook is not callable ({})", name);
                    }
                }
            }
        }
    }
}

impl<E> Default for ObjectHooks<E> {
    fn default() -> Self {
        Self::new()
    }
}

impl<E> Clone for ObjectHooks<E> {
    fn clone(&self) -> Self {
        ObjectHooks {
            hooks: self.hooks.clone(),
        }
    }
}

impl<E> std::fmt::Debug for ObjectHooks<E> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_list().entries(&self.hooks).finish()
    }
}

impl<E> FromIterator<ObjectHook<E>> for ObjectHooks<E> {
    fn from_iter<I: IntoIterator<Item = ObjectHook<E>>>(iter: I) -> Self {
        ObjectHooks {
            hooks: iter.into_iter().collect(),
        }
    }
}
