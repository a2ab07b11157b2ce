//! Runtime value model.
//!
//! A [`Value`] is a read-only snapshot of whatever the host handed us: call
//! arguments, variables staged for a dump, nested collections. Composite
//! values (arrays and objects) live behind an [`Arc`] so that two slots
//! holding the same composite can be told apart from two slots holding equal
//! composites. Identity is the address of the shared allocation.
//!
//! Composites use interior mutability only so that self-referencing graphs
//! can be built; nothing in the rendering path mutates a value.

use serde::{Deserialize, Deserializer};
use std::fmt;
use std::sync::{Arc, PoisonError, RwLock};

/// A single runtime value.
#[derive(Debug, Clone)]
pub enum Value {
    /// The absence of a value.
    Null,
    /// A declared slot that was never assigned.
    Uninitialized,
    /// Boolean.
    Bool(bool),
    /// Integer.
    Int(i64),
    /// Floating point number.
    Float(f64),
    /// Text.
    Str(String),
    /// An opaque host handle (file, socket, ...) identified by its type name.
    Resource(String),
    /// An ordered, keyed collection.
    Array(Composite),
    /// A class instance with named fields.
    Object(Composite),
    /// A by-reference scalar slot; several slots may share one cell.
    Shared(SharedCell),
    /// A host value the model has no representation for.
    Unknown(String),
}

impl Value {
    /// Build a sequential array (keys `0..n`).
    pub fn list<I, V>(items: I) -> Self
    where
        I: IntoIterator<Item = V>,
        V: Into<Value>,
    {
        Value::Array(Composite::list(items))
    }

    /// Build an associative array from explicit keys.
    pub fn assoc<I, K, V>(entries: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<Value>,
        V: Into<Value>,
    {
        let composite = Composite::new();
        for (key, value) in entries {
            composite.insert(key, value);
        }
        Value::Array(composite)
    }

    /// Build an object of the given class from named fields.
    pub fn object<I, K, V>(class_name: impl Into<String>, fields: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<Value>,
        V: Into<Value>,
    {
        let composite = Composite::with_class(class_name);
        for (key, value) in fields {
            composite.insert(key, value);
        }
        Value::Object(composite)
    }

    /// Wrap a value in a new shared cell.
    pub fn shared(value: impl Into<Value>) -> Self {
        Value::Shared(SharedCell::new(value))
    }

    /// Short name of the variant, used in diagnostics.
    pub fn kind_name(&self) -> &'static str {
        match self {
            Value::Null => "null",
            Value::Uninitialized => "uninitialized",
            Value::Bool(_) => "bool",
            Value::Int(_) => "int",
            Value::Float(_) => "float",
            Value::Str(_) => "string",
            Value::Resource(_) => "resource",
            Value::Array(_) => "array",
            Value::Object(_) => "object",
            Value::Shared(_) => "reference",
            Value::Unknown(_) => "unknown",
        }
    }

    /// The text of a string value.
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Value::Str(s) => Some(s),
            _ => None,
        }
    }

    /// The integer of an int value.
    pub fn as_int(&self) -> Option<i64> {
        match self {
            Value::Int(i) => Some(*i),
            _ => None,
        }
    }

    /// Follow shared cells until a non-shared value is reached.
    pub fn resolved(&self) -> Value {
        let mut current = self.clone();
        // Bounded so a cell that (indirectly) holds itself cannot spin forever.
        for _ in 0..64 {
            match current {
                Value::Shared(cell) => current = cell.get(),
                other => return other,
            }
        }
        current
    }
}

impl From<bool> for Value {
    fn from(value: bool) -> Self {
        Value::Bool(value)
    }
}

impl From<i64> for Value {
    fn from(value: i64) -> Self {
        Value::Int(value)
    }
}

impl From<i32> for Value {
    fn from(value: i32) -> Self {
        Value::Int(i64::from(value))
    }
}

impl From<u32> for Value {
    fn from(value: u32) -> Self {
        Value::Int(i64::from(value))
    }
}

impl From<usize> for Value {
    fn from(value: usize) -> Self {
        i64::try_from(value).map_or(Value::Float(value as f64), Value::Int)
    }
}

impl From<f64> for Value {
    fn from(value: f64) -> Self {
        Value::Float(value)
    }
}

impl From<&str> for Value {
    fn from(value: &str) -> Self {
        Value::Str(value.to_string())
    }
}

impl From<String> for Value {
    fn from(value: String) -> Self {
        Value::Str(value)
    }
}

impl<T: Into<Value>> From<Option<T>> for Value {
    fn from(value: Option<T>) -> Self {
        value.map_or(Value::Null, Into::into)
    }
}

impl From<Composite> for Value {
    fn from(value: Composite) -> Self {
        if value.class_name().is_some() {
            Value::Object(value)
        } else {
            Value::Array(value)
        }
    }
}

impl From<SharedCell> for Value {
    fn from(value: SharedCell) -> Self {
        Value::Shared(value)
    }
}

/// Marker key for JSON objects that describe a class instance.
pub const JSON_CLASS_KEY: &str = "$class";

/// Marker key for JSON objects that describe a resource handle.
pub const JSON_RESOURCE_KEY: &str = "$resource";

/// Conversion from arbitrary JSON.
///
/// JSON arrays become sequential arrays and JSON objects become associative
/// arrays, except for two conventions: an object with a `"$class"` string
/// member becomes an object of that class (the marker itself is dropped), and
/// an object whose only member is `"$resource"` becomes a resource handle.
impl From<serde_json::Value> for Value {
    fn from(json: serde_json::Value) -> Self {
        match json {
            serde_json::Value::Null => Value::Null,
            serde_json::Value::Bool(b) => Value::Bool(b),
            serde_json::Value::Number(n) => match n.as_i64() {
                Some(i) => Value::Int(i),
                None => Value::Float(n.as_f64().unwrap_or(f64::NAN)),
            },
            serde_json::Value::String(s) => Value::Str(s),
            serde_json::Value::Array(items) => Value::list(items.into_iter().map(Value::from)),
            serde_json::Value::Object(mut map) => {
                if map.len() == 1 {
                    if let Some(serde_json::Value::String(kind)) = map.get(JSON_RESOURCE_KEY) {
                        return Value::Resource(kind.clone());
                    }
                }
                let class = match map.remove(JSON_CLASS_KEY) {
                    Some(serde_json::Value::String(class)) => Some(class),
                    Some(other) => {
                        map.insert(JSON_CLASS_KEY.to_string(), other);
                        None
                    }
                    None => None,
                };
                let composite = match class {
                    Some(class) => Composite::with_class(class),
                    None => Composite::new(),
                };
                for (key, value) in map {
                    composite.insert(json_key(key), Value::from(value));
                }
                Value::from(composite)
            }
        }
    }
}

/// JSON object keys that spell an integer are integer keys.
fn json_key(key: String) -> Value {
    match key.parse::<i64>() {
        Ok(i) if i.to_string() == key => Value::Int(i),
        _ => Value::Str(key),
    }
}

impl<'de> Deserialize<'de> for Value {
    fn deserialize<D>(deserializer: D) -> std::result::Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        serde_json::Value::deserialize(deserializer).map(Value::from)
    }
}

struct CompositeInner {
    class_name: Option<String>,
    entries: RwLock<Vec<(Value, Value)>>,
}

/// Shared handle to an array or object body.
///
/// Cloning a `Composite` clones the handle, not the entries: both clones
/// report the same [`Composite::identity`].
#[derive(Clone)]
pub struct Composite(Arc<CompositeInner>);

impl Composite {
    /// Create an empty array body.
    pub fn new() -> Self {
        Self(Arc::new(CompositeInner {
            class_name: None,
            entries: RwLock::new(Vec::new()),
        }))
    }

    /// Create an empty object body of the given class.
    pub fn with_class(class_name: impl Into<String>) -> Self {
        Self(Arc::new(CompositeInner {
            class_name: Some(class_name.into()),
            entries: RwLock::new(Vec::new()),
        }))
    }

    /// Create a sequential array body.
    pub fn list<I, V>(items: I) -> Self
    where
        I: IntoIterator<Item = V>,
        V: Into<Value>,
    {
        let composite = Self::new();
        {
            let mut entries = composite.write_entries();
            for (index, item) in items.into_iter().enumerate() {
                entries.push((Value::from(index), item.into()));
            }
        }
        composite
    }

    /// Append an entry; an existing entry with an equal scalar key is replaced.
    pub fn insert(&self, key: impl Into<Value>, value: impl Into<Value>) {
        let key = key.into();
        let value = value.into();
        let mut entries = self.write_entries();
        match entries.iter_mut().find(|(k, _)| same_key(k, &key)) {
            Some(slot) => slot.1 = value,
            None => entries.push((key, value)),
        }
    }

    /// Append a value under the next free integer key.
    pub fn push(&self, value: impl Into<Value>) {
        let mut entries = self.write_entries();
        let next = entries
            .iter()
            .filter_map(|(k, _)| k.as_int())
            .max()
            .map_or(0, |max| max + 1);
        entries.push((Value::Int(next), value.into()));
    }

    /// Snapshot of the entries in insertion order.
    pub fn entries(&self) -> Vec<(Value, Value)> {
        self.0
            .entries
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    /// Number of entries.
    pub fn len(&self) -> usize {
        self.0
            .entries
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .len()
    }

    /// Whether there are no entries.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Class name for object bodies.
    pub fn class_name(&self) -> Option<&str> {
        self.0.class_name.as_deref()
    }

    /// Address-based identity of the shared body.
    pub fn identity(&self) -> usize {
        Arc::as_ptr(&self.0) as *const () as usize
    }

    /// Whether two handles point at the same body.
    pub fn ptr_eq(&self, other: &Composite) -> bool {
        Arc::ptr_eq(&self.0, &other.0)
    }

    fn write_entries(&self) -> std::sync::RwLockWriteGuard<'_, Vec<(Value, Value)>> {
        self.0
            .entries
            .write()
            .unwrap_or_else(PoisonError::into_inner)
    }
}

impl Default for Composite {
    fn default() -> Self {
        Self::new()
    }
}

// Entries are not printed: a composite may contain itself.
impl fmt::Debug for Composite {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Composite")
            .field("class_name", &self.0.class_name)
            .field("len", &self.len())
            .field("identity", &format_args!("{:#x}", self.identity()))
            .finish()
    }
}

fn same_key(a: &Value, b: &Value) -> bool {
    match (a, b) {
        (Value::Int(x), Value::Int(y)) => x == y,
        (Value::Str(x), Value::Str(y)) => x == y,
        _ => false,
    }
}

/// A mutable scalar slot that several names can be bound to.
#[derive(Clone)]
pub struct SharedCell(Arc<RwLock<Value>>);

impl SharedCell {
    /// Create a cell holding `value`.
    pub fn new(value: impl Into<Value>) -> Self {
        Self(Arc::new(RwLock::new(value.into())))
    }

    /// Current content of the cell.
    pub fn get(&self) -> Value {
        self.0.read().unwrap_or_else(PoisonError::into_inner).clone()
    }

    /// Replace the content of the cell.
    pub fn set(&self, value: impl Into<Value>) {
        *self.0.write().unwrap_or_else(PoisonError::into_inner) = value.into();
    }

    /// Address-based identity of the storage.
    pub fn identity(&self) -> usize {
        Arc::as_ptr(&self.0) as *const () as usize
    }
}

impl fmt::Debug for SharedCell {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let kind = self.0.read().unwrap_or_else(PoisonError::into_inner).kind_name();
        f.debug_struct("SharedCell")
            .field("holds", &kind)
            .field("identity", &format_args!("{:#x}", self.identity()))
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_list_assigns_sequential_keys() {
        let value = Value::list(["a", "b", "c"]);
        let Value::Array(composite) = value else {
            panic!("expected array");
        };
        let keys: Vec<i64> = composite
            .entries()
            .iter()
            .filter_map(|(k, _)| k.as_int())
            .collect();
        assert_eq!(keys, vec![0, 1, 2]);
    }

    #[test]
    fn test_clone_preserves_identity() {
        let composite = Composite::new();
        let alias = composite.clone();
        assert_eq!(composite.identity(), alias.identity());
        assert!(composite.ptr_eq(&alias));

        let other = Composite::new();
        assert_ne!(composite.identity(), other.identity());
    }

    #[test]
    fn test_insert_replaces_existing_key() {
        let composite = Composite::new();
        composite.insert("a", 1);
        composite.insert("a", 2);
        composite.insert(0, "zero");
        assert_eq!(composite.len(), 2);
        assert_eq!(composite.entries()[0].1.as_int(), Some(2));
    }

    #[test]
    fn test_push_uses_next_integer_key() {
        let composite = Composite::new();
        composite.insert(5, "five");
        composite.insert("name", "x");
        composite.push("six");
        let entries = composite.entries();
        assert_eq!(entries[2].0.as_int(), Some(6));
    }

    #[test]
    fn test_cyclic_debug_does_not_recurse() {
        let composite = Composite::new();
        composite.insert("self", Value::Array(composite.clone()));
        let printed = format!("{:?}", Value::Array(composite));
        assert!(printed.contains("Composite"));
    }

    #[test]
    fn test_shared_cell_set_is_visible_through_aliases() {
        let cell = SharedCell::new(1);
        let alias = cell.clone();
        alias.set(2);
        assert_eq!(cell.get().as_int(), Some(2));
        assert_eq!(cell.identity(), alias.identity());
    }

    #[test]
    fn test_resolved_follows_cells() {
        let value = Value::shared(Value::shared("inner"));
        assert_eq!(value.resolved().as_str(), Some("inner"));
    }

    #[test]
    fn test_from_json_conventions() {
        let value = Value::from(json!({
            "$class": "App\\User",
            "name": "alice",
            "handle": { "$resource": "stream" },
            "tags": [1, 2.5, null],
            "7": true
        }));

        let Value::Object(object) = value else {
            panic!("expected object");
        };
        assert_eq!(object.class_name(), Some("App\\User"));

        let entries = object.entries();
        assert!(entries.iter().all(|(k, _)| k.as_str() != Some(JSON_CLASS_KEY)));
        assert!(entries
            .iter()
            .any(|(k, v)| k.as_str() == Some("handle") && matches!(v, Value::Resource(r) if r == "stream")));
        assert!(entries
            .iter()
            .any(|(k, v)| k.as_int() == Some(7) && matches!(v, Value::Bool(true))));
    }

    #[test]
    fn test_deserialize_value() {
        let value: Value = serde_json::from_str(r#"[1, "two", false]"#).unwrap();
        assert_eq!(value.kind_name(), "array");
    }

    #[test]
    fn test_usize_conversion() {
        assert_eq!(Value::from(3usize).as_int(), Some(3));
    }
}
