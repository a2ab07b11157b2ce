//! The capability the dumper uses to look inside values.

use errlog_common::Value;

/// What a value turned out to be, with composite contents snapshotted.
#[derive(Debug, Clone)]
pub enum Inspected<V> {
    Null,
    Uninitialized,
    Bool(bool),
    Int(i64),
    Float(f64),
    Str(String),
    Resource(String),
    Unknown(String),
    Array {
        identity: usize,
        entries: Vec<(V, V)>,
    },
    Object {
        identity: usize,
        class_name: String,
        entries: Vec<(V, V)>,
    },
    /// A by-reference slot; `target` is what the slot currently holds.
    Shared {
        identity: usize,
        target: V,
    },
}

impl<V> Inspected<V> {
    /// Short name of the variant, used in error messages.
    pub fn kind_name(&self) -> &'static str {
        match self {
            Inspected::Null => "null",
            Inspected::Uninitialized => "uninitialized",
            Inspected::Bool(_) => "bool",
            Inspected::Int(_) => "int",
            Inspected::Float(_) => "float",
            Inspected::Str(_) => "string",
            Inspected::Resource(_) => "resource",
            Inspected::Unknown(_) => "unknown",
            Inspected::Array { .. } => "array",
            Inspected::Object { .. } => "object",
            Inspected::Shared { .. } => "reference",
        }
    }
}

/// Reflection over a host value model.
///
/// Implementations must report the same `identity` for two handles to the
/// same underlying storage, and different identities otherwise, for as long
/// as both handles are alive.
pub trait ValueInspector: Sized {
    fn inspect(&self) -> Inspected<Self>;
}

impl ValueInspector for Value {
    fn inspect(&self) -> Inspected<Self> {
        match self {
            Value::Null => Inspected::Null,
            Value::Uninitialized => Inspected::Uninitialized,
            Value::Bool(b) => Inspected::Bool(*b),
            Value::Int(i) => Inspected::Int(*i),
            Value::Float(f) => Inspected::Float(*f),
            Value::Str(s) => Inspected::Str(s.clone()),
            Value::Resource(kind) => Inspected::Resource(kind.clone()),
            Value::Unknown(kind) => Inspected::Unknown(kind.clone()),
            Value::Array(composite) => Inspected::Array {
                identity: composite.identity(),
                entries: composite.entries(),
            },
            Value::Object(composite) => Inspected::Object {
                identity: composite.identity(),
                class_name: composite.class_name().unwrap_or("object").to_string(),
                entries: composite.entries(),
            },
            Value::Shared(cell) => Inspected::Shared {
                identity: cell.identity(),
                target: cell.get(),
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_aliases_share_identity() {
        let value = Value::list([1, 2, 3]);
        let alias = value.clone();

        let (Inspected::Array { identity: a, entries }, Inspected::Array { identity: b, .. }) =
            (value.inspect(), alias.inspect())
        else {
            panic!("expected arrays");
        };
        assert_eq!(a, b);
        assert_eq!(entries.len(), 3);
    }

    #[test]
    fn test_object_class_name() {
        let value = Value::object("Point", [("x", 1), ("y", 2)]);
        match value.inspect() {
            Inspected::Object { class_name, entries, .. } => {
                assert_eq!(class_name, "Point");
                assert_eq!(entries.len(), 2);
            }
            other => panic!("unexpected {}", other.kind_name()),
        }
    }

    #[test]
    fn test_shared_cell_exposes_target() {
        let value = Value::shared(5);
        match value.inspect() {
            Inspected::Shared { target, .. } => assert_eq!(target.as_int(), Some(5)),
            other => panic!("unexpected {}", other.kind_name()),
        }
    }
}
