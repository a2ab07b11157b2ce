//! Writer interface driven by the dumper.

use crate::error::{DumpError, Result};
use crate::inspect::{Inspected, ValueInspector};
use std::fmt;

/// The name a value is shown under: a variable name or a collection key.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Name {
    Int(i64),
    Str(String),
}

impl Name {
    /// Turn a collection key into a name.
    ///
    /// Only string and integer keys are names; anything else is rejected.
    pub fn from_key<V: ValueInspector>(key: &V) -> Result<Name> {
        match key.inspect() {
            Inspected::Int(i) => Ok(Name::Int(i)),
            Inspected::Str(s) => Ok(Name::Str(s)),
            other => Err(DumpError::InvalidName {
                kind: other.kind_name(),
            }),
        }
    }
}

impl From<&str> for Name {
    fn from(value: &str) -> Self {
        Name::Str(value.to_string())
    }
}

impl From<String> for Name {
    fn from(value: String) -> Self {
        Name::Str(value)
    }
}

impl From<i64> for Name {
    fn from(value: i64) -> Self {
        Name::Int(value)
    }
}

impl fmt::Display for Name {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Name::Int(i) => write!(f, "{}", i),
            Name::Str(s) => f.write_str(s),
        }
    }
}

/// Identity bookkeeping for a scalar slot.
///
/// `id` is set when the slot is the first sighting of tracked storage;
/// `reference` is set when the storage was already written under another
/// name. Untracked slots have neither.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Slot {
    pub id: Option<u32>,
    pub reference: Option<u32>,
}

impl Slot {
    /// First sighting of tracked storage.
    pub fn first(id: u32) -> Self {
        Self {
            id: Some(id),
            reference: None,
        }
    }

    /// Repeat sighting of tracked storage.
    pub fn seen(reference: u32) -> Self {
        Self {
            id: None,
            reference: Some(reference),
        }
    }
}

/// Receives one call per dumped node.
///
/// Composite nodes are bracketed by matching open/close calls; everything
/// written between them belongs to that composite. `name` is `None` only for
/// an unnamed root.
pub trait VarWriter {
    /// Called once before the first node.
    fn start(&mut self) -> Result<()> {
        Ok(())
    }

    /// Called once after the last node.
    fn stop(&mut self) -> Result<()> {
        Ok(())
    }

    fn write_array_open(&mut self, id: u32, name: Option<&Name>) -> Result<()>;
    fn write_array_close(&mut self, id: u32, name: Option<&Name>) -> Result<()>;
    fn write_array_reference(&mut self, reference: u32, name: Option<&Name>) -> Result<()>;

    fn write_object_open(&mut self, id: u32, name: Option<&Name>, class_name: &str) -> Result<()>;
    fn write_object_close(&mut self, id: u32, name: Option<&Name>, class_name: &str) -> Result<()>;
    fn write_object_reference(
        &mut self,
        reference: u32,
        name: Option<&Name>,
        class_name: &str,
    ) -> Result<()>;

    fn write_bool(&mut self, slot: Slot, value: bool, name: Option<&Name>) -> Result<()>;
    fn write_int(&mut self, slot: Slot, value: i64, name: Option<&Name>) -> Result<()>;
    fn write_float(&mut self, slot: Slot, value: f64, name: Option<&Name>) -> Result<()>;
    fn write_null(&mut self, slot: Slot, name: Option<&Name>) -> Result<()>;
    fn write_resource(&mut self, slot: Slot, name: Option<&Name>, type_name: &str) -> Result<()>;
    fn write_string(&mut self, slot: Slot, value: &str, name: Option<&Name>) -> Result<()>;
    fn write_uninitialized(&mut self, slot: Slot, name: Option<&Name>) -> Result<()>;

    /// A value of a type the inspector could not classify.
    fn write_unknown(&mut self, slot: Slot, name: Option<&Name>, type_name: &str) -> Result<()>;
}

#[cfg(test)]
mod tests {
    use super::*;
    use errlog_common::Value;

    #[test]
    fn test_name_from_key() {
        assert_eq!(Name::from_key(&Value::from("a")).unwrap(), Name::from("a"));
        assert_eq!(Name::from_key(&Value::from(3)).unwrap(), Name::Int(3));
    }

    #[test]
    fn test_name_from_invalid_key() {
        let err = Name::from_key(&Value::Bool(true)).unwrap_err();
        assert!(matches!(err, DumpError::InvalidName { kind: "bool" }));

        let err = Name::from_key(&Value::Null).unwrap_err();
        assert!(err.to_string().contains("null"));
    }

    #[test]
    fn test_slot_constructors() {
        assert_eq!(Slot::first(3).id, Some(3));
        assert_eq!(Slot::seen(3).reference, Some(3));
        assert_eq!(Slot::default(), Slot { id: None, reference: None });
    }
}
