//! Format-agnostic dump output as a `serde_json::Value` tree.
//!
//! Each node is an object with `type`, optional `name`, and depending on the
//! node: `id` (first sighting), `reference` (repeat sighting), `value`,
//! `class` and `entries`.

use crate::error::Result;
use crate::writer::{Name, Slot, VarWriter};
use serde_json::{json, Map, Value as Json};

/// Collects a dump into a JSON tree.
#[derive(Debug, Default)]
pub struct JsonVarWriter {
    stack: Vec<Json>,
    roots: Vec<Json>,
}

impl JsonVarWriter {
    /// Create an empty writer.
    pub fn new() -> Self {
        Self::default()
    }

    /// The dumped tree; `null` when nothing was written.
    ///
    /// A single root node is returned as is; several dumps into the same
    /// writer are returned as an array.
    pub fn into_value(mut self) -> Json {
        match self.roots.len() {
            0 => Json::Null,
            1 => self.roots.remove(0),
            _ => Json::Array(self.roots),
        }
    }

    fn node(kind: &str, name: Option<&Name>) -> Map<String, Json> {
        let mut node = Map::new();
        node.insert("type".to_string(), Json::from(kind));
        if let Some(name) = name {
            let name = match name {
                Name::Int(i) => Json::from(*i),
                Name::Str(s) => Json::from(s.as_str()),
            };
            node.insert("name".to_string(), name);
        }
        node
    }

    fn attach(&mut self, node: Json) {
        match self.stack.last_mut() {
            Some(parent) => {
                if let Some(Json::Array(entries)) = parent.get_mut("entries") {
                    entries.push(node);
                }
            }
            None => self.roots.push(node),
        }
    }

    fn scalar(&mut self, kind: &str, slot: Slot, name: Option<&Name>, value: Json) -> Result<()> {
        let mut node = Self::node(kind, name);
        if let Some(id) = slot.id {
            node.insert("id".to_string(), json!(id));
        }
        if let Some(reference) = slot.reference {
            node.insert("reference".to_string(), json!(reference));
        }
        if !value.is_null() {
            node.insert("value".to_string(), value);
        }
        self.attach(Json::Object(node));
        Ok(())
    }

    fn open(&mut self, kind: &str, id: u32, name: Option<&Name>, class_name: Option<&str>) -> Result<()> {
        let mut node = Self::node(kind, name);
        node.insert("id".to_string(), json!(id));
        if let Some(class_name) = class_name {
            node.insert("class".to_string(), json!(class_name));
        }
        node.insert("entries".to_string(), Json::Array(Vec::new()));
        self.stack.push(Json::Object(node));
        Ok(())
    }

    fn close(&mut self) -> Result<()> {
        if let Some(node) = self.stack.pop() {
            self.attach(node);
        }
        Ok(())
    }

    fn reference(&mut self, kind: &str, reference: u32, name: Option<&Name>, class_name: Option<&str>) -> Result<()> {
        let mut node = Self::node(kind, name);
        node.insert("reference".to_string(), json!(reference));
        if let Some(class_name) = class_name {
            node.insert("class".to_string(), json!(class_name));
        }
        self.attach(Json::Object(node));
        Ok(())
    }
}

impl VarWriter for JsonVarWriter {
    fn write_array_open(&mut self, id: u32, name: Option<&Name>) -> Result<()> {
        self.open("array", id, name, None)
    }

    fn write_array_close(&mut self, _id: u32, _name: Option<&Name>) -> Result<()> {
        self.close()
    }

    fn write_array_reference(&mut self, reference: u32, name: Option<&Name>) -> Result<()> {
        self.reference("array", reference, name, None)
    }

    fn write_object_open(&mut self, id: u32, name: Option<&Name>, class_name: &str) -> Result<()> {
        self.open("object", id, name, Some(class_name))
    }

    fn write_object_close(&mut self, _id: u32, _name: Option<&Name>, _class_name: &str) -> Result<()> {
        self.close()
    }

    fn write_object_reference(
        &mut self,
        reference: u32,
        name: Option<&Name>,
        class_name: &str,
    ) -> Result<()> {
        self.reference("object", reference, name, Some(class_name))
    }

    fn write_bool(&mut self, slot: Slot, value: bool, name: Option<&Name>) -> Result<()> {
        self.scalar("bool", slot, name, json!(value))
    }

    fn write_int(&mut self, slot: Slot, value: i64, name: Option<&Name>) -> Result<()> {
        self.scalar("int", slot, name, json!(value))
    }

    fn write_float(&mut self, slot: Slot, value: f64, name: Option<&Name>) -> Result<()> {
        // NaN and infinities have no JSON number; keep their text.
        let value = serde_json::Number::from_f64(value)
            .map_or_else(|| json!(value.to_string()), Json::Number);
        self.scalar("float", slot, name, value)
    }

    fn write_null(&mut self, slot: Slot, name: Option<&Name>) -> Result<()> {
        self.scalar("null", slot, name, Json::Null)
    }

    fn write_resource(&mut self, slot: Slot, name: Option<&Name>, type_name: &str) -> Result<()> {
        self.scalar("resource", slot, name, json!(type_name))
    }

    fn write_string(&mut self, slot: Slot, value: &str, name: Option<&Name>) -> Result<()> {
        self.scalar("string", slot, name, json!(value))
    }

    fn write_uninitialized(&mut self, slot: Slot, name: Option<&Name>) -> Result<()> {
        self.scalar("uninitialized", slot, name, Json::Null)
    }

    fn write_unknown(&mut self, slot: Slot, name: Option<&Name>, type_name: &str) -> Result<()> {
        self.scalar("unknown", slot, name, json!(type_name))
    }
}
