//! Pre-order walk over a value graph.

use crate::error::Result;
use crate::inspect::{Inspected, ValueInspector};
use crate::writer::{Name, Slot, VarWriter};
use std::collections::HashMap;
use tracing::{debug, trace};

/// Drives a [`VarWriter`] over a value graph.
///
/// Identifiers start at 1 and are unique within one [`VarDumper::dump`]
/// call. A composite is expanded the first time it is reached; every later
/// path to it yields a reference, so cyclic graphs terminate and shared
/// substructures are written once. A shared cell that is reached again
/// through its own chain of cells is written as an unknown `reference`.
pub struct VarDumper<W: VarWriter> {
    writer: W,
    next_id: u32,
    seen: HashMap<usize, u32>,
    // Cells between the current node and the nearest enclosing composite.
    cell_chain: Vec<usize>,
    trace_scalar_references: bool,
}

impl<W: VarWriter> VarDumper<W> {
    /// Create a dumper writing to `writer`.
    pub fn new(writer: W) -> Self {
        Self {
            writer,
            next_id: 0,
            seen: HashMap::new(),
            cell_chain: Vec::new(),
            trace_scalar_references: false,
        }
    }

    /// Borrow the writer.
    pub fn writer(&self) -> &W {
        &self.writer
    }

    /// Give back the writer.
    pub fn into_writer(self) -> W {
        self.writer
    }

    /// Dump `value` under `name`.
    ///
    /// With `trace_scalar_references`, by-reference scalar slots are tracked
    /// like composites: the first slot bound to some storage gets an
    /// identifier and later slots bound to it point back at it. Without it,
    /// every slot is written as an independent value.
    ///
    /// Fails with [`crate::DumpError::InvalidName`] when a collection key is
    /// neither a string nor an integer; output written up to that point is
    /// left as is.
    pub fn dump<V: ValueInspector>(
        &mut self,
        name: Option<Name>,
        value: &V,
        trace_scalar_references: bool,
    ) -> Result<()> {
        self.next_id = 0;
        self.seen.clear();
        self.cell_chain.clear();
        self.trace_scalar_references = trace_scalar_references;

        // Keeps every visited composite alive so no identity (an address)
        // can be reused by another allocation during this walk.
        let mut pinned: Vec<V> = Vec::new();

        self.writer.start()?;
        self.walk(value, name.as_ref(), &mut pinned)?;
        self.writer.stop()?;

        debug!(
            identifiers = self.next_id,
            tracked = self.seen.len(),
            "Dump complete"
        );
        Ok(())
    }

    fn assign(&mut self, identity: usize) -> u32 {
        self.next_id += 1;
        self.seen.insert(identity, self.next_id);
        self.next_id
    }

    fn walk<V: ValueInspector>(
        &mut self,
        value: &V,
        name: Option<&Name>,
        pinned: &mut Vec<V>,
    ) -> Result<()> {
        match value.inspect() {
            Inspected::Array { identity, entries } => {
                if let Some(&reference) = self.seen.get(&identity) {
                    trace!(reference, "Array already dumped");
                    return self.writer.write_array_reference(reference, name);
                }
                let id = self.assign(identity);
                self.writer.write_array_open(id, name)?;
                self.walk_entries(&entries, pinned)?;
                pinned.extend(entries.into_iter().map(|(_, v)| v));
                self.writer.write_array_close(id, name)
            }
            Inspected::Object {
                identity,
                class_name,
                entries,
            } => {
                if let Some(&reference) = self.seen.get(&identity) {
                    trace!(reference, class = %class_name, "Object already dumped");
                    return self
                        .writer
                        .write_object_reference(reference, name, &class_name);
                }
                let id = self.assign(identity);
                self.writer.write_object_open(id, name, &class_name)?;
                self.walk_entries(&entries, pinned)?;
                pinned.extend(entries.into_iter().map(|(_, v)| v));
                self.writer.write_object_close(id, name, &class_name)
            }
            Inspected::Shared { identity, target } => {
                if self.cell_chain.contains(&identity) {
                    trace!(identity, "Shared cell refers back to itself");
                    return self.writer.write_unknown(Slot::default(), name, "reference");
                }
                if !self.trace_scalar_references {
                    return self.walk_cell(identity, target, name, pinned);
                }
                let inner = target.inspect();
                if matches!(
                    inner,
                    Inspected::Array { .. } | Inspected::Object { .. } | Inspected::Shared { .. }
                ) {
                    // Composites carry their own identity.
                    return self.walk_cell(identity, target, name, pinned);
                }
                let slot = match self.seen.get(&identity) {
                    Some(&reference) => Slot::seen(reference),
                    None => Slot::first(self.assign(identity)),
                };
                pinned.push(target);
                self.write_scalar(inner, slot, name)
            }
            scalar => self.write_scalar(scalar, Slot::default(), name),
        }
    }

    fn walk_cell<V: ValueInspector>(
        &mut self,
        identity: usize,
        target: V,
        name: Option<&Name>,
        pinned: &mut Vec<V>,
    ) -> Result<()> {
        self.cell_chain.push(identity);
        let result = self.walk(&target, name, pinned);
        self.cell_chain.pop();
        pinned.push(target);
        result
    }

    fn walk_entries<V: ValueInspector>(
        &mut self,
        entries: &[(V, V)],
        pinned: &mut Vec<V>,
    ) -> Result<()> {
        let outer = std::mem::take(&mut self.cell_chain);
        let result = entries.iter().try_for_each(|(key, child)| {
            let name = Name::from_key(key)?;
            self.walk(child, Some(&name), pinned)
        });
        self.cell_chain = outer;
        result
    }

    fn write_scalar<V>(&mut self, node: Inspected<V>, slot: Slot, name: Option<&Name>) -> Result<()> {
        match node {
            Inspected::Null => self.writer.write_null(slot, name),
            Inspected::Uninitialized => self.writer.write_uninitialized(slot, name),
            Inspected::Bool(b) => self.writer.write_bool(slot, b, name),
            Inspected::Int(i) => self.writer.write_int(slot, i, name),
            Inspected::Float(f) => self.writer.write_float(slot, f, name),
            Inspected::Str(s) => self.writer.write_string(slot, &s, name),
            Inspected::Resource(kind) => self.writer.write_resource(slot, name, &kind),
            Inspected::Unknown(kind) => self.writer.write_unknown(slot, name, &kind),
            other => self.writer.write_unknown(slot, name, other.kind_name()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::DumpError;
    use errlog_common::{Composite, SharedCell, Value};

    /// Records writer calls as compact strings.
    #[derive(Default)]
    struct Recorder {
        calls: Vec<String>,
    }

    fn label(name: Option<&Name>) -> String {
        name.map_or_else(|| "-".to_string(), |n| n.to_string())
    }

    fn slot_label(slot: Slot) -> String {
        match (slot.id, slot.reference) {
            (Some(id), _) => format!("#{}", id),
            (_, Some(r)) => format!("->{}", r),
            _ => String::new(),
        }
    }

    impl VarWriter for Recorder {
        fn start(&mut self) -> Result<()> {
            self.calls.push("start".into());
            Ok(())
        }
        fn stop(&mut self) -> Result<()> {
            self.calls.push("stop".into());
            Ok(())
        }
        fn write_array_open(&mut self, id: u32, name: Option<&Name>) -> Result<()> {
            self.calls.push(format!("open array {} #{}", label(name), id));
            Ok(())
        }
        fn write_array_close(&mut self, id: u32, name: Option<&Name>) -> Result<()> {
            self.calls.push(format!("close array {} #{}", label(name), id));
            Ok(())
        }
        fn write_array_reference(&mut self, reference: u32, name: Option<&Name>) -> Result<()> {
            self.calls.push(format!("ref array {} ->{}", label(name), reference));
            Ok(())
        }
        fn write_object_open(&mut self, id: u32, name: Option<&Name>, class_name: &str) -> Result<()> {
            self.calls.push(format!("open {} {} #{}", class_name, label(name), id));
            Ok(())
        }
        fn write_object_close(&mut self, id: u32, name: Option<&Name>, class_name: &str) -> Result<()> {
            self.calls.push(format!("close {} {} #{}", class_name, label(name), id));
            Ok(())
        }
        fn write_object_reference(&mut self, reference: u32, name: Option<&Name>, class_name: &str) -> Result<()> {
            self.calls.push(format!("ref {} {} ->{}", class_name, label(name), reference));
            Ok(())
        }
        fn write_bool(&mut self, slot: Slot, value: bool, name: Option<&Name>) -> Result<()> {
            self.calls.push(format!("bool {}={}{}", label(name), value, slot_label(slot)));
            Ok(())
        }
        fn write_int(&mut self, slot: Slot, value: i64, name: Option<&Name>) -> Result<()> {
            self.calls.push(format!("int {}={}{}", label(name), value, slot_label(slot)));
            Ok(())
        }
        fn write_float(&mut self, slot: Slot, value: f64, name: Option<&Name>) -> Result<()> {
            self.calls.push(format!("float {}={}{}", label(name), value, slot_label(slot)));
            Ok(())
        }
        fn write_null(&mut self, slot: Slot, name: Option<&Name>) -> Result<()> {
            self.calls.push(format!("null {}{}", label(name), slot_label(slot)));
            Ok(())
        }
        fn write_resource(&mut self, slot: Slot, name: Option<&Name>, type_name: &str) -> Result<()> {
            self.calls.push(format!("resource {}={}{}", label(name), type_name, slot_label(slot)));
            Ok(())
        }
        fn write_string(&mut self, slot: Slot, value: &str, name: Option<&Name>) -> Result<()> {
            self.calls.push(format!("string {}={}{}", label(name), value, slot_label(slot)));
            Ok(())
        }
        fn write_uninitialized(&mut self, slot: Slot, name: Option<&Name>) -> Result<()> {
            self.calls.push(format!("uninit {}{}", label(name), slot_label(slot)));
            Ok(())
        }
        fn write_unknown(&mut self, slot: Slot, name: Option<&Name>, type_name: &str) -> Result<()> {
            self.calls.push(format!("unknown {}={}{}", label(name), type_name, slot_label(slot)));
            Ok(())
        }
    }

    fn dump(value: &Value, scalar_refs: bool) -> Vec<String> {
        let mut dumper = VarDumper::new(Recorder::default());
        dumper.dump(Some(Name::from("root")), value, scalar_refs).unwrap();
        dumper.into_writer().calls
    }

    #[test]
    fn test_scalars_one_call_each() {
        let value = Value::assoc([
            ("b", Value::Bool(true)),
            ("i", Value::Int(7)),
            ("f", Value::Float(1.5)),
            ("n", Value::Null),
            ("u", Value::Uninitialized),
            ("r", Value::Resource("stream".into())),
            ("s", Value::from("hi")),
            ("x", Value::Unknown("closure".into())),
        ]);
        assert_eq!(
            dump(&value, false),
            vec![
                "start",
                "open array root #1",
                "bool b=true",
                "int i=7",
                "float f=1.5",
                "null n",
                "uninit u",
                "resource r=stream",
                "string s=hi",
                "unknown x=closure",
                "close array root #1",
                "stop",
            ]
        );
    }

    #[test]
    fn test_shared_composite_written_once() {
        let point = Value::object("Point", [("x", 1)]);
        let value = Value::assoc([("a", point.clone()), ("b", point)]);
        assert_eq!(
            dump(&value, false),
            vec![
                "start",
                "open array root #1",
                "open Point a #2",
                "int x=1",
                "close Point a #2",
                "ref Point b ->2",
                "close array root #1",
                "stop",
            ]
        );
    }

    #[test]
    fn test_cycle_terminates() {
        let node = Composite::with_class("Node");
        node.insert("name", "n1");
        node.insert("next", Value::Object(node.clone()));
        let calls = dump(&Value::Object(node), false);
        assert_eq!(
            calls,
            vec![
                "start",
                "open Node root #1",
                "string name=n1",
                "ref Node next ->1",
                "close Node root #1",
                "stop",
            ]
        );
    }

    #[test]
    fn test_ids_are_preorder() {
        let value = Value::list([Value::list([Value::list([1])]), Value::list([2])]);
        let calls = dump(&value, false);
        let opens: Vec<&String> = calls.iter().filter(|c| c.starts_with("open")).collect();
        assert_eq!(
            opens,
            vec!["open array root #1", "open array 0 #2", "open array 0 #3", "open array 1 #4"]
        );
    }

    #[test]
    fn test_scalar_references_tracked_when_enabled() {
        let cell = SharedCell::new(42);
        let value = Value::assoc([
            ("a", Value::Shared(cell.clone())),
            ("b", Value::Shared(cell)),
            ("c", Value::Int(42)),
        ]);
        let calls = dump(&value, true);
        assert_eq!(calls[2], "int a=42#2");
        assert_eq!(calls[3], "int b=42->2");
        assert_eq!(calls[4], "int c=42");
    }

    #[test]
    fn test_scalar_references_ignored_when_disabled() {
        let cell = SharedCell::new("s");
        let value = Value::assoc([("a", Value::Shared(cell.clone())), ("b", Value::Shared(cell))]);
        let calls = dump(&value, false);
        assert_eq!(calls[2], "string a=s");
        assert_eq!(calls[3], "string b=s");
    }

    #[test]
    fn test_shared_cell_holding_composite_uses_composite_identity() {
        let list = Value::list([1]);
        let value = Value::assoc([("a", Value::shared(list.clone())), ("b", list)]);
        let calls = dump(&value, true);
        assert!(calls.contains(&"open array a #2".to_string()));
        assert!(calls.contains(&"ref array b ->2".to_string()));
    }

    #[test]
    fn test_self_holding_cell_terminates() {
        let cell = SharedCell::new(1);
        cell.set(Value::Shared(cell.clone()));
        let value = Value::assoc([("a", Value::Shared(cell))]);
        for scalar_refs in [false, true] {
            let calls = dump(&value, scalar_refs);
            assert_eq!(calls[2], "unknown a=reference");
            assert_eq!(calls.len(), 5);
        }
    }

    #[test]
    fn test_cell_reached_again_through_composite_is_array_reference() {
        let list = Composite::new();
        let cell = SharedCell::new(Value::Array(list.clone()));
        list.insert("back", Value::Shared(cell.clone()));
        let calls = dump(&Value::Shared(cell), false);
        assert_eq!(
            calls,
            vec!["start", "open array root #1", "ref array back ->1", "close array root #1", "stop"]
        );
    }

    #[test]
    fn test_invalid_key_rejected() {
        let composite = Composite::new();
        composite.insert(Value::Bool(true), 1);
        let mut dumper = VarDumper::new(Recorder::default());
        let err = dumper
            .dump(None, &Value::Array(composite), false)
            .unwrap_err();
        assert!(matches!(err, DumpError::InvalidName { kind: "bool" }));
    }

    #[test]
    fn test_identifiers_restart_per_dump() {
        let value = Value::list([1]);
        let mut dumper = VarDumper::new(Recorder::default());
        dumper.dump(None, &value, false).unwrap();
        dumper.dump(None, &value, false).unwrap();
        let calls = &dumper.writer().calls;
        let opens: Vec<&String> = calls.iter().filter(|c| c.starts_with("open")).collect();
        assert_eq!(opens, vec!["open array - #1", "open array - #1"]);
    }
}
