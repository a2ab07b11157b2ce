//! Structured dumps of arbitrary value graphs.
//!
//! [`VarDumper`] walks a value in pre-order, gives every composite an
//! identifier the first time it is seen and reports later sightings as
//! references to that identifier. Output is produced by a [`VarWriter`]:
//!
//! - [`HtmlVarWriter`]: nested tables with anchors and "see N" links
//! - [`JsonVarWriter`]: a `serde_json::Value` tree, handy for assertions
//!
//! The dumper never looks at concrete value types; it asks a
//! [`ValueInspector`] what it is holding.
//!
//! # Example
//!
//! ```
//! use errlog_common::Value;
//! use errlog_dump::{JsonVarWriter, Name, VarDumper};
//!
//! let shared = Value::list([1, 2]);
//! let root = Value::assoc([("a", shared.clone()), ("b", shared)]);
//!
//! let mut dumper = VarDumper::new(JsonVarWriter::new());
//! dumper.dump(Some(Name::from("vars")), &root, false).unwrap();
//! let tree = dumper.into_writer().into_value();
//! assert_eq!(tree["entries"][1]["reference"], 2);
//! ```

pub mod dumper;
pub mod error;
pub mod html;
pub mod inspect;
pub mod json;
pub mod writer;

pub use dumper::VarDumper;
pub use error::{DumpError, Result};
pub use html::HtmlVarWriter;
pub use inspect::{Inspected, ValueInspector};
pub use json::JsonVarWriter;
pub use writer::{Name, Slot, VarWriter};
