//! HTML table rendering of a dump.
//!
//! Every named value becomes one `<tr>` with an id column, a name column and
//! a value column. Composites nest a `<table>` in their value column. The
//! name cell of a first sighting carries `id="N"` so references can link to
//! it with `<a href="#N">see N</a>`.

use crate::error::Result;
use crate::writer::{Name, Slot, VarWriter};
use errlog_common::markup::{element, raw_element};
use errlog_common::text::{trim_to_width, ELLIPSIS};
use std::io::Write;

/// Default display width for names.
pub const DEFAULT_NAME_WIDTH: usize = 20;

/// Default display width for string values.
pub const DEFAULT_STRING_WIDTH: usize = 80;

/// Width of hover titles holding the untruncated text.
pub const TITLE_WIDTH: usize = 512;

/// Writes a dump as nested HTML tables.
pub struct HtmlVarWriter<W: Write> {
    out: W,
    name_width: usize,
    string_width: usize,
}

impl<W: Write> HtmlVarWriter<W> {
    /// Create a writer emitting to `out`.
    pub fn new(out: W) -> Self {
        Self {
            out,
            name_width: DEFAULT_NAME_WIDTH,
            string_width: DEFAULT_STRING_WIDTH,
        }
    }

    /// Set the display width of names.
    pub fn with_name_width(mut self, width: usize) -> Self {
        self.name_width = width;
        self
    }

    /// Set the display width of string values.
    pub fn with_string_width(mut self, width: usize) -> Self {
        self.string_width = width;
        self
    }

    /// Give back the underlying stream.
    pub fn into_inner(self) -> W {
        self.out
    }

    fn write_name(&mut self, name: Option<&Name>, id: Option<u32>) -> Result<()> {
        let id = id.map(|id| id.to_string());
        let (text, class, title) = match name {
            Some(Name::Int(i)) => (i.to_string(), "number", None),
            Some(Name::Str(s)) => {
                let text = trim_to_width(s, self.name_width, ELLIPSIS);
                let title = (text != *s).then(|| trim_to_width(s, TITLE_WIDTH, ELLIPSIS));
                (text, "string", title)
            }
            None => (String::new(), "string", None),
        };

        self.out.write_all(
            element("th", &[("class", Some("id"))], id.as_deref().unwrap_or("")).as_bytes(),
        )?;
        self.out.write_all(
            element(
                "th",
                &[
                    ("class", Some(class)),
                    ("id", id.as_deref()),
                    ("title", title.as_deref()),
                ],
                &text,
            )
            .as_bytes(),
        )?;
        Ok(())
    }

    fn write_scalar(
        &mut self,
        slot: Slot,
        name: Option<&Name>,
        text: &str,
        class: &str,
        title: Option<&str>,
    ) -> Result<()> {
        let mut html = element("span", &[("class", Some(class)), ("title", title)], text);
        if let Some(reference) = slot.reference {
            html.push_str(", ");
            html.push_str(&see_link(reference));
        }

        self.out.write_all(b"<tr>")?;
        self.write_name(name, slot.id)?;
        self.out.write_all(raw_element("td", &[], &html).as_bytes())?;
        self.out.write_all(b"</tr>")?;
        Ok(())
    }

    fn write_open(&mut self, id: u32, name: Option<&Name>, header: String) -> Result<()> {
        // The unnamed root writes its rows straight into the outer table.
        if name.is_none() {
            return Ok(());
        }
        self.out.write_all(b"<tr>")?;
        self.write_name(name, Some(id))?;
        self.out.write_all(b"<td>")?;
        self.out.write_all(header.as_bytes())?;
        self.out.write_all(b"<br/><table>")?;
        Ok(())
    }

    fn write_close(&mut self, name: Option<&Name>) -> Result<()> {
        if name.is_some() {
            self.out.write_all(b"</table></td></tr>")?;
        }
        Ok(())
    }

    fn write_reference(&mut self, reference: u32, name: Option<&Name>, marker: String) -> Result<()> {
        let html = format!("{}, {}", marker, see_link(reference));
        self.out.write_all(b"<tr>")?;
        self.write_name(name, None)?;
        self.out.write_all(raw_element("td", &[], &html).as_bytes())?;
        self.out.write_all(b"</tr>")?;
        Ok(())
    }
}

fn see_link(reference: u32) -> String {
    let href = format!("#{}", reference);
    element("a", &[("href", Some(href.as_str()))], &format!("see {}", reference))
}

impl<W: Write> VarWriter for HtmlVarWriter<W> {
    fn start(&mut self) -> Result<()> {
        self.out.write_all(br#"<table class="var-dump">"#)?;
        Ok(())
    }

    fn stop(&mut self) -> Result<()> {
        self.out.write_all(b"</table>")?;
        Ok(())
    }

    fn write_array_open(&mut self, id: u32, name: Option<&Name>) -> Result<()> {
        let header = element("div", &[("class", Some("array"))], "array");
        self.write_open(id, name, header)
    }

    fn write_array_close(&mut self, _id: u32, name: Option<&Name>) -> Result<()> {
        self.write_close(name)
    }

    fn write_array_reference(&mut self, reference: u32, name: Option<&Name>) -> Result<()> {
        let marker = element("span", &[("class", Some("array"))], "array");
        self.write_reference(reference, name, marker)
    }

    fn write_object_open(&mut self, id: u32, name: Option<&Name>, class_name: &str) -> Result<()> {
        let header = element("div", &[("class", Some("class"))], class_name);
        self.write_open(id, name, header)
    }

    fn write_object_close(&mut self, _id: u32, name: Option<&Name>, _class_name: &str) -> Result<()> {
        self.write_close(name)
    }

    fn write_object_reference(
        &mut self,
        reference: u32,
        name: Option<&Name>,
        class_name: &str,
    ) -> Result<()> {
        let marker = element("span", &[("class", Some("class"))], class_name);
        self.write_reference(reference, name, marker)
    }

    fn write_bool(&mut self, slot: Slot, value: bool, name: Option<&Name>) -> Result<()> {
        let text = if value { "true" } else { "false" };
        self.write_scalar(slot, name, text, "keyword", None)
    }

    fn write_int(&mut self, slot: Slot, value: i64, name: Option<&Name>) -> Result<()> {
        self.write_scalar(slot, name, &value.to_string(), "number", None)
    }

    fn write_float(&mut self, slot: Slot, value: f64, name: Option<&Name>) -> Result<()> {
        self.write_scalar(slot, name, &value.to_string(), "number", None)
    }

    fn write_null(&mut self, slot: Slot, name: Option<&Name>) -> Result<()> {
        self.write_scalar(slot, name, "null", "keyword", None)
    }

    fn write_resource(&mut self, slot: Slot, name: Option<&Name>, type_name: &str) -> Result<()> {
        self.write_scalar(slot, name, type_name, "keyword", None)
    }

    fn write_string(&mut self, slot: Slot, value: &str, name: Option<&Name>) -> Result<()> {
        let text = trim_to_width(value, self.string_width, ELLIPSIS);
        let title = (text != value).then(|| trim_to_width(value, TITLE_WIDTH, ELLIPSIS));
        self.write_scalar(slot, name, &text, "string", title.as_deref())
    }

    fn write_uninitialized(&mut self, slot: Slot, name: Option<&Name>) -> Result<()> {
        self.write_scalar(slot, name, "uninitialized", "keyword", None)
    }

    fn write_unknown(&mut self, slot: Slot, name: Option<&Name>, type_name: &str) -> Result<()> {
        self.write_scalar(slot, name, "???", "unknown", Some(type_name))
    }
}
