//! Element tree for sanitized savegame markup.
//!
//! The tree keeps enough of the source to re-emit it byte-for-byte: a
//! leading byte order mark, the prolog and epilog around the root, every
//! run of inter-element markup (indentation, comments, CDATA) and the raw
//! start and end tags of every element. An element only re-renders its
//! start tag after one of its attributes changed.

use std::io;

use quick_xml::Reader;
use quick_xml::escape::escape;
use quick_xml::events::{BytesStart, Event};

use crate::tag_codec;

const BOM: char = '\u{feff}';

#[derive(Debug, Clone, PartialEq, Eq)]
struct Attribute {
    name: String,
    value: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum TagForm {
    Paired,
    SelfClosing { spaced: bool },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Node {
    name: String,
    attributes: Vec<Attribute>,
    children: Vec<Node>,
    // Raw markup between the start tag and the first child (or end tag).
    text: String,
    // Raw markup between this element's end and the next sibling or parent end.
    tail: String,
    form: TagForm,
    raw_start: Option<String>,
    // Source text between `</` and `>`; absent for self-closing elements.
    raw_end: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Document {
    bom: bool,
    prolog: String,
    root: Node,
    epilog: String,
}

impl Node {
    fn from_start(start: &BytesStart<'_>, form: TagForm) -> io::Result<Self> {
        let name = utf8(start.name().as_ref())?.to_string();
        let mut attributes = Vec::new();
        for attr in start.attributes() {
            let attr = attr
                .map_err(|e| invalid_data(format!("malformed attribute in <{name}>: {e}")))?;
            let key = utf8(attr.key.as_ref())?.to_string();
            let value = attr
                .unescape_value()
                .map_err(|e| invalid_data(format!("bad value for {name}@{key}: {e}")))?
                .into_owned();
            attributes.push(Attribute { name: key, value });
        }

        Ok(Self {
            name,
            attributes,
            children: Vec::new(),
            text: String::new(),
            tail: String::new(),
            form,
            raw_start: Some(utf8(start)?.to_string()),
            raw_end: None,
        })
    }

    /// Element name as it appears in the sanitized tree (`_3` for `<3>`).
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Element name with the digit marker stripped.
    pub fn canonical_name(&self) -> &str {
        tag_codec::canonical_name(&self.name)
    }

    pub fn attribute(&self, name: &str) -> Option<&str> {
        self.attributes
            .iter()
            .find(|a| a.name == name)
            .map(|a| a.value.as_str())
    }

    /// The editable scalar carried in the `value` attribute.
    pub fn value(&self) -> Option<&str> {
        self.attribute("value")
    }

    /// Sets (or appends) an attribute. Writing the current value is a no-op
    /// and keeps the source start tag.
    pub fn set_attribute(&mut self, name: &str, value: impl Into<String>) {
        let value = value.into();
        match self.attributes.iter_mut().find(|a| a.name == name) {
            Some(existing) if existing.value == value => return,
            Some(existing) => existing.value = value,
            None => self.attributes.push(Attribute {
                name: name.to_string(),
                value,
            }),
        }
        self.raw_start = None;
    }

    pub fn children(&self) -> &[Node] {
        &self.children
    }

    /// First direct child with the given tree name.
    pub fn child(&self, name: &str) -> Option<&Node> {
        self.children.iter().find(|c| c.name == name)
    }

    pub fn child_mut(&mut self, name: &str) -> Option<&mut Node> {
        self.children.iter_mut().find(|c| c.name == name)
    }

    fn push_markup(&mut self, markup: &str) {
        match self.children.last_mut() {
            Some(last) => last.tail.push_str(markup),
            None => self.text.push_str(markup),
        }
    }

    fn write_into(&self, out: &mut String) {
        out.push('<');
        match &self.raw_start {
            Some(raw) => out.push_str(raw),
            None => self.write_start_tag(out),
        }

        let is_empty = self.children.is_empty() && self.text.is_empty();
        match self.form {
            TagForm::SelfClosing { .. } if is_empty => out.push_str("/>"),
            _ => {
                out.push('>');
                out.push_str(&self.text);
                for child in &self.children {
                    child.write_into(out);
                }
                out.push_str("</");
                out.push_str(self.raw_end.as_deref().unwrap_or(&self.name));
                out.push('>');
            }
        }
        out.push_str(&self.tail);
    }

    fn write_start_tag(&self, out: &mut String) {
        out.push_str(&self.name);
        for attr in &self.attributes {
            out.push(' ');
            out.push_str(&attr.name);
            out.push_str("=\"");
            out.push_str(&escape(attr.value.as_str()));
            out.push('"');
        }
        if let TagForm::SelfClosing { spaced: true } = self.form {
            out.push(' ');
        }
    }
}

impl Document {
    /// Parses already-sanitized markup. A leading byte order mark is kept
    /// aside and written back by [`Document::to_xml`].
    pub fn parse(text: &str) -> io::Result<Self> {
        let (bom, text) = match text.strip_prefix(BOM) {
            Some(rest) => (true, rest),
            None => (false, text),
        };
        let mut reader = Reader::from_str(text);
        let mut stack: Vec<Node> = Vec::new();
        let mut root: Option<Node> = None;
        let mut prolog = String::new();
        let mut epilog = String::new();

        loop {
            let event = reader.read_event().map_err(|e| {
                invalid_data(format!(
                    "XML parse error at byte {}: {e}",
                    reader.error_position()
                ))
            })?;

            let markup = match event {
                Event::Start(ref e) => {
                    ensure_single_root(&stack, &root)?;
                    stack.push(Node::from_start(e, TagForm::Paired)?);
                    continue;
                }
                Event::Empty(ref e) => {
                    ensure_single_root(&stack, &root)?;
                    let spaced = e.last().is_some_and(u8::is_ascii_whitespace);
                    let node = Node::from_start(e, TagForm::SelfClosing { spaced })?;
                    attach(&mut stack, &mut root, node);
                    continue;
                }
                Event::End(ref e) => {
                    let mut node = stack.pop().ok_or_else(|| {
                        invalid_data(format!(
                            "unexpected closing tag </{}>",
                            String::from_utf8_lossy(e.name().as_ref())
                        ))
                    })?;
                    node.raw_end =
                        raw_end_tag(text, reader.buffer_position() as usize, &node.name);
                    attach(&mut stack, &mut root, node);
                    continue;
                }
                Event::Text(ref e) => {
                    e.unescape().map_err(|err| {
                        invalid_data(format!(
                            "bad text content at byte {}: {err}",
                            reader.buffer_position()
                        ))
                    })?;
                    let raw = utf8(e)?;
                    if stack.is_empty() && !raw.trim().is_empty() {
                        return Err(invalid_data(format!(
                            "text outside the root element at byte {}",
                            reader.buffer_position()
                        )));
                    }
                    raw.to_string()
                }
                Event::CData(ref e) => format!("<![CDATA[{}]]>", utf8(e)?),
                Event::Comment(ref e) => format!("<!--{}-->", utf8(e)?),
                Event::Decl(ref e) => format!("<?{}?>", utf8(e)?),
                Event::PI(ref e) => format!("<?{}?>", utf8(e)?),
                Event::DocType(ref e) => format!("<!DOCTYPE {}>", utf8(e)?),
                Event::Eof => break,
            };

            match (stack.last_mut(), root.is_some()) {
                (Some(open), _) => open.push_markup(&markup),
                (None, false) => prolog.push_str(&markup),
                (None, true) => epilog.push_str(&markup),
            }
        }

        if let Some(open) = stack.last() {
            return Err(invalid_data(format!(
                "unexpected end of document: <{}> is never closed",
                open.name
            )));
        }
        let root = root.ok_or_else(|| invalid_data("document has no root element"))?;

        Ok(Self {
            bom,
            prolog,
            root,
            epilog,
        })
    }

    pub fn root(&self) -> &Node {
        &self.root
    }

    pub fn root_mut(&mut self) -> &mut Node {
        &mut self.root
    }

    /// Serializes the tree. The result is still sanitized.
    pub fn to_xml(&self) -> String {
        let mut out = String::with_capacity(self.prolog.len() + self.epilog.len() + 4096);
        if self.bom {
            out.push(BOM);
        }
        out.push_str(&self.prolog);
        self.root.write_into(&mut out);
        out.push_str(&self.epilog);
        out
    }
}

fn ensure_single_root(stack: &[Node], root: &Option<Node>) -> io::Result<()> {
    if stack.is_empty() && root.is_some() {
        return Err(invalid_data("document has more than one root element"));
    }
    Ok(())
}

fn attach(stack: &mut [Node], root: &mut Option<Node>, node: Node) {
    match stack.last_mut() {
        Some(parent) => parent.children.push(node),
        None => *root = Some(node),
    }
}

/// Text between `</` and `>` of the end tag for `name` that finishes at `end`.
fn raw_end_tag(text: &str, end: usize, name: &str) -> Option<String> {
    let tag = text.get(..end)?.strip_suffix('>')?;
    let inner = &tag[tag.rfind("</")? + 2..];
    (inner.trim_end() == name).then(|| inner.to_string())
}

fn utf8(bytes: &[u8]) -> io::Result<&str> {
    std::str::from_utf8(bytes).map_err(|e| invalid_data(format!("invalid UTF-8 in markup: {e}")))
}

fn invalid_data(message: impl Into<String>) -> io::Error {
    io::Error::new(io::ErrorKind::InvalidData, message.into())
}
