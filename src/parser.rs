use crate::document::Document;
use crate::element::Element;
use crate::error::{Error, Result};
use encoding_rs::{Encoding, UTF_16BE, UTF_16LE, UTF_8};
use indexmap::IndexMap;
use quick_xml::events::{BytesStart, Event};
use quick_xml::Reader;
use std::borrow::Cow;
use std::io::BufRead;
use tracing::{debug, trace};

/// Options when parsing xml.
///
/// `normalize_text`: Trim every line of a text node and drop empty lines,
/// so indentation of pretty-printed xml doesn't end up in [`Element::text`].
/// When false, non-blank text nodes are appended as is.
///
/// `cdata_as_text`: `<![CDATA[...]]>` content is appended to the text like a text node.
/// Off by default, so CDATA sections are ignored like comments.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReadOptions {
    pub normalize_text: bool,
    pub cdata_as_text: bool,
}

impl Default for ReadOptions {
    fn default() -> ReadOptions {
        ReadOptions {
            normalize_text: true,
            cdata_as_text: false,
        }
    }
}

/// Trim each line, drop empty ones, and join the rest with `\n`.
///
/// ```ignore
/// assert_eq!(normalize_text("\n    Hello\n    World\n  "), "Hello\nWorld");
/// ```
pub(crate) fn normalize_text(raw: &str) -> String {
    raw.split('\n')
        .map(str::trim)
        .filter(|line| !line.is_empty())
        .collect::<Vec<&str>>()
        .join("\n")
}

// Value of `encoding="..."` in the xml declaration.
fn declared_encoding(bytes: &[u8]) -> Option<&[u8]> {
    if !bytes.starts_with(b"<?xml") {
        return None;
    }
    let end = bytes.windows(2).position(|w| w == b"?>")?;
    let decl = &bytes[..end];
    let pos = decl.windows(8).position(|w| w == b"encoding")?;
    let rest = &decl[pos + 8..];
    let start = rest.iter().position(|b| *b == b'"' || *b == b'\'')?;
    let quote = rest[start];
    let value = &rest[start + 1..];
    let len = value.iter().position(|b| *b == quote)?;
    Some(&value[..len])
}

fn sniff_encoding(bytes: &[u8]) -> Result<&'static Encoding> {
    match bytes {
        [0x00, 0x3c, 0x00, 0x3f, ..] => Ok(UTF_16BE),
        [0x3c, 0x00, 0x3f, 0x00, ..] => Ok(UTF_16LE),
        _ => match declared_encoding(bytes) {
            Some(label) => {
                let encoding = Encoding::for_label(label).ok_or(Error::CannotDecode)?;
                // We already read the declaration as ascii, so it can't really be UTF-16.
                if encoding == UTF_16LE || encoding == UTF_16BE {
                    Ok(UTF_8)
                } else {
                    Ok(encoding)
                }
            }
            None => Ok(UTF_8),
        },
    }
}

/// Decode raw document bytes, looking at the BOM, then the first bytes, then the declaration.
pub(crate) fn decode(bytes: &[u8]) -> Result<Cow<'_, str>> {
    let (encoding, bom_len) = match Encoding::for_bom(bytes) {
        Some(found) => found,
        None => (sniff_encoding(bytes)?, 0),
    };
    trace!(encoding = encoding.name(), "decoding document");
    encoding
        .decode_without_bom_handling_and_without_replacement(&bytes[bom_len..])
        .ok_or(Error::CannotDecode)
}

pub(crate) struct DocumentParser {
    document: Document,
    read_opts: ReadOptions,
    element_stack: Vec<Element>,
}

impl DocumentParser {
    fn new(opts: ReadOptions) -> DocumentParser {
        DocumentParser {
            document: Document::new(),
            read_opts: opts,
            element_stack: Vec::new(),
        }
    }

    pub(crate) fn parse_bytes(bytes: &[u8], opts: ReadOptions) -> Result<Document> {
        let text = decode(bytes)?;
        DocumentParser::parse_str(&text, opts)
    }

    pub(crate) fn parse_str(str: &str, opts: ReadOptions) -> Result<Document> {
        let str = str.strip_prefix('\u{feff}').unwrap_or(str);
        debug!(len = str.len(), ?opts, "parsing document");
        let mut parser = DocumentParser::new(opts);
        let mut reader = Reader::from_str(str);
        reader.check_end_names(true);
        parser.parse_content(reader)?;
        debug!(elements = parser.document.store.len(), "parsed document");
        Ok(parser.document)
    }

    fn handle_bytes_start(&mut self, ev: &BytesStart) -> Result<Element> {
        let parent = self.element_stack.last().copied();
        if parent.is_none() && self.document.root_element().is_some() {
            return Err(Error::MalformedXML(
                "Document has more than one root element".to_string(),
            ));
        }
        let tag = String::from_utf8(ev.name().to_vec())?;
        let mut attributes = IndexMap::new();
        for attr in ev.attributes() {
            let attr = attr?;
            let key = String::from_utf8(attr.key.to_vec())?;
            let value = String::from_utf8(attr.unescaped_value()?.into_owned())?;
            attributes.insert(key, value);
        }
        let element = Element::with_data(&mut self.document, tag, String::new(), attributes);
        match parent {
            Some(parent) => parent.attach(&mut self.document, element),
            None => self.document.set_root_element(element),
        }
        Ok(element)
    }

    fn handle_text(&mut self, content: &str) -> Result<()> {
        if content.trim().is_empty() {
            return Ok(());
        }
        let elem = match self.element_stack.last() {
            Some(elem) => *elem,
            None => {
                return Err(Error::MalformedXML(format!(
                    "Text outside of the root element: {:?}",
                    content.trim()
                )))
            }
        };
        if self.read_opts.normalize_text {
            elem.append_text(&mut self.document, &normalize_text(content));
        } else {
            elem.append_text(&mut self.document, content);
        }
        Ok(())
    }

    // Returns if document parsing is finished.
    fn handle_event(&mut self, event: Event) -> Result<bool> {
        match event {
            Event::Start(ref ev) => {
                let element = self.handle_bytes_start(ev)?;
                self.element_stack.push(element);
            }
            Event::Empty(ref ev) => {
                self.handle_bytes_start(ev)?;
            }
            Event::End(_) => {
                if self.element_stack.pop().is_none() {
                    return Err(Error::MalformedXML(
                        "Closing tag without an opening tag".to_string(),
                    ));
                }
            }
            Event::Text(ev) => {
                let content = String::from_utf8(ev.unescaped()?.into_owned())?;
                self.handle_text(&content)?;
            }
            // quick-xml stores CData content escaped.
            Event::CData(ev) => {
                if self.read_opts.cdata_as_text {
                    let content = String::from_utf8(ev.unescaped()?.into_owned())?;
                    self.handle_text(&content)?;
                }
            }
            Event::Comment(_) | Event::PI(_) | Event::DocType(_) | Event::Decl(_) => {}
            Event::Eof => return Ok(true),
        }
        Ok(false)
    }

    fn parse_content<B: BufRead>(&mut self, mut reader: Reader<B>) -> Result<()> {
        let mut buf = Vec::with_capacity(200); // reduce time increasing capacity at start.
        loop {
            let ev = reader.read_event(&mut buf)?;
            trace!(event = ?ev);
            if self.handle_event(ev)? {
                break;
            }
            buf.clear();
        }
        if let Some(open) = self.element_stack.last() {
            return Err(Error::MalformedXML(format!(
                "Unexpected end of document, <{}> is not closed",
                open.tag(&self.document)
            )));
        }
        if self.document.root_element().is_none() {
            return Err(Error::MalformedXML(
                "Document has no root element".to_string(),
            ));
        }
        Ok(())
    }
}
