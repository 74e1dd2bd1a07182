use crate::element::{Element, ElementData};
use crate::error::{Error, Result};
use crate::parser::{DocumentParser, ReadOptions};
use crate::writer::WriteOptions;
use std::fmt;
use std::fs::File;
use std::io::{self, Read, Write};
use std::path::Path;
use std::str::FromStr;

/// Represents a XML document.
///
/// The document owns every [`Element`] created in it. Elements are handles into it,
/// and the tree shape is the children lists starting from [`Document::root_element`].
/// An element that is removed from its parent stays in the document
/// until the document is dropped, and can be attached again.
///
/// Cloning a document copies all elements. Handles refer to the same positions
/// in both copies, but mutating one copy never affects the other.
///
/// Use [`Document::parse_str()`], [`Document::parse_file()`], or [`Document::parse_reader()`] to parse xml.
///
/// # Examples
/// ```
/// use xml_elem::Document;
///
/// let mut doc = Document::parse_str(r#"<?xml version="1.0" encoding="UTF-8"?>
/// <package>
///     <metadata>
///         <author>Lewis Carol</author>
///     </metadata>
/// </package>
/// "#).unwrap();
/// let author = doc.root_element().unwrap().descendants_with_tag(&doc, "author")[0];
/// author.set_text(&mut doc, "Lewis Carroll");
/// let xml = doc.write_str().unwrap();
/// assert_eq!(xml, "<package>\n\t<metadata>\n\t\t<author>\n\t\t\tLewis Carroll\n\t\t</author>\n\t</metadata>\n</package>");
/// ```
#[derive(Debug, Clone, Default)]
pub struct Document {
    pub(crate) store: Vec<ElementData>,
    root: Option<Element>,
}

impl Document {
    /// Create a blank new xml document.
    pub fn new() -> Document {
        Document {
            store: Vec::new(),
            root: None,
        }
    }

    /// Returns `true` if no element was ever created in this document.
    pub fn is_empty(&self) -> bool {
        self.store.is_empty()
    }

    pub fn root_element(&self) -> Option<Element> {
        self.root
    }

    /// Make `element` the root. It is the element written by [`Document::write`].
    pub fn set_root_element(&mut self, element: Element) {
        self.root = Some(element);
    }

    fn require_root(&self) -> Result<Element> {
        self.root
            .ok_or_else(|| Error::NotFound("document has no root element".to_string()))
    }
}

// Read and write
impl Document {
    /// Parses xml string.
    ///
    /// # Errors
    ///
    /// Returns Errors from [`Document::parse_reader`].
    pub fn parse_str(str: &str) -> Result<Document> {
        DocumentParser::parse_str(str, ReadOptions::default())
    }

    pub fn parse_str_with_opts(str: &str, opts: ReadOptions) -> Result<Document> {
        DocumentParser::parse_str(str, opts)
    }

    /// Parses xml file.
    ///
    /// # Errors
    ///
    /// - [`Error::NotFound`]: The file doesn't exist.
    /// - Errors from [`Document::parse_reader`].
    pub fn parse_file<P: AsRef<Path>>(path: P) -> Result<Document> {
        Self::parse_file_with_opts(path, ReadOptions::default())
    }

    pub fn parse_file_with_opts<P: AsRef<Path>>(path: P, opts: ReadOptions) -> Result<Document> {
        let path = path.as_ref();
        let file = File::open(path).map_err(|err| match err.kind() {
            io::ErrorKind::NotFound => Error::NotFound(format!("file {}", path.display())),
            _ => Error::Io(err),
        })?;
        Self::parse_reader_with_opts(file, opts)
    }

    /// Parses xml from reader.
    /// The encoding is detected from the BOM or the xml declaration, defaulting to UTF-8.
    ///
    /// # Errors
    ///
    /// - [`Error::CannotDecode`]: Could not decode XML.
    /// - [`Error::MalformedXML`]: Could not read XML.
    /// - [`Error::Io`]: IO Error
    pub fn parse_reader<R: Read>(reader: R) -> Result<Document> {
        Self::parse_reader_with_opts(reader, ReadOptions::default())
    }

    pub fn parse_reader_with_opts<R: Read>(mut reader: R, opts: ReadOptions) -> Result<Document> {
        let mut bytes = Vec::new();
        reader.read_to_end(&mut bytes)?;
        DocumentParser::parse_bytes(&bytes, opts)
    }

    /// Writes the root element as xml string, indented with tabs.
    ///
    /// # Errors
    ///
    /// - [`Error::NotFound`]: The document has no root element.
    pub fn write_str(&self) -> Result<String> {
        self.write_str_with_opts(&WriteOptions::default())
    }

    pub fn write_str_with_opts(&self, opts: &WriteOptions) -> Result<String> {
        Ok(self.require_root()?.render_with_opts(self, opts))
    }

    /// Write the root element to writer. Will be written in UTF-8.
    pub fn write(&self, writer: &mut impl Write) -> Result<()> {
        self.write_with_opts(writer, &WriteOptions::default())
    }

    pub fn write_with_opts(&self, writer: &mut impl Write, opts: &WriteOptions) -> Result<()> {
        let xml = self.write_str_with_opts(opts)?;
        writer.write_all(xml.as_bytes())?;
        Ok(())
    }
}

impl FromStr for Document {
    type Err = Error;

    fn from_str(s: &str) -> Result<Document> {
        Document::parse_str(s)
    }
}

/// Renders the root element with default [`WriteOptions`].
/// A document without root renders as an empty string.
impl fmt::Display for Document {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.root {
            Some(root) => f.write_str(&root.render_with_opts(self, &WriteOptions::default())),
            None => Ok(()),
        }
    }
}
