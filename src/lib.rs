//! A mutable XML element tree.
//!
//! [`Document`] owns the elements. [`Element`] is a copyable handle into it, so
//! most methods take `&Document` to read or `&mut Document` to mutate.
//!
//! Text content is normalized while parsing (each line trimmed, empty lines dropped),
//! and writing produces an indentation-driven form with one line per tag and per text line.
//!
//! ```
//! use xml_elem::{Document, Element};
//!
//! let mut doc = Document::parse_str(
//!     r#"<root><item id="1">Hello</item><item id="2">World</item></root>"#,
//! ).unwrap();
//! let root = doc.root_element().unwrap();
//! let items = root.descendants_with_tag(&doc, "item");
//! assert_eq!(items[0].text(&doc), "Hello");
//! assert_eq!(items[0].attribute(&doc, "id").unwrap(), "1");
//!
//! let subject = Element::build("subject").text("Greetings").finish(&mut doc);
//! root.insert_child(&mut doc, 0, subject).unwrap();
//! root.move_child_down(&mut doc, 0, 1).unwrap();
//! assert_eq!(root.index_of(&doc, subject).unwrap(), 1);
//! ```
mod document;
mod element;
mod error;
mod parser;
mod writer;

pub use crate::document::Document;
pub use crate::element::{Element, ElementBuilder};
pub use crate::error::{Error, Result};
pub use crate::parser::ReadOptions;
pub use crate::writer::WriteOptions;
