use crate::document::Document;
use crate::error::{Error, Result};
use crate::writer::{self, WriteOptions};
use indexmap::IndexMap;
use tracing::debug;

#[derive(Debug, Clone)]
pub(crate) struct ElementData {
    tag: String,
    text: String,
    attributes: IndexMap<String, String>,
    children: Vec<Element>,
}

/// Represents an Xml Element.
///
/// This struct only contains a unique usize id and implements trait `Copy`.
/// So you do not need to bother with having a reference.
///
/// Because the actual data of the element is stored in [`Document`],
/// most methods takes `&Document` or `&mut Document` as its first argument.
///
/// Two `Element`s are equal when they are the same node, not when their contents
/// match. Using an element with a document it was not created in panics
/// or silently refers to another element.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Element {
    id: usize,
}

impl Element {
    /// Create a new empty element with tag.
    /// It has no text, no attributes and no children, and is not attached to anything.
    pub fn new<S: Into<String>>(document: &mut Document, tag: S) -> Element {
        Self::with_data(document, tag.into(), String::new(), IndexMap::new())
    }

    pub(crate) fn with_data(
        document: &mut Document,
        tag: String,
        text: String,
        attributes: IndexMap<String, String>,
    ) -> Element {
        let elem = Element {
            id: document.store.len(),
        };
        document.store.push(ElementData {
            tag,
            text,
            attributes,
            children: Vec::new(),
        });
        elem
    }

    /// Create an [`ElementBuilder`].
    ///
    /// ```
    /// use xml_elem::{Document, Element};
    ///
    /// let mut doc = Document::new();
    /// let root = Element::new(&mut doc, "root");
    /// let item = Element::build("item")
    ///     .attribute("id", "1")
    ///     .text("Hello")
    ///     .push_to(&mut doc, root);
    /// assert_eq!(root.child_at(&doc, 0).unwrap(), item);
    /// ```
    pub fn build<S: Into<String>>(tag: S) -> ElementBuilder {
        ElementBuilder::new(tag)
    }
}

impl Element {
    fn data<'a>(&self, document: &'a Document) -> &'a ElementData {
        &document.store[self.id]
    }

    fn mut_data<'a>(&self, document: &'a mut Document) -> &'a mut ElementData {
        &mut document.store[self.id]
    }

    pub fn tag<'a>(&self, document: &'a Document) -> &'a str {
        &self.data(document).tag
    }

    /// Own text of this element, not including text of its descendants.
    pub fn text<'a>(&self, document: &'a Document) -> &'a str {
        &self.data(document).text
    }

    pub fn set_text<S: Into<String>>(&self, document: &mut Document, text: S) {
        self.mut_data(document).text = text.into();
    }

    /// Concatenates `text` onto the current text. No separator is inserted.
    pub fn append_text(&self, document: &mut Document, text: &str) {
        self.mut_data(document).text.push_str(text);
    }
}

// Attributes
impl Element {
    /// Attributes in insertion order.
    ///
    /// The returned map is a read-only view. Clone it if you need a snapshot that
    /// outlives the borrow of `document`.
    pub fn attributes<'a>(&self, document: &'a Document) -> &'a IndexMap<String, String> {
        &self.data(document).attributes
    }

    /// Get value of attribute `name`.
    ///
    /// # Errors
    ///
    /// - [`Error::NotFound`]: This element has no attribute named `name`.
    pub fn attribute<'a>(&self, document: &'a Document, name: &str) -> Result<&'a str> {
        self.data(document)
            .attributes
            .get(name)
            .map(String::as_str)
            .ok_or_else(|| {
                Error::NotFound(format!(
                    "<{}> doesn't have an attribute named \"{}\"",
                    self.tag(document),
                    name
                ))
            })
    }

    /// Like [`Element::attribute`], but returns `default` if the attribute is absent.
    pub fn attribute_or<'a>(&self, document: &'a Document, name: &str, default: &'a str) -> &'a str {
        self.data(document)
            .attributes
            .get(name)
            .map_or(default, String::as_str)
    }

    pub fn has_attribute(&self, document: &Document, name: &str) -> bool {
        self.data(document).attributes.contains_key(name)
    }

    /// Set attribute `name` to `value`, replacing any existing value.
    /// Returns the replaced value.
    pub fn set_attribute<S, T>(&self, document: &mut Document, name: S, value: T) -> Option<String>
    where
        S: Into<String>,
        T: Into<String>,
    {
        self.mut_data(document)
            .attributes
            .insert(name.into(), value.into())
    }

    /// Remove attribute `name` and return its value.
    /// Returns `None` if there was no such attribute.
    pub fn remove_attribute(&self, document: &mut Document, name: &str) -> Option<String> {
        self.mut_data(document).attributes.shift_remove(name)
    }
}

// Children
impl Element {
    /// Direct children in order.
    ///
    /// The returned slice is a read-only view. Use `.to_vec()` for a snapshot.
    pub fn children<'a>(&self, document: &'a Document) -> &'a [Element] {
        &self.data(document).children
    }

    pub fn child_count(&self, document: &Document) -> usize {
        self.data(document).children.len()
    }

    /// ```ignore
    /// self.child_count(document) > 0
    /// ```
    pub fn has_children(&self, document: &Document) -> bool {
        !self.data(document).children.is_empty()
    }

    /// # Errors
    ///
    /// - [`Error::IndexOutOfRange`]: `index >= child_count`.
    pub fn child_at(&self, document: &Document, index: usize) -> Result<Element> {
        let children = self.children(document);
        children
            .get(index)
            .copied()
            .ok_or(Error::IndexOutOfRange {
                index,
                len: children.len(),
            })
    }

    /// Position of the first occurrence of `child` among direct children.
    ///
    /// # Errors
    ///
    /// - [`Error::NotFound`]: `child` is not a direct child of this element.
    pub fn index_of(&self, document: &Document, child: Element) -> Result<usize> {
        self.children(document)
            .iter()
            .position(|c| *c == child)
            .ok_or_else(|| {
                Error::NotFound(format!(
                    "<{}> is not a child of <{}>",
                    child.tag(document),
                    self.tag(document)
                ))
            })
    }

    /// True if `other` is in the subtree below this element.
    /// An element is never its own ancestor.
    pub(crate) fn is_ancestor_of(&self, document: &Document, other: Element) -> bool {
        let mut stack: Vec<Element> = self.children(document).to_vec();
        while let Some(elem) = stack.pop() {
            if elem == other {
                return true;
            }
            stack.extend_from_slice(elem.children(document));
        }
        false
    }

    fn check_attachable(&self, document: &Document, child: Element) -> Result<()> {
        if *self == child {
            debug!(tag = self.tag(document), "rejected self-append");
            return Err(Error::InvalidStructure(format!(
                "<{}> cannot be added to its own children",
                self.tag(document)
            )));
        }
        if child.is_ancestor_of(document, *self) {
            debug!(
                child = child.tag(document),
                parent = self.tag(document),
                "rejected cyclic append"
            );
            return Err(Error::InvalidStructure(format!(
                "<{}> is an ancestor of <{}>, so it can't become its child",
                child.tag(document),
                self.tag(document)
            )));
        }
        Ok(())
    }

    fn check_index(&self, document: &Document, index: usize) -> Result<usize> {
        let len = self.child_count(document);
        if index >= len {
            return Err(Error::IndexOutOfRange { index, len });
        }
        Ok(len)
    }

    /// Push without cycle checks. Only for elements that were just created.
    pub(crate) fn attach(&self, document: &mut Document, child: Element) {
        self.mut_data(document).children.push(child);
    }

    /// Equivalent to `vec.push()`.
    ///
    /// # Errors
    ///
    /// - [`Error::InvalidStructure`]: `child` is this element, or one of its ancestors.
    pub fn append_child(&self, document: &mut Document, child: Element) -> Result<()> {
        self.check_attachable(document, child)?;
        self.mut_data(document).children.push(child);
        Ok(())
    }

    /// Equivalent to `vec.insert()`.
    ///
    /// # Errors
    ///
    /// - [`Error::IndexOutOfRange`]: `index > child_count`.
    /// - [`Error::InvalidStructure`]: `child` is this element, or one of its ancestors.
    pub fn insert_child(&self, document: &mut Document, index: usize, child: Element) -> Result<()> {
        let len = self.child_count(document);
        if index > len {
            return Err(Error::IndexOutOfRange { index, len });
        }
        self.check_attachable(document, child)?;
        self.mut_data(document).children.insert(index, child);
        Ok(())
    }

    /// Remove the first occurrence of `child` from direct children.
    /// Descendants further down are not searched.
    ///
    /// # Errors
    ///
    /// - [`Error::NotFound`]: `child` is not a direct child of this element.
    pub fn remove_child(&self, document: &mut Document, child: Element) -> Result<()> {
        let pos = self.index_of(document, child)?;
        self.mut_data(document).children.remove(pos);
        Ok(())
    }

    /// Equivalent to `vec.remove()`.
    ///
    /// # Errors
    ///
    /// - [`Error::IndexOutOfRange`]: `index >= child_count`.
    pub fn remove_child_at(&self, document: &mut Document, index: usize) -> Result<Element> {
        self.check_index(document, index)?;
        Ok(self.mut_data(document).children.remove(index))
    }

    /// Exchange the children at `i` and `j`.
    ///
    /// # Errors
    ///
    /// - [`Error::IndexOutOfRange`]: either index is `>= child_count`.
    pub fn swap_children(&self, document: &mut Document, i: usize, j: usize) -> Result<()> {
        self.check_index(document, i)?;
        self.check_index(document, j)?;
        self.mut_data(document).children.swap(i, j);
        Ok(())
    }

    /// Move the child at `index` `n` positions towards the start, stopping at 0.
    /// A negative `n` moves it towards the end instead.
    ///
    /// Returns the final index of the moved child.
    ///
    /// # Errors
    ///
    /// - [`Error::IndexOutOfRange`]: `index >= child_count`.
    pub fn move_child_up(&self, document: &mut Document, index: usize, n: isize) -> Result<usize> {
        self.shift_child(document, index, n, true)
    }

    /// Move the child at `index` `n` positions towards the end, stopping at the last index.
    /// A negative `n` moves it towards the start instead.
    ///
    /// Returns the final index of the moved child.
    ///
    /// # Errors
    ///
    /// - [`Error::IndexOutOfRange`]: `index >= child_count`.
    pub fn move_child_down(&self, document: &mut Document, index: usize, n: isize) -> Result<usize> {
        self.shift_child(document, index, n, false)
    }

    // Rotating the covered range is the same as swapping with a neighbour step by step.
    fn shift_child(&self, document: &mut Document, index: usize, n: isize, up: bool) -> Result<usize> {
        let len = self.check_index(document, index)?;
        let steps = n.unsigned_abs();
        let children = &mut self.mut_data(document).children;
        if up == (n >= 0) {
            let target = index.saturating_sub(steps);
            children[target..=index].rotate_right(1);
            Ok(target)
        } else {
            let target = index.saturating_add(steps).min(len - 1);
            children[index..=target].rotate_left(1);
            Ok(target)
        }
    }
}

// Search, copy and render
impl Element {
    /// All descendants in document order, not including itself.
    pub fn descendants(&self, document: &Document) -> Vec<Element> {
        let mut result = Vec::new();
        let mut stack: Vec<Element> = self.children(document).iter().rev().copied().collect();
        while let Some(elem) = stack.pop() {
            result.push(elem);
            stack.extend(elem.children(document).iter().rev());
        }
        result
    }

    /// Every element in this subtree whose tag is `tag`, itself included,
    /// in document order (depth-first pre-order).
    pub fn descendants_with_tag(&self, document: &Document, tag: &str) -> Vec<Element> {
        let mut result = Vec::new();
        let mut stack = vec![*self];
        while let Some(elem) = stack.pop() {
            let data = elem.data(document);
            if data.tag == tag {
                result.push(elem);
            }
            // reversed, so the first child is popped first
            stack.extend(data.children.iter().rev());
        }
        result
    }

    /// Deep copy this subtree into new elements of the same document.
    /// The copy is detached and shares nothing with the original.
    pub fn deep_clone(&self, document: &mut Document) -> Element {
        let copy = self.shallow_clone(document);
        // (original, copy) pairs whose children still need copying
        let mut stack = vec![(*self, copy)];
        while let Some((original, copy)) = stack.pop() {
            let children = original.children(document).to_vec();
            for child in children {
                let child_copy = child.shallow_clone(document);
                copy.attach(document, child_copy);
                stack.push((child, child_copy));
            }
        }
        copy
    }

    fn shallow_clone(&self, document: &mut Document) -> Element {
        let data = self.data(document);
        let tag = data.tag.clone();
        let text = data.text.clone();
        let attributes = data.attributes.clone();
        Element::with_data(document, tag, text, attributes)
    }

    /// Render this subtree, indenting each level with `indent`.
    pub fn render(&self, document: &Document, indent: &str) -> String {
        let opts = WriteOptions {
            indent: indent.to_string(),
            ..WriteOptions::default()
        };
        self.render_with_opts(document, &opts)
    }

    pub fn render_with_opts(&self, document: &Document, opts: &WriteOptions) -> String {
        let mut buf = String::new();
        writer::write_element(document, *self, opts, &mut buf);
        buf
    }
}

/// Builder for an [`Element`] with attributes and text, created by [`Element::build`].
#[derive(Debug, Clone)]
pub struct ElementBuilder {
    tag: String,
    text: String,
    attributes: IndexMap<String, String>,
}

impl ElementBuilder {
    fn new<S: Into<String>>(tag: S) -> ElementBuilder {
        ElementBuilder {
            tag: tag.into(),
            text: String::new(),
            attributes: IndexMap::new(),
        }
    }

    pub fn attribute<S, T>(mut self, name: S, value: T) -> Self
    where
        S: Into<String>,
        T: Into<String>,
    {
        self.attributes.insert(name.into(), value.into());
        self
    }

    pub fn text<S: Into<String>>(mut self, text: S) -> Self {
        self.text = text.into();
        self
    }

    /// Create the element in `document` without attaching it.
    pub fn finish(self, document: &mut Document) -> Element {
        Element::with_data(document, self.tag, self.text, self.attributes)
    }

    /// Create the element and append it to `parent`.
    pub fn push_to(self, document: &mut Document, parent: Element) -> Element {
        let elem = self.finish(document);
        // a fresh element can't be an ancestor of parent
        parent.attach(document, elem);
        elem
    }
}
