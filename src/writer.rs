use crate::document::Document;
use crate::element::Element;
use quick_xml::escape::escape;
use std::borrow::Cow;

/// Options when writing xml.
///
/// `indent`: Prefixed once per nesting level to every line. Defaults to a tab.
///
/// `escape`: Escape `<`, `>`, `&`, `'` and `"` in text and attribute values.
/// Line breaks and tabs in attribute values are written as `&#10;`, `&#13;` and `&#9;`.
/// Off by default, so content containing them does not survive a write/parse round trip.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WriteOptions {
    pub indent: String,
    pub escape: bool,
}

impl Default for WriteOptions {
    fn default() -> WriteOptions {
        WriteOptions {
            indent: "\t".to_string(),
            escape: false,
        }
    }
}

enum Step {
    Open(Element, usize),
    Close(Element, usize),
}

// Every newline an element emits is followed by the indentation of its level,
// including newlines inside text and attribute values,
// as if the finished element string was indented line by line.
// Walks with an explicit stack, so deep trees don't overflow.
pub(crate) fn write_element(
    document: &Document,
    element: Element,
    opts: &WriteOptions,
    buf: &mut String,
) {
    let mut stack = vec![Step::Open(element, 0)];
    while let Some(step) = stack.pop() {
        match step {
            Step::Open(element, depth) => {
                let prefix = opts.indent.repeat(depth);
                if depth > 0 {
                    push_newline(buf, &prefix);
                }
                buf.push('<');
                buf.push_str(element.tag(document));
                for (name, value) in element.attributes(document) {
                    buf.push(' ');
                    buf.push_str(name);
                    buf.push_str("=\"");
                    push_lines(buf, &escaped_attribute(value, opts), &prefix);
                    buf.push('"');
                }
                buf.push('>');

                let text = element.text(document);
                if !text.is_empty() {
                    let inner = opts.indent.repeat(depth + 1);
                    push_newline(buf, &inner);
                    push_lines(buf, &escaped(text, opts), &inner);
                }
                stack.push(Step::Close(element, depth));
                for child in element.children(document).iter().rev() {
                    stack.push(Step::Open(*child, depth + 1));
                }
            }
            Step::Close(element, depth) => {
                push_newline(buf, &opts.indent.repeat(depth));
                buf.push_str("</");
                buf.push_str(element.tag(document));
                buf.push('>');
            }
        }
    }
}

fn push_newline(buf: &mut String, prefix: &str) {
    buf.push('\n');
    buf.push_str(prefix);
}

fn push_lines(buf: &mut String, s: &str, prefix: &str) {
    let mut lines = s.split('\n');
    if let Some(first) = lines.next() {
        buf.push_str(first);
    }
    for line in lines {
        push_newline(buf, prefix);
        buf.push_str(line);
    }
}

fn escaped<'a>(raw: &'a str, opts: &WriteOptions) -> Cow<'a, str> {
    if !opts.escape {
        return Cow::Borrowed(raw);
    }
    match escape(raw.as_bytes()) {
        Cow::Borrowed(_) => Cow::Borrowed(raw),
        // escaping only replaces ascii bytes, so this is never lossy
        Cow::Owned(bytes) => Cow::Owned(String::from_utf8_lossy(&bytes).into_owned()),
    }
}

// Parsers normalize whitespace in attribute values,
// so line breaks and tabs are written as character references.
fn escaped_attribute<'a>(raw: &'a str, opts: &WriteOptions) -> Cow<'a, str> {
    let value = escaped(raw, opts);
    if !opts.escape || !value.contains(&['\n', '\r', '\t'][..]) {
        return value;
    }
    let mut out = String::with_capacity(value.len() + 8);
    for c in value.chars() {
        match c {
            '\n' => out.push_str("&#10;"),
            '\r' => out.push_str("&#13;"),
            '\t' => out.push_str("&#9;"),
            c => out.push(c),
        }
    }
    Cow::Owned(out)
}

#[cfg(test)]
mod tests {
    use super::WriteOptions;
    use crate::{Document, Element};

    #[test]
    fn test_bare_element() {
        let mut doc = Document::new();
        let elem = Element::new(&mut doc, "empty");
        assert_eq!(elem.render(&doc, "\t"), "<empty>\n</empty>");
    }

    #[test]
    fn test_nested() {
        let mut doc = Document::new();
        let root = Element::build("root")
            .attribute("a", "1")
            .attribute("b", "two")
            .text("Hello\nWorld")
            .finish(&mut doc);
        let c = Element::build("c").text("x").push_to(&mut doc, root);
        Element::build("d").push_to(&mut doc, c);
        Element::build("e").push_to(&mut doc, root);

        let expected = "<root a=\"1\" b=\"two\">\n\
                        \tHello\n\
                        \tWorld\n\
                        \t<c>\n\
                        \t\tx\n\
                        \t\t<d>\n\
                        \t\t</d>\n\
                        \t</c>\n\
                        \t<e>\n\
                        \t</e>\n\
                        </root>";
        assert_eq!(root.render(&doc, "\t"), expected);
    }

    #[test]
    fn test_custom_indent() {
        let mut doc = Document::new();
        let root = Element::new(&mut doc, "a");
        Element::build("b").text("t").push_to(&mut doc, root);
        assert_eq!(root.render(&doc, "  "), "<a>\n  <b>\n    t\n  </b>\n</a>");
        assert_eq!(root.render(&doc, ""), "<a>\n<b>\nt\n</b>\n</a>");
    }

    #[test]
    fn test_every_line_is_prefixed() {
        let mut doc = Document::new();
        let root = Element::new(&mut doc, "root");
        Element::build("child")
            .attribute("v", "a\nb")
            .text("line1\n\nline3")
            .push_to(&mut doc, root);
        let expected = "<root>\n\
                        \t<child v=\"a\n\
                        \tb\">\n\
                        \t\tline1\n\
                        \t\t\n\
                        \t\tline3\n\
                        \t</child>\n\
                        </root>";
        assert_eq!(root.render(&doc, "\t"), expected);
    }

    #[test]
    fn test_escape() {
        let mut doc = Document::new();
        let root = Element::build("root")
            .attribute("attr", "<&\"")
            .text("a < b & c")
            .finish(&mut doc);
        assert_eq!(
            root.render(&doc, "\t"),
            "<root attr=\"<&\"\">\n\ta < b & c\n</root>"
        );
        let opts = WriteOptions {
            escape: true,
            ..WriteOptions::default()
        };
        assert_eq!(
            root.render_with_opts(&doc, &opts),
            "<root attr=\"&lt;&amp;&quot;\">\n\ta &lt; b &amp; c\n</root>"
        );
    }

    #[test]
    fn test_escape_attribute_whitespace() {
        let mut doc = Document::new();
        let root = Element::new(&mut doc, "root");
        let child = Element::build("c")
            .attribute("v", "a\nb\r\tc")
            .text("x\ny")
            .push_to(&mut doc, root);
        doc.set_root_element(root);
        let opts = WriteOptions {
            escape: true,
            ..WriteOptions::default()
        };
        assert_eq!(
            child.render_with_opts(&doc, &opts),
            "<c v=\"a&#10;b&#13;&#9;c\">\n\tx\n\ty\n</c>"
        );

        let written = doc.write_str_with_opts(&opts).unwrap();
        let reparsed = Document::parse_str(&written).unwrap();
        let child = reparsed.root_element().unwrap().child_at(&reparsed, 0).unwrap();
        assert_eq!(child.attribute(&reparsed, "v").unwrap(), "a\nb\r\tc");
        assert_eq!(child.text(&reparsed), "x\ny");
    }

    #[test]
    fn test_deep_tree() {
        let depth = 100_000;
        let mut doc = Document::new();
        let root = Element::new(&mut doc, "a");
        let mut last = root;
        for _ in 1..depth {
            last = Element::build("a").push_to(&mut doc, last);
        }
        let written = root.render(&doc, "");
        assert_eq!(written.len(), depth * "<a>\n</a>\n".len() - 1);
        assert!(written.starts_with("<a>\n<a>\n"));
        assert!(written.ends_with("</a>\n</a>"));
    }
}
