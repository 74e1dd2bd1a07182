use xml_elem::{Document, Error, ReadOptions};

#[test]
fn test_items_scenario() {
    let xml = r#"<root><item id="1">Hello</item><item id="2">World</item></root>"#;
    let doc = Document::parse_str(xml).unwrap();
    let root = doc.root_element().unwrap();
    let items = root.descendants_with_tag(&doc, "item");
    assert_eq!(items.len(), 2);
    assert_eq!(items[0].text(&doc), "Hello");
    assert_eq!(items[1].text(&doc), "World");
    assert_eq!(items[0].attribute(&doc, "id").unwrap(), "1");
}

#[test]
fn test_descendants_in_document_order() {
    let doc = Document::parse_str("<a><b/><c><a/></c></a>").unwrap();
    let root = doc.root_element().unwrap();
    let found = root.descendants_with_tag(&doc, "a");
    let c = root.child_at(&doc, 1).unwrap();
    assert_eq!(found, vec![root, c.child_at(&doc, 0).unwrap()]);
}

#[test]
fn test_attributes_in_document_order() {
    let doc = Document::parse_str(r#"<a z="1" b="2" m="3"/>"#).unwrap();
    let root = doc.root_element().unwrap();
    let names: Vec<&str> = root.attributes(&doc).keys().map(String::as_str).collect();
    assert_eq!(names, ["z", "b", "m"]);
}

#[test]
fn test_duplicate_attribute_err() {
    let doc = Document::parse_str(r#"<a x="1" x="2"/>"#);
    assert!(matches!(doc.unwrap_err(), Error::MalformedXML(_)));
}

#[test]
fn test_closing_tag_mismatch_err() {
    // no closing tag
    let xml = "<img>";
    let opts = ReadOptions::default();
    let doc = Document::parse_str_with_opts(xml, opts.clone());
    assert!(matches!(doc.unwrap_err(), Error::MalformedXML(_)));

    // closing tag mismatch
    let xml = "<a><img>Te</a>xt</img>";
    let doc = Document::parse_str_with_opts(xml, opts.clone());
    assert!(matches!(doc.unwrap_err(), Error::MalformedXML(_)));

    // no opening tag
    let xml = "</abc>";
    let doc = Document::parse_str_with_opts(xml, opts);
    assert!(matches!(doc.unwrap_err(), Error::MalformedXML(_)));
}

#[test]
fn test_missing_file() {
    let err = Document::parse_file("tests/documents/no_such_file.xml").unwrap_err();
    assert!(matches!(err, Error::NotFound(_)));
}

#[test]
fn test_parse_file() {
    let doc = Document::parse_file("tests/documents/basic.xml").unwrap();
    let root = doc.root_element().unwrap();
    assert_eq!(root.tag(&doc), "root");
    assert_eq!(root.child_count(&doc), 2);
}

#[test]
fn test_parse_reader() {
    let xml = "<?xml version=\"1.0\"?>\n<a>\n\t<b>x</b>\n</a>";
    let utf16: Vec<u8> = [0xff_u8, 0xfe]
        .iter()
        .copied()
        .chain(xml.encode_utf16().flat_map(|u| u.to_le_bytes()))
        .collect();
    for bytes in [xml.as_bytes(), &utf16[..]].iter() {
        let doc = Document::parse_reader(*bytes).unwrap();
        let root = doc.root_element().unwrap();
        assert_eq!(root.child_at(&doc, 0).unwrap().text(&doc), "x");
    }
}

#[test]
fn test_io_error() {
    struct Failing;
    impl std::io::Read for Failing {
        fn read(&mut self, _: &mut [u8]) -> std::io::Result<usize> {
            Err(std::io::Error::new(std::io::ErrorKind::Other, "broken"))
        }
    }
    assert!(matches!(
        Document::parse_reader(Failing).unwrap_err(),
        Error::Io(_)
    ));
}

#[test]
fn test_from_str() {
    let doc: Document = "<a>  text  </a>".parse().unwrap();
    let root = doc.root_element().unwrap();
    assert_eq!(root.text(&doc), "text");
}

#[test]
fn test_cdata_ignored_by_default() {
    let doc = Document::parse_file("tests/documents/nodes.xml").unwrap();
    let root = doc.root_element().unwrap();
    let code = root.child_at(&doc, 0).unwrap();
    assert_eq!(code.tag(&doc), "code");
    assert_eq!(code.text(&doc), "");
    assert_eq!(root.child_at(&doc, 1).unwrap().text(&doc), "beforeafter");

    let opts = ReadOptions {
        cdata_as_text: true,
        ..ReadOptions::default()
    };
    let doc = Document::parse_file_with_opts("tests/documents/nodes.xml", opts).unwrap();
    let code = doc.root_element().unwrap().child_at(&doc, 0).unwrap();
    assert_eq!(code.text(&doc), "if a < b && c > d");
}
