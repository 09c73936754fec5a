use rstest::{fixture, rstest};
use xmlnav::dom::{Node, NodeKind, XmlAttribute, XmlDocument, DOCUMENT_NODE};
use xmlnav::{find_all, find_one, query, query_all, query_all_with_options, CompileOptions, XPathError};

/// <a><b id="1">x</b><b id="2">y</b></a>
#[fixture]
fn doc() -> XmlDocument {
    let mut doc = XmlDocument::new();
    let a = doc.append_element(DOCUMENT_NODE, "a").unwrap();
    for (id, text) in [("1", "x"), ("2", "y")] {
        let b = doc.append_element(a, "b").unwrap();
        doc.set_attribute(b, XmlAttribute::new("id", id)).unwrap();
        doc.append_text(b, text).unwrap();
    }
    doc
}

/// <library>
///   <!-- catalogue -->
///   <book year="2001"><title>Alpha</title><price>10</price></book>
///   <book year="1999"><title>Beta</title><price>25.5</price></book>
///   <magazine><title>Gamma</title></magazine>
/// </library>
#[fixture]
fn library() -> XmlDocument {
    let mut doc = XmlDocument::new();
    doc.append_declaration(DOCUMENT_NODE, "xml version=\"1.0\"").unwrap();
    let lib = doc.append_element(DOCUMENT_NODE, "library").unwrap();
    doc.append_text(lib, "\n  ").unwrap();
    doc.append_comment(lib, " catalogue ").unwrap();
    for (year, title, price) in [("2001", "Alpha", "10"), ("1999", "Beta", "25.5")] {
        doc.append_text(lib, "\n  ").unwrap();
        let book = doc.append_element(lib, "book").unwrap();
        doc.set_attribute(book, XmlAttribute::new("year", year)).unwrap();
        let t = doc.append_element(book, "title").unwrap();
        doc.append_text(t, title).unwrap();
        let p = doc.append_element(book, "price").unwrap();
        doc.append_text(p, price).unwrap();
    }
    doc.append_text(lib, "\n  ").unwrap();
    let mag = doc.append_element(lib, "magazine").unwrap();
    let t = doc.append_element(mag, "title").unwrap();
    doc.append_text(t, "Gamma").unwrap();
    doc.append_text(lib, "\n").unwrap();
    doc
}

#[rstest]
fn selects_elements_in_document_order(doc: XmlDocument) {
    let nodes = query_all(doc.root(), "//b").unwrap();
    assert_eq!(nodes.len(), 2);
    let ids: Vec<_> = nodes.iter().map(|n| n.as_tree().unwrap().id()).collect();
    assert!(ids[0] < ids[1]);
    assert_eq!(nodes[0].kind(), NodeKind::Element);
}

#[rstest]
fn predicate_on_attribute_value(doc: XmlDocument) {
    let node = query(doc.root(), "//b[@id='2']").unwrap().unwrap();
    assert_eq!(node.inner_text(), "y");
    assert_eq!(node.select_attr("id"), "2");
}

#[rstest]
fn attribute_selection_yields_synthetic_nodes(doc: XmlDocument) {
    let before = doc.node_count();
    let nodes = query_all(doc.root(), "//b/@id").unwrap();
    let values: Vec<_> = nodes.iter().map(|n| n.inner_text()).collect();
    assert_eq!(values, ["1", "2"]);
    for node in &nodes {
        let attr = node.as_attribute().unwrap();
        assert_eq!(attr.node().kind, NodeKind::Attribute);
        assert_eq!(attr.text_child().kind, NodeKind::Text);
        assert!(attr.node().first_child.is_none());
        let children: Vec<_> = attr.children().map(|c| (c.kind, c.data.as_str())).collect();
        assert_eq!(children, [(NodeKind::Text, attr.value())]);
        assert_eq!(attr.owner().data(), "b");
        assert_eq!(node.select_attr("id"), attr.value());
        assert_eq!(node.select_attr("other"), "");
    }
    assert_eq!(doc.node_count(), before);
}

#[rstest]
fn queries_are_deterministic(doc: XmlDocument) {
    let first = query_all(doc.root(), "//b | //b/@id").unwrap();
    let second = query_all(doc.root(), "//b | //b/@id").unwrap();
    assert_eq!(first, second);
}

#[rstest]
#[case("//b")]
#[case("//b[@id='3']")]
#[case("/a/b[2]")]
#[case("//c")]
#[case("//@id")]
fn query_is_absent_iff_query_all_is_empty(doc: XmlDocument, #[case] xpath: &str) {
    let all = query_all(doc.root(), xpath).unwrap();
    let first = query(doc.root(), xpath).unwrap();
    assert_eq!(first.is_none(), all.is_empty());
    assert_eq!(first.as_ref(), all.first());
}

#[rstest]
#[case("id", "1")]
#[case("ID", "")]
#[case("Id", "")]
#[case("missing", "")]
fn attribute_lookup_is_case_sensitive(doc: XmlDocument, #[case] name: &str, #[case] expected: &str) {
    let b = query(doc.root(), "//b").unwrap().unwrap();
    assert_eq!(b.select_attr(name), expected);
}

#[rstest]
#[case("//b[")]
#[case("//b]")]
#[case("'open")]
#[case("")]
fn malformed_expressions_are_errors(doc: XmlDocument, #[case] xpath: &str) {
    let err = query_all(doc.root(), xpath).unwrap_err();
    assert!(err.is_syntax(), "{xpath}: {err}");
    assert!(query(doc.root(), xpath).is_err());
}

#[rstest]
fn scalar_results_are_not_node_sets(doc: XmlDocument) {
    let err = query_all(doc.root(), "string(//b)").unwrap_err();
    assert_eq!(
        err,
        XPathError::NotANodeSet {
            expr: "string(//b)".to_string()
        }
    );
}

#[rstest]
#[should_panic(expected = "invalid XPath expression")]
fn find_all_panics_on_malformed_expression(doc: XmlDocument) {
    find_all(doc.root(), "//b[@id=");
}

#[rstest]
#[should_panic]
fn find_one_panics_on_unknown_function(doc: XmlDocument) {
    find_one(doc.root(), "//b[nope()]");
}

#[rstest]
fn queries_are_rooted_at_the_given_node(doc: XmlDocument) {
    let b = doc.node(doc.root_element_id().unwrap()).unwrap().children().nth(1).unwrap();
    let under_b = query_all(b, "/text()").unwrap();
    assert_eq!(under_b.len(), 1);
    assert_eq!(under_b[0].data(), "y");
    let from_b = query_all(b, "/").unwrap();
    assert_eq!(from_b, [Node::from(b)]);
    assert_eq!(query_all(b, "..").unwrap().len(), 1);
}

#[rstest]
#[case("/library/book", 2)]
#[case("//title", 3)]
#[case("//book[price > 20]/title", 1)]
#[case("//book[@year < 2000]", 1)]
#[case("//*[title='Gamma']", 1)]
#[case("/library/*", 3)]
#[case("/library/node()", 5)]
#[case("/library/comment()", 1)]
#[case("//book[1]/following-sibling::*", 2)]
#[case("//magazine/preceding-sibling::book", 2)]
#[case("//title[../price]", 2)]
#[case("//book[last()]/title", 1)]
#[case("//processing-instruction()", 0)]
fn selection_counts(library: XmlDocument, #[case] xpath: &str, #[case] expected: usize) {
    assert_eq!(query_all(library.root(), xpath).unwrap().len(), expected, "{xpath}");
}

#[rstest]
fn positional_predicates_apply_per_step(library: XmlDocument) {
    let firsts: Vec<_> = query_all(library.root(), "//*/title[1]")
        .unwrap()
        .iter()
        .map(|n| n.inner_text())
        .collect();
    assert_eq!(firsts, ["Alpha", "Beta", "Gamma"]);

    let overall = query_all(library.root(), "(//title)[2]").unwrap();
    assert_eq!(overall.len(), 1);
    assert_eq!(overall[0].inner_text(), "Beta");
}

#[rstest]
fn comment_value(library: XmlDocument) {
    let comment = query(library.root(), "//comment()").unwrap().unwrap();
    assert_eq!(comment.kind(), NodeKind::Comment);
    assert_eq!(comment.data(), " catalogue ");
}

#[rstest]
fn variables_bind_at_compile_time(library: XmlDocument) {
    let options = CompileOptions::new().with_variable("min", 20.0);
    let nodes = query_all_with_options(library.root(), "//book[price > $min]/title", &options).unwrap();
    assert_eq!(nodes.len(), 1);
    assert_eq!(nodes[0].inner_text(), "Beta");

    let err = query_all(library.root(), "//book[price > $min]").unwrap_err();
    assert!(matches!(err, XPathError::Eval(_)));
}

#[rstest]
fn namespaced_name_tests() {
    let mut doc = XmlDocument::new();
    let root = doc.append_element(DOCUMENT_NODE, "root").unwrap();
    doc.append_element_ns(root, "p", "item", "urn:p").unwrap();
    doc.append_element(root, "item").unwrap();
    let q = doc.append_element_ns(root, "q", "item", "urn:p").unwrap();
    doc.set_attribute(q, XmlAttribute::with_namespace("p:attr", "urn:p", "v"))
        .unwrap();

    // Unbound prefixes compare literally
    assert_eq!(query_all(doc.root(), "//p:item").unwrap().len(), 1);
    assert_eq!(query_all(doc.root(), "//item").unwrap().len(), 3);

    let options = CompileOptions::new().with_namespace("x", "urn:p");
    assert_eq!(query_all_with_options(doc.root(), "//x:item", &options).unwrap().len(), 2);
    assert_eq!(query_all_with_options(doc.root(), "//x:*", &options).unwrap().len(), 2);
    assert_eq!(query_all_with_options(doc.root(), "//@x:attr", &options).unwrap().len(), 1);

    let attr = query(doc.root(), "//@p:attr").unwrap().unwrap();
    assert_eq!(attr.prefix(), "p");
    assert_eq!(attr.namespace_uri(), "urn:p");
}

#[rstest]
fn select_element_helpers(library: XmlDocument) {
    let lib = library.root_element().unwrap();
    assert_eq!(lib.data(), "library");
    let books = lib.select_elements("book");
    assert_eq!(books.len(), 2);
    let magazine = lib.select_element("magazine").unwrap();
    assert_eq!(magazine.inner_text(), "Gamma");
    assert!(lib.select_element("newspaper").is_none());
}

#[rstest]
fn wide_trees_come_back_in_document_order() {
    let mut doc = XmlDocument::new();
    let a = doc.append_element(DOCUMENT_NODE, "a").unwrap();
    for i in 0..20_000 {
        let b = doc.append_element(a, "b").unwrap();
        doc.set_attribute(b, XmlAttribute::new("i", i.to_string())).unwrap();
    }

    let nodes = query_all(doc.root(), "//b").unwrap();
    assert_eq!(nodes.len(), 20_000);
    assert_eq!(nodes[0].select_attr("i"), "0");
    assert_eq!(nodes[19_999].select_attr("i"), "19999");

    let attrs = query_all(doc.root(), "//b/@i | //b[1]").unwrap();
    assert_eq!(attrs.len(), 20_001);
    assert_eq!(attrs[0].kind(), NodeKind::Element);
    assert_eq!(attrs[1].inner_text(), "0");
}
