use super::*;

// ---------------------------------------------------------------------------
// Fixtures
// ---------------------------------------------------------------------------

/// Generation forecast document as returned by the transparency platform
const MARKET_DOCUMENT: &str = r#"<?xml version="1.0" encoding="UTF-8"?>
<GL_MarketDocument xmlns="urn:iec62325.351:tc57wg16:451-6:generationloaddocument:3:0">
    <mRID>8e3a5c0fd0f34a0b8f2b2a1b7f4c6d21</mRID>
    <TimeSeries>
        <Period>
            <timeInterval>
                <start>2023-08-15T22:00Z</start>
                <end>2023-08-16T22:00Z</end>
            </timeInterval>
            <resolution>PT60M</resolution>
            <Point>
                <position>1</position>
                <quantity>5929</quantity>
            </Point>
            <Point>
                <position>2</position>
                <quantity>6628</quantity>
            </Point>
        </Period>
    </TimeSeries>
</GL_MarketDocument>
"#;

const COMPACT_DOCUMENT: &str = "<Root><TimeSeries><Period><Point><position>1</position><quantity>5929</quantity></Point><Point><position>2</position><quantity>6628</quantity></Point></Period></TimeSeries></Root>";

// ---------------------------------------------------------------------------
// Single tag
// ---------------------------------------------------------------------------

#[test]
fn extracts_quantities_in_document_order() {
    let values = extract_values(MARKET_DOCUMENT.as_bytes(), "quantity").unwrap();
    assert_eq!(values, vec!["5929", "6628"]);
}

#[test]
fn extracts_positions_from_compact_document() {
    let values = extract_values(COMPACT_DOCUMENT.as_bytes(), "position").unwrap();
    assert_eq!(values, vec!["1", "2"]);
}

#[test]
fn absent_tag_yields_empty_sequence() {
    let values = extract_values(MARKET_DOCUMENT.as_bytes(), "nonexistent").unwrap();
    assert!(values.is_empty());
}

#[test]
fn empty_input_yields_empty_sequence() {
    let values = extract_values(b"", "quantity").unwrap();
    assert!(values.is_empty());
}

#[test]
fn whitespace_only_input_yields_empty_sequence() {
    let values = extract_values(b" \n\t \r\n ", "quantity").unwrap();
    assert!(values.is_empty());
}

#[test]
fn whitespace_only_text_is_never_a_value() {
    let xml = "<r><quantity>   </quantity><quantity>\n\t\r\n</quantity><quantity>\u{a0}\u{2003}</quantity><quantity> 7 </quantity></r>";
    let values = extract_values(xml.as_bytes(), "quantity").unwrap();
    assert_eq!(values, vec!["7"]);
}

#[test]
fn values_are_trimmed() {
    let xml = "<r><quantity>\n      42.5\n    </quantity></r>";
    let values = extract_values(xml.as_bytes(), "quantity").unwrap();
    assert_eq!(values, vec!["42.5"]);
}

#[test]
fn namespace_prefixes_are_stripped() {
    let xml = r#"<ns:Root xmlns:ns="urn:a" xmlns:q="urn:b">
        <ns:quantity>1</ns:quantity>
        <q:quantity>2</q:quantity>
        <quantity>3</quantity>
    </ns:Root>"#;
    let values = extract_values(xml.as_bytes(), "quantity").unwrap();
    assert_eq!(values, vec!["1", "2", "3"]);
}

#[test]
fn tag_match_is_case_sensitive() {
    let xml = "<r><Quantity>1</Quantity><quantity>2</quantity></r>";
    let values = extract_values(xml.as_bytes(), "quantity").unwrap();
    assert_eq!(values, vec!["2"]);
}

#[test]
fn entities_are_unescaped() {
    let xml = "<r><name>A &amp; B &lt;C&gt;</name></r>";
    let values = extract_values(xml.as_bytes(), "name").unwrap();
    assert_eq!(values, vec!["A & B <C>"]);
}

#[test]
fn cdata_counts_as_text() {
    let xml = "<r><quantity><![CDATA[ 99 ]]></quantity></r>";
    let values = extract_values(xml.as_bytes(), "quantity").unwrap();
    assert_eq!(values, vec!["99"]);
}

#[test]
fn self_closing_target_yields_nothing() {
    let xml = "<r><quantity/><quantity>5</quantity></r>";
    let values = extract_values(xml.as_bytes(), "quantity").unwrap();
    assert_eq!(values, vec!["5"]);
}

#[test]
fn comments_do_not_reset_attribution() {
    let xml = "<r><quantity><!-- forecast -->12</quantity></r>";
    let values = extract_values(xml.as_bytes(), "quantity").unwrap();
    assert_eq!(values, vec!["12"]);
}

#[test]
fn many_occurrences_keep_count_and_order() {
    let mut xml = String::from("<r>");
    for i in 0..500 {
        xml.push_str(&format!("<p><quantity>{i}</quantity></p>"));
    }
    xml.push_str("</r>");

    let values = extract_values(xml.as_bytes(), "quantity").unwrap();
    assert_eq!(values.len(), 500);
    for (i, value) in values.iter().enumerate() {
        assert_eq!(value, &i.to_string());
    }
}

// ---------------------------------------------------------------------------
// Malformed input
// ---------------------------------------------------------------------------

#[test]
fn mismatched_close_tag_is_parse_error() {
    let xml = "<r><quantity>1</quantity><quantity>2</wrong></r>";
    let err = extract_values(xml.as_bytes(), "quantity").unwrap_err();
    assert!(matches!(err, Error::Parse { .. }), "got {err:?}");
}

#[test]
fn unclosed_root_is_parse_error() {
    let xml = "<r><quantity>1</quantity>";
    let err = extract_values(xml.as_bytes(), "quantity").unwrap_err();
    match err {
        Error::Parse { message, .. } => assert!(message.contains("unclosed")),
        other => panic!("expected Parse, got {other:?}"),
    }
}

#[test]
fn stray_close_tag_is_parse_error() {
    let err = extract_values(b"</r>", "quantity").unwrap_err();
    assert_eq!(err.code(), "parse_error");
}

#[test]
fn unknown_entity_is_parse_error() {
    let xml = "<r><quantity>&bogus;</quantity></r>";
    let err = extract_values(xml.as_bytes(), "quantity").unwrap_err();
    assert!(matches!(err, Error::Parse { .. }), "got {err:?}");
}

#[test]
fn attribute_without_value_is_parse_error() {
    for xml in [
        "<r><quantity unit=>5929</quantity></r>",
        "<r><quantity unit>5929</quantity></r>",
    ] {
        let err = extract_values(xml.as_bytes(), "quantity").unwrap_err();
        assert!(matches!(err, Error::Parse { .. }), "{xml} gave {err:?}");
    }
}

#[test]
fn unquoted_attribute_value_is_parse_error() {
    let xml = "<r><quantity unit=MW>5929</quantity></r>";
    let err = extract_values(xml.as_bytes(), "quantity").unwrap_err();
    assert!(matches!(err, Error::Parse { .. }), "got {err:?}");
}

#[test]
fn malformed_attribute_on_self_closing_tag_is_parse_error() {
    let xml = "<r><Point position=1/><quantity>5929</quantity></r>";
    let err = extract_values(xml.as_bytes(), "quantity").unwrap_err();
    assert_eq!(err.code(), "parse_error");
}

#[test]
fn well_formed_attributes_are_accepted() {
    let xml = r#"<r><quantity unit="MAW" codingScheme='A01'>5929</quantity></r>"#;
    let values = extract_values(xml.as_bytes(), "quantity").unwrap();
    assert_eq!(values, vec!["5929"]);
}

#[test]
fn nul_character_is_parse_error() {
    let err = extract_values(b"<r>\0</r>", "quantity").unwrap_err();
    match err {
        Error::Parse { message, .. } => assert!(message.contains("U+0000"), "{message}"),
        other => panic!("expected Parse, got {other:?}"),
    }
}

#[test]
fn control_character_in_target_is_parse_error() {
    let err = extract_values(b"<r><quantity>59\x0129</quantity></r>", "quantity").unwrap_err();
    assert!(matches!(err, Error::Parse { .. }), "got {err:?}");
}

// ---------------------------------------------------------------------------
// Attribution strategies
// ---------------------------------------------------------------------------

const NESTED_TARGET: &str =
    "<r><quantity>before<unit>MW</unit>after</quantity><quantity>plain</quantity></r>";

#[test]
fn last_element_tracking_drops_text_after_nested_child() {
    let columns = Extractor::new(["quantity"])
        .with_tracking(TagTracking::LastElement)
        .extract(NESTED_TARGET.as_bytes())
        .unwrap();
    assert_eq!(columns[0].values, vec!["before", "plain"]);
}

#[test]
fn ancestor_stack_tracking_keeps_text_after_nested_child() {
    let columns = Extractor::new(["quantity"])
        .with_tracking(TagTracking::AncestorStack)
        .extract(NESTED_TARGET.as_bytes())
        .unwrap();
    assert_eq!(columns[0].values, vec!["before", "after", "plain"]);
}

#[test]
fn ancestor_stack_attributes_to_innermost_element() {
    let xml = "<r><quantity>1<quantity>2</quantity>3</quantity></r>";
    let columns = Extractor::new(["quantity"])
        .with_tracking(TagTracking::AncestorStack)
        .extract(xml.as_bytes())
        .unwrap();
    assert_eq!(columns[0].values, vec!["1", "2", "3"]);
}

#[test]
fn strategies_agree_on_leaf_targets() {
    for tag in ["position", "quantity", "resolution", "start"] {
        let flat = Extractor::new([tag])
            .extract(MARKET_DOCUMENT.as_bytes())
            .unwrap();
        let stacked = Extractor::new([tag])
            .with_tracking(TagTracking::AncestorStack)
            .extract(MARKET_DOCUMENT.as_bytes())
            .unwrap();
        assert_eq!(flat, stacked, "strategies disagree on <{tag}>");
    }
}

// ---------------------------------------------------------------------------
// Multiple tags
// ---------------------------------------------------------------------------

#[test]
fn collects_several_tags_in_one_pass() {
    let columns = Extractor::new(["position", "quantity"])
        .extract(COMPACT_DOCUMENT.as_bytes())
        .unwrap();

    assert_eq!(columns.len(), 2);
    assert_eq!(columns[0].name, "position");
    assert_eq!(columns[0].values, vec!["1", "2"]);
    assert_eq!(columns[1].name, "quantity");
    assert_eq!(columns[1].values, vec!["5929", "6628"]);
}

#[test]
fn unmatched_tags_still_get_a_column() {
    let columns = Extractor::new(["quantity", "price"])
        .extract(COMPACT_DOCUMENT.as_bytes())
        .unwrap();
    assert_eq!(columns[1], Column::new("price"));
    assert!(columns[1].is_empty());
}

#[test]
fn duplicate_targets_collapse() {
    let extractor = Extractor::new(["quantity", "position", "quantity"]);
    assert_eq!(extractor.targets(), ["quantity", "position"]);
}
