//! Integration tests for table handling

use unlegacy::model::{
    CellProperties, ListLevelKind, ParagraphProperties, RowProperties, TableProperties,
};
use unlegacy::{
    AssemblerOptions, BreakKind, DocumentAssembler, ListLevel, PageSpan, RecordingSink,
    SubDocument, SubDocumentContent, SubDocumentId, TablePageBreaks,
};

fn cell(a: &mut DocumentAssembler<'_>, text: &str) {
    assert!(a.open_table_cell(&CellProperties::default()).unwrap());
    a.insert_text(text).unwrap();
    assert!(a.close_table_cell().unwrap());
}

#[test]
fn test_simple_table() {
    let mut sink = RecordingSink::new();
    let mut a = DocumentAssembler::new(&mut sink, vec![PageSpan::default()]);
    assert!(a.open_table(&TableProperties::with_columns(vec![72.0, 72.0])).unwrap());
    for row in 0..2 {
        assert!(a.open_table_row(&RowProperties::default()).unwrap());
        cell(&mut a, &format!("r{}c0", row));
        cell(&mut a, &format!("r{}c1", row));
        assert!(a.close_table_row().unwrap());
    }
    assert!(a.close_table().unwrap());
    assert!(!a.in_table());
    a.end_document().unwrap();
    drop(a);

    assert_eq!(sink.count("open_table_row"), 2);
    assert_eq!(sink.count("open_table_cell"), 4);
    assert_eq!(sink.count("close_table_cell"), 4);
    assert_eq!(sink.text(), "r0c0r0c1r1c0r1c1");

    let names = sink.names();
    let table = names.iter().position(|n| *n == "open_table").unwrap();
    assert_eq!(names[table - 1], "open_section");
}

#[test]
fn test_list_state_does_not_leak_into_next_cell() {
    let mut sink = RecordingSink::new();
    let mut a = DocumentAssembler::new(&mut sink, vec![PageSpan::default()]);
    let list = a.lists_mut().create(vec![
        ListLevel::numbered(ListLevelKind::Decimal),
        ListLevel::bullet("-"),
    ]);

    a.open_table(&TableProperties::default()).unwrap();
    a.open_table_row(&RowProperties::default()).unwrap();
    a.open_table_cell(&CellProperties::at(0, 0)).unwrap();
    a.set_paragraph_properties(ParagraphProperties::new().in_list(list, 2));
    a.insert_text("listed").unwrap();
    a.open_table_cell(&CellProperties::at(0, 1)).unwrap();
    a.insert_text("plain").unwrap();
    a.close_table().unwrap();
    a.end_document().unwrap();
    drop(a);

    let names = sink.names();
    let second = names.iter().rposition(|n| *n == "open_table_cell").unwrap();
    let after: Vec<_> = names[second..]
        .iter()
        .filter(|n| n.contains("list"))
        .collect();
    assert!(after.is_empty(), "list events after second cell: {:?}", after);

    // both levels closed inside the first cell
    let first_close = names.iter().position(|n| *n == "close_table_cell").unwrap();
    let closes = names[..first_close]
        .iter()
        .filter(|n| n.starts_with("close_") && n.ends_with("list_level"))
        .count();
    assert_eq!(closes, 2);
}

#[test]
fn test_table_closes_open_paragraph_and_list() {
    let mut sink = RecordingSink::new();
    let mut a = DocumentAssembler::new(&mut sink, vec![PageSpan::default()]);
    let list = a.lists_mut().create(vec![ListLevel::bullet("*")]);
    a.set_paragraph_properties(ParagraphProperties::new().in_list(list, 1));
    a.insert_text("item").unwrap();
    a.open_table(&TableProperties::default()).unwrap();
    assert_eq!(a.list_depth(), 0);
    a.end_document().unwrap();
    drop(a);

    let names = sink.names();
    let table = names.iter().position(|n| *n == "open_table").unwrap();
    assert_eq!(
        names[table - 3..table],
        ["close_span", "close_list_element", "close_unordered_list_level"]
    );
}

#[test]
fn test_cell_without_row_rejected() {
    let mut sink = RecordingSink::new();
    let mut a = DocumentAssembler::new(&mut sink, vec![PageSpan::default()]);
    a.open_table(&TableProperties::default()).unwrap();
    assert!(!a.open_table_cell(&CellProperties::default()).unwrap());
    assert!(!a.insert_covered_table_cell(&CellProperties::default()).unwrap());
    assert_eq!(a.diagnostics().count("table-cell"), 2);
    a.end_document().unwrap();
    drop(a);

    assert_eq!(sink.count("open_table_cell"), 0);
    assert_eq!(sink.count("close_table"), 1);
}

#[test]
fn test_covered_cells() {
    let mut sink = RecordingSink::new();
    let mut a = DocumentAssembler::new(&mut sink, vec![PageSpan::default()]);
    a.open_table(&TableProperties::default()).unwrap();
    a.open_table_row(&RowProperties::default()).unwrap();
    a.open_table_cell(&CellProperties::at(0, 0).spanning(1, 2)).unwrap();
    a.insert_text("wide").unwrap();
    // closes the spanning cell first
    assert!(a.insert_covered_table_cell(&CellProperties::at(0, 1)).unwrap());
    a.close_table().unwrap();
    a.end_document().unwrap();
    drop(a);

    let names = sink.names();
    let covered = names
        .iter()
        .position(|n| *n == "insert_covered_table_cell")
        .unwrap();
    assert_eq!(names[covered - 1], "close_table_cell");
    assert_eq!(names[covered + 1], "close_table_row");
}

#[test]
fn test_nested_table_in_cell() {
    let mut sink = RecordingSink::new();
    let mut a = DocumentAssembler::new(&mut sink, vec![PageSpan::default()]);
    a.open_table(&TableProperties::default()).unwrap();
    a.open_table_row(&RowProperties::default()).unwrap();
    a.open_table_cell(&CellProperties::default()).unwrap();
    a.insert_text("outer").unwrap();

    assert!(a.open_table(&TableProperties::default()).unwrap());
    a.open_table_row(&RowProperties::default()).unwrap();
    cell(&mut a, "inner");
    a.close_table().unwrap();
    assert!(a.in_table());

    a.insert_text("outer again").unwrap();
    a.close_table().unwrap();
    assert!(!a.in_table());
    a.end_document().unwrap();
    drop(a);

    assert_eq!(sink.count("open_table"), 2);
    assert_eq!(sink.count("close_table"), 2);
    assert_eq!(sink.text(), "outerinnerouter again");
}

#[test]
fn test_cell_body_replayed_as_sub_document() {
    let body = SubDocumentContent::new(SubDocumentId(1), |a| {
        a.insert_text("from body")?;
        a.insert_eol()?;
        a.insert_text("second")
    });
    let mut sink = RecordingSink::new();
    let mut a = DocumentAssembler::new(&mut sink, vec![PageSpan::default()]);
    a.open_table(&TableProperties::default()).unwrap();
    a.open_table_row(&RowProperties::default()).unwrap();
    a.open_table_cell(&CellProperties::default()).unwrap();
    a.handle_sub_document(&SubDocument::TableCell(body)).unwrap();
    a.close_table().unwrap();
    a.end_document().unwrap();
    drop(a);

    assert_eq!(sink.count("open_paragraph"), 2);
    assert_eq!(sink.text(), "from bodysecond");
}

#[test]
fn test_page_break_in_table_applies_after_table() {
    let mut sink = RecordingSink::new();
    let mut a = DocumentAssembler::new(&mut sink, vec![PageSpan::default().repeated(2)]);
    a.open_table(&TableProperties::default()).unwrap();
    a.open_table_row(&RowProperties::default()).unwrap();
    a.open_table_cell(&CellProperties::default()).unwrap();
    a.insert_text("cell").unwrap();
    a.insert_break(BreakKind::Page).unwrap();
    a.insert_eol().unwrap();
    a.insert_text("same cell").unwrap();
    a.close_table().unwrap();
    a.insert_text("next page").unwrap();
    a.end_document().unwrap();
    drop(a);

    let last = sink.events().iter().rev().find_map(|e| match e {
        unlegacy::SinkEvent::OpenParagraph(p) => Some(p.breaks.page_before),
        _ => None,
    });
    assert_eq!(last, Some(true));
    assert_eq!(sink.count("open_table_cell"), 1);
}

#[test]
fn test_page_break_in_table_suppressed() {
    let options = AssemblerOptions::default().with_table_page_breaks(TablePageBreaks::Suppress);
    let mut sink = RecordingSink::new();
    let mut a =
        DocumentAssembler::with_options(&mut sink, vec![PageSpan::default()], options);
    a.open_table(&TableProperties::default()).unwrap();
    a.open_table_row(&RowProperties::default()).unwrap();
    a.open_table_cell(&CellProperties::default()).unwrap();
    a.insert_text("cell").unwrap();
    a.insert_break(BreakKind::Page).unwrap();
    a.close_table().unwrap();
    // one declared page is enough
    a.insert_text("after").unwrap();
    a.end_document().unwrap();
    drop(a);

    assert_eq!(sink.count("open_page_span"), 1);
}
