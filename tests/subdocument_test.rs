//! Integration tests for headers, footers, notes and text boxes

use std::cell::RefCell;
use std::rc::Rc;

use unlegacy::model::{
    AnchorKind, FrameStyle, HeaderFooter, HeaderFooterKind, Occurrence, Size,
};
use unlegacy::{
    AssemblerOptions, BreakKind, DocumentAssembler, FramePosition, PageSpan, RecordingSink,
    SinkEvent, SubDocument, SubDocumentContent, SubDocumentId,
};

fn text(id: u64, text: &'static str) -> SubDocumentContent {
    SubDocumentContent::new(SubDocumentId(id), move |a| a.insert_text(text))
}

fn inline_box() -> FramePosition {
    FramePosition::new(AnchorKind::Char, Size::new(72.0, 36.0))
}

/// Text box content that keeps nesting further text boxes.
fn nested(id: u64) -> SubDocumentContent {
    SubDocumentContent::new(SubDocumentId(id), move |a| {
        a.insert_text("level")?;
        a.insert_text_box(&inline_box(), &FrameStyle::default(), nested(id + 1))?;
        Ok(())
    })
}

#[test]
fn test_headers_replayed_per_page_span() {
    let span = PageSpan::default()
        .with_header_footer(HeaderFooter::header(text(1, "head")))
        .with_header_footer(HeaderFooter::footer(text(2, "foot")).on(Occurrence::Odd));

    let mut sink = RecordingSink::new();
    let mut a = DocumentAssembler::new(&mut sink, vec![span.clone(), span]);
    a.insert_text("one").unwrap();
    a.insert_eol().unwrap();
    a.insert_break(BreakKind::Page).unwrap();
    a.insert_text("two").unwrap();
    a.end_document().unwrap();
    drop(a);

    assert_eq!(sink.count("open_header"), 2);
    assert_eq!(sink.count("open_footer"), 2);
    assert_eq!(sink.text(), "headfootoneheadfoottwo");

    let footer = sink.events().iter().find_map(|e| match e {
        SinkEvent::OpenFooter(props) => Some(props.occurrence),
        _ => None,
    });
    assert_eq!(footer, Some(Occurrence::Odd));
}

#[test]
fn test_headers_precede_body() {
    let span = PageSpan::default().with_header_footer(HeaderFooter::header(text(1, "head")));
    let mut sink = RecordingSink::new();
    let mut a = DocumentAssembler::new(&mut sink, vec![span]);
    a.insert_text("body").unwrap();
    a.end_document().unwrap();
    drop(a);

    let names = sink.names();
    let header_close = names.iter().position(|n| *n == "close_header").unwrap();
    let section = names.iter().position(|n| *n == "open_section").unwrap();
    assert!(header_close < section);
}

#[test]
fn test_empty_footer_still_has_a_paragraph() {
    let footer = HeaderFooter {
        kind: HeaderFooterKind::Footer,
        occurrence: Occurrence::All,
        content: Some(SubDocumentContent::empty(SubDocumentId(7))),
    };
    let mut sink = RecordingSink::new();
    let mut a = DocumentAssembler::new(&mut sink, vec![PageSpan::default().with_header_footer(footer)]);
    a.end_document().unwrap();
    drop(a);

    let names = sink.names();
    let open = names.iter().position(|n| *n == "open_footer").unwrap();
    assert_eq!(
        names[open..open + 4],
        ["open_footer", "open_paragraph", "close_paragraph", "close_footer"]
    );
}

#[test]
fn test_footnote_keeps_surrounding_paragraph() {
    let mut sink = RecordingSink::new();
    let mut a = DocumentAssembler::new(&mut sink, vec![PageSpan::default()]);
    a.insert_text("before").unwrap();
    a.insert_footnote(text(1, "note")).unwrap();
    assert!(a.is_paragraph_open());
    assert!(!a.in_sub_document());
    a.insert_text("after").unwrap();
    a.end_document().unwrap();
    drop(a);

    assert_eq!(sink.text(), "beforenoteafter");
    // one paragraph in the body, one inside the note
    assert_eq!(sink.count("open_paragraph"), 2);

    let names = sink.names();
    let open = names.iter().position(|n| *n == "open_footnote").unwrap();
    assert_eq!(names[open - 1], "insert_text");
    assert_eq!(names[open - 2], "open_span");
}

#[test]
fn test_endnotes_and_footnotes_numbered_apart() {
    let mut sink = RecordingSink::new();
    let mut a = DocumentAssembler::new(&mut sink, vec![PageSpan::default()]);
    a.insert_text("x").unwrap();
    a.insert_footnote(text(1, "f1")).unwrap();
    a.insert_endnote(text(2, "e1")).unwrap();
    a.insert_labeled_footnote(text(3, "f2"), String::from("*")).unwrap();
    a.end_document().unwrap();
    drop(a);

    let notes: Vec<_> = sink
        .events()
        .iter()
        .filter_map(|e| match e {
            SinkEvent::OpenFootnote(p) => Some(("footnote", p.number, p.label.clone())),
            SinkEvent::OpenEndnote(p) => Some(("endnote", p.number, p.label.clone())),
            _ => None,
        })
        .collect();
    assert_eq!(
        notes,
        [
            ("footnote", 1, None),
            ("endnote", 1, None),
            ("footnote", 2, Some("*".to_string())),
        ]
    );
}

#[test]
fn test_nested_note_dropped() {
    let outer = SubDocumentContent::new(SubDocumentId(1), |a| {
        a.insert_text("outer")?;
        a.insert_comment(text(2, "inner"))
    });
    let mut sink = RecordingSink::new();
    let mut a = DocumentAssembler::new(&mut sink, vec![PageSpan::default()]);
    a.insert_text("x").unwrap();
    a.insert_footnote(outer).unwrap();
    a.end_document().unwrap();
    assert_eq!(a.diagnostics().count("note"), 1);
    drop(a);

    assert_eq!(sink.count("open_comment"), 0);
    assert_eq!(sink.text(), "xouter");
}

#[test]
fn test_page_break_ignored_in_note() {
    let note = SubDocumentContent::new(SubDocumentId(1), |a| {
        a.insert_text("a")?;
        a.insert_break(BreakKind::Page)?;
        a.insert_text("b")
    });
    let mut sink = RecordingSink::new();
    let mut a = DocumentAssembler::new(&mut sink, vec![PageSpan::default()]);
    a.insert_text("x").unwrap();
    a.insert_footnote(note).unwrap();
    assert_eq!(a.page_number(), 1);
    a.end_document().unwrap();
}

#[test]
fn test_self_invocation_produces_nothing() {
    let slot: Rc<RefCell<Option<SubDocumentContent>>> = Rc::default();
    let inner = Rc::clone(&slot);
    let comment = SubDocumentContent::new(SubDocumentId(5), move |a| {
        a.insert_text("c")?;
        let again = inner.borrow().clone();
        if let Some(again) = again {
            a.handle_sub_document(&SubDocument::TextBox(again))?;
        }
        Ok(())
    });
    *slot.borrow_mut() = Some(comment.clone());

    let mut sink = RecordingSink::new();
    let mut a = DocumentAssembler::new(&mut sink, vec![PageSpan::default()]);
    a.insert_text("x").unwrap();
    a.insert_comment(comment).unwrap();
    assert_eq!(a.diagnostics().count("cycle"), 1);
    a.end_document().unwrap();
    drop(a);
    slot.borrow_mut().take();

    let names = sink.names();
    let open = names.iter().position(|n| *n == "open_comment").unwrap();
    let close = names.iter().position(|n| *n == "close_comment").unwrap();
    // only the outer replay: paragraph, span, text
    assert_eq!(
        names[open + 1..close],
        ["open_paragraph", "open_span", "insert_text", "close_span", "close_paragraph"]
    );
    assert_eq!(sink.text(), "xc");
}

#[test]
fn test_transitive_cycle_detected() {
    let slot: Rc<RefCell<Option<SubDocumentContent>>> = Rc::default();
    let back = Rc::clone(&slot);
    let second = SubDocumentContent::new(SubDocumentId(2), move |a| {
        a.insert_text("2")?;
        let first = back.borrow().clone();
        if let Some(first) = first {
            a.insert_text_box(&inline_box(), &FrameStyle::default(), first)?;
        }
        Ok(())
    });
    let first = SubDocumentContent::new(SubDocumentId(1), move |a| {
        a.insert_text("1")?;
        a.insert_text_box(&inline_box(), &FrameStyle::default(), second.clone())?;
        Ok(())
    });
    *slot.borrow_mut() = Some(first.clone());

    let mut sink = RecordingSink::new();
    let mut a = DocumentAssembler::new(&mut sink, vec![PageSpan::default()]);
    assert!(a
        .insert_text_box(&inline_box(), &FrameStyle::default(), first)
        .unwrap());
    a.end_document().unwrap();
    drop(a);
    slot.borrow_mut().take();

    assert_eq!(sink.count("open_text_box"), 2);
    assert_eq!(sink.count("close_text_box"), 2);
    assert_eq!(sink.text(), "12");
}

#[test]
fn test_nesting_depth_limited() {
    let options = AssemblerOptions::default().with_max_sub_document_depth(3);
    let mut sink = RecordingSink::new();
    let mut a = DocumentAssembler::with_options(&mut sink, vec![PageSpan::default()], options);
    a.insert_text_box(&inline_box(), &FrameStyle::default(), nested(1))
        .unwrap();
    a.end_document().unwrap();
    assert!(a.diagnostics().count("depth") >= 1);
    drop(a);

    assert_eq!(sink.count("open_text_box"), 3);
    assert_eq!(sink.text(), "levellevellevel");
}

#[test]
fn test_sub_document_closes_what_it_opens() {
    let messy = SubDocumentContent::new(SubDocumentId(1), |a| {
        a.open_table(&Default::default())?;
        a.open_table_row(&Default::default())?;
        a.open_table_cell(&Default::default())?;
        a.insert_text("left open")?;
        Ok(())
    });
    let mut sink = RecordingSink::new();
    let mut a = DocumentAssembler::new(&mut sink, vec![PageSpan::default()]);
    a.insert_text("x").unwrap();
    a.insert_comment(messy).unwrap();
    assert!(!a.in_table());
    a.insert_text("y").unwrap();
    a.end_document().unwrap();
    drop(a);

    let names = sink.names();
    let close = names.iter().position(|n| *n == "close_comment").unwrap();
    assert_eq!(
        names[close - 5..close],
        [
            "close_span",
            "close_paragraph",
            "close_table_cell",
            "close_table_row",
            "close_table",
        ]
    );
    assert_eq!(sink.text(), "xleft openy");
}
