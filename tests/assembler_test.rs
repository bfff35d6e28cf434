//! Integration tests for the document assembler event stream

use unlegacy::model::{
    AnchorKind, FrameStyle, ParagraphProperties, Size, SpanProperties, TextAttributes,
};
use unlegacy::{
    AssemblerOptions, BreakKind, DocumentAssembler, Error, FramePosition, PageSpan, RecordingSink,
    Result, SinkEvent,
};

fn record(
    spans: Vec<PageSpan>,
    f: impl FnOnce(&mut DocumentAssembler<'_>) -> Result<()>,
) -> RecordingSink {
    record_with(spans, AssemblerOptions::default(), f)
}

fn record_with(
    spans: Vec<PageSpan>,
    options: AssemblerOptions,
    f: impl FnOnce(&mut DocumentAssembler<'_>) -> Result<()>,
) -> RecordingSink {
    let mut sink = RecordingSink::new();
    let mut assembler = DocumentAssembler::with_options(&mut sink, spans, options);
    f(&mut assembler).unwrap();
    assembler.end_document().unwrap();
    drop(assembler);
    sink
}

/// Event names between the outer section open and close.
fn body(sink: &RecordingSink) -> Vec<&'static str> {
    let names = sink.names();
    let start = names.iter().position(|n| *n == "open_section").unwrap() + 1;
    let end = names.iter().rposition(|n| *n == "close_section").unwrap();
    names[start..end].to_vec()
}

#[test]
fn test_explicit_paragraph() {
    let sink = record(vec![PageSpan::default()], |a| {
        a.open_paragraph(ParagraphProperties::default())?;
        a.insert_text("Hello")?;
        a.insert_tab()?;
        a.insert_text("World")?;
        a.close_paragraph()
    });

    assert_eq!(
        body(&sink),
        [
            "open_paragraph",
            "open_span",
            "insert_text",
            "insert_tab",
            "insert_text",
            "close_span",
            "close_paragraph",
        ]
    );
    assert_eq!(sink.text(), "HelloWorld");
}

#[test]
fn test_tabs_open_a_single_paragraph() {
    for n in 1..5 {
        let sink = record(vec![PageSpan::default()], |a| {
            for _ in 0..n {
                a.insert_tab()?;
            }
            a.insert_text("a")
        });
        let names = body(&sink);
        assert_eq!(sink.count("open_paragraph"), 1);
        assert_eq!(names[0], "open_paragraph");
        assert_eq!(names[1], "open_span");
        assert!(names[2..2 + n].iter().all(|n| *n == "insert_tab"));
        assert_eq!(names[2 + n], "insert_text");
    }
}

#[test]
fn test_document_frame() {
    let sink = record(vec![PageSpan::default()], |a| a.insert_text("x"));
    let names = sink.names();

    assert_eq!(names[..3], ["open_document", "open_page_span", "open_section"]);
    assert_eq!(
        names[names.len() - 3..],
        ["close_section", "close_page_span", "close_document"]
    );
}

#[test]
fn test_stray_closes_are_silent() {
    let plain = record(vec![PageSpan::default()], |a| {
        a.insert_text("x")?;
        a.insert_eol()
    });
    let noisy = record(vec![PageSpan::default()], |a| {
        a.close_paragraph()?;
        a.close_table_cell()?;
        a.close_table_row()?;
        a.close_table()?;
        a.close_section()?;
        a.close_frame();
        a.insert_text("x")?;
        a.insert_eol()?;
        a.close_paragraph()?;
        a.close_table()?;
        Ok(())
    });

    assert_eq!(plain.events(), noisy.events());
}

#[test]
fn test_space_run_becomes_one_space() {
    let sink = record(vec![PageSpan::default()], |a| a.insert_text("a    b"));
    let texts: Vec<_> = sink
        .events()
        .iter()
        .filter(|e| matches!(e, SinkEvent::InsertText { .. } | SinkEvent::InsertSpace))
        .cloned()
        .collect();

    assert_eq!(
        texts,
        [
            SinkEvent::InsertText { text: "a".into() },
            SinkEvent::InsertSpace,
            SinkEvent::InsertText { text: "b".into() },
        ]
    );
}

#[test]
fn test_space_runs_kept_when_disabled() {
    let options = AssemblerOptions::default().with_space_runs(false);
    let sink = record_with(vec![PageSpan::default()], options, |a| a.insert_text("a  b"));

    assert_eq!(sink.count("insert_space"), 0);
    assert_eq!(sink.text(), "a  b");
}

#[test]
fn test_page_break_applied_on_paragraph_close() {
    let sink = record(vec![PageSpan::default().repeated(2)], |a| {
        a.insert_text("first")?;
        a.insert_break(BreakKind::Page)?;
        // still the first paragraph
        a.insert_text(" page")?;
        a.close_paragraph()?;
        a.insert_text("second")
    });

    let breaks: Vec<_> = sink
        .events()
        .iter()
        .filter_map(|e| match e {
            SinkEvent::OpenParagraph(p) => Some(p.breaks.page_before),
            _ => None,
        })
        .collect();
    assert_eq!(breaks, [false, true]);
    assert_eq!(sink.count("open_page_span"), 1);
}

#[test]
fn test_page_counter_counts_requests() {
    let mut sink = RecordingSink::new();
    let mut a = DocumentAssembler::new(&mut sink, vec![PageSpan::default().repeated(4)]);

    a.insert_text("x").unwrap();
    assert_eq!(a.page_number(), 1);
    a.insert_break(BreakKind::Page).unwrap();
    assert_eq!(a.page_number(), 2);
    a.close_paragraph().unwrap();
    // applying the pending break does not count again
    assert_eq!(a.page_number(), 2);
    a.insert_break(BreakKind::Page).unwrap();
    assert_eq!(a.page_number(), 3);
    a.end_document().unwrap();
}

#[test]
fn test_page_break_moves_to_next_span() {
    let spans = vec![PageSpan::default(), PageSpan::default()];
    let sink = record(spans, |a| {
        a.insert_text("one")?;
        a.insert_eol()?;
        a.insert_break(BreakKind::Page)?;
        a.insert_text("two")
    });

    assert_eq!(sink.count("open_page_span"), 2);
    assert_eq!(sink.count("close_page_span"), 2);
    assert_eq!(sink.count("open_section"), 2);
}

#[test]
fn test_running_out_of_pages_is_fatal() {
    let mut sink = RecordingSink::new();
    let mut a = DocumentAssembler::new(&mut sink, vec![PageSpan::default()]);
    a.insert_text("one").unwrap();
    a.insert_eol().unwrap();
    a.insert_break(BreakKind::Page).unwrap();

    let err = a.insert_text("two").unwrap_err();
    assert!(matches!(err, Error::PageSpanExhausted { .. }));
    assert!(err.is_fatal());
}

#[test]
fn test_column_break_flags_next_paragraph() {
    let sink = record(vec![PageSpan::default()], |a| {
        a.insert_text("left")?;
        a.insert_break(BreakKind::Column)?;
        a.insert_text("right")
    });

    let flags: Vec<_> = sink
        .events()
        .iter()
        .filter_map(|e| match e {
            SinkEvent::OpenParagraph(p) => Some(p.breaks.column_before),
            _ => None,
        })
        .collect();
    assert_eq!(flags, [false, true]);
}

#[test]
fn test_span_properties_change_splits_span() {
    let sink = record(vec![PageSpan::default()], |a| {
        a.insert_text("plain ")?;
        a.set_span_properties(SpanProperties::new().with_attributes(TextAttributes::BOLD));
        a.insert_text("bold")
    });

    assert_eq!(sink.count("open_span"), 2);
    assert_eq!(sink.text(), "plain bold");
}

#[test]
fn test_content_after_end_is_dropped() {
    let mut sink = RecordingSink::new();
    let mut a = DocumentAssembler::new(&mut sink, vec![PageSpan::default()]);
    a.insert_text("x").unwrap();
    a.end_document().unwrap();
    a.insert_text("late").unwrap();
    a.end_document().unwrap();

    assert!(a.is_closed());
    assert_eq!(a.diagnostics().count("closed"), 1);
    drop(a);
    assert_eq!(sink.text(), "x");
    assert_eq!(sink.count("close_document"), 1);
}

#[test]
fn test_invalid_code_point_is_replaced() {
    let sink = record(vec![PageSpan::default()], |a| {
        a.insert_unicode(0x41)?;
        a.insert_unicode(0xD800)
    });
    assert_eq!(sink.text(), "A\u{FFFD}");
}

#[test]
fn test_frame_with_corrupt_size_is_placed() {
    let sink = record(vec![PageSpan::default()], |a| {
        let position = FramePosition::new(AnchorKind::Page, Size::new(f32::NAN, 10.0));
        assert!(a.open_frame(&position, &FrameStyle::default())?);
        a.close_frame();
        Ok(())
    });

    let placement = sink
        .events()
        .iter()
        .find_map(|e| match e {
            SinkEvent::OpenFrame { placement, .. } => Some(*placement),
            _ => None,
        })
        .unwrap();
    assert_eq!(placement.width, 0.0);
    assert_eq!(placement.height, 10.0);
    assert_eq!(sink.count("close_frame"), 1);
}
