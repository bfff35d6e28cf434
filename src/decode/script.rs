//! JSON event-script decoder.
//!
//! A script is a JSON document describing page spans, list definitions and a
//! flat list of assembler calls. Sub-document bodies (notes, text boxes,
//! headers, cells) are either nested event lists or references to numbered
//! fragments; fragments may reference each other, including themselves.
//!
//! ```json
//! {
//!   "page_spans": [{"page_count": 2}],
//!   "lists": [{"id": 1, "levels": [{"kind": {"type": "decimal"}}]}],
//!   "body": [
//!     {"op": "paragraph", "props": {"list": {"id": 1, "depth": 1}}},
//!     {"op": "text", "text": "first item"},
//!     {"op": "footnote", "body": [{"op": "text", "text": "a note"}]},
//!     {"op": "eol"}
//!   ]
//! }
//! ```

use std::cell::{Cell, RefCell};
use std::collections::{BTreeMap, HashMap};
use std::fs;
use std::path::Path;
use std::rc::Rc;

use serde::{Deserialize, Serialize};

use super::Decoder;
use crate::assembler::{
    BreakKind, DocumentAssembler, SubDocument, SubDocumentContent, SubDocumentId,
};
use crate::error::{Error, Result};
use crate::model::{
    BinaryObject, CellProperties, DocumentMetadata, FieldKind, FramePosition, FrameStyle,
    HeaderFooter, HeaderFooterKind, ListId, ListLevel, Occurrence, PageGeometry, PageSpan,
    ParagraphProperties, RowProperties, SectionProperties, SpanProperties, TableProperties,
    TextAttributes,
};

/// Inline bodies get ids above this; fragment ids stay below.
const INLINE_ID_BASE: u64 = 1 << 32;

/// A complete event script.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Script {
    /// Document metadata
    pub metadata: Option<DocumentMetadata>,

    /// Page spans; one default span when empty
    pub page_spans: Vec<ScriptPageSpan>,

    /// List definitions, created in order before the body runs
    pub lists: Vec<ScriptList>,

    /// Numbered bodies that events can reference
    pub fragments: BTreeMap<u64, Vec<ScriptEvent>>,

    /// Main text flow
    pub body: Vec<ScriptEvent>,
}

/// Page span entry of a script.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ScriptPageSpan {
    pub geometry: PageGeometry,
    pub page_count: u32,
    pub page_number_start: Option<u32>,
    pub headers: Vec<ScriptHeaderFooter>,
}

impl Default for ScriptPageSpan {
    fn default() -> Self {
        Self {
            geometry: PageGeometry::default(),
            page_count: 1,
            page_number_start: None,
            headers: Vec::new(),
        }
    }
}

/// Header or footer entry of a page span.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScriptHeaderFooter {
    pub kind: HeaderFooterKind,
    #[serde(default)]
    pub occurrence: Occurrence,
    #[serde(default)]
    pub body: Option<ScriptBody>,
}

/// List definition of a script.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScriptList {
    /// Id used by `list` references inside the script
    pub id: u32,

    /// Levels, depth 1 first
    #[serde(default)]
    pub levels: Vec<ListLevel>,

    /// Script id of the list whose numbering this one continues
    #[serde(default)]
    pub continues: Option<u32>,
}

/// Body of a sub-document: inline events or a fragment number.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ScriptBody {
    Inline(Vec<ScriptEvent>),
    Fragment(u64),
}

/// One assembler call.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "op", rename_all = "snake_case")]
pub enum ScriptEvent {
    Text {
        text: String,
    },
    /// Character given as a code point, validated by the assembler
    Char {
        code: u32,
    },
    Tab,
    Space,
    LineBreak,
    Eol,
    PageBreak,
    ColumnBreak,

    /// Set the properties of the next paragraph
    Paragraph {
        #[serde(default)]
        props: ParagraphProperties,
    },
    OpenParagraph {
        #[serde(default)]
        props: ParagraphProperties,
    },
    CloseParagraph,
    Span {
        #[serde(default)]
        props: SpanProperties,
    },
    Attributes {
        bits: u32,
    },
    SetListLevel {
        list: u32,
        depth: u8,
        level: ListLevel,
    },
    /// Put the next paragraph in a list known only by its level definition.
    /// Levels above `depth` come from the list of the previous paragraph.
    LevelParagraph {
        depth: u8,
        level: ListLevel,
        #[serde(default)]
        props: ParagraphProperties,
    },

    OpenSection {
        #[serde(default)]
        props: SectionProperties,
    },
    CloseSection,

    OpenTable {
        #[serde(default)]
        props: TableProperties,
    },
    OpenRow {
        #[serde(default)]
        props: RowProperties,
    },
    OpenCell {
        #[serde(default)]
        props: CellProperties,
    },
    CoveredCell {
        #[serde(default)]
        props: CellProperties,
    },
    /// Replay a body as the content of the open cell
    CellBody {
        body: ScriptBody,
    },
    CloseCell,
    CloseRow,
    CloseTable,

    OpenFrame {
        position: FramePosition,
        #[serde(default)]
        style: FrameStyle,
    },
    CloseFrame,
    Object {
        object: BinaryObject,
    },
    Picture {
        position: FramePosition,
        object: BinaryObject,
    },
    TextBox {
        position: FramePosition,
        #[serde(default)]
        style: FrameStyle,
        body: ScriptBody,
    },

    Footnote {
        #[serde(default)]
        label: Option<String>,
        body: ScriptBody,
    },
    Endnote {
        body: ScriptBody,
    },
    Comment {
        body: ScriptBody,
    },
    Field {
        field: FieldKind,
    },
}

impl Script {
    /// Check that fragment numbers, defined or referenced, stay below the
    /// identities handed to inline bodies.
    pub fn validate(&self) -> Result<()> {
        if let Some(n) = self.fragments.keys().find(|n| **n >= INLINE_ID_BASE) {
            return Err(Error::Script(format!("fragment id {} is out of range", n)));
        }
        for header in self.page_spans.iter().flat_map(|span| &span.headers) {
            if let Some(body) = &header.body {
                check_body(body)?;
            }
        }
        check_events(&self.body)?;
        for events in self.fragments.values() {
            check_events(events)?;
        }
        Ok(())
    }
}

impl ScriptEvent {
    /// Sub-document body carried by this event.
    pub fn body(&self) -> Option<&ScriptBody> {
        match self {
            ScriptEvent::CellBody { body }
            | ScriptEvent::TextBox { body, .. }
            | ScriptEvent::Footnote { body, .. }
            | ScriptEvent::Endnote { body }
            | ScriptEvent::Comment { body } => Some(body),
            _ => None,
        }
    }
}

fn check_events(events: &[ScriptEvent]) -> Result<()> {
    events
        .iter()
        .filter_map(ScriptEvent::body)
        .try_for_each(check_body)
}

fn check_body(body: &ScriptBody) -> Result<()> {
    match body {
        ScriptBody::Inline(events) => check_events(events),
        ScriptBody::Fragment(n) if *n >= INLINE_ID_BASE => Err(Error::Script(format!(
            "reference to fragment {} is out of range",
            n
        ))),
        ScriptBody::Fragment(_) => Ok(()),
    }
}

/// State shared by the decoder and the replay closures it hands out.
#[derive(Debug, Default)]
struct Context {
    fragments: BTreeMap<u64, Vec<ScriptEvent>>,
    lists: RefCell<HashMap<u32, ListId>>,
    next_inline: Cell<u64>,
}

impl Context {
    fn list(&self, script_id: u32) -> ListId {
        // arena ids start at 1, so 0 is never a known list
        self.lists.borrow().get(&script_id).copied().unwrap_or(ListId(0))
    }

    fn inline_id(&self) -> SubDocumentId {
        let n = self.next_inline.get();
        self.next_inline.set(n + 1);
        SubDocumentId(INLINE_ID_BASE + n)
    }
}

/// Decoder replaying a [`Script`].
#[derive(Debug)]
pub struct ScriptDecoder {
    script: Script,
    context: Rc<Context>,
}

impl ScriptDecoder {
    /// Create a decoder for a parsed script.
    pub fn new(script: Script) -> Result<Self> {
        script.validate()?;
        let context = Rc::new(Context {
            fragments: script.fragments.clone(),
            ..Default::default()
        });
        Ok(Self { script, context })
    }

    /// Parse a script from JSON text.
    pub fn from_json(json: &str) -> Result<Self> {
        let script: Script = serde_json::from_str(json)?;
        Self::new(script)
    }

    /// Load a script from a file.
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self> {
        let json = fs::read_to_string(path)?;
        Self::from_json(&json)
    }

    /// The script being replayed.
    pub fn script(&self) -> &Script {
        &self.script
    }
}

impl Decoder for ScriptDecoder {
    fn name(&self) -> &str {
        "script"
    }

    fn page_spans(&self) -> Vec<PageSpan> {
        if self.script.page_spans.is_empty() {
            return vec![PageSpan::default()];
        }
        self.script
            .page_spans
            .iter()
            .map(|entry| {
                let mut span = PageSpan::new(entry.geometry).repeated(entry.page_count);
                span.page_number_start = entry.page_number_start;
                for header in &entry.headers {
                    span = span.with_header_footer(HeaderFooter {
                        kind: header.kind,
                        occurrence: header.occurrence,
                        content: header.body.as_ref().map(|b| content(&self.context, b)),
                    });
                }
                span
            })
            .collect()
    }

    fn metadata(&self) -> Option<DocumentMetadata> {
        self.script.metadata.clone()
    }

    fn replay(&self, assembler: &mut DocumentAssembler<'_>) -> Result<()> {
        for list in &self.script.lists {
            let id = match list.continues {
                Some(prev) => {
                    let prev = self.context.list(prev);
                    assembler.lists_mut().create_continuing(prev, list.levels.clone())
                }
                None => assembler.lists_mut().create(list.levels.clone()),
            };
            if self.context.lists.borrow_mut().insert(list.id, id).is_some() {
                log::warn!("script list {} defined twice", list.id);
            }
        }
        run(&self.context, &self.script.body, assembler)
    }
}

fn content(context: &Rc<Context>, body: &ScriptBody) -> SubDocumentContent {
    let context = Rc::clone(context);
    match body {
        ScriptBody::Inline(events) => {
            let id = context.inline_id();
            let events = events.clone();
            SubDocumentContent::new(id, move |a| run(&context, &events, a))
        }
        ScriptBody::Fragment(n) => {
            let n = *n;
            SubDocumentContent::new(SubDocumentId(n), move |a| {
                let events = context
                    .fragments
                    .get(&n)
                    .ok_or_else(|| Error::Script(format!("unknown fragment {}", n)))?;
                run(&context, events, a)
            })
        }
    }
}

fn list_props(context: &Context, mut props: ParagraphProperties) -> ParagraphProperties {
    if let Some(list) = props.list.as_mut() {
        list.id = context.list(list.id.0);
    }
    props
}

fn run(context: &Rc<Context>, events: &[ScriptEvent], a: &mut DocumentAssembler<'_>) -> Result<()> {
    for event in events {
        match event {
            ScriptEvent::Text { text } => a.insert_text(text)?,
            ScriptEvent::Char { code } => a.insert_unicode(*code)?,
            ScriptEvent::Tab => a.insert_tab()?,
            ScriptEvent::Space => a.insert_space()?,
            ScriptEvent::LineBreak => a.insert_line_break()?,
            ScriptEvent::Eol => a.insert_eol()?,
            ScriptEvent::PageBreak => a.insert_break(BreakKind::Page)?,
            ScriptEvent::ColumnBreak => a.insert_break(BreakKind::Column)?,

            ScriptEvent::Paragraph { props } => {
                a.set_paragraph_properties(list_props(context, props.clone()))
            }
            ScriptEvent::OpenParagraph { props } => {
                a.open_paragraph(list_props(context, props.clone()))?
            }
            ScriptEvent::CloseParagraph => a.close_paragraph()?,
            ScriptEvent::Span { props } => a.set_span_properties(props.clone()),
            ScriptEvent::Attributes { bits } => {
                a.set_attributes(TextAttributes::from_bits(*bits))
            }
            ScriptEvent::SetListLevel { list, depth, level } => {
                let id = context.list(*list);
                if !a.lists_mut().set_level(id, *depth, level.clone()) {
                    log::debug!("list level {}/{} unchanged", list, depth);
                }
            }
            ScriptEvent::LevelParagraph {
                depth,
                level,
                props,
            } => {
                let base = a.paragraph_properties().list.map(|l| l.id);
                let depth = (*depth).max(1);
                let id = a.lists_mut().derive(base, depth, level.clone());
                a.set_paragraph_properties(props.clone().in_list(id, depth));
            }

            ScriptEvent::OpenSection { props } => {
                a.open_section(props)?;
            }
            ScriptEvent::CloseSection => {
                a.close_section()?;
            }

            ScriptEvent::OpenTable { props } => {
                a.open_table(props)?;
            }
            ScriptEvent::OpenRow { props } => {
                a.open_table_row(props)?;
            }
            ScriptEvent::OpenCell { props } => {
                a.open_table_cell(props)?;
            }
            ScriptEvent::CoveredCell { props } => {
                a.insert_covered_table_cell(props)?;
            }
            ScriptEvent::CellBody { body } => {
                a.handle_sub_document(&SubDocument::TableCell(content(context, body)))?
            }
            ScriptEvent::CloseCell => {
                a.close_table_cell()?;
            }
            ScriptEvent::CloseRow => {
                a.close_table_row()?;
            }
            ScriptEvent::CloseTable => {
                a.close_table()?;
            }

            ScriptEvent::OpenFrame { position, style } => {
                a.open_frame(position, style)?;
            }
            ScriptEvent::CloseFrame => {
                a.close_frame();
            }
            ScriptEvent::Object { object } => {
                a.insert_binary_object(object);
            }
            ScriptEvent::Picture { position, object } => {
                a.insert_picture(position, object)?;
            }
            ScriptEvent::TextBox {
                position,
                style,
                body,
            } => {
                a.insert_text_box(position, style, content(context, body))?;
            }

            ScriptEvent::Footnote { label, body } => match label {
                Some(label) => a.insert_labeled_footnote(content(context, body), label.clone())?,
                None => a.insert_footnote(content(context, body))?,
            },
            ScriptEvent::Endnote { body } => a.insert_endnote(content(context, body))?,
            ScriptEvent::Comment { body } => a.insert_comment(content(context, body))?,
            ScriptEvent::Field { field } => a.insert_field(field.clone())?,
        }
    }
    Ok(())
}
