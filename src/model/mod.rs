//! Document model types exchanged between decoders, the assembler and sinks.
//!
//! Everything here is a plain value type. Properties are copied into the
//! assembler's state on each call and copied again into sink calls, so
//! decoders may reuse and mutate their own instances freely.

mod document;
mod frame;
mod list;
mod note;
mod page;
mod paragraph;
mod resource;
mod table;

pub use document::DocumentMetadata;
pub use frame::{
    AnchorKind, FramePosition, FrameStyle, HorizontalPlacement, Placement, Point, RelativeTo,
    Size, VerticalPlacement, Wrapping,
};
pub use list::{List, ListId, ListLevel, ListLevelKind, ListLevelProperties};
pub use note::{FieldKind, NoteProperties};
pub use page::{
    Column, HeaderFooter, HeaderFooterKind, HeaderFooterProperties, Occurrence, Orientation,
    PageGeometry, PageSpan, PageSpanProperties, SectionProperties,
};
pub use paragraph::{
    Border, BorderSet, BorderStyle, BreakFlags, Color, Justification, LineSpacing, ListRef,
    ParagraphProperties, SpanProperties, TabAlignment, TabStop, TextAttributes,
};
pub use resource::BinaryObject;
pub use table::{CellProperties, RowProperties, TableProperties, VerticalAlignment};
