//! Deferred content units.
//!
//! A sub-document is a piece of content the decoder can only produce later
//! or elsewhere (a footnote body, a header, a text box). The decoder hands
//! the assembler a replay closure; the assembler decides when to run it and
//! in which state.

use std::fmt;
use std::rc::Rc;

use crate::error::Result;

use super::DocumentAssembler;

/// Identity of a sub-document, used to detect self-invocation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct SubDocumentId(pub u64);

impl fmt::Display for SubDocumentId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "subdoc#{}", self.0)
    }
}

type ReplayFn = dyn for<'s> Fn(&mut DocumentAssembler<'s>) -> Result<()>;

/// Identity plus replay closure of a sub-document.
///
/// Cloning is cheap; clones share the closure and the identity.
#[derive(Clone)]
pub struct SubDocumentContent {
    id: SubDocumentId,
    replay: Rc<ReplayFn>,
}

impl SubDocumentContent {
    /// Wrap a replay closure.
    pub fn new<F>(id: SubDocumentId, replay: F) -> Self
    where
        F: for<'s> Fn(&mut DocumentAssembler<'s>) -> Result<()> + 'static,
    {
        Self {
            id,
            replay: Rc::new(replay),
        }
    }

    /// Content that produces nothing.
    pub fn empty(id: SubDocumentId) -> Self {
        Self::new(id, |_| Ok(()))
    }

    /// Identity.
    pub fn id(&self) -> SubDocumentId {
        self.id
    }

    /// Run the closure against an assembler.
    pub fn replay(&self, assembler: &mut DocumentAssembler<'_>) -> Result<()> {
        (self.replay)(assembler)
    }
}

impl fmt::Debug for SubDocumentContent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SubDocumentContent")
            .field("id", &self.id)
            .finish_non_exhaustive()
    }
}

/// Kind of a sub-document.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SubDocumentKind {
    Footnote,
    Endnote,
    Header,
    Footer,
    TableCell,
    TextBox,
    Comment,
}

impl SubDocumentKind {
    /// Header or footer.
    pub fn is_header_footer(self) -> bool {
        matches!(self, SubDocumentKind::Header | SubDocumentKind::Footer)
    }

    /// Footnote, endnote or comment.
    pub fn is_note(self) -> bool {
        matches!(
            self,
            SubDocumentKind::Footnote | SubDocumentKind::Endnote | SubDocumentKind::Comment
        )
    }
}

/// A sub-document tagged with its kind.
#[derive(Debug, Clone)]
pub enum SubDocument {
    Footnote(SubDocumentContent),
    Endnote(SubDocumentContent),
    Header(SubDocumentContent),
    Footer(SubDocumentContent),
    TableCell(SubDocumentContent),
    TextBox(SubDocumentContent),
    Comment(SubDocumentContent),
}

impl SubDocument {
    /// Kind of this sub-document.
    pub fn kind(&self) -> SubDocumentKind {
        match self {
            SubDocument::Footnote(_) => SubDocumentKind::Footnote,
            SubDocument::Endnote(_) => SubDocumentKind::Endnote,
            SubDocument::Header(_) => SubDocumentKind::Header,
            SubDocument::Footer(_) => SubDocumentKind::Footer,
            SubDocument::TableCell(_) => SubDocumentKind::TableCell,
            SubDocument::TextBox(_) => SubDocumentKind::TextBox,
            SubDocument::Comment(_) => SubDocumentKind::Comment,
        }
    }

    /// Content of this sub-document.
    pub fn content(&self) -> &SubDocumentContent {
        match self {
            SubDocument::Footnote(c)
            | SubDocument::Endnote(c)
            | SubDocument::Header(c)
            | SubDocument::Footer(c)
            | SubDocument::TableCell(c)
            | SubDocument::TextBox(c)
            | SubDocument::Comment(c) => c,
        }
    }

    /// Identity of the content.
    pub fn id(&self) -> SubDocumentId {
        self.content().id()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_kind_and_identity() {
        let content = SubDocumentContent::empty(SubDocumentId(7));
        let doc = SubDocument::Header(content.clone());
        assert_eq!(doc.kind(), SubDocumentKind::Header);
        assert!(doc.kind().is_header_footer());
        assert_eq!(doc.id(), SubDocumentId(7));
        assert!(SubDocument::Comment(content).kind().is_note());
    }

    #[test]
    fn test_debug_hides_closure() {
        let content = SubDocumentContent::empty(SubDocumentId(1));
        let text = format!("{:?}", content);
        assert!(text.contains("SubDocumentId(1)"));
        assert_eq!(SubDocumentId(1).to_string(), "subdoc#1");
    }
}
