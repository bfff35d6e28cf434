//! Decoder interface.
//!
//! A decoder reads some source (a legacy binary file, an event script) and
//! replays it as assembler calls. The assembler owns ordering and nesting;
//! the decoder only reports what it found, in the order it found it.
//!
//! # Example
//!
//! ```
//! use unlegacy::assembler::AssemblerOptions;
//! use unlegacy::decode::{assemble, ScriptDecoder};
//! use unlegacy::sink::TextSink;
//!
//! fn main() -> unlegacy::Result<()> {
//!     let decoder = ScriptDecoder::from_json(r#"{"body": [{"op": "text", "text": "Hi"}]}"#)?;
//!     let mut sink = TextSink::new();
//!     assemble(&decoder, &mut sink, AssemblerOptions::default())?;
//!     assert_eq!(sink.into_text(), "Hi\n");
//!     Ok(())
//! }
//! ```

mod script;

pub use script::{
    Script, ScriptBody, ScriptDecoder, ScriptEvent, ScriptHeaderFooter, ScriptList,
    ScriptPageSpan,
};

use crate::assembler::{AssemblerOptions, Diagnostics, DocumentAssembler};
use crate::error::Result;
use crate::model::{DocumentMetadata, PageSpan};
use crate::sink::DocumentSink;

/// Trait for format decoders.
///
/// Implement this trait to feed a new source format into the assembler.
pub trait Decoder {
    /// Get the name of this decoder.
    fn name(&self) -> &str;

    /// Page spans of the document, with their header/footer content.
    ///
    /// Called once, before [`Decoder::replay`].
    fn page_spans(&self) -> Vec<PageSpan>;

    /// Document metadata, if the source carries any.
    fn metadata(&self) -> Option<DocumentMetadata> {
        None
    }

    /// Replay the main text flow against an assembler.
    ///
    /// Must not call [`DocumentAssembler::end_document`]; [`assemble`] does.
    fn replay(&self, assembler: &mut DocumentAssembler<'_>) -> Result<()>;
}

/// Run a whole session: build an assembler, replay the decoder, end the
/// document.
///
/// Non-fatal decoder errors are logged and the document is still closed;
/// fatal ones abort. Returns the warnings of the session.
pub fn assemble(
    decoder: &dyn Decoder,
    sink: &mut dyn DocumentSink,
    options: AssemblerOptions,
) -> Result<Diagnostics> {
    let mut assembler = DocumentAssembler::with_options(sink, decoder.page_spans(), options);
    if let Some(metadata) = decoder.metadata() {
        assembler.set_document_metadata(metadata);
    }

    log::debug!("assembling with decoder '{}'", decoder.name());
    if let Err(e) = decoder.replay(&mut assembler) {
        if e.is_fatal() {
            return Err(e);
        }
        log::warn!("decoder '{}' stopped early: {}", decoder.name(), e);
    }
    assembler.end_document()?;
    Ok(assembler.into_diagnostics())
}
