use crate::error::FactError;
use crate::fact::Fact;
use std::path::Path;

/// Conversion between fact documents and [`Fact`] values.
///
/// One implementation exists per document format. Index entries are written in the
/// same format as the source documents, so a codec must be able to decode whatever
/// it encodes.
pub trait FactCodec: Send + Sync {
    /// File extension (without the dot) of documents in this format.
    fn document_extension(&self) -> &str;

    /// Rewrites `text` so every fact lists its parts in canonical order.
    fn canonicalize(&self, text: &str) -> Result<String, FactError>;

    /// Decodes every fact in `text`, in document order.
    ///
    /// `origin` is attached to each decoded fact.
    fn decode(&self, text: &str, origin: Option<&Path>) -> Result<Vec<Fact>, FactError>;

    /// Serializes a single fact. Concatenated outputs form a valid document.
    fn encode(&self, fact: &Fact) -> String;

    fn is_document(&self, path: &Path) -> bool {
        path.extension()
            .is_some_and(|ext| ext == self.document_extension())
    }
}
