//! Core fact model shared by the Sage crates.
//!
//! - [`Word`]: a normalized token, used both as fact content and as a query key.
//! - [`Fact`]: an ordered sequence of named parts (`subject`, `verb`, ...), each an
//!   ordered sequence of words, plus the document the fact was decoded from.
//! - [`FactCodec`]: conversion between fact documents and [`Fact`] values. The only
//!   format shipped here is [`XmlFactCodec`].

mod codec;
mod error;
mod fact;
mod word;
mod xml;

pub use codec::FactCodec;
pub use error::FactError;
pub use fact::{part_order, Fact, FactPart, CANONICAL_PART_ORDER};
pub use word::{tokenize, Word};
pub use xml::{XmlFactCodec, XML_DOCUMENT_EXTENSION};
