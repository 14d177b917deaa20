/// Errors produced while decoding fact documents.
#[derive(Debug, thiserror::Error)]
pub enum FactError {
    #[error("malformed fact document: {message}")]
    Xml { message: String },

    #[error("unexpected element <{name}> in fact document")]
    UnexpectedElement { name: String },

    #[error("unexpected text outside of a <fact> element")]
    StrayText,

    #[error("fact document is not valid UTF-8: {0}")]
    Encoding(#[from] std::string::FromUtf8Error),
}

impl From<roxmltree::Error> for FactError {
    fn from(err: roxmltree::Error) -> Self {
        Self::Xml {
            message: err.to_string(),
        }
    }
}
