#[derive(Debug, Clone, thiserror::Error)]
pub enum PatternError {
    #[error("malformed placeholder: {0}")]
    MalformedPlaceholder(String),
    #[error("unknown predictor type: {0}")]
    UnknownPredictorType(String),
    #[error("could not compile placeholder group `{group}`: {source}")]
    GroupRegex {
        group: String,
        #[source]
        source: regex::Error,
    },
}

impl PatternError {
    pub(crate) fn malformed(message: impl std::fmt::Display) -> Self {
        Self::MalformedPlaceholder(message.to_string())
    }
}
