//! Errors raised while talking to the model.
//!
//! Only the client and the study plan extractor produce these. The question
//! and flashcard parsers never fail on malformed model output; they filter.

/// Failures of a model round-trip or of the plan extraction loop.
#[derive(Debug, thiserror::Error)]
pub enum GenerationError {
    /// Every attempt raised; carries the last underlying error message.
    #[error("Error querying the model after {attempts} attempts: {message}")]
    ExhaustedRetries { attempts: u32, message: String },
    /// A call succeeded but returned no text. Not retried.
    #[error("No valid response from the model")]
    NoResponse,
    /// The extraction produced fewer topics than requested.
    #[error("Study plan has only {} of the {requested} requested topics", .found.len())]
    EmptyPlan {
        requested: usize,
        found: Vec<String>,
    },
    #[error("Generation was cancelled")]
    Cancelled,
}
