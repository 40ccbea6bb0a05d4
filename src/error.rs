use thiserror::Error as ThisError;

/// Errors raised at the input boundary.
///
/// Business-rule outcomes (empty pools, unmatched municipalities, fewer visits than requested)
/// are not errors; they show up as empty or shorter routes.
#[derive(Debug, Clone, PartialEq, ThisError)]
pub enum RouteError {
    #[error("malformed start point {input:?}: expected \"latitude,longitude\"")]
    MalformedStartPoint { input: String },
    #[error("start point out of range: {latitude},{longitude}")]
    StartPointOutOfRange { latitude: f64, longitude: f64 },
}

pub type Result<T> = std::result::Result<T, RouteError>;

impl RouteError {
    pub fn malformed(input: impl Into<String>) -> Self {
        Self::MalformedStartPoint { input: input.into() }
    }
}
