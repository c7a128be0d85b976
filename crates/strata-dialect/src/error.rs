//! Dialect error types.

/// Errors from introspection or SQL emission.
#[derive(Debug, thiserror::Error)]
pub enum DialectError {
    /// The dialect cannot express the requested change.
    #[error("{0}")]
    Unsupported(String),

    /// A catalog query failed; `context` names what was being
    /// inspected.
    #[error("failed to inspect {context}: {source}")]
    Inspect {
        context: String,
        #[source]
        source: sqlx::Error,
    },

    /// Any other driver error.
    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),
}

impl DialectError {
    /// Wraps a driver error with the inspection context it occurred in.
    pub(crate) fn inspect(context: impl Into<String>) -> impl FnOnce(sqlx::Error) -> Self {
        let context = context.into();
        move |source| Self::Inspect { context, source }
    }
}
