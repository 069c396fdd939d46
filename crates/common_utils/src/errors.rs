//! Error types for universal use.

/// Result wrapping the error in an [`error_stack::Report`].
pub type CustomResult<T, E> = error_stack::Result<T, E>;
