use thiserror::Error;

/// Errors reported by the tessellator's public API.
///
/// These all describe misuse of the call sequence, never bad geometry:
/// degenerate input (empty contours, collinear points, zero-length edges)
/// degrades to an empty result instead of failing. A corrupted mesh is a
/// defect in the library itself and panics rather than returning an error.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum TessellatorError {
    #[error("contour definition is finished; no more vertices can be added")]
    ContoursFinished,

    #[error("contour definition is not finished yet; call finish() first")]
    NotFinished,

    #[error("mesh edges were consumed by outline extraction; triangles are no longer available")]
    MeshConsumed,
}

/// Convenience type alias for results using [`TessellatorError`].
pub type Result<T> = std::result::Result<T, TessellatorError>;
