use std::fmt;

/// An error that can happen while modifying or decomposing a planar
/// subdivision.
///
/// These always indicate either malformed input (for example a polygon
/// that is not simple) or broken internal bookkeeping, never a recoverable
/// geometric configuration.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(
    feature = "serialization",
    derive(serde::Serialize, serde::Deserialize)
)]
#[non_exhaustive]
pub enum InternalError {
    /// A monotone decomposition handler looked up the helper of an edge
    /// that was not in the helper tree.
    MissingHelperEdge,
    /// A diagonal insertion was requested between two vertices that do not
    /// lie on a common bounded face.
    NoCommonFace,
}

impl fmt::Display for InternalError {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            InternalError::MissingHelperEdge => {
                write!(f, "Helper edge missing from the status tree")
            }
            InternalError::NoCommonFace => {
                write!(f, "The two vertices do not share a bounded face")
            }
        }
    }
}

impl std::error::Error for InternalError {}
