//! DOM exceptions
//!
//! Every fallible operation reports one of these synchronously. Nothing is
//! retried internally; the caller fixes the precondition and calls again.

use thiserror::Error;

/// Result type for DOM operations
pub type DomResult<T> = Result<T, DomError>;

/// DOM operation errors
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Error)]
pub enum DomError {
    /// Offset or count outside the string / data bounds
    #[error("index or size is out of range")]
    IndexSize,
    /// Node arena could not grow
    #[error("out of memory")]
    NoMemory,
    /// Illegal parent/child pairing or cyclic insertion
    #[error("hierarchy request error")]
    HierarchyRequest,
    /// Node used in a document other than the one that created it
    #[error("node belongs to a different document")]
    WrongDocument,
    /// Name contains characters that are not allowed
    #[error("invalid character in name")]
    InvalidCharacter,
    /// Target is read-only
    #[error("no modification allowed")]
    NoModificationAllowed,
    /// Reference node is not where the caller said it was
    #[error("node not found")]
    NotFound,
    /// Feature deliberately left unimplemented
    #[error("operation not supported")]
    NotSupported,
    /// Attribute node already owned by another element
    #[error("attribute is in use by another element")]
    InUseAttribute,
    /// Malformed or inconsistent qualified name / namespace pair
    #[error("namespace error")]
    Namespace,
    /// Typed attribute written with a value of another type
    #[error("attribute value has the wrong type")]
    AttrWrongType,
}

impl DomError {
    /// Numeric DOMException code
    ///
    /// `AttrWrongType` has no standard code and sits just past the DOM
    /// Level 3 range.
    pub fn code(self) -> u16 {
        match self {
            Self::IndexSize => 1,
            Self::HierarchyRequest => 3,
            Self::WrongDocument => 4,
            Self::InvalidCharacter => 5,
            Self::NoModificationAllowed => 7,
            Self::NotFound => 8,
            Self::NotSupported => 9,
            Self::InUseAttribute => 10,
            Self::Namespace => 14,
            Self::NoMemory => 0x100,
            Self::AttrWrongType => 0x101,
        }
    }
}
