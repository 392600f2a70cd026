//! Static and dynamic schema references (`$ref`, `$dynamicRef`, `$recursiveRef`).
use crate::Pointer;

/// Distinguishes references resolved purely lexically from those resolved against the
/// dynamic scope in force at evaluation time.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ReferenceKind {
    /// `$ref`: resolves to a fixed destination known at compile time.
    Static,
    /// `$dynamicRef` / `$recursiveRef`: resolves against the dynamic scope.
    Dynamic,
}

/// A reference recorded by the frame indexer: where it appears and where it (lexically)
/// points to.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Reference {
    /// Whether this is a static or dynamic reference.
    pub kind: ReferenceKind,
    /// The pointer, relative to the schema root, where the reference keyword appears.
    pub origin: Pointer,
    /// The fully-resolved canonical URI this reference points to.
    pub destination: String,
}
