//! Schema indexing (the "frame") and reference resolution, independent of any particular
//! compiler or evaluator.
//!
//! This crate answers one question: given a root JSON Schema document, what is the canonical
//! identity of every reachable subschema, and where does every `$ref`/`$dynamicRef`/
//! `$recursiveRef` in it actually point? The [`schema-engine`](../schema_engine/index.html)
//! crate consumes a [`Frame`] to compile schemas into its intermediate representation.
#![warn(missing_docs)]

mod dialect;
mod error;
mod frame;
mod pointer;
mod reference;
mod resolver;
pub mod uri;
mod walker;

pub use dialect::Dialect;
pub use error::Error;
pub use frame::{Frame, FrameEntry, FrameIndexer};
pub use pointer::{PathChunk, Pointer};
pub use reference::{Reference, ReferenceKind};
pub use resolver::{FallbackResolver, MapResolver, Registry, SchemaResolver};
pub use walker::{Classification, DefaultWalker, SchemaWalker};
