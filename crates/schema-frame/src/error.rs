//! Error taxonomy surfaced by frame indexing and reference resolution.
use std::fmt;

use url::ParseError;

/// Errors produced while indexing a schema or resolving a reference against it.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// A `$schema`/`$id`/anchor value was malformed or absent with no default to fall back on.
    #[error("schema error at {pointer}: {message}")]
    Schema {
        /// JSON Pointer, relative to the document root, where the problem was found.
        pointer: String,
        /// Human-readable description.
        message: String,
    },
    /// A `$schema` value did not resolve, through its metaschema chain, to a recognized base dialect.
    #[error("unknown specification: {0}")]
    UnknownSpecification(String),
    /// A `$ref`/`$dynamicRef`/`$recursiveRef` could not be resolved to a frame entry.
    #[error("could not resolve reference {reference} against {base_uri}")]
    Resolving {
        /// The reference string as written in the schema.
        reference: String,
        /// The base URI it was resolved against.
        base_uri: String,
    },
    /// The configured [`crate::SchemaResolver`] returned an I/O-level error.
    #[error("failed to retrieve {uri}: {source}")]
    Retrieval {
        /// The URI that failed to resolve.
        uri: String,
        /// The underlying error.
        #[source]
        source: Box<dyn std::error::Error + Send + Sync>,
    },
    /// A URI reference could not be parsed.
    #[error("invalid URI reference {uri}: {source}")]
    UriParsing {
        /// The malformed input.
        uri: String,
        /// The underlying parser error.
        #[source]
        source: ParseErrorWrapper,
    },
    /// A JSON Pointer did not resolve to anything inside its document.
    #[error("JSON pointer {0} does not point to anything")]
    PointerToNowhere(String),
    /// An `$anchor`/`$dynamicAnchor` lookup found nothing.
    #[error("no such anchor {name} in {resource}")]
    NoSuchAnchor {
        /// The anchor name that was looked up.
        name: String,
        /// The resource it was looked up in.
        resource: String,
    },
}

impl Error {
    pub(crate) fn schema(pointer: impl Into<String>, message: impl Into<String>) -> Self {
        Error::Schema {
            pointer: pointer.into(),
            message: message.into(),
        }
    }

    pub(crate) fn resolving(reference: impl Into<String>, base_uri: impl Into<String>) -> Self {
        Error::Resolving {
            reference: reference.into(),
            base_uri: base_uri.into(),
        }
    }

    pub(crate) fn uri_parsing(uri: impl Into<String>, source: ParseError) -> Self {
        Error::UriParsing {
            uri: uri.into(),
            source: ParseErrorWrapper(source.to_string()),
        }
    }
}

/// `url::ParseError` is `Copy` but carries no borrowed data of its own; we still capture its
/// `Display` output so this type doesn't need a `url` re-export at the crate boundary.
#[derive(Debug)]
pub struct ParseErrorWrapper(String);

impl fmt::Display for ParseErrorWrapper {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl std::error::Error for ParseErrorWrapper {}
