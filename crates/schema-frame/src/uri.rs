//! URI parsing and resolution, adapted to the needs of schema framing.
//!
//! Schemas are identified by absolute or relative URIs (`$id`, `id`, `$ref`, ...). This module
//! wraps [`url::Url`] with the handful of operations the frame indexer and reference resolver
//! actually need: parsing a (possibly relative) reference, resolving it against a base, and
//! splitting the JSON-Pointer fragment off a canonical URI.
use once_cell::sync::Lazy;
use url::{ParseError, Url};

use crate::Error;

/// A synthetic root used when a schema carries no `$id`/`id` at all. Mirrors the convention a
/// JSON Pointer fragment is always resolved relative to *some* base.
pub(crate) static DEFAULT_ROOT_URI: Lazy<Url> =
    Lazy::new(|| Url::parse("json-schema:///").expect("default root URI is valid"));

/// Parse a URI reference, resolving it against the default root if it has no scheme.
pub fn from_str(input: &str) -> Result<Url, Error> {
    match Url::parse(input) {
        Ok(url) => Ok(url),
        Err(ParseError::RelativeUrlWithoutBase) => DEFAULT_ROOT_URI
            .join(input)
            .map_err(|source| Error::uri_parsing(input, source)),
        Err(source) => Err(Error::uri_parsing(input, source)),
    }
}

/// Resolve `reference` (absolute or relative, with an optional fragment) against `base`.
pub fn resolve_against(base: &Url, reference: &str) -> Result<Url, Error> {
    base.join(reference)
        .map_err(|source| Error::uri_parsing(reference, source))
}

/// Split a URI into its fragment-stripped form and the fragment itself (without the `#`).
pub fn split_fragment(uri: &Url) -> (Url, String) {
    let fragment = uri.fragment().unwrap_or("").to_string();
    let mut stripped = uri.clone();
    stripped.set_fragment(None);
    (stripped, fragment)
}

/// The canonical (fragment-stripped) string form of a URI, used as a map key.
pub fn canonical(uri: &Url) -> String {
    let (stripped, _) = split_fragment(uri);
    stripped.to_string()
}
