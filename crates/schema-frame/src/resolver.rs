//! The [`SchemaResolver`] contract and the owned document cache ([`Registry`]) the frame
//! indexer prefetches into before doing its synchronous traversal (see §4.E "Implementation
//! note" in the specification).
use std::sync::Arc;

use ahash::AHashMap;
use async_trait::async_trait;
use parking_lot::RwLock;
use serde_json::Value;

use crate::Error;

/// Resolves a schema identifier (an absolute URI) to its JSON document, asynchronously.
///
/// Implementations must be `Send + Sync` and safe to call concurrently; the only shared
/// mutable state permitted is an internally-synchronized cache. An identifier that cannot be
/// resolved returns `Ok(None)` rather than an error; only transport-level failures (a
/// connection refused, a file that exists but can't be read) should propagate as `Err`.
#[async_trait]
pub trait SchemaResolver: Send + Sync {
    /// Attempt to resolve `uri` to its document contents.
    async fn resolve(&self, uri: &str) -> Result<Option<Value>, Error>;
}

/// A resolver backed by a fixed in-memory map, for schemas that are fully known ahead of time
/// (tests, bundled metaschemas, vendored dependency schemas).
#[derive(Debug, Default, Clone)]
pub struct MapResolver {
    documents: AHashMap<String, Value>,
}

impl MapResolver {
    /// Create a resolver from a map of URI to document.
    #[must_use]
    pub fn new(documents: AHashMap<String, Value>) -> Self {
        Self { documents }
    }

    /// Register one more document under `uri`.
    pub fn insert(&mut self, uri: impl Into<String>, document: Value) -> &mut Self {
        self.documents.insert(uri.into(), document);
        self
    }
}

#[async_trait]
impl SchemaResolver for MapResolver {
    async fn resolve(&self, uri: &str) -> Result<Option<Value>, Error> {
        Ok(self.documents.get(uri).cloned())
    }
}

/// Chains two resolvers: tries `primary` first, falling through to `secondary` when the
/// primary resolver returns `Ok(None)`.
pub struct FallbackResolver<P, S> {
    primary: P,
    secondary: S,
}

impl<P, S> FallbackResolver<P, S> {
    /// Build a resolver that tries `primary`, then `secondary`.
    pub fn new(primary: P, secondary: S) -> Self {
        Self { primary, secondary }
    }
}

#[async_trait]
impl<P, S> SchemaResolver for FallbackResolver<P, S>
where
    P: SchemaResolver,
    S: SchemaResolver,
{
    async fn resolve(&self, uri: &str) -> Result<Option<Value>, Error> {
        if let Some(found) = self.primary.resolve(uri).await? {
            return Ok(Some(found));
        }
        self.secondary.resolve(uri).await
    }
}

/// The owned document cache populated by the frame indexer's async prefetch phase and then
/// consulted exclusively synchronously for the rest of indexing and compilation.
///
/// This is the crate's only cross-call shared mutable resource (§5); it is guarded by a
/// reader-writer lock so concurrent `compile()` calls sharing a [`crate::Frame`] never block
/// each other on reads.
#[derive(Default)]
pub struct Registry {
    documents: RwLock<AHashMap<String, Arc<Value>>>,
}

impl Registry {
    /// An empty registry.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert the root document under its own canonical URI.
    pub fn seed(&self, uri: impl Into<String>, document: Value) {
        self.documents.write().insert(uri.into(), Arc::new(document));
    }

    /// Look up a previously-resolved document.
    #[must_use]
    pub fn get(&self, uri: &str) -> Option<Arc<Value>> {
        self.documents.read().get(uri).cloned()
    }

    /// Resolve `uri` via `resolver` if it is not already cached, storing the result.
    ///
    /// The only suspension point in the frame indexer's lifetime lives here.
    pub async fn get_or_retrieve(
        &self,
        uri: &str,
        resolver: &dyn SchemaResolver,
    ) -> Result<Option<Arc<Value>>, Error> {
        if let Some(cached) = self.get(uri) {
            return Ok(Some(cached));
        }
        match resolver.resolve(uri).await? {
            Some(document) => {
                let document = Arc::new(document);
                self.documents
                    .write()
                    .insert(uri.to_string(), Arc::clone(&document));
                Ok(Some(document))
            }
            None => Ok(None),
        }
    }
}
