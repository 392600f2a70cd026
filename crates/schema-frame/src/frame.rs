//! The frame indexer (§4.E): walks a root schema, assigns every reachable subschema a
//! canonical URI, and records every `$ref`/`$dynamicRef`/`$recursiveRef` it finds.
use std::collections::VecDeque;
use std::sync::Arc;

use ahash::AHashMap;
use serde_json::Value;
use url::Url;

use crate::{
    resolver::{Registry, SchemaResolver},
    uri, Dialect, Error, Pointer, Reference, ReferenceKind,
};

/// Everything the compiler needs to know about one indexed schema location.
#[derive(Debug, Clone)]
pub struct FrameEntry {
    /// The canonical (fragment-stripped-or-pointered) URI identifying this location.
    pub canonical_uri: String,
    /// The document this location lives in, fragment-stripped.
    pub document_uri: String,
    /// The pointer, from the document root, to this location.
    pub pointer: Pointer,
    /// The base dialect of the document this location lives in.
    pub base_dialect: Dialect,
    /// The dialect in force at this exact location (may differ from `base_dialect` if a
    /// nested resource declares its own `$schema`).
    pub dialect: Dialect,
    /// The pointer of the lexically enclosing subschema, if any.
    pub parent_pointer: Option<Pointer>,
}

/// The output of frame indexing: every reachable subschema location, keyed by its canonical
/// URI, plus the references discovered while walking.
pub struct Frame {
    entries: AHashMap<String, FrameEntry>,
    anchors: AHashMap<String, String>,
    references: Vec<Reference>,
    root_uri: String,
    registry: Arc<Registry>,
}

impl Frame {
    /// The canonical URI of the root schema this frame was built from.
    #[must_use]
    pub fn root_uri(&self) -> &str {
        &self.root_uri
    }

    /// Look up a previously-indexed location by its canonical URI.
    #[must_use]
    pub fn entry(&self, canonical_uri: &str) -> Option<&FrameEntry> {
        self.entries.get(canonical_uri)
    }

    /// The document root entry for the root schema.
    #[must_use]
    pub fn root_entry(&self) -> &FrameEntry {
        self.entries
            .get(&self.root_uri)
            .expect("root is always indexed")
    }

    /// Every reference recorded while indexing, for diagnostics.
    #[must_use]
    pub fn references(&self) -> &[Reference] {
        &self.references
    }

    /// The owned document contents backing `document_uri`.
    #[must_use]
    pub fn document(&self, document_uri: &str) -> Option<Arc<Value>> {
        self.registry.get(document_uri)
    }

    /// Resolve a `$ref`/`$dynamicRef`/`$recursiveRef` string, written at `origin_base`, to
    /// the [`FrameEntry`] it points to.
    ///
    /// `$dynamicRef`/`$recursiveRef` are resolved the same way `$ref` is: lexically, against
    /// the enclosing base URI. True dynamic-scope resolution (chaining through the runtime
    /// evaluation stack to find the *last* compatible `$dynamicAnchor`) is a property of the
    /// instance being evaluated, not of the schema alone, and is out of scope for the frame
    /// (see DESIGN.md).
    ///
    /// # Errors
    ///
    /// Returns [`Error::Resolving`] if the reference does not resolve to any indexed entry.
    pub fn resolve_reference(
        &self,
        reference: &str,
        origin_base: &Url,
    ) -> Result<&FrameEntry, Error> {
        let target = uri::resolve_against(origin_base, reference)?;
        let (stripped, fragment) = uri::split_fragment(&target);
        let document_uri = stripped.to_string();
        let destination = if fragment.is_empty() {
            document_uri.clone()
        } else if let Some(pointer) = fragment.strip_prefix('/') {
            format!("{document_uri}#/{pointer}")
        } else {
            format!("{document_uri}#{fragment}")
        };
        self.entry_for_destination(&destination)
            .ok_or_else(|| Error::resolving(reference, origin_base.as_str()))
    }

    /// Look up the frame entry for an already-resolved reference destination (as recorded in
    /// [`Reference::destination`]): either a direct canonical-URI entry or an anchor alias.
    /// Exposed so the compiler can resolve a [`Reference`] it already has in hand without
    /// re-parsing a URI.
    #[must_use]
    pub fn entry_for_destination(&self, destination: &str) -> Option<&FrameEntry> {
        if let Some(entry) = self.entries.get(destination) {
            return Some(entry);
        }
        let resolved = self.anchors.get(destination)?;
        self.entries.get(resolved)
    }
}

/// Builds a [`Frame`] from a root schema document.
pub struct FrameIndexer<'r> {
    resolver: &'r dyn SchemaResolver,
    default_dialect: Option<Dialect>,
}

impl<'r> FrameIndexer<'r> {
    /// Create an indexer that resolves external references through `resolver`, falling back
    /// to `default_dialect` for documents with no `$schema`.
    #[must_use]
    pub fn new(resolver: &'r dyn SchemaResolver, default_dialect: Option<Dialect>) -> Self {
        Self {
            resolver,
            default_dialect,
        }
    }

    /// Index `root` under `root_uri` (or a synthetic default if `None`).
    ///
    /// # Errors
    ///
    /// Returns [`Error::Schema`] for malformed `$id`/`id` values, [`Error::UnknownSpecification`]
    /// for an unrecognized `$schema`, and [`Error::Resolving`] for a `$ref` that cannot be
    /// resolved to any indexed location.
    pub async fn index(&self, root: Value, root_uri: Option<&str>) -> Result<Frame, Error> {
        let root_uri = match root_uri {
            Some(uri) => uri::from_str(uri)?,
            None => uri::DEFAULT_ROOT_URI.clone(),
        };
        let root_uri_string = uri::canonical(&root_uri);
        let _span = tracing::info_span!("frame", uri = %root_uri_string).entered();

        let registry = Arc::new(Registry::new());
        registry.seed(root_uri_string.clone(), root.clone());
        self.prefetch(&root_uri, &registry).await?;

        let mut entries = AHashMap::default();
        let mut anchors = AHashMap::default();
        let mut references = Vec::new();
        let mut framed_docs: AHashMap<String, ()> = AHashMap::default();
        let mut pending_docs: VecDeque<Url> = VecDeque::new();
        pending_docs.push_back(root_uri.clone());

        while let Some(doc_uri) = pending_docs.pop_front() {
            let doc_uri_string = uri::canonical(&doc_uri);
            if framed_docs.contains_key(&doc_uri_string) {
                continue;
            }
            let Some(contents) = registry.get(&doc_uri_string) else {
                return Err(Error::resolving(doc_uri_string, doc_uri.as_str()));
            };
            framed_docs.insert(doc_uri_string.clone(), ());
            let base_dialect = Dialect::detect_or_inherit(
                &contents,
                self.default_dialect.ok_or_else(|| {
                    Error::schema("", "no $schema present and no default dialect configured")
                })?,
            )?;
            self.frame_document(
                &contents,
                &doc_uri,
                &doc_uri_string,
                base_dialect,
                &mut entries,
                &mut anchors,
                &mut references,
                &mut pending_docs,
            )?;
        }

        for reference in &references {
            // Eagerly validate every recorded reference resolves; `Frame::resolve_reference`
            // is re-derived at compile time from the live context, this pass only enforces
            // the frame invariant that nothing dangles.
            let resolved = entries.contains_key(&reference.destination)
                || anchors.contains_key(&reference.destination);
            if !resolved {
                return Err(Error::resolving(
                    reference.destination.clone(),
                    doc_uri_for_entries(&entries),
                ));
            }
        }

        Ok(Frame {
            entries,
            anchors,
            references,
            root_uri: root_uri_string,
            registry,
        })
    }

    /// Asynchronously walk `contents` scanning for `$ref`-shaped strings, resolving every
    /// external document transitively reachable from them into `registry` before the
    /// synchronous indexing pass begins (see §4.E implementation note).
    fn prefetch<'a>(
        &'a self,
        base_uri: &'a Url,
        registry: &'a Registry,
    ) -> std::pin::Pin<Box<dyn std::future::Future<Output = Result<(), Error>> + 'a>> {
        Box::pin(async move {
            let doc_uri = uri::canonical(base_uri);
            let Some(contents) = registry.get(&doc_uri) else {
                return Ok(());
            };
            let mut external = Vec::new();
            collect_external_refs(&contents, base_uri, &mut external)?;
            for external_uri in external {
                let canonical = uri::canonical(&external_uri);
                if registry.get(&canonical).is_some() {
                    continue;
                }
                if let Some(document) = registry.get_or_retrieve(&canonical, self.resolver).await? {
                    let _ = document;
                    self.prefetch(&external_uri, registry).await?;
                }
            }
            Ok(())
        })
    }

    #[allow(clippy::too_many_arguments)]
    fn frame_document(
        &self,
        root: &Value,
        doc_uri: &Url,
        doc_uri_string: &str,
        base_dialect: Dialect,
        entries: &mut AHashMap<String, FrameEntry>,
        anchors: &mut AHashMap<String, String>,
        references: &mut Vec<Reference>,
        pending_docs: &mut VecDeque<Url>,
    ) -> Result<(), Error> {
        self.frame_node(
            root,
            doc_uri.clone(),
            doc_uri_string,
            Pointer::root(),
            Pointer::root(),
            None,
            base_dialect,
            base_dialect,
            entries,
            anchors,
            references,
            pending_docs,
        )
    }

    #[allow(clippy::too_many_arguments)]
    fn frame_node(
        &self,
        node: &Value,
        mut base_uri: Url,
        document_uri: &str,
        doc_pointer: Pointer,
        mut pointer_since_base: Pointer,
        parent_pointer: Option<Pointer>,
        base_dialect: Dialect,
        inherited_dialect: Dialect,
        entries: &mut AHashMap<String, FrameEntry>,
        anchors: &mut AHashMap<String, String>,
        references: &mut Vec<Reference>,
        pending_docs: &mut VecDeque<Url>,
    ) -> Result<(), Error> {
        if !node.is_object() && !node.is_boolean() {
            return Ok(());
        }
        let dialect = Dialect::detect_or_inherit(node, inherited_dialect)?;

        if let Some(id) = dialect.id_of(node) {
            if id.trim().is_empty() {
                return Err(Error::schema(doc_pointer.to_string(), "empty $id/id"));
            }
            base_uri = uri::resolve_against(&base_uri, id)?;
            pointer_since_base = Pointer::root();
        }

        let canonical_uri = if pointer_since_base.is_root() {
            uri::canonical(&base_uri)
        } else {
            format!("{}#{}", uri::canonical(&base_uri), pointer_since_base)
        };

        entries.insert(
            canonical_uri.clone(),
            FrameEntry {
                canonical_uri: canonical_uri.clone(),
                document_uri: document_uri.to_string(),
                pointer: doc_pointer.clone(),
                base_dialect,
                dialect,
                parent_pointer: parent_pointer.clone(),
            },
        );

        for (name, _is_dynamic) in dialect.anchors_of(node) {
            anchors.insert(
                format!("{}#{}", uri::canonical(&base_uri), name),
                canonical_uri.clone(),
            );
        }

        for (keyword, _is_dynamic) in dialect.reference_keywords() {
            if let Some(Value::String(reference)) = node.get(*keyword) {
                let target = uri::resolve_against(&base_uri, reference)?;
                let (stripped, fragment) = uri::split_fragment(&target);
                let destination = if fragment.is_empty() {
                    stripped.to_string()
                } else if let Some(pointer) = fragment.strip_prefix('/') {
                    format!("{}#/{}", stripped, pointer)
                } else {
                    // Anchors are resolved lazily against `anchors` once the whole graph is
                    // framed; record the raw form here and let `Frame::resolve_reference`
                    // (used by the compiler) do the final lookup.
                    format!("{}#{}", stripped, fragment)
                };
                let kind = if *_is_dynamic {
                    ReferenceKind::Dynamic
                } else {
                    ReferenceKind::Static
                };
                references.push(Reference {
                    kind,
                    origin: doc_pointer.with_key(*keyword),
                    destination,
                });
                if !pending_docs.iter().any(|u| uri::canonical(u) == stripped.to_string())
                {
                    pending_docs.push_back(stripped);
                }
            }
        }

        for (segments, subschema) in dialect.subresources_of(node) {
            let mut child_doc_pointer = doc_pointer.clone();
            let mut child_pointer_since_base = pointer_since_base.clone();
            for segment in &segments {
                child_doc_pointer = push_chunk(&child_doc_pointer, segment);
                child_pointer_since_base = push_chunk(&child_pointer_since_base, segment);
            }
            self.frame_node(
                subschema,
                base_uri.clone(),
                document_uri,
                child_doc_pointer,
                child_pointer_since_base,
                Some(doc_pointer.clone()),
                base_dialect,
                dialect,
                entries,
                anchors,
                references,
                pending_docs,
            )?;
        }

        Ok(())
    }
}

fn push_chunk(pointer: &Pointer, chunk: &crate::PathChunk) -> Pointer {
    match chunk {
        crate::PathChunk::Key(key) => pointer.with_key(key.clone()),
        crate::PathChunk::Index(index) => pointer.with_index(*index),
        crate::PathChunk::Keyword(keyword) => pointer.with_keyword(keyword),
    }
}

fn doc_uri_for_entries(entries: &AHashMap<String, FrameEntry>) -> String {
    entries
        .values()
        .next()
        .map(|entry| entry.document_uri.clone())
        .unwrap_or_default()
}

/// Scan `node` for `$ref`/`$dynamicRef`/`$recursiveRef` string values, resolving each against
/// the running base URI (honoring `$id`/`id` along the way) and pushing any that point at a
/// different document into `out`. Dialect-agnostic and intentionally over-approximate: it
/// does not distinguish which keywords a given dialect recognizes as schema-bearing, since
/// the only thing this pass needs is "might this be a reference to an external document".
fn collect_external_refs(node: &Value, base_uri: &Url, out: &mut Vec<Url>) -> Result<(), Error> {
    let Some(object) = node.as_object() else {
        if let Some(array) = node.as_array() {
            for item in array {
                collect_external_refs(item, base_uri, out)?;
            }
        }
        return Ok(());
    };

    let mut base_uri = base_uri.clone();
    for id_key in ["$id", "id"] {
        if let Some(id) = object.get(id_key).and_then(Value::as_str) {
            if !id.starts_with('#') && !id.is_empty() {
                base_uri = uri::resolve_against(&base_uri, id)?;
            }
        }
    }

    for ref_key in ["$ref", "$dynamicRef", "$recursiveRef"] {
        if let Some(reference) = object.get(ref_key).and_then(Value::as_str) {
            let target = uri::resolve_against(&base_uri, reference)?;
            let (stripped, _) = uri::split_fragment(&target);
            if uri::canonical(&stripped) != uri::canonical(&base_uri) {
                out.push(stripped);
            }
        }
    }

    for value in object.values() {
        collect_external_refs(value, &base_uri, out)?;
    }
    Ok(())
}
