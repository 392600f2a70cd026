//! JSON Schema dialects (drafts) and the per-dialect rules the frame indexer needs:
//! where `$id` lives, which keywords carry subschemas, and how anchors are spelled.
use serde_json::Value;

use crate::Error;

/// A JSON Schema draft, i.e. a base dialect.
#[non_exhaustive]
#[derive(Debug, Default, PartialEq, Eq, PartialOrd, Ord, Copy, Clone, Hash)]
pub enum Dialect {
    /// JSON Schema Draft 4.
    Draft4,
    /// JSON Schema Draft 6.
    Draft6,
    /// JSON Schema Draft 7.
    Draft7,
    /// JSON Schema Draft 2019-09.
    Draft201909,
    /// JSON Schema Draft 2020-12.
    #[default]
    Draft202012,
}

impl Dialect {
    /// Recognize a dialect from a `$schema` metaschema URI, per §4.E: pre-vocabulary drafts
    /// (4-7) are matched by exact URI, 2019-09/2020-12 are vocabulary-aware and matched the
    /// same way here since we do not ship the full metaschema corpus to trace `$vocabulary`
    /// chains against; the URI match already disambiguates them unambiguously in practice.
    pub fn detect(schema_uri: &str) -> Result<Dialect, Error> {
        Ok(match schema_uri.trim_end_matches('#') {
            "https://json-schema.org/draft/2020-12/schema" => Dialect::Draft202012,
            "https://json-schema.org/draft/2019-09/schema" => Dialect::Draft201909,
            "http://json-schema.org/draft-07/schema" | "https://json-schema.org/draft-07/schema" => {
                Dialect::Draft7
            }
            "http://json-schema.org/draft-06/schema" | "https://json-schema.org/draft-06/schema" => {
                Dialect::Draft6
            }
            "http://json-schema.org/draft-04/schema" | "https://json-schema.org/draft-04/schema" => {
                Dialect::Draft4
            }
            other => return Err(Error::UnknownSpecification(other.to_string())),
        })
    }

    /// Determine the dialect in force for `contents`, given the dialect inherited from the
    /// enclosing resource. Reads `$schema` if present; otherwise inherits.
    pub fn detect_or_inherit(contents: &Value, inherited: Dialect) -> Result<Dialect, Error> {
        if let Some(schema) = contents
            .as_object()
            .and_then(|obj| obj.get("$schema"))
            .and_then(Value::as_str)
        {
            Dialect::detect(schema)
        } else {
            Ok(inherited)
        }
    }

    /// The resource identifier keyword for this dialect: `$id` from Draft 6 onward, legacy
    /// `id` in Draft 4.
    #[must_use]
    pub fn id_of<'a>(self, contents: &'a Value) -> Option<&'a str> {
        let object = contents.as_object()?;
        // A schema with `$ref` never carries its own identity in Draft 4-7 (the reference
        // overrides all sibling keywords); 2019-09+ dropped that restriction.
        let key = match self {
            Dialect::Draft4 => "id",
            _ => "$id",
        };
        if matches!(self, Dialect::Draft4 | Dialect::Draft6 | Dialect::Draft7)
            && object.contains_key("$ref")
        {
            return None;
        }
        let id = object.get(key).and_then(Value::as_str)?;
        if id.starts_with('#') {
            None
        } else {
            Some(id)
        }
    }

    /// Anchors declared directly on `contents`: `($anchor-or-legacy-fragment-id, is_dynamic)`.
    #[must_use]
    pub fn anchors_of<'a>(self, contents: &'a Value) -> Vec<(&'a str, bool)> {
        let Some(object) = contents.as_object() else {
            return Vec::new();
        };
        let mut anchors = Vec::new();
        match self {
            Dialect::Draft4 => {
                if let Some(id) = object.get("id").and_then(Value::as_str) {
                    if let Some(fragment) = id.strip_prefix('#') {
                        if !fragment.is_empty() {
                            anchors.push((fragment, false));
                        }
                    }
                }
            }
            Dialect::Draft6 | Dialect::Draft7 => {
                if let Some(id) = object.get("$id").and_then(Value::as_str) {
                    if let Some(fragment) = id.strip_prefix('#') {
                        if !fragment.is_empty() {
                            anchors.push((fragment, false));
                        }
                    }
                }
            }
            Dialect::Draft201909 | Dialect::Draft202012 => {
                if let Some(name) = object.get("$anchor").and_then(Value::as_str) {
                    anchors.push((name, false));
                }
                if self == Dialect::Draft202012 {
                    if let Some(name) = object.get("$dynamicAnchor").and_then(Value::as_str) {
                        anchors.push((name, true));
                    }
                }
            }
        }
        anchors
    }

    /// The reference keywords understood by this dialect, in the form
    /// `(keyword, is_dynamic)`. `is_dynamic` marks `$dynamicRef`/`$recursiveRef`, which
    /// resolve against the dynamic scope rather than purely lexically.
    #[must_use]
    pub fn reference_keywords(self) -> &'static [(&'static str, bool)] {
        match self {
            Dialect::Draft4 | Dialect::Draft6 | Dialect::Draft7 => &[("$ref", false)],
            Dialect::Draft201909 => &[("$ref", false), ("$recursiveRef", true)],
            Dialect::Draft202012 => &[("$ref", false), ("$dynamicRef", true)],
        }
    }

    /// Enumerate the direct subschema locations reachable from `contents` under this dialect,
    /// as `(pointer_segment_from_contents, subschema_value)` pairs. This is the data this
    /// dialect contributes to the default [`crate::SchemaWalker`] implementation.
    #[must_use]
    pub fn subresources_of<'a>(self, contents: &'a Value) -> Vec<(Vec<crate::PathChunk>, &'a Value)> {
        use crate::PathChunk as PC;
        let Some(schema) = contents.as_object() else {
            return Vec::new();
        };
        let mut out = Vec::new();

        const IN_VALUE: &[&str] = &[
            "additionalProperties",
            "contains",
            "else",
            "if",
            "not",
            "propertyNames",
            "then",
            "unevaluatedItems",
            "unevaluatedProperties",
        ];
        for keyword in IN_VALUE {
            if let Some(value) = schema.get(*keyword) {
                out.push((vec![PC::Key((*keyword).to_string())], value));
            }
        }

        const IN_SUBARRAY: &[&str] = &["allOf", "anyOf", "oneOf"];
        for keyword in IN_SUBARRAY {
            if let Some(Value::Array(items)) = schema.get(*keyword) {
                for (index, item) in items.iter().enumerate() {
                    out.push((vec![PC::Key((*keyword).to_string()), PC::Index(index)], item));
                }
            }
        }
        if self == Dialect::Draft202012 {
            if let Some(Value::Array(items)) = schema.get("prefixItems") {
                for (index, item) in items.iter().enumerate() {
                    out.push((vec![PC::Key("prefixItems".to_string()), PC::Index(index)], item));
                }
            }
        }

        const IN_SUBVALUES: &[&str] = &["definitions", "$defs", "patternProperties", "properties"];
        for keyword in IN_SUBVALUES {
            if let Some(Value::Object(map)) = schema.get(*keyword) {
                for (key, value) in map {
                    out.push((
                        vec![PC::Key((*keyword).to_string()), PC::Key(key.clone())],
                        value,
                    ));
                }
            }
        }
        if matches!(self, Dialect::Draft201909 | Dialect::Draft202012) {
            if let Some(Value::Object(map)) = schema.get("dependentSchemas") {
                for (key, value) in map {
                    out.push((
                        vec![PC::Key("dependentSchemas".to_string()), PC::Key(key.clone())],
                        value,
                    ));
                }
            }
        }

        // `items`: a single subschema, or (Draft 4-2019-09) a tuple of subschemas.
        match schema.get("items") {
            Some(Value::Array(items)) if self != Dialect::Draft202012 => {
                for (index, item) in items.iter().enumerate() {
                    out.push((vec![PC::Key("items".to_string()), PC::Index(index)], item));
                }
            }
            Some(value) => out.push((vec![PC::Key("items".to_string())], value)),
            None => {}
        }
        if self != Dialect::Draft202012 {
            if let Some(value) = schema.get("additionalItems") {
                out.push((vec![PC::Key("additionalItems".to_string())], value));
            }
        }

        // `dependencies`: pre-2019-09 untangled mix of schema-or-array values.
        if matches!(
            self,
            Dialect::Draft4 | Dialect::Draft6 | Dialect::Draft7
        ) {
            if let Some(Value::Object(map)) = schema.get("dependencies") {
                for (key, value) in map {
                    if value.is_object() || value.is_boolean() {
                        out.push((
                            vec![PC::Key("dependencies".to_string()), PC::Key(key.clone())],
                            value,
                        ));
                    }
                }
            }
        }

        out
    }
}

impl std::fmt::Display for Dialect {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            Dialect::Draft4 => "Draft 4",
            Dialect::Draft6 => "Draft 6",
            Dialect::Draft7 => "Draft 7",
            Dialect::Draft201909 => "Draft 2019-09",
            Dialect::Draft202012 => "Draft 2020-12",
        };
        f.write_str(s)
    }
}
