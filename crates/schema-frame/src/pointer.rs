//! JSON Pointer (RFC 6901) represented as a sequence of tokens.
//!
//! The same type is used to address a location inside a schema document and a location inside
//! an instance being validated; which one is meant is always clear from context.
use std::fmt;

/// A single token of a [`Pointer`]: either an object key or an array index.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum PathChunk {
    /// An object property name.
    Key(String),
    /// An array index.
    Index(usize),
    /// A schema keyword, used to label evaluation-path segments (e.g. `"properties"`).
    Keyword(&'static str),
}

impl From<String> for PathChunk {
    fn from(value: String) -> Self {
        PathChunk::Key(value)
    }
}

impl From<&str> for PathChunk {
    fn from(value: &str) -> Self {
        PathChunk::Key(value.to_string())
    }
}

impl From<usize> for PathChunk {
    fn from(value: usize) -> Self {
        PathChunk::Index(value)
    }
}

/// An ordered sequence of [`PathChunk`]s. The empty pointer denotes the document root.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash)]
pub struct Pointer(Vec<PathChunk>);

impl Pointer {
    /// The empty (root) pointer.
    #[must_use]
    pub fn root() -> Self {
        Self(Vec::new())
    }

    /// Build a pointer from an RFC 6901 string such as `"/properties/name"`.
    #[must_use]
    pub fn parse(input: &str) -> Self {
        if input.is_empty() || input == "/" {
            return Self::root();
        }
        let mut tokens = Vec::new();
        for raw in input.trim_start_matches('/').split('/') {
            let unescaped = raw.replace("~1", "/").replace("~0", "~");
            if let Ok(index) = unescaped.parse::<usize>() {
                if unescaped == index.to_string() {
                    tokens.push(PathChunk::Index(index));
                    continue;
                }
            }
            tokens.push(PathChunk::Key(unescaped));
        }
        Self(tokens)
    }

    /// Return a copy of this pointer with one more key segment appended.
    #[must_use]
    pub fn with_key(&self, key: impl Into<String>) -> Self {
        let mut next = self.0.clone();
        next.push(PathChunk::Key(key.into()));
        Self(next)
    }

    /// Return a copy of this pointer with one more index segment appended.
    #[must_use]
    pub fn with_index(&self, index: usize) -> Self {
        let mut next = self.0.clone();
        next.push(PathChunk::Index(index));
        Self(next)
    }

    /// Return a copy of this pointer with a static keyword segment appended.
    #[must_use]
    pub fn with_keyword(&self, keyword: &'static str) -> Self {
        let mut next = self.0.clone();
        next.push(PathChunk::Keyword(keyword));
        Self(next)
    }

    /// The last segment, if any.
    #[must_use]
    pub fn last(&self) -> Option<&PathChunk> {
        self.0.last()
    }

    /// Iterate over the segments in order.
    pub fn iter(&self) -> std::slice::Iter<'_, PathChunk> {
        self.0.iter()
    }

    /// True if this is the root pointer.
    #[must_use]
    pub fn is_root(&self) -> bool {
        self.0.is_empty()
    }

    /// Resolve this pointer against a `serde_json::Value`, returning the pointed-to value.
    #[must_use]
    pub fn resolve<'v>(&self, root: &'v serde_json::Value) -> Option<&'v serde_json::Value> {
        let mut current = root;
        for chunk in &self.0 {
            current = match chunk {
                PathChunk::Key(key) => current.as_object()?.get(key)?,
                PathChunk::Index(index) => current.as_array()?.get(*index)?,
                PathChunk::Keyword(keyword) => current.as_object()?.get(*keyword)?,
            };
        }
        Some(current)
    }
}

impl fmt::Display for Pointer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for chunk in &self.0 {
            f.write_str("/")?;
            match chunk {
                PathChunk::Key(key) => {
                    f.write_str(&key.replace('~', "~0").replace('/', "~1"))?;
                }
                PathChunk::Index(index) => write!(f, "{index}")?,
                PathChunk::Keyword(keyword) => f.write_str(keyword)?,
            }
        }
        Ok(())
    }
}

impl FromIterator<PathChunk> for Pointer {
    fn from_iter<T: IntoIterator<Item = PathChunk>>(iter: T) -> Self {
        Self(iter.into_iter().collect())
    }
}
