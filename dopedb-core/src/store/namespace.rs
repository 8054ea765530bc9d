/*
    namespace.rs - Namespace tree

    Namespaces are addressed by slash-delimited paths ("a/b/c") and form a
    tree rooted at the empty path. Nodes live in an arena owned by the
    registry; parent/child links are arena indices.
*/

use super::errors::PathError;
use super::StoreLimits;
use std::collections::BTreeMap;
use std::fmt;

/// Path segment delimiter
pub const PATH_DELIMITER: char = '/';

/// Parsed and validated namespace path. The root is the path with no segments.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Default)]
pub struct NamespacePath {
    segments: Vec<String>,
}

impl NamespacePath {
    /// The root namespace path
    pub fn root() -> Self {
        Self::default()
    }

    /// Parse a slash-delimited path. The empty string is the root; any
    /// other input must consist of non-empty segments.
    pub fn parse(input: &str) -> Result<Self, PathError> {
        if input.is_empty() {
            return Ok(Self::root());
        }

        let mut segments = Vec::new();
        for part in input.split(PATH_DELIMITER) {
            if part.is_empty() {
                return Err(PathError::EmptySegment(input.to_string()));
            }
            segments.push(part.to_string());
        }

        Ok(Self { segments })
    }

    /// Check the path against configured depth and segment length limits
    pub fn check_limits(&self, limits: &StoreLimits) -> Result<(), PathError> {
        if self.segments.len() > limits.max_namespace_depth {
            return Err(PathError::TooDeep {
                path: self.to_string(),
                max: limits.max_namespace_depth,
            });
        }
        if let Some(segment) =
            self.segments.iter().find(|s| s.len() > limits.max_segment_len)
        {
            return Err(PathError::SegmentTooLong {
                segment: segment.clone(),
                max: limits.max_segment_len,
            });
        }
        Ok(())
    }

    pub fn segments(&self) -> &[String] {
        &self.segments
    }

    pub fn is_root(&self) -> bool {
        self.segments.is_empty()
    }

    pub fn depth(&self) -> usize {
        self.segments.len()
    }
}

impl fmt::Display for NamespacePath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, segment) in self.segments.iter().enumerate() {
            if i > 0 {
                write!(f, "{}", PATH_DELIMITER)?;
            }
            f.write_str(segment)?;
        }
        Ok(())
    }
}

/// Index of a namespace node inside its registry
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NamespaceId(usize);

impl NamespaceId {
    pub const ROOT: NamespaceId = NamespaceId(0);

    pub fn index(&self) -> usize {
        self.0
    }
}

#[derive(Debug)]
struct NamespaceNode {
    name: String,
    parent: Option<NamespaceId>,
    children: BTreeMap<String, NamespaceId>,
    path: String,
}

/// Owner of the namespace tree
#[derive(Debug)]
pub struct NamespaceRegistry {
    nodes: Vec<NamespaceNode>,
}

impl NamespaceRegistry {
    /// Create a registry holding only the root namespace
    pub fn new() -> Self {
        Self {
            nodes: vec![NamespaceNode {
                name: String::new(),
                parent: None,
                children: BTreeMap::new(),
                path: String::new(),
            }],
        }
    }

    /// Create `path` and any missing ancestors.
    ///
    /// Returns the namespace id and how many nodes were newly created; zero
    /// means the namespace already existed.
    pub fn ensure(&mut self, path: &NamespacePath) -> (NamespaceId, usize) {
        let mut current = NamespaceId::ROOT;
        let mut created = 0;

        for segment in path.segments() {
            current = match self.nodes[current.0].children.get(segment) {
                Some(child) => *child,
                None => {
                    let child = NamespaceId(self.nodes.len());
                    let parent_path = &self.nodes[current.0].path;
                    let child_path = if parent_path.is_empty() {
                        segment.clone()
                    } else {
                        format!("{}{}{}", parent_path, PATH_DELIMITER, segment)
                    };
                    self.nodes.push(NamespaceNode {
                        name: segment.clone(),
                        parent: Some(current),
                        children: BTreeMap::new(),
                        path: child_path,
                    });
                    self.nodes[current.0].children.insert(segment.clone(), child);
                    created += 1;
                    child
                }
            };
        }

        (current, created)
    }

    /// Look up an existing namespace
    pub fn resolve(&self, path: &NamespacePath) -> Option<NamespaceId> {
        let mut current = NamespaceId::ROOT;
        for segment in path.segments() {
            current = *self.nodes[current.0].children.get(segment)?;
        }
        Some(current)
    }

    /// Canonical path of a namespace
    pub fn path_of(&self, id: NamespaceId) -> &str {
        &self.nodes[id.0].path
    }

    pub fn name_of(&self, id: NamespaceId) -> &str {
        &self.nodes[id.0].name
    }

    pub fn parent_of(&self, id: NamespaceId) -> Option<NamespaceId> {
        self.nodes[id.0].parent
    }

    /// Child segment names in sorted order
    pub fn children(&self, id: NamespaceId) -> impl Iterator<Item = &str> {
        self.nodes[id.0].children.keys().map(String::as_str)
    }

    /// Number of namespaces, root included
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    /// True once any namespace besides the root exists
    pub fn has_user_namespaces(&self) -> bool {
        self.nodes.len() > 1
    }
}

impl Default for NamespaceRegistry {
    fn default() -> Self {
        Self::new()
    }
}
