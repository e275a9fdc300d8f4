//! Property path resolution
//!
//! Turns a dotted property chain such as `Customer.Address.City` into the
//! ordered list of property descriptors it walks through, validating each
//! step against the static shape of the type reached so far.

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::errors::{QueryError, Result};
use crate::model::{FieldType, PropertyInfo, TypeInfo};

/// Default maximum number of segments in a dotted path
pub const DEFAULT_MAX_PATH_DEPTH: usize = 8;

/// How path segments are matched against declared property names
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PathMatching {
    #[default]
    CaseInsensitive,
    Exact,
}

/// Resolved dotted path against a root type
///
/// Segments hold the canonical declared names, so `customer.address.city`
/// resolves to a path whose text is `Customer.Address.City`.
#[derive(Clone, PartialEq, Eq, Hash)]
pub struct PropertyPath {
    root: &'static TypeInfo,
    segments: Vec<&'static PropertyInfo>,
}

impl PropertyPath {
    /// Resolve with default settings (case-insensitive, default depth)
    ///
    /// # Errors
    ///
    /// See [`PathResolver::resolve`].
    pub fn resolve(root: &'static TypeInfo, path: &str) -> Result<Self> {
        PathResolver::default().resolve(root, path)
    }

    pub fn root(&self) -> &'static TypeInfo {
        self.root
    }

    pub fn segments(&self) -> &[&'static PropertyInfo] {
        &self.segments
    }

    /// Final property in the chain
    pub fn leaf(&self) -> &'static PropertyInfo {
        // Non-empty by construction
        self.segments[self.segments.len() - 1]
    }

    pub fn leaf_type(&self) -> FieldType {
        self.leaf().field_type
    }

    pub fn len(&self) -> usize {
        self.segments.len()
    }

    pub fn is_empty(&self) -> bool {
        self.segments.is_empty()
    }

    /// Canonical dotted text
    pub fn text(&self) -> String {
        self.segments
            .iter()
            .map(|p| p.name)
            .collect::<Vec<_>>()
            .join(".")
    }
}

impl fmt::Display for PropertyPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.text())
    }
}

impl fmt::Debug for PropertyPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "PropertyPath({}: {})", self.root.name, self.text())
    }
}

/// Resolver settings
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PathResolver {
    pub matching: PathMatching,
    pub max_depth: usize,
}

impl Default for PathResolver {
    fn default() -> Self {
        Self {
            matching: PathMatching::default(),
            max_depth: DEFAULT_MAX_PATH_DEPTH,
        }
    }
}

impl PathResolver {
    pub fn new(matching: PathMatching, max_depth: usize) -> Self {
        Self {
            matching,
            max_depth,
        }
    }

    /// Resolve `path` against `root`
    ///
    /// # Errors
    ///
    /// - `NullDescriptor` if the path is blank
    /// - `PathTooDeep` if it has more segments than `max_depth`
    /// - `UnknownProperty` naming the first segment that does not resolve,
    ///   including segments that try to step into a scalar
    pub fn resolve(&self, root: &'static TypeInfo, path: &str) -> Result<PropertyPath> {
        if path.trim().is_empty() {
            return Err(QueryError::null_descriptor(format!(
                "property path is empty for type {}",
                root.name
            )));
        }

        let raw_segments: Vec<&str> = path.split('.').collect();
        if raw_segments.len() > self.max_depth {
            return Err(QueryError::PathTooDeep {
                path: path.to_string(),
                max_depth: self.max_depth,
            });
        }

        let mut segments = Vec::with_capacity(raw_segments.len());
        let mut current: Option<&'static TypeInfo> = Some(root);
        let mut current_name = root.name;

        for raw in raw_segments {
            let segment = raw.trim();
            let found = current.and_then(|info| self.lookup(info, segment));
            let property = found.ok_or_else(|| QueryError::UnknownProperty {
                path: path.to_string(),
                type_name: current_name.to_string(),
                segment: segment.to_string(),
            })?;

            segments.push(property);
            current = property.field_type.kind.object_type();
            current_name = property.field_type.kind.name();
        }

        Ok(PropertyPath { root, segments })
    }

    fn lookup(&self, info: &'static TypeInfo, segment: &str) -> Option<&'static PropertyInfo> {
        if segment.is_empty() {
            return None;
        }
        match self.matching {
            PathMatching::CaseInsensitive => info.property_ignore_case(segment),
            PathMatching::Exact => info.property(segment),
        }
    }
}
