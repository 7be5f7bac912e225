//! Storage addresses of nodes inside a dataset, e.g. `profiles_1d[2]/ion`.

use std::{fmt, str::FromStr, sync::Arc};

use idsview_common::{Result, error::Error};

/// One step of a [`NodePath`]: a field name, optionally followed by an
/// element index when the field is a structure array.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct PathSegment {
    pub name: Arc<str>,
    pub index: Option<usize>,
}

impl fmt::Display for PathSegment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.index {
            Some(index) => write!(f, "{}[{index}]", self.name),
            None => f.write_str(&self.name),
        }
    }
}

/// The address a record or a structure array was read from.
///
/// Paths are immutable; [`NodePath::child`] and [`NodePath::element`] return
/// new paths.
#[derive(Clone, PartialEq, Eq, Hash)]
pub struct NodePath(Arc<[PathSegment]>);

impl NodePath {
    pub fn root() -> NodePath {
        NodePath(Arc::from([]))
    }

    /// A path with a single field segment.
    pub fn new(name: &str) -> NodePath {
        NodePath::root().child(name)
    }

    pub fn is_root(&self) -> bool {
        self.0.is_empty()
    }

    pub fn segments(&self) -> &[PathSegment] {
        &self.0
    }

    pub fn last(&self) -> Option<&PathSegment> {
        self.0.last()
    }

    /// Appends a field segment.
    pub fn child(&self, name: &str) -> NodePath {
        let mut segments = self.0.to_vec();
        segments.push(PathSegment {
            name: Arc::from(name),
            index: None,
        });
        NodePath(segments.into())
    }

    /// Addresses element `index` of the structure array this path points to.
    ///
    /// Replaces any index already present on the last segment.
    pub fn element(&self, index: usize) -> NodePath {
        let mut segments = self.0.to_vec();
        if let Some(last) = segments.last_mut() {
            last.index = Some(index);
        }
        NodePath(segments.into())
    }

    /// The path without the index of the last segment, if any.
    pub fn array(&self) -> NodePath {
        let mut segments = self.0.to_vec();
        if let Some(last) = segments.last_mut() {
            last.index = None;
        }
        NodePath(segments.into())
    }

    pub fn parent(&self) -> Option<NodePath> {
        let (_, init) = self.0.split_last()?;
        Some(NodePath(init.into()))
    }
}

impl fmt::Display for NodePath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, segment) in self.0.iter().enumerate() {
            if i > 0 {
                f.write_str("/")?;
            }
            write!(f, "{segment}")?;
        }
        Ok(())
    }
}

impl fmt::Debug for NodePath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "NodePath({self})")
    }
}

impl FromStr for NodePath {
    type Err = Error;

    /// Parses `a/b[3]/c`. An empty string is the root path.
    fn from_str(s: &str) -> Result<NodePath> {
        if s.is_empty() {
            return Ok(NodePath::root());
        }
        s.split('/')
            .map(parse_segment)
            .collect::<Result<Vec<_>>>()
            .map(|segments| NodePath(segments.into()))
            .map_err(|_| Error::invalid_arg("path", format!("malformed node path {s:?}")))
    }
}

fn parse_segment(s: &str) -> Result<PathSegment> {
    let (name, index) = match s.split_once('[') {
        Some((name, rest)) => {
            let index = rest
                .strip_suffix(']')
                .and_then(|digits| digits.parse::<usize>().ok())
                .ok_or_else(|| Error::invalid_arg("path", s))?;
            (name, Some(index))
        }
        None => (s, None),
    };
    let valid = !name.is_empty()
        && name
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '_');
    if !valid {
        return Err(Error::invalid_arg("path", s));
    }
    Ok(PathSegment {
        name: Arc::from(name),
        index,
    })
}
