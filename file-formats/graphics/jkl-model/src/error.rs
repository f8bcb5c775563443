use std::fmt;
use std::io;
use thiserror::Error;

/// Identifies the record a decoding or validation error refers to
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RecordLocation {
    /// The leading mesh count
    MeshTable,
    /// A mesh header (vertex and index counts)
    Mesh { mesh: usize },
    /// A vertex record inside a mesh
    Vertex { mesh: usize, vertex: usize },
    /// An index record inside a mesh
    Index { mesh: usize, index: usize },
    /// Duration, ticks per second, bone and node counts
    ClipHeader,
    /// A bone record
    Bone { bone: usize },
    /// A hierarchy node record
    Node { node: usize },
    /// The five table counts of a static mesh
    StaticHeader,
    /// An entry of one of the static mesh attribute tables
    StaticEntry { table: &'static str, index: usize },
    /// A static mesh triangle record
    Triangle { triangle: usize },
    /// A static mesh material record
    Material { material: usize },
}

impl fmt::Display for RecordLocation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::MeshTable => write!(f, "mesh table"),
            Self::Mesh { mesh } => write!(f, "mesh #{mesh}"),
            Self::Vertex { mesh, vertex } => write!(f, "mesh #{mesh} vertex #{vertex}"),
            Self::Index { mesh, index } => write!(f, "mesh #{mesh} index #{index}"),
            Self::ClipHeader => write!(f, "clip header"),
            Self::Bone { bone } => write!(f, "bone record #{bone}"),
            Self::Node { node } => write!(f, "node record #{node}"),
            Self::StaticHeader => write!(f, "static mesh header"),
            Self::StaticEntry { table, index } => write!(f, "{table} entry #{index}"),
            Self::Triangle { triangle } => write!(f, "triangle #{triangle}"),
            Self::Material { material } => write!(f, "material #{material}"),
        }
    }
}

/// Error types for JKL model parsing and animation setup
#[derive(Error, Debug)]
pub enum JklError {
    /// I/O error other than a premature end of stream
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    /// The stream ended early, or a field is inconsistent with the data around it
    #[error("Format error in {location}: {reason}")]
    Format {
        location: RecordLocation,
        reason: String,
    },

    /// A node or vertex references a bone id that the bone table does not define
    #[error("Missing bone in {location}: bone id {bone_id} is not in the bone table")]
    MissingBone {
        location: RecordLocation,
        bone_id: i32,
    },

    /// Following child links from this node leads back to itself
    #[error("Hierarchy cycle detected through node #{node}")]
    HierarchyCycle { node: usize },

    /// The node graph is acyclic but is not a tree rooted at node 0
    #[error("Invalid hierarchy at node #{node}: {reason}")]
    InvalidHierarchy { node: usize, reason: String },

    /// Lint findings promoted to an error
    #[error("Validation error: {0}")]
    Validation(String),
}

impl JklError {
    /// Shorthand for a [`JklError::Format`] error
    pub fn format(location: RecordLocation, reason: impl Into<String>) -> Self {
        Self::Format {
            location,
            reason: reason.into(),
        }
    }

    /// The record this error refers to, when it names one
    pub fn location(&self) -> Option<RecordLocation> {
        match self {
            Self::Format { location, .. } | Self::MissingBone { location, .. } => Some(*location),
            Self::HierarchyCycle { node } | Self::InvalidHierarchy { node, .. } => {
                Some(RecordLocation::Node { node: *node })
            }
            Self::Io(_) | Self::Validation(_) => None,
        }
    }
}

/// Result type using JklError
pub type Result<T> = std::result::Result<T, JklError>;
