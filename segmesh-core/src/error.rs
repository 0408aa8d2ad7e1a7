//! Error types for the segmesh core library.
//!
//! Defines error enums exposed by the public API and a convenient result alias.

use std::{fmt, sync::Arc};

use thiserror::Error;

use crate::mesh::{GroupId, TriangleId, VertexId};

macro_rules! define_error_codes {
    (
        $(#[$enum_meta:meta])*
        enum $CodeTy:ident for $ErrTy:ident {
            $(
                $(#[$variant_meta:meta])*
                $CodeVariant:ident => $ErrVariant:ident $( { $($pattern:tt)* } )? => $code:expr
            ),+ $(,)?
        }
    ) => {
        $(#[$enum_meta])*
        #[derive(Clone, Copy, Debug, Eq, Hash, PartialEq)]
        #[non_exhaustive]
        pub enum $CodeTy {
            $(
                $(#[$variant_meta])*
                $CodeVariant,
            )+
        }

        impl $CodeTy {
            /// Return the stable machine-readable representation of this error code.
            #[must_use]
            pub const fn as_str(self) -> &'static str {
                match self {
                    $(Self::$CodeVariant => $code,)+
                }
            }
        }

        impl fmt::Display for $CodeTy {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(self.as_str())
            }
        }

        impl $ErrTy {
            #[doc = concat!(
                "Retrieve the stable [`",
                stringify!($CodeTy),
                "`] for this error."
            )]
            #[must_use]
            pub const fn code(&self) -> $CodeTy {
                match self {
                    $(Self::$ErrVariant $( { $($pattern)* } )? => $CodeTy::$CodeVariant,)+
                }
            }
        }
    };
}

/// An error produced while reading a [`crate::MeshSource`].
///
/// These are contract violations on caller-supplied geometry. They are never
/// retried.
#[non_exhaustive]
#[derive(Clone, Debug, Eq, Error, PartialEq)]
pub enum MeshError {
    /// A triangle referenced a vertex that the mesh does not contain.
    #[error("triangle {triangle} references vertex {vertex}, but the mesh has {vertex_count} vertices")]
    UnknownVertex {
        /// Triangle holding the dangling reference.
        triangle: TriangleId,
        /// Vertex id that could not be resolved.
        vertex: VertexId,
        /// Number of vertices available in the mesh.
        vertex_count: usize,
    },
    /// A vertex lookup fell outside the vertex table.
    #[error("vertex {vertex} is out of bounds")]
    OutOfBounds {
        /// The requested vertex.
        vertex: VertexId,
    },
    /// Two triangles share the same identifier.
    #[error("triangle id {triangle} appears more than once")]
    DuplicateTriangle {
        /// The repeated identifier.
        triangle: TriangleId,
    },
    /// A triangle uses the same vertex for more than one corner.
    #[error("triangle {triangle} repeats a vertex and has no area")]
    DegenerateTriangle {
        /// The offending triangle.
        triangle: TriangleId,
    },
    /// A vertex position contained NaN or an infinity.
    #[error("vertex {vertex} has a non-finite position")]
    NonFinitePosition {
        /// The offending vertex.
        vertex: VertexId,
    },
    /// A vertex-group weight contained NaN or an infinity.
    #[error("vertex {vertex} has a non-finite weight for group {group}")]
    NonFiniteWeight {
        /// The offending vertex.
        vertex: VertexId,
        /// Group whose weight was invalid.
        group: GroupId,
    },
}

define_error_codes! {
    /// Stable codes describing [`MeshError`] variants.
    enum MeshErrorCode for MeshError {
        /// A triangle referenced a vertex that the mesh does not contain.
        UnknownVertex => UnknownVertex { .. } => "MESH_UNKNOWN_VERTEX",
        /// A vertex lookup fell outside the vertex table.
        OutOfBounds => OutOfBounds { .. } => "MESH_OUT_OF_BOUNDS",
        /// Two triangles share the same identifier.
        DuplicateTriangle => DuplicateTriangle { .. } => "MESH_DUPLICATE_TRIANGLE",
        /// A triangle uses the same vertex for more than one corner.
        DegenerateTriangle => DegenerateTriangle { .. } => "MESH_DEGENERATE_TRIANGLE",
        /// A vertex position contained NaN or an infinity.
        NonFinitePosition => NonFinitePosition { .. } => "MESH_NON_FINITE_POSITION",
        /// A vertex-group weight contained NaN or an infinity.
        NonFiniteWeight => NonFiniteWeight { .. } => "MESH_NON_FINITE_WEIGHT",
    }
}

/// Error type produced when configuring or running [`crate::Segmenter`].
#[non_exhaustive]
#[derive(Clone, Debug, Error, PartialEq)]
pub enum SegmentationError {
    /// A numeric parameter was NaN, negative, or otherwise out of range.
    #[error("parameter `{name}` must be {expected} (got {got})")]
    InvalidParameter {
        /// Name of the rejected parameter.
        name: &'static str,
        /// Human-readable description of the accepted range.
        expected: &'static str,
        /// The rejected value.
        got: f64,
    },
    /// The merge budget was set to zero.
    #[error("max_merges must be at least 1 (got {got})")]
    InvalidMaxMerges {
        /// The rejected budget.
        got: usize,
    },
    /// The mesh source violated its contract while building the graph.
    #[error("mesh `{mesh}` is invalid: {error}")]
    Mesh {
        /// Name reported by the mesh source.
        mesh: Arc<str>,
        #[source]
        /// Underlying mesh error.
        error: MeshError,
    },
}

define_error_codes! {
    /// Stable codes describing [`SegmentationError`] variants.
    enum SegmentationErrorCode for SegmentationError {
        /// A numeric parameter was out of range.
        InvalidParameter => InvalidParameter { .. } => "SEGMESH_INVALID_PARAMETER",
        /// The merge budget was set to zero.
        InvalidMaxMerges => InvalidMaxMerges { .. } => "SEGMESH_INVALID_MAX_MERGES",
        /// The mesh source violated its contract.
        InvalidMesh => Mesh { .. } => "SEGMESH_INVALID_MESH",
    }
}

impl SegmentationError {
    /// Retrieve the inner [`MeshErrorCode`] when the error originated in a
    /// [`crate::MeshSource`].
    #[must_use]
    pub const fn mesh_code(&self) -> Option<MeshErrorCode> {
        match self {
            Self::Mesh { error, .. } => Some(error.code()),
            _ => None,
        }
    }
}

/// Convenient alias for results returned by the core API.
pub type Result<T> = core::result::Result<T, SegmentationError>;
