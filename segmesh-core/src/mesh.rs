//! Mesh input abstractions consumed by the segmenter.
//!
//! The segmenter never owns or mutates geometry. Callers expose triangles and
//! vertices through [`MeshSource`]; [`crate::IndexedMesh`] is the owned,
//! validated implementation used by the CLI and tests.

use std::fmt;

use nalgebra::Point3;

use crate::error::MeshError;

macro_rules! define_id {
    ($(#[$meta:meta])* $name:ident($inner:ty)) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Default)]
        pub struct $name($inner);

        impl $name {
            #[doc = concat!("Creates a new [`", stringify!($name), "`].")]
            #[rustfmt::skip]
            #[must_use]
            pub const fn new(id: $inner) -> Self { Self(id) }

            /// Returns the underlying numeric identifier.
            #[rustfmt::skip]
            #[must_use]
            pub const fn get(self) -> $inner { self.0 }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                fmt::Display::fmt(&self.0, f)
            }
        }
    };
}

define_id! {
    /// Caller-stable identifier of an input triangle.
    ///
    /// # Examples
    /// ```
    /// use segmesh_core::TriangleId;
    ///
    /// let id = TriangleId::new(7);
    /// assert_eq!(id.get(), 7);
    /// ```
    TriangleId(u64)
}

define_id! {
    /// Index of a vertex within a [`MeshSource`].
    VertexId(u32)
}

define_id! {
    /// Identifier of a vertex group (a named weight channel).
    GroupId(u32)
}

define_id! {
    /// Material slot assigned to a triangle.
    MaterialIndex(u32)
}

impl VertexId {
    pub(crate) fn index(self) -> usize {
        self.0 as usize
    }
}

/// Sharp/seam markings carried by a triangle edge.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct EdgeFlags {
    sharp: bool,
    seam: bool,
}

impl EdgeFlags {
    /// An unmarked, smooth edge.
    pub const SMOOTH: Self = Self::new(false, false);

    /// Creates flags from explicit sharp and seam markings.
    #[must_use]
    pub const fn new(sharp: bool, seam: bool) -> Self {
        Self { sharp, seam }
    }

    /// Returns `true` when the edge is marked as non-smooth.
    #[rustfmt::skip]
    #[must_use]
    pub const fn sharp(self) -> bool { self.sharp }

    /// Returns `true` when the edge is marked as a UV seam.
    #[rustfmt::skip]
    #[must_use]
    pub const fn seam(self) -> bool { self.seam }

    /// Combines the markings seen from both sides of a shared edge.
    #[must_use]
    pub const fn union(self, other: Self) -> Self {
        Self::new(self.sharp || other.sharp, self.seam || other.seam)
    }
}

/// A mesh vertex: position plus ordered vertex-group weights.
///
/// Weight order is significant: when two groups accumulate the same weight on
/// a triangle, the one seen first wins the heaviest-group comparison.
///
/// # Examples
/// ```
/// use nalgebra::Point3;
/// use segmesh_core::{GroupId, Vertex};
///
/// let vertex = Vertex::new(Point3::new(0.0, 1.0, 0.0))
///     .with_weight(GroupId::new(2), 0.75);
/// assert_eq!(vertex.weights(), &[(GroupId::new(2), 0.75)]);
/// ```
#[derive(Debug, Clone, PartialEq)]
pub struct Vertex {
    position: Point3<f64>,
    weights: Vec<(GroupId, f64)>,
}

impl Vertex {
    /// Creates a vertex at `position` without any group weights.
    #[must_use]
    pub const fn new(position: Point3<f64>) -> Self {
        Self {
            position,
            weights: Vec::new(),
        }
    }

    /// Appends a group weight, replacing an earlier entry for the same group.
    #[must_use]
    pub fn with_weight(mut self, group: GroupId, weight: f64) -> Self {
        if let Some(entry) = self.weights.iter_mut().find(|(id, _)| *id == group) {
            entry.1 = weight;
        } else {
            self.weights.push((group, weight));
        }
        self
    }

    /// Returns the vertex position.
    #[must_use]
    pub const fn position(&self) -> &Point3<f64> {
        &self.position
    }

    /// Returns the group weights in insertion order.
    #[must_use]
    pub fn weights(&self) -> &[(GroupId, f64)] {
        &self.weights
    }
}

/// An input triangle.
///
/// Edge `i` runs from corner `i` to corner `(i + 1) % 3`; the corner not on
/// edge `i` is its far vertex.
///
/// # Examples
/// ```
/// use segmesh_core::{EdgeFlags, MaterialIndex, Triangle, TriangleId, VertexId};
///
/// let tri = Triangle::new(TriangleId::new(1), [VertexId::new(0), VertexId::new(1), VertexId::new(2)])
///     .with_material(MaterialIndex::new(3))
///     .with_edge_flags(1, EdgeFlags::new(true, false));
/// assert!(tri.selected());
/// assert_eq!(tri.edge(1), (VertexId::new(1), VertexId::new(2)));
/// assert_eq!(tri.far_vertex(1), VertexId::new(0));
/// assert!(tri.edge_flags(1).sharp());
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Triangle {
    id: TriangleId,
    vertices: [VertexId; 3],
    selected: bool,
    material: MaterialIndex,
    edge_flags: [EdgeFlags; 3],
}

impl Triangle {
    /// Creates a selected triangle with material `0` and smooth edges.
    #[must_use]
    pub const fn new(id: TriangleId, vertices: [VertexId; 3]) -> Self {
        Self {
            id,
            vertices,
            selected: true,
            material: MaterialIndex::new(0),
            edge_flags: [EdgeFlags::SMOOTH; 3],
        }
    }

    /// Overrides the selection flag.
    #[must_use]
    pub const fn with_selected(mut self, selected: bool) -> Self {
        self.selected = selected;
        self
    }

    /// Overrides the material slot.
    #[must_use]
    pub const fn with_material(mut self, material: MaterialIndex) -> Self {
        self.material = material;
        self
    }

    /// Sets the markings of edge `edge % 3`.
    #[must_use]
    pub fn with_edge_flags(mut self, edge: usize, flags: EdgeFlags) -> Self {
        if let Some(slot) = self.edge_flags.get_mut(edge % 3) {
            *slot = flags;
        }
        self
    }

    /// Returns the triangle identifier.
    #[rustfmt::skip]
    #[must_use]
    pub const fn id(&self) -> TriangleId { self.id }

    /// Returns the three corner vertices.
    #[rustfmt::skip]
    #[must_use]
    pub const fn vertices(&self) -> [VertexId; 3] { self.vertices }

    /// Returns whether the triangle takes part in segmentation.
    #[rustfmt::skip]
    #[must_use]
    pub const fn selected(&self) -> bool { self.selected }

    /// Returns the material slot.
    #[rustfmt::skip]
    #[must_use]
    pub const fn material(&self) -> MaterialIndex { self.material }

    /// Returns the endpoints of edge `edge % 3`.
    #[must_use]
    pub const fn edge(&self, edge: usize) -> (VertexId, VertexId) {
        let [a, b, c] = self.vertices;
        match edge % 3 {
            0 => (a, b),
            1 => (b, c),
            _ => (c, a),
        }
    }

    /// Returns the corner opposite edge `edge % 3`.
    #[must_use]
    pub const fn far_vertex(&self, edge: usize) -> VertexId {
        let [a, b, c] = self.vertices;
        match edge % 3 {
            0 => c,
            1 => a,
            _ => b,
        }
    }

    /// Returns the markings of edge `edge % 3`.
    #[must_use]
    pub const fn edge_flags(&self, edge: usize) -> EdgeFlags {
        let [e0, e1, e2] = self.edge_flags;
        match edge % 3 {
            0 => e0,
            1 => e1,
            _ => e2,
        }
    }

    pub(crate) const fn is_degenerate(&self) -> bool {
        let [a, b, c] = self.vertices;
        a.get() == b.get() || b.get() == c.get() || c.get() == a.get()
    }
}

/// Abstraction over a triangle mesh that can be segmented.
///
/// Implementations must be fully materialised: the segmenter performs no I/O
/// and may look up the same vertex many times.
///
/// # Examples
/// ```
/// use nalgebra::Point3;
/// use segmesh_core::{MeshError, MeshSource, Triangle, TriangleId, Vertex, VertexId};
///
/// struct Single {
///     vertices: Vec<Vertex>,
///     triangles: Vec<Triangle>,
/// }
///
/// impl MeshSource for Single {
///     fn name(&self) -> &str { "single" }
///     fn triangles(&self) -> &[Triangle] { &self.triangles }
///     fn vertex_count(&self) -> usize { self.vertices.len() }
///     fn vertex(&self, id: VertexId) -> Result<&Vertex, MeshError> {
///         self.vertices
///             .get(id.get() as usize)
///             .ok_or(MeshError::OutOfBounds { vertex: id })
///     }
/// }
///
/// let mesh = Single {
///     vertices: vec![
///         Vertex::new(Point3::new(0.0, 0.0, 0.0)),
///         Vertex::new(Point3::new(1.0, 0.0, 0.0)),
///         Vertex::new(Point3::new(0.0, 1.0, 0.0)),
///     ],
///     triangles: vec![Triangle::new(
///         TriangleId::new(0),
///         [VertexId::new(0), VertexId::new(1), VertexId::new(2)],
///     )],
/// };
/// assert_eq!(mesh.selected_count(), 1);
/// assert!(mesh.vertex(VertexId::new(3)).is_err());
/// ```
pub trait MeshSource {
    /// Returns a human-readable name used in diagnostics.
    fn name(&self) -> &str;

    /// Returns every triangle of the mesh, selected or not.
    fn triangles(&self) -> &[Triangle];

    /// Returns the number of vertices addressable through [`Self::vertex`].
    fn vertex_count(&self) -> usize;

    /// Resolves a vertex.
    ///
    /// # Errors
    /// Implementations must return [`MeshError::OutOfBounds`] for ids that do
    /// not exist.
    fn vertex(&self, id: VertexId) -> Result<&Vertex, MeshError>;

    /// Counts the triangles whose selection flag is set.
    #[must_use]
    fn selected_count(&self) -> usize {
        self.triangles().iter().filter(|tri| tri.selected()).count()
    }
}

impl<M: MeshSource + ?Sized> MeshSource for &M {
    fn name(&self) -> &str {
        (**self).name()
    }

    fn triangles(&self) -> &[Triangle] {
        (**self).triangles()
    }

    fn vertex_count(&self) -> usize {
        (**self).vertex_count()
    }

    fn vertex(&self, id: VertexId) -> Result<&Vertex, MeshError> {
        (**self).vertex(id)
    }
}
