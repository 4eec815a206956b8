//! Geometry description consumed by program generation.
//!
//! Program generation never touches vertex data. It only needs to know which
//! attribute streams a geometry can feed and how its primitives are
//! assembled, so geometries are exposed through [`GeometryInterface`].

use bitflags::bitflags;

bitflags! {
    /// Vertex attribute streams available in a geometry.
    ///
    /// Positions are always present and have no flag.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
    pub struct GeometryFlags: u32 {
        /// Per-vertex normals.
        const NORMALS = 1 << 0;
        /// Per-vertex tangents and binormals (implies normals).
        const TANGENT_SPACE = 1 << 1;
        /// First set of 2D texture coordinates.
        const PRIMARY_TEXTURE_COORDINATES_2D = 1 << 2;
        /// First set of 3D texture coordinates.
        const PRIMARY_TEXTURE_COORDINATES_3D = 1 << 3;
        /// Second set of 2D texture coordinates.
        const SECONDARY_TEXTURE_COORDINATES_2D = 1 << 4;
        /// Second set of 3D texture coordinates.
        const SECONDARY_TEXTURE_COORDINATES_3D = 1 << 5;
        /// Per-vertex color.
        const VERTEX_COLOR = 1 << 6;
        /// Per-vertex blend weights.
        const VERTEX_WEIGHTS = 1 << 7;
    }
}

impl GeometryFlags {
    /// Returns true if the geometry provides normals, either directly or
    /// as part of a tangent space.
    pub fn has_normals(self) -> bool {
        self.intersects(Self::NORMALS | Self::TANGENT_SPACE)
    }
}

/// Primitive assembly mode of a geometry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum Topology {
    PointList,
    LineList,
    LineStrip,
    #[default]
    TriangleList,
    TriangleStrip,
    TriangleFan,
}

impl Topology {
    /// Number of vertices making up one primitive.
    pub fn vertices_per_primitive(self) -> u32 {
        match self {
            Self::PointList => 1,
            Self::LineList | Self::LineStrip => 2,
            Self::TriangleList | Self::TriangleStrip | Self::TriangleFan => 3,
        }
    }
}

/// Read-only view of a geometry used when generating a program.
pub trait GeometryInterface: Send + Sync {
    /// Identifier used in logs and cache keys.
    fn identifier(&self) -> &str;

    /// Primitive assembly mode.
    fn topology(&self) -> Topology;

    /// Attribute streams provided by the geometry.
    fn flags(&self) -> GeometryFlags;
}

/// Plain geometry description.
///
/// Used by renderers that only know the shape of the data they will
/// submit, and by tests.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct GeometryDescription {
    identifier: String,
    topology: Topology,
    flags: GeometryFlags,
}

impl GeometryDescription {
    /// Create a description with positions only.
    pub fn new(identifier: impl Into<String>, topology: Topology) -> Self {
        Self {
            identifier: identifier.into(),
            topology,
            flags: GeometryFlags::empty(),
        }
    }

    /// Set the available attribute streams.
    pub fn with_flags(mut self, flags: GeometryFlags) -> Self {
        self.flags = flags;
        self
    }
}

impl GeometryInterface for GeometryDescription {
    fn identifier(&self) -> &str {
        &self.identifier
    }

    fn topology(&self) -> Topology {
        self.topology
    }

    fn flags(&self) -> GeometryFlags {
        self.flags
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_tangent_space_implies_normals() {
        assert!(GeometryFlags::TANGENT_SPACE.has_normals());
        assert!(GeometryFlags::NORMALS.has_normals());
        assert!(!GeometryFlags::VERTEX_COLOR.has_normals());
    }

    #[test]
    fn test_description() {
        let geometry = GeometryDescription::new("cube", Topology::TriangleList)
            .with_flags(GeometryFlags::NORMALS | GeometryFlags::PRIMARY_TEXTURE_COORDINATES_2D);

        assert_eq!(geometry.identifier(), "cube");
        assert_eq!(geometry.topology().vertices_per_primitive(), 3);
        assert!(geometry.flags().contains(GeometryFlags::NORMALS));
    }
}
