//! Vertex attributes understood by generated vertex stages.

use std::fmt;

use opaline_core::geometry::GeometryFlags;

use super::keys;
use super::types::VariableType;

/// Engine-known vertex attribute.
///
/// Every attribute has a fixed name, type and location so that vertex
/// buffer formats can be derived from the attributes a vertex stage
/// declares.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum VertexAttributeType {
    Position,
    Tangent,
    Binormal,
    Normal,
    Color,
    Primary2DTextureCoordinates,
    Primary3DTextureCoordinates,
    Secondary2DTextureCoordinates,
    Secondary3DTextureCoordinates,
    Weights,
    /// Per-instance model matrix.
    ModelMatrix,
    /// Per-instance normal matrix in world space.
    NormalModelMatrix,
}

impl VertexAttributeType {
    /// Every attribute in location order.
    pub const ALL: [VertexAttributeType; 12] = [
        Self::Position,
        Self::Tangent,
        Self::Binormal,
        Self::Normal,
        Self::Color,
        Self::Primary2DTextureCoordinates,
        Self::Primary3DTextureCoordinates,
        Self::Secondary2DTextureCoordinates,
        Self::Secondary3DTextureCoordinates,
        Self::Weights,
        Self::ModelMatrix,
        Self::NormalModelMatrix,
    ];

    /// GLSL name of the attribute.
    pub fn name(self) -> &'static str {
        match self {
            Self::Position => keys::attribute::POSITION,
            Self::Tangent => keys::attribute::TANGENT,
            Self::Binormal => keys::attribute::BINORMAL,
            Self::Normal => keys::attribute::NORMAL,
            Self::Color => keys::attribute::COLOR,
            Self::Primary2DTextureCoordinates => keys::attribute::PRIMARY_2D_TEXTURE_COORDINATES,
            Self::Primary3DTextureCoordinates => keys::attribute::PRIMARY_3D_TEXTURE_COORDINATES,
            Self::Secondary2DTextureCoordinates => {
                keys::attribute::SECONDARY_2D_TEXTURE_COORDINATES
            }
            Self::Secondary3DTextureCoordinates => {
                keys::attribute::SECONDARY_3D_TEXTURE_COORDINATES
            }
            Self::Weights => keys::attribute::WEIGHTS,
            Self::ModelMatrix => keys::attribute::MODEL_MATRIX,
            Self::NormalModelMatrix => keys::attribute::NORMAL_MODEL_MATRIX,
        }
    }

    /// GLSL type of the attribute.
    pub fn variable_type(self) -> VariableType {
        match self {
            Self::Position | Self::Tangent | Self::Binormal | Self::Normal => VariableType::Vec3,
            Self::Color | Self::Weights => VariableType::Vec4,
            Self::Primary2DTextureCoordinates | Self::Secondary2DTextureCoordinates => {
                VariableType::Vec2
            }
            Self::Primary3DTextureCoordinates | Self::Secondary3DTextureCoordinates => {
                VariableType::Vec3
            }
            Self::ModelMatrix => VariableType::Mat4,
            Self::NormalModelMatrix => VariableType::Mat3,
        }
    }

    /// First input location of the attribute.
    pub fn location(self) -> u32 {
        match self {
            Self::Position => 0,
            Self::Tangent => 1,
            Self::Binormal => 2,
            Self::Normal => 3,
            Self::Color => 4,
            Self::Primary2DTextureCoordinates => 5,
            Self::Primary3DTextureCoordinates => 6,
            Self::Secondary2DTextureCoordinates => 7,
            Self::Secondary3DTextureCoordinates => 8,
            Self::Weights => 9,
            Self::ModelMatrix => 10,
            Self::NormalModelMatrix => 14,
        }
    }

    /// Number of consecutive locations the attribute occupies.
    ///
    /// Matrices are read one column per location.
    pub fn location_count(self) -> u32 {
        self.variable_type()
            .matrix_columns()
            .map_or(1, |(_, columns)| columns)
    }

    /// Returns true for attributes fed from a per-instance buffer.
    pub fn is_per_instance(self) -> bool {
        matches!(self, Self::ModelMatrix | Self::NormalModelMatrix)
    }

    /// Returns true if a geometry with these flags provides the attribute.
    ///
    /// Per-instance attributes never come from the geometry.
    pub fn is_provided_by(self, flags: GeometryFlags) -> bool {
        match self {
            Self::Position => true,
            Self::Tangent | Self::Binormal => flags.contains(GeometryFlags::TANGENT_SPACE),
            Self::Normal => flags.has_normals(),
            Self::Color => flags.contains(GeometryFlags::VERTEX_COLOR),
            Self::Primary2DTextureCoordinates => {
                flags.contains(GeometryFlags::PRIMARY_TEXTURE_COORDINATES_2D)
            }
            Self::Primary3DTextureCoordinates => {
                flags.contains(GeometryFlags::PRIMARY_TEXTURE_COORDINATES_3D)
            }
            Self::Secondary2DTextureCoordinates => {
                flags.contains(GeometryFlags::SECONDARY_TEXTURE_COORDINATES_2D)
            }
            Self::Secondary3DTextureCoordinates => {
                flags.contains(GeometryFlags::SECONDARY_TEXTURE_COORDINATES_3D)
            }
            Self::Weights => flags.contains(GeometryFlags::VERTEX_WEIGHTS),
            Self::ModelMatrix | Self::NormalModelMatrix => false,
        }
    }
}

impl fmt::Display for VertexAttributeType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}
