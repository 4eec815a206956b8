//! GLSL value types and qualifiers used by declarations.

use std::fmt;

/// GLSL variable type.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum VariableType {
    Void,
    Float,
    Double,
    Int,
    UInt,
    Bool,
    Vec2,
    Vec3,
    Vec4,
    DVec2,
    DVec3,
    DVec4,
    IVec2,
    IVec3,
    IVec4,
    UVec2,
    UVec3,
    UVec4,
    BVec2,
    BVec3,
    BVec4,
    Mat2,
    Mat3,
    Mat4,
    Mat2x3,
    Mat2x4,
    Mat3x2,
    Mat3x4,
    Mat4x2,
    Mat4x3,
    DMat2,
    DMat3,
    DMat4,
    Sampler1D,
    Sampler2D,
    Sampler2DArray,
    Sampler3D,
    SamplerCube,
    SamplerCubeArray,
    Sampler2DShadow,
    SamplerCubeShadow,
    Sampler2DMS,
    SamplerBuffer,
    ISamplerBuffer,
    USamplerBuffer,
}

impl VariableType {
    /// GLSL keyword of the type.
    pub fn glsl_name(self) -> &'static str {
        match self {
            Self::Void => "void",
            Self::Float => "float",
            Self::Double => "double",
            Self::Int => "int",
            Self::UInt => "uint",
            Self::Bool => "bool",
            Self::Vec2 => "vec2",
            Self::Vec3 => "vec3",
            Self::Vec4 => "vec4",
            Self::DVec2 => "dvec2",
            Self::DVec3 => "dvec3",
            Self::DVec4 => "dvec4",
            Self::IVec2 => "ivec2",
            Self::IVec3 => "ivec3",
            Self::IVec4 => "ivec4",
            Self::UVec2 => "uvec2",
            Self::UVec3 => "uvec3",
            Self::UVec4 => "uvec4",
            Self::BVec2 => "bvec2",
            Self::BVec3 => "bvec3",
            Self::BVec4 => "bvec4",
            Self::Mat2 => "mat2",
            Self::Mat3 => "mat3",
            Self::Mat4 => "mat4",
            Self::Mat2x3 => "mat2x3",
            Self::Mat2x4 => "mat2x4",
            Self::Mat3x2 => "mat3x2",
            Self::Mat3x4 => "mat3x4",
            Self::Mat4x2 => "mat4x2",
            Self::Mat4x3 => "mat4x3",
            Self::DMat2 => "dmat2",
            Self::DMat3 => "dmat3",
            Self::DMat4 => "dmat4",
            Self::Sampler1D => "sampler1D",
            Self::Sampler2D => "sampler2D",
            Self::Sampler2DArray => "sampler2DArray",
            Self::Sampler3D => "sampler3D",
            Self::SamplerCube => "samplerCube",
            Self::SamplerCubeArray => "samplerCubeArray",
            Self::Sampler2DShadow => "sampler2DShadow",
            Self::SamplerCubeShadow => "samplerCubeShadow",
            Self::Sampler2DMS => "sampler2DMS",
            Self::SamplerBuffer => "samplerBuffer",
            Self::ISamplerBuffer => "isamplerBuffer",
            Self::USamplerBuffer => "usamplerBuffer",
        }
    }

    /// Size in bytes of the type inside a std140 block.
    ///
    /// Three and four component vectors both occupy 16 bytes, matrices are
    /// stored as arrays of 16 byte columns. Opaque types have no size.
    pub fn bytes(self) -> u32 {
        match self {
            Self::Float | Self::Int | Self::UInt | Self::Bool => 4,
            Self::Double => 8,
            Self::Vec2 | Self::IVec2 | Self::UVec2 | Self::BVec2 => 8,
            Self::Vec3 | Self::Vec4 => 16,
            Self::IVec3 | Self::IVec4 | Self::UVec3 | Self::UVec4 => 16,
            Self::BVec3 | Self::BVec4 => 16,
            Self::DVec2 => 16,
            Self::DVec3 | Self::DVec4 => 32,
            Self::Mat2 => 16,
            Self::Mat3 => 48,
            Self::Mat4 => 64,
            Self::Mat2x3 | Self::Mat2x4 | Self::Mat3x2 | Self::Mat4x2 => 32,
            Self::Mat3x4 | Self::Mat4x3 => 48,
            Self::DMat2 => 32,
            Self::DMat3 => 96,
            Self::DMat4 => 128,
            _ => 0,
        }
    }

    /// Returns true for sampled image types usable in a sampler declaration.
    pub fn is_sampler(self) -> bool {
        matches!(
            self,
            Self::Sampler1D
                | Self::Sampler2D
                | Self::Sampler2DArray
                | Self::Sampler3D
                | Self::SamplerCube
                | Self::SamplerCubeArray
                | Self::Sampler2DShadow
                | Self::SamplerCubeShadow
                | Self::Sampler2DMS
        )
    }

    /// Returns true for buffer sampler types usable in a texel buffer
    /// declaration.
    pub fn is_texel_buffer(self) -> bool {
        matches!(
            self,
            Self::SamplerBuffer | Self::ISamplerBuffer | Self::USamplerBuffer
        )
    }

    /// Returns true for plain data types that can live in blocks and
    /// interfaces.
    pub fn is_data(self) -> bool {
        self != Self::Void && !self.is_sampler() && !self.is_texel_buffer()
    }

    /// Column type and column count of a matrix type.
    ///
    /// Matrices cross stage interfaces and vertex inputs as one vector per
    /// column.
    pub fn matrix_columns(self) -> Option<(Self, u32)> {
        match self {
            Self::Mat2 => Some((Self::Vec2, 2)),
            Self::Mat3 => Some((Self::Vec3, 3)),
            Self::Mat4 => Some((Self::Vec4, 4)),
            Self::Mat2x3 => Some((Self::Vec3, 2)),
            Self::Mat2x4 => Some((Self::Vec4, 2)),
            Self::Mat3x2 => Some((Self::Vec2, 3)),
            Self::Mat3x4 => Some((Self::Vec4, 3)),
            Self::Mat4x2 => Some((Self::Vec2, 4)),
            Self::Mat4x3 => Some((Self::Vec3, 4)),
            Self::DMat2 => Some((Self::DVec2, 2)),
            Self::DMat3 => Some((Self::DVec3, 3)),
            Self::DMat4 => Some((Self::DVec4, 4)),
            _ => None,
        }
    }
}

impl fmt::Display for VariableType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.glsl_name())
    }
}

/// Interpolation qualifier of stage interface variables.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum Interpolation {
    #[default]
    Smooth,
    Flat,
    NoPerspective,
}

impl Interpolation {
    pub fn glsl_name(self) -> &'static str {
        match self {
            Self::Smooth => "smooth",
            Self::Flat => "flat",
            Self::NoPerspective => "noperspective",
        }
    }
}

/// Memory layout qualifier of uniform and storage blocks.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum MemoryLayout {
    #[default]
    Std140,
    Std430,
    Shared,
    Packed,
}

impl MemoryLayout {
    pub fn glsl_name(self) -> &'static str {
        match self {
            Self::Std140 => "std140",
            Self::Std430 => "std430",
            Self::Shared => "shared",
            Self::Packed => "packed",
        }
    }
}

/// Primitive consumed by a geometry stage.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum InputPrimitiveType {
    Points,
    Lines,
    LinesAdjacency,
    Triangles,
    TrianglesAdjacency,
}

impl InputPrimitiveType {
    pub fn glsl_name(self) -> &'static str {
        match self {
            Self::Points => "points",
            Self::Lines => "lines",
            Self::LinesAdjacency => "lines_adjacency",
            Self::Triangles => "triangles",
            Self::TrianglesAdjacency => "triangles_adjacency",
        }
    }

    /// Number of vertices received per primitive.
    pub fn vertex_count(self) -> u32 {
        match self {
            Self::Points => 1,
            Self::Lines => 2,
            Self::LinesAdjacency => 4,
            Self::Triangles => 3,
            Self::TrianglesAdjacency => 6,
        }
    }
}

/// Primitive emitted by a geometry stage.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum OutputPrimitiveType {
    Points,
    LineStrip,
    TriangleStrip,
}

impl OutputPrimitiveType {
    pub fn glsl_name(self) -> &'static str {
        match self {
            Self::Points => "points",
            Self::LineStrip => "line_strip",
            Self::TriangleStrip => "triangle_strip",
        }
    }
}
