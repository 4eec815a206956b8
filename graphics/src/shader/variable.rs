//! Synthetic variables: engine-known values a vertex stage can compute on
//! request.

use std::fmt;
use std::str::FromStr;

use crate::error::ProgramError;

use super::attribute::VertexAttributeType;
use super::keys::{self, variable};
use super::types::VariableType;

/// Where a synthesized value must be visible.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum VariableScope {
    /// Computed and used inside `main` only.
    Local,
    /// Written to a stage output for the next stage.
    ToNextStage,
    /// Both usable inside `main` and exported.
    Both,
}

impl VariableScope {
    /// Combine two requests of the same variable.
    ///
    /// Different scopes widen to [`VariableScope::Both`]; scopes never
    /// narrow.
    pub fn widen(self, other: Self) -> Self {
        if self == other { self } else { Self::Both }
    }

    /// Returns true if the value must be usable inside `main`.
    pub fn is_local(self) -> bool {
        matches!(self, Self::Local | Self::Both)
    }

    /// Returns true if the value must reach the next stage.
    pub fn is_exported(self) -> bool {
        matches!(self, Self::ToNextStage | Self::Both)
    }
}

/// Value the vertex stage can synthesize.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SyntheticVariable {
    /// `gl_Position` in clip space.
    ClipSpacePosition,
    /// World space position written to `gl_Position`.
    WorldSpaceClipPosition,
    PositionWorldSpace,
    PositionViewSpace,
    PositionTextureSpace,
    Color,
    Primary2DTextureCoordinates,
    Primary3DTextureCoordinates,
    Secondary2DTextureCoordinates,
    Secondary3DTextureCoordinates,
    TangentWorldSpace,
    TangentViewSpace,
    BinormalWorldSpace,
    BinormalViewSpace,
    NormalWorldSpace,
    NormalViewSpace,
    WorldTbnMatrix,
    ViewTbnMatrix,
    WorldToTangentMatrix,
}

impl SyntheticVariable {
    /// Every requestable variable.
    pub const ALL: [SyntheticVariable; 19] = [
        Self::ClipSpacePosition,
        Self::WorldSpaceClipPosition,
        Self::PositionWorldSpace,
        Self::PositionViewSpace,
        Self::PositionTextureSpace,
        Self::Color,
        Self::Primary2DTextureCoordinates,
        Self::Primary3DTextureCoordinates,
        Self::Secondary2DTextureCoordinates,
        Self::Secondary3DTextureCoordinates,
        Self::TangentWorldSpace,
        Self::TangentViewSpace,
        Self::BinormalWorldSpace,
        Self::BinormalViewSpace,
        Self::NormalWorldSpace,
        Self::NormalViewSpace,
        Self::WorldTbnMatrix,
        Self::ViewTbnMatrix,
        Self::WorldToTangentMatrix,
    ];

    /// Engine name, as written in generated code.
    pub fn name(self) -> &'static str {
        match self {
            Self::ClipSpacePosition => variable::GL_POSITION,
            Self::WorldSpaceClipPosition => variable::GL_POSITION_WORLD_SPACE,
            Self::PositionWorldSpace => variable::POSITION_WORLD_SPACE,
            Self::PositionViewSpace => variable::POSITION_VIEW_SPACE,
            Self::PositionTextureSpace => variable::POSITION_TEXTURE_SPACE,
            Self::Color => variable::COLOR,
            Self::Primary2DTextureCoordinates => variable::PRIMARY_2D_TEXTURE_COORDINATES,
            Self::Primary3DTextureCoordinates => variable::PRIMARY_3D_TEXTURE_COORDINATES,
            Self::Secondary2DTextureCoordinates => variable::SECONDARY_2D_TEXTURE_COORDINATES,
            Self::Secondary3DTextureCoordinates => variable::SECONDARY_3D_TEXTURE_COORDINATES,
            Self::TangentWorldSpace => variable::TANGENT_WORLD_SPACE,
            Self::TangentViewSpace => variable::TANGENT_VIEW_SPACE,
            Self::BinormalWorldSpace => variable::BINORMAL_WORLD_SPACE,
            Self::BinormalViewSpace => variable::BINORMAL_VIEW_SPACE,
            Self::NormalWorldSpace => variable::NORMAL_WORLD_SPACE,
            Self::NormalViewSpace => variable::NORMAL_VIEW_SPACE,
            Self::WorldTbnMatrix => variable::WORLD_TBN_MATRIX,
            Self::ViewTbnMatrix => variable::VIEW_TBN_MATRIX,
            Self::WorldToTangentMatrix => variable::WORLD_TO_TANGENT,
        }
    }

    /// GLSL type of the variable.
    pub fn variable_type(self) -> VariableType {
        match self {
            Self::ClipSpacePosition
            | Self::WorldSpaceClipPosition
            | Self::PositionWorldSpace
            | Self::PositionViewSpace
            | Self::PositionTextureSpace
            | Self::Color => VariableType::Vec4,
            Self::Primary2DTextureCoordinates | Self::Secondary2DTextureCoordinates => {
                VariableType::Vec2
            }
            Self::Primary3DTextureCoordinates
            | Self::Secondary3DTextureCoordinates
            | Self::TangentWorldSpace
            | Self::TangentViewSpace
            | Self::BinormalWorldSpace
            | Self::BinormalViewSpace
            | Self::NormalWorldSpace
            | Self::NormalViewSpace => VariableType::Vec3,
            Self::WorldTbnMatrix | Self::ViewTbnMatrix | Self::WorldToTangentMatrix => {
                VariableType::Mat3
            }
        }
    }

    /// Fixed interface location when exported. Built-ins have none.
    pub fn location(self) -> Option<u32> {
        keys::shader_variable_location(self.name())
    }

    /// Variables that must be computed before this one, always requested
    /// as [`VariableScope::Local`].
    pub fn prerequisites(self) -> &'static [SyntheticVariable] {
        match self {
            Self::PositionTextureSpace => &[
                Self::PositionViewSpace,
                Self::TangentViewSpace,
                Self::BinormalViewSpace,
                Self::NormalViewSpace,
            ],
            _ => &[],
        }
    }

    /// Vertex attribute the variable is derived from, for variables that
    /// transform or forward a single attribute.
    pub fn source_attribute(self) -> Option<VertexAttributeType> {
        match self {
            Self::Color => Some(VertexAttributeType::Color),
            Self::Primary2DTextureCoordinates => {
                Some(VertexAttributeType::Primary2DTextureCoordinates)
            }
            Self::Primary3DTextureCoordinates => {
                Some(VertexAttributeType::Primary3DTextureCoordinates)
            }
            Self::Secondary2DTextureCoordinates => {
                Some(VertexAttributeType::Secondary2DTextureCoordinates)
            }
            Self::Secondary3DTextureCoordinates => {
                Some(VertexAttributeType::Secondary3DTextureCoordinates)
            }
            Self::TangentWorldSpace | Self::TangentViewSpace => Some(VertexAttributeType::Tangent),
            Self::BinormalWorldSpace | Self::BinormalViewSpace => {
                Some(VertexAttributeType::Binormal)
            }
            Self::NormalWorldSpace | Self::NormalViewSpace => Some(VertexAttributeType::Normal),
            _ => None,
        }
    }
}

impl fmt::Display for SyntheticVariable {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for SyntheticVariable {
    type Err = ProgramError;

    fn from_str(name: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|variable| variable.name() == name)
            .ok_or_else(|| ProgramError::UnknownVariable(name.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_scope_widening() {
        use VariableScope::*;

        assert_eq!(Local.widen(Local), Local);
        assert_eq!(ToNextStage.widen(ToNextStage), ToNextStage);
        assert_eq!(Local.widen(ToNextStage), Both);
        assert_eq!(Both.widen(Local), Both);
        assert_eq!(ToNextStage.widen(Both), Both);
    }

    #[test]
    fn test_parse_names() {
        for variable in SyntheticVariable::ALL {
            assert_eq!(variable.name().parse::<SyntheticVariable>(), Ok(variable));
        }
        assert_eq!(
            "ssv_ModelViewMatrix".parse::<SyntheticVariable>(),
            Err(ProgramError::UnknownVariable("ssv_ModelViewMatrix".to_string()))
        );
    }

    #[test]
    fn test_locations() {
        assert_eq!(SyntheticVariable::ClipSpacePosition.location(), None);
        assert_eq!(SyntheticVariable::PositionWorldSpace.location(), Some(0));
        assert_eq!(SyntheticVariable::Color.location(), Some(3));
        assert_eq!(SyntheticVariable::WorldToTangentMatrix.location(), Some(31));
    }

    #[test]
    fn test_texture_space_prerequisites() {
        let prerequisites = SyntheticVariable::PositionTextureSpace.prerequisites();
        assert_eq!(prerequisites.len(), 4);
        assert_eq!(prerequisites[0], SyntheticVariable::PositionViewSpace);
        assert!(SyntheticVariable::NormalViewSpace.prerequisites().is_empty());
    }
}
