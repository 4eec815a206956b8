//! GLSL stage synthesis.
//!
//! A stage is produced by a [`StageGenerator`]. The generator owns a
//! [`DeclarationRegistry`] holding every global declaration of the stage and
//! a [`SynthesisResolver`] that turns requests for engine-known values
//! (positions, normals, texture coordinates, TBN matrices...) into
//! statements and the declarations they depend on.
//!
//! ```ignore
//! use opaline_graphics::shader::{ShaderStage, StageGenerator, SyntheticVariable, VariableScope};
//!
//! let mut vertex = StageGenerator::new(ShaderStage::Vertex, "SceneVertexShader", &config, strategy, set_indexes);
//! vertex.request(SyntheticVariable::ClipSpacePosition, VariableScope::ToNextStage)?;
//! vertex.request(SyntheticVariable::NormalViewSpace, VariableScope::ToNextStage)?;
//! let source = vertex.generate_source_code()?;
//! ```

pub mod attribute;
pub mod compiler;
pub mod declaration;
pub mod generator;
pub mod keys;
pub mod registry;
pub mod resolver;
pub mod standard;
pub mod types;
pub mod variable;

use std::fmt;

use crate::layout::ShaderStageFlags;

pub use attribute::VertexAttributeType;
pub use declaration::{Declaration, DeclarationKind};
pub use generator::{CodeLocation, Shader, StageGenerator};
pub use registry::{DeclarationRegistry, DeclarationStats, Declared};
pub use resolver::{ModelMatrixStrategy, SynthesisResolver};
pub use types::{Interpolation, MemoryLayout, VariableType};
pub use variable::{SyntheticVariable, VariableScope};

/// Programmable stage of a graphics pipeline.
///
/// Variants are ordered as the stages execute.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum ShaderStage {
    Vertex,
    TessellationControl,
    TessellationEvaluation,
    Geometry,
    Fragment,
}

impl ShaderStage {
    /// All stages in execution order.
    pub const ALL: [ShaderStage; 5] = [
        Self::Vertex,
        Self::TessellationControl,
        Self::TessellationEvaluation,
        Self::Geometry,
        Self::Fragment,
    ];

    /// Name used in generated banners and logs.
    pub fn name(self) -> &'static str {
        match self {
            Self::Vertex => "VertexShader",
            Self::TessellationControl => "TessellationControlShader",
            Self::TessellationEvaluation => "TessellationEvaluationShader",
            Self::Geometry => "GeometryShader",
            Self::Fragment => "FragmentShader",
        }
    }

    /// Stage visibility flag of this stage.
    pub fn stage_flags(self) -> ShaderStageFlags {
        match self {
            Self::Vertex => ShaderStageFlags::VERTEX,
            Self::TessellationControl => ShaderStageFlags::TESSELLATION_CONTROL,
            Self::TessellationEvaluation => ShaderStageFlags::TESSELLATION_EVALUATION,
            Self::Geometry => ShaderStageFlags::GEOMETRY,
            Self::Fragment => ShaderStageFlags::FRAGMENT,
        }
    }

    /// Returns true for the two tessellation stages.
    pub fn is_tessellation(self) -> bool {
        matches!(
            self,
            Self::TessellationControl | Self::TessellationEvaluation
        )
    }
}

impl fmt::Display for ShaderStage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}
