//! Materials as seen by program generation.
//!
//! A material contributes its uniform block, its descriptor set layout and
//! the stage code computing the fragment color. Renderers implement
//! [`MaterialInterface`] for their own material resources; [`BasicMaterial`]
//! covers flat colors, vertex colors and a single texture.

mod basic;

use std::fmt;

use opaline_core::geometry::GeometryInterface;

use crate::error::ProgramError;
use crate::layout::DescriptorSetLayoutDescriptor;
use crate::pipeline::BlendState;
use crate::shader::StageGenerator;
use crate::shader::declaration::UniformBlock;

pub use basic::{BasicMaterial, BasicTexture};

/// How a material's fragments combine with the render target.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum BlendingMode {
    /// Opaque, blending disabled.
    #[default]
    None,
    /// Alpha blending.
    Normal,
    Add,
    Multiply,
    Screen,
}

impl BlendingMode {
    /// Blend state of the color attachment, `None` when blending is off.
    pub fn blend_state(self) -> Option<BlendState> {
        match self {
            Self::None => None,
            Self::Normal => Some(BlendState::alpha_blending()),
            Self::Add => Some(BlendState::additive()),
            Self::Multiply => Some(BlendState::multiply()),
            Self::Screen => Some(BlendState::screen()),
        }
    }

    pub fn is_enabled(self) -> bool {
        self != Self::None
    }
}

impl fmt::Display for BlendingMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Debug::fmt(self, f)
    }
}

/// Material description consumed by program generators.
pub trait MaterialInterface: Send + Sync {
    /// Name used in logs and generated banners.
    fn name(&self) -> &str;

    /// Value identifying every material generating the same code.
    ///
    /// Two materials with the same key share their programs.
    fn program_key(&self) -> u64;

    /// Uniform block of the material at the given set and binding.
    fn uniform_block(&self, set: u32, binding: u32) -> UniformBlock;

    /// Layout of the material descriptor set.
    fn descriptor_set_layout(&self) -> DescriptorSetLayoutDescriptor;

    fn blending_mode(&self) -> BlendingMode {
        BlendingMode::None
    }

    /// Returns true if the material needs intermediate spaces (view
    /// position, normals...) in the vertex stage.
    fn is_complex(&self) -> bool {
        false
    }

    /// GLSL expression of the unlit fragment color.
    ///
    /// Only valid in a fragment stage prepared by
    /// [`MaterialInterface::generate_shader_code`].
    fn fragment_color(&self) -> String;

    /// Add the material declarations and code to a stage.
    ///
    /// Vertex stages request what the fragment stage reads; fragment
    /// stages read those values as stage inputs connected from the vertex
    /// stage and write `ssv_OutputFragment`.
    fn generate_shader_code(
        &self,
        generator: &mut StageGenerator,
        geometry: &dyn GeometryInterface,
    ) -> Result<(), ProgramError>;
}
