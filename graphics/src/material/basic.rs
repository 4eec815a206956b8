//! Unlit material: flat color, vertex colors and an optional texture.

use std::collections::hash_map::DefaultHasher;
use std::hash::{Hash, Hasher};

use opaline_core::geometry::GeometryInterface;

use crate::error::ProgramError;
use crate::layout::{DescriptorSetLayoutDescriptor, ShaderStageFlags};
use crate::program::SetType;
use crate::shader::declaration::{Member, Sampler, UniformBlock};
use crate::shader::keys::{block, uniform, variable};
use crate::shader::{
    CodeLocation, ShaderStage, StageGenerator, SyntheticVariable, VariableScope, VariableType,
    VertexAttributeType,
};

use super::{BlendingMode, MaterialInterface};

/// Texture sampled by a [`BasicMaterial`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum BasicTexture {
    /// 2D texture read with the primary 2D texture coordinates.
    Flat,
    /// 3D texture read with the primary 3D texture coordinates.
    Volumetric,
}

impl BasicTexture {
    fn sampler_type(self) -> VariableType {
        match self {
            Self::Flat => VariableType::Sampler2D,
            Self::Volumetric => VariableType::Sampler3D,
        }
    }

    fn coordinates(self) -> SyntheticVariable {
        match self {
            Self::Flat => SyntheticVariable::Primary2DTextureCoordinates,
            Self::Volumetric => SyntheticVariable::Primary3DTextureCoordinates,
        }
    }

    fn attribute(self) -> VertexAttributeType {
        match self {
            Self::Flat => VertexAttributeType::Primary2DTextureCoordinates,
            Self::Volumetric => VertexAttributeType::Primary3DTextureCoordinates,
        }
    }
}

/// Material writing a color without lighting terms of its own.
///
/// The fragment color is the product of whichever sources are enabled:
/// the texture, the dynamic color from the material block and the vertex
/// color.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct BasicMaterial {
    name: String,
    texture: Option<BasicTexture>,
    vertex_colors: bool,
    dynamic_color: bool,
    blending_mode: BlendingMode,
}

impl BasicMaterial {
    /// Material reading its color from the material block.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            texture: None,
            vertex_colors: false,
            dynamic_color: true,
            blending_mode: BlendingMode::None,
        }
    }

    /// Sample a texture. The dynamic color is dropped unless re-enabled.
    pub fn with_texture(mut self, texture: BasicTexture) -> Self {
        self.texture = Some(texture);
        self.dynamic_color = false;
        self
    }

    /// Multiply by the geometry vertex colors.
    pub fn with_vertex_colors(mut self) -> Self {
        self.vertex_colors = true;
        self
    }

    /// Multiply by the material block color.
    pub fn with_dynamic_color(mut self, enabled: bool) -> Self {
        self.dynamic_color = enabled;
        self
    }

    pub fn with_blending_mode(mut self, mode: BlendingMode) -> Self {
        self.blending_mode = mode;
        self
    }

    pub fn texture(&self) -> Option<BasicTexture> {
        self.texture
    }

    pub fn uses_vertex_colors(&self) -> bool {
        self.vertex_colors
    }

    fn check_geometry(
        &self,
        geometry: &dyn GeometryInterface,
        attribute: VertexAttributeType,
    ) -> Result<(), ProgramError> {
        if attribute.is_provided_by(geometry.flags()) {
            return Ok(());
        }

        let err = ProgramError::Generation(format!(
            "geometry '{}' has no {attribute} attribute for material '{}'",
            geometry.identifier(),
            self.name
        ));
        log::error!("{err}");
        Err(err)
    }

    fn generate_vertex_code(
        &self,
        generator: &mut StageGenerator,
        geometry: &dyn GeometryInterface,
    ) -> Result<(), ProgramError> {
        if let Some(texture) = self.texture {
            self.check_geometry(geometry, texture.attribute())?;
            generator.request(texture.coordinates(), VariableScope::ToNextStage)?;
        }

        if self.vertex_colors {
            self.check_geometry(geometry, VertexAttributeType::Color)?;
            generator.request(SyntheticVariable::Color, VariableScope::ToNextStage)?;
        }

        Ok(())
    }

    fn generate_fragment_code(
        &self,
        generator: &mut StageGenerator,
        material_set: u32,
    ) -> Result<(), ProgramError> {
        generator.declare_default_output_fragment()?;

        if let Some(texture) = self.texture {
            generator.declare(Sampler::new(
                material_set,
                1,
                texture.sampler_type(),
                uniform::PRIMARY_TEXTURE,
            ))?;
        }

        generator.add_code(
            CodeLocation::Output,
            &format!("{} = {};", variable::OUTPUT_FRAGMENT, self.fragment_color()),
        );

        if self.blending_mode.is_enabled() {
            generator.add_code(
                CodeLocation::Output,
                &format!(
                    "if ( {}.a <= 0.0 ) {{ discard; }}",
                    variable::OUTPUT_FRAGMENT
                ),
            );
        }

        Ok(())
    }
}

impl MaterialInterface for BasicMaterial {
    fn name(&self) -> &str {
        &self.name
    }

    fn program_key(&self) -> u64 {
        let mut hasher = DefaultHasher::new();
        "BasicMaterial".hash(&mut hasher);
        self.texture.hash(&mut hasher);
        self.vertex_colors.hash(&mut hasher);
        self.dynamic_color.hash(&mut hasher);
        self.blending_mode.hash(&mut hasher);
        hasher.finish()
    }

    fn uniform_block(&self, set: u32, binding: u32) -> UniformBlock {
        UniformBlock::new(block::MATERIAL, block::MATERIAL_INSTANCE, set, binding)
            .with_member(Member::new(VariableType::Vec4, block::COLOR))
            .with_member(Member::new(VariableType::Float, block::OPACITY))
            .with_member(Member::new(VariableType::Float, block::AUTO_ILLUMINATION))
    }

    fn descriptor_set_layout(&self) -> DescriptorSetLayoutDescriptor {
        let descriptor = DescriptorSetLayoutDescriptor::new()
            .with_uniform_buffer(0, ShaderStageFlags::VERTEX | ShaderStageFlags::FRAGMENT)
            .with_label("BasicMaterial");

        if self.texture.is_some() {
            descriptor.with_combined_image_sampler(1, ShaderStageFlags::FRAGMENT)
        } else {
            descriptor
        }
    }

    fn blending_mode(&self) -> BlendingMode {
        self.blending_mode
    }

    fn fragment_color(&self) -> String {
        let mut factors = Vec::with_capacity(3);

        if let Some(texture) = self.texture {
            factors.push(format!(
                "texture({}, {})",
                uniform::PRIMARY_TEXTURE,
                texture.coordinates().name()
            ));
        }

        if self.dynamic_color || (factors.is_empty() && !self.vertex_colors) {
            factors.push(format!("{}.{}", block::MATERIAL_INSTANCE, block::COLOR));
        }

        if self.vertex_colors {
            factors.push(SyntheticVariable::Color.name().to_string());
        }

        factors.join(" * ")
    }

    fn generate_shader_code(
        &self,
        generator: &mut StageGenerator,
        geometry: &dyn GeometryInterface,
    ) -> Result<(), ProgramError> {
        match generator.stage() {
            ShaderStage::Vertex => self.generate_vertex_code(generator, geometry),
            ShaderStage::Fragment => {
                let material_set = generator.set_indexes().set(SetType::PerModelLayer);
                generator.declare(self.uniform_block(material_set, 0))?;
                self.generate_fragment_code(generator, material_set)
            }
            stage => {
                let err = ProgramError::Generation(format!(
                    "material '{}' has no code for {stage}",
                    self.name
                ));
                log::error!("{err}");
                Err(err)
            }
        }
    }
}
