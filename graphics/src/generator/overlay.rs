//! Programs compositing 2D overlay surfaces over the rendered frame.

use std::fmt;
use std::sync::Arc;

use opaline_core::geometry::GeometryInterface;

use crate::error::ProgramError;
use crate::layout::{
    DescriptorSetLayout, DescriptorSetLayoutDescriptor, LayoutManager, ShaderStageFlags,
};
use crate::pipeline::{BlendState, ConfigurableStates, CullMode};
use crate::program::{Program, SetIndexes, SetType};
use crate::shader::declaration::{
    Function, InputAttribute, Member, PushConstantBlock, Sampler, StageOutput,
};
use crate::shader::keys::{block, uniform, variable};
use crate::shader::{CodeLocation, ShaderStage, VariableType, VertexAttributeType};

use super::{GenerationContext, ProgramGenerator};

/// Layout of the set holding the surface texture.
pub fn overlay_descriptor_set_layout() -> DescriptorSetLayoutDescriptor {
    DescriptorSetLayoutDescriptor::new()
        .with_combined_image_sampler(0, ShaderStageFlags::FRAGMENT)
        .with_label("Overlay")
}

/// Transfer function applied to surface texels.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum ColorConversion {
    #[default]
    None,
    ToSrgb,
    ToLinear,
}

impl ColorConversion {
    fn function(self) -> Option<Function> {
        let function = match self {
            Self::None => return None,
            Self::ToSrgb => Function::new(VariableType::Vec4, "toSRGBColor")
                .with_parameter(VariableType::Vec4, "color")
                .with_statement("const vec3 lower = color.rgb * 12.92;")
                .with_statement(
                    "const vec3 higher = 1.055 * pow(color.rgb, vec3(1.0 / 2.4)) - 0.055;",
                )
                .with_statement("const vec3 cutoff = step(color.rgb, vec3(0.0031308));")
                .with_statement("return vec4(mix(higher, lower, cutoff), color.a);"),
            Self::ToLinear => Function::new(VariableType::Vec4, "toLinearColor")
                .with_parameter(VariableType::Vec4, "color")
                .with_statement("const vec3 lower = color.rgb / 12.92;")
                .with_statement("const vec3 higher = pow((color.rgb + 0.055) / 1.055, vec3(2.4));")
                .with_statement("const vec3 cutoff = step(color.rgb, vec3(0.04045));")
                .with_statement("return vec4(mix(higher, lower, cutoff), color.a);"),
        };
        Some(function)
    }
}

impl fmt::Display for ColorConversion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::None => "",
            Self::ToSrgb => "ToSRGB",
            Self::ToLinear => "ToLinear",
        };
        f.write_str(name)
    }
}

/// Generator of the programs drawing overlay surfaces.
///
/// The vertex stage places the surface with a transformation matrix pushed
/// per draw; the fragment stage samples the surface texture bound in the
/// per-model set.
pub struct OverlayRendering<'a> {
    geometry: &'a dyn GeometryInterface,
    conversion: ColorConversion,
}

impl<'a> OverlayRendering<'a> {
    pub fn new(geometry: &'a dyn GeometryInterface, conversion: ColorConversion) -> Self {
        Self {
            geometry,
            conversion,
        }
    }

    pub fn conversion(&self) -> ColorConversion {
        self.conversion
    }
}

impl ProgramGenerator for OverlayRendering<'_> {
    fn name(&self) -> &str {
        "OverlayRendering"
    }

    fn geometry(&self) -> &dyn GeometryInterface {
        self.geometry
    }

    fn prepare_uniform_sets(&self, set_indexes: &mut SetIndexes, _context: &GenerationContext) {
        set_indexes.enable_set(SetType::PerModel);
    }

    fn generate_shaders(
        &self,
        program: &mut Program,
        context: &GenerationContext,
    ) -> Result<(), ProgramError> {
        let mut vertex = program.stage_generator(
            ShaderStage::Vertex,
            format!("Overlay{}VS", self.conversion),
            context.config,
        )?;
        vertex.declare(
            PushConstantBlock::new(block::OVERLAY, block::OVERLAY_INSTANCE)
                .with_member(Member::new(VariableType::Mat4, block::TRANSFORMATION_MATRIX)),
        )?;

        let position = InputAttribute::new(VertexAttributeType::Position);
        let texture_coordinates =
            InputAttribute::new(VertexAttributeType::Primary2DTextureCoordinates);
        let location = vertex.next_shader_variable_location(1);
        vertex.add_code(
            CodeLocation::Output,
            &format!(
                "{} = {}.{} * vec4({}, 1.0);",
                variable::GL_POSITION,
                block::OVERLAY_INSTANCE,
                block::TRANSFORMATION_MATRIX,
                position.name()
            ),
        );
        vertex.add_code(
            CodeLocation::Output,
            &format!(
                "{} = {};",
                variable::PRIMARY_2D_TEXTURE_COORDINATES,
                texture_coordinates.name()
            ),
        );
        vertex.declare(position)?;
        vertex.declare(texture_coordinates)?;
        vertex.declare(StageOutput::new(
            location,
            VariableType::Vec2,
            variable::PRIMARY_2D_TEXTURE_COORDINATES,
        ))?;
        let vertex = vertex.finish()?;

        let mut fragment = program.stage_generator(
            ShaderStage::Fragment,
            format!("Overlay{}FS", self.conversion),
            context.config,
        )?;
        fragment.connect_from_previous_stage(&vertex)?;
        fragment.declare(Sampler::new(
            fragment.set_indexes().set(SetType::PerModel),
            0,
            VariableType::Sampler2D,
            uniform::PRIMARY_TEXTURE,
        ))?;
        fragment.declare_default_output_fragment()?;

        // Surfaces are uploaded in BGRA order.
        let texel = format!(
            "texture({}, {}).bgra",
            uniform::PRIMARY_TEXTURE,
            variable::PRIMARY_2D_TEXTURE_COORDINATES
        );
        let color = match self.conversion.function() {
            Some(function) => {
                let call = format!("{}({texel})", function.name());
                fragment.declare(function)?;
                call
            }
            None => texel,
        };
        fragment.add_code(
            CodeLocation::Output,
            &format!("{} = {color};", variable::OUTPUT_FRAGMENT),
        );
        let fragment = fragment.finish()?;

        program.attach(vertex)?;
        program.attach(fragment)?;

        Ok(())
    }

    fn descriptor_set_layouts(
        &self,
        _program: &Program,
        layouts: &LayoutManager,
        set_layouts: &mut Vec<Arc<DescriptorSetLayout>>,
    ) -> Result<(), ProgramError> {
        set_layouts.push(layouts.get_descriptor_set_layout(&overlay_descriptor_set_layout())?);
        Ok(())
    }

    fn configure_states(
        &self,
        _program: &Program,
        states: &mut ConfigurableStates,
        _context: &GenerationContext,
    ) {
        states.rasterization.cull_mode = CullMode::None;
        states.depth_stencil.depth_test = false;
        states.depth_stencil.depth_write = false;
        states.color_blend.blend = Some(BlendState::alpha_blending());
    }
}
