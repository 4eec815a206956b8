//! Programs writing the depth of shadow casters into shadow maps.

use std::sync::Arc;

use opaline_core::geometry::GeometryInterface;

use crate::error::ProgramError;
use crate::layout::{DescriptorSetLayout, LayoutManager};
use crate::pipeline::{CompareFunction, ConfigurableStates};
use crate::program::{MatrixOptions, Program, SetIndexes, SetType};
use crate::shader::declaration::{InputPrimitive, OutputPrimitive, StageOutput};
use crate::shader::keys::{block, variable};
use crate::shader::types::{InputPrimitiveType, OutputPrimitiveType};
use crate::shader::{
    CodeLocation, Shader, ShaderStage, SyntheticVariable, VariableScope, VariableType,
};

use super::scene::model_descriptor_set_layout;
use super::{GenerationContext, ProgramGenerator};

/// Faces of a cubemap shadow map.
const CUBEMAP_FACES: u32 = 6;

/// Generator of the programs drawing shadow casters.
///
/// A 2D shadow map keeps the rasterized depth. A cubemap shadow map is
/// rendered in one pass: a geometry stage emits every triangle once per
/// face, and fragments store their distance to the light normalized by the
/// far plane held in `viewProperties.w`.
pub struct ShadowCasting<'a> {
    geometry: &'a dyn GeometryInterface,
    instancing: bool,
    color_output: bool,
}

impl<'a> ShadowCasting<'a> {
    pub fn new(geometry: &'a dyn GeometryInterface) -> Self {
        Self {
            geometry,
            instancing: false,
            color_output: false,
        }
    }

    /// Read model matrices per instance.
    pub fn with_instancing(mut self, instancing: bool) -> Self {
        self.instancing = instancing;
        self
    }

    /// Also write the depth as a grey color, to inspect the shadow map.
    pub fn with_color_output(mut self, color_output: bool) -> Self {
        self.color_output = color_output;
        self
    }

    fn generate_face_loop(
        &self,
        program: &Program,
        vertex: &Shader,
        context: &GenerationContext,
    ) -> Result<Shader, ProgramError> {
        let mut geometry =
            program.stage_generator(ShaderStage::Geometry, "ShadowCastingGS", context.config)?;
        geometry.declare(InputPrimitive::new(InputPrimitiveType::Triangles))?;
        geometry.declare(OutputPrimitive::new(
            OutputPrimitiveType::TriangleStrip,
            3 * CUBEMAP_FACES,
        ))?;
        geometry.connect_from_previous_stage(vertex)?;
        geometry.declare_view_uniform_block()?;

        let location = geometry.next_shader_variable_location(1);
        geometry.declare(StageOutput::new(location, VariableType::Vec4, variable::FRAG_COORD))?;

        let lines = [
            format!("for ( int faceIndex = 0; faceIndex < {CUBEMAP_FACES}; ++faceIndex )"),
            "{".to_string(),
            "\tgl_Layer = faceIndex;".to_string(),
            "\tfor ( int i = 0; i < gl_in.length(); ++i )".to_string(),
            "\t{".to_string(),
            format!("\t\t{} = gl_in[i].gl_Position;", variable::FRAG_COORD),
            format!(
                "\t\t{} = {}.{}[faceIndex].{} * {};",
                variable::GL_POSITION,
                block::VIEW_INSTANCE,
                block::INSTANCE,
                block::VIEW_PROJECTION_MATRIX,
                variable::FRAG_COORD
            ),
            "\t\tEmitVertex();".to_string(),
            "\t}".to_string(),
            "\tEndPrimitive();".to_string(),
            "}".to_string(),
        ];
        for line in &lines {
            geometry.add_code(CodeLocation::Output, line);
        }

        geometry.finish()
    }
}

impl ProgramGenerator for ShadowCasting<'_> {
    fn name(&self) -> &str {
        "ShadowCasting"
    }

    fn geometry(&self) -> &dyn GeometryInterface {
        self.geometry
    }

    fn prepare_uniform_sets(&self, set_indexes: &mut SetIndexes, context: &GenerationContext) {
        if self.instancing || context.render_target.is_cubemap() {
            set_indexes.enable_set(SetType::PerView);
        }
        if context.config.model_uniform_block() && !self.instancing {
            set_indexes.enable_set(SetType::PerModel);
        }
    }

    fn matrix_options(&self, context: &GenerationContext) -> MatrixOptions {
        // World space positions need the model matrix on its own.
        MatrixOptions {
            instancing: self.instancing,
            advanced: context.render_target.is_cubemap(),
            billboarding: false,
        }
    }

    fn generate_shaders(
        &self,
        program: &mut Program,
        context: &GenerationContext,
    ) -> Result<(), ProgramError> {
        let cubemap = context.render_target.is_cubemap();

        let mut vertex =
            program.stage_generator(ShaderStage::Vertex, "ShadowCastingVS", context.config)?;
        let position = if cubemap {
            SyntheticVariable::WorldSpaceClipPosition
        } else {
            SyntheticVariable::ClipSpacePosition
        };
        vertex.request(position, VariableScope::ToNextStage)?;
        let vertex = vertex.finish()?;

        let mut fragment =
            program.stage_generator(ShaderStage::Fragment, "ShadowCastingFS", context.config)?;
        let depth = if cubemap {
            let geometry = self.generate_face_loop(program, &vertex, context)?;
            fragment.declare_view_uniform_block()?;
            fragment.connect_from_previous_stage(&geometry)?;

            let face = format!("{}.{}[0]", block::VIEW_INSTANCE, block::INSTANCE);
            fragment.add_code(
                CodeLocation::Top,
                &format!(
                    "const float fragmentDistance = distance({}.xyz, {face}.{}.xyz) / {face}.{}.w;",
                    variable::FRAG_COORD,
                    block::POSITION_WORLD_SPACE,
                    block::VIEW_PROPERTIES
                ),
            );
            program.attach(geometry)?;
            "fragmentDistance"
        } else {
            "gl_FragCoord.z"
        };

        if self.color_output {
            fragment.declare_default_output_fragment()?;
            fragment.add_code(
                CodeLocation::Output,
                &format!(
                    "{} = vec4({depth}, {depth}, {depth}, 1.0);",
                    variable::OUTPUT_FRAGMENT
                ),
            );
        }
        fragment.add_code(CodeLocation::Output, &format!("gl_FragDepth = {depth};"));
        let fragment = fragment.finish()?;

        program.attach(vertex)?;
        program.attach(fragment)?;

        Ok(())
    }

    fn descriptor_set_layouts(
        &self,
        program: &Program,
        layouts: &LayoutManager,
        set_layouts: &mut Vec<Arc<DescriptorSetLayout>>,
    ) -> Result<(), ProgramError> {
        if program.set_indexes().is_enabled(SetType::PerModel) {
            set_layouts.push(layouts.get_descriptor_set_layout(&model_descriptor_set_layout())?);
        }
        Ok(())
    }

    fn configure_states(
        &self,
        _program: &Program,
        states: &mut ConfigurableStates,
        _context: &GenerationContext,
    ) {
        states.depth_stencil.compare = CompareFunction::LessEqual;
        states.rasterization.depth_bias = true;
        states.color_blend.blend = None;
    }
}
