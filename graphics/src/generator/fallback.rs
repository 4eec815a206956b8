//! Magenta program drawn in place of programs that failed to build.

use opaline_core::geometry::GeometryInterface;

use crate::error::ProgramError;
use crate::program::{Program, SetIndexes, SetType};
use crate::shader::declaration::InputAttribute;
use crate::shader::keys::variable;
use crate::shader::{
    CodeLocation, ShaderStage, SyntheticVariable, VariableScope, VertexAttributeType,
};

use super::{GenerationContext, ProgramGenerator};

/// Fragment color of the fallback program.
pub const FALLBACK_COLOR: &str = "vec4(1.0, 0.0, 1.0, 1.0)";

/// Draws a geometry in flat magenta.
///
/// Positions are projected with the view of the render target when it
/// has one, and passed through unchanged otherwise.
pub struct FallbackGenerator<'a> {
    geometry: &'a dyn GeometryInterface,
}

impl<'a> FallbackGenerator<'a> {
    pub fn new(geometry: &'a dyn GeometryInterface) -> Self {
        Self { geometry }
    }
}

impl ProgramGenerator for FallbackGenerator<'_> {
    fn name(&self) -> &str {
        "Fallback"
    }

    fn geometry(&self) -> &dyn GeometryInterface {
        self.geometry
    }

    fn prepare_uniform_sets(&self, set_indexes: &mut SetIndexes, context: &GenerationContext) {
        if context.render_target.view_descriptor_set_layout().is_some()
            && !context.render_target.is_cubemap()
        {
            set_indexes.enable_set(SetType::PerView);
        }
    }

    fn generate_shaders(
        &self,
        program: &mut Program,
        context: &GenerationContext,
    ) -> Result<(), ProgramError> {
        let mut vertex = program.stage_generator(ShaderStage::Vertex, "FallbackVS", context.config)?;
        let set_indexes = vertex.set_indexes();

        if set_indexes.is_enabled(SetType::PerView) {
            vertex.declare_view_uniform_block()?;
            vertex.request(SyntheticVariable::ClipSpacePosition, VariableScope::ToNextStage)?;
        } else {
            let position = InputAttribute::new(VertexAttributeType::Position);
            let line = format!(
                "{} = vec4({}, 1.0);",
                variable::GL_POSITION,
                position.name()
            );
            vertex.declare(position)?;
            vertex.add_code(CodeLocation::Output, &line);
        }
        program.attach(vertex.finish()?)?;

        let mut fragment =
            program.stage_generator(ShaderStage::Fragment, "FallbackFS", context.config)?;
        fragment.declare_default_output_fragment()?;
        fragment.add_code(
            CodeLocation::Output,
            &format!("{} = {FALLBACK_COLOR};", variable::OUTPUT_FRAGMENT),
        );
        program.attach(fragment.finish()?)?;

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use super::*;
    use crate::backend::DummyBackend;
    use crate::config::GeneratorConfig;
    use crate::generator::{ProgramBuilder, RenderServices};
    use crate::render_target::{Extent2D, RenderTargetDescription};
    use opaline_core::geometry::{GeometryDescription, Topology};

    #[test]
    fn test_fallback_without_view() {
        let services = RenderServices::new(Arc::new(DummyBackend::new()));
        let config = GeneratorConfig::default();
        let target = RenderTargetDescription::new("Offscreen", Extent2D::new(32, 32));
        let geometry = GeometryDescription::new("Triangle", Topology::TriangleList);
        let fallback = FallbackGenerator::new(&geometry);

        let program = ProgramBuilder::new(&fallback, &target, &config)
            .build(&services)
            .unwrap();

        assert!(program.is_ready());
        assert_eq!(program.set_indexes().set_count(), 0);
        let vertex = program.shader(ShaderStage::Vertex).unwrap();
        assert!(vertex.source().contains("gl_Position = vec4(sva_Vertex, 1.0);"));
        assert!(vertex.push_constant_blocks().is_empty());
        let fragment = program.shader(ShaderStage::Fragment).unwrap();
        assert!(fragment
            .source()
            .contains("ssv_OutputFragment = vec4(1.0, 0.0, 1.0, 1.0);"));
    }

    #[test]
    fn test_fallback_with_view() {
        let services = RenderServices::new(Arc::new(DummyBackend::new()));
        let config = GeneratorConfig::default();
        let mut target = RenderTargetDescription::new("Main", Extent2D::new(32, 32));
        target.create_view_layout(services.layouts()).unwrap();
        let geometry = GeometryDescription::new("Triangle", Topology::TriangleList);
        let fallback = FallbackGenerator::new(&geometry);

        let program = ProgramBuilder::new(&fallback, &target, &config)
            .build(&services)
            .unwrap();

        assert!(program.set_indexes().is_enabled(SetType::PerView));
        let vertex = program.shader(ShaderStage::Vertex).unwrap();
        assert_eq!(vertex.uniform_blocks().len(), 1);
        assert!(vertex.source().contains("gl_Position = spc_Matrices.modelViewProjectionMatrix"));
    }
}
