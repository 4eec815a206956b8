//! Programs drawing a geometry with a material in one render pass.

use std::collections::hash_map::DefaultHasher;
use std::hash::{Hash, Hasher};
use std::sync::Arc;

use opaline_core::geometry::{GeometryInterface, Topology};

use crate::error::ProgramError;
use crate::layout::{
    DescriptorSetLayout, DescriptorSetLayoutDescriptor, LayoutManager, ShaderStageFlags,
};
use crate::lighting::{LightGenerator, RenderPassType, light_descriptor_set_layout};
use crate::material::MaterialInterface;
use crate::pipeline::{
    BlendComponent, BlendFactor, BlendState, CompareFunction, ConfigurableStates, CullMode,
    ProgramKey,
};
use crate::program::{MatrixOptions, Program, SetIndexes, SetType};
use crate::render_target::RenderTarget;
use crate::shader::{ShaderStage, SyntheticVariable, VariableScope};

use super::{GenerationContext, ProgramGenerator};

/// Layout of the per-draw model set.
pub fn model_descriptor_set_layout() -> DescriptorSetLayoutDescriptor {
    DescriptorSetLayoutDescriptor::new()
        .with_uniform_buffer(0, ShaderStageFlags::VERTEX)
        .with_label("Model")
}

/// Generator of the programs drawing scene objects.
///
/// Light passes add the contribution of one light on top of the ambient
/// pass, so they blend additively and only touch fragments the ambient
/// pass already wrote.
pub struct SceneRendering<'a> {
    geometry: &'a dyn GeometryInterface,
    material: &'a dyn MaterialInterface,
    pass: RenderPassType,
    instancing: bool,
}

impl<'a> SceneRendering<'a> {
    pub fn new(
        geometry: &'a dyn GeometryInterface,
        material: &'a dyn MaterialInterface,
        pass: RenderPassType,
    ) -> Self {
        Self {
            geometry,
            material,
            pass,
            instancing: false,
        }
    }

    /// Read model matrices per instance.
    pub fn with_instancing(mut self, instancing: bool) -> Self {
        self.instancing = instancing;
        self
    }

    pub fn pass(&self) -> RenderPassType {
        self.pass
    }

    pub fn is_instanced(&self) -> bool {
        self.instancing
    }

    /// Cache key of the program drawn into `render_target`.
    pub fn program_key(&self, render_target: &dyn RenderTarget) -> ProgramKey {
        let mut hasher = DefaultHasher::new();
        self.material.program_key().hash(&mut hasher);
        self.pass.hash(&mut hasher);
        self.instancing.hash(&mut hasher);
        self.geometry.topology().hash(&mut hasher);
        self.geometry.flags().hash(&mut hasher);

        ProgramKey::new(self.name(), render_target.identifier())
            .with_geometry(self.geometry.identifier())
            .with_material(self.material.name())
            .with_variant(hasher.finish())
    }

    fn stage_name(&self, stage: ShaderStage) -> String {
        let suffix = match stage {
            ShaderStage::Vertex => "VS",
            ShaderStage::Fragment => "FS",
            _ => "",
        };
        format!("{}{}{suffix}", self.material.name(), self.pass)
    }
}

impl ProgramGenerator for SceneRendering<'_> {
    fn name(&self) -> &str {
        "SceneRendering"
    }

    fn geometry(&self) -> &dyn GeometryInterface {
        self.geometry
    }

    fn prepare_uniform_sets(&self, set_indexes: &mut SetIndexes, context: &GenerationContext) {
        set_indexes.enable_set(SetType::PerView);
        if self.pass.is_light_pass() {
            set_indexes.enable_set(SetType::PerLight);
        }
        if context.config.model_uniform_block() && !self.instancing {
            set_indexes.enable_set(SetType::PerModel);
        }
        set_indexes.enable_set(SetType::PerModelLayer);
    }

    fn matrix_options(&self, _context: &GenerationContext) -> MatrixOptions {
        MatrixOptions {
            instancing: self.instancing,
            advanced: self.material.is_complex() || self.pass.is_light_pass(),
            billboarding: false,
        }
    }

    fn generate_shaders(
        &self,
        program: &mut Program,
        context: &GenerationContext,
    ) -> Result<(), ProgramError> {
        // Scene stages have no per-face loop, only the shadow casters do.
        if context.render_target.is_cubemap() {
            let err = ProgramError::Generation(format!(
                "'{}' cannot draw into cubemap target '{}'",
                self.material.name(),
                context.render_target.identifier()
            ));
            log::error!("{err}");
            return Err(err);
        }

        let lights = LightGenerator::new(self.pass, context.config);

        let mut vertex = program.stage_generator(
            ShaderStage::Vertex,
            self.stage_name(ShaderStage::Vertex),
            context.config,
        )?;
        vertex.declare_view_uniform_block()?;
        vertex.request(SyntheticVariable::ClipSpacePosition, VariableScope::ToNextStage)?;
        self.material
            .generate_shader_code(&mut vertex, self.geometry)?;
        lights.generate_shader_code(&mut vertex, self.geometry)?;
        let vertex = vertex.finish()?;

        let mut fragment = program.stage_generator(
            ShaderStage::Fragment,
            self.stage_name(ShaderStage::Fragment),
            context.config,
        )?;
        fragment.connect_from_previous_stage(&vertex)?;
        self.material
            .generate_shader_code(&mut fragment, self.geometry)?;
        lights.generate_shader_code(&mut fragment, self.geometry)?;
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
        let set_indexes = program.set_indexes();

        if set_indexes.is_enabled(SetType::PerLight) {
            set_layouts.push(layouts.get_descriptor_set_layout(&light_descriptor_set_layout())?);
        }
        if set_indexes.is_enabled(SetType::PerModel) {
            set_layouts.push(layouts.get_descriptor_set_layout(&model_descriptor_set_layout())?);
        }
        if set_indexes.is_enabled(SetType::PerModelLayer) {
            set_layouts
                .push(layouts.get_descriptor_set_layout(&self.material.descriptor_set_layout())?);
        }

        Ok(())
    }

    fn configure_states(
        &self,
        _program: &Program,
        states: &mut ConfigurableStates,
        _context: &GenerationContext,
    ) {
        let blending = self.material.blending_mode();
        states.color_blend.blend = blending.blend_state();
        if blending.is_enabled() {
            states.depth_stencil.depth_write = false;
        }

        if self.pass.is_light_pass() {
            let additive = BlendComponent::new(BlendFactor::One, BlendFactor::One);
            states.color_blend.blend = Some(BlendState {
                color: additive,
                alpha: additive,
            });
            states.depth_stencil.compare = CompareFunction::Equal;
            states.depth_stencil.depth_write = false;
        }

        if !matches!(
            self.geometry.topology(),
            Topology::TriangleList | Topology::TriangleStrip | Topology::TriangleFan
        ) {
            states.rasterization.cull_mode = CullMode::None;
        }
    }
}
