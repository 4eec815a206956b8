//! Program generation.
//!
//! A [`ProgramGenerator`] knows what one kind of rendering needs: which
//! descriptor sets it binds, which stages it generates and how its fixed
//! function states look. A [`ProgramBuilder`] drives a generator through
//! the steps of a build:
//!
//! ```text
//! Empty -> DeclarationsPrepared -> StagesGenerated -> LayoutResolved -> PipelineFinalized
//! ```
//!
//! Any step can abort the build. The program is only published once every
//! step succeeded; [`ProgramBuilder::build_or_fallback`] publishes a
//! magenta fallback program instead of failing.

mod fallback;
mod overlay;
mod scene;
mod shadow;

use std::fmt;
use std::sync::Arc;

use opaline_core::geometry::GeometryInterface;
use opaline_core::profile_scope;
use static_assertions::assert_impl_all;

use crate::backend::GpuBackend;
use crate::config::GeneratorConfig;
use crate::error::ProgramError;
use crate::layout::{
    DescriptorSetLayout, LayoutManager, PushConstantRange, ShaderStageFlags,
    generate_push_constant_ranges,
};
use crate::pipeline::{
    ConfigurableStates, GraphicsPipeline, GraphicsPipelineDescriptor, InputAssemblyState,
    MultisampleState, ProgramCache, ShaderManager, TessellationState, ViewportState,
    pipeline_key,
};
use crate::program::{MatrixOptions, Program, SetIndexes, SetType};
use crate::render_target::RenderTarget;
use crate::shader::ShaderStage;
use crate::vertex::VertexBufferFormatManager;

pub use fallback::FallbackGenerator;
pub use overlay::{ColorConversion, OverlayRendering, overlay_descriptor_set_layout};
pub use scene::SceneRendering;
pub use shadow::ShadowCasting;

/// Control points per patch of tessellated programs.
pub const PATCH_CONTROL_POINTS: u32 = 3;

/// Shared services a build draws from.
///
/// Every cache is internally synchronized, so one bundle serves builds
/// running on several threads.
pub struct RenderServices {
    backend: Arc<dyn GpuBackend>,
    layouts: LayoutManager,
    vertex_formats: VertexBufferFormatManager,
    shaders: ShaderManager,
    programs: Arc<ProgramCache>,
}

assert_impl_all!(RenderServices: Send, Sync);

impl fmt::Debug for RenderServices {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RenderServices")
            .field("backend", &self.backend.name())
            .field("layouts", &self.layouts)
            .field("shaders", &self.shaders)
            .field("programs", &self.programs.len())
            .finish_non_exhaustive()
    }
}

impl RenderServices {
    pub fn new(backend: Arc<dyn GpuBackend>) -> Self {
        Self {
            layouts: LayoutManager::new(Arc::clone(&backend)),
            vertex_formats: VertexBufferFormatManager::new(),
            shaders: ShaderManager::new(Arc::clone(&backend)),
            programs: Arc::new(ProgramCache::new()),
            backend,
        }
    }

    pub fn backend(&self) -> &Arc<dyn GpuBackend> {
        &self.backend
    }

    pub fn layouts(&self) -> &LayoutManager {
        &self.layouts
    }

    pub fn vertex_formats(&self) -> &VertexBufferFormatManager {
        &self.vertex_formats
    }

    pub fn shaders(&self) -> &ShaderManager {
        &self.shaders
    }

    pub fn programs(&self) -> &Arc<ProgramCache> {
        &self.programs
    }
}

/// Inputs shared by every hook of one build.
#[derive(Clone, Copy)]
pub struct GenerationContext<'a> {
    pub config: &'a GeneratorConfig,
    pub render_target: &'a dyn RenderTarget,
}

impl fmt::Debug for GenerationContext<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("GenerationContext")
            .field("config", self.config)
            .field("render_target", &self.render_target.identifier())
            .finish()
    }
}

/// Generation hooks of one kind of rendering.
pub trait ProgramGenerator {
    /// Program name, also used in stage banners.
    fn name(&self) -> &str;

    /// Geometry feeding the program.
    fn geometry(&self) -> &dyn GeometryInterface;

    /// Enable the descriptor sets the program binds.
    fn prepare_uniform_sets(&self, set_indexes: &mut SetIndexes, context: &GenerationContext);

    /// How model matrices reach the vertex stage.
    fn matrix_options(&self, _context: &GenerationContext) -> MatrixOptions {
        MatrixOptions::default()
    }

    /// Generate and attach the stages of the program.
    fn generate_shaders(
        &self,
        program: &mut Program,
        context: &GenerationContext,
    ) -> Result<(), ProgramError>;

    /// Push the descriptor set layouts following the view set, in set
    /// order.
    fn descriptor_set_layouts(
        &self,
        _program: &Program,
        _layouts: &LayoutManager,
        _set_layouts: &mut Vec<Arc<DescriptorSetLayout>>,
    ) -> Result<(), ProgramError> {
        Ok(())
    }

    /// Push constant ranges of the program.
    ///
    /// Defaults to the vertex stage blocks laid out back to back, visible
    /// to every stage declaring push constants.
    fn push_constant_ranges(&self, program: &Program) -> Vec<PushConstantRange> {
        let Some(vertex) = program.shader(ShaderStage::Vertex) else {
            return Vec::new();
        };

        let stages = program
            .shader_list()
            .filter(|shader| !shader.push_constant_blocks().is_empty())
            .fold(ShaderStageFlags::empty(), |stages, shader| {
                stages | shader.stage().stage_flags()
            });

        generate_push_constant_ranges(vertex.push_constant_blocks(), stages)
    }

    /// Set rasterization, depth/stencil and blending states.
    fn configure_states(
        &self,
        _program: &Program,
        _states: &mut ConfigurableStates,
        _context: &GenerationContext,
    ) {
    }
}

/// Step reached by a [`ProgramBuilder`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum BuildState {
    Empty,
    DeclarationsPrepared,
    StagesGenerated,
    LayoutResolved,
    PipelineFinalized,
    Aborted,
}

impl fmt::Display for BuildState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Debug::fmt(self, f)
    }
}

/// Drives one program build.
///
/// A builder is used from a single thread; the services it draws from are
/// shared.
pub struct ProgramBuilder<'a> {
    generator: &'a dyn ProgramGenerator,
    context: GenerationContext<'a>,
    state: BuildState,
    program: Program,
}

impl fmt::Debug for ProgramBuilder<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ProgramBuilder")
            .field("generator", &self.generator.name())
            .field("state", &self.state)
            .field("program", &self.program)
            .finish()
    }
}

impl<'a> ProgramBuilder<'a> {
    pub fn new(
        generator: &'a dyn ProgramGenerator,
        render_target: &'a dyn RenderTarget,
        config: &'a GeneratorConfig,
    ) -> Self {
        Self {
            generator,
            context: GenerationContext {
                config,
                render_target,
            },
            state: BuildState::Empty,
            program: Program::new(generator.name()),
        }
    }

    pub fn state(&self) -> BuildState {
        self.state
    }

    /// The program under construction.
    pub fn program(&self) -> &Program {
        &self.program
    }

    fn expect_state(&self, expected: BuildState, step: &str) -> Result<(), ProgramError> {
        if self.state == expected {
            return Ok(());
        }

        let err = ProgramError::InvalidState(format!(
            "'{}': {step} requires {expected}, the build is {}",
            self.program.name(),
            self.state
        ));
        log::error!("{err}");
        Err(err)
    }

    fn abort(&mut self, err: ProgramError) -> ProgramError {
        log::error!("Program '{}' aborted: {err}", self.program.name());
        self.state = BuildState::Aborted;
        err
    }

    /// Generate the stages and resolve the vertex buffer format.
    pub fn generate_program(&mut self, services: &RenderServices) -> Result<(), ProgramError> {
        profile_scope!("generate_program");
        self.expect_state(BuildState::Empty, "program generation")?;

        self.generator
            .prepare_uniform_sets(self.program.set_indexes_mut(), &self.context);
        let matrix_options = self.generator.matrix_options(&self.context);
        self.program
            .configure_matrices(matrix_options, self.context.config);
        self.program
            .set_cubemap_view(self.context.render_target.is_cubemap());
        self.state = BuildState::DeclarationsPrepared;

        if let Err(err) = self
            .generator
            .generate_shaders(&mut self.program, &self.context)
        {
            return Err(self.abort(err));
        }

        let Some(vertex) = self.program.shader(ShaderStage::Vertex) else {
            return Err(self.abort(ProgramError::MissingVertexStage));
        };

        let geometry = self.generator.geometry();
        let format = match services.vertex_formats().get_vertex_buffer_format(
            geometry.topology(),
            geometry.flags(),
            vertex.input_attributes(),
        ) {
            Ok(format) => format,
            Err(err) => return Err(self.abort(err)),
        };
        self.program.set_vertex_buffer_format(format);

        if !self.program.is_complete() {
            let missing: Vec<_> = [ShaderStage::Vertex, ShaderStage::Fragment]
                .into_iter()
                .filter(|stage| !self.program.has_stage(*stage))
                .map(|stage| stage.name())
                .collect();
            return Err(self.abort(ProgramError::IncompleteProgram(format!(
                "missing {}",
                missing.join(", ")
            ))));
        }

        self.state = BuildState::StagesGenerated;
        log::debug!(
            "Program '{}' generated ({} sets, {:?})",
            self.program.name(),
            self.program.set_indexes().set_count(),
            self.program.model_matrix_strategy()
        );

        Ok(())
    }

    /// Resolve descriptor set layouts, push constant ranges and the
    /// pipeline layout.
    pub fn generate_program_layout(
        &mut self,
        services: &RenderServices,
    ) -> Result<(), ProgramError> {
        profile_scope!("generate_program_layout");
        self.expect_state(BuildState::StagesGenerated, "layout generation")?;

        let set_indexes = *self.program.set_indexes();
        let mut set_layouts = Vec::with_capacity(set_indexes.set_count() as usize);

        if set_indexes.is_enabled(SetType::PerView) {
            let Some(view_layout) = self.context.render_target.view_descriptor_set_layout() else {
                return Err(self.abort(ProgramError::MissingViewLayout));
            };
            set_layouts.push(view_layout);
        }

        if let Err(err) =
            self.generator
                .descriptor_set_layouts(&self.program, services.layouts(), &mut set_layouts)
        {
            return Err(self.abort(ProgramError::MissingPipelineLayout(err.to_string())));
        }

        if set_layouts.len() != set_indexes.set_count() as usize {
            return Err(self.abort(ProgramError::MissingPipelineLayout(format!(
                "{} descriptor set layouts for {} enabled sets",
                set_layouts.len(),
                set_indexes.set_count()
            ))));
        }

        let push_constant_ranges = self.generator.push_constant_ranges(&self.program);

        match services
            .layouts()
            .get_pipeline_layout(set_layouts, push_constant_ranges)
        {
            Ok(layout) => self.program.set_pipeline_layout(layout),
            Err(err) => {
                return Err(self.abort(ProgramError::MissingPipelineLayout(err.to_string())));
            }
        }

        self.state = BuildState::LayoutResolved;
        Ok(())
    }

    /// Compile the stages and finalize the pipeline.
    ///
    /// A backend rejection leaves the build in
    /// [`BuildState::LayoutResolved`].
    pub fn create_graphics_pipeline(
        &mut self,
        services: &RenderServices,
    ) -> Result<(), ProgramError> {
        profile_scope!("create_graphics_pipeline");
        self.expect_state(BuildState::LayoutResolved, "pipeline creation")?;

        let empty = self
            .program
            .shader_list()
            .find(|shader| shader.source().is_empty())
            .map(|shader| format!("{} '{}' has no source", shader.stage(), shader.name()));
        if let Some(message) = empty {
            return Err(self.abort(ProgramError::MissingShaderModules(message)));
        }

        let shader_modules = match services.shaders().get_shader_modules(self.program.shader_list())
        {
            Ok(modules) => modules,
            Err(err) => return Err(self.abort(ProgramError::MissingShaderModules(err.to_string()))),
        };

        let (Some(layout), Some(vertex_format)) = (
            self.program.pipeline_layout().cloned(),
            self.program.vertex_buffer_format().cloned(),
        ) else {
            return Err(self.abort(ProgramError::IncompleteProgram(
                "no pipeline layout or vertex buffer format".to_string(),
            )));
        };

        let render_target = self.context.render_target;
        let mut states = ConfigurableStates::default();
        self.generator
            .configure_states(&self.program, &mut states, &self.context);

        let descriptor = GraphicsPipelineDescriptor {
            label: Some(self.program.name().to_string()),
            shader_modules,
            layout,
            input_assembly: InputAssemblyState::from_topology(vertex_format.topology()),
            vertex_format,
            tessellation: self.program.use_tessellation().then_some(TessellationState {
                patch_control_points: PATCH_CONTROL_POINTS,
            }),
            viewport: ViewportState {
                extent: render_target.extent(),
            },
            multisample: MultisampleState {
                samples: render_target.samples(),
            },
            states,
            color_format: render_target.color_format(),
            depth_format: render_target.depth_format(),
        };

        let key = pipeline_key(&descriptor);
        let handle = services
            .backend()
            .create_graphics_pipeline(&descriptor)
            .map_err(|err| {
                let err = ProgramError::PipelineFinalizationFailed(err.to_string());
                log::error!("Program '{}': {err}", self.program.name());
                err
            })?;

        self.program
            .set_graphics_pipeline(Arc::new(GraphicsPipeline::new(
                descriptor.label,
                key,
                handle,
            )));
        self.state = BuildState::PipelineFinalized;
        log::debug!("Program '{}' ready", self.program.name());

        Ok(())
    }

    /// Run every step and publish the program.
    pub fn build(mut self, services: &RenderServices) -> Result<Arc<Program>, ProgramError> {
        profile_scope!("build_program");
        self.generate_program(services)?;
        self.generate_program_layout(services)?;
        self.create_graphics_pipeline(services)?;
        Ok(Arc::new(self.program))
    }

    /// Build the program, or the fallback program if any step fails.
    ///
    /// Fails only if the fallback program cannot be built either.
    pub fn build_or_fallback(self, services: &RenderServices) -> Result<Arc<Program>, ProgramError> {
        let generator = self.generator;
        let context = self.context;

        match self.build(services) {
            Ok(program) => Ok(program),
            Err(err) => {
                log::warn!(
                    "Program '{}' failed ({err}), using the fallback program",
                    generator.name()
                );
                opaline_core::profile_message!("program fallback");
                let fallback = FallbackGenerator::new(generator.geometry());
                ProgramBuilder::new(&fallback, context.render_target, context.config)
                    .build(services)
            }
        }
    }
}
