//! Generated programs.
//!
//! A [`Program`] gathers the stages generated for one (geometry, material,
//! render target) combination together with everything a pipeline needs:
//! the vertex buffer format, the pipeline layout and, once finalized, the
//! pipeline itself. Built programs are shared as `Arc<Program>`.

mod set_indexes;

use std::collections::BTreeMap;
use std::sync::Arc;

use crate::config::GeneratorConfig;
use crate::error::ProgramError;
use crate::layout::PipelineLayout;
use crate::pipeline::GraphicsPipeline;
use crate::shader::{ModelMatrixStrategy, Shader, ShaderStage, StageGenerator};
use crate::vertex::VertexBufferFormat;

pub use set_indexes::{SetIndexes, SetType};

/// How model matrices reach the vertex stage.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct MatrixOptions {
    /// Model matrices come per instance from a vertex buffer.
    pub instancing: bool,
    /// Intermediate spaces (view position, normals...) are needed.
    pub advanced: bool,
    /// Geometry faces the camera.
    pub billboarding: bool,
}

/// Named aggregate of generated stages and their pipeline objects.
#[derive(Debug, Clone)]
pub struct Program {
    name: String,
    set_indexes: SetIndexes,
    matrix_options: MatrixOptions,
    model_matrix_strategy: ModelMatrixStrategy,
    cubemap_view: bool,
    shaders: BTreeMap<ShaderStage, Shader>,
    vertex_buffer_format: Option<Arc<VertexBufferFormat>>,
    pipeline_layout: Option<Arc<PipelineLayout>>,
    graphics_pipeline: Option<Arc<GraphicsPipeline>>,
}

impl Program {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            set_indexes: SetIndexes::default(),
            matrix_options: MatrixOptions::default(),
            model_matrix_strategy: ModelMatrixStrategy::Invalid,
            cubemap_view: false,
            shaders: BTreeMap::new(),
            vertex_buffer_format: None,
            pipeline_layout: None,
            graphics_pipeline: None,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn set_indexes(&self) -> &SetIndexes {
        &self.set_indexes
    }

    pub fn set_indexes_mut(&mut self) -> &mut SetIndexes {
        &mut self.set_indexes
    }

    pub fn matrix_options(&self) -> MatrixOptions {
        self.matrix_options
    }

    pub fn model_matrix_strategy(&self) -> ModelMatrixStrategy {
        self.model_matrix_strategy
    }

    /// Set the matrix options and derive the model matrix strategy.
    pub fn configure_matrices(&mut self, options: MatrixOptions, config: &GeneratorConfig) {
        self.matrix_options = options;
        self.model_matrix_strategy =
            config.model_matrix_strategy(options.instancing, options.advanced, options.billboarding);
    }

    /// Override the model matrix strategy.
    pub fn set_model_matrix_strategy(&mut self, strategy: ModelMatrixStrategy) {
        self.model_matrix_strategy = strategy;
    }

    /// Returns true if the program draws into the six faces of a cubemap.
    pub fn is_cubemap_view(&self) -> bool {
        self.cubemap_view
    }

    pub fn set_cubemap_view(&mut self, cubemap_view: bool) {
        self.cubemap_view = cubemap_view;
    }

    /// Start generating a stage of this program.
    ///
    /// The generator inherits the program's set indexes, model matrix
    /// strategy and view kind. Fails if the stage was already attached.
    pub fn stage_generator(
        &self,
        stage: ShaderStage,
        name: impl Into<String>,
        config: &GeneratorConfig,
    ) -> Result<StageGenerator, ProgramError> {
        if self.shaders.contains_key(&stage) {
            let err = ProgramError::StageAlreadyExists(stage);
            log::error!("Program '{}': {err}", self.name);
            return Err(err);
        }

        Ok(StageGenerator::new(
            stage,
            name,
            config,
            self.model_matrix_strategy,
            self.set_indexes,
        )
        .with_cubemap_view(self.cubemap_view))
    }

    /// Attach a generated stage.
    pub fn attach(&mut self, shader: Shader) -> Result<(), ProgramError> {
        let stage = shader.stage();
        if self.shaders.contains_key(&stage) {
            let err = ProgramError::StageAlreadyExists(stage);
            log::error!("Program '{}': {err}", self.name);
            return Err(err);
        }
        self.shaders.insert(stage, shader);
        Ok(())
    }

    pub fn shader(&self, stage: ShaderStage) -> Option<&Shader> {
        self.shaders.get(&stage)
    }

    pub fn has_stage(&self, stage: ShaderStage) -> bool {
        self.shaders.contains_key(&stage)
    }

    /// Attached stages in pipeline order.
    pub fn shader_list(&self) -> impl Iterator<Item = &Shader> {
        self.shaders.values()
    }

    pub fn use_tessellation(&self) -> bool {
        self.shaders.keys().any(|stage| stage.is_tessellation())
    }

    pub fn vertex_buffer_format(&self) -> Option<&Arc<VertexBufferFormat>> {
        self.vertex_buffer_format.as_ref()
    }

    pub fn set_vertex_buffer_format(&mut self, format: Arc<VertexBufferFormat>) {
        self.vertex_buffer_format = Some(format);
    }

    pub fn pipeline_layout(&self) -> Option<&Arc<PipelineLayout>> {
        self.pipeline_layout.as_ref()
    }

    pub fn set_pipeline_layout(&mut self, layout: Arc<PipelineLayout>) {
        self.pipeline_layout = Some(layout);
    }

    pub fn graphics_pipeline(&self) -> Option<&Arc<GraphicsPipeline>> {
        self.graphics_pipeline.as_ref()
    }

    pub fn set_graphics_pipeline(&mut self, pipeline: Arc<GraphicsPipeline>) {
        self.graphics_pipeline = Some(pipeline);
    }

    /// Vertex and fragment stages exist and a vertex buffer format is
    /// attached.
    pub fn is_complete(&self) -> bool {
        self.has_stage(ShaderStage::Vertex)
            && self.has_stage(ShaderStage::Fragment)
            && self.vertex_buffer_format.is_some()
    }

    /// Complete and a pipeline layout is attached.
    pub fn is_described(&self) -> bool {
        self.is_complete() && self.pipeline_layout.is_some()
    }

    /// Described and the pipeline is finalized.
    pub fn is_ready(&self) -> bool {
        self.is_described() && self.graphics_pipeline.is_some()
    }
}
