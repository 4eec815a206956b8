//! Graphics pipelines of generated programs.
//!
//! A [`GraphicsPipelineDescriptor`] gathers every state of a pipeline:
//! shader modules, pipeline layout, vertex input, fixed-function states and
//! attachment formats. The backend turns it into a [`GraphicsPipeline`].

mod cache;
mod shader_manager;
mod state;

use std::collections::hash_map::DefaultHasher;
use std::hash::{Hash, Hasher};
use std::sync::Arc;

use crate::backend::GpuPipeline;
use crate::layout::PipelineLayout;
use crate::render_target::TextureFormat;
use crate::vertex::VertexBufferFormat;

pub use cache::{ProgramCache, ProgramKey};
pub use shader_manager::{ShaderManager, ShaderModule, shader_module_key};
pub use state::{
    BlendComponent, BlendFactor, BlendOperation, BlendState, ColorBlendState, CompareFunction,
    ConfigurableStates, CullMode, DepthStencilState, FrontFace, InputAssemblyState,
    MultisampleState, PolygonMode, RasterizationState, TessellationState, ViewportState,
};

/// Everything needed to create a graphics pipeline.
#[derive(Debug, Clone)]
pub struct GraphicsPipelineDescriptor {
    pub label: Option<String>,
    /// Shader modules in stage order.
    pub shader_modules: Vec<Arc<ShaderModule>>,
    pub layout: Arc<PipelineLayout>,
    pub vertex_format: Arc<VertexBufferFormat>,
    pub input_assembly: InputAssemblyState,
    /// Present only for programs with tessellation stages.
    pub tessellation: Option<TessellationState>,
    pub viewport: ViewportState,
    pub multisample: MultisampleState,
    pub states: ConfigurableStates,
    pub color_format: TextureFormat,
    pub depth_format: Option<TextureFormat>,
}

/// Content key of a pipeline descriptor.
pub fn pipeline_key(descriptor: &GraphicsPipelineDescriptor) -> u64 {
    let mut hasher = DefaultHasher::new();
    for module in &descriptor.shader_modules {
        module.key().hash(&mut hasher);
    }
    descriptor.layout.key().hash(&mut hasher);
    descriptor.vertex_format.hash(&mut hasher);
    descriptor.input_assembly.hash(&mut hasher);
    descriptor.tessellation.hash(&mut hasher);
    descriptor.viewport.hash(&mut hasher);
    descriptor.multisample.hash(&mut hasher);
    descriptor.states.hash(&mut hasher);
    descriptor.color_format.hash(&mut hasher);
    descriptor.depth_format.hash(&mut hasher);
    hasher.finish()
}

/// A finalized pipeline.
#[derive(Debug)]
pub struct GraphicsPipeline {
    label: Option<String>,
    key: u64,
    handle: GpuPipeline,
}

impl GraphicsPipeline {
    pub(crate) fn new(label: Option<String>, key: u64, handle: GpuPipeline) -> Self {
        Self { label, key, handle }
    }

    pub fn label(&self) -> Option<&str> {
        self.label.as_deref()
    }

    pub fn key(&self) -> u64 {
        self.key
    }

    pub fn gpu_handle(&self) -> &GpuPipeline {
        &self.handle
    }
}
