//! GPU backend abstraction layer.
//!
//! Program generation creates four kinds of GPU objects: descriptor set
//! layouts, pipeline layouts, shader modules and graphics pipelines. Each
//! backend implements the [`GpuBackend`] trait to create them.
//!
//! # Available Backends
//!
//! - `dummy` (default): No-op backend for testing and development
//! - `vulkan-backend`: Native Vulkan backend using ash

#[cfg(feature = "vulkan-backend")]
pub mod vulkan;

pub mod dummy;

use std::sync::Arc;

#[cfg(feature = "vulkan-backend")]
use ash::vk;

use crate::error::GraphicsError;
use crate::layout::{DescriptorSetLayout, DescriptorSetLayoutDescriptor, PushConstantRange};
use crate::pipeline::GraphicsPipelineDescriptor;
use crate::shader::ShaderStage;

pub use dummy::DummyBackend;

/// Handle to a descriptor set layout.
pub enum GpuDescriptorSetLayout {
    /// Dummy backend (no GPU object)
    Dummy,
    /// Vulkan backend descriptor set layout
    #[cfg(feature = "vulkan-backend")]
    Vulkan {
        device: ash::Device,
        layout: vk::DescriptorSetLayout,
    },
}

impl std::fmt::Debug for GpuDescriptorSetLayout {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Dummy => write!(f, "GpuDescriptorSetLayout::Dummy"),
            #[cfg(feature = "vulkan-backend")]
            Self::Vulkan { layout, .. } => f
                .debug_struct("GpuDescriptorSetLayout::Vulkan")
                .field("layout", layout)
                .finish_non_exhaustive(),
        }
    }
}

/// Handle to a pipeline layout.
pub enum GpuPipelineLayout {
    /// Dummy backend (no GPU object)
    Dummy,
    /// Vulkan backend pipeline layout
    #[cfg(feature = "vulkan-backend")]
    Vulkan {
        device: ash::Device,
        layout: vk::PipelineLayout,
    },
}

impl std::fmt::Debug for GpuPipelineLayout {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Dummy => write!(f, "GpuPipelineLayout::Dummy"),
            #[cfg(feature = "vulkan-backend")]
            Self::Vulkan { layout, .. } => f
                .debug_struct("GpuPipelineLayout::Vulkan")
                .field("layout", layout)
                .finish_non_exhaustive(),
        }
    }
}

/// Handle to a compiled shader module.
pub enum GpuShaderModule {
    /// Dummy backend (source is not compiled)
    Dummy,
    /// Vulkan backend shader module
    #[cfg(feature = "vulkan-backend")]
    Vulkan {
        device: ash::Device,
        module: vk::ShaderModule,
    },
}

impl std::fmt::Debug for GpuShaderModule {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Dummy => write!(f, "GpuShaderModule::Dummy"),
            #[cfg(feature = "vulkan-backend")]
            Self::Vulkan { module, .. } => f
                .debug_struct("GpuShaderModule::Vulkan")
                .field("module", module)
                .finish_non_exhaustive(),
        }
    }
}

/// Handle to a graphics pipeline.
pub enum GpuPipeline {
    /// Dummy backend (no GPU object)
    Dummy,
    /// Vulkan backend pipeline
    #[cfg(feature = "vulkan-backend")]
    Vulkan {
        device: ash::Device,
        pipeline: vk::Pipeline,
    },
}

impl std::fmt::Debug for GpuPipeline {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Dummy => write!(f, "GpuPipeline::Dummy"),
            #[cfg(feature = "vulkan-backend")]
            Self::Vulkan { pipeline, .. } => f
                .debug_struct("GpuPipeline::Vulkan")
                .field("pipeline", pipeline)
                .finish_non_exhaustive(),
        }
    }
}

// ============================================================================
// Vulkan Resource Cleanup (Drop implementations)
// ============================================================================

#[cfg(feature = "vulkan-backend")]
impl Drop for GpuDescriptorSetLayout {
    fn drop(&mut self) {
        if let GpuDescriptorSetLayout::Vulkan { device, layout } = self {
            unsafe {
                device.destroy_descriptor_set_layout(*layout, None);
            }
        }
    }
}

#[cfg(feature = "vulkan-backend")]
impl Drop for GpuPipelineLayout {
    fn drop(&mut self) {
        if let GpuPipelineLayout::Vulkan { device, layout } = self {
            unsafe {
                device.destroy_pipeline_layout(*layout, None);
            }
        }
    }
}

#[cfg(feature = "vulkan-backend")]
impl Drop for GpuShaderModule {
    fn drop(&mut self) {
        if let GpuShaderModule::Vulkan { device, module } = self {
            unsafe {
                device.destroy_shader_module(*module, None);
            }
        }
    }
}

#[cfg(feature = "vulkan-backend")]
impl Drop for GpuPipeline {
    fn drop(&mut self) {
        if let GpuPipeline::Vulkan { device, pipeline } = self {
            unsafe {
                device.destroy_pipeline(*pipeline, None);
            }
        }
    }
}

/// GPU backend trait for abstracting different GPU APIs.
pub trait GpuBackend: Send + Sync + 'static {
    /// Get the backend name.
    fn name(&self) -> &'static str;

    /// Create a descriptor set layout.
    fn create_descriptor_set_layout(
        &self,
        descriptor: &DescriptorSetLayoutDescriptor,
    ) -> Result<GpuDescriptorSetLayout, GraphicsError>;

    /// Create a pipeline layout from ordered set layouts and push constant
    /// ranges.
    fn create_pipeline_layout(
        &self,
        set_layouts: &[Arc<DescriptorSetLayout>],
        push_constant_ranges: &[PushConstantRange],
    ) -> Result<GpuPipelineLayout, GraphicsError>;

    /// Compile a generated GLSL stage into a shader module.
    fn create_shader_module(
        &self,
        stage: ShaderStage,
        name: &str,
        source: &str,
    ) -> Result<GpuShaderModule, GraphicsError>;

    /// Finalize a graphics pipeline.
    fn create_graphics_pipeline(
        &self,
        descriptor: &GraphicsPipelineDescriptor,
    ) -> Result<GpuPipeline, GraphicsError>;
}

/// Selects and creates the appropriate backend based on available features.
pub fn create_backend() -> Result<Arc<dyn GpuBackend>, GraphicsError> {
    // Try Vulkan backend first if available (native Vulkan via ash)
    #[cfg(feature = "vulkan-backend")]
    {
        match vulkan::VulkanBackend::new() {
            Ok(backend) => {
                log::info!("Using Vulkan backend (ash)");
                return Ok(Arc::new(backend));
            }
            Err(e) => {
                log::warn!("Failed to create Vulkan backend: {}", e);
            }
        }
    }

    // Fall back to dummy backend
    log::info!("Using dummy backend");
    Ok(Arc::new(DummyBackend::new()))
}

/// Check if a real GPU backend is available.
pub fn has_gpu_backend() -> bool {
    cfg!(feature = "vulkan-backend")
}
