//! Dummy GPU backend for testing and development.
//!
//! This backend doesn't perform actual GPU operations but provides
//! a valid implementation for testing program generation without
//! requiring GPU hardware. Shader sources are not compiled.

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};

use crate::error::GraphicsError;
use crate::layout::{DescriptorSetLayout, DescriptorSetLayoutDescriptor, PushConstantRange};
use crate::pipeline::GraphicsPipelineDescriptor;
use crate::shader::ShaderStage;

use super::{GpuBackend, GpuDescriptorSetLayout, GpuPipeline, GpuPipelineLayout, GpuShaderModule};

/// Dummy GPU backend.
#[derive(Debug, Default)]
pub struct DummyBackend {
    reject_pipelines: AtomicBool,
    reject_shader_modules: AtomicBool,
    pipelines_created: AtomicUsize,
}

impl DummyBackend {
    /// Create a new dummy backend.
    pub fn new() -> Self {
        Self::default()
    }

    /// Make every following pipeline creation fail, to exercise
    /// finalization errors.
    pub fn reject_pipelines(&self, reject: bool) {
        self.reject_pipelines.store(reject, Ordering::Release);
    }

    /// Make every following shader module creation fail.
    pub fn reject_shader_modules(&self, reject: bool) {
        self.reject_shader_modules.store(reject, Ordering::Release);
    }

    /// Number of pipelines created so far.
    pub fn pipelines_created(&self) -> usize {
        self.pipelines_created.load(Ordering::Acquire)
    }
}

impl GpuBackend for DummyBackend {
    fn name(&self) -> &'static str {
        "Dummy Backend"
    }

    fn create_descriptor_set_layout(
        &self,
        descriptor: &DescriptorSetLayoutDescriptor,
    ) -> Result<GpuDescriptorSetLayout, GraphicsError> {
        log::trace!(
            "DummyBackend: creating descriptor set layout {:?} ({} bindings)",
            descriptor.label,
            descriptor.entries.len()
        );
        Ok(GpuDescriptorSetLayout::Dummy)
    }

    fn create_pipeline_layout(
        &self,
        set_layouts: &[Arc<DescriptorSetLayout>],
        push_constant_ranges: &[PushConstantRange],
    ) -> Result<GpuPipelineLayout, GraphicsError> {
        log::trace!(
            "DummyBackend: creating pipeline layout ({} sets, {} push constant ranges)",
            set_layouts.len(),
            push_constant_ranges.len()
        );
        Ok(GpuPipelineLayout::Dummy)
    }

    fn create_shader_module(
        &self,
        stage: ShaderStage,
        name: &str,
        source: &str,
    ) -> Result<GpuShaderModule, GraphicsError> {
        if self.reject_shader_modules.load(Ordering::Acquire) {
            return Err(GraphicsError::ShaderCompilationFailed(format!(
                "{stage} module '{name}' rejected"
            )));
        }

        log::trace!(
            "DummyBackend: creating {stage} module '{name}' ({} bytes)",
            source.len()
        );
        Ok(GpuShaderModule::Dummy)
    }

    fn create_graphics_pipeline(
        &self,
        descriptor: &GraphicsPipelineDescriptor,
    ) -> Result<GpuPipeline, GraphicsError> {
        if self.reject_pipelines.load(Ordering::Acquire) {
            return Err(GraphicsError::ResourceCreationFailed(format!(
                "pipeline {:?} rejected",
                descriptor.label
            )));
        }

        log::trace!(
            "DummyBackend: creating graphics pipeline {:?} ({} stages)",
            descriptor.label,
            descriptor.shader_modules.len()
        );
        self.pipelines_created.fetch_add(1, Ordering::AcqRel);
        Ok(GpuPipeline::Dummy)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::layout::ShaderStageFlags;

    #[test]
    fn test_dummy_objects() {
        let backend = DummyBackend::new();
        assert_eq!(backend.name(), "Dummy Backend");

        let descriptor =
            DescriptorSetLayoutDescriptor::new().with_uniform_buffer(0, ShaderStageFlags::VERTEX);
        assert!(matches!(
            backend.create_descriptor_set_layout(&descriptor),
            Ok(GpuDescriptorSetLayout::Dummy)
        ));
        assert!(matches!(
            backend.create_shader_module(ShaderStage::Vertex, "Test", "void main() {}"),
            Ok(GpuShaderModule::Dummy)
        ));
        assert_eq!(backend.pipelines_created(), 0);
    }

    #[test]
    fn test_rejected_shader_modules() {
        let backend = DummyBackend::new();
        backend.reject_shader_modules(true);
        assert!(matches!(
            backend.create_shader_module(ShaderStage::Fragment, "Test", "void main() {}"),
            Err(GraphicsError::ShaderCompilationFailed(_))
        ));

        backend.reject_shader_modules(false);
        assert!(
            backend
                .create_shader_module(ShaderStage::Fragment, "Test", "void main() {}")
                .is_ok()
        );
    }
}
