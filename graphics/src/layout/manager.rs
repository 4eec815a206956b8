//! Shared layout cache.

use std::collections::HashMap;
use std::sync::Arc;

use parking_lot::Mutex;

use crate::backend::GpuBackend;
use crate::error::GraphicsError;

use super::{
    DescriptorSetLayout, DescriptorSetLayoutDescriptor, PipelineLayout, PushConstantRange,
    descriptor_set_layout_key, pipeline_layout_key,
};

/// Get-or-create cache of descriptor set layouts and pipeline layouts.
///
/// Independent program builds may race for the same layout; the lock is
/// held during creation so every key is created once.
pub struct LayoutManager {
    backend: Arc<dyn GpuBackend>,
    descriptor_set_layouts: Mutex<HashMap<u64, Arc<DescriptorSetLayout>>>,
    pipeline_layouts: Mutex<HashMap<u64, Arc<PipelineLayout>>>,
}

impl std::fmt::Debug for LayoutManager {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LayoutManager")
            .field("backend", &self.backend.name())
            .field("descriptor_set_layouts", &self.descriptor_set_layouts.lock().len())
            .field("pipeline_layouts", &self.pipeline_layouts.lock().len())
            .finish()
    }
}

impl LayoutManager {
    pub fn new(backend: Arc<dyn GpuBackend>) -> Self {
        Self {
            backend,
            descriptor_set_layouts: Mutex::new(HashMap::new()),
            pipeline_layouts: Mutex::new(HashMap::new()),
        }
    }

    /// Fetch or create the descriptor set layout matching `descriptor`.
    pub fn get_descriptor_set_layout(
        &self,
        descriptor: &DescriptorSetLayoutDescriptor,
    ) -> Result<Arc<DescriptorSetLayout>, GraphicsError> {
        if descriptor.is_empty() {
            return Err(GraphicsError::InvalidParameter(format!(
                "descriptor set layout {:?} has no binding",
                descriptor.label
            )));
        }

        let key = descriptor_set_layout_key(descriptor);
        let mut cache = self.descriptor_set_layouts.lock();
        if let Some(layout) = cache.get(&key) {
            return Ok(Arc::clone(layout));
        }

        let handle = self.backend.create_descriptor_set_layout(descriptor)?;
        let layout = Arc::new(DescriptorSetLayout::new(descriptor.clone(), key, handle));
        cache.insert(key, Arc::clone(&layout));
        log::debug!(
            "Descriptor set layout {:?} created ({} bindings)",
            descriptor.label,
            descriptor.entries.len()
        );

        Ok(layout)
    }

    /// Fetch or create the pipeline layout for an ordered list of set
    /// layouts and push constant ranges.
    pub fn get_pipeline_layout(
        &self,
        set_layouts: Vec<Arc<DescriptorSetLayout>>,
        push_constant_ranges: Vec<PushConstantRange>,
    ) -> Result<Arc<PipelineLayout>, GraphicsError> {
        let key = pipeline_layout_key(&set_layouts, &push_constant_ranges);
        let mut cache = self.pipeline_layouts.lock();
        if let Some(layout) = cache.get(&key) {
            return Ok(Arc::clone(layout));
        }

        let handle = self
            .backend
            .create_pipeline_layout(&set_layouts, &push_constant_ranges)?;
        let layout = Arc::new(PipelineLayout::new(
            set_layouts,
            push_constant_ranges,
            key,
            handle,
        ));
        cache.insert(key, Arc::clone(&layout));

        Ok(layout)
    }

    pub fn descriptor_set_layout_count(&self) -> usize {
        self.descriptor_set_layouts.lock().len()
    }

    pub fn pipeline_layout_count(&self) -> usize {
        self.pipeline_layouts.lock().len()
    }

    /// Drop every cached layout. Layouts still held by programs stay alive.
    pub fn clear(&self) {
        self.pipeline_layouts.lock().clear();
        self.descriptor_set_layouts.lock().clear();
    }
}
