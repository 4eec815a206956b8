//! Descriptor set layouts, push constant ranges and pipeline layouts.
//!
//! Layouts are content-keyed: two descriptors with the same entries produce
//! the same key, and the [`LayoutManager`] hands out one shared object per
//! key. The key functions are pure so cache behavior can be checked without
//! a device.

mod manager;

use std::collections::hash_map::DefaultHasher;
use std::hash::{Hash, Hasher};
use std::sync::Arc;

use crate::backend::{GpuDescriptorSetLayout, GpuPipelineLayout};
use crate::shader::declaration::PushConstantBlock;

pub use manager::LayoutManager;

bitflags::bitflags! {
    /// Shader stages that can access a binding or push constant range.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
    pub struct ShaderStageFlags: u32 {
        const VERTEX = 1 << 0;
        const TESSELLATION_CONTROL = 1 << 1;
        const TESSELLATION_EVALUATION = 1 << 2;
        const GEOMETRY = 1 << 3;
        const FRAGMENT = 1 << 4;
    }
}

/// Type of resource bound to a descriptor.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum BindingType {
    /// Uniform buffer (read-only, small, frequently updated).
    UniformBuffer,
    /// Storage buffer (larger data).
    StorageBuffer,
    /// Combined texture and sampler.
    CombinedImageSampler,
    /// Buffer texture.
    UniformTexelBuffer,
}

/// Describes a single binding slot in a descriptor set layout.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct DescriptorSetLayoutEntry {
    /// Binding index within the set.
    pub binding: u32,
    /// Type of resource expected at this binding.
    pub binding_type: BindingType,
    /// Number of descriptors for arrays.
    pub count: u32,
    /// Shader stages that can access this binding.
    pub visibility: ShaderStageFlags,
}

impl DescriptorSetLayoutEntry {
    pub fn new(binding: u32, binding_type: BindingType) -> Self {
        Self {
            binding,
            binding_type,
            count: 1,
            visibility: ShaderStageFlags::VERTEX | ShaderStageFlags::FRAGMENT,
        }
    }

    pub fn with_visibility(mut self, visibility: ShaderStageFlags) -> Self {
        self.visibility = visibility;
        self
    }

    pub fn with_count(mut self, count: u32) -> Self {
        self.count = count;
        self
    }
}

/// Content of a descriptor set layout.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct DescriptorSetLayoutDescriptor {
    /// Entries in binding order.
    pub entries: Vec<DescriptorSetLayoutEntry>,
    /// Optional label for debugging. Not part of the cache key.
    pub label: Option<String>,
}

impl DescriptorSetLayoutDescriptor {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_entry(mut self, entry: DescriptorSetLayoutEntry) -> Self {
        self.entries.push(entry);
        self
    }

    /// Add a uniform buffer binding.
    pub fn with_uniform_buffer(self, binding: u32, visibility: ShaderStageFlags) -> Self {
        self.with_entry(
            DescriptorSetLayoutEntry::new(binding, BindingType::UniformBuffer)
                .with_visibility(visibility),
        )
    }

    /// Add a combined texture+sampler binding.
    pub fn with_combined_image_sampler(self, binding: u32, visibility: ShaderStageFlags) -> Self {
        self.with_entry(
            DescriptorSetLayoutEntry::new(binding, BindingType::CombinedImageSampler)
                .with_visibility(visibility),
        )
    }

    pub fn with_label(mut self, label: impl Into<String>) -> Self {
        self.label = Some(label.into());
        self
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// Cache key of a descriptor set layout.
pub fn descriptor_set_layout_key(descriptor: &DescriptorSetLayoutDescriptor) -> u64 {
    let mut hasher = DefaultHasher::new();
    descriptor.entries.hash(&mut hasher);
    hasher.finish()
}

/// Descriptor set layout shared between programs.
#[derive(Debug)]
pub struct DescriptorSetLayout {
    descriptor: DescriptorSetLayoutDescriptor,
    key: u64,
    handle: GpuDescriptorSetLayout,
}

impl DescriptorSetLayout {
    pub(crate) fn new(
        descriptor: DescriptorSetLayoutDescriptor,
        key: u64,
        handle: GpuDescriptorSetLayout,
    ) -> Self {
        Self {
            descriptor,
            key,
            handle,
        }
    }

    pub fn descriptor(&self) -> &DescriptorSetLayoutDescriptor {
        &self.descriptor
    }

    pub fn key(&self) -> u64 {
        self.key
    }

    pub fn gpu_handle(&self) -> &GpuDescriptorSetLayout {
        &self.handle
    }
}

/// Byte range of push constants visible to some stages.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct PushConstantRange {
    pub stages: ShaderStageFlags,
    pub offset: u32,
    pub size: u32,
}

/// Push constant ranges for blocks laid out back to back in declaration
/// order.
pub fn generate_push_constant_ranges(
    blocks: &[PushConstantBlock],
    stages: ShaderStageFlags,
) -> Vec<PushConstantRange> {
    let mut offset = 0;
    blocks
        .iter()
        .map(|block| {
            let range = PushConstantRange {
                stages,
                offset,
                size: block.bytes(),
            };
            offset += range.size;
            range
        })
        .collect()
}

/// Cache key of a pipeline layout.
pub fn pipeline_layout_key(
    set_layouts: &[Arc<DescriptorSetLayout>],
    push_constant_ranges: &[PushConstantRange],
) -> u64 {
    let mut hasher = DefaultHasher::new();
    for layout in set_layouts {
        layout.key().hash(&mut hasher);
    }
    push_constant_ranges.hash(&mut hasher);
    hasher.finish()
}

/// Ordered descriptor set layouts and push constant ranges of a pipeline.
#[derive(Debug)]
pub struct PipelineLayout {
    set_layouts: Vec<Arc<DescriptorSetLayout>>,
    push_constant_ranges: Vec<PushConstantRange>,
    key: u64,
    handle: GpuPipelineLayout,
}

impl PipelineLayout {
    pub(crate) fn new(
        set_layouts: Vec<Arc<DescriptorSetLayout>>,
        push_constant_ranges: Vec<PushConstantRange>,
        key: u64,
        handle: GpuPipelineLayout,
    ) -> Self {
        Self {
            set_layouts,
            push_constant_ranges,
            key,
            handle,
        }
    }

    pub fn set_layouts(&self) -> &[Arc<DescriptorSetLayout>] {
        &self.set_layouts
    }

    pub fn push_constant_ranges(&self) -> &[PushConstantRange] {
        &self.push_constant_ranges
    }

    pub fn key(&self) -> u64 {
        self.key
    }

    pub fn gpu_handle(&self) -> &GpuPipelineLayout {
        &self.handle
    }
}
