//! Native Vulkan backend using ash.
//!
//! The backend owns a headless instance and a logical device with dynamic
//! rendering enabled. Every object it creates carries a clone of the device
//! handle and destroys itself on drop, so all objects must be released
//! before the backend.

mod conversion;
mod debug;
mod device;
mod instance;
mod pipeline;

use std::sync::Arc;

use ash::vk;

use crate::error::GraphicsError;
use crate::layout::{DescriptorSetLayout, DescriptorSetLayoutDescriptor, PushConstantRange};
use crate::pipeline::GraphicsPipelineDescriptor;
use crate::shader::ShaderStage;

use super::{GpuBackend, GpuDescriptorSetLayout, GpuPipeline, GpuPipelineLayout, GpuShaderModule};

/// Vulkan GPU backend.
pub struct VulkanBackend {
    /// Vulkan entry points (function loader).
    _entry: ash::Entry,
    instance: ash::Instance,
    debug_utils: Option<(ash::ext::debug_utils::Instance, vk::DebugUtilsMessengerEXT)>,
    physical_device: vk::PhysicalDevice,
    device: ash::Device,
    graphics_queue_family: u32,
}

impl std::fmt::Debug for VulkanBackend {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("VulkanBackend")
            .field("physical_device", &self.physical_device)
            .field("validation", &self.debug_utils.is_some())
            .finish_non_exhaustive()
    }
}

impl VulkanBackend {
    /// Create a backend, with validation layers in debug builds.
    pub fn new() -> Result<Self, GraphicsError> {
        Self::with_validation(cfg!(debug_assertions))
    }

    /// Create a backend with explicit validation setting.
    pub fn with_validation(validation: bool) -> Result<Self, GraphicsError> {
        let entry = unsafe { ash::Entry::load() }.map_err(|e| {
            GraphicsError::InitializationFailed(format!("Failed to load Vulkan: {}", e))
        })?;

        let instance::InstanceContext {
            instance,
            debug_utils,
        } = instance::create_instance(&entry, validation)?;

        let device = device::select_physical_device(&instance).and_then(
            |(physical_device, graphics_queue_family)| {
                device::create_logical_device(&instance, physical_device, graphics_queue_family)
                    .map(|device| (physical_device, graphics_queue_family, device))
            },
        );

        let (physical_device, graphics_queue_family, device) = match device {
            Ok(selected) => selected,
            Err(e) => {
                unsafe {
                    if let Some((loader, messenger)) = &debug_utils {
                        loader.destroy_debug_utils_messenger(*messenger, None);
                    }
                    instance.destroy_instance(None);
                }
                return Err(e);
            }
        };

        log::info!(
            "Vulkan backend initialized (validation: {})",
            debug_utils.is_some()
        );

        Ok(Self {
            _entry: entry,
            instance,
            debug_utils,
            physical_device,
            device,
            graphics_queue_family,
        })
    }

    /// Get the Vulkan device.
    pub fn device(&self) -> &ash::Device {
        &self.device
    }

    /// Get the physical device.
    pub fn physical_device(&self) -> vk::PhysicalDevice {
        self.physical_device
    }

    /// Get the graphics queue family index.
    pub fn graphics_queue_family(&self) -> u32 {
        self.graphics_queue_family
    }
}

impl GpuBackend for VulkanBackend {
    fn name(&self) -> &'static str {
        "Vulkan Backend (ash)"
    }

    fn create_descriptor_set_layout(
        &self,
        descriptor: &DescriptorSetLayoutDescriptor,
    ) -> Result<GpuDescriptorSetLayout, GraphicsError> {
        let layout = pipeline::create_descriptor_set_layout(&self.device, descriptor)?;
        Ok(GpuDescriptorSetLayout::Vulkan {
            device: self.device.clone(),
            layout,
        })
    }

    fn create_pipeline_layout(
        &self,
        set_layouts: &[Arc<DescriptorSetLayout>],
        push_constant_ranges: &[PushConstantRange],
    ) -> Result<GpuPipelineLayout, GraphicsError> {
        let layout =
            pipeline::create_pipeline_layout(&self.device, set_layouts, push_constant_ranges)?;
        Ok(GpuPipelineLayout::Vulkan {
            device: self.device.clone(),
            layout,
        })
    }

    fn create_shader_module(
        &self,
        stage: ShaderStage,
        name: &str,
        source: &str,
    ) -> Result<GpuShaderModule, GraphicsError> {
        let module = pipeline::create_shader_module(&self.device, stage, name, source)?;
        Ok(GpuShaderModule::Vulkan {
            device: self.device.clone(),
            module,
        })
    }

    fn create_graphics_pipeline(
        &self,
        descriptor: &GraphicsPipelineDescriptor,
    ) -> Result<GpuPipeline, GraphicsError> {
        let pipeline = pipeline::create_graphics_pipeline(&self.device, descriptor)?;
        Ok(GpuPipeline::Vulkan {
            device: self.device.clone(),
            pipeline,
        })
    }
}

impl Drop for VulkanBackend {
    fn drop(&mut self) {
        unsafe {
            let _ = self.device.device_wait_idle();
            self.device.destroy_device(None);

            if let Some((loader, messenger)) = &self.debug_utils {
                loader.destroy_debug_utils_messenger(*messenger, None);
            }

            self.instance.destroy_instance(None);
        }
    }
}
