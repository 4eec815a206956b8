//! Vulkan physical and logical device selection.

use ash::vk;

use crate::error::GraphicsError;

use super::instance::REQUIRED_API_VERSION;

/// Pick the best device able to run Vulkan 1.3 graphics.
///
/// Discrete GPUs win over integrated ones, which win over everything else.
/// Returns the device and its graphics queue family.
pub fn select_physical_device(
    instance: &ash::Instance,
) -> Result<(vk::PhysicalDevice, u32), GraphicsError> {
    let devices = unsafe { instance.enumerate_physical_devices() }.map_err(|e| {
        GraphicsError::InitializationFailed(format!(
            "Failed to enumerate physical devices: {:?}",
            e
        ))
    })?;

    devices
        .into_iter()
        .filter_map(|device| {
            let properties = unsafe { instance.get_physical_device_properties(device) };
            if properties.api_version < REQUIRED_API_VERSION {
                return None;
            }

            let queue_family = find_graphics_queue_family(instance, device)?;
            let score = match properties.device_type {
                vk::PhysicalDeviceType::DISCRETE_GPU => 2,
                vk::PhysicalDeviceType::INTEGRATED_GPU => 1,
                _ => 0,
            };

            log::info!(
                "Found GPU: {:?} (type: {:?})",
                properties.device_name_as_c_str().unwrap_or(c"unknown"),
                properties.device_type
            );

            Some((score, device, queue_family))
        })
        .max_by_key(|(score, _, _)| *score)
        .map(|(_, device, queue_family)| (device, queue_family))
        .ok_or_else(|| {
            GraphicsError::InitializationFailed("No Vulkan 1.3 capable GPU found".to_string())
        })
}

fn find_graphics_queue_family(
    instance: &ash::Instance,
    physical_device: vk::PhysicalDevice,
) -> Option<u32> {
    unsafe { instance.get_physical_device_queue_family_properties(physical_device) }
        .iter()
        .position(|family| family.queue_flags.contains(vk::QueueFlags::GRAPHICS))
        .map(|index| index as u32)
}

/// Create a logical device with dynamic rendering and the features
/// generated programs may use.
pub fn create_logical_device(
    instance: &ash::Instance,
    physical_device: vk::PhysicalDevice,
    graphics_queue_family: u32,
) -> Result<ash::Device, GraphicsError> {
    let queue_priorities = [1.0f32];
    let queue_create_infos = [vk::DeviceQueueCreateInfo::default()
        .queue_family_index(graphics_queue_family)
        .queue_priorities(&queue_priorities)];

    let supported = unsafe { instance.get_physical_device_features(physical_device) };
    let features = vk::PhysicalDeviceFeatures::default()
        .tessellation_shader(supported.tessellation_shader == vk::TRUE)
        .geometry_shader(supported.geometry_shader == vk::TRUE)
        .fill_mode_non_solid(supported.fill_mode_non_solid == vk::TRUE);

    let mut vulkan_13_features =
        vk::PhysicalDeviceVulkan13Features::default().dynamic_rendering(true);

    let create_info = vk::DeviceCreateInfo::default()
        .queue_create_infos(&queue_create_infos)
        .enabled_features(&features)
        .push_next(&mut vulkan_13_features);

    unsafe { instance.create_device(physical_device, &create_info, None) }.map_err(|e| {
        GraphicsError::InitializationFailed(format!("Failed to create logical device: {:?}", e))
    })
}
