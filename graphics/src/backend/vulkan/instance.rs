//! Vulkan instance creation.
//!
//! Program generation never presents, so the instance is headless: no
//! surface extension is requested.

use std::ffi::CStr;

use ash::vk;

use crate::error::GraphicsError;

use super::debug;

/// Dynamic rendering is core from Vulkan 1.3.
pub const REQUIRED_API_VERSION: u32 = vk::make_api_version(0, 1, 3, 0);

const VALIDATION_LAYER_NAME: &CStr = c"VK_LAYER_KHRONOS_validation";

/// Instance and the optional validation messenger attached to it.
pub struct InstanceContext {
    pub instance: ash::Instance,
    pub debug_utils: Option<(ash::ext::debug_utils::Instance, vk::DebugUtilsMessengerEXT)>,
}

/// Create a headless Vulkan instance, with validation when requested and
/// available.
pub fn create_instance(
    entry: &ash::Entry,
    validation: bool,
) -> Result<InstanceContext, GraphicsError> {
    let validation = validation && has_validation_layer(entry);

    let app_info = vk::ApplicationInfo::default()
        .application_name(c"Opaline")
        .application_version(vk::make_api_version(0, 0, 1, 0))
        .engine_name(c"Opaline Program Generator")
        .engine_version(vk::make_api_version(0, 0, 1, 0))
        .api_version(REQUIRED_API_VERSION);

    let mut extensions = Vec::new();
    let mut layers = Vec::new();
    if validation {
        extensions.push(ash::ext::debug_utils::NAME.as_ptr());
        layers.push(VALIDATION_LAYER_NAME.as_ptr());
    }

    #[allow(unused_mut)]
    let mut create_flags = vk::InstanceCreateFlags::empty();

    #[cfg(target_os = "macos")]
    {
        extensions.push(ash::khr::portability_enumeration::NAME.as_ptr());
        create_flags |= vk::InstanceCreateFlags::ENUMERATE_PORTABILITY_KHR;
    }

    let create_info = vk::InstanceCreateInfo::default()
        .flags(create_flags)
        .application_info(&app_info)
        .enabled_extension_names(&extensions)
        .enabled_layer_names(&layers);

    let instance = unsafe { entry.create_instance(&create_info, None) }.map_err(|e| {
        GraphicsError::InitializationFailed(format!("Failed to create Vulkan instance: {:?}", e))
    })?;

    let debug_utils = if validation {
        let loader = ash::ext::debug_utils::Instance::new(entry, &instance);
        match debug::create_debug_messenger(&loader) {
            Ok(messenger) => Some((loader, messenger)),
            Err(e) => {
                unsafe { instance.destroy_instance(None) };
                return Err(e);
            }
        }
    } else {
        None
    };

    Ok(InstanceContext {
        instance,
        debug_utils,
    })
}

fn has_validation_layer(entry: &ash::Entry) -> bool {
    let Ok(layers) = (unsafe { entry.enumerate_instance_layer_properties() }) else {
        return false;
    };

    let found = layers
        .iter()
        .any(|layer| layer.layer_name_as_c_str() == Ok(VALIDATION_LAYER_NAME));
    if !found {
        log::warn!("Validation layers requested but not available");
    }
    found
}
