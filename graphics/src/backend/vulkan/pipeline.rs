//! Vulkan layout, shader module and graphics pipeline creation.

use std::sync::Arc;

use ash::vk;

use crate::backend::{GpuDescriptorSetLayout, GpuPipelineLayout, GpuShaderModule};
use crate::error::GraphicsError;
use crate::layout::{DescriptorSetLayout, DescriptorSetLayoutDescriptor, PushConstantRange};
use crate::pipeline::GraphicsPipelineDescriptor;
use crate::shader::{ShaderStage, compiler};

use super::conversion::{
    convert_binding_type, convert_blend_state, convert_compare_function, convert_cull_mode,
    convert_front_face, convert_polygon_mode, convert_sample_count, convert_shader_stage,
    convert_shader_stage_flags, convert_step_mode, convert_texture_format, convert_topology,
    convert_vertex_format,
};

/// Create a descriptor set layout from its entries.
pub fn create_descriptor_set_layout(
    device: &ash::Device,
    descriptor: &DescriptorSetLayoutDescriptor,
) -> Result<vk::DescriptorSetLayout, GraphicsError> {
    let bindings: Vec<vk::DescriptorSetLayoutBinding> = descriptor
        .entries
        .iter()
        .map(|entry| {
            vk::DescriptorSetLayoutBinding::default()
                .binding(entry.binding)
                .descriptor_type(convert_binding_type(entry.binding_type))
                .descriptor_count(entry.count)
                .stage_flags(convert_shader_stage_flags(entry.visibility))
        })
        .collect();

    let create_info = vk::DescriptorSetLayoutCreateInfo::default().bindings(&bindings);

    unsafe { device.create_descriptor_set_layout(&create_info, None) }.map_err(|e| {
        GraphicsError::ResourceCreationFailed(format!(
            "Failed to create descriptor set layout {:?}: {:?}",
            descriptor.label, e
        ))
    })
}

/// Create a pipeline layout from ordered set layouts and push constant ranges.
pub fn create_pipeline_layout(
    device: &ash::Device,
    set_layouts: &[Arc<DescriptorSetLayout>],
    push_constant_ranges: &[PushConstantRange],
) -> Result<vk::PipelineLayout, GraphicsError> {
    let vk_set_layouts = set_layouts
        .iter()
        .map(|layout| match layout.gpu_handle() {
            GpuDescriptorSetLayout::Vulkan { layout, .. } => Ok(*layout),
            GpuDescriptorSetLayout::Dummy => Err(GraphicsError::InvalidParameter(
                "descriptor set layout was not created by the Vulkan backend".to_string(),
            )),
        })
        .collect::<Result<Vec<_>, _>>()?;

    let vk_ranges: Vec<vk::PushConstantRange> = push_constant_ranges
        .iter()
        .map(|range| {
            vk::PushConstantRange::default()
                .stage_flags(convert_shader_stage_flags(range.stages))
                .offset(range.offset)
                .size(range.size)
        })
        .collect();

    let create_info = vk::PipelineLayoutCreateInfo::default()
        .set_layouts(&vk_set_layouts)
        .push_constant_ranges(&vk_ranges);

    unsafe { device.create_pipeline_layout(&create_info, None) }.map_err(|e| {
        GraphicsError::ResourceCreationFailed(format!("Failed to create pipeline layout: {:?}", e))
    })
}

/// Compile a GLSL stage to SPIR-V and create a shader module.
pub fn create_shader_module(
    device: &ash::Device,
    stage: ShaderStage,
    name: &str,
    source: &str,
) -> Result<vk::ShaderModule, GraphicsError> {
    let spirv = compiler::compile_glsl(stage, source)?;
    let create_info = vk::ShaderModuleCreateInfo::default().code(&spirv);

    unsafe { device.create_shader_module(&create_info, None) }.map_err(|e| {
        GraphicsError::ShaderCompilationFailed(format!(
            "Failed to create shader module '{name}': {:?}",
            e
        ))
    })
}

/// Create a graphics pipeline using dynamic rendering.
pub fn create_graphics_pipeline(
    device: &ash::Device,
    descriptor: &GraphicsPipelineDescriptor,
) -> Result<vk::Pipeline, GraphicsError> {
    let layout = match descriptor.layout.gpu_handle() {
        GpuPipelineLayout::Vulkan { layout, .. } => *layout,
        GpuPipelineLayout::Dummy => {
            return Err(GraphicsError::InvalidParameter(
                "pipeline layout was not created by the Vulkan backend".to_string(),
            ));
        }
    };

    let shader_stages = descriptor
        .shader_modules
        .iter()
        .map(|module| match module.gpu_handle() {
            GpuShaderModule::Vulkan { module: handle, .. } => {
                Ok(vk::PipelineShaderStageCreateInfo::default()
                    .stage(convert_shader_stage(module.stage()))
                    .module(*handle)
                    .name(c"main"))
            }
            GpuShaderModule::Dummy => Err(GraphicsError::InvalidParameter(format!(
                "shader module '{}' was not created by the Vulkan backend",
                module.name()
            ))),
        })
        .collect::<Result<Vec<_>, _>>()?;

    // Vertex input from the program's vertex buffer format
    let format = &descriptor.vertex_format;

    let binding_descriptions: Vec<vk::VertexInputBindingDescription> = format
        .buffers()
        .iter()
        .enumerate()
        .map(|(i, buffer)| {
            vk::VertexInputBindingDescription::default()
                .binding(i as u32)
                .stride(buffer.stride)
                .input_rate(convert_step_mode(buffer.step_mode))
        })
        .collect();

    let attribute_descriptions: Vec<vk::VertexInputAttributeDescription> = format
        .attributes()
        .iter()
        .map(|input| {
            vk::VertexInputAttributeDescription::default()
                .location(input.location)
                .binding(input.buffer_index)
                .format(convert_vertex_format(input.format))
                .offset(input.offset)
        })
        .collect();

    let vertex_input_state = vk::PipelineVertexInputStateCreateInfo::default()
        .vertex_binding_descriptions(&binding_descriptions)
        .vertex_attribute_descriptions(&attribute_descriptions);

    let tessellated = descriptor.tessellation.is_some();
    let input_assembly_state = vk::PipelineInputAssemblyStateCreateInfo::default()
        .topology(convert_topology(
            descriptor.input_assembly.topology,
            tessellated,
        ))
        .primitive_restart_enable(descriptor.input_assembly.primitive_restart && !tessellated);

    let tessellation_state = vk::PipelineTessellationStateCreateInfo::default().patch_control_points(
        descriptor
            .tessellation
            .map_or(0, |state| state.patch_control_points),
    );

    // Static viewport covering the render target, flipped to keep +Y up
    let extent = descriptor.viewport.extent;
    let viewports = [vk::Viewport {
        x: 0.0,
        y: extent.height as f32,
        width: extent.width as f32,
        height: -(extent.height as f32),
        min_depth: 0.0,
        max_depth: 1.0,
    }];
    let scissors = [vk::Rect2D {
        offset: vk::Offset2D { x: 0, y: 0 },
        extent: vk::Extent2D {
            width: extent.width,
            height: extent.height,
        },
    }];
    let viewport_state = vk::PipelineViewportStateCreateInfo::default()
        .viewports(&viewports)
        .scissors(&scissors);

    let states = &descriptor.states;

    let rasterization_state = vk::PipelineRasterizationStateCreateInfo::default()
        .depth_clamp_enable(false)
        .rasterizer_discard_enable(false)
        .polygon_mode(convert_polygon_mode(states.rasterization.polygon_mode))
        .line_width(1.0)
        .cull_mode(convert_cull_mode(states.rasterization.cull_mode))
        .front_face(convert_front_face(states.rasterization.front_face))
        .depth_bias_enable(states.rasterization.depth_bias);

    let multisample_state = vk::PipelineMultisampleStateCreateInfo::default()
        .sample_shading_enable(false)
        .rasterization_samples(convert_sample_count(descriptor.multisample.samples));

    let has_depth = descriptor.depth_format.is_some();
    let depth_stencil_state = vk::PipelineDepthStencilStateCreateInfo::default()
        .depth_test_enable(has_depth && states.depth_stencil.depth_test)
        .depth_write_enable(has_depth && states.depth_stencil.depth_write)
        .depth_compare_op(convert_compare_function(states.depth_stencil.compare))
        .depth_bounds_test_enable(false)
        .stencil_test_enable(states.depth_stencil.stencil_test);

    let color_blend_attachments = [convert_blend_state(states.color_blend.blend.as_ref())];
    let color_blend_state = vk::PipelineColorBlendStateCreateInfo::default()
        .logic_op_enable(false)
        .attachments(&color_blend_attachments);

    let color_attachment_formats = [convert_texture_format(descriptor.color_format)];
    let depth_attachment_format = descriptor
        .depth_format
        .map_or(vk::Format::UNDEFINED, convert_texture_format);
    let stencil_attachment_format = descriptor
        .depth_format
        .filter(|format| format.has_stencil())
        .map_or(vk::Format::UNDEFINED, convert_texture_format);

    let mut rendering_info = vk::PipelineRenderingCreateInfo::default()
        .color_attachment_formats(&color_attachment_formats)
        .depth_attachment_format(depth_attachment_format)
        .stencil_attachment_format(stencil_attachment_format);

    let mut pipeline_info = vk::GraphicsPipelineCreateInfo::default()
        .stages(&shader_stages)
        .vertex_input_state(&vertex_input_state)
        .input_assembly_state(&input_assembly_state)
        .viewport_state(&viewport_state)
        .rasterization_state(&rasterization_state)
        .multisample_state(&multisample_state)
        .depth_stencil_state(&depth_stencil_state)
        .color_blend_state(&color_blend_state)
        .layout(layout)
        .push_next(&mut rendering_info);

    if tessellated {
        pipeline_info = pipeline_info.tessellation_state(&tessellation_state);
    }

    let pipelines = unsafe {
        device.create_graphics_pipelines(vk::PipelineCache::null(), &[pipeline_info], None)
    }
    .map_err(|(_, e)| {
        GraphicsError::ResourceCreationFailed(format!(
            "Failed to create graphics pipeline {:?}: {:?}",
            descriptor.label, e
        ))
    })?;

    pipelines.into_iter().next().ok_or_else(|| {
        GraphicsError::Internal("Vulkan returned no graphics pipeline".to_string())
    })
}
