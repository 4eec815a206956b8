//! GLSL to SPIR-V compilation through naga.

use crate::error::GraphicsError;

use super::ShaderStage;

/// Map a stage to naga. The GLSL front end only handles vertex and
/// fragment stages.
fn naga_stage(stage: ShaderStage) -> Result<naga::ShaderStage, GraphicsError> {
    match stage {
        ShaderStage::Vertex => Ok(naga::ShaderStage::Vertex),
        ShaderStage::Fragment => Ok(naga::ShaderStage::Fragment),
        _ => Err(GraphicsError::FeatureNotSupported(format!(
            "GLSL compilation of {stage}"
        ))),
    }
}

/// Compile a generated GLSL stage to SPIR-V words.
pub fn compile_glsl(stage: ShaderStage, source: &str) -> Result<Vec<u32>, GraphicsError> {
    let naga_stage = naga_stage(stage)?;

    let mut frontend = naga::front::glsl::Frontend::default();
    let module = frontend
        .parse(&naga::front::glsl::Options::from(naga_stage), source)
        .map_err(|e| {
            GraphicsError::ShaderCompilationFailed(format!("{stage} parse error: {e:?}"))
        })?;

    let mut validator = naga::valid::Validator::new(
        naga::valid::ValidationFlags::all(),
        naga::valid::Capabilities::all(),
    );
    let info = validator.validate(&module).map_err(|e| {
        GraphicsError::ShaderCompilationFailed(format!("{stage} validation error: {e}"))
    })?;

    let options = naga::back::spv::Options {
        lang_version: (1, 3),
        flags: naga::back::spv::WriterFlags::empty(),
        capabilities: None,
        bounds_check_policies: naga::proc::BoundsCheckPolicies::default(),
        binding_map: Default::default(),
        debug_info: None,
        zero_initialize_workgroup_memory: naga::back::spv::ZeroInitializeWorkgroupMemoryMode::None,
    };

    let pipeline_options = naga::back::spv::PipelineOptions {
        shader_stage: naga_stage,
        entry_point: "main".to_string(),
    };

    naga::back::spv::write_vec(&module, &info, &options, Some(&pipeline_options)).map_err(|e| {
        GraphicsError::ShaderCompilationFailed(format!("{stage} SPIR-V generation error: {e}"))
    })
}
