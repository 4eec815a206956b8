//! Generation configuration.

use bitflags::bitflags;

use crate::shader::ModelMatrixStrategy;
use crate::shader::keys;

bitflags! {
    /// Switches consulted by program generators.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
    pub struct GeneratorFlags: u32 {
        /// Log declaration stats and dump generated sources.
        const DEBUG = 1 << 0;
        /// Light per fragment instead of per vertex.
        const HIGH_QUALITY_LIGHT = 1 << 1;
    }
}

/// Settings shared by every stage generated for a program.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GeneratorConfig {
    glsl_version: String,
    glsl_profile: String,
    embedded_precision: bool,
    dump_sources: bool,
    model_uniform_block: bool,
    flags: GeneratorFlags,
}

impl Default for GeneratorConfig {
    fn default() -> Self {
        Self::new()
    }
}

impl GeneratorConfig {
    pub fn new() -> Self {
        Self {
            glsl_version: keys::GLSL_VERSION.to_string(),
            glsl_profile: keys::GLSL_PROFILE.to_string(),
            embedded_precision: false,
            dump_sources: false,
            model_uniform_block: false,
            flags: GeneratorFlags::empty(),
        }
    }

    pub fn with_glsl_version(mut self, version: impl Into<String>) -> Self {
        self.glsl_version = version.into();
        self
    }

    pub fn with_glsl_profile(mut self, profile: impl Into<String>) -> Self {
        self.glsl_profile = profile.into();
        self
    }

    /// Write a default float precision, as embedded GLSL requires.
    pub fn with_embedded_precision(mut self, enabled: bool) -> Self {
        self.embedded_precision = enabled;
        self
    }

    /// Log every generated source at debug level.
    pub fn with_dump_sources(mut self, enabled: bool) -> Self {
        self.dump_sources = enabled;
        self
    }

    /// Read matrices from uniform blocks instead of push constants: the
    /// model block for single draws, the view block for instanced ones.
    pub fn with_model_uniform_block(mut self, enabled: bool) -> Self {
        self.model_uniform_block = enabled;
        self
    }

    pub fn with_flags(mut self, flags: GeneratorFlags) -> Self {
        self.flags = flags;
        self
    }

    pub fn glsl_version(&self) -> &str {
        &self.glsl_version
    }

    pub fn glsl_profile(&self) -> &str {
        &self.glsl_profile
    }

    pub fn embedded_precision(&self) -> bool {
        self.embedded_precision
    }

    pub fn dump_sources(&self) -> bool {
        self.dump_sources || self.flags.contains(GeneratorFlags::DEBUG)
    }

    pub fn model_uniform_block(&self) -> bool {
        self.model_uniform_block
    }

    pub fn flags(&self) -> GeneratorFlags {
        self.flags
    }

    pub fn is_enabled(&self, flag: GeneratorFlags) -> bool {
        self.flags.contains(flag)
    }

    /// Model matrix source for a program with the given matrix options.
    ///
    /// Billboards face the camera and need the view matrix.
    pub fn model_matrix_strategy(
        &self,
        instancing: bool,
        advanced: bool,
        billboarding: bool,
    ) -> ModelMatrixStrategy {
        let advanced = advanced || billboarding;
        match (instancing, self.model_uniform_block) {
            (true, true) => ModelMatrixStrategy::VertexBuffer,
            (true, false) => ModelMatrixStrategy::InstancedPushConstant { advanced },
            (false, true) => ModelMatrixStrategy::UniformBlock,
            (false, false) => ModelMatrixStrategy::PushConstant { advanced },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = GeneratorConfig::default();
        assert_eq!(config.glsl_version(), "460");
        assert_eq!(config.glsl_profile(), "core");
        assert!(!config.embedded_precision());
        assert!(!config.dump_sources());
    }

    #[test]
    fn test_debug_flag_dumps_sources() {
        let config = GeneratorConfig::new().with_flags(GeneratorFlags::DEBUG);
        assert!(config.dump_sources());
        assert!(!config.is_enabled(GeneratorFlags::HIGH_QUALITY_LIGHT));
    }

    #[test]
    fn test_model_matrix_strategy() {
        let config = GeneratorConfig::new();
        assert_eq!(
            config.model_matrix_strategy(true, false, false),
            ModelMatrixStrategy::InstancedPushConstant { advanced: false }
        );
        assert_eq!(
            config.model_matrix_strategy(true, false, true),
            ModelMatrixStrategy::InstancedPushConstant { advanced: true }
        );
        assert_eq!(
            config.model_matrix_strategy(false, false, false),
            ModelMatrixStrategy::PushConstant { advanced: false }
        );
        assert_eq!(
            config.model_matrix_strategy(false, false, true),
            ModelMatrixStrategy::PushConstant { advanced: true }
        );

        let config = config.with_model_uniform_block(true);
        assert_eq!(
            config.model_matrix_strategy(false, true, false),
            ModelMatrixStrategy::UniformBlock
        );
        assert_eq!(
            config.model_matrix_strategy(true, true, false),
            ModelMatrixStrategy::VertexBuffer
        );
    }
}
