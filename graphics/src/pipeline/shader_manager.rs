//! Shader module cache.

use std::collections::HashMap;
use std::collections::hash_map::DefaultHasher;
use std::hash::{Hash, Hasher};
use std::sync::Arc;

use parking_lot::Mutex;

use crate::backend::{GpuBackend, GpuShaderModule};
use crate::error::GraphicsError;
use crate::shader::{Shader, ShaderStage};

/// Cache key of a shader module: identical sources share a module.
pub fn shader_module_key(stage: ShaderStage, source: &str) -> u64 {
    let mut hasher = DefaultHasher::new();
    stage.hash(&mut hasher);
    source.hash(&mut hasher);
    hasher.finish()
}

/// A compiled stage.
#[derive(Debug)]
pub struct ShaderModule {
    stage: ShaderStage,
    name: String,
    key: u64,
    handle: GpuShaderModule,
}

impl ShaderModule {
    pub fn stage(&self) -> ShaderStage {
        self.stage
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn key(&self) -> u64 {
        self.key
    }

    pub fn gpu_handle(&self) -> &GpuShaderModule {
        &self.handle
    }
}

/// Get-or-create cache of shader modules.
pub struct ShaderManager {
    backend: Arc<dyn GpuBackend>,
    modules: Mutex<HashMap<u64, Arc<ShaderModule>>>,
}

impl std::fmt::Debug for ShaderManager {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ShaderManager")
            .field("backend", &self.backend.name())
            .field("modules", &self.modules.lock().len())
            .finish()
    }
}

impl ShaderManager {
    pub fn new(backend: Arc<dyn GpuBackend>) -> Self {
        Self {
            backend,
            modules: Mutex::new(HashMap::new()),
        }
    }

    /// Fetch or compile the module of a generated stage.
    pub fn get_shader_module(&self, shader: &Shader) -> Result<Arc<ShaderModule>, GraphicsError> {
        let key = shader_module_key(shader.stage(), shader.source());
        let mut modules = self.modules.lock();
        if let Some(module) = modules.get(&key) {
            return Ok(Arc::clone(module));
        }

        let handle = self
            .backend
            .create_shader_module(shader.stage(), shader.name(), shader.source())
            .inspect_err(|e| log::error!("Unable to create module of '{}': {e}", shader.name()))?;

        let module = Arc::new(ShaderModule {
            stage: shader.stage(),
            name: shader.name().to_string(),
            key,
            handle,
        });
        modules.insert(key, Arc::clone(&module));

        Ok(module)
    }

    /// Fetch the modules of every stage, in stage order.
    pub fn get_shader_modules<'a>(
        &self,
        shaders: impl IntoIterator<Item = &'a Shader>,
    ) -> Result<Vec<Arc<ShaderModule>>, GraphicsError> {
        shaders
            .into_iter()
            .map(|shader| self.get_shader_module(shader))
            .collect()
    }

    pub fn len(&self) -> usize {
        self.modules.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.modules.lock().is_empty()
    }

    pub fn clear(&self) {
        self.modules.lock().clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::backend::DummyBackend;
    use crate::config::GeneratorConfig;
    use crate::program::SetIndexes;
    use crate::shader::{ModelMatrixStrategy, StageGenerator};

    fn fragment(name: &str) -> Shader {
        let mut generator = StageGenerator::new(
            ShaderStage::Fragment,
            name,
            &GeneratorConfig::default(),
            ModelMatrixStrategy::Invalid,
            SetIndexes::default(),
        );
        generator.declare_default_output_fragment().unwrap();
        generator.finish().unwrap()
    }

    #[test]
    fn test_key_depends_on_stage() {
        assert_ne!(
            shader_module_key(ShaderStage::Vertex, "void main() {}"),
            shader_module_key(ShaderStage::Fragment, "void main() {}")
        );
    }

    #[test]
    fn test_identical_sources_share_module() {
        let manager = ShaderManager::new(Arc::new(DummyBackend::new()));

        let a = manager.get_shader_module(&fragment("Test")).unwrap();
        let b = manager.get_shader_module(&fragment("Test")).unwrap();

        assert!(Arc::ptr_eq(&a, &b));
        assert_eq!(manager.len(), 1);
        assert_eq!(a.stage(), ShaderStage::Fragment);
    }
}
