//! # Opaline Graphics
//!
//! Shader program synthesis and pipeline generation.
//!
//! ## Overview
//!
//! This crate provides:
//! - [`shader`] - GLSL stage generation from declarations and synthetic variable requests
//! - [`program`] - Programs gathering generated stages and their pipeline objects
//! - [`generator`] - Program generators and the [`ProgramBuilder`] driving them
//! - [`layout`], [`vertex`], [`pipeline`] - Shared caches of the GPU objects a program needs
//! - Multiple backend support: Vulkan and Dummy (for testing)
//!
//! ## Example
//!
//! ```ignore
//! use opaline_graphics::{ProgramBuilder, RenderServices, SceneRendering};
//!
//! let services = RenderServices::new(create_backend()?);
//! let scene = SceneRendering::new(&geometry, &material, RenderPassType::Simple);
//! let program = services
//!     .programs()
//!     .get_or_build(scene.program_key(&target), || {
//!         ProgramBuilder::new(&scene, &target, &config).build_or_fallback(&services)
//!     })?;
//! ```

pub mod backend;
pub mod config;
pub mod error;
pub mod generator;
pub mod layout;
pub mod lighting;
pub mod material;
pub mod pipeline;
pub mod program;
pub mod render_target;
pub mod shader;
pub mod vertex;

// Re-export main types for convenience
pub use backend::{DummyBackend, GpuBackend, create_backend};
pub use config::{GeneratorConfig, GeneratorFlags};
pub use error::{GraphicsError, ProgramError};
pub use generator::{
    BuildState, ColorConversion, FallbackGenerator, GenerationContext, OverlayRendering,
    ProgramBuilder, ProgramGenerator, RenderServices, SceneRendering, ShadowCasting,
};
pub use lighting::{Light, LightKind, LightSet, RenderPassType};
pub use material::{BasicMaterial, BlendingMode, MaterialInterface};
pub use pipeline::{ProgramCache, ProgramKey};
pub use program::{MatrixOptions, Program, SetIndexes, SetType};
pub use render_target::{Extent2D, RenderTarget, RenderTargetDescription, RenderTargetEvent};
pub use shader::{
    CodeLocation, ModelMatrixStrategy, Shader, ShaderStage, StageGenerator, SyntheticVariable,
    VariableScope,
};

/// Graphics library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Initialize the graphics subsystem.
///
/// Only logs the version; every cache is created lazily.
pub fn init() {
    log::info!("Opaline Graphics v{} initialized", VERSION);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_version() {
        assert!(!VERSION.is_empty());
    }

    #[test]
    fn test_dummy_backend() {
        let backend = DummyBackend::new();
        assert_eq!(backend.name(), "Dummy Backend");
    }
}
