//! Common utilities for program generation integration tests.
//!
//! Tests are parameterized over the available backends. The dummy backend
//! is always available; the Vulkan backend needs a device and is skipped
//! when none can be created.

use std::sync::Arc;

use opaline_core::geometry::{GeometryDescription, GeometryFlags, Topology};
use opaline_graphics::layout::DescriptorSetLayout;
use opaline_graphics::{
    DummyBackend, Extent2D, GeneratorConfig, GpuBackend, RenderServices, RenderTarget,
    RenderTargetDescription,
};

// ============================================================================
// Backend Enumeration
// ============================================================================

/// Available GPU backends for testing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Backend {
    /// Dummy backend (no actual GPU operations).
    Dummy,
    /// Vulkan backend (native via ash).
    Vulkan,
}

impl Backend {
    /// Check if this backend is compiled in.
    pub fn is_available(&self) -> bool {
        match self {
            Backend::Dummy => true,
            #[cfg(feature = "vulkan-backend")]
            Backend::Vulkan => true,
            #[cfg(not(feature = "vulkan-backend"))]
            Backend::Vulkan => false,
        }
    }

    /// Create the backend, `None` if it is unavailable on this machine.
    pub fn create(self) -> Option<Arc<dyn GpuBackend>> {
        if !self.is_available() {
            return None;
        }

        match self {
            Backend::Dummy => Some(Arc::new(DummyBackend::new())),
            #[cfg(feature = "vulkan-backend")]
            Backend::Vulkan => opaline_graphics::backend::vulkan::VulkanBackend::new()
                .ok()
                .map(|backend| Arc::new(backend) as Arc<dyn GpuBackend>),
            #[cfg(not(feature = "vulkan-backend"))]
            Backend::Vulkan => None,
        }
    }
}

// ============================================================================
// Test Context
// ============================================================================

/// Services, configuration and a render target with a view layout.
pub struct TestContext {
    #[allow(dead_code)]
    pub backend: Backend,
    pub services: RenderServices,
    pub config: GeneratorConfig,
    pub target: RenderTargetDescription,
}

impl TestContext {
    /// Create a new test context for the given backend.
    ///
    /// Returns `None` if the backend is not available.
    pub fn new(backend: Backend) -> Option<Self> {
        let _ = env_logger::builder().is_test(true).try_init();

        let services = RenderServices::new(backend.create()?);
        let mut target = RenderTargetDescription::new("MainView", Extent2D::new(256, 256));
        target.create_view_layout(services.layouts()).ok()?;

        Some(Self {
            backend,
            services,
            config: GeneratorConfig::default(),
            target,
        })
    }

    /// Per-view layout of the render target.
    #[allow(dead_code)]
    pub fn target_view_layout(&self) -> Arc<DescriptorSetLayout> {
        self.target
            .view_descriptor_set_layout()
            .expect("test targets have a view layout")
    }

    /// Context on the dummy backend, always available.
    pub fn dummy() -> Self {
        match Self::new(Backend::Dummy) {
            Some(ctx) => ctx,
            None => unreachable!("the dummy backend is always available"),
        }
    }
}

// ============================================================================
// Geometries
// ============================================================================

/// Triangle list with positions only.
pub fn positions_only() -> GeometryDescription {
    GeometryDescription::new("PositionsOnly", Topology::TriangleList)
}

/// Triangle list with normals and 2D texture coordinates.
#[allow(dead_code)]
pub fn lit_mesh() -> GeometryDescription {
    GeometryDescription::new("LitMesh", Topology::TriangleList)
        .with_flags(GeometryFlags::NORMALS | GeometryFlags::PRIMARY_TEXTURE_COORDINATES_2D)
}

/// Triangle list with a full tangent space.
#[allow(dead_code)]
pub fn tangent_mesh() -> GeometryDescription {
    GeometryDescription::new("TangentMesh", Topology::TriangleList)
        .with_flags(GeometryFlags::NORMALS | GeometryFlags::TANGENT_SPACE)
}
