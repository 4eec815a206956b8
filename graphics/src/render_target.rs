//! Render targets as seen by program generation.
//!
//! Generation only needs a render target's shape: its extent, sample count,
//! attachment formats, whether it renders the six faces of a cubemap, and
//! the descriptor set layout of its per-view uniform block.

use std::sync::Arc;

use crate::error::GraphicsError;
use crate::layout::{
    DescriptorSetLayout, DescriptorSetLayoutDescriptor, LayoutManager, ShaderStageFlags,
};

/// Attachment formats supported by generated pipelines.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TextureFormat {
    Rgba8Unorm,
    Rgba8UnormSrgb,
    Bgra8Unorm,
    Bgra8UnormSrgb,
    Rgba16Float,
    Rgba32Float,
    R32Float,
    Depth16Unorm,
    Depth24PlusStencil8,
    Depth32Float,
    Depth32FloatStencil8,
}

impl TextureFormat {
    /// Check if this is a depth or depth/stencil format.
    pub fn is_depth_stencil(&self) -> bool {
        matches!(
            self,
            Self::Depth16Unorm
                | Self::Depth24PlusStencil8
                | Self::Depth32Float
                | Self::Depth32FloatStencil8
        )
    }

    /// Check if this format has a stencil component.
    pub fn has_stencil(&self) -> bool {
        matches!(self, Self::Depth24PlusStencil8 | Self::Depth32FloatStencil8)
    }
}

/// Size of a render target in pixels.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct Extent2D {
    pub width: u32,
    pub height: u32,
}

impl Extent2D {
    pub fn new(width: u32, height: u32) -> Self {
        Self { width, height }
    }
}

/// Read-only view of a render target used when generating a program.
pub trait RenderTarget: Send + Sync {
    /// Identifier used in logs and cache keys.
    fn identifier(&self) -> &str;

    fn extent(&self) -> Extent2D;

    /// Returns true if the target renders the six faces of a cubemap.
    fn is_cubemap(&self) -> bool;

    /// Rasterization sample count.
    fn samples(&self) -> u32;

    fn color_format(&self) -> TextureFormat;

    fn depth_format(&self) -> Option<TextureFormat>;

    /// Layout of the per-view descriptor set, if the target created one.
    fn view_descriptor_set_layout(&self) -> Option<Arc<DescriptorSetLayout>>;
}

/// Descriptor of the per-view set: the view uniform block at binding 0.
pub fn view_descriptor_set_layout_descriptor() -> DescriptorSetLayoutDescriptor {
    DescriptorSetLayoutDescriptor::new()
        .with_uniform_buffer(
            0,
            ShaderStageFlags::VERTEX | ShaderStageFlags::GEOMETRY | ShaderStageFlags::FRAGMENT,
        )
        .with_label("View")
}

/// Plain render target description.
#[derive(Debug, Clone)]
pub struct RenderTargetDescription {
    identifier: String,
    extent: Extent2D,
    cubemap: bool,
    samples: u32,
    color_format: TextureFormat,
    depth_format: Option<TextureFormat>,
    view_layout: Option<Arc<DescriptorSetLayout>>,
}

impl RenderTargetDescription {
    /// Single-sampled RGBA8 target with a 32-bit depth buffer.
    pub fn new(identifier: impl Into<String>, extent: Extent2D) -> Self {
        Self {
            identifier: identifier.into(),
            extent,
            cubemap: false,
            samples: 1,
            color_format: TextureFormat::Rgba8Unorm,
            depth_format: Some(TextureFormat::Depth32Float),
            view_layout: None,
        }
    }

    pub fn with_cubemap(mut self, cubemap: bool) -> Self {
        self.cubemap = cubemap;
        self
    }

    pub fn with_samples(mut self, samples: u32) -> Self {
        self.samples = samples.max(1);
        self
    }

    pub fn with_color_format(mut self, format: TextureFormat) -> Self {
        self.color_format = format;
        self
    }

    pub fn with_depth_format(mut self, format: Option<TextureFormat>) -> Self {
        self.depth_format = format;
        self
    }

    /// Attach the per-view descriptor set layout, shared through `layouts`.
    pub fn create_view_layout(&mut self, layouts: &LayoutManager) -> Result<(), GraphicsError> {
        let layout = layouts.get_descriptor_set_layout(&view_descriptor_set_layout_descriptor())?;
        self.view_layout = Some(layout);
        Ok(())
    }

    pub fn resize(&mut self, extent: Extent2D) {
        self.extent = extent;
    }
}

impl RenderTarget for RenderTargetDescription {
    fn identifier(&self) -> &str {
        &self.identifier
    }

    fn extent(&self) -> Extent2D {
        self.extent
    }

    fn is_cubemap(&self) -> bool {
        self.cubemap
    }

    fn samples(&self) -> u32 {
        self.samples
    }

    fn color_format(&self) -> TextureFormat {
        self.color_format
    }

    fn depth_format(&self) -> Option<TextureFormat> {
        self.depth_format
    }

    fn view_descriptor_set_layout(&self) -> Option<Arc<DescriptorSetLayout>> {
        self.view_layout.clone()
    }
}

/// Lifecycle notifications of a render target.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RenderTargetEvent {
    /// The target changed size. Pipelines built for it hold a stale viewport.
    Resized { identifier: String, extent: Extent2D },
    /// The target is gone.
    Destroyed { identifier: String },
}

impl RenderTargetEvent {
    pub fn identifier(&self) -> &str {
        match self {
            Self::Resized { identifier, .. } | Self::Destroyed { identifier } => identifier,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::backend::DummyBackend;

    #[test]
    fn test_depth_formats() {
        assert!(TextureFormat::Depth32Float.is_depth_stencil());
        assert!(!TextureFormat::Depth32Float.has_stencil());
        assert!(TextureFormat::Depth24PlusStencil8.has_stencil());
        assert!(!TextureFormat::Bgra8UnormSrgb.is_depth_stencil());
    }

    #[test]
    fn test_view_layout() {
        let layouts = LayoutManager::new(Arc::new(DummyBackend::new()));
        let mut target = RenderTargetDescription::new("Main", Extent2D::new(800, 600));
        assert!(target.view_descriptor_set_layout().is_none());

        target.create_view_layout(&layouts).unwrap();
        let other = {
            let mut other = RenderTargetDescription::new("Shadow", Extent2D::new(1024, 1024));
            other.create_view_layout(&layouts).unwrap();
            other
        };

        let a = target.view_descriptor_set_layout().unwrap();
        let b = other.view_descriptor_set_layout().unwrap();
        assert!(Arc::ptr_eq(&a, &b));
    }

    #[test]
    fn test_samples_never_zero() {
        let target = RenderTargetDescription::new("Main", Extent2D::new(1, 1)).with_samples(0);
        assert_eq!(target.samples(), 1);
    }

    #[test]
    fn test_event_identifier() {
        let event = RenderTargetEvent::Resized {
            identifier: "Main".to_string(),
            extent: Extent2D::new(640, 480),
        };
        assert_eq!(event.identifier(), "Main");
    }
}
