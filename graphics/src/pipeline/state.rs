//! Fixed-function pipeline state.

use opaline_core::geometry::Topology;

use crate::render_target::Extent2D;

/// Blend factor for blending operations.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum BlendFactor {
    /// 0.0
    #[default]
    Zero,
    /// 1.0
    One,
    /// Source color
    Src,
    /// 1 - source color
    OneMinusSrc,
    /// Source alpha
    SrcAlpha,
    /// 1 - source alpha
    OneMinusSrcAlpha,
    /// Destination color
    Dst,
    /// 1 - destination color
    OneMinusDst,
    /// Destination alpha
    DstAlpha,
    /// 1 - destination alpha
    OneMinusDstAlpha,
}

/// Blend operation for combining colors.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum BlendOperation {
    /// source + destination
    #[default]
    Add,
    /// source - destination
    Subtract,
    /// destination - source
    ReverseSubtract,
    Min,
    Max,
}

/// Blend component configuration.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct BlendComponent {
    pub src_factor: BlendFactor,
    pub dst_factor: BlendFactor,
    pub operation: BlendOperation,
}

impl Default for BlendComponent {
    fn default() -> Self {
        Self {
            src_factor: BlendFactor::One,
            dst_factor: BlendFactor::Zero,
            operation: BlendOperation::Add,
        }
    }
}

impl BlendComponent {
    pub fn new(src_factor: BlendFactor, dst_factor: BlendFactor) -> Self {
        Self {
            src_factor,
            dst_factor,
            operation: BlendOperation::Add,
        }
    }

    /// Standard alpha blending component.
    pub fn over() -> Self {
        Self::new(BlendFactor::SrcAlpha, BlendFactor::OneMinusSrcAlpha)
    }
}

/// Color and alpha blending of the color attachment.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct BlendState {
    pub color: BlendComponent,
    pub alpha: BlendComponent,
}

impl BlendState {
    /// Standard alpha blending (src over dst).
    pub fn alpha_blending() -> Self {
        Self {
            color: BlendComponent::over(),
            alpha: BlendComponent::over(),
        }
    }

    /// Additive blending.
    pub fn additive() -> Self {
        Self {
            color: BlendComponent::new(BlendFactor::SrcAlpha, BlendFactor::One),
            alpha: BlendComponent::new(BlendFactor::One, BlendFactor::One),
        }
    }

    /// Multiply the destination by the source color.
    pub fn multiply() -> Self {
        Self {
            color: BlendComponent::new(BlendFactor::Dst, BlendFactor::Zero),
            alpha: BlendComponent::new(BlendFactor::DstAlpha, BlendFactor::Zero),
        }
    }

    /// Screen blending: 1 - (1 - src) * (1 - dst).
    pub fn screen() -> Self {
        Self {
            color: BlendComponent::new(BlendFactor::One, BlendFactor::OneMinusSrc),
            alpha: BlendComponent::new(BlendFactor::One, BlendFactor::OneMinusSrcAlpha),
        }
    }
}

/// Comparison function for depth tests.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum CompareFunction {
    Never,
    Less,
    Equal,
    #[default]
    LessEqual,
    Greater,
    NotEqual,
    GreaterEqual,
    Always,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum PolygonMode {
    #[default]
    Fill,
    Line,
    Point,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum CullMode {
    None,
    Front,
    #[default]
    Back,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum FrontFace {
    #[default]
    CounterClockwise,
    Clockwise,
}

/// Primitive assembly.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct InputAssemblyState {
    pub topology: Topology,
    pub primitive_restart: bool,
}

impl InputAssemblyState {
    /// Strips and fans restart on the special index value.
    pub fn from_topology(topology: Topology) -> Self {
        Self {
            topology,
            primitive_restart: matches!(
                topology,
                Topology::LineStrip | Topology::TriangleStrip | Topology::TriangleFan
            ),
        }
    }
}

/// Patch size of tessellated programs.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct TessellationState {
    pub patch_control_points: u32,
}

/// Viewport and scissor, covering the whole render target.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct ViewportState {
    pub extent: Extent2D,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct MultisampleState {
    pub samples: u32,
}

impl Default for MultisampleState {
    fn default() -> Self {
        Self { samples: 1 }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct RasterizationState {
    pub polygon_mode: PolygonMode,
    pub cull_mode: CullMode,
    pub front_face: FrontFace,
    pub depth_bias: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct DepthStencilState {
    pub depth_test: bool,
    pub depth_write: bool,
    pub compare: CompareFunction,
    pub stencil_test: bool,
}

impl Default for DepthStencilState {
    fn default() -> Self {
        Self {
            depth_test: true,
            depth_write: true,
            compare: CompareFunction::LessEqual,
            stencil_test: false,
        }
    }
}

/// Blending of the color attachment. `None` replaces the destination.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct ColorBlendState {
    pub blend: Option<BlendState>,
}

/// States configured by the program generator for a pipeline.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct ConfigurableStates {
    pub rasterization: RasterizationState,
    pub depth_stencil: DepthStencilState,
    pub color_blend: ColorBlendState,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_component_replaces() {
        let component = BlendComponent::default();
        assert_eq!(component.src_factor, BlendFactor::One);
        assert_eq!(component.dst_factor, BlendFactor::Zero);
    }

    #[test]
    fn test_primitive_restart() {
        assert!(InputAssemblyState::from_topology(Topology::TriangleStrip).primitive_restart);
        assert!(!InputAssemblyState::from_topology(Topology::TriangleList).primitive_restart);
    }

    #[test]
    fn test_default_states() {
        let states = ConfigurableStates::default();
        assert_eq!(states.rasterization.cull_mode, CullMode::Back);
        assert!(states.depth_stencil.depth_test);
        assert!(states.color_blend.blend.is_none());
    }
}
