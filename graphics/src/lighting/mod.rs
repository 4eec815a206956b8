//! Lights and light passes.
//!
//! Scenes are lit with one additive pass per light on top of an ambient
//! pass. Each pass kind generates its own program, so the pass type is
//! part of program generation. Lights are a closed [`Light`] enum and their
//! uniform data is uploaded as `Pod` structs.

mod generator;

use std::fmt;

use bytemuck::{Pod, Zeroable};
use opaline_core::events::EventChannel;
use static_assertions::const_assert_eq;

use crate::layout::{DescriptorSetLayoutDescriptor, ShaderStageFlags};
use crate::shader::declaration::{Member, UniformBlock};
use crate::shader::keys::block;
use crate::shader::VariableType;

pub use generator::LightGenerator;

/// Kind of light source.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum LightKind {
    Directional,
    Point,
    Spot,
}

impl LightKind {
    pub const ALL: [LightKind; 3] = [Self::Directional, Self::Point, Self::Spot];

    /// Uniform block of this light kind.
    pub fn uniform_block(self, set: u32, binding: u32) -> UniformBlock {
        let block = UniformBlock::new(block::LIGHT, block::LIGHT_INSTANCE, set, binding)
            .with_member(Member::new(VariableType::Vec4, block::COLOR));

        match self {
            Self::Directional => block
                .with_member(Member::new(VariableType::Vec4, block::DIRECTION_VIEW_SPACE))
                .with_member(Member::new(VariableType::Float, block::INTENSITY)),
            Self::Point => block
                .with_member(Member::new(VariableType::Vec4, block::POSITION_VIEW_SPACE))
                .with_member(Member::new(VariableType::Float, block::INTENSITY))
                .with_member(Member::new(VariableType::Float, block::RADIUS)),
            Self::Spot => block
                .with_member(Member::new(VariableType::Vec4, block::POSITION_VIEW_SPACE))
                .with_member(Member::new(VariableType::Vec4, block::DIRECTION_VIEW_SPACE))
                .with_member(Member::new(VariableType::Float, block::INTENSITY))
                .with_member(Member::new(VariableType::Float, block::RADIUS))
                .with_member(Member::new(VariableType::Float, block::INNER_COS_ANGLE))
                .with_member(Member::new(VariableType::Float, block::OUTER_COS_ANGLE)),
        }
    }

    /// Returns true if the light has a position, and so a distance to
    /// every fragment.
    pub fn is_positional(self) -> bool {
        self != Self::Directional
    }
}

impl fmt::Display for LightKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Debug::fmt(self, f)
    }
}

/// Pass a program is generated for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum RenderPassType {
    /// Unlit rendering.
    #[default]
    Simple,
    /// Ambient light only.
    Ambient,
    /// Additive contribution of one light.
    Light(LightKind),
}

impl RenderPassType {
    /// Returns true for passes binding a light uniform block.
    pub fn is_light_pass(self) -> bool {
        matches!(self, Self::Light(_))
    }

    pub fn light_kind(self) -> Option<LightKind> {
        match self {
            Self::Light(kind) => Some(kind),
            _ => None,
        }
    }

    /// Returns true if the pass needs normals and view-space positions.
    pub fn is_lit(self) -> bool {
        self != Self::Simple
    }
}

impl fmt::Display for RenderPassType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Simple => f.write_str("SimplePass"),
            Self::Ambient => f.write_str("AmbientPass"),
            Self::Light(kind) => write!(f, "{kind}LightPass"),
        }
    }
}

/// Layout of the per-light descriptor set.
pub fn light_descriptor_set_layout() -> DescriptorSetLayoutDescriptor {
    DescriptorSetLayoutDescriptor::new()
        .with_uniform_buffer(0, ShaderStageFlags::VERTEX | ShaderStageFlags::FRAGMENT)
        .with_label("Light")
}

/// Light shining along one direction from infinitely far away.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DirectionalLight {
    pub color: [f32; 4],
    pub intensity: f32,
    /// Direction the light travels, in view space.
    pub direction: [f32; 3],
}

/// Light shining in every direction from a point.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PointLight {
    pub color: [f32; 4],
    pub intensity: f32,
    /// Position in view space.
    pub position: [f32; 3],
    /// Distance of no influence, 0 for an unbounded light.
    pub radius: f32,
}

/// Point light restricted to a cone.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SpotLight {
    pub color: [f32; 4],
    pub intensity: f32,
    /// Position in view space.
    pub position: [f32; 3],
    /// Cone axis in view space.
    pub direction: [f32; 3],
    pub radius: f32,
    /// Cosine of the angle where the cone starts fading.
    pub inner_cos_angle: f32,
    /// Cosine of the angle past which nothing is lit.
    pub outer_cos_angle: f32,
}

/// A light source.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Light {
    Directional(DirectionalLight),
    Point(PointLight),
    Spot(SpotLight),
}

/// GPU data of a directional light, see [`LightKind::uniform_block`].
#[repr(C)]
#[derive(Debug, Clone, Copy, PartialEq, Pod, Zeroable)]
pub struct DirectionalLightData {
    pub color: [f32; 4],
    pub direction_view_space: [f32; 4],
    pub intensity: f32,
}

/// GPU data of a point light.
#[repr(C)]
#[derive(Debug, Clone, Copy, PartialEq, Pod, Zeroable)]
pub struct PointLightData {
    pub color: [f32; 4],
    pub position_view_space: [f32; 4],
    pub intensity: f32,
    pub radius: f32,
}

/// GPU data of a spot light.
#[repr(C)]
#[derive(Debug, Clone, Copy, PartialEq, Pod, Zeroable)]
pub struct SpotLightData {
    pub color: [f32; 4],
    pub position_view_space: [f32; 4],
    pub direction_view_space: [f32; 4],
    pub intensity: f32,
    pub radius: f32,
    pub inner_cos_angle: f32,
    pub outer_cos_angle: f32,
}

const_assert_eq!(std::mem::size_of::<DirectionalLightData>(), 36);
const_assert_eq!(std::mem::size_of::<PointLightData>(), 40);
const_assert_eq!(std::mem::size_of::<SpotLightData>(), 64);

fn point(xyz: [f32; 3]) -> [f32; 4] {
    [xyz[0], xyz[1], xyz[2], 1.0]
}

fn direction(xyz: [f32; 3]) -> [f32; 4] {
    [xyz[0], xyz[1], xyz[2], 0.0]
}

impl Light {
    pub fn kind(&self) -> LightKind {
        match self {
            Self::Directional(_) => LightKind::Directional,
            Self::Point(_) => LightKind::Point,
            Self::Spot(_) => LightKind::Spot,
        }
    }

    /// Pass rendering this light.
    pub fn render_pass(&self) -> RenderPassType {
        RenderPassType::Light(self.kind())
    }

    /// Bytes of the light uniform block.
    pub fn uniform_bytes(&self) -> Vec<u8> {
        match self {
            Self::Directional(light) => bytemuck::bytes_of(&DirectionalLightData {
                color: light.color,
                direction_view_space: direction(light.direction),
                intensity: light.intensity,
            })
            .to_vec(),
            Self::Point(light) => bytemuck::bytes_of(&PointLightData {
                color: light.color,
                position_view_space: point(light.position),
                intensity: light.intensity,
                radius: light.radius,
            })
            .to_vec(),
            Self::Spot(light) => bytemuck::bytes_of(&SpotLightData {
                color: light.color,
                position_view_space: point(light.position),
                direction_view_space: direction(light.direction),
                intensity: light.intensity,
                radius: light.radius,
                inner_cos_angle: light.inner_cos_angle,
                outer_cos_angle: light.outer_cos_angle,
            })
            .to_vec(),
        }
    }
}

/// Change of a [`LightSet`].
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum LightSetEvent {
    Added { index: usize, kind: LightKind },
    Removed { index: usize, kind: LightKind },
    Cleared,
}

/// Lights of a scene.
///
/// Every mutation is published on [`LightSet::events`], so renderers can
/// rebuild their pass lists.
#[derive(Debug, Default)]
pub struct LightSet {
    lights: Vec<Light>,
    events: EventChannel<LightSetEvent>,
}

impl LightSet {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn events(&self) -> &EventChannel<LightSetEvent> {
        &self.events
    }

    /// Add a light and return its index.
    pub fn add(&mut self, light: Light) -> usize {
        let index = self.lights.len();
        self.lights.push(light);
        self.events.publish(&LightSetEvent::Added {
            index,
            kind: light.kind(),
        });
        index
    }

    pub fn remove(&mut self, index: usize) -> Option<Light> {
        if index >= self.lights.len() {
            log::warn!("Light set: no light at index {index}");
            return None;
        }

        let light = self.lights.remove(index);
        self.events.publish(&LightSetEvent::Removed {
            index,
            kind: light.kind(),
        });
        Some(light)
    }

    pub fn clear(&mut self) {
        self.lights.clear();
        self.events.publish(&LightSetEvent::Cleared);
    }

    pub fn lights(&self) -> &[Light] {
        &self.lights
    }

    pub fn len(&self) -> usize {
        self.lights.len()
    }

    pub fn is_empty(&self) -> bool {
        self.lights.is_empty()
    }

    /// Passes needed to render the set: ambient first, then one pass kind
    /// per light kind present.
    pub fn render_passes(&self) -> Vec<RenderPassType> {
        std::iter::once(RenderPassType::Ambient)
            .chain(
                LightKind::ALL
                    .into_iter()
                    .filter(|kind| self.lights.iter().any(|light| light.kind() == *kind))
                    .map(RenderPassType::Light),
            )
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;
    use std::sync::atomic::{AtomicUsize, Ordering};

    fn sun() -> Light {
        Light::Directional(DirectionalLight {
            color: [1.0; 4],
            intensity: 2.0,
            direction: [0.0, -1.0, 0.0],
        })
    }

    fn lamp() -> Light {
        Light::Spot(SpotLight {
            color: [1.0, 0.5, 0.5, 1.0],
            intensity: 1.0,
            position: [0.0, 2.0, -4.0],
            direction: [0.0, -1.0, 0.0],
            radius: 10.0,
            inner_cos_angle: 0.9,
            outer_cos_angle: 0.8,
        })
    }

    #[test]
    fn test_uniform_blocks_match_cpu_data() {
        assert_eq!(
            LightKind::Directional.uniform_block(1, 0).bytes() as usize,
            std::mem::size_of::<DirectionalLightData>()
        );
        assert_eq!(
            LightKind::Point.uniform_block(1, 0).bytes() as usize,
            std::mem::size_of::<PointLightData>()
        );
        assert_eq!(
            LightKind::Spot.uniform_block(1, 0).bytes() as usize,
            std::mem::size_of::<SpotLightData>()
        );
        assert_eq!(lamp().uniform_bytes().len(), 64);
    }

    #[test]
    fn test_uniform_bytes_layout() {
        let bytes = sun().uniform_bytes();
        let data: DirectionalLightData = bytemuck::pod_read_unaligned(&bytes);
        assert_eq!(data.direction_view_space, [0.0, -1.0, 0.0, 0.0]);
        assert_eq!(data.intensity, 2.0);
    }

    #[test]
    fn test_render_pass_names() {
        assert_eq!(RenderPassType::Simple.to_string(), "SimplePass");
        assert_eq!(
            RenderPassType::Light(LightKind::Spot).to_string(),
            "SpotLightPass"
        );
        assert!(RenderPassType::Ambient.is_lit());
        assert!(!RenderPassType::Ambient.is_light_pass());
        assert_eq!(sun().render_pass().light_kind(), Some(LightKind::Directional));
    }

    #[test]
    fn test_light_set_events() {
        let mut lights = LightSet::new();
        let received = Arc::new(AtomicUsize::new(0));
        let counter = Arc::clone(&received);
        lights.events().subscribe(move |_| {
            counter.fetch_add(1, Ordering::SeqCst);
        });

        assert_eq!(lights.add(sun()), 0);
        assert_eq!(lights.add(lamp()), 1);
        assert_eq!(lights.remove(0), Some(sun()));
        assert_eq!(lights.remove(5), None);
        lights.clear();

        assert_eq!(received.load(Ordering::SeqCst), 4);
        assert!(lights.is_empty());
    }

    #[test]
    fn test_render_passes() {
        let mut lights = LightSet::new();
        assert_eq!(lights.render_passes(), vec![RenderPassType::Ambient]);

        lights.add(lamp());
        lights.add(sun());
        lights.add(lamp());
        assert_eq!(
            lights.render_passes(),
            vec![
                RenderPassType::Ambient,
                RenderPassType::Light(LightKind::Directional),
                RenderPassType::Light(LightKind::Spot),
            ]
        );
    }
}
