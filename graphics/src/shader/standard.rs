//! Blocks shared by every generated program.
//!
//! The view block, the model block and the matrices push constant block
//! have one engine-wide layout. Their CPU-side counterparts are `Pod` types
//! so the renderer can upload them as raw bytes.

use bytemuck::{Pod, Zeroable};
use static_assertions::const_assert_eq;

use super::declaration::{Member, PushConstantBlock, Structure, UniformBlock};
use super::keys::block;
use super::types::VariableType;

/// Per-view uniform block of a 2D render target.
pub fn view_uniform_block(set: u32, binding: u32) -> UniformBlock {
    UniformBlock::new(block::VIEW, block::VIEW_INSTANCE, set, binding)
        .with_member(Member::new(VariableType::Mat4, block::VIEW_MATRIX))
        .with_member(Member::new(VariableType::Mat4, block::PROJECTION_MATRIX))
        .with_member(Member::new(VariableType::Mat4, block::VIEW_PROJECTION_MATRIX))
        .with_member(Member::new(VariableType::Vec4, block::POSITION_WORLD_SPACE))
        .with_member(Member::new(VariableType::Vec4, block::VELOCITY))
        .with_member(Member::new(VariableType::Vec4, block::VIEW_PROPERTIES))
        .with_member(Member::new(VariableType::Vec4, block::AMBIENT_LIGHT_COLOR))
        .with_member(Member::new(VariableType::Float, block::AMBIENT_LIGHT_INTENSITY))
}

/// One face of a cubemap view.
pub fn cubemap_face_structure() -> Structure {
    Structure::new(block::CUBEMAP_FACE)
        .with_member(Member::new(VariableType::Mat4, block::VIEW_MATRIX))
        .with_member(Member::new(VariableType::Mat4, block::PROJECTION_MATRIX))
        .with_member(Member::new(VariableType::Mat4, block::VIEW_PROJECTION_MATRIX))
        .with_member(Member::new(VariableType::Vec4, block::POSITION_WORLD_SPACE))
        .with_member(Member::new(VariableType::Vec4, block::VELOCITY))
        .with_member(Member::new(VariableType::Vec4, block::VIEW_PROPERTIES))
}

/// Per-view uniform block of a cubemap render target, one face per layer.
///
/// The [`cubemap_face_structure`] must be declared in the same stage.
pub fn cubemap_view_uniform_block(set: u32, binding: u32) -> UniformBlock {
    UniformBlock::new(block::CUBEMAP_VIEW, block::VIEW_INSTANCE, set, binding)
        .with_member(Member::structure_array(
            &cubemap_face_structure(),
            block::INSTANCE,
            6,
        ))
        .with_member(Member::new(VariableType::Vec4, block::AMBIENT_LIGHT_COLOR))
        .with_member(Member::new(VariableType::Float, block::AMBIENT_LIGHT_INTENSITY))
}

/// Per-draw model uniform block.
pub fn model_uniform_block(set: u32, binding: u32) -> UniformBlock {
    UniformBlock::new(block::MODEL, block::MODEL_INSTANCE, set, binding)
        .with_member(Member::new(VariableType::Mat4, block::MODEL_MATRIX))
        .with_member(Member::new(VariableType::Mat3, block::NORMAL_MODEL_MATRIX))
        .with_member(Member::new(VariableType::Mat4, block::MODEL_VIEW_MATRIX))
        .with_member(Member::new(VariableType::Mat3, block::NORMAL_MATRIX))
        .with_member(Member::new(VariableType::Mat4, block::MODEL_VIEW_PROJECTION_MATRIX))
}

/// Members of the matrices push constant block.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MatrixLayout {
    /// Combined model-view-projection matrix.
    ModelViewProjection,
    /// View and model matrices, for programs needing intermediate spaces.
    ViewModel,
    /// View-projection matrix; model matrices come per instance.
    ViewProjection,
    /// View and view-projection matrices; model matrices come per instance.
    ViewAndViewProjection,
}

impl MatrixLayout {
    fn member_names(self) -> &'static [&'static str] {
        match self {
            Self::ModelViewProjection => &[block::MODEL_VIEW_PROJECTION_MATRIX],
            Self::ViewModel => &[block::VIEW_MATRIX, block::MODEL_MATRIX],
            Self::ViewProjection => &[block::VIEW_PROJECTION_MATRIX],
            Self::ViewAndViewProjection => &[block::VIEW_MATRIX, block::VIEW_PROJECTION_MATRIX],
        }
    }

    /// Size of the block in bytes.
    pub fn bytes(self) -> u32 {
        self.member_names().len() as u32 * VariableType::Mat4.bytes()
    }
}

/// Matrices push constant block for a layout.
pub fn matrices_push_constant_block(layout: MatrixLayout) -> PushConstantBlock {
    layout.member_names().iter().fold(
        PushConstantBlock::new(block::MATRICES, block::MATRICES_INSTANCE),
        |block, name| block.with_member(Member::new(VariableType::Mat4, *name)),
    )
}

/// Column-major 4x4 matrix as uploaded to the GPU.
pub type Matrix4 = [[f32; 4]; 4];

/// Push constant data for [`MatrixLayout::ModelViewProjection`].
#[repr(C)]
#[derive(Debug, Clone, Copy, PartialEq, Pod, Zeroable)]
pub struct ModelViewProjectionConstants {
    pub model_view_projection_matrix: Matrix4,
}

/// Push constant data for [`MatrixLayout::ViewModel`].
#[repr(C)]
#[derive(Debug, Clone, Copy, PartialEq, Pod, Zeroable)]
pub struct ViewModelConstants {
    pub view_matrix: Matrix4,
    pub model_matrix: Matrix4,
}

/// Push constant data for [`MatrixLayout::ViewProjection`].
#[repr(C)]
#[derive(Debug, Clone, Copy, PartialEq, Pod, Zeroable)]
pub struct ViewProjectionConstants {
    pub view_projection_matrix: Matrix4,
}

/// Push constant data for [`MatrixLayout::ViewAndViewProjection`].
#[repr(C)]
#[derive(Debug, Clone, Copy, PartialEq, Pod, Zeroable)]
pub struct ViewAndViewProjectionConstants {
    pub view_matrix: Matrix4,
    pub view_projection_matrix: Matrix4,
}

// Vulkan guarantees 128 bytes of push constants.
const_assert_eq!(std::mem::size_of::<ViewModelConstants>(), 128);
const_assert_eq!(std::mem::size_of::<ViewAndViewProjectionConstants>(), 128);
const_assert_eq!(std::mem::size_of::<ModelViewProjectionConstants>(), 64);
const_assert_eq!(std::mem::size_of::<ViewProjectionConstants>(), 64);
