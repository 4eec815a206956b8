//! Vertex buffer formats.
//!
//! A format describes how a geometry's attribute streams are laid out in
//! vertex buffers and at which shader locations they are read:
//!
//! - Buffer 0 interleaves every attribute the geometry provides, in
//!   location order.
//! - Buffer 1, present for instanced programs, holds the per-instance model
//!   and normal model matrices, one location per matrix column.
//!
//! Formats are shared via `Arc` through the [`VertexBufferFormatManager`].

mod manager;

use opaline_core::geometry::{GeometryFlags, Topology};

use crate::shader::VertexAttributeType;

pub use manager::{VertexBufferFormatManager, vertex_format_key};

/// Format of a vertex attribute column.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum VertexAttributeFormat {
    /// Single 32-bit float.
    Float,
    /// Two 32-bit floats.
    Float2,
    /// Three 32-bit floats.
    Float3,
    /// Four 32-bit floats.
    Float4,
}

impl VertexAttributeFormat {
    /// Get the size in bytes of this format.
    pub fn size(&self) -> u32 {
        match self {
            Self::Float => 4,
            Self::Float2 => 8,
            Self::Float3 => 12,
            Self::Float4 => 16,
        }
    }

    /// Column format and column count of an attribute.
    pub fn of(attribute: VertexAttributeType) -> (Self, u32) {
        match attribute {
            VertexAttributeType::Primary2DTextureCoordinates
            | VertexAttributeType::Secondary2DTextureCoordinates => (Self::Float2, 1),
            VertexAttributeType::Color | VertexAttributeType::Weights => (Self::Float4, 1),
            VertexAttributeType::ModelMatrix => (Self::Float4, 4),
            VertexAttributeType::NormalModelMatrix => (Self::Float3, 3),
            _ => (Self::Float3, 1),
        }
    }
}

/// How the vertex buffer advances: per-vertex or per-instance.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum VertexStepMode {
    /// Buffer advances once per vertex (default).
    #[default]
    Vertex,
    /// Buffer advances once per instance (for instanced rendering).
    Instance,
}

/// Describes a single vertex buffer binding.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct VertexBufferLayout {
    /// Stride in bytes between consecutive elements.
    pub stride: u32,
    /// How the buffer advances (per-vertex or per-instance).
    pub step_mode: VertexStepMode,
}

/// One location read by the vertex stage.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct VertexInputAttribute {
    /// Attribute this column belongs to.
    pub attribute: VertexAttributeType,
    /// Shader location.
    pub location: u32,
    /// Index of the vertex buffer this attribute reads from.
    pub buffer_index: u32,
    /// Data format of this column.
    pub format: VertexAttributeFormat,
    /// Byte offset within the vertex buffer.
    pub offset: u32,
}

/// Vertex buffer layout of a geometry, optionally with instance matrices.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct VertexBufferFormat {
    topology: Topology,
    flags: GeometryFlags,
    buffers: Vec<VertexBufferLayout>,
    attributes: Vec<VertexInputAttribute>,
}

impl VertexBufferFormat {
    /// Build the format of a geometry.
    pub fn new(topology: Topology, flags: GeometryFlags, instancing: bool) -> Self {
        let mut format = Self {
            topology,
            flags,
            buffers: Vec::new(),
            attributes: Vec::new(),
        };

        let per_vertex = VertexAttributeType::ALL
            .into_iter()
            .filter(|attribute| attribute.is_provided_by(flags));
        format.push_buffer(per_vertex, VertexStepMode::Vertex);

        if instancing {
            let per_instance = VertexAttributeType::ALL
                .into_iter()
                .filter(|attribute| attribute.is_per_instance());
            format.push_buffer(per_instance, VertexStepMode::Instance);
        }

        format
    }

    fn push_buffer(
        &mut self,
        attributes: impl Iterator<Item = VertexAttributeType>,
        step_mode: VertexStepMode,
    ) {
        let buffer_index = self.buffers.len() as u32;
        let mut offset = 0;

        for attribute in attributes {
            let (format, columns) = VertexAttributeFormat::of(attribute);
            for column in 0..columns {
                self.attributes.push(VertexInputAttribute {
                    attribute,
                    location: attribute.location() + column,
                    buffer_index,
                    format,
                    offset,
                });
                offset += format.size();
            }
        }

        self.buffers.push(VertexBufferLayout {
            stride: offset,
            step_mode,
        });
    }

    pub fn topology(&self) -> Topology {
        self.topology
    }

    pub fn flags(&self) -> GeometryFlags {
        self.flags
    }

    pub fn buffers(&self) -> &[VertexBufferLayout] {
        &self.buffers
    }

    pub fn attributes(&self) -> &[VertexInputAttribute] {
        &self.attributes
    }

    /// Returns true if the format feeds `attribute`.
    pub fn provides(&self, attribute: VertexAttributeType) -> bool {
        self.attributes
            .iter()
            .any(|input| input.attribute == attribute)
    }

    pub fn is_instanced(&self) -> bool {
        self.buffers
            .iter()
            .any(|buffer| buffer.step_mode == VertexStepMode::Instance)
    }
}
