//! Global declarations of a GLSL stage.
//!
//! Each declaration kind is a plain struct that knows its dedup key, its
//! validity rule and the GLSL text it renders to. [`Declaration`] is the
//! closed set of kinds a [`DeclarationRegistry`](super::DeclarationRegistry)
//! stores.

mod blocks;
mod io;
mod resources;

use std::fmt;

pub use blocks::{
    InputBlock, Member, MemberType, OutputBlock, PushConstantBlock, ShaderStorageBlock, Structure,
    UniformBlock,
};
pub use io::{
    InputAttribute, InputPrimitive, OutputFragment, OutputPrimitive, StageInput, StageOutput,
    column_name, matrix_from_columns,
};
pub use resources::{Function, Sampler, SpecializationConstant, TexelBuffer};

/// Array suffix of a declared variable.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum ArraySize {
    #[default]
    None,
    Fixed(u32),
    /// Implicitly sized array, only legal for geometry stage inputs.
    Unsized,
}

impl ArraySize {
    pub(crate) fn suffix(self) -> String {
        match self {
            Self::None => String::new(),
            Self::Fixed(size) => format!("[{size}]"),
            Self::Unsized => "[]".to_string(),
        }
    }

    pub fn is_array(self) -> bool {
        self != Self::None
    }

    pub(crate) fn is_valid(self) -> bool {
        self != Self::Fixed(0)
    }
}

/// Kind of a declaration, in the order kinds are rendered.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum DeclarationKind {
    Function,
    Structure,
    UniformBlock,
    ShaderStorageBlock,
    InputBlock,
    OutputBlock,
    PushConstantBlock,
    SpecializationConstant,
    Sampler,
    TexelBuffer,
    StageInput,
    StageOutput,
    InputAttribute,
    InputPrimitive,
    OutputPrimitive,
    OutputFragment,
}

impl DeclarationKind {
    pub const COUNT: usize = 16;

    /// Every kind in rendering order.
    pub const ALL: [DeclarationKind; Self::COUNT] = [
        Self::Function,
        Self::Structure,
        Self::UniformBlock,
        Self::ShaderStorageBlock,
        Self::InputBlock,
        Self::OutputBlock,
        Self::PushConstantBlock,
        Self::SpecializationConstant,
        Self::Sampler,
        Self::TexelBuffer,
        Self::StageInput,
        Self::StageOutput,
        Self::InputAttribute,
        Self::InputPrimitive,
        Self::OutputPrimitive,
        Self::OutputFragment,
    ];

    pub(crate) fn index(self) -> usize {
        self as usize
    }

    /// Comment introducing the section of this kind in generated sources.
    pub fn section_comment(self) -> &'static str {
        match self {
            Self::Function => "Functions",
            Self::Structure => "Structures",
            Self::UniformBlock => "Uniform blocks (OpenGL/Vulkan UBO)",
            Self::ShaderStorageBlock => "Shader storage blocks (OpenGL/Vulkan SSBO)",
            Self::InputBlock => "Input blocks (From previous stage)",
            Self::OutputBlock => "Output blocks (To next stage)",
            Self::PushConstantBlock => "Push constant block (Vulkan)",
            Self::SpecializationConstant => "Specialization constants",
            Self::Sampler => "Samplers",
            Self::TexelBuffer => "Texel buffers",
            Self::StageInput => "Stage inputs (From previous stage)",
            Self::StageOutput => "Stage outputs (To next stage)",
            Self::InputAttribute => "Input vertex attributes (Vertex shader only)",
            Self::InputPrimitive => "Input primitives (Geometry shader only)",
            Self::OutputPrimitive => "Output primitives (Geometry shader only)",
            Self::OutputFragment => "Output fragments (Fragment shader only)",
        }
    }

    /// Label of this kind in declaration statistics.
    pub fn stats_label(self) -> &'static str {
        match self {
            Self::Function => "Function",
            Self::Structure => "Structure",
            Self::UniformBlock => "Uniform block",
            Self::ShaderStorageBlock => "Shader storage block",
            Self::InputBlock => "Input block",
            Self::OutputBlock => "Output block",
            Self::PushConstantBlock => "Push constant block (<= 1)",
            Self::SpecializationConstant => "Specialization constant",
            Self::Sampler => "Sampler",
            Self::TexelBuffer => "Texel",
            Self::StageInput => "Stage input",
            Self::StageOutput => "Stage output",
            Self::InputAttribute => "Input attribute (VS)",
            Self::InputPrimitive => "Input primitive (GS)",
            Self::OutputPrimitive => "Output primitive (GS)",
            Self::OutputFragment => "Output fragment (FS)",
        }
    }

    /// Returns true if duplicates are detected by instance name rather than
    /// by type name.
    pub fn keyed_by_instance(self) -> bool {
        matches!(
            self,
            Self::UniformBlock | Self::ShaderStorageBlock | Self::InputBlock | Self::OutputBlock
        )
    }
}

impl fmt::Display for DeclarationKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            Self::Function => "function",
            Self::Structure => "structure",
            Self::UniformBlock => "uniform block",
            Self::ShaderStorageBlock => "shader storage block",
            Self::InputBlock => "input block",
            Self::OutputBlock => "output block",
            Self::PushConstantBlock => "push constant block",
            Self::SpecializationConstant => "specialization constant",
            Self::Sampler => "sampler",
            Self::TexelBuffer => "texel buffer",
            Self::StageInput => "stage input",
            Self::StageOutput => "stage output",
            Self::InputAttribute => "input attribute",
            Self::InputPrimitive => "input primitive",
            Self::OutputPrimitive => "output primitive",
            Self::OutputFragment => "output fragment",
        };
        f.write_str(label)
    }
}

/// One global declaration of a stage.
#[derive(Debug, Clone, PartialEq)]
pub enum Declaration {
    Function(Function),
    Structure(Structure),
    UniformBlock(UniformBlock),
    ShaderStorageBlock(ShaderStorageBlock),
    InputBlock(InputBlock),
    OutputBlock(OutputBlock),
    PushConstantBlock(PushConstantBlock),
    SpecializationConstant(SpecializationConstant),
    Sampler(Sampler),
    TexelBuffer(TexelBuffer),
    StageInput(StageInput),
    StageOutput(StageOutput),
    InputAttribute(InputAttribute),
    InputPrimitive(InputPrimitive),
    OutputPrimitive(OutputPrimitive),
    OutputFragment(OutputFragment),
}

macro_rules! dispatch {
    ($value:expr, $inner:ident => $body:expr) => {
        match $value {
            Declaration::Function($inner) => $body,
            Declaration::Structure($inner) => $body,
            Declaration::UniformBlock($inner) => $body,
            Declaration::ShaderStorageBlock($inner) => $body,
            Declaration::InputBlock($inner) => $body,
            Declaration::OutputBlock($inner) => $body,
            Declaration::PushConstantBlock($inner) => $body,
            Declaration::SpecializationConstant($inner) => $body,
            Declaration::Sampler($inner) => $body,
            Declaration::TexelBuffer($inner) => $body,
            Declaration::StageInput($inner) => $body,
            Declaration::StageOutput($inner) => $body,
            Declaration::InputAttribute($inner) => $body,
            Declaration::InputPrimitive($inner) => $body,
            Declaration::OutputPrimitive($inner) => $body,
            Declaration::OutputFragment($inner) => $body,
        }
    };
}

impl Declaration {
    pub fn kind(&self) -> DeclarationKind {
        match self {
            Self::Function(_) => DeclarationKind::Function,
            Self::Structure(_) => DeclarationKind::Structure,
            Self::UniformBlock(_) => DeclarationKind::UniformBlock,
            Self::ShaderStorageBlock(_) => DeclarationKind::ShaderStorageBlock,
            Self::InputBlock(_) => DeclarationKind::InputBlock,
            Self::OutputBlock(_) => DeclarationKind::OutputBlock,
            Self::PushConstantBlock(_) => DeclarationKind::PushConstantBlock,
            Self::SpecializationConstant(_) => DeclarationKind::SpecializationConstant,
            Self::Sampler(_) => DeclarationKind::Sampler,
            Self::TexelBuffer(_) => DeclarationKind::TexelBuffer,
            Self::StageInput(_) => DeclarationKind::StageInput,
            Self::StageOutput(_) => DeclarationKind::StageOutput,
            Self::InputAttribute(_) => DeclarationKind::InputAttribute,
            Self::InputPrimitive(_) => DeclarationKind::InputPrimitive,
            Self::OutputPrimitive(_) => DeclarationKind::OutputPrimitive,
            Self::OutputFragment(_) => DeclarationKind::OutputFragment,
        }
    }

    /// Declared name. For blocks this is the block type name.
    pub fn name(&self) -> &str {
        dispatch!(self, inner => inner.name())
    }

    /// Key used to detect duplicate declarations.
    pub fn key(&self) -> &str {
        match self {
            Self::UniformBlock(block) => block.instance_name(),
            Self::ShaderStorageBlock(block) => block.instance_name(),
            Self::InputBlock(block) => block.instance_name(),
            Self::OutputBlock(block) => block.instance_name(),
            other => other.name(),
        }
    }

    pub fn is_valid(&self) -> bool {
        dispatch!(self, inner => inner.is_valid())
    }

    /// GLSL text of the declaration, newline terminated.
    pub fn source_code(&self) -> String {
        dispatch!(self, inner => inner.source_code())
    }
}

macro_rules! impl_from {
    ($($kind:ident),* $(,)?) => {
        $(
            impl From<$kind> for Declaration {
                fn from(value: $kind) -> Self {
                    Self::$kind(value)
                }
            }
        )*
    };
}

impl_from!(
    Function,
    Structure,
    UniformBlock,
    ShaderStorageBlock,
    InputBlock,
    OutputBlock,
    PushConstantBlock,
    SpecializationConstant,
    Sampler,
    TexelBuffer,
    StageInput,
    StageOutput,
    InputAttribute,
    InputPrimitive,
    OutputPrimitive,
    OutputFragment,
);
