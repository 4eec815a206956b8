//! Block and structure declarations.

use crate::shader::types::{MemoryLayout, VariableType};

use super::ArraySize;

/// Type of a block or structure member.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum MemberType {
    Variable(VariableType),
    /// A previously declared structure, with its size in bytes.
    Structure { name: String, bytes: u32 },
}

impl MemberType {
    fn glsl_name(&self) -> &str {
        match self {
            Self::Variable(variable_type) => variable_type.glsl_name(),
            Self::Structure { name, .. } => name,
        }
    }

    fn bytes(&self) -> u32 {
        match self {
            Self::Variable(variable_type) => variable_type.bytes(),
            Self::Structure { bytes, .. } => *bytes,
        }
    }
}

/// Member of a block or structure.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Member {
    pub member_type: MemberType,
    pub name: String,
    pub array_size: ArraySize,
}

impl Member {
    pub fn new(variable_type: VariableType, name: impl Into<String>) -> Self {
        Self {
            member_type: MemberType::Variable(variable_type),
            name: name.into(),
            array_size: ArraySize::None,
        }
    }

    /// Fixed size array of a structure.
    pub fn structure_array(structure: &Structure, name: impl Into<String>, size: u32) -> Self {
        Self {
            member_type: MemberType::Structure {
                name: structure.name().to_string(),
                bytes: structure.bytes(),
            },
            name: name.into(),
            array_size: ArraySize::Fixed(size),
        }
    }

    /// Size in bytes, arrays included.
    pub fn bytes(&self) -> u32 {
        let count = match self.array_size {
            ArraySize::Fixed(size) => size,
            _ => 1,
        };
        self.member_type.bytes() * count
    }

    fn is_valid(&self) -> bool {
        let type_valid = match &self.member_type {
            MemberType::Variable(variable_type) => variable_type.is_data(),
            MemberType::Structure { name, .. } => !name.is_empty(),
        };
        type_valid && !self.name.is_empty() && self.array_size != ArraySize::Unsized
            && self.array_size.is_valid()
    }

    fn source_code(&self) -> String {
        format!(
            "\t{} {}{};\n",
            self.member_type.glsl_name(),
            self.name,
            self.array_size.suffix()
        )
    }
}

fn members_valid(members: &[Member]) -> bool {
    !members.is_empty() && members.iter().all(Member::is_valid)
}

fn members_source(members: &[Member]) -> String {
    let mut source = String::from("{\n");
    for member in members {
        source.push_str(&member.source_code());
    }
    source.push('}');
    source
}

fn members_bytes(members: &[Member]) -> u32 {
    members.iter().map(Member::bytes).sum()
}

/// Structure type definition.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Structure {
    name: String,
    members: Vec<Member>,
}

impl Structure {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            members: Vec::new(),
        }
    }

    pub fn with_member(mut self, member: Member) -> Self {
        self.members.push(member);
        self
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn members(&self) -> &[Member] {
        &self.members
    }

    pub fn bytes(&self) -> u32 {
        members_bytes(&self.members)
    }

    pub fn is_valid(&self) -> bool {
        !self.name.is_empty() && members_valid(&self.members)
    }

    pub fn source_code(&self) -> String {
        format!("struct {}\n{};\n", self.name, members_source(&self.members))
    }
}

/// Uniform buffer block bound to a descriptor set.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct UniformBlock {
    name: String,
    instance_name: String,
    set: u32,
    binding: u32,
    memory_layout: MemoryLayout,
    members: Vec<Member>,
    array_size: ArraySize,
}

impl UniformBlock {
    pub fn new(
        name: impl Into<String>,
        instance_name: impl Into<String>,
        set: u32,
        binding: u32,
    ) -> Self {
        Self {
            name: name.into(),
            instance_name: instance_name.into(),
            set,
            binding,
            memory_layout: MemoryLayout::Std140,
            members: Vec::new(),
            array_size: ArraySize::None,
        }
    }

    pub fn with_member(mut self, member: Member) -> Self {
        self.members.push(member);
        self
    }

    pub fn with_memory_layout(mut self, memory_layout: MemoryLayout) -> Self {
        self.memory_layout = memory_layout;
        self
    }

    pub fn with_array_size(mut self, size: u32) -> Self {
        self.array_size = ArraySize::Fixed(size);
        self
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn instance_name(&self) -> &str {
        &self.instance_name
    }

    pub fn set(&self) -> u32 {
        self.set
    }

    pub fn binding(&self) -> u32 {
        self.binding
    }

    pub fn members(&self) -> &[Member] {
        &self.members
    }

    pub fn bytes(&self) -> u32 {
        members_bytes(&self.members)
    }

    pub fn is_valid(&self) -> bool {
        !self.name.is_empty()
            && !self.instance_name.is_empty()
            && members_valid(&self.members)
            && self.array_size != ArraySize::Unsized
            && self.array_size.is_valid()
    }

    pub fn source_code(&self) -> String {
        format!(
            "layout({}, set = {}, binding = {}) uniform {}\n{} {}{};\n",
            self.memory_layout.glsl_name(),
            self.set,
            self.binding,
            self.name,
            members_source(&self.members),
            self.instance_name,
            self.array_size.suffix()
        )
    }
}

/// Shader storage buffer block bound to a descriptor set.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ShaderStorageBlock {
    name: String,
    instance_name: String,
    set: u32,
    binding: u32,
    memory_layout: MemoryLayout,
    read_only: bool,
    members: Vec<Member>,
}

impl ShaderStorageBlock {
    pub fn new(
        name: impl Into<String>,
        instance_name: impl Into<String>,
        set: u32,
        binding: u32,
    ) -> Self {
        Self {
            name: name.into(),
            instance_name: instance_name.into(),
            set,
            binding,
            memory_layout: MemoryLayout::Std430,
            read_only: false,
            members: Vec::new(),
        }
    }

    pub fn with_member(mut self, member: Member) -> Self {
        self.members.push(member);
        self
    }

    pub fn read_only(mut self) -> Self {
        self.read_only = true;
        self
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn instance_name(&self) -> &str {
        &self.instance_name
    }

    pub fn set(&self) -> u32 {
        self.set
    }

    pub fn binding(&self) -> u32 {
        self.binding
    }

    pub fn is_valid(&self) -> bool {
        !self.name.is_empty() && !self.instance_name.is_empty() && members_valid(&self.members)
    }

    pub fn source_code(&self) -> String {
        format!(
            "layout({}, set = {}, binding = {}) {}buffer {}\n{} {};\n",
            self.memory_layout.glsl_name(),
            self.set,
            self.binding,
            if self.read_only { "readonly " } else { "" },
            self.name,
            members_source(&self.members),
            self.instance_name
        )
    }
}

/// Push constant block. A stage can declare at most one.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct PushConstantBlock {
    name: String,
    instance_name: String,
    members: Vec<Member>,
}

impl PushConstantBlock {
    pub fn new(name: impl Into<String>, instance_name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            instance_name: instance_name.into(),
            members: Vec::new(),
        }
    }

    pub fn with_member(mut self, member: Member) -> Self {
        self.members.push(member);
        self
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn instance_name(&self) -> &str {
        &self.instance_name
    }

    pub fn members(&self) -> &[Member] {
        &self.members
    }

    /// Returns true if the block has a member with this name.
    pub fn has_member(&self, name: &str) -> bool {
        self.members.iter().any(|member| member.name == name)
    }

    pub fn bytes(&self) -> u32 {
        members_bytes(&self.members)
    }

    pub fn is_valid(&self) -> bool {
        !self.name.is_empty() && !self.instance_name.is_empty() && members_valid(&self.members)
    }

    pub fn source_code(&self) -> String {
        format!(
            "layout(push_constant) uniform {}\n{} {};\n",
            self.name,
            members_source(&self.members),
            self.instance_name
        )
    }
}

/// Interface block received from the previous stage.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct InputBlock {
    name: String,
    instance_name: String,
    location: u32,
    members: Vec<Member>,
    array_size: ArraySize,
}

impl InputBlock {
    pub fn new(name: impl Into<String>, instance_name: impl Into<String>, location: u32) -> Self {
        Self {
            name: name.into(),
            instance_name: instance_name.into(),
            location,
            members: Vec::new(),
            array_size: ArraySize::None,
        }
    }

    pub fn with_member(mut self, member: Member) -> Self {
        self.members.push(member);
        self
    }

    pub fn with_array_size(mut self, array_size: ArraySize) -> Self {
        self.array_size = array_size;
        self
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn instance_name(&self) -> &str {
        &self.instance_name
    }

    pub fn is_valid(&self) -> bool {
        !self.name.is_empty()
            && !self.instance_name.is_empty()
            && members_valid(&self.members)
            && self.array_size.is_valid()
    }

    pub fn source_code(&self) -> String {
        format!(
            "layout(location = {}) in {}\n{} {}{};\n",
            self.location,
            self.name,
            members_source(&self.members),
            self.instance_name,
            self.array_size.suffix()
        )
    }
}

/// Interface block sent to the next stage.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct OutputBlock {
    name: String,
    instance_name: String,
    location: u32,
    members: Vec<Member>,
}

impl OutputBlock {
    pub fn new(name: impl Into<String>, instance_name: impl Into<String>, location: u32) -> Self {
        Self {
            name: name.into(),
            instance_name: instance_name.into(),
            location,
            members: Vec::new(),
        }
    }

    pub fn with_member(mut self, member: Member) -> Self {
        self.members.push(member);
        self
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn instance_name(&self) -> &str {
        &self.instance_name
    }

    pub fn is_valid(&self) -> bool {
        !self.name.is_empty() && !self.instance_name.is_empty() && members_valid(&self.members)
    }

    pub fn source_code(&self) -> String {
        format!(
            "layout(location = {}) out {}\n{} {};\n",
            self.location,
            self.name,
            members_source(&self.members),
            self.instance_name
        )
    }
}
