//! Functions, constants and opaque resources.

use crate::shader::types::VariableType;

use super::ArraySize;

/// Sampled texture bound to a descriptor set.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Sampler {
    set: u32,
    binding: u32,
    variable_type: VariableType,
    name: String,
    array_size: ArraySize,
}

impl Sampler {
    pub fn new(set: u32, binding: u32, variable_type: VariableType, name: impl Into<String>) -> Self {
        Self {
            set,
            binding,
            variable_type,
            name: name.into(),
            array_size: ArraySize::None,
        }
    }

    pub fn with_array_size(mut self, size: u32) -> Self {
        self.array_size = ArraySize::Fixed(size);
        self
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn set(&self) -> u32 {
        self.set
    }

    pub fn binding(&self) -> u32 {
        self.binding
    }

    pub fn is_valid(&self) -> bool {
        !self.name.is_empty()
            && self.variable_type.is_sampler()
            && self.array_size != ArraySize::Unsized
            && self.array_size.is_valid()
    }

    pub fn source_code(&self) -> String {
        format!(
            "layout(set = {}, binding = {}) uniform {} {}{};\n",
            self.set,
            self.binding,
            self.variable_type,
            self.name,
            self.array_size.suffix()
        )
    }
}

/// Buffer texture bound to a descriptor set.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct TexelBuffer {
    set: u32,
    binding: u32,
    variable_type: VariableType,
    name: String,
}

impl TexelBuffer {
    pub fn new(set: u32, binding: u32, variable_type: VariableType, name: impl Into<String>) -> Self {
        Self {
            set,
            binding,
            variable_type,
            name: name.into(),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn is_valid(&self) -> bool {
        !self.name.is_empty() && self.variable_type.is_texel_buffer()
    }

    pub fn source_code(&self) -> String {
        format!(
            "layout(set = {}, binding = {}) uniform {} {};\n",
            self.set, self.binding, self.variable_type, self.name
        )
    }
}

/// Constant overridable at pipeline creation.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct SpecializationConstant {
    id: u32,
    variable_type: VariableType,
    name: String,
    default_value: String,
}

impl SpecializationConstant {
    pub fn new(
        id: u32,
        variable_type: VariableType,
        name: impl Into<String>,
        default_value: impl Into<String>,
    ) -> Self {
        Self {
            id,
            variable_type,
            name: name.into(),
            default_value: default_value.into(),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn is_valid(&self) -> bool {
        let scalar = matches!(
            self.variable_type,
            VariableType::Bool
                | VariableType::Int
                | VariableType::UInt
                | VariableType::Float
                | VariableType::Double
        );
        scalar && !self.name.is_empty() && !self.default_value.is_empty()
    }

    pub fn source_code(&self) -> String {
        format!(
            "layout(constant_id = {}) const {} {} = {};\n",
            self.id, self.variable_type, self.name, self.default_value
        )
    }
}

/// Helper function emitted before `main`.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Function {
    return_type: VariableType,
    name: String,
    parameters: Vec<(VariableType, String)>,
    statements: Vec<String>,
}

impl Function {
    pub fn new(return_type: VariableType, name: impl Into<String>) -> Self {
        Self {
            return_type,
            name: name.into(),
            parameters: Vec::new(),
            statements: Vec::new(),
        }
    }

    pub fn with_parameter(mut self, parameter_type: VariableType, name: impl Into<String>) -> Self {
        self.parameters.push((parameter_type, name.into()));
        self
    }

    /// Append one statement to the body. Statements are indented on output.
    pub fn with_statement(mut self, statement: impl Into<String>) -> Self {
        self.statements.push(statement.into());
        self
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn is_valid(&self) -> bool {
        !self.name.is_empty()
            && !self.statements.is_empty()
            && self
                .parameters
                .iter()
                .all(|(parameter_type, name)| *parameter_type != VariableType::Void && !name.is_empty())
    }

    pub fn source_code(&self) -> String {
        let parameters = self
            .parameters
            .iter()
            .map(|(parameter_type, name)| format!("{parameter_type} {name}"))
            .collect::<Vec<_>>()
            .join(", ");

        let mut source = format!("{} {} ({})\n{{\n", self.return_type, self.name, parameters);
        for statement in &self.statements {
            source.push('\t');
            source.push_str(statement);
            source.push('\n');
        }
        source.push_str("}\n");
        source
    }
}
