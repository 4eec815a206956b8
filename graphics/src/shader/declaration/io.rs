//! Stage interface declarations.

use crate::shader::attribute::VertexAttributeType;
use crate::shader::types::{InputPrimitiveType, Interpolation, OutputPrimitiveType, VariableType};

use super::ArraySize;

/// Name of one column of a matrix crossing an interface.
pub fn column_name(name: &str, column: u32) -> String {
    format!("{name}Column{column}")
}

/// Statement rebuilding a matrix named `name` from its interface columns.
///
/// Returns `None` for non-matrix types, which are read directly.
pub fn matrix_from_columns(variable_type: VariableType, name: &str) -> Option<String> {
    let (_, columns) = variable_type.matrix_columns()?;
    let columns: Vec<_> = (0..columns).map(|column| column_name(name, column)).collect();
    Some(format!(
        "const {variable_type} {name} = {variable_type}({});",
        columns.join(", ")
    ))
}

/// Interface lines of one variable. Matrices take one location per column.
fn interface_source(
    location: u32,
    qualifiers: &str,
    variable_type: VariableType,
    name: &str,
    suffix: &str,
) -> String {
    match variable_type.matrix_columns() {
        Some((column_type, columns)) => (0..columns)
            .map(|column| {
                format!(
                    "layout(location = {}) {qualifiers} {column_type} {}{suffix};\n",
                    location + column,
                    column_name(name, column)
                )
            })
            .collect(),
        None => {
            format!("layout(location = {location}) {qualifiers} {variable_type} {name}{suffix};\n")
        }
    }
}

/// Vertex attribute read by the vertex stage, or by a geometry stage when
/// arrayed.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct InputAttribute {
    attribute: VertexAttributeType,
    array_size: ArraySize,
}

impl InputAttribute {
    pub fn new(attribute: VertexAttributeType) -> Self {
        Self {
            attribute,
            array_size: ArraySize::None,
        }
    }

    pub fn with_array_size(mut self, array_size: ArraySize) -> Self {
        self.array_size = array_size;
        self
    }

    pub fn attribute(&self) -> VertexAttributeType {
        self.attribute
    }

    pub fn is_arrayed(&self) -> bool {
        self.array_size.is_array()
    }

    pub fn name(&self) -> &str {
        self.attribute.name()
    }

    pub fn is_valid(&self) -> bool {
        self.array_size.is_valid()
    }

    pub fn source_code(&self) -> String {
        interface_source(
            self.attribute.location(),
            "in",
            self.attribute.variable_type(),
            self.attribute.name(),
            &self.array_size.suffix(),
        )
    }
}

/// Variable received from the previous stage.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct StageInput {
    location: u32,
    variable_type: VariableType,
    name: String,
    interpolation: Interpolation,
    array_size: ArraySize,
}

impl StageInput {
    pub fn new(location: u32, variable_type: VariableType, name: impl Into<String>) -> Self {
        Self {
            location,
            variable_type,
            name: name.into(),
            interpolation: Interpolation::Smooth,
            array_size: ArraySize::None,
        }
    }

    pub fn with_interpolation(mut self, interpolation: Interpolation) -> Self {
        self.interpolation = interpolation;
        self
    }

    pub fn with_array_size(mut self, array_size: ArraySize) -> Self {
        self.array_size = array_size;
        self
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn location(&self) -> u32 {
        self.location
    }

    pub fn variable_type(&self) -> VariableType {
        self.variable_type
    }

    pub fn is_unsized_array(&self) -> bool {
        self.array_size == ArraySize::Unsized
    }

    pub fn is_valid(&self) -> bool {
        !self.name.is_empty() && self.variable_type.is_data() && self.array_size.is_valid()
    }

    pub fn source_code(&self) -> String {
        interface_source(
            self.location,
            &format!("{} in", self.interpolation.glsl_name()),
            self.variable_type,
            &self.name,
            &self.array_size.suffix(),
        )
    }
}

/// Variable sent to the next stage.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct StageOutput {
    location: u32,
    variable_type: VariableType,
    name: String,
    interpolation: Interpolation,
    array_size: ArraySize,
}

impl StageOutput {
    pub fn new(location: u32, variable_type: VariableType, name: impl Into<String>) -> Self {
        Self {
            location,
            variable_type,
            name: name.into(),
            interpolation: Interpolation::Smooth,
            array_size: ArraySize::None,
        }
    }

    pub fn with_interpolation(mut self, interpolation: Interpolation) -> Self {
        self.interpolation = interpolation;
        self
    }

    pub fn with_array_size(mut self, size: u32) -> Self {
        self.array_size = ArraySize::Fixed(size);
        self
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn location(&self) -> u32 {
        self.location
    }

    pub fn variable_type(&self) -> VariableType {
        self.variable_type
    }

    pub fn interpolation(&self) -> Interpolation {
        self.interpolation
    }

    /// The matching input declaration for the next stage.
    ///
    /// A geometry stage receives one value per primitive vertex and gets an
    /// implicitly sized array.
    pub fn to_stage_input(&self, arrayed: bool) -> StageInput {
        let array_size = if arrayed {
            ArraySize::Unsized
        } else {
            self.array_size
        };
        StageInput::new(self.location, self.variable_type, self.name.clone())
            .with_interpolation(self.interpolation)
            .with_array_size(array_size)
    }

    pub fn is_valid(&self) -> bool {
        !self.name.is_empty() && self.variable_type.is_data() && self.array_size.is_valid()
    }

    pub fn source_code(&self) -> String {
        interface_source(
            self.location,
            &format!("{} out", self.interpolation.glsl_name()),
            self.variable_type,
            &self.name,
            &self.array_size.suffix(),
        )
    }
}

/// Color attachment written by the fragment stage.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct OutputFragment {
    location: u32,
    variable_type: VariableType,
    name: String,
}

impl OutputFragment {
    pub fn new(location: u32, variable_type: VariableType, name: impl Into<String>) -> Self {
        Self {
            location,
            variable_type,
            name: name.into(),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn location(&self) -> u32 {
        self.location
    }

    pub fn is_valid(&self) -> bool {
        let writable = matches!(
            self.variable_type,
            VariableType::Float
                | VariableType::Vec2
                | VariableType::Vec3
                | VariableType::Vec4
                | VariableType::Int
                | VariableType::IVec2
                | VariableType::IVec3
                | VariableType::IVec4
                | VariableType::UInt
                | VariableType::UVec2
                | VariableType::UVec3
                | VariableType::UVec4
        );
        !self.name.is_empty() && writable
    }

    pub fn source_code(&self) -> String {
        format!(
            "layout(location = {}) out {} {};\n",
            self.location, self.variable_type, self.name
        )
    }
}

/// Primitive type consumed by a geometry stage.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct InputPrimitive {
    primitive: InputPrimitiveType,
    invocations: u32,
}

impl InputPrimitive {
    pub fn new(primitive: InputPrimitiveType) -> Self {
        Self {
            primitive,
            invocations: 1,
        }
    }

    /// Run the geometry stage several times per primitive.
    pub fn with_invocations(mut self, invocations: u32) -> Self {
        self.invocations = invocations;
        self
    }

    pub fn primitive(&self) -> InputPrimitiveType {
        self.primitive
    }

    pub fn name(&self) -> &str {
        self.primitive.glsl_name()
    }

    pub fn is_valid(&self) -> bool {
        self.invocations > 0
    }

    pub fn source_code(&self) -> String {
        if self.invocations > 1 {
            format!(
                "layout({}, invocations = {}) in;\n",
                self.primitive.glsl_name(),
                self.invocations
            )
        } else {
            format!("layout({}) in;\n", self.primitive.glsl_name())
        }
    }
}

/// Primitive type emitted by a geometry stage.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct OutputPrimitive {
    primitive: OutputPrimitiveType,
    max_vertices: u32,
}

impl OutputPrimitive {
    pub fn new(primitive: OutputPrimitiveType, max_vertices: u32) -> Self {
        Self {
            primitive,
            max_vertices,
        }
    }

    pub fn name(&self) -> &str {
        self.primitive.glsl_name()
    }

    pub fn is_valid(&self) -> bool {
        self.max_vertices > 0
    }

    pub fn source_code(&self) -> String {
        format!(
            "layout({}, max_vertices = {}) out;\n",
            self.primitive.glsl_name(),
            self.max_vertices
        )
    }
}
