//! Source assembly of a single stage.

use crate::config::GeneratorConfig;
use crate::error::ProgramError;
use crate::program::SetIndexes;

use super::ShaderStage;
use super::attribute::VertexAttributeType;
use super::declaration::{
    Declaration, OutputFragment, PushConstantBlock, Sampler, StageOutput, UniformBlock,
    matrix_from_columns,
};
use super::keys;
use super::registry::{DeclarationRegistry, DeclarationStats, Declared};
use super::resolver::{ModelMatrixStrategy, SynthesisResolver};
use super::types::VariableType;
use super::variable::{SyntheticVariable, VariableScope};

/// Part of `main` a line of caller code is appended to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CodeLocation {
    /// After synthesized local values.
    Top,
    /// After synthesized exported values, at the end of `main`.
    Output,
}

/// A generated stage and the interface it exposes.
#[derive(Debug, Clone)]
pub struct Shader {
    stage: ShaderStage,
    name: String,
    source: String,
    input_attributes: Vec<VertexAttributeType>,
    stage_outputs: Vec<StageOutput>,
    push_constant_blocks: Vec<PushConstantBlock>,
    uniform_blocks: Vec<UniformBlock>,
    samplers: Vec<Sampler>,
    stats: DeclarationStats,
}

impl Shader {
    pub fn stage(&self) -> ShaderStage {
        self.stage
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn source(&self) -> &str {
        &self.source
    }

    /// Vertex attributes read by the stage, in declaration order.
    pub fn input_attributes(&self) -> &[VertexAttributeType] {
        &self.input_attributes
    }

    pub fn stage_outputs(&self) -> &[StageOutput] {
        &self.stage_outputs
    }

    pub fn push_constant_blocks(&self) -> &[PushConstantBlock] {
        &self.push_constant_blocks
    }

    pub fn uniform_blocks(&self) -> &[UniformBlock] {
        &self.uniform_blocks
    }

    pub fn samplers(&self) -> &[Sampler] {
        &self.samplers
    }

    pub fn stats(&self) -> &DeclarationStats {
        &self.stats
    }
}

/// Builds the GLSL text of one stage.
///
/// Declarations, variable requests and body code can be added in any
/// order; [`StageGenerator::generate_source_code`] lays them out.
#[derive(Debug, Clone)]
pub struct StageGenerator {
    glsl_version: String,
    glsl_profile: String,
    embedded_precision: bool,
    dump_sources: bool,
    extensions: Vec<(String, String)>,
    registry: DeclarationRegistry,
    resolver: SynthesisResolver,
    input_code: String,
    top_code: String,
    output_code: String,
    next_location: u32,
}

impl StageGenerator {
    pub fn new(
        stage: ShaderStage,
        name: impl Into<String>,
        config: &GeneratorConfig,
        strategy: ModelMatrixStrategy,
        set_indexes: SetIndexes,
    ) -> Self {
        let mut generator = Self {
            glsl_version: config.glsl_version().to_string(),
            glsl_profile: config.glsl_profile().to_string(),
            embedded_precision: config.embedded_precision(),
            dump_sources: config.dump_sources(),
            extensions: Vec::new(),
            registry: DeclarationRegistry::new(
                stage,
                name,
                strategy.uses_per_instance_matrices(),
            ),
            resolver: SynthesisResolver::new(stage, strategy, set_indexes),
            input_code: String::new(),
            top_code: String::new(),
            output_code: String::new(),
            next_location: keys::first_free_location(),
        };
        generator.set_extension_behavior(keys::SEPARATE_SHADER_OBJECTS_EXTENSION, "enable");
        generator
    }

    /// Read view matrices from a cubemap view block.
    pub fn with_cubemap_view(mut self, cubemap_view: bool) -> Self {
        self.resolver = self.resolver.with_cubemap_view(cubemap_view);
        self
    }

    pub fn stage(&self) -> ShaderStage {
        self.registry.stage()
    }

    pub fn name(&self) -> &str {
        self.registry.name()
    }

    pub fn registry(&self) -> &DeclarationRegistry {
        &self.registry
    }

    pub fn resolver(&self) -> &SynthesisResolver {
        &self.resolver
    }

    /// Descriptor set numbers of the program being generated.
    pub fn set_indexes(&self) -> SetIndexes {
        self.resolver.set_indexes()
    }

    /// Set the behavior of an extension, replacing a previous one.
    pub fn set_extension_behavior(&mut self, extension: &str, behavior: &str) {
        match self
            .extensions
            .iter_mut()
            .find(|(name, _)| name == extension)
        {
            Some((_, existing)) => *existing = behavior.to_string(),
            None => self
                .extensions
                .push((extension.to_string(), behavior.to_string())),
        }
    }

    pub fn declare(&mut self, declaration: impl Into<Declaration>) -> Result<Declared, ProgramError> {
        self.registry.declare(declaration)
    }

    pub fn request(
        &mut self,
        variable: SyntheticVariable,
        scope: VariableScope,
    ) -> Result<(), ProgramError> {
        self.resolver.request(variable, scope)
    }

    pub fn request_by_name(&mut self, name: &str, scope: VariableScope) -> Result<(), ProgramError> {
        self.resolver.request_by_name(name, scope)
    }

    /// Append one statement to `main`.
    pub fn add_code(&mut self, location: CodeLocation, line: &str) {
        let code = match location {
            CodeLocation::Top => &mut self.top_code,
            CodeLocation::Output => &mut self.output_code,
        };
        code.push('\t');
        code.push_str(line);
        code.push('\n');
    }

    /// Declare the view block of the render target the program draws into.
    pub fn declare_view_uniform_block(&mut self) -> Result<(), ProgramError> {
        self.resolver.declare_view_block(&mut self.registry)
    }

    /// Declare `ssv_OutputFragment` at location 0.
    pub fn declare_default_output_fragment(&mut self) -> Result<Declared, ProgramError> {
        self.registry.declare(OutputFragment::new(
            0,
            VariableType::Vec4,
            keys::variable::OUTPUT_FRAGMENT,
        ))
    }

    /// Redeclare every output of `previous` as an input of this stage.
    ///
    /// Matrices arrive column by column and are rebuilt at the start of
    /// `main`, except in a geometry stage where every input is an array.
    pub fn connect_from_previous_stage(&mut self, previous: &Shader) -> Result<(), ProgramError> {
        let arrayed = self.stage() == ShaderStage::Geometry;
        for output in previous.stage_outputs() {
            let declared = self.registry.declare(output.to_stage_input(arrayed))?;
            if declared == Declared::Duplicate || arrayed {
                continue;
            }
            if let Some(statement) = matrix_from_columns(output.variable_type(), output.name()) {
                self.input_code.push_str(&format!("\t{statement}\n"));
            }
        }
        Ok(())
    }

    /// Reserve `increment` interface locations and return the first one.
    pub fn next_shader_variable_location(&mut self, increment: u32) -> u32 {
        let location = self.next_location;
        self.next_location += increment;
        location
    }

    /// Render the complete stage.
    ///
    /// Synthesis runs first since it adds declarations.
    pub fn generate_source_code(&mut self) -> Result<String, ProgramError> {
        let mut top = String::new();
        let mut output = String::new();
        self.resolver
            .resolve(&mut self.registry, &mut top, &mut output)?;

        let mut source = format!("#version {} {}\n", self.glsl_version, self.glsl_profile);
        for (extension, behavior) in &self.extensions {
            source.push_str(&format!("#extension {extension} : {behavior}\n"));
        }
        source.push('\n');

        if self.embedded_precision {
            source.push_str("precision mediump float;\n\n");
        }

        source.push_str(&format!(
            "/* {} : {} */\n\n",
            self.registry.stage(),
            self.registry.name()
        ));

        self.registry.generate_declarations(&mut source);

        source.push_str("void main ()\n{\n");
        source.push_str(&self.input_code);
        source.push_str(&self.resolver.preparation_code());
        source.push_str(&top);
        source.push_str(&self.top_code);
        source.push_str(&output);
        source.push_str(&self.output_code);
        source.push_str("}\n");

        Ok(source)
    }

    pub fn stats(&self) -> DeclarationStats {
        self.registry.stats()
    }

    /// Generate the source and capture the stage interface.
    pub fn finish(mut self) -> Result<Shader, ProgramError> {
        opaline_core::profile_function!();
        let source = self.generate_source_code()?;
        let stats = self.registry.stats();

        if self.dump_sources {
            log::debug!(
                "{} '{}':\n{stats}\n{source}",
                self.registry.stage(),
                self.registry.name()
            );
        }

        Ok(Shader {
            stage: self.registry.stage(),
            name: self.registry.name().to_string(),
            source,
            input_attributes: self
                .registry
                .input_attributes()
                .map(|attribute| attribute.attribute())
                .collect(),
            stage_outputs: self.registry.stage_outputs().cloned().collect(),
            push_constant_blocks: self.registry.push_constant_blocks().cloned().collect(),
            uniform_blocks: self.registry.uniform_blocks().cloned().collect(),
            samplers: self.registry.samplers().cloned().collect(),
            stats,
        })
    }
}
