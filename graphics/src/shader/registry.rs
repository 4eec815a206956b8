//! Per-stage declaration registry.

use std::fmt;

use crate::error::ProgramError;

use super::ShaderStage;
use super::declaration::{
    Declaration, DeclarationKind, InputAttribute, OutputFragment, PushConstantBlock, Sampler,
    StageOutput, UniformBlock,
};

/// Outcome of a successful [`DeclarationRegistry::declare`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Declared {
    /// The declaration was stored.
    Added,
    /// A declaration with the same key already existed and was kept.
    Duplicate,
}

/// Global declarations of one stage, in insertion order per kind.
///
/// A declaration is identified by its key: the instance name for uniform,
/// storage, input and output blocks, the name for everything else. The
/// first declaration of a key wins; later ones are dropped with a warning.
#[derive(Debug, Clone)]
pub struct DeclarationRegistry {
    stage: ShaderStage,
    name: String,
    per_instance_matrices: bool,
    declarations: [Vec<Declaration>; DeclarationKind::COUNT],
}

impl DeclarationRegistry {
    /// Create an empty registry for a stage.
    ///
    /// `per_instance_matrices` allows the per-instance matrix attributes,
    /// which only exist when model matrices come from a vertex buffer.
    pub fn new(stage: ShaderStage, name: impl Into<String>, per_instance_matrices: bool) -> Self {
        Self {
            stage,
            name: name.into(),
            per_instance_matrices,
            declarations: std::array::from_fn(|_| Vec::new()),
        }
    }

    pub fn stage(&self) -> ShaderStage {
        self.stage
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Add a declaration to the stage.
    pub fn declare(&mut self, declaration: impl Into<Declaration>) -> Result<Declared, ProgramError> {
        let declaration = declaration.into();
        let kind = declaration.kind();

        if let Err(reason) = self.check_legality(&declaration) {
            let err = ProgramError::StageMismatch {
                kind,
                name: declaration.key().to_string(),
                stage: self.stage,
                reason,
            };
            log::error!("{} '{}': {err}", self.stage, self.name);
            return Err(err);
        }

        if !declaration.is_valid() {
            let err = ProgramError::InvalidDeclaration {
                kind,
                name: declaration.key().to_string(),
            };
            log::error!("{} '{}': {err}", self.stage, self.name);
            return Err(err);
        }

        if self.contains(kind, declaration.key()) {
            let duplicate = ProgramError::DuplicateDeclaration {
                kind,
                name: declaration.key().to_string(),
            };
            log::warn!("{} '{}': {duplicate}", self.stage, self.name);
            return Ok(Declared::Duplicate);
        }

        log::debug!(
            "{kind} '{}' has been declared to {} '{}'",
            declaration.key(),
            self.stage,
            self.name
        );
        self.declarations[kind.index()].push(declaration);

        Ok(Declared::Added)
    }

    fn check_legality(&self, declaration: &Declaration) -> Result<(), &'static str> {
        let stage = self.stage;
        match declaration {
            Declaration::InputAttribute(attribute) => {
                if attribute.is_arrayed() {
                    if stage != ShaderStage::Geometry {
                        return Err("arrayed input attributes are geometry stage only");
                    }
                } else if stage != ShaderStage::Vertex {
                    return Err("input attributes are vertex stage only");
                }
                if attribute.attribute().is_per_instance() && !self.per_instance_matrices {
                    return Err("per-instance matrices require vertex buffer model matrices");
                }
            }
            Declaration::InputPrimitive(_) | Declaration::OutputPrimitive(_) => {
                if stage != ShaderStage::Geometry {
                    return Err("primitive layouts are geometry stage only");
                }
            }
            Declaration::StageInput(input) => {
                if stage == ShaderStage::Vertex {
                    return Err("the vertex stage has no previous stage");
                }
                if input.is_unsized_array() && stage != ShaderStage::Geometry {
                    return Err("unsized stage inputs are geometry stage only");
                }
            }
            Declaration::StageOutput(_) => {
                if stage == ShaderStage::Fragment {
                    return Err("the fragment stage has no next stage");
                }
            }
            Declaration::OutputFragment(_) => {
                if stage != ShaderStage::Fragment {
                    return Err("output fragments are fragment stage only");
                }
            }
            Declaration::PushConstantBlock(_) => {
                let kind = DeclarationKind::PushConstantBlock;
                if self.count(kind) > 0 && !self.contains(kind, declaration.key()) {
                    return Err("a stage declares at most one push constant block");
                }
            }
            _ => {}
        }
        Ok(())
    }

    /// Returns true if a declaration of this kind uses the key.
    pub fn contains(&self, kind: DeclarationKind, key: &str) -> bool {
        self.declarations[kind.index()]
            .iter()
            .any(|declaration| declaration.key() == key)
    }

    /// Declarations of one kind in insertion order.
    pub fn declarations(&self, kind: DeclarationKind) -> &[Declaration] {
        &self.declarations[kind.index()]
    }

    pub fn count(&self, kind: DeclarationKind) -> usize {
        self.declarations[kind.index()].len()
    }

    pub fn uniform_blocks(&self) -> impl Iterator<Item = &UniformBlock> {
        self.declarations(DeclarationKind::UniformBlock)
            .iter()
            .filter_map(|declaration| match declaration {
                Declaration::UniformBlock(block) => Some(block),
                _ => None,
            })
    }

    pub fn push_constant_blocks(&self) -> impl Iterator<Item = &PushConstantBlock> {
        self.declarations(DeclarationKind::PushConstantBlock)
            .iter()
            .filter_map(|declaration| match declaration {
                Declaration::PushConstantBlock(block) => Some(block),
                _ => None,
            })
    }

    pub fn samplers(&self) -> impl Iterator<Item = &Sampler> {
        self.declarations(DeclarationKind::Sampler)
            .iter()
            .filter_map(|declaration| match declaration {
                Declaration::Sampler(sampler) => Some(sampler),
                _ => None,
            })
    }

    pub fn input_attributes(&self) -> impl Iterator<Item = &InputAttribute> {
        self.declarations(DeclarationKind::InputAttribute)
            .iter()
            .filter_map(|declaration| match declaration {
                Declaration::InputAttribute(attribute) => Some(attribute),
                _ => None,
            })
    }

    pub fn stage_outputs(&self) -> impl Iterator<Item = &StageOutput> {
        self.declarations(DeclarationKind::StageOutput)
            .iter()
            .filter_map(|declaration| match declaration {
                Declaration::StageOutput(output) => Some(output),
                _ => None,
            })
    }

    pub fn output_fragments(&self) -> impl Iterator<Item = &OutputFragment> {
        self.declarations(DeclarationKind::OutputFragment)
            .iter()
            .filter_map(|declaration| match declaration {
                Declaration::OutputFragment(output) => Some(output),
                _ => None,
            })
    }

    /// Kinds rendered for the stage, in order.
    fn sections(&self) -> Vec<DeclarationKind> {
        let mut sections = DeclarationKind::ALL[..=DeclarationKind::StageOutput.index()].to_vec();
        match self.stage {
            ShaderStage::Vertex => sections.push(DeclarationKind::InputAttribute),
            ShaderStage::Geometry => {
                if self.count(DeclarationKind::InputAttribute) > 0 {
                    sections.push(DeclarationKind::InputAttribute);
                }
                sections.push(DeclarationKind::InputPrimitive);
                sections.push(DeclarationKind::OutputPrimitive);
            }
            ShaderStage::Fragment => sections.push(DeclarationKind::OutputFragment),
            ShaderStage::TessellationControl | ShaderStage::TessellationEvaluation => {}
        }
        sections
    }

    /// Append every declaration section of the stage to `source`.
    pub fn generate_declarations(&self, source: &mut String) {
        for kind in self.sections() {
            let declarations = self.declarations(kind);
            if declarations.is_empty() {
                source.push_str(&format!("/* No {} */\n\n", kind.section_comment()));
                continue;
            }

            source.push_str(&format!("/* {} */\n", kind.section_comment()));
            for declaration in declarations {
                source.push_str(&declaration.source_code());
            }
            source.push('\n');
        }
    }

    /// Number of declarations per kind.
    pub fn stats(&self) -> DeclarationStats {
        DeclarationStats {
            counts: std::array::from_fn(|index| self.declarations[index].len()),
        }
    }
}

/// Declaration count of a stage, per kind.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct DeclarationStats {
    counts: [usize; DeclarationKind::COUNT],
}

impl DeclarationStats {
    pub fn count(&self, kind: DeclarationKind) -> usize {
        self.counts[kind.index()]
    }

    pub fn total(&self) -> usize {
        self.counts.iter().sum()
    }
}

impl fmt::Display for DeclarationStats {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Shader declarations :")?;
        for kind in DeclarationKind::ALL {
            writeln!(f, " - {} : {}", kind.stats_label(), self.count(kind))?;
        }
        Ok(())
    }
}
