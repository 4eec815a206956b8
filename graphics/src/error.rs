//! Graphics and program generation error types.

use std::fmt;

use crate::shader::ShaderStage;
use crate::shader::declaration::DeclarationKind;

/// Errors reported by GPU backends and object caches.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GraphicsError {
    /// Failed to initialize the graphics system.
    InitializationFailed(String),
    /// Failed to create a resource.
    ResourceCreationFailed(String),
    /// A requested feature is not supported.
    FeatureNotSupported(String),
    /// Out of GPU memory.
    OutOfMemory,
    /// The GPU device was lost.
    DeviceLost,
    /// An invalid parameter was provided.
    InvalidParameter(String),
    /// Shader source could not be compiled.
    ShaderCompilationFailed(String),
    /// An internal error occurred.
    Internal(String),
}

impl fmt::Display for GraphicsError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::InitializationFailed(msg) => write!(f, "initialization failed: {msg}"),
            Self::ResourceCreationFailed(msg) => write!(f, "resource creation failed: {msg}"),
            Self::FeatureNotSupported(msg) => write!(f, "feature not supported: {msg}"),
            Self::OutOfMemory => write!(f, "out of GPU memory"),
            Self::DeviceLost => write!(f, "GPU device lost"),
            Self::InvalidParameter(msg) => write!(f, "invalid parameter: {msg}"),
            Self::ShaderCompilationFailed(msg) => write!(f, "shader compilation failed: {msg}"),
            Self::Internal(msg) => write!(f, "internal error: {msg}"),
        }
    }
}

impl std::error::Error for GraphicsError {}

/// Errors raised while generating a shader program and its pipeline.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ProgramError {
    /// A declaration failed its validity check.
    InvalidDeclaration { kind: DeclarationKind, name: String },
    /// A declaration kind is not allowed in the stage it was declared to.
    StageMismatch {
        kind: DeclarationKind,
        name: String,
        stage: ShaderStage,
        reason: &'static str,
    },
    /// A declaration with the same key already exists.
    ///
    /// Registries absorb duplicates and only log this error.
    DuplicateDeclaration { kind: DeclarationKind, name: String },
    /// The requested name is not a known synthetic variable.
    UnknownVariable(String),
    /// Synthetic variables can only be requested in the vertex stage.
    WrongStage { variable: String, stage: ShaderStage },
    /// A synthetic variable cannot be produced with the active model matrix
    /// source.
    Synthesis(String),
    /// A program stage was initialized twice.
    StageAlreadyExists(ShaderStage),
    /// The generation hook did not produce a vertex stage.
    MissingVertexStage,
    /// The program lacks a stage or its vertex buffer format.
    IncompleteProgram(String),
    /// The geometry cannot feed the attributes consumed by the vertex stage.
    IncompatibleVertexFormat(String),
    /// The render target has no per-view descriptor set layout.
    MissingViewLayout,
    /// No pipeline layout could be obtained.
    MissingPipelineLayout(String),
    /// No shader module could be obtained for the program stages.
    MissingShaderModules(String),
    /// The backend rejected the configured pipeline.
    PipelineFinalizationFailed(String),
    /// A build step was called out of order.
    InvalidState(String),
    /// A generator hook failed.
    Generation(String),
    /// A backend or cache error.
    Graphics(GraphicsError),
}

impl fmt::Display for ProgramError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::InvalidDeclaration { kind, name } => {
                write!(f, "invalid {kind} declaration '{name}'")
            }
            Self::StageMismatch {
                kind,
                name,
                stage,
                reason,
            } => write!(f, "{kind} '{name}' cannot be declared to {stage}: {reason}"),
            Self::DuplicateDeclaration { kind, name } => {
                write!(f, "{kind} '{name}' is already declared")
            }
            Self::UnknownVariable(name) => write!(f, "unknown synthetic variable '{name}'"),
            Self::WrongStage { variable, stage } => write!(
                f,
                "synthetic variable '{variable}' requested in {stage}, only the vertex stage can synthesize"
            ),
            Self::Synthesis(msg) => write!(f, "variable synthesis failed: {msg}"),
            Self::StageAlreadyExists(stage) => write!(f, "{stage} already exists in the program"),
            Self::MissingVertexStage => write!(f, "program has no vertex stage"),
            Self::IncompleteProgram(msg) => write!(f, "program is incomplete: {msg}"),
            Self::IncompatibleVertexFormat(msg) => {
                write!(f, "incompatible vertex buffer format: {msg}")
            }
            Self::MissingViewLayout => {
                write!(f, "render target has no view descriptor set layout")
            }
            Self::MissingPipelineLayout(msg) => write!(f, "missing pipeline layout: {msg}"),
            Self::MissingShaderModules(msg) => write!(f, "missing shader modules: {msg}"),
            Self::PipelineFinalizationFailed(msg) => {
                write!(f, "pipeline finalization failed: {msg}")
            }
            Self::InvalidState(msg) => write!(f, "invalid build state: {msg}"),
            Self::Generation(msg) => write!(f, "program generation failed: {msg}"),
            Self::Graphics(err) => write!(f, "{err}"),
        }
    }
}

impl std::error::Error for ProgramError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Graphics(err) => Some(err),
            _ => None,
        }
    }
}

impl From<GraphicsError> for ProgramError {
    fn from(err: GraphicsError) -> Self {
        Self::Graphics(err)
    }
}
