//! Synthesis of requested variables into vertex stage statements.
//!
//! Requests are kept in order, deduplicated by variable. Resolving walks
//! the list once, declaring every attribute, block and stage output a
//! statement depends on. Matrices shared by several statements (model-view,
//! normal and model-view-projection) are prepared once at the top of `main`,
//! after the per-instance matrices are rebuilt from their attribute columns.

use crate::error::ProgramError;
use crate::program::{SetIndexes, SetType};

use super::ShaderStage;
use super::attribute::VertexAttributeType;
use super::declaration::{InputAttribute, StageOutput, column_name, matrix_from_columns};
use super::keys::{block, variable};
use super::registry::DeclarationRegistry;
use super::standard::{self, MatrixLayout};
use super::variable::{SyntheticVariable, VariableScope};

/// Where model matrices come from in a vertex stage.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ModelMatrixStrategy {
    /// No model matrix is available; matrix-dependent synthesis fails.
    Invalid,
    /// Per-draw model uniform block.
    UniformBlock,
    /// Per-instance matrix attributes, view matrices from the view block.
    VertexBuffer,
    /// Matrices push constant block.
    ///
    /// The simple layout only carries the model-view-projection matrix;
    /// the advanced layout carries view and model matrices and unlocks
    /// every intermediate space.
    PushConstant { advanced: bool },
    /// Per-instance matrix attributes, view matrices from the matrices push
    /// constant block.
    ///
    /// The simple layout only carries the view-projection matrix; the
    /// advanced layout adds the view matrix.
    InstancedPushConstant { advanced: bool },
}

impl ModelMatrixStrategy {
    /// Returns true if per-instance matrix attributes may be declared.
    pub fn uses_per_instance_matrices(self) -> bool {
        matches!(
            self,
            Self::VertexBuffer | Self::InstancedPushConstant { .. }
        )
    }

    /// Layout of the matrices push constant block, if the strategy has one.
    pub fn push_constant_layout(self) -> Option<MatrixLayout> {
        match self {
            Self::PushConstant { advanced: true } => Some(MatrixLayout::ViewModel),
            Self::PushConstant { advanced: false } => Some(MatrixLayout::ModelViewProjection),
            Self::InstancedPushConstant { advanced: true } => {
                Some(MatrixLayout::ViewAndViewProjection)
            }
            Self::InstancedPushConstant { advanced: false } => Some(MatrixLayout::ViewProjection),
            _ => None,
        }
    }

    fn has_separate_matrices(self) -> bool {
        matches!(
            self,
            Self::VertexBuffer
                | Self::PushConstant { advanced: true }
                | Self::InstancedPushConstant { advanced: true }
        )
    }
}

/// Matrix computed once at the top of `main`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Preparation {
    /// Per-instance model matrix, rebuilt from its columns.
    ModelMatrix,
    /// Per-instance normal model matrix, rebuilt from its columns.
    NormalModelMatrix,
    ModelViewMatrix,
    NormalMatrix,
    ModelViewProjectionMatrix,
}

impl Preparation {
    pub fn name(self) -> &'static str {
        match self {
            Self::ModelMatrix => VertexAttributeType::ModelMatrix.name(),
            Self::NormalModelMatrix => VertexAttributeType::NormalModelMatrix.name(),
            Self::ModelViewMatrix => variable::MODEL_VIEW_MATRIX,
            Self::NormalMatrix => variable::NORMAL_MATRIX,
            Self::ModelViewProjectionMatrix => variable::MODEL_VIEW_PROJECTION_MATRIX,
        }
    }
}

/// One requested variable.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SynthesisRequest {
    pub variable: SyntheticVariable,
    pub scope: VariableScope,
}

/// Expands variable requests into GLSL statements.
#[derive(Debug, Clone)]
pub struct SynthesisResolver {
    stage: ShaderStage,
    strategy: ModelMatrixStrategy,
    set_indexes: SetIndexes,
    cubemap_view: bool,
    requests: Vec<SynthesisRequest>,
    preparations: Vec<(Preparation, String)>,
}

impl SynthesisResolver {
    pub fn new(stage: ShaderStage, strategy: ModelMatrixStrategy, set_indexes: SetIndexes) -> Self {
        Self {
            stage,
            strategy,
            set_indexes,
            cubemap_view: false,
            requests: Vec::new(),
            preparations: Vec::new(),
        }
    }

    /// Read view matrices from the six faces of a cubemap view block.
    pub fn with_cubemap_view(mut self, cubemap_view: bool) -> Self {
        self.cubemap_view = cubemap_view;
        self
    }

    pub fn strategy(&self) -> ModelMatrixStrategy {
        self.strategy
    }

    pub fn set_indexes(&self) -> SetIndexes {
        self.set_indexes
    }

    pub fn is_cubemap_view(&self) -> bool {
        self.cubemap_view
    }

    /// Request a variable by its engine name.
    pub fn request_by_name(&mut self, name: &str, scope: VariableScope) -> Result<(), ProgramError> {
        let variable = name.parse::<SyntheticVariable>().inspect_err(|err| {
            log::error!("{} : {err}", self.stage);
        })?;
        self.request(variable, scope)
    }

    /// Request a variable.
    ///
    /// Prerequisites are requested first as local values. Requesting a
    /// variable again widens its scope.
    pub fn request(
        &mut self,
        variable: SyntheticVariable,
        scope: VariableScope,
    ) -> Result<(), ProgramError> {
        if self.stage != ShaderStage::Vertex {
            let err = ProgramError::WrongStage {
                variable: variable.name().to_string(),
                stage: self.stage,
            };
            log::error!("{err}");
            return Err(err);
        }

        if let Some(existing) = self
            .requests
            .iter_mut()
            .find(|request| request.variable == variable)
        {
            existing.scope = existing.scope.widen(scope);
            return Ok(());
        }

        for prerequisite in variable.prerequisites() {
            self.request(*prerequisite, VariableScope::Local)?;
        }

        self.requests.push(SynthesisRequest { variable, scope });

        Ok(())
    }

    /// Requests in resolution order.
    pub fn requests(&self) -> &[SynthesisRequest] {
        &self.requests
    }

    /// Scope of a requested variable.
    pub fn scope_of(&self, variable: SyntheticVariable) -> Option<VariableScope> {
        self.requests
            .iter()
            .find(|request| request.variable == variable)
            .map(|request| request.scope)
    }

    /// Emit statements for every request.
    ///
    /// Local statements go to `top`, exported ones to `output`. Shared
    /// matrices are collected separately, see [`Self::preparation_code`].
    pub fn resolve(
        &mut self,
        registry: &mut DeclarationRegistry,
        top: &mut String,
        output: &mut String,
    ) -> Result<(), ProgramError> {
        self.preparations.clear();

        let requests = self.requests.clone();
        for request in requests {
            self.synthesize(registry, request, top, output)
                .inspect_err(|err| {
                    log::error!(
                        "{} '{}': unable to synthesize '{}': {err}",
                        registry.stage(),
                        registry.name(),
                        request.variable
                    );
                })?;
        }

        Ok(())
    }

    /// Statements preparing shared matrices, in dependency order.
    pub fn preparation_code(&self) -> String {
        self.preparations
            .iter()
            .map(|(_, statement)| format!("\t{statement}\n"))
            .collect()
    }

    pub fn preparations(&self) -> impl Iterator<Item = Preparation> + '_ {
        self.preparations.iter().map(|(preparation, _)| *preparation)
    }

    /// Declare the view block matching the render target.
    ///
    /// Cubemap views declare the face structure and the six-face block
    /// under the same instance name.
    pub fn declare_view_block(&self, registry: &mut DeclarationRegistry) -> Result<(), ProgramError> {
        let set = self.set_indexes.set(SetType::PerView);
        if self.cubemap_view {
            registry.declare(standard::cubemap_face_structure())?;
            registry.declare(standard::cubemap_view_uniform_block(set, 0))?;
        } else {
            registry.declare(standard::view_uniform_block(set, 0))?;
        }
        Ok(())
    }

    fn synthesize(
        &mut self,
        registry: &mut DeclarationRegistry,
        request: SynthesisRequest,
        top: &mut String,
        output: &mut String,
    ) -> Result<(), ProgramError> {
        let SynthesisRequest { variable, scope } = request;

        match variable {
            SyntheticVariable::ClipSpacePosition => {
                let matrix = self.model_view_projection_matrix(registry, variable)?;
                let position = declare_attribute(registry, VertexAttributeType::Position)?;
                output.push_str(&format!(
                    "\t{} = {matrix} * vec4({position}, 1.0);\n",
                    variable::GL_POSITION
                ));
            }
            SyntheticVariable::WorldSpaceClipPosition => {
                let matrix = self.model_matrix(registry, variable)?;
                let position = declare_attribute(registry, VertexAttributeType::Position)?;
                let statement = format!(
                    "\t{} = {matrix} * vec4({position}, 1.0);\n",
                    variable::GL_POSITION
                );
                if scope == VariableScope::ToNextStage {
                    output.push_str(&statement);
                } else {
                    top.push_str(&statement);
                }
            }
            SyntheticVariable::PositionWorldSpace => {
                let matrix = self.model_matrix(registry, variable)?;
                let position = declare_attribute(registry, VertexAttributeType::Position)?;
                let expression = format!("{matrix} * vec4({position}, 1.0)");
                emit(registry, variable, scope, &expression, top, output)?;
            }
            SyntheticVariable::PositionViewSpace => {
                let matrix = self.model_view_matrix(registry, variable)?;
                let position = declare_attribute(registry, VertexAttributeType::Position)?;
                let expression = format!("{matrix} * vec4({position}, 1.0)");
                emit(registry, variable, scope, &expression, top, output)?;
            }
            SyntheticVariable::PositionTextureSpace => {
                let axes = [
                    ("X", variable::TANGENT_VIEW_SPACE),
                    ("Y", variable::BINORMAL_VIEW_SPACE),
                    ("Z", variable::NORMAL_VIEW_SPACE),
                ];
                for (axis, vector) in axes {
                    top.push_str(&format!(
                        "\tfloat positionTexture{axis} = dot(-{}.xyz, {vector});\n",
                        variable::POSITION_VIEW_SPACE
                    ));
                }
                top.push('\n');
                emit(
                    registry,
                    variable,
                    scope,
                    "vec4(positionTextureX, positionTextureY, positionTextureZ, 1.0)",
                    top,
                    output,
                )?;
            }
            SyntheticVariable::Color
            | SyntheticVariable::Primary2DTextureCoordinates
            | SyntheticVariable::Primary3DTextureCoordinates
            | SyntheticVariable::Secondary2DTextureCoordinates
            | SyntheticVariable::Secondary3DTextureCoordinates => {
                // Copied attributes always reach the next stage.
                let scope = scope.widen(VariableScope::ToNextStage);
                let attribute = source_attribute(registry, variable)?;
                emit(registry, variable, scope, attribute, top, output)?;
            }
            SyntheticVariable::TangentWorldSpace
            | SyntheticVariable::BinormalWorldSpace
            | SyntheticVariable::NormalWorldSpace => {
                let matrix = self.normal_model_matrix(registry, variable)?;
                let attribute = source_attribute(registry, variable)?;
                let expression = format!("normalize({matrix} * {attribute})");
                emit(registry, variable, scope, &expression, top, output)?;
            }
            SyntheticVariable::TangentViewSpace
            | SyntheticVariable::BinormalViewSpace
            | SyntheticVariable::NormalViewSpace => {
                let matrix = self.normal_matrix(registry, variable)?;
                let attribute = source_attribute(registry, variable)?;
                let expression = format!("normalize({matrix} * {attribute})");
                emit(registry, variable, scope, &expression, top, output)?;
            }
            SyntheticVariable::WorldTbnMatrix => {
                let matrix = self.model_matrix(registry, variable)?;
                for (axis, attribute) in tangent_space_attributes(registry)? {
                    top.push_str(&format!(
                        "\tconst vec4 world{axis} = normalize({matrix} * vec4({attribute}, 0.0));\n"
                    ));
                }
                emit(
                    registry,
                    variable,
                    scope,
                    "mat3(worldT.xyz, worldB.xyz, worldN.xyz)",
                    top,
                    output,
                )?;
            }
            SyntheticVariable::ViewTbnMatrix => {
                let matrix = self.normal_matrix(registry, variable)?;
                for (axis, attribute) in tangent_space_attributes(registry)? {
                    top.push_str(&format!(
                        "\tconst vec3 view{axis} = normalize({matrix} * {attribute});\n"
                    ));
                }
                emit(
                    registry,
                    variable,
                    scope,
                    "transpose(mat3(viewT, viewB, viewN))",
                    top,
                    output,
                )?;
            }
            SyntheticVariable::WorldToTangentMatrix => {
                let matrix = if self.strategy.uses_per_instance_matrices() {
                    self.normal_model_matrix(registry, variable)?
                } else {
                    self.normal_matrix(registry, variable)?
                };
                let [(_, tangent), (_, binormal), (_, normal)] =
                    tangent_space_attributes(registry)?;
                let expression = format!("{matrix} * mat3({tangent}, {binormal}, {normal})");
                emit(registry, variable, scope, &expression, top, output)?;
            }
        }

        Ok(())
    }

    fn unsupported(&self, variable: SyntheticVariable) -> ProgramError {
        ProgramError::Synthesis(format!(
            "'{variable}' is not available with {:?} model matrices",
            self.strategy
        ))
    }

    fn declare_model_block(&self, registry: &mut DeclarationRegistry) -> Result<(), ProgramError> {
        let set = self.set_indexes.set(SetType::PerModel);
        registry.declare(standard::model_uniform_block(set, 0))?;
        Ok(())
    }

    /// Matrix member of the view block.
    ///
    /// Every cubemap face shares one projection, the other view matrices
    /// differ per face and cannot be read outside a per-face loop.
    fn view_block_matrix(
        &self,
        registry: &mut DeclarationRegistry,
        matrix: &str,
        variable: SyntheticVariable,
    ) -> Result<String, ProgramError> {
        if self.cubemap_view && matrix != block::PROJECTION_MATRIX {
            return Err(ProgramError::Synthesis(format!(
                "'{variable}' needs the per-face '{matrix}' of a cubemap view"
            )));
        }

        self.declare_view_block(registry)?;
        if self.cubemap_view {
            Ok(format!(
                "{}.{}[0].{matrix}",
                block::VIEW_INSTANCE,
                block::INSTANCE
            ))
        } else {
            Ok(member(block::VIEW_INSTANCE, matrix))
        }
    }

    fn declare_matrices_block(
        &self,
        registry: &mut DeclarationRegistry,
        variable: SyntheticVariable,
    ) -> Result<(), ProgramError> {
        let layout = self
            .strategy
            .push_constant_layout()
            .ok_or_else(|| self.unsupported(variable))?;
        registry.declare(standard::matrices_push_constant_block(layout))?;
        Ok(())
    }

    fn model_matrix(
        &mut self,
        registry: &mut DeclarationRegistry,
        variable: SyntheticVariable,
    ) -> Result<String, ProgramError> {
        match self.strategy {
            ModelMatrixStrategy::UniformBlock => {
                self.declare_model_block(registry)?;
                Ok(member(block::MODEL_INSTANCE, block::MODEL_MATRIX))
            }
            ModelMatrixStrategy::VertexBuffer | ModelMatrixStrategy::InstancedPushConstant { .. } => {
                self.prepare(registry, Preparation::ModelMatrix, variable)
            }
            ModelMatrixStrategy::PushConstant { advanced: true } => {
                self.declare_matrices_block(registry, variable)?;
                Ok(member(block::MATRICES_INSTANCE, block::MODEL_MATRIX))
            }
            _ => Err(self.unsupported(variable)),
        }
    }

    fn view_matrix(
        &mut self,
        registry: &mut DeclarationRegistry,
        variable: SyntheticVariable,
    ) -> Result<String, ProgramError> {
        match self.strategy {
            ModelMatrixStrategy::VertexBuffer => {
                self.view_block_matrix(registry, block::VIEW_MATRIX, variable)
            }
            ModelMatrixStrategy::PushConstant { advanced: true }
            | ModelMatrixStrategy::InstancedPushConstant { advanced: true } => {
                self.declare_matrices_block(registry, variable)?;
                Ok(member(block::MATRICES_INSTANCE, block::VIEW_MATRIX))
            }
            _ => Err(self.unsupported(variable)),
        }
    }

    fn normal_model_matrix(
        &mut self,
        registry: &mut DeclarationRegistry,
        variable: SyntheticVariable,
    ) -> Result<String, ProgramError> {
        match self.strategy {
            ModelMatrixStrategy::UniformBlock => {
                self.declare_model_block(registry)?;
                Ok(member(block::MODEL_INSTANCE, block::NORMAL_MODEL_MATRIX))
            }
            ModelMatrixStrategy::VertexBuffer | ModelMatrixStrategy::InstancedPushConstant { .. } => {
                self.prepare(registry, Preparation::NormalModelMatrix, variable)
            }
            ModelMatrixStrategy::PushConstant { advanced: true } => {
                let model = self.model_matrix(registry, variable)?;
                Ok(format!("mat3({model})"))
            }
            _ => Err(self.unsupported(variable)),
        }
    }

    fn model_view_matrix(
        &mut self,
        registry: &mut DeclarationRegistry,
        variable: SyntheticVariable,
    ) -> Result<String, ProgramError> {
        match self.strategy {
            ModelMatrixStrategy::UniformBlock => {
                self.declare_model_block(registry)?;
                Ok(member(block::MODEL_INSTANCE, block::MODEL_VIEW_MATRIX))
            }
            strategy if strategy.has_separate_matrices() => {
                self.prepare(registry, Preparation::ModelViewMatrix, variable)
            }
            _ => Err(self.unsupported(variable)),
        }
    }

    fn normal_matrix(
        &mut self,
        registry: &mut DeclarationRegistry,
        variable: SyntheticVariable,
    ) -> Result<String, ProgramError> {
        match self.strategy {
            ModelMatrixStrategy::UniformBlock => {
                self.declare_model_block(registry)?;
                Ok(member(block::MODEL_INSTANCE, block::NORMAL_MATRIX))
            }
            strategy if strategy.has_separate_matrices() => {
                self.prepare(registry, Preparation::NormalMatrix, variable)
            }
            _ => Err(self.unsupported(variable)),
        }
    }

    fn model_view_projection_matrix(
        &mut self,
        registry: &mut DeclarationRegistry,
        variable: SyntheticVariable,
    ) -> Result<String, ProgramError> {
        match self.strategy {
            ModelMatrixStrategy::UniformBlock => {
                self.declare_model_block(registry)?;
                Ok(member(block::MODEL_INSTANCE, block::MODEL_VIEW_PROJECTION_MATRIX))
            }
            ModelMatrixStrategy::PushConstant { advanced: false } => {
                self.declare_matrices_block(registry, variable)?;
                Ok(member(
                    block::MATRICES_INSTANCE,
                    block::MODEL_VIEW_PROJECTION_MATRIX,
                ))
            }
            ModelMatrixStrategy::VertexBuffer
            | ModelMatrixStrategy::InstancedPushConstant { .. }
            | ModelMatrixStrategy::PushConstant { advanced: true } => {
                self.prepare(registry, Preparation::ModelViewProjectionMatrix, variable)
            }
            _ => Err(self.unsupported(variable)),
        }
    }

    /// Write a shared matrix once and return its name.
    fn prepare(
        &mut self,
        registry: &mut DeclarationRegistry,
        preparation: Preparation,
        variable: SyntheticVariable,
    ) -> Result<String, ProgramError> {
        let name = preparation.name();
        if self
            .preparations
            .iter()
            .any(|(existing, _)| *existing == preparation)
        {
            return Ok(name.to_string());
        }

        let statement = match preparation {
            Preparation::ModelMatrix | Preparation::NormalModelMatrix => {
                let attribute = if preparation == Preparation::ModelMatrix {
                    VertexAttributeType::ModelMatrix
                } else {
                    VertexAttributeType::NormalModelMatrix
                };
                declare_attribute(registry, attribute)?;
                matrix_from_columns(attribute.variable_type(), attribute.name()).ok_or_else(
                    || ProgramError::Synthesis(format!("'{attribute}' is not a matrix")),
                )?
            }
            Preparation::ModelViewMatrix => {
                let view = self.view_matrix(registry, variable)?;
                let model = self.model_matrix(registry, variable)?;
                format!("const mat4 {name} = {view} * {model};")
            }
            Preparation::NormalMatrix => {
                let model_view = self.prepare(registry, Preparation::ModelViewMatrix, variable)?;
                format!("const mat3 {name} = transpose(mat3(inverse({model_view})));")
            }
            Preparation::ModelViewProjectionMatrix => match self.strategy {
                ModelMatrixStrategy::VertexBuffer => {
                    let view_projection =
                        self.view_block_matrix(registry, block::VIEW_PROJECTION_MATRIX, variable)?;
                    let model = self.model_matrix(registry, variable)?;
                    format!("const mat4 {name} = {view_projection} * {model};")
                }
                ModelMatrixStrategy::InstancedPushConstant { .. } => {
                    self.declare_matrices_block(registry, variable)?;
                    let model = self.model_matrix(registry, variable)?;
                    format!(
                        "const mat4 {name} = {} * {model};",
                        member(block::MATRICES_INSTANCE, block::VIEW_PROJECTION_MATRIX)
                    )
                }
                _ => {
                    let model_view =
                        self.prepare(registry, Preparation::ModelViewMatrix, variable)?;
                    let projection =
                        self.view_block_matrix(registry, block::PROJECTION_MATRIX, variable)?;
                    format!("const mat4 {name} = {projection} * {model_view};")
                }
            },
        };

        self.preparations.push((preparation, statement));

        Ok(name.to_string())
    }
}

fn member(instance: &str, member: &str) -> String {
    format!("{instance}.{member}")
}

fn declare_attribute(
    registry: &mut DeclarationRegistry,
    attribute: VertexAttributeType,
) -> Result<&'static str, ProgramError> {
    registry.declare(InputAttribute::new(attribute))?;
    Ok(attribute.name())
}

fn source_attribute(
    registry: &mut DeclarationRegistry,
    variable: SyntheticVariable,
) -> Result<&'static str, ProgramError> {
    let attribute = variable.source_attribute().ok_or_else(|| {
        ProgramError::Synthesis(format!("'{variable}' has no source attribute"))
    })?;
    declare_attribute(registry, attribute)
}

fn tangent_space_attributes(
    registry: &mut DeclarationRegistry,
) -> Result<[(&'static str, &'static str); 3], ProgramError> {
    Ok([
        ("T", declare_attribute(registry, VertexAttributeType::Tangent)?),
        ("B", declare_attribute(registry, VertexAttributeType::Binormal)?),
        ("N", declare_attribute(registry, VertexAttributeType::Normal)?),
    ])
}

/// Write the statement producing `variable` for its scope.
///
/// Exported matrices are computed into a local and written column by
/// column.
fn emit(
    registry: &mut DeclarationRegistry,
    variable: SyntheticVariable,
    scope: VariableScope,
    expression: &str,
    top: &mut String,
    output: &mut String,
) -> Result<(), ProgramError> {
    let name = variable.name();
    let variable_type = variable.variable_type();

    if !scope.is_exported() {
        top.push_str(&format!("\tconst {variable_type} {name} = {expression};\n"));
        return Ok(());
    }

    let location = variable.location().ok_or_else(|| {
        ProgramError::Synthesis(format!("'{variable}' has no interface location"))
    })?;
    registry.declare(StageOutput::new(location, variable_type, name))?;

    let code = if scope.is_local() { top } else { output };
    match variable_type.matrix_columns() {
        Some((_, columns)) => {
            code.push_str(&format!("\tconst {variable_type} {name} = {expression};\n"));
            for column in 0..columns {
                code.push_str(&format!(
                    "\t{} = {name}[{column}];\n",
                    column_name(name, column)
                ));
            }
        }
        None => code.push_str(&format!("\t{name} = {expression};\n")),
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::shader::DeclarationKind;

    fn set_indexes() -> SetIndexes {
        let mut set_indexes = SetIndexes::default();
        set_indexes.enable_set(SetType::PerView);
        set_indexes.enable_set(SetType::PerModel);
        set_indexes
    }

    fn resolver(strategy: ModelMatrixStrategy) -> (SynthesisResolver, DeclarationRegistry) {
        (
            SynthesisResolver::new(ShaderStage::Vertex, strategy, set_indexes()),
            DeclarationRegistry::new(
                ShaderStage::Vertex,
                "TestVertexShader",
                strategy.uses_per_instance_matrices(),
            ),
        )
    }

    fn resolve(
        resolver: &mut SynthesisResolver,
        registry: &mut DeclarationRegistry,
    ) -> (String, String) {
        let mut top = String::new();
        let mut output = String::new();
        resolver.resolve(registry, &mut top, &mut output).unwrap();
        (top, output)
    }

    #[test]
    fn test_request_outside_vertex_stage() {
        let mut resolver = SynthesisResolver::new(
            ShaderStage::Fragment,
            ModelMatrixStrategy::UniformBlock,
            set_indexes(),
        );
        let result = resolver.request(SyntheticVariable::Color, VariableScope::ToNextStage);

        assert!(matches!(result, Err(ProgramError::WrongStage { .. })));
        assert!(resolver.requests().is_empty());
    }

    #[test]
    fn test_unknown_name() {
        let (mut resolver, _) = resolver(ModelMatrixStrategy::UniformBlock);
        assert_eq!(
            resolver.request_by_name("ssv_Unknown", VariableScope::Local),
            Err(ProgramError::UnknownVariable("ssv_Unknown".to_string()))
        );
        assert!(
            resolver
                .request_by_name("ssv_NormalViewSpace", VariableScope::Local)
                .is_ok()
        );
    }

    #[test]
    fn test_prerequisites_come_first() {
        let (mut resolver, _) = resolver(ModelMatrixStrategy::UniformBlock);
        resolver
            .request(
                SyntheticVariable::PositionTextureSpace,
                VariableScope::ToNextStage,
            )
            .unwrap();

        let order: Vec<_> = resolver.requests().iter().map(|r| r.variable).collect();
        assert_eq!(
            order,
            vec![
                SyntheticVariable::PositionViewSpace,
                SyntheticVariable::TangentViewSpace,
                SyntheticVariable::BinormalViewSpace,
                SyntheticVariable::NormalViewSpace,
                SyntheticVariable::PositionTextureSpace,
            ]
        );
        assert_eq!(
            resolver.scope_of(SyntheticVariable::NormalViewSpace),
            Some(VariableScope::Local)
        );
    }

    #[test]
    fn test_prerequisite_widens_existing_request() {
        let (mut resolver, _) = resolver(ModelMatrixStrategy::UniformBlock);
        resolver
            .request(SyntheticVariable::NormalViewSpace, VariableScope::ToNextStage)
            .unwrap();
        resolver
            .request(SyntheticVariable::PositionTextureSpace, VariableScope::Local)
            .unwrap();

        assert_eq!(
            resolver.scope_of(SyntheticVariable::NormalViewSpace),
            Some(VariableScope::Both)
        );
        assert_eq!(resolver.requests()[0].variable, SyntheticVariable::NormalViewSpace);
    }

    #[test]
    fn test_uniform_block_world_position() {
        let (mut resolver, mut registry) = resolver(ModelMatrixStrategy::UniformBlock);
        resolver
            .request(SyntheticVariable::PositionWorldSpace, VariableScope::Local)
            .unwrap();
        let (top, output) = resolve(&mut resolver, &mut registry);

        assert_eq!(
            top,
            "\tconst vec4 ssv_PositionWorldSpace = sbb_ModelUniformBlock.modelMatrix * vec4(sva_Vertex, 1.0);\n"
        );
        assert!(output.is_empty());
        assert!(registry.contains(DeclarationKind::UniformBlock, "sbb_ModelUniformBlock"));
        assert!(registry.contains(DeclarationKind::InputAttribute, "sva_Vertex"));
        assert_eq!(registry.count(DeclarationKind::StageOutput), 0);
    }

    #[test]
    fn test_exported_variable_declares_output() {
        let (mut resolver, mut registry) = resolver(ModelMatrixStrategy::UniformBlock);
        resolver
            .request(SyntheticVariable::Color, VariableScope::ToNextStage)
            .unwrap();
        let (top, output) = resolve(&mut resolver, &mut registry);

        assert!(top.is_empty());
        assert_eq!(output, "\tssv_Color = sva_Color;\n");
        let outputs: Vec<_> = registry.stage_outputs().collect();
        assert_eq!(outputs.len(), 1);
        assert_eq!(outputs[0].location(), 3);
    }

    #[test]
    fn test_both_scope_assigns_in_top() {
        let (mut resolver, mut registry) = resolver(ModelMatrixStrategy::UniformBlock);
        resolver
            .request(SyntheticVariable::NormalWorldSpace, VariableScope::Local)
            .unwrap();
        resolver
            .request(SyntheticVariable::NormalWorldSpace, VariableScope::ToNextStage)
            .unwrap();
        let (top, output) = resolve(&mut resolver, &mut registry);

        assert_eq!(
            top,
            "\tssv_NormalWorldSpace = normalize(sbb_ModelUniformBlock.normalModelMatrix * sva_Normal);\n"
        );
        assert!(output.is_empty());
        assert_eq!(registry.count(DeclarationKind::StageOutput), 1);
    }

    #[test]
    fn test_clip_position_always_goes_to_output() {
        let (mut resolver, mut registry) = resolver(ModelMatrixStrategy::UniformBlock);
        resolver
            .request(SyntheticVariable::ClipSpacePosition, VariableScope::Local)
            .unwrap();
        let (top, output) = resolve(&mut resolver, &mut registry);

        assert!(top.is_empty());
        assert_eq!(
            output,
            "\tgl_Position = sbb_ModelUniformBlock.modelViewProjectionMatrix * vec4(sva_Vertex, 1.0);\n"
        );
    }

    #[test]
    fn test_shared_matrices_prepared_once() {
        let (mut resolver, mut registry) = resolver(ModelMatrixStrategy::VertexBuffer);
        resolver
            .request(SyntheticVariable::PositionViewSpace, VariableScope::ToNextStage)
            .unwrap();
        resolver
            .request(SyntheticVariable::NormalViewSpace, VariableScope::ToNextStage)
            .unwrap();
        resolver
            .request(SyntheticVariable::ClipSpacePosition, VariableScope::ToNextStage)
            .unwrap();
        let (_, output) = resolve(&mut resolver, &mut registry);

        assert_eq!(
            resolver.preparation_code(),
            "\tconst mat4 sva_ModelMatrix = mat4(sva_ModelMatrixColumn0, sva_ModelMatrixColumn1, sva_ModelMatrixColumn2, sva_ModelMatrixColumn3);\n\
             \tconst mat4 ssv_ModelViewMatrix = sbb_ViewUniformBlock.viewMatrix * sva_ModelMatrix;\n\
             \tconst mat3 ssv_NormalMatrix = transpose(mat3(inverse(ssv_ModelViewMatrix)));\n\
             \tconst mat4 ssv_ModelViewProjectionMatrix = sbb_ViewUniformBlock.viewProjectionMatrix * sva_ModelMatrix;\n"
        );
        assert!(output.contains("\tssv_PositionViewSpace = ssv_ModelViewMatrix * vec4(sva_Vertex, 1.0);\n"));
        assert!(output.contains("\tssv_NormalViewSpace = normalize(ssv_NormalMatrix * sva_Normal);\n"));
        assert!(output.contains("\tgl_Position = ssv_ModelViewProjectionMatrix * vec4(sva_Vertex, 1.0);\n"));
    }

    #[test]
    fn test_preparations_reset_per_pass() {
        let (mut resolver, mut registry) = resolver(ModelMatrixStrategy::VertexBuffer);
        resolver
            .request(SyntheticVariable::PositionViewSpace, VariableScope::Local)
            .unwrap();

        resolve(&mut resolver, &mut registry);
        resolve(&mut resolver, &mut registry);

        assert_eq!(
            resolver.preparations().collect::<Vec<_>>(),
            vec![Preparation::ModelMatrix, Preparation::ModelViewMatrix]
        );
    }

    #[test]
    fn test_simple_push_constants() {
        let (mut resolver, mut registry) =
            resolver(ModelMatrixStrategy::PushConstant { advanced: false });
        resolver
            .request(SyntheticVariable::ClipSpacePosition, VariableScope::ToNextStage)
            .unwrap();
        let (_, output) = resolve(&mut resolver, &mut registry);

        assert_eq!(
            output,
            "\tgl_Position = spc_Matrices.modelViewProjectionMatrix * vec4(sva_Vertex, 1.0);\n"
        );
        assert_eq!(resolver.preparations().count(), 0);
        assert_eq!(registry.count(DeclarationKind::PushConstantBlock), 1);
        assert_eq!(registry.count(DeclarationKind::UniformBlock), 0);
    }

    #[test]
    fn test_simple_push_constants_reject_intermediate_spaces() {
        let (mut resolver, mut registry) =
            resolver(ModelMatrixStrategy::PushConstant { advanced: false });
        resolver
            .request(SyntheticVariable::NormalViewSpace, VariableScope::ToNextStage)
            .unwrap();

        let mut top = String::new();
        let mut output = String::new();
        let result = resolver.resolve(&mut registry, &mut top, &mut output);
        assert!(matches!(result, Err(ProgramError::Synthesis(_))));
    }

    #[test]
    fn test_advanced_push_constants() {
        let (mut resolver, mut registry) =
            resolver(ModelMatrixStrategy::PushConstant { advanced: true });
        resolver
            .request(SyntheticVariable::ClipSpacePosition, VariableScope::ToNextStage)
            .unwrap();
        resolver
            .request(SyntheticVariable::NormalWorldSpace, VariableScope::ToNextStage)
            .unwrap();
        let (_, output) = resolve(&mut resolver, &mut registry);

        assert_eq!(
            resolver.preparation_code(),
            "\tconst mat4 ssv_ModelViewMatrix = spc_Matrices.viewMatrix * spc_Matrices.modelMatrix;\n\
             \tconst mat4 ssv_ModelViewProjectionMatrix = sbb_ViewUniformBlock.projectionMatrix * ssv_ModelViewMatrix;\n"
        );
        assert!(output.contains("normalize(mat3(spc_Matrices.modelMatrix) * sva_Normal)"));
        assert!(registry.contains(DeclarationKind::UniformBlock, "sbb_ViewUniformBlock"));
    }

    #[test]
    fn test_invalid_strategy_fails() {
        let (mut resolver, mut registry) = resolver(ModelMatrixStrategy::Invalid);
        resolver
            .request(SyntheticVariable::ClipSpacePosition, VariableScope::ToNextStage)
            .unwrap();

        let mut top = String::new();
        let mut output = String::new();
        assert!(resolver.resolve(&mut registry, &mut top, &mut output).is_err());

        // Attributes and texture coordinates need no matrix.
        let (mut resolver, mut registry) = self::resolver(ModelMatrixStrategy::Invalid);
        resolver
            .request(SyntheticVariable::Primary2DTextureCoordinates, VariableScope::ToNextStage)
            .unwrap();
        let (_, output) = resolve(&mut resolver, &mut registry);
        assert_eq!(output, "\tssv_2DTexCoord0 = sva_2DTexCoord0;\n");
    }

    #[test]
    fn test_texture_space_position() {
        let (mut resolver, mut registry) = resolver(ModelMatrixStrategy::UniformBlock);
        resolver
            .request(SyntheticVariable::PositionTextureSpace, VariableScope::Local)
            .unwrap();
        let (top, _) = resolve(&mut resolver, &mut registry);

        assert!(top.contains(
            "\tfloat positionTextureX = dot(-ssv_PositionViewSpace.xyz, ssv_TangentViewSpace);\n"
        ));
        assert!(top.ends_with(
            "\tfloat positionTextureZ = dot(-ssv_PositionViewSpace.xyz, ssv_NormalViewSpace);\n\n\
             \tconst vec4 ssv_PositionTextureSpace = vec4(positionTextureX, positionTextureY, positionTextureZ, 1.0);\n"
        ));
        let view_position = top.find("const vec4 ssv_PositionViewSpace").unwrap();
        let texture_position = top.find("float positionTextureX").unwrap();
        assert!(view_position < texture_position);
    }

    #[test]
    fn test_tbn_matrices() {
        let (mut resolver, mut registry) = resolver(ModelMatrixStrategy::VertexBuffer);
        resolver
            .request(SyntheticVariable::WorldTbnMatrix, VariableScope::ToNextStage)
            .unwrap();
        resolver
            .request(SyntheticVariable::ViewTbnMatrix, VariableScope::ToNextStage)
            .unwrap();
        resolver
            .request(SyntheticVariable::WorldToTangentMatrix, VariableScope::ToNextStage)
            .unwrap();
        let (top, output) = resolve(&mut resolver, &mut registry);

        assert!(top.contains(
            "\tconst vec4 worldT = normalize(sva_ModelMatrix * vec4(sva_Tangent, 0.0));\n"
        ));
        assert!(top.contains("\tconst vec3 viewN = normalize(ssv_NormalMatrix * sva_Normal);\n"));
        assert!(output.contains(
            "\tconst mat3 ssv_WorldTBNMatrix = mat3(worldT.xyz, worldB.xyz, worldN.xyz);\n\
             \tssv_WorldTBNMatrixColumn0 = ssv_WorldTBNMatrix[0];\n\
             \tssv_WorldTBNMatrixColumn1 = ssv_WorldTBNMatrix[1];\n\
             \tssv_WorldTBNMatrixColumn2 = ssv_WorldTBNMatrix[2];\n"
        ));
        assert!(output.contains(
            "\tconst mat3 ssv_ViewTBNMatrix = transpose(mat3(viewT, viewB, viewN));\n"
        ));
        assert!(output.contains(
            "\tconst mat3 ssv_WorldToTangent = sva_NormalModelMatrix * mat3(sva_Tangent, sva_Binormal, sva_Normal);\n"
        ));
        assert!(resolver.preparation_code().contains(
            "\tconst mat3 sva_NormalModelMatrix = mat3(sva_NormalModelMatrixColumn0, sva_NormalModelMatrixColumn1, sva_NormalModelMatrixColumn2);\n"
        ));
        assert_eq!(registry.count(DeclarationKind::StageOutput), 3);

        let mut declarations = String::new();
        registry.generate_declarations(&mut declarations);
        assert!(declarations.contains("layout(location = 27) smooth out vec3 ssv_WorldTBNMatrixColumn2;\n"));
        assert!(declarations.contains("layout(location = 13) in vec4 sva_ModelMatrixColumn3;\n"));
        assert!(!declarations.contains("in mat"));
        assert!(!declarations.contains("out mat"));
    }

    #[test]
    fn test_local_attribute_copies_are_exported() {
        let (mut resolver, mut registry) = resolver(ModelMatrixStrategy::Invalid);
        resolver
            .request(SyntheticVariable::Color, VariableScope::Local)
            .unwrap();
        resolver
            .request(SyntheticVariable::Primary3DTextureCoordinates, VariableScope::Local)
            .unwrap();
        let (top, output) = resolve(&mut resolver, &mut registry);

        assert_eq!(
            top,
            "\tssv_Color = sva_Color;\n\tssv_3DTexCoord0 = sva_3DTexCoord0;\n"
        );
        assert!(output.is_empty());
        let locations: Vec<_> = registry.stage_outputs().map(|output| output.location()).collect();
        assert_eq!(locations, vec![3, 5]);
    }

    #[test]
    fn test_instanced_push_constants() {
        let (mut resolver, mut registry) =
            resolver(ModelMatrixStrategy::InstancedPushConstant { advanced: false });
        resolver
            .request(SyntheticVariable::ClipSpacePosition, VariableScope::ToNextStage)
            .unwrap();
        let (_, output) = resolve(&mut resolver, &mut registry);

        assert!(resolver.preparation_code().ends_with(
            "\tconst mat4 ssv_ModelViewProjectionMatrix = spc_Matrices.viewProjectionMatrix * sva_ModelMatrix;\n"
        ));
        assert_eq!(
            output,
            "\tgl_Position = ssv_ModelViewProjectionMatrix * vec4(sva_Vertex, 1.0);\n"
        );
        let block = registry.push_constant_blocks().next().unwrap();
        assert!(block.has_member("viewProjectionMatrix"));
        assert!(!block.has_member("viewMatrix"));
        assert_eq!(registry.count(DeclarationKind::UniformBlock), 0);
        assert!(registry.contains(DeclarationKind::InputAttribute, "sva_ModelMatrix"));

        // The simple layout has no view matrix.
        let (mut resolver, mut registry) =
            self::resolver(ModelMatrixStrategy::InstancedPushConstant { advanced: false });
        resolver
            .request(SyntheticVariable::NormalViewSpace, VariableScope::ToNextStage)
            .unwrap();
        let mut top = String::new();
        let mut output = String::new();
        assert!(matches!(
            resolver.resolve(&mut registry, &mut top, &mut output),
            Err(ProgramError::Synthesis(_))
        ));

        let (mut resolver, mut registry) =
            self::resolver(ModelMatrixStrategy::InstancedPushConstant { advanced: true });
        resolver
            .request(SyntheticVariable::NormalViewSpace, VariableScope::ToNextStage)
            .unwrap();
        resolve(&mut resolver, &mut registry);
        assert!(resolver.preparation_code().contains(
            "\tconst mat4 ssv_ModelViewMatrix = spc_Matrices.viewMatrix * sva_ModelMatrix;\n"
        ));
        let block = registry.push_constant_blocks().next().unwrap();
        assert_eq!(block.bytes(), 128);
    }

    #[test]
    fn test_cubemap_view_projection() {
        let (resolver, mut registry) =
            resolver(ModelMatrixStrategy::PushConstant { advanced: true });
        let mut resolver = resolver.with_cubemap_view(true);
        resolver
            .request(SyntheticVariable::ClipSpacePosition, VariableScope::ToNextStage)
            .unwrap();
        resolve(&mut resolver, &mut registry);

        assert!(resolver.preparation_code().ends_with(
            "\tconst mat4 ssv_ModelViewProjectionMatrix = sbb_ViewUniformBlock.instance[0].projectionMatrix * ssv_ModelViewMatrix;\n"
        ));
        assert!(registry.contains(DeclarationKind::Structure, "CubemapFace"));
        let block = registry.uniform_blocks().next().unwrap();
        assert_eq!(block.name(), "CubemapViewUniformBlock");
        assert_eq!(registry.count(DeclarationKind::UniformBlock), 1);
    }

    #[test]
    fn test_cubemap_view_rejects_per_face_matrices() {
        let (resolver, mut registry) = resolver(ModelMatrixStrategy::VertexBuffer);
        let mut resolver = resolver.with_cubemap_view(true);
        resolver
            .request(SyntheticVariable::ClipSpacePosition, VariableScope::ToNextStage)
            .unwrap();

        let mut top = String::new();
        let mut output = String::new();
        assert!(matches!(
            resolver.resolve(&mut registry, &mut top, &mut output),
            Err(ProgramError::Synthesis(_))
        ));
        assert_eq!(registry.count(DeclarationKind::UniformBlock), 0);
    }
}
