//! Program generation integration tests.
//!
//! These tests drive whole programs through the public API and check the
//! generated stages: declarations, synthesized statements and source
//! layout.
//!
//! # Test Categories
//!
//! - **Registry Tests**: Idempotent declarations and stage legality
//! - **Synthesis Tests**: Prerequisites, scope widening and shared matrices
//! - **Scenario Tests**: Complete programs built by the scene generator
//!
//! # Running Tests
//!
//! ```bash
//! cargo test --test generation_tests
//! ```

mod common;

use rstest::rstest;

use common::{TestContext, lit_mesh, positions_only, tangent_mesh};
use opaline_graphics::material::BasicTexture;
use opaline_graphics::program::MatrixOptions;
use opaline_graphics::shader::declaration::{InputAttribute, OutputFragment, UniformBlock};
use opaline_graphics::shader::standard;
use opaline_graphics::shader::{
    DeclarationKind, Declared, VariableType, VertexAttributeType,
};
use opaline_graphics::{
    BasicMaterial, GeneratorConfig, GeneratorFlags, LightKind, ModelMatrixStrategy, Program,
    ProgramBuilder, ProgramError, RenderPassType, SceneRendering, SetIndexes, SetType,
    ShaderStage, StageGenerator, SyntheticVariable, VariableScope,
};

fn stage_generator(stage: ShaderStage, strategy: ModelMatrixStrategy) -> StageGenerator {
    let mut set_indexes = SetIndexes::default();
    set_indexes.enable_set(SetType::PerView);
    StageGenerator::new(
        stage,
        "IntegrationShader",
        &GeneratorConfig::default(),
        strategy,
        set_indexes,
    )
}

// ============================================================================
// Registry Tests
// ============================================================================

/// Declaring the same block twice keeps one declaration.
#[rstest]
#[case::vertex(ShaderStage::Vertex)]
#[case::fragment(ShaderStage::Fragment)]
fn test_idempotent_declaration(#[case] stage: ShaderStage) {
    let mut generator = stage_generator(stage, ModelMatrixStrategy::PushConstant { advanced: false });
    let block = standard::view_uniform_block(0, 0);

    assert_eq!(generator.declare(block.clone()), Ok(Declared::Added));
    let count = generator.registry().count(DeclarationKind::UniformBlock);
    assert_eq!(generator.declare(block), Ok(Declared::Duplicate));
    assert_eq!(generator.registry().count(DeclarationKind::UniformBlock), count);
    assert_eq!(count, 1);
}

#[test]
fn test_output_fragment_rejected_by_vertex_stage() {
    let mut generator =
        stage_generator(ShaderStage::Vertex, ModelMatrixStrategy::PushConstant { advanced: false });

    let result = generator.declare(OutputFragment::new(0, VariableType::Vec4, "ssv_Color0"));
    assert!(matches!(result, Err(ProgramError::StageMismatch { .. })));
    assert_eq!(generator.registry().count(DeclarationKind::OutputFragment), 0);
}

#[test]
fn test_input_attribute_rejected_by_fragment_stage() {
    let mut generator =
        stage_generator(ShaderStage::Fragment, ModelMatrixStrategy::PushConstant { advanced: false });

    let result = generator.declare(InputAttribute::new(VertexAttributeType::Position));
    assert!(matches!(result, Err(ProgramError::StageMismatch { .. })));
}

#[test]
fn test_invalid_block_rejected() {
    let mut generator =
        stage_generator(ShaderStage::Vertex, ModelMatrixStrategy::PushConstant { advanced: false });

    let empty = UniformBlock::new("EmptyBlock", "sbb_Empty", 0, 3);
    assert!(matches!(
        generator.declare(empty),
        Err(ProgramError::InvalidDeclaration { .. })
    ));
}

// ============================================================================
// Synthesis Tests
// ============================================================================

#[test]
fn test_prerequisite_closure() {
    let mut generator = stage_generator(ShaderStage::Vertex, ModelMatrixStrategy::VertexBuffer);
    generator
        .request(SyntheticVariable::PositionTextureSpace, VariableScope::ToNextStage)
        .unwrap();

    let requests = generator.resolver().requests();
    let last = requests.last().unwrap();
    assert_eq!(last.variable, SyntheticVariable::PositionTextureSpace);

    for prerequisite in [
        SyntheticVariable::PositionViewSpace,
        SyntheticVariable::TangentViewSpace,
        SyntheticVariable::BinormalViewSpace,
        SyntheticVariable::NormalViewSpace,
    ] {
        let request = requests[..requests.len() - 1]
            .iter()
            .find(|request| request.variable == prerequisite)
            .unwrap_or_else(|| panic!("{prerequisite} missing"));
        assert_eq!(request.scope, VariableScope::Local);
    }
}

#[test]
fn test_scope_widening_is_monotonic() {
    let mut generator = stage_generator(ShaderStage::Vertex, ModelMatrixStrategy::VertexBuffer);
    let variable = SyntheticVariable::NormalViewSpace;

    generator.request(variable, VariableScope::Local).unwrap();
    generator.request(variable, VariableScope::ToNextStage).unwrap();
    assert_eq!(generator.resolver().scope_of(variable), Some(VariableScope::Both));

    generator.request(variable, VariableScope::Local).unwrap();
    assert_eq!(generator.resolver().scope_of(variable), Some(VariableScope::Both));
}

#[test]
fn test_shared_matrix_computed_once() {
    let mut generator = stage_generator(ShaderStage::Vertex, ModelMatrixStrategy::VertexBuffer);
    generator
        .request(SyntheticVariable::PositionViewSpace, VariableScope::ToNextStage)
        .unwrap();
    generator
        .request(SyntheticVariable::NormalViewSpace, VariableScope::ToNextStage)
        .unwrap();

    let source = generator.generate_source_code().unwrap();
    assert_eq!(source.matches("const mat4 ssv_ModelViewMatrix").count(), 1);
    assert_eq!(source.matches("const mat3 ssv_NormalMatrix").count(), 1);
}

#[test]
fn test_unknown_variable_leaves_requests_unchanged() {
    let mut generator =
        stage_generator(ShaderStage::Vertex, ModelMatrixStrategy::PushConstant { advanced: true });
    generator
        .request(SyntheticVariable::ClipSpacePosition, VariableScope::ToNextStage)
        .unwrap();
    let before = generator.resolver().requests().to_vec();

    let result = generator.request_by_name("ssv_NotAVariable", VariableScope::Local);

    assert_eq!(
        result,
        Err(ProgramError::UnknownVariable("ssv_NotAVariable".to_string()))
    );
    assert_eq!(generator.resolver().requests(), before.as_slice());
}

#[test]
fn test_fragment_stage_cannot_synthesize() {
    let mut generator =
        stage_generator(ShaderStage::Fragment, ModelMatrixStrategy::PushConstant { advanced: false });

    assert!(matches!(
        generator.request(SyntheticVariable::NormalViewSpace, VariableScope::Local),
        Err(ProgramError::WrongStage { .. })
    ));
    assert!(generator.resolver().requests().is_empty());
}

/// Version line, then declarations, then a single `main`.
#[rstest]
#[case::push_constants(ModelMatrixStrategy::PushConstant { advanced: true })]
#[case::uniform_block(ModelMatrixStrategy::UniformBlock)]
#[case::vertex_buffer(ModelMatrixStrategy::VertexBuffer)]
fn test_section_order(#[case] strategy: ModelMatrixStrategy) {
    let mut generator = stage_generator(ShaderStage::Vertex, strategy);
    generator
        .request(SyntheticVariable::ClipSpacePosition, VariableScope::ToNextStage)
        .unwrap();
    generator
        .request(SyntheticVariable::NormalViewSpace, VariableScope::ToNextStage)
        .unwrap();

    let source = generator.generate_source_code().unwrap();
    let version = source.find("#version").unwrap();
    let first_declaration = source.find("layout(").unwrap();
    let main = source.find("void main ()").unwrap();

    assert_eq!(version, 0);
    assert!(version < first_declaration);
    assert!(first_declaration < main);
    assert_eq!(source.matches("void main ()").count(), 1);
    assert!(!source[main..].contains("layout("));
}

// ============================================================================
// Scenario Tests
// ============================================================================

/// Positions-only geometry with a flat material: the vertex stage reads
/// one attribute and one uniform block.
#[test]
fn test_scenario_minimal_program() {
    let ctx = TestContext::dummy();
    let geometry = positions_only();
    let material = BasicMaterial::new("Flat");
    let scene = SceneRendering::new(&geometry, &material, RenderPassType::Simple);

    let program = ProgramBuilder::new(&scene, &ctx.target, &ctx.config)
        .build(&ctx.services)
        .unwrap();

    let vertex = program.shader(ShaderStage::Vertex).unwrap();
    assert_eq!(vertex.uniform_blocks().len(), 1);
    assert_eq!(vertex.uniform_blocks()[0].name(), "ViewUniformBlock");
    assert_eq!(vertex.input_attributes(), &[VertexAttributeType::Position]);

    let fragment = program.shader(ShaderStage::Fragment).unwrap();
    assert!(fragment
        .source()
        .contains("\tssv_OutputFragment = sbb_MaterialUniformBlock.color;\n"));
    assert!(program.is_ready());
}

/// Without a vertex stage the build stops before the vertex format.
#[test]
fn test_scenario_missing_vertex_stage() {
    use opaline_core::geometry::GeometryInterface;
    use opaline_graphics::{GenerationContext, ProgramGenerator};

    struct FragmentOnly(opaline_core::geometry::GeometryDescription);

    impl ProgramGenerator for FragmentOnly {
        fn name(&self) -> &str {
            "FragmentOnly"
        }

        fn geometry(&self) -> &dyn GeometryInterface {
            &self.0
        }

        fn prepare_uniform_sets(&self, _set_indexes: &mut SetIndexes, _context: &GenerationContext) {}

        fn generate_shaders(
            &self,
            program: &mut Program,
            context: &GenerationContext,
        ) -> Result<(), ProgramError> {
            let mut fragment =
                program.stage_generator(ShaderStage::Fragment, "OnlyFS", context.config)?;
            fragment.declare_default_output_fragment()?;
            program.attach(fragment.finish()?)
        }
    }

    let ctx = TestContext::dummy();
    let generator = FragmentOnly(positions_only());
    let mut builder = ProgramBuilder::new(&generator, &ctx.target, &ctx.config);

    assert_eq!(
        builder.generate_program(&ctx.services),
        Err(ProgramError::MissingVertexStage)
    );
    assert!(ctx.services.vertex_formats().is_empty());
    assert!(builder.program().vertex_buffer_format().is_none());
}

#[rstest]
#[case::per_vertex(GeneratorFlags::empty(), true)]
#[case::per_fragment(GeneratorFlags::HIGH_QUALITY_LIGHT, false)]
fn test_light_pass_program(#[case] flags: GeneratorFlags, #[case] exports_diffuse: bool) {
    let ctx = TestContext::dummy();
    let config = GeneratorConfig::default().with_flags(flags);
    let geometry = lit_mesh();
    let material = BasicMaterial::new("Lit");
    let scene = SceneRendering::new(&geometry, &material, RenderPassType::Light(LightKind::Point));

    let program = ProgramBuilder::new(&scene, &ctx.target, &config)
        .build(&ctx.services)
        .unwrap();

    let vertex = program.shader(ShaderStage::Vertex).unwrap();
    let exported = vertex
        .stage_outputs()
        .iter()
        .any(|output| output.name() == "ssv_DiffuseFactor");
    assert_eq!(exported, exports_diffuse);

    let fragment = program.shader(ShaderStage::Fragment).unwrap();
    assert!(fragment.source().contains("sbb_LightUniformBlock"));
    assert!(program.set_indexes().is_enabled(SetType::PerLight));
}

#[test]
fn test_textured_material_program() {
    let ctx = TestContext::dummy();
    let geometry = lit_mesh();
    let material = BasicMaterial::new("Textured").with_texture(BasicTexture::Flat);
    let scene = SceneRendering::new(&geometry, &material, RenderPassType::Simple);

    let program = ProgramBuilder::new(&scene, &ctx.target, &ctx.config)
        .build(&ctx.services)
        .unwrap();

    let vertex = program.shader(ShaderStage::Vertex).unwrap();
    assert!(vertex
        .input_attributes()
        .contains(&VertexAttributeType::Primary2DTextureCoordinates));

    let fragment = program.shader(ShaderStage::Fragment).unwrap();
    assert_eq!(fragment.samplers().len(), 1);
    assert!(fragment.source().contains("texture(su_PrimaryTexture, ssv_2DTexCoord0)"));
}

#[test]
fn test_tangent_space_request() {
    let ctx = TestContext::dummy();
    let geometry = tangent_mesh();
    let mut program = Program::new("TangentSpace");
    program.set_indexes_mut().enable_set(SetType::PerView);
    program.configure_matrices(
        MatrixOptions {
            instancing: false,
            advanced: true,
            billboarding: false,
        },
        &ctx.config,
    );

    let mut vertex = program
        .stage_generator(ShaderStage::Vertex, "TangentVS", &ctx.config)
        .unwrap();
    vertex
        .request(SyntheticVariable::ViewTbnMatrix, VariableScope::ToNextStage)
        .unwrap();
    let shader = vertex.finish().unwrap();

    let attributes = shader.input_attributes();
    assert!(attributes.contains(&VertexAttributeType::Tangent));
    assert!(attributes.contains(&VertexAttributeType::Normal));
    assert!(ctx
        .services
        .vertex_formats()
        .get_vertex_buffer_format(
            opaline_core::geometry::GeometryInterface::topology(&geometry),
            opaline_core::geometry::GeometryInterface::flags(&geometry),
            attributes,
        )
        .is_ok());
}
