//! Compilation of generated programs.
//!
//! Every stage the front end handles is compiled to SPIR-V with naga, so
//! interface types, block member names and synthesized statements are
//! checked the way a GPU driver would check them.
//!
//! # Running Tests
//!
//! ```bash
//! cargo test --test compile_tests
//! ```

mod common;

use std::sync::Arc;

use rstest::rstest;

use common::{TestContext, lit_mesh, positions_only};
use opaline_core::geometry::{GeometryDescription, GeometryFlags, Topology};
use opaline_graphics::program::MatrixOptions;
use opaline_graphics::shader::compiler::compile_glsl;
use opaline_graphics::{
    BasicMaterial, GeneratorConfig, GeneratorFlags, LightKind, ModelMatrixStrategy, Program,
    ProgramBuilder, ProgramGenerator, RenderPassType, SceneRendering, SetType, ShaderStage,
    ShadowCasting, SyntheticVariable, VariableScope,
};

/// Compile the vertex and fragment stages of a program.
fn assert_compiles(program: &Program) {
    for stage in [ShaderStage::Vertex, ShaderStage::Fragment] {
        let shader = program.shader(stage).unwrap();
        if let Err(err) = compile_glsl(stage, shader.source()) {
            panic!("{stage} '{}' does not compile: {err}\n{}", shader.name(), shader.source());
        }
    }
}

fn build(
    ctx: &TestContext,
    generator: &dyn ProgramGenerator,
    config: &GeneratorConfig,
) -> Arc<Program> {
    ProgramBuilder::new(generator, &ctx.target, config)
        .build(&ctx.services)
        .unwrap()
}

/// Lit mesh carrying vertex colors.
fn colored_mesh() -> GeometryDescription {
    GeometryDescription::new("ColoredMesh", Topology::TriangleList).with_flags(
        GeometryFlags::NORMALS
            | GeometryFlags::PRIMARY_TEXTURE_COORDINATES_2D
            | GeometryFlags::VERTEX_COLOR,
    )
}

// ============================================================================
// Scene Programs
// ============================================================================

#[rstest]
#[case::simple(RenderPassType::Simple, false)]
#[case::ambient(RenderPassType::Ambient, false)]
#[case::directional(RenderPassType::Light(LightKind::Directional), false)]
#[case::point(RenderPassType::Light(LightKind::Point), false)]
#[case::spot(RenderPassType::Light(LightKind::Spot), false)]
#[case::instanced_simple(RenderPassType::Simple, true)]
#[case::instanced_point(RenderPassType::Light(LightKind::Point), true)]
fn test_scene_program_compiles(#[case] pass: RenderPassType, #[case] instancing: bool) {
    let ctx = TestContext::dummy();
    let geometry = colored_mesh();
    let material = BasicMaterial::new("Lit").with_vertex_colors();
    let scene = SceneRendering::new(&geometry, &material, pass).with_instancing(instancing);

    let program = build(&ctx, &scene, &ctx.config);
    assert_compiles(&program);
}

#[rstest]
#[case::per_vertex(GeneratorFlags::empty())]
#[case::per_fragment(GeneratorFlags::HIGH_QUALITY_LIGHT)]
fn test_light_quality_compiles(#[case] flags: GeneratorFlags) {
    let ctx = TestContext::dummy();
    let config = GeneratorConfig::default().with_flags(flags);
    let geometry = lit_mesh();
    let material = BasicMaterial::new("Lit");

    for kind in LightKind::ALL {
        let scene = SceneRendering::new(&geometry, &material, RenderPassType::Light(kind));
        assert_compiles(&build(&ctx, &scene, &config));
    }
}

/// Model matrices read from the model uniform block, or per instance with
/// the view block.
#[rstest]
#[case::uniform_block(false, ModelMatrixStrategy::UniformBlock)]
#[case::vertex_buffer(true, ModelMatrixStrategy::VertexBuffer)]
fn test_model_uniform_block_compiles(
    #[case] instancing: bool,
    #[case] expected: ModelMatrixStrategy,
) {
    let ctx = TestContext::dummy();
    let config = GeneratorConfig::default().with_model_uniform_block(true);
    let geometry = lit_mesh();
    let material = BasicMaterial::new("Lit");
    let scene = SceneRendering::new(&geometry, &material, RenderPassType::Light(LightKind::Spot))
        .with_instancing(instancing);

    let program = build(&ctx, &scene, &config);
    assert_eq!(program.model_matrix_strategy(), expected);
    assert_compiles(&program);
}

// ============================================================================
// Matrix Interfaces
// ============================================================================

/// Matrices exported to the fragment stage travel as columns.
#[rstest]
#[case::push_constant(false, SyntheticVariable::ViewTbnMatrix)]
#[case::push_constant_world(false, SyntheticVariable::WorldTbnMatrix)]
#[case::instanced(true, SyntheticVariable::WorldTbnMatrix)]
#[case::instanced_to_tangent(true, SyntheticVariable::WorldToTangentMatrix)]
fn test_matrix_exports_compile(#[case] instancing: bool, #[case] variable: SyntheticVariable) {
    let ctx = TestContext::dummy();
    let mut program = Program::new("MatrixExport");
    program.set_indexes_mut().enable_set(SetType::PerView);
    program.configure_matrices(
        MatrixOptions {
            instancing,
            advanced: true,
            billboarding: false,
        },
        &ctx.config,
    );

    let mut vertex = program
        .stage_generator(ShaderStage::Vertex, "MatrixExportVS", &ctx.config)
        .unwrap();
    vertex
        .request(SyntheticVariable::ClipSpacePosition, VariableScope::ToNextStage)
        .unwrap();
    vertex.request(variable, VariableScope::ToNextStage).unwrap();
    let vertex = vertex.finish().unwrap();
    assert!(!vertex.source().contains(" in mat"));
    assert!(!vertex.source().contains(" out mat"));

    let mut fragment = program
        .stage_generator(ShaderStage::Fragment, "MatrixExportFS", &ctx.config)
        .unwrap();
    fragment.connect_from_previous_stage(&vertex).unwrap();
    fragment.declare_default_output_fragment().unwrap();
    let fragment = fragment.finish().unwrap();

    program.attach(vertex).unwrap();
    program.attach(fragment).unwrap();
    assert_compiles(&program);
}

// ============================================================================
// Shadow Programs
// ============================================================================

#[rstest]
#[case::shadow_map(false, false)]
#[case::instanced_shadow_map(false, true)]
#[case::cubemap(true, false)]
#[case::instanced_cubemap(true, true)]
fn test_shadow_casting_compiles(#[case] cubemap: bool, #[case] instancing: bool) {
    let mut ctx = TestContext::dummy();
    ctx.target = ctx.target.clone().with_cubemap(cubemap);
    let geometry = positions_only();
    let shadow = ShadowCasting::new(&geometry)
        .with_instancing(instancing)
        .with_color_output(true);

    let program = build(&ctx, &shadow, &ctx.config);
    assert_eq!(program.has_stage(ShaderStage::Geometry), cubemap);
    assert_compiles(&program);
}
