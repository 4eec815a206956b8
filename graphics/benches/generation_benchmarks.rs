use std::sync::Arc;

use criterion::{Criterion, black_box, criterion_group, criterion_main};

use opaline_core::geometry::{GeometryDescription, GeometryFlags, Topology};
use opaline_graphics::material::BasicTexture;
use opaline_graphics::{
    BasicMaterial, DummyBackend, Extent2D, GeneratorConfig, GeneratorFlags, LightKind,
    ModelMatrixStrategy, ProgramBuilder, RenderPassType, RenderServices, RenderTargetDescription,
    SceneRendering, SetIndexes, SetType, ShaderStage, ShadowCasting, StageGenerator,
    SyntheticVariable, VariableScope,
};

fn lit_mesh() -> GeometryDescription {
    GeometryDescription::new("BenchMesh", Topology::TriangleList).with_flags(
        GeometryFlags::NORMALS
            | GeometryFlags::TANGENT_SPACE
            | GeometryFlags::PRIMARY_TEXTURE_COORDINATES_2D,
    )
}

fn setup() -> (RenderServices, RenderTargetDescription) {
    let services = RenderServices::new(Arc::new(DummyBackend::new()));
    let mut target = RenderTargetDescription::new("BenchView", Extent2D::new(1920, 1080));
    target.create_view_layout(services.layouts()).unwrap();
    (services, target)
}

// ---------------------------------------------------------------------------
// Stage synthesis
// ---------------------------------------------------------------------------

fn bench_vertex_stage_simple(c: &mut Criterion) {
    let config = GeneratorConfig::default();
    let mut set_indexes = SetIndexes::default();
    set_indexes.enable_set(SetType::PerView);

    c.bench_function("vertex_stage_clip_position", |b| {
        b.iter(|| {
            let mut generator = StageGenerator::new(
                ShaderStage::Vertex,
                "BenchVS",
                &config,
                ModelMatrixStrategy::PushConstant { advanced: false },
                set_indexes,
            );
            generator
                .request(SyntheticVariable::ClipSpacePosition, VariableScope::ToNextStage)
                .unwrap();
            black_box(generator.finish().unwrap());
        });
    });
}

fn bench_vertex_stage_tangent_space(c: &mut Criterion) {
    let config = GeneratorConfig::default();
    let mut set_indexes = SetIndexes::default();
    set_indexes.enable_set(SetType::PerView);

    c.bench_function("vertex_stage_tangent_space", |b| {
        b.iter(|| {
            let mut generator = StageGenerator::new(
                ShaderStage::Vertex,
                "BenchVS",
                &config,
                ModelMatrixStrategy::VertexBuffer,
                set_indexes,
            );
            generator
                .request(SyntheticVariable::ClipSpacePosition, VariableScope::ToNextStage)
                .unwrap();
            generator
                .request(SyntheticVariable::PositionTextureSpace, VariableScope::ToNextStage)
                .unwrap();
            generator
                .request(SyntheticVariable::ViewTbnMatrix, VariableScope::ToNextStage)
                .unwrap();
            black_box(generator.finish().unwrap());
        });
    });
}

// ---------------------------------------------------------------------------
// Complete programs on the dummy backend
// ---------------------------------------------------------------------------

fn bench_build_simple_program(c: &mut Criterion) {
    let (services, target) = setup();
    let config = GeneratorConfig::default();
    let geometry = lit_mesh();
    let material = BasicMaterial::new("BenchFlat");
    let scene = SceneRendering::new(&geometry, &material, RenderPassType::Simple);

    c.bench_function("build_simple_program", |b| {
        b.iter(|| {
            black_box(
                ProgramBuilder::new(&scene, &target, &config)
                    .build(&services)
                    .unwrap(),
            );
        });
    });
}

fn bench_build_light_programs(c: &mut Criterion) {
    let (services, target) = setup();
    let config = GeneratorConfig::default().with_flags(GeneratorFlags::HIGH_QUALITY_LIGHT);
    let geometry = lit_mesh();
    let material = BasicMaterial::new("BenchTextured").with_texture(BasicTexture::Flat);

    c.bench_function("build_light_programs_all_kinds", |b| {
        b.iter(|| {
            for kind in LightKind::ALL {
                let scene = SceneRendering::new(&geometry, &material, RenderPassType::Light(kind));
                black_box(
                    ProgramBuilder::new(&scene, &target, &config)
                        .build(&services)
                        .unwrap(),
                );
            }
        });
    });
}

fn bench_build_cubemap_shadow_program(c: &mut Criterion) {
    let services = RenderServices::new(Arc::new(DummyBackend::new()));
    let mut target =
        RenderTargetDescription::new("BenchShadowMap", Extent2D::new(1024, 1024)).with_cubemap(true);
    target.create_view_layout(services.layouts()).unwrap();
    let config = GeneratorConfig::default();
    let geometry = lit_mesh();
    let shadow = ShadowCasting::new(&geometry).with_instancing(true);

    c.bench_function("build_cubemap_shadow_program", |b| {
        b.iter(|| {
            black_box(
                ProgramBuilder::new(&shadow, &target, &config)
                    .build(&services)
                    .unwrap(),
            );
        });
    });
}

fn bench_program_cache_hit(c: &mut Criterion) {
    let (services, target) = setup();
    let config = GeneratorConfig::default();
    let geometry = lit_mesh();
    let material = BasicMaterial::new("BenchFlat");
    let scene = SceneRendering::new(&geometry, &material, RenderPassType::Ambient);
    let build = || ProgramBuilder::new(&scene, &target, &config).build(&services);
    services
        .programs()
        .get_or_build(scene.program_key(&target), build)
        .unwrap();

    c.bench_function("program_cache_hit", |b| {
        b.iter(|| {
            black_box(
                services
                    .programs()
                    .get_or_build(scene.program_key(&target), build)
                    .unwrap(),
            );
        });
    });
}

criterion_group!(
    benches,
    bench_vertex_stage_simple,
    bench_vertex_stage_tangent_space,
    bench_build_simple_program,
    bench_build_light_programs,
    bench_build_cubemap_shadow_program,
    bench_program_cache_hit,
);
criterion_main!(benches);
