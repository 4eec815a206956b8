//! Pipeline and cache integration tests.
//!
//! These tests build complete programs and check the objects shared
//! between them: layouts, vertex formats, shader modules and cached
//! programs.
//!
//! # Test Categories
//!
//! - **Layout Tests**: Layout sharing, parameterized over backends
//! - **Build Tests**: Push constant ranges, fallback programs and pipeline rejection
//! - **Cache Tests**: Program reuse and render target invalidation

mod common;

use std::sync::Arc;

use rstest::rstest;

use common::{Backend, TestContext, lit_mesh, positions_only};
use opaline_core::events::EventChannel;
use opaline_graphics::layout::{DescriptorSetLayoutDescriptor, ShaderStageFlags};
use opaline_graphics::lighting::light_descriptor_set_layout;
use opaline_graphics::material::BasicTexture;
use opaline_graphics::{
    BasicMaterial, BuildState, DummyBackend, Extent2D, GeneratorConfig, LightKind, ProgramBuilder,
    ProgramError, RenderPassType, RenderServices, RenderTargetDescription, RenderTargetEvent,
    SceneRendering, ShaderStage,
};

// ============================================================================
// Layout Tests
// ============================================================================

/// Equal descriptors share one layout object.
#[rstest]
#[case::dummy(Backend::Dummy)]
#[case::vulkan(Backend::Vulkan)]
fn test_descriptor_set_layouts_are_shared(#[case] backend: Backend) {
    let Some(ctx) = TestContext::new(backend) else {
        eprintln!("Backend {:?} not available, skipping", backend);
        return;
    };
    let layouts = ctx.services.layouts();

    let first = layouts
        .get_descriptor_set_layout(&light_descriptor_set_layout())
        .unwrap();
    let second = layouts
        .get_descriptor_set_layout(&light_descriptor_set_layout())
        .unwrap();
    assert!(Arc::ptr_eq(&first, &second));

    let other = layouts
        .get_descriptor_set_layout(
            &DescriptorSetLayoutDescriptor::new()
                .with_uniform_buffer(0, ShaderStageFlags::FRAGMENT)
                .with_label("Other"),
        )
        .unwrap();
    assert!(!Arc::ptr_eq(&first, &other));
}

#[rstest]
#[case::dummy(Backend::Dummy)]
#[case::vulkan(Backend::Vulkan)]
fn test_pipeline_layouts_are_shared(#[case] backend: Backend) {
    let Some(ctx) = TestContext::new(backend) else {
        eprintln!("Backend {:?} not available, skipping", backend);
        return;
    };
    let layouts = ctx.services.layouts();
    let view = ctx.target_view_layout();

    let first = layouts.get_pipeline_layout(vec![view.clone()], Vec::new()).unwrap();
    let second = layouts.get_pipeline_layout(vec![view], Vec::new()).unwrap();
    assert!(Arc::ptr_eq(&first, &second));
    assert_eq!(layouts.pipeline_layout_count(), 1);
}

// ============================================================================
// Build Tests
// ============================================================================

#[test]
fn test_push_constant_ranges() {
    let ctx = TestContext::dummy();
    let geometry = positions_only();
    let material = BasicMaterial::new("Flat");
    let scene = SceneRendering::new(&geometry, &material, RenderPassType::Simple);

    let program = ProgramBuilder::new(&scene, &ctx.target, &ctx.config)
        .build(&ctx.services)
        .unwrap();

    let ranges = program.pipeline_layout().unwrap().push_constant_ranges();
    assert_eq!(ranges.len(), 1);
    assert_eq!(ranges[0].offset, 0);
    assert_eq!(ranges[0].size, 64);
    assert_eq!(ranges[0].stages, ShaderStageFlags::VERTEX);
}

#[test]
fn test_programs_share_objects() {
    let ctx = TestContext::dummy();
    let geometry = lit_mesh();
    let red = BasicMaterial::new("Red");
    let blue = BasicMaterial::new("Blue");

    let first = SceneRendering::new(&geometry, &red, RenderPassType::Simple);
    let second = SceneRendering::new(&geometry, &blue, RenderPassType::Simple);
    let a = ProgramBuilder::new(&first, &ctx.target, &ctx.config)
        .build(&ctx.services)
        .unwrap();
    let b = ProgramBuilder::new(&second, &ctx.target, &ctx.config)
        .build(&ctx.services)
        .unwrap();

    assert!(Arc::ptr_eq(
        a.pipeline_layout().unwrap(),
        b.pipeline_layout().unwrap()
    ));
    assert!(Arc::ptr_eq(
        a.vertex_buffer_format().unwrap(),
        b.vertex_buffer_format().unwrap()
    ));
    assert_eq!(ctx.services.vertex_formats().len(), 1);
    assert_eq!(ctx.services.layouts().descriptor_set_layout_count(), 2);
}

#[test]
fn test_missing_view_layout() {
    let ctx = TestContext::dummy();
    let target = RenderTargetDescription::new("NoView", Extent2D::new(8, 8));
    let geometry = positions_only();
    let material = BasicMaterial::new("Flat");
    let scene = SceneRendering::new(&geometry, &material, RenderPassType::Simple);

    let mut builder = ProgramBuilder::new(&scene, &target, &ctx.config);
    builder.generate_program(&ctx.services).unwrap();
    assert_eq!(
        builder.generate_program_layout(&ctx.services),
        Err(ProgramError::MissingViewLayout)
    );
    assert_eq!(builder.state(), BuildState::Aborted);
}

#[test]
fn test_fallback_program() {
    let ctx = TestContext::dummy();
    let geometry = positions_only();
    let material = BasicMaterial::new("Textured").with_texture(BasicTexture::Flat);
    let scene = SceneRendering::new(&geometry, &material, RenderPassType::Simple);

    let result = ProgramBuilder::new(&scene, &ctx.target, &ctx.config).build(&ctx.services);
    assert!(matches!(result, Err(ProgramError::Generation(_))));

    let program = ProgramBuilder::new(&scene, &ctx.target, &ctx.config)
        .build_or_fallback(&ctx.services)
        .unwrap();
    assert_eq!(program.name(), "Fallback");
    assert!(program.is_ready());
    assert!(program
        .shader(ShaderStage::Fragment)
        .unwrap()
        .source()
        .contains("vec4(1.0, 0.0, 1.0, 1.0)"));
}

#[test]
fn test_light_pass_requires_normals() {
    let ctx = TestContext::dummy();
    let geometry = positions_only();
    let material = BasicMaterial::new("Flat");
    let scene = SceneRendering::new(
        &geometry,
        &material,
        RenderPassType::Light(LightKind::Directional),
    );

    let mut builder = ProgramBuilder::new(&scene, &ctx.target, &ctx.config);
    assert!(matches!(
        builder.generate_program(&ctx.services),
        Err(ProgramError::Generation(_))
    ));
    assert_eq!(builder.state(), BuildState::Aborted);
}

#[test]
fn test_pipeline_rejection() {
    let backend = Arc::new(DummyBackend::new());
    let services = RenderServices::new(backend.clone());
    let mut target = RenderTargetDescription::new("Main", Extent2D::new(64, 64));
    target.create_view_layout(services.layouts()).unwrap();
    let config = GeneratorConfig::default();
    let geometry = positions_only();
    let material = BasicMaterial::new("Flat");
    let scene = SceneRendering::new(&geometry, &material, RenderPassType::Simple);

    backend.reject_pipelines(true);
    let mut builder = ProgramBuilder::new(&scene, &target, &config);
    builder.generate_program(&services).unwrap();
    builder.generate_program_layout(&services).unwrap();

    let result = builder.create_graphics_pipeline(&services);
    assert!(matches!(
        result,
        Err(ProgramError::PipelineFinalizationFailed(_))
    ));
    assert_eq!(builder.state(), BuildState::LayoutResolved);
    assert!(builder.program().is_described());
    assert!(!builder.program().is_ready());
    assert_eq!(backend.pipelines_created(), 0);
}

// ============================================================================
// Cache Tests
// ============================================================================

#[test]
fn test_program_cache_reuses_programs() {
    let ctx = TestContext::dummy();
    let geometry = positions_only();
    let material = BasicMaterial::new("Flat");
    let scene = SceneRendering::new(&geometry, &material, RenderPassType::Simple);
    let key = scene.program_key(&ctx.target);
    let mut builds = 0;

    let first = ctx
        .services
        .programs()
        .get_or_build(key.clone(), || {
            builds += 1;
            ProgramBuilder::new(&scene, &ctx.target, &ctx.config).build(&ctx.services)
        })
        .unwrap();
    let second = ctx
        .services
        .programs()
        .get_or_build(key, || {
            builds += 1;
            ProgramBuilder::new(&scene, &ctx.target, &ctx.config).build(&ctx.services)
        })
        .unwrap();

    assert!(Arc::ptr_eq(&first, &second));
    assert_eq!(builds, 1);
}

#[test]
fn test_failed_builds_are_not_cached() {
    let ctx = TestContext::dummy();
    let geometry = positions_only();
    let material = BasicMaterial::new("Textured").with_texture(BasicTexture::Flat);
    let scene = SceneRendering::new(&geometry, &material, RenderPassType::Simple);

    let result = ctx
        .services
        .programs()
        .get_or_build(scene.program_key(&ctx.target), || {
            ProgramBuilder::new(&scene, &ctx.target, &ctx.config).build(&ctx.services)
        });

    assert!(result.is_err());
    assert!(ctx.services.programs().is_empty());
}

#[test]
fn test_render_target_events_invalidate_programs() {
    let ctx = TestContext::dummy();
    let channel = EventChannel::new();
    ctx.services.programs().subscribe_to(&channel);

    let geometry = positions_only();
    let material = BasicMaterial::new("Flat");
    for pass in [RenderPassType::Simple, RenderPassType::Ambient] {
        let scene = SceneRendering::new(&geometry, &material, pass);
        ctx.services
            .programs()
            .get_or_build(scene.program_key(&ctx.target), || {
                ProgramBuilder::new(&scene, &ctx.target, &ctx.config).build(&ctx.services)
            })
            .unwrap();
    }
    assert_eq!(ctx.services.programs().len(), 2);

    channel.publish(&RenderTargetEvent::Resized {
        identifier: "Elsewhere".to_string(),
        extent: Extent2D::new(1, 1),
    });
    assert_eq!(ctx.services.programs().len(), 2);

    channel.publish(&RenderTargetEvent::Resized {
        identifier: "MainView".to_string(),
        extent: Extent2D::new(512, 512),
    });
    assert!(ctx.services.programs().is_empty());
}
