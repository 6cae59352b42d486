use std::cell::Cell;
use std::rc::Rc;

use anyhow::{anyhow, Result};

use deimos::prelude::*;

mod framework;

/// Declares the given render targets in a throwaway pipeline, so the backing store can be used on its own afterwards.
fn declare_targets(
    resources: &mut PipelineResources<HeadlessBackend>,
    targets: &[(&str, u32, u32)],
) -> Result<Vec<RenderTargetResource>> {
    let mut pipeline = RenderPipeline::new(resources, HeadlessRenderTarget::new(800, 600))?;
    Ok(targets
        .iter()
        .map(|(name, width, height)| pipeline.create_render_target(*name, *width, *height))
        .collect())
}

fn assert_not_found(err: &anyhow::Error, resource: &impl VirtualResource) {
    match err.downcast_ref::<Error>() {
        Some(Error::ResourceNotFound {
            handle,
            name,
        }) => {
            assert_eq!(*handle, resource.handle());
            assert_eq!(name, resource.name());
        }
        other => panic!("expected ResourceNotFound, got {other:?}"),
    }
}

#[test]
pub fn render_target_round_trip() -> Result<()> {
    let mut resources = framework::make_resources();
    let targets = declare_targets(&mut resources, &[("offscreen", 400, 300), ("unbound", 16, 16)])?;
    let concrete = Rc::new(HeadlessRenderTarget::new(400, 300));
    resources.set_render_target(&targets[0], concrete.clone());

    let fetched = resources.get_render_target(&targets[0])?;
    assert!(Rc::ptr_eq(&fetched, &concrete));

    let err = resources.get_render_target(&targets[1]).unwrap_err();
    assert_not_found(&err, &targets[1]);
    let message = err.to_string();
    assert!(message.contains("unbound"));
    assert!(message.contains(&targets[1].handle().to_string()));
    Ok(())
}

#[test]
pub fn evicts_resources_unused_this_tick() -> Result<()> {
    let mut resources = framework::make_resources();
    let targets = declare_targets(&mut resources, &[("rt1", 400, 300)])?;
    let target = &targets[0];

    resources.set_current_tick(1);
    resources.set_render_target(target, HeadlessRenderTarget::new(400, 300));
    resources.get_render_target(target)?;
    assert_eq!(resources.last_used_tick(target.handle()), Some(1));

    resources.set_current_tick(2);
    assert_eq!(resources.collect_garbage(), 1);
    assert!(!resources.contains(target.handle()));
    assert_eq!(resources.last_used_tick(target.handle()), None);
    let err = resources.get_render_target(target).unwrap_err();
    assert_not_found(&err, target);
    Ok(())
}

#[test]
pub fn keeps_resources_used_this_tick() -> Result<()> {
    let mut resources = framework::make_resources();
    let targets = declare_targets(&mut resources, &[("rt1", 400, 300)])?;
    let target = &targets[0];

    resources.set_current_tick(1);
    resources.set_render_target(target, HeadlessRenderTarget::new(400, 300));
    resources.get_render_target(target)?;
    resources.set_current_tick(2);
    resources.get_render_target(target)?;
    assert_eq!(resources.collect_garbage(), 0);
    assert_eq!(resources.get_render_target(target)?.width(), 400);
    Ok(())
}

#[test]
pub fn unchanged_tick_never_evicts() -> Result<()> {
    let mut resources = framework::make_resources();
    let targets = declare_targets(&mut resources, &[("rt1", 400, 300)])?;

    resources.set_current_tick(1);
    resources.set_render_target(&targets[0], HeadlessRenderTarget::new(400, 300));
    resources.get_render_target(&targets[0])?;
    for _ in 0..3 {
        assert_eq!(resources.collect_garbage(), 0);
    }
    assert!(resources.contains(targets[0].handle()));
    Ok(())
}

#[test]
pub fn never_read_resources_are_not_evicted() -> Result<()> {
    let mut resources = framework::make_resources();
    let targets = declare_targets(&mut resources, &[("rt1", 400, 300)])?;

    resources.set_current_tick(1);
    resources.set_render_target(&targets[0], HeadlessRenderTarget::new(400, 300));
    resources.set_current_tick(5);
    assert_eq!(resources.collect_garbage(), 0);
    assert!(resources.contains(targets[0].handle()));
    Ok(())
}

#[test]
pub fn textures_and_buffers_are_tracked() -> Result<()> {
    let mut resources = framework::make_resources();
    let (texture, buffer) = {
        let mut pipeline = RenderPipeline::new(&mut resources, HeadlessRenderTarget::new(800, 600))?;
        let texture = pipeline.create_texture("noise", 64, 64, TextureOptions::default().with_wrap(TextureWrap::Repeat));
        let buffer = pipeline.create_buffer("lights", 4096);
        (texture, buffer)
    };

    resources.set_current_tick(1);
    let concrete = resources.create_texture(&texture)?;
    assert_eq!(concrete.options().wrap, TextureWrap::Repeat);
    resources.create_buffer(&buffer)?.bind(0)?;
    resources.get_texture(&texture)?.bind(3)?;
    assert_eq!(concrete.bound_unit(), Some(3));
    assert_eq!(resources.get_buffer(&buffer)?.bind_count(), 1);

    resources.set_current_tick(2);
    resources.get_buffer(&buffer)?;
    assert_eq!(resources.collect_garbage(), 1);
    assert!(resources.get_texture(&texture).is_err());
    assert_eq!(resources.get_buffer(&buffer)?.size(), 4096);
    Ok(())
}

#[test]
pub fn realizes_render_target_with_attachments() -> Result<()> {
    let mut resources = framework::make_resources();
    let mut pipeline = RenderPipeline::new(&mut resources, HeadlessRenderTarget::new(800, 600))?;
    let mut gbuffer = pipeline.create_render_target("gbuffer", 640, 480);
    let albedo = pipeline.create_color_attachment(&mut gbuffer, "gbuffer.albedo", TextureOptions::default());
    let normal = pipeline.create_color_attachment(
        &mut gbuffer,
        "gbuffer.normal",
        TextureOptions::default().with_format(TextureFormat::Rgba16F),
    );
    let depth = pipeline.create_depth_attachment(&mut gbuffer, TextureOptions::depth());

    let concrete = pipeline.resources_mut().create_render_target(&gbuffer)?;
    assert_eq!(concrete.color_attachments().len(), 2);
    assert_eq!(concrete.color_attachments()[1].options().format, TextureFormat::Rgba16F);
    assert!(concrete.depth_attachment().is_some());

    let resources = pipeline.resources_mut();
    assert!(Rc::ptr_eq(&resources.get_texture(&albedo)?, &concrete.color_attachments()[0]));
    assert!(Rc::ptr_eq(&resources.get_texture(&normal)?, &concrete.color_attachments()[1]));
    let depth_texture = resources.get_texture(&depth)?;
    assert_eq!((depth_texture.width(), depth_texture.height()), (640, 480));
    assert!(depth_texture.options().format.is_depth());

    assert_eq!(resources.backend().created_textures(), 3);
    assert_eq!(resources.backend().created_render_targets(), 1);
    Ok(())
}

#[test]
pub fn construction_errors_propagate() -> Result<()> {
    let mut resources = framework::make_resources_with_limit(1024);
    let mut pipeline = RenderPipeline::new(&mut resources, HeadlessRenderTarget::new(800, 600))?;
    let empty = pipeline.create_render_target("empty", 0, 10);
    let mut huge = pipeline.create_render_target("huge", 2048, 512);
    pipeline.create_color_attachment(&mut huge, "huge.color", TextureOptions::default());

    let err = pipeline.resources_mut().create_render_target(&empty).unwrap_err();
    assert!(matches!(err.downcast_ref::<Error>(), Some(Error::InvalidExtent { width: 0, .. })));

    // Attachments are created first, so the failing object is the color attachment.
    let err = pipeline.resources_mut().create_render_target(&huge).unwrap_err();
    match err.downcast_ref::<Error>() {
        Some(Error::InvalidExtent {
            name,
            width,
            height,
        }) => {
            assert_eq!(name, "huge.color");
            assert_eq!((*width, *height), (2048, 512));
        }
        other => panic!("expected InvalidExtent, got {other:?}"),
    }
    assert!(!pipeline.backing_store().contains(huge.handle()));
    Ok(())
}

#[test]
pub fn render_target_like_copies_content_scale() -> Result<()> {
    let mut resources = framework::make_resources();
    let mut pipeline = RenderPipeline::new(&mut resources, HeadlessRenderTarget::new(800, 600))?;
    let window = HeadlessRenderTarget::new(1600, 1200).with_content_scale(2.0, 2.0);
    let target = pipeline.create_render_target_like("hidpi", &window);
    assert_eq!((target.width(), target.height()), (1600, 1200));
    assert_eq!(target.content_scale(), (2.0, 2.0));
    assert_eq!(target.logical_size(), (800.0, 600.0));

    let concrete = pipeline.resources_mut().create_render_target(&target)?;
    assert_eq!(concrete.content_scale(), (2.0, 2.0));
    Ok(())
}

#[test]
pub fn static_resource_factory_runs_once() -> Result<()> {
    let mut resources = framework::make_resources();
    let calls = Cell::new(0);
    for _ in 0..3 {
        let shader = resources.cache_static_resource("blit.shader", |_| {
            calls.set(calls.get() + 1);
            Ok(String::from("void main() {}"))
        })?;
        assert_eq!(shader, "void main() {}");
    }
    assert_eq!(calls.get(), 1);
    Ok(())
}

#[test]
pub fn static_resource_factory_error_propagates() -> Result<()> {
    let mut resources = framework::make_resources();
    let err = resources
        .cache_static_resource::<String, _>("broken.shader", |_| Err(anyhow!("syntax error on line 3")))
        .unwrap_err();
    assert_eq!(err.to_string(), "syntax error on line 3");

    let err = resources.get_static_resource::<String>("broken.shader").unwrap_err();
    assert!(matches!(err.downcast_ref::<Error>(), Some(Error::StaticResourceNotFound(_))));
    Ok(())
}

#[test]
pub fn static_resources_are_typed() -> Result<()> {
    let mut resources = framework::make_resources();
    resources.set_static_resource("lut.size", 32u32);
    assert_eq!(*resources.get_static_resource::<u32>("lut.size")?, 32);

    let err = resources.get_static_resource::<f32>("lut.size").unwrap_err();
    assert!(matches!(err.downcast_ref::<Error>(), Some(Error::StaticResourceTypeMismatch { .. })));

    assert!(resources.remove_static_resource("lut.size"));
    assert!(!resources.remove_static_resource("lut.size"));
    Ok(())
}

#[test]
pub fn static_resources_survive_garbage_collection() -> Result<()> {
    let mut resources = framework::make_resources();
    resources.set_current_tick(1);
    resources.cache_static_resource("quad", |backend| Ok(HeadlessBuffer::new(backend.max_extent() as u64)))?;
    resources.set_current_tick(10);
    resources.collect_garbage();
    assert_eq!(resources.get_static_resource::<HeadlessBuffer>("quad")?.size(), 16384);
    Ok(())
}

#[test]
pub fn attachments_are_evicted_with_their_target() -> Result<()> {
    let mut resources = framework::make_resources();
    let mut pipeline = RenderPipeline::new(&mut resources, HeadlessRenderTarget::new(800, 600))?;
    let mut gbuffer = pipeline.create_render_target("gbuffer", 640, 480);
    let albedo = pipeline.create_color_attachment(&mut gbuffer, "gbuffer.albedo", TextureOptions::default());

    pipeline.resources_mut().set_current_tick(1);
    pipeline.resources_mut().create_render_target(&gbuffer)?;
    pipeline.resources_mut().get_render_target(&gbuffer)?;
    // Reading the target marks the attachment, even though it was never read itself
    assert_eq!(pipeline.backing_store().last_used_tick(albedo.handle()), Some(1));

    pipeline.execute(2, None)?;
    assert!(!pipeline.backing_store().contains(gbuffer.handle()));
    assert!(!pipeline.backing_store().contains(albedo.handle()));
    let err = pipeline.resources_mut().get_texture(&albedo).unwrap_err();
    assert_not_found(&err, &albedo);
    Ok(())
}

#[test]
pub fn reading_a_target_keeps_its_attachments() -> Result<()> {
    let mut resources = framework::make_resources();
    let (shadow, depth) = {
        let mut pipeline = RenderPipeline::new(&mut resources, HeadlessRenderTarget::new(800, 600))?;
        let mut shadow = pipeline.create_render_target("shadow", 1024, 1024);
        let depth = pipeline.create_depth_attachment(&mut shadow, TextureOptions::depth());
        (shadow, depth)
    };

    resources.set_current_tick(1);
    resources.create_render_target(&shadow)?;
    for tick in 1..=3 {
        resources.set_current_tick(tick);
        resources.get_render_target(&shadow)?;
        assert_eq!(resources.collect_garbage(), 0);
    }
    assert_eq!(resources.last_used_tick(depth.handle()), Some(3));
    assert_eq!(resources.backend().created_textures(), 1);

    // Rebinding the target detaches the attachments it was created with
    resources.set_current_tick(4);
    resources.set_render_target(&shadow, HeadlessRenderTarget::new(1024, 1024));
    resources.get_render_target(&shadow)?;
    assert_eq!(resources.collect_garbage(), 1);
    assert!(resources.contains(shadow.handle()));
    assert!(!resources.contains(depth.handle()));
    Ok(())
}

#[test]
pub fn imported_objects_are_bound_immediately() -> Result<()> {
    let mut resources = framework::make_resources();
    let mut pipeline = RenderPipeline::new(&mut resources, HeadlessRenderTarget::new(800, 600))?;
    let noise = Rc::new(HeadlessTexture::new(128, 64, TextureOptions::default().with_wrap(TextureWrap::Repeat)));
    let lights = Rc::new(HeadlessBuffer::new(1024));

    let noise_resource = pipeline.import_texture("noise", noise.clone());
    let lights_resource = pipeline.import_buffer("lights", lights.clone());
    assert_eq!((noise_resource.width(), noise_resource.height()), (128, 64));
    assert_eq!(lights_resource.size(), 1024);
    assert!(pipeline.backing_store().contains(noise_resource.handle()));
    assert!(pipeline.backing_store().contains(lights_resource.handle()));
    assert_eq!(pipeline.resource(noise_resource.handle()), Some(&AnyResource::from(noise_resource.clone())));

    let resources = pipeline.resources_mut();
    assert!(Rc::ptr_eq(&resources.get_texture(&noise_resource)?, &noise));
    assert!(Rc::ptr_eq(&resources.get_buffer(&lights_resource)?, &lights));
    // Imported objects are owned by the caller, the backend never created anything
    assert_eq!(resources.backend().created_textures(), 0);
    assert_eq!(resources.backend().created_buffers(), 0);
    Ok(())
}

#[test]
pub fn create_resource_records_every_kind() -> Result<()> {
    let mut resources = framework::make_resources();
    let mut pipeline = RenderPipeline::new(&mut resources, HeadlessRenderTarget::new(800, 600))?;
    let hdr = pipeline.create_resource::<RenderTargetResource>("hdr", RenderTargetDesc::new(1280, 720));
    let lut = pipeline.create_resource::<TextureResource>(
        "lut",
        TextureDesc {
            width: 32,
            height: 32,
            options: TextureOptions::default().with_format(TextureFormat::Rgba16F),
        },
    );
    let instances = pipeline.create_resource::<BufferResource>(
        "instances",
        BufferDesc {
            size: 65536,
        },
    );

    for resource in [AnyResource::from(hdr.clone()), lut.clone().into(), instances.clone().into()] {
        assert_eq!(pipeline.resource(resource.handle()), Some(&resource));
        // Nothing is bound until a pass realizes it
        assert!(!pipeline.backing_store().contains(resource.handle()));
    }
    assert_eq!((hdr.width(), hdr.height(), hdr.content_scale()), (1280, 720, (1.0, 1.0)));
    assert!(hdr.color_attachments().is_empty());
    assert_eq!(lut.options().format, TextureFormat::Rgba16F);
    assert_eq!(instances.size(), 65536);
    assert_eq!(pipeline.resource_count(), 4);
    Ok(())
}
