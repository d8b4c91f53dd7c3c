// Copyright 2025 eraflo
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
//     http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.

mod common;

use common::*;
use lumen_core::renderer::*;
use lumen_infra::graphics::headless::DeviceCall;
use lumen_infra::platform::HeadlessSurface;
use lumen_lanes::render_lane::auto_exposure::apply_auto_exposure;
use lumen_lanes::render_lane::shaders;
use lumen_lanes::render_lane::uniforms::LuminanceHistogram;
use lumen_lanes::render_lane::DeferredPbrRenderSystem;
use std::sync::Arc;

fn configured(system: &mut DeferredPbrRenderSystem, steps: &[RenderStep]) -> HeadlessSurface {
    let mut configuration = RenderConfiguration::new(RenderPipeline::DeferredPbr, false);
    for &step in steps {
        configuration.enable_render_step(step);
    }
    let mut surface = HeadlessSurface::new(800, 600);
    system.configure(&configuration, &mut surface).unwrap();
    surface
}

#[test]
fn empty_frame_draws_lighting_and_composite() {
    let device = headless_device();
    let mut system = render_system(&device, 1920, 1080);
    let mut camera = camera(1920, 1080);

    render_empty_frame(&mut system, &mut camera);

    let frame = system.hardware_stats().last_frame;
    assert_eq!(frame.draw_calls, 2);
    assert_eq!((frame.meshes, frame.primitives, frame.materials), (0, 0, 0));
    assert_eq!((frame.canvas_width, frame.canvas_height), (1920, 1080));
    assert_eq!(draws(&device.calls()), 2);
    assert!(system.hardware_stats().api_version.starts_with("Headless"));
    assert!(system.pending_commands().is_empty());
}

#[test]
fn lighting_without_environment_binds_placeholders() {
    let device = headless_device();
    let mut system = render_system(&device, 800, 600);
    let defaults = *system.default_resources();

    render_empty_frame(&mut system, &mut camera(800, 600));

    let calls = device.calls();
    let lighting_draw = position(&calls, |call| matches!(call, DeviceCall::DrawArrays { .. }));
    assert_eq!(texture_bound_at(&calls, 5, lighting_draw), Some(defaults.environment));
    assert_eq!(texture_bound_at(&calls, 6, lighting_draw), Some(defaults.environment));
    assert_eq!(texture_bound_at(&calls, 7, lighting_draw), Some(defaults.texture));
}

#[test]
fn lighting_with_unloaded_ibl_binds_the_brdf_table() {
    let device = headless_device();
    let mut system = render_system(&device, 800, 600);
    configured(&mut system, &[RenderStep::Ibl]);
    let defaults = *system.default_resources();
    let brdf_lut = system.ibl_step().unwrap().brdf_lut();
    device.take_calls();

    render_empty_frame(&mut system, &mut camera(800, 600));

    let calls = device.calls();
    let lighting_draw = position(&calls, |call| matches!(call, DeviceCall::DrawArrays { .. }));
    assert_eq!(texture_bound_at(&calls, 5, lighting_draw), Some(defaults.environment));
    assert_eq!(texture_bound_at(&calls, 6, lighting_draw), Some(defaults.environment));
    assert_eq!(texture_bound_at(&calls, 7, lighting_draw), Some(brdf_lut));
    // The environment is skipped until one is loaded.
    assert_eq!(system.hardware_stats().last_frame.draw_calls, 2);
}

#[test]
fn resize_reaches_every_framebuffer() {
    let device = headless_device();
    let mut system = render_system(&device, 800, 600);

    system.set_viewport(0, 0, 1280, 720);
    render_empty_frame(&mut system, &mut camera(1280, 720));

    let views = system.debug_views();
    for framebuffer in [views.gbuffer, views.hdr_buffer, views.backbuffer] {
        assert_eq!(device.framebuffer_size(framebuffer).unwrap(), (1280, 720));
        let depth = device
            .framebuffer_attachment(framebuffer, FramebufferAttachment::Depth)
            .unwrap();
        assert_eq!(device.texture_size(depth).unwrap(), (1280, 720));
    }
    let frame = system.hardware_stats().last_frame;
    assert_eq!((frame.canvas_width, frame.canvas_height), (1280, 720));
    assert_eq!(
        device.calls()[0],
        DeviceCall::SetViewport(Viewport {
            x: 0,
            y: 0,
            width: 1280,
            height: 720
        })
    );
}

#[test]
fn collapsed_viewport_keeps_framebuffers_until_restored() {
    let device = headless_device();
    let mut system = render_system(&device, 800, 600);
    let mut camera = camera(800, 600);

    system.set_viewport(0, 0, 0, 0);
    render_empty_frame(&mut system, &mut camera);

    let frame = system.hardware_stats().last_frame;
    assert_eq!((frame.canvas_width, frame.canvas_height), (0, 0));
    assert_eq!(frame.draw_calls, 2);
    let views = system.debug_views();
    assert_eq!(device.framebuffer_size(views.gbuffer).unwrap(), (800, 600));

    system.set_viewport(0, 0, 1280, 720);
    render_empty_frame(&mut system, &mut camera);

    for framebuffer in [views.gbuffer, views.hdr_buffer, views.backbuffer] {
        assert_eq!(device.framebuffer_size(framebuffer).unwrap(), (1280, 720));
    }
    let frame = system.hardware_stats().last_frame;
    assert_eq!((frame.canvas_width, frame.canvas_height), (1280, 720));
}

#[test]
#[should_panic(expected = "Invalid viewport")]
fn negative_viewport_is_rejected() {
    let device = headless_device();
    let mut system = render_system(&device, 800, 600);
    system.set_viewport(0, 0, -1, 600);
}

#[test]
fn unset_material_slots_fall_back_to_the_default_texture() {
    let device = headless_device();
    let mut system = render_system(&device, 800, 600);
    let (_, vertex_array) = triangle_mesh(&device);
    let albedo = hdr_image(&device);
    let material = Material {
        base_color_texture: Some(albedo),
        ..Default::default()
    };
    let default_texture = system.default_resources().texture;

    system.begin_render(&camera(800, 600));
    system.set_mesh_geometry(vertex_array);
    system.set_model_info(&lumen_core::math::Mat4::IDENTITY, true, true);
    system.draw_mesh(&material, PrimitiveTopology::Triangles, 0, 3, None, 1);

    let bound: Vec<_> = system
        .pending_commands()
        .iter()
        .filter_map(|command| match *command {
            Command::BindTexture { unit, texture } => Some((unit, texture)),
            _ => None,
        })
        .collect();
    assert_eq!(
        bound,
        vec![
            (0, albedo),
            (1, default_texture),
            (2, default_texture),
            (3, default_texture),
            (4, default_texture),
        ]
    );
    assert!(system
        .pending_commands()
        .contains(&Command::BindVertexArray(Some(vertex_array))));
}

#[test]
fn double_sided_materials_disable_culling_for_their_draw_only() {
    let device = headless_device();
    let mut system = render_system(&device, 800, 600);
    let (_, vertex_array) = triangle_mesh(&device);
    let material = Material {
        double_sided: true,
        ..Default::default()
    };

    system.begin_render(&camera(800, 600));
    system.set_mesh_geometry(vertex_array);
    system.set_model_info(&lumen_core::math::Mat4::IDENTITY, true, false);
    system.draw_mesh(&material, PrimitiveTopology::Triangles, 0, 3, None, 1);

    let commands = system.pending_commands();
    let draw = commands
        .iter()
        .position(|command| matches!(command, Command::DrawArrays { .. }))
        .unwrap();
    assert_eq!(commands[draw - 1], Command::SetFaceCulling(false));
    assert_eq!(commands[draw + 1], Command::SetFaceCulling(true));
}

#[test]
fn mesh_draws_are_counted() {
    let device = headless_device();
    let mut system = render_system(&device, 800, 600);
    let (_, vertex_array) = triangle_mesh(&device);
    let mut camera = camera(800, 600);

    render_one_mesh(&mut system, &mut camera, vertex_array, &Material::default());

    let frame = system.hardware_stats().last_frame;
    assert_eq!(frame.draw_calls, 3);
    assert_eq!((frame.meshes, frame.primitives, frame.materials), (1, 1, 1));
    assert_eq!(draws(&device.calls()), 3);
}

#[test]
fn adaptive_exposure_follows_the_measured_luminance() {
    let device = headless_device();
    let mut system = render_system(&device, 800, 600);
    let mut camera = camera(800, 600);
    camera.physical.adaptive_exposure = true;
    assert!(device.write_pod(system.luminance_buffer(), LuminanceHistogram::LUMINANCE_OFFSET, &5000.0f32));

    render_empty_frame(&mut system, &mut camera);

    let mut expected = PhysicalCameraSettings {
        adaptive_exposure: true,
        ..Default::default()
    };
    apply_auto_exposure(5000.0, &mut expected);
    assert_eq!(camera.physical, expected);
    assert!((MIN_ISO..=MAX_ISO).contains(&camera.physical.iso));
    assert!((MIN_APERTURE..=MAX_APERTURE).contains(&camera.physical.aperture));
    assert!((MIN_SHUTTER_SPEED..=MAX_SHUTTER_SPEED).contains(&camera.physical.shutter_speed));
    assert_eq!(dispatches(&device.calls()), vec![(50, 38, 1), (1, 1, 1)]);
}

#[test]
fn fixed_exposure_clamps_the_camera_and_skips_the_histogram() {
    let device = headless_device();
    let mut system = render_system(&device, 800, 600);
    let mut camera = camera(800, 600);
    camera.physical.iso = 1.0;

    render_empty_frame(&mut system, &mut camera);

    assert_eq!(camera.physical.iso, MIN_ISO);
    assert!(dispatches(&device.calls()).is_empty());
}

#[test]
fn shader_failure_aborts_creation_without_leaks() {
    let device = headless_device();
    device.fail_shader(shaders::LIGHTING_FRAGMENT);

    let device_handle: Arc<dyn GraphicsDevice> = device.clone();
    let result = DeferredPbrRenderSystem::create(device_handle, 800, 600);

    match result {
        Err(RenderError::ResourceCreation { what, source }) => {
            assert_eq!(what, "lighting pass program");
            assert!(matches!(source, ResourceError::Shader(ShaderError::CompilationError { .. })));
        }
        other => panic!("Unexpected creation result: {other:?}"),
    }
    assert_eq!(device.live_resources().total(), 0);
}

#[test]
fn configure_applies_vsync_and_replaces_steps() {
    let device = headless_device();
    let mut system = render_system(&device, 800, 600);

    let surface = configured(&mut system, &[RenderStep::Ibl, RenderStep::Fxaa]);
    let live = device.live_resources();
    configured(&mut system, &[RenderStep::Ibl, RenderStep::Fxaa]);

    assert!(!surface.vsync());
    assert_eq!(device.live_resources(), live);
    let kinds: Vec<_> = system.steps().iter().map(|step| step.kind()).collect();
    assert_eq!(kinds, vec![RenderStep::Ibl, RenderStep::Fxaa]);

    configured(&mut system, &[]);
    assert!(system.steps().is_empty());
    assert!(system.ibl_step().is_none());
}

#[test]
fn dropping_a_step_forgets_its_cached_bindings() {
    let device = headless_device();
    let mut system = render_system(&device, 800, 600);
    configured(&mut system, &[RenderStep::Ibl]);
    let brdf_lut = system.ibl_step().unwrap().brdf_lut();
    render_empty_frame(&mut system, &mut camera(800, 600));
    assert_eq!(system.command_state().texture(7), Some(brdf_lut));

    configured(&mut system, &[]);
    assert_eq!(system.command_state().texture(7), None);
    assert_eq!(system.command_state().shader_program(), None);

    device.take_calls();
    render_empty_frame(&mut system, &mut camera(800, 600));
    let calls = device.calls();
    let lighting_draw = position(&calls, |call| matches!(call, DeviceCall::DrawArrays { .. }));
    let defaults = *system.default_resources();
    assert_eq!(texture_bound_at(&calls, 7, lighting_draw), Some(defaults.texture));
}

#[test]
fn failing_step_leaves_the_system_without_steps() {
    let device = headless_device();
    let mut system = render_system(&device, 800, 600);
    device.fail_shader(shaders::PREFILTER_SPECULAR_COMPUTE);
    let live = device.live_resources();

    let mut configuration = RenderConfiguration::default();
    configuration.enable_render_step(RenderStep::Ibl);
    let result = system.configure(&configuration, &mut HeadlessSurface::new(800, 600));

    assert!(matches!(result, Err(RenderError::StepInitialization(_))));
    assert!(system.steps().is_empty());
    assert_eq!(device.live_resources(), live);
}

#[test]
fn environment_requests_without_ibl_are_ignored() {
    let device = headless_device();
    let mut system = render_system(&device, 800, 600);
    let hdr = hdr_image(&device);
    let live = device.live_resources();

    system.set_environment_texture(Some(hdr)).unwrap();
    system.set_environment_settings(2.0, 1.0);

    assert_eq!(device.live_resources(), live);
    assert!(device.calls().is_empty());
}

#[test]
fn fxaa_adds_one_full_screen_triangle() {
    let device = headless_device();
    let mut system = render_system(&device, 800, 600);
    configured(&mut system, &[RenderStep::Fxaa]);
    let backbuffer_color = device
        .framebuffer_attachment(system.debug_views().backbuffer, FramebufferAttachment::Color0)
        .unwrap();

    render_empty_frame(&mut system, &mut camera(800, 600));

    let calls = device.calls();
    assert_eq!(system.hardware_stats().last_frame.draw_calls, 3);
    let triangle = position(&calls, |call| {
        matches!(
            call,
            DeviceCall::DrawArrays {
                topology: PrimitiveTopology::Triangles,
                count: 3,
                ..
            }
        )
    });
    assert_eq!(texture_bound_at(&calls, 0, triangle), Some(backbuffer_color));
    assert!(calls[..triangle].contains(&DeviceCall::BindFramebuffer(None)));
}

#[test]
fn the_uniform_ring_is_fenced_between_frames() {
    let device = headless_device();
    let mut system = render_system(&device, 800, 600);
    let mut camera = camera(800, 600);

    render_empty_frame(&mut system, &mut camera);
    render_empty_frame(&mut system, &mut camera);

    let calls = device.calls();
    let inserted = calls
        .iter()
        .filter(|call| matches!(call, DeviceCall::InsertFence(_)))
        .count();
    let waited = calls
        .iter()
        .filter(|call| matches!(call, DeviceCall::WaitFence(_)))
        .count();
    assert_eq!((inserted, waited), (2, 1));
    assert_eq!(device.live_resources().fences, 1);
}

#[test]
#[should_panic(expected = "Uniform buffer size is too small")]
fn overflowing_the_uniform_ring_panics() {
    let device = headless_device();
    let device_handle: Arc<dyn GraphicsDevice> = device.clone();
    let mut system = DeferredPbrRenderSystem::create_with_ring_capacity(device_handle, 64, 64, 256).unwrap();

    system.begin_render(&camera(64, 64));
    system.set_model_info(&lumen_core::math::Mat4::IDENTITY, true, false);
    system.set_model_info(&lumen_core::math::Mat4::IDENTITY, true, false);
}

#[test]
fn destroy_removes_only_the_debug_sink_it_installed() {
    let device = headless_device();
    let mut system = render_system(&device, 64, 64);
    assert_eq!(device.has_debug_callback(), cfg!(debug_assertions));
    system.destroy();
    assert!(!device.has_debug_callback());

    let messages = Arc::new(std::sync::Mutex::new(0usize));
    let sink = Arc::clone(&messages);
    device.set_debug_callback(Some(Box::new(move |_: &DebugMessage| {
        *sink.lock().unwrap() += 1;
    })));
    let mut system = render_system(&device, 64, 64);
    system.destroy();

    assert!(device.has_debug_callback());
    assert!(device.bind_texture(0, TextureId(usize::MAX)).is_err());
    assert_eq!(*messages.lock().unwrap(), 1);
}

#[test]
fn destroy_releases_everything_once() {
    let device = headless_device();
    let mut system = render_system(&device, 800, 600);
    configured(&mut system, &[RenderStep::Ibl, RenderStep::Fxaa]);
    let hdr = hdr_image(&device);
    system.set_environment_texture(Some(hdr)).unwrap();
    render_empty_frame(&mut system, &mut camera(800, 600));

    system.destroy();
    system.destroy();
    drop(system);
    device.destroy_texture(hdr).unwrap();

    assert_eq!(device.live_resources().total(), 0);
}
