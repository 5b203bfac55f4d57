//! Hydrogen Orbital Volumetric Viewer
//!
//! Ray-marched rendering of hydrogen-like atomic orbitals as a density
//! cloud or isosurface shell.
//!
//! Controls:
//! - Arrow keys: Rotate view
//! - Scroll: Zoom
//! - 1-7: Set principal quantum number n
//! - Sidebar: quantum numbers, orbital mode, quality, opacity

use common::{Camera3D, GraphicsContext};
use orbitals::compositor::CompositingParams;
use orbitals::controls_ui::draw_control_sidebar;
use orbitals::field::{FieldBuilder, FieldRequest};
use orbitals::state::OrbitalConfig;
use orbitals::volume_renderer::VolumeRenderer;
use orbitals::wavefunction::{radial_distribution, radial_plot_range};
use winit::{
    event::{ElementState, Event, KeyEvent, MouseScrollDelta, WindowEvent},
    event_loop::ControlFlow,
    keyboard::{KeyCode, PhysicalKey},
};

/// Sample count of the sidebar's radial probability curve
const RADIAL_SAMPLES: usize = 100;

struct EguiState {
    ctx: egui::Context,
    state: egui_winit::State,
    renderer: egui_wgpu::Renderer,
}

struct App {
    ctx: GraphicsContext,
    renderer: VolumeRenderer,
    camera: Camera3D,
    config: OrbitalConfig,
    builder: FieldBuilder,
    last_request: FieldRequest,
    radial_curve: Vec<(f64, f64)>,
    curve_key: (u32, u32),
    egui: EguiState,
}

impl App {
    fn new(ctx: GraphicsContext) -> Self {
        let renderer = VolumeRenderer::new(&ctx);
        let mut camera = Camera3D::new(ctx.aspect_ratio());
        camera.distance = 14.0;
        camera.update_orbital();

        let config = OrbitalConfig::default();
        let mut builder = FieldBuilder::spawn();
        let last_request = FieldRequest::from_config(&config);
        builder.request(last_request);

        let curve_key = (config.qn.n(), config.qn.l());
        let radial_curve = radial_distribution(
            curve_key.0,
            curve_key.1,
            RADIAL_SAMPLES,
            radial_plot_range(curve_key.0),
        );

        let egui_ctx = egui::Context::default();
        let egui_state = egui_winit::State::new(
            egui_ctx.clone(),
            egui::ViewportId::ROOT,
            &ctx.window,
            Some(ctx.window.scale_factor() as f32),
            None,
        );
        let egui_renderer = egui_wgpu::Renderer::new(
            &ctx.device,
            ctx.config.format,
            None,
            1,
        );

        Self {
            ctx,
            renderer,
            camera,
            config,
            builder,
            last_request,
            radial_curve,
            curve_key,
            egui: EguiState {
                ctx: egui_ctx,
                state: egui_state,
                renderer: egui_renderer,
            },
        }
    }

    fn resize(&mut self, new_size: winit::dpi::PhysicalSize<u32>) {
        self.ctx.resize(new_size);
        self.camera.update_aspect_ratio(self.ctx.aspect_ratio());
    }

    /// Adopt finished fields and schedule rebuilds after config changes.
    fn sync_field(&mut self) {
        if let Some(field) = self.builder.poll() {
            self.renderer.upload_field(&self.ctx, &field);
        }

        let request = FieldRequest::from_config(&self.config);
        if request != self.last_request {
            self.last_request = request;
            self.builder.request(request);
        }

        let curve_key = (self.config.qn.n(), self.config.qn.l());
        if curve_key != self.curve_key {
            self.curve_key = curve_key;
            self.radial_curve = radial_distribution(
                curve_key.0,
                curve_key.1,
                RADIAL_SAMPLES,
                radial_plot_range(curve_key.0),
            );
        }
    }

    fn render(&mut self) -> Result<(), wgpu::SurfaceError> {
        let output = self.ctx.surface.get_current_texture()?;
        let view = output
            .texture
            .create_view(&wgpu::TextureViewDescriptor::default());

        self.renderer.update_camera(&self.ctx.queue, &self.camera);
        let params = CompositingParams::derive(&self.config);
        self.renderer.update_params(&self.ctx.queue, &params);

        // Build egui UI
        let raw_input = self.egui.state.take_egui_input(&self.ctx.window);
        let building = self.builder.pending();
        let full_output = self.egui.ctx.run(raw_input, |ctx| {
            draw_control_sidebar(ctx, &mut self.config, &self.radial_curve);

            egui::TopBottomPanel::top("status").show(ctx, |ui| {
                ui.horizontal(|ui| {
                    ui.label(format!("Orbital: {}", self.config.qn.name()));
                    ui.separator();
                    ui.label(format!(
                        "n={} l={} m={}",
                        self.config.qn.n(),
                        self.config.qn.l(),
                        self.config.qn.m()
                    ));
                    ui.separator();
                    ui.label(format!("Grid: {0}x{0}x{0}", self.last_request.size));
                    if building {
                        ui.separator();
                        ui.label(egui::RichText::new("RESAMPLING").color(egui::Color32::YELLOW));
                    }
                });
            });
        });

        self.sync_field();

        self.egui
            .state
            .handle_platform_output(&self.ctx.window, full_output.platform_output);
        let tris = self
            .egui
            .ctx
            .tessellate(full_output.shapes, full_output.pixels_per_point);
        for (id, image_delta) in &full_output.textures_delta.set {
            self.egui
                .renderer
                .update_texture(&self.ctx.device, &self.ctx.queue, *id, image_delta);
        }

        let screen_descriptor = egui_wgpu::ScreenDescriptor {
            size_in_pixels: [self.ctx.size.width, self.ctx.size.height],
            pixels_per_point: full_output.pixels_per_point,
        };

        let mut encoder = self
            .ctx
            .device
            .create_command_encoder(&wgpu::CommandEncoderDescriptor {
                label: Some("Render Encoder"),
            });

        self.renderer.render(&mut encoder, &view, true);

        self.egui.renderer.update_buffers(
            &self.ctx.device,
            &self.ctx.queue,
            &mut encoder,
            &tris,
            &screen_descriptor,
        );
        {
            let mut render_pass = encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
                label: Some("Egui Render Pass"),
                color_attachments: &[Some(wgpu::RenderPassColorAttachment {
                    view: &view,
                    resolve_target: None,
                    ops: wgpu::Operations {
                        load: wgpu::LoadOp::Load,
                        store: wgpu::StoreOp::Store,
                    },
                })],
                depth_stencil_attachment: None,
                timestamp_writes: None,
                occlusion_query_set: None,
            });
            self.egui
                .renderer
                .render(&mut render_pass, &tris, &screen_descriptor);
        }

        for id in &full_output.textures_delta.free {
            self.egui.renderer.free_texture(id);
        }

        self.ctx.queue.submit(std::iter::once(encoder.finish()));
        output.present();

        Ok(())
    }

    fn handle_key(&mut self, key: KeyCode, state: ElementState) {
        if state != ElementState::Pressed {
            return;
        }

        match key {
            KeyCode::Digit1 => self.config.qn = self.config.qn.with_n(1),
            KeyCode::Digit2 => self.config.qn = self.config.qn.with_n(2),
            KeyCode::Digit3 => self.config.qn = self.config.qn.with_n(3),
            KeyCode::Digit4 => self.config.qn = self.config.qn.with_n(4),
            KeyCode::Digit5 => self.config.qn = self.config.qn.with_n(5),
            KeyCode::Digit6 => self.config.qn = self.config.qn.with_n(6),
            KeyCode::Digit7 => self.config.qn = self.config.qn.with_n(7),
            KeyCode::ArrowLeft => self.camera.orbit(-0.1, 0.0),
            KeyCode::ArrowRight => self.camera.orbit(0.1, 0.0),
            KeyCode::ArrowUp => self.camera.orbit(0.0, 0.1),
            KeyCode::ArrowDown => self.camera.orbit(0.0, -0.1),
            _ => {}
        }
    }

    fn handle_scroll(&mut self, delta: f32) {
        self.camera.zoom(delta);
    }

    fn handle_window_event(&mut self, event: &WindowEvent) -> bool {
        self.egui.state.on_window_event(&self.ctx.window, event).consumed
    }
}

fn main() {
    let (ctx, event_loop) = pollster::block_on(GraphicsContext::new(
        "Hydrogen Orbitals - Volumetric Viewer",
        1280,
        720,
    ));

    let mut app = App::new(ctx);

    event_loop
        .run(move |event, elwt| {
            elwt.set_control_flow(ControlFlow::Poll);

            match event {
                Event::WindowEvent { ref event, .. } => {
                    let consumed = app.handle_window_event(event);

                    if !consumed {
                        match event {
                            WindowEvent::CloseRequested => elwt.exit(),
                            WindowEvent::Resized(size) => app.resize(*size),
                            WindowEvent::KeyboardInput {
                                event:
                                    KeyEvent {
                                        physical_key: PhysicalKey::Code(key),
                                        state,
                                        ..
                                    },
                                ..
                            } => app.handle_key(*key, *state),
                            WindowEvent::MouseWheel { delta, .. } => {
                                let scroll = match delta {
                                    MouseScrollDelta::LineDelta(_, y) => *y,
                                    MouseScrollDelta::PixelDelta(pos) => pos.y as f32 / 100.0,
                                };
                                app.handle_scroll(scroll);
                            }
                            WindowEvent::RedrawRequested => {
                                match app.render() {
                                    Ok(_) => {}
                                    Err(wgpu::SurfaceError::Lost) => app.resize(app.ctx.size),
                                    Err(wgpu::SurfaceError::OutOfMemory) => elwt.exit(),
                                    Err(e) => eprintln!("Render error: {:?}", e),
                                }
                            }
                            _ => {}
                        }
                    }
                }
                Event::AboutToWait => {
                    app.ctx.window.request_redraw();
                }
                _ => {}
            }
        })
        .expect("Event loop error");
}
