//! Hollowfield -- main loop and application entry point.
//!
//! Architecture: winit drives the event loop via `ApplicationHandler`. All simulation
//! runs inside `RedrawRequested` using a **fixed-timestep** model (see `TimeState`):
//!
//!   1. `begin_frame()` -- measure wall-clock delta, feed accumulator
//!   2. `while should_step()` -- one `World::tick` per fixed slice; the events it
//!      returns feed the HUD overlays and the audio mixer
//!   3. Rebuild the box mesh from the world and point the camera at the player's eye
//!   4. Upload camera uniform, draw the scene with depth, composite the egui overlay
//!
//! Menu buttons come back from the UI as `UiActions` and are applied here; the UI
//! never touches the world itself.
//!
//! Hot reload: the tuning JSON is watched via mtime polling (or R) and applied at
//! frame boundaries. An invalid file keeps the previous config.

mod audio;
mod collision;
mod config;
mod enemy;
mod entity;
mod environment;
mod events;
mod feedback;
mod player;
mod powerup;
mod projectile;
#[cfg(test)]
mod replay;
mod scene_mesh;
mod scheduler;
mod wave;
mod world;

use std::path::{Path, PathBuf};
use std::sync::Arc;

use wgpu::util::DeviceExt;
use winit::application::ApplicationHandler;
use winit::event::{DeviceEvent, DeviceId, ElementState, MouseButton, WindowEvent};
use winit::event_loop::{ActiveEventLoop, ControlFlow, EventLoop};
use winit::keyboard::{KeyCode, PhysicalKey};
use winit::window::{Window, WindowId};

use audio::{AudioManager, Listener};
use config::{load_config_from_path, load_config_or_default, FileWatcher, GameConfig};
use feedback::Feedback;
use hf_core::input::{InputState, Key, MouseBtn};
use hf_core::time::TimeState;
use hf_platform::window::{capture_cursor, release_cursor, PlatformConfig};
use hf_render::{Camera3D, GpuContext, MeshBuilder, MeshPipeline, MeshVertex};
use hf_ui::{DebugStats, UiActions, UiOverlay};
use player::PlayerIntent;
use world::{GamePhase, World};

const CONFIG_PATH: &str = "assets/config/game.json";
const AUDIO_DIR: &str = "assets/audio";

/// All mutable engine state lives here. Constructed lazily in `ApplicationHandler::resumed`
/// once the window and GPU surface are available.
struct EngineState {
    window: Arc<Window>,
    gpu: GpuContext,
    time: TimeState,
    input: InputState,
    camera: Camera3D,
    mesh_pipeline: MeshPipeline,
    overlay: UiOverlay,

    world: World,
    feedback: Feedback,
    audio: AudioManager,
    config_watcher: FileWatcher,
    cursor_captured: bool,

    // --- Per-frame GPU mesh state -----------------------------------------------
    // The box mesh is rebuilt on the CPU each frame, then streamed into these
    // GPU buffers. Buffers grow (power-of-two) but never shrink.
    mesh: MeshBuilder,
    vertex_buffer: wgpu::Buffer,
    index_buffer: wgpu::Buffer,
    camera_buffer: wgpu::Buffer,
    camera_bind_group: wgpu::BindGroup,
    mesh_vertex_capacity: usize,
    mesh_index_capacity: usize,
}

impl EngineState {
    fn new(window: Arc<Window>) -> Self {
        let gpu = GpuContext::new(window.clone());
        let mesh_pipeline = MeshPipeline::new(&gpu.device, gpu.surface_format);
        let overlay = UiOverlay::new(&gpu.device, gpu.surface_format, &window);

        let config_path = PathBuf::from(CONFIG_PATH);
        let config = load_config_or_default(&config_path).unwrap_or_else(|err| {
            log::error!("{err}; starting with default tuning");
            GameConfig::default()
        });
        let world = World::new(config);
        let audio = AudioManager::new(Path::new(AUDIO_DIR));

        let camera = Camera3D::new(gpu.size.0, gpu.size.1);
        let camera_buffer = gpu
            .device
            .create_buffer_init(&wgpu::util::BufferInitDescriptor {
                label: Some("Camera Uniform Buffer"),
                contents: bytemuck::cast_slice(&[camera.build_uniform()]),
                usage: wgpu::BufferUsages::UNIFORM | wgpu::BufferUsages::COPY_DST,
            });
        let camera_bind_group = mesh_pipeline.create_camera_bind_group(&gpu.device, &camera_buffer);
        let vertex_buffer = create_vertex_buffer(&gpu.device, 1);
        let index_buffer = create_index_buffer(&gpu.device, 1);

        let mut state = Self {
            window,
            gpu,
            time: TimeState::new(),
            input: InputState::new(),
            camera,
            mesh_pipeline,
            overlay,
            world,
            feedback: Feedback::new(),
            audio,
            config_watcher: FileWatcher::new(config_path),
            cursor_captured: false,
            mesh: MeshBuilder::with_capacity(256),
            vertex_buffer,
            index_buffer,
            camera_buffer,
            camera_bind_group,
            mesh_vertex_capacity: 0,
            mesh_index_capacity: 0,
        };
        state.rebuild_scene_mesh();
        state
    }

    fn reload_config(&mut self, reason: &str) {
        match load_config_from_path(self.config_watcher.path()) {
            Ok(config) => {
                self.world.reload_config(config);
                log::info!("Config reloaded ({reason})");
            }
            Err(err) => {
                log::error!("Config reload failed ({reason}): {err}");
            }
        }
    }

    fn start_game(&mut self) {
        self.world.start_game();
        self.feedback.clear();
        self.audio.stop_music();
        self.audio.start_music();
        self.time.discard_accumulated();
        self.set_cursor_captured(true);
    }

    fn quit_to_title(&mut self) {
        self.world.quit_to_title();
        self.feedback.clear();
        self.audio.stop_music();
        self.set_cursor_captured(false);
    }

    fn toggle_pause(&mut self) {
        match self.world.toggle_pause() {
            GamePhase::Paused => {
                log::info!("Game paused");
                self.set_cursor_captured(false);
            }
            GamePhase::Playing => {
                log::info!("Game resumed");
                self.time.discard_accumulated();
                self.set_cursor_captured(true);
            }
            _ => {}
        }
    }

    fn game_in_progress(&self) -> bool {
        matches!(self.world.phase(), GamePhase::Playing | GamePhase::Paused)
    }

    fn apply_ui_actions(&mut self, actions: UiActions) {
        if actions.start || actions.restart {
            self.start_game();
        }
        if actions.resume && self.world.phase() == GamePhase::Paused {
            self.toggle_pause();
        }
        if actions.quit_to_title {
            self.quit_to_title();
        }
        if actions.toggle_sound {
            self.audio.toggle_sound();
        }
        if actions.toggle_music {
            let in_progress = self.game_in_progress();
            self.audio.toggle_music(in_progress);
        }
    }

    /// Menu keys, read once per frame on the first fixed step.
    fn handle_menu_keys(&mut self) {
        if self.input.is_just_pressed(Key::F3) {
            self.overlay.toggle_debug();
        }
        if self.input.is_just_pressed(Key::M) {
            let in_progress = self.game_in_progress();
            self.audio.toggle_music(in_progress);
        }
        if self.input.is_just_pressed(Key::N) {
            self.audio.toggle_sound();
        }
        if self.input.is_just_pressed(Key::R) {
            self.reload_config("manual trigger (R)");
        } else if self.config_watcher.should_reload() {
            self.reload_config("file watcher");
        }

        let pause_pressed =
            self.input.is_just_pressed(Key::Escape) || self.input.is_just_pressed(Key::P);
        match self.world.phase() {
            GamePhase::Playing | GamePhase::Paused if pause_pressed => self.toggle_pause(),
            GamePhase::Title | GamePhase::GameOver if self.input.is_just_pressed(Key::Enter) => {
                self.start_game();
            }
            _ => {}
        }
    }

    fn set_cursor_captured(&mut self, captured: bool) {
        if captured == self.cursor_captured {
            return;
        }
        if captured {
            capture_cursor(&self.window);
        } else {
            release_cursor(&self.window);
        }
        self.cursor_captured = captured;
    }

    fn listener(&self) -> Listener {
        Listener {
            position: self.world.player.position,
            yaw: self.world.player.yaw,
        }
    }

    fn rebuild_scene_mesh(&mut self) {
        scene_mesh::build_scene(&mut self.mesh, &self.world);
        let vertex_count = self.mesh.vertices().len();
        let index_count = self.mesh.indices().len();
        self.ensure_mesh_capacity(vertex_count, index_count);

        if vertex_count > 0 {
            self.gpu.queue.write_buffer(
                &self.vertex_buffer,
                0,
                bytemuck::cast_slice(self.mesh.vertices()),
            );
        }
        if index_count > 0 {
            self.gpu.queue.write_buffer(
                &self.index_buffer,
                0,
                bytemuck::cast_slice(self.mesh.indices()),
            );
        }
    }

    fn ensure_mesh_capacity(&mut self, vertex_count: usize, index_count: usize) {
        let needed_vertices = vertex_count.max(1);
        if needed_vertices > self.mesh_vertex_capacity {
            self.mesh_vertex_capacity = needed_vertices.next_power_of_two();
            self.vertex_buffer = create_vertex_buffer(&self.gpu.device, self.mesh_vertex_capacity);
        }

        let needed_indices = index_count.max(1);
        if needed_indices > self.mesh_index_capacity {
            self.mesh_index_capacity = needed_indices.next_power_of_two();
            self.index_buffer = create_index_buffer(&self.gpu.device, self.mesh_index_capacity);
        }
    }

    fn debug_stats(&self) -> DebugStats {
        DebugStats {
            phase_label: format!("{:?}", self.world.phase()),
            sim_time_secs: self.world.clock().as_secs_f32(),
            enemies: self.world.enemies.len(),
            projectiles: self.world.projectiles.len(),
            powerups: self.world.powerups.len(),
            scheduled_tasks: self.world.scheduled_tasks(),
            vertices: self.mesh.vertices().len(),
            indices: self.mesh.indices().len(),
            audio_status_label: self.audio.status_label(),
        }
    }

    fn update_camera(&mut self) {
        let player = &self.world.player;
        self.camera.position = player.eye();
        self.camera.yaw = player.yaw;
        self.camera.pitch = player.pitch;
        let camera_uniform = self.camera.build_uniform();
        self.gpu
            .queue
            .write_buffer(&self.camera_buffer, 0, bytemuck::cast_slice(&[camera_uniform]));
    }

    fn redraw(&mut self) {
        if self.gpu.size.0 == 0 || self.gpu.size.1 == 0 {
            return;
        }

        // Fixed-step simulation phase.
        self.time.begin_frame();
        while self.time.should_step() {
            if self.time.steps_this_frame == 1 {
                self.handle_menu_keys();
            }

            let mut intent = PlayerIntent::from_input(&self.input);
            if self.time.steps_this_frame == 1 {
                let delta = self.input.take_mouse_delta();
                let sensitivity = self.world.config().player.mouse_sensitivity;
                intent = intent.with_mouse_delta(delta, sensitivity);
            }

            let events = self.world.tick(&intent);
            let now = self.world.clock();
            for event in &events {
                self.feedback.on_event(event, now);
            }
            let listener = self.listener();
            self.audio.handle_events(&events, listener);
        }
        self.time.end_frame();

        if self.world.phase() != GamePhase::Playing {
            self.set_cursor_captured(false);
        }

        self.rebuild_scene_mesh();
        self.update_camera();

        let Some((output, view)) = self.gpu.begin_frame() else {
            return;
        };

        let hud = self.feedback.snapshot(
            &self.world,
            self.audio.sound_enabled(),
            self.audio.music_enabled(),
        );
        let stats = self.debug_stats();
        let (egui_primitives, egui_textures_delta, ui_actions) =
            self.overlay.prepare(&self.window, &self.time, &hud, &stats);

        let screen_descriptor = egui_wgpu::ScreenDescriptor {
            size_in_pixels: [self.gpu.size.0, self.gpu.size.1],
            pixels_per_point: self.window.scale_factor() as f32,
        };

        let mut encoder = self
            .gpu
            .device
            .create_command_encoder(&wgpu::CommandEncoderDescriptor {
                label: Some("Render Encoder"),
            });

        {
            let fog = self.camera.fog_color;
            let mut render_pass = encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
                label: Some("Scene Render Pass"),
                color_attachments: &[Some(wgpu::RenderPassColorAttachment {
                    view: &view,
                    resolve_target: None,
                    ops: wgpu::Operations {
                        load: wgpu::LoadOp::Clear(wgpu::Color {
                            r: fog[0] as f64,
                            g: fog[1] as f64,
                            b: fog[2] as f64,
                            a: 1.0,
                        }),
                        store: wgpu::StoreOp::Store,
                    },
                })],
                depth_stencil_attachment: Some(wgpu::RenderPassDepthStencilAttachment {
                    view: &self.gpu.depth_view,
                    depth_ops: Some(wgpu::Operations {
                        load: wgpu::LoadOp::Clear(1.0),
                        store: wgpu::StoreOp::Store,
                    }),
                    stencil_ops: None,
                }),
                ..Default::default()
            });

            let index_count = self.mesh.indices().len() as u32;
            if index_count > 0 {
                render_pass.set_pipeline(&self.mesh_pipeline.render_pipeline);
                render_pass.set_bind_group(0, &self.camera_bind_group, &[]);
                render_pass.set_vertex_buffer(0, self.vertex_buffer.slice(..));
                render_pass
                    .set_index_buffer(self.index_buffer.slice(..), wgpu::IndexFormat::Uint32);
                render_pass.draw_indexed(0..index_count, 0, 0..1);
            }
        }

        self.overlay.upload(
            &self.gpu.device,
            &self.gpu.queue,
            &mut encoder,
            &egui_primitives,
            &egui_textures_delta,
            &screen_descriptor,
        );

        {
            let mut egui_pass = encoder
                .begin_render_pass(&wgpu::RenderPassDescriptor {
                    label: Some("egui Render Pass"),
                    color_attachments: &[Some(wgpu::RenderPassColorAttachment {
                        view: &view,
                        resolve_target: None,
                        ops: wgpu::Operations {
                            load: wgpu::LoadOp::Load,
                            store: wgpu::StoreOp::Store,
                        },
                    })],
                    depth_stencil_attachment: None,
                    ..Default::default()
                })
                .forget_lifetime();

            self.overlay
                .paint(&mut egui_pass, &egui_primitives, &screen_descriptor);
        }

        self.overlay.cleanup(&egui_textures_delta);

        self.gpu.queue.submit(std::iter::once(encoder.finish()));
        output.present();

        if ui_actions.any() {
            self.apply_ui_actions(ui_actions);
        }
        self.audio.pump();

        // Only clear edge-triggered input (just_pressed / just_released)
        // after at least one fixed step consumed it. Otherwise a press
        // that lands on a frame with 0 simulation steps is silently lost.
        if self.time.steps_this_frame > 0 {
            self.input.end_frame();
        }
    }
}

struct App {
    config: PlatformConfig,
    state: Option<EngineState>,
}

impl App {
    fn new() -> Self {
        Self {
            config: PlatformConfig::default(),
            state: None,
        }
    }
}

impl ApplicationHandler for App {
    fn resumed(&mut self, event_loop: &ActiveEventLoop) {
        if self.state.is_some() {
            return;
        }
        let window = hf_platform::window::create_window(event_loop, &self.config);
        log::info!(
            "Window created: {}x{}",
            self.config.width,
            self.config.height
        );
        self.state = Some(EngineState::new(window));
    }

    fn about_to_wait(&mut self, _event_loop: &ActiveEventLoop) {
        if let Some(state) = &self.state {
            state.window.request_redraw();
        }
    }

    fn device_event(
        &mut self,
        _event_loop: &ActiveEventLoop,
        _device_id: DeviceId,
        event: DeviceEvent,
    ) {
        let Some(state) = self.state.as_mut() else {
            return;
        };
        if let DeviceEvent::MouseMotion { delta } = event {
            if state.cursor_captured {
                state.input.add_mouse_motion(delta.0, delta.1);
            }
        }
    }

    fn window_event(
        &mut self,
        event_loop: &ActiveEventLoop,
        _window_id: WindowId,
        event: WindowEvent,
    ) {
        let state = match self.state.as_mut() {
            Some(s) => s,
            None => return,
        };

        // egui only gets first claim on input while a menu screen is up.
        let egui_consumed = state
            .overlay
            .handle_window_event(&state.window, &event)
            && state.world.phase() != GamePhase::Playing;

        match event {
            WindowEvent::CloseRequested => {
                log::info!("Close requested, exiting.");
                event_loop.exit();
            }

            WindowEvent::Resized(physical_size) => {
                let w = physical_size.width;
                let h = physical_size.height;
                if w > 0 && h > 0 {
                    state.gpu.resize(w, h);
                    state.camera.viewport = (w, h);
                    log::info!("Resized to {}x{}", w, h);
                }
            }

            WindowEvent::Focused(false) => {
                state.input.release_all();
                if state.world.phase() == GamePhase::Playing {
                    state.toggle_pause();
                }
            }

            WindowEvent::KeyboardInput { event, .. } if !egui_consumed => {
                if let PhysicalKey::Code(key_code) = event.physical_key {
                    if let Some(game_key) = map_key(key_code) {
                        match event.state {
                            ElementState::Pressed => state.input.key_down(game_key),
                            ElementState::Released => state.input.key_up(game_key),
                        }
                    }
                }
            }

            WindowEvent::MouseInput {
                state: button_state,
                button,
                ..
            } if !egui_consumed => {
                let Some(btn) = map_mouse_button(button) else {
                    return;
                };
                match button_state {
                    ElementState::Pressed => {
                        // Clicking back into a running game re-grabs the pointer.
                        if state.world.phase() == GamePhase::Playing && !state.cursor_captured {
                            state.set_cursor_captured(true);
                        }
                        state.input.mouse_down(btn);
                    }
                    ElementState::Released => state.input.mouse_up(btn),
                }
            }

            WindowEvent::CursorMoved { position, .. } => {
                state.input.mouse_position = (position.x, position.y);
            }

            WindowEvent::RedrawRequested => state.redraw(),

            _ => {}
        }
    }
}

fn create_vertex_buffer(device: &wgpu::Device, vertex_capacity: usize) -> wgpu::Buffer {
    let byte_len = (vertex_capacity * std::mem::size_of::<MeshVertex>()).max(1) as u64;
    device.create_buffer(&wgpu::BufferDescriptor {
        label: Some("Scene Vertex Buffer"),
        size: byte_len,
        usage: wgpu::BufferUsages::VERTEX | wgpu::BufferUsages::COPY_DST,
        mapped_at_creation: false,
    })
}

fn create_index_buffer(device: &wgpu::Device, index_capacity: usize) -> wgpu::Buffer {
    let byte_len = (index_capacity * std::mem::size_of::<u32>()).max(1) as u64;
    device.create_buffer(&wgpu::BufferDescriptor {
        label: Some("Scene Index Buffer"),
        size: byte_len,
        usage: wgpu::BufferUsages::INDEX | wgpu::BufferUsages::COPY_DST,
        mapped_at_creation: false,
    })
}

fn map_key(key_code: KeyCode) -> Option<Key> {
    match key_code {
        KeyCode::ArrowLeft => Some(Key::Left),
        KeyCode::ArrowRight => Some(Key::Right),
        KeyCode::ArrowUp => Some(Key::Up),
        KeyCode::ArrowDown => Some(Key::Down),
        KeyCode::Escape => Some(Key::Escape),
        KeyCode::Space => Some(Key::Space),
        KeyCode::ShiftLeft | KeyCode::ShiftRight => Some(Key::Shift),
        KeyCode::Enter | KeyCode::NumpadEnter => Some(Key::Enter),
        KeyCode::F3 => Some(Key::F3),
        KeyCode::KeyW => Some(Key::W),
        KeyCode::KeyA => Some(Key::A),
        KeyCode::KeyS => Some(Key::S),
        KeyCode::KeyD => Some(Key::D),
        KeyCode::KeyM => Some(Key::M),
        KeyCode::KeyN => Some(Key::N),
        KeyCode::KeyP => Some(Key::P),
        KeyCode::KeyR => Some(Key::R),
        _ => None,
    }
}

fn map_mouse_button(button: MouseButton) -> Option<MouseBtn> {
    match button {
        MouseButton::Left => Some(MouseBtn::Left),
        MouseButton::Right => Some(MouseBtn::Right),
        MouseButton::Middle => Some(MouseBtn::Middle),
        _ => None,
    }
}

fn main() {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    log::info!("Hollowfield starting...");

    let event_loop = EventLoop::new().expect("Failed to create event loop");
    event_loop.set_control_flow(ControlFlow::Poll);

    let mut app = App::new();
    event_loop.run_app(&mut app).expect("Event loop error");
}
