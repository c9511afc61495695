use hf_core::time::TimeState;

#[derive(Debug, Clone, Default)]
pub struct DebugStats {
    pub phase_label: String,
    pub sim_time_secs: f32,
    pub enemies: usize,
    pub projectiles: usize,
    pub powerups: usize,
    pub scheduled_tasks: usize,
    pub vertices: usize,
    pub indices: usize,
    pub audio_status_label: String,
}

pub fn draw_debug_window(ctx: &egui::Context, time: &TimeState, stats: &DebugStats) {
    egui::Window::new("Debug")
        .default_pos([10.0, 120.0])
        .show(ctx, |ui| {
            ui.label(format!("FPS: {:.1}", time.smoothed_fps));
            ui.label(format!("Frame time: {:.2} ms", time.smoothed_frame_time_ms));
            ui.label(format!("Steps this frame: {}", time.steps_this_frame));
            ui.label(format!("Total steps: {}", time.fixed_step_count));
            ui.label(format!("Frame: {}", time.frame_count));

            ui.separator();
            ui.label(format!("Phase: {}", stats.phase_label));
            ui.label(format!("Sim time: {:.2} s", stats.sim_time_secs));
            ui.label(format!("Enemies: {}", stats.enemies));
            ui.label(format!("Projectiles: {}", stats.projectiles));
            ui.label(format!("Power-ups: {}", stats.powerups));
            ui.label(format!("Scheduled tasks: {}", stats.scheduled_tasks));

            ui.separator();
            ui.label(format!(
                "Mesh: {} vertices, {} indices",
                stats.vertices, stats.indices
            ));
            ui.label(&stats.audio_status_label);
        });
}
