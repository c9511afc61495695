use glam::{Mat4, Vec3};

#[repr(C)]
#[derive(Copy, Clone, Debug, bytemuck::Pod, bytemuck::Zeroable)]
pub struct CameraUniform {
    pub view_proj: [[f32; 4]; 4],
    /// xyz = eye position, w = fog density
    pub eye_fog: [f32; 4],
    /// rgb = fog color, a unused
    pub fog_color: [f32; 4],
    /// xyz = direction *towards* the light, w = ambient term
    pub light: [f32; 4],
}

/// First-person perspective camera. Yaw 0 looks down -Z; positive yaw turns
/// right, positive pitch looks up.
pub struct Camera3D {
    pub position: Vec3,
    pub yaw: f32,
    pub pitch: f32,
    pub fov_y_radians: f32,
    pub near: f32,
    pub far: f32,
    pub viewport: (u32, u32),
    pub fog_density: f32,
    pub fog_color: [f32; 3],
}

impl Camera3D {
    pub fn new(viewport_width: u32, viewport_height: u32) -> Self {
        Self {
            position: Vec3::new(0.0, 1.7, 0.0),
            yaw: 0.0,
            pitch: 0.0,
            fov_y_radians: 75f32.to_radians(),
            near: 0.05,
            far: 400.0,
            viewport: (viewport_width, viewport_height),
            fog_density: 0.018,
            fog_color: [0.32, 0.36, 0.40],
        }
    }

    pub fn forward(&self) -> Vec3 {
        let (sin_yaw, cos_yaw) = self.yaw.sin_cos();
        let (sin_pitch, cos_pitch) = self.pitch.sin_cos();
        Vec3::new(sin_yaw * cos_pitch, sin_pitch, -cos_yaw * cos_pitch)
    }

    pub fn aspect(&self) -> f32 {
        let height = self.viewport.1.max(1) as f32;
        self.viewport.0.max(1) as f32 / height
    }

    pub fn view_proj(&self) -> Mat4 {
        let view = Mat4::look_to_rh(self.position, self.forward(), Vec3::Y);
        let proj = Mat4::perspective_rh(self.fov_y_radians, self.aspect(), self.near, self.far);
        proj * view
    }

    pub fn build_uniform(&self) -> CameraUniform {
        let light_dir = Vec3::new(0.4, 1.0, 0.3).normalize();
        CameraUniform {
            view_proj: self.view_proj().to_cols_array_2d(),
            eye_fog: [
                self.position.x,
                self.position.y,
                self.position.z,
                self.fog_density,
            ],
            fog_color: [self.fog_color[0], self.fog_color[1], self.fog_color[2], 1.0],
            light: [light_dir.x, light_dir.y, light_dir.z, 0.35],
        }
    }
}
