use std::time::Duration;

use glam::{Vec2, Vec3};
use hf_core::input::{InputState, Key, MouseBtn};

use crate::collision::move_and_collide;
use crate::config::{PlayerConfig, StaminaConfig};
use crate::environment::Arena;

/// Muzzle offset from the eye in view space: right, down, forward.
const MUZZLE_OFFSET: Vec3 = Vec3::new(0.25, -0.2, 0.5);

/// What the player wants to do this fixed step.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct PlayerIntent {
    pub forward: bool,
    pub back: bool,
    pub left: bool,
    pub right: bool,
    pub run: bool,
    /// Edge-triggered: true only on the step that consumed the press.
    pub jump: bool,
    /// Level-triggered: holding fires at the weapon's cooldown rate.
    pub fire: bool,
    /// Radians; x turns right, y looks up.
    pub look: Vec2,
}

impl PlayerIntent {
    /// Reads movement keys and fire state from `input`. Mouse look is taken
    /// separately because the accumulated delta belongs to a single step.
    pub fn from_input(input: &InputState) -> Self {
        Self {
            forward: input.is_held(Key::W) || input.is_held(Key::Up),
            back: input.is_held(Key::S) || input.is_held(Key::Down),
            left: input.is_held(Key::A) || input.is_held(Key::Left),
            right: input.is_held(Key::D) || input.is_held(Key::Right),
            run: input.is_held(Key::Shift),
            jump: input.is_just_pressed(Key::Space),
            fire: input.is_mouse_held(MouseBtn::Left),
            look: Vec2::ZERO,
        }
    }

    /// Converts a raw pointer delta (pixels, y down) into look radians.
    pub fn with_mouse_delta(mut self, delta: Vec2, sensitivity: f32) -> Self {
        self.look = Vec2::new(delta.x * sensitivity, -delta.y * sensitivity);
        self
    }

    /// Local move direction: x right, y forward. Not normalized.
    fn move_axes(&self) -> Vec2 {
        let axis = |pos: bool, neg: bool| (pos as i8 - neg as i8) as f32;
        Vec2::new(axis(self.right, self.left), axis(self.forward, self.back))
    }
}

/// Bounded counter gating the run action.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Stamina {
    current: f32,
    max: f32,
}

impl Stamina {
    pub fn new(max: f32) -> Self {
        Self { current: max, max }
    }

    pub fn current(&self) -> f32 {
        self.current
    }

    pub fn max(&self) -> f32 {
        self.max
    }

    pub fn fraction(&self) -> f32 {
        self.current / self.max
    }

    pub fn is_full(&self) -> bool {
        self.current >= self.max
    }

    pub fn is_empty(&self) -> bool {
        self.current <= 0.0
    }

    pub fn drain(&mut self, amount: f32) {
        self.current = (self.current - amount).clamp(0.0, self.max);
    }

    pub fn restore(&mut self, amount: f32) {
        self.current = (self.current + amount).clamp(0.0, self.max);
    }
}

/// Things that happened to the player during one step.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct PlayerStep {
    pub jumped: bool,
    pub running: bool,
}

#[derive(Debug, Clone)]
pub struct Player {
    /// Feet position; y is height above the ground.
    pub position: Vec3,
    pub yaw: f32,
    pub pitch: f32,
    pub vertical_velocity: f32,
    pub grounded: bool,
    pub health: f32,
    pub max_health: f32,
    pub stamina: Stamina,
    pub last_shot: Option<Duration>,
    eye_height: f32,
}

impl Player {
    pub fn new(config: &PlayerConfig, stamina: &StaminaConfig) -> Self {
        Self {
            position: Vec3::ZERO,
            yaw: 0.0,
            pitch: 0.0,
            vertical_velocity: 0.0,
            grounded: true,
            health: config.max_health,
            max_health: config.max_health,
            stamina: Stamina::new(stamina.max),
            last_shot: None,
            eye_height: config.eye_height,
        }
    }

    pub fn step(
        &mut self,
        intent: &PlayerIntent,
        config: &PlayerConfig,
        stamina: &StaminaConfig,
        arena: &Arena,
        dt: f32,
    ) -> PlayerStep {
        let mut result = PlayerStep::default();
        self.eye_height = config.eye_height;

        self.yaw = wrap_angle(self.yaw + intent.look.x);
        self.pitch = (self.pitch + intent.look.y).clamp(-config.max_pitch, config.max_pitch);

        let axes = intent.move_axes();
        let moving = axes != Vec2::ZERO;
        result.running = intent.run && moving && !self.stamina.is_empty();
        if result.running {
            self.stamina.drain(stamina.drain_per_sec * dt);
        } else {
            self.stamina.restore(stamina.regen_per_sec * dt);
        }

        if moving {
            let speed = if result.running {
                config.walk_speed * config.run_multiplier
            } else {
                config.walk_speed
            };
            let axes = axes.normalize();
            let world = self.flat_right() * axes.x + self.flat_forward() * axes.y;
            let delta = world * speed * dt;
            self.position = move_and_collide(arena, self.position, config.radius, delta.x, delta.z);
        }

        if intent.jump && self.grounded {
            self.vertical_velocity = config.jump_speed;
            self.grounded = false;
            result.jumped = true;
        }
        if !self.grounded {
            self.vertical_velocity -= config.gravity * dt;
            self.position.y += self.vertical_velocity * dt;
            if self.position.y <= 0.0 {
                self.position.y = 0.0;
                self.vertical_velocity = 0.0;
                self.grounded = true;
            }
        }

        result
    }

    pub fn eye(&self) -> Vec3 {
        self.position + Vec3::Y * self.eye_height
    }

    /// Unit view direction, matching the camera's forward vector.
    pub fn view_dir(&self) -> Vec3 {
        let (sy, cy) = self.yaw.sin_cos();
        let (sp, cp) = self.pitch.sin_cos();
        Vec3::new(sy * cp, sp, -cy * cp)
    }

    pub fn flat_forward(&self) -> Vec3 {
        let (sy, cy) = self.yaw.sin_cos();
        Vec3::new(sy, 0.0, -cy)
    }

    pub fn flat_right(&self) -> Vec3 {
        let (sy, cy) = self.yaw.sin_cos();
        Vec3::new(cy, 0.0, sy)
    }

    pub fn muzzle(&self) -> Vec3 {
        let forward = self.view_dir();
        let right = self.flat_right();
        let up = right.cross(forward).normalize_or_zero();
        self.eye() + right * MUZZLE_OFFSET.x + up * MUZZLE_OFFSET.y + forward * MUZZLE_OFFSET.z
    }

    pub fn can_fire(&self, now: Duration, cooldown: Duration) -> bool {
        self.last_shot
            .map_or(true, |last| now.saturating_sub(last) >= cooldown)
    }

    /// Applies damage and returns true when this hit was fatal.
    pub fn take_damage(&mut self, amount: f32) -> bool {
        self.health = (self.health - amount).max(0.0);
        self.is_dead()
    }

    pub fn is_dead(&self) -> bool {
        self.health <= 0.0
    }

    pub fn health_is_full(&self) -> bool {
        self.health >= self.max_health
    }

    pub fn heal_full(&mut self) {
        self.health = self.max_health;
    }
}

fn wrap_angle(angle: f32) -> f32 {
    use std::f32::consts::{PI, TAU};
    (angle + PI).rem_euclid(TAU) - PI
}
