use glam::Vec3;

use crate::entity::EntityId;
use crate::powerup::PowerupKind;

/// Something the simulation did during a tick. The audio and UI adapters
/// react to these; the world never calls into them.
#[derive(Debug, Clone, PartialEq)]
pub enum GameEvent {
    Shot { projectile: EntityId },
    Jumped,
    EnemySpawned { enemy: EntityId, wave: u32 },
    EnemyHit { enemy: EntityId },
    EnemyKilled { enemy: EntityId, score: u32 },
    PlayerHurt { damage: f32, from: Vec3 },
    PowerupSpawned { powerup: EntityId, kind: PowerupKind },
    PowerupCollected { powerup: EntityId, kind: PowerupKind },
    WaveStarted { wave: u32, enemies: u32 },
    WaveCleared { wave: u32, bonus: u32 },
    GameOver { score: u32, wave: u32 },
}
