use std::collections::VecDeque;
use std::time::Duration;

use glam::Vec3;

use crate::collision;
use crate::entity::EntityId;
use crate::environment::Arena;

#[derive(Debug, Clone, PartialEq)]
pub struct Projectile {
    pub id: EntityId,
    pub position: Vec3,
    pub spawn: Vec3,
    pub target: Vec3,
    pub velocity: Vec3,
    pub created_at: Duration,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Impact {
    Enemy(EntityId),
    World,
    Expired,
}

/// Sphere a projectile can strike this step.
#[derive(Debug, Clone, Copy)]
pub struct HitSphere {
    pub id: EntityId,
    pub center: Vec3,
    pub radius: f32,
}

/// Live projectiles in spawn order. The set never holds more than `max`;
/// spawning into a full set evicts the oldest.
#[derive(Debug, Clone)]
pub struct ProjectileSet {
    items: VecDeque<Projectile>,
    max: usize,
}

impl ProjectileSet {
    pub fn new(max: usize) -> Self {
        Self {
            items: VecDeque::with_capacity(max),
            max: max.max(1),
        }
    }

    pub fn set_max(&mut self, max: usize) {
        self.max = max.max(1);
        while self.items.len() > self.max {
            self.items.pop_front();
        }
    }

    /// Spawns a projectile at `spawn` heading for `target`. Returns the id of
    /// the projectile evicted to make room, if any.
    pub fn spawn(
        &mut self,
        id: EntityId,
        spawn: Vec3,
        target: Vec3,
        speed: f32,
        now: Duration,
    ) -> Option<EntityId> {
        let evicted = if self.items.len() >= self.max {
            self.items.pop_front().map(|p| p.id)
        } else {
            None
        };
        let direction = (target - spawn).try_normalize().unwrap_or(Vec3::NEG_Z);
        self.items.push_back(Projectile {
            id,
            position: spawn,
            spawn,
            target,
            velocity: direction * speed,
            created_at: now,
        });
        evicted
    }

    /// Advances every projectile by `dt` and removes the ones that struck
    /// something or outlived `lifetime`. Each removed projectile is reported
    /// once with what ended it; the nearest surface along the swept segment wins.
    pub fn step(
        &mut self,
        now: Duration,
        dt: f32,
        lifetime: Duration,
        projectile_radius: f32,
        arena: &Arena,
        targets: &[HitSphere],
    ) -> Vec<(EntityId, Impact)> {
        let mut impacts = Vec::new();
        self.items.retain_mut(|p| {
            if now.saturating_sub(p.created_at) >= lifetime {
                impacts.push((p.id, Impact::Expired));
                return false;
            }

            let start = p.position;
            let travel = p.velocity * dt;
            let length = travel.length();
            p.position = start + travel;
            let Some(dir) = travel.try_normalize() else {
                return true;
            };

            let mut nearest: Option<(f32, Impact)> = arena
                .raycast(start, dir, length)
                .map(|t| (t, Impact::World));
            for sphere in targets {
                let reach = sphere.radius + projectile_radius;
                if let Some(t) = collision::ray_sphere(start, dir, sphere.center, reach) {
                    if t <= length && nearest.map_or(true, |(best, _)| t < best) {
                        nearest = Some((t, Impact::Enemy(sphere.id)));
                    }
                }
            }

            match nearest {
                Some((_, impact)) => {
                    impacts.push((p.id, impact));
                    false
                }
                None => true,
            }
        });
        impacts
    }

    pub fn clear(&mut self) {
        self.items.clear();
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Projectile> {
        self.items.iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::entity::EntityIds;

    const DT: f32 = 1.0 / 60.0;
    const LIFETIME: Duration = Duration::from_millis(1500);

    fn eye() -> Vec3 {
        Vec3::new(0.0, 1.7, 0.0)
    }

    #[test]
    fn never_exceeds_cap_and_evicts_oldest() {
        let mut ids = EntityIds::default();
        let mut set = ProjectileSet::new(20);
        let mut spawned = Vec::new();
        for _ in 0..25 {
            let id = ids.allocate();
            spawned.push(id);
            let evicted = set.spawn(id, eye(), eye() + Vec3::NEG_Z, 60.0, Duration::ZERO);
            assert!(set.len() <= 20);
            if spawned.len() > 20 {
                assert_eq!(evicted, Some(spawned[spawned.len() - 21]));
            } else {
                assert_eq!(evicted, None);
            }
        }
        assert_eq!(set.len(), 20);
        assert_eq!(set.iter().next().map(|p| p.id), Some(spawned[5]));
    }

    #[test]
    fn velocity_points_at_target() {
        let mut set = ProjectileSet::new(4);
        set.spawn(EntityId(1), Vec3::ZERO, Vec3::new(3.0, 0.0, 4.0), 60.0, Duration::ZERO);
        let p = set.iter().next().expect("spawned");
        assert!((p.velocity - Vec3::new(36.0, 0.0, 48.0)).length() < 1e-4);
    }

    #[test]
    fn expires_after_lifetime() {
        let arena = Arena::open(10_000.0);
        let mut set = ProjectileSet::new(4);
        set.spawn(EntityId(1), eye(), eye() + Vec3::NEG_Z, 1.0, Duration::ZERO);

        let early = set.step(Duration::from_millis(1499), DT, LIFETIME, 0.1, &arena, &[]);
        assert!(early.is_empty());
        let late = set.step(LIFETIME, DT, LIFETIME, 0.1, &arena, &[]);
        assert_eq!(late, vec![(EntityId(1), Impact::Expired)]);
        assert!(set.is_empty());
    }

    #[test]
    fn fast_projectile_does_not_tunnel_through_enemy() {
        let arena = Arena::open(50.0);
        let mut set = ProjectileSet::new(4);
        set.spawn(EntityId(1), eye(), eye() + Vec3::NEG_Z, 600.0, Duration::ZERO);
        let enemy = HitSphere {
            id: EntityId(99),
            center: Vec3::new(0.0, 1.7, -5.0),
            radius: 0.9,
        };
        // 10 units per step, the sphere is only 1.8 wide.
        let impacts = set.step(Duration::ZERO, DT, LIFETIME, 0.1, &arena, &[enemy]);
        assert_eq!(impacts, vec![(EntityId(1), Impact::Enemy(EntityId(99)))]);
    }

    #[test]
    fn nearest_surface_wins() {
        let arena = Arena::open(50.0);
        let mut set = ProjectileSet::new(4);
        let muzzle = Vec3::new(0.0, 1.0, 0.0);
        set.spawn(EntityId(1), muzzle, muzzle + Vec3::NEG_Z, 600.0, Duration::ZERO);
        let near = HitSphere {
            id: EntityId(2),
            center: Vec3::new(0.0, 1.0, -3.0),
            radius: 0.5,
        };
        let far = HitSphere {
            id: EntityId(3),
            center: Vec3::new(0.0, 1.0, -8.0),
            radius: 0.5,
        };
        let impacts = set.step(Duration::ZERO, DT, LIFETIME, 0.1, &arena, &[far, near]);
        assert_eq!(impacts, vec![(EntityId(1), Impact::Enemy(EntityId(2)))]);
    }

    #[test]
    fn downward_shot_hits_ground() {
        let arena = Arena::open(50.0);
        let mut set = ProjectileSet::new(4);
        set.spawn(EntityId(1), eye(), Vec3::new(0.0, 0.0, -1.0), 60.0, Duration::ZERO);
        let mut impacts = Vec::new();
        for i in 0..30 {
            let now = Duration::from_secs_f32(i as f32 * DT);
            impacts.extend(set.step(now, DT, LIFETIME, 0.1, &arena, &[]));
        }
        assert_eq!(impacts, vec![(EntityId(1), Impact::World)]);
    }
}
