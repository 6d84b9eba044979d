//! Fixed-step scheduler tying the player, the zombies and their collaborators
//! together.
//!
//! Each tick runs in a fixed order:
//! 1. sounds published last tick are flushed to every zombie,
//! 2. the player moves, rolls, reloads and shoots,
//! 3. zombies decide and step along their paths,
//! 4. tracers advance, colliders follow their agents and deaths are signalled.

use engine_core::{Damageable, Transform, Vec3};
use hecs::{Entity, World};
use input::PlayerInput;
use navigation::{NavAgent, NavMesh};
use physics::{ColliderHandle, PhysicsQuery};
use rand::rngs::StdRng;
use rand::SeedableRng;

use crate::config::{ConfigError, GameConfig};
use crate::effects::Tracers;
use crate::perception::SoundBus;
use crate::player::{PlayerContext, PlayerController};
use crate::presentation::{params, AgentId, Presentation};
use crate::spawner::{EnemySpawner, ZombieBundle};
use crate::weapon::Shot;
use crate::zombie::{broadcast_sounds, update_zombies, AgentCollider, Zombie, ZombieContext, ZombieState};

/// Outside services the simulation calls into every tick.
pub struct Collaborators<'a> {
    pub physics: &'a mut dyn PhysicsQuery,
    pub nav: &'a dyn NavMesh,
    pub presentation: &'a mut dyn Presentation,
}

/// Running totals for logs and the demo summary.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SimStats {
    pub shots_fired: u32,
    pub shots_hit: u32,
    pub zombies_killed: u32,
    pub sounds_broadcast: u32,
}

pub struct Simulation {
    pub config: GameConfig,
    pub player: PlayerController,
    /// Zombies: `Transform`, `Zombie`, `NavAgent`, `AgentCollider`.
    pub world: World,
    pub spawner: EnemySpawner,
    pub sounds: SoundBus,
    pub tracers: Tracers,
    pub stats: SimStats,
    rng: StdRng,
    now: f32,
    tick_count: u64,
}

impl Simulation {
    pub fn new(config: GameConfig) -> Result<Self, ConfigError> {
        config.validate()?;
        let player = PlayerController::new(
            config.world.player_spawn,
            0.0,
            config.player.clone(),
            config.weapon.clone(),
        );
        log::info!(
            "Simulation ready: seed {:#x}, {} spawn points, village '{}'",
            config.sim.seed,
            config.world.spawn_points.len(),
            config.world.village.name
        );
        Ok(Self {
            spawner: EnemySpawner::from_config(&config.world),
            rng: StdRng::seed_from_u64(config.sim.seed),
            player,
            world: World::new(),
            sounds: SoundBus::new(),
            tracers: Tracers::new(),
            stats: SimStats::default(),
            now: 0.0,
            tick_count: 0,
            config,
        })
    }

    /// Seconds simulated so far.
    pub fn now(&self) -> f32 {
        self.now
    }

    pub fn tick_count(&self) -> u64 {
        self.tick_count
    }

    /// Spawn a zombie at a random spawn point. `make_collider` receives the
    /// feet position and may add a capsule to the physics world.
    pub fn spawn_zombie<F>(&mut self, make_collider: F) -> Option<Entity>
    where
        F: FnOnce(Vec3) -> Option<ColliderHandle>,
    {
        self.spawner
            .spawn(&mut self.world, &self.config.zombie, &mut self.rng, make_collider)
    }

    /// Spawn a zombie at an exact position with the village as home.
    pub fn spawn_zombie_at(&mut self, position: Vec3, collider: Option<ColliderHandle>) -> Entity {
        ZombieBundle::new(&self.config.zombie, self.spawner.home.clone(), position)
            .with_collider(collider)
            .spawn(&mut self.world)
    }

    pub fn living_zombies(&self) -> usize {
        self.world
            .query::<&Zombie>()
            .iter()
            .filter(|(_, z)| !z.is_dead())
            .count()
    }

    /// Snapshot of every zombie's state and position.
    pub fn zombie_states(&self) -> Vec<(Entity, ZombieState, Vec3)> {
        self.world
            .query::<(&Zombie, &Transform)>()
            .iter()
            .map(|(e, (z, t))| (e, z.state(), t.position))
            .collect()
    }

    /// Advance the whole simulation by one fixed step.
    pub fn tick(&mut self, dt: f32, input: &mut PlayerInput, collab: &mut Collaborators) {
        let heard = self.sounds.flush();
        self.stats.sounds_broadcast += heard.len() as u32;
        broadcast_sounds(&mut self.world, &heard);

        let shot = {
            let mut ctx = PlayerContext {
                physics: &*collab.physics,
                sounds: &mut self.sounds,
                tracers: &mut self.tracers,
                rng: &mut self.rng,
                presentation: &mut *collab.presentation,
                now: self.now,
            };
            self.player.tick(input, &mut ctx, dt)
        };
        if let Some(shot) = shot {
            self.resolve_shot(&shot);
        }

        {
            let mut ctx = ZombieContext {
                physics: &*collab.physics,
                nav: collab.nav,
                rng: &mut self.rng,
                presentation: &mut *collab.presentation,
            };
            update_zombies(&mut self.world, Some(&mut self.player), &mut ctx, dt);
        }

        self.tracers.update(dt, &mut *collab.presentation);
        self.sync_colliders(&mut *collab.physics);
        self.signal_deaths(&mut *collab.presentation);

        self.now += dt;
        self.tick_count += 1;
    }

    /// Apply a shot's damage to the zombie it hit, if any.
    fn resolve_shot(&mut self, shot: &Shot) {
        self.stats.shots_fired += 1;
        let Some(hit) = shot.hit else {
            return;
        };
        let damage = self.config.weapon.shot_damage;
        for (entity, (body, zombie)) in self.world.query_mut::<(&AgentCollider, &mut Zombie)>() {
            if body.0 == Some(hit.collider) {
                self.stats.shots_hit += 1;
                zombie.take_damage(damage);
                log::debug!("Shot hit zombie {:?} ({} hp left)", entity, zombie.health.current);
                return;
            }
        }
    }

    fn sync_colliders(&mut self, physics: &mut dyn PhysicsQuery) {
        if let Some(collider) = self.player.collider {
            physics.sync_collider(collider, self.player.transform.position);
        }
        for (_, (transform, body)) in self.world.query::<(&Transform, &AgentCollider)>().iter() {
            if let Some(collider) = body.0 {
                physics.sync_collider(collider, transform.position);
            }
        }
    }

    fn signal_deaths(&mut self, presentation: &mut dyn Presentation) {
        for (entity, (zombie, nav)) in self.world.query_mut::<(&mut Zombie, &mut NavAgent)>() {
            if zombie.take_death_signal() {
                presentation.trigger(AgentId::Zombie(entity), params::DEATH);
                nav.set_stopped(true);
                self.stats.zombies_killed += 1;
                log::info!("Zombie {:?} died at t={:.2}s", entity, self.now);
            }
        }
        if self.player.take_death_signal() {
            presentation.trigger(AgentId::Player, params::DEATH);
            log::info!("Player died at t={:.2}s", self.now);
        }
    }
}
