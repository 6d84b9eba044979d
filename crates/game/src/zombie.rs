//! Zombie AI: a four-state machine over perception and path following.
//!
//! Zombies walk to their home area, roam inside it, investigate noises, and
//! chase and bite the player when they see them.

use engine_core::{Damageable, Health, Transform, Vec3};
use hecs::World;
use navigation::{NavAgent, NavMesh};
use physics::{ColliderHandle, PhysicsQuery};
use rand::rngs::StdRng;

use crate::area::Area;
use crate::config::ZombieConfig;
use crate::perception::{Hearing, SoundEvent, VisionCone};
use crate::presentation::{params, AgentId, Presentation};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ZombieState {
    /// Heading for the home area. Initial state.
    SeekingArea,
    Roaming,
    Chasing,
    Attacking,
}

/// Something zombies can see and bite.
pub trait Target: Damageable {
    /// Feet position.
    fn position(&self) -> Vec3;
    fn collider(&self) -> Option<ColliderHandle>;
}

/// Collision body of an agent, if it has one.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct AgentCollider(pub Option<ColliderHandle>);

/// Collaborators a zombie consults during its tick.
pub struct ZombieContext<'a> {
    pub physics: &'a dyn PhysicsQuery,
    pub nav: &'a dyn NavMesh,
    pub rng: &'a mut StdRng,
    pub presentation: &'a mut dyn Presentation,
}

/// AI state and health of one zombie.
#[derive(Debug, Clone)]
pub struct Zombie {
    pub config: ZombieConfig,
    pub home: Area,
    pub health: Health,
    pub hearing: Hearing,
    state: ZombieState,
    vision: VisionCone,
    roam_destination: Option<Vec3>,
    /// Seconds since the last bite. Starts saturated so the first bite is immediate.
    since_last_attack: f32,
    death_signaled: bool,
}

impl Zombie {
    pub fn new(config: ZombieConfig, home: Area) -> Self {
        Self {
            health: Health::new(config.max_health),
            vision: VisionCone::from_config(&config),
            config,
            home,
            hearing: Hearing::default(),
            state: ZombieState::SeekingArea,
            roam_destination: None,
            since_last_attack: f32::INFINITY,
            death_signaled: false,
        }
    }

    pub fn state(&self) -> ZombieState {
        self.state
    }

    pub fn roam_destination(&self) -> Option<Vec3> {
        self.roam_destination
    }

    /// React to a delivered sound. Roaming zombies turn toward it at once;
    /// other states pick it up through their destination policy.
    pub fn hear(&mut self, event: &SoundEvent, listener: Vec3, nav: &mut NavAgent) -> bool {
        if self.is_dead() || !self.hearing.hear(event, listener) {
            return false;
        }
        log::debug!("Zombie heard a sound at {:?}", event.position);
        if self.state == ZombieState::Roaming {
            nav.set_destination(event.position);
        }
        true
    }

    /// True exactly once, the first time this is asked after death.
    pub fn take_death_signal(&mut self) -> bool {
        if self.is_dead() && !self.death_signaled {
            self.death_signaled = true;
            true
        } else {
            false
        }
    }

    /// Run one tick of decisions, then follow the path.
    #[allow(clippy::too_many_arguments)]
    pub fn tick<'t>(
        &mut self,
        id: AgentId,
        transform: &mut Transform,
        collider: Option<ColliderHandle>,
        nav: &mut NavAgent,
        target: Option<&mut (dyn Target + 't)>,
        ctx: &mut ZombieContext,
        dt: f32,
    ) {
        if self.is_dead() {
            return;
        }
        self.since_last_attack += dt;

        let target = target.filter(|t| !t.is_dead());
        self.think(id, transform, collider, nav, target, ctx);

        let before = transform.position;
        let after = nav.step(ctx.nav, before, dt);
        transform.position = after;
        transform.face_flat(after - before);
    }

    fn think<'t>(
        &mut self,
        id: AgentId,
        transform: &Transform,
        collider: Option<ColliderHandle>,
        nav: &mut NavAgent,
        target: Option<&mut (dyn Target + 't)>,
        ctx: &mut ZombieContext,
    ) {
        let position = transform.position;
        match self.state {
            ZombieState::SeekingArea | ZombieState::Roaming => {
                // Sight beats arrival: a spotted player redirects mid-roam.
                if self.sees(transform, collider, target.as_deref(), ctx.physics) {
                    self.switch_state(ZombieState::Chasing);
                    return;
                }
                self.seek(id, nav, ctx);
                if self.state == ZombieState::SeekingArea && self.home.contains(position) {
                    self.switch_state(ZombieState::Roaming);
                }
            }
            ZombieState::Chasing => {
                let Some(target) = target else {
                    self.switch_state(ZombieState::Roaming);
                    return;
                };
                nav.speed = self.config.chase_speed;
                ctx.presentation.set_bool(id, params::IS_RUNNING, true);
                ctx.presentation.set_bool(id, params::IS_WALKING, false);
                nav.retarget(target.position());

                if position.distance(target.position()) <= self.config.attack_range {
                    self.switch_state(ZombieState::Attacking);
                } else if !self.sees(transform, collider, Some(&*target), ctx.physics) {
                    self.switch_state(ZombieState::Roaming);
                }
            }
            ZombieState::Attacking => {
                nav.reset_path();
                let Some(target) = target else {
                    self.switch_state(ZombieState::Roaming);
                    return;
                };
                if self.since_last_attack > self.config.attack_cooldown {
                    self.since_last_attack = 0.0;
                    target.take_damage(self.config.attack_damage);
                    ctx.presentation.trigger(id, params::ATTACK);
                    log::info!("Zombie {:?} attacks player", id);
                }
                if position.distance(target.position()) > self.config.attack_range {
                    self.switch_state(ZombieState::Chasing);
                }
            }
        }
    }

    /// Destination policy shared by SeekingArea and Roaming: an unresolved
    /// sound first, otherwise a fresh roam point whenever the last one is reached.
    fn seek(&mut self, id: AgentId, nav: &mut NavAgent, ctx: &mut ZombieContext) {
        nav.speed = self.config.roam_speed;
        if let Some(sound) = self.hearing.pending_target() {
            nav.set_destination(sound);
            if arrived(nav, self.config.arrival_distance) {
                self.hearing.resolve();
                if self.state == ZombieState::SeekingArea {
                    self.pick_roam_point(id, nav, ctx);
                }
            }
        } else if arrived(nav, self.config.arrival_distance) {
            self.pick_roam_point(id, nav, ctx);
        }
    }

    fn pick_roam_point(&mut self, id: AgentId, nav: &mut NavAgent, ctx: &mut ZombieContext) {
        let candidate = self.home.random_point(ctx.rng);
        match ctx.nav.sample_valid_point(candidate, self.config.roam_sample_distance) {
            Some(point) => {
                self.roam_destination = Some(point);
                nav.set_destination(point);
                ctx.presentation.set_bool(id, params::IS_RUNNING, false);
                ctx.presentation.set_bool(id, params::IS_WALKING, true);
            }
            None => log::debug!("No walkable roam point near {:?}", candidate),
        }
    }

    fn sees(
        &self,
        transform: &Transform,
        collider: Option<ColliderHandle>,
        target: Option<&dyn Target>,
        physics: &dyn PhysicsQuery,
    ) -> bool {
        target.is_some_and(|t| {
            self.vision
                .can_see(transform, collider, t.position(), t.collider(), physics)
        })
    }

    fn switch_state(&mut self, next: ZombieState) {
        if next != self.state {
            log::debug!("Zombie {:?} -> {:?}", self.state, next);
            self.state = next;
        }
    }
}

impl Damageable for Zombie {
    fn take_damage(&mut self, amount: f32) {
        if self.is_dead() {
            return;
        }
        self.health.take_damage(amount);
        if self.health.is_dead() {
            log::info!("Zombie killed");
        }
    }

    fn is_dead(&self) -> bool {
        self.health.is_dead()
    }
}

fn arrived(nav: &NavAgent, threshold: f32) -> bool {
    !nav.path_pending() && nav.remaining_distance() < threshold
}

/// Deliver a batch of sounds to every living zombie.
pub fn broadcast_sounds(world: &mut World, events: &[SoundEvent]) {
    if events.is_empty() {
        return;
    }
    for (_, (transform, zombie, nav)) in world.query_mut::<(&Transform, &mut Zombie, &mut NavAgent)>() {
        for event in events {
            zombie.hear(event, transform.position, nav);
        }
    }
}

/// Tick every zombie against the (optional) player.
pub fn update_zombies(
    world: &mut World,
    mut player: Option<&mut dyn Target>,
    ctx: &mut ZombieContext,
    dt: f32,
) {
    for (entity, (transform, zombie, nav, body)) in
        world.query_mut::<(&mut Transform, &mut Zombie, &mut NavAgent, &AgentCollider)>()
    {
        let target = player.as_deref_mut();
        zombie.tick(AgentId::Zombie(entity), transform, body.0, nav, target, ctx, dt);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::presentation::RecordingPresentation;
    use engine_core::Vec2;
    use navigation::OpenGround;
    use physics::{Layer, PhysicsWorld};
    use rand::SeedableRng;

    const DT: f32 = 1.0 / 60.0;

    struct Dummy {
        position: Vec3,
        collider: Option<ColliderHandle>,
        health: Health,
    }

    impl Damageable for Dummy {
        fn take_damage(&mut self, amount: f32) {
            self.health.take_damage(amount);
        }
        fn is_dead(&self) -> bool {
            self.health.is_dead()
        }
    }

    impl Target for Dummy {
        fn position(&self) -> Vec3 {
            self.position
        }
        fn collider(&self) -> Option<ColliderHandle> {
            self.collider
        }
    }

    struct Rig {
        physics: PhysicsWorld,
        ground: OpenGround,
        rng: StdRng,
        out: RecordingPresentation,
        zombie: Zombie,
        transform: Transform,
        nav: NavAgent,
        collider: ColliderHandle,
        id: AgentId,
        player: Dummy,
    }

    impl Rig {
        /// Zombie at the origin facing +Z inside a 20x20 village; player at `player_at`.
        fn new(player_at: Vec3) -> Self {
            let mut physics = PhysicsWorld::new();
            physics.add_ground_plane();
            let collider = physics.add_agent_capsule(Vec3::ZERO, 0.6, 0.3, Layer::Enemy);
            let player_collider = physics.add_agent_capsule(player_at, 0.62, 0.28, Layer::Player);
            let config = ZombieConfig::default();
            Self {
                physics,
                ground: OpenGround::default(),
                rng: StdRng::seed_from_u64(9),
                out: RecordingPresentation::new(),
                nav: NavAgent::new(config.roam_speed),
                zombie: Zombie::new(config, Area::rect("village", Vec3::ZERO, Vec2::splat(20.0), 0.0)),
                transform: Transform::default(),
                collider,
                id: AgentId::Zombie(World::new().spawn(())),
                player: Dummy {
                    position: player_at,
                    collider: Some(player_collider),
                    health: Health::new(100.0),
                },
            }
        }

        fn tick(&mut self) {
            let mut ctx = ZombieContext {
                physics: &self.physics,
                nav: &self.ground,
                rng: &mut self.rng,
                presentation: &mut self.out,
            };
            self.zombie.tick(
                self.id,
                &mut self.transform,
                Some(self.collider),
                &mut self.nav,
                Some(&mut self.player),
                &mut ctx,
                DT,
            );
        }

        fn tick_without_player(&mut self) {
            let mut ctx = ZombieContext {
                physics: &self.physics,
                nav: &self.ground,
                rng: &mut self.rng,
                presentation: &mut self.out,
            };
            self.zombie.tick(
                self.id,
                &mut self.transform,
                Some(self.collider),
                &mut self.nav,
                None,
                &mut ctx,
                DT,
            );
        }
    }

    #[test]
    fn seeking_becomes_roaming_inside_home() {
        let mut rig = Rig::new(Vec3::new(0.0, 0.0, -30.0));
        assert_eq!(rig.zombie.state(), ZombieState::SeekingArea);
        rig.tick();
        assert_eq!(rig.zombie.state(), ZombieState::Roaming);
        assert!(rig.zombie.roam_destination().is_some());
        assert_eq!(rig.out.bool(rig.id, params::IS_WALKING), Some(true));
    }

    #[test]
    fn seeking_outside_home_keeps_walking() {
        let mut rig = Rig::new(Vec3::new(0.0, 0.0, -30.0));
        rig.transform.position = Vec3::new(40.0, 0.0, 0.0);
        rig.tick();
        assert_eq!(rig.zombie.state(), ZombieState::SeekingArea);
        let dest = rig.zombie.roam_destination().expect("roam point picked");
        assert!(rig.zombie.home.contains(dest));
    }

    #[test]
    fn sight_preempts_arrival_logic() {
        let mut rig = Rig::new(Vec3::new(0.0, 0.0, 6.0));
        rig.zombie.state = ZombieState::Roaming;
        rig.tick();
        assert_eq!(rig.zombie.state(), ZombieState::Chasing);
        assert!(rig.zombie.roam_destination().is_none(), "no roam point picked that tick");
    }

    #[test]
    fn chase_closes_in_then_attacks_once_per_cooldown() {
        let mut rig = Rig::new(Vec3::new(0.0, 0.0, 6.0));
        rig.zombie.state = ZombieState::Chasing;

        let mut ticks = 0;
        while rig.zombie.state() != ZombieState::Attacking {
            rig.tick();
            ticks += 1;
            assert!(ticks < 600, "never reached attack range");
        }
        assert_eq!(rig.out.bool(rig.id, params::IS_RUNNING), Some(true));

        rig.tick();
        assert_eq!(rig.out.trigger_count(rig.id, params::ATTACK), 1);
        assert_eq!(rig.player.health.current, 90.0);
        assert!(!rig.nav.has_path());

        // 1.5 s cooldown at 60 Hz: nothing for 90 ticks, then the next bite.
        for _ in 0..89 {
            rig.tick();
        }
        assert_eq!(rig.out.trigger_count(rig.id, params::ATTACK), 1);
        for _ in 0..2 {
            rig.tick();
        }
        assert_eq!(rig.out.trigger_count(rig.id, params::ATTACK), 2);
    }

    #[test]
    fn chase_retargets_every_tick_on_small_moves() {
        let mut rig = Rig::new(Vec3::new(0.0, 0.0, 8.0));
        rig.zombie.state = ZombieState::Chasing;
        let handle = rig.player.collider.expect("player collider");

        for step in 0..10 {
            rig.player.position += Vec3::X * 0.03;
            rig.physics.sync_collider(handle, rig.player.position);
            rig.tick();
            assert_eq!(rig.zombie.state(), ZombieState::Chasing, "tick {step}");
            assert_eq!(rig.nav.destination(), Some(rig.player.position), "tick {step}");
        }
    }

    #[test]
    fn target_leaving_range_resumes_chase() {
        let mut rig = Rig::new(Vec3::new(0.0, 0.0, 1.0));
        rig.zombie.state = ZombieState::Attacking;
        rig.tick();
        assert_eq!(rig.zombie.state(), ZombieState::Attacking);
        rig.player.position = Vec3::new(0.0, 0.0, 5.0);
        rig.tick();
        assert_eq!(rig.zombie.state(), ZombieState::Chasing);
    }

    #[test]
    fn missing_player_drops_to_roaming() {
        let mut rig = Rig::new(Vec3::new(0.0, 0.0, 6.0));
        rig.zombie.state = ZombieState::Chasing;
        rig.tick_without_player();
        assert_eq!(rig.zombie.state(), ZombieState::Roaming);
        rig.tick_without_player();
        assert_eq!(rig.zombie.state(), ZombieState::Roaming);
    }

    #[test]
    fn roaming_zombie_turns_toward_sound() {
        let mut rig = Rig::new(Vec3::new(0.0, 0.0, -30.0));
        rig.zombie.state = ZombieState::Roaming;
        let noise = SoundEvent {
            position: Vec3::new(-8.0, 0.0, -8.0),
            radius: 25.0,
            timestamp: 0.0,
        };
        assert!(rig.zombie.hear(&noise, rig.transform.position, &mut rig.nav));
        assert_eq!(rig.nav.destination(), Some(noise.position));

        let far = SoundEvent {
            position: Vec3::new(100.0, 0.0, 0.0),
            radius: 15.0,
            timestamp: 0.0,
        };
        assert!(!rig.zombie.hear(&far, rig.transform.position, &mut rig.nav));

        for _ in 0..600 {
            rig.tick();
            if rig.zombie.hearing.pending_target().is_none() {
                break;
            }
        }
        assert!(rig.zombie.hearing.pending_target().is_none(), "sound investigated");
        assert!(rig.transform.position.distance(noise.position) < 0.5);
    }

    #[test]
    fn dead_zombie_stops_and_signals_once() {
        let mut rig = Rig::new(Vec3::new(0.0, 0.0, 6.0));
        rig.zombie.take_damage(150.0);
        assert!(rig.zombie.is_dead());
        let before = rig.transform.position;
        rig.tick();
        assert_eq!(rig.transform.position, before);
        assert_eq!(rig.zombie.state(), ZombieState::SeekingArea);
        assert!(rig.zombie.take_death_signal());
        assert!(!rig.zombie.take_death_signal());
    }
}
