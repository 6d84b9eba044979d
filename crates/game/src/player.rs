//! Player controller: locomotion, dodge roll and the aim-down-sights revolver.

use engine_core::{Damageable, Health, Transform, Velocity, Vec3};
use input::PlayerInput;
use physics::{ColliderHandle, PhysicsQuery};
use rand::rngs::StdRng;

use crate::camera::CameraRig;
use crate::config::{PlayerConfig, WeaponConfig};
use crate::effects::Tracers;
use crate::locomotion::{LocomotionEvents, LocomotionState};
use crate::motor::{check_grounded, face_toward, MoveIntent};
use crate::perception::SoundBus;
use crate::presentation::{params, AgentId, AudioCue, Presentation};
use crate::weapon::{fire_hitscan, jittered_direction, AimState, Revolver, Shot};
use crate::zombie::Target;

/// Collaborators the player needs during its tick.
pub struct PlayerContext<'a> {
    pub physics: &'a dyn PhysicsQuery,
    pub sounds: &'a mut SoundBus,
    pub tracers: &'a mut Tracers,
    pub rng: &'a mut StdRng,
    pub presentation: &'a mut dyn Presentation,
    /// Simulation time, stamped on published sounds.
    pub now: f32,
}

/// Player controller handling movement, camera and shooting.
#[derive(Debug, Clone)]
pub struct PlayerController {
    pub transform: Transform,
    /// Velocity from the last regular move (rolls excluded).
    pub velocity: Velocity,
    pub health: Health,
    pub locomotion: LocomotionState,
    pub aim: AimState,
    pub revolver: Revolver,
    pub camera: CameraRig,
    pub collider: Option<ColliderHandle>,
    pub config: PlayerConfig,
    pub weapon: WeaponConfig,
    death_signaled: bool,
}

impl PlayerController {
    pub fn new(position: Vec3, yaw: f32, config: PlayerConfig, weapon: WeaponConfig) -> Self {
        Self {
            transform: Transform::from_position_yaw(position, yaw),
            velocity: Velocity::default(),
            health: Health::new(config.max_health),
            locomotion: LocomotionState::new(&config, yaw),
            aim: AimState::new(&weapon),
            revolver: Revolver::new(&weapon),
            camera: CameraRig::new(&config.camera, yaw),
            collider: None,
            config,
            weapon,
            death_signaled: false,
        }
    }

    pub fn with_collider(mut self, collider: ColliderHandle) -> Self {
        self.collider = Some(collider);
        self
    }

    pub fn ammo_display(&self) -> String {
        self.revolver.ammo_display()
    }

    /// World position of the gun barrel.
    pub fn muzzle_position(&self) -> Vec3 {
        self.transform.position + self.transform.rotation * self.weapon.muzzle_offset
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

    /// Advance one tick. Returns the shot fired this tick, if any.
    ///
    /// Order: gravity and jump, ground probe, move, roll, reload, aim and
    /// fire, then camera.
    pub fn tick(&mut self, input: &mut PlayerInput, ctx: &mut PlayerContext, dt: f32) -> Option<Shot> {
        if self.is_dead() {
            return None;
        }
        let id = AgentId::Player;
        let mut events = LocomotionEvents::default();

        events.jumped = self
            .locomotion
            .jump_and_gravity(&self.config, &mut input.jump, dt);
        ctx.presentation.set_bool(id, params::JUMP, self.locomotion.jumping);
        ctx.presentation.set_bool(id, params::FREE_FALL, self.locomotion.free_fall);
        if events.jumped {
            log::debug!("Player jumped");
        }

        let grounded = check_grounded(ctx.physics, self.transform.position, &self.config);
        events.landed = self.locomotion.set_grounded(grounded);
        ctx.presentation.set_bool(id, params::GROUNDED, grounded);
        if events.landed {
            self.make_noise(AudioCue::Landing, self.config.landing_sound_radius, ctx);
        }

        self.move_body(input, &mut events, ctx, dt);

        let roll = self.locomotion.update_roll(
            &self.config,
            &mut input.roll,
            input.sprint,
            &mut events,
            dt,
        );
        if roll != Vec3::ZERO {
            self.transform.position =
                ctx.physics
                    .move_character(self.collider, self.transform.position, roll, dt);
        }
        if events.roll_started || events.roll_finished {
            ctx.presentation.set_bool(id, params::ROLL, self.locomotion.is_rolling());
        }

        // Held reloads wait out the roll.
        if !self.locomotion.is_rolling() && PlayerInput::consume(&mut input.reload) {
            if self.revolver.reload() {
                log::info!("Reloaded ({})", self.ammo_display());
            }
        }

        let shot = self.aim_and_fire(input, ctx, dt);

        self.camera.process_look(input.look);
        shot
    }

    fn move_body(
        &mut self,
        input: &PlayerInput,
        events: &mut LocomotionEvents,
        ctx: &mut PlayerContext,
        dt: f32,
    ) {
        let intent = MoveIntent {
            move_input: input.move_input,
            sprint: input.sprint,
            aim: input.aim,
            analog: input.analog_movement,
            camera_yaw: self.camera.yaw(),
        };
        let displacement = self.locomotion.motor.step(
            &self.config,
            &intent,
            self.velocity.horizontal_speed(),
            &mut self.transform,
            dt,
        );

        let before = self.transform.position;
        let after = ctx
            .physics
            .move_character(self.collider, before, displacement, dt);
        self.transform.position = after;
        if dt > 0.0 {
            self.velocity.linear = (after - before) / dt;
        }

        ctx.presentation.set_float(
            AgentId::Player,
            params::SPEED,
            self.locomotion.motor.animation_blend,
        );
        ctx.presentation.set_float(
            AgentId::Player,
            params::MOTION_SPEED,
            intent.input_magnitude(),
        );

        let delta = after - before;
        let travel = Vec3::new(delta.x, 0.0, delta.z).length();
        events.footstep = self
            .locomotion
            .advance_stride(travel, self.config.footstep_interval);
        if events.footstep {
            self.make_noise(AudioCue::Footstep, self.config.footstep_sound_radius, ctx);
        }
    }

    fn aim_and_fire(&mut self, input: &PlayerInput, ctx: &mut PlayerContext, dt: f32) -> Option<Shot> {
        self.revolver.update(dt);
        self.aim.update(input.aim, &self.weapon, dt);
        ctx.presentation.set_bool(AgentId::Player, params::AIM, input.aim);
        if !input.aim {
            return None;
        }

        face_toward(
            &mut self.transform,
            self.camera.forward(),
            self.config.aim_turn_rate,
            dt,
        );

        if !input.fire || !self.revolver.fire(&self.weapon) {
            return None;
        }
        let shot = self.shoot(ctx);
        self.aim.reset(&self.weapon);

        if self.revolver.is_empty() && self.weapon.auto_reload_on_empty && !self.locomotion.is_rolling() {
            self.revolver.reload();
            log::info!("Cylinder empty, reloaded ({})", self.ammo_display());
        }
        Some(shot)
    }

    fn shoot(&mut self, ctx: &mut PlayerContext) -> Shot {
        let eye = self.camera.position(self.transform.position);
        let direction = jittered_direction(
            self.camera.forward(),
            self.aim.crosshair_scale,
            self.weapon.jitter,
            ctx.rng,
        );
        let shot = fire_hitscan(ctx.physics, eye, direction, self.weapon.range, self.collider);

        let muzzle = self.muzzle_position();
        ctx.tracers
            .spawn(muzzle, shot.end, self.weapon.tracer_duration, ctx.presentation);
        ctx.presentation
            .play(AudioCue::Gunshot, muzzle, self.weapon.gunshot_volume);
        ctx.sounds
            .publish(self.transform.position, self.weapon.gunshot_sound_radius, ctx.now);

        match &shot.hit {
            Some(hit) => log::debug!("Shot hit {:?} at {:?}", hit.collider, hit.point),
            None => log::debug!("Shot missed"),
        }
        shot
    }

    fn make_noise(&self, cue: AudioCue, radius: f32, ctx: &mut PlayerContext) {
        let position = self.transform.position;
        ctx.presentation
            .play(cue, position, self.config.footstep_volume);
        ctx.sounds.publish(position, radius, ctx.now);
    }
}

impl Damageable for PlayerController {
    fn take_damage(&mut self, amount: f32) {
        if self.is_dead() {
            return;
        }
        self.health.take_damage(amount);
        log::info!("Player hit for {} ({} left)", amount, self.health.current);
        if self.health.is_dead() {
            log::info!("Player died");
        }
    }

    fn is_dead(&self) -> bool {
        self.health.is_dead()
    }
}

impl Target for PlayerController {
    fn position(&self) -> Vec3 {
        self.transform.position
    }

    fn collider(&self) -> Option<ColliderHandle> {
        self.collider
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::presentation::RecordingPresentation;
    use approx::assert_relative_eq;
    use engine_core::Vec2;
    use physics::{Layer, PhysicsWorld};
    use rand::SeedableRng;

    const DT: f32 = 1.0 / 60.0;

    struct Rig {
        physics: PhysicsWorld,
        sounds: SoundBus,
        tracers: Tracers,
        rng: StdRng,
        out: RecordingPresentation,
        player: PlayerController,
        input: PlayerInput,
    }

    impl Rig {
        fn new() -> Self {
            Self::with(PlayerConfig::default(), WeaponConfig::default())
        }

        fn with(config: PlayerConfig, weapon: WeaponConfig) -> Self {
            let mut physics = PhysicsWorld::new();
            physics.add_ground_plane();
            let collider = physics.add_agent_capsule(
                Vec3::ZERO,
                config.capsule_half_height,
                config.capsule_radius,
                Layer::Player,
            );
            Self {
                physics,
                sounds: SoundBus::new(),
                tracers: Tracers::new(),
                rng: StdRng::seed_from_u64(5),
                out: RecordingPresentation::new(),
                player: PlayerController::new(Vec3::ZERO, 0.0, config, weapon).with_collider(collider),
                input: PlayerInput::default(),
            }
        }

        fn tick(&mut self) -> Option<Shot> {
            let mut ctx = PlayerContext {
                physics: &self.physics,
                sounds: &mut self.sounds,
                tracers: &mut self.tracers,
                rng: &mut self.rng,
                presentation: &mut self.out,
                now: 0.0,
            };
            let shot = self.player.tick(&mut self.input, &mut ctx, DT);
            if let Some(c) = self.player.collider {
                self.physics.sync_collider(c, self.player.transform.position);
            }
            shot
        }

        fn run(&mut self, ticks: usize) {
            for _ in 0..ticks {
                self.tick();
            }
        }
    }

    #[test]
    fn walks_forward_at_move_speed() {
        let mut rig = Rig::new();
        rig.input.move_input = Vec2::Y;
        rig.run(120);
        assert_relative_eq!(rig.player.velocity.horizontal_speed(), 2.0, epsilon = 0.05);
        assert!(rig.player.transform.position.z > 3.0);
        assert!(rig.player.transform.position.y.abs() < 0.05, "stays on the ground");
        assert_eq!(rig.out.bool(AgentId::Player, params::GROUNDED), Some(true));
        assert!(rig.out.cue_count(AudioCue::Footstep) >= 2);
        assert!(rig.sounds.pending() >= 2);
    }

    #[test]
    fn jump_lands_with_noise() {
        let mut rig = Rig::new();
        rig.run(40); // let the jump timeout run out
        rig.input.jump = true;
        rig.tick();
        assert!(rig.player.locomotion.jumping);

        let mut peak: f32 = 0.0;
        for _ in 0..120 {
            rig.tick();
            peak = peak.max(rig.player.transform.position.y);
        }
        assert!(peak > 1.0 && peak < 1.3, "peak {peak}");
        assert!(rig.player.locomotion.grounded);
        assert_eq!(rig.out.cue_count(AudioCue::Landing), 1);
    }

    #[test]
    fn roll_moves_along_heading_and_blocks_reload() {
        let mut rig = Rig::new();
        assert!(rig.player.revolver.fire(&rig.player.weapon));
        rig.input.roll = true;
        rig.tick();
        assert!(rig.player.locomotion.is_rolling());
        assert_eq!(rig.out.bool(AgentId::Player, params::ROLL), Some(true));

        rig.input.reload = true;
        rig.tick();
        assert!(rig.input.reload, "reload waits for the roll");
        assert_eq!(rig.player.revolver.ammo(), 5);

        while rig.player.locomotion.is_rolling() {
            rig.tick();
        }
        assert_relative_eq!(rig.player.transform.position.z, 3.0, epsilon = 0.05);
        assert_eq!(rig.out.bool(AgentId::Player, params::ROLL), Some(false));

        rig.tick();
        assert!(!rig.input.reload);
        assert_eq!(rig.player.revolver.ammo(), 6);
    }

    #[test]
    fn captured_key_tap_reloads_on_a_later_tick() {
        use input::{ElementState, InputState, KeyCode};

        let mut rig = Rig::new();
        assert!(rig.player.revolver.fire(&rig.player.weapon));
        let mut keys = InputState::new();
        keys.process_keyboard(KeyCode::KeyR, ElementState::Pressed);
        keys.process_keyboard(KeyCode::KeyR, ElementState::Released);
        rig.input.capture(&keys);

        // A frame without a fixed tick must not lose the press.
        keys.begin_frame();
        rig.input.capture(&keys);
        assert!(rig.input.reload);

        rig.tick();
        assert!(!rig.input.reload, "reload consumed by the tick");
        assert_eq!(rig.player.revolver.ammo(), 6);
    }

    #[test]
    fn firing_requires_aim_and_respects_delay() {
        let mut rig = Rig::new();
        rig.input.fire = true;
        assert!(rig.tick().is_none(), "hip fire is not allowed");

        rig.input.aim = true;
        assert!(rig.tick().is_some());
        assert_eq!(rig.player.revolver.ammo(), 5);
        assert_eq!(rig.player.aim.crosshair_scale, rig.player.weapon.initial_crosshair_scale);
        assert_eq!(rig.tracers.len(), 1);
        assert_eq!(rig.out.cue_count(AudioCue::Gunshot), 1);
        assert_eq!(rig.sounds.pending(), 1);

        let shots = (0..29).filter(|_| rig.tick().is_some()).count();
        assert_eq!(shots, 0, "fire delay not elapsed");
        let shots = (0..3).filter(|_| rig.tick().is_some()).count();
        assert_eq!(shots, 1);
        assert!(rig.player.aim.crosshair_visible());
    }

    #[test]
    fn emptying_the_cylinder_auto_reloads() {
        let mut rig = Rig::new();
        rig.input.aim = true;
        rig.input.fire = true;
        let mut fired = 0;
        for _ in 0..400 {
            if rig.tick().is_some() {
                fired += 1;
            }
            if fired == 6 {
                break;
            }
        }
        assert_eq!(fired, 6);
        assert_eq!(rig.player.revolver.ammo(), 6);
        assert_eq!(rig.player.ammo_display(), "6 / 6");
    }

    #[test]
    fn without_auto_reload_empty_gun_stays_silent() {
        let weapon = WeaponConfig {
            auto_reload_on_empty: false,
            ..Default::default()
        };
        let mut rig = Rig::with(PlayerConfig::default(), weapon);
        rig.input.aim = true;
        rig.input.fire = true;
        rig.run(600);
        assert_eq!(rig.player.revolver.ammo(), 0);
        assert_eq!(rig.out.cue_count(AudioCue::Gunshot), 6);
        assert_eq!(rig.tracers.len(), 6, "trails are only swept by the simulation");
    }

    #[test]
    fn dead_player_is_inert_and_signals_once() {
        let mut rig = Rig::new();
        rig.player.take_damage(250.0);
        rig.input.move_input = Vec2::Y;
        rig.run(10);
        assert_eq!(rig.player.transform.position, Vec3::ZERO);
        assert!(rig.player.take_death_signal());
        assert!(!rig.player.take_death_signal());
    }
}
