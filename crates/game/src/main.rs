//! Headless Zombie Village run: builds the village, spawns zombies and lets a
//! scripted gunslinger walk in, roll, jump and shoot.

use std::path::PathBuf;
use std::time::Duration;

use anyhow::{Context, Result};
use clap::Parser;
use engine_core::{delta_angle, yaw_of, Damageable, Time, Transform, Vec2, Vec3};
use input::{ElementState, InputState, KeyCode, MouseButton, PlayerInput};
use navigation::NavGrid;
use physics::{Layer, PhysicsWorld};
use zombie_village::presentation::{
    params, AgentId, AnimationSink, AudioCue, AudioSink, EffectSink, TrailId,
};
use zombie_village::zombie::{Zombie, ZombieState};
use zombie_village::{Collaborators, GameConfig, Simulation};

/// Synthetic frame length fed to the fixed-step accumulator.
const FRAME: Duration = Duration::from_micros(22_222);

/// Navigation grid resolution in metres.
const NAV_CELL: f32 = 1.0;

/// Wall height of the village houses.
const HOUSE_HEIGHT: f32 = 3.0;

#[derive(Parser, Debug)]
#[command(name = "zombie-village", about = "Headless third-person zombie village simulation")]
struct Args {
    /// Simulated seconds to run.
    #[arg(long, default_value_t = 30.0)]
    seconds: f32,

    /// Zombies spawned at start.
    #[arg(long, default_value_t = 6)]
    zombies: usize,

    /// Override the RNG seed from the config.
    #[arg(long)]
    seed: Option<u64>,

    /// Config file (RON). Defaults to ./config.ron, falling back to built-in values.
    #[arg(long)]
    config: Option<PathBuf>,

    /// Write the effective config to ./config.ron before running.
    #[arg(long)]
    save_config: bool,
}

/// Front end for headless runs: logs presentation signals and counts cues.
#[derive(Default)]
struct LogPresentation {
    gunshots: u32,
    footsteps: u32,
    landings: u32,
    attacks: u32,
    trails: u32,
}

impl AnimationSink for LogPresentation {
    fn set_bool(&mut self, _: AgentId, _: &'static str, _: bool) {}

    fn set_float(&mut self, _: AgentId, _: &'static str, _: f32) {}

    fn trigger(&mut self, agent: AgentId, name: &'static str) {
        if name == params::ATTACK {
            self.attacks += 1;
        }
        log::debug!("{:?}: {}", agent, name);
    }
}

impl AudioSink for LogPresentation {
    fn play(&mut self, cue: AudioCue, position: Vec3, volume: f32) {
        match cue {
            AudioCue::Gunshot => self.gunshots += 1,
            AudioCue::Footstep => self.footsteps += 1,
            AudioCue::Landing => self.landings += 1,
        }
        log::trace!("{:?} at {:?} (volume {})", cue, position, volume);
    }
}

impl EffectSink for LogPresentation {
    fn spawn_trail(&mut self, _: TrailId, _: Vec3) {
        self.trails += 1;
    }

    fn move_trail(&mut self, _: TrailId, _: Vec3) {}

    fn despawn_trail(&mut self, _: TrailId) {}
}

/// Scripted stand-in for a player at the keyboard: it presses keys and moves
/// the mouse, and the intent is captured from that like any front end would.
#[derive(Default)]
struct Pilot {
    rolled: bool,
    jumped: bool,
}

impl Pilot {
    /// Engage zombies within this distance.
    const ENGAGE_RANGE: f32 = 20.0;
    /// Max camera turn per tick, degrees.
    const TURN_STEP: f32 = 6.0;
    /// Fire once the camera is this close to the target heading, degrees.
    const FIRE_CONE: f32 = 2.0;

    fn drive(&mut self, sim: &Simulation, keys: &mut InputState) {
        let t = sim.now();
        hold_key(keys, KeyCode::ShiftLeft, (3.0..6.0).contains(&t));

        if t >= 4.0 && !self.rolled {
            self.rolled = true;
            tap_key(keys, KeyCode::KeyC);
        }
        if t >= 6.0 && !self.jumped {
            self.jumped = true;
            tap_key(keys, KeyCode::Space);
        }

        let player = sim.player.transform.position;
        let target = sim
            .world
            .query::<(&Zombie, &Transform)>()
            .iter()
            .filter(|(_, (zombie, _))| !zombie.is_dead())
            .map(|(_, (_, transform))| transform.position)
            .filter(|p| p.distance(player) < Self::ENGAGE_RANGE)
            .min_by(|a, b| a.distance(player).total_cmp(&b.distance(player)));

        match target {
            Some(zombie) if t >= 6.0 => {
                hold_key(keys, KeyCode::KeyW, false);
                hold_button(keys, MouseButton::Right, true);
                let wanted = yaw_of(zombie - player);
                let turn = delta_angle(sim.player.camera.yaw(), wanted).to_degrees();
                let step = turn.clamp(-Self::TURN_STEP, Self::TURN_STEP);
                keys.process_mouse_motion(((step / PlayerInput::LOOK_SENSITIVITY) as f64, 0.0));
                hold_button(keys, MouseButton::Left, turn.abs() < Self::FIRE_CONE);
            }
            _ => {
                hold_key(keys, KeyCode::KeyW, true);
                hold_button(keys, MouseButton::Right, false);
                hold_button(keys, MouseButton::Left, false);
                if sim.player.revolver.ammo() < sim.player.revolver.magazine_size {
                    tap_key(keys, KeyCode::KeyR);
                }
            }
        }
    }
}

fn element_state(down: bool) -> ElementState {
    if down {
        ElementState::Pressed
    } else {
        ElementState::Released
    }
}

fn hold_key(keys: &mut InputState, key: KeyCode, down: bool) {
    keys.process_keyboard(key, element_state(down));
}

fn tap_key(keys: &mut InputState, key: KeyCode) {
    keys.process_keyboard(key, ElementState::Pressed);
    keys.process_keyboard(key, ElementState::Released);
}

fn hold_button(keys: &mut InputState, button: MouseButton, down: bool) {
    keys.process_mouse_button(button, element_state(down));
}

fn main() -> Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let args = Args::parse();
    let mut config = match &args.config {
        Some(path) => GameConfig::load_from(path)
            .with_context(|| format!("loading config {}", path.display()))?,
        None => GameConfig::load(),
    };
    if let Some(seed) = args.seed {
        config.sim.seed = seed;
    }
    if args.save_config {
        config.save();
    }

    log::info!("Starting Zombie Village ({} zombies, {}s)", args.zombies, args.seconds);

    let mut physics = PhysicsWorld::new();
    physics.add_ground_plane();
    let mut nav = NavGrid::centered(config.world.half_size, NAV_CELL);
    for house in &config.world.houses {
        let half = house.size * 0.5;
        physics.add_static_cuboid(
            house.center + Vec3::Y * (HOUSE_HEIGHT * 0.5),
            house.yaw_degrees.to_radians(),
            Vec3::new(half.x, HOUSE_HEIGHT * 0.5, half.y),
        );
        // The grid only blocks axis-aligned footprints; pad rotated houses.
        let pad = if house.yaw_degrees == 0.0 { 0.0 } else { half.max_element() * 0.5 };
        nav.block_rect(house.center, half + Vec2::splat(pad));
        log::debug!("House '{}' at {:?}", house.name, house.center);
    }

    let mut sim = Simulation::new(config).context("invalid configuration")?;

    let p = &sim.config.player;
    let player_collider = physics.add_agent_capsule(
        sim.config.world.player_spawn,
        p.capsule_half_height,
        p.capsule_radius,
        Layer::Player,
    );
    sim.player.collider = Some(player_collider);

    let (half_height, radius) = (
        sim.config.zombie.capsule_half_height,
        sim.config.zombie.capsule_radius,
    );
    for _ in 0..args.zombies {
        sim.spawn_zombie(|feet| Some(physics.add_agent_capsule(feet, half_height, radius, Layer::Enemy)));
    }

    let mut presentation = LogPresentation::default();
    let mut keys = InputState::new();
    keys.set_cursor_locked(true);
    let mut input = PlayerInput::default();
    let mut pilot = Pilot::default();
    let mut time = Time::with_fixed_rate(sim.config.sim.tick_rate_hz);
    let mut next_report = 1.0;

    while sim.now() < args.seconds {
        time.advance(FRAME);
        while time.should_fixed_update() {
            keys.begin_frame();
            pilot.drive(&sim, &mut keys);
            input.capture(&keys);
            let mut collab = Collaborators {
                physics: &mut physics,
                nav: &nav,
                presentation: &mut presentation,
            };
            sim.tick(time.fixed_timestep_seconds(), &mut input, &mut collab);
        }

        if sim.now() >= next_report {
            next_report += 1.0;
            report(&sim);
        }
        if sim.player.is_dead() {
            log::info!("The gunslinger has fallen");
            break;
        }
    }

    let stats = sim.stats;
    println!("Zombie Village: {:.1}s over {} ticks", sim.now(), sim.tick_count());
    println!(
        "  shots {} (hit {}, gunshot cues {}), zombies killed {}/{}, sounds {}",
        stats.shots_fired,
        stats.shots_hit,
        presentation.gunshots,
        stats.zombies_killed,
        args.zombies,
        stats.sounds_broadcast
    );
    println!(
        "  player health {:.0}, ammo {}, footsteps {}, landings {}, bites {}, trails {}",
        sim.player.health.current,
        sim.player.ammo_display(),
        presentation.footsteps,
        presentation.landings,
        presentation.attacks,
        presentation.trails,
    );
    Ok(())
}

fn report(sim: &Simulation) {
    let states = sim.zombie_states();
    let count = |s: ZombieState| states.iter().filter(|(_, state, _)| *state == s).count();
    log::info!(
        "t={:>5.1}s player {:?} hp {:.0} ammo {} | zombies {} alive: seek {} roam {} chase {} attack {}",
        sim.now(),
        sim.player.transform.position,
        sim.player.health.current,
        sim.player.ammo_display(),
        sim.living_zombies(),
        count(ZombieState::SeekingArea),
        count(ZombieState::Roaming),
        count(ZombieState::Chasing),
        count(ZombieState::Attacking),
    );
}
