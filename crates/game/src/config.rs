//! Simulation tunables. Loaded from `config.ron` at startup.
//!
//! Every section and field has a default, so a partial file (or none at all)
//! is valid. Distances are metres, times seconds, angles degrees.

use glam::{Vec2, Vec3};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use thiserror::Error;

use crate::roll_curve::{CurveError, RollProfile};

/// Why a configuration could not be used.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("could not read {path:?}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("invalid config at {path:?}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: ron::error::SpannedError,
    },
    #[error("could not serialize config: {0}")]
    Serialize(#[from] ron::Error),
    #[error("invalid value for `{field}`: {reason}")]
    Invalid { field: &'static str, reason: String },
    #[error("invalid roll profile: {0}")]
    RollProfile(#[from] CurveError),
}

fn invalid(field: &'static str, reason: impl Into<String>) -> ConfigError {
    ConfigError::Invalid {
        field,
        reason: reason.into(),
    }
}

/// All tunables for one simulation.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GameConfig {
    pub sim: SimConfig,
    pub player: PlayerConfig,
    pub weapon: WeaponConfig,
    pub zombie: ZombieConfig,
    pub world: WorldConfig,
}

/// Scheduler settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SimConfig {
    /// Fixed ticks per second.
    pub tick_rate_hz: f64,
    /// Seed for roam points, spawn points and shot jitter.
    pub seed: u64,
}

impl Default for SimConfig {
    fn default() -> Self {
        Self {
            tick_rate_hz: 60.0,
            seed: 0x5eed,
        }
    }
}

/// Third-person locomotion tunables.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PlayerConfig {
    /// Walk speed in m/s.
    pub move_speed: f32,
    /// Sprint speed in m/s.
    pub sprint_speed: f32,
    /// Acceleration and deceleration rate.
    pub speed_change_rate: f32,
    /// Time to turn toward the movement heading.
    pub rotation_smooth_time: f32,
    /// Base roll distance before the speed bonus.
    pub roll_distance: f32,
    /// Seconds a full roll takes.
    pub roll_duration: f32,
    /// Progress → distance easing for rolls.
    pub roll_profile: RollProfile,
    pub jump_height: f32,
    /// Own gravity (negative, m/s²).
    pub gravity: f32,
    /// Maximum vertical speed magnitude.
    pub terminal_velocity: f32,
    /// Grounded time before another jump is allowed.
    pub jump_timeout: f32,
    /// Airborne time before entering free fall (stairs stay grounded-looking).
    pub fall_timeout: f32,
    /// Ground probe center sits at `y - grounded_offset`.
    pub grounded_offset: f32,
    pub grounded_radius: f32,
    /// Turn rate toward the camera while aiming.
    pub aim_turn_rate: f32,
    pub max_health: f32,
    /// Grounded travel between footsteps.
    pub footstep_interval: f32,
    pub footstep_volume: f32,
    pub footstep_sound_radius: f32,
    pub landing_sound_radius: f32,
    pub capsule_half_height: f32,
    pub capsule_radius: f32,
    pub camera: CameraConfig,
}

impl Default for PlayerConfig {
    fn default() -> Self {
        Self {
            move_speed: 2.0,
            sprint_speed: 5.335,
            speed_change_rate: 10.0,
            rotation_smooth_time: 0.12,
            roll_distance: 2.0,
            roll_duration: 1.16,
            roll_profile: RollProfile::default(),
            jump_height: 1.2,
            gravity: -15.0,
            terminal_velocity: 53.0,
            jump_timeout: 0.5,
            fall_timeout: 0.15,
            grounded_offset: -0.14,
            grounded_radius: 0.28,
            aim_turn_rate: 10.0,
            max_health: 100.0,
            footstep_interval: 1.4,
            footstep_volume: 0.5,
            footstep_sound_radius: 15.0,
            landing_sound_radius: 25.0,
            capsule_half_height: 0.62,
            capsule_radius: 0.28,
            camera: CameraConfig::default(),
        }
    }
}

/// Orbit camera limits (pitch positive looks down).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CameraConfig {
    pub top_clamp: f32,
    pub bottom_clamp: f32,
    /// Follow target height above the player's feet.
    pub target_height: f32,
    /// Boom length behind the follow target.
    pub distance: f32,
}

impl Default for CameraConfig {
    fn default() -> Self {
        Self {
            top_clamp: 70.0,
            bottom_clamp: -30.0,
            target_height: 1.375,
            distance: 4.0,
        }
    }
}

/// Aim and hit-scan tunables.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct WeaponConfig {
    /// Minimum seconds between shots.
    pub fire_delay: f32,
    pub max_ammo: u32,
    pub initial_crosshair_scale: f32,
    pub min_crosshair_scale: f32,
    /// Exponential shrink rate of the crosshair while aiming.
    pub aim_shrink_speed: f32,
    /// Per-axis direction jitter per unit of crosshair scale.
    pub jitter: f32,
    pub range: f32,
    pub tracer_duration: f32,
    pub shot_damage: f32,
    pub gunshot_sound_radius: f32,
    pub gunshot_volume: f32,
    /// Muzzle position relative to the player's feet, in the player's frame.
    pub muzzle_offset: Vec3,
    /// Reload automatically when the last round is fired.
    pub auto_reload_on_empty: bool,
}

impl Default for WeaponConfig {
    fn default() -> Self {
        Self {
            fire_delay: 0.5,
            max_ammo: 6,
            initial_crosshair_scale: 1.25,
            min_crosshair_scale: 0.5,
            aim_shrink_speed: 0.5,
            jitter: 0.01,
            range: 100.0,
            tracer_duration: 0.05,
            shot_damage: 50.0,
            gunshot_sound_radius: 30.0,
            gunshot_volume: 1.0,
            muzzle_offset: Vec3::new(0.25, 1.4, 0.5),
            auto_reload_on_empty: true,
        }
    }
}

/// Zombie perception and behaviour tunables.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ZombieConfig {
    pub vision_range: f32,
    /// Half-angle of the vision cone.
    pub vision_angle: f32,
    pub eye_height: f32,
    pub attack_range: f32,
    pub attack_cooldown: f32,
    pub attack_damage: f32,
    pub chase_speed: f32,
    pub roam_speed: f32,
    /// Remaining path distance that counts as arrived.
    pub arrival_distance: f32,
    /// Search radius when snapping a roam point onto the nav surface.
    pub roam_sample_distance: f32,
    pub max_health: f32,
    pub capsule_half_height: f32,
    pub capsule_radius: f32,
}

impl Default for ZombieConfig {
    fn default() -> Self {
        Self {
            vision_range: 12.0,
            vision_angle: 60.0,
            eye_height: 1.5,
            attack_range: 2.0,
            attack_cooldown: 1.5,
            attack_damage: 10.0,
            chase_speed: 3.5,
            roam_speed: 1.5,
            arrival_distance: 0.5,
            roam_sample_distance: 2.0,
            max_health: 100.0,
            capsule_half_height: 0.6,
            capsule_radius: 0.3,
        }
    }
}

/// A rectangular region in the config file.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RectConfig {
    pub name: String,
    pub center: Vec3,
    /// Full size on local X and Z.
    pub size: Vec2,
    #[serde(default)]
    pub yaw_degrees: f32,
}

/// A circular region in the config file.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CircleConfig {
    pub name: String,
    pub center: Vec3,
    pub radius: f32,
}

/// Level layout the demo builds.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct WorldConfig {
    pub player_spawn: Vec3,
    pub village: RectConfig,
    pub spawn_points: Vec<CircleConfig>,
    /// Static blockers (houses), as rectangles.
    pub houses: Vec<RectConfig>,
    /// Half size of the walkable square around the origin.
    pub half_size: f32,
}

impl Default for WorldConfig {
    fn default() -> Self {
        Self {
            player_spawn: Vec3::new(0.0, 0.0, -30.0),
            village: RectConfig {
                name: "village".into(),
                center: Vec3::ZERO,
                size: Vec2::new(20.0, 20.0),
                yaw_degrees: 0.0,
            },
            spawn_points: vec![
                CircleConfig {
                    name: "north_field".into(),
                    center: Vec3::new(0.0, 0.0, 35.0),
                    radius: 4.0,
                },
                CircleConfig {
                    name: "east_woods".into(),
                    center: Vec3::new(35.0, 0.0, 5.0),
                    radius: 6.0,
                },
            ],
            houses: vec![
                RectConfig {
                    name: "chapel".into(),
                    center: Vec3::new(-4.0, 0.0, 3.0),
                    size: Vec2::new(4.0, 6.0),
                    yaw_degrees: 0.0,
                },
                RectConfig {
                    name: "barn".into(),
                    center: Vec3::new(6.0, 0.0, -4.0),
                    size: Vec2::new(5.0, 3.0),
                    yaw_degrees: 0.0,
                },
            ],
            half_size: 50.0,
        }
    }
}

impl GameConfig {
    /// Load config from `config.ron`. If the file is missing or invalid, returns default config.
    pub fn load() -> Self {
        let path = config_path();
        if !path.exists() {
            return Self::default();
        }
        match Self::load_from(&path) {
            Ok(c) => c,
            Err(e) => {
                log::warn!("{}, using defaults", e);
                Self::default()
            }
        }
    }

    /// Load and validate a config file.
    pub fn load_from(path: &Path) -> Result<Self, ConfigError> {
        let data = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let config: Self = ron::from_str(&data).map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })?;
        config.validate()?;
        Ok(config)
    }

    /// Save current config to `config.ron`. Logs on error.
    pub fn save(&self) {
        let path = config_path();
        if let Err(e) = self.save_to(&path) {
            log::warn!("Could not write config to {:?}: {}", path, e);
        }
    }

    pub fn save_to(&self, path: &Path) -> Result<(), ConfigError> {
        let s = ron::ser::to_string_pretty(self, ron::ser::PrettyConfig::default())?;
        std::fs::write(path, s).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })
    }

    /// Reject tunables the simulation cannot honour.
    pub fn validate(&self) -> Result<(), ConfigError> {
        let p = &self.player;
        let w = &self.weapon;
        let z = &self.zombie;

        if self.sim.tick_rate_hz <= 0.0 {
            return Err(invalid("sim.tick_rate_hz", "must be positive"));
        }
        if p.gravity >= 0.0 {
            return Err(invalid("player.gravity", "must be negative"));
        }
        if p.terminal_velocity <= 0.0 {
            return Err(invalid("player.terminal_velocity", "must be positive"));
        }
        if p.roll_duration <= 0.0 {
            return Err(invalid("player.roll_duration", "must be positive"));
        }
        if p.move_speed < 0.0 || p.sprint_speed < 0.0 {
            return Err(invalid("player.move_speed", "speeds cannot be negative"));
        }
        p.roll_profile.validate()?;

        if w.max_ammo == 0 {
            return Err(invalid("weapon.max_ammo", "must hold at least one round"));
        }
        if w.min_crosshair_scale <= 0.0 || w.min_crosshair_scale > w.initial_crosshair_scale {
            return Err(invalid(
                "weapon.min_crosshair_scale",
                format!(
                    "must be in (0, {}], got {}",
                    w.initial_crosshair_scale, w.min_crosshair_scale
                ),
            ));
        }
        if w.fire_delay < 0.0 || w.tracer_duration <= 0.0 {
            return Err(invalid("weapon.fire_delay", "timings must be positive"));
        }

        if !(z.vision_angle > 0.0 && z.vision_angle <= 180.0) {
            return Err(invalid("zombie.vision_angle", "must be in (0, 180]"));
        }
        if z.attack_range < 0.0 || z.vision_range < 0.0 {
            return Err(invalid("zombie.attack_range", "ranges cannot be negative"));
        }
        if z.attack_cooldown < 0.0 {
            return Err(invalid("zombie.attack_cooldown", "cannot be negative"));
        }
        Ok(())
    }
}

fn config_path() -> PathBuf {
    std::env::current_dir()
        .unwrap_or_else(|_| PathBuf::from("."))
        .join("config.ron")
}
