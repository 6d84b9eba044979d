//! Outbound presentation signals: animation parameters, audio cues and
//! tracer trails. The simulation never reads anything back from these.

use engine_core::Vec3;
use hecs::Entity;
use std::collections::HashMap;

/// Who an animation or audio signal belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum AgentId {
    Player,
    Zombie(Entity),
}

/// Animator parameter names.
pub mod params {
    pub const SPEED: &str = "Speed";
    pub const MOTION_SPEED: &str = "MotionSpeed";
    pub const GROUNDED: &str = "Grounded";
    pub const JUMP: &str = "Jump";
    pub const FREE_FALL: &str = "FreeFall";
    pub const ROLL: &str = "Roll";
    pub const AIM: &str = "Aim";
    pub const IS_WALKING: &str = "IsWalking";
    pub const IS_RUNNING: &str = "IsRunning";
    pub const ATTACK: &str = "Attack";
    pub const DEATH: &str = "Death";
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum AudioCue {
    Footstep,
    Landing,
    Gunshot,
}

/// Handle for one tracer trail.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct TrailId(pub u64);

pub trait AnimationSink {
    fn set_bool(&mut self, agent: AgentId, name: &'static str, value: bool);
    fn set_float(&mut self, agent: AgentId, name: &'static str, value: f32);
    fn trigger(&mut self, agent: AgentId, name: &'static str);
}

pub trait AudioSink {
    fn play(&mut self, cue: AudioCue, position: Vec3, volume: f32);
}

pub trait EffectSink {
    fn spawn_trail(&mut self, id: TrailId, from: Vec3);
    fn move_trail(&mut self, id: TrailId, head: Vec3);
    fn despawn_trail(&mut self, id: TrailId);
}

/// Everything a front end listens to.
pub trait Presentation: AnimationSink + AudioSink + EffectSink {}

impl<T: AnimationSink + AudioSink + EffectSink> Presentation for T {}

/// Drops every signal. Used by headless runs with no front end.
#[derive(Debug, Default, Clone, Copy)]
pub struct NullPresentation;

impl AnimationSink for NullPresentation {
    fn set_bool(&mut self, _: AgentId, _: &'static str, _: bool) {}
    fn set_float(&mut self, _: AgentId, _: &'static str, _: f32) {}
    fn trigger(&mut self, _: AgentId, _: &'static str) {}
}

impl AudioSink for NullPresentation {
    fn play(&mut self, _: AudioCue, _: Vec3, _: f32) {}
}

impl EffectSink for NullPresentation {
    fn spawn_trail(&mut self, _: TrailId, _: Vec3) {}
    fn move_trail(&mut self, _: TrailId, _: Vec3) {}
    fn despawn_trail(&mut self, _: TrailId) {}
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PlayedCue {
    pub cue: AudioCue,
    pub position: Vec3,
    pub volume: f32,
}

/// Keeps the latest value of every parameter and a log of one-shot signals.
#[derive(Debug, Default)]
pub struct RecordingPresentation {
    pub bools: HashMap<(AgentId, &'static str), bool>,
    pub floats: HashMap<(AgentId, &'static str), f32>,
    pub triggers: Vec<(AgentId, &'static str)>,
    pub cues: Vec<PlayedCue>,
    /// Current head of every live trail.
    pub trails: HashMap<TrailId, Vec3>,
    pub trails_spawned: usize,
}

impl RecordingPresentation {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn bool(&self, agent: AgentId, name: &'static str) -> Option<bool> {
        self.bools.get(&(agent, name)).copied()
    }

    pub fn float(&self, agent: AgentId, name: &'static str) -> Option<f32> {
        self.floats.get(&(agent, name)).copied()
    }

    /// How many times `name` fired for `agent`.
    pub fn trigger_count(&self, agent: AgentId, name: &'static str) -> usize {
        self.triggers.iter().filter(|&&t| t == (agent, name)).count()
    }

    pub fn cue_count(&self, cue: AudioCue) -> usize {
        self.cues.iter().filter(|c| c.cue == cue).count()
    }
}

impl AnimationSink for RecordingPresentation {
    fn set_bool(&mut self, agent: AgentId, name: &'static str, value: bool) {
        self.bools.insert((agent, name), value);
    }

    fn set_float(&mut self, agent: AgentId, name: &'static str, value: f32) {
        self.floats.insert((agent, name), value);
    }

    fn trigger(&mut self, agent: AgentId, name: &'static str) {
        self.triggers.push((agent, name));
    }
}

impl AudioSink for RecordingPresentation {
    fn play(&mut self, cue: AudioCue, position: Vec3, volume: f32) {
        self.cues.push(PlayedCue {
            cue,
            position,
            volume,
        });
    }
}

impl EffectSink for RecordingPresentation {
    fn spawn_trail(&mut self, id: TrailId, from: Vec3) {
        self.trails.insert(id, from);
        self.trails_spawned += 1;
    }

    fn move_trail(&mut self, id: TrailId, head: Vec3) {
        if let Some(h) = self.trails.get_mut(&id) {
            *h = head;
        }
    }

    fn despawn_trail(&mut self, id: TrailId) {
        self.trails.remove(&id);
    }
}
