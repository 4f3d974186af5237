//! Core type definitions used throughout the codebase

use glam::Vec2;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Unique identifier for animated characters
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct CharacterId(pub Uuid);

impl CharacterId {
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for CharacterId {
    fn default() -> Self {
        Self::new()
    }
}

/// Body side, used to index paired limbs
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Side {
    Left,
    Right,
}

impl Side {
    pub const BOTH: [Side; 2] = [Side::Left, Side::Right];

    /// Index into per-foot/per-hand arrays
    pub fn index(self) -> usize {
        match self {
            Side::Left => 0,
            Side::Right => 1,
        }
    }

    pub fn opposite(self) -> Side {
        match self {
            Side::Left => Side::Right,
            Side::Right => Side::Left,
        }
    }

    /// Lateral sign for side-view stagger (left feet sit slightly behind)
    pub fn sign(self) -> f32 {
        match self {
            Side::Left => -1.0,
            Side::Right => 1.0,
        }
    }
}

/// Action-state label driving combat posing
///
/// The game-logic core owns the real action state machine; the animator
/// only reads the label plus a normalized action time.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
pub enum ActionState {
    #[default]
    Idle,
    Attacking,
    Blocking,
    Rolling,
}

/// Discrete event that injects a directional impulse into secondary motion
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ImpulseEvent {
    /// Character touched ground after being airborne
    Landing,
    /// Character took a hit
    Hurt,
    /// Character's guard absorbed a hit
    BlockImpact,
}

/// Optional authoritative overlay values
///
/// When the game logic computes a higher-fidelity value (e.g. spine bend
/// from its own physics), it supplies it here and the animator uses it
/// instead of its internal approximation.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize)]
pub struct Overlay {
    /// Torso/spine rotation in radians, overrides the velocity-derived lean
    pub spine_bend: Option<f32>,
    /// Pelvis offset in character-local units, overrides the gait weight shift
    pub pelvis_offset: Option<Vec2>,
    /// World-space point the head should look at
    pub look_target: Option<Vec2>,
}

/// Per-frame input from the external simulation layer
///
/// Immutable for the duration of a frame. Every field is defensively
/// clamped by [`Context::sanitized`] before the pipeline runs, so a missing
/// or garbage value degrades to a neutral pose rather than an error.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Context {
    /// Facing sign: +1.0 faces right, -1.0 faces left
    pub facing: f32,
    /// World position of the character root (ground point under the pelvis)
    pub position: Vec2,
    /// World velocity in units per second
    pub velocity: Vec2,
    /// Current action-state label
    pub action: ActionState,
    /// Normalized progress through the current action, 0.0-1.0
    pub action_time: f32,
    /// True while standing on ground
    pub grounded: bool,
    /// Ground slope under the character (rise per unit forward)
    pub ground_slope: f32,
    /// Wind strength, -1.0 to 1.0 (sign is world x direction)
    pub wind: f32,
    /// Ambient temperature, 0.0 = freezing, 1.0 = warm
    pub temperature: f32,
    /// Stamina ratio, 0.0-1.0
    pub stamina: f32,
    /// Health ratio, 0.0-1.0
    pub health: f32,
    /// Discrete events for this frame (hurt, block impact)
    ///
    /// Landing is detected internally from the grounded rising edge and
    /// does not need to be supplied here.
    pub impulses: Vec<ImpulseEvent>,
    /// Authoritative overrides, see [`Overlay`]
    pub overlay: Overlay,
}

impl Default for Context {
    fn default() -> Self {
        Self {
            facing: 1.0,
            position: Vec2::ZERO,
            velocity: Vec2::ZERO,
            action: ActionState::Idle,
            action_time: 0.0,
            grounded: true,
            ground_slope: 0.0,
            wind: 0.0,
            temperature: 1.0,
            stamina: 1.0,
            health: 1.0,
            impulses: Vec::new(),
            overlay: Overlay::default(),
        }
    }
}

impl Context {
    /// Return a copy with every field clamped into its documented range
    ///
    /// Non-finite values fall back to the neutral default. The animator
    /// calls this once per frame so the stages never see bad input.
    pub fn sanitized(&self) -> Context {
        let mut ctx = self.clone();
        ctx.facing = if ctx.facing.is_finite() && ctx.facing < 0.0 {
            -1.0
        } else {
            1.0
        };
        if !ctx.position.is_finite() {
            ctx.position = Vec2::ZERO;
        }
        if !ctx.velocity.is_finite() {
            ctx.velocity = Vec2::ZERO;
        }
        ctx.action_time = finite_or(ctx.action_time, 0.0).clamp(0.0, 1.0);
        ctx.ground_slope = finite_or(ctx.ground_slope, 0.0).clamp(-2.0, 2.0);
        ctx.wind = finite_or(ctx.wind, 0.0).clamp(-1.0, 1.0);
        ctx.temperature = finite_or(ctx.temperature, 1.0).clamp(0.0, 1.0);
        ctx.stamina = finite_or(ctx.stamina, 1.0).clamp(0.0, 1.0);
        ctx.health = finite_or(ctx.health, 1.0).clamp(0.0, 1.0);
        if let Some(bend) = ctx.overlay.spine_bend {
            if !bend.is_finite() {
                ctx.overlay.spine_bend = None;
            }
        }
        if let Some(off) = ctx.overlay.pelvis_offset {
            if !off.is_finite() {
                ctx.overlay.pelvis_offset = None;
            }
        }
        if let Some(target) = ctx.overlay.look_target {
            if !target.is_finite() {
                ctx.overlay.look_target = None;
            }
        }
        ctx
    }

    /// Speed along both axes, units per second
    pub fn speed(&self) -> f32 {
        self.velocity.length()
    }
}

fn finite_or(value: f32, fallback: f32) -> f32 {
    if value.is_finite() {
        value
    } else {
        fallback
    }
}
