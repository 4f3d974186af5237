//! Orchestrator - runs the stage pipeline once per frame
//!
//! One `Animator` per character owns the seven stages, the shared pose
//! and the skeleton. `advance` is the crate's main entry point: it
//! sanitizes the context, rebuilds the pose top-down, runs the stages in
//! their fixed order and assembles the frame result for the renderer.
//!
//! Determinism: given an identical sequence of (Context, dt) pairs, a
//! freshly constructed animator reproduces the identical pose sequence.
//! Nothing here reads clocks or random state.

use glam::Vec2;
use serde::{Deserialize, Serialize};

use crate::core::config::AnimationConfig;
use crate::core::error::{Result, SinewError};
use crate::core::types::{CharacterId, Context, ImpulseEvent};
use crate::math::damp::damp;
use crate::pose::{Pose, Skeleton};
use crate::stages::arm_ik::ArmIkStage;
use crate::stages::combat::CombatStage;
use crate::stages::environment::EnvironmentStage;
use crate::stages::foot_ik::FootIkStage;
use crate::stages::head_gaze::HeadGazeStage;
use crate::stages::locomotion::LocomotionStage;
use crate::stages::secondary::SecondaryMotionStage;
use crate::stages::{AnimEvent, EquipmentPose, FrameAux, PoseStage};

/// Flattened transform the renderer applies to the local-space pose
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct RenderTransform {
    pub scale: Vec2,
    /// Whole-body lean in radians, damped from horizontal velocity
    pub rotation: f32,
    /// World position of the character root
    pub offset: Vec2,
}

/// Small procedural metrics other systems subscribe to
/// (footstep audio, dust particles, camera shake)
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct FrameMetrics {
    pub gait_phase: f32,
    pub cadence: f32,
    pub moving: bool,
    pub weight_shift: f32,
    pub planted: [bool; 2],
    pub contact_time: [f32; 2],
    pub roll_phase: [f32; 2],
}

/// Everything one frame produces for the rendering/audio/VFX layers
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Frame {
    pub pose: Pose,
    pub render: RenderTransform,
    /// Cloth chain points, character-local, anchor first
    pub cloth: Vec<Vec2>,
    /// Hair chain points, character-local, anchor first
    pub hair: Vec<Vec2>,
    pub equipment: Vec<EquipmentPose>,
    pub metrics: FrameMetrics,
    pub events: Vec<AnimEvent>,
}

/// Per-character animation pipeline
pub struct Animator {
    id: CharacterId,
    skeleton: Skeleton,
    config: AnimationConfig,
    stages: Vec<Box<dyn PoseStage + Send>>,
    pose: Pose,
    /// Previous frame's grounded flag, for landing detection
    prev_grounded: bool,
    /// Damped render lean
    lean: f32,
}

impl Animator {
    /// Build the pipeline for one character
    ///
    /// Validates the config and skeleton up front - the only place the
    /// crate can fail. A constructed animator never errors per frame.
    pub fn new(id: CharacterId, skeleton: Skeleton, config: AnimationConfig) -> Result<Self> {
        config.validate().map_err(SinewError::InvalidConfig)?;
        skeleton.validate().map_err(SinewError::InvalidSkeleton)?;

        // Cross-check: the resting hand must be reachable or the idle
        // pose parks permanently on the solver's clamp
        if config.combat.rest_drop >= skeleton.arm_reach() {
            return Err(SinewError::InvalidConfig(format!(
                "rest_drop ({}) must be < arm reach ({})",
                config.combat.rest_drop,
                skeleton.arm_reach()
            )));
        }

        let stages: Vec<Box<dyn PoseStage + Send>> = vec![
            Box::new(LocomotionStage::new(config.locomotion.clone(), &skeleton)),
            Box::new(FootIkStage::new(config.foot.clone(), &skeleton)?),
            Box::new(CombatStage::new(config.combat.clone())),
            Box::new(ArmIkStage::new(config.arm.clone(), &skeleton)?),
            Box::new(HeadGazeStage::new(config.head.clone())),
            Box::new(SecondaryMotionStage::new(config.secondary.clone())),
            Box::new(EnvironmentStage::new(config.environment.clone())),
        ];

        tracing::debug!(id = ?id, "animator constructed with {} stages", stages.len());

        Ok(Self {
            id,
            skeleton,
            config,
            stages,
            pose: Pose::neutral(&skeleton, 1.0),
            prev_grounded: true,
            lean: 0.0,
        })
    }

    /// Convenience constructor with the standard biped and default tuning
    pub fn with_defaults(id: CharacterId) -> Result<Self> {
        Self::new(id, Skeleton::biped(), AnimationConfig::default())
    }

    pub fn id(&self) -> CharacterId {
        self.id
    }

    pub fn skeleton(&self) -> &Skeleton {
        &self.skeleton
    }

    pub fn config(&self) -> &AnimationConfig {
        &self.config
    }

    /// Last resolved pose, character-local
    pub fn pose(&self) -> &Pose {
        &self.pose
    }

    /// Advance the pipeline by `dt` seconds
    ///
    /// Strict single pass: stages run in construction order against the
    /// shared pose, each reading only what earlier stages wrote.
    pub fn advance(&mut self, dt: f32, ctx: &Context) -> Frame {
        let ctx = ctx.sanitized();
        let dt = if dt.is_finite() { dt.max(0.0) } else { 0.0 };

        // Landing is the one impulse the animator derives itself
        let mut impulses = ctx.impulses.clone();
        if ctx.grounded && !self.prev_grounded {
            impulses.push(ImpulseEvent::Landing);
        }
        self.prev_grounded = ctx.grounded;

        let mut aux = FrameAux::new(impulses);
        self.pose.reset(&self.skeleton, ctx.facing);
        for stage in &mut self.stages {
            stage.apply(dt, &ctx, &mut self.pose, &mut aux);
        }

        let lean_target = (ctx.velocity.x * self.config.render.lean_per_speed)
            .clamp(-self.config.render.max_lean, self.config.render.max_lean);
        self.lean = damp(self.lean, lean_target, self.config.render.lean_damping, dt);

        Frame {
            pose: self.pose,
            render: RenderTransform {
                scale: Vec2::ONE,
                rotation: self.lean,
                offset: ctx.position,
            },
            cloth: std::mem::take(&mut aux.secondary.cloth),
            hair: std::mem::take(&mut aux.secondary.hair),
            equipment: std::mem::take(&mut aux.secondary.equipment),
            metrics: FrameMetrics {
                gait_phase: aux.gait.phase,
                cadence: aux.gait.cadence,
                moving: aux.gait.moving,
                weight_shift: aux.gait.weight_shift,
                planted: aux.feet.planted,
                contact_time: aux.feet.contact_time,
                roll_phase: aux.feet.roll_phase,
            },
            events: std::mem::take(&mut aux.events),
        }
    }
}
