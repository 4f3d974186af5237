//! Gait phase state machine and foot-target path generation
//!
//! Owns the master gait phase. While moving, the phase advances at a
//! speed-scaled cadence; while stationary it relaxes toward a rest phase
//! so a restart always begins from the same posture. Foot targets follow
//! a stance/swing split: flat weight transfer inside the stance band, a
//! cubic Bezier clearance arc outside it.

use glam::Vec2;
use std::f32::consts::TAU;

use crate::core::config::LocomotionConfig;
use crate::core::types::{Context, Side};
use crate::math::damp::damp;
use crate::math::{phase_delta, wrap_phase};
use crate::pose::{Pose, Skeleton};
use crate::stages::{FrameAux, PoseStage};

/// How the stride offset splits across axes for the current velocity
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum MotionClass {
    Horizontal,
    Vertical,
    Diagonal,
}

pub struct LocomotionStage {
    cfg: LocomotionConfig,
    /// Lateral stagger of each foot's neutral position
    foot_split: f32,
    /// Master gait phase in [0, 1)
    phase: f32,
    /// Damped lateral weight shift
    weight_shift: f32,
}

impl LocomotionStage {
    pub fn new(cfg: LocomotionConfig, skeleton: &Skeleton) -> Self {
        let phase = cfg.rest_phase;
        Self {
            cfg,
            foot_split: skeleton.hip_spacing * 0.5,
            phase,
            weight_shift: 0.0,
        }
    }

    fn classify(&self, velocity: Vec2) -> MotionClass {
        let ax = velocity.x.abs();
        let ay = velocity.y.abs();
        let ratio = self.cfg.motion_class_ratio;
        if ay <= ratio * ax {
            MotionClass::Horizontal
        } else if ax <= ratio * ay {
            MotionClass::Vertical
        } else {
            MotionClass::Diagonal
        }
    }

    fn class_blend(&self, class: MotionClass) -> [f32; 2] {
        match class {
            MotionClass::Horizontal => self.cfg.horizontal_class_blend,
            MotionClass::Vertical => self.cfg.vertical_class_blend,
            MotionClass::Diagonal => self.cfg.diagonal_class_blend,
        }
    }

    /// Stride-space path for one foot: x = progress along stride
    /// (-stride/2 .. +stride/2), y = clearance height
    fn foot_path(&self, foot_phase: f32, stride: f32) -> Vec2 {
        let begin = self.cfg.stance_begin;
        let end = self.cfg.stance_end;

        if foot_phase >= begin && foot_phase < end {
            // Stance: weight transfer, a small forward creep with no
            // vertical motion. The plant freeze in the foot-IK stage
            // overrides this while the foot is actually down.
            let u = (foot_phase - begin) / (end - begin);
            let x = stride * 0.5 + self.cfg.stance_advance * stride * u;
            Vec2::new(x, 0.0)
        } else {
            // Swing: phase runs end -> begin through the cycle boundary
            let span = 1.0 - (end - begin);
            let s = wrap_phase(foot_phase - end) / span;
            swing_arc(s, stride, self.cfg.step_height)
        }
    }
}

/// Cubic Bezier clearance arc from the back of the stride to the front
///
/// Control heights of 4h/3 put the curve's peak at exactly h for the
/// symmetric control placement used here.
fn swing_arc(s: f32, stride: f32, clearance: f32) -> Vec2 {
    let s = s.clamp(0.0, 1.0);
    let p0 = Vec2::new(-stride * 0.5, 0.0);
    let p1 = Vec2::new(-stride * 0.15, clearance * 4.0 / 3.0);
    let p2 = Vec2::new(stride * 0.15, clearance * 4.0 / 3.0);
    let p3 = Vec2::new(stride * 0.5, 0.0);

    let t = s;
    let u = 1.0 - t;
    p0 * (u * u * u) + p1 * (3.0 * u * u * t) + p2 * (3.0 * u * t * t) + p3 * (t * t * t)
}

impl PoseStage for LocomotionStage {
    fn name(&self) -> &'static str {
        "locomotion"
    }

    fn apply(&mut self, dt: f32, ctx: &Context, pose: &mut Pose, aux: &mut FrameAux) {
        let speed = ctx.speed();
        let speed_ratio = (speed / self.cfg.max_speed).clamp(0.0, 1.0);
        let moving = ctx.grounded && speed > self.cfg.moving_threshold;

        let cadence = self.cfg.base_cadence * (1.0 + speed_ratio * self.cfg.cadence_scale);
        if moving {
            self.phase = wrap_phase(self.phase + dt * cadence);
        } else {
            // Relax toward the rest phase along the shortest wrap
            let delta = phase_delta(self.phase, self.cfg.rest_phase);
            let step = damp(0.0, delta, self.cfg.rest_relax_speed, dt);
            self.phase = wrap_phase(self.phase + step);
        }

        let foot_phase = [
            self.phase,
            wrap_phase(self.phase + 0.5 + self.cfg.asymmetry),
        ];

        let stride = self.cfg.stride_length * speed_ratio;
        let class = self.classify(ctx.velocity);
        let blend = self.class_blend(class);
        let dir = if speed > self.cfg.moving_threshold {
            ctx.velocity / speed
        } else {
            Vec2::new(ctx.facing, 0.0)
        };

        let mut foot_target = [Vec2::ZERO; 2];
        let mut contact = [false; 2];
        for side in Side::BOTH {
            let i = side.index();
            let neutral_x = ctx.facing * side.sign() * self.foot_split;

            let target = if moving {
                let path = self.foot_path(foot_phase[i], stride);
                Vec2::new(
                    neutral_x + path.x * dir.x * blend[0],
                    (path.x * dir.y * blend[1]).max(0.0) + path.y,
                )
            } else {
                Vec2::new(neutral_x, 0.0)
            };
            foot_target[i] = target;

            let w = self.cfg.contact_window;
            contact[i] = moving && (foot_phase[i] < w || foot_phase[i] > 1.0 - w);
        }

        // Lateral weight shift, damped so balance recovers instead of
        // snapping. Low stamina exaggerates the sway.
        let fatigue = 1.0 + (1.0 - ctx.stamina) * self.cfg.fatigue_shift_gain;
        let shift_target = if moving {
            (self.phase * TAU).sin() * self.cfg.weight_shift_amount * fatigue
        } else {
            0.0
        };
        self.weight_shift = damp(
            self.weight_shift,
            shift_target,
            self.cfg.weight_shift_damping,
            dt,
        );

        // Wounded characters carry the pelvis lower
        let slump = (1.0 - ctx.health) * self.cfg.low_health_slump;

        // An authoritative pelvis offset supersedes the internal weight
        // shift and slump
        match ctx.overlay.pelvis_offset {
            Some(offset) => pose.shift_body(offset),
            None => pose.shift_body(Vec2::new(self.weight_shift, -slump)),
        }

        // Spine bend: overlay wins over the velocity-derived approximation
        let lean = (ctx.velocity.x * self.cfg.spine_lean_per_speed)
            .clamp(-self.cfg.max_spine_bend, self.cfg.max_spine_bend);
        pose.torso.rotation = ctx.overlay.spine_bend.unwrap_or(lean);

        aux.gait.phase = self.phase;
        aux.gait.foot_phase = foot_phase;
        aux.gait.foot_target = foot_target;
        aux.gait.contact = contact;
        aux.gait.moving = moving;
        aux.gait.cadence = cadence;
        aux.gait.weight_shift = self.weight_shift;
        aux.gait.speed_ratio = speed_ratio;
    }
}
