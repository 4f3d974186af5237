//! Head stabilization, look-at and footstep nod
//!
//! The head counters torso rotation so the gaze stays level while the
//! spine leans (anti-phase stabilization). A look-at target, when
//! supplied, overrides the stabilized angle within anatomical clamps. A
//! micro-nod fires on foot plants and decays back out.

use glam::Vec2;

use crate::core::config::HeadGazeConfig;
use crate::core::types::Context;
use crate::math::damp::{damp, damp_angle};
use crate::pose::Pose;
use crate::stages::{FrameAux, PoseStage};

pub struct HeadGazeStage {
    cfg: HeadGazeConfig,
    /// Damped head rotation
    rotation: f32,
    /// Remaining footstep nod displacement
    nod: f32,
    /// Previous frame's per-foot contact flags, for edge detection
    prev_contact: [bool; 2],
}

impl HeadGazeStage {
    pub fn new(cfg: HeadGazeConfig) -> Self {
        Self {
            cfg,
            rotation: 0.0,
            nod: 0.0,
            prev_contact: [false; 2],
        }
    }

    /// Head angle toward a look target, clamped to anatomical limits
    ///
    /// Vertically dominant targets clamp against max_pitch, everything
    /// else against max_yaw.
    fn look_angle(&self, head: Vec2, target_local: Vec2, facing: f32) -> f32 {
        let to_target = target_local - head;
        let angle = to_target.y.atan2(to_target.x * facing);
        if to_target.y.abs() > to_target.x.abs() {
            angle.clamp(-self.cfg.max_pitch, self.cfg.max_pitch)
        } else {
            angle.clamp(-self.cfg.max_yaw, self.cfg.max_yaw)
        }
    }
}

impl PoseStage for HeadGazeStage {
    fn name(&self) -> &'static str {
        "head_gaze"
    }

    fn apply(&mut self, dt: f32, ctx: &Context, pose: &mut Pose, aux: &mut FrameAux) {
        let target = match ctx.overlay.look_target {
            Some(world) => {
                let local = world - ctx.position;
                self.look_angle(pose.head.position, local, ctx.facing)
            }
            // Anti-phase: counter the torso rotation so the head stays level
            None => -pose.torso.rotation * self.cfg.stabilization_ratio,
        };
        self.rotation = damp_angle(self.rotation, target, self.cfg.yaw_damping, dt);

        // Footstep nod: a fresh foot contact injects, then the damp
        // bleeds it out
        let contact = aux.gait.contact;
        let stepped = (contact[0] && !self.prev_contact[0])
            || (contact[1] && !self.prev_contact[1]);
        self.prev_contact = contact;
        if stepped {
            self.nod = (self.nod + self.cfg.nod_amount).min(self.cfg.nod_amount * 2.0);
        }
        self.nod = damp(self.nod, 0.0, self.cfg.nod_decay, dt);

        pose.head.rotation = self.rotation;
        pose.head.position.y -= self.nod;
    }
}
