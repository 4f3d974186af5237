//! Additive wind/temperature overlay
//!
//! Runs last and only adds small offsets on top of the resolved pose, so
//! it never fights the IK stages. Wind leans the upper body sideways;
//! cold adds a shiver oscillation once temperature drops below threshold.

use glam::Vec2;

use crate::core::config::EnvironmentConfig;
use crate::core::types::{Context, Side};
use crate::pose::Pose;
use crate::stages::{FrameAux, PoseStage};

pub struct EnvironmentStage {
    cfg: EnvironmentConfig,
    /// Internal clock for the shiver oscillation (deterministic)
    time: f32,
}

impl EnvironmentStage {
    pub fn new(cfg: EnvironmentConfig) -> Self {
        Self { cfg, time: 0.0 }
    }
}

impl PoseStage for EnvironmentStage {
    fn name(&self) -> &'static str {
        "environment"
    }

    fn apply(&mut self, dt: f32, ctx: &Context, pose: &mut Pose, _aux: &mut FrameAux) {
        self.time += dt;

        let sway = ctx.wind * self.cfg.wind_sway;
        pose.torso.position.x += sway;
        pose.head.position.x += sway * self.cfg.head_wind_scale;
        for side in Side::BOTH {
            pose.arm_mut(side).hand.position.x += sway * self.cfg.hand_wind_scale;
        }

        if ctx.temperature < self.cfg.shiver_threshold {
            // Shiver hardest at temperature 0, fading out at the threshold
            let cold = (self.cfg.shiver_threshold - ctx.temperature) / self.cfg.shiver_threshold;
            let shiver = (self.time * self.cfg.shiver_freq).sin() * self.cfg.shiver_amp * cold;
            pose.torso.position.y += shiver;
            pose.head.position.y += shiver;
        }
    }
}
