//! Arm IK resolution and wrist orientation
//!
//! Consumes the combat stage's hand targets and owns all arm joint
//! resolution: elbow placement through the shared two-bone solver with an
//! anatomical bend preference, wrist rotation from the forearm direction,
//! and an action-state pronation schedule.

use glam::Vec2;
use std::f32::consts::TAU;

use crate::core::config::ArmIkConfig;
use crate::core::error::Result;
use crate::core::types::{ActionState, Context, Side};
use crate::math::damp::{damp, damp_angle};
use crate::math::ik::{BendDir, TwoBoneIk};
use crate::pose::{Pose, Skeleton};
use crate::stages::{FrameAux, PoseStage};

/// Per-hand wrist smoothing state
#[derive(Debug, Clone, Copy, Default)]
struct WristState {
    rotation: f32,
    pronation: f32,
}

pub struct ArmIkStage {
    cfg: ArmIkConfig,
    arm: TwoBoneIk,
    hand_length: f32,
    wrists: [WristState; 2],
}

impl ArmIkStage {
    pub fn new(cfg: ArmIkConfig, skeleton: &Skeleton) -> Result<Self> {
        Ok(Self {
            cfg,
            arm: TwoBoneIk::new(skeleton.upper_arm, skeleton.forearm)?,
            hand_length: skeleton.hand_length,
            wrists: [WristState::default(); 2],
        })
    }

    /// Pronation target for the current action state
    fn pronation_target(&self, ctx: &Context, aux: &FrameAux) -> f32 {
        match ctx.action {
            ActionState::Attacking => {
                // Pronated only through the active swing window
                if ctx.action_time >= self.cfg.swing_begin && ctx.action_time <= self.cfg.swing_end
                {
                    -self.cfg.pronation_amount
                } else {
                    self.cfg.attack_supination
                }
            }
            ActionState::Blocking => self.cfg.guard_supination,
            _ => {
                // Near-neutral with a faint walk-cycle sway
                (aux.gait.phase * TAU).sin() * self.cfg.idle_wrist_sway * aux.gait.speed_ratio
            }
        }
    }
}

impl PoseStage for ArmIkStage {
    fn name(&self) -> &'static str {
        "arm_ik"
    }

    fn apply(&mut self, dt: f32, ctx: &Context, pose: &mut Pose, aux: &mut FrameAux) {
        let pronation_target = self.pronation_target(ctx, aux);

        for side in Side::BOTH {
            let i = side.index();
            let shoulder = pose.arm(side).shoulder.position;
            let target = aux.hands.target[i];

            // Elbow trails the facing direction (anatomical bend-down)
            let bend = BendDir::from_sign(-ctx.facing);
            let solution = self.arm.solve(shoulder, target, bend);

            let forearm_dir = solution.end - solution.mid;
            let rotation_target = forearm_dir.y.atan2(forearm_dir.x * ctx.facing);

            self.wrists[i].rotation = damp_angle(
                self.wrists[i].rotation,
                rotation_target,
                self.cfg.wrist_responsiveness,
                dt,
            );
            self.wrists[i].pronation = damp(
                self.wrists[i].pronation,
                pronation_target,
                self.cfg.wrist_responsiveness,
                dt,
            );

            let rotation = self.wrists[i].rotation;
            let hand_dir = Vec2::new(rotation.cos() * ctx.facing, rotation.sin());

            let arm = pose.arm_mut(side);
            arm.elbow.position = solution.mid;
            arm.wrist.position = solution.end;
            arm.wrist.rotation = rotation;
            arm.wrist.pronation = self.wrists[i].pronation;
            arm.hand.position = solution.end + hand_dir * self.hand_length;
            arm.hand.rotation = rotation;

            aux.wrists.rotation[i] = rotation;
            aux.wrists.pronation[i] = self.wrists[i].pronation;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::config::AnimationConfig;
    use crate::stages::HandTargets;

    const DT: f32 = 1.0 / 60.0;

    fn stage() -> ArmIkStage {
        ArmIkStage::new(AnimationConfig::default().arm, &Skeleton::biped()).unwrap()
    }

    fn step_with_target(stage: &mut ArmIkStage, ctx: &Context, target: Vec2) -> (Pose, FrameAux) {
        let skeleton = Skeleton::biped();
        let mut pose = Pose::neutral(&skeleton, ctx.facing);
        let mut aux = FrameAux::default();
        aux.hands = HandTargets {
            target: [target, target],
        };
        stage.apply(DT, ctx, &mut pose, &mut aux);
        (pose, aux)
    }

    #[test]
    fn test_arm_segments_preserved() {
        let mut stage = stage();
        let skeleton = Skeleton::biped();
        let ctx = Context::default();
        for target in [
            Vec2::new(20.0, 60.0),
            Vec2::new(-15.0, 45.0),
            Vec2::new(500.0, 500.0), // unreachable, clamped
        ] {
            let (pose, _) = step_with_target(&mut stage, &ctx, target);
            for side in Side::BOTH {
                let arm = pose.arm(side);
                let upper = (arm.elbow.position - arm.shoulder.position).length();
                let fore = (arm.wrist.position - arm.elbow.position).length();
                assert!((upper - skeleton.upper_arm).abs() < 1e-2);
                assert!((fore - skeleton.forearm).abs() < 1e-2);
            }
        }
    }

    #[test]
    fn test_hand_extends_past_wrist_by_hand_length() {
        let mut stage = stage();
        let skeleton = Skeleton::biped();
        let ctx = Context::default();
        let (pose, _) = step_with_target(&mut stage, &ctx, Vec2::new(25.0, 55.0));
        for side in Side::BOTH {
            let arm = pose.arm(side);
            let reach = (arm.hand.position - arm.wrist.position).length();
            assert!((reach - skeleton.hand_length).abs() < 1e-3);
        }
    }

    #[test]
    fn test_pronation_window_during_attack() {
        let cfg = AnimationConfig::default().arm;
        for (t, expect_pronated) in [
            (0.1, false),
            (0.3, true),
            (0.5, true),
            (0.7, true),
            (0.9, false),
        ] {
            let mut stage = stage();
            let ctx = Context {
                action: ActionState::Attacking,
                action_time: t,
                ..Default::default()
            };
            // Settle the damped pronation onto its target
            let mut aux = FrameAux::default();
            for _ in 0..600 {
                let (_, a) = step_with_target(&mut stage, &ctx, Vec2::new(30.0, 55.0));
                aux = a;
            }
            let pronation = aux.wrists.pronation[1];
            if expect_pronated {
                assert!(
                    (pronation + cfg.pronation_amount).abs() < 0.02,
                    "t={t}: expected pronated, got {pronation}"
                );
            } else {
                assert!(pronation > 0.0, "t={t}: expected supinated, got {pronation}");
            }
        }
    }

    #[test]
    fn test_blocking_holds_guard_supination() {
        let cfg = AnimationConfig::default().arm;
        let mut stage = stage();
        let ctx = Context {
            action: ActionState::Blocking,
            ..Default::default()
        };
        let mut aux = FrameAux::default();
        for _ in 0..600 {
            let (_, a) = step_with_target(&mut stage, &ctx, Vec2::new(10.0, 75.0));
            aux = a;
        }
        assert!((aux.wrists.pronation[0] - cfg.guard_supination).abs() < 0.02);
        assert!((aux.wrists.pronation[1] - cfg.guard_supination).abs() < 0.02);
    }

    #[test]
    fn test_wrist_rotation_is_damped() {
        let mut stage = stage();
        let ctx = Context::default();
        // Settle on a low target, then jump to a high one
        for _ in 0..600 {
            step_with_target(&mut stage, &ctx, Vec2::new(20.0, 40.0));
        }
        let before = stage.wrists[1].rotation;
        let (_, aux) = step_with_target(&mut stage, &ctx, Vec2::new(-10.0, 80.0));
        let after = aux.wrists.rotation[1];
        // One damped frame covers ~18% of the gap; a snap would cover it all
        assert!(
            (after - before).abs() < 1.0,
            "wrist snapped {before} -> {after} in one frame"
        );
    }
}
