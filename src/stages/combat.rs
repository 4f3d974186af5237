//! Action-state driven hand targeting
//!
//! Translates the action-state label into per-hand target intents. This
//! stage only decides WHERE the hands want to be; the arm-IK stage owns
//! all joint resolution. Targets are damped continuously so an action
//! change never snaps the hands.

use glam::Vec2;
use std::f32::consts::{PI, TAU};

use crate::core::config::CombatConfig;
use crate::core::types::{ActionState, Context, Side};
use crate::math::damp::damp_vec2;
use crate::pose::Pose;
use crate::stages::{FrameAux, PoseStage};

/// The hand that leads attacks and carries equipment
pub const WEAPON_HAND: Side = Side::Right;

pub struct CombatStage {
    cfg: CombatConfig,
    /// Smoothed hand targets in character-local space
    targets: [Vec2; 2],
    initialized: bool,
}

impl CombatStage {
    pub fn new(cfg: CombatConfig) -> Self {
        Self {
            cfg,
            targets: [Vec2::ZERO; 2],
            initialized: false,
        }
    }

    fn rest_target(&self, pose: &Pose, side: Side, facing: f32) -> Vec2 {
        pose.arm(side).shoulder.position
            + Vec2::new(facing * self.cfg.rest_forward, -self.cfg.rest_drop)
    }

    /// Desired hand position for the current action, before damping
    fn desired_target(&self, side: Side, ctx: &Context, pose: &Pose, aux: &FrameAux) -> Vec2 {
        let facing = ctx.facing;
        let rest = self.rest_target(pose, side, facing);

        match ctx.action {
            ActionState::Attacking => {
                // Windup -> peak -> retract envelope on the weapon hand
                let reach = (ctx.action_time * PI).sin() * self.cfg.attack_strength;
                if side == WEAPON_HAND {
                    rest + Vec2::new(facing * (self.cfg.attack_forward_base + reach), 0.0)
                } else {
                    rest + Vec2::new(-facing * self.cfg.offhand_pull, 0.0)
                }
            }
            ActionState::Blocking => {
                pose.torso.position
                    + Vec2::new(facing * self.cfg.guard_forward, self.cfg.guard_height)
                    + Vec2::new(facing * side.sign(), 0.0)
            }
            ActionState::Rolling => {
                // Tucked symmetrically against the torso
                pose.torso.position
                    + Vec2::new(
                        facing * self.cfg.tuck_offset[0] * side.sign(),
                        -self.cfg.tuck_offset[1],
                    )
            }
            ActionState::Idle => {
                // Walk swing: each arm counters its own-side leg, so it
                // shares the opposite foot's phase
                let swing = if aux.gait.moving {
                    let phase = aux.gait.foot_phase[side.opposite().index()];
                    (phase * TAU).sin() * self.cfg.swing_amount * aux.gait.speed_ratio
                } else {
                    0.0
                };
                rest + Vec2::new(facing * swing, 0.0)
            }
        }
    }
}

impl PoseStage for CombatStage {
    fn name(&self) -> &'static str {
        "combat"
    }

    fn apply(&mut self, dt: f32, ctx: &Context, pose: &mut Pose, aux: &mut FrameAux) {
        if !self.initialized {
            // First frame starts from the rest pose instead of the origin
            for side in Side::BOTH {
                self.targets[side.index()] = self.rest_target(pose, side, ctx.facing);
            }
            self.initialized = true;
        }

        // Guard lean is the one pose change this stage owns. Upper body
        // only - the legs are already resolved at this point.
        if ctx.action == ActionState::Blocking {
            pose.shift_upper(Vec2::new(ctx.facing * self.cfg.guard_lean, 0.0));
        }

        // Hands track faster when the body moves faster
        let rate = self.cfg.hand_damp_base + ctx.speed() * self.cfg.hand_damp_speed_gain;

        for side in Side::BOTH {
            let i = side.index();
            let desired = self.desired_target(side, ctx, pose, aux);
            self.targets[i] = damp_vec2(self.targets[i], desired, rate, dt);
        }

        aux.hands.target = self.targets;
    }
}
