//! Foot plant/roll state machine and leg IK resolution
//!
//! Each foot is either UNPLANTED (tracking the locomotion path) or
//! PLANTED (frozen at the world position recorded at the plant
//! transition). The freeze is what guarantees zero ground slip: the body
//! can drift however it likes, the planted sole does not move.

use glam::Vec2;

use crate::core::config::FootIkConfig;
use crate::core::error::Result;
use crate::core::types::{Context, Side};
use crate::math::ik::{BendDir, TwoBoneIk};
use crate::pose::{Pose, Skeleton};
use crate::stages::{AnimEvent, FrameAux, PoseStage};

/// Fraction of full leg reach beyond which a plant is released
///
/// Past this the solver would clamp the ankle short of the frozen
/// position and the sole would drag instead of staying planted.
const PLANT_STRETCH_LIMIT: f32 = 0.98;

/// Per-foot state, owned for the lifetime of the character
#[derive(Debug, Clone, Copy)]
struct FootState {
    planted: bool,
    /// World position frozen at the plant transition
    planted_pos: Vec2,
    /// Seconds of ground contact
    contact_time: f32,
    /// Heel-to-toe roll progress, 0.0-1.0
    roll_phase: f32,
    /// Slope-adapted ground height offset
    ground_offset: f32,
}

impl FootState {
    fn new() -> Self {
        Self {
            planted: false,
            planted_pos: Vec2::ZERO,
            contact_time: 0.0,
            roll_phase: 0.0,
            ground_offset: 0.0,
        }
    }
}

pub struct FootIkStage {
    cfg: FootIkConfig,
    leg: TwoBoneIk,
    feet: [FootState; 2],
    ankle_height: f32,
    /// Resting reach from the mid-sole foot joint to the toe marker
    toe_base: f32,
}

impl FootIkStage {
    pub fn new(cfg: FootIkConfig, skeleton: &Skeleton) -> Result<Self> {
        Ok(Self {
            cfg,
            leg: TwoBoneIk::new(skeleton.thigh, skeleton.shin)?,
            feet: [FootState::new(), FootState::new()],
            ankle_height: skeleton.ankle_height,
            toe_base: skeleton.foot_length * 0.5 + skeleton.toe_length,
        })
    }

    /// Resolve the local-space sole target for one foot, applying the
    /// plant freeze and the slope-adapted ground offset
    fn resolve_target(
        &mut self,
        side: Side,
        dt: f32,
        ctx: &Context,
        aux: &mut FrameAux,
    ) -> Vec2 {
        let i = side.index();
        let path = aux.gait.foot_target[i];
        let moving = aux.gait.moving;

        // Ground offset adapts toward the slope under the foot at a
        // bounded rate. No snapping even if the slope jumps.
        let slope_target = ctx.ground_slope * path.x;
        let max_step = self.cfg.ground_adapt_speed * dt;
        let gap = slope_target - self.feet[i].ground_offset;
        self.feet[i].ground_offset += gap.clamp(-max_step, max_step);

        if !ctx.grounded {
            // Airborne: both feet trail slightly lifted, nothing plants
            if self.feet[i].planted {
                self.feet[i].planted = false;
                aux.events.push(AnimEvent::FootLifted { side });
            }
            self.feet[i].contact_time = 0.0;
            return Vec2::new(path.x, self.cfg.airborne_lift);
        }

        let height = path.y;
        if self.feet[i].planted {
            if moving && height > self.cfg.plant_threshold {
                self.feet[i].planted = false;
                self.feet[i].contact_time = 0.0;
                aux.events.push(AnimEvent::FootLifted { side });
                tracing::trace!(side = ?side, "foot lifted");
            }
        } else if height < self.cfg.plant_threshold {
            // Plant: freeze the world position (zero-slip from here on)
            let world = ctx.position + Vec2::new(path.x, self.feet[i].ground_offset);
            self.feet[i].planted = true;
            self.feet[i].planted_pos = world;
            self.feet[i].contact_time = 0.0;
            aux.events.push(AnimEvent::FootPlanted {
                side,
                position: world,
                phase: aux.gait.foot_phase[i],
            });
            tracing::trace!(side = ?side, x = world.x, y = world.y, "foot planted");
        }

        if self.feet[i].planted {
            self.feet[i].contact_time += dt;
            self.feet[i].roll_phase =
                (self.feet[i].contact_time / self.cfg.roll_duration).clamp(0.0, 1.0);
            self.feet[i].planted_pos - ctx.position
        } else {
            self.feet[i].roll_phase = 0.0;
            Vec2::new(path.x, height + self.feet[i].ground_offset)
        }
    }
}

impl PoseStage for FootIkStage {
    fn name(&self) -> &'static str {
        "foot_ik"
    }

    fn apply(&mut self, dt: f32, ctx: &Context, pose: &mut Pose, aux: &mut FrameAux) {
        let targets = [
            self.resolve_target(Side::Left, dt, ctx, aux),
            self.resolve_target(Side::Right, dt, ctx, aux),
        ];

        // Pelvis rides a fraction of the average foot-height deviation,
        // applied before the knees resolve so the hips are final.
        let avg_height = (targets[0].y + targets[1].y) * 0.5;
        pose.shift_body(Vec2::new(0.0, avg_height * self.cfg.pelvis_follow));

        for side in Side::BOTH {
            let i = side.index();
            let hip = pose.leg(side).hip.position;
            let mut sole = targets[i];

            // Release a plant the leg can no longer reach
            if self.feet[i].planted {
                let stretch = (sole + Vec2::new(0.0, self.ankle_height) - hip).length();
                if stretch > self.leg.reach() * PLANT_STRETCH_LIMIT {
                    self.feet[i].planted = false;
                    self.feet[i].contact_time = 0.0;
                    self.feet[i].roll_phase = 0.0;
                    aux.events.push(AnimEvent::FootLifted { side });
                    let path = aux.gait.foot_target[i];
                    sole = Vec2::new(path.x, path.y + self.feet[i].ground_offset);
                }
            }
            let ankle_target = sole + Vec2::new(0.0, self.ankle_height);

            // Knee bends toward the facing direction
            let bend = BendDir::from_sign(ctx.facing);
            let solution = self.leg.solve(hip, ankle_target, bend);

            let leg = pose.leg_mut(side);
            leg.knee.position = solution.mid;
            leg.ankle.position = solution.end;
            leg.foot.position = solution.end - Vec2::new(0.0, self.ankle_height);

            // Heel-to-toe roll: the toe marker creeps forward as stance
            // progresses
            let roll = self.feet[i].roll_phase;
            let toe_reach = self.toe_base + roll * self.cfg.roll_advance;
            leg.toe.position = leg.foot.position + Vec2::new(ctx.facing * toe_reach, 0.0);
        }

        aux.feet.planted = [self.feet[0].planted, self.feet[1].planted];
        aux.feet.contact_time = [self.feet[0].contact_time, self.feet[1].contact_time];
        aux.feet.roll_phase = [self.feet[0].roll_phase, self.feet[1].roll_phase];
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::config::AnimationConfig;
    use crate::stages::locomotion::LocomotionStage;

    const DT: f32 = 1.0 / 60.0;

    struct Rig {
        locomotion: LocomotionStage,
        foot_ik: FootIkStage,
        skeleton: Skeleton,
        pose: Pose,
    }

    impl Rig {
        fn new() -> Self {
            let config = AnimationConfig::default();
            let skeleton = Skeleton::biped();
            Self {
                locomotion: LocomotionStage::new(config.locomotion.clone(), &skeleton),
                foot_ik: FootIkStage::new(config.foot.clone(), &skeleton).unwrap(),
                skeleton,
                pose: Pose::neutral(&skeleton, 1.0),
            }
        }

        fn step(&mut self, ctx: &Context) -> FrameAux {
            let mut aux = FrameAux::default();
            self.pose.reset(&self.skeleton, ctx.facing);
            self.locomotion.apply(DT, ctx, &mut self.pose, &mut aux);
            self.foot_ik.apply(DT, ctx, &mut self.pose, &mut aux);
            aux
        }
    }

    fn walking_context(position: Vec2) -> Context {
        Context {
            position,
            velocity: Vec2::new(120.0, 0.0),
            ..Default::default()
        }
    }

    #[test]
    fn test_leg_segments_preserved() {
        let mut rig = Rig::new();
        let mut pos = Vec2::ZERO;
        for _ in 0..120 {
            pos.x += 120.0 * DT;
            rig.step(&walking_context(pos));
            for side in Side::BOTH {
                let leg = rig.pose.leg(side);
                let thigh = (leg.knee.position - leg.hip.position).length();
                let shin = (leg.ankle.position - leg.knee.position).length();
                assert!((thigh - rig.skeleton.thigh).abs() < 1e-2);
                assert!((shin - rig.skeleton.shin).abs() < 1e-2);
            }
        }
    }

    #[test]
    fn test_planted_foot_frozen_in_world_space() {
        let mut rig = Rig::new();
        let mut pos = Vec2::ZERO;

        // Walk until the left foot plants
        let mut planted_world = None;
        for _ in 0..240 {
            pos.x += 120.0 * DT;
            let aux = rig.step(&walking_context(pos));
            if aux.feet.planted[0] {
                planted_world = Some(rig.pose.left_leg.foot.position + pos);
                break;
            }
        }
        let frozen = planted_world.expect("left foot never planted");

        // While it stays planted, its world position must not drift
        for _ in 0..30 {
            pos.x += 120.0 * DT;
            let aux = rig.step(&walking_context(pos));
            if !aux.feet.planted[0] {
                break;
            }
            let world = rig.pose.left_leg.foot.position + pos;
            assert!(
                (world - frozen).length() < 1e-3,
                "planted foot slipped from {frozen:?} to {world:?}"
            );
        }
    }

    #[test]
    fn test_plant_events_emitted() {
        let mut rig = Rig::new();
        let mut pos = Vec2::ZERO;
        let mut planted = 0;
        let mut lifted = 0;
        for _ in 0..300 {
            pos.x += 120.0 * DT;
            let aux = rig.step(&walking_context(pos));
            for event in &aux.events {
                match event {
                    AnimEvent::FootPlanted { .. } => planted += 1,
                    AnimEvent::FootLifted { .. } => lifted += 1,
                }
            }
        }
        assert!(planted >= 4, "expected several plants, got {planted}");
        assert!(lifted >= 4, "expected several lifts, got {lifted}");
    }

    #[test]
    fn test_roll_phase_advances_during_contact() {
        let mut rig = Rig::new();
        let mut pos = Vec2::ZERO;
        let mut seen_partial = false;
        let mut seen_full = false;
        for _ in 0..600 {
            pos.x += 120.0 * DT;
            let aux = rig.step(&walking_context(pos));
            for i in 0..2 {
                if aux.feet.planted[i] {
                    let roll = aux.feet.roll_phase[i];
                    assert!((0.0..=1.0).contains(&roll));
                    if roll > 0.0 && roll < 1.0 {
                        seen_partial = true;
                    }
                    if roll >= 1.0 {
                        seen_full = true;
                    }
                }
            }
        }
        assert!(seen_partial);
        assert!(seen_full);
    }

    #[test]
    fn test_airborne_unplants_both_feet() {
        let mut rig = Rig::new();
        let mut pos = Vec2::ZERO;
        for _ in 0..120 {
            pos.x += 120.0 * DT;
            rig.step(&walking_context(pos));
        }
        let mut ctx = walking_context(pos);
        ctx.grounded = false;
        let aux = rig.step(&ctx);
        assert!(!aux.feet.planted[0]);
        assert!(!aux.feet.planted[1]);
    }

    #[test]
    fn test_stationary_feet_plant_at_rest() {
        let mut rig = Rig::new();
        let ctx = Context::default();
        let mut aux = FrameAux::default();
        for _ in 0..30 {
            aux = rig.step(&ctx);
        }
        assert!(aux.feet.planted[0]);
        assert!(aux.feet.planted[1]);
        assert_eq!(rig.pose.left_leg.foot.position.y, 0.0);
    }

    #[test]
    fn test_ground_offset_adapts_gradually() {
        let mut rig = Rig::new();
        let mut ctx = Context::default();
        ctx.ground_slope = 1.0;
        ctx.velocity = Vec2::new(120.0, 0.0);

        rig.step(&ctx);
        let early = rig.foot_ik.feet[0].ground_offset.abs();
        for _ in 0..60 {
            rig.step(&ctx);
        }
        let late = rig.foot_ik.feet[0].ground_offset.abs();
        // One frame of adaptation is bounded by the configured rate
        assert!(early <= rig.foot_ik.cfg.ground_adapt_speed * DT + 1e-5);
        assert!(late >= early);
    }
}
