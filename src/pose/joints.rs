//! Pose container - the fixed joint tree every stage mutates
//!
//! Coordinates are character-local: origin at the ground point under the
//! pelvis, +y up, +x world-right. Facing is baked into joint offsets via
//! the facing sign; the render transform places the result in the world.

use glam::Vec2;
use serde::{Deserialize, Serialize};

use crate::core::types::Side;
use crate::pose::skeleton::Skeleton;

/// A single joint: 2D position plus rotation/pronation scalars
///
/// Rotation is radians in the local frame; pronation is a signed twist
/// scalar only meaningful on the wrist. Both default to zero and are
/// ignored by joints that do not use them.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct Joint {
    pub position: Vec2,
    pub rotation: f32,
    pub pronation: f32,
}

impl Joint {
    pub fn at(position: Vec2) -> Self {
        Self {
            position,
            rotation: 0.0,
            pronation: 0.0,
        }
    }
}

/// Shoulder-to-hand chain for one arm
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct ArmPose {
    pub shoulder: Joint,
    pub elbow: Joint,
    pub wrist: Joint,
    pub hand: Joint,
}

/// Hip-to-toe chain for one leg
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct LegPose {
    pub hip: Joint,
    pub knee: Joint,
    pub ankle: Joint,
    pub foot: Joint,
    pub toe: Joint,
}

/// Full-body pose: a fixed rooted tree of named joints
///
/// Topology never changes. Positions are rebuilt top-down from the
/// skeleton at the start of every frame, then refined in place by the
/// pipeline stages - no persistent cross-joint references exist.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct Pose {
    pub head: Joint,
    pub torso: Joint,
    pub pelvis: Joint,
    pub left_arm: ArmPose,
    pub right_arm: ArmPose,
    pub left_leg: LegPose,
    pub right_leg: LegPose,
}

impl Pose {
    /// Build the rest pose for a skeleton
    pub fn neutral(skeleton: &Skeleton, facing: f32) -> Self {
        let mut pose = Pose::default();
        pose.reset(skeleton, facing);
        pose
    }

    /// Rebuild every joint top-down from the skeleton
    ///
    /// Called once per frame before the stages run, so no stage ever sees
    /// stale positions from the previous frame.
    pub fn reset(&mut self, skeleton: &Skeleton, facing: f32) {
        let pelvis = Vec2::new(0.0, skeleton.hip_height);
        let torso = pelvis + Vec2::new(0.0, skeleton.torso_length);
        let head = torso + Vec2::new(0.0, skeleton.neck_length);

        self.pelvis = Joint::at(pelvis);
        self.torso = Joint::at(torso);
        self.head = Joint::at(head);

        for side in Side::BOTH {
            // Side stagger flips with facing so the rig mirrors as a whole
            let shoulder =
                torso + Vec2::new(facing * side.sign() * skeleton.shoulder_spacing * 0.5, 0.0);
            let elbow = shoulder + Vec2::new(0.0, -skeleton.upper_arm);
            let wrist = elbow + Vec2::new(0.0, -skeleton.forearm);
            let hand = wrist + Vec2::new(0.0, -skeleton.hand_length);
            *self.arm_mut(side) = ArmPose {
                shoulder: Joint::at(shoulder),
                elbow: Joint::at(elbow),
                wrist: Joint::at(wrist),
                hand: Joint::at(hand),
            };

            let hip = pelvis + Vec2::new(facing * side.sign() * skeleton.hip_spacing * 0.5, 0.0);
            let foot = Vec2::new(hip.x, 0.0);
            let ankle = foot + Vec2::new(0.0, skeleton.ankle_height);
            // Neutral knee sits halfway up with a slight forward bend
            let knee = (hip + ankle) * 0.5 + Vec2::new(facing * 1.0, 0.0);
            let toe = foot + Vec2::new(facing * skeleton.toe_length, 0.0);
            *self.leg_mut(side) = LegPose {
                hip: Joint::at(hip),
                knee: Joint::at(knee),
                ankle: Joint::at(ankle),
                foot: Joint::at(foot),
                toe: Joint::at(toe),
            };
        }
    }

    pub fn arm(&self, side: Side) -> &ArmPose {
        match side {
            Side::Left => &self.left_arm,
            Side::Right => &self.right_arm,
        }
    }

    pub fn arm_mut(&mut self, side: Side) -> &mut ArmPose {
        match side {
            Side::Left => &mut self.left_arm,
            Side::Right => &mut self.right_arm,
        }
    }

    pub fn leg(&self, side: Side) -> &LegPose {
        match side {
            Side::Left => &self.left_leg,
            Side::Right => &self.right_leg,
        }
    }

    pub fn leg_mut(&mut self, side: Side) -> &mut LegPose {
        match side {
            Side::Left => &mut self.left_leg,
            Side::Right => &mut self.right_leg,
        }
    }

    /// Translate the upper body (torso, head, shoulders) only
    ///
    /// For adjustments made after the legs have been resolved: the hips
    /// stay put so the solved thigh/shin segments keep their lengths.
    pub fn shift_upper(&mut self, delta: Vec2) {
        self.torso.position += delta;
        self.head.position += delta;
        self.left_arm.shoulder.position += delta;
        self.right_arm.shoulder.position += delta;
    }

    /// Translate the body mass (pelvis, torso, head, shoulders) as a unit
    ///
    /// Legs are deliberately excluded: foot targets are generated against
    /// the root, and planted feet must not move with the body.
    pub fn shift_body(&mut self, delta: Vec2) {
        self.pelvis.position += delta;
        self.torso.position += delta;
        self.head.position += delta;
        self.left_arm.shoulder.position += delta;
        self.right_arm.shoulder.position += delta;
        for side in Side::BOTH {
            let leg = self.leg_mut(side);
            leg.hip.position += delta;
        }
    }
}
