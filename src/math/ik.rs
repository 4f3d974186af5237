//! Analytic two-bone inverse kinematics
//!
//! One solver shared by the leg and arm stages. Pure math, no owned state
//! beyond the validated segment lengths: the mid joint comes straight from
//! the law of cosines, so a solve is a handful of trig calls with no
//! iteration and no failure mode.

use glam::Vec2;

use crate::core::error::{Result, SinewError};

/// Margin kept inside the reachable band so the triangle never degenerates
const REACH_EPSILON: f32 = 1e-4;

/// Which way the mid joint bends relative to the root-target line
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BendDir {
    /// Mid joint on the counter-clockwise side (positive angle offset)
    Positive,
    /// Mid joint on the clockwise side (negative angle offset)
    Negative,
}

impl BendDir {
    fn sign(self) -> f32 {
        match self {
            BendDir::Positive => 1.0,
            BendDir::Negative => -1.0,
        }
    }

    /// Pick the bend whose sign matches `sign` (>= 0 -> Positive)
    pub fn from_sign(sign: f32) -> Self {
        if sign >= 0.0 {
            BendDir::Positive
        } else {
            BendDir::Negative
        }
    }
}

/// Resolved joint positions for a root-mid-end chain
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct IkSolution {
    pub mid: Vec2,
    pub end: Vec2,
}

/// Two-segment IK chain with fixed lengths
///
/// Segment lengths are validated once at construction - the only fatal
/// precondition in the pipeline. After that, `solve` succeeds for every
/// input: unreachable and degenerate targets are clamped into the
/// solvable band, never reported as errors.
#[derive(Debug, Clone, Copy)]
pub struct TwoBoneIk {
    l1: f32,
    l2: f32,
}

impl TwoBoneIk {
    /// Build a chain from proximal (`l1`) and distal (`l2`) segment lengths
    pub fn new(l1: f32, l2: f32) -> Result<Self> {
        if !(l1.is_finite() && l1 > 0.0) || !(l2.is_finite() && l2 > 0.0) {
            return Err(SinewError::InvalidSkeleton(format!(
                "segment lengths must be positive, got l1={l1}, l2={l2}"
            )));
        }
        Ok(Self { l1, l2 })
    }

    pub fn proximal(&self) -> f32 {
        self.l1
    }

    pub fn distal(&self) -> f32 {
        self.l2
    }

    /// Maximum reach of the chain
    pub fn reach(&self) -> f32 {
        self.l1 + self.l2
    }

    /// Place the mid and end joints for the given root and target
    ///
    /// The target distance is clamped to [|l1-l2|+eps, l1+l2-eps] first,
    /// which guarantees a solvable triangle. A target on top of the root
    /// falls back to a straight-down chain so the result is always finite.
    pub fn solve(&self, root: Vec2, target: Vec2, bend: BendDir) -> IkSolution {
        let to_target = target - root;
        let raw_dist = to_target.length();

        let dir = if raw_dist > REACH_EPSILON {
            to_target / raw_dist
        } else {
            Vec2::new(0.0, -1.0)
        };

        let min_dist = (self.l1 - self.l2).abs() + REACH_EPSILON;
        let max_dist = self.l1 + self.l2 - REACH_EPSILON;
        let d = raw_dist.clamp(min_dist, max_dist);

        // Law of cosines on (l1, d, l2): interior angle at the root
        let cos_root = ((self.l1 * self.l1 + d * d - self.l2 * self.l2) / (2.0 * self.l1 * d))
            .clamp(-1.0, 1.0);
        let root_angle = cos_root.acos();

        let base_angle = dir.y.atan2(dir.x);
        let mid_angle = base_angle + bend.sign() * root_angle;

        let mid = root + Vec2::new(mid_angle.cos(), mid_angle.sin()) * self.l1;
        let end = root + dir * d;

        IkSolution { mid, end }
    }
}
