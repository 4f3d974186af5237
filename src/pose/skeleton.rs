//! Skeleton proportions
//!
//! Segment lengths and offsets for one biped rig, in character units.
//! Validated once at animator construction - non-positive segment lengths
//! are the pipeline's only fatal error.

use serde::{Deserialize, Serialize};

/// Named segment lengths for a biped
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Skeleton {
    /// Pelvis height above the ground in the rest pose
    ///
    /// Must be less than thigh + shin so the knees keep a working bend.
    pub hip_height: f32,
    /// Pelvis to chest
    pub torso_length: f32,
    /// Chest to head
    pub neck_length: f32,
    /// Lateral stagger between the two hips (side-view pseudo-depth)
    pub hip_spacing: f32,
    /// Lateral stagger between the two shoulders
    pub shoulder_spacing: f32,
    /// Hip to knee
    pub thigh: f32,
    /// Knee to ankle
    pub shin: f32,
    /// Shoulder to elbow
    pub upper_arm: f32,
    /// Elbow to wrist
    pub forearm: f32,
    /// Wrist to hand marker
    pub hand_length: f32,
    /// Ankle height above the sole
    pub ankle_height: f32,
    /// Heel to ball of foot
    pub foot_length: f32,
    /// Ball of foot to toe marker
    pub toe_length: f32,
}

impl Default for Skeleton {
    fn default() -> Self {
        Self::biped()
    }
}

impl Skeleton {
    /// Standard biped proportions (roughly 76 units head to sole)
    pub fn biped() -> Self {
        Self {
            hip_height: 40.0,
            torso_length: 26.0,
            neck_length: 10.0,
            hip_spacing: 8.0,
            shoulder_spacing: 20.0,
            thigh: 22.0,
            shin: 22.0,
            upper_arm: 18.0,
            forearm: 16.0,
            hand_length: 6.0,
            ankle_height: 3.0,
            foot_length: 8.0,
            toe_length: 4.0,
        }
    }

    /// Validate proportions for internal consistency
    pub fn validate(&self) -> Result<(), String> {
        let segments = [
            ("hip_height", self.hip_height),
            ("torso_length", self.torso_length),
            ("neck_length", self.neck_length),
            ("thigh", self.thigh),
            ("shin", self.shin),
            ("upper_arm", self.upper_arm),
            ("forearm", self.forearm),
            ("hand_length", self.hand_length),
            ("ankle_height", self.ankle_height),
            ("foot_length", self.foot_length),
            ("toe_length", self.toe_length),
        ];
        for (name, value) in segments {
            if !(value.is_finite() && value > 0.0) {
                return Err(format!("{name} must be positive, got {value}"));
            }
        }

        // The rest pose needs a bent knee: hips lower than full leg reach
        // but higher than the folded limit.
        let leg_reach = self.thigh + self.shin;
        let leg_fold = (self.thigh - self.shin).abs();
        if self.hip_height >= leg_reach {
            return Err(format!(
                "hip_height ({}) must be < thigh + shin ({leg_reach}) to keep a knee bend",
                self.hip_height
            ));
        }
        if self.hip_height <= leg_fold {
            return Err(format!(
                "hip_height ({}) must be > |thigh - shin| ({leg_fold})",
                self.hip_height
            ));
        }

        Ok(())
    }

    /// Full arm reach from shoulder to hand marker
    pub fn arm_reach(&self) -> f32 {
        self.upper_arm + self.forearm + self.hand_length
    }
}
