//! Animation configuration with documented constants
//!
//! All tuning values are collected here with explanations of their purpose
//! and how they interact with each other. Every threshold the pipeline
//! branches on is a named field so it stays adjustable without code changes.

use serde::{Deserialize, Serialize};

use crate::core::error::{Result, SinewError};

/// Top-level configuration for one character's animation pipeline
///
/// These values have been tuned for a biped roughly 70 units tall at a
/// 60 Hz simulation. Changing them will affect gait feel and combat
/// readability, not correctness.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct AnimationConfig {
    pub locomotion: LocomotionConfig,
    pub foot: FootIkConfig,
    pub combat: CombatConfig,
    pub arm: ArmIkConfig,
    pub head: HeadGazeConfig,
    pub secondary: SecondaryConfig,
    pub environment: EnvironmentConfig,
    pub render: RenderConfig,
}

/// Gait phase state machine and foot path generation
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LocomotionConfig {
    /// Speed (units/s) at which cadence and stride reach their maxima
    ///
    /// `speed_ratio = speed / max_speed`, clamped to 1.0. Everything that
    /// scales with speed scales through this ratio.
    pub max_speed: f32,

    /// Speed (units/s) below which the character counts as stationary
    pub moving_threshold: f32,

    /// Stride cycles per second at walking pace
    pub base_cadence: f32,

    /// Extra cadence at full speed, as a fraction of base_cadence
    ///
    /// Effective cadence = base_cadence * (1 + speed_ratio * cadence_scale).
    pub cadence_scale: f32,

    /// Full stride length (units) at max_speed
    pub stride_length: f32,

    /// Peak swing clearance (units) of the foot arc
    pub step_height: f32,

    /// Gait phase where the stance band begins
    pub stance_begin: f32,

    /// Gait phase where the stance band ends
    ///
    /// Inside [stance_begin, stance_end] the foot carries weight: it
    /// advances a small forward fraction of stride with no vertical motion.
    /// Outside the band it follows the swing arc.
    pub stance_end: f32,

    /// Forward fraction of stride the foot advances across the stance band
    /// (weight transfer onto the leading foot)
    pub stance_advance: f32,

    /// Gait phase the cycle relaxes toward while stationary
    pub rest_phase: f32,

    /// Damping rate for the stationary phase relaxation
    pub rest_relax_speed: f32,

    /// Phase bias added to the right foot on top of the canonical 0.5
    /// offset (limp/asymmetry control, usually 0)
    pub asymmetry: f32,

    /// Lateral pelvis amplitude (units) of the weight shift
    pub weight_shift_amount: f32,

    /// Damping rate for weight-shift balance recovery
    pub weight_shift_damping: f32,

    /// Half-width of the phase window around the cycle boundary that
    /// counts as foot contact
    pub contact_window: f32,

    /// Axis-dominance ratio for movement classification
    ///
    /// Movement is horizontal when |vy| <= ratio * |vx|, vertical when
    /// |vx| <= ratio * |vy|, diagonal otherwise. Inherited tuning - not
    /// documented as intentional, kept adjustable on purpose.
    pub motion_class_ratio: f32,

    /// Stride blend weights [along-x, along-y] for horizontal movement
    pub horizontal_class_blend: [f32; 2],

    /// Stride blend weights for vertical movement (ladders, steep slopes)
    pub vertical_class_blend: [f32; 2],

    /// Stride blend weights for diagonal movement
    pub diagonal_class_blend: [f32; 2],

    /// Approximate spine lean per unit of horizontal speed (rad·s/unit)
    pub spine_lean_per_speed: f32,

    /// Clamp on the approximated spine lean (radians)
    pub max_spine_bend: f32,

    /// Extra weight-shift fraction at zero stamina (tired sway)
    pub fatigue_shift_gain: f32,

    /// Pelvis drop (units) at zero health (wounded slump)
    pub low_health_slump: f32,
}

impl Default for LocomotionConfig {
    fn default() -> Self {
        Self {
            max_speed: 220.0,
            moving_threshold: 5.0,
            base_cadence: 1.6,
            cadence_scale: 0.9,
            stride_length: 34.0,
            step_height: 10.0,
            stance_begin: 0.1,
            stance_end: 0.6,
            stance_advance: 0.18,
            rest_phase: 0.25,
            rest_relax_speed: 4.0,
            asymmetry: 0.0,
            weight_shift_amount: 2.5,
            weight_shift_damping: 8.0,
            contact_window: 0.08,
            motion_class_ratio: 0.5,
            horizontal_class_blend: [1.0, 0.25],
            vertical_class_blend: [0.35, 0.8],
            diagonal_class_blend: [0.75, 0.6],
            spine_lean_per_speed: 0.0008,
            max_spine_bend: 0.18,
            fatigue_shift_gain: 0.5,
            low_health_slump: 3.0,
        }
    }
}

/// Foot plant/roll state machine and leg IK
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct FootIkConfig {
    /// Swing height (units) below which a moving foot plants
    ///
    /// Also the height above which a planted foot lifts back into swing.
    pub plant_threshold: f32,

    /// Seconds of ground contact over which the heel-to-toe roll completes
    pub roll_duration: f32,

    /// Forward toe bias (units) at full roll
    pub roll_advance: f32,

    /// Bounded rate (units/s) at which the per-foot ground offset adapts
    /// toward the slope-derived target. Never snaps.
    pub ground_adapt_speed: f32,

    /// Fraction of the average foot-height deviation fed into the pelvis
    pub pelvis_follow: f32,

    /// Leg lift (units) applied to both feet while airborne
    pub airborne_lift: f32,
}

impl Default for FootIkConfig {
    fn default() -> Self {
        Self {
            plant_threshold: 1.5,
            roll_duration: 0.35,
            roll_advance: 4.0,
            ground_adapt_speed: 30.0,
            pelvis_follow: 0.3,
            airborne_lift: 4.0,
        }
    }
}

/// Action-state driven hand targeting
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct CombatConfig {
    /// Base damping rate for hand targets
    pub hand_damp_base: f32,

    /// Extra damping rate per unit of speed
    ///
    /// Fast characters need snappier hands or the targets lag the body.
    pub hand_damp_speed_gain: f32,

    /// Peak attack reach (units) at the middle of the swing
    pub attack_strength: f32,

    /// Forward offset (units) of the weapon hand throughout an attack
    pub attack_forward_base: f32,

    /// Pull-back (units) of the off hand during an attack
    pub offhand_pull: f32,

    /// Guard hand height (units) above the torso joint while blocking
    pub guard_height: f32,

    /// Guard hand forward offset (units) while blocking
    pub guard_forward: f32,

    /// Torso lean (units) toward the block facing
    pub guard_lean: f32,

    /// Hand tuck offset [forward, down] (units) while rolling
    pub tuck_offset: [f32; 2],

    /// Walk-cycle arm swing amplitude (units) at full speed
    pub swing_amount: f32,

    /// Resting hand forward offset (units) from the shoulder
    pub rest_forward: f32,

    /// Resting hand drop (units) below the shoulder
    ///
    /// Must stay shorter than upper arm + forearm or the idle pose sits
    /// permanently at the solver's reach clamp.
    pub rest_drop: f32,
}

impl Default for CombatConfig {
    fn default() -> Self {
        Self {
            hand_damp_base: 10.0,
            hand_damp_speed_gain: 0.02,
            attack_strength: 26.0,
            attack_forward_base: 10.0,
            offhand_pull: 6.0,
            guard_height: 14.0,
            guard_forward: 8.0,
            guard_lean: 2.0,
            tuck_offset: [4.0, 10.0],
            swing_amount: 7.0,
            rest_forward: 3.0,
            rest_drop: 26.0,
        }
    }
}

/// Arm IK resolution and wrist orientation
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ArmIkConfig {
    /// Damping rate for wrist rotation and pronation
    pub wrist_responsiveness: f32,

    /// Pronation magnitude during the active swing window
    pub pronation_amount: f32,

    /// Supination held outside the active swing window of an attack
    pub attack_supination: f32,

    /// Fixed supination while blocking
    pub guard_supination: f32,

    /// Action-time where the active swing window opens
    pub swing_begin: f32,

    /// Action-time where the active swing window closes
    pub swing_end: f32,

    /// Wrist sway amplitude while idle/walking
    pub idle_wrist_sway: f32,
}

impl Default for ArmIkConfig {
    fn default() -> Self {
        Self {
            wrist_responsiveness: 12.0,
            pronation_amount: 0.6,
            attack_supination: 0.25,
            guard_supination: 0.4,
            swing_begin: 0.3,
            swing_end: 0.7,
            idle_wrist_sway: 0.08,
        }
    }
}

/// Head stabilization, look-at and footstep nod
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct HeadGazeConfig {
    /// Fraction of the torso rotation the head counters (anti-phase)
    pub stabilization_ratio: f32,

    /// Anatomical yaw clamp (radians)
    pub max_yaw: f32,

    /// Anatomical pitch clamp (radians), applies when the look target is
    /// vertically dominant
    pub max_pitch: f32,

    /// Damping rate for head rotation
    pub yaw_damping: f32,

    /// Downward head displacement (units) injected per footstep
    pub nod_amount: f32,

    /// Decay rate of the footstep nod
    pub nod_decay: f32,
}

impl Default for HeadGazeConfig {
    fn default() -> Self {
        Self {
            stabilization_ratio: 0.7,
            max_yaw: 0.9,
            max_pitch: 0.5,
            yaw_damping: 10.0,
            nod_amount: 1.2,
            nod_decay: 9.0,
        }
    }
}

/// Trailing cloth/hair chains and equipment response
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SecondaryConfig {
    /// Number of cloth chain points including the anchor
    pub cloth_points: usize,

    /// Rest spacing (units) between consecutive cloth points
    pub cloth_spacing: f32,

    /// Per-axis damping rate for cloth relaxation
    pub cloth_damping: f32,

    /// Per-index sway amplitude (units) of the cloth oscillation
    pub cloth_sway: f32,

    /// Sway oscillation frequency (rad/s)
    pub cloth_sway_freq: f32,

    /// Number of hair chain points including the anchor
    pub hair_points: usize,

    /// Rest spacing (units) between consecutive hair points
    pub hair_spacing: f32,

    /// Per-axis damping rate for hair relaxation
    pub hair_damping: f32,

    /// Per-index bounce amplitude (units) of the hair oscillation
    pub hair_bounce: f32,

    /// Bounce oscillation frequency (rad/s)
    pub hair_bounce_freq: f32,

    /// Horizontal chain drift per unit of wind
    pub wind_factor: f32,

    /// Horizontal chain drift per unit of character velocity (trailing)
    pub momentum_factor: f32,

    /// Damping rate anchoring equipment to the weapon hand
    pub equipment_damping: f32,

    /// Equipment jiggle amplitude (units)
    pub jiggle_amount: f32,

    /// Equipment jiggle frequency (rad/s)
    pub jiggle_freq: f32,

    /// Exponential decay rate (1/s) of the impulse accumulator
    ///
    /// An impulse falls below 1% of its injected magnitude after
    /// ln(100)/impulse_decay seconds.
    pub impulse_decay: f32,

    /// Impulse magnitude (units) injected by a landing
    pub landing_impulse: f32,

    /// Impulse magnitude (units) injected by a hurt event
    pub hurt_impulse: f32,

    /// Impulse magnitude (units) injected by a block impact
    pub block_impulse: f32,
}

impl Default for SecondaryConfig {
    fn default() -> Self {
        Self {
            cloth_points: 5,
            cloth_spacing: 5.0,
            cloth_damping: 14.0,
            cloth_sway: 1.6,
            cloth_sway_freq: 2.2,
            hair_points: 4,
            hair_spacing: 3.0,
            hair_damping: 18.0,
            hair_bounce: 1.0,
            hair_bounce_freq: 3.1,
            wind_factor: 0.35,
            momentum_factor: 0.02,
            equipment_damping: 20.0,
            jiggle_amount: 0.8,
            jiggle_freq: 4.0,
            impulse_decay: 6.0,
            landing_impulse: 6.0,
            hurt_impulse: 5.0,
            block_impulse: 4.0,
        }
    }
}

/// Additive wind/temperature overlay
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct EnvironmentConfig {
    /// Torso x displacement (units) per unit of wind
    pub wind_sway: f32,

    /// Head wind displacement as a multiple of the torso's
    pub head_wind_scale: f32,

    /// Hand wind displacement as a multiple of the torso's
    pub hand_wind_scale: f32,

    /// Temperature below which shivering starts
    pub shiver_threshold: f32,

    /// Shiver amplitude (units) at temperature 0
    pub shiver_amp: f32,

    /// Shiver frequency (rad/s)
    pub shiver_freq: f32,
}

impl Default for EnvironmentConfig {
    fn default() -> Self {
        Self {
            wind_sway: 1.5,
            head_wind_scale: 1.4,
            hand_wind_scale: 1.8,
            shiver_threshold: 0.3,
            shiver_amp: 0.7,
            shiver_freq: 18.0,
        }
    }
}

/// Flattened render transform shaping
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct RenderConfig {
    /// Body lean (radians) per unit of horizontal speed
    pub lean_per_speed: f32,

    /// Clamp on the render lean (radians)
    pub max_lean: f32,

    /// Damping rate for the render lean
    pub lean_damping: f32,
}

impl Default for RenderConfig {
    fn default() -> Self {
        Self {
            lean_per_speed: 0.0006,
            max_lean: 0.12,
            lean_damping: 6.0,
        }
    }
}

impl AnimationConfig {
    /// Create a new config with default values
    pub fn new() -> Self {
        Self::default()
    }

    /// Load a config from a TOML string
    ///
    /// Missing sections and fields fall back to their defaults, so a file
    /// only needs to name the values it overrides.
    pub fn from_toml_str(text: &str) -> Result<Self> {
        let config: AnimationConfig = toml::from_str(text)?;
        config
            .validate()
            .map_err(SinewError::InvalidConfig)?;
        Ok(config)
    }

    /// Load a config from a TOML file on disk
    pub fn load_from_path(path: impl AsRef<std::path::Path>) -> Result<Self> {
        let text = std::fs::read_to_string(path.as_ref())?;
        let config = Self::from_toml_str(&text)?;
        tracing::debug!("Loaded animation config from {}", path.as_ref().display());
        Ok(config)
    }

    /// Validate configuration for internal consistency
    pub fn validate(&self) -> std::result::Result<(), String> {
        let loco = &self.locomotion;
        if loco.stance_begin >= loco.stance_end {
            return Err(format!(
                "stance_begin ({}) must be < stance_end ({})",
                loco.stance_begin, loco.stance_end
            ));
        }
        if !(0.0..1.0).contains(&loco.stance_begin) || !(0.0..1.0).contains(&loco.stance_end) {
            return Err("stance band must lie within [0, 1)".into());
        }
        if loco.max_speed <= 0.0 || loco.base_cadence <= 0.0 {
            return Err("max_speed and base_cadence must be positive".into());
        }
        if loco.motion_class_ratio <= 0.0 || loco.motion_class_ratio > 1.0 {
            return Err(format!(
                "motion_class_ratio ({}) must be in (0, 1]",
                loco.motion_class_ratio
            ));
        }

        if self.foot.plant_threshold <= 0.0 {
            return Err("plant_threshold must be positive".into());
        }
        if self.foot.plant_threshold >= loco.step_height {
            return Err(format!(
                "plant_threshold ({}) must be < step_height ({}) or feet never lift",
                self.foot.plant_threshold, loco.step_height
            ));
        }
        if self.foot.roll_duration <= 0.0 || self.foot.ground_adapt_speed <= 0.0 {
            return Err("roll_duration and ground_adapt_speed must be positive".into());
        }

        if self.arm.swing_begin >= self.arm.swing_end {
            return Err(format!(
                "swing_begin ({}) must be < swing_end ({})",
                self.arm.swing_begin, self.arm.swing_end
            ));
        }
        if self.arm.wrist_responsiveness <= 0.0 {
            return Err("wrist_responsiveness must be positive".into());
        }

        if self.secondary.cloth_points < 2 || self.secondary.hair_points < 2 {
            return Err("secondary chains need at least an anchor and one point".into());
        }
        if self.secondary.impulse_decay <= 0.0 {
            return Err("impulse_decay must be positive".into());
        }

        if self.head.stabilization_ratio < 0.0 || self.head.stabilization_ratio > 1.0 {
            return Err(format!(
                "stabilization_ratio ({}) must be in [0, 1]",
                self.head.stabilization_ratio
            ));
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config_is_valid() {
        assert!(AnimationConfig::default().validate().is_ok());
    }

    #[test]
    fn test_inverted_stance_band_rejected() {
        let mut config = AnimationConfig::default();
        config.locomotion.stance_begin = 0.7;
        config.locomotion.stance_end = 0.2;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_plant_threshold_above_step_height_rejected() {
        let mut config = AnimationConfig::default();
        config.foot.plant_threshold = config.locomotion.step_height + 1.0;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_partial_toml_overrides() {
        let config = AnimationConfig::from_toml_str(
            r#"
            [locomotion]
            stride_length = 40.0

            [secondary]
            impulse_decay = 8.0
            "#,
        )
        .unwrap();
        assert_eq!(config.locomotion.stride_length, 40.0);
        assert_eq!(config.secondary.impulse_decay, 8.0);
        // Untouched sections keep their defaults
        assert_eq!(config.combat.attack_strength, 26.0);
    }

    #[test]
    fn test_invalid_toml_values_rejected() {
        let result = AnimationConfig::from_toml_str(
            r#"
            [arm]
            swing_begin = 0.9
            swing_end = 0.2
            "#,
        );
        assert!(result.is_err());
    }
}
