//! Pipeline stages
//!
//! Seven capability-typed stages share one contract and run in a fixed
//! order once per frame: Locomotion -> FootIK -> Combat -> ArmIK ->
//! HeadGaze -> SecondaryMotion -> Environment. Each stage mutates the
//! shared pose and writes its auxiliary output into [`FrameAux`], which is
//! the only channel between stages - strictly single-pass, a stage can
//! read only what earlier stages wrote.

pub mod arm_ik;
pub mod combat;
pub mod environment;
pub mod foot_ik;
pub mod head_gaze;
pub mod locomotion;
pub mod secondary;

use glam::Vec2;
use serde::{Deserialize, Serialize};

use crate::core::types::{Context, ImpulseEvent, Side};
use crate::pose::Pose;

/// Contract every pipeline stage implements
///
/// A stage is a pure function of (dt, context, pose, earlier aux) plus the
/// smoothing state it privately owns. Stages never see each other and
/// never share state across characters.
pub trait PoseStage {
    /// Stage name for logging and debug output
    fn name(&self) -> &'static str;

    /// Advance the stage by `dt` seconds against the shared pose
    fn apply(&mut self, dt: f32, ctx: &Context, pose: &mut Pose, aux: &mut FrameAux);
}

/// Animation events emitted during a frame
///
/// Downstream systems (footstep audio, dust particles) subscribe to these,
/// and the head-gaze stage consumes plant events for its footstep nod.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum AnimEvent {
    /// A foot froze onto the ground (world position recorded)
    FootPlanted {
        side: Side,
        position: Vec2,
        phase: f32,
    },
    /// A planted foot lifted back into swing
    FootLifted { side: Side },
}

/// Locomotion stage output
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct GaitOutput {
    /// Master gait phase in [0, 1)
    pub phase: f32,
    /// Per-foot phases (left, right): phase and phase + 0.5 + asymmetry
    pub foot_phase: [f32; 2],
    /// Per-foot path targets in character-local space (y = height above ground)
    pub foot_target: [Vec2; 2],
    /// Per-foot contact flags (phase near the cycle boundary)
    pub contact: [bool; 2],
    /// True while the character is grounded and moving
    pub moving: bool,
    /// Effective cadence in cycles per second
    pub cadence: f32,
    /// Damped lateral weight shift currently applied to the pelvis
    pub weight_shift: f32,
    /// Speed normalized against the configured maximum, 0.0-1.0
    pub speed_ratio: f32,
}

/// Foot IK stage output
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct FootOutput {
    /// Per-foot plant flags
    pub planted: [bool; 2],
    /// Seconds each foot has been in ground contact
    pub contact_time: [f32; 2],
    /// Heel-to-toe roll progress per foot, 0.0-1.0
    pub roll_phase: [f32; 2],
}

/// Combat stage output: smoothed hand targets in character-local space
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct HandTargets {
    pub target: [Vec2; 2],
}

/// Arm IK stage output
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct WristOutput {
    /// Wrist rotation per hand (radians)
    pub rotation: [f32; 2],
    /// Wrist pronation per hand (signed twist scalar)
    pub pronation: [f32; 2],
}

/// Secondary-motion stage output: point lists for the renderer
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SecondaryOutput {
    /// Cloth chain points, character-local, anchor first
    pub cloth: Vec<Vec2>,
    /// Hair chain points, character-local, anchor first
    pub hair: Vec<Vec2>,
    /// Equipment transforms, character-local
    pub equipment: Vec<EquipmentPose>,
}

/// Resolved equipment transform for one item
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct EquipmentPose {
    pub position: Vec2,
    pub orientation: f32,
}

/// Per-frame channels between stages
///
/// Rebuilt by the orchestrator every frame; stages append to it in
/// pipeline order. `impulses` is filled before the first stage runs
/// (context events plus the internally detected landing).
#[derive(Debug, Clone, Default)]
pub struct FrameAux {
    pub gait: GaitOutput,
    pub feet: FootOutput,
    pub hands: HandTargets,
    pub wrists: WristOutput,
    pub secondary: SecondaryOutput,
    pub impulses: Vec<ImpulseEvent>,
    pub events: Vec<AnimEvent>,
}

impl FrameAux {
    pub fn new(impulses: Vec<ImpulseEvent>) -> Self {
        Self {
            impulses,
            ..Default::default()
        }
    }
}
