//! Pose data model: the joint tree and the skeleton proportions behind it

pub mod joints;
pub mod skeleton;

pub use joints::{ArmPose, Joint, LegPose, Pose};
pub use skeleton::Skeleton;
