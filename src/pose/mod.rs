//! Body pose input: keypoint types, pose providers and the debounced
//! posture-to-direction classifier.

pub mod classifier;
pub mod keypoint;
pub mod source;

pub use classifier::{detect_posture, ClassifierConfig, DirectionClassifier, EmitPolicy, Posture};
pub use keypoint::{Keypoint, KeypointName, Pose};
pub use source::{PoseSource, ScriptedPoseSource, StreamPoseSource};
