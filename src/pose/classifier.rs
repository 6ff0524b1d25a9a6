//! Posture to direction classification
//!
//! Each sample is reduced to at most one [`Posture`] by a fixed-priority rule
//! table, then a per-instance dwell timer decides whether that posture has been
//! held long enough to become a [`Direction`] command.
//!
//! # Example
//!
//! ```rust
//! use pose_snake::pose::{ClassifierConfig, DirectionClassifier, Keypoint, KeypointName, Pose};
//! use pose_snake::game::Direction;
//! use std::time::{Duration, Instant};
//!
//! let mut classifier = DirectionClassifier::new(ClassifierConfig::default());
//! let pose = Pose::new(vec![
//!     Keypoint::new(KeypointName::RightWrist, 100.0, 50.0, 0.9),
//!     Keypoint::new(KeypointName::RightShoulder, 100.0, 120.0, 0.9),
//! ]);
//!
//! let t0 = Instant::now();
//! assert_eq!(classifier.evaluate(Some(&pose), t0), None);
//! assert_eq!(
//!     classifier.evaluate(Some(&pose), t0 + Duration::from_millis(220)),
//!     Some(Direction::Right)
//! );
//! ```

use log::{debug, trace};
use serde::{Deserialize, Serialize};
use std::time::{Duration, Instant};

use super::keypoint::{KeypointName, Pose};
use crate::game::Direction;

/// A recognised body posture. Variants are listed in match priority order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Posture {
    RightHandRaised,
    LeftHandRaised,
    RightLegRaised,
    LeftLegRaised,
}

impl Posture {
    /// Evaluation order; the first posture whose rule holds wins
    pub const PRIORITY: [Posture; 4] = [
        Posture::RightHandRaised,
        Posture::LeftHandRaised,
        Posture::RightLegRaised,
        Posture::LeftLegRaised,
    ];

    pub fn direction(&self) -> Direction {
        match self {
            Posture::RightHandRaised => Direction::Right,
            Posture::LeftHandRaised => Direction::Left,
            Posture::RightLegRaised => Direction::Up,
            Posture::LeftLegRaised => Direction::Down,
        }
    }

    /// (moving landmark, reference landmark): the posture holds when the
    /// moving landmark is above the reference one
    fn landmarks(&self) -> (KeypointName, KeypointName) {
        match self {
            Posture::RightHandRaised => (KeypointName::RightWrist, KeypointName::RightShoulder),
            Posture::LeftHandRaised => (KeypointName::LeftWrist, KeypointName::LeftShoulder),
            Posture::RightLegRaised => (KeypointName::RightKnee, KeypointName::RightHip),
            Posture::LeftLegRaised => (KeypointName::LeftKnee, KeypointName::LeftHip),
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            Posture::RightHandRaised => "right hand",
            Posture::LeftHandRaised => "left hand",
            Posture::RightLegRaised => "right leg",
            Posture::LeftLegRaised => "left leg",
        }
    }

    /// Whether this posture's rule holds for `pose`
    pub fn holds(&self, pose: &Pose, threshold: f32) -> bool {
        let (moving, reference) = self.landmarks();
        match (
            pose.confident(moving, threshold),
            pose.confident(reference, threshold),
        ) {
            // Image space: smaller y is higher
            (Some(m), Some(r)) => m.y < r.y,
            _ => false,
        }
    }
}

impl From<Direction> for Posture {
    fn from(direction: Direction) -> Self {
        match direction {
            Direction::Right => Posture::RightHandRaised,
            Direction::Left => Posture::LeftHandRaised,
            Direction::Up => Posture::RightLegRaised,
            Direction::Down => Posture::LeftLegRaised,
        }
    }
}

/// The single posture evidenced by `pose`, if any
pub fn detect_posture(pose: &Pose, threshold: f32) -> Option<Posture> {
    Posture::PRIORITY
        .into_iter()
        .find(|posture| posture.holds(pose, threshold))
}

/// What happens once a held posture has crossed the dwell threshold
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EmitPolicy {
    /// Emit on every sample for as long as the posture is held
    #[default]
    Repeat,
    /// Emit once; the posture must change or drop out before emitting again
    Once,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ClassifierConfig {
    /// Minimum keypoint score for a landmark to count as evidence
    pub confidence_threshold: f32,
    /// How long a posture must be held before it is emitted
    pub dwell_ms: u64,
    pub emit_policy: EmitPolicy,
}

impl Default for ClassifierConfig {
    fn default() -> Self {
        Self {
            confidence_threshold: 0.4,
            dwell_ms: 220,
            emit_policy: EmitPolicy::Repeat,
        }
    }
}

impl ClassifierConfig {
    pub fn dwell(&self) -> Duration {
        Duration::from_millis(self.dwell_ms)
    }

    pub fn validate(&self) -> Result<(), String> {
        if !(0.0..=1.0).contains(&self.confidence_threshold) {
            return Err(format!(
                "confidence_threshold must be in [0, 1], got {}",
                self.confidence_threshold
            ));
        }

        Ok(())
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
enum DwellState {
    Idle,
    Accumulating {
        posture: Posture,
        since: Instant,
        /// Already emitted under [`EmitPolicy::Once`]
        fired: bool,
    },
}

/// Debounces per-sample postures into direction commands.
///
/// State is private to each instance; two classifiers fed different streams
/// never influence each other.
#[derive(Debug, Clone)]
pub struct DirectionClassifier {
    config: ClassifierConfig,
    state: DwellState,
}

impl DirectionClassifier {
    pub fn new(config: ClassifierConfig) -> Self {
        Self {
            config,
            state: DwellState::Idle,
        }
    }

    pub fn config(&self) -> &ClassifierConfig {
        &self.config
    }

    /// Feed one sample. `None` means no pose was detected, which counts as
    /// no evidence.
    pub fn evaluate(&mut self, pose: Option<&Pose>, now: Instant) -> Option<Direction> {
        let evidence = pose.and_then(|pose| detect_posture(pose, self.config.confidence_threshold));
        self.observe(evidence, now)
    }

    /// Advance the dwell state machine with an already classified sample
    pub fn observe(&mut self, evidence: Option<Posture>, now: Instant) -> Option<Direction> {
        let Some(posture) = evidence else {
            if let DwellState::Accumulating { posture, .. } = self.state {
                debug!("{} dropped, dwell timer reset", posture.label());
            }
            self.state = DwellState::Idle;
            return None;
        };

        match &mut self.state {
            DwellState::Accumulating {
                posture: pending,
                since,
                fired,
            } if *pending == posture => {
                let held = now.saturating_duration_since(*since);
                if held < self.config.dwell() {
                    trace!("{} held for {:?}", posture.label(), held);
                    return None;
                }

                match self.config.emit_policy {
                    EmitPolicy::Repeat => {}
                    EmitPolicy::Once if *fired => return None,
                    EmitPolicy::Once => *fired = true,
                }

                debug!("{} held for {:?}, emitting {}", posture.label(), held, posture.direction());
                Some(posture.direction())
            }
            _ => {
                debug!("{} detected, dwell timer started", posture.label());
                self.state = DwellState::Accumulating {
                    posture,
                    since: now,
                    fired: false,
                };
                None
            }
        }
    }

    /// Posture currently accumulating dwell time
    pub fn pending(&self) -> Option<Posture> {
        match self.state {
            DwellState::Idle => None,
            DwellState::Accumulating { posture, .. } => Some(posture),
        }
    }

    pub fn pending_direction(&self) -> Option<Direction> {
        self.pending().map(|posture| posture.direction())
    }

    /// Fraction of the dwell window the pending posture has covered, in [0, 1]
    pub fn progress(&self, now: Instant) -> f32 {
        match self.state {
            DwellState::Idle => 0.0,
            DwellState::Accumulating { since, .. } => {
                let dwell = self.config.dwell();
                if dwell.is_zero() {
                    return 1.0;
                }
                let held = now.saturating_duration_since(since);
                (held.as_secs_f32() / dwell.as_secs_f32()).min(1.0)
            }
        }
    }

    /// Drop any pending posture
    pub fn reset(&mut self) {
        self.state = DwellState::Idle;
    }
}
