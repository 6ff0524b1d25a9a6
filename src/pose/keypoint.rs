use serde::{Deserialize, Serialize};

/// Named body landmarks reported by the keypoint provider
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum KeypointName {
    Nose,
    LeftEye,
    RightEye,
    LeftEar,
    RightEar,
    LeftShoulder,
    RightShoulder,
    LeftElbow,
    RightElbow,
    LeftWrist,
    RightWrist,
    LeftHip,
    RightHip,
    LeftKnee,
    RightKnee,
    LeftAnkle,
    RightAnkle,
    /// Any landmark this crate does not track
    #[serde(other)]
    Unknown,
}

/// One landmark in image space (y grows downwards) with a confidence in [0, 1]
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Keypoint {
    pub name: KeypointName,
    pub x: f32,
    pub y: f32,
    /// Missing scores count as zero confidence
    #[serde(default)]
    pub score: f32,
}

impl Keypoint {
    pub fn new(name: KeypointName, x: f32, y: f32, score: f32) -> Self {
        Self { name, x, y, score }
    }
}

/// A single detected body pose
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Pose {
    pub keypoints: Vec<Keypoint>,
}

impl Pose {
    pub fn new(keypoints: Vec<Keypoint>) -> Self {
        Self { keypoints }
    }

    pub fn get(&self, name: KeypointName) -> Option<&Keypoint> {
        self.keypoints.iter().find(|kp| kp.name == name)
    }

    /// The landmark, if present with at least `threshold` confidence
    pub fn confident(&self, name: KeypointName, threshold: f32) -> Option<&Keypoint> {
        self.get(name).filter(|kp| kp.score >= threshold)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_provider_json() {
        let json = r#"{"keypoints":[
            {"name":"right_wrist","x":120.0,"y":80.5,"score":0.91},
            {"name":"left_big_toe","x":1.0,"y":2.0,"score":0.5},
            {"name":"right_shoulder","x":118.0,"y":140.0}
        ]}"#;
        let pose: Pose = serde_json::from_str(json).unwrap();

        assert_eq!(pose.keypoints.len(), 3);
        assert_eq!(pose.keypoints[1].name, KeypointName::Unknown);

        let wrist = pose.get(KeypointName::RightWrist).unwrap();
        assert_eq!(wrist.y, 80.5);
        assert_eq!(pose.get(KeypointName::RightShoulder).unwrap().score, 0.0);
    }

    #[test]
    fn test_confident_filters_low_scores() {
        let pose = Pose::new(vec![
            Keypoint::new(KeypointName::LeftKnee, 0.0, 10.0, 0.39),
            Keypoint::new(KeypointName::LeftHip, 0.0, 20.0, 0.4),
        ]);

        assert!(pose.confident(KeypointName::LeftKnee, 0.4).is_none());
        assert!(pose.confident(KeypointName::LeftHip, 0.4).is_some());
        assert!(pose.confident(KeypointName::Nose, 0.0).is_none());
    }
}
