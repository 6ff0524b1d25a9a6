use pose_snake::config::AppConfig;
use pose_snake::game::Direction;
use pose_snake::pose::{DirectionClassifier, PoseSource, ScriptedPoseSource};
use std::path::PathBuf;
use std::time::Instant;

fn demo(name: &str) -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("demos").join(name)
}

#[test]
fn test_demo_config_is_valid() {
    let config = AppConfig::load(&demo("config.json")).unwrap();
    assert!(config.validate().is_ok());
    assert_eq!(config.game.grid_width, 24);
}

#[test]
fn test_demo_circuit_emits_each_direction_once() {
    let config = AppConfig::default();
    let mut source = ScriptedPoseSource::load(&demo("circuit.jsonl"), false).unwrap();
    let mut classifier = DirectionClassifier::new(config.classifier.clone());
    let t0 = Instant::now();

    let mut emitted = Vec::new();
    let mut sample = 0u32;
    while !source.is_exhausted() {
        let pose = source.next_pose();
        let now = t0 + config.sample_interval() * sample;
        if let Some(direction) = classifier.evaluate(pose.as_ref(), now) {
            emitted.push(direction);
        }
        sample += 1;
    }

    assert_eq!(
        emitted,
        vec![Direction::Up, Direction::Right, Direction::Down, Direction::Left]
    );
}
