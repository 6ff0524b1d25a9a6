//! Pose providers
//!
//! The keypoint estimator itself is outside this crate. Poses arrive as JSON
//! Lines, one frame per line: either a pose object
//! (`{"keypoints":[{"name":"right_wrist","x":1.0,"y":2.0,"score":0.9}]}`) or
//! `null` for a frame in which nobody was detected. Blank lines and lines
//! starting with `#` are ignored.

use anyhow::{Context, Result};
use log::{info, warn};
use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::Path;
use tokio::io::{AsyncBufRead, AsyncBufReadExt};
use tokio::sync::watch;

use super::keypoint::Pose;

/// Something the sampling loop can ask for the current pose
pub trait PoseSource {
    /// The pose for this sample, or `None` if no body is detected
    fn next_pose(&mut self) -> Option<Pose>;

    /// True once the source will never produce another pose
    fn is_exhausted(&self) -> bool {
        false
    }
}

/// Parse one JSON Lines frame. `Ok(None)` for lines carrying no frame.
fn parse_frame(line: &str) -> Result<Option<Option<Pose>>> {
    let line = line.trim();
    if line.is_empty() || line.starts_with('#') {
        return Ok(None);
    }

    let frame: Option<Pose> = serde_json::from_str(line).context("Invalid pose frame")?;
    Ok(Some(frame))
}

/// Replays a recorded sequence of frames, one per sample
#[derive(Debug, Clone)]
pub struct ScriptedPoseSource {
    frames: Vec<Option<Pose>>,
    cursor: usize,
    looping: bool,
}

impl ScriptedPoseSource {
    pub fn new(frames: Vec<Option<Pose>>, looping: bool) -> Self {
        Self {
            frames,
            cursor: 0,
            looping,
        }
    }

    /// Read every frame from a JSON Lines reader
    pub fn from_reader<R: BufRead>(reader: R, looping: bool) -> Result<Self> {
        let mut frames = Vec::new();

        for (index, line) in reader.lines().enumerate() {
            let line = line.with_context(|| format!("Failed to read line {}", index + 1))?;
            if let Some(frame) =
                parse_frame(&line).with_context(|| format!("Bad frame on line {}", index + 1))?
            {
                frames.push(frame);
            }
        }

        Ok(Self::new(frames, looping))
    }

    pub fn load(path: &Path, looping: bool) -> Result<Self> {
        let file = File::open(path)
            .with_context(|| format!("Failed to open pose script {:?}", path))?;
        let source = Self::from_reader(BufReader::new(file), looping)
            .with_context(|| format!("Failed to parse pose script {:?}", path))?;
        info!("loaded {} pose frames from {:?}", source.len(), path);
        Ok(source)
    }

    pub fn len(&self) -> usize {
        self.frames.len()
    }

    pub fn is_empty(&self) -> bool {
        self.frames.is_empty()
    }
}

impl PoseSource for ScriptedPoseSource {
    fn next_pose(&mut self) -> Option<Pose> {
        if self.cursor >= self.frames.len() {
            if !self.looping || self.frames.is_empty() {
                return None;
            }
            self.cursor = 0;
        }

        let frame = self.frames[self.cursor].clone();
        self.cursor += 1;
        frame
    }

    fn is_exhausted(&self) -> bool {
        self.cursor >= self.frames.len() && (!self.looping || self.frames.is_empty())
    }
}

/// Follows a live JSON Lines stream and hands out the most recent frame.
///
/// A background task reads the stream; samples that arrive faster than the
/// stream see the same frame again, frames that arrive faster than the
/// samples are skipped.
#[derive(Debug)]
pub struct StreamPoseSource {
    latest: watch::Receiver<Option<Pose>>,
}

impl StreamPoseSource {
    /// Spawn the reader task. Must be called inside a tokio runtime.
    pub fn spawn<R>(reader: R) -> Self
    where
        R: AsyncBufRead + Unpin + Send + 'static,
    {
        let (tx, rx) = watch::channel(None);

        tokio::spawn(async move {
            let mut lines = reader.lines();
            loop {
                match lines.next_line().await {
                    Ok(Some(line)) => match parse_frame(&line) {
                        Ok(Some(frame)) => {
                            if tx.send(frame).is_err() {
                                break;
                            }
                        }
                        Ok(None) => {}
                        Err(err) => warn!("skipping pose frame: {:#}", err),
                    },
                    Ok(None) => {
                        info!("pose stream ended");
                        break;
                    }
                    Err(err) => {
                        warn!("pose stream read failed: {}", err);
                        break;
                    }
                }
            }
            // Nobody is visible once the stream is gone
            let _ = tx.send(None);
        });

        Self { latest: rx }
    }

    /// Follow newline-delimited frames on standard input
    pub fn stdin() -> Self {
        Self::spawn(tokio::io::BufReader::new(tokio::io::stdin()))
    }
}

impl PoseSource for StreamPoseSource {
    fn next_pose(&mut self) -> Option<Pose> {
        self.latest.borrow_and_update().clone()
    }

    fn is_exhausted(&self) -> bool {
        self.latest.has_changed().is_err()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pose::keypoint::KeypointName;
    use std::io::{Cursor, Write};
    use std::time::Duration;

    const SCRIPT: &str = r#"
# right hand raised, then nobody
{"keypoints":[{"name":"right_wrist","x":0,"y":10,"score":0.9},{"name":"right_shoulder","x":0,"y":50,"score":0.9}]}
null

{"keypoints":[]}
"#;

    #[test]
    fn test_scripted_source_plays_frames_in_order() {
        let mut source = ScriptedPoseSource::from_reader(Cursor::new(SCRIPT), false).unwrap();
        assert_eq!(source.len(), 3);

        let first = source.next_pose().unwrap();
        assert!(first.get(KeypointName::RightWrist).is_some());
        assert!(source.next_pose().is_none());
        assert_eq!(source.next_pose(), Some(Pose::default()));
        assert!(source.is_exhausted());
        assert!(source.next_pose().is_none());
    }

    #[test]
    fn test_scripted_source_loops() {
        let mut source = ScriptedPoseSource::from_reader(Cursor::new(SCRIPT), true).unwrap();
        for _ in 0..3 {
            source.next_pose();
        }
        assert!(!source.is_exhausted());
        assert!(source.next_pose().is_some());
    }

    #[test]
    fn test_scripted_source_reports_bad_line() {
        let err = ScriptedPoseSource::from_reader(Cursor::new("null\n{oops\n"), false).unwrap_err();
        assert!(format!("{:#}", err).contains("line 2"));
    }

    #[test]
    fn test_load_from_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(SCRIPT.as_bytes()).unwrap();

        let source = ScriptedPoseSource::load(file.path(), false).unwrap();
        assert_eq!(source.len(), 3);
        assert!(ScriptedPoseSource::load(Path::new("/nonexistent/poses.jsonl"), false).is_err());
    }

    #[tokio::test]
    async fn test_stream_source_tracks_latest_frame() {
        let (mut writer, reader) = tokio::io::duplex(4096);
        let mut source = StreamPoseSource::spawn(tokio::io::BufReader::new(reader));
        assert!(source.next_pose().is_none());

        use tokio::io::AsyncWriteExt;
        writer
            .write_all(b"{\"keypoints\":[{\"name\":\"left_knee\",\"x\":1,\"y\":2,\"score\":0.7}]}\n")
            .await
            .unwrap();
        writer.flush().await.unwrap();

        let mut seen = None;
        for _ in 0..50 {
            tokio::time::sleep(Duration::from_millis(10)).await;
            seen = source.next_pose();
            if seen.is_some() {
                break;
            }
        }
        let pose = seen.expect("frame should arrive");
        assert!(pose.get(KeypointName::LeftKnee).is_some());

        drop(writer);
        for _ in 0..50 {
            tokio::time::sleep(Duration::from_millis(10)).await;
            if source.is_exhausted() {
                break;
            }
        }
        assert!(source.is_exhausted());
        assert!(source.next_pose().is_none());
    }
}
