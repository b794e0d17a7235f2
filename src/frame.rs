use serde_derive::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct Frame {
    pub frame: u32,
    /// Image path, relative to the video root unless absolute.
    pub path: PathBuf,
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct Video {
    pub video: String,
    #[serde(default)]
    pub root_path: Option<PathBuf>,
    pub frames: Vec<Frame>,
}

impl Video {
    #[inline]
    pub fn len(&self) -> usize {
        self.frames.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.frames.is_empty()
    }

    #[inline]
    pub fn iter(&self) -> impl Iterator<Item = &Frame> {
        self.frames.iter()
    }

    pub fn frame_path(&self, frame: &Frame) -> PathBuf {
        match &self.root_path {
            Some(root) if frame.path.is_relative() => root.join(&frame.path),
            _ => frame.path.clone(),
        }
    }

    pub fn frame_path_at(&self, frame_id: u32) -> Option<PathBuf> {
        self.frames
            .iter()
            .find(|f| f.frame == frame_id)
            .map(|f| self.frame_path(f))
    }

    /// Builds a video whose frames are `root/<index:06>.JPEG`, numbered from 1.
    pub fn numbered(video: &str, root: &Path, count: u32) -> Self {
        Self {
            video: video.to_string(),
            root_path: Some(root.to_path_buf()),
            frames: (1..=count)
                .map(|frame| Frame {
                    frame,
                    path: PathBuf::from(format!("{:06}.JPEG", frame - 1)),
                })
                .collect(),
        }
    }
}
