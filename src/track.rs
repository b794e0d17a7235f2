use crate::bbox::{BBox, Ltrb};
use serde_derive::{Deserialize, Serialize};

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct TrackBox {
    pub frame: u32,
    pub bbox: BBox<Ltrb>,

    // signed offset from the frame the track was started from
    #[serde(default)]
    pub anchor: i32,

    // tracker confidence
    #[serde(default)]
    pub score: Option<f32>,
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct Track {
    #[serde(default)]
    pub id: u32,
    pub boxes: Vec<TrackBox>,
}

impl Track {
    #[inline]
    pub fn box_at_frame(&self, frame: u32) -> Option<&BBox<Ltrb>> {
        self.boxes.iter().find(|b| b.frame == frame).map(|b| &b.bbox)
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.boxes.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.boxes.is_empty()
    }
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct TrackSet {
    pub video: String,
    pub tracks: Vec<Track>,
}
