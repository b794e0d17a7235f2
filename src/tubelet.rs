use crate::bbox::{BBox, Ltrb};
use crate::track::Track;
use serde_derive::{Deserialize, Serialize};

/// Per-frame score record of a tubelet.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct TubeletBox {
    pub frame: u32,
    pub bbox: BBox<Ltrb>,
    #[serde(default)]
    pub det_score: f32,
    #[serde(default)]
    pub track_score: f32,
    #[serde(default)]
    pub anchor: i32,
    #[serde(default)]
    pub gt_overlap: f32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub feat: Option<Vec<f32>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub all_score: Option<Vec<f32>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub conv_score: Option<f32>,
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct Tubelet {
    pub id: u32,
    pub class_index: usize,
    #[serde(default)]
    pub gt: i32,
    pub boxes: Vec<TubeletBox>,
}

impl Tubelet {
    /// Fresh, unscored tubelet of `class_index` following `track`.
    pub fn from_track(track: &Track, class_index: usize) -> Self {
        Self {
            id: track.id,
            class_index,
            gt: 0,
            boxes: track
                .boxes
                .iter()
                .map(|b| TubeletBox {
                    frame: b.frame,
                    bbox: b.bbox,
                    det_score: 0.0,
                    track_score: b.score.unwrap_or(0.0),
                    anchor: b.anchor,
                    gt_overlap: 0.0,
                    feat: None,
                    all_score: None,
                    conv_score: None,
                })
                .collect(),
        }
    }

    pub fn from_tracks(tracks: &[Track], class_index: usize) -> Vec<Self> {
        tracks
            .iter()
            .map(|t| Self::from_track(t, class_index))
            .collect()
    }

    #[inline]
    pub fn box_at_frame(&self, frame: u32) -> Option<&BBox<Ltrb>> {
        self.boxes.iter().find(|b| b.frame == frame).map(|b| &b.bbox)
    }

    /// The single record of `frame`.
    ///
    /// # Panics
    ///
    /// If the tubelet holds zero or several records for `frame`.
    pub fn record_mut(&mut self, frame: u32) -> &mut TubeletBox {
        let id = self.id;
        let mut found = self.boxes.iter_mut().filter(|b| b.frame == frame);
        let record = found.next();
        let count = record.is_some() as usize + found.count();

        match record {
            Some(record) if count == 1 => record,
            _ => panic!(
                "tubelet {}: expected exactly one record at frame {}, found {}",
                id, frame, count
            ),
        }
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
