use crate::track::TrackBox;
use crate::tubelet::Tubelet;
use serde_derive::{Deserialize, Serialize};

/// Overlap at which a tubelet box counts as matching ground truth.
pub const POSITIVE_OVERLAP: f32 = 0.5;

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct GtTrack {
    pub id: u32,
    pub class_index: usize,
    pub track: Vec<TrackBox>,
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct Annotation {
    pub video: String,
    pub annotations: Vec<GtTrack>,
}

/// Fills `gt_overlap` of every tubelet box with its best overlap against a
/// same-class ground-truth box of the same frame, and marks tubelets whose
/// mean overlap reaches [`POSITIVE_OVERLAP`] with `gt = 1`.
pub fn annotate_overlaps(tubelets: &mut [Tubelet], annotation: &Annotation, class_index: usize) {
    let gt_tracks: Vec<&GtTrack> = annotation
        .annotations
        .iter()
        .filter(|a| a.class_index == class_index)
        .collect();

    for tubelet in tubelets.iter_mut() {
        for record in tubelet.boxes.iter_mut() {
            let (frame, bbox) = (record.frame, record.bbox);
            record.gt_overlap = gt_tracks
                .iter()
                .flat_map(|gt| gt.track.iter().filter(move |b| b.frame == frame))
                .map(|b| bbox.iou(&b.bbox))
                .fold(0.0, f32::max);
        }

        let mean = if tubelet.is_empty() {
            0.0
        } else {
            tubelet.boxes.iter().map(|b| b.gt_overlap).sum::<f32>() / tubelet.len() as f32
        };
        tubelet.gt = (mean >= POSITIVE_OVERLAP) as i32;
    }
}
