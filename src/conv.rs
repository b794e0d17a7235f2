use crate::annotation::POSITIVE_OVERLAP;
use crate::detector::SequenceClassifier;
use crate::error::Error;
use crate::protocol::ScoreSet;
use crate::tubelet::Tubelet;

use tracing::info;

/// Per-box signals of a whole tubelet, fed to a sequence classifier.
#[derive(Debug, Clone, PartialEq)]
pub struct TubeletSignals {
    pub length: usize,
    pub gt: i32,
    pub mean_iou: f32,
    pub det_scores: Vec<f32>,
    pub track_scores: Vec<f32>,
    /// Anchor offsets normalized by the tubelet length.
    pub anchors: Vec<f32>,
    pub abs_anchors: Vec<f32>,
    pub gt_overlaps: Vec<f32>,
    pub labels: Vec<u8>,
    pub all_scores: Option<Vec<Vec<f32>>>,
    pub feats: Option<Vec<Vec<f32>>>,
}

impl TubeletSignals {
    /// Collects signals from `tubelet`. The optional vector signals are only
    /// gathered when requested, boxes missing them contribute empty vectors.
    pub fn collect(tubelet: &Tubelet, with_all_scores: bool, with_feats: bool) -> Self {
        let length = tubelet.len();
        let gt_overlaps: Vec<f32> = tubelet.boxes.iter().map(|b| b.gt_overlap).collect();
        let mean_iou = if length == 0 {
            0.0
        } else {
            gt_overlaps.iter().sum::<f32>() / length as f32
        };
        let anchors: Vec<f32> = tubelet
            .boxes
            .iter()
            .map(|b| b.anchor as f32 / length as f32)
            .collect();

        Self {
            length,
            gt: tubelet.gt,
            mean_iou,
            det_scores: tubelet.boxes.iter().map(|b| b.det_score).collect(),
            track_scores: tubelet.boxes.iter().map(|b| b.track_score).collect(),
            abs_anchors: anchors.iter().map(|a| a.abs()).collect(),
            anchors,
            labels: gt_overlaps
                .iter()
                .map(|&o| (o >= POSITIVE_OVERLAP) as u8)
                .collect(),
            gt_overlaps,
            all_scores: with_all_scores.then(|| {
                tubelet
                    .boxes
                    .iter()
                    .map(|b| b.all_score.clone().unwrap_or_default())
                    .collect()
            }),
            feats: with_feats.then(|| {
                tubelet
                    .boxes
                    .iter()
                    .map(|b| b.feat.clone().unwrap_or_default())
                    .collect()
            }),
        }
    }
}

/// Classifies every tubelet of `score_set` as a whole and stores the
/// per-box positive probability as `conv_score` in a new score set.
pub fn score_conv<C: SequenceClassifier>(
    score_set: &ScoreSet,
    classifier: &mut C,
) -> Result<ScoreSet, Error> {
    let mut scored = score_set.clone();
    let caps = classifier.capabilities();
    info!("{}: {} tubelet(s).", scored.video, scored.tubelets.len());

    for tubelet in scored.tubelets.iter_mut() {
        let signals = TubeletSignals::collect(tubelet, caps.all_scores, caps.feats);
        let probs = classifier.classify(&signals)?;
        if probs.len() != tubelet.len() {
            return Err(Error::RowCount {
                expected: tubelet.len(),
                found: probs.len(),
            });
        }

        for (record, prob) in tubelet.boxes.iter_mut().zip(probs) {
            record.conv_score = Some(prob);
        }
    }

    Ok(scored)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::bbox::BBox;
    use crate::detector::Capabilities;
    use crate::track::{Track, TrackBox};
    use nearly_eq::assert_nearly_eq;

    struct MeanOfDetScores {
        caps: Capabilities,
        seen: Vec<TubeletSignals>,
    }

    impl SequenceClassifier for MeanOfDetScores {
        fn capabilities(&self) -> Capabilities {
            self.caps
        }

        fn classify(&mut self, signals: &TubeletSignals) -> Result<Vec<f32>, Error> {
            self.seen.push(signals.clone());
            let mean = signals.det_scores.iter().sum::<f32>() / signals.length as f32;
            Ok(vec![mean; signals.length])
        }
    }

    fn score_set() -> ScoreSet {
        let track = Track {
            id: 0,
            boxes: (0..4)
                .map(|i| TrackBox {
                    frame: i + 1,
                    bbox: BBox::ltrb(0., 0., 10., 10.),
                    anchor: i as i32 - 2,
                    score: Some(0.5),
                })
                .collect(),
        };
        let mut tubelet = Tubelet::from_track(&track, 1);
        for (i, b) in tubelet.boxes.iter_mut().enumerate() {
            b.det_score = i as f32;
            b.gt_overlap = if i < 2 { 0.7 } else { 0.1 };
            b.all_score = Some(vec![i as f32; 3]);
        }

        ScoreSet {
            video: "vid".into(),
            method: "rcnn_scoring".into(),
            tubelets: vec![tubelet],
        }
    }

    #[test]
    fn signals_follow_tubelet_boxes() {
        let set = score_set();
        let s = TubeletSignals::collect(&set.tubelets[0], true, false);
        assert_eq!(s.length, 4);
        assert_eq!(s.anchors, vec![-0.5, -0.25, 0.0, 0.25]);
        assert_eq!(s.abs_anchors, vec![0.5, 0.25, 0.0, 0.25]);
        assert_eq!(s.labels, vec![1, 1, 0, 0]);
        assert_nearly_eq!(s.mean_iou, 0.4f32, 1e-4);
        assert_eq!(s.all_scores.as_ref().map(|a| a.len()), Some(4));
        assert!(s.feats.is_none());
    }

    #[test]
    fn writes_conv_scores_without_touching_input() {
        let set = score_set();
        let mut classifier = MeanOfDetScores {
            caps: Capabilities::default(),
            seen: vec![],
        };

        let scored = score_conv(&set, &mut classifier).unwrap();

        assert!(set.tubelets[0].boxes.iter().all(|b| b.conv_score.is_none()));
        assert!(scored.tubelets[0]
            .boxes
            .iter()
            .all(|b| b.conv_score == Some(1.5)));
        assert!(classifier.seen[0].all_scores.is_none());
    }

    #[test]
    fn capabilities_select_vector_signals() {
        let set = score_set();
        let mut classifier = MeanOfDetScores {
            caps: Capabilities::new(true, true),
            seen: vec![],
        };
        score_conv(&set, &mut classifier).unwrap();
        let seen = &classifier.seen[0];
        assert_eq!(seen.all_scores.as_ref().unwrap()[2], vec![2.0; 3]);
        assert_eq!(seen.feats.as_ref().unwrap()[0], Vec::<f32>::new());
    }

    struct Short;

    impl SequenceClassifier for Short {
        fn capabilities(&self) -> Capabilities {
            Capabilities::default()
        }

        fn classify(&mut self, _: &TubeletSignals) -> Result<Vec<f32>, Error> {
            Ok(vec![0.5])
        }
    }

    #[test]
    fn probability_count_mismatch_is_error() {
        assert!(matches!(
            score_conv(&score_set(), &mut Short),
            Err(Error::RowCount {
                expected: 4,
                found: 1
            })
        ));
    }
}
