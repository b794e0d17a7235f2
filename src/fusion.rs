use crate::bbox::{iou_matrix, BBox, Ltrb};
use crate::error::Error;

use ndarray::prelude::*;

/// Best sample of one group of jittered boxes.
#[derive(Debug, Clone, PartialEq)]
pub struct SampleChoice {
    pub score: f32,
    /// Position inside the group, 0 is the original box.
    pub index: usize,
    pub feat: Array1<f32>,
    pub all_score: Array1<f32>,
    pub bbox: BBox<Ltrb>,
}

/// Index of the first maximum.
fn argmax<'a, I: IntoIterator<Item = &'a f32>>(values: I) -> Option<(usize, f32)> {
    let mut best: Option<(usize, f32)> = None;
    for (idx, &val) in values.into_iter().enumerate() {
        match best {
            Some((_, b)) if !(val > b) => {}
            _ => best = Some((idx, val)),
        }
    }

    best
}

/// Splits flat per-sample rows into consecutive groups of `group_size` and
/// keeps the sample with the highest target-class score from each group.
pub fn select_max_samples(
    cls_scores: ArrayView1<'_, f32>,
    features: ArrayView2<'_, f32>,
    all_scores: ArrayView2<'_, f32>,
    boxes: &[BBox<Ltrb>],
    group_size: usize,
) -> Result<Vec<SampleChoice>, Error> {
    let total = cls_scores.len();
    if group_size == 0 || total % group_size != 0 {
        return Err(Error::RowCount {
            expected: group_size,
            found: total,
        });
    }

    for found in [features.nrows(), all_scores.nrows(), boxes.len()] {
        if found != total {
            return Err(Error::RowCount {
                expected: total,
                found,
            });
        }
    }

    let mut choices = Vec::with_capacity(total / group_size);
    for (group, row) in cls_scores.exact_chunks(group_size).into_iter().enumerate() {
        let (index, score) = match argmax(row.iter()) {
            Some(best) => best,
            None => continue,
        };

        let flat = group * group_size + index;
        choices.push(SampleChoice {
            score,
            index,
            feat: features.row(flat).to_owned(),
            all_score: all_scores.row(flat).to_owned(),
            bbox: boxes[flat],
        });
    }

    Ok(choices)
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Fusion {
    /// Keep the tubelet's own detector output.
    Own,
    /// Adopt the proposal's box and score.
    Proposal { bbox: BBox<Ltrb>, score: f32 },
}

/// Compares the tubelet's own score with the best proposal overlapping it by
/// more than `threshold`. Ties keep the first proposal; the tubelet wins
/// unless a proposal is strictly better.
pub fn fuse_with_proposals(
    own_bbox: &BBox<Ltrb>,
    own_score: f32,
    proposals: &[(BBox<Ltrb>, f32)],
    threshold: f32,
) -> Fusion {
    if proposals.is_empty() {
        return Fusion::Own;
    }

    let boxes: Vec<BBox<Ltrb>> = proposals.iter().map(|(b, _)| *b).collect();
    let overlaps = iou_matrix(std::slice::from_ref(own_bbox), &boxes);

    let confident: Vec<&(BBox<Ltrb>, f32)> = proposals
        .iter()
        .zip(overlaps.row(0))
        .filter(|&(_, &iou)| iou > threshold)
        .map(|(p, _)| p)
        .collect();

    let best = argmax(confident.iter().map(|p| &p.1));
    let (max_score, max_box) = match best {
        Some((idx, score)) => (score, Some(confident[idx].0)),
        None => (f32::NEG_INFINITY, None),
    };

    match max_box {
        Some(bbox) if max_score > own_score => Fusion::Proposal {
            bbox,
            score: max_score,
        },
        _ => Fusion::Own,
    }
}
