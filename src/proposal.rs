use crate::bbox::{BBox, Ltrb};
use serde_derive::{Deserialize, Serialize};

#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq)]
pub struct ClassScore {
    pub class_index: usize,
    pub score: f32,
}

/// Detection proposal, independent of any track
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct Proposal {
    pub frame: u32,
    pub bbox: BBox<Ltrb>,
    pub scores: Vec<ClassScore>,
}

impl Proposal {
    /// Score for `class_index`, negative infinity when the proposal carries none.
    pub fn score(&self, class_index: usize) -> f32 {
        self.scores
            .iter()
            .find(|s| s.class_index == class_index)
            .map(|s| s.score)
            .unwrap_or(f32::NEG_INFINITY)
    }
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct ProposalSet {
    pub video: String,
    pub detections: Vec<Proposal>,
}

impl ProposalSet {
    pub fn at_frame(&self, frame: u32) -> impl Iterator<Item = &Proposal> {
        self.detections.iter().filter(move |d| d.frame == frame)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_class_scores_negative_infinity() {
        let p = Proposal {
            frame: 1,
            bbox: BBox::ltrb(0., 0., 1., 1.),
            scores: vec![ClassScore {
                class_index: 3,
                score: 0.25,
            }],
        };
        assert_eq!(p.score(3), 0.25);
        assert_eq!(p.score(4), f32::NEG_INFINITY);
    }
}
