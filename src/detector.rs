use crate::bbox::{BBox, Ltrb};
use crate::conv::TubeletSignals;
use crate::error::Error;

use ndarray::prelude::*;
use std::path::Path;

/// RCNN rescales features so that their mean norm equals this value.
const TARGET_FEAT_NORM: f32 = 20.0;

pub trait ImageLoader {
    type Image;

    fn read(&mut self, path: &Path) -> Result<Self::Image, Error>;
}

/// Pretrained network cropping `boxes` out of an image and returning one
/// feature row per box, `[N, D]`.
pub trait FeatureExtractor<I> {
    fn features(&mut self, image: &I, boxes: &[BBox<Ltrb>], layer: &str)
        -> Result<Array2<f32>, Error>;
}

/// Maps feature rows to class scores, `[N, D] -> [N, C]`.
pub trait ClassScorer {
    fn scores(&self, features: ArrayView2<'_, f32>) -> Result<Array2<f32>, Error>;
}

/// Whole-network classifier scoring a single region, full class-score vector.
pub trait RegionClassifier<I> {
    fn classify(&mut self, image: &I, bbox: &BBox<Ltrb>) -> Result<Vec<f32>, Error>;
}

pub struct RegionDetections {
    /// `[N, C]`
    pub scores: Array2<f32>,
    /// Regressed box for every input box.
    pub boxes: Vec<BBox<Ltrb>>,
}

/// Batched region detector (one call per frame).
pub trait RegionDetector<I> {
    fn detect(&mut self, image: &I, boxes: &[BBox<Ltrb>]) -> Result<RegionDetections, Error>;
}

/// Inputs a sequence classifier accepts besides the scalar per-box signals.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Capabilities {
    pub all_scores: bool,
    pub feats: bool,
}

impl Capabilities {
    pub fn new(all_scores: bool, feats: bool) -> Self {
        Self { all_scores, feats }
    }
}

/// Temporal classifier over a whole tubelet, returns the positive-class
/// probability of every box.
pub trait SequenceClassifier {
    fn capabilities(&self) -> Capabilities;

    fn classify(&mut self, signals: &TubeletSignals) -> Result<Vec<f32>, Error>;
}

/// One-vs-rest linear SVMs, `scores = scale * features · W + b`.
#[derive(Debug, Clone)]
pub struct LinearSvm {
    weights: Array2<f32>,
    bias: Array1<f32>,
    scale: f32,
}

impl LinearSvm {
    /// `weights` is `[D, C]`, `bias` is `[C]`.
    pub fn new(weights: Array2<f32>, bias: Array1<f32>) -> Result<Self, Error> {
        if weights.ncols() != bias.len() {
            return Err(Error::Detector(format!(
                "svm bias has {} entries for {} classes",
                bias.len(),
                weights.ncols()
            )));
        }

        Ok(Self {
            weights,
            bias,
            scale: 1.0,
        })
    }

    /// Applies RCNN feature normalization given the training-set mean norm.
    pub fn with_feat_norm_mean(mut self, feat_norm_mean: f32) -> Self {
        if feat_norm_mean > 0.0 {
            self.scale = TARGET_FEAT_NORM / feat_norm_mean;
        }

        self
    }

    #[inline]
    pub fn num_classes(&self) -> usize {
        self.weights.ncols()
    }

    #[inline]
    pub fn feature_dim(&self) -> usize {
        self.weights.nrows()
    }
}

impl ClassScorer for LinearSvm {
    fn scores(&self, features: ArrayView2<'_, f32>) -> Result<Array2<f32>, Error> {
        if features.ncols() != self.feature_dim() {
            return Err(Error::Detector(format!(
                "feature dimension {} does not match svm dimension {}",
                features.ncols(),
                self.feature_dim()
            )));
        }

        let mut scores = features.dot(&self.weights);
        scores *= self.scale;
        scores += &self.bias;

        Ok(scores)
    }
}
