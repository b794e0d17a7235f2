use crate::annotation::{annotate_overlaps, Annotation};
use crate::bbox::{BBox, Ltrb};
use crate::classes::class_name;
use crate::config::ScoringConfig;
use crate::detector::{ClassScorer, FeatureExtractor, ImageLoader};
use crate::error::Error;
use crate::frame::Video;
use crate::fusion::{fuse_with_proposals, select_max_samples, Fusion};
use crate::proposal::ProposalSet;
use crate::protocol::ScoreSet;
use crate::sampler::BoxSampler;
use crate::track::TrackSet;
use crate::tubelet::{Tubelet, TubeletBox};

use ndarray::prelude::*;
use tracing::{debug, info};

#[derive(Debug, Clone, Copy)]
pub enum ScoringMethod<'a> {
    /// Score every tubelet box as is.
    Rcnn,
    /// Score jittered copies of every box and keep the best one.
    RcnnSampling,
    /// Replace a tubelet box by a better overlapping detection proposal.
    RcnnProposalFusion(&'a ProposalSet),
}

impl ScoringMethod<'_> {
    pub fn name(&self) -> &'static str {
        match self {
            ScoringMethod::Rcnn => "rcnn_scoring",
            ScoringMethod::RcnnSampling => "rcnn_sampling_scoring",
            ScoringMethod::RcnnProposalFusion(_) => "rcnn_sampling_dets_scoring",
        }
    }
}

/// Per-frame driver writing detector scores into tubelet records.
pub struct TubeletScorer<'a, L, E, S> {
    config: ScoringConfig,
    sampler: BoxSampler,
    loader: &'a mut L,
    extractor: &'a mut E,
    svm: &'a S,
}

impl<'a, L, E, S> TubeletScorer<'a, L, E, S>
where
    L: ImageLoader,
    E: FeatureExtractor<L::Image>,
    S: ClassScorer,
{
    pub fn new(
        config: ScoringConfig,
        loader: &'a mut L,
        extractor: &'a mut E,
        svm: &'a S,
    ) -> Result<Self, Error> {
        config.validate()?;
        let sampler = BoxSampler::new(config.seed);

        Ok(Self {
            config,
            sampler,
            loader,
            extractor,
            svm,
        })
    }

    #[inline]
    pub fn config(&self) -> &ScoringConfig {
        &self.config
    }

    /// Derives tubelets of `class_index` from `tracks`, scores them and, when
    /// given ground truth, fills in their overlaps.
    pub fn score_tracks(
        &mut self,
        video: &Video,
        tracks: &TrackSet,
        annotation: Option<&Annotation>,
        class_index: usize,
        method: ScoringMethod<'_>,
    ) -> Result<ScoreSet, Error> {
        let others = std::iter::once(&tracks.video).chain(annotation.map(|a| &a.video));
        for other in others {
            if *other != video.video {
                return Err(Error::VideoMismatch {
                    video: video.video.clone(),
                    other: other.clone(),
                });
            }
        }

        let tubelets = Tubelet::from_tracks(&tracks.tracks, class_index);
        let mut tubelets = self.score(video, tubelets, class_index, method)?;

        if let Some(annotation) = annotation {
            annotate_overlaps(&mut tubelets, annotation, class_index);
        }

        Ok(ScoreSet {
            video: video.video.clone(),
            method: method.name().to_string(),
            tubelets,
        })
    }

    /// Scores `tubelets` frame by frame and hands them back.
    ///
    /// # Panics
    ///
    /// If a tubelet with a box at some frame does not hold exactly one
    /// record for that frame.
    pub fn score(
        &mut self,
        video: &Video,
        mut tubelets: Vec<Tubelet>,
        class_index: usize,
        method: ScoringMethod<'_>,
    ) -> Result<Vec<Tubelet>, Error> {
        let column = self.config.column(class_index)?;
        info!("Scoring {} for {}...", video.video, class_name(class_index));

        for frame in video.iter() {
            let frame_id = frame.frame;
            let (valid_index, valid_boxes): (Vec<usize>, Vec<BBox<Ltrb>>) = tubelets
                .iter()
                .enumerate()
                .filter_map(|(idx, t)| t.box_at_frame(frame_id).map(|b| (idx, *b)))
                .unzip();

            info!("frame {}: {} boxes", frame_id, valid_index.len());
            if valid_index.is_empty() {
                continue;
            }

            let image = self.loader.read(&video.frame_path(frame))?;

            match method {
                ScoringMethod::Rcnn => {
                    let (features, scores) = self.extract(&image, &valid_boxes)?;

                    for (row, &tubelet_id) in valid_index.iter().enumerate() {
                        let record = tubelets[tubelet_id].record_mut(frame_id);
                        record.det_score = scores[(row, column)];
                        self.keep_vectors(record, features.row(row), scores.row(row));
                    }
                }

                ScoringMethod::RcnnSampling => {
                    let samples = self.config.samples_per_box;
                    let ratio = self.config.jitter_ratio;
                    let sampled: Vec<BBox<Ltrb>> = valid_boxes
                        .iter()
                        .flat_map(|b| self.sampler.sample(b, samples, ratio, true))
                        .collect();

                    let (features, scores) = self.extract(&image, &sampled)?;
                    let choices = select_max_samples(
                        scores.column(column),
                        features.view(),
                        scores.view(),
                        &sampled,
                        samples + 1,
                    )?;

                    for (choice, &tubelet_id) in choices.iter().zip(valid_index.iter()) {
                        let record = tubelets[tubelet_id].record_mut(frame_id);
                        record.det_score = choice.score;
                        record.bbox = choice.bbox;
                        self.keep_vectors(record, choice.feat.view(), choice.all_score.view());
                    }
                }

                ScoringMethod::RcnnProposalFusion(proposals) => {
                    let (features, scores) = self.extract(&image, &valid_boxes)?;
                    let dets: Vec<(BBox<Ltrb>, f32)> = proposals
                        .at_frame(frame_id)
                        .map(|p| (p.bbox, p.score(class_index)))
                        .collect();

                    for (row, &tubelet_id) in valid_index.iter().enumerate() {
                        let tubelet = &mut tubelets[tubelet_id];
                        let id = tubelet.id;
                        let record = tubelet.record_mut(frame_id);
                        let own_score = scores[(row, column)];

                        match fuse_with_proposals(
                            &record.bbox,
                            own_score,
                            &dets,
                            self.config.overlap_threshold,
                        ) {
                            Fusion::Proposal { bbox, score } => {
                                debug!(
                                    "frame {}: tubelet {} adopts proposal {:?} ({} > {})",
                                    frame_id, id, bbox, score, own_score
                                );
                                let (max_feat, max_scores) = self.extract(&image, &[bbox])?;
                                record.det_score = score;
                                record.bbox = bbox;
                                self.keep_vectors(record, max_feat.row(0), max_scores.row(0));
                            }
                            Fusion::Own => {
                                record.det_score = own_score;
                                self.keep_vectors(record, features.row(row), scores.row(row));
                            }
                        }
                    }
                }
            }
        }

        Ok(tubelets)
    }

    /// Features and class scores of `boxes`, one row each.
    fn extract(
        &mut self,
        image: &L::Image,
        boxes: &[BBox<Ltrb>],
    ) -> Result<(Array2<f32>, Array2<f32>), Error> {
        let features = self
            .extractor
            .features(image, boxes, &self.config.feature_layer)?;
        if features.nrows() != boxes.len() {
            return Err(Error::RowCount {
                expected: boxes.len(),
                found: features.nrows(),
            });
        }

        let scores = self.svm.scores(features.view())?;
        if scores.ncols() != self.config.num_classes {
            return Err(Error::ScoreWidth {
                expected: self.config.num_classes,
                found: scores.ncols(),
            });
        }

        if scores.nrows() != boxes.len() {
            return Err(Error::RowCount {
                expected: boxes.len(),
                found: scores.nrows(),
            });
        }

        Ok((features, scores))
    }

    fn keep_vectors(
        &self,
        record: &mut TubeletBox,
        feat: ArrayView1<'_, f32>,
        all_score: ArrayView1<'_, f32>,
    ) {
        if self.config.save_feat {
            record.feat = Some(feat.to_vec());
        }

        if self.config.save_all_score {
            record.all_score = Some(all_score.to_vec());
        }
    }
}
