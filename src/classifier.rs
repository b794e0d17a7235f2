use crate::bbox::{BBox, Ltrb};
use crate::classes::class_name;
use crate::detector::{ImageLoader, RegionClassifier, RegionDetector};
use crate::error::Error;
use crate::frame::Video;
use crate::protocol::{ClassifiedBox, ClassifiedTrackSet};
use crate::track::TrackSet;

use tracing::info;

const FNV_OFFSET: u64 = 0xcbf2_9ce4_8422_2325;
const FNV_PRIME: u64 = 0x0000_0100_0000_01b3;

/// Content fingerprint of a box in a video frame, used to cross-reference
/// records produced by different runs.
pub trait BoxHasher {
    fn hash(&self, video: &str, frame: u32, bbox: &BBox<Ltrb>) -> String;
}

/// 64-bit FNV-1a over `video/frame/x1,y1,x2,y2`, hex encoded.
#[derive(Debug, Default, Clone, Copy)]
pub struct FnvBoxHasher;

impl BoxHasher for FnvBoxHasher {
    fn hash(&self, video: &str, frame: u32, bbox: &BBox<Ltrb>) -> String {
        let [x1, y1, x2, y2] = *bbox.as_slice();
        let key = format!("{}/{}/{},{},{},{}", video, frame, x1, y1, x2, y2);
        let hash = key
            .bytes()
            .fold(FNV_OFFSET, |h, b| (h ^ b as u64).wrapping_mul(FNV_PRIME));

        format!("{:016x}", hash)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ClassifyMethod {
    /// One classifier call per box.
    PerBox,
    /// One detector call per frame, boxes are replaced by the regressed ones.
    Batched,
}

impl ClassifyMethod {
    pub fn name(&self) -> &'static str {
        match self {
            ClassifyMethod::PerBox => "googlenet_cls",
            ClassifyMethod::Batched => "fast_rcnn_cls",
        }
    }
}

fn check_videos(video: &Video, tracks: &TrackSet) -> Result<(), Error> {
    if video.video != tracks.video {
        return Err(Error::VideoMismatch {
            video: video.video.clone(),
            other: tracks.video.clone(),
        });
    }

    Ok(())
}

/// Valid boxes of every track at `frame`, with their track index.
fn boxes_at_frame(tracks: &TrackSet, frame: u32) -> (Vec<usize>, Vec<BBox<Ltrb>>) {
    tracks
        .tracks
        .iter()
        .enumerate()
        .filter_map(|(idx, t)| t.box_at_frame(frame).map(|b| (idx, *b)))
        .unzip()
}

fn class_score(scores: &[f32], class_index: usize) -> Result<f32, Error> {
    scores
        .get(class_index)
        .copied()
        .ok_or(Error::ScoreWidth {
            expected: class_index + 1,
            found: scores.len(),
        })
}

/// Classifies every track box with its own classifier call.
pub fn classify_per_box<L, C, H>(
    video: &Video,
    tracks: &TrackSet,
    loader: &mut L,
    classifier: &mut C,
    hasher: &H,
    class_index: usize,
) -> Result<Vec<Vec<ClassifiedBox>>, Error>
where
    L: ImageLoader,
    C: RegionClassifier<L::Image>,
    H: BoxHasher,
{
    let mut new_tracks: Vec<Vec<ClassifiedBox>> = vec![Vec::new(); tracks.tracks.len()];
    info!("Classifying {}...", video.video);

    for frame in video.iter() {
        let frame_id = frame.frame;
        let (valid_index, valid_boxes) = boxes_at_frame(tracks, frame_id);
        info!("frame {}: {} boxes", frame_id, valid_index.len());
        if valid_index.is_empty() {
            continue;
        }

        let image = loader.read(&video.frame_path(frame))?;
        for (bbox, track_id) in valid_boxes.iter().zip(valid_index) {
            let scores = classifier.classify(&image, bbox)?;
            new_tracks[track_id].push(ClassifiedBox {
                frame: frame_id,
                bbox: *bbox,
                score: class_score(&scores, class_index)?,
                hash: hasher.hash(&video.video, frame_id, bbox),
            });
        }
    }

    Ok(new_tracks)
}

/// Classifies all track boxes of a frame with a single detector call.
pub fn classify_batched<L, D, H>(
    video: &Video,
    tracks: &TrackSet,
    loader: &mut L,
    detector: &mut D,
    hasher: &H,
    class_index: usize,
) -> Result<Vec<Vec<ClassifiedBox>>, Error>
where
    L: ImageLoader,
    D: RegionDetector<L::Image>,
    H: BoxHasher,
{
    let mut new_tracks: Vec<Vec<ClassifiedBox>> = vec![Vec::new(); tracks.tracks.len()];
    info!("Classifying {}...", video.video);

    for frame in video.iter() {
        let frame_id = frame.frame;
        let (valid_index, valid_boxes) = boxes_at_frame(tracks, frame_id);
        info!("frame {}: {} boxes", frame_id, valid_index.len());
        if valid_index.is_empty() {
            continue;
        }

        let image = loader.read(&video.frame_path(frame))?;
        let dets = detector.detect(&image, &valid_boxes)?;
        for found in [dets.scores.nrows(), dets.boxes.len()] {
            if found != valid_index.len() {
                return Err(Error::RowCount {
                    expected: valid_index.len(),
                    found,
                });
            }
        }

        let rows = dets.scores.outer_iter().zip(&dets.boxes);
        for ((scores, bbox), track_id) in rows.zip(valid_index) {
            let score = class_score(&scores.to_vec(), class_index)?;
            new_tracks[track_id].push(ClassifiedBox {
                frame: frame_id,
                bbox: *bbox,
                score,
                hash: hasher.hash(&video.video, frame_id, bbox),
            });
        }
    }

    Ok(new_tracks)
}

/// Runs one of the track classifiers and tags the result with its method.
pub struct TrackClassifier<'a, L, H> {
    loader: &'a mut L,
    hasher: H,
}

impl<'a, L, H> TrackClassifier<'a, L, H>
where
    L: ImageLoader,
    H: BoxHasher,
{
    pub fn new(loader: &'a mut L, hasher: H) -> Self {
        Self { loader, hasher }
    }

    pub fn classify_per_box<C>(
        &mut self,
        video: &Video,
        tracks: &TrackSet,
        classifier: &mut C,
        class_index: usize,
    ) -> Result<ClassifiedTrackSet, Error>
    where
        C: RegionClassifier<L::Image>,
    {
        check_videos(video, tracks)?;
        info!("Target class: {}", class_name(class_index));
        let tracks = classify_per_box(
            video,
            tracks,
            self.loader,
            classifier,
            &self.hasher,
            class_index,
        )?;

        Ok(ClassifiedTrackSet {
            video: video.video.clone(),
            method: ClassifyMethod::PerBox.name().to_string(),
            tracks,
        })
    }

    pub fn classify_batched<D>(
        &mut self,
        video: &Video,
        tracks: &TrackSet,
        detector: &mut D,
        class_index: usize,
    ) -> Result<ClassifiedTrackSet, Error>
    where
        D: RegionDetector<L::Image>,
    {
        check_videos(video, tracks)?;
        info!("Target class: {}", class_name(class_index));
        let tracks = classify_batched(
            video,
            tracks,
            self.loader,
            detector,
            &self.hasher,
            class_index,
        )?;

        Ok(ClassifiedTrackSet {
            video: video.video.clone(),
            method: ClassifyMethod::Batched.name().to_string(),
            tracks,
        })
    }
}
