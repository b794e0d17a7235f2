use crate::classes::VID_TO_DET;
use crate::error::Error;
use serde_derive::{Deserialize, Serialize};
use std::path::Path;

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
#[serde(default)]
pub struct ScoringConfig {
    /// Network layer features are extracted from.
    pub feature_layer: String,
    /// Width the class-score matrix must have.
    pub num_classes: usize,
    /// Maps a class index to its 1-based detector column. Defaults to the
    /// VID to DET table, `null` selects the identity.
    pub class_map: Option<Vec<usize>>,
    pub samples_per_box: usize,
    pub jitter_ratio: f32,
    pub overlap_threshold: f32,
    pub save_feat: bool,
    pub save_all_score: bool,
    pub seed: Option<u64>,
}

impl ScoringConfig {
    pub fn new(num_classes: usize, class_map: Option<Vec<usize>>) -> Self {
        Self {
            num_classes,
            class_map,
            ..Default::default()
        }
    }

    pub fn from_json_file<P: AsRef<Path>>(path: P) -> Result<Self, Error> {
        let file = std::fs::File::open(path)?;
        let config: Self = serde_json::from_reader(std::io::BufReader::new(file))?;
        config.validate()?;

        Ok(config)
    }

    pub fn validate(&self) -> Result<(), Error> {
        if self.num_classes == 0 {
            return Err(Error::Config("num_classes must be positive".into()));
        }

        if !(self.jitter_ratio >= 0.0) {
            return Err(Error::Config(format!(
                "jitter_ratio must be non-negative, got {}",
                self.jitter_ratio
            )));
        }

        if !(0.0..=1.0).contains(&self.overlap_threshold) {
            return Err(Error::Config(format!(
                "overlap_threshold must lie in [0, 1], got {}",
                self.overlap_threshold
            )));
        }

        Ok(())
    }

    /// Zero-based score column of `class_index`.
    pub fn column(&self, class_index: usize) -> Result<usize, Error> {
        let mapped = match &self.class_map {
            Some(map) => map
                .get(class_index)
                .copied()
                .ok_or(Error::ClassIndex(class_index))?,
            None => class_index,
        };

        if mapped == 0 || mapped > self.num_classes {
            return Err(Error::ClassIndex(class_index));
        }

        Ok(mapped - 1)
    }
}

impl Default for ScoringConfig {
    fn default() -> Self {
        Self {
            feature_layer: "pool5".to_string(),
            num_classes: 200,
            class_map: Some(VID_TO_DET.to_vec()),
            samples_per_box: 32,
            jitter_ratio: 0.05,
            overlap_threshold: 0.7,
            save_feat: false,
            save_all_score: false,
            seed: None,
        }
    }
}
