//! Persisted per-video result sets and their JSON I/O.

use crate::bbox::{BBox, Ltrb};
use crate::error::Error;
use crate::tubelet::Tubelet;

use serde::de::DeserializeOwned;
use serde_derive::{Deserialize, Serialize};
use std::io::{BufReader, BufWriter, Write};
use std::path::Path;

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct ScoreSet {
    pub video: String,
    pub method: String,
    pub tubelets: Vec<Tubelet>,
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct ClassifiedBox {
    pub frame: u32,
    pub bbox: BBox<Ltrb>,
    pub score: f32,
    pub hash: String,
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct ClassifiedTrackSet {
    pub video: String,
    pub method: String,
    pub tracks: Vec<Vec<ClassifiedBox>>,
}

pub fn load_json<T: DeserializeOwned, P: AsRef<Path>>(path: P) -> Result<T, Error> {
    let file = std::fs::File::open(path)?;
    Ok(serde_json::from_reader(BufReader::new(file))?)
}

pub fn save_json<T: serde::Serialize, P: AsRef<Path>>(value: &T, path: P) -> Result<(), Error> {
    let file = std::fs::File::create(path)?;
    let mut writer = BufWriter::new(file);
    serde_json::to_writer(&mut writer, value)?;
    writer.flush()?;

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::track::{Track, TrackBox};

    #[test]
    fn score_set_survives_a_file() {
        let track = Track {
            id: 2,
            boxes: vec![TrackBox {
                frame: 1,
                bbox: BBox::ltrb(0., 0., 4., 4.),
                anchor: 0,
                score: None,
            }],
        };
        let mut tubelet = Tubelet::from_track(&track, 3);
        tubelet.boxes[0].det_score = -0.25;
        tubelet.boxes[0].all_score = Some(vec![0.5, 1.5]);
        let set = ScoreSet {
            video: "vid".into(),
            method: "rcnn_scoring".into(),
            tubelets: vec![tubelet],
        };

        let path = std::env::temp_dir().join(format!("tubescore-{}.json", std::process::id()));
        save_json(&set, &path).unwrap();
        let back: ScoreSet = load_json(&path).unwrap();
        std::fs::remove_file(&path).unwrap();

        assert_eq!(back, set);
    }

    #[test]
    fn missing_file_is_io_error() {
        let res: Result<ScoreSet, _> = load_json("/nonexistent/tubescore/score.json");
        assert!(matches!(res, Err(Error::Io(_))));
    }
}
