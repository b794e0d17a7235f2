pub mod annotation;
pub mod bbox;
pub mod classes;
pub mod classifier;
pub mod config;
pub mod conv;
pub mod detector;
pub mod error;
pub mod frame;
pub mod fusion;
pub mod proposal;
pub mod protocol;
pub mod sampler;
pub mod scorer;
pub mod track;
pub mod tubelet;

pub use bbox::{BBox, Ltrb, Ltwh};
pub use classifier::{FnvBoxHasher, TrackClassifier};
pub use config::ScoringConfig;
pub use error::Error;
pub use frame::{Frame, Video};
pub use proposal::{Proposal, ProposalSet};
pub use protocol::{ClassifiedTrackSet, ScoreSet};
pub use sampler::BoxSampler;
pub use scorer::{ScoringMethod, TubeletScorer};
pub use track::{Track, TrackSet};
pub use tubelet::{Tubelet, TubeletBox};
