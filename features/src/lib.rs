pub mod aim;
pub mod config;
mod error;
pub mod extractor;
pub mod groups;
pub mod record;
pub mod tick_features;

pub use config::{ExtractionConfig, TickWindowConfig};
pub use error::*;
pub use extractor::{
    AlignOptions, BatchExtraction, FeatureExtractor, GroupExtractor, MatchContext, extract_game,
    extract_games, extract_games_par,
};
pub use groups::FeatureGroup;
pub use record::{Extraction, FeatureRecord, FeatureValue, FeatureValueKind};
