use duel_replays::analyzer::{AlignedKill, KillFilter, PerformanceLedger, align_game};
use duel_replays::{GameRecord, Side};
use rayon::prelude::*;
use serde::{Deserialize, Serialize};
use tracing::{Level, debug, span, trace, warn};

use crate::error::{Error, Result};
use crate::groups::FeatureGroup;
use crate::record::{Extraction, FeatureRecord};

/// Everything about a game that extraction may consult besides the kill
/// window itself.
#[derive(Debug, Clone)]
pub struct MatchContext<'a> {
    pub game: &'a GameRecord,
    pub ledger: PerformanceLedger,
}

impl<'a> MatchContext<'a> {
    pub fn new(game: &'a GameRecord) -> Self {
        Self {
            game,
            ledger: PerformanceLedger::from_game(game),
        }
    }
}

pub trait FeatureExtractor {
    /// Features of one aligned kill, and the side of the duel's winner.
    fn extract_from_kill_window(
        &self,
        ctx: &MatchContext<'_>,
        aligned: &AlignedKill<'_>,
    ) -> Result<(FeatureRecord, Side)>;
}

impl<F> FeatureExtractor for F
where
    F: Fn(&MatchContext<'_>, &AlignedKill<'_>) -> Result<(FeatureRecord, Side)>,
{
    fn extract_from_kill_window(
        &self,
        ctx: &MatchContext<'_>,
        aligned: &AlignedKill<'_>,
    ) -> Result<(FeatureRecord, Side)> {
        self(ctx, aligned)
    }
}

/// Merges the output of a list of feature groups.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GroupExtractor {
    groups: Vec<FeatureGroup>,
    last_frame_only: bool,
}

impl Default for GroupExtractor {
    fn default() -> Self {
        Self::new(FeatureGroup::ALL.to_vec())
    }
}

impl GroupExtractor {
    pub fn new(groups: Vec<FeatureGroup>) -> Self {
        Self {
            groups,
            last_frame_only: false,
        }
    }

    /// Keep only the last frame of every per-frame feature.
    pub fn last_frame_only(mut self, last_frame_only: bool) -> Self {
        self.last_frame_only = last_frame_only;
        self
    }

    pub fn groups(&self) -> &[FeatureGroup] {
        &self.groups
    }
}

impl FeatureExtractor for GroupExtractor {
    fn extract_from_kill_window(
        &self,
        ctx: &MatchContext<'_>,
        aligned: &AlignedKill<'_>,
    ) -> Result<(FeatureRecord, Side)> {
        let duel = aligned.kill.duel()?;

        let mut record = FeatureRecord::new();
        for group in &self.groups {
            record.merge(group.extract(ctx, aligned, &duel)?)?;
        }
        if self.last_frame_only {
            record = record.collapse_to_last();
        }

        Ok((record, duel.winner))
    }
}

/// How kills are paired with frame windows.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct AlignOptions {
    pub window_size: usize,
    pub filter: KillFilter,
}

impl Default for AlignOptions {
    fn default() -> Self {
        Self {
            window_size: 5,
            filter: KillFilter::Clean,
        }
    }
}

/// Runs `extractor` over every aligned kill of one game.
///
/// An error in any kill aborts the game. A game without aligned kills
/// yields an empty [`Extraction`].
pub fn extract_game<E: FeatureExtractor + ?Sized>(
    extractor: &E,
    game: &GameRecord,
    options: AlignOptions,
) -> Result<Extraction> {
    let span = span!(
        Level::DEBUG,
        "extract_game",
        map = game.map_name(),
        rounds = game.rounds().len()
    );
    let _enter = span.enter();

    let ctx = MatchContext::new(game);
    let mut out = Extraction::default();
    for aligned in align_game(game, options.window_size, options.filter) {
        trace!(
            round = aligned.kill.round_index,
            tick = %aligned.kill.tick,
            frames = aligned.window.len(),
            "extracting kill window"
        );
        let (features, label) = extractor.extract_from_kill_window(&ctx, &aligned)?;
        out.push(features, label);
    }

    debug!(samples = out.len(), "game extracted");
    Ok(out)
}

/// Features of many games, plus the games that could not be processed.
#[derive(Debug, Default)]
pub struct BatchExtraction {
    pub extraction: Extraction,
    /// Index into the input and the error that aborted that game
    pub failures: Vec<(usize, Error)>,
}

impl BatchExtraction {
    fn collect(results: impl IntoIterator<Item = (usize, Result<Extraction>)>) -> Self {
        let mut batch = BatchExtraction::default();
        for (index, result) in results {
            match result {
                Ok(extraction) => batch.extraction.append(extraction),
                Err(e) => {
                    warn!(game = index, "skipping game: {e}");
                    batch.failures.push((index, e));
                }
            }
        }
        batch
    }
}

/// Extracts games one after another. Samples keep the input order.
pub fn extract_games<E: FeatureExtractor + ?Sized>(
    extractor: &E,
    games: &[GameRecord],
    options: AlignOptions,
) -> BatchExtraction {
    let results = games
        .iter()
        .enumerate()
        .map(|(index, game)| (index, extract_game(extractor, game, options)));
    BatchExtraction::collect(results)
}

/// Same as [`extract_games`], one rayon task per game.
pub fn extract_games_par<E: FeatureExtractor + Sync + ?Sized>(
    extractor: &E,
    games: &[GameRecord],
    options: AlignOptions,
) -> BatchExtraction {
    let results: Vec<_> = games
        .par_iter()
        .enumerate()
        .map(|(index, game)| (index, extract_game(extractor, game, options)))
        .collect();
    BatchExtraction::collect(results)
}
