//! Score submission and leaderboards
//!
//! The remote leaderboard is an outside collaborator; the crate only sees it
//! through [`ScoreSink`] and [`LeaderboardQuery`]. [`LocalLeaderboard`] is the
//! in-browser implementation (top 10 per game, persisted to LocalStorage).

use std::cell::RefCell;
use std::collections::HashMap;
use std::future::Future;
use std::pin::Pin;
use std::rc::Rc;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::games::GameId;
use crate::platform;
use crate::sim::Phase;

/// Maximum number of scores kept per game
pub const MAX_HIGH_SCORES: usize = 10;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ScoreError {
    #[error("player name is empty")]
    EmptyPlayerName,
    #[error("score already submitted for this session")]
    AlreadySubmitted,
    #[error("no finished run to submit")]
    NoFinishedRun,
    #[error("score rejected: {0}")]
    Rejected(String),
    #[error("leaderboard unavailable: {0}")]
    Unavailable(String),
}

/// Single-threaded boxed future returned by the collaborators
pub type ScoreFuture<'a, T> = Pin<Box<dyn Future<Output = Result<T, ScoreError>> + 'a>>;

/// Where finished runs are sent
pub trait ScoreSink {
    fn submit<'a>(
        &'a self,
        game: GameId,
        player_name: &'a str,
        company_name: &'a str,
        score: u64,
    ) -> ScoreFuture<'a, ()>;
}

/// Read side of the leaderboard
pub trait LeaderboardQuery {
    /// Best `limit` entries for `game`, highest first
    fn top(&self, game: GameId, limit: usize) -> ScoreFuture<'_, Vec<ScoreEntry>>;
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScoreEntry {
    pub player_name: String,
    pub company_name: String,
    pub score: u64,
    /// Unix timestamp (ms) when achieved
    pub timestamp: f64,
}

/// Trim and uppercase both names; the player name must not end up empty
pub fn normalize_names(player_name: &str, company_name: &str) -> Result<(String, String), ScoreError> {
    let player = player_name.trim().to_uppercase();
    if player.is_empty() {
        return Err(ScoreError::EmptyPlayerName);
    }
    Ok((player, company_name.trim().to_uppercase()))
}

/// One game's sorted top list
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ScoreBoard {
    pub entries: Vec<ScoreEntry>,
}

impl ScoreBoard {
    pub fn new() -> Self {
        Self::default()
    }

    /// Check if a score qualifies for the board
    pub fn qualifies(&self, score: u64) -> bool {
        if score == 0 {
            return false;
        }
        if self.entries.len() < MAX_HIGH_SCORES {
            return true;
        }
        self.entries.last().map(|e| score > e.score).unwrap_or(true)
    }

    /// Get the rank a score would achieve (1-indexed, None if doesn't qualify)
    pub fn potential_rank(&self, score: u64) -> Option<usize> {
        if !self.qualifies(score) {
            return None;
        }
        let rank = self.entries.iter().position(|e| score > e.score);
        Some(rank.unwrap_or(self.entries.len()) + 1)
    }

    /// Insert keeping descending order; equal scores stay behind earlier ones.
    /// Returns the rank achieved or None if the score didn't qualify
    pub fn add(&mut self, entry: ScoreEntry) -> Option<usize> {
        if !self.qualifies(entry.score) {
            return None;
        }
        let rank = match self.entries.iter().position(|e| entry.score > e.score) {
            Some(i) => {
                self.entries.insert(i, entry);
                i + 1
            }
            None => {
                self.entries.push(entry);
                self.entries.len()
            }
        };
        self.entries.truncate(MAX_HIGH_SCORES);
        Some(rank)
    }

    pub fn top_score(&self) -> Option<u64> {
        self.entries.first().map(|e| e.score)
    }
}

/// LocalStorage-backed leaderboard; clones share the same boards
#[derive(Debug, Clone, Default)]
pub struct LocalLeaderboard {
    boards: Rc<RefCell<HashMap<GameId, ScoreBoard>>>,
}

impl LocalLeaderboard {
    const STORAGE_KEY: &'static str = "agro_arcade_scores";

    pub fn new() -> Self {
        Self::default()
    }

    pub fn load() -> Self {
        let boards = platform::storage_get(Self::STORAGE_KEY)
            .and_then(|json| match serde_json::from_str::<HashMap<GameId, ScoreBoard>>(&json) {
                Ok(boards) => Some(boards),
                Err(e) => {
                    log::warn!("Ignoring unreadable leaderboard: {e}");
                    None
                }
            })
            .unwrap_or_default();
        log::info!("Loaded leaderboards for {} games", boards.len());
        Self {
            boards: Rc::new(RefCell::new(boards)),
        }
    }

    fn save(&self) {
        match serde_json::to_string(&*self.boards.borrow()) {
            Ok(json) => {
                platform::storage_set(Self::STORAGE_KEY, &json);
            }
            Err(e) => log::warn!("Could not serialize leaderboard: {e}"),
        }
    }

    /// Best score for the HUD, 0 when the board is empty
    pub fn best(&self, game: GameId) -> u64 {
        self.boards
            .borrow()
            .get(&game)
            .and_then(|b| b.top_score())
            .unwrap_or(0)
    }

    pub fn potential_rank(&self, game: GameId, score: u64) -> Option<usize> {
        self.boards
            .borrow()
            .get(&game)
            .map_or(Some(1).filter(|_| score > 0), |b| b.potential_rank(score))
    }

    /// Synchronous insert used by the async sink; returns the rank achieved
    pub fn record(&self, game: GameId, entry: ScoreEntry) -> Option<usize> {
        let rank = self.boards.borrow_mut().entry(game).or_default().add(entry);
        if let Some(rank) = rank {
            log::info!("{}: new leaderboard entry at rank {rank}", game.as_str());
            self.save();
        }
        rank
    }

    pub fn entries(&self, game: GameId) -> Vec<ScoreEntry> {
        self.boards
            .borrow()
            .get(&game)
            .map(|b| b.entries.clone())
            .unwrap_or_default()
    }
}

impl ScoreSink for LocalLeaderboard {
    fn submit<'a>(
        &'a self,
        game: GameId,
        player_name: &'a str,
        company_name: &'a str,
        score: u64,
    ) -> ScoreFuture<'a, ()> {
        Box::pin(async move {
            let (player_name, company_name) = normalize_names(player_name, company_name)?;
            let entry = ScoreEntry {
                player_name,
                company_name,
                score,
                timestamp: platform::unix_time_ms(),
            };
            // Scores off the board are accepted, just not listed
            self.record(game, entry);
            Ok(())
        })
    }
}

impl LeaderboardQuery for LocalLeaderboard {
    fn top(&self, game: GameId, limit: usize) -> ScoreFuture<'_, Vec<ScoreEntry>> {
        let mut entries = self.entries(game);
        entries.truncate(limit);
        Box::pin(async move { Ok(entries) })
    }
}

/// Where a session's one submission stands
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum SubmitStatus {
    #[default]
    Idle,
    Pending,
    Saved,
    Failed(String),
}

/// Allows exactly one submission per finished session.
///
/// Clones share the status cell so the UI can watch it while the submission
/// runs detached.
#[derive(Debug, Clone, Default)]
pub struct ScoreSubmitter {
    status: Rc<RefCell<SubmitStatus>>,
}

impl ScoreSubmitter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn status(&self) -> SubmitStatus {
        self.status.borrow().clone()
    }

    /// Send the score once. Failures are reported, never retried.
    pub async fn submit(
        &self,
        sink: &dyn ScoreSink,
        game: GameId,
        player_name: &str,
        company_name: &str,
        score: u64,
    ) -> Result<(), ScoreError> {
        if *self.status.borrow() != SubmitStatus::Idle {
            return Err(ScoreError::AlreadySubmitted);
        }
        // Checked locally so a typo does not burn the one submission
        normalize_names(player_name, company_name)?;

        *self.status.borrow_mut() = SubmitStatus::Pending;
        let result = sink.submit(game, player_name, company_name, score).await;
        *self.status.borrow_mut() = match &result {
            Ok(()) => SubmitStatus::Saved,
            Err(e) => {
                log::warn!("{}: score submission failed: {e}", game.as_str());
                SubmitStatus::Failed(e.to_string())
            }
        };
        result
    }
}

/// A finished run waiting for the player to confirm it.
///
/// Watching the session arms it with the final score at game over; leaving
/// game over (a restart) disarms it with a fresh submitter. Nothing is sent
/// until [`PendingScore::confirm`].
#[derive(Debug, Clone)]
pub struct PendingScore {
    game: GameId,
    score: Option<u64>,
    submitter: ScoreSubmitter,
}

impl PendingScore {
    pub fn new(game: GameId) -> Self {
        Self {
            game,
            score: None,
            submitter: ScoreSubmitter::new(),
        }
    }

    /// Follow the session's phase once per frame
    pub fn observe(&mut self, phase: Phase, score: u64) {
        match (phase, self.score) {
            (Phase::GameOver, None) => {
                log::info!("{}: run over at {score}, awaiting confirmation", self.game.as_str());
                self.score = Some(score);
            }
            (Phase::GameOver, Some(_)) => {}
            (_, Some(_)) => *self = Self::new(self.game),
            (_, None) => {}
        }
    }

    /// Final score of the run, if it is over
    pub fn score(&self) -> Option<u64> {
        self.score
    }

    pub fn status(&self) -> SubmitStatus {
        self.submitter.status()
    }

    /// Submit after the player confirmed; at most once per run
    pub async fn confirm(&self, sink: &dyn ScoreSink, player_name: &str, company_name: &str) -> Result<(), ScoreError> {
        let score = self.score.ok_or(ScoreError::NoFinishedRun)?;
        self.submitter
            .submit(sink, self.game, player_name, company_name, score)
            .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Sink that always fails
    struct Offline;

    impl ScoreSink for Offline {
        fn submit<'a>(&'a self, _: GameId, _: &'a str, _: &'a str, _: u64) -> ScoreFuture<'a, ()> {
            Box::pin(async { Err(ScoreError::Unavailable("offline".into())) })
        }
    }

    fn entry(name: &str, score: u64) -> ScoreEntry {
        ScoreEntry {
            player_name: name.into(),
            company_name: String::new(),
            score,
            timestamp: 0.0,
        }
    }

    #[test]
    fn test_board_keeps_top_ten_descending() {
        let mut board = ScoreBoard::new();
        for s in 1..=12 {
            board.add(entry("P", s * 10));
        }
        assert_eq!(board.entries.len(), MAX_HIGH_SCORES);
        assert_eq!(board.top_score(), Some(120));
        assert_eq!(board.entries.last().map(|e| e.score), Some(30));
        assert!(!board.qualifies(30));
        assert_eq!(board.potential_rank(31), Some(10));
    }

    #[test]
    fn test_ties_keep_earlier_first() {
        let mut board = ScoreBoard::new();
        board.add(entry("FIRST", 50));
        assert_eq!(board.add(entry("SECOND", 50)), Some(2));
        assert_eq!(board.entries[0].player_name, "FIRST");
    }

    #[test]
    fn test_zero_never_qualifies() {
        assert_eq!(ScoreBoard::new().add(entry("P", 0)), None);
    }

    #[test]
    fn test_normalize_names() {
        assert_eq!(
            normalize_names("  ana ", " coop verde "),
            Ok(("ANA".to_string(), "COOP VERDE".to_string()))
        );
        assert_eq!(normalize_names("   ", "X"), Err(ScoreError::EmptyPlayerName));
    }

    #[tokio::test]
    async fn test_local_submit_and_query() {
        let board = LocalLeaderboard::new();
        board.submit(GameId::DroneRush, " maria", "agro", 40).await.unwrap();
        board.submit(GameId::DroneRush, "joão", "agro", 70).await.unwrap();
        board.submit(GameId::WeedControl, "zé", "", 10).await.unwrap();

        let top = board.top(GameId::DroneRush, 1).await.unwrap();
        assert_eq!(top.len(), 1);
        assert_eq!(top[0].player_name, "JOÃO");
        assert_eq!(top[0].company_name, "AGRO");
        assert_eq!(board.best(GameId::DroneRush), 70);
        assert_eq!(board.best(GameId::TorqueMaster), 0);
    }

    #[tokio::test]
    async fn test_submitter_allows_one_submission() {
        let board = LocalLeaderboard::new();
        let submitter = ScoreSubmitter::new();
        submitter
            .submit(&board, GameId::AgroPanic, "ana", "coop", 25)
            .await
            .unwrap();
        assert_eq!(submitter.status(), SubmitStatus::Saved);

        let again = submitter.submit(&board, GameId::AgroPanic, "ana", "coop", 25).await;
        assert_eq!(again, Err(ScoreError::AlreadySubmitted));
        assert_eq!(board.entries(GameId::AgroPanic).len(), 1);
    }

    #[tokio::test]
    async fn test_empty_name_does_not_consume_the_submission() {
        let board = LocalLeaderboard::new();
        let submitter = ScoreSubmitter::new();
        let err = submitter.submit(&board, GameId::NdviHunter, " ", "", 5).await;
        assert_eq!(err, Err(ScoreError::EmptyPlayerName));
        assert_eq!(submitter.status(), SubmitStatus::Idle);
        assert!(submitter.submit(&board, GameId::NdviHunter, "bia", "", 5).await.is_ok());
    }

    /// Run a session of `game` to game over, reporting every frame to `pending`
    fn finish<G: crate::sim::Game>(game: G, pending: &mut PendingScore, lose: impl Fn(&mut crate::sim::Session<G>)) {
        let (mut s, _) = crate::games::testing::playing(game, 9);
        s.world_mut().credit(30);
        lose(&mut s);
        for _ in 0..3 {
            s.step();
            pending.observe(s.world().phase(), s.world().score);
        }
        assert_eq!(s.world().phase(), Phase::GameOver);
    }

    fn break_fleet(s: &mut crate::sim::Session<crate::games::FleetMonitor>) {
        for t in s.world_mut().entities.iter_mut().take(4) {
            t.set_condition(crate::sim::Condition::Broken);
        }
    }

    #[tokio::test]
    async fn test_game_over_alone_submits_nothing() {
        let board = LocalLeaderboard::new();
        let mut pending = PendingScore::new(GameId::FleetMonitor);
        assert_eq!(pending.confirm(&board, "ana", "").await, Err(ScoreError::NoFinishedRun));

        finish(crate::games::FleetMonitor::default(), &mut pending, break_fleet);
        assert_eq!(pending.score(), Some(30));
        assert_eq!(pending.status(), SubmitStatus::Idle);
        assert!(board.entries(GameId::FleetMonitor).is_empty());

        pending.confirm(&board, "ana", "coop").await.unwrap();
        assert_eq!(board.best(GameId::FleetMonitor), 30);
        assert_eq!(
            pending.confirm(&board, "ana", "coop").await,
            Err(ScoreError::AlreadySubmitted)
        );
        assert_eq!(board.entries(GameId::FleetMonitor).len(), 1);
    }

    #[tokio::test]
    async fn test_restart_rearms_the_confirmation() {
        let board = LocalLeaderboard::new();
        let mut pending = PendingScore::new(GameId::FleetMonitor);
        pending.observe(Phase::GameOver, 12);
        pending.confirm(&board, "ana", "").await.unwrap();

        pending.observe(Phase::Playing, 0);
        assert_eq!(pending.score(), None);
        assert_eq!(pending.status(), SubmitStatus::Idle);

        pending.observe(Phase::GameOver, 40);
        pending.confirm(&board, "bia", "").await.unwrap();
        assert_eq!(board.entries(GameId::FleetMonitor).len(), 2);
    }

    #[tokio::test]
    async fn test_failure_is_surfaced_not_retried() {
        let submitter = ScoreSubmitter::new();
        let shared = submitter.clone();
        let err = submitter.submit(&Offline, GameId::MemoryMap, "ana", "", 100).await;
        assert!(matches!(err, Err(ScoreError::Unavailable(_))));
        assert_eq!(shared.status(), SubmitStatus::Failed("leaderboard unavailable: offline".into()));
        assert_eq!(
            submitter.submit(&Offline, GameId::MemoryMap, "ana", "", 100).await,
            Err(ScoreError::AlreadySubmitted)
        );
    }
}
