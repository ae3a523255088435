//! Puzzle session
//!
//! `PuzzleSession` is the pure game: board, move log, timer, win and replay.
//! `PuzzleGame` wraps it with the storage and audio ports.

use rand::SeedableRng;
use rand_pcg::Pcg32;

use super::board::{Board, BoardError, Slide};
use super::recorder::MoveLog;
use super::replay::{ReplayEngine, ReplayError, ReplayPhase, ReplayToken};
use super::stats::{DailyStats, UploadedImages};
use crate::audio::{self, AudioSink, SoundEffect};
use crate::events::PuzzleEvent;
use crate::persistence::Storage;
use crate::settings::Settings;

#[derive(Debug, Clone)]
pub struct PuzzleSession {
    rng: Pcg32,
    board: Board,
    /// Board as dealt, before any move
    initial: Board,
    log: MoveLog,
    moves: u32,
    started_at_ms: f64,
    /// Frozen on win
    finished_secs: Option<f64>,
    replay: ReplayEngine,
    events: Vec<PuzzleEvent>,
}

impl PuzzleSession {
    /// Deal a fresh shuffled board
    pub fn new(size: usize, seed: u64, now_ms: f64) -> Result<Self, BoardError> {
        let mut rng = Pcg32::seed_from_u64(seed);
        let board = Board::shuffled(size, &mut rng)?;
        log::info!("Puzzle session started: {size}x{size}");
        Ok(Self {
            rng,
            initial: board.clone(),
            board,
            log: MoveLog::new(),
            moves: 0,
            started_at_ms: now_ms,
            finished_secs: None,
            replay: ReplayEngine::default(),
            events: Vec::new(),
        })
    }

    /// Start from a given board (solvable and not yet solved)
    pub fn from_board(board: Board, seed: u64, now_ms: f64) -> Result<Self, BoardError> {
        if !board.is_solvable() {
            return Err(BoardError::Unsolvable);
        }
        if board.is_solved() {
            return Err(BoardError::AlreadySolved);
        }
        Ok(Self {
            rng: Pcg32::seed_from_u64(seed),
            initial: board.clone(),
            board,
            log: MoveLog::new(),
            moves: 0,
            started_at_ms: now_ms,
            finished_secs: None,
            replay: ReplayEngine::default(),
            events: Vec::new(),
        })
    }

    /// Throw away the current game (and any replay) and deal again
    pub fn new_session(&mut self, size: usize, now_ms: f64) -> Result<(), BoardError> {
        let board = Board::shuffled(size, &mut self.rng)?;
        let cancelled = self.replay.cancel(&mut self.board);
        self.initial = board.clone();
        self.board = board;
        self.log.clear();
        self.moves = 0;
        self.started_at_ms = now_ms;
        self.finished_secs = None;
        self.events.clear();
        self.events.extend(cancelled);
        log::info!("Puzzle session started: {size}x{size}");
        Ok(())
    }

    pub fn board(&self) -> &Board {
        &self.board
    }

    pub fn initial(&self) -> &Board {
        &self.initial
    }

    pub fn log(&self) -> &MoveLog {
        &self.log
    }

    pub fn moves(&self) -> u32 {
        self.moves
    }

    pub fn is_won(&self) -> bool {
        self.finished_secs.is_some()
    }

    /// Seconds on the clock (frozen once won)
    pub fn elapsed_secs(&self, now_ms: f64) -> f64 {
        self.finished_secs
            .unwrap_or_else(|| ((now_ms - self.started_at_ms) / 1000.0).max(0.0))
    }

    pub fn replay_phase(&self) -> ReplayPhase {
        self.replay.phase()
    }

    /// Click a cell; legal only next to the blank and before the win
    pub fn click(&mut self, index: usize, now_ms: f64) -> Option<Slide> {
        if self.is_won() || self.replay.phase().is_running() {
            return None;
        }
        let slide = self.board.try_move(index)?;
        self.moves += 1;
        self.log.record(slide, now_ms);
        self.events.push(PuzzleEvent::TileMoved {
            tile: slide.tile,
            from: slide.from,
            to: slide.to,
        });

        if self.board.is_solved() {
            let elapsed_secs = self.elapsed_secs(now_ms);
            self.finished_secs = Some(elapsed_secs);
            self.events.push(PuzzleEvent::Won {
                moves: self.moves,
                elapsed_secs,
            });
            log::info!("Puzzle solved in {} moves, {elapsed_secs:.1}s", self.moves);
        }
        Some(slide)
    }

    /// Replay the finished game from the dealt board
    pub fn start_replay(&mut self, now_ms: f64) -> Result<ReplayToken, ReplayError> {
        if !self.is_won() {
            return Err(ReplayError::NotFinished);
        }
        self.replay
            .start(&self.initial, self.log.records(), &mut self.board, now_ms)
    }

    /// Poll the replay
    pub fn advance_replay(&mut self, now_ms: f64) {
        let events = self.replay.advance(&mut self.board, now_ms);
        self.events.extend(events);
    }

    /// Host-scheduled replay wake-up
    pub fn wake_replay(&mut self, token: ReplayToken, now_ms: f64) {
        let events = self.replay.wake(token, &mut self.board, now_ms);
        self.events.extend(events);
    }

    pub fn next_replay_wake_ms(&self) -> Option<f64> {
        self.replay.next_wake_ms()
    }

    /// Exit the replay; the board is left solved
    pub fn cancel_replay(&mut self) {
        if let Some(event) = self.replay.cancel(&mut self.board) {
            self.events.push(event);
        }
    }

    pub fn drain_events(&mut self) -> Vec<PuzzleEvent> {
        std::mem::take(&mut self.events)
    }
}

/// Puzzle session plus storage and sound
pub struct PuzzleGame<S: Storage, A: AudioSink> {
    pub session: PuzzleSession,
    pub settings: Settings,
    pub today: DailyStats,
    /// Player images to cut into tiles, newest first
    pub images: UploadedImages,
    storage: S,
    audio: A,
    outbox: Vec<PuzzleEvent>,
}

impl<S: Storage, A: AudioSink> PuzzleGame<S, A> {
    pub fn new(storage: S, audio: A, seed: u64, now_ms: f64) -> Result<Self, BoardError> {
        let settings = Settings::load(&storage);
        let today = DailyStats::load(&storage, now_ms);
        let images = UploadedImages::load(&storage);
        let session = PuzzleSession::new(settings.puzzle_size, seed, now_ms)?;
        Ok(Self {
            session,
            settings,
            today,
            images,
            storage,
            audio,
            outbox: Vec::new(),
        })
    }

    pub fn click(&mut self, index: usize, now_ms: f64) -> Option<Slide> {
        let slide = self.session.click(index, now_ms);
        self.process_events(now_ms);
        slide
    }

    pub fn new_session(&mut self, now_ms: f64) -> Result<(), BoardError> {
        self.session.new_session(self.settings.puzzle_size, now_ms)?;
        self.process_events(now_ms);
        Ok(())
    }

    /// Change the board size and deal a new game
    pub fn set_size(&mut self, size: usize, now_ms: f64) -> Result<(), BoardError> {
        self.session.new_session(size, now_ms)?;
        self.settings.puzzle_size = size;
        self.settings.save(&mut self.storage);
        self.process_events(now_ms);
        Ok(())
    }

    /// Keep an uploaded image (a data URL)
    pub fn add_image(&mut self, data_url: &str) {
        self.images.add(&mut self.storage, data_url);
    }

    pub fn remove_image(&mut self, index: usize) -> Option<String> {
        self.images.remove(&mut self.storage, index)
    }

    pub fn start_replay(&mut self, now_ms: f64) -> Result<ReplayToken, ReplayError> {
        self.session.start_replay(now_ms)
    }

    pub fn frame(&mut self, now_ms: f64) {
        self.session.advance_replay(now_ms);
        self.process_events(now_ms);
    }

    pub fn cancel_replay(&mut self, now_ms: f64) {
        self.session.cancel_replay();
        self.process_events(now_ms);
    }

    pub fn toggle_sound(&mut self) -> bool {
        self.settings.toggle_sound(&mut self.storage)
    }

    pub fn drain_events(&mut self) -> Vec<PuzzleEvent> {
        std::mem::take(&mut self.outbox)
    }

    pub fn storage(&self) -> &S {
        &self.storage
    }

    fn process_events(&mut self, now_ms: f64) {
        for event in self.session.drain_events() {
            if let Some(effect) = SoundEffect::for_puzzle_event(&event) {
                audio::play_if_enabled(&mut self.audio, self.settings.sound_enabled, effect);
            }
            if let PuzzleEvent::Won { moves, elapsed_secs } = event {
                self.today = DailyStats::record_solve(&mut self.storage, now_ms, moves, elapsed_secs);
            }
            self.outbox.push(event);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::audio::RecordingAudio;
    use crate::persistence::MemoryStorage;

    /// Session with a hand-dealt board one move from solved
    fn nearly_solved() -> PuzzleSession {
        let board = Board::from_tiles(3, vec![1, 2, 3, 4, 5, 6, 7, 0, 8]).unwrap();
        PuzzleSession::from_board(board, 1, 0.0).unwrap()
    }

    #[test]
    fn test_from_board_rejects_unsolvable() {
        let board = Board::from_tiles(3, vec![2, 1, 3, 4, 5, 6, 7, 8, 0]).unwrap();
        assert_eq!(
            PuzzleSession::from_board(board, 1, 0.0).err(),
            Some(BoardError::Unsolvable)
        );
    }

    #[test]
    fn test_from_board_rejects_solved() {
        let board = Board::solved(4).unwrap();
        assert_eq!(
            PuzzleSession::from_board(board, 1, 0.0).err(),
            Some(BoardError::AlreadySolved)
        );
    }

    #[test]
    fn test_new_session_reports_cancelled_replay() {
        let mut session = nearly_solved();
        session.click(8, 500.0).unwrap();
        session.start_replay(1_000.0).unwrap();
        session.advance_replay(1_350.0);
        session.drain_events();

        session.new_session(3, 2_000.0).unwrap();
        assert_eq!(session.drain_events(), vec![PuzzleEvent::ReplayCancelled]);
        assert_eq!(session.replay_phase(), ReplayPhase::Idle);
        assert_eq!(session.moves(), 0);
        assert!(!session.board().is_solved());

        // No replay running, nothing to report
        session.new_session(3, 3_000.0).unwrap();
        assert!(session.drain_events().is_empty());
    }

    #[test]
    fn test_fresh_session() {
        let session = PuzzleSession::new(4, 7, 0.0).unwrap();
        assert_eq!(session.board().size(), 4);
        assert!(session.board().is_solvable());
        assert!(!session.board().is_solved());
        assert_eq!(session.board(), session.initial());
        assert_eq!(session.moves(), 0);
        assert!(PuzzleSession::new(1, 7, 0.0).is_err());
    }

    #[test]
    fn test_winning_click() {
        let mut session = nearly_solved();
        let slide = session.click(8, 4_500.0).unwrap();
        assert_eq!(slide.tile, 8);
        assert_eq!(session.board().tiles(), &[1, 2, 3, 4, 5, 6, 7, 8, 0]);
        assert_eq!(session.moves(), 1);
        assert!(session.is_won());
        assert_eq!(session.log().len(), 1);
        assert_eq!(
            session.drain_events(),
            vec![
                PuzzleEvent::TileMoved { tile: 8, from: 8, to: 7 },
                PuzzleEvent::Won {
                    moves: 1,
                    elapsed_secs: 4.5
                },
            ]
        );
        // Timer is frozen
        assert_eq!(session.elapsed_secs(60_000.0), 4.5);
    }

    #[test]
    fn test_illegal_and_post_win_clicks_ignored() {
        let mut session = nearly_solved();
        assert!(session.click(0, 100.0).is_none());
        assert_eq!(session.moves(), 0);
        assert!(session.log().is_empty());

        session.click(8, 200.0);
        let after_win = session.board().clone();
        assert!(session.click(5, 300.0).is_none());
        assert_eq!(session.board(), &after_win);
        assert_eq!(session.moves(), 1);
    }

    #[test]
    fn test_replay_requires_win() {
        let mut session = nearly_solved();
        assert_eq!(session.start_replay(0.0), Err(ReplayError::NotFinished));

        session.click(8, 100.0);
        session.drain_events();
        session.start_replay(1_000.0).unwrap();
        assert_eq!(session.board(), session.initial());
        assert_eq!(session.replay_phase(), ReplayPhase::ReplayingFirstPass);

        // Clicks are ignored mid-replay
        assert!(session.click(8, 1_100.0).is_none());

        session.cancel_replay();
        assert!(session.board().is_solved());
        assert_eq!(session.drain_events(), vec![PuzzleEvent::ReplayCancelled]);
    }

    #[test]
    fn test_new_session_clears_everything() {
        let mut session = nearly_solved();
        session.click(8, 100.0);
        session.start_replay(200.0).unwrap();
        let stale = session.replay.token();

        session.new_session(3, 5_000.0).unwrap();
        assert!(!session.is_won());
        assert_eq!(session.moves(), 0);
        assert!(session.log().is_empty());
        assert!(!session.board().is_solved());
        assert_eq!(session.replay_phase(), ReplayPhase::Idle);
        assert!(session.drain_events().is_empty());

        // A wake-up from the old replay cannot touch the new board
        let board = session.board().clone();
        session.wake_replay(stale, 10_000.0);
        assert_eq!(session.board(), &board);
    }

    #[test]
    fn test_game_records_daily_stats() {
        let mut game = PuzzleGame::new(MemoryStorage::new(), RecordingAudio::default(), 3, 0.0).unwrap();
        assert_eq!(game.session.board().size(), 3);

        game.session = nearly_solved();
        game.click(8, 2_000.0);
        assert_eq!(game.today.solves, 1);
        assert_eq!(game.today.best_moves, Some(1));
        assert_eq!(DailyStats::load(game.storage(), 2_000.0), game.today);
        assert_eq!(game.audio.played, vec![SoundEffect::TileSlide, SoundEffect::Win]);
    }

    #[test]
    fn test_set_size_persists() {
        let mut game = PuzzleGame::new(MemoryStorage::new(), RecordingAudio::default(), 3, 0.0).unwrap();
        game.set_size(4, 10.0).unwrap();
        assert_eq!(game.session.board().size(), 4);
        assert_eq!(Settings::load(game.storage()).puzzle_size, 4);
        assert!(game.set_size(12, 20.0).is_err());
        assert_eq!(game.settings.puzzle_size, 4);
    }

    #[test]
    fn test_uploaded_images_persist() {
        let mut game = PuzzleGame::new(MemoryStorage::new(), RecordingAudio::default(), 3, 0.0).unwrap();
        game.add_image("data:image/png;base64,AAA");
        game.add_image("data:image/png;base64,BBB");
        assert_eq!(UploadedImages::load(game.storage()), game.images);
        assert_eq!(game.images.urls[0], "data:image/png;base64,BBB");

        assert_eq!(game.remove_image(1).as_deref(), Some("data:image/png;base64,AAA"));
        assert_eq!(game.remove_image(5), None);
        assert_eq!(UploadedImages::load(game.storage()).urls, vec!["data:image/png;base64,BBB".to_string()]);
    }
}
