//! Scrolly Arcade entry point
//!
//! Handles platform-specific initialization and runs the game loop.

#[cfg(target_arch = "wasm32")]
use wasm_bindgen::prelude::*;

#[cfg(target_arch = "wasm32")]
mod wasm_game {
    use std::cell::RefCell;
    use std::rc::Rc;
    use wasm_bindgen::prelude::*;
    use web_sys::{
        Document, Element, Event, FileReader, HtmlElement, HtmlInputElement, MouseEvent, TouchEvent, WheelEvent,
    };

    use scrolly_arcade::audio::WebAudio;
    use scrolly_arcade::consts::MAX_Y;
    use scrolly_arcade::events::{GameEvent, PuzzleEvent};
    use scrolly_arcade::persistence::{LocalStorage, MemoryStorage, Storage};
    use scrolly_arcade::puzzle::PuzzleGame;
    use scrolly_arcade::scroller::{GamePhase, ScrollerGame};

    /// Interval between particle decay and timer passes
    const PARTICLE_INTERVAL_MS: i32 = 30;
    /// Touch deltas are halved before they reach the core
    const TOUCH_DELTA_SCALE: f32 = 0.5;
    /// Mouse drags are amplified
    const DRAG_DELTA_SCALE: f32 = 2.0;

    type Port = Box<dyn Storage>;

    fn now_ms() -> f64 {
        js_sys::Date::now()
    }

    fn random_seed() -> u64 {
        (js_sys::Math::random() * u32::MAX as f64) as u64
    }

    /// localStorage when the browser allows it, in-memory otherwise
    fn open_storage() -> Port {
        match LocalStorage::open() {
            Ok(storage) => Box::new(storage),
            Err(e) => {
                log::warn!("localStorage unavailable ({e}), progress will not be saved");
                Box::new(MemoryStorage::new())
            }
        }
    }

    fn set_text(document: &Document, id: &str, text: &str) {
        if let Some(el) = document.get_element_by_id(id) {
            el.set_text_content(Some(text));
        }
    }

    fn set_hidden(document: &Document, id: &str, hidden: bool) {
        if let Some(el) = document.get_element_by_id(id) {
            let _ = el.set_attribute("class", if hidden { "hidden" } else { "" });
        }
    }

    /// Scroller instance plus input bookkeeping
    struct Scroller {
        game: ScrollerGame<Port, WebAudio>,
        document: Document,
        /// Last touch position, for swipe deltas
        touch_y: Option<f32>,
        dragging: bool,
    }

    impl Scroller {
        fn input(&mut self, delta: f32, is_touch: bool) {
            if self.game.state.phase == GamePhase::Start {
                set_hidden(&self.document, "start-overlay", true);
            }
            self.game.handle_scroll(delta, is_touch, now_ms());
        }

        fn frame(&mut self) {
            self.game.frame(now_ms());
            for event in self.game.drain_events() {
                self.present(&event);
            }
            self.update_hud();
        }

        fn present(&self, event: &GameEvent) {
            match event {
                GameEvent::Death {
                    final_score,
                    new_record,
                    message,
                    ..
                } => {
                    set_text(&self.document, "death-message", message);
                    set_text(&self.document, "final-score", &format!("{final_score:.1}s"));
                    set_hidden(&self.document, "new-record", !new_record);
                    set_hidden(&self.document, "death-overlay", false);
                }
                GameEvent::AchievementUnlocked(achievement) => {
                    log::info!("Achievement unlocked: {}", achievement.name());
                    set_text(&self.document, "toast", achievement.name());
                }
                GameEvent::Combo { multiplier, .. } => {
                    set_text(&self.document, "combo", &format!("x{multiplier:.1}"));
                }
                _ => {}
            }
        }

        fn update_hud(&self) {
            let state = &self.game.state;
            set_text(&self.document, "score", &format!("{:.1}", state.final_score()));
            set_text(&self.document, "coins", &state.combo.coin_score.to_string());
            set_text(
                &self.document,
                "high-score",
                &format!("{:.1}", self.game.profile.high_score),
            );
            if let Some(player) = self
                .document
                .get_element_by_id("player")
                .and_then(|el| el.dyn_into::<HtmlElement>().ok())
            {
                let y = state.player.y.min(MAX_Y);
                let _ = player.style().set_property("top", &format!("{y}%"));
                let _ = player.set_attribute(
                    "class",
                    if state.is_immune() { "player immune" } else { "player" },
                );
            }
        }

        fn restart(&mut self) {
            if self.game.reset() {
                set_hidden(&self.document, "death-overlay", true);
                set_hidden(&self.document, "start-overlay", false);
            }
        }
    }

    pub fn run() {
        console_error_panic_hook::set_once();
        console_log::init_with_level(log::Level::Info).ok();

        let Some(document) = web_sys::window().and_then(|w| w.document()) else {
            log::error!("No document, nothing to run");
            return;
        };

        if let Some(grid) = document.get_element_by_id("puzzle") {
            run_puzzle(document, grid);
        } else {
            run_scroller(document);
        }
    }

    fn run_scroller(document: Document) {
        let game = ScrollerGame::new(open_storage(), WebAudio::new(), random_seed(), now_ms());
        log::info!(
            "Scroller ready ({}, best {:.1}s)",
            game.settings.difficulty.as_str(),
            game.profile.high_score
        );
        let scroller = Rc::new(RefCell::new(Scroller {
            game,
            document: document.clone(),
            touch_y: None,
            dragging: false,
        }));

        setup_scroll_handlers(&document, scroller.clone());
        setup_scroller_buttons(&document, scroller.clone());
        setup_particle_interval(scroller.clone());

        request_animation_frame(scroller);
        log::info!("Scroll or Die running!");
    }

    fn setup_scroll_handlers(document: &Document, scroller: Rc<RefCell<Scroller>>) {
        // Wheel
        {
            let scroller = scroller.clone();
            let closure = Closure::<dyn FnMut(_)>::new(move |event: WheelEvent| {
                event.prevent_default();
                scroller.borrow_mut().input(event.delta_y() as f32, false);
            });
            let _ = document.add_event_listener_with_callback("wheel", closure.as_ref().unchecked_ref());
            closure.forget();
        }

        // Touch start
        {
            let scroller = scroller.clone();
            let closure = Closure::<dyn FnMut(_)>::new(move |event: TouchEvent| {
                if let Some(touch) = event.touches().get(0) {
                    scroller.borrow_mut().touch_y = Some(touch.client_y() as f32);
                }
            });
            let _ = document
                .add_event_listener_with_callback("touchstart", closure.as_ref().unchecked_ref());
            closure.forget();
        }

        // Touch move (swipe up pushes the player up)
        {
            let scroller = scroller.clone();
            let closure = Closure::<dyn FnMut(_)>::new(move |event: TouchEvent| {
                event.prevent_default();
                let Some(touch) = event.touches().get(0) else {
                    return;
                };
                let y = touch.client_y() as f32;
                let mut s = scroller.borrow_mut();
                if let Some(last) = s.touch_y.replace(y) {
                    s.input((last - y) * TOUCH_DELTA_SCALE, true);
                }
            });
            let _ = document
                .add_event_listener_with_callback("touchmove", closure.as_ref().unchecked_ref());
            closure.forget();
        }

        // Touch end
        {
            let scroller = scroller.clone();
            let closure = Closure::<dyn FnMut(_)>::new(move |_event: TouchEvent| {
                scroller.borrow_mut().touch_y = None;
            });
            let _ = document.add_event_listener_with_callback("touchend", closure.as_ref().unchecked_ref());
            closure.forget();
        }

        // Mouse drag
        {
            let scroller = scroller.clone();
            let closure = Closure::<dyn FnMut(_)>::new(move |_event: MouseEvent| {
                let mut s = scroller.borrow_mut();
                s.dragging = true;
                s.game.audio_mut().resume();
            });
            let _ = document.add_event_listener_with_callback("mousedown", closure.as_ref().unchecked_ref());
            closure.forget();
        }
        {
            let scroller = scroller.clone();
            let closure = Closure::<dyn FnMut(_)>::new(move |event: MouseEvent| {
                let mut s = scroller.borrow_mut();
                if s.dragging {
                    s.input(-(event.movement_y() as f32) * DRAG_DELTA_SCALE, false);
                }
            });
            let _ = document.add_event_listener_with_callback("mousemove", closure.as_ref().unchecked_ref());
            closure.forget();
        }
        {
            let closure = Closure::<dyn FnMut(_)>::new(move |_event: MouseEvent| {
                scroller.borrow_mut().dragging = false;
            });
            let _ = document.add_event_listener_with_callback("mouseup", closure.as_ref().unchecked_ref());
            closure.forget();
        }
    }

    fn setup_scroller_buttons(document: &Document, scroller: Rc<RefCell<Scroller>>) {
        if let Some(btn) = document.get_element_by_id("restart-btn") {
            let scroller = scroller.clone();
            let closure = Closure::<dyn FnMut(_)>::new(move |_event: MouseEvent| {
                scroller.borrow_mut().restart();
            });
            let _ = btn.add_event_listener_with_callback("click", closure.as_ref().unchecked_ref());
            closure.forget();
        }

        if let Some(btn) = document.get_element_by_id("sound-btn") {
            let closure = Closure::<dyn FnMut(_)>::new(move |event: MouseEvent| {
                let enabled = scroller.borrow_mut().game.toggle_sound();
                if let Some(target) = event.target().and_then(|t| t.dyn_into::<Element>().ok()) {
                    target.set_text_content(Some(if enabled { "Sound on" } else { "Sound off" }));
                }
            });
            let _ = btn.add_event_listener_with_callback("click", closure.as_ref().unchecked_ref());
            closure.forget();
        }
    }

    fn setup_particle_interval(scroller: Rc<RefCell<Scroller>>) {
        let Some(window) = web_sys::window() else {
            return;
        };
        let closure = Closure::<dyn FnMut()>::new(move || {
            let mut s = scroller.borrow_mut();
            s.game.decay_particles();
            s.game.refresh_timers(now_ms());
        });
        let _ = window.set_interval_with_callback_and_timeout_and_arguments_0(
            closure.as_ref().unchecked_ref(),
            PARTICLE_INTERVAL_MS,
        );
        closure.forget();
    }

    fn request_animation_frame(scroller: Rc<RefCell<Scroller>>) {
        let Some(window) = web_sys::window() else {
            return;
        };
        let closure = Closure::once(move |_time: f64| {
            game_loop(scroller);
        });
        let _ = window.request_animation_frame(closure.as_ref().unchecked_ref());
        closure.forget();
    }

    fn game_loop(scroller: Rc<RefCell<Scroller>>) {
        scroller.borrow_mut().frame();
        request_animation_frame(scroller);
    }

    /// Puzzle instance and its grid of tile buttons
    struct Puzzle {
        game: PuzzleGame<Port, WebAudio>,
        document: Document,
        grid: Element,
    }

    impl Puzzle {
        /// Rebuild the grid for the current board
        fn render(&self) {
            let board = self.game.session.board();
            self.grid.set_inner_html("");
            let style = match self.game.images.urls.first() {
                Some(url) => format!("--size: {}; --image: url(\"{url}\")", board.size()),
                None => format!("--size: {}", board.size()),
            };
            let _ = self.grid.set_attribute("style", &style);
            for (index, &tile) in board.tiles().iter().enumerate() {
                let Ok(cell) = self.document.create_element("button") else {
                    continue;
                };
                let _ = cell.set_attribute("data-index", &index.to_string());
                if tile == 0 {
                    let _ = cell.set_attribute("class", "tile blank");
                } else {
                    let _ = cell.set_attribute("class", "tile");
                    cell.set_text_content(Some(&tile.to_string()));
                }
                let _ = self.grid.append_child(&cell);
            }
            set_text(&self.document, "moves", &self.game.session.moves().to_string());
        }

        fn present(&mut self) {
            let mut dirty = false;
            for event in self.game.drain_events() {
                match event {
                    PuzzleEvent::Won { moves, elapsed_secs } => {
                        set_text(
                            &self.document,
                            "win-message",
                            &format!("Solved in {moves} moves, {elapsed_secs:.0}s"),
                        );
                        set_hidden(&self.document, "win-overlay", false);
                        set_text(&self.document, "today", &format!("{} solved today", self.game.today.solves));
                        dirty = true;
                    }
                    PuzzleEvent::ReplayComplete | PuzzleEvent::ReplayCancelled => {
                        set_hidden(&self.document, "win-overlay", false);
                        dirty = true;
                    }
                    PuzzleEvent::TileMoved { .. } | PuzzleEvent::ReplayStep { .. } => dirty = true,
                }
            }
            if dirty {
                self.render();
            }
        }
    }

    fn run_puzzle(document: Document, grid: Element) {
        let game = match PuzzleGame::new(open_storage(), WebAudio::new(), random_seed(), now_ms()) {
            Ok(game) => game,
            Err(e) => {
                log::error!("Could not deal puzzle: {e}");
                return;
            }
        };
        let puzzle = Rc::new(RefCell::new(Puzzle {
            game,
            document: document.clone(),
            grid: grid.clone(),
        }));
        puzzle.borrow().render();

        // Tile clicks (delegated to the grid)
        {
            let puzzle = puzzle.clone();
            let closure = Closure::<dyn FnMut(_)>::new(move |event: MouseEvent| {
                let index = event
                    .target()
                    .and_then(|t| t.dyn_into::<Element>().ok())
                    .and_then(|el| el.get_attribute("data-index"))
                    .and_then(|raw| raw.parse::<usize>().ok());
                if let Some(index) = index {
                    let mut p = puzzle.borrow_mut();
                    p.game.click(index, now_ms());
                    p.present();
                }
            });
            let _ = grid.add_event_listener_with_callback("click", closure.as_ref().unchecked_ref());
            closure.forget();
        }

        if let Some(btn) = document.get_element_by_id("replay-btn") {
            let puzzle = puzzle.clone();
            let closure = Closure::<dyn FnMut(_)>::new(move |_event: MouseEvent| {
                let mut p = puzzle.borrow_mut();
                match p.game.start_replay(now_ms()) {
                    Ok(_) => {
                        set_hidden(&p.document, "win-overlay", true);
                        p.render();
                    }
                    Err(e) => log::warn!("Replay unavailable: {e}"),
                }
            });
            let _ = btn.add_event_listener_with_callback("click", closure.as_ref().unchecked_ref());
            closure.forget();
        }

        if let Some(btn) = document.get_element_by_id("new-game-btn") {
            let puzzle = puzzle.clone();
            let closure = Closure::<dyn FnMut(_)>::new(move |_event: MouseEvent| {
                let mut p = puzzle.borrow_mut();
                if let Err(e) = p.game.new_session(now_ms()) {
                    log::error!("Could not deal puzzle: {e}");
                }
                // Flush a cancelled replay before the overlay goes away
                p.present();
                set_hidden(&p.document, "win-overlay", true);
                p.render();
            });
            let _ = btn.add_event_listener_with_callback("click", closure.as_ref().unchecked_ref());
            closure.forget();
        }

        setup_image_upload(&document, puzzle.clone());

        request_puzzle_frame(puzzle);
        log::info!("Sliding puzzle running!");
    }

    /// Image picker and remove button for custom tile artwork
    fn setup_image_upload(document: &Document, puzzle: Rc<RefCell<Puzzle>>) {
        if let Some(input) = document
            .get_element_by_id("image-upload")
            .and_then(|el| el.dyn_into::<HtmlInputElement>().ok())
        {
            let puzzle = puzzle.clone();
            let picker = input.clone();
            let closure = Closure::<dyn FnMut(_)>::new(move |_event: Event| {
                let Some(file) = picker.files().and_then(|files| files.get(0)) else {
                    return;
                };
                let Ok(reader) = FileReader::new() else {
                    return;
                };
                let puzzle = puzzle.clone();
                let source = reader.clone();
                let onload = Closure::once(move |_event: Event| {
                    let Some(url) = source.result().ok().and_then(|v| v.as_string()) else {
                        log::warn!("Uploaded image could not be read");
                        return;
                    };
                    let mut p = puzzle.borrow_mut();
                    p.game.add_image(&url);
                    p.render();
                });
                reader.set_onload(Some(onload.as_ref().unchecked_ref()));
                onload.forget();
                if let Err(e) = reader.read_as_data_url(&file) {
                    log::warn!("Could not read uploaded image: {e:?}");
                }
            });
            let _ = input.add_event_listener_with_callback("change", closure.as_ref().unchecked_ref());
            closure.forget();
        }

        if let Some(btn) = document.get_element_by_id("remove-image-btn") {
            let closure = Closure::<dyn FnMut(_)>::new(move |_event: MouseEvent| {
                let mut p = puzzle.borrow_mut();
                if p.game.remove_image(0).is_some() {
                    p.render();
                }
            });
            let _ = btn.add_event_listener_with_callback("click", closure.as_ref().unchecked_ref());
            closure.forget();
        }
    }

    fn request_puzzle_frame(puzzle: Rc<RefCell<Puzzle>>) {
        let Some(window) = web_sys::window() else {
            return;
        };
        let closure = Closure::once(move |_time: f64| {
            {
                let mut p = puzzle.borrow_mut();
                p.game.frame(now_ms());
                p.present();
            }
            request_puzzle_frame(puzzle);
        });
        let _ = window.request_animation_frame(closure.as_ref().unchecked_ref());
        closure.forget();
    }
}

#[cfg(target_arch = "wasm32")]
#[wasm_bindgen(start)]
pub fn wasm_main() {
    wasm_game::run();
}

#[cfg(not(target_arch = "wasm32"))]
fn main() {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();
    log::info!("Scrolly Arcade (native) starting...");
    log::info!("The browser build is the playable one; running headless demos");

    demo::scroller_run();
    demo::puzzle_solve_and_replay();
}

#[cfg(target_arch = "wasm32")]
fn main() {
    // WASM entry point is wasm_main, this is just to satisfy the compiler
}

/// Headless runs driving both cores the way a browser host would
#[cfg(not(target_arch = "wasm32"))]
mod demo {
    use rand::{Rng, SeedableRng};
    use rand_pcg::Pcg32;

    use scrolly_arcade::audio::NullAudio;
    use scrolly_arcade::consts::{PLAYER_X, REFERENCE_FRAME_MS};
    use scrolly_arcade::events::{GameEvent, PuzzleEvent};
    use scrolly_arcade::persistence::MemoryStorage;
    use scrolly_arcade::puzzle::{Board, PuzzleGame, ReplayPhase, replay_all};
    use scrolly_arcade::scroller::{GamePhase, ScrollerGame};

    /// Give up on the autopilot after this long (ms)
    const MAX_RUN_MS: f64 = 120_000.0;

    /// Play one scroller run with a naive autopilot that aims for the next gap
    pub fn scroller_run() {
        let mut game = ScrollerGame::new(MemoryStorage::new(), NullAudio, 42, 0.0);
        let mut now = 0.0;
        game.handle_scroll(1.0, false, now);

        let mut frames = 0u64;
        while game.state.phase == GamePhase::Playing && now < MAX_RUN_MS {
            now += REFERENCE_FRAME_MS;
            frames += 1;

            let target = game
                .state
                .obstacles
                .iter()
                .filter(|o| o.x > PLAYER_X - 3.0)
                .min_by(|a, b| a.x.total_cmp(&b.x))
                .map_or(50.0, |o| o.shape.gap_center());
            if frames % 6 == 0 && game.state.player.y > target + 3.0 {
                game.handle_scroll(25.0, false, now);
            }

            game.frame(now);
            if frames % 2 == 0 {
                game.decay_particles();
            }
        }

        let mut coins = 0;
        for event in game.drain_events() {
            match event {
                GameEvent::CoinCollected { .. } => coins += 1,
                GameEvent::Death {
                    final_score, message, ..
                } => log::info!("Died after {final_score:.1}s: {message}"),
                GameEvent::AchievementUnlocked(achievement) => {
                    log::info!("Achievement: {}", achievement.name())
                }
                _ => {}
            }
        }
        log::info!(
            "Scroller: {} frames, {coins} coin pickups, {} near misses, best {:.1}s",
            frames,
            game.state.near_misses,
            game.profile.high_score
        );
    }

    /// Scramble a board with random slides, solve it by undoing them, then replay
    pub fn puzzle_solve_and_replay() {
        let mut rng = Pcg32::seed_from_u64(7);
        let mut board = match Board::solved(3) {
            Ok(board) => board,
            Err(e) => {
                log::error!("{e}");
                return;
            }
        };

        // Each slide moves the blank; undoing it means clicking where the blank was
        let mut blank_trail = Vec::new();
        while blank_trail.len() < 20 || board.is_solved() {
            let blank = board.blank_index();
            let neighbours: Vec<usize> = (0..board.tiles().len())
                .filter(|&i| board.is_adjacent(i, blank))
                .collect();
            let pick = neighbours[rng.random_range(0..neighbours.len())];
            if board.try_move(pick).is_some() {
                blank_trail.push(blank);
            }
        }

        let mut game = match PuzzleGame::new(MemoryStorage::new(), NullAudio, 7, 0.0) {
            Ok(game) => game,
            Err(e) => {
                log::error!("{e}");
                return;
            }
        };
        match scrolly_arcade::puzzle::PuzzleSession::from_board(board, 7, 0.0) {
            Ok(session) => game.session = session,
            Err(e) => {
                log::error!("{e}");
                return;
            }
        }

        let mut now = 0.0;
        for index in blank_trail.into_iter().rev() {
            now += 400.0;
            game.click(index, now);
        }
        log::info!(
            "Puzzle solved: {} moves in {:.1}s, first to last move {:.0}ms ({} solve(s) today)",
            game.session.moves(),
            game.session.elapsed_secs(now),
            game.session.log().span_ms(),
            game.today.solves
        );

        match replay_all(game.session.initial(), game.session.log().records()) {
            Ok(end) if end.is_solved() => log::info!("Move log reproduces the solved board"),
            Ok(_) => log::warn!("Move log ends on an unsolved board"),
            Err(e) => log::warn!("Move log does not replay: {e}"),
        }

        if let Err(e) = game.start_replay(now) {
            log::error!("Replay failed to start: {e}");
            return;
        }
        let mut steps = 0;
        while game.session.replay_phase().is_running() {
            now += REFERENCE_FRAME_MS;
            game.frame(now);
            steps += game
                .drain_events()
                .iter()
                .filter(|e| matches!(e, PuzzleEvent::ReplayStep { .. }))
                .count();
        }
        log::info!(
            "Replay {} after {steps} steps, board solved: {}",
            if game.session.replay_phase() == ReplayPhase::Done { "finished" } else { "stopped" },
            game.session.board().is_solved()
        );
    }
}
