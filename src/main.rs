//! Dodge Run entry point
//!
//! Handles platform-specific initialization and runs the game loop. The
//! native build runs a headless demo driven by a simple autopilot.

#[cfg(target_arch = "wasm32")]
use wasm_bindgen::prelude::*;

#[cfg(target_arch = "wasm32")]
mod wasm_game {
    use std::cell::RefCell;
    use std::rc::Rc;
    use wasm_bindgen::prelude::*;
    use web_sys::{KeyboardEvent, PointerEvent};

    use dodge_run::Game;
    use dodge_run::consts::MAX_DT;
    use dodge_run::leaderboard::LeaderboardConfig;
    use dodge_run::persistence;
    use dodge_run::platform::{self, InputState, KeyCommand, key_command};
    use dodge_run::sim::{GameMode, TickInput};

    /// Browser-side state around the game host
    struct WebApp {
        game: Game,
        input: InputState,
        /// Edge-triggered commands collected between frames
        pending: TickInput,
        last_ts: Option<f64>,
    }

    impl WebApp {
        fn frame(&mut self, ts: f64) {
            // Touch impulse decays on wall-clock time
            let dt = self
                .last_ts
                .map(|last| ((ts - last) / 1000.0).clamp(0.0, MAX_DT) as f32)
                .unwrap_or(0.0);
            self.last_ts = Some(ts);
            self.input.decay(dt);

            let input = TickInput {
                axis: self.input.axis(),
                ..std::mem::take(&mut self.pending)
            };
            self.game.frame(ts, &input);
            self.update_hud();
        }

        fn on_key(&mut self, command: KeyCommand) {
            let at_start = self.game.mode() == GameMode::Start;
            match command {
                KeyCommand::Start => self.pending.start = true,
                KeyCommand::Pause => self.pending.pause = true,
                KeyCommand::Ability => self.pending.ability = true,
                KeyCommand::ResetHighScore if at_start => self.game.reset_high_score(),
                KeyCommand::ResetLeaderboard if at_start => self.game.reset_leaderboard(),
                KeyCommand::CycleSkin if at_start => {
                    let skin = self.game.cycle_skin();
                    log::info!("Skin: {}", skin.name);
                }
                _ => {}
            }
        }

        fn update_hud(&self) {
            let Some(el) = web_sys::window()
                .and_then(|w| w.document())
                .and_then(|d| d.get_element_by_id("hud"))
            else {
                return;
            };
            let hud = self.game.hud(Some(platform::seconds_until_midnight()));
            if let Ok(json) = serde_json::to_string(&hud) {
                el.set_text_content(Some(&json));
            }
        }
    }

    pub fn run() {
        platform::init_logging();
        log::info!("Dodge Run starting...");

        let game = Game::new(
            persistence::default_storage(),
            LeaderboardConfig::from_env(),
            &platform::today_key(),
            platform::now_ms() as u64,
        );
        let app = Rc::new(RefCell::new(WebApp {
            game,
            input: InputState::default(),
            pending: TickInput::default(),
            last_ts: None,
        }));

        setup_input_handlers(app.clone());
        request_animation_frame(app);
        log::info!("Dodge Run running!");
    }

    fn setup_input_handlers(app: Rc<RefCell<WebApp>>) {
        let Some(window) = web_sys::window() else { return };

        // Keyboard down
        {
            let app = app.clone();
            let closure = Closure::<dyn FnMut(_)>::new(move |event: KeyboardEvent| {
                let Some(command) = key_command(&event.key()) else { return };
                if command == KeyCommand::Pause {
                    event.prevent_default();
                }
                let mut a = app.borrow_mut();
                if !a.input.set_key(command, true) && !event.repeat() {
                    a.on_key(command);
                }
            });
            let _ = window
                .add_event_listener_with_callback("keydown", closure.as_ref().unchecked_ref());
            closure.forget();
        }

        // Keyboard up
        {
            let app = app.clone();
            let closure = Closure::<dyn FnMut(_)>::new(move |event: KeyboardEvent| {
                if let Some(command) = key_command(&event.key()) {
                    app.borrow_mut().input.set_key(command, false);
                }
            });
            let _ = window
                .add_event_listener_with_callback("keyup", closure.as_ref().unchecked_ref());
            closure.forget();
        }

        // Tap: left or right half of the viewport
        {
            let app = app.clone();
            let closure = Closure::<dyn FnMut(_)>::new(move |event: PointerEvent| {
                let width = web_sys::window()
                    .and_then(|w| w.inner_width().ok())
                    .and_then(|v| v.as_f64())
                    .unwrap_or(0.0);
                let dir = if f64::from(event.client_x()) < width * 0.5 { -1.0 } else { 1.0 };
                app.borrow_mut().input.tap(dir);
            });
            let _ = window
                .add_event_listener_with_callback("pointerdown", closure.as_ref().unchecked_ref());
            closure.forget();
        }

        // Tab hidden: pause and release held keys
        if let Some(document) = window.document() {
            let app = app.clone();
            let closure = Closure::<dyn FnMut(_)>::new(move |_event: web_sys::Event| {
                let hidden = web_sys::window()
                    .and_then(|w| w.document())
                    .map(|d| d.visibility_state() == web_sys::VisibilityState::Hidden)
                    .unwrap_or(false);
                if hidden {
                    let mut a = app.borrow_mut();
                    a.game.pause();
                    a.input.clear();
                }
            });
            let _ = document.add_event_listener_with_callback(
                "visibilitychange",
                closure.as_ref().unchecked_ref(),
            );
            closure.forget();
        }
    }

    fn request_animation_frame(app: Rc<RefCell<WebApp>>) {
        let Some(window) = web_sys::window() else { return };
        let closure = Closure::once(move |time: f64| {
            game_loop(app, time);
        });
        let _ = window.request_animation_frame(closure.as_ref().unchecked_ref());
        closure.forget();
    }

    fn game_loop(app: Rc<RefCell<WebApp>>, time: f64) {
        {
            let mut a = app.borrow_mut();
            if a.game.mode() != GameMode::Playing {
                let today = platform::today_key();
                a.game.set_today(&today);
            }
            a.frame(time);
        }

        request_animation_frame(app);
    }
}

#[cfg(target_arch = "wasm32")]
#[wasm_bindgen(start)]
pub fn wasm_main() {
    wasm_game::run();
}

#[cfg(target_arch = "wasm32")]
fn main() {
    // WASM entry point is wasm_main, this is just to satisfy the compiler
}

#[cfg(not(target_arch = "wasm32"))]
mod autopilot {
    use dodge_run::consts::PLAYER_MARGIN;
    use dodge_run::sim::{Obstacle, RunState, TickInput};

    /// How far above the player an obstacle counts as a threat
    const LOOKAHEAD: f32 = 220.0;
    /// Extra clearance when sidestepping
    const CLEARANCE: f32 = 10.0;
    /// Distance at which the dash is used to escape
    const PANIC_DISTANCE: f32 = 50.0;

    /// The obstacle closest to landing on the player, if any
    fn nearest_threat(state: &RunState) -> Option<&Obstacle> {
        let p = state.player.rect;
        state
            .obstacles
            .iter()
            .filter(|o| {
                o.rect.bottom() <= p.bottom()
                    && o.rect.bottom() > p.y - LOOKAHEAD
                    && o.rect.right() > p.x - CLEARANCE
                    && o.rect.x < p.right() + CLEARANCE
            })
            .max_by(|a, b| a.rect.bottom().total_cmp(&b.rect.bottom()))
    }

    /// Steer away from the nearest threat, otherwise drift toward coins or center
    pub fn steer(state: &RunState) -> TickInput {
        let p = state.player.rect;
        let center_x = p.center().x;

        let Some(threat) = nearest_threat(state) else {
            let target = state
                .collectibles
                .iter()
                .filter(|c| c.rect.y < p.y)
                .max_by(|a, b| a.rect.y.total_cmp(&b.rect.y))
                .map(|c| c.rect.center().x)
                .unwrap_or(dodge_run::consts::WORLD_WIDTH * 0.5);
            return TickInput {
                axis: ((target - center_x) / 40.0).clamp(-1.0, 1.0),
                ..Default::default()
            };
        };

        let room_left = p.x - PLAYER_MARGIN;
        let room_right = state.player.max_x() - p.x;
        let need_left = p.right() - threat.rect.x + CLEARANCE;
        let need_right = threat.rect.right() - p.x + CLEARANCE;

        let go_left = match (need_left <= room_left, need_right <= room_right) {
            (true, true) => need_left < need_right,
            (true, false) => true,
            (false, true) => false,
            (false, false) => room_left > room_right,
        };

        TickInput {
            axis: if go_left { -1.0 } else { 1.0 },
            ability: p.y - threat.rect.bottom() < PANIC_DISTANCE && state.ability_ready(),
            ..Default::default()
        }
    }

}

#[cfg(not(target_arch = "wasm32"))]
fn main() {
    use dodge_run::Game;
    use dodge_run::leaderboard::LeaderboardConfig;
    use dodge_run::persistence;
    use dodge_run::platform;
    use dodge_run::sim::{GameMode, TickInput};

    const FRAME_MS: f64 = 1000.0 / 60.0;

    platform::init_logging();

    let mut args = std::env::args().skip(1);
    let seed: u64 = args.next().and_then(|s| s.parse().ok()).unwrap_or(0x5eed);
    let max_seconds: f64 = args.next().and_then(|s| s.parse().ok()).unwrap_or(180.0);
    log::info!("Dodge Run (native) headless demo, seed {} (max {} s)", seed, max_seconds);

    let mut game = Game::new(
        persistence::default_storage(),
        LeaderboardConfig::from_env(),
        &platform::today_key(),
        seed,
    );

    let mut ts = 0.0;
    game.frame(
        ts,
        &TickInput {
            start: true,
            ..Default::default()
        },
    );
    while game.mode() == GameMode::Playing && game.state().survive_time < max_seconds {
        ts += FRAME_MS;
        let input = autopilot::steer(game.state());
        game.frame(ts, &input);
    }

    let hud = game.hud(Some(platform::seconds_until_midnight()));
    log::info!(
        "Demo finished: score {}, level {}, {} dodges, {} coins",
        hud.score,
        hud.level,
        game.state().dodges,
        hud.coins
    );

    if game.submit_score("Autopilot").is_some() {
        game.wait_for_leaderboard();
        for (rank, row) in game.leaderboard_rows().iter().enumerate() {
            log::info!("#{} {} - {}", rank + 1, row.name, row.score);
        }
    }

    match serde_json::to_string_pretty(&hud) {
        Ok(json) => println!("{}", json),
        Err(e) => log::error!("Failed to encode HUD: {}", e),
    }
}
