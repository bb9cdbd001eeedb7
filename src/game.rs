//! Game host
//!
//! Owns the run state together with everything the simulation must not
//! touch directly: the frame clock, the RNG, storage, settings, leaderboards
//! and audio. The platform layer feeds it one animation-frame timestamp and
//! one [`TickInput`] per frame.

use rand::SeedableRng;
use rand_pcg::Pcg32;

use crate::audio::{AudioManager, SoundEffect};
use crate::challenge::DailyChallenge;
use crate::highscores::{HighScores, LeaderboardRow};
use crate::leaderboard::{LeaderboardConfig, LeaderboardService};
use crate::persistence::{self, Storage, keys};
use crate::settings::{Settings, Skin};
use crate::sim::{
    FrameClock, GameEvent, GameMode, HudSnapshot, RenderView, RunState, TickInput, build_hud, tick,
};

/// The game host
pub struct Game {
    state: RunState,
    clock: FrameClock,
    rng: Pcg32,
    storage: Box<dyn Storage>,
    settings: Settings,
    local_board: HighScores,
    leaderboard: LeaderboardService,
    audio: AudioManager,
    /// Date key used when the challenge is (re)built
    today: String,
    /// Last high score written to storage
    saved_high_score: u64,
}

impl Game {
    /// Load persisted progress and prepare the title screen
    pub fn new(
        storage: Box<dyn Storage>,
        config: LeaderboardConfig,
        today: &str,
        seed: u64,
    ) -> Self {
        let mut rng = Pcg32::seed_from_u64(seed);
        let high_score = persistence::load_high_score(storage.as_ref());
        let settings = Settings::load(storage.as_ref());
        let local_board = HighScores::load(storage.as_ref());
        let done_date = persistence::load_challenge_done_date(storage.as_ref());
        let challenge = DailyChallenge::for_date(today, done_date.as_deref());

        let mut state = RunState::new(challenge, high_score, &mut rng);
        state.reduced_motion = settings.reduced_motion;

        let mut audio = AudioManager::new();
        audio.set_muted(settings.mute);

        let mut leaderboard = LeaderboardService::new(config);
        leaderboard.show_local(&local_board);
        leaderboard.refresh();

        log::info!(
            "Game ready: high score {}, challenge '{}' for {}",
            high_score,
            state.challenge.kind.id(),
            today
        );

        Self {
            state,
            clock: FrameClock::new(),
            rng,
            storage,
            settings,
            local_board,
            leaderboard,
            audio,
            today: today.to_string(),
            saved_high_score: high_score,
        }
    }

    /// Run one animation frame. Returns the cues raised during the frame.
    pub fn frame(&mut self, ts_ms: f64, input: &TickInput) -> Vec<GameEvent> {
        let mode = self.state.mode;
        let starting = input.start && matches!(mode, GameMode::Start | GameMode::GameOver);
        let resuming = input.pause && mode == GameMode::Paused;

        if starting {
            self.refresh_challenge();
        }
        // The first frame after a (re)start or resume has zero elapsed time
        if starting || resuming {
            self.clock.reset();
        }
        let dt = self.clock.step(ts_ms);

        tick(&mut self.state, input, dt, &mut self.rng);

        let events = std::mem::take(&mut self.state.events);
        for event in &events {
            self.handle_event(event);
        }

        if self.state.high_score > self.saved_high_score {
            self.persist_high_score();
        }

        if self.leaderboard.drain(&mut self.local_board) {
            self.local_board.save(self.storage.as_mut());
        }

        events
    }

    fn handle_event(&mut self, event: &GameEvent) {
        if let Some(effect) = SoundEffect::for_event(event) {
            self.audio.play(effect);
        }

        match event {
            GameEvent::RunStarted => self.audio.resume(),
            GameEvent::ChallengeComplete { date_key } => {
                persistence::save_challenge_done_date(self.storage.as_mut(), date_key);
            }
            GameEvent::GameOver { score, .. } => {
                log::debug!("Game over at {} (saved high {})", score, self.saved_high_score);
            }
            _ => {}
        }
    }

    fn persist_high_score(&mut self) {
        persistence::save_high_score(self.storage.as_mut(), self.state.high_score);
        self.saved_high_score = self.state.high_score;
    }

    /// Rebuild the challenge when the calendar day has changed
    fn refresh_challenge(&mut self) {
        if self.state.challenge.date_key == self.today {
            return;
        }
        let done_date = persistence::load_challenge_done_date(self.storage.as_ref());
        self.state.challenge = DailyChallenge::for_date(&self.today, done_date.as_deref());
        log::info!(
            "New daily challenge for {}: {}",
            self.today,
            self.state.challenge.kind.text()
        );
    }

    /// Update the calendar date; takes effect at the next run start
    pub fn set_today(&mut self, date_key: &str) {
        if self.today != date_key {
            self.today = date_key.to_string();
            if !matches!(self.state.mode, GameMode::Playing | GameMode::Paused) {
                self.refresh_challenge();
            }
        }
    }

    // === Read access ===

    pub fn state(&self) -> &RunState {
        &self.state
    }

    pub fn mode(&self) -> GameMode {
        self.state.mode
    }

    pub fn hud(&self, seconds_until_midnight: Option<u64>) -> HudSnapshot {
        build_hud(&self.state, seconds_until_midnight)
    }

    pub fn render_view(&self) -> RenderView<'_> {
        RenderView::new(&self.state)
    }

    pub fn settings(&self) -> &Settings {
        &self.settings
    }

    pub fn leaderboard_rows(&self) -> &[LeaderboardRow] {
        self.leaderboard.rows()
    }

    pub fn local_leaderboard(&self) -> &HighScores {
        &self.local_board
    }

    // === Commands ===

    /// Return to the title screen, discarding the current run
    pub fn back_to_home(&mut self) {
        self.state.reset(&mut self.rng);
        self.refresh_challenge();
        log::info!("Back to home");
    }

    /// Pause from outside the input stream (focus loss, tab hidden). The
    /// `Paused` cue is returned by the next `frame`.
    pub fn pause(&mut self) {
        if self.state.mode == GameMode::Playing {
            self.state.mode = GameMode::Paused;
            self.state.events.push(GameEvent::Paused);
            log::debug!("Paused (focus lost)");
        }
    }

    pub fn set_reduced_motion(&mut self, on: bool) {
        self.settings.reduced_motion = on;
        self.state.reduced_motion = on;
        self.settings.save(self.storage.as_mut());
    }

    pub fn set_high_contrast(&mut self, on: bool) {
        self.settings.high_contrast = on;
        self.settings.save(self.storage.as_mut());
    }

    pub fn set_muted(&mut self, muted: bool) {
        self.settings.mute = muted;
        self.audio.set_muted(muted);
        self.settings.save(self.storage.as_mut());
    }

    pub fn cycle_skin(&mut self) -> &'static Skin {
        let skin = self.settings.cycle_skin();
        self.settings.save_skin(self.storage.as_mut());
        skin
    }

    /// Forget the best score
    pub fn reset_high_score(&mut self) {
        self.state.high_score = 0;
        self.state.best_before_run = 0;
        self.saved_high_score = 0;
        persistence::clear(self.storage.as_mut(), keys::HIGH_SCORE);
        log::info!("High score reset");
    }

    /// Clear the local leaderboard
    pub fn reset_leaderboard(&mut self) {
        self.local_board.reset_stored(self.storage.as_mut());
        self.leaderboard.show_local(&self.local_board);
    }

    /// Submit the last run's score under `name`
    pub fn submit_score(&mut self, name: &str) -> Option<LeaderboardRow> {
        let score = self.state.summary.as_ref()?.score;
        let row = self.leaderboard.submit(name, score, &self.today);
        Some(row)
    }

    /// Re-fetch the remote leaderboard
    pub fn refresh_leaderboard(&mut self) {
        self.leaderboard.refresh();
    }

    /// Block until pending leaderboard requests finish (native tools, tests)
    #[cfg(not(target_arch = "wasm32"))]
    pub fn wait_for_leaderboard(&mut self) {
        self.leaderboard.wait_idle(&mut self.local_board);
        self.local_board.save(self.storage.as_mut());
    }
}
