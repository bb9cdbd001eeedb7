//! Platform abstraction layer
//!
//! Handles browser/native differences for:
//! - Logging backend
//! - Wall-clock time and the calendar date key
//! - Input state (held keys plus a decaying touch impulse)

use crate::sim::player::sanitize_axis;

/// Touch impulse decay rate (1/s)
const TOUCH_DECAY: f32 = 12.0;
/// Touch impulse magnitude below which it snaps to zero
const TOUCH_EPSILON: f32 = 0.01;

/// Install the logging backend for this platform. Safe to call twice.
pub fn init_logging() {
    #[cfg(target_arch = "wasm32")]
    {
        console_error_panic_hook::set_once();
        let _ = console_log::init_with_level(log::Level::Info);
    }
    #[cfg(not(target_arch = "wasm32"))]
    {
        let _ = env_logger::Builder::from_env(
            env_logger::Env::default().default_filter_or("info"),
        )
        .try_init();
    }
}

/// Milliseconds since the Unix epoch
#[cfg(target_arch = "wasm32")]
pub fn now_ms() -> f64 {
    js_sys::Date::now()
}

#[cfg(not(target_arch = "wasm32"))]
pub fn now_ms() -> f64 {
    use std::time::{SystemTime, UNIX_EPOCH};
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_secs_f64() * 1000.0)
        .unwrap_or(0.0)
}

/// Today's date key (`YYYY-MM-DD`) in the browser's local time
#[cfg(target_arch = "wasm32")]
pub fn today_key() -> String {
    let date = js_sys::Date::new_0();
    format!(
        "{:04}-{:02}-{:02}",
        date.get_full_year(),
        date.get_month() + 1,
        date.get_date()
    )
}

/// Today's date key (`YYYY-MM-DD`) in local time
#[cfg(not(target_arch = "wasm32"))]
pub fn today_key() -> String {
    date_key_at(&chrono::Local::now())
}

/// Seconds until the next local midnight
#[cfg(target_arch = "wasm32")]
pub fn seconds_until_midnight() -> u64 {
    let now = js_sys::Date::new_0();
    let next = js_sys::Date::new_0();
    next.set_hours(24);
    next.set_minutes(0);
    next.set_seconds(0);
    next.set_milliseconds(0);
    ((next.get_time() - now.get_time()).max(0.0) / 1000.0) as u64
}

/// Seconds until the next local midnight
#[cfg(not(target_arch = "wasm32"))]
pub fn seconds_until_midnight() -> u64 {
    seconds_until_midnight_at(&chrono::Local::now())
}

/// Calendar date key of `now` in its own time zone
#[cfg(not(target_arch = "wasm32"))]
pub fn date_key_at<Tz: chrono::TimeZone>(now: &chrono::DateTime<Tz>) -> String {
    now.date_naive().format("%Y-%m-%d").to_string()
}

/// Seconds from `now` to the start of the next day in `now`'s time zone.
/// A midnight skipped by a DST shift resolves to the first valid instant.
#[cfg(not(target_arch = "wasm32"))]
pub fn seconds_until_midnight_at<Tz: chrono::TimeZone>(now: &chrono::DateTime<Tz>) -> u64 {
    let Some(midnight) = now
        .date_naive()
        .succ_opt()
        .and_then(|day| day.and_hms_opt(0, 0, 0))
    else {
        return 0;
    };
    let tz = now.timezone();
    let next = tz
        .from_local_datetime(&midnight)
        .earliest()
        .or_else(|| {
            let later = midnight + chrono::Duration::hours(1);
            tz.from_local_datetime(&later).earliest()
        });
    next.map(|next| next.signed_duration_since(now.clone()).num_seconds())
        .and_then(|secs| u64::try_from(secs).ok())
        .unwrap_or(0)
}

/// Keyboard bindings
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum KeyCommand {
    Left,
    Right,
    Start,
    /// Pause or resume
    Pause,
    Ability,
    ResetHighScore,
    ResetLeaderboard,
    CycleSkin,
}

/// Map a `KeyboardEvent.key` value to a command
pub fn key_command(key: &str) -> Option<KeyCommand> {
    match key.to_lowercase().as_str() {
        "arrowleft" | "a" => Some(KeyCommand::Left),
        "arrowright" | "d" => Some(KeyCommand::Right),
        "enter" => Some(KeyCommand::Start),
        " " => Some(KeyCommand::Pause),
        "f" => Some(KeyCommand::Ability),
        "r" => Some(KeyCommand::ResetHighScore),
        "l" => Some(KeyCommand::ResetLeaderboard),
        "c" => Some(KeyCommand::CycleSkin),
        _ => None,
    }
}

/// Held keys plus the touch impulse, combined into one movement axis
#[derive(Debug, Clone, Default)]
pub struct InputState {
    pub left: bool,
    pub right: bool,
    /// Impulse from touch taps, decays toward zero
    pub touch_axis: f32,
}

impl InputState {
    /// Combined axis in [-1, 1]
    pub fn axis(&self) -> f32 {
        let keys = f32::from(u8::from(self.right)) - f32::from(u8::from(self.left));
        sanitize_axis(keys + self.touch_axis)
    }

    /// Track held movement keys; returns false for other commands
    pub fn set_key(&mut self, command: KeyCommand, down: bool) -> bool {
        match command {
            KeyCommand::Left => self.left = down,
            KeyCommand::Right => self.right = down,
            _ => return false,
        }
        true
    }

    /// Add a touch tap on the left (-1) or right (+1) half
    pub fn tap(&mut self, dir: f32) {
        self.touch_axis = sanitize_axis(dir);
    }

    /// Decay the touch impulse, snapping tiny values to zero
    pub fn decay(&mut self, dt: f32) {
        if self.touch_axis == 0.0 {
            return;
        }
        self.touch_axis *= (-TOUCH_DECAY * dt).exp();
        if self.touch_axis.abs() < TOUCH_EPSILON {
            self.touch_axis = 0.0;
        }
    }

    /// Release everything (focus loss)
    pub fn clear(&mut self) {
        *self = Self::default();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{FixedOffset, TimeZone, Utc};

    #[test]
    fn test_date_key_uses_local_zone() {
        // 2024-03-09 22:30 UTC is already 2024-03-10 at UTC+2
        let utc = Utc.with_ymd_and_hms(2024, 3, 9, 22, 30, 0).unwrap();
        let plus_two = utc.with_timezone(&FixedOffset::east_opt(2 * 3600).unwrap());
        assert_eq!(date_key_at(&utc), "2024-03-09");
        assert_eq!(date_key_at(&plus_two), "2024-03-10");

        let leap = Utc.with_ymd_and_hms(2024, 2, 29, 12, 0, 0).unwrap();
        assert_eq!(date_key_at(&leap), "2024-02-29");

        let today = today_key();
        assert_eq!(today.len(), 10);
        assert_eq!(today.as_bytes()[4], b'-');
        assert_eq!(today.as_bytes()[7], b'-');
    }

    #[test]
    fn test_seconds_until_midnight() {
        let start_of_day = Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap();
        assert_eq!(seconds_until_midnight_at(&start_of_day), 86_400);

        let late = Utc.with_ymd_and_hms(2023, 12, 31, 23, 0, 0).unwrap();
        assert_eq!(seconds_until_midnight_at(&late), 3_600);

        // Same instant, counted to the local midnight at UTC+2
        let utc = Utc.with_ymd_and_hms(2024, 3, 9, 22, 30, 0).unwrap();
        let plus_two = utc.with_timezone(&FixedOffset::east_opt(2 * 3600).unwrap());
        assert_eq!(seconds_until_midnight_at(&utc), 5_400);
        assert_eq!(seconds_until_midnight_at(&plus_two), 84_600);

        assert!(seconds_until_midnight() <= 86_400 + 3_600);
    }

    #[test]
    fn test_axis_combines_keys_and_touch() {
        let mut input = InputState::default();
        assert_eq!(input.axis(), 0.0);

        input.left = true;
        assert_eq!(input.axis(), -1.0);
        input.right = true;
        assert_eq!(input.axis(), 0.0);

        input.left = false;
        input.tap(1.0);
        assert_eq!(input.axis(), 1.0, "clamped");
    }

    #[test]
    fn test_key_bindings() {
        assert_eq!(key_command("ArrowLeft"), Some(KeyCommand::Left));
        assert_eq!(key_command("D"), Some(KeyCommand::Right));
        assert_eq!(key_command(" "), Some(KeyCommand::Pause));
        assert_eq!(key_command("q"), None);

        let mut input = InputState::default();
        assert!(input.set_key(KeyCommand::Left, true));
        assert!(!input.set_key(KeyCommand::Ability, true));
        assert_eq!(input.axis(), -1.0);
        input.set_key(KeyCommand::Left, false);
        assert_eq!(input.axis(), 0.0);
    }

    #[test]
    fn test_touch_decays_to_zero() {
        let mut input = InputState::default();
        input.tap(-1.0);
        input.decay(1.0 / 60.0);
        assert!(input.touch_axis < 0.0 && input.touch_axis > -1.0);

        for _ in 0..60 {
            input.decay(1.0 / 60.0);
        }
        assert_eq!(input.touch_axis, 0.0);
    }
}
