//! Daily challenge
//!
//! One goal per calendar day, picked deterministically from a fixed pool by
//! hashing the date key. The reward is paid at most once per day; the host
//! persists the "done on date X" marker so a restart on the same day cannot
//! claim it again.

use serde::{Deserialize, Serialize};

/// Challenge pool, indexed by the date hash
pub const CHALLENGE_POOL: [ChallengeKind; 3] = [
    ChallengeKind::Survive,
    ChallengeKind::Dodge,
    ChallengeKind::Coin,
];

/// Which run statistic a challenge tracks
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ChallengeKind {
    /// Seconds survived in a single run
    Survive,
    /// Obstacles dodged in a single run
    Dodge,
    /// Coins collected in a single run
    Coin,
}

impl ChallengeKind {
    pub fn id(&self) -> &'static str {
        match self {
            ChallengeKind::Survive => "survive_60",
            ChallengeKind::Dodge => "dodge_25",
            ChallengeKind::Coin => "coin_20",
        }
    }

    pub fn text(&self) -> &'static str {
        match self {
            ChallengeKind::Survive => "Survive 60 seconds",
            ChallengeKind::Dodge => "Dodge 25 obstacles",
            ChallengeKind::Coin => "Collect 20 coins",
        }
    }

    pub fn target(&self) -> f64 {
        match self {
            ChallengeKind::Survive => 60.0,
            ChallengeKind::Dodge => 25.0,
            ChallengeKind::Coin => 20.0,
        }
    }

    pub fn reward_score(&self) -> u32 {
        match self {
            ChallengeKind::Survive => 80,
            ChallengeKind::Dodge => 70,
            ChallengeKind::Coin => 65,
        }
    }

    pub fn reward_coins(&self) -> u32 {
        match self {
            ChallengeKind::Survive => 6,
            ChallengeKind::Dodge => 5,
            ChallengeKind::Coin => 8,
        }
    }
}

/// Run statistics a challenge can track
#[derive(Debug, Clone, Copy, Default)]
pub struct RunStats {
    pub survive_time: f64,
    pub dodges: u32,
    pub coins: u32,
}

/// Today's challenge and its progress
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DailyChallenge {
    pub kind: ChallengeKind,
    /// Calendar date this challenge belongs to (`YYYY-MM-DD`)
    pub date_key: String,
    pub progress: f64,
    pub completed: bool,
    pub reward_given: bool,
}

impl DailyChallenge {
    /// Build the challenge for `date_key`, already rewarded if `done_date` matches
    pub fn for_date(date_key: &str, done_date: Option<&str>) -> Self {
        let kind = CHALLENGE_POOL[pool_index(date_key)];
        let done = done_date == Some(date_key);
        Self {
            kind,
            date_key: date_key.to_string(),
            progress: 0.0,
            completed: done,
            reward_given: done,
        }
    }

    /// Reset per-run progress; the reward flags survive for the whole day
    pub fn restart(&mut self) {
        self.progress = 0.0;
    }

    /// Track the relevant statistic. Returns true exactly once: on the frame
    /// the target is first reached and the reward has not been paid today.
    pub fn update(&mut self, stats: RunStats) -> bool {
        if self.reward_given {
            return false;
        }

        self.progress = match self.kind {
            ChallengeKind::Survive => stats.survive_time,
            ChallengeKind::Dodge => f64::from(stats.dodges),
            ChallengeKind::Coin => f64::from(stats.coins),
        };

        if self.progress >= self.kind.target() {
            self.completed = true;
            self.reward_given = true;
            return true;
        }
        false
    }

    /// HUD line, e.g. `Dodge 25 obstacles (12/25)`
    pub fn progress_text(&self) -> String {
        if self.reward_given {
            self.kind.text().to_string()
        } else {
            format!(
                "{} ({}/{})",
                self.kind.text(),
                self.progress.floor() as u64,
                self.kind.target() as u64
            )
        }
    }

    pub fn status_text(&self) -> String {
        if self.reward_given {
            format!(
                "Completed Today (+{} score, +{} coins)",
                self.kind.reward_score(),
                self.kind.reward_coins()
            )
        } else {
            "In progress".to_string()
        }
    }

    pub fn bonus_text(&self) -> String {
        format!(
            "Daily reward claimed: +{} score, +{} coins",
            self.kind.reward_score(),
            self.kind.reward_coins()
        )
    }
}

/// Index into [`CHALLENGE_POOL`]: sum of the key's bytes modulo pool size
pub fn pool_index(date_key: &str) -> usize {
    let hash: usize = date_key.bytes().map(usize::from).sum();
    hash % CHALLENGE_POOL.len()
}

/// Countdown text until the challenge rolls over, e.g. `5h 12m`
pub fn reset_countdown_text(seconds_until_midnight: u64) -> String {
    let total_min = seconds_until_midnight / 60;
    format!("{}h {}m", total_min / 60, total_min % 60)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_pool_selection_is_deterministic() {
        assert_eq!(DailyChallenge::for_date("2024-01-01", None).kind, ChallengeKind::Dodge);
        assert_eq!(DailyChallenge::for_date("2024-01-02", None).kind, ChallengeKind::Coin);
        assert_eq!(DailyChallenge::for_date("2024-01-03", None).kind, ChallengeKind::Survive);
        assert_eq!(pool_index("2024-01-01"), pool_index("2024-01-01"));
    }

    #[test]
    fn test_done_marker_for_same_day_only() {
        let c = DailyChallenge::for_date("2024-01-01", Some("2024-01-01"));
        assert!(c.completed && c.reward_given);

        let c = DailyChallenge::for_date("2024-01-02", Some("2024-01-01"));
        assert!(!c.completed && !c.reward_given);
    }

    #[test]
    fn test_reward_granted_once() {
        let mut c = DailyChallenge::for_date("2024-01-01", None);
        assert_eq!(c.kind, ChallengeKind::Dodge);

        let mut stats = RunStats {
            dodges: 24,
            ..Default::default()
        };
        assert!(!c.update(stats));
        assert_eq!(c.progress, 24.0);

        stats.dodges = 25;
        assert!(c.update(stats));
        assert!(c.completed);

        // Crossing again in a later run the same day pays nothing
        c.restart();
        assert!(!c.update(stats));
        stats.dodges = 40;
        assert!(!c.update(stats));
    }

    #[test]
    fn test_survive_progress_tracks_time() {
        let mut c = DailyChallenge::for_date("2024-01-03", None);
        let stats = RunStats {
            survive_time: 12.5,
            ..Default::default()
        };
        assert!(!c.update(stats));
        assert_eq!(c.progress_text(), "Survive 60 seconds (12/60)");
        assert_eq!(c.status_text(), "In progress");
    }

    #[test]
    fn test_countdown_text() {
        assert_eq!(reset_countdown_text(0), "0h 0m");
        assert_eq!(reset_countdown_text(5 * 3600 + 12 * 60 + 59), "5h 12m");
    }
}
