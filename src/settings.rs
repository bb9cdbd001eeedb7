//! Player preferences
//!
//! Each preference is stored under its own key so older saves with missing
//! keys still load.

use serde::{Deserialize, Serialize};

use crate::persistence::{self, Storage, keys};

/// A cosmetic color palette. Each entry is a `[top, bottom]` gradient
/// in `0xRRGGBB`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Skin {
    pub name: &'static str,
    pub player: [u32; 2],
    pub obstacle: [u32; 2],
    /// Boss-wave obstacles
    pub boss: [u32; 2],
}

/// Available skins, cycled in order
pub static SKINS: [Skin; 3] = [
    Skin {
        name: "Neo Mint",
        player: [0x7fffd4, 0x2bc48a],
        obstacle: [0xff8ca0, 0xff476e],
        boss: [0xffbf69, 0xff8f3f],
    },
    Skin {
        name: "Cyber Blue",
        player: [0x8ad8ff, 0x2b8df0],
        obstacle: [0xff9f80, 0xf15a2b],
        boss: [0xffd166, 0xef9f1d],
    },
    Skin {
        name: "Sunset Pulse",
        player: [0xffe29a, 0xff9f1c],
        obstacle: [0xffa8d8, 0xe53888],
        boss: [0xffd7ba, 0xfb5607],
    },
];

/// Game settings/preferences
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Settings {
    // === Accessibility ===
    /// Reduced motion (fewer particles)
    pub reduced_motion: bool,
    /// High contrast palette
    pub high_contrast: bool,

    // === Audio ===
    pub mute: bool,

    // === Cosmetic ===
    /// Index into [`SKINS`]
    pub skin_index: usize,
}

impl Settings {
    /// Currently selected skin (falls back to the first on a bad index)
    pub fn skin(&self) -> &'static Skin {
        SKINS.get(self.skin_index).unwrap_or(&SKINS[0])
    }

    /// Advance to the next skin, wrapping around
    pub fn cycle_skin(&mut self) -> &'static Skin {
        self.skin_index = (self.skin_index + 1) % SKINS.len();
        self.skin()
    }

    /// Load settings; missing or bad values use defaults
    pub fn load(storage: &dyn Storage) -> Self {
        let skin_index = persistence::read(storage, keys::SKIN)
            .and_then(|s| s.trim().parse::<usize>().ok())
            .map(|i| i.min(SKINS.len() - 1))
            .unwrap_or(0);

        let settings = Self {
            reduced_motion: persistence::read_flag(storage, keys::REDUCED_MOTION),
            high_contrast: persistence::read_flag(storage, keys::HIGH_CONTRAST),
            mute: persistence::read_flag(storage, keys::MUTE),
            skin_index,
        };
        log::info!("Loaded settings: {:?}", settings);
        settings
    }

    /// Save the accessibility and audio flags
    pub fn save(&self, storage: &mut dyn Storage) {
        persistence::write_flag(storage, keys::REDUCED_MOTION, self.reduced_motion);
        persistence::write_flag(storage, keys::HIGH_CONTRAST, self.high_contrast);
        persistence::write_flag(storage, keys::MUTE, self.mute);
        log::info!("Settings saved");
    }

    /// Save the selected skin
    pub fn save_skin(&self, storage: &mut dyn Storage) {
        persistence::write(storage, keys::SKIN, &self.skin_index.to_string());
    }
}
