use serde::Serialize;
use tracing::debug;

/// Output mode the user is converting to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Mode {
    Audio,
    Video,
}

/// A selectable (format, quality) pair shown to the user.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct FormatPreset {
    /// Opaque identifier forwarded to the backend
    pub id: &'static str,
    /// Display label
    pub label: &'static str,
    /// Quality qualifier shown next to the label
    pub qualifier: &'static str,
}

const AUDIO_PRESETS: &[FormatPreset] = &[
    FormatPreset { id: "mp3-48", label: "MP3", qualifier: "48 kbps" },
    FormatPreset { id: "mp3-128", label: "MP3", qualifier: "128 kbps" },
    FormatPreset { id: "mp3-240", label: "MP3", qualifier: "240 kbps" },
    FormatPreset { id: "mp3-320", label: "MP3", qualifier: "320 kbps" },
];

const VIDEO_PRESETS: &[FormatPreset] = &[
    FormatPreset { id: "mp4-360", label: "MP4", qualifier: "360p" },
    FormatPreset { id: "mp4-720", label: "MP4", qualifier: "720p" },
    FormatPreset { id: "mp4-1080", label: "MP4", qualifier: "1080p" },
    FormatPreset { id: "mp4-1440", label: "MP4", qualifier: "1440p" },
    FormatPreset { id: "mp4-2160", label: "MP4", qualifier: "4K" },
];

/// Static mapping from mode to its ordered list of selectable presets.
pub struct FormatCatalog;

impl FormatCatalog {
    /// Ordered presets for a mode.
    pub fn presets(mode: Mode) -> &'static [FormatPreset] {
        match mode {
            Mode::Audio => AUDIO_PRESETS,
            Mode::Video => VIDEO_PRESETS,
        }
    }

    /// Default preset id for a mode.
    pub fn default_id(mode: Mode) -> &'static str {
        match mode {
            Mode::Audio => "mp3-128",
            Mode::Video => "mp4-1080",
        }
    }

    /// Look up a preset by id within a mode's catalog.
    pub fn find(mode: Mode, id: &str) -> Option<&'static FormatPreset> {
        Self::presets(mode).iter().find(|preset| preset.id == id)
    }

    pub fn contains(mode: Mode, id: &str) -> bool {
        Self::find(mode, id).is_some()
    }
}

/// Current mode and selected preset.
///
/// The selected id is always a member of the current mode's catalog;
/// switching mode resets the selection to that mode's default.
#[derive(Debug, Clone)]
pub struct FormatSelection {
    mode: Mode,
    selected: &'static str,
}

impl Default for FormatSelection {
    fn default() -> Self {
        Self {
            mode: Mode::Audio,
            selected: FormatCatalog::default_id(Mode::Audio),
        }
    }
}

impl FormatSelection {
    pub fn mode(&self) -> Mode {
        self.mode
    }

    pub fn selected_id(&self) -> &str {
        self.selected
    }

    /// Switch mode, resetting the selection to the new mode's default.
    /// Selecting the current mode again leaves the selection untouched.
    pub fn set_mode(&mut self, mode: Mode) {
        if mode == self.mode {
            return;
        }
        self.mode = mode;
        self.selected = FormatCatalog::default_id(mode);
    }

    /// Select a preset by id. Ids outside the current mode's catalog are
    /// ignored; the return value reports whether the selection was accepted.
    pub fn select(&mut self, id: &str) -> bool {
        match FormatCatalog::find(self.mode, id) {
            Some(preset) => {
                self.selected = preset.id;
                true
            }
            None => {
                debug!("Ignoring format id outside current catalog: {}", id);
                false
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_selection_is_audio_mp3_128() {
        let selection = FormatSelection::default();
        assert_eq!(selection.mode(), Mode::Audio);
        assert_eq!(selection.selected_id(), "mp3-128");
    }

    #[test]
    fn switching_mode_resets_to_default() {
        let mut selection = FormatSelection::default();
        selection.set_mode(Mode::Video);
        assert!(selection.select("mp4-720"));
        assert_eq!(selection.selected_id(), "mp4-720");

        selection.set_mode(Mode::Audio);
        assert_eq!(selection.selected_id(), "mp3-128");
    }

    #[test]
    fn reselecting_current_mode_keeps_selection() {
        let mut selection = FormatSelection::default();
        assert!(selection.select("mp3-320"));
        selection.set_mode(Mode::Audio);
        assert_eq!(selection.selected_id(), "mp3-320");
    }

    #[test]
    fn out_of_catalog_id_is_ignored() {
        let mut selection = FormatSelection::default();
        assert!(!selection.select("mp4-1080"));
        assert_eq!(selection.selected_id(), "mp3-128");
        assert!(!selection.select("flac-999"));
        assert_eq!(selection.selected_id(), "mp3-128");
    }

    #[test]
    fn catalog_defaults_are_members() {
        assert!(FormatCatalog::contains(Mode::Audio, FormatCatalog::default_id(Mode::Audio)));
        assert!(FormatCatalog::contains(Mode::Video, FormatCatalog::default_id(Mode::Video)));
    }
}
