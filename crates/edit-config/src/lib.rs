//! Editor options loading and parsing.
//!
//! Options come from `dlxedit.toml`, discovered in the working directory
//! first and the platform config directory second. Loading is tolerant: a
//! missing or unparsable file falls back to defaults, unknown fields are
//! ignored, and out-of-range values are clamped at application time with an
//! informational log rather than rejected.

use anyhow::Result;
use serde::Deserialize;
use std::{fs, path::PathBuf};
use tracing::info;

pub const MIN_TAB_SIZE: usize = 1;
pub const MAX_TAB_SIZE: usize = 32;
const DEFAULT_DOUBLE_CLICK_SECONDS: f64 = 0.35;

/// Palette selection by name; mapped onto the render palette by the editor.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum PaletteName {
    #[default]
    Dark,
    Light,
    RetroBlue,
}

#[derive(Debug, Deserialize, Clone)]
pub struct EditorSection {
    #[serde(default = "EditorSection::default_tab_size")]
    pub tab_size: usize,
    #[serde(default)]
    pub show_whitespaces: bool,
    #[serde(default = "EditorSection::default_colorizer")]
    pub colorizer: bool,
    #[serde(default)]
    pub read_only: bool,
}

impl EditorSection {
    const fn default_tab_size() -> usize {
        4
    }
    const fn default_colorizer() -> bool {
        true
    }
}

impl Default for EditorSection {
    fn default() -> Self {
        Self {
            tab_size: Self::default_tab_size(),
            show_whitespaces: false,
            colorizer: Self::default_colorizer(),
            read_only: false,
        }
    }
}

#[derive(Debug, Deserialize, Clone)]
pub struct MouseSection {
    #[serde(default = "MouseSection::default_double_click_seconds")]
    pub double_click_seconds: f64,
}

impl MouseSection {
    const fn default_double_click_seconds() -> f64 {
        DEFAULT_DOUBLE_CLICK_SECONDS
    }
}

impl Default for MouseSection {
    fn default() -> Self {
        Self {
            double_click_seconds: Self::default_double_click_seconds(),
        }
    }
}

#[derive(Debug, Deserialize, Clone, Default)]
pub struct DisplaySection {
    #[serde(default)]
    pub palette: PaletteName,
}

/// Raw file contents as deserialized.
#[derive(Debug, Deserialize, Clone, Default)]
pub struct OptionsFile {
    #[serde(default)]
    pub editor: EditorSection,
    #[serde(default)]
    pub mouse: MouseSection,
    #[serde(default)]
    pub display: DisplaySection,
}

/// Parsed options plus the clamped effective values.
#[derive(Debug, Clone, Default)]
pub struct EditorOptions {
    pub file: OptionsFile,
    pub effective_tab_size: usize,
    pub effective_double_click_seconds: f64,
}

/// Best-effort config path: working directory first, then the platform
/// config directory.
pub fn discover() -> PathBuf {
    let local = PathBuf::from("dlxedit.toml");
    if local.exists() {
        return local;
    }
    if let Some(dir) = dirs::config_dir() {
        return dir.join("dlxedit").join("dlxedit.toml");
    }
    PathBuf::from("dlxedit.toml")
}

pub fn load_from(path: Option<PathBuf>) -> Result<EditorOptions> {
    let path = path.unwrap_or_else(discover);
    let file = match fs::read_to_string(&path) {
        Ok(content) => match toml::from_str::<OptionsFile>(&content) {
            Ok(file) => file,
            Err(error) => {
                info!(target: "config", %error, file = %path.display(), "options_parse_failed_using_defaults");
                OptionsFile::default()
            }
        },
        Err(_) => OptionsFile::default(),
    };

    let mut options = EditorOptions {
        file,
        effective_tab_size: 0,
        effective_double_click_seconds: 0.0,
    };
    options.apply_clamps();
    Ok(options)
}

impl EditorOptions {
    /// Clamp raw values into their valid ranges, logging adjustments.
    pub fn apply_clamps(&mut self) {
        let raw = self.file.editor.tab_size;
        let clamped = raw.clamp(MIN_TAB_SIZE, MAX_TAB_SIZE);
        if clamped != raw {
            info!(target: "config", raw, clamped, "tab_size_clamped");
        }
        self.effective_tab_size = clamped;

        let raw_dc = self.file.mouse.double_click_seconds;
        let clamped_dc = if raw_dc.is_finite() {
            raw_dc.clamp(0.05, 5.0)
        } else {
            DEFAULT_DOUBLE_CLICK_SECONDS
        };
        if clamped_dc != raw_dc {
            info!(target: "config", raw = raw_dc, clamped = clamped_dc, "double_click_time_clamped");
        }
        self.effective_double_click_seconds = clamped_dc;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    #[test]
    fn defaults_when_file_is_missing() {
        let options = load_from(Some(PathBuf::from("__no_such_options_file__.toml"))).unwrap();
        assert_eq!(options.effective_tab_size, 4);
        assert!(options.file.editor.colorizer);
        assert!(!options.file.editor.read_only);
        assert_eq!(options.file.display.palette, PaletteName::Dark);
    }

    #[test]
    fn parses_sections_and_ignores_unknown_fields() {
        let tmp = tempfile::NamedTempFile::new().unwrap();
        std::fs::write(
            tmp.path(),
            "[editor]\ntab_size = 8\nshow_whitespaces = true\nfuture_knob = 1\n\n[display]\npalette = \"retro-blue\"\n",
        )
        .unwrap();
        let options = load_from(Some(tmp.path().to_path_buf())).unwrap();
        assert_eq!(options.effective_tab_size, 8);
        assert!(options.file.editor.show_whitespaces);
        assert_eq!(options.file.display.palette, PaletteName::RetroBlue);
    }

    #[test]
    fn out_of_range_tab_size_is_clamped() {
        let tmp = tempfile::NamedTempFile::new().unwrap();
        std::fs::write(tmp.path(), "[editor]\ntab_size = 99\n").unwrap();
        let options = load_from(Some(tmp.path().to_path_buf())).unwrap();
        assert_eq!(options.effective_tab_size, MAX_TAB_SIZE);
    }

    #[test]
    fn unparsable_file_falls_back_to_defaults() {
        let tmp = tempfile::NamedTempFile::new().unwrap();
        std::fs::write(tmp.path(), "not [valid toml ===").unwrap();
        let options = load_from(Some(tmp.path().to_path_buf())).unwrap();
        assert_eq!(options.effective_tab_size, 4);
    }

    #[test]
    fn double_click_window_is_clamped() {
        let tmp = tempfile::NamedTempFile::new().unwrap();
        std::fs::write(tmp.path(), "[mouse]\ndouble_click_seconds = 100.0\n").unwrap();
        let options = load_from(Some(tmp.path().to_path_buf())).unwrap();
        assert_eq!(options.effective_double_click_seconds, 5.0);
    }
}
