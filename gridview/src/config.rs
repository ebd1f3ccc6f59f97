use std::ffi::OsString;
use std::fs;
use std::io;
use std::path::PathBuf;

use image::imageops::FilterType;
use serde::{Deserialize, Serialize};

use crate::color::Color;

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub struct Palette {
    pub base_fill: Color,
    pub border: Color,
    pub grid_line: Color,
}

impl Default for Palette {
    fn default() -> Self {
        Self {
            base_fill: Color::BLACK,
            border: Color::GRAY,
            grid_line: Color::GRID_LINE,
        }
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub struct GridSettings {
    /// Initial state of the grid-lines toggle.
    pub show_grid_lines: bool,
    pub line_width: u32,
}

impl Default for GridSettings {
    fn default() -> Self {
        Self {
            show_grid_lines: false,
            line_width: 1,
        }
    }
}

#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum Resample {
    Nearest,
    #[default]
    Triangle,
    Lanczos3,
}

impl Resample {
    pub fn filter(self) -> FilterType {
        match self {
            Resample::Nearest => FilterType::Nearest,
            Resample::Triangle => FilterType::Triangle,
            Resample::Lanczos3 => FilterType::Lanczos3,
        }
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub struct EncodingSettings {
    pub jpeg_quality: u8,
    pub resample: Resample,
}

impl Default for EncodingSettings {
    fn default() -> Self {
        Self {
            jpeg_quality: 92,
            resample: Resample::default(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ViewConfig {
    #[serde(default = "default_version")]
    pub version: u32,
    #[serde(default)]
    pub palette: Palette,
    #[serde(default)]
    pub grid: GridSettings,
    #[serde(default)]
    pub encoding: EncodingSettings,
}

impl Default for ViewConfig {
    fn default() -> Self {
        Self {
            version: default_version(),
            palette: Palette::default(),
            grid: GridSettings::default(),
            encoding: EncodingSettings::default(),
        }
    }
}

impl ViewConfig {
    pub fn sanitized(mut self) -> Self {
        self.version = default_version();
        self.grid.line_width = self.grid.line_width.max(1);
        self.encoding.jpeg_quality = self.encoding.jpeg_quality.clamp(1, 100);
        self
    }
}

fn default_version() -> u32 {
    1
}

#[derive(Debug, Clone)]
pub struct ConfigStore {
    path: PathBuf,
}

impl ConfigStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// `GRIDVIEW_CONFIG_PATH`, else `$XDG_CONFIG_HOME/gridview/config.json`, else
    /// `$HOME/.config/gridview/config.json`, else `./gridview/config.json`.
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var_os(key))
    }

    fn from_lookup(lookup: impl Fn(&str) -> Option<OsString>) -> Self {
        if let Some(explicit) = lookup("GRIDVIEW_CONFIG_PATH") {
            return Self {
                path: PathBuf::from(explicit),
            };
        }

        let base = lookup("XDG_CONFIG_HOME")
            .map(PathBuf::from)
            .or_else(|| lookup("HOME").map(|home| PathBuf::from(home).join(".config")))
            .unwrap_or_else(|| PathBuf::from("."));

        Self {
            path: base.join("gridview").join("config.json"),
        }
    }

    pub fn path(&self) -> &PathBuf {
        &self.path
    }

    /// Missing files give the defaults silently; unreadable ones give the defaults with a
    /// warning.
    pub fn load(&self) -> ViewConfig {
        let Ok(bytes) = fs::read(&self.path) else {
            return ViewConfig::default();
        };
        match serde_json::from_slice::<ViewConfig>(&bytes) {
            Ok(config) => config.sanitized(),
            Err(err) => {
                log::warn!(
                    "ignoring unreadable view config {}: {err}",
                    self.path.display()
                );
                ViewConfig::default()
            }
        }
    }

    pub fn save(&self, config: &ViewConfig) -> io::Result<()> {
        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent)?;
            }
        }
        let text = serde_json::to_string_pretty(config)
            .map_err(|e| io::Error::new(io::ErrorKind::InvalidData, e))?;
        fs::write(&self.path, text)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::{SystemTime, UNIX_EPOCH};

    fn unique_temp_path() -> PathBuf {
        let nanos = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .unwrap_or_default()
            .as_nanos();
        std::env::temp_dir()
            .join(format!("gridview_config_{nanos}"))
            .join("config.json")
    }

    fn lookup<'a>(vars: &'a [(&'a str, &'a str)]) -> impl Fn(&str) -> Option<OsString> + 'a {
        move |key| {
            vars.iter()
                .find(|(k, _)| *k == key)
                .map(|(_, v)| OsString::from(v))
        }
    }

    #[test]
    fn config_path_precedence() {
        let all = [
            ("GRIDVIEW_CONFIG_PATH", "/etc/gridview.json"),
            ("XDG_CONFIG_HOME", "/xdg"),
            ("HOME", "/home/ada"),
        ];
        let store = ConfigStore::from_lookup(lookup(&all));
        assert_eq!(store.path(), &PathBuf::from("/etc/gridview.json"));

        let store = ConfigStore::from_lookup(lookup(&all[1..]));
        assert_eq!(store.path(), &PathBuf::from("/xdg/gridview/config.json"));

        let store = ConfigStore::from_lookup(lookup(&all[2..]));
        assert_eq!(
            store.path(),
            &PathBuf::from("/home/ada/.config/gridview/config.json")
        );

        let store = ConfigStore::from_lookup(lookup(&[]));
        assert_eq!(store.path(), &PathBuf::from("./gridview/config.json"));
    }

    #[test]
    fn defaults_match_the_classic_look() {
        let config = ViewConfig::default();
        assert_eq!(config.palette.base_fill, Color::BLACK);
        assert_eq!(config.palette.border, Color::GRAY);
        assert_eq!(config.palette.grid_line, Color::rgb(42, 42, 42));
        assert!(!config.grid.show_grid_lines);
        assert_eq!(config.encoding.jpeg_quality, 92);
    }

    #[test]
    fn partial_json_fills_in_defaults() {
        let config: ViewConfig =
            serde_json::from_str(r#"{ "grid": { "show_grid_lines": true, "line_width": 0 } }"#)
                .unwrap();
        let config = config.sanitized();
        assert!(config.grid.show_grid_lines);
        assert_eq!(config.grid.line_width, 1);
        assert_eq!(config.palette, Palette::default());
    }

    #[test]
    fn sanitized_clamps_quality() {
        let mut config = ViewConfig::default();
        config.encoding.jpeg_quality = 0;
        assert_eq!(config.sanitized().encoding.jpeg_quality, 1);
    }

    #[test]
    fn store_round_trips_and_tolerates_garbage() {
        let path = unique_temp_path();
        let store = ConfigStore::new(&path);
        assert_eq!(store.load(), ViewConfig::default());

        let mut config = ViewConfig::default();
        config.palette.border = Color::rgb(255, 0, 0);
        config.encoding.resample = Resample::Nearest;
        store.save(&config).unwrap();
        assert_eq!(store.load(), config);

        fs::write(&path, b"{ not json").unwrap();
        assert_eq!(store.load(), ViewConfig::default());

        if let Some(dir) = path.parent() {
            let _ = fs::remove_dir_all(dir);
        }
    }
}
