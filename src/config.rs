//! Configuration, color schemes, and static command data for remux.
//!
//! This module provides:
//! - TOML configuration file loading from `~/.remux/config.toml`
//! - The completion vocabulary and the fixed help/banner transcripts
//! - Built-in color schemes (default, solarized-dark, nord, dracula)
//! - Dispatch and session timing knobs
//!
//! # Configuration File
//!
//! The configuration file is located at `~/.remux/config.toml`:
//!
//! ```toml
//! # Shell used by the local process executor (optional)
//! shell = "/bin/bash"
//!
//! # Prefix key for session commands (default: Ctrl+B)
//! prefix_key = "b"
//!
//! # Color scheme: default, solarized-dark, nord, dracula
//! color_scheme = "nord"
//!
//! # Extra completion vocabulary entries, appended after the built-in list
//! extra_vocabulary = ["make", "make test"]
//!
//! [dispatch]
//! slow_success_ms = 1000
//! slow_failure_ms = 500
//! stream_delay_ms = 10
//! paced_families = ["npm", "git", "yarn"]
//!
//! [session]
//! disposal_grace_ms = 500
//! resize_debounce_ms = 100
//! scrollback_limit = 1000
//! ```

use std::fs;
use std::path::PathBuf;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::core::dispatch::DispatchConfig;

/// Fixed banner reprinted by Ctrl+L and shown on session start
pub const BANNER: &[&str] = &[
    "remux - remote shell multiplexer",
    "Type 'help' for builtins and shortcuts.",
];

/// Fixed help transcript printed by the `help` builtin
pub const HELP_TEXT: &[&str] = &[
    "remux built-in commands and shortcuts",
    "",
    "Builtins:",
    "  help              show this help",
    "  clear             clear the screen",
    "  history           list recent commands, newest first",
    "  cd <path>         set the working directory (no validation)",
    "",
    "Line editing:",
    "  Ctrl+C            discard the current line",
    "  Ctrl+L            clear the screen and reprint the banner",
    "  Ctrl+W            delete the word before the cursor",
    "  Ctrl+K            clear the line",
    "  Up / Down         walk the command history",
    "  Tab               complete against the known vocabulary",
    "",
    "Sessions (prefix Ctrl+B):",
    "  c                 new session",
    "  x                 close session",
    "  n / p             next / previous session",
    "  0-9               select session by number",
    "  ,                 rename session",
    "  ]                 paste from clipboard",
    "  y                 copy the current line to the clipboard",
    "  d                 close all sessions and quit",
    "",
    "Everything else is sent to the remote executor.",
];

/// Built-in completion vocabulary, grouped by category. Matching is exact
/// prefix, case-sensitive, and candidates keep this order.
pub const VOCABULARY: &[&str] = &[
    // Builtins
    "help",
    "clear",
    "history",
    "cd",
    // Filesystem
    "ls",
    "ls -la",
    "pwd",
    "cat",
    "echo",
    "mkdir",
    "mkdir -p",
    "rm",
    "rm -rf",
    "cp",
    "cp -r",
    "mv",
    "touch",
    "find",
    "grep",
    "grep -r",
    "head",
    "tail",
    "tail -f",
    "chmod",
    "chmod +x",
    "which",
    "wc -l",
    "du -sh",
    // Node
    "node",
    "node --version",
    "npm",
    "npm install",
    "npm install --save-dev",
    "npm run",
    "npm run build",
    "npm run dev",
    "npm start",
    "npm test",
    "npx",
    "yarn",
    "yarn add",
    "yarn install",
    "yarn dev",
    "yarn build",
    // Git
    "git",
    "git status",
    "git add",
    "git add .",
    "git commit",
    "git commit -m",
    "git push",
    "git pull",
    "git log",
    "git log --oneline",
    "git diff",
    "git branch",
    "git checkout",
    "git checkout -b",
    "git merge",
    "git stash",
    "git stash pop",
    "git clone",
    "git remote -v",
    // Python
    "python",
    "python3",
    "python3 -m venv",
    "pip",
    "pip install",
    "pip install -r requirements.txt",
    // System
    "ps",
    "ps aux",
    "kill",
    "env",
    "export",
    "curl",
    "wget",
    "tar -xzf",
    "unzip",
    "whoami",
    "uname -a",
    "date",
    "df -h",
];

/// Main configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Shell used by the local process executor
    pub shell: Option<String>,
    /// Prefix key character (with Ctrl)
    pub prefix_key: String,
    /// Color scheme name
    pub color_scheme: String,
    /// Extra completion vocabulary entries
    pub extra_vocabulary: Vec<String>,
    /// Dispatch timing
    pub dispatch: DispatchSection,
    /// Session timing and limits
    pub session: SessionSection,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            shell: None,
            prefix_key: "b".to_string(),
            color_scheme: "default".to_string(),
            extra_vocabulary: Vec::new(),
            dispatch: DispatchSection::default(),
            session: SessionSection::default(),
        }
    }
}

/// Dispatch timing configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct DispatchSection {
    pub slow_success_ms: u64,
    pub slow_failure_ms: u64,
    pub stream_delay_ms: u64,
    pub paced_families: Vec<String>,
}

impl Default for DispatchSection {
    fn default() -> Self {
        Self {
            slow_success_ms: 1000,
            slow_failure_ms: 500,
            stream_delay_ms: 10,
            paced_families: vec!["npm".to_string(), "git".to_string(), "yarn".to_string()],
        }
    }
}

/// Session timing and display limits
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SessionSection {
    pub disposal_grace_ms: u64,
    pub resize_debounce_ms: u64,
    pub scrollback_limit: usize,
}

impl Default for SessionSection {
    fn default() -> Self {
        Self {
            disposal_grace_ms: 500,
            resize_debounce_ms: 100,
            scrollback_limit: 1000,
        }
    }
}

impl Config {
    /// Load configuration from file
    pub fn load() -> Self {
        if let Some(path) = Self::get_config_path() {
            if path.exists() {
                if let Ok(content) = fs::read_to_string(&path) {
                    if let Ok(config) = toml::from_str(&content) {
                        return config;
                    }
                }
            }
        }
        Self::default()
    }

    /// Get config file path
    fn get_config_path() -> Option<PathBuf> {
        if let Some(home) = home_dir() {
            let remux_dir = home.join(".remux");
            if !remux_dir.exists() {
                let _ = fs::create_dir_all(&remux_dir);
            }
            return Some(remux_dir.join("config.toml"));
        }
        None
    }

    /// Full completion vocabulary: built-ins plus configured extras
    pub fn vocabulary(&self) -> Vec<String> {
        VOCABULARY
            .iter()
            .map(|entry| entry.to_string())
            .chain(self.extra_vocabulary.iter().cloned())
            .collect()
    }

    /// Dispatch tuning derived from the config file
    pub fn dispatch_config(&self) -> DispatchConfig {
        DispatchConfig {
            slow_success: Duration::from_millis(self.dispatch.slow_success_ms),
            slow_failure: Duration::from_millis(self.dispatch.slow_failure_ms),
            stream_delay: Duration::from_millis(self.dispatch.stream_delay_ms),
            paced_families: self.dispatch.paced_families.clone(),
        }
    }

    pub fn disposal_grace(&self) -> Duration {
        Duration::from_millis(self.session.disposal_grace_ms)
    }

    pub fn resize_debounce(&self) -> Duration {
        Duration::from_millis(self.session.resize_debounce_ms)
    }

    /// Get the color scheme
    pub fn get_color_scheme(&self) -> ColorScheme {
        ColorScheme::by_name(&self.color_scheme)
    }
}

/// Prefix key (pressed with Ctrl)
#[derive(Debug, Clone, Copy)]
pub struct PrefixKey {
    pub char: char,
}

impl PrefixKey {
    /// Parse a single-character prefix key definition
    pub fn parse(value: &str) -> Option<Self> {
        let mut chars = value.trim().chars();
        match (chars.next(), chars.next()) {
            (Some(ch), None) if ch.is_ascii_lowercase() => Some(Self { char: ch }),
            _ => None,
        }
    }
}

/// Color definition (RGB)
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct Color {
    pub r: u8,
    pub g: u8,
    pub b: u8,
}

impl Color {
    pub const fn new(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b }
    }

    /// Convert to crossterm Color
    pub fn to_crossterm(&self) -> crossterm::style::Color {
        crossterm::style::Color::Rgb {
            r: self.r,
            g: self.g,
            b: self.b,
        }
    }
}

/// Color scheme definition
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ColorScheme {
    pub name: String,

    // Tab bar colors
    pub tab_bar_bg: Color,
    pub tab_bar_fg: Color,
    pub tab_active_bg: Color,
    pub tab_active_fg: Color,
    pub tab_closing_fg: Color,

    // Status bar colors
    pub status_bar_bg: Color,
    pub status_bar_fg: Color,
    pub status_prefix_bg: Color,
    pub status_prefix_fg: Color,

    // Output colors by classification
    pub output_error: Color,
    pub output_warning: Color,
    pub output_success: Color,
    pub output_pointer: Color,
    pub output_plain: Color,

    // Echoed prompt lines and system notices
    pub echo_fg: Color,
    pub notice_fg: Color,
}

impl Default for ColorScheme {
    fn default() -> Self {
        Self::default_scheme()
    }
}

impl ColorScheme {
    /// Default color scheme
    pub fn default_scheme() -> Self {
        Self {
            name: "default".to_string(),

            tab_bar_bg: Color::new(40, 40, 40),
            tab_bar_fg: Color::new(180, 180, 180),
            tab_active_bg: Color::new(60, 60, 180),
            tab_active_fg: Color::new(255, 255, 255),
            tab_closing_fg: Color::new(120, 120, 120),

            status_bar_bg: Color::new(0, 100, 0),
            status_bar_fg: Color::new(255, 255, 255),
            status_prefix_bg: Color::new(200, 200, 0),
            status_prefix_fg: Color::new(0, 0, 0),

            output_error: Color::new(220, 80, 80),
            output_warning: Color::new(210, 180, 60),
            output_success: Color::new(80, 200, 120),
            output_pointer: Color::new(80, 180, 220),
            output_plain: Color::new(220, 220, 220),

            echo_fg: Color::new(150, 150, 150),
            notice_fg: Color::new(130, 130, 170),
        }
    }

    /// Solarized Dark scheme
    pub fn solarized_dark() -> Self {
        Self {
            name: "solarized-dark".to_string(),

            tab_bar_bg: Color::new(0, 43, 54),
            tab_bar_fg: Color::new(147, 161, 161),
            tab_active_bg: Color::new(38, 139, 210),
            tab_active_fg: Color::new(253, 246, 227),
            tab_closing_fg: Color::new(88, 110, 117),

            status_bar_bg: Color::new(7, 54, 66),
            status_bar_fg: Color::new(147, 161, 161),
            status_prefix_bg: Color::new(181, 137, 0),
            status_prefix_fg: Color::new(0, 43, 54),

            output_error: Color::new(220, 50, 47),
            output_warning: Color::new(181, 137, 0),
            output_success: Color::new(133, 153, 0),
            output_pointer: Color::new(42, 161, 152),
            output_plain: Color::new(147, 161, 161),

            echo_fg: Color::new(101, 123, 131),
            notice_fg: Color::new(108, 113, 196),
        }
    }

    /// Nord scheme
    pub fn nord() -> Self {
        Self {
            name: "nord".to_string(),

            tab_bar_bg: Color::new(46, 52, 64),
            tab_bar_fg: Color::new(216, 222, 233),
            tab_active_bg: Color::new(136, 192, 208),
            tab_active_fg: Color::new(46, 52, 64),
            tab_closing_fg: Color::new(97, 110, 136),

            status_bar_bg: Color::new(59, 66, 82),
            status_bar_fg: Color::new(216, 222, 233),
            status_prefix_bg: Color::new(163, 190, 140),
            status_prefix_fg: Color::new(46, 52, 64),

            output_error: Color::new(191, 97, 106),
            output_warning: Color::new(235, 203, 139),
            output_success: Color::new(163, 190, 140),
            output_pointer: Color::new(136, 192, 208),
            output_plain: Color::new(216, 222, 233),

            echo_fg: Color::new(147, 161, 181),
            notice_fg: Color::new(180, 142, 173),
        }
    }

    /// Dracula scheme
    pub fn dracula() -> Self {
        Self {
            name: "dracula".to_string(),

            tab_bar_bg: Color::new(40, 42, 54),
            tab_bar_fg: Color::new(248, 248, 242),
            tab_active_bg: Color::new(189, 147, 249),
            tab_active_fg: Color::new(40, 42, 54),
            tab_closing_fg: Color::new(98, 114, 164),

            status_bar_bg: Color::new(68, 71, 90),
            status_bar_fg: Color::new(248, 248, 242),
            status_prefix_bg: Color::new(80, 250, 123),
            status_prefix_fg: Color::new(40, 42, 54),

            output_error: Color::new(255, 85, 85),
            output_warning: Color::new(241, 250, 140),
            output_success: Color::new(80, 250, 123),
            output_pointer: Color::new(139, 233, 253),
            output_plain: Color::new(248, 248, 242),

            echo_fg: Color::new(98, 114, 164),
            notice_fg: Color::new(189, 147, 249),
        }
    }

    /// Get scheme by name
    pub fn by_name(name: &str) -> Self {
        match name.to_lowercase().as_str() {
            "solarized-dark" | "solarized_dark" => Self::solarized_dark(),
            "nord" => Self::nord(),
            "dracula" => Self::dracula(),
            _ => Self::default_scheme(),
        }
    }

    /// List available schemes
    pub fn list() -> Vec<&'static str> {
        vec!["default", "solarized-dark", "nord", "dracula"]
    }
}

// Get home directory
fn home_dir() -> Option<PathBuf> {
    std::env::var_os("HOME")
        .or_else(|| std::env::var_os("USERPROFILE"))
        .map(PathBuf::from)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_vocabulary_has_expected_shape() {
        // Roughly seventy entries, builtins first
        assert!(VOCABULARY.len() >= 70);
        assert_eq!(VOCABULARY[0], "help");
        // "gr" is ambiguous between grep variants only
        let matches: Vec<_> = VOCABULARY
            .iter()
            .filter(|entry| entry.starts_with("gr"))
            .collect();
        assert_eq!(matches, vec![&"grep", &"grep -r"]);
    }

    #[test]
    fn test_extra_vocabulary_appends() {
        let config = Config {
            extra_vocabulary: vec!["make".to_string()],
            ..Config::default()
        };
        let vocabulary = config.vocabulary();
        assert_eq!(vocabulary.last().map(String::as_str), Some("make"));
        assert_eq!(vocabulary.len(), VOCABULARY.len() + 1);
    }

    #[test]
    fn test_default_timing() {
        let config = Config::default();
        assert_eq!(config.disposal_grace(), Duration::from_millis(500));
        assert_eq!(config.resize_debounce(), Duration::from_millis(100));
        let dispatch = config.dispatch_config();
        assert_eq!(dispatch.slow_success, Duration::from_millis(1000));
        assert_eq!(dispatch.slow_failure, Duration::from_millis(500));
        assert_eq!(dispatch.stream_delay, Duration::from_millis(10));
    }

    #[test]
    fn test_prefix_key_parse() {
        assert_eq!(PrefixKey::parse("b").map(|k| k.char), Some('b'));
        assert_eq!(PrefixKey::parse("a").map(|k| k.char), Some('a'));
        assert!(PrefixKey::parse("ab").is_none());
        assert!(PrefixKey::parse("").is_none());
    }

    #[test]
    fn test_scheme_by_name_falls_back_to_default() {
        assert_eq!(ColorScheme::by_name("nord").name, "nord");
        assert_eq!(ColorScheme::by_name("unknown").name, "default");
    }

    #[test]
    fn test_config_parses_partial_toml() {
        let config: Config = toml::from_str(
            r#"
            color_scheme = "nord"
            [dispatch]
            stream_delay_ms = 25
            "#,
        )
        .unwrap();
        assert_eq!(config.color_scheme, "nord");
        assert_eq!(config.dispatch.stream_delay_ms, 25);
        // Untouched sections keep their defaults
        assert_eq!(config.dispatch.slow_success_ms, 1000);
        assert_eq!(config.session.scrollback_limit, 1000);
    }
}
