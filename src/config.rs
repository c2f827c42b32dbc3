//! Saved command-line defaults.
//!
//! A config file holds CLI flags, one or more per line, with `#` comments.
//! Options whose value may contain spaces (theme names, folders) are saved
//! as `--flag=value` on a line of their own and read back whole.

use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};

use crate::highlight::HighlightSource;
use crate::render::{ClozeView, RenderMode};

const APP_DIR: &str = "clozewright";
const RC_FILE: &str = ".clozewrightrc";

#[derive(clap::ValueEnum, Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ViewMode {
    /// Portable HTML with literal cloze markers
    #[default]
    Output,
    /// Preview with every cloze labelled
    Edit,
    /// Preview with the active cloze hidden
    Hidden,
    /// Preview with the active cloze emphasised
    Revealed,
}

impl ViewMode {
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Output => "output",
            Self::Edit => "edit",
            Self::Hidden => "hidden",
            Self::Revealed => "revealed",
        }
    }

    pub const fn render_mode(self, active: u32) -> RenderMode {
        match self {
            Self::Output => RenderMode::Output,
            Self::Edit => RenderMode::Preview(ClozeView::Edit),
            Self::Hidden => RenderMode::Preview(ClozeView::Hidden { active }),
            Self::Revealed => RenderMode::Preview(ClozeView::Revealed { active }),
        }
    }
}

#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct ConfigFlags {
    pub watch: bool,
    pub no_highlight: bool,
    pub theme: Option<String>,
    pub syntax_dir: Option<PathBuf>,
    pub theme_dir: Option<PathBuf>,
    pub mode: Option<ViewMode>,
}

impl ConfigFlags {
    /// Merge with `other` taking precedence: booleans are OR-ed, options
    /// from `other` win when set.
    pub fn union(&self, other: &Self) -> Self {
        Self {
            watch: self.watch || other.watch,
            no_highlight: self.no_highlight || other.no_highlight,
            theme: other.theme.clone().or_else(|| self.theme.clone()),
            syntax_dir: other.syntax_dir.clone().or_else(|| self.syntax_dir.clone()),
            theme_dir: other.theme_dir.clone().or_else(|| self.theme_dir.clone()),
            mode: other.mode.or(self.mode),
        }
    }

    pub fn highlight_source(&self) -> HighlightSource {
        HighlightSource {
            syntax_dir: self.syntax_dir.clone(),
            theme_dir: self.theme_dir.clone(),
        }
    }
}

pub fn global_config_path() -> PathBuf {
    #[cfg(target_os = "windows")]
    {
        if let Some(appdata) = std::env::var_os("APPDATA") {
            return PathBuf::from(appdata).join(APP_DIR).join("config");
        }
    }

    #[cfg(target_os = "macos")]
    {
        if let Some(home) = std::env::var_os("HOME") {
            return PathBuf::from(home)
                .join("Library")
                .join("Application Support")
                .join(APP_DIR)
                .join("config");
        }
    }

    #[cfg(not(any(target_os = "windows", target_os = "macos")))]
    {
        if let Some(xdg) = std::env::var_os("XDG_CONFIG_HOME") {
            return PathBuf::from(xdg).join(APP_DIR).join("config");
        }
        if let Some(home) = std::env::var_os("HOME") {
            return PathBuf::from(home).join(".config").join(APP_DIR).join("config");
        }
    }

    PathBuf::from(RC_FILE)
}

pub fn local_override_path() -> PathBuf {
    PathBuf::from(RC_FILE)
}

/// Split one config line into flag tokens.
fn line_tokens(line: &str) -> Vec<String> {
    if line.starts_with("--") && line.contains('=') {
        vec![line.to_owned()]
    } else {
        line.split_whitespace().map(ToOwned::to_owned).collect()
    }
}

pub fn load_config_flags(path: &Path) -> Result<ConfigFlags> {
    if !path.exists() {
        return Ok(ConfigFlags::default());
    }
    let content = fs::read_to_string(path)
        .with_context(|| format!("Failed to read config {}", path.display()))?;
    let tokens = content
        .lines()
        .map(str::trim)
        .filter(|line| !line.is_empty() && !line.starts_with('#'))
        .flat_map(line_tokens)
        .collect::<Vec<_>>();
    Ok(parse_flag_tokens(&tokens))
}

pub fn save_config_flags(path: &Path, flags: &ConfigFlags) -> Result<()> {
    let mut lines = Vec::new();
    lines.push("# clozewright defaults (saved with --save)".to_string());
    if flags.watch {
        lines.push("--watch".to_string());
    }
    if flags.no_highlight {
        lines.push("--no-highlight".to_string());
    }
    if let Some(theme) = &flags.theme {
        lines.push(format!("--theme={theme}"));
    }
    if let Some(dir) = &flags.syntax_dir {
        lines.push(format!("--syntax-dir={}", dir.display()));
    }
    if let Some(dir) = &flags.theme_dir {
        lines.push(format!("--theme-dir={}", dir.display()));
    }
    if let Some(mode) = flags.mode {
        lines.push(format!("--mode {}", mode.as_str()));
    }
    if let Some(parent) = path.parent().filter(|parent| !parent.as_os_str().is_empty()) {
        fs::create_dir_all(parent)
            .with_context(|| format!("Failed to create config dir {}", parent.display()))?;
    }
    fs::write(path, format!("{}\n", lines.join("\n")))
        .with_context(|| format!("Failed to write config {}", path.display()))
}

pub fn clear_config_flags(path: &Path) -> Result<()> {
    if path.exists() {
        fs::remove_file(path).with_context(|| format!("Failed to remove {}", path.display()))?;
    }
    Ok(())
}

/// Pick out the flags we persist from a list of CLI tokens. Anything else is
/// ignored.
pub fn parse_flag_tokens(tokens: &[String]) -> ConfigFlags {
    let mut flags = ConfigFlags::default();
    let mut i = 0;
    while i < tokens.len() {
        let token = tokens[i].as_str();
        let next = tokens.get(i + 1);
        match token {
            "--watch" => flags.watch = true,
            "--no-highlight" => flags.no_highlight = true,
            "--theme" | "--syntax-dir" | "--theme-dir" | "--mode" if next.is_some() => {
                if let Some(value) = next {
                    apply_option(&mut flags, token, value);
                }
                i += 1;
            }
            _ => {
                if let Some((name, value)) = token.split_once('=') {
                    apply_option(&mut flags, name, value);
                }
            }
        }
        i += 1;
    }
    flags
}

fn apply_option(flags: &mut ConfigFlags, name: &str, value: &str) {
    match name {
        "--theme" => flags.theme = Some(value.to_string()),
        "--syntax-dir" => flags.syntax_dir = Some(PathBuf::from(value)),
        "--theme-dir" => flags.theme_dir = Some(PathBuf::from(value)),
        "--mode" => flags.mode = parse_mode(value),
        _ => {}
    }
}

fn parse_mode(s: &str) -> Option<ViewMode> {
    match s {
        "output" => Some(ViewMode::Output),
        "edit" => Some(ViewMode::Edit),
        "hidden" => Some(ViewMode::Hidden),
        "revealed" => Some(ViewMode::Revealed),
        _ => None,
    }
}
