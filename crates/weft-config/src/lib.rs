use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use thiserror::Error;
use weft_extensions::{DiffOptions, FocusMode, FocusOptions, Placeholder, PlaceholderOptions};
use weft_gapcursor::{ClickPolicy, GapCursorPlugin};

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config file at {config_path}: {source}")]
    ConfigReadError {
        config_path: PathBuf,
        source: std::io::Error,
    },

    #[error("Failed to parse config file at {config_path}: {source}")]
    ConfigParseError {
        config_path: PathBuf,
        source: toml::de::Error,
    },
}

/// Editor extension settings. Every section and field is optional in the
/// file; missing ones take the extension defaults.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub focus: FocusSection,
    pub diff: DiffSection,
    pub placeholder: PlaceholderSection,
    pub gap_cursor: GapCursorSection,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct FocusSection {
    pub class_name: String,
    pub mode: FocusMode,
}

impl Default for FocusSection {
    fn default() -> Self {
        let options = FocusOptions::default();
        Self {
            class_name: options.class_name,
            mode: options.mode,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct DiffSection {
    pub class_name: String,
    pub mode: FocusMode,
    pub attributes: BTreeMap<String, String>,
}

impl Default for DiffSection {
    fn default() -> Self {
        let options = DiffOptions::default();
        Self {
            class_name: options.class_name,
            mode: options.mode,
            attributes: options.attributes,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct PlaceholderSection {
    pub empty_editor_class: String,
    pub empty_node_class: String,
    pub text: String,
    pub show_only_when_editable: bool,
    pub show_only_current: bool,
    pub include_children: bool,
}

impl Default for PlaceholderSection {
    fn default() -> Self {
        let options = PlaceholderOptions::default();
        let text = match options.placeholder {
            Placeholder::Text(text) => text,
            Placeholder::Dynamic(_) => String::new(),
        };
        Self {
            empty_editor_class: options.empty_editor_class,
            empty_node_class: options.empty_node_class,
            text,
            show_only_when_editable: options.show_only_when_editable,
            show_only_current: options.show_only_current,
            include_children: options.include_children,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct GapCursorSection {
    pub click: ClickPolicy,
}

impl Config {
    pub fn load_from_path<P: AsRef<Path>>(config_path: P) -> Result<Option<Self>, ConfigError> {
        let config_path = config_path.as_ref();
        if !config_path.exists() {
            return Ok(None);
        }

        let content = std::fs::read_to_string(config_path).map_err(|source| {
            ConfigError::ConfigReadError {
                config_path: config_path.to_path_buf(),
                source,
            }
        })?;

        let config: Config =
            toml::from_str(&content).map_err(|source| ConfigError::ConfigParseError {
                config_path: config_path.to_path_buf(),
                source,
            })?;
        log::debug!("loaded config from {}", config_path.display());

        Ok(Some(config))
    }

    pub fn load() -> Result<Option<Self>, ConfigError> {
        let config_path = Self::config_path();
        Self::load_from_path(&config_path)
    }

    pub fn save_to_path<P: AsRef<Path>>(&self, config_path: P) -> anyhow::Result<()> {
        let config_path = config_path.as_ref();
        if let Some(parent) = config_path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let content = toml::to_string_pretty(self)?;
        std::fs::write(config_path, content)?;
        Ok(())
    }

    pub fn save(&self) -> anyhow::Result<()> {
        let config_path = Self::config_path();
        self.save_to_path(&config_path)
    }

    pub fn config_path() -> PathBuf {
        let config_dir = shellexpand::tilde("~/.config/weft");
        PathBuf::from(config_dir.as_ref()).join("config.toml")
    }

    /// Expand `~` and environment variables in a user-supplied path.
    pub fn expand_path(path: &Path) -> Option<PathBuf> {
        let path_str = path.to_string_lossy();
        match shellexpand::full(&path_str) {
            Ok(expanded) => Some(PathBuf::from(expanded.as_ref())),
            Err(_) => None,
        }
    }

    pub fn focus_options(&self) -> FocusOptions {
        FocusOptions {
            class_name: self.focus.class_name.clone(),
            mode: self.focus.mode,
        }
    }

    pub fn diff_options(&self) -> DiffOptions {
        DiffOptions {
            class_name: self.diff.class_name.clone(),
            mode: self.diff.mode,
            attributes: self.diff.attributes.clone(),
        }
    }

    pub fn placeholder_options(&self) -> PlaceholderOptions {
        let section = &self.placeholder;
        PlaceholderOptions {
            empty_editor_class: section.empty_editor_class.clone(),
            empty_node_class: section.empty_node_class.clone(),
            placeholder: Placeholder::Text(section.text.clone()),
            show_only_when_editable: section.show_only_when_editable,
            show_only_current: section.show_only_current,
            include_children: section.include_children,
        }
    }

    pub fn gap_cursor_plugin(&self) -> GapCursorPlugin {
        GapCursorPlugin::new(self.gap_cursor.click)
    }
}
