use std::path::PathBuf;

use anyhow::Result;
use crossterm::style::Stylize;
use figment::{
    providers::{Env, Format, Serialized, Toml},
    Figment,
};
use serde::{Deserialize, Serialize};

use crate::{default_colors::*, store::DEFAULT_TOP_COUNT};

pub const CONFIG_FILE: &str = "libris.toml";
pub const ENV_PREFIX: &str = "LIBRIS_";

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StyleConfig {
    bold:   bool,
    italic: bool,
    color:  crossterm::style::Color,
}

impl StyleConfig {
    fn style(&self, s: impl ToString) -> String {
        let mut s = s.to_string().with(self.color);
        if self.bold {
            s = s.bold();
        }
        if self.italic {
            s = s.italic();
        }
        s.to_string()
    }
}

pub trait Styleable {
    fn style(&self, c: &StyleConfig) -> String;
}

impl<T> Styleable for T
where
    T: ToString + std::fmt::Display,
{
    fn style(&self, c: &StyleConfig) -> String {
        c.style(self)
    }
}

impl Default for StyleConfig {
    fn default() -> Self {
        Self {
            color:  COLOR_WHITE,
            bold:   false,
            italic: false,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OutputConfig {
    pub prefix:            String,
    pub suffix:            String,
    pub description:       String,
    pub separator:         String,
    pub style_prefix:      StyleConfig,
    pub style_suffix:      StyleConfig,
    pub style_description: StyleConfig,
    pub style_separator:   StyleConfig,
    pub style_content:     StyleConfig,
}

impl OutputConfig {
    pub fn format_str(&self, content: impl ToString) -> String {
        let prefix = self.prefix.style(&self.style_prefix);
        let suffix = self.suffix.style(&self.style_suffix);
        let description = self.description.style(&self.style_description);
        let content = content.to_string().style(&self.style_content);
        format!("{prefix}{description} {content}{suffix}")
    }

    pub fn format_vec<T: ToString>(&self, content: &[T]) -> String {
        let prefix = self.prefix.style(&self.style_prefix);
        let suffix = self.suffix.style(&self.style_suffix);
        let description = self.description.style(&self.style_description);
        let separator = self.separator.style(&self.style_separator);
        let mut s = format!("{prefix}{description} ");
        let mut i = content.iter().peekable();
        while let Some(x) = i.next() {
            s.push_str(&x.to_string().style(&self.style_content));
            if i.peek().is_some() {
                s.push_str(&separator);
            }
        }
        s.push_str(&suffix);
        s
    }
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            prefix:            "".into(),
            suffix:            "".into(),
            description:       "".into(),
            separator:         ", ".into(),
            style_prefix:      StyleConfig::default(),
            style_suffix:      StyleConfig::default(),
            style_description: StyleConfig {
                italic: true,
                ..StyleConfig::default()
            },
            style_separator:   StyleConfig {
                color: COLOR_DIMMED,
                ..StyleConfig::default()
            },
            style_content:     StyleConfig::default(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    pub database_location: PathBuf,
    pub api_url:           String,
    pub log_level:         String,
    pub top_count:         u32,
    pub menu_languages:    Vec<String>,
    pub output_book:       OutputConfig,
    pub output_author:     OutputConfig,
    pub output_language:   OutputConfig,
    pub output_downloads:  OutputConfig,
    pub output_born:       OutputConfig,
    pub output_died:       OutputConfig,
    pub output_books_of:   OutputConfig,
    pub output_statistics: OutputConfig,
    pub output_error:      OutputConfig,
}

impl Config {
    pub fn default_as_string() -> Result<String> {
        Ok(toml::to_string(&Self::default())?)
    }

    pub fn read_config() -> Result<Self> {
        Ok(Self::figment().extract()?)
    }

    pub fn figment() -> Figment {
        Figment::new()
            .merge(Serialized::defaults(Config::default()))
            .merge(Toml::file(CONFIG_FILE))
            .merge(Env::prefixed(ENV_PREFIX))
    }

    /// Database path with `~` and environment variables expanded.
    pub fn database_path(&self) -> Result<PathBuf> {
        Ok(shellexpand::path::full(&self.database_location)?.into_owned())
    }

    /// Whether `code` is one of the languages offered by the menu, ignoring case.
    pub fn is_menu_language(&self, code: &str) -> bool {
        self.menu_languages
            .iter()
            .any(|x| x.eq_ignore_ascii_case(code.trim()))
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            database_location: PathBuf::from("~/.local/share/libris/catalog.db"),
            api_url:           "https://gutendex.com/books/".into(),
            log_level:         "warn".into(),
            top_count:         DEFAULT_TOP_COUNT,
            menu_languages:    vec!["es".into(), "en".into(), "fr".into(), "pt".into()],
            output_book:       OutputConfig {
                description: "Title:".into(),
                style_content: StyleConfig {
                    color: COLOR_BOOK,
                    bold: true,
                    ..StyleConfig::default()
                },
                ..OutputConfig::default()
            },
            output_author:     OutputConfig {
                description: "Written by:".into(),
                separator: " and ".into(),
                style_content: StyleConfig {
                    color: COLOR_AUTHOR,
                    ..StyleConfig::default()
                },
                ..OutputConfig::default()
            },
            output_language:   OutputConfig {
                description: "Written in:".into(),
                style_content: StyleConfig {
                    color: COLOR_LANGUAGE,
                    ..StyleConfig::default()
                },
                ..OutputConfig::default()
            },
            output_downloads:  OutputConfig {
                description: "Downloads:".into(),
                style_content: StyleConfig {
                    color: COLOR_DOWNLOADS,
                    ..StyleConfig::default()
                },
                ..OutputConfig::default()
            },
            output_born:       OutputConfig {
                description: "Born:".into(),
                style_content: StyleConfig {
                    color: COLOR_YEARS,
                    ..StyleConfig::default()
                },
                ..OutputConfig::default()
            },
            output_died:       OutputConfig {
                description: "Died:".into(),
                style_content: StyleConfig {
                    color: COLOR_YEARS,
                    ..StyleConfig::default()
                },
                ..OutputConfig::default()
            },
            output_books_of:   OutputConfig {
                description: "Books:".into(),
                style_content: StyleConfig {
                    color: COLOR_BOOK,
                    ..StyleConfig::default()
                },
                ..OutputConfig::default()
            },
            output_statistics: OutputConfig {
                style_content: StyleConfig {
                    color: COLOR_STATISTICS,
                    ..StyleConfig::default()
                },
                ..OutputConfig::default()
            },
            output_error:      OutputConfig {
                description: "Error:".into(),
                style_content: StyleConfig {
                    color: COLOR_ERROR,
                    ..StyleConfig::default()
                },
                style_description: StyleConfig {
                    color: COLOR_ERROR,
                    bold: true,
                    ..StyleConfig::default()
                },
                ..OutputConfig::default()
            },
        }
    }
}
