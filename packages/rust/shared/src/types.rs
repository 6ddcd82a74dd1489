//! Outline types: the ordered chapter/section list that drives a build.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use url::Url;

use crate::error::{HandbookError, Result};

// ---------------------------------------------------------------------------
// ContentSelector
// ---------------------------------------------------------------------------

/// Which subtree of a fetched page gets rendered.
///
/// Written in config as `"tag.class"` (first element with that tag carrying
/// that class) or `"*"` (every child of `<body>`).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub enum ContentSelector {
    /// First element named `tag` whose class list contains `class`.
    Class { tag: String, class: String },
    /// Take all children verbatim.
    AllChildren,
}

impl ContentSelector {
    /// Shorthand for [`ContentSelector::Class`].
    pub fn class(tag: impl Into<String>, class: impl Into<String>) -> Self {
        Self::Class {
            tag: tag.into(),
            class: class.into(),
        }
    }
}

impl Default for ContentSelector {
    /// Drupal field wrapper used by the handbook site.
    fn default() -> Self {
        Self::class("div", "field")
    }
}

impl fmt::Display for ContentSelector {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Class { tag, class } => write!(f, "{tag}.{class}"),
            Self::AllChildren => f.write_str("*"),
        }
    }
}

impl FromStr for ContentSelector {
    type Err = HandbookError;

    fn from_str(s: &str) -> Result<Self> {
        let s = s.trim();
        if s == "*" {
            return Ok(Self::AllChildren);
        }

        let valid = |part: &str| {
            !part.is_empty()
                && part
                    .chars()
                    .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_')
        };

        match s.split_once('.') {
            Some((tag, class)) if valid(tag) && valid(class) => {
                Ok(Self::class(tag.to_ascii_lowercase(), class))
            }
            _ => Err(HandbookError::config(format!(
                "invalid selector '{s}': expected 'tag.class' or '*'"
            ))),
        }
    }
}

impl TryFrom<String> for ContentSelector {
    type Error = HandbookError;

    fn try_from(value: String) -> Result<Self> {
        value.parse()
    }
}

impl From<ContentSelector> for String {
    fn from(value: ContentSelector) -> Self {
        value.to_string()
    }
}

// ---------------------------------------------------------------------------
// Outline
// ---------------------------------------------------------------------------

/// One handbook section: a titled page pulled from a single URL.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Section {
    /// Section title (emitted as `\section{...}`).
    pub title: String,
    /// Page to fetch.
    pub url: Url,
    /// Subtree of the page to render.
    #[serde(default)]
    pub selector: ContentSelector,
}

/// One handbook chapter with its sections in reading order.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Chapter {
    /// Chapter title (emitted as `\chapter{...}`).
    pub title: String,
    /// Sections in reading order.
    #[serde(default)]
    pub sections: Vec<Section>,
}

/// The full ordered outline of a handbook.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Outline {
    /// Chapters in reading order.
    pub chapters: Vec<Chapter>,
}

impl Outline {
    /// Total number of sections across all chapters.
    pub fn section_count(&self) -> usize {
        self.chapters.iter().map(|c| c.sections.len()).sum()
    }
}
