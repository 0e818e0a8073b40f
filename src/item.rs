use std::str::FromStr;

use serde::Serialize;

/// One entry in a truncatable list. `content` is whatever the host renders;
/// the engine only looks at `key` and `is_anchor`.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DisplayItem<C> {
    pub key: String,
    pub content: C,
    pub is_anchor: bool,
}

impl<C> DisplayItem<C> {
    pub fn new(key: impl Into<String>, content: C) -> Self {
        Self {
            key: key.into(),
            content,
            is_anchor: false,
        }
    }

    pub fn anchored(mut self) -> Self {
        self.is_anchor = true;
        self
    }
}

impl DisplayItem<String> {
    /// Item whose content is its own key, the common case for breadcrumbs.
    pub fn labelled(key: impl Into<String>) -> Self {
        let key = key.into();
        Self::new(key.clone(), key)
    }
}

pub(crate) fn same_identity<C>(left: &[DisplayItem<C>], right: &[DisplayItem<C>]) -> bool {
    left.len() == right.len()
        && left
            .iter()
            .zip(right)
            .all(|(one, two)| one.key == two.key && one.is_anchor == two.is_anchor)
}

#[derive(Debug, thiserror::Error, PartialEq)]
pub enum ItemSpecError {
    #[error("item spec `{0}` must look like KEY=WIDTH")]
    MissingSeparator(String),

    #[error("item spec `{0}` has an empty key")]
    EmptyKey(String),

    #[error("item `{key}` has invalid width `{raw}`")]
    InvalidWidth { key: String, raw: String },
}

/// `KEY=WIDTH` pair used by the CLI to describe a pre-measured legend entry.
#[derive(Debug, Clone, PartialEq)]
pub struct MeasuredItemSpec {
    pub key: String,
    pub width: f32,
}

impl FromStr for MeasuredItemSpec {
    type Err = ItemSpecError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        let Some((key, raw_width)) = value.split_once('=') else {
            return Err(ItemSpecError::MissingSeparator(value.to_owned()));
        };
        let key = key.trim();
        if key.is_empty() {
            return Err(ItemSpecError::EmptyKey(value.to_owned()));
        }

        let raw_width = raw_width.trim();
        let width = raw_width
            .parse::<f32>()
            .ok()
            .filter(|width| width.is_finite() && *width >= 0.0)
            .ok_or_else(|| ItemSpecError::InvalidWidth {
                key: key.to_owned(),
                raw: raw_width.to_owned(),
            })?;

        Ok(Self {
            key: key.to_owned(),
            width,
        })
    }
}
