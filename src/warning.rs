use std::fmt;

use serde::Serialize;

/// A problem that was recovered locally. The export still completes.
#[derive(Clone, Debug, PartialEq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum LayoutWarning {
    /// A block taller than a page's content area was split or allowed to run
    /// past the bottom margin.
    OversizedBlock {
        block: usize,
        height: f32,
        available: f32,
    },
    PhotoUnavailable {
        reason: String,
    },
    UnknownSkillSection {
        id: String,
    },
    /// Characters the active font cannot draw were replaced.
    Transliterated {
        original: String,
        replacement: String,
    },
}

impl LayoutWarning {
    pub(crate) fn log(&self) {
        log::warn!("{self}");
    }
}

impl fmt::Display for LayoutWarning {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LayoutWarning::OversizedBlock {
                block,
                height,
                available,
            } => write!(
                f,
                "block {block} is {height:.1}pt tall but a page holds {available:.1}pt; split across pages"
            ),
            LayoutWarning::PhotoUnavailable { reason } => {
                write!(f, "photo omitted: {reason}")
            }
            LayoutWarning::UnknownSkillSection { id } => {
                write!(f, "skills order references missing section {id:?}")
            }
            LayoutWarning::Transliterated {
                original,
                replacement,
            } => write!(f, "font cannot draw {original:?}; drawn as {replacement:?}"),
        }
    }
}
