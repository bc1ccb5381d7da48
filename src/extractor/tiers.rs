//! The fixed set of extraction strategies and their order.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::options::Options;

/// One ranked strategy in the extraction cascade.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Tier {
    /// Site-specific selectors from the adapter registry.
    AdapterMatch,
    /// The user's explicit text selection.
    UserSelection,
    /// The page's own copy/export control, read back from the clipboard.
    CopyAffordance,
    /// Generic content containers (`article`, `main`, ...).
    DeepTarget,
    /// Chat/app containers, after expanding collapsed content.
    ContainerDrill,
    /// Visible, non-noise text nodes under `<body>`.
    StructuralWalk,
    /// The body with noise removed. Cannot fail.
    FullBody,
}

impl Tier {
    /// Full cascade, in priority order.
    pub const CASCADE: [Self; 7] = [
        Self::AdapterMatch,
        Self::UserSelection,
        Self::CopyAffordance,
        Self::DeepTarget,
        Self::ContainerDrill,
        Self::StructuralWalk,
        Self::FullBody,
    ];

    /// Tiers used for summaries: visible markup only, no selection and no
    /// clipboard exports.
    pub const SUMMARY: [Self; 5] = [
        Self::AdapterMatch,
        Self::DeepTarget,
        Self::ContainerDrill,
        Self::StructuralWalk,
        Self::FullBody,
    ];

    /// 1-based priority; lower wins.
    #[must_use]
    pub const fn rank(self) -> u8 {
        match self {
            Self::AdapterMatch => 1,
            Self::UserSelection => 2,
            Self::CopyAffordance => 3,
            Self::DeepTarget => 4,
            Self::ContainerDrill => 5,
            Self::StructuralWalk => 6,
            Self::FullBody => 7,
        }
    }

    /// Content must be strictly longer than this many characters for the
    /// tier to win. `None` means no threshold.
    #[must_use]
    pub fn min_chars(self, options: &Options) -> Option<usize> {
        match self {
            Self::AdapterMatch | Self::FullBody => None,
            Self::UserSelection => Some(options.selection_min_chars),
            Self::CopyAffordance => Some(options.copy_min_chars),
            Self::DeepTarget => Some(options.deep_target_min_chars),
            Self::ContainerDrill => Some(options.container_min_chars),
            Self::StructuralWalk => Some(options.walk_min_chars),
        }
    }

    /// Whether running the tier clicks things on the page.
    #[must_use]
    pub const fn has_side_effects(self) -> bool {
        matches!(self, Self::CopyAffordance | Self::ContainerDrill)
    }

    /// Whether the tier yields to the event loop (settle delay, clipboard).
    #[must_use]
    pub const fn suspends(self) -> bool {
        matches!(self, Self::CopyAffordance)
    }

    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::AdapterMatch => "adapter-match",
            Self::UserSelection => "user-selection",
            Self::CopyAffordance => "copy-affordance",
            Self::DeepTarget => "deep-target",
            Self::ContainerDrill => "container-drill",
            Self::StructuralWalk => "structural-walk",
            Self::FullBody => "full-body",
        }
    }
}

impl fmt::Display for Tier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cascade_is_ranked() {
        let ranks: Vec<u8> = Tier::CASCADE.iter().map(|t| t.rank()).collect();
        assert_eq!(ranks, vec![1, 2, 3, 4, 5, 6, 7]);
    }

    #[test]
    fn test_summary_skips_selection_and_clipboard() {
        assert!(!Tier::SUMMARY.contains(&Tier::UserSelection));
        assert!(!Tier::SUMMARY.contains(&Tier::CopyAffordance));
        assert_eq!(Tier::SUMMARY.last(), Some(&Tier::FullBody));
    }

    #[test]
    fn test_thresholds_follow_options() {
        let options = Options::default();
        assert_eq!(Tier::AdapterMatch.min_chars(&options), None);
        assert_eq!(Tier::UserSelection.min_chars(&options), Some(10));
        assert_eq!(Tier::ContainerDrill.min_chars(&options), Some(100));
        assert_eq!(Tier::FullBody.min_chars(&options), None);
    }

    #[test]
    fn test_only_copy_affordance_suspends() {
        let suspending: Vec<Tier> = Tier::CASCADE.into_iter().filter(|t| t.suspends()).collect();
        assert_eq!(suspending, vec![Tier::CopyAffordance]);
        assert!(Tier::ContainerDrill.has_side_effects());
        assert!(!Tier::StructuralWalk.has_side_effects());
    }
}
