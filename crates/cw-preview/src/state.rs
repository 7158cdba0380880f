//! Observable preview state.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Whether the host is still loading the latest document.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum PreviewState {
    /// A document was assigned and the host has not reported completion.
    #[default]
    Loading,
    /// The host finished loading the current document.
    Ready,
}

impl PreviewState {
    /// Check if the preview is loading.
    #[must_use]
    pub fn is_loading(self) -> bool {
        self == Self::Loading
    }
}

impl fmt::Display for PreviewState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Loading => f.write_str("loading"),
            Self::Ready => f.write_str("ready"),
        }
    }
}

/// Identifies one content assignment to the render host.
///
/// Every rebuild and every refresh assigns a new generation. Generation `0`
/// is never assigned.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Generation(u64);

impl Generation {
    /// Wrap a raw generation number received from a host.
    #[must_use]
    pub const fn new(value: u64) -> Self {
        Self(value)
    }

    /// Raw generation number.
    #[must_use]
    pub const fn get(self) -> u64 {
        self.0
    }

    /// The generation following this one.
    #[must_use]
    pub(crate) const fn next(self) -> Self {
        Self(self.0 + 1)
    }
}

impl fmt::Display for Generation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Snapshot published to state observers.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize)]
pub struct PreviewStatus {
    /// Current state.
    pub state: PreviewState,
    /// Generation the state refers to.
    pub generation: Generation,
}
