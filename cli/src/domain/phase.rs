//! Build and deploy progress markers.
//!
//! The orchestrator records the last phase it completed, so a failed run
//! can report exactly how far it got.

use std::fmt;

/// Steps of the build hook, in order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Default)]
pub enum BuildPhase {
    #[default]
    NotStarted,
    StagingCleared,
    Compiled,
    Quarantined,
}

/// Steps of the deploy hook, in order. `Installed` and `Updated` are
/// alternatives; both rank below `ModeSet`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum DeployPhase {
    #[default]
    NotStarted,
    Initialized,
    Restored,
    Installed,
    Updated,
    ModeSet,
    StaticDeployed,
}

impl DeployPhase {
    /// Whether moving from `self` to `next` is a legal step.
    #[must_use]
    pub fn can_advance_to(self, next: Self) -> bool {
        use DeployPhase::{
            Initialized, Installed, ModeSet, NotStarted, Restored, StaticDeployed, Updated,
        };
        matches!(
            (self, next),
            (NotStarted, Initialized)
                | (Initialized, Restored)
                | (Restored, Installed | Updated)
                | (Installed | Updated, ModeSet)
                | (ModeSet, StaticDeployed)
        )
    }
}

impl BuildPhase {
    #[must_use]
    pub fn can_advance_to(self, next: Self) -> bool {
        use BuildPhase::{Compiled, NotStarted, Quarantined, StagingCleared};
        matches!(
            (self, next),
            (NotStarted, StagingCleared) | (StagingCleared, Compiled) | (Compiled, Quarantined)
        )
    }
}

impl fmt::Display for BuildPhase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::NotStarted => "not started",
            Self::StagingCleared => "staging cleared",
            Self::Compiled => "compiled",
            Self::Quarantined => "quarantined",
        })
    }
}

impl fmt::Display for DeployPhase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::NotStarted => "not started",
            Self::Initialized => "initialized",
            Self::Restored => "restored",
            Self::Installed => "installed",
            Self::Updated => "updated",
            Self::ModeSet => "mode set",
            Self::StaticDeployed => "static content deployed",
        })
    }
}
