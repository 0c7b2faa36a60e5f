//! Player intents.
//!
//! This module defines the [`Intent`] enum, which abstracts the game's commands away from physical
//! keys, and [`IntentSet`], the per-tick snapshot the input layer fills and the session drains.

use std::collections::HashSet;

/// Every command the core understands.
///
/// The four directional intents are held states: they stay asserted until released. The remaining
/// two are one-shot commands that are consumed by the next tick.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Intent {
    /// Move along the current heading.
    Advance,
    /// Move against the current heading.
    Retreat,
    /// Rotate the heading counter-clockwise.
    TurnLeft,
    /// Rotate the heading clockwise.
    TurnRight,
    /// Show or hide the minimap.
    ToggleMinimap,
    /// Hide the completion overlay.
    DismissOverlay,
}

impl Intent {
    /// Returns whether this intent is a held directional intent rather than a one-shot command.
    #[must_use]
    pub const fn is_directional(self) -> bool {
        matches!(
            self,
            Self::Advance | Self::Retreat | Self::TurnLeft | Self::TurnRight
        )
    }
}

/// Snapshot of the currently asserted intents.
///
/// Directional intents are tracked as a set of held keys. One-shot commands are queued in arrival
/// order and removed by [`IntentSet::drain_commands`].
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct IntentSet {
    /// Directional intents currently held.
    held: HashSet<Intent>,
    /// One-shot commands waiting for the next tick.
    commands: Vec<Intent>,
}

impl IntentSet {
    /// Creates an empty intent set.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Asserts an intent.
    ///
    /// Directional intents become held until [`IntentSet::release`] is called for them; commands
    /// are queued for the next tick.
    pub fn assert(&mut self, intent: Intent) {
        if intent.is_directional() {
            let _ = self.held.insert(intent);
        } else {
            self.commands.push(intent);
        }
    }

    /// Releases a held directional intent. Releasing a command or an intent not held does nothing.
    pub fn release(&mut self, intent: Intent) {
        let _ = self.held.remove(&intent);
    }

    /// Releases every held directional intent and drops pending commands.
    pub fn clear(&mut self) {
        self.held.clear();
        self.commands.clear();
    }

    /// Returns whether the directional intent is currently held.
    #[must_use]
    pub fn is_active(&self, intent: Intent) -> bool {
        self.held.contains(&intent)
    }

    /// Removes and returns the queued one-shot commands in arrival order.
    pub fn drain_commands(&mut self) -> Vec<Intent> {
        std::mem::take(&mut self.commands)
    }
}

impl FromIterator<Intent> for IntentSet {
    fn from_iter<T: IntoIterator<Item = Intent>>(iter: T) -> Self {
        let mut set = Self::new();
        for intent in iter {
            set.assert(intent);
        }
        set
    }
}
