//! Pure ownership state machine.
//!
//! Holds the single PiP owner and the last-active-tab hint. Every method
//! is synchronous and side-effect free; the coordinator persists and
//! publishes whatever [`Transition`] comes back.

use pip_common::TabId;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum PipState {
    #[default]
    Idle,
    Owned(TabId),
}

impl PipState {
    pub fn owner(&self) -> Option<TabId> {
        match self {
            PipState::Idle => None,
            PipState::Owned(tab) => Some(*tab),
        }
    }
}

/// A state change. Only produced when `from != to`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Transition {
    pub from: PipState,
    pub to: PipState,
}

#[derive(Debug, Default)]
pub struct OwnershipMachine {
    state: PipState,
    /// Tab that last reported playback while in the foreground.
    hint: Option<TabId>,
}

impl OwnershipMachine {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn state(&self) -> PipState {
        self.state
    }

    pub fn owner(&self) -> Option<TabId> {
        self.state.owner()
    }

    pub fn hint(&self) -> Option<TabId> {
        self.hint
    }

    fn move_to(&mut self, to: PipState) -> Option<Transition> {
        let from = self.state;
        if from == to {
            return None;
        }
        self.state = to;
        Some(Transition { from, to })
    }

    /// PiP entered in `tab`, by report or by a successful activation.
    /// Always wins over the current state.
    pub fn entered(&mut self, tab: TabId) -> Option<Transition> {
        self.move_to(PipState::Owned(tab))
    }

    /// Exit reported by `tab`. Ignored unless `tab` is the owner.
    pub fn exited(&mut self, tab: TabId) -> Option<Transition> {
        if self.owner() != Some(tab) {
            return None;
        }
        self.move_to(PipState::Idle)
    }

    /// The tab is gone. Clears ownership and the hint if they name it.
    pub fn tab_closed(&mut self, tab: TabId) -> Option<Transition> {
        self.forget_hint(tab);
        self.exited(tab)
    }

    /// The tab started a top-level navigation; its page and PiP are gone.
    pub fn tab_navigated(&mut self, tab: TabId) -> Option<Transition> {
        self.tab_closed(tab)
    }

    /// Returns `true` if the hint changed.
    pub fn video_playing(&mut self, tab: TabId, foreground: bool) -> bool {
        if !foreground || self.hint == Some(tab) {
            return false;
        }
        self.hint = Some(tab);
        true
    }

    /// Returns `true` if the hint changed.
    pub fn video_paused(&mut self, tab: TabId, foreground: bool) -> bool {
        foreground && self.forget_hint(tab)
    }

    /// Drop the hint if it names `tab`. Returns `true` if it did.
    pub fn forget_hint(&mut self, tab: TabId) -> bool {
        if self.hint == Some(tab) {
            self.hint = None;
            return true;
        }
        false
    }

    /// Returns `true` if there was a hint.
    pub fn clear_hint(&mut self) -> bool {
        self.hint.take().is_some()
    }
}
