//! View state machine
//!
//! Tracks which face of the picker the user is looking at. Only the edges
//! below exist; any other (state, trigger) pair is a no-op that keeps the
//! current state. The machine is pure: no clocks, no I/O, no knowledge of
//! cameras or queries.
//!
//! ```text
//!                PanStarted
//!       ┌──────────────────────────┐
//!       ▼                          │
//!  ┌─────────┐   PanSettled   ┌─────────┐
//!  │ Panning │ ─────────────► │ Preview │ ◄── initial
//!  └─────────┘                └─────────┘
//!       ▲                       │     ▲
//!       │          SearchOpened │     │ CandidateChosen
//!       │ PanStarted            ▼     │ SearchClosed
//!       │                    ┌────────┐
//!       └────────────────────│ Search │
//!                            └────────┘
//! ```
//!
//! `Search --PanStarted--> Panning` is deliberate: dragging the map while
//! the search sheet is open dismisses the search, because candidates from
//! a stale viewport would otherwise linger on screen. The orchestrator
//! clears the query and candidate list when it observes that edge.

use std::fmt;

use serde::{Deserialize, Serialize};
use tracing::debug;

/// Which face of the picker is active.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ViewState {
    /// The map is moving under the pin; the address display is stale.
    Panning,
    /// The pin is at rest and its address is shown (or resolving).
    Preview,
    /// The free-text search sheet is open.
    Search,
}

impl fmt::Display for ViewState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ViewState::Panning => write!(f, "panning"),
            ViewState::Preview => write!(f, "preview"),
            ViewState::Search => write!(f, "search"),
        }
    }
}

/// Inputs that can move the view state machine.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ViewTrigger {
    /// A user camera move began.
    PanStarted,
    /// The debounced camera settle was accepted.
    PanSettled,
    /// The user opened the search sheet.
    SearchOpened,
    /// The user dismissed the search sheet without choosing.
    SearchClosed,
    /// A search candidate was picked.
    CandidateChosen,
}

/// The outcome of applying a trigger.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Transition {
    pub from: ViewState,
    pub to: ViewState,
}

impl Transition {
    /// True if the trigger actually moved the machine.
    pub fn changed(&self) -> bool {
        self.from != self.to
    }

    /// True if this is the search-dismissed-by-panning edge.
    pub fn dismissed_search(&self) -> bool {
        self.from == ViewState::Search && self.to == ViewState::Panning
    }
}

/// The picker's view state machine. Starts in [`ViewState::Preview`].
#[derive(Debug)]
pub struct ViewStateMachine {
    state: ViewState,
}

impl ViewStateMachine {
    pub fn new() -> Self {
        Self {
            state: ViewState::Preview,
        }
    }

    /// The current state.
    pub fn state(&self) -> ViewState {
        self.state
    }

    /// Applies a trigger, returning the (possibly unchanged) transition.
    pub fn apply(&mut self, trigger: ViewTrigger) -> Transition {
        use ViewState::*;
        use ViewTrigger::*;

        let from = self.state;
        let to = match (from, trigger) {
            (Preview, PanStarted) => Panning,
            (Panning, PanSettled) => Preview,
            (Preview, SearchOpened) => Search,
            (Search, CandidateChosen) => Preview,
            (Search, SearchClosed) => Preview,
            (Search, PanStarted) => Panning,
            // Undefined edge: stay put
            _ => from,
        };

        if to != from {
            debug!(%from, %to, ?trigger, "view transition");
            self.state = to;
        }

        Transition { from, to }
    }
}

impl Default for ViewStateMachine {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_initial_state_is_preview() {
        let machine = ViewStateMachine::new();
        assert_eq!(machine.state(), ViewState::Preview);
    }

    #[test]
    fn test_pan_cycle() {
        let mut machine = ViewStateMachine::new();

        let t = machine.apply(ViewTrigger::PanStarted);
        assert!(t.changed());
        assert_eq!(machine.state(), ViewState::Panning);

        let t = machine.apply(ViewTrigger::PanSettled);
        assert!(t.changed());
        assert_eq!(machine.state(), ViewState::Preview);
    }

    #[test]
    fn test_search_open_and_close() {
        let mut machine = ViewStateMachine::new();

        machine.apply(ViewTrigger::SearchOpened);
        assert_eq!(machine.state(), ViewState::Search);

        machine.apply(ViewTrigger::SearchClosed);
        assert_eq!(machine.state(), ViewState::Preview);
    }

    #[test]
    fn test_candidate_chosen_returns_to_preview() {
        let mut machine = ViewStateMachine::new();

        machine.apply(ViewTrigger::SearchOpened);
        let t = machine.apply(ViewTrigger::CandidateChosen);
        assert!(t.changed());
        assert_eq!(t.to, ViewState::Preview);
    }

    #[test]
    fn test_panning_dismisses_search() {
        let mut machine = ViewStateMachine::new();

        machine.apply(ViewTrigger::SearchOpened);
        let t = machine.apply(ViewTrigger::PanStarted);

        assert_eq!(machine.state(), ViewState::Panning);
        assert!(t.dismissed_search(), "Search -> Panning is the dismissal edge");
    }

    #[test]
    fn test_undefined_edges_are_noops() {
        let mut machine = ViewStateMachine::new();

        // PanSettled without PanStarted
        let t = machine.apply(ViewTrigger::PanSettled);
        assert!(!t.changed());
        assert_eq!(machine.state(), ViewState::Preview);

        // SearchOpened while panning
        machine.apply(ViewTrigger::PanStarted);
        let t = machine.apply(ViewTrigger::SearchOpened);
        assert!(!t.changed());
        assert_eq!(machine.state(), ViewState::Panning);

        // CandidateChosen outside search
        machine.apply(ViewTrigger::PanSettled);
        let t = machine.apply(ViewTrigger::CandidateChosen);
        assert!(!t.changed());
        assert_eq!(machine.state(), ViewState::Preview);
    }

    #[test]
    fn test_repeated_pan_started_is_noop() {
        let mut machine = ViewStateMachine::new();

        machine.apply(ViewTrigger::PanStarted);
        let t = machine.apply(ViewTrigger::PanStarted);
        assert!(!t.changed());
        assert_eq!(machine.state(), ViewState::Panning);
    }

    #[test]
    fn test_full_session_walk() {
        let mut machine = ViewStateMachine::new();

        // Pan, settle, search, dismiss by panning, settle again
        machine.apply(ViewTrigger::PanStarted);
        machine.apply(ViewTrigger::PanSettled);
        machine.apply(ViewTrigger::SearchOpened);
        let dismissed = machine.apply(ViewTrigger::PanStarted);
        assert!(dismissed.dismissed_search());
        machine.apply(ViewTrigger::PanSettled);

        assert_eq!(machine.state(), ViewState::Preview);
    }

    #[test]
    fn test_view_state_display() {
        assert_eq!(format!("{}", ViewState::Panning), "panning");
        assert_eq!(format!("{}", ViewState::Preview), "preview");
        assert_eq!(format!("{}", ViewState::Search), "search");
    }
}
