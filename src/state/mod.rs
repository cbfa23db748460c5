//! View-state controllers and the observable container they publish through.
//!
//! Every controller owns exactly one [`StateFlow`] holding its current view
//! state. The presentation layer reads the current value or subscribes to be
//! woken on each change; it never mutates the state itself. All transitions
//! happen inside the owning controller.
mod debounce;
mod details;
mod episodes;
mod list;
mod search;

pub use debounce::Debounced;
pub use details::{CharacterDetails, CharacterDetailsController, DataPoint};
pub use episodes::{CharacterEpisodes, CharacterEpisodesController, SeasonGroups, SeasonsController};
pub use list::{PagedList, PagedListController};
pub use search::{FilterState, SearchController, SearchResults, SearchViewState};

use tokio::sync::watch;

/// The state a screen renders from: exactly one variant is active at a time.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ViewState<T> {
    /// The first result has not arrived yet
    Loading,
    /// Loading failed; the message is meant for display
    Error(String),
    /// Data is available
    Content(T),
}

impl<T> ViewState<T> {
    pub fn is_loading(&self) -> bool {
        matches!(self, Self::Loading)
    }

    /// Returns the content payload, if any.
    pub fn content(&self) -> Option<&T> {
        match self {
            Self::Content(content) => Some(content),
            _ => None,
        }
    }

    /// Returns the error message, if any.
    pub fn error(&self) -> Option<&str> {
        match self {
            Self::Error(message) => Some(message.as_str()),
            _ => None,
        }
    }
}

/// A current-value container that pushes every assignment to its subscribers.
///
/// Late subscribers immediately observe the current value through
/// [`watch::Receiver::borrow`] and are woken by `changed()` on each later
/// assignment.
#[derive(Debug)]
pub struct StateFlow<T> {
    sender: watch::Sender<T>,
}

impl<T: Clone> StateFlow<T> {
    pub fn new(initial: T) -> Self {
        let (sender, _) = watch::channel(initial);
        Self { sender }
    }

    /// Returns a snapshot of the current value.
    pub fn value(&self) -> T {
        self.sender.borrow().clone()
    }

    /// Runs `f` against the current value without cloning it.
    pub fn with<R>(&self, f: impl FnOnce(&T) -> R) -> R {
        f(&self.sender.borrow())
    }

    /// Returns a receiver replaying the current value and all later ones.
    pub fn subscribe(&self) -> watch::Receiver<T> {
        self.sender.subscribe()
    }

    pub(crate) fn set(&self, value: T) {
        self.sender.send_replace(value);
    }

    /// Applies an in-place transition and notifies subscribers.
    pub(crate) fn update<F>(&self, transition: F)
    where
        F: FnOnce(&mut T),
    {
        self.sender.send_modify(transition);
    }

    /// Applies a transition that may leave the value untouched.
    ///
    /// Subscribers are only woken when `transition` returns true.
    pub(crate) fn update_if<F>(&self, transition: F) -> bool
    where
        F: FnOnce(&mut T) -> bool,
    {
        self.sender.send_if_modified(transition)
    }
}
