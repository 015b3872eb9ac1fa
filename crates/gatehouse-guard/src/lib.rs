//! # gatehouse-guard
//!
//! Page-level redirect guards driven by the session store.
//!
//! Each page declares a [`PageIntent`]. [`decide`] turns an intent and a
//! session snapshot into an optional [`Redirect`]; [`RedirectGuard`] mounts a
//! background task that re-evaluates on every session change and calls a
//! [`Navigator`] at most once per settled state.
//!
//! Nothing redirects while the session is loading.

mod guard;
mod navigator;

pub use guard::{
    GuardConfig, PageIntent, PageRender, Redirect, RedirectGuard, RedirectLatch, decide,
    render_state,
};
pub use navigator::{Navigator, RecordingNavigator};
