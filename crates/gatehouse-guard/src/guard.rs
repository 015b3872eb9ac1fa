//! Redirect decisions and the reactive guard that applies them.
//!
//! The decision itself is a pure function of `(intent, session)`
//! ([`decide`]). [`RedirectLatch`] adds the "at most once per settled
//! state" rule on top, and [`RedirectGuard`] drives a latch from a
//! [`SessionView`] inside a Tokio task.

use gatehouse_session::{Session, SessionView};
use serde::{Deserialize, Serialize};
use tokio::task::JoinHandle;

use crate::Navigator;

// ---------------------------------------------------------------------------
// Configuration
// ---------------------------------------------------------------------------

/// Where guards send the user.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct GuardConfig {
    /// Destination for anonymous visitors of protected pages.
    pub login_path: String,
    /// Destination for authenticated visitors of login/register pages.
    pub landing_path: String,
}

impl Default for GuardConfig {
    fn default() -> Self {
        Self {
            login_path: "/login".to_string(),
            landing_path: "/dashboard".to_string(),
        }
    }
}

// ---------------------------------------------------------------------------
// Decision
// ---------------------------------------------------------------------------

/// What auth state a page requires.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PageIntent {
    /// Protected page: anonymous visitors go to the login page.
    RequireAuth,
    /// Login/register page: authenticated visitors go to the landing page.
    RequireAnon,
    /// Anyone may view; never redirects.
    Public,
}

/// A navigation the guard wants to perform.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Redirect {
    ToLogin,
    ToLanding,
}

impl Redirect {
    /// The configured path for this redirect.
    pub fn path<'a>(&self, config: &'a GuardConfig) -> &'a str {
        match self {
            Self::ToLogin => &config.login_path,
            Self::ToLanding => &config.landing_path,
        }
    }
}

/// Decides whether a page with `intent` must redirect given `session`.
///
/// Returns `None` while the session is loading, whatever `user` says: a
/// stale identity must not trigger a navigation.
pub fn decide(intent: PageIntent, session: &Session) -> Option<Redirect> {
    if session.is_loading {
        return None;
    }
    match (intent, session.is_authenticated()) {
        (PageIntent::RequireAnon, true) => Some(Redirect::ToLanding),
        (PageIntent::RequireAuth, false) => Some(Redirect::ToLogin),
        _ => None,
    }
}

/// What a page should render right now.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PageRender {
    /// Session still loading: render a neutral placeholder.
    Loading,
    /// A redirect is due: render nothing page-specific.
    Redirecting(Redirect),
    /// Render the page's own content.
    Content,
}

/// Chooses what a page renders, so protected or public content never
/// flashes while the session is loading or a redirect is pending.
pub fn render_state(intent: PageIntent, session: &Session) -> PageRender {
    if session.is_loading {
        return PageRender::Loading;
    }
    match decide(intent, session) {
        Some(redirect) => PageRender::Redirecting(redirect),
        None => PageRender::Content,
    }
}

// ---------------------------------------------------------------------------
// RedirectLatch
// ---------------------------------------------------------------------------

/// Applies [`decide`] at most once per settled state.
///
/// The settled state is the `is_authenticated` value of a non-loading
/// snapshot. Once the latch has fired for it, further snapshots in the same
/// state (e.g. a refresh that returns the same user) are ignored. A snapshot
/// that needs no redirect re-arms the latch.
#[derive(Debug, Clone)]
pub struct RedirectLatch {
    intent: PageIntent,
    fired_for: Option<bool>,
}

impl RedirectLatch {
    pub fn new(intent: PageIntent) -> Self {
        Self {
            intent,
            fired_for: None,
        }
    }

    pub fn intent(&self) -> PageIntent {
        self.intent
    }

    /// Returns the redirect to perform for `session`, if one is due and
    /// has not already been performed for this settled state.
    pub fn evaluate(&mut self, session: &Session) -> Option<Redirect> {
        if session.is_loading {
            return None;
        }
        let settled = session.is_authenticated();
        match decide(self.intent, session) {
            Some(_) if self.fired_for == Some(settled) => None,
            Some(redirect) => {
                self.fired_for = Some(settled);
                Some(redirect)
            }
            None => {
                self.fired_for = None;
                None
            }
        }
    }
}

// ---------------------------------------------------------------------------
// RedirectGuard
// ---------------------------------------------------------------------------

/// A mounted guard: a task that watches the session and navigates when the
/// page's intent is violated.
///
/// Unmounting (explicitly or by dropping the guard) stops the task. The task
/// also ends by itself when the session store is disposed.
#[derive(Debug)]
pub struct RedirectGuard {
    intent: PageIntent,
    task: JoinHandle<()>,
}

impl RedirectGuard {
    /// Mounts a guard for a page with `intent`.
    ///
    /// The current snapshot is evaluated immediately, then again on every
    /// session change. Must be called within a Tokio runtime.
    pub fn mount(
        intent: PageIntent,
        view: SessionView,
        navigator: impl Navigator,
        config: GuardConfig,
    ) -> Self {
        let task = tokio::spawn(watch_session(intent, view, navigator, config));
        Self { intent, task }
    }

    pub fn intent(&self) -> PageIntent {
        self.intent
    }

    /// `true` once the guard's task has stopped.
    pub fn is_finished(&self) -> bool {
        self.task.is_finished()
    }

    /// Stops the guard.
    pub fn unmount(self) {
        // Drop does the work.
    }
}

impl Drop for RedirectGuard {
    fn drop(&mut self) {
        self.task.abort();
    }
}

async fn watch_session(
    intent: PageIntent,
    mut view: SessionView,
    navigator: impl Navigator,
    config: GuardConfig,
) {
    let mut latch = RedirectLatch::new(intent);
    let mut session = view.observe();

    loop {
        if let Some(redirect) = latch.evaluate(&session) {
            let path = redirect.path(&config);
            tracing::info!(?intent, path, "guard redirecting");
            navigator.navigate(path);
        } else if session.is_loading {
            tracing::trace!(?intent, "session loading, guard waiting");
        }

        match view.changed().await {
            Some(next) => session = next,
            None => {
                tracing::debug!(?intent, "session store closed, guard stopping");
                break;
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use gatehouse_protocol::User;

    use super::*;

    fn loading() -> Session {
        Session::bootstrapping()
    }

    fn loading_with_stale_user() -> Session {
        Session {
            user: Some(User::new("1", "alice")),
            is_loading: true,
        }
    }

    fn anonymous() -> Session {
        Session {
            user: None,
            is_loading: false,
        }
    }

    fn authenticated() -> Session {
        Session {
            user: Some(User::new("1", "alice")),
            is_loading: false,
        }
    }

    // =====================================================================
    // decide()
    // =====================================================================

    #[test]
    fn test_decide_while_loading_never_redirects() {
        for intent in [PageIntent::RequireAuth, PageIntent::RequireAnon, PageIntent::Public] {
            assert_eq!(decide(intent, &loading()), None);
            assert_eq!(decide(intent, &loading_with_stale_user()), None);
        }
    }

    #[test]
    fn test_decide_require_anon_authenticated_goes_to_landing() {
        assert_eq!(
            decide(PageIntent::RequireAnon, &authenticated()),
            Some(Redirect::ToLanding)
        );
    }

    #[test]
    fn test_decide_require_auth_anonymous_goes_to_login() {
        assert_eq!(
            decide(PageIntent::RequireAuth, &anonymous()),
            Some(Redirect::ToLogin)
        );
    }

    #[test]
    fn test_decide_matching_intent_takes_no_action() {
        assert_eq!(decide(PageIntent::RequireAnon, &anonymous()), None);
        assert_eq!(decide(PageIntent::RequireAuth, &authenticated()), None);
    }

    #[test]
    fn test_decide_public_never_redirects() {
        assert_eq!(decide(PageIntent::Public, &anonymous()), None);
        assert_eq!(decide(PageIntent::Public, &authenticated()), None);
    }

    #[test]
    fn test_redirect_path_uses_config() {
        let config = GuardConfig {
            login_path: "/signin".into(),
            landing_path: "/home".into(),
        };
        assert_eq!(Redirect::ToLogin.path(&config), "/signin");
        assert_eq!(Redirect::ToLanding.path(&config), "/home");
    }

    // =====================================================================
    // render_state()
    // =====================================================================

    #[test]
    fn test_render_state_loading_hides_content() {
        assert_eq!(
            render_state(PageIntent::RequireAuth, &loading_with_stale_user()),
            PageRender::Loading
        );
        assert_eq!(
            render_state(PageIntent::Public, &loading()),
            PageRender::Loading
        );
    }

    #[test]
    fn test_render_state_pending_redirect_hides_content() {
        assert_eq!(
            render_state(PageIntent::RequireAuth, &anonymous()),
            PageRender::Redirecting(Redirect::ToLogin)
        );
    }

    #[test]
    fn test_render_state_allowed_shows_content() {
        assert_eq!(
            render_state(PageIntent::RequireAuth, &authenticated()),
            PageRender::Content
        );
    }

    // =====================================================================
    // RedirectLatch
    // =====================================================================

    #[test]
    fn test_latch_fires_once_per_settled_state() {
        let mut latch = RedirectLatch::new(PageIntent::RequireAnon);

        assert_eq!(latch.evaluate(&authenticated()), Some(Redirect::ToLanding));
        assert_eq!(latch.evaluate(&authenticated()), None);
        // A refresh in flight and back again is the same settled state.
        assert_eq!(latch.evaluate(&loading_with_stale_user()), None);
        assert_eq!(latch.evaluate(&authenticated()), None);
    }

    #[test]
    fn test_latch_rearms_after_state_allows_page() {
        let mut latch = RedirectLatch::new(PageIntent::RequireAuth);

        assert_eq!(latch.evaluate(&anonymous()), Some(Redirect::ToLogin));
        assert_eq!(latch.evaluate(&authenticated()), None);
        assert_eq!(latch.evaluate(&anonymous()), Some(Redirect::ToLogin));
    }

    #[test]
    fn test_latch_ignores_loading_snapshots() {
        let mut latch = RedirectLatch::new(PageIntent::RequireAuth);
        assert_eq!(latch.evaluate(&loading()), None);
        assert_eq!(latch.evaluate(&anonymous()), Some(Redirect::ToLogin));
    }

    #[test]
    fn test_guard_config_defaults() {
        let config = GuardConfig::default();
        assert_eq!(config.login_path, "/login");
        assert_eq!(config.landing_path, "/dashboard");
    }

    #[test]
    fn test_page_intent_deserializes_snake_case() {
        let intent: PageIntent = serde_json::from_str("\"require_anon\"").unwrap();
        assert_eq!(intent, PageIntent::RequireAnon);
    }
}
