//! Access guard for page loads.
//!
//! Decides whether a page may render for the current session. The decision is
//! returned to the caller; performing the navigation is up to the UI.

use tracing::debug;

use cyberguard_core::User;

use super::auth::SessionProvider;

/// Where a caller is sent when access is denied.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RedirectTarget {
    /// Login surface, for unauthenticated callers.
    Login,
    /// Default authenticated landing surface, for under-privileged callers.
    Landing,
}

impl RedirectTarget {
    /// Absolute path of the surface.
    #[must_use]
    pub const fn path(self) -> &'static str {
        match self {
            Self::Login => "/login.html",
            Self::Landing => "/dashboard.html",
        }
    }
}

/// Outcome of an access check.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AccessDecision {
    /// The page may render. Carries the current user, which is `None` only
    /// when authentication was not required.
    Allow(Option<User>),
    /// The page must not render; navigate to the target instead.
    Redirect(RedirectTarget),
}

impl AccessDecision {
    /// Whether the protected content may render.
    #[must_use]
    pub const fn allowed(&self) -> bool {
        matches!(self, Self::Allow(_))
    }

    /// Path to navigate to, when access was denied.
    #[must_use]
    pub const fn redirect_target(&self) -> Option<&'static str> {
        match self {
            Self::Allow(_) => None,
            Self::Redirect(target) => Some(target.path()),
        }
    }

    /// The resolved user, if access was granted to one.
    #[must_use]
    pub fn into_user(self) -> Option<User> {
        match self {
            Self::Allow(user) => user,
            Self::Redirect(_) => None,
        }
    }
}

/// Access guard over a session provider.
#[derive(Debug, Clone, Copy)]
pub struct AccessGuard<'a> {
    sessions: &'a SessionProvider,
}

impl<'a> AccessGuard<'a> {
    /// Create a guard over `sessions`.
    #[must_use]
    pub const fn new(sessions: &'a SessionProvider) -> Self {
        Self { sessions }
    }

    /// Check access for a page load.
    ///
    /// 1. No current user and `require_authenticated` → redirect to login.
    /// 2. `require_admin` and the user is not an admin → redirect to the landing page.
    /// 3. Otherwise allow, with the current user (if any).
    pub async fn check_access(
        &self,
        require_authenticated: bool,
        require_admin: bool,
    ) -> AccessDecision {
        let user = self.sessions.current_user().await;

        if user.is_none() && require_authenticated {
            debug!("unauthenticated; redirecting to login");
            return AccessDecision::Redirect(RedirectTarget::Login);
        }

        // Independent of `require_authenticated`: admin pages never render
        // for non-admins, anonymous visitors included.
        if require_admin && !self.sessions.is_admin().await {
            debug!("admin required; redirecting to landing page");
            return AccessDecision::Redirect(RedirectTarget::Landing);
        }

        AccessDecision::Allow(user)
    }
}
