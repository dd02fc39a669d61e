//! Account commands: sign-up, identity and access checks.

use cyberguard_client::ClientState;
use cyberguard_client::presentation::{PageContext, Theme};

use super::{CommandError, Credentials, emit, sign_in};

/// Create an account and show who it belongs to.
pub async fn sign_up(
    state: &ClientState,
    credentials: &Credentials,
    full_name: &str,
) -> Result<(), CommandError> {
    tracing::info!("Creating account for {}...", credentials.email);

    let session = state
        .sessions()
        .sign_up(&credentials.email, &credentials.password, full_name)
        .await?;

    emit(&format!(
        "Created account {} ({})",
        session.user.email_or_empty(),
        session.user_id()
    ));

    state.sessions().sign_out().await;
    Ok(())
}

/// Show the signed-in user and their role.
pub async fn whoami(state: &ClientState, credentials: &Credentials) -> Result<(), CommandError> {
    sign_in(state, credentials).await?;

    let sessions = state.sessions();
    let user = sessions.current_user().await;
    let is_admin = sessions.is_admin().await;

    let navbar =
        PageContext::new("/dashboard.html").navbar(user.as_ref(), is_admin, Theme::default());
    match (user, navbar.account) {
        (Some(user), Some(account)) => {
            emit(&format!("{} ({})", account.email, user.id));
            if let Some(name) = &user.full_name {
                emit(&format!("Name: {name}"));
            }
            emit(&format!("Role: {}", account.role_label));
        }
        _ => emit("Not signed in"),
    }

    sessions.sign_out().await;
    Ok(())
}

/// Run the access check a page load would run.
///
/// Without credentials the check runs as an anonymous visitor.
pub async fn check_access(
    state: &ClientState,
    credentials: Option<&Credentials>,
    require_authenticated: bool,
    require_admin: bool,
) -> Result<(), CommandError> {
    if let Some(credentials) = credentials {
        sign_in(state, credentials).await?;
    }

    let decision = state
        .guard()
        .check_access(require_authenticated, require_admin)
        .await;
    state.sessions().sign_out().await;

    if let Some(target) = decision.redirect_target() {
        return Err(CommandError::Denied(target));
    }

    match decision.into_user() {
        Some(user) => emit(&format!("Allowed: {}", user.email_or_empty())),
        None => emit("Allowed: anonymous"),
    }
    Ok(())
}
