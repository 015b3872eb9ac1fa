use std::path::Path;
use std::sync::Arc;
use std::time::Duration;

use gatehouse::prelude::*;

/// Long enough for guard tasks to react to the latest session change.
const SETTLE: Duration = Duration::from_millis(20);

async fn settle() {
    tokio::time::sleep(SETTLE).await;
}

// ---------------------------------------------------------------------------
// Walkthrough
// ---------------------------------------------------------------------------

/// Two "runs" of a client against one dev auth server and one session file:
/// sign up on the first, restore on the second, then lose the token to a
/// server-side revocation. Returns every navigation the guards asked for.
async fn walkthrough(
    config: &AppConfig,
    session_file: &Path,
) -> Result<Vec<String>, GatehouseError> {
    let api = Arc::new(DevAuthApi::new());
    let nav = RecordingNavigator::new();

    // First run: nothing persisted yet.
    let client = ClientBuilder::new()
        .config(config)
        .build(FileStorage::new(session_file), Arc::clone(&api));
    let login_page = client.guard(PageIntent::RequireAnon, nav.clone());
    let dashboard = client.guard(PageIntent::RequireAuth, nav.clone());
    client.start().await;
    settle().await;
    tracing::info!(state = %client.session().state(), "first run settled");

    let sloppy = RegisterForm {
        username: "b".into(),
        email: "bob".into(),
        password: "short".into(),
        confirm_password: "shorter".into(),
    };
    if let Err(GatehouseError::Invalid(errors)) = client.sign_up(sloppy).await {
        for (field, message) in errors.iter() {
            tracing::info!(%field, error = message, "register form rejected");
        }
    }

    let bob = client
        .sign_up(RegisterForm {
            username: "bob".into(),
            email: "bob@example.com".into(),
            password: "correct-horse".into(),
            confirm_password: "correct-horse".into(),
        })
        .await?;
    settle().await;
    tracing::info!(user_id = %bob.id, "signed up");

    login_page.unmount();
    dashboard.unmount();
    client.shutdown();

    // Second run: the persisted token restores the session.
    let client = ClientBuilder::new()
        .config(config)
        .build(FileStorage::new(session_file), Arc::clone(&api));
    let _dashboard = client.guard(PageIntent::RequireAuth, nav.clone());
    client.start().await;
    settle().await;
    let restored = client.session();
    tracing::info!(user_id = ?restored.user_id(), "second run settled");

    // The server expires the token; the next refresh logs out.
    if let Some(token) = FileStorage::new(session_file).get(&config.session.token_key)? {
        api.revoke(&token).await;
    }
    client.refresh().await;
    settle().await;
    if let Some(reason) = client.store().last_error() {
        tracing::warn!(reason, "forced logout");
    }
    client.shutdown();

    Ok(nav.paths())
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let config_path = std::env::args()
        .nth(1)
        .unwrap_or_else(|| "gatehouse.json".to_string());
    let config = AppConfig::load(&config_path)?.with_env_overrides();
    config.validate()?;
    init_tracing(&config.log)?;

    let session_file = std::env::temp_dir().join("gatehouse-login-flow.json");
    let _ = std::fs::remove_file(&session_file);

    let navigations = walkthrough(&config, &session_file).await?;
    for path in &navigations {
        println!("navigated to {path}");
    }

    let _ = std::fs::remove_file(&session_file);
    Ok(())
}
