use crate::cli::{actions::Action, globals::GlobalArgs};
use crate::guard::{self, AdminPolicy, Outcome};
use crate::identity::IdentityClient;
use crate::profile::ProfileClient;
use crate::session::{ResolvePolicy, Session, SessionController};
use anyhow::{anyhow, Result};
use serde_json::json;
use tracing::info;

/// Handle the check action: sign in, resolve one session to a terminal
/// state, and report what the route guards would do with it.
pub async fn handle(action: Action, globals: &GlobalArgs) -> Result<()> {
    let Action::Check { email, password } = action;

    let identity = IdentityClient::new(
        &globals.identity_url,
        globals.identity_api_key.clone(),
        globals.timeout,
    )?;
    let profile = ProfileClient::new(&globals.api_url, globals.timeout)?;

    let principal = identity.sign_in(&email, &password).await?;

    let controller = SessionController::new(
        identity,
        profile,
        ResolvePolicy {
            on_profile_error: globals.fail_policy,
        },
    );

    controller.signed_in(principal);

    let mut sessions = controller.subscribe();
    let session = sessions.wait_for(Session::settled).await?.clone();

    let protected = guard::protected(&session);
    let admin = guard::admin(
        &session,
        AdminPolicy {
            require_approved_status: globals.strict_admin,
        },
    );

    let summary = json!({
        "uid": session.identity.as_ref().map(|p| p.uid.clone()),
        "email": session.identity.as_ref().map(|p| p.email.clone()),
        "role": session.role.map(|role| role.to_string()),
        "status": session.status.map(|status| status.to_string()),
        "status_message": session.status_message,
        "profile_error": session.profile_error,
        "routes": {
            "protected": describe(&protected),
            "admin": describe(&admin),
        },
    });

    println!("{}", serde_json::to_string_pretty(&summary)?);

    match protected {
        Outcome::Render => {
            info!("session resolved, access granted");
            Ok(())
        }
        Outcome::Blocked { message, .. } => Err(anyhow!("access blocked: {message}")),
        Outcome::Redirect(route) => Err(anyhow!("not signed in, redirect to {route}")),
        Outcome::Loading => Err(anyhow!("session did not settle")),
    }
}

fn describe(outcome: &Outcome) -> String {
    match outcome {
        Outcome::Loading => "loading".to_string(),
        Outcome::Redirect(route) => format!("redirect:{route}"),
        Outcome::Blocked { message, .. } => format!("blocked: {message}"),
        Outcome::Render => "render".to_string(),
    }
}
