use crate::identity::{IdToken, Principal, TokenSource};
use crate::profile::{CreateProfile, ProfileApi, StatusResponse};
use crate::session::{
    ApprovalStatus, FailPolicy, Inner, Session, PENDING_MESSAGE, REJECTED_MESSAGE,
};
use std::sync::Arc;
use tracing::{debug, error, warn};

enum ProfileOutcome {
    Resolved(ApprovalStatus),
    Failed,
}

/// Resolve the derived session state for one sign-in attempt.
///
/// Runs as a spawned task. Every terminal goes through [`commit`], which
/// drops the result if the session moved to a newer generation while the
/// network calls were in flight.
pub(crate) async fn resolve<I, P>(inner: Arc<Inner<I, P>>, generation: u64, principal: Principal)
where
    I: TokenSource + Send + Sync,
    P: ProfileApi + Send + Sync,
{
    let token = match inner.identity.id_token(&principal).await {
        Ok(token) => token,
        Err(err) => {
            warn!("failed to obtain id token for {}: {err}", principal.uid);
            commit(&inner, generation, |session| {
                session.profile_error = true;
            });
            return;
        }
    };

    let role = token.role();

    let outcome = resolve_profile(&inner, &token, &principal).await;

    commit(&inner, generation, |session| {
        session.role = role;
        session.token = Some(token.raw.clone());

        match outcome {
            ProfileOutcome::Resolved(status) => {
                session.status = Some(status);
                session.status_message = status_message(status);
            }
            ProfileOutcome::Failed => {
                session.profile_error = true;
            }
        }
    });
}

async fn resolve_profile<I, P>(
    inner: &Inner<I, P>,
    token: &IdToken,
    principal: &Principal,
) -> ProfileOutcome
where
    I: TokenSource + Send + Sync,
    P: ProfileApi + Send + Sync,
{
    match inner.profile.status(&token.raw).await {
        Ok(response) => ProfileOutcome::Resolved(normalize_status(&response)),

        // No profile yet, provision one; new profiles start PENDING
        Err(err) if err.is_absent() => {
            debug!("no profile for {}, provisioning", principal.uid);

            let profile = provision_request(principal);

            match inner.profile.create(&token.raw, &profile).await {
                Ok(()) => ProfileOutcome::Resolved(ApprovalStatus::Pending),
                Err(err) => {
                    error!("profile creation failed for {}: {err}", principal.uid);
                    ProfileOutcome::Failed
                }
            }
        }

        Err(err) => match inner.policy.on_profile_error {
            FailPolicy::Open => {
                warn!("profile status check failed ({err}), treating account as APPROVED");
                ProfileOutcome::Resolved(ApprovalStatus::Approved)
            }
            FailPolicy::Closed => {
                error!("profile status check failed: {err}");
                ProfileOutcome::Failed
            }
        },
    }
}

/// Publish a terminal for `generation`. Returns false when the result is
/// stale and was discarded.
fn commit<I, P>(inner: &Inner<I, P>, generation: u64, apply: impl FnOnce(&mut Session)) -> bool {
    inner.tx.send_if_modified(|session| {
        if session.generation != generation {
            debug!(
                "discarding resolution for generation {generation}, session is at {}",
                session.generation
            );
            return false;
        }

        apply(session);
        session.loading = false;
        true
    })
}

/// Accounts created before status tracking have no status field; they and
/// anything unrecognized resolve to APPROVED.
fn normalize_status(response: &StatusResponse) -> ApprovalStatus {
    match response.status.as_deref() {
        Some("PENDING") => ApprovalStatus::Pending,
        Some("REJECTED") => ApprovalStatus::Rejected,
        Some("APPROVED") | Some("") | None => ApprovalStatus::Approved,
        Some(other) => {
            warn!("unknown profile status {other:?}, treating as APPROVED");
            ApprovalStatus::Approved
        }
    }
}

fn status_message(status: ApprovalStatus) -> Option<String> {
    match status {
        ApprovalStatus::Pending => Some(PENDING_MESSAGE.to_string()),
        ApprovalStatus::Rejected => Some(REJECTED_MESSAGE.to_string()),
        ApprovalStatus::Approved => None,
    }
}

/// Display name fallback chain: provider display name, then the email
/// local-part, then a generic placeholder.
fn provision_request(principal: &Principal) -> CreateProfile {
    let name = principal
        .display_name
        .clone()
        .filter(|name| !name.is_empty())
        .or_else(|| {
            principal
                .email
                .split('@')
                .next()
                .filter(|local| !local.is_empty())
                .map(str::to_string)
        })
        .unwrap_or_else(|| "User".to_string());

    CreateProfile {
        name,
        email: principal.email.clone(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn response(status: Option<&str>) -> StatusResponse {
        StatusResponse {
            status: status.map(str::to_string),
        }
    }

    #[test]
    fn test_normalize_known_statuses() {
        assert_eq!(
            normalize_status(&response(Some("PENDING"))),
            ApprovalStatus::Pending
        );
        assert_eq!(
            normalize_status(&response(Some("REJECTED"))),
            ApprovalStatus::Rejected
        );
        assert_eq!(
            normalize_status(&response(Some("APPROVED"))),
            ApprovalStatus::Approved
        );
    }

    #[test]
    fn test_normalize_legacy_and_unknown() {
        assert_eq!(normalize_status(&response(None)), ApprovalStatus::Approved);
        assert_eq!(
            normalize_status(&response(Some(""))),
            ApprovalStatus::Approved
        );
        assert_eq!(
            normalize_status(&response(Some("ON_HOLD"))),
            ApprovalStatus::Approved
        );
    }

    #[test]
    fn test_status_messages() {
        assert_eq!(
            status_message(ApprovalStatus::Pending).as_deref(),
            Some(PENDING_MESSAGE)
        );
        assert_eq!(
            status_message(ApprovalStatus::Rejected).as_deref(),
            Some(REJECTED_MESSAGE)
        );
        assert_eq!(status_message(ApprovalStatus::Approved), None);
    }

    #[test]
    fn test_provision_name_fallback_chain() {
        let mut principal = Principal {
            uid: "uid-1".to_string(),
            email: "asha.k@example.com".to_string(),
            display_name: Some("Asha K".to_string()),
        };
        assert_eq!(provision_request(&principal).name, "Asha K");

        principal.display_name = None;
        assert_eq!(provision_request(&principal).name, "asha.k");

        principal.email = String::new();
        assert_eq!(provision_request(&principal).name, "User");
    }
}
