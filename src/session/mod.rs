mod resolve;

use crate::identity::{AuthEvent, Principal, Role, TokenSource};
use crate::profile::ProfileApi;
use secrecy::SecretString;
use std::sync::Arc;
use tokio::sync::watch;
use tracing::debug;

/// Message shown while an account waits for an administrator.
pub const PENDING_MESSAGE: &str = "Your account is pending admin approval.";

/// Message shown when an administrator rejected the account.
pub const REJECTED_MESSAGE: &str = "Your account has been rejected. Please contact support.";

/// Administrator vetting state of a profile.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ApprovalStatus {
    Pending,
    Approved,
    Rejected,
}

impl ApprovalStatus {
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Pending => "PENDING",
            Self::Approved => "APPROVED",
            Self::Rejected => "REJECTED",
        }
    }
}

impl std::fmt::Display for ApprovalStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// What to do when the profile status check fails for a reason other than
/// "profile does not exist".
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum FailPolicy {
    /// Treat the account as APPROVED. Keeps accounts that predate status
    /// tracking working when the profile service degrades.
    #[default]
    Open,
    /// Surface the failure and block until the user signs in again.
    Closed,
}

#[derive(Debug, Clone, Copy, Default)]
pub struct ResolvePolicy {
    pub on_profile_error: FailPolicy,
}

/// One authoritative view of the signed-in user. Published through a watch
/// channel; only the controller writes it.
#[derive(Debug, Clone)]
pub struct Session {
    /// Bumped on every sign-in/sign-out event. Resolution results carry the
    /// generation they were started for and are dropped if it moved on.
    pub generation: u64,
    pub identity: Option<Principal>,
    pub token: Option<SecretString>,
    pub role: Option<Role>,
    pub status: Option<ApprovalStatus>,
    pub status_message: Option<String>,
    pub loading: bool,
    pub profile_error: bool,
}

impl Session {
    #[must_use]
    pub fn signed_out(generation: u64) -> Self {
        Self {
            generation,
            identity: None,
            token: None,
            role: None,
            status: None,
            status_message: None,
            loading: false,
            profile_error: false,
        }
    }

    #[must_use]
    pub fn resolving(generation: u64, principal: Principal) -> Self {
        Self {
            generation,
            identity: Some(principal),
            token: None,
            role: None,
            status: None,
            status_message: None,
            loading: true,
            profile_error: false,
        }
    }

    /// True once the session reached a terminal for the current identity.
    #[must_use]
    pub const fn settled(&self) -> bool {
        !self.loading
    }
}

pub(crate) struct Inner<I, P> {
    pub(crate) identity: I,
    pub(crate) profile: P,
    pub(crate) policy: ResolvePolicy,
    pub(crate) tx: watch::Sender<Session>,
}

/// Owns the session state machine. Consumes identity events, resolves the
/// profile status for each sign-in, and publishes snapshots to any number
/// of read-only subscribers.
pub struct SessionController<I, P> {
    inner: Arc<Inner<I, P>>,
}

impl<I, P> SessionController<I, P>
where
    I: TokenSource + Send + Sync + 'static,
    P: ProfileApi + Send + Sync + 'static,
{
    #[must_use]
    pub fn new(identity: I, profile: P, policy: ResolvePolicy) -> Self {
        let (tx, _rx) = watch::channel(Session::signed_out(0));

        Self {
            inner: Arc::new(Inner {
                identity,
                profile,
                policy,
                tx,
            }),
        }
    }

    /// Subscribe to session snapshots. The receiver always holds the latest
    /// published value.
    #[must_use]
    pub fn subscribe(&self) -> watch::Receiver<Session> {
        self.inner.tx.subscribe()
    }

    /// Clone of the current snapshot.
    #[must_use]
    pub fn snapshot(&self) -> Session {
        self.inner.tx.borrow().clone()
    }

    pub fn handle(&self, event: AuthEvent) {
        match event {
            AuthEvent::SignedIn(principal) => self.signed_in(principal),
            AuthEvent::SignedOut => self.signed_out(),
        }
    }

    /// A new principal signed in. Resets the derived state, publishes the
    /// loading snapshot, and starts one resolution tagged with the new
    /// generation. Any in-flight resolution is superseded.
    pub fn signed_in(&self, principal: Principal) {
        let mut generation = 0;

        self.inner.tx.send_modify(|session| {
            generation = session.generation + 1;
            *session = Session::resolving(generation, principal.clone());
        });

        debug!("sign-in for {} starts generation {generation}", principal.uid);

        let inner = Arc::clone(&self.inner);
        tokio::spawn(async move {
            resolve::resolve(inner, generation, principal).await;
        });
    }

    /// The principal signed out. Takes effect immediately; any in-flight
    /// resolution commits against a stale generation and is discarded.
    pub fn signed_out(&self) {
        self.inner.tx.send_modify(|session| {
            let generation = session.generation + 1;
            *session = Session::signed_out(generation);
        });

        debug!("signed out");
    }
}
