//! Roles, capabilities and the signed-in session
//!
//! The identity provider is external: once it confirms a sign-in, the caller
//! builds a [`SessionUser`] and passes the resulting [`Session`] explicitly to
//! whatever needs to authorize an action. Nothing here is global.
//!
//! Permission checks never compare role strings. A [`Role`] is resolved once
//! and expanded into a set of [`Capability`] values, and views or services ask
//! for the capability they need.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::core::entity::DonorStatus;
use crate::core::error::{RequestError, Result};

/// Platform role of a user
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    Donor,
    Volunteer,
    Admin,
}

impl Role {
    pub fn as_str(&self) -> &'static str {
        match self {
            Role::Donor => "donor",
            Role::Volunteer => "volunteer",
            Role::Admin => "admin",
        }
    }

    /// Capabilities granted by this role
    pub fn capabilities(&self) -> &'static [Capability] {
        use Capability::*;
        match self {
            Role::Donor => &[CreateRequest, ManageOwnRequests, Donate, Fund],
            Role::Volunteer => &[
                CreateRequest,
                ManageOwnRequests,
                Donate,
                Fund,
                ViewAllRequests,
                UpdateAnyRequestStatus,
                ViewStatistics,
                ViewFunding,
            ],
            Role::Admin => &[
                CreateRequest,
                ManageOwnRequests,
                Donate,
                Fund,
                ViewAllRequests,
                UpdateAnyRequestStatus,
                ViewStatistics,
                ViewFunding,
                EditAnyRequest,
                DeleteAnyRequest,
                ManageUsers,
            ],
        }
    }

    pub fn has(&self, capability: Capability) -> bool {
        self.capabilities().contains(&capability)
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Role {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "donor" => Ok(Role::Donor),
            "volunteer" => Ok(Role::Volunteer),
            "admin" => Ok(Role::Admin),
            other => Err(format!("unknown role: {}", other)),
        }
    }
}

/// A single permission
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Capability {
    /// Create donation requests
    CreateRequest,
    /// Edit, delete and close one's own requests
    ManageOwnRequests,
    /// Commit to donate for someone else's request
    Donate,
    /// Record a funding contribution
    Fund,
    /// See every donation request, not just one's own
    ViewAllRequests,
    /// Move any request through its lifecycle
    UpdateAnyRequestStatus,
    /// Read dashboard totals
    ViewStatistics,
    /// Read the funding ledger
    ViewFunding,
    /// Edit fields of requests owned by others
    EditAnyRequest,
    /// Delete requests owned by others
    DeleteAnyRequest,
    /// Block users and change roles
    ManageUsers,
}

/// The authenticated user as confirmed by the identity provider
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SessionUser {
    pub name: String,
    pub email: String,
    pub role: Role,
    pub status: DonorStatus,
}

impl SessionUser {
    pub fn new(name: impl Into<String>, email: impl Into<String>, role: Role) -> Self {
        Self {
            name: name.into(),
            email: email.into(),
            role,
            status: DonorStatus::Active,
        }
    }

    pub fn with_status(mut self, status: DonorStatus) -> Self {
        self.status = status;
        self
    }

    pub fn is_blocked(&self) -> bool {
        self.status == DonorStatus::Blocked
    }
}

/// Explicit session passed to anything that needs to authorize
///
/// Populated on sign-in confirmation, cleared on sign-out.
#[derive(Debug, Clone, Default, PartialEq)]
pub enum Session {
    #[default]
    SignedOut,
    SignedIn(SessionUser),
}

impl Session {
    pub fn signed_in(user: SessionUser) -> Self {
        Session::SignedIn(user)
    }

    /// Replace the current session with a confirmed sign-in
    pub fn sign_in(&mut self, user: SessionUser) {
        tracing::info!(email = %user.email, role = %user.role, "session signed in");
        *self = Session::SignedIn(user);
    }

    /// Clear the session, returning the user that was signed in
    pub fn sign_out(&mut self) -> Option<SessionUser> {
        match std::mem::take(self) {
            Session::SignedIn(user) => {
                tracing::info!(email = %user.email, "session signed out");
                Some(user)
            }
            Session::SignedOut => None,
        }
    }

    pub fn user(&self) -> Option<&SessionUser> {
        match self {
            Session::SignedIn(user) => Some(user),
            Session::SignedOut => None,
        }
    }

    pub fn is_signed_in(&self) -> bool {
        matches!(self, Session::SignedIn(_))
    }

    pub fn role(&self) -> Option<Role> {
        self.user().map(|u| u.role)
    }

    pub fn email(&self) -> Option<&str> {
        self.user().map(|u| u.email.as_str())
    }

    /// Whether the signed-in user holds `capability`
    ///
    /// Blocked users keep read access but lose every capability that creates
    /// or mutates data.
    pub fn can(&self, capability: Capability) -> bool {
        match self.user() {
            Some(user) if user.is_blocked() => {
                matches!(
                    capability,
                    Capability::ViewAllRequests | Capability::ViewStatistics | Capability::ViewFunding
                ) && user.role.has(capability)
            }
            Some(user) => user.role.has(capability),
            None => false,
        }
    }

    /// The signed-in user, or an error if nobody is signed in
    pub fn require_user(&self) -> Result<&SessionUser> {
        self.user().ok_or_else(|| RequestError::Unauthenticated.into())
    }

    /// Fail unless the session holds `capability`
    pub fn require(&self, capability: Capability, action: &str) -> Result<&SessionUser> {
        let user = self.require_user()?;
        if self.can(capability) {
            Ok(user)
        } else {
            tracing::warn!(email = %user.email, ?capability, action, "permission denied");
            Err(RequestError::Forbidden {
                action: action.to_string(),
            }
            .into())
        }
    }
}

/// Access policy guarding a view or operation
#[derive(Debug, Clone)]
pub enum AuthPolicy {
    /// Public access (no sign-in required)
    Public,

    /// Any signed-in user
    Authenticated,

    /// Signed-in user holding the capability
    Capability(Capability),

    /// Combination of policies (AND)
    AllOf(Vec<AuthPolicy>),

    /// Combination of policies (OR)
    AnyOf(Vec<AuthPolicy>),
}

impl AuthPolicy {
    /// Check if the session satisfies this policy
    pub fn check(&self, session: &Session) -> bool {
        match self {
            AuthPolicy::Public => true,

            AuthPolicy::Authenticated => session.is_signed_in(),

            AuthPolicy::Capability(capability) => session.can(*capability),

            AuthPolicy::AllOf(policies) => policies.iter().all(|p| p.check(session)),

            AuthPolicy::AnyOf(policies) => policies.iter().any(|p| p.check(session)),
        }
    }

    /// Parse policy from string (for YAML config)
    pub fn parse_policy(s: &str) -> Self {
        match s {
            "public" => AuthPolicy::Public,
            "authenticated" => AuthPolicy::Authenticated,
            "admin" => AuthPolicy::Capability(Capability::ManageUsers),
            "staff" => AuthPolicy::Capability(Capability::ViewAllRequests),
            _ => AuthPolicy::Authenticated, // Default
        }
    }
}
