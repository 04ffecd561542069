//! The logged-in identity and what its role can reach.
//!
//! One session per interactive user, created at login and destroyed at
//! logout. The session is an explicit value handed to the orchestrator and
//! the report helpers - there is no process-global "current user". The
//! backend remains authoritative for every permission; the gate here only
//! keeps unreachable operations from issuing network calls.

use std::fmt;

use serde::Serialize;
use thiserror::Error;
use tracing::info;

use crate::backend::{Backend, Lookup};
use crate::error::BackendError;
use crate::schema::EntityKind;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum Role {
    Administrator,
    Supervisor,
    Regular,
}

impl Role {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Administrator => "Administrator",
            Self::Supervisor => "Supervisor",
            Self::Regular => "Regular",
        }
    }

    /// Parse the backend's `position` string.
    pub fn parse(text: &str) -> Option<Self> {
        match text {
            "Administrator" => Some(Self::Administrator),
            "Supervisor" => Some(Self::Supervisor),
            "Regular" => Some(Self::Regular),
            _ => None,
        }
    }

    /// The entities this role may create records for.
    pub fn creatable(self) -> &'static [EntityKind] {
        match self {
            Self::Administrator => &EntityKind::ALL,
            Self::Supervisor => &[EntityKind::RoomUnavailable],
            Self::Regular => &[EntityKind::Reserve],
        }
    }

    pub fn can_create(self, entity: EntityKind) -> bool {
        self.creatable().contains(&entity)
    }

    /// Update and delete are reserved for administrators.
    pub fn can_mutate(self) -> bool {
        matches!(self, Self::Administrator)
    }

    pub fn can_view_global_reports(self) -> bool {
        matches!(self, Self::Administrator)
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Error)]
pub enum LoginError {
    #[error("the username or password is incorrect")]
    BadCredentials,

    #[error("login profile is missing field {field}")]
    Profile { field: &'static str },

    #[error(transparent)]
    Backend(#[from] BackendError),
}

/// An authenticated dashboard session.
#[derive(Debug, Clone)]
pub struct Session {
    pub eid: i64,
    pub username: String,
    pub role: Role,
}

impl Session {
    /// Authenticate against the backend and build the session context.
    ///
    /// The profile row returned by the credentials lookup carries the
    /// employee id and position alongside the username; a missing row is a
    /// bad-credentials failure, not an error.
    pub async fn login(
        backend: &dyn Backend,
        username: &str,
        password: &str,
    ) -> Result<Self, LoginError> {
        let profile = match backend.authenticate(username, password).await? {
            Lookup::Found(profile) => profile,
            Lookup::Missing => return Err(LoginError::BadCredentials),
        };

        let eid = profile
            .get("eid")
            .and_then(serde_json::Value::as_i64)
            .ok_or(LoginError::Profile { field: "eid" })?;
        let username = profile
            .get("username")
            .and_then(serde_json::Value::as_str)
            .ok_or(LoginError::Profile { field: "username" })?
            .to_string();
        let role = profile
            .get("position")
            .and_then(serde_json::Value::as_str)
            .and_then(Role::parse)
            .ok_or(LoginError::Profile { field: "position" })?;

        info!("[Session] {} logged in as {}", username, role);
        Ok(Self {
            eid,
            username,
            role,
        })
    }

    /// End the session. Consuming `self` is the lifecycle: nothing keeps a
    /// logged-out identity around.
    pub fn logout(self) {
        info!("[Session] {} logged out", self.username);
    }
}
