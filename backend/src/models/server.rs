//! Server model and credential sanitization.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::ToSchema;
use uuid::Uuid;

/// Default SSH port applied when a server is created without one.
pub const DEFAULT_SSH_PORT: i32 = 22;

/// How the backup engine authenticates against a server.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, sqlx::Type, ToSchema)]
#[sqlx(type_name = "server_auth_type", rename_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum ServerAuthType {
    Password,
    #[default]
    Key,
}

/// A remote host that backup profiles copy from.
///
/// `password` and `private_key_path` are secrets: they are only populated on
/// records read straight from the store and are cleared by [`Server::sanitized`]
/// before a record crosses the read boundary.
#[derive(Clone, PartialEq, Serialize, Deserialize, FromRow, ToSchema)]
pub struct Server {
    pub id: Uuid,
    pub name: String,
    pub host: String,
    pub port: i32,
    pub username: String,
    pub auth_type: ServerAuthType,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub password: String,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub private_key_path: String,
    pub created_at: DateTime<Utc>,
}

redacted_debug!(Server {
    show id,
    show name,
    show host,
    show port,
    show username,
    show auth_type,
    redact_nonempty password,
    redact_nonempty private_key_path,
    show created_at,
});

impl Server {
    /// Copy of this record with every secret field cleared.
    ///
    /// This is a projection: the stored record is never touched.
    pub fn sanitized(&self) -> Server {
        Server {
            password: String::new(),
            private_key_path: String::new(),
            ..self.clone()
        }
    }

    /// True when no secret survives on this value.
    pub fn is_sanitized(&self) -> bool {
        self.password.is_empty() && self.private_key_path.is_empty()
    }
}

/// Sanitize a list of servers for output.
pub fn sanitize_servers(servers: &[Server]) -> Vec<Server> {
    servers.iter().map(Server::sanitized).collect()
}

/// Insert payload for a server row.
#[derive(Debug, Clone)]
pub struct NewServer {
    pub name: String,
    pub host: String,
    pub port: i32,
    pub username: String,
    pub auth_type: ServerAuthType,
    pub password: String,
    pub private_key_path: String,
}
