//! Server management.
//!
//! Every record this service hands out has passed through
//! [`Server::sanitized`]; raw credentials stay inside the store.

use serde::Deserialize;
use std::sync::Arc;
use utoipa::ToSchema;
use uuid::Uuid;

use crate::error::{AppError, Result};
use crate::models::server::{NewServer, DEFAULT_SSH_PORT};
use crate::models::{sanitize_servers, Server, ServerAuthType};
use crate::store::Store;

/// Request to register a server.
#[derive(Debug, Clone, Default, Deserialize, ToSchema)]
pub struct CreateServerRequest {
    pub name: String,
    pub host: String,
    #[serde(default)]
    pub port: Option<i32>,
    pub username: String,
    #[serde(default)]
    pub auth_type: Option<ServerAuthType>,
    #[serde(default)]
    pub password: Option<String>,
    #[serde(default)]
    pub private_key_path: Option<String>,
}

/// Request to update a server. Empty credentials keep the stored ones.
#[derive(Debug, Clone, Default, Deserialize, ToSchema)]
pub struct UpdateServerRequest {
    pub name: String,
    pub host: String,
    #[serde(default)]
    pub port: Option<i32>,
    pub username: String,
    #[serde(default)]
    pub auth_type: Option<ServerAuthType>,
    #[serde(default)]
    pub password: Option<String>,
    #[serde(default)]
    pub private_key_path: Option<String>,
}

pub struct ServerService {
    store: Arc<dyn Store>,
}

impl ServerService {
    pub fn new(store: Arc<dyn Store>) -> Self {
        Self { store }
    }

    pub async fn list(&self) -> Result<Vec<Server>> {
        let servers = self.store.list_servers().await?;
        Ok(sanitize_servers(&servers))
    }

    pub async fn get(&self, id: Uuid) -> Result<Server> {
        Ok(self.store.get_server(id).await?.sanitized())
    }

    pub async fn create(&self, req: CreateServerRequest) -> Result<Server> {
        validate_identity(&req.name, &req.host, &req.username)?;
        let port = resolve_port(req.port)?;

        let server = self
            .store
            .insert_server(NewServer {
                name: req.name.trim().to_string(),
                host: req.host.trim().to_string(),
                port,
                username: req.username.trim().to_string(),
                auth_type: req.auth_type.unwrap_or_default(),
                password: req.password.unwrap_or_default(),
                private_key_path: req.private_key_path.unwrap_or_default(),
            })
            .await?;

        tracing::info!(server_id = %server.id, host = %server.host, "Server created");
        Ok(server.sanitized())
    }

    pub async fn update(&self, id: Uuid, req: UpdateServerRequest) -> Result<Server> {
        validate_identity(&req.name, &req.host, &req.username)?;
        let port = resolve_port(req.port)?;
        let mut server = self.store.get_server(id).await?;

        server.name = req.name.trim().to_string();
        server.host = req.host.trim().to_string();
        server.port = port;
        server.username = req.username.trim().to_string();
        if let Some(auth_type) = req.auth_type {
            server.auth_type = auth_type;
        }
        if let Some(password) = req.password.filter(|p| !p.is_empty()) {
            server.password = password;
        }
        if let Some(key) = req.private_key_path.filter(|k| !k.is_empty()) {
            server.private_key_path = key;
        }

        let updated = self.store.update_server(&server).await?;
        Ok(updated.sanitized())
    }
}

fn validate_identity(name: &str, host: &str, username: &str) -> Result<()> {
    for (field, value) in [("name", name), ("host", host), ("username", username)] {
        if value.trim().is_empty() {
            return Err(AppError::Validation(format!("{} is required", field)));
        }
    }
    Ok(())
}

fn resolve_port(port: Option<i32>) -> Result<i32> {
    match port {
        None | Some(0) => Ok(DEFAULT_SSH_PORT),
        Some(p) if (1..=65535).contains(&p) => Ok(p),
        Some(p) => Err(AppError::Validation(format!("invalid port {}", p))),
    }
}
