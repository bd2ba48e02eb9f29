// Copyright (C) 2025 SyncMyOrders Sp. z o.o.
// SPDX-License-Identifier: AGPL-3.0-or-later
//! Provisioning environment settings.
//!
//! Credentials never live in the mirror configuration file; they come from
//! the process environment (usually via a `.env` file loaded by the CLI).
//! Absence is tolerated at construction time: a missing credential only
//! fails the specific operation that needs it, so key-less mirror runs work
//! with nothing configured.

use std::env;

/// Environment variable carrying the service API token.
pub const TOKEN_VAR: &str = "FORTEPLUS_TOKEN";
/// Environment variable carrying the HS256 secret for identity tokens.
pub const JWT_SECRET_VAR: &str = "JWT_SECRET";
/// Environment variable carrying the operating developer's email.
pub const OPERATOR_EMAIL_VAR: &str = "EMAIL_USUARIO";

const PROD_URL_VAR: &str = "FORTEPLUS_PROD_URL";
const DEV_URL_VAR: &str = "FORTEPLUS_DEV_URL";
const DEV_ADMIN_URL_VAR: &str = "FORTEPLUS_DEV_ADMIN_URL";

const DEFAULT_PROD_URL: &str = "https://assinaturas.forteplus.com.br/api/v1/";
const DEFAULT_DEV_URL: &str = "http://192.168.200.68:8031/api/v1/";
const DEFAULT_DEV_ADMIN_URL: &str = "http://192.168.200.68:8032/api/v1/";

/// Everything the provisioning client needs from the environment.
#[derive(Debug, Clone)]
pub struct ProvisioningSettings {
    /// Service API token, sent as-is in the Authorization header.
    pub token: Option<String>,
    /// HS256 signing secret for rewriting identity tokens.
    pub jwt_secret: Option<String>,
    /// Email of the developer running the mirror.
    pub operator_email: Option<String>,
    /// Production service base URL (subscription fetch).
    pub prod_base_url: String,
    /// Development service base URL (clone and link).
    pub dev_base_url: String,
    /// Development admin service base URL (user lookup and patch).
    pub dev_admin_base_url: String,
}

impl Default for ProvisioningSettings {
    fn default() -> Self {
        Self {
            token: None,
            jwt_secret: None,
            operator_email: None,
            prod_base_url: DEFAULT_PROD_URL.to_string(),
            dev_base_url: DEFAULT_DEV_URL.to_string(),
            dev_admin_base_url: DEFAULT_DEV_ADMIN_URL.to_string(),
        }
    }
}

impl ProvisioningSettings {
    /// Read settings from the process environment. Never fails; missing
    /// values stay `None` and the base URLs fall back to the built-in
    /// service locations.
    pub fn from_env() -> Self {
        let defaults = Self::default();
        Self {
            token: non_empty(env::var(TOKEN_VAR).ok()),
            jwt_secret: non_empty(env::var(JWT_SECRET_VAR).ok()),
            operator_email: non_empty(env::var(OPERATOR_EMAIL_VAR).ok()),
            prod_base_url: env::var(PROD_URL_VAR).unwrap_or(defaults.prod_base_url),
            dev_base_url: env::var(DEV_URL_VAR).unwrap_or(defaults.dev_base_url),
            dev_admin_base_url: env::var(DEV_ADMIN_URL_VAR).unwrap_or(defaults.dev_admin_base_url),
        }
    }
}

fn non_empty(value: Option<String>) -> Option<String> {
    value.filter(|v| !v.trim().is_empty())
}
