// Copyright (C) 2025 SyncMyOrders Sp. z o.o.
// SPDX-License-Identifier: AGPL-3.0-or-later
//! HTTP client for the subscription service.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::header::{ACCEPT, AUTHORIZATION};
use serde_json::{Value, json};
use tracing::{debug, info, warn};

use pgmirror_core::error::HookError;

use crate::settings::{JWT_SECRET_VAR, ProvisioningSettings, TOKEN_VAR};
use crate::token;

/// Email the restored database's admin user is looked up by.
const ADMIN_USER_EMAIL: &str = "erika.neri@forteplus.com.br";

const REQUEST_TIMEOUT: Duration = Duration::from_secs(10);

/// Remote operations the provisioning chain depends on. Split from the
/// chain so tests can run it against a scripted fake.
#[async_trait]
pub trait SubscriptionApi: Send + Sync {
    /// Fetch the production subscription for a correlation key. `None`
    /// means the service answered with an empty body.
    async fn fetch_subscription(&self, correlation_key: &str) -> Result<Option<Value>, HookError>;

    /// Clone a subscription into the development environment, returning the
    /// created subscription.
    async fn clone_subscription(&self, subscription: &Value) -> Result<Value, HookError>;

    /// Link the developer to a development subscription.
    async fn link_subscriber_user(&self, dev_id: i64, email: &str) -> Result<(), HookError>;

    /// Re-point the restored database's admin user at `new_email`.
    async fn update_admin_email(
        &self,
        new_email: &str,
        target_database: &str,
    ) -> Result<(), HookError>;
}

/// reqwest-backed client against the FortePlus subscription service.
///
/// The development endpoints sit behind self-signed certificates, so
/// certificate validation is disabled for the whole client.
pub struct ForteplusClient {
    http: reqwest::Client,
    settings: ProvisioningSettings,
}

impl ForteplusClient {
    pub fn new(settings: ProvisioningSettings) -> Result<Self, HookError> {
        let http = reqwest::Client::builder()
            .timeout(REQUEST_TIMEOUT)
            .danger_accept_invalid_certs(true)
            .build()
            .map_err(|e| HookError::Remote {
                method: "INIT",
                url: String::new(),
                reason: e.to_string(),
            })?;
        Ok(Self { http, settings })
    }

    /// The token, or a [`HookError::MissingCredential`] before any network
    /// traffic happens.
    fn token(&self) -> Result<&str, HookError> {
        self.settings
            .token
            .as_deref()
            .ok_or(HookError::MissingCredential(TOKEN_VAR))
    }

    async fn send(
        &self,
        method: &'static str,
        request: reqwest::RequestBuilder,
        url: &str,
    ) -> Result<Value, HookError> {
        debug!(method, url, "calling subscription service");
        let response = request.send().await.map_err(|e| HookError::Remote {
            method,
            url: url.to_string(),
            reason: e.to_string(),
        })?;

        let status = response.status();
        info!(method, url, status = status.as_u16(), "subscription service answered");
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(HookError::Remote {
                method,
                url: url.to_string(),
                reason: format!("status {status}: {}", body.trim()),
            });
        }

        let text = response.text().await.map_err(|e| HookError::Remote {
            method,
            url: url.to_string(),
            reason: e.to_string(),
        })?;
        if text.trim().is_empty() {
            return Ok(Value::Null);
        }
        serde_json::from_str(&text).map_err(|e| HookError::Malformed {
            url: url.to_string(),
            reason: format!("body is not JSON: {e}"),
        })
    }
}

#[async_trait]
impl SubscriptionApi for ForteplusClient {
    async fn fetch_subscription(&self, correlation_key: &str) -> Result<Option<Value>, HookError> {
        let token = self.token()?;
        let url = format!(
            "{}assinaturas/{correlation_key}/",
            self.settings.prod_base_url
        );
        let request = self
            .http
            .get(&url)
            .header(AUTHORIZATION, token)
            .header(ACCEPT, "application/json");

        let body = self.send("GET", request, &url).await?;
        match body {
            Value::Null => Ok(None),
            Value::Object(ref map) if map.is_empty() => Ok(None),
            other => Ok(Some(other)),
        }
    }

    async fn clone_subscription(&self, subscription: &Value) -> Result<Value, HookError> {
        let token = self.token()?;
        let url = format!("{}assinaturas/", self.settings.dev_base_url);
        let request = self
            .http
            .post(&url)
            .header(AUTHORIZATION, token)
            .header(ACCEPT, "application/json")
            .json(subscription);

        self.send("POST", request, &url).await
    }

    async fn link_subscriber_user(&self, dev_id: i64, email: &str) -> Result<(), HookError> {
        let token = self.token()?;
        let url = format!("{}assinantes_usuarios/", self.settings.dev_base_url);
        let payload = json!({
            "usss_assinatura": dev_id,
            "usss_email_assinante": email,
            "usss_email_usuario": email,
        });
        let request = self
            .http
            .post(&url)
            .header(AUTHORIZATION, token)
            .header(ACCEPT, "application/json")
            .json(&payload);

        self.send("POST", request, &url).await?;
        Ok(())
    }

    async fn update_admin_email(
        &self,
        new_email: &str,
        target_database: &str,
    ) -> Result<(), HookError> {
        let token = self.token()?;
        let secret = self
            .settings
            .jwt_secret
            .as_deref()
            .ok_or(HookError::MissingCredential(JWT_SECRET_VAR))?;

        // The admin API is multi-tenant: the database it acts on comes from
        // the token's `db` claim, so the token must be re-signed first.
        let scoped_token = token::rewrite_database_claim(token, target_database, secret)?;

        let lookup_url = format!("{}usuarios/", self.settings.dev_admin_base_url);
        let request = self
            .http
            .get(&lookup_url)
            .header(AUTHORIZATION, &scoped_token)
            .header(ACCEPT, "application/json")
            .query(&[("us_email", ADMIN_USER_EMAIL)]);

        let body = self.send("GET", request, &lookup_url).await?;

        // The endpoint answers either a bare list or a paginated
        // {"results": [...]} envelope.
        let users = match &body {
            Value::Array(items) => items.as_slice(),
            Value::Object(map) => map
                .get("results")
                .and_then(Value::as_array)
                .map(Vec::as_slice)
                .unwrap_or(&[]),
            _ => &[],
        };

        let Some(first) = users.first() else {
            return Err(HookError::Malformed {
                url: lookup_url,
                reason: format!("no user with email {ADMIN_USER_EMAIL}"),
            });
        };
        if users.len() > 1 {
            warn!(
                email = ADMIN_USER_EMAIL,
                matches = users.len(),
                "multiple admin users matched; using the first"
            );
        }

        let user_id = first
            .get("id")
            .or_else(|| first.get("us_id"))
            .and_then(Value::as_i64)
            .ok_or_else(|| HookError::Malformed {
                url: lookup_url.clone(),
                reason: "user record has no id".to_string(),
            })?;

        let patch_url = format!("{}usuarios/{user_id}/", self.settings.dev_admin_base_url);
        let request = self
            .http
            .patch(&patch_url)
            .header(AUTHORIZATION, &scoped_token)
            .header(ACCEPT, "application/json")
            .json(&json!({ "us_email": new_email }));

        self.send("PATCH", request, &patch_url).await?;
        info!(email = new_email, database = target_database, "admin user email updated");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn settings_without_token() -> ProvisioningSettings {
        ProvisioningSettings {
            token: None,
            ..ProvisioningSettings::default()
        }
    }

    #[tokio::test]
    async fn missing_token_fails_before_any_network_call() {
        let client = ForteplusClient::new(settings_without_token()).expect("client builds");

        let err = client
            .fetch_subscription("123")
            .await
            .expect_err("must fail without token");
        assert!(matches!(err, HookError::MissingCredential(TOKEN_VAR)));

        let err = client
            .link_subscriber_user(1, "dev@example.com")
            .await
            .expect_err("must fail without token");
        assert!(matches!(err, HookError::MissingCredential(TOKEN_VAR)));
    }

    #[tokio::test]
    async fn missing_jwt_secret_fails_the_identity_update() {
        let client = ForteplusClient::new(ProvisioningSettings {
            token: Some("tok".to_string()),
            jwt_secret: None,
            ..ProvisioningSettings::default()
        })
        .expect("client builds");

        let err = client
            .update_admin_email("dev@example.com", "rj_d1_901_varejo")
            .await
            .expect_err("must fail without secret");
        assert!(matches!(err, HookError::MissingCredential(JWT_SECRET_VAR)));
    }
}
