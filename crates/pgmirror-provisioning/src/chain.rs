// Copyright (C) 2025 SyncMyOrders Sp. z o.o.
// SPDX-License-Identifier: AGPL-3.0-or-later
//! The fetch -> clone -> link provisioning chain.

use async_trait::async_trait;
use serde_json::Value;
use tracing::{info, warn};

use pgmirror_core::error::HookError;
use pgmirror_core::naming;
use pgmirror_core::ports::{ChainOutcome, ProvisioningHooks, ProvisioningResult};

use crate::client::SubscriptionApi;

/// Drives the provisioning chain over any [`SubscriptionApi`].
pub struct ProvisioningChain<A> {
    api: A,
    operator_email: Option<String>,
}

impl<A: SubscriptionApi> ProvisioningChain<A> {
    pub fn new(api: A, operator_email: Option<String>) -> Self {
        Self {
            api,
            operator_email,
        }
    }

    fn required_field<'v>(
        subscription: &'v Value,
        field: &str,
    ) -> Result<&'v Value, HookError> {
        subscription.get(field).ok_or_else(|| HookError::Malformed {
            url: "assinaturas/".to_string(),
            reason: format!("cloned subscription has no '{field}' field"),
        })
    }
}

#[async_trait]
impl<A: SubscriptionApi> ProvisioningHooks for ProvisioningChain<A> {
    async fn run_chain(&self, correlation_key: &str) -> Result<ChainOutcome, HookError> {
        info!(key = %correlation_key, "fetching production subscription");
        let Some(subscription) = self.api.fetch_subscription(correlation_key).await? else {
            return Ok(ChainOutcome::Skipped);
        };

        info!(key = %correlation_key, "cloning subscription into development");
        let clone = self.api.clone_subscription(&subscription).await?;

        let dev_id = Self::required_field(&clone, "id")?
            .as_i64()
            .ok_or_else(|| HookError::Malformed {
                url: "assinaturas/".to_string(),
                reason: "cloned subscription id is not an integer".to_string(),
            })?;
        let display_name = Self::required_field(&clone, "ss_nome_fantasia")?
            .as_str()
            .unwrap_or_default()
            .to_string();
        let region = Self::required_field(&clone, "ss_uf")?
            .as_str()
            .unwrap_or_default()
            .to_string();

        let target_database =
            naming::derive_target_name(&dev_id.to_string(), &display_name, &region);
        info!(dev_id, target = %target_database, "development subscription created");

        // The link step needs the operator; without an email it is skipped
        // with a warning, but a failing link call aborts the chain.
        match &self.operator_email {
            Some(email) => {
                self.api.link_subscriber_user(dev_id, email).await?;
                info!(dev_id, email = %email, "subscriber-user link created");
            }
            None => warn!(
                dev_id,
                "operator email not configured; subscriber-user link skipped"
            ),
        }

        Ok(ChainOutcome::Completed(ProvisioningResult {
            prod_id: correlation_key.to_string(),
            dev_id,
            subscription: clone,
            target_database,
        }))
    }

    async fn update_admin_email(
        &self,
        new_email: &str,
        target_database: &str,
    ) -> Result<(), HookError> {
        self.api.update_admin_email(new_email, target_database).await
    }

    fn operator_email(&self) -> Option<&str> {
        self.operator_email.as_deref()
    }
}
