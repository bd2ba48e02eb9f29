// Copyright (C) 2025 SyncMyOrders Sp. z o.o.
// SPDX-License-Identifier: AGPL-3.0-or-later
//! pgmirror-provisioning - the remote subscription provisioning chain.
//!
//! When a mirrored database carries a provisioning correlation key, the
//! production subscription behind that key is fetched, cloned into the
//! development environment, and linked to the operating developer. This
//! crate implements that chain, plus the post-restore identity fix-up that
//! re-points the restored database's admin user at the developer.
//!
//! All remote calls go through [`client::ForteplusClient`]; the chain logic
//! in [`chain::ProvisioningChain`] is generic over the [`client::SubscriptionApi`]
//! trait so it can be tested without a network.

pub mod chain;
pub mod client;
pub mod settings;
pub mod token;

pub use chain::ProvisioningChain;
pub use client::{ForteplusClient, SubscriptionApi};
pub use settings::ProvisioningSettings;
