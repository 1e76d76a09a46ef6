// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Open Service Broker that provisions backing services on Kubernetes.
//!
//! ```text
//!   HTTP (OSB v2)          dispatcher               providers
//! ┌──────────────┐     ┌───────────────┐     ┌──────────────────┐
//! │ routes       │────▶│ Broker        │────▶│ ServiceProvider  │
//! └──────────────┘     │  lock + tasks │     └────────┬─────────┘
//!                      └───────┬───────┘              │ ResourceBundle
//!                              ▼                      ▼
//!                      ┌───────────────┐     ┌──────────────────┐
//!                      │ Orchestrator  │◀────│ bundle + labels  │
//!                      └───────┬───────┘     └──────────────────┘
//!                              ▼
//!                         K8sClient
//! ```

pub mod broker;
pub mod error;
pub mod osb;
pub mod routes;
pub mod tasks;

pub use broker::{
	BindRequest, BindResponse, Broker, DeprovisionRequest, LastOperationRequest,
	OperationResponse, ProvisionRequest, UnbindRequest, UpdateRequest,
};
pub use error::{BrokerError, ErrorResponse};
pub use routes::create_router;
pub use tasks::{BackgroundTasks, OperationKey};
