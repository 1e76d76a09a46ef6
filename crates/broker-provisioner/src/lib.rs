// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Resource bundle orchestration for the service broker.
//!
//! A [`ResourceBundle`] is the unit of work: secrets, config maps, volume
//! claims, deployments, services and jobs that belong to one provision,
//! deprovision, bind or debind step. The [`Orchestrator`] applies a bundle in
//! dependency order and blocks on the [`ReadinessGate`] after every
//! deployment and job, so a successful `create` means the instance is usable.
//!
//! # Architecture
//!
//! ```text
//! ┌──────────────────┐     ┌────────────────┐     ┌──────────────┐
//! │ ResourceBundle   │────▶│  Orchestrator  │────▶│  K8sClient   │
//! │ (labels + objs)  │     │ create/delete  │     │ (kube / mock)│
//! └──────────────────┘     └───────┬────────┘     └──────────────┘
//!                                  │
//!                          ┌───────▼────────┐
//!                          │ ReadinessGate  │
//!                          │ poll + timeout │
//!                          └────────────────┘
//! ```

pub mod bundle;
pub mod config;
pub mod error;
pub mod orchestrator;
pub mod progress;
pub mod readiness;

pub use bundle::ResourceBundle;
pub use config::OrchestratorConfig;
pub use error::ProvisionerError;
pub use orchestrator::Orchestrator;
pub use progress::{ProgressEvent, ProgressListener, TracingProgress};
pub use readiness::{deployment_ready, job_finished, ReadinessGate};
