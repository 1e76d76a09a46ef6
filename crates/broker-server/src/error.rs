// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use broker_k8s::K8sError;
use broker_provisioner::ProvisionerError;
use serde::Serialize;

#[derive(Debug, thiserror::Error)]
pub enum BrokerError {
	#[error("Invalid service '{0}'")]
	InvalidService(String),

	#[error(transparent)]
	Provisioner(#[from] ProvisionerError),

	#[error(transparent)]
	K8s(#[from] K8sError),

	#[error("background operation aborted: {0}")]
	Task(#[from] tokio::task::JoinError),
}

impl BrokerError {
	pub fn status(&self) -> StatusCode {
		match self {
			BrokerError::InvalidService(_) => StatusCode::BAD_REQUEST,
			BrokerError::Provisioner(_) | BrokerError::K8s(_) | BrokerError::Task(_) => {
				StatusCode::INTERNAL_SERVER_ERROR
			}
		}
	}

	/// Short machine-readable code for the `error` field of the response body.
	pub fn code(&self) -> &'static str {
		match self {
			BrokerError::InvalidService(_) => "InvalidService",
			BrokerError::Provisioner(ProvisionerError::ReadinessTimeout { .. }) => "ReadinessTimeout",
			BrokerError::Provisioner(_) => "ProvisioningFailed",
			BrokerError::K8s(_) => "ClusterError",
			BrokerError::Task(_) => "InternalError",
		}
	}
}

/// Error body as described by the Open Service Broker API.
#[derive(Debug, Serialize)]
pub struct ErrorResponse {
	pub error: String,
	pub description: String,
}

impl IntoResponse for BrokerError {
	fn into_response(self) -> Response {
		let status = self.status();
		if status.is_server_error() {
			tracing::error!(error = %self, "Broker operation failed");
		} else {
			tracing::debug!(error = %self, "Rejected broker request");
		}

		let body = ErrorResponse {
			error: self.code().to_string(),
			description: self.to_string(),
		};
		(status, Json(body)).into_response()
	}
}
