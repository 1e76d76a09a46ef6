// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! HTTP routes for the Open Service Broker v2 API.

use std::sync::Arc;

use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::routing::{get, put};
use axum::{Json, Router};
use tower_http::trace::TraceLayer;

use crate::broker::{
	BindRequest, Broker, DeprovisionRequest, LastOperationRequest, ProvisionRequest, UnbindRequest,
	UpdateRequest,
};
use crate::error::BrokerError;
use crate::osb::{
	AcceptsIncompleteQuery, BindBody, BindResponseBody, CatalogResponse, DeprovisionQuery,
	EmptyResponse, HealthResponse, PlatformContext, ProvisionBody, UnbindQuery,
	UpdateBody,
};

type SharedBroker = Arc<Broker>;

pub fn create_router(broker: SharedBroker) -> Router {
	Router::new()
		.route("/health", get(health))
		.route("/v2/catalog", get(catalog))
		.route(
			"/v2/service_instances/{instance_id}",
			put(provision).patch(update).delete(deprovision),
		)
		.route(
			"/v2/service_instances/{instance_id}/last_operation",
			get(last_operation),
		)
		.route(
			"/v2/service_instances/{instance_id}/service_bindings/{binding_id}",
			put(bind).delete(unbind),
		)
		.layer(TraceLayer::new_for_http())
		.with_state(broker)
}

async fn health() -> Json<HealthResponse> {
	Json(HealthResponse { status: "ok" })
}

async fn catalog(State(broker): State<SharedBroker>) -> Json<CatalogResponse> {
	Json(CatalogResponse {
		services: broker.catalog(),
	})
}

fn accepted_or(is_async: bool, done: StatusCode) -> StatusCode {
	if is_async {
		StatusCode::ACCEPTED
	} else {
		done
	}
}

async fn provision(
	State(broker): State<SharedBroker>,
	Path(instance_id): Path<String>,
	Query(query): Query<AcceptsIncompleteQuery>,
	Json(body): Json<ProvisionBody>,
) -> Result<(StatusCode, Json<EmptyResponse>), BrokerError> {
	let response = broker
		.provision(ProvisionRequest {
			service_id: body.service_id,
			instance_id,
			plan_id: body.plan_id,
			namespace: PlatformContext::namespace(body.context),
			accepts_incomplete: query.accepts_incomplete,
		})
		.await?;
	Ok((
		accepted_or(response.is_async, StatusCode::CREATED),
		Json(EmptyResponse {}),
	))
}

async fn update(
	State(broker): State<SharedBroker>,
	Path(instance_id): Path<String>,
	Query(query): Query<AcceptsIncompleteQuery>,
	Json(body): Json<UpdateBody>,
) -> (StatusCode, Json<EmptyResponse>) {
	tracing::debug!(service_id = %body.service_id, plan_id = ?body.plan_id, "Update requested");
	let response = broker.update(&UpdateRequest {
		instance_id,
		accepts_incomplete: query.accepts_incomplete,
	});
	(
		accepted_or(response.is_async, StatusCode::OK),
		Json(EmptyResponse {}),
	)
}

async fn deprovision(
	State(broker): State<SharedBroker>,
	Path(instance_id): Path<String>,
	Query(query): Query<DeprovisionQuery>,
) -> Result<(StatusCode, Json<EmptyResponse>), BrokerError> {
	let response = broker
		.deprovision(DeprovisionRequest {
			service_id: query.service_id,
			instance_id,
			plan_id: query.plan_id,
			accepts_incomplete: query.accepts_incomplete,
		})
		.await?;
	Ok((
		accepted_or(response.is_async, StatusCode::OK),
		Json(EmptyResponse {}),
	))
}

async fn last_operation(
	State(broker): State<SharedBroker>,
	Path(instance_id): Path<String>,
) -> Json<EmptyResponse> {
	broker.last_operation(&LastOperationRequest { instance_id });
	Json(EmptyResponse {})
}

async fn bind(
	State(broker): State<SharedBroker>,
	Path((instance_id, binding_id)): Path<(String, String)>,
	Query(query): Query<AcceptsIncompleteQuery>,
	Json(body): Json<BindBody>,
) -> Result<(StatusCode, Json<BindResponseBody>), BrokerError> {
	tracing::debug!(plan_id = %body.plan_id, "Bind requested");
	let response = broker
		.bind(BindRequest {
			service_id: body.service_id,
			instance_id,
			binding_id,
			namespace: PlatformContext::namespace(body.context),
			accepts_incomplete: query.accepts_incomplete,
		})
		.await?;
	Ok((
		accepted_or(response.is_async, StatusCode::CREATED),
		Json(BindResponseBody {
			credentials: response.credentials,
		}),
	))
}

async fn unbind(
	State(broker): State<SharedBroker>,
	Path((instance_id, binding_id)): Path<(String, String)>,
	Query(query): Query<UnbindQuery>,
) -> Result<(StatusCode, Json<EmptyResponse>), BrokerError> {
	tracing::debug!(plan_id = ?query.plan_id, "Unbind requested");
	broker
		.unbind(UnbindRequest {
			service_id: query.service_id.filter(|id| !id.is_empty()),
			binding_id,
			instance_id: Some(instance_id),
		})
		.await?;
	Ok((StatusCode::OK, Json(EmptyResponse {})))
}
