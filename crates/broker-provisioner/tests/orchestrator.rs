// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

use std::collections::BTreeMap;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use broker_k8s::{
	ConfigMap, Deployment, DeploymentSpec, Job, MockEvent, MockK8sClient, MockOp, ObjectKind,
	ObjectMeta, PersistentVolumeClaim, ReadinessMode, Secret, Service,
};
use broker_provisioner::{
	Orchestrator, OrchestratorConfig, ProgressEvent, ProgressListener, ProvisionerError,
	ResourceBundle,
};

#[derive(Default)]
struct RecordingProgress {
	events: Mutex<Vec<ProgressEvent>>,
}

impl ProgressListener for RecordingProgress {
	fn notify(&self, event: &ProgressEvent) {
		self.events.lock().unwrap().push(event.clone());
	}
}

fn meta(name: &str) -> ObjectMeta {
	ObjectMeta {
		name: Some(name.to_string()),
		..Default::default()
	}
}

fn full_bundle() -> ResourceBundle {
	let mut bundle = ResourceBundle::new("ns1");
	bundle.labels = BTreeMap::from([("service-instance-id".to_string(), "i1".to_string())]);
	bundle.secrets.push(Secret {
		metadata: meta("secret"),
		..Default::default()
	});
	bundle.config_maps.push(ConfigMap {
		metadata: meta("scripts"),
		..Default::default()
	});
	bundle.volume_claims.push(PersistentVolumeClaim {
		metadata: meta("data"),
		..Default::default()
	});
	bundle.deployments.push(Deployment {
		metadata: meta("server"),
		spec: Some(DeploymentSpec {
			replicas: Some(1),
			..Default::default()
		}),
		..Default::default()
	});
	bundle.services.push(Service {
		metadata: meta("server"),
		..Default::default()
	});
	bundle.jobs.push(Job {
		metadata: meta("init"),
		..Default::default()
	});
	bundle
}

fn fast_config() -> OrchestratorConfig {
	OrchestratorConfig {
		poll_interval: Duration::from_secs(1),
		ready_timeout: Duration::from_secs(30),
	}
}

fn kinds(events: &[MockEvent], op: MockOp) -> Vec<ObjectKind> {
	events
		.iter()
		.filter(|e| e.op == op)
		.map(|e| e.kind)
		.collect()
}

#[tokio::test]
async fn test_create_applies_kinds_in_dependency_order() {
	let mock = Arc::new(MockK8sClient::new());
	let orchestrator = Orchestrator::new(mock.clone(), &fast_config());

	orchestrator.create(full_bundle()).await.unwrap();

	assert_eq!(
		kinds(&mock.events(), MockOp::Create),
		ObjectKind::CREATE_ORDER.to_vec()
	);
}

#[tokio::test]
async fn test_create_stamps_bundle_labels_on_every_object() {
	let mock = Arc::new(MockK8sClient::new());
	let orchestrator = Orchestrator::new(mock.clone(), &fast_config());

	orchestrator.create(full_bundle()).await.unwrap();

	let secret = mock.secret("ns1", "secret").unwrap();
	assert_eq!(
		secret
			.metadata
			.labels
			.unwrap()
			.get("service-instance-id")
			.map(String::as_str),
		Some("i1")
	);
	let job = mock.job("ns1", "init").unwrap();
	assert!(job
		.metadata
		.labels
		.unwrap()
		.contains_key("service-instance-id"));
}

#[tokio::test]
async fn test_create_then_delete_leaves_nothing() {
	let mock = Arc::new(MockK8sClient::new());
	let orchestrator = Orchestrator::new(mock.clone(), &fast_config());
	let bundle = full_bundle();

	orchestrator.create(bundle.clone()).await.unwrap();
	assert_eq!(mock.object_count(), 6);

	orchestrator.delete(&bundle).await.unwrap();
	assert_eq!(mock.object_count(), 0);

	let mut reversed = ObjectKind::CREATE_ORDER.to_vec();
	reversed.reverse();
	assert_eq!(kinds(&mock.events(), MockOp::Delete), reversed);
}

#[tokio::test]
async fn test_create_aborts_on_first_failure_without_rollback() {
	let mock = Arc::new(MockK8sClient::new());
	mock.fail_on(MockOp::Create, ObjectKind::PersistentVolumeClaim, "data");
	let orchestrator = Orchestrator::new(mock.clone(), &fast_config());

	let err = orchestrator.create(full_bundle()).await.unwrap_err();
	assert!(matches!(err, ProvisionerError::K8sError(_)));

	assert!(mock.contains(ObjectKind::Secret, "ns1", "secret"));
	assert!(mock.contains(ObjectKind::ConfigMap, "ns1", "scripts"));
	assert!(!mock.contains(ObjectKind::Deployment, "ns1", "server"));
	assert_eq!(mock.object_count(), 2);
}

#[tokio::test]
async fn test_delete_aborts_on_first_failure() {
	let mock = Arc::new(MockK8sClient::new());
	let orchestrator = Orchestrator::new(mock.clone(), &fast_config());
	let bundle = full_bundle();
	orchestrator.create(bundle.clone()).await.unwrap();

	mock.fail_on(MockOp::Delete, ObjectKind::Deployment, "server");
	assert!(orchestrator.delete(&bundle).await.is_err());

	assert!(!mock.contains(ObjectKind::Job, "ns1", "init"));
	assert!(!mock.contains(ObjectKind::Service, "ns1", "server"));
	assert!(mock.contains(ObjectKind::Deployment, "ns1", "server"));
	assert!(mock.contains(ObjectKind::Secret, "ns1", "secret"));
}

#[tokio::test(start_paused = true)]
async fn test_services_wait_for_deployment_readiness() {
	let mock = Arc::new(MockK8sClient::with_readiness(ReadinessMode::AfterPolls(2)));
	let orchestrator = Orchestrator::new(mock.clone(), &fast_config());

	orchestrator.create(full_bundle()).await.unwrap();

	let events = mock.events();
	let deployment_at = events
		.iter()
		.position(|e| e.kind == ObjectKind::Deployment)
		.unwrap();
	let service_at = events
		.iter()
		.position(|e| e.kind == ObjectKind::Service)
		.unwrap();
	assert!(deployment_at < service_at);
}

#[tokio::test(start_paused = true)]
async fn test_stalled_deployment_times_out_before_services() {
	let mock = Arc::new(MockK8sClient::with_readiness(ReadinessMode::Never));
	let orchestrator = Orchestrator::new(mock.clone(), &fast_config());

	let err = orchestrator.create(full_bundle()).await.unwrap_err();
	assert!(matches!(
		err,
		ProvisionerError::ReadinessTimeout {
			kind: ObjectKind::Deployment,
			..
		}
	));
	assert!(!mock.contains(ObjectKind::Service, "ns1", "server"));
	assert!(!mock.contains(ObjectKind::Job, "ns1", "init"));
}

#[tokio::test]
async fn test_progress_listener_sees_one_event_per_object() {
	let mock = Arc::new(MockK8sClient::new());
	let progress = Arc::new(RecordingProgress::default());
	let orchestrator =
		Orchestrator::new(mock.clone(), &fast_config()).with_progress(progress.clone());
	let bundle = full_bundle();

	orchestrator.create(bundle.clone()).await.unwrap();
	orchestrator.delete(&bundle).await.unwrap();

	let events = progress.events.lock().unwrap();
	let created = events
		.iter()
		.filter(|e| matches!(e, ProgressEvent::Created { .. }))
		.count();
	let deleted = events
		.iter()
		.filter(|e| matches!(e, ProgressEvent::Deleted { .. }))
		.count();
	assert_eq!(created, 6);
	assert_eq!(deleted, 6);
	assert_eq!(
		events[0],
		ProgressEvent::Created {
			kind: ObjectKind::Secret,
			namespace: "ns1".to_string(),
			name: "secret".to_string(),
		}
	);
}

#[tokio::test]
async fn test_empty_namespace_is_rejected() {
	let mock = Arc::new(MockK8sClient::new());
	let orchestrator = Orchestrator::new(mock.clone(), &fast_config());
	let mut bundle = full_bundle();
	bundle.namespace = String::new();

	assert!(matches!(
		orchestrator.delete(&bundle).await,
		Err(ProvisionerError::EmptyNamespace)
	));
	assert!(mock.events().is_empty());
}

fn workload(name: &str) -> Deployment {
	Deployment {
		metadata: meta(name),
		spec: Some(DeploymentSpec {
			replicas: Some(1),
			..Default::default()
		}),
		..Default::default()
	}
}

fn multi_bundle() -> ResourceBundle {
	let mut bundle = ResourceBundle::new("ns1");
	for name in ["s1", "s2"] {
		bundle.secrets.push(Secret {
			metadata: meta(name),
			..Default::default()
		});
	}
	for name in ["d1", "d2"] {
		bundle.deployments.push(workload(name));
	}
	for name in ["svc1", "svc2"] {
		bundle.services.push(Service {
			metadata: meta(name),
			..Default::default()
		});
	}
	for name in ["j1", "j2"] {
		bundle.jobs.push(Job {
			metadata: meta(name),
			..Default::default()
		});
	}
	bundle
}

fn names(events: &[MockEvent], op: MockOp, kind: ObjectKind) -> Vec<String> {
	events
		.iter()
		.filter(|e| e.op == op && e.kind == kind)
		.map(|e| e.name.clone())
		.collect()
}

fn sequence(events: &[MockEvent], op: MockOp) -> Vec<String> {
	events
		.iter()
		.filter(|e| e.op == op)
		.map(|e| e.name.clone())
		.collect()
}

#[tokio::test(start_paused = true)]
async fn test_every_deployment_created_before_readiness_wait() {
	let mock = Arc::new(MockK8sClient::with_readiness(ReadinessMode::Never));
	let orchestrator = Orchestrator::new(mock.clone(), &fast_config());

	let mut bundle = ResourceBundle::new("ns1");
	bundle.deployments.push(workload("d1"));
	bundle.deployments.push(workload("d2"));

	let err = orchestrator.create(bundle).await.unwrap_err();
	assert!(matches!(
		err,
		ProvisionerError::ReadinessTimeout {
			kind: ObjectKind::Deployment,
			..
		}
	));
	assert_eq!(
		names(&mock.events(), MockOp::Create, ObjectKind::Deployment),
		vec!["d1", "d2"]
	);
}

#[tokio::test(start_paused = true)]
async fn test_every_job_created_before_completion_wait() {
	let mock = Arc::new(MockK8sClient::with_readiness(ReadinessMode::Never));
	let orchestrator = Orchestrator::new(mock.clone(), &fast_config());

	let mut bundle = ResourceBundle::new("ns1");
	for name in ["j1", "j2"] {
		bundle.jobs.push(Job {
			metadata: meta(name),
			..Default::default()
		});
	}

	let err = orchestrator.create(bundle).await.unwrap_err();
	assert!(matches!(
		err,
		ProvisionerError::ReadinessTimeout {
			kind: ObjectKind::Job,
			..
		}
	));
	assert_eq!(
		names(&mock.events(), MockOp::Create, ObjectKind::Job),
		vec!["j1", "j2"]
	);
}

#[tokio::test(start_paused = true)]
async fn test_multi_object_bundle_becomes_ready_after_polls() {
	let mock = Arc::new(MockK8sClient::with_readiness(ReadinessMode::AfterPolls(3)));
	let orchestrator = Orchestrator::new(mock.clone(), &fast_config());

	let started = tokio::time::Instant::now();
	orchestrator.create(multi_bundle()).await.unwrap();

	assert!(started.elapsed() < fast_config().ready_timeout);
	assert_eq!(mock.object_count(), 8);
}

#[tokio::test]
async fn test_multi_object_create_and_delete_order() {
	let mock = Arc::new(MockK8sClient::new());
	let orchestrator = Orchestrator::new(mock.clone(), &fast_config());
	let bundle = multi_bundle();

	orchestrator.create(bundle.clone()).await.unwrap();
	assert_eq!(
		sequence(&mock.events(), MockOp::Create),
		vec!["s1", "s2", "d1", "d2", "svc1", "svc2", "j1", "j2"]
	);

	orchestrator.delete(&bundle).await.unwrap();
	assert_eq!(
		sequence(&mock.events(), MockOp::Delete),
		vec!["j1", "j2", "svc1", "svc2", "d1", "d2", "s1", "s2"]
	);
	assert_eq!(mock.object_count(), 0);
}

#[tokio::test]
async fn test_delete_failure_within_kind_keeps_later_objects() {
	let mock = Arc::new(MockK8sClient::new());
	let orchestrator = Orchestrator::new(mock.clone(), &fast_config());
	let bundle = multi_bundle();
	orchestrator.create(bundle.clone()).await.unwrap();

	mock.fail_on(MockOp::Delete, ObjectKind::Deployment, "d1");
	assert!(orchestrator.delete(&bundle).await.is_err());

	assert!(!mock.contains(ObjectKind::Job, "ns1", "j2"));
	assert!(!mock.contains(ObjectKind::Service, "ns1", "svc2"));
	assert!(mock.contains(ObjectKind::Deployment, "ns1", "d1"));
	assert!(mock.contains(ObjectKind::Deployment, "ns1", "d2"));
	assert!(mock.contains(ObjectKind::Secret, "ns1", "s1"));
}
