// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Builders for the cluster objects the providers assemble into bundles.

use std::collections::BTreeMap;

use broker_k8s::{
	ByteString, ConfigMap, ConfigMapVolumeSource, Container, ContainerPort, Deployment,
	DeploymentSpec, EnvVar, EnvVarSource, IntOrString, Job, JobSpec, LabelSelector, ObjectMeta,
	PersistentVolumeClaim, PersistentVolumeClaimSpec, PersistentVolumeClaimVolumeSource, PodSpec,
	PodTemplateSpec, Probe, Quantity, Secret, SecretKeySelector, Service, ServicePort,
	ServiceSpec, TCPSocketAction, Volume, VolumeMount, VolumeResourceRequirements,
};

use crate::labels::APP_LABEL;

const SCRIPT_VOLUME: &str = "config-volume";
const SCRIPT_MODE: i32 = 0o500;
const JOB_DEADLINE_SECS: i64 = 120;

pub fn object_meta(name: impl Into<String>) -> ObjectMeta {
	ObjectMeta {
		name: Some(name.into()),
		..Default::default()
	}
}

pub fn opaque_secret(name: impl Into<String>, data: BTreeMap<String, String>) -> Secret {
	Secret {
		metadata: object_meta(name),
		type_: Some("Opaque".to_string()),
		data: Some(
			data
				.into_iter()
				.map(|(key, value)| (key, ByteString(value.into_bytes())))
				.collect(),
		),
		..Default::default()
	}
}

/// All values of a secret as strings. `data` wins over `string_data` for a
/// key present in both.
pub fn secret_string_data(secret: &Secret) -> BTreeMap<String, String> {
	let mut values = secret.string_data.clone().unwrap_or_default();
	if let Some(data) = &secret.data {
		for (key, value) in data {
			values.insert(key.clone(), String::from_utf8_lossy(&value.0).into_owned());
		}
	}
	values
}

pub fn config_map(name: impl Into<String>, data: &[(&str, &str)]) -> ConfigMap {
	ConfigMap {
		metadata: object_meta(name),
		data: Some(
			data
				.iter()
				.map(|(key, value)| (key.to_string(), value.to_string()))
				.collect(),
		),
		..Default::default()
	}
}

pub fn env_value(name: &str, value: impl Into<String>) -> EnvVar {
	EnvVar {
		name: name.to_string(),
		value: Some(value.into()),
		..Default::default()
	}
}

pub fn env_secret(name: &str, secret_name: &str, key: &str) -> EnvVar {
	EnvVar {
		name: name.to_string(),
		value_from: Some(EnvVarSource {
			secret_key_ref: Some(SecretKeySelector {
				name: secret_name.to_owned().into(),
				key: key.to_string(),
				..Default::default()
			}),
			..Default::default()
		}),
		..Default::default()
	}
}

pub fn volume_claim(name: impl Into<String>, storage: &str) -> PersistentVolumeClaim {
	PersistentVolumeClaim {
		metadata: object_meta(name),
		spec: Some(PersistentVolumeClaimSpec {
			access_modes: Some(vec!["ReadWriteOnce".to_string()]),
			resources: Some(VolumeResourceRequirements {
				requests: Some(BTreeMap::from([(
					"storage".to_string(),
					Quantity(storage.to_string()),
				)])),
				..Default::default()
			}),
			..Default::default()
		}),
		..Default::default()
	}
}

fn tcp_readiness_probe(port: i32) -> Probe {
	Probe {
		tcp_socket: Some(TCPSocketAction {
			port: IntOrString::Int(port),
			..Default::default()
		}),
		failure_threshold: Some(1),
		success_threshold: Some(1),
		timeout_seconds: Some(2),
		initial_delay_seconds: Some(10),
		period_seconds: Some(10),
		..Default::default()
	}
}

/// A single-replica server backed by one volume claim.
pub struct ServerDeployment<'a> {
	pub name: &'a str,
	pub container: &'a str,
	pub image: &'a str,
	pub command: Option<Vec<String>>,
	pub port: i32,
	pub env: Vec<EnvVar>,
	pub claim_name: &'a str,
	pub mount_path: &'a str,
}

impl ServerDeployment<'_> {
	pub fn build(self) -> Deployment {
		let app_labels = BTreeMap::from([(APP_LABEL.to_string(), self.name.to_string())]);

		Deployment {
			metadata: object_meta(self.name),
			spec: Some(DeploymentSpec {
				replicas: Some(1),
				selector: LabelSelector {
					match_labels: Some(app_labels.clone()),
					..Default::default()
				},
				template: PodTemplateSpec {
					metadata: Some(ObjectMeta {
						labels: Some(app_labels),
						..Default::default()
					}),
					spec: Some(PodSpec {
						containers: vec![Container {
							name: self.container.to_string(),
							image: Some(self.image.to_string()),
							command: self.command,
							ports: Some(vec![ContainerPort {
								name: Some("tcp".to_string()),
								protocol: Some("TCP".to_string()),
								container_port: self.port,
								..Default::default()
							}]),
							env: Some(self.env),
							readiness_probe: Some(tcp_readiness_probe(self.port)),
							volume_mounts: Some(vec![VolumeMount {
								name: self.claim_name.to_string(),
								mount_path: self.mount_path.to_string(),
								..Default::default()
							}]),
							..Default::default()
						}],
						volumes: Some(vec![Volume {
							name: self.claim_name.to_string(),
							persistent_volume_claim: Some(PersistentVolumeClaimVolumeSource {
								claim_name: self.claim_name.to_string(),
								..Default::default()
							}),
							..Default::default()
						}]),
						..Default::default()
					}),
				},
				..Default::default()
			}),
			..Default::default()
		}
	}
}

/// A load balancer in front of the pods labeled `app=<name>`.
pub fn load_balancer(name: &str, port: i32) -> Service {
	Service {
		metadata: object_meta(name),
		spec: Some(ServiceSpec {
			selector: Some(BTreeMap::from([(APP_LABEL.to_string(), name.to_string())])),
			type_: Some("LoadBalancer".to_string()),
			ports: Some(vec![ServicePort {
				port,
				target_port: Some(IntOrString::Int(port)),
				..Default::default()
			}]),
			..Default::default()
		}),
		..Default::default()
	}
}

/// Where a job's script comes from.
pub enum Script<'a> {
	/// A key of a config map, mounted at `/tmp/<key>`.
	ConfigMap { name: &'a str, key: &'a str },
	/// Passed to `bash -c`.
	Inline(&'a str),
}

/// A run-to-completion job that executes one bash script.
pub struct ScriptJob<'a> {
	pub name: String,
	pub container: &'a str,
	pub image: &'a str,
	pub script: Script<'a>,
	pub env: Vec<EnvVar>,
	pub active_deadline_secs: Option<i64>,
	pub ttl_secs_after_finished: Option<i32>,
}

impl ScriptJob<'_> {
	pub fn build(self) -> Job {
		let (command, volume_mounts, volumes) = match self.script {
			Script::ConfigMap { name, key } => {
				let path = format!("/tmp/{key}");
				(
					vec!["bash".to_string(), path.clone()],
					Some(vec![VolumeMount {
						name: SCRIPT_VOLUME.to_string(),
						mount_path: path,
						read_only: Some(true),
						sub_path: Some(key.to_string()),
						..Default::default()
					}]),
					Some(vec![Volume {
						name: SCRIPT_VOLUME.to_string(),
						config_map: Some(ConfigMapVolumeSource {
							name: name.to_owned().into(),
							default_mode: Some(SCRIPT_MODE),
							..Default::default()
						}),
						..Default::default()
					}]),
				)
			}
			Script::Inline(body) => (
				vec!["bash".to_string(), "-c".to_string(), body.to_string()],
				None,
				None,
			),
		};

		Job {
			metadata: object_meta(self.name),
			spec: Some(JobSpec {
				ttl_seconds_after_finished: self.ttl_secs_after_finished,
				template: PodTemplateSpec {
					metadata: None,
					spec: Some(PodSpec {
						restart_policy: Some("OnFailure".to_string()),
						active_deadline_seconds: Some(
							self.active_deadline_secs.unwrap_or(JOB_DEADLINE_SECS),
						),
						containers: vec![Container {
							name: self.container.to_string(),
							image: Some(self.image.to_string()),
							command: Some(command),
							env: Some(self.env),
							volume_mounts,
							..Default::default()
						}],
						volumes,
						..Default::default()
					}),
				},
				..Default::default()
			}),
			..Default::default()
		}
	}
}

#[cfg(test)]
pub(crate) mod test_support {
	use broker_k8s::{Container, Job};

	pub fn job_container(job: &Job) -> &Container {
		&job.spec.as_ref().unwrap().template.spec.as_ref().unwrap().containers[0]
	}

	pub fn env_literal<'a>(container: &'a Container, name: &str) -> Option<&'a str> {
		container
			.env
			.as_ref()?
			.iter()
			.find(|e| e.name == name)?
			.value
			.as_deref()
	}

	pub fn env_secret_key<'a>(container: &'a Container, name: &str) -> Option<&'a str> {
		let selector = container
			.env
			.as_ref()?
			.iter()
			.find(|e| e.name == name)?
			.value_from
			.as_ref()?
			.secret_key_ref
			.as_ref()?;
		Some(selector.key.as_str())
	}
}
