// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Background execution of orchestrator work.
//!
//! Operations dispatched asynchronously run as detached tokio tasks. Their
//! handles are retained per [`OperationKey`] so a caller can still await the
//! outcome; completed handles are pruned whenever a new task is spawned.

use std::collections::HashMap;
use std::fmt;
use std::future::Future;
use std::sync::{Mutex, PoisonError};

use broker_provisioner::ProvisionerError;
use tokio::task::JoinHandle;
use tracing::{error, info};

use crate::error::BrokerError;

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum OperationKey {
	Provision { instance_id: String },
	Deprovision { instance_id: String },
	Bind { instance_id: String, binding_id: String },
}

impl OperationKey {
	pub fn provision(instance_id: impl Into<String>) -> Self {
		OperationKey::Provision {
			instance_id: instance_id.into(),
		}
	}

	pub fn deprovision(instance_id: impl Into<String>) -> Self {
		OperationKey::Deprovision {
			instance_id: instance_id.into(),
		}
	}

	pub fn bind(instance_id: impl Into<String>, binding_id: impl Into<String>) -> Self {
		OperationKey::Bind {
			instance_id: instance_id.into(),
			binding_id: binding_id.into(),
		}
	}
}

impl fmt::Display for OperationKey {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		match self {
			OperationKey::Provision { instance_id } => write!(f, "provision:{instance_id}"),
			OperationKey::Deprovision { instance_id } => write!(f, "deprovision:{instance_id}"),
			OperationKey::Bind {
				instance_id,
				binding_id,
			} => write!(f, "bind:{instance_id}/{binding_id}"),
		}
	}
}

type TaskResult = Result<(), ProvisionerError>;

#[derive(Default)]
pub struct BackgroundTasks {
	handles: Mutex<HashMap<OperationKey, JoinHandle<TaskResult>>>,
}

impl BackgroundTasks {
	pub fn new() -> Self {
		Self::default()
	}

	/// Runs `work` on the runtime. A failure is logged; it is also returned
	/// to whoever later calls [`BackgroundTasks::wait`] for the same key.
	///
	/// Spawning under a key that still has a running task detaches the older
	/// task without cancelling it.
	pub fn spawn<F>(&self, key: OperationKey, work: F)
	where
		F: Future<Output = TaskResult> + Send + 'static,
	{
		let label = key.to_string();
		let handle = tokio::spawn(async move {
			let result = work.await;
			match &result {
				Ok(()) => info!(operation = %label, "Background operation finished"),
				Err(e) => error!(operation = %label, error = %e, "Background operation failed"),
			}
			result
		});

		let mut handles = self.handles.lock().unwrap_or_else(PoisonError::into_inner);
		handles.retain(|_, handle| !handle.is_finished());
		handles.insert(key, handle);
	}

	/// Awaits the task last spawned under `key`. `None` when no such task is
	/// retained (never spawned, already waited on, or pruned after finishing).
	pub async fn wait(&self, key: &OperationKey) -> Option<Result<(), BrokerError>> {
		let handle = self
			.handles
			.lock()
			.unwrap_or_else(PoisonError::into_inner)
			.remove(key)?;

		Some(match handle.await {
			Ok(result) => result.map_err(BrokerError::from),
			Err(e) => Err(BrokerError::from(e)),
		})
	}

	/// Number of retained tasks that have not finished.
	pub fn running(&self) -> usize {
		self
			.handles
			.lock()
			.unwrap_or_else(PoisonError::into_inner)
			.values()
			.filter(|handle| !handle.is_finished())
			.count()
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use std::time::Duration;

	#[tokio::test]
	async fn test_wait_returns_task_result() {
		let tasks = BackgroundTasks::new();
		tasks.spawn(OperationKey::provision("i1"), async { Ok(()) });
		tasks.spawn(OperationKey::deprovision("i1"), async {
			Err(ProvisionerError::EmptyNamespace)
		});

		assert!(tasks.wait(&OperationKey::provision("i1")).await.unwrap().is_ok());
		let err = tasks
			.wait(&OperationKey::deprovision("i1"))
			.await
			.unwrap()
			.unwrap_err();
		assert!(matches!(
			err,
			BrokerError::Provisioner(ProvisionerError::EmptyNamespace)
		));
	}

	#[tokio::test]
	async fn test_wait_unknown_key_is_none() {
		let tasks = BackgroundTasks::new();
		assert!(tasks.wait(&OperationKey::bind("i1", "b1")).await.is_none());
	}

	#[tokio::test]
	async fn test_wait_consumes_handle() {
		let tasks = BackgroundTasks::new();
		let key = OperationKey::bind("i1", "b1");
		tasks.spawn(key.clone(), async { Ok(()) });
		assert!(tasks.wait(&key).await.is_some());
		assert!(tasks.wait(&key).await.is_none());
	}

	#[tokio::test(start_paused = true)]
	async fn test_running_counts_unfinished_tasks() {
		let tasks = BackgroundTasks::new();
		tasks.spawn(OperationKey::provision("slow"), async {
			tokio::time::sleep(Duration::from_secs(60)).await;
			Ok(())
		});
		assert_eq!(tasks.running(), 1);

		tasks.wait(&OperationKey::provision("slow")).await.unwrap().unwrap();
		assert_eq!(tasks.running(), 0);
	}

	#[tokio::test]
	async fn test_panicking_task_reports_task_error() {
		let tasks = BackgroundTasks::new();
		tasks.spawn(OperationKey::provision("boom"), async {
			if true {
				panic!("orchestrator panicked");
			}
			Ok(())
		});
		let err = tasks
			.wait(&OperationKey::provision("boom"))
			.await
			.unwrap()
			.unwrap_err();
		assert!(matches!(err, BrokerError::Task(_)));
	}

	#[test]
	fn test_key_display() {
		assert_eq!(OperationKey::bind("i", "b").to_string(), "bind:i/b");
		assert_eq!(OperationKey::deprovision("i").to_string(), "deprovision:i");
	}
}
