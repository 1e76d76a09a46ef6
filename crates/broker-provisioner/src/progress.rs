// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

use broker_k8s::ObjectKind;
use tracing::info;

/// One object created or deleted by the orchestrator.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ProgressEvent {
	Created {
		kind: ObjectKind,
		namespace: String,
		name: String,
	},
	Deleted {
		kind: ObjectKind,
		namespace: String,
		name: String,
	},
}

/// Receives one event per object the orchestrator creates or deletes.
pub trait ProgressListener: Send + Sync {
	fn notify(&self, event: &ProgressEvent);
}

/// Default listener: emits each event as a structured log line.
#[derive(Debug, Default, Clone, Copy)]
pub struct TracingProgress;

impl ProgressListener for TracingProgress {
	fn notify(&self, event: &ProgressEvent) {
		match event {
			ProgressEvent::Created {
				kind,
				namespace,
				name,
			} => info!(%kind, %namespace, %name, "Created object"),
			ProgressEvent::Deleted {
				kind,
				namespace,
				name,
			} => info!(%kind, %namespace, %name, "Deleted object"),
		}
	}
}
