// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

use std::collections::HashMap;
use std::sync::Arc;

use tracing::{info, warn};

use crate::definition::ServiceDefinition;
use crate::minio_instance::MinioInstance;
use crate::mysql_instance::MysqlInstance;
use crate::mysql_shared::{SharedMysql, SharedMysqlSettings};
use crate::provider::ServiceProvider;

/// Read-only registry of service providers keyed by service id.
///
/// Registration order is preserved for catalog listings. Registering a second
/// provider under an existing id replaces the first in place.
pub struct Catalog {
	providers: Vec<Arc<dyn ServiceProvider>>,
	by_id: HashMap<String, usize>,
}

impl Catalog {
	pub fn new(providers: Vec<Arc<dyn ServiceProvider>>) -> Self {
		let mut catalog = Self {
			providers: Vec::with_capacity(providers.len()),
			by_id: HashMap::new(),
		};
		for provider in providers {
			let id = provider.definition().id.clone();
			match catalog.by_id.get(&id) {
				Some(&index) => {
					warn!(service_id = %id, "Duplicate service id; replacing earlier provider");
					catalog.providers[index] = provider;
				}
				None => {
					catalog.by_id.insert(id, catalog.providers.len());
					catalog.providers.push(provider);
				}
			}
		}
		catalog
	}

	/// The built-in MySQL and MinIO providers followed by one shared MySQL
	/// provider per configured server.
	pub fn with_shared_mysql(shared: Vec<SharedMysqlSettings>) -> Self {
		let mut providers: Vec<Arc<dyn ServiceProvider>> =
			vec![Arc::new(MysqlInstance::new()), Arc::new(MinioInstance::new())];
		providers.extend(
			shared
				.into_iter()
				.map(|settings| Arc::new(SharedMysql::new(settings)) as Arc<dyn ServiceProvider>),
		);

		let catalog = Self::new(providers);
		info!(services = catalog.len(), "Service catalog loaded");
		catalog
	}

	pub fn get(&self, service_id: &str) -> Option<Arc<dyn ServiceProvider>> {
		self
			.by_id
			.get(service_id)
			.map(|&index| self.providers[index].clone())
	}

	pub fn definitions(&self) -> Vec<ServiceDefinition> {
		self
			.providers
			.iter()
			.map(|provider| provider.definition().clone())
			.collect()
	}

	pub fn len(&self) -> usize {
		self.providers.len()
	}

	pub fn is_empty(&self) -> bool {
		self.providers.is_empty()
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use crate::minio_instance::MINIO_INSTANCE_SERVICE_ID;
	use crate::mysql_instance::MYSQL_INSTANCE_SERVICE_ID;
	use broker_common_secret::SecretString;

	fn shared(name: &str, id: &str) -> SharedMysqlSettings {
		SharedMysqlSettings {
			name: name.to_string(),
			id: id.to_string(),
			user: "root".to_string(),
			password: SecretString::new("pw".to_string()),
			host: "db".to_string(),
			port: 3306,
		}
	}

	#[test]
	fn test_builtin_order_lists_mysql_first() {
		let catalog = Catalog::with_shared_mysql(Vec::new());
		let names: Vec<String> = catalog.definitions().into_iter().map(|d| d.name).collect();
		assert_eq!(names, vec!["mysql-instance", "minio-instance"]);
	}

	#[test]
	fn test_lookup_by_id() {
		let catalog = Catalog::with_shared_mysql(vec![shared("main", "shared-1")]);
		assert_eq!(catalog.len(), 3);
		assert!(catalog.get(MYSQL_INSTANCE_SERVICE_ID).is_some());
		assert!(catalog.get(MINIO_INSTANCE_SERVICE_ID).is_some());
		assert_eq!(
			catalog.get("shared-1").unwrap().definition().name,
			"mysql-shared-main"
		);
		assert!(catalog.get("unknown").is_none());
	}

	#[test]
	fn test_duplicate_id_replaces_in_place() {
		let catalog = Catalog::with_shared_mysql(vec![
			shared("first", "shared-1"),
			shared("second", "shared-1"),
		]);
		assert_eq!(catalog.len(), 3);
		assert_eq!(
			catalog.get("shared-1").unwrap().definition().name,
			"mysql-shared-second"
		);
		assert_eq!(catalog.definitions()[2].name, "mysql-shared-second");
	}
}
