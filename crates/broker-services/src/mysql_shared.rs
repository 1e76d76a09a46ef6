// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Databases on an externally hosted MySQL server.
//!
//! Nothing is deployed: provisioning records the configured server credentials
//! in a secret in the broker namespace, and each binding creates a database
//! and user on the shared server.

use std::collections::BTreeMap;

use broker_common_secret::{random_alphanumeric, SecretString};
use broker_provisioner::ResourceBundle;

use crate::definition::{ServiceDefinition, ServiceMetadata, ServicePlan};
use crate::labels::{binding_labels, instance_labels};
use crate::provider::{BindingContext, ServiceInstanceContext, ServiceProvider};
use crate::templates::{env_secret, env_value, opaque_secret, Script, ScriptJob};

const IMAGE: &str = "mysql:5.7";
const BINDING_PASSWORD_LEN: usize = 18;

const BIND_SCRIPT: &str = r#"
set -e

export MYSQL_PWD="$MYSQL_ROOT_PASSWORD"

until mysql -u "$MYSQL_USER" -h "$MYSQL_HOST" -P "$MYSQL_PORT" -e ";" > /dev/null 2>&1; do
	echo "Waiting for host '$MYSQL_HOST'"
	sleep 5
done

echo "Creating database '$DB_NAME' and granting privileges to '$DB_USER'"
mysql -u "$MYSQL_USER" -h "$MYSQL_HOST" -P "$MYSQL_PORT" -e "CREATE SCHEMA IF NOT EXISTS $DB_NAME;"
mysql -u "$MYSQL_USER" -h "$MYSQL_HOST" -P "$MYSQL_PORT" -e "CREATE USER IF NOT EXISTS '$DB_USER'@'%' IDENTIFIED BY '$DB_PASSWORD';"
mysql -u "$MYSQL_USER" -h "$MYSQL_HOST" -P "$MYSQL_PORT" -e "GRANT ALL PRIVILEGES ON $DB_NAME.* TO '$DB_USER'@'%';"
mysql -u "$MYSQL_USER" -h "$MYSQL_HOST" -P "$MYSQL_PORT" -e "FLUSH PRIVILEGES;"
"#;

const DEBIND_SCRIPT: &str = r#"
set -e

export MYSQL_PWD="$MYSQL_ROOT_PASSWORD"

until mysql -u "$MYSQL_USER" -h "$MYSQL_HOST" -P "$MYSQL_PORT" -e ";" > /dev/null 2>&1; do
	echo "Waiting for host '$MYSQL_HOST'"
	sleep 5
done

echo "Removing user '$DB_USER'"
mysql -u "$MYSQL_USER" -h "$MYSQL_HOST" -P "$MYSQL_PORT" -e "DROP USER IF EXISTS '$DB_USER';"
"#;

/// Connection details for one externally hosted MySQL server.
#[derive(Debug, Clone)]
pub struct SharedMysqlSettings {
	pub name: String,
	/// Used as both the service id and the plan id.
	pub id: String,
	pub user: String,
	pub password: SecretString,
	pub host: String,
	pub port: u16,
}

pub struct SharedMysql {
	definition: ServiceDefinition,
	settings: SharedMysqlSettings,
}

impl SharedMysql {
	pub fn new(settings: SharedMysqlSettings) -> Self {
		let definition = ServiceDefinition {
			id: settings.id.clone(),
			name: format!("mysql-shared-{}", settings.name),
			description: "A database on a shared mysql instance".to_string(),
			bindable: true,
			metadata: ServiceMetadata {
				display_name: "Shared Mysql Database".to_string(),
				image_url: "https://avatars2.githubusercontent.com/u/19862012?s=200&v=4"
					.to_string(),
			},
			plans: vec![ServicePlan::default_plan(settings.id.clone())],
		};
		Self {
			definition,
			settings,
		}
	}

	/// One server secret per instance, so deprovisioning an instance never
	/// removes credentials another instance still uses.
	fn server_secret_name(&self, instance_id: &str) -> String {
		format!("mysql-shared-{}-{instance_id}-secret", self.settings.name)
	}

	fn server_env(&self, instance_id: &str) -> Vec<broker_k8s::EnvVar> {
		let secret = self.server_secret_name(instance_id);
		vec![
			env_secret("MYSQL_ROOT_PASSWORD", &secret, "password"),
			env_secret("MYSQL_USER", &secret, "user"),
			env_secret("MYSQL_HOST", &secret, "host"),
			env_secret("MYSQL_PORT", &secret, "port"),
		]
	}
}

fn binding_secret_name(binding_id: &str) -> String {
	format!("binding-secret-{binding_id}")
}

/// `<namespace>_<first 8 chars of binding id>` with dashes made SQL-safe.
fn database_name(namespace: &str, binding_id: &str) -> String {
	let prefix: String = binding_id.chars().take(8).collect();
	format!("{namespace}_{prefix}").replace('-', "_")
}

impl ServiceProvider for SharedMysql {
	fn definition(&self) -> &ServiceDefinition {
		&self.definition
	}

	fn host(&self, _instance_id: &str, _namespace: &str) -> String {
		self.settings.host.clone()
	}

	fn provision_bundle(&self, ctx: &ServiceInstanceContext) -> ResourceBundle {
		let mut bundle = ResourceBundle::new(&ctx.global_namespace);
		bundle.labels = instance_labels(&self.definition, ctx);
		bundle.secrets.push(opaque_secret(
			self.server_secret_name(&ctx.instance_id),
			BTreeMap::from([
				("user".to_string(), self.settings.user.clone()),
				(
					"password".to_string(),
					self.settings.password.expose().clone(),
				),
				("host".to_string(), self.settings.host.clone()),
				("port".to_string(), self.settings.port.to_string()),
			]),
		));
		bundle
	}

	fn deprovision_bundle(&self, ctx: &ServiceInstanceContext) -> ResourceBundle {
		ResourceBundle::new(&ctx.global_namespace)
	}

	fn bind_bundle(&self, ctx: &BindingContext) -> ResourceBundle {
		let binding_secret = binding_secret_name(&ctx.binding_id);

		let mut bundle = ResourceBundle::new(&ctx.global_namespace);
		bundle.labels = binding_labels(&self.definition, ctx);
		bundle.secrets.push(opaque_secret(
			&binding_secret,
			BTreeMap::from([
				("host".to_string(), self.host(&ctx.instance_id, &ctx.namespace)),
				("user".to_string(), format!("user-{}", random_alphanumeric(8))),
				("port".to_string(), self.settings.port.to_string()),
				(
					"database".to_string(),
					database_name(&ctx.namespace, &ctx.binding_id),
				),
				(
					"password".to_string(),
					random_alphanumeric(BINDING_PASSWORD_LEN),
				),
			]),
		));

		let mut env = self.server_env(&ctx.instance_id);
		env.push(env_secret("DB_NAME", &binding_secret, "database"));
		env.push(env_secret("DB_USER", &binding_secret, "user"));
		env.push(env_secret("DB_PASSWORD", &binding_secret, "password"));
		bundle.jobs.push(
			ScriptJob {
				name: format!("binding-job-{}", ctx.binding_id),
				container: "mysql",
				image: IMAGE,
				script: Script::Inline(BIND_SCRIPT),
				env,
				active_deadline_secs: None,
				ttl_secs_after_finished: None,
			}
			.build(),
		);
		bundle
	}

	fn debind_bundle(&self, ctx: &BindingContext) -> ResourceBundle {
		let mut env = self.server_env(&ctx.instance_id);
		env.push(match ctx.bound_credentials.get("user") {
			Some(user) => env_value("DB_USER", user.clone()),
			None => env_secret("DB_USER", &binding_secret_name(&ctx.binding_id), "user"),
		});

		let mut bundle = ResourceBundle::new(&ctx.global_namespace);
		bundle.labels = binding_labels(&self.definition, ctx);
		bundle.jobs.push(
			ScriptJob {
				name: format!("debinding-job-{}", ctx.binding_id),
				container: "mysql",
				image: IMAGE,
				script: Script::Inline(DEBIND_SCRIPT),
				env,
				active_deadline_secs: None,
				ttl_secs_after_finished: Some(3600),
			}
			.build(),
		);
		bundle
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use crate::templates::secret_string_data;
	use crate::templates::test_support::{env_secret_key, job_container};
	use broker_k8s::ObjectKind;
	use proptest::prelude::*;

	fn provider() -> SharedMysql {
		SharedMysql::new(SharedMysqlSettings {
			name: "main".to_string(),
			id: "shared-1".to_string(),
			user: "admin".to_string(),
			password: SecretString::new("s3cr3t".to_string()),
			host: "db.example.com".to_string(),
			port: 3307,
		})
	}

	fn instance_ctx() -> ServiceInstanceContext {
		ServiceInstanceContext {
			instance_id: "i1".to_string(),
			plan_id: "shared-1".to_string(),
			namespace: "team-a".to_string(),
			global_namespace: "service-broker".to_string(),
		}
	}

	#[test]
	fn test_definition_uses_configured_id_for_service_and_plan() {
		let provider = provider();
		let definition = provider.definition();
		assert_eq!(definition.name, "mysql-shared-main");
		assert_eq!(definition.id, "shared-1");
		assert_eq!(definition.plans[0].id, "shared-1");
	}

	#[test]
	fn test_provision_echoes_configured_credentials_in_global_namespace() {
		let provider = provider();
		let first = provider.provision_bundle(&instance_ctx());
		let second = provider.provision_bundle(&instance_ctx());

		assert_eq!(first.namespace, "service-broker");
		assert_eq!(
			first.names(ObjectKind::Secret),
			vec!["mysql-shared-main-i1-secret"]
		);
		let data = secret_string_data(&first.secrets[0]);
		assert_eq!(data.get("user").map(String::as_str), Some("admin"));
		assert_eq!(data.get("password").map(String::as_str), Some("s3cr3t"));
		assert_eq!(data.get("host").map(String::as_str), Some("db.example.com"));
		assert_eq!(data.get("port").map(String::as_str), Some("3307"));
		assert_eq!(first, second);
	}

	#[test]
	fn test_deprovision_never_touches_shared_server() {
		assert!(provider().deprovision_bundle(&instance_ctx()).is_empty());
	}

	#[test]
	fn test_bind_database_name_is_scoped_to_namespace() {
		let provider = provider();
		let ctx = BindingContext {
			binding_id: "1234-5678-90ab".to_string(),
			instance_id: "i1".to_string(),
			namespace: "team-a".to_string(),
			global_namespace: "service-broker".to_string(),
			bound_credentials: BTreeMap::new(),
		};
		let bundle = provider.bind_bundle(&ctx);
		assert_eq!(bundle.namespace, "service-broker");

		let credentials = provider.binding_credentials(&bundle);
		assert_eq!(
			credentials.get("database").map(String::as_str),
			Some("team_a_1234_567")
		);
		assert_eq!(credentials.get("host").map(String::as_str), Some("db.example.com"));
		assert_eq!(credentials.get("port").map(String::as_str), Some("3307"));

		let container = job_container(&bundle.jobs[0]);
		assert_eq!(container.command.as_ref().unwrap()[1], "-c");
		assert_eq!(env_secret_key(container, "MYSQL_PORT"), Some("port"));
	}

	#[test]
	fn test_database_name_handles_short_binding_ids() {
		assert_eq!(database_name("ns", "ab"), "ns_ab");
	}

	proptest! {
		#[test]
		fn database_name_has_no_dashes(ns in "[a-z][a-z0-9-]{0,20}", id in "[a-f0-9-]{0,36}") {
			prop_assert!(!database_name(&ns, &id).contains('-'));
		}
	}
}
