// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Dedicated MySQL server per instance.

use std::collections::BTreeMap;

use broker_common_secret::random_alphanumeric;
use broker_provisioner::ResourceBundle;

use crate::definition::{ServiceDefinition, ServiceMetadata, ServicePlan};
use crate::labels::{binding_labels, instance_labels};
use crate::provider::{BindingContext, ServiceInstanceContext, ServiceProvider};
use crate::templates::{
	config_map, env_secret, env_value, load_balancer, opaque_secret, volume_claim, Script,
	ScriptJob, ServerDeployment,
};

pub const MYSQL_INSTANCE_SERVICE_ID: &str = "4f6e6cf6-ffdd-425f-a2c7-3c9258ad246a";
pub const MYSQL_INSTANCE_PLAN_ID: &str = "86064792-7ea2-467b-af93-ac9694d96d5b";

const IMAGE: &str = "mysql:5.7";
const PORT: i32 = 3306;
const ROOT_PASSWORD_LEN: usize = 16;
const BINDING_PASSWORD_LEN: usize = 18;
const BINDING_DATABASE: &str = "service_database";
const BACKUP_SUFFIX_LEN: usize = 6;

const BACKUP_SCRIPT: &str = r#"
set -e

export MYSQL_PWD="$MYSQL_ROOT_PASSWORD"

until mysql -uroot -h "$MYSQL_HOST" -e ";" > /dev/null 2>&1; do
    echo "Waiting for host '$MYSQL_HOST'" >&2
    sleep 5
done

echo "Dumping all databases from '$MYSQL_HOST'" >&2
mysqldump -uroot -h "$MYSQL_HOST" --all-databases --single-transaction
"#;

const BIND_SCRIPT: &str = r#"
set -e

export MYSQL_PWD="$MYSQL_ROOT_PASSWORD"

until mysql -uroot -h "$MYSQL_HOST" -e ";" > /dev/null 2>&1; do
    echo "Waiting for host '$MYSQL_HOST'"
    sleep 5
done

echo "Creating database '$DB_NAME' and granting privileges to '$DB_USER'"
mysql -uroot -h "$MYSQL_HOST" -e "CREATE SCHEMA IF NOT EXISTS $DB_NAME;"
mysql -uroot -h "$MYSQL_HOST" -e "CREATE USER IF NOT EXISTS '$DB_USER'@'%' IDENTIFIED BY '$DB_PASSWORD';"
mysql -uroot -h "$MYSQL_HOST" -e "GRANT ALL PRIVILEGES ON $DB_NAME.* TO '$DB_USER'@'%';"
mysql -uroot -h "$MYSQL_HOST" -e "FLUSH PRIVILEGES;"
"#;

const DEBIND_SCRIPT: &str = r#"
set -e

export MYSQL_PWD="$MYSQL_ROOT_PASSWORD"

until mysql -uroot -h "$MYSQL_HOST" -e ";" > /dev/null 2>&1; do
    echo "Waiting for host '$MYSQL_HOST'"
    sleep 5
done

echo "Removing user '$DB_USER'"
mysql -uroot -h "$MYSQL_HOST" -e "DROP USER IF EXISTS '$DB_USER';"
"#;

pub struct MysqlInstance {
	definition: ServiceDefinition,
}

impl Default for MysqlInstance {
	fn default() -> Self {
		Self::new()
	}
}

impl MysqlInstance {
	pub fn new() -> Self {
		Self {
			definition: ServiceDefinition {
				id: MYSQL_INSTANCE_SERVICE_ID.to_string(),
				name: "mysql-instance".to_string(),
				description: "A mysql instance deployment".to_string(),
				bindable: true,
				metadata: ServiceMetadata {
					display_name: "MySql Instance".to_string(),
					image_url: "https://avatars2.githubusercontent.com/u/19862012?s=200&v=4"
						.to_string(),
				},
				plans: vec![ServicePlan::default_plan(MYSQL_INSTANCE_PLAN_ID)],
			},
		}
	}
}

fn deployment_name(instance_id: &str) -> String {
	format!("mysql-instance-{instance_id}")
}

fn root_secret_name(instance_id: &str) -> String {
	format!("{}-root-secret", deployment_name(instance_id))
}

fn binding_secret_name(binding_id: &str) -> String {
	format!("binding-secret-{binding_id}")
}

fn backup_job_name(instance_id: &str) -> String {
	let suffix = random_alphanumeric(BACKUP_SUFFIX_LEN).to_ascii_lowercase();
	format!("{}-backup-{suffix}", deployment_name(instance_id))
}

impl ServiceProvider for MysqlInstance {
	fn definition(&self) -> &ServiceDefinition {
		&self.definition
	}

	fn host(&self, instance_id: &str, namespace: &str) -> String {
		format!("{}.{namespace}.svc.cluster.local", deployment_name(instance_id))
	}

	fn provision_bundle(&self, ctx: &ServiceInstanceContext) -> ResourceBundle {
		let name = deployment_name(&ctx.instance_id);
		let secret_name = root_secret_name(&ctx.instance_id);
		let claim_name = format!("{name}-pvc");

		let mut bundle = ResourceBundle::new(&ctx.namespace);
		bundle.labels = instance_labels(&self.definition, ctx);
		bundle.secrets.push(opaque_secret(
			&secret_name,
			BTreeMap::from([(
				"password".to_string(),
				random_alphanumeric(ROOT_PASSWORD_LEN),
			)]),
		));
		bundle.config_maps.push(config_map(
			&name,
			&[
				("backup.bash", BACKUP_SCRIPT),
				("bind.bash", BIND_SCRIPT),
				("debind.bash", DEBIND_SCRIPT),
			],
		));
		bundle.volume_claims.push(volume_claim(&claim_name, "2Gi"));
		bundle.deployments.push(
			ServerDeployment {
				name: &name,
				container: "mysql",
				image: IMAGE,
				command: None,
				port: PORT,
				env: vec![env_secret("MYSQL_ROOT_PASSWORD", &secret_name, "password")],
				claim_name: &claim_name,
				mount_path: "/var/lib/mysql",
			}
			.build(),
		);
		bundle.services.push(load_balancer(&name, PORT));
		bundle
	}

	/// Dumps every database to the backup job's log before teardown. The job
	/// is not part of the provision bundle, so it outlives the instance until
	/// its TTL expires. Each run gets a fresh job name so a retried teardown
	/// does not collide with an earlier backup.
	fn deprovision_bundle(&self, ctx: &ServiceInstanceContext) -> ResourceBundle {
		let name = deployment_name(&ctx.instance_id);

		let mut bundle = ResourceBundle::new(&ctx.namespace);
		bundle.labels = instance_labels(&self.definition, ctx);
		bundle.jobs.push(
			ScriptJob {
				name: backup_job_name(&ctx.instance_id),
				container: "mysql",
				image: IMAGE,
				script: Script::ConfigMap {
					name: &name,
					key: "backup.bash",
				},
				env: vec![
					env_value("MYSQL_HOST", self.host(&ctx.instance_id, &ctx.namespace)),
					env_secret(
						"MYSQL_ROOT_PASSWORD",
						&root_secret_name(&ctx.instance_id),
						"password",
					),
				],
				active_deadline_secs: Some(240),
				ttl_secs_after_finished: Some(86_400),
			}
			.build(),
		);
		bundle
	}

	fn bind_bundle(&self, ctx: &BindingContext) -> ResourceBundle {
		let name = deployment_name(&ctx.instance_id);
		let binding_secret = binding_secret_name(&ctx.binding_id);
		let host = self.host(&ctx.instance_id, &ctx.namespace);

		let mut bundle = ResourceBundle::new(&ctx.namespace);
		bundle.labels = binding_labels(&self.definition, ctx);
		bundle.secrets.push(opaque_secret(
			&binding_secret,
			BTreeMap::from([
				("host".to_string(), host.clone()),
				("user".to_string(), format!("user-{}", random_alphanumeric(8))),
				("database".to_string(), BINDING_DATABASE.to_string()),
				(
					"password".to_string(),
					random_alphanumeric(BINDING_PASSWORD_LEN),
				),
			]),
		));
		bundle.jobs.push(
			ScriptJob {
				name: format!("binding-job-{}", ctx.binding_id),
				container: "mysql",
				image: IMAGE,
				script: Script::ConfigMap {
					name: &name,
					key: "bind.bash",
				},
				env: vec![
					env_value("MYSQL_HOST", host),
					env_secret(
						"MYSQL_ROOT_PASSWORD",
						&root_secret_name(&ctx.instance_id),
						"password",
					),
					env_secret("DB_NAME", &binding_secret, "database"),
					env_secret("DB_USER", &binding_secret, "user"),
					env_secret("DB_PASSWORD", &binding_secret, "password"),
				],
				active_deadline_secs: None,
				ttl_secs_after_finished: None,
			}
			.build(),
		);
		bundle
	}

	fn debind_bundle(&self, ctx: &BindingContext) -> ResourceBundle {
		let name = deployment_name(&ctx.instance_id);
		let db_user = match ctx.bound_credentials.get("user") {
			Some(user) => env_value("DB_USER", user.clone()),
			None => env_secret("DB_USER", &binding_secret_name(&ctx.binding_id), "user"),
		};

		let mut bundle = ResourceBundle::new(&ctx.namespace);
		bundle.labels = binding_labels(&self.definition, ctx);
		bundle.jobs.push(
			ScriptJob {
				name: format!("debinding-job-{}", ctx.binding_id),
				container: "mysql",
				image: IMAGE,
				script: Script::ConfigMap {
					name: &name,
					key: "debind.bash",
				},
				env: vec![
					env_value("MYSQL_HOST", self.host(&ctx.instance_id, &ctx.namespace)),
					env_secret(
						"MYSQL_ROOT_PASSWORD",
						&root_secret_name(&ctx.instance_id),
						"password",
					),
					db_user,
				],
				active_deadline_secs: None,
				ttl_secs_after_finished: Some(3600),
			}
			.build(),
		);
		bundle
	}
}
