// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Service providers offered by the broker.
//!
//! Each [`ServiceProvider`] turns an instance or binding request into a
//! [`broker_provisioner::ResourceBundle`]. Providers are registered in a
//! [`Catalog`] which the dispatcher consults by service id.

pub mod catalog;
pub mod definition;
pub mod labels;
pub mod minio_instance;
pub mod mysql_instance;
pub mod mysql_shared;
pub mod provider;
pub mod templates;

pub use catalog::Catalog;
pub use definition::{ServiceDefinition, ServiceMetadata, ServicePlan};
pub use minio_instance::{MinioInstance, MINIO_INSTANCE_PLAN_ID, MINIO_INSTANCE_SERVICE_ID};
pub use mysql_instance::{MysqlInstance, MYSQL_INSTANCE_PLAN_ID, MYSQL_INSTANCE_SERVICE_ID};
pub use mysql_shared::{SharedMysql, SharedMysqlSettings};
pub use provider::{BindingContext, ServiceInstanceContext, ServiceProvider};
