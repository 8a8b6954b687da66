/*
 * Copyright Amazon.com, Inc. or its affiliates. All Rights Reserved.
 * SPDX-License-Identifier: Apache-2.0
 */

use aws_config::{BehaviorVersion, Region, SdkConfig};
use std::fmt;
use std::time::{Duration, SystemTime, UNIX_EPOCH};

/// Lambda@Edge functions must live in us-east-1.
pub const DEFAULT_REGION: &str = "us-east-1";

/// How often to check a condition and how long to keep checking before giving up.
#[derive(Debug, Clone, Copy, Eq, PartialEq)]
pub struct PollConfig {
    pub interval: Duration,
    pub timeout: Duration,
}

impl PollConfig {
    pub const fn new(interval: Duration, timeout: Duration) -> Self {
        Self { interval, timeout }
    }
}

/// Fixed values used when provisioning and deploying.
///
/// `Settings::default()` is what both workflows run with unless a CLI flag
/// overrides one of the fields.
#[derive(Debug, Clone)]
pub struct Settings {
    pub region: String,

    pub signing_platform_id: String,
    pub signature_validity_days: i32,

    pub function_runtime: aws_sdk_lambda::types::Runtime,
    pub function_handler: String,
    pub function_memory_mb: i32,
    pub function_timeout_secs: i32,
    pub function_ephemeral_storage_mb: i32,

    /// Object key the packaged source is uploaded under.
    pub archive_key: String,
    /// Prefix Signer writes signed artifacts under, in the same bucket.
    pub signed_output_prefix: String,

    pub cache_policy_id: String,
    pub origin_request_policy_id: String,

    pub role_propagation: PollConfig,
    pub function_ready: PollConfig,
    pub signing_job: PollConfig,
    pub origin_access_control: PollConfig,

    /// Attempts at `CreateFunction` while Lambda still can't assume the new role.
    pub create_function_attempts: usize,
    pub create_function_backoff: Duration,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            region: DEFAULT_REGION.into(),
            signing_platform_id: "AWSLambda-SHA384-ECDSA".into(),
            signature_validity_days: 7,
            function_runtime: aws_sdk_lambda::types::Runtime::Nodejs20x,
            function_handler: "index.handler".into(),
            function_memory_mb: 128,
            function_timeout_secs: 10,
            function_ephemeral_storage_mb: 512,
            archive_key: "function.zip".into(),
            signed_output_prefix: "signing_job_output/".into(),
            // Managed-CachingOptimized
            cache_policy_id: "658327ea-f89d-4fab-a63d-7e88639e58f6".into(),
            // Managed-CORS-S3Origin
            origin_request_policy_id: "88a5eaf4-2fd4-4709-b370-b4c650ea3fcf".into(),
            role_propagation: PollConfig::new(Duration::from_secs(2), Duration::from_secs(60)),
            function_ready: PollConfig::new(Duration::from_secs(1), Duration::from_secs(60)),
            signing_job: PollConfig::new(Duration::from_secs(5), Duration::from_secs(600)),
            origin_access_control: PollConfig::new(
                Duration::from_secs(1),
                Duration::from_secs(30),
            ),
            create_function_attempts: 10,
            create_function_backoff: Duration::from_secs(3),
        }
    }
}

impl Settings {
    /// Loads credentials from the default provider chain, pinned to `self.region`.
    pub async fn load_sdk_config(&self) -> SdkConfig {
        aws_config::defaults(BehaviorVersion::latest())
            .region(Region::new(self.region.clone()))
            .load()
            .await
    }
}

/// Uniqueness token that every resource name in one run is derived from.
#[derive(Debug, Clone, Eq, PartialEq)]
pub struct RunToken(String);

impl RunToken {
    /// Seconds since the Unix epoch.
    pub fn now() -> Self {
        let secs = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .map(|d| d.as_secs())
            .unwrap_or_default();
        Self(secs.to_string())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn signing_profile_name(&self) -> String {
        format!("EdgeSigningProfile{}", self.0)
    }

    pub fn role_name(&self) -> String {
        format!("EdgeOriginRequestRole{}", self.0)
    }

    pub fn policy_name(&self) -> String {
        format!("EdgeOriginRequestRolePolicy{}", self.0)
    }

    pub fn function_name(&self) -> String {
        format!("EdgeOriginRequestFunction{}", self.0)
    }

    pub fn bucket_name(&self) -> String {
        format!("edge-function-artifacts-{}", self.0)
    }

    pub fn origin_access_control_name(&self) -> String {
        format!("EdgeOriginAccessControl{}", self.0)
    }
}

impl From<&str> for RunToken {
    fn from(value: &str) -> Self {
        Self(value.into())
    }
}

impl fmt::Display for RunToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}
