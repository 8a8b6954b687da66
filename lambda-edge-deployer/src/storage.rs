/*
 * Copyright Amazon.com, Inc. or its affiliates. All Rights Reserved.
 * SPDX-License-Identifier: Apache-2.0
 */

use crate::config::DEFAULT_REGION;
use crate::error::DeployError;
use anyhow::{Context, Result};
use aws_sdk_s3 as s3;
use tracing::info;

/// One stored revision of an object in a versioned bucket.
#[derive(Debug, Clone, Eq, PartialEq)]
pub struct ObjectVersion {
    pub bucket: String,
    pub key: String,
    pub version_id: String,
}

/// Creates the artifact bucket and turns on versioning, which signing jobs require.
pub async fn create_versioned_bucket(
    s3_client: &s3::Client,
    bucket: &str,
    region: &str,
) -> Result<()> {
    use s3::types::{
        BucketLocationConstraint, BucketVersioningStatus, CreateBucketConfiguration, MfaDelete,
        ObjectOwnership, VersioningConfiguration,
    };

    info!("Creating S3 bucket {}...", bucket);
    let mut create = s3_client
        .create_bucket()
        .bucket(bucket)
        .object_ownership(ObjectOwnership::BucketOwnerPreferred);
    // us-east-1 rejects an explicit location constraint
    if region != DEFAULT_REGION {
        create = create.create_bucket_configuration(
            CreateBucketConfiguration::builder()
                .location_constraint(BucketLocationConstraint::from(region))
                .build(),
        );
    }
    create
        .send()
        .await
        .context(here!("failed to create S3 bucket"))?;

    s3_client
        .put_bucket_versioning()
        .bucket(bucket)
        .versioning_configuration(
            VersioningConfiguration::builder()
                .status(BucketVersioningStatus::Enabled)
                .mfa_delete(MfaDelete::Disabled)
                .build(),
        )
        .send()
        .await
        .context(here!("failed to enable bucket versioning"))?;
    info!("Enabled versioning on {}", bucket);
    Ok(())
}

/// Uploads the packaged function and returns the version S3 assigned to it.
pub async fn upload_archive(
    s3_client: &s3::Client,
    bucket: &str,
    key: &str,
    archive: Vec<u8>,
) -> Result<ObjectVersion> {
    info!("Uploading {} to S3 bucket {}...", key, bucket);
    let output = s3_client
        .put_object()
        .bucket(bucket)
        .key(key)
        .content_type("application/zip")
        .body(s3::primitives::ByteStream::from(archive))
        .send()
        .await
        .context(here!("failed to upload function archive"))?;

    let version_id = output
        .version_id()
        .ok_or_else(|| DeployError::UnversionedObject {
            bucket: bucket.into(),
            key: key.into(),
        })?;
    info!(version_id, "Completed upload of {}", key);
    Ok(ObjectVersion {
        bucket: bucket.into(),
        key: key.into(),
        version_id: version_id.into(),
    })
}
