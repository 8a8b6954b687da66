/*
 * Copyright Amazon.com, Inc. or its affiliates. All Rights Reserved.
 * SPDX-License-Identifier: Apache-2.0
 */

use crate::arn::ArnError;
use std::time::Duration;

/// Failures that are specific to this tool rather than to a provider call.
///
/// Provider errors are not re-modeled; they travel inside the `anyhow` chain
/// as the SDK's own `SdkError`.
#[derive(thiserror::Error, Debug)]
pub enum DeployError {
    #[error("missing required deployment settings: {}", .0.join(", "))]
    MissingSettings(Vec<&'static str>),

    #[error("invalid value for `{key}`")]
    InvalidSetting {
        key: &'static str,
        #[source]
        source: ArnError,
    },

    #[error("signing job {job_id} failed: {reason}")]
    SigningJobFailed { job_id: String, reason: String },

    #[error("timed out after {timeout:?} waiting for {what}")]
    TimedOut { what: String, timeout: Duration },

    #[error("`{operation}` response did not include `{member}`")]
    MissingResponseField {
        operation: &'static str,
        member: &'static str,
    },

    #[error("object `{key}` in bucket `{bucket}` has no version id (is bucket versioning enabled?)")]
    UnversionedObject { bucket: String, key: String },

    #[error("no files to package under `{0}`")]
    EmptySource(String),
}

/// Pulls a member out of a provider response, turning its absence into
/// [`DeployError::MissingResponseField`].
///
/// Accepts both optional and non-optional accessors, so the call sites read the
/// same regardless of how the SDK models a given member.
pub(crate) fn required<'a, T: ?Sized + 'a>(
    value: impl Into<Option<&'a T>>,
    operation: &'static str,
    member: &'static str,
) -> Result<&'a T, DeployError> {
    value
        .into()
        .ok_or(DeployError::MissingResponseField { operation, member })
}
