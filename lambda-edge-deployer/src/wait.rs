/*
 * Copyright Amazon.com, Inc. or its affiliates. All Rights Reserved.
 * SPDX-License-Identifier: Apache-2.0
 */

//! Readiness polling for resources that only become usable some time after
//! the call that created them returned.

use crate::config::PollConfig;
use crate::error::DeployError;
use std::future::Future;
use tracing::{debug, info};

/// Outcome of a single readiness check.
#[derive(Debug)]
pub enum Readiness<T> {
    Ready(T),
    /// Not usable yet; the string describes what was observed.
    Pending(String),
}

/// Calls `check` every `poll.interval` until it reports [`Readiness::Ready`].
///
/// Errors from `check` end the wait immediately. If `poll.timeout` elapses first,
/// this fails with [`DeployError::TimedOut`]. Dropping the returned future
/// cancels the wait at its next suspension point.
pub async fn poll_until_ready<F, Ft, T>(
    what: &str,
    poll: PollConfig,
    mut check: F,
) -> anyhow::Result<T>
where
    F: FnMut() -> Ft,
    Ft: Future<Output = anyhow::Result<Readiness<T>>>,
{
    let polling = async {
        let mut attempt = 1;
        loop {
            match check().await? {
                Readiness::Ready(value) => {
                    debug!(what, attempt, "ready");
                    return Ok(value);
                }
                Readiness::Pending(observed) => {
                    info!("Waiting for {} ({})...", what, observed);
                }
            }
            attempt += 1;
            tokio::time::sleep(poll.interval).await;
        }
    };
    match tokio::time::timeout(poll.timeout, polling).await {
        Ok(result) => result,
        Err(_elapsed) => Err(DeployError::TimedOut {
            what: what.into(),
            timeout: poll.timeout,
        }
        .into()),
    }
}
