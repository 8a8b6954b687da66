/*
 * Copyright Amazon.com, Inc. or its affiliates. All Rights Reserved.
 * SPDX-License-Identifier: Apache-2.0
 */

use std::error::Error as StdError;
use std::future::Future;
use std::time::Duration;
use tracing::info;

pub type BoxError = Box<dyn StdError + Send + Sync + 'static>;

/// Whether a failed attempt is worth repeating.
#[derive(Debug, Clone, Copy, Eq, PartialEq)]
pub enum ErrorClass {
    /// The provider hasn't caught up yet; the same request may succeed later.
    NotYetConsistent,
    Permanent,
}

#[derive(thiserror::Error, Debug)]
pub enum RetryError {
    #[error("{what} failed with an error that won't be retried")]
    FailedUnretryable {
        what: String,
        #[source]
        source: BoxError,
    },
    #[error("{what} failed {attempts} times and won't be retried again")]
    FailedMaxAttempts {
        what: String,
        attempts: usize,
        #[source]
        last_error: BoxError,
    },
}

/// Runs `create_future` until it succeeds, fails permanently, or `max_attempts` is reached,
/// sleeping `backoff` between attempts.
pub async fn run_with_retry<F, Ft, C, O, E>(
    what: &str,
    max_attempts: usize,
    backoff: Duration,
    create_future: F,
    classify_error: C,
) -> Result<O, RetryError>
where
    F: Fn() -> Ft,
    Ft: Future<Output = Result<O, E>>,
    C: Fn(&E) -> ErrorClass,
    E: Into<BoxError>,
{
    assert!(max_attempts > 0);

    let mut attempt = 1;
    loop {
        let err = match create_future().await {
            Ok(output) => return Ok(output),
            Err(err) => err,
        };
        if classify_error(&err) == ErrorClass::Permanent {
            return Err(RetryError::FailedUnretryable {
                what: what.into(),
                source: err.into(),
            });
        }
        if attempt == max_attempts {
            return Err(RetryError::FailedMaxAttempts {
                what: what.into(),
                attempts: max_attempts,
                last_error: err.into(),
            });
        }
        info!(
            "{} is not possible yet (attempt {} of {}); retrying in {:?}",
            what, attempt, max_attempts, backoff
        );
        attempt += 1;
        tokio::time::sleep(backoff).await;
    }
}
