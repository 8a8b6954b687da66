/*
 * Copyright Amazon.com, Inc. or its affiliates. All Rights Reserved.
 * SPDX-License-Identifier: Apache-2.0
 */

/// Expands to a string pointing at the call site, for use as `anyhow` context on
/// provider calls so a failed step can be traced back to the line that issued it.
#[macro_export]
macro_rules! here {
    () => {
        concat!("error at ", file!(), ":", line!(), ":", column!())
    };
    ($message:tt) => {
        concat!($message, " (", $crate::here!(), ")")
    };
}
