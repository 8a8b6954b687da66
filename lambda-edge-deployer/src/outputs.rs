/*
 * Copyright Amazon.com, Inc. or its affiliates. All Rights Reserved.
 * SPDX-License-Identifier: Apache-2.0
 */

//! The identifiers `bootstrap` hands to `deploy`, persisted as `NAME=value`
//! lines in an environment file.

use crate::arn::{Arn, ArnError, FunctionArn, ProfileVersionArn, SigningProfileArn};
use crate::error::DeployError;
use anyhow::{Context, Result};
use std::collections::HashMap;
use std::fs::OpenOptions;
use std::io::Write;
use std::path::Path;
use std::str::FromStr;
use tracing::info;

pub const SIGNING_PROFILE_ARN: &str = "SIGNING_PROFILE_ARN";
pub const SIGNING_PROFILE_VERSION_ARN: &str = "SIGNING_PROFILE_VERSION_ARN";
pub const SIGNING_CONFIGURATION_ARN: &str = "SIGNING_CONFIGURATION_ARN";
pub const FUNCTION_ARN: &str = "FUNCTION_ARN";
pub const S3_BUCKET: &str = "S3_BUCKET";

const KEYS: [&str; 5] = [
    SIGNING_PROFILE_ARN,
    SIGNING_PROFILE_VERSION_ARN,
    SIGNING_CONFIGURATION_ARN,
    FUNCTION_ARN,
    S3_BUCKET,
];

#[derive(Debug, Clone, Eq, PartialEq)]
pub struct ProvisionedResources {
    pub signing_profile_arn: SigningProfileArn,
    pub signing_profile_version_arn: ProfileVersionArn,
    pub signing_configuration_arn: Arn,
    pub function_arn: FunctionArn,
    pub bucket: String,
}

impl ProvisionedResources {
    fn entries(&self) -> [(&'static str, String); 5] {
        [
            (SIGNING_PROFILE_ARN, self.signing_profile_arn.to_string()),
            (
                SIGNING_PROFILE_VERSION_ARN,
                self.signing_profile_version_arn.to_string(),
            ),
            (
                SIGNING_CONFIGURATION_ARN,
                self.signing_configuration_arn.to_string(),
            ),
            (FUNCTION_ARN, self.function_arn.to_string()),
            (S3_BUCKET, self.bucket.clone()),
        ]
    }

    /// Appends one `NAME=value` line per identifier, creating the file if needed.
    pub fn append_to(&self, path: &Path) -> Result<()> {
        let mut file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(path)
            .with_context(|| format!("failed to open {}", path.display()))?;
        let mut lines = String::new();
        for (key, value) in self.entries() {
            lines.push_str(&format!("{key}={value}\n"));
        }
        file.write_all(lines.as_bytes())
            .with_context(|| format!("failed to write {}", path.display()))?;
        info!("Wrote provisioned identifiers to {}", path.display());
        Ok(())
    }

    /// Reads the identifiers back from `path`, with process environment variables
    /// taking precedence over the file.
    ///
    /// A missing file is treated as empty, so the identifiers can also come
    /// entirely from the environment.
    pub fn load(path: &Path) -> Result<Self> {
        let file = read_env_file(path)?;
        let resources = Self::from_lookup(|key| {
            std::env::var(key)
                .ok()
                .filter(|value| !value.is_empty())
                .or_else(|| file.get(key).cloned())
        })?;
        Ok(resources)
    }

    /// Builds the identifiers from `lookup`, reporting every missing key at once.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, DeployError> {
        let mut values = HashMap::new();
        let mut missing = Vec::new();
        for key in KEYS {
            match lookup(key).filter(|value| !value.trim().is_empty()) {
                Some(value) => {
                    values.insert(key, value.trim().to_string());
                }
                None => missing.push(key),
            }
        }
        if !missing.is_empty() {
            return Err(DeployError::MissingSettings(missing));
        }

        Ok(ProvisionedResources {
            signing_profile_arn: parse_setting(&values, SIGNING_PROFILE_ARN)?,
            signing_profile_version_arn: parse_setting(&values, SIGNING_PROFILE_VERSION_ARN)?,
            signing_configuration_arn: parse_setting(&values, SIGNING_CONFIGURATION_ARN)?,
            function_arn: parse_setting(&values, FUNCTION_ARN)?,
            bucket: values[S3_BUCKET].clone(),
        })
    }
}

fn parse_setting<T>(
    values: &HashMap<&'static str, String>,
    key: &'static str,
) -> Result<T, DeployError>
where
    T: FromStr<Err = ArnError>,
{
    values[key]
        .parse()
        .map_err(|source| DeployError::InvalidSetting { key, source })
}

/// Parses an environment file; later lines override earlier ones.
fn read_env_file(path: &Path) -> Result<HashMap<String, String>> {
    let mut vars = HashMap::new();
    if !path.exists() {
        return Ok(vars);
    }
    let entries = dotenvy::from_path_iter(path)
        .with_context(|| format!("failed to open {}", path.display()))?;
    for entry in entries {
        let (key, value) = entry.with_context(|| format!("failed to parse {}", path.display()))?;
        vars.insert(key, value);
    }
    Ok(vars)
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use std::fs;

    const PROFILE: &str =
        "arn:aws:signer:us-east-1:123456789012:/signing-profiles/EdgeSigningProfile1700000000";
    const PROFILE_VERSION: &str =
        "arn:aws:signer:us-east-1:123456789012:/signing-profiles/EdgeSigningProfile1700000000/zJ4gcZ4F8f";
    const CONFIG: &str =
        "arn:aws:lambda:us-east-1:123456789012:code-signing-config:csc-0a1b2c3d4e5f67890";
    const FUNCTION: &str =
        "arn:aws:lambda:us-east-1:123456789012:function:EdgeOriginRequestFunction1700000000";

    fn resources(bucket: &str) -> ProvisionedResources {
        ProvisionedResources {
            signing_profile_arn: PROFILE.parse().unwrap(),
            signing_profile_version_arn: PROFILE_VERSION.parse().unwrap(),
            signing_configuration_arn: CONFIG.parse().unwrap(),
            function_arn: FUNCTION.parse().unwrap(),
            bucket: bucket.into(),
        }
    }

    fn lookup_from(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn appended_file_has_every_key_with_a_value() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join(".env");
        fs::write(&path, "EXISTING=1\n").unwrap();

        resources("edge-function-artifacts-1700000000")
            .append_to(&path)
            .unwrap();

        let contents = fs::read_to_string(&path).unwrap();
        let lines: Vec<&str> = contents.lines().collect();
        assert_eq!("EXISTING=1", lines[0]);
        assert_eq!(6, lines.len());
        for key in KEYS {
            let line = lines
                .iter()
                .find(|line| line.starts_with(&format!("{key}=")))
                .unwrap_or_else(|| panic!("{key} not written"));
            assert!(line.len() > key.len() + 1, "{key} has an empty value");
        }
    }

    #[test]
    fn load_reads_back_and_last_line_wins() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join(".env");
        resources("edge-function-artifacts-1").append_to(&path).unwrap();
        resources("edge-function-artifacts-2").append_to(&path).unwrap();

        let loaded = ProvisionedResources::load(&path).unwrap();
        assert_eq!(resources("edge-function-artifacts-2"), loaded);
        assert_eq!(
            "EdgeSigningProfile1700000000",
            loaded.signing_profile_arn.profile_name()
        );
    }

    #[test]
    fn every_missing_key_is_reported() {
        let err = ProvisionedResources::from_lookup(lookup_from(&[
            (SIGNING_PROFILE_ARN, PROFILE),
            (FUNCTION_ARN, FUNCTION),
            (S3_BUCKET, "  "),
        ]))
        .unwrap_err();

        match err {
            DeployError::MissingSettings(keys) => assert_eq!(
                vec![
                    SIGNING_PROFILE_VERSION_ARN,
                    SIGNING_CONFIGURATION_ARN,
                    S3_BUCKET
                ],
                keys
            ),
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn bare_profile_arn_is_rejected_as_version() {
        let err = ProvisionedResources::from_lookup(lookup_from(&[
            (SIGNING_PROFILE_ARN, PROFILE),
            (SIGNING_PROFILE_VERSION_ARN, PROFILE),
            (SIGNING_CONFIGURATION_ARN, CONFIG),
            (FUNCTION_ARN, FUNCTION),
            (S3_BUCKET, "edge-function-artifacts-1700000000"),
        ]))
        .unwrap_err();

        match err {
            DeployError::InvalidSetting { key, source } => {
                assert_eq!(SIGNING_PROFILE_VERSION_ARN, key);
                assert_eq!(ArnError::MissingProfileVersion(PROFILE.into()), source);
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn missing_file_is_empty() {
        let dir = tempfile::tempdir().unwrap();
        let vars = read_env_file(&dir.path().join("absent.env")).unwrap();
        assert!(vars.is_empty());
    }
}
