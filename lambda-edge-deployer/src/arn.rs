/*
 * Copyright Amazon.com, Inc. or its affiliates. All Rights Reserved.
 * SPDX-License-Identifier: Apache-2.0
 */

//! Typed ARNs for the resources this tool hands between steps.
//!
//! Each wrapper validates its shape on construction, so a value that made it
//! into one of these types can be passed to the provider without re-checking.

use std::fmt;
use std::str::FromStr;

#[derive(thiserror::Error, Debug, Clone, Eq, PartialEq)]
pub enum ArnError {
    #[error("`{0}` is not an ARN")]
    Malformed(String),
    #[error("`{arn}` is an ARN for `{actual}`, expected `{expected}`")]
    WrongService {
        arn: String,
        expected: &'static str,
        actual: String,
    },
    #[error("`{0}` is not a signing profile ARN")]
    NotASigningProfile(String),
    #[error("`{0}` has no profile version segment; use the profile *version* ARN")]
    MissingProfileVersion(String),
    #[error("`{0}` is not a Lambda function ARN")]
    NotAFunction(String),
    #[error("`{0}` is not qualified with a published version number")]
    UnpublishedVersion(String),
    #[error("`{arn}` is qualified with a version other than the published `{version}`")]
    VersionMismatch { arn: String, version: String },
}

/// `arn:partition:service:region:account-id:resource`
#[derive(Debug, Clone, Eq, PartialEq)]
pub struct Arn {
    pub partition: String,
    pub service: String,
    pub region: String,
    pub account_id: String,
    pub resource: String,
}

impl FromStr for Arn {
    type Err = ArnError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let mut parts = s.splitn(6, ':');
        let (
            Some("arn"),
            Some(partition),
            Some(service),
            Some(region),
            Some(account_id),
            Some(resource),
        ) = (
            parts.next(),
            parts.next(),
            parts.next(),
            parts.next(),
            parts.next(),
            parts.next(),
        )
        else {
            return Err(ArnError::Malformed(s.into()));
        };
        if partition.is_empty() || service.is_empty() || resource.is_empty() {
            return Err(ArnError::Malformed(s.into()));
        }
        Ok(Arn {
            partition: partition.into(),
            service: service.into(),
            region: region.into(),
            account_id: account_id.into(),
            resource: resource.into(),
        })
    }
}

impl fmt::Display for Arn {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "arn:{}:{}:{}:{}:{}",
            self.partition, self.service, self.region, self.account_id, self.resource
        )
    }
}

fn parse_for_service(s: &str, expected: &'static str) -> Result<Arn, ArnError> {
    let arn: Arn = s.parse()?;
    if arn.service != expected {
        return Err(ArnError::WrongService {
            arn: s.into(),
            expected,
            actual: arn.service,
        });
    }
    Ok(arn)
}

/// Splits a Signer resource (`/signing-profiles/<name>[/<version>]`) into name and version.
fn signing_profile_segments(arn: &Arn) -> Option<(&str, Option<&str>)> {
    let mut segments = arn.resource.split('/');
    match (
        segments.next(),
        segments.next(),
        segments.next(),
        segments.next(),
        segments.next(),
    ) {
        (Some(""), Some("signing-profiles"), Some(name), version, None) if !name.is_empty() => {
            Some((name, version.filter(|v| !v.is_empty())))
        }
        _ => None,
    }
}

/// ARN of a Signer signing profile, with or without a version segment.
#[derive(Debug, Clone, Eq, PartialEq)]
pub struct SigningProfileArn {
    arn: Arn,
    name: String,
}

impl SigningProfileArn {
    /// The profile name, which is what `StartSigningJob` expects.
    pub fn profile_name(&self) -> &str {
        &self.name
    }
}

impl FromStr for SigningProfileArn {
    type Err = ArnError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let arn = parse_for_service(s, "signer")?;
        let name = match signing_profile_segments(&arn) {
            Some((name, _)) => name.to_string(),
            None => return Err(ArnError::NotASigningProfile(s.into())),
        };
        Ok(SigningProfileArn { arn, name })
    }
}

impl fmt::Display for SigningProfileArn {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.arn.fmt(f)
    }
}

/// ARN of one specific revision of a signing profile.
///
/// Code-signing configurations only accept these; a bare profile ARN is
/// rejected here rather than by Lambda.
#[derive(Debug, Clone, Eq, PartialEq)]
pub struct ProfileVersionArn {
    arn: Arn,
    version: String,
}

impl ProfileVersionArn {
    pub fn profile_version(&self) -> &str {
        &self.version
    }
}

impl FromStr for ProfileVersionArn {
    type Err = ArnError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let arn = parse_for_service(s, "signer")?;
        let version = match signing_profile_segments(&arn) {
            Some((_, Some(version))) => version.to_string(),
            Some((_, None)) => return Err(ArnError::MissingProfileVersion(s.into())),
            None => return Err(ArnError::NotASigningProfile(s.into())),
        };
        Ok(ProfileVersionArn { arn, version })
    }
}

impl fmt::Display for ProfileVersionArn {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.arn.fmt(f)
    }
}

/// ARN of a Lambda function, optionally qualified with a version or alias.
#[derive(Debug, Clone, Eq, PartialEq)]
pub struct FunctionArn {
    arn: Arn,
    name: String,
    qualifier: Option<String>,
}

impl FunctionArn {
    pub fn function_name(&self) -> &str {
        &self.name
    }

    pub fn qualifier(&self) -> Option<&str> {
        self.qualifier.as_deref()
    }

    /// The same function without any qualifier.
    pub fn unqualified(&self) -> FunctionArn {
        let mut arn = self.arn.clone();
        arn.resource = format!("function:{}", self.name);
        FunctionArn {
            arn,
            name: self.name.clone(),
            qualifier: None,
        }
    }
}

impl FromStr for FunctionArn {
    type Err = ArnError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let arn = parse_for_service(s, "lambda")?;
        let mut parts = arn.resource.splitn(3, ':');
        let (name, qualifier) = match (parts.next(), parts.next(), parts.next()) {
            (Some("function"), Some(name), qualifier)
                if !name.is_empty() && qualifier.map_or(true, |q| !q.is_empty()) =>
            {
                (name.to_string(), qualifier.map(str::to_string))
            }
            _ => return Err(ArnError::NotAFunction(s.into())),
        };
        Ok(FunctionArn {
            arn,
            name,
            qualifier,
        })
    }
}

impl fmt::Display for FunctionArn {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.arn.fmt(f)
    }
}

/// ARN of a published, numbered function version.
///
/// Lambda@Edge associations reject `$LATEST` and aliases.
#[derive(Debug, Clone, Eq, PartialEq)]
pub struct FunctionVersionArn {
    function: FunctionArn,
    version: String,
}

impl FunctionVersionArn {
    /// Builds the version ARN from an `UpdateFunctionCode`/`CreateFunction` response,
    /// which may or may not already carry the version qualifier.
    pub fn from_published(function_arn: &str, version: &str) -> Result<Self, ArnError> {
        let function: FunctionArn = function_arn.parse()?;
        match function.qualifier() {
            Some(qualifier) if qualifier != version => Err(ArnError::VersionMismatch {
                arn: function_arn.into(),
                version: version.into(),
            }),
            Some(_) => function.try_into(),
            None => format!("{function_arn}:{version}").parse(),
        }
    }

    pub fn function(&self) -> FunctionArn {
        self.function.unqualified()
    }

    pub fn version(&self) -> &str {
        &self.version
    }
}

impl TryFrom<FunctionArn> for FunctionVersionArn {
    type Error = ArnError;

    fn try_from(function: FunctionArn) -> Result<Self, Self::Error> {
        let version = match function.qualifier() {
            Some(q) if q.chars().all(|c| c.is_ascii_digit()) => q.to_string(),
            _ => return Err(ArnError::UnpublishedVersion(function.to_string())),
        };
        Ok(FunctionVersionArn { function, version })
    }
}

impl FromStr for FunctionVersionArn {
    type Err = ArnError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        s.parse::<FunctionArn>()?.try_into()
    }
}

impl fmt::Display for FunctionVersionArn {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.function.fmt(f)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const PROFILE: &str =
        "arn:aws:signer:us-east-1:123456789012:/signing-profiles/EdgeSigningProfile1700000000";
    const PROFILE_VERSION: &str =
        "arn:aws:signer:us-east-1:123456789012:/signing-profiles/EdgeSigningProfile1700000000/zJ4gcZ4F8f";
    const FUNCTION: &str =
        "arn:aws:lambda:us-east-1:123456789012:function:EdgeOriginRequestFunction1700000000";

    #[test]
    fn generic_arn_keeps_colons_in_resource() {
        let arn: Arn = format!("{FUNCTION}:7").parse().unwrap();
        assert_eq!("lambda", arn.service);
        assert_eq!("123456789012", arn.account_id);
        assert_eq!(
            "function:EdgeOriginRequestFunction1700000000:7",
            arn.resource
        );
        assert_eq!(format!("{FUNCTION}:7"), arn.to_string());

        assert!(matches!(
            "not-an-arn".parse::<Arn>(),
            Err(ArnError::Malformed(_))
        ));
    }

    #[test]
    fn profile_name_is_extracted_from_either_form() {
        let profile: SigningProfileArn = PROFILE.parse().unwrap();
        assert_eq!("EdgeSigningProfile1700000000", profile.profile_name());
        let versioned: SigningProfileArn = PROFILE_VERSION.parse().unwrap();
        assert_eq!("EdgeSigningProfile1700000000", versioned.profile_name());
    }

    #[test]
    fn bare_profile_arn_is_not_a_profile_version() {
        assert_eq!(
            Err(ArnError::MissingProfileVersion(PROFILE.into())),
            PROFILE.parse::<ProfileVersionArn>()
        );
        assert_eq!(
            Err(ArnError::MissingProfileVersion(format!("{PROFILE}/"))),
            format!("{PROFILE}/").parse::<ProfileVersionArn>()
        );

        let version: ProfileVersionArn = PROFILE_VERSION.parse().unwrap();
        assert_eq!("zJ4gcZ4F8f", version.profile_version());
        assert_eq!(PROFILE_VERSION, version.to_string());
    }

    #[test]
    fn profile_version_rejects_other_services() {
        let err = FUNCTION.parse::<ProfileVersionArn>().unwrap_err();
        assert!(matches!(
            err,
            ArnError::WrongService { expected: "signer", ref actual, .. } if actual == "lambda"
        ));
    }

    #[test]
    fn function_arn_name_and_qualifier() {
        let function: FunctionArn = FUNCTION.parse().unwrap();
        assert_eq!("EdgeOriginRequestFunction1700000000", function.function_name());
        assert_eq!(None, function.qualifier());

        let qualified: FunctionArn = format!("{FUNCTION}:$LATEST").parse().unwrap();
        assert_eq!(Some("$LATEST"), qualified.qualifier());
        assert_eq!(function, qualified.unqualified());

        assert!(matches!(
            "arn:aws:lambda:us-east-1:123456789012:layer:foo".parse::<FunctionArn>(),
            Err(ArnError::NotAFunction(_))
        ));
    }

    #[test]
    fn function_version_requires_numbered_qualifier() {
        assert!(matches!(
            FUNCTION.parse::<FunctionVersionArn>(),
            Err(ArnError::UnpublishedVersion(_))
        ));
        assert!(matches!(
            format!("{FUNCTION}:$LATEST").parse::<FunctionVersionArn>(),
            Err(ArnError::UnpublishedVersion(_))
        ));

        let published = FunctionVersionArn::from_published(FUNCTION, "2").unwrap();
        assert_eq!("2", published.version());
        assert_eq!(format!("{FUNCTION}:2"), published.to_string());

        let already_qualified =
            FunctionVersionArn::from_published(&format!("{FUNCTION}:3"), "3").unwrap();
        assert_eq!("3", already_qualified.version());
        assert_eq!(FUNCTION, already_qualified.function().to_string());
    }

    #[test]
    fn published_version_must_match_the_qualifier() {
        assert_eq!(
            Err(ArnError::VersionMismatch {
                arn: format!("{FUNCTION}:3"),
                version: "4".into(),
            }),
            FunctionVersionArn::from_published(&format!("{FUNCTION}:3"), "4")
        );
    }
}
