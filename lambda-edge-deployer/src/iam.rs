/*
 * Copyright Amazon.com, Inc. or its affiliates. All Rights Reserved.
 * SPDX-License-Identifier: Apache-2.0
 */

use crate::config::{PollConfig, RunToken};
use crate::error::required;
use crate::policy;
use crate::wait::{poll_until_ready, Readiness};
use anyhow::{Context, Result};
use aws_sdk_iam as iam;
use tracing::info;

const ROLE_PATH: &str = "/service-role/";

/// An execution role with its logging policy attached.
#[derive(Debug, Clone, Eq, PartialEq)]
pub struct ExecutionRole {
    pub name: String,
    pub arn: String,
    pub policy_arn: String,
}

/// An [`ExecutionRole`] that IAM has been observed to serve back with its policy attached.
///
/// Only [`wait_for_propagation`] produces one.
#[derive(Debug, Clone, Eq, PartialEq)]
pub struct PropagatedRole(ExecutionRole);

impl PropagatedRole {
    pub fn arn(&self) -> &str {
        &self.0.arn
    }
}

pub async fn create_execution_role(
    iam_client: &iam::Client,
    token: &RunToken,
) -> Result<ExecutionRole> {
    let role_name = token.role_name();
    info!("Creating IAM role {}...", role_name);
    let created_role = iam_client
        .create_role()
        .path(ROLE_PATH)
        .role_name(&role_name)
        .assume_role_policy_document(policy::trust_policy().to_string())
        .send()
        .await
        .context(here!("failed to create execution role"))?;
    let role: &iam::types::Role = required(created_role.role(), "CreateRole", "Role")?;
    let role_arn: &str = required(role.arn(), "CreateRole", "Role.Arn")?;

    let policy_name = token.policy_name();
    let created_policy = iam_client
        .create_policy()
        .policy_name(&policy_name)
        .description(format!(
            "Grants CloudWatch Logs access to Lambda function {}",
            token.function_name()
        ))
        .policy_document(policy::logging_policy().to_string())
        .send()
        .await
        .context(here!("failed to create execution role policy"))?;
    let policy: &iam::types::Policy =
        required(created_policy.policy(), "CreatePolicy", "Policy")?;
    let policy_arn: &str = required(policy.arn(), "CreatePolicy", "Policy.Arn")?;

    iam_client
        .attach_role_policy()
        .role_name(&role_name)
        .policy_arn(policy_arn)
        .send()
        .await
        .context(here!("failed to attach policy to execution role"))?;
    info!("Attached {} to {}", policy_name, role_name);

    Ok(ExecutionRole {
        name: role_name,
        arn: role_arn.into(),
        policy_arn: policy_arn.into(),
    })
}

/// Waits until IAM lists the role's attached policy.
///
/// A role that IAM doesn't know about yet counts as pending rather than as an error.
pub async fn wait_for_propagation(
    iam_client: &iam::Client,
    role: ExecutionRole,
    poll: PollConfig,
) -> Result<PropagatedRole> {
    poll_until_ready("execution role to propagate", poll, || {
        let role = &role;
        async move {
            let listed = iam_client
                .list_attached_role_policies()
                .role_name(&role.name)
                .send()
                .await;
            let output = match listed {
                Ok(output) => output,
                Err(err)
                    if err
                        .as_service_error()
                        .map_or(false, |e| e.is_no_such_entity_exception()) =>
                {
                    return Ok(Readiness::Pending("role not visible yet".into()));
                }
                Err(err) => {
                    return Err(err).context(here!("failed to list attached role policies"))
                }
            };
            let attached: Option<&[iam::types::AttachedPolicy]> =
                output.attached_policies().into();
            let is_attached = attached.unwrap_or_default().iter().any(|policy| {
                let attached_arn: Option<&str> = policy.policy_arn().into();
                attached_arn == Some(role.policy_arn.as_str())
            });
            Ok(if is_attached {
                Readiness::Ready(())
            } else {
                Readiness::Pending("policy not attached yet".into())
            })
        }
    })
    .await?;
    info!("Execution role {} is ready", role.name);
    Ok(PropagatedRole(role))
}

#[cfg(test)]
pub(crate) fn propagated_for_test(arn: &str) -> PropagatedRole {
    PropagatedRole(ExecutionRole {
        name: "EdgeOriginRequestRole1700000000".into(),
        arn: arn.into(),
        policy_arn: "arn:aws:iam::123456789012:policy/EdgeOriginRequestRolePolicy1700000000"
            .into(),
    })
}
