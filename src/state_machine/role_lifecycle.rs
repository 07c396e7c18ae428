// Copyright (c) 2025 - Cowboy AI, Inc.
//! Role states, commands and the transition table
//!
//! | State               | Command             | Next                | Effect        |
//! |---------------------|---------------------|---------------------|---------------|
//! | Unassigned          | AssignHub           | Hub                 | InstallAddOns |
//! | Unassigned          | AssignSpoke         | Spoke(Unregistered) | GrantAccess   |
//! | Hub                 | AssignHub           | Hub                 | Unchanged     |
//! | Spoke(_)            | AssignSpoke         | same                | Unchanged     |
//! | Spoke(Unregistered) | DeclareRegistration | Spoke(Declared)     | Register      |
//! | Spoke(Unregistered) | SkipRegistration    | Spoke(Unregistered) | Skip          |
//!
//! Anything else is rejected.

use serde::{Deserialize, Serialize};
use std::fmt;

use super::TransitionError;

/// Registration progress of a spoke with its hub
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SpokeRegistration {
    /// No hub connection was supplied (or not yet)
    Unregistered,
    /// Registry entry declared against the hub
    Declared,
}

/// Role of a cluster component
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RoleState {
    /// Role not yet applied
    #[default]
    Unassigned,
    /// Hosts the GitOps controller
    Hub,
    /// Managed target of a hub
    Spoke(SpokeRegistration),
}

impl fmt::Display for RoleState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Unassigned => write!(f, "unassigned"),
            Self::Hub => write!(f, "hub"),
            Self::Spoke(SpokeRegistration::Unregistered) => write!(f, "spoke (unregistered)"),
            Self::Spoke(SpokeRegistration::Declared) => write!(f, "spoke (registered)"),
        }
    }
}

/// Input of the role lifecycle
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RoleCommand {
    AssignHub,
    AssignSpoke,
    /// Hub connection info present: register with it
    DeclareRegistration,
    /// No hub connection info
    SkipRegistration,
}

/// Declarations a component makes after an accepted command
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RoleEffect {
    /// Role already applied
    Unchanged,
    /// Controller and applications releases
    InstallAddOns,
    /// Service account, token, cluster role and binding
    GrantAccess,
    /// Hub provider and registry entry
    Register,
    /// Nothing declared; the reason is reported
    Skip(String),
}

impl RoleState {
    /// Next state and effect for `command`
    pub fn next(self, command: &RoleCommand) -> Result<(Self, RoleEffect), TransitionError> {
        use RoleCommand::*;
        use SpokeRegistration::*;

        match (self, command) {
            (Self::Unassigned, AssignHub) => Ok((Self::Hub, RoleEffect::InstallAddOns)),
            (Self::Unassigned, AssignSpoke) => {
                Ok((Self::Spoke(Unregistered), RoleEffect::GrantAccess))
            }
            (Self::Unassigned, _) => Err(TransitionError::Unassigned(*command)),

            (Self::Hub, AssignHub) | (Self::Spoke(_), AssignSpoke) => {
                Ok((self, RoleEffect::Unchanged))
            }
            (Self::Hub, AssignSpoke) => Err(TransitionError::RoleChange {
                from: self,
                to: Self::Spoke(Unregistered),
            }),
            (Self::Spoke(_), AssignHub) => Err(TransitionError::RoleChange {
                from: self,
                to: Self::Hub,
            }),
            (Self::Hub, _) => Err(TransitionError::NotApplicable {
                state: self,
                command: *command,
            }),

            (Self::Spoke(Unregistered), DeclareRegistration) => {
                Ok((Self::Spoke(Declared), RoleEffect::Register))
            }
            (Self::Spoke(Unregistered), SkipRegistration) => Ok((
                self,
                RoleEffect::Skip("no hub connection supplied; registration skipped".to_string()),
            )),
            (Self::Spoke(Declared), _) => Err(TransitionError::AlreadyRegistered),
        }
    }
}
