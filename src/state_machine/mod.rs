// Copyright (c) 2025 - Cowboy AI, Inc.
//! Role Lifecycle
//!
//! A cluster component applies its role while it is being declared. The
//! lifecycle decides, from the current [`RoleState`] and a [`RoleCommand`],
//! which declarations the component makes next ([`RoleEffect`]). It keeps
//! a log of every accepted step so callers can inspect how a component
//! arrived at its role.
//!
//! ```text
//! Unassigned ──AssignHub──▶ Hub ──AssignHub──▶ Hub (unchanged)
//!     │
//!     └─AssignSpoke─▶ Spoke(Unregistered) ──DeclareRegistration──▶ Spoke(Declared)
//!                          │
//!                          └─SkipRegistration─▶ Spoke(Unregistered)
//! ```
//!
//! A rejected command leaves state and log untouched.

pub mod role_lifecycle;

pub use role_lifecycle::{RoleCommand, RoleEffect, RoleState, SpokeRegistration};

use chrono::{DateTime, Utc};

/// Role command rejected by the lifecycle
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum TransitionError {
    /// A component keeps the role it was first given
    #[error("Cluster role cannot change from {from} to {to}")]
    RoleChange { from: RoleState, to: RoleState },

    /// Registration commands need the spoke role first
    #[error("{0:?} requires an assigned role")]
    Unassigned(RoleCommand),

    /// Registration is not a hub concern
    #[error("{command:?} does not apply to a {state} cluster")]
    NotApplicable { state: RoleState, command: RoleCommand },

    /// A spoke holds at most one registry entry
    #[error("Registry entry already declared")]
    AlreadyRegistered,
}

/// One accepted command
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RoleStep {
    pub from: RoleState,
    pub to: RoleState,
    pub command: RoleCommand,
    pub at: DateTime<Utc>,
}

/// Role state of one component plus the steps that led there
#[derive(Debug, Clone, Default)]
pub struct RoleLifecycle {
    state: RoleState,
    steps: Vec<RoleStep>,
}

impl RoleLifecycle {
    pub fn new() -> Self {
        Self::default()
    }

    /// Apply a command, returning what the component must declare
    pub fn apply(
        &mut self,
        command: RoleCommand,
        at: DateTime<Utc>,
    ) -> Result<RoleEffect, TransitionError> {
        let (to, effect) = self.state.next(&command)?;
        self.steps.push(RoleStep {
            from: self.state,
            to,
            command,
            at,
        });
        self.state = to;
        Ok(effect)
    }

    pub fn state(&self) -> RoleState {
        self.state
    }

    pub fn steps(&self) -> &[RoleStep] {
        &self.steps
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_steps_record_accepted_commands() {
        let mut lifecycle = RoleLifecycle::new();
        let at = Utc::now();

        assert_eq!(
            lifecycle.apply(RoleCommand::AssignSpoke, at).unwrap(),
            RoleEffect::GrantAccess
        );
        assert_eq!(
            lifecycle.apply(RoleCommand::DeclareRegistration, at).unwrap(),
            RoleEffect::Register
        );

        let steps = lifecycle.steps();
        assert_eq!(steps.len(), 2);
        assert_eq!(steps[0].from, RoleState::Unassigned);
        assert_eq!(steps[1].to, RoleState::Spoke(SpokeRegistration::Declared));
        assert_eq!(steps[1].at, at);
    }

    #[test]
    fn test_rejected_command_leaves_lifecycle_untouched() {
        let mut lifecycle = RoleLifecycle::new();
        lifecycle.apply(RoleCommand::AssignHub, Utc::now()).unwrap();

        let err = lifecycle
            .apply(RoleCommand::AssignSpoke, Utc::now())
            .unwrap_err();
        assert_eq!(
            err,
            TransitionError::RoleChange {
                from: RoleState::Hub,
                to: RoleState::Spoke(SpokeRegistration::Unregistered),
            }
        );
        assert_eq!(lifecycle.state(), RoleState::Hub);
        assert_eq!(lifecycle.steps().len(), 1);
    }
}
