//! Registration workflow domain models.
//!
//! A workflow is the closed set of states a registration moves through and
//! the transitions between them. Which states count toward capacity is part
//! of the workflow definition, not hard-coded in the evaluator.

use serde::{Deserialize, Serialize};
use std::str::FromStr;

use crate::error::DomainError;

/// Registration lifecycle state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RegistrationState {
    Pending,
    Held,
    Complete,
    Canceled,
}

impl RegistrationState {
    pub const ALL: [RegistrationState; 4] = [
        RegistrationState::Pending,
        RegistrationState::Held,
        RegistrationState::Complete,
        RegistrationState::Canceled,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            RegistrationState::Pending => "pending",
            RegistrationState::Held => "held",
            RegistrationState::Complete => "complete",
            RegistrationState::Canceled => "canceled",
        }
    }
}

impl std::fmt::Display for RegistrationState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for RegistrationState {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "pending" => Ok(RegistrationState::Pending),
            "held" => Ok(RegistrationState::Held),
            "complete" => Ok(RegistrationState::Complete),
            "canceled" => Ok(RegistrationState::Canceled),
            other => Err(DomainError::UnknownState(other.to_string())),
        }
    }
}

/// A state as configured in a workflow.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub struct StateDefinition {
    pub state: RegistrationState,
    pub label: String,
    pub description: String,
    /// Registrations in this state occupy spaces.
    pub active: bool,
    /// Registrations in this state are on hold but still occupy spaces.
    pub held: bool,
    pub canceled: bool,
    pub show_on_form: bool,
}

/// A named transition from one or more states into a target state.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub struct Transition {
    pub id: String,
    pub label: String,
    pub from: Vec<RegistrationState>,
    pub to: RegistrationState,
}

/// A workflow definition.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub struct RegistrationWorkflow {
    pub id: String,
    pub label: String,
    pub states: Vec<StateDefinition>,
    pub transitions: Vec<Transition>,
    pub default_registration_state: RegistrationState,
}

impl RegistrationWorkflow {
    /// The stock registration workflow.
    pub fn default_workflow() -> Self {
        fn state(
            state: RegistrationState,
            label: &str,
            description: &str,
            active: bool,
            held: bool,
            canceled: bool,
            show_on_form: bool,
        ) -> StateDefinition {
            StateDefinition {
                state,
                label: label.to_string(),
                description: description.to_string(),
                active,
                held,
                canceled,
                show_on_form,
            }
        }

        Self {
            id: "registration".to_string(),
            label: "Default".to_string(),
            states: vec![
                state(
                    RegistrationState::Pending,
                    "Pending",
                    "Special state for registrations that are pending.",
                    true,
                    false,
                    false,
                    true,
                ),
                state(
                    RegistrationState::Held,
                    "Held",
                    "Special state for registrations that are held.",
                    false,
                    true,
                    false,
                    false,
                ),
                state(
                    RegistrationState::Complete,
                    "Complete",
                    "Special state for registrations that are complete.",
                    true,
                    false,
                    false,
                    true,
                ),
                state(
                    RegistrationState::Canceled,
                    "Canceled",
                    "Special state for registrations that are canceled.",
                    false,
                    false,
                    true,
                    true,
                ),
            ],
            transitions: vec![
                Transition {
                    id: "complete".to_string(),
                    label: "Complete".to_string(),
                    from: vec![RegistrationState::Pending, RegistrationState::Complete],
                    to: RegistrationState::Complete,
                },
                Transition {
                    id: "hold".to_string(),
                    label: "Hold".to_string(),
                    from: vec![RegistrationState::Pending],
                    to: RegistrationState::Held,
                },
                Transition {
                    id: "cancel".to_string(),
                    label: "Cancel".to_string(),
                    from: vec![
                        RegistrationState::Pending,
                        RegistrationState::Complete,
                        RegistrationState::Held,
                    ],
                    to: RegistrationState::Canceled,
                },
            ],
            default_registration_state: RegistrationState::Pending,
        }
    }

    /// Returns a copy with a different default state, if it is a member.
    pub fn with_default_state(mut self, state: RegistrationState) -> Result<Self, DomainError> {
        self.validate_state(state)?;
        self.default_registration_state = state;
        Ok(self)
    }

    pub fn state(&self, state: RegistrationState) -> Option<&StateDefinition> {
        self.states.iter().find(|definition| definition.state == state)
    }

    pub fn has_state(&self, state: RegistrationState) -> bool {
        self.state(state).is_some()
    }

    pub fn validate_state(&self, state: RegistrationState) -> Result<(), DomainError> {
        if self.has_state(state) {
            Ok(())
        } else {
            Err(DomainError::StateNotInWorkflow {
                state: state.to_string(),
                workflow: self.id.clone(),
            })
        }
    }

    /// Whether registrations in `state` occupy spaces.
    pub fn counts_toward_capacity(&self, state: RegistrationState) -> bool {
        self.state(state)
            .map(|definition| definition.active || definition.held)
            .unwrap_or(false)
    }

    pub fn is_active(&self, state: RegistrationState) -> bool {
        self.state(state).map(|d| d.active).unwrap_or(false)
    }

    /// States that occupy spaces, in workflow order.
    pub fn active_or_held_states(&self) -> Vec<RegistrationState> {
        self.states
            .iter()
            .filter(|d| d.active || d.held)
            .map(|d| d.state)
            .collect()
    }

    pub fn can_transition(&self, from: RegistrationState, to: RegistrationState) -> bool {
        self.transitions
            .iter()
            .any(|t| t.to == to && t.from.contains(&from))
    }

    /// States offered on the registration form.
    ///
    /// With `check_transitions`, only the current state and states reachable
    /// from it are offered.
    pub fn states_to_show_on_form(
        &self,
        current: Option<RegistrationState>,
        check_transitions: bool,
    ) -> Vec<&StateDefinition> {
        self.states
            .iter()
            .filter(|d| d.show_on_form)
            .filter(|d| match (check_transitions, current) {
                (true, Some(current)) => d.state == current || self.can_transition(current, d.state),
                _ => true,
            })
            .collect()
    }
}

impl Default for RegistrationWorkflow {
    fn default() -> Self {
        Self::default_workflow()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_state_parse() {
        assert_eq!("held".parse::<RegistrationState>().unwrap(), RegistrationState::Held);
        assert_eq!(
            "waitlist".parse::<RegistrationState>(),
            Err(DomainError::UnknownState("waitlist".to_string()))
        );
    }

    #[test]
    fn test_capacity_membership() {
        let workflow = RegistrationWorkflow::default_workflow();
        assert!(workflow.counts_toward_capacity(RegistrationState::Pending));
        assert!(workflow.counts_toward_capacity(RegistrationState::Complete));
        assert!(workflow.counts_toward_capacity(RegistrationState::Held));
        assert!(!workflow.counts_toward_capacity(RegistrationState::Canceled));
        assert!(!workflow.is_active(RegistrationState::Held));
    }

    #[test]
    fn test_states_to_show_on_form_for_new_registration() {
        let workflow = RegistrationWorkflow::default_workflow();
        let states: Vec<_> = workflow
            .states_to_show_on_form(None, false)
            .into_iter()
            .map(|d| d.state)
            .collect();
        assert_eq!(
            states,
            vec![
                RegistrationState::Pending,
                RegistrationState::Complete,
                RegistrationState::Canceled
            ]
        );
    }

    #[test]
    fn test_states_to_show_on_form_respects_transitions() {
        let workflow = RegistrationWorkflow::default_workflow();
        let states: Vec<_> = workflow
            .states_to_show_on_form(Some(RegistrationState::Canceled), true)
            .into_iter()
            .map(|d| d.state)
            .collect();
        assert_eq!(states, vec![RegistrationState::Canceled]);

        let states: Vec<_> = workflow
            .states_to_show_on_form(Some(RegistrationState::Complete), true)
            .into_iter()
            .map(|d| d.state)
            .collect();
        assert_eq!(
            states,
            vec![RegistrationState::Complete, RegistrationState::Canceled]
        );
    }

    #[test]
    fn test_default_state_must_be_member() {
        let mut workflow = RegistrationWorkflow::default_workflow();
        workflow.states.retain(|d| d.state != RegistrationState::Held);

        let err = workflow
            .clone()
            .with_default_state(RegistrationState::Held)
            .unwrap_err();
        assert_eq!(
            err,
            DomainError::StateNotInWorkflow {
                state: "held".to_string(),
                workflow: "registration".to_string()
            }
        );

        let workflow = workflow
            .with_default_state(RegistrationState::Complete)
            .unwrap();
        assert_eq!(workflow.default_registration_state, RegistrationState::Complete);
    }
}
