//! Registration type (bundle) domain model.

use serde::{Deserialize, Serialize};

use super::workflow::{RegistrationState, RegistrationWorkflow};

/// A registration bundle such as "conference" or "workshop".
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub struct RegistrationType {
    pub id: String,
    pub label: String,
    #[serde(default)]
    pub workflow: RegistrationWorkflow,
}

impl RegistrationType {
    pub fn new(id: impl Into<String>, label: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            label: label.into(),
            workflow: RegistrationWorkflow::default_workflow(),
        }
    }

    pub fn with_workflow(mut self, workflow: RegistrationWorkflow) -> Self {
        self.workflow = workflow;
        self
    }

    /// State assigned to new registrations of this type.
    pub fn default_state(&self) -> RegistrationState {
        self.workflow.default_registration_state
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_uses_default_workflow() {
        let conference = RegistrationType::new("conference", "Conference");
        assert_eq!(conference.default_state(), RegistrationState::Pending);
        assert_eq!(conference.workflow.id, "registration");
    }
}
