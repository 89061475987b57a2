//! Site blocks shown on node pages.

use serde::Serialize;
use shared::validation::escape_html;

use crate::models::permission::ACCESS_CONTENT;
use crate::models::Account;

use super::access::AccessResult;

pub const HUB_ACTIONS_BLOCK_ID: &str = "lbd_block_hub_edoovillage";
pub const HUB_ACTIONS_ADMIN_LABEL: &str = "Block: Hub & Edoovillage";
pub const DEFAULT_OBJECT_LABEL: &str = "Edoovillage";

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RenderedBlock {
    pub id: &'static str,
    pub admin_label: &'static str,
    pub markup: String,
}

/// Heading that introduces the actions available for an object.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HubActionsBlock {
    pub object_label: String,
}

impl Default for HubActionsBlock {
    fn default() -> Self {
        Self {
            object_label: DEFAULT_OBJECT_LABEL.to_string(),
        }
    }
}

impl HubActionsBlock {
    pub fn new(object_label: impl Into<String>) -> Self {
        Self {
            object_label: object_label.into(),
        }
    }

    pub fn access(&self, account: &Account) -> AccessResult {
        AccessResult::allowed_if(account.has_permission(ACCESS_CONTENT))
    }

    pub fn build(&self) -> RenderedBlock {
        let markup = format!(
            "<hr/><p><strong><font color=#009900 size=2px>Actions available for this {}:</font></strong></p><hr/>",
            escape_html(&self.object_label)
        );

        RenderedBlock {
            id: HUB_ACTIONS_BLOCK_ID,
            admin_label: HUB_ACTIONS_ADMIN_LABEL,
            markup,
        }
    }
}
