//! Domain models for registrations.

pub mod account;
pub mod admin_settings;
pub mod host;
pub mod permission;
pub mod registration;
pub mod registration_type;
pub mod settings;
pub mod workflow;

pub use account::{Account, UserRef};
pub use admin_settings::RegistrationAdminSettings;
pub use host::{HostKind, HostRecord, HostRef, RegistrationField};
pub use registration::{Registrant, RegistrantType, Registration};
pub use registration_type::RegistrationType;
pub use settings::{RegistrationSettings, SettingKey, SettingValue};
pub use workflow::{RegistrationState, RegistrationWorkflow};
