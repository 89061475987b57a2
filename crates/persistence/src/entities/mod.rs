//! Entity definitions (database row mappings).

pub mod host;
pub mod registration;
pub mod registration_settings;
pub mod user;

pub use host::HostEntityRow;
pub use registration::RegistrationEntity;
pub use registration_settings::{RegistrationSettingsEntity, RegistrationSettingsWithHostEntity};
pub use user::UserEntity;
