//! Repository implementations for database operations.

pub mod host;
pub mod registration;
pub mod registration_settings;
pub mod user;

pub use host::HostRepository;
pub use registration::RegistrationRepository;
pub use registration_settings::RegistrationSettingsRepository;
pub use user::UserRepository;
