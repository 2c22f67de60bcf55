pub use super::api_keys::Entity as ApiKeys;
pub use super::events::Entity as Events;
pub use super::logs::Entity as Logs;
pub use super::projects::Entity as Projects;
pub use super::users::Entity as Users;
