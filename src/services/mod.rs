pub mod auth;
pub use auth::AuthService;

pub mod keys;
pub use keys::ApiKeyService;

pub mod projects;
pub use projects::ProjectService;

pub mod logs;
pub use logs::{LogFieldUpdate, LogService};

pub mod events;
pub use events::{EventFieldUpdate, EventService};
