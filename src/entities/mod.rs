pub mod prelude;

pub mod api_keys;
pub mod events;
pub mod logs;
pub mod projects;
pub mod users;
