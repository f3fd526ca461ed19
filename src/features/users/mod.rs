pub mod models;
pub mod repositories;

pub use models::{NewUser, Role, User};
pub use repositories::{PgUserRepository, UserRepository};
