mod auth;
mod dashboard;
mod types;
mod users;

pub use auth::require_admin_user;
pub use dashboard::dashboard;
pub use types::DashboardQuery;
pub use users::{create_user, remove_user, reset_user_password};
