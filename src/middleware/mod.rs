pub mod auth;
pub mod extract;
pub mod response;

pub use auth::{admin_auth_middleware, AuthUser};
pub use extract::JsonBody;
pub use response::{ApiResponse, ApiResult};
