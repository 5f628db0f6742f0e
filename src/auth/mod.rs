//! Authentication: register, login, JWT.

mod handlers;
mod jwt;
mod service;

pub use handlers::{login, register};
pub use jwt::{Claims, TokenIssuer, TOKEN_TTL_HOURS};
pub use service::{hash_password, verify_password, AuthService, Credentials, LoginResponse};
