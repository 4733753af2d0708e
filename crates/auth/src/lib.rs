pub mod error;
pub mod jwt;
pub mod password;

pub use error::{AuthError, Result};
pub use jwt::{Claims, JwtService};
pub use password::PasswordHasher;
