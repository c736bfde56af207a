//! Services layer - Business logic
//!
//! Services implement business rules, coordinate repositories and the
//! cache, and own validation and error cases.

pub mod auth;
pub mod email;
pub mod image;
pub mod news;
pub mod password;
pub mod token;

pub use auth::{AuthService, AuthServiceError, LoginInput, RegisterInput};
pub use email::EmailService;
pub use image::{ImageError, ImageStorage};
pub use news::{NewsInput, NewsService, NewsServiceError};
pub use password::{hash_password, verify_password};
pub use token::{Claims, TokenError, TokenService};
