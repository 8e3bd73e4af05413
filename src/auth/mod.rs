use crate::state::AppState;
use axum::Router;

mod claims;
pub mod dto;
pub(crate) mod extractors;
pub mod handlers;
mod jwt;
mod password;
pub mod service;

pub use extractors::CurrentUser;
pub use jwt::JwtKeys;
pub use service::AuthService;

pub fn router() -> Router<AppState> {
    Router::new()
        .merge(handlers::auth_routes())
        .merge(handlers::me_routes())
}
