//! Request gates.
//!
//! - [`auth`]: session middleware (required and optional) and the
//!   [`auth::AuthUser`] extractor
//! - [`role`]: role gate layered after the session middleware
//!
//! # Flow
//!
//! 1. `require_auth` reads the access token from the `accessToken` cookie or
//!    the `Authorization: Bearer` header and verifies it
//! 2. On success the identity is stored in request extensions
//! 3. `require_roles` compares that identity's role with the route's allowed set
//! 4. Handlers receive the identity through the `AuthUser` extractor
//!
//! ```ignore
//! Router::new()
//!     .route("/", get(list_users))
//!     .route_layer(middleware::from_fn(require_admin))
//!     .route_layer(middleware::from_fn_with_state(state.clone(), require_auth));
//! ```

pub mod auth;
pub mod role;
