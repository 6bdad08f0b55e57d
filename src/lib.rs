//! # ClassAccess API
//!
//! REST backend for school attendance tracking, built with Axum and
//! PostgreSQL. It authenticates students, teachers and administrators,
//! records entry and exit events sent by classroom access devices, and
//! exposes the administrative endpoints around them.
//!
//! ## Architecture
//!
//! ```text
//! src/
//! ├── middleware/       # Session, optional session and role gate
//! ├── modules/          # Feature modules
//! │   ├── auth/        # Login, logout, refresh, session check
//! │   ├── attendance/  # Device register endpoint, student history
//! │   ├── students/    # Student profile read and update
//! │   ├── users/       # Student registration, user administration
//! │   ├── classrooms/  # Room administration
//! │   └── devices/     # Reader device administration
//! ├── logging.rs        # Tracing setup and request logging middleware
//! ├── metrics.rs        # Prometheus recorder and HTTP metrics
//! ├── router.rs         # Route table
//! ├── state.rs          # Shared application state
//! └── validator.rs      # Validated JSON extractor
//! ```
//!
//! Each feature module has `controller.rs` (handlers), `service.rs`
//! (business logic) and `router.rs`. Entities and DTOs live in the
//! `classaccess-models` crate, storage contracts in `classaccess-db`.
//!
//! ## Sessions
//!
//! Login issues an access token (default 24 hours) and a refresh token
//! (default 7 days) signed with separate secrets. Depending on
//! `TOKEN_DELIVERY`, they are set as `accessToken` / `refreshToken` cookies
//! or returned in the JSON body. Protected routes accept the access token
//! from the cookie or from an `Authorization: Bearer` header.
//!
//! ## Roles
//!
//! | Role | Value | Typical access |
//! |------|-------|----------------|
//! | Student | 1 | Own attendance history |
//! | Teacher | 2 | Attendance history of any student |
//! | Admin | 3 | User and classroom administration |

pub mod logging;
pub mod metrics;
pub mod middleware;
pub mod modules;
pub mod router;
pub mod state;
pub mod validator;
