//! Security subsystem.
//!
//! # Data Flow
//! ```text
//! Incoming request:
//!     → headers.rs (security headers on the way out)
//!     → cors.rs (refuse preflights from unlisted origins with 400,
//!                answer the rest, tag allowed origins)
//!     → rate_limit.rs (check per-IP limits)
//!     → limits.rs (check request body size)
//!     → Pass to routers
//! ```
//!
//! # Design Decisions
//! - Security headers wrap everything, so 429s and preflights carry them too
//! - Preflights are answered before the limiter sees them
//! - Client identity is the raw connection address; forwarded headers are not trusted

pub mod clock;
pub mod cors;
pub mod headers;
pub mod limits;
pub mod rate_limit;

pub use clock::{Clock, MockClock, SystemClock};
pub use rate_limit::{Decision, RateLimitConfig, RateLimiter};
