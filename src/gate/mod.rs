//! Request gate.
//!
//! Runs before any page is served and decides, from the path and the mirrored
//! session cookies alone, whether to serve it or redirect to login, account
//! verification, home or the admin section. The locale prefix is stripped
//! before matching and put back on the redirect target.

pub mod decision;
pub mod middleware;
pub mod paths;

pub use self::decision::{evaluate, home_for, GateDecision, GateRequest, Redirect};
pub use self::middleware::{gate, GateConfig};
pub use self::paths::{LocalizedPath, Locales, PathClass};
