//! Session state: who is signed in and what they still have to do.

mod store;
mod types;

pub use self::store::SessionStore;
pub use self::types::{Role, Session, SessionPhase, User};
