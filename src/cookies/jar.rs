use super::{CookieSink, CookieWrite};
use std::{
    collections::{BTreeMap, VecDeque},
    sync::{Arc, Mutex, MutexGuard, PoisonError},
};

/// Writes kept for `Set-Cookie` emission before the oldest are dropped.
pub const MAX_PENDING_WRITES: usize = 32;

#[derive(Debug, Default)]
struct JarState {
    live: BTreeMap<&'static str, String>,
    writes: VecDeque<CookieWrite>,
}

/// In-memory cookie sink. Clones share the same jar.
///
/// Keeps the live value per name (for building the next request's `Cookie`
/// header) plus the writes since the last [`CookieJar::drain_set_cookie_headers`],
/// oldest first. That log holds at most [`MAX_PENDING_WRITES`] entries; a jar
/// that is never drained keeps only the most recent ones, which is enough to
/// replay the final value of each cookie.
#[derive(Clone, Debug, Default)]
pub struct CookieJar {
    inner: Arc<Mutex<JarState>>,
}

impl CookieJar {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    fn state(&self) -> MutexGuard<'_, JarState> {
        self.inner.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Live value of a cookie; cleared cookies are absent.
    #[must_use]
    pub fn get(&self, name: &str) -> Option<String> {
        self.state().live.get(name).cloned()
    }

    #[must_use]
    pub fn last_write(&self, name: &str) -> Option<CookieWrite> {
        self.state()
            .writes
            .iter()
            .rev()
            .find(|write| write.name == name)
            .cloned()
    }

    #[must_use]
    pub fn writes(&self) -> Vec<CookieWrite> {
        self.state().writes.iter().cloned().collect()
    }

    /// `Set-Cookie` values for every write since the last drain, oldest first.
    #[must_use]
    pub fn drain_set_cookie_headers(&self) -> Vec<String> {
        self.state()
            .writes
            .drain(..)
            .map(|write| write.to_header_value())
            .collect()
    }

    /// Value for a request `Cookie` header, or `None` when the jar is empty.
    #[must_use]
    pub fn cookie_header(&self) -> Option<String> {
        let state = self.state();
        if state.live.is_empty() {
            return None;
        }
        Some(
            state
                .live
                .iter()
                .map(|(name, value)| format!("{name}={value}"))
                .collect::<Vec<_>>()
                .join("; "),
        )
    }
}

impl CookieSink for CookieJar {
    fn write(&self, cookie: CookieWrite) {
        let mut state = self.state();
        if cookie.is_clear() {
            state.live.remove(cookie.name);
        } else {
            state.live.insert(cookie.name, cookie.value.clone());
        }
        if state.writes.len() == MAX_PENDING_WRITES {
            state.writes.pop_front();
        }
        state.writes.push_back(cookie);
    }
}
