use std::time::{Duration, Instant};

use actix_identity::{Identity, IdentityExt};
use actix_utils::future::{ready, Ready};
use actix_web::{dev::Payload, web::Data, FromRequest, HttpMessage, HttpRequest};
use moka::{sync::Cache, Expiry};
use uuid::Uuid;

use crate::errors::AppError;

const MAX_SESSIONS: u64 = 100_000;

/// Who a live session belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Principal {
    pub user_id: i64,
    pub is_admin: bool,
}

#[derive(Debug, Clone)]
struct SessionEntry {
    principal: Principal,
    ttl: Duration,
}

struct PerEntryTtl;

impl Expiry<String, SessionEntry> for PerEntryTtl {
    fn expire_after_create(&self, _key: &String, value: &SessionEntry, _created_at: Instant) -> Option<Duration> {
        Some(value.ttl)
    }
}

/// Process-wide map from opaque session token to principal.
pub struct SessionTable {
    sessions: Cache<String, SessionEntry>,
    session_ttl: Duration,
    remember_ttl: Duration,
}

impl SessionTable {
    pub fn new(session_ttl: Duration, remember_ttl: Duration) -> Self {
        Self {
            sessions: Cache::builder()
                .max_capacity(MAX_SESSIONS)
                .expire_after(PerEntryTtl)
                .build(),
            session_ttl,
            remember_ttl,
        }
    }

    /// Binds `token` to `principal`; `remember` picks the long-lived lifetime.
    pub fn login(&self, token: &str, principal: Principal, remember: bool) {
        let ttl = if remember { self.remember_ttl } else { self.session_ttl };
        self.sessions
            .insert(token.to_owned(), SessionEntry { principal, ttl });
        log::debug!("Session opened for user {} (remember: {})", principal.user_id, remember);
    }

    pub fn logout(&self, token: &str) {
        self.sessions.invalidate(token);
    }

    pub fn current_identity(&self, token: &str) -> Viewer {
        match self.sessions.get(token) {
            Some(entry) => Viewer::Authenticated(entry.principal),
            None => Viewer::Anonymous,
        }
    }

    pub fn new_token() -> String {
        Uuid::new_v4().to_string()
    }
}

/// Identity resolved for the current request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Viewer {
    Anonymous,
    Authenticated(Principal),
}

impl Viewer {
    pub fn principal(&self) -> Option<Principal> {
        match self {
            Viewer::Anonymous => None,
            Viewer::Authenticated(principal) => Some(*principal),
        }
    }

    pub fn user_id(&self) -> Option<i64> {
        self.principal().map(|p| p.user_id)
    }

    pub fn is_authenticated(&self) -> bool {
        matches!(self, Viewer::Authenticated(_))
    }
}

fn session_token(req: &HttpRequest) -> Option<String> {
    req.get_identity().ok().and_then(|identity| identity.id().ok())
}

fn resolve_viewer(req: &HttpRequest) -> Viewer {
    let (Some(sessions), Some(token)) = (req.app_data::<Data<SessionTable>>(), session_token(req)) else {
        return Viewer::Anonymous;
    };
    sessions.current_identity(&token)
}

impl FromRequest for Viewer {
    type Error = AppError;
    type Future = Ready<Result<Self, Self::Error>>;

    fn from_request(req: &HttpRequest, _: &mut Payload) -> Self::Future {
        ready(Ok(resolve_viewer(req)))
    }
}

/// Extractor for routes that require a login. Anonymous callers get 401
/// before the handler body runs.
#[derive(Debug, Clone, Copy)]
pub struct AuthUser(pub Principal);

impl FromRequest for AuthUser {
    type Error = AppError;
    type Future = Ready<Result<Self, Self::Error>>;

    fn from_request(req: &HttpRequest, _: &mut Payload) -> Self::Future {
        ready(match resolve_viewer(req) {
            Viewer::Authenticated(principal) => Ok(AuthUser(principal)),
            Viewer::Anonymous => Err(AppError::Unauthorized),
        })
    }
}

impl From<AuthUser> for Viewer {
    fn from(user: AuthUser) -> Self {
        Viewer::Authenticated(user.0)
    }
}

/// Issues a fresh session for `principal` and stores its token in the cookie identity.
/// A token already held by the client is revoked first.
pub fn start_session(
    request: &HttpRequest,
    sessions: &SessionTable,
    principal: Principal,
    remember: bool,
) -> Result<(), AppError> {
    if let Some(stale) = session_token(request) {
        sessions.logout(&stale);
    }
    let token = SessionTable::new_token();
    Identity::login(&request.extensions(), token.clone())?;
    sessions.login(&token, principal, remember);
    Ok(())
}

pub fn end_session(request: &HttpRequest, sessions: &SessionTable) {
    if let Ok(identity) = request.get_identity() {
        if let Ok(token) = identity.id() {
            sessions.logout(&token);
            log::debug!("Session closed");
        }
        identity.logout();
    }
}
