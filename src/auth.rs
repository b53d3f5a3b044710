use actix_web::{dev::Payload, web, FromRequest, HttpRequest};
use serde::{Deserialize, Serialize};
use std::borrow::Cow;
use std::collections::HashMap;
use std::future::{ready, Ready};
use std::marker::PhantomData;

use crate::error::ApiError;
use crate::routes::AppState;

/// Request header carrying `username:password`.
pub const AUTH_HEADER: &str = "auth_header";
// Dashed spelling sent by clients that normalise underscores.
const AUTH_HEADER_DASHED: &str = "auth-header";

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    Basic,
    Admin,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct User {
    pub username: String,
    pub password: String,
    pub roles: Vec<Role>,
}

impl User {
    pub fn new(username: &str, password: &str, roles: &[Role]) -> Self {
        Self { username: username.into(), password: password.into(), roles: roles.to_vec() }
    }

    pub fn has_role(&self, role: Role) -> bool {
        self.roles.contains(&role)
    }
}

/// Source of known users, keyed by username.
pub trait UserRepo: Send + Sync {
    fn find_user(&self, username: &str) -> Option<User>;
}

/// Fixed credential table, built once at startup.
#[derive(Debug, Clone)]
pub struct StaticUsers {
    users: HashMap<String, User>,
}

impl StaticUsers {
    pub fn new(users: impl IntoIterator<Item = User>) -> Self {
        Self { users: users.into_iter().map(|u| (u.username.clone(), u)).collect() }
    }
}

impl Default for StaticUsers {
    fn default() -> Self {
        Self::new([
            User::new("alice", "wonderland", &[Role::Basic]),
            User::new("bob", "builder", &[Role::Basic]),
            User::new("clementine", "mandarine", &[Role::Basic]),
            User::new("admin", "4dm1N", &[Role::Basic, Role::Admin]),
        ])
    }
}

impl UserRepo for StaticUsers {
    fn find_user(&self, username: &str) -> Option<User> {
        self.users.get(username).cloned()
    }
}

#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum AuthError {
    #[error("No Authorization header")]
    MissingHeader,
    #[error("Authorization header should be in the form username:password")]
    Malformed,
    #[error("Specified username {0} does not exist")]
    UnknownUser(String),
    #[error("Mismatch password")]
    PasswordMismatch,
    #[error("Unauthorized action for user {0}")]
    Forbidden(String),
}

/// Resolve a `username:password` credential to its user.
///
/// The value is split on every `:`, so a password containing one never
/// authenticates.
pub fn authenticate(users: &dyn UserRepo, credential: Option<&str>) -> Result<User, AuthError> {
    let credential = credential.ok_or(AuthError::MissingHeader)?;
    let parts: Vec<&str> = credential.split(':').collect();
    let [username, password] = parts[..] else {
        return Err(AuthError::Malformed);
    };
    let user = users
        .find_user(username)
        .ok_or_else(|| AuthError::UnknownUser(username.to_string()))?;
    if user.password != password {
        return Err(AuthError::PasswordMismatch);
    }
    Ok(user)
}

pub fn authorize(user: &User, required: Role) -> Result<(), AuthError> {
    if user.has_role(required) {
        Ok(())
    } else {
        Err(AuthError::Forbidden(user.username.clone()))
    }
}

/// Full guard: authenticate, then check the required role.
pub fn verify(users: &dyn UserRepo, credential: Option<&str>, required: Role) -> Result<(), AuthError> {
    let user = authenticate(users, credential)?;
    authorize(&user, required)
}

/// Marker for the role a handler demands.
pub trait RequiredRole {
    const ROLE: Role;
}

pub struct BasicTier;
pub struct AdminTier;

impl RequiredRole for BasicTier { const ROLE: Role = Role::Basic; }
impl RequiredRole for AdminTier { const ROLE: Role = Role::Admin; }

/// Extractor yielding a user who holds `R::ROLE`.
///
/// Put it first in the handler signature so a failed check answers before
/// the query string or body is looked at.
pub struct Authorized<R: RequiredRole> {
    pub user: User,
    _tier: PhantomData<R>,
}

/// Raw credential header, decoded leniently so non-ASCII values still reach
/// the password comparison.
fn credential_header(req: &HttpRequest) -> Option<Cow<'_, str>> {
    let headers = req.headers();
    headers
        .get(AUTH_HEADER)
        .or_else(|| headers.get(AUTH_HEADER_DASHED))
        .map(|v| String::from_utf8_lossy(v.as_bytes()))
}

impl<R: RequiredRole> Authorized<R> {
    fn extract(req: &HttpRequest) -> Result<Self, ApiError> {
        let state = req.app_data::<web::Data<AppState>>().ok_or_else(|| {
            log::error!("AppState missing from app data");
            ApiError::Internal
        })?;
        let user = authenticate(state.users.as_ref(), credential_header(req).as_deref())?;
        authorize(&user, R::ROLE)?;
        Ok(Self { user, _tier: PhantomData })
    }
}

impl<R: RequiredRole> FromRequest for Authorized<R> {
    type Error = ApiError;
    type Future = Ready<Result<Self, ApiError>>;

    fn from_request(req: &HttpRequest, _pl: &mut Payload) -> Self::Future {
        ready(Self::extract(req))
    }
}
