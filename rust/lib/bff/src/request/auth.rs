//! Auth requests.

use artshare_flux::Request;

/// Restore the session from persisted tokens.
#[derive(Debug, Clone)]
pub struct RestoreReq;

impl Request for RestoreReq {
    const PATH: &'static str = "auth/restore";
}

/// Login with username + password.
#[derive(Debug, Clone)]
pub struct LoginReq {
    pub username: String,
    pub password: String,
}

impl Request for LoginReq {
    const PATH: &'static str = "auth/login";
}

/// Create an account and sign in.
#[derive(Debug, Clone)]
pub struct RegisterReq {
    pub username: String,
    pub password: String,
    pub password_confirm: String,
}

impl Request for RegisterReq {
    const PATH: &'static str = "auth/register";
}

/// Logout and clear the session.
#[derive(Debug, Clone)]
pub struct LogoutReq;

impl Request for LogoutReq {
    const PATH: &'static str = "auth/logout";
}

#[derive(Debug, Clone)]
pub struct ChangePasswordReq {
    pub current_password: String,
    pub new_password: String,
    pub new_password_confirm: String,
}

impl Request for ChangePasswordReq {
    const PATH: &'static str = "auth/change-password";
}
