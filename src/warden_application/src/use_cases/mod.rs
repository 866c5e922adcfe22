pub mod change_password;
pub mod login;
pub mod logout;
pub mod oauth_login;
pub mod refresh_session;
pub mod register;
pub mod validate_session;
