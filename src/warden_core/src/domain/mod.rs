pub mod email;
pub mod oauth;
pub mod password;
pub mod refresh_token;
pub mod registration;
pub mod session;
pub mod user;
