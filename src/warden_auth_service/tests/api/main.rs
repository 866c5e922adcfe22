mod change_password;
mod health;
mod helpers;
mod login;
mod logout;
mod oauth;
mod refresh;
mod register;
mod timeout;
mod validate;
