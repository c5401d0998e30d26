pub mod helper;
pub mod login;
pub mod refresh;
pub mod register;
pub mod reset_password;
