#![allow(dead_code)]

pub mod auth;
pub mod helper;

pub use auth::login;
pub use helper::build_get_request;
pub use helper::build_post_request;
pub use helper::call;
pub use helper::get_app;
pub use helper::insert_user;
pub use helper::live_code;
pub use helper::GenericResponse;
