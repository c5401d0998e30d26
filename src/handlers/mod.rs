pub mod auth;
pub mod default;
pub mod global_404;
pub mod otp;
pub mod ping;
pub mod punishment;

pub use auth::login::login_handler;
pub use auth::login::purok_leader_login_handler;
pub use auth::refresh::refresh_token_handler;
pub use auth::register::register_handler;
pub use auth::reset_password::reset_password_handler;

pub use default::default_route_handler;

pub use global_404::global_404_handler;

pub use otp::check::check_otp_handler;
pub use otp::send::resend_otp_handler;
pub use otp::send::send_otp_handler;
pub use otp::verify::verify_otp_handler;

pub use ping::ping_handler;

pub use punishment::available::available_punishments_handler;
pub use punishment::history::punishment_history_handler;
pub use punishment::revoke::revoke_suspension_handler;
pub use punishment::suspend::suspend_user_handler;
