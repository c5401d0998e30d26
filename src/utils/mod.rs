pub mod error_handler;
pub mod misc;
pub mod sequence_generator;
pub mod validation;

pub use error_handler::AppError;
pub use misc::*;
pub use sequence_generator::next_seq_val;
pub use validation::validate_otp_code;
pub use validation::ValidatedBody;
