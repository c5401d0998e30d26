pub const REQUEST_TIMEOUT_SECS: u64 = 30;
pub const MONGO_MIN_POOL_SIZE: u32 = 5;
pub const MONGO_MAX_POOL_SIZE: u32 = 10;
pub const MONGO_CONN_TIMEOUT: u64 = 10;

pub const OTP_LENGTH: u32 = 6;
pub const OTP_VALIDITY_MINS: u64 = 10;
pub const OTP_MAX_SENDS: u32 = 3;
pub const OTP_MAX_VERIFY_ATTEMPTS: u32 = 5;
pub const OTP_RATE_WINDOW_SECS: u64 = 10 * 60;
// concurrent sends racing on the unique index of unused codes
pub const OTP_STORE_ATTEMPTS: u32 = 3;
pub const REGISTRATION_VERIFY_WINDOW_SECS: u64 = 30 * 60;
pub const PASSWORD_RESET_TOKEN_LEN: usize = 64;
pub const PASSWORD_RESET_TOKEN_EXPIRY: u64 = 60 * 60;
pub const PASSWORD_MIN_LEN: u64 = 8;

pub const WARNING_1_DAYS: u64 = 3;
pub const WARNING_2_DAYS: u64 = 7;

pub const CLEANUP_JOB_INTERVAL: u64 = 60 * 60;
// retention values are mentioned in number of days
pub const OTP_RETENTION: u64 = 7;
pub const RESET_TOKEN_RETENTION: u64 = 1;

pub const DEFAULT_MAIL_FROM_EMAIL: &str = "no-reply@purok.local";
pub const DEFAULT_MAIL_FROM_NAME: &str = "Purok Incident Desk";
pub const DEFAULT_SMTP_PORT: u16 = 587;

pub const DB_NAME: &str = "purok_incident";

pub const COLL_SEQUENCES: &str = "sequences";
pub const COLL_USERS: &str = "users";
pub const COLL_OTP: &str = "otps";
pub const COLL_RATE_LIMITS: &str = "rateLimits";
pub const COLL_PASSWORD_RESETS: &str = "passwordResetTokens";
pub const COLL_PUNISHMENTS: &str = "punishments";

pub const USER_ID_SEQ: &str = "USER_ID_SEQ";
pub const PUNISHMENT_ID_SEQ: &str = "PUNISHMENT_ID_SEQ";
