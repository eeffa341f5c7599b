pub const MONGO_MIN_POOL_SIZE: u32 = 5;
pub const MONGO_MAX_POOL_SIZE: u32 = 10;
pub const MONGO_CONN_TIMEOUT: u64 = 10;

/// Alphabet the OTP codes are drawn from: upper + lower case letters + digits
pub const OTP_CHARSET: &str = "ABCDEFGHIJKLMNOPQRSTUVWXYZabcdefghijklmnopqrstuvwxyz0123456789";
/// How many times issuance retries generation when the generated code
/// collides with an existing row. Collisions are vanishingly rare given the
/// alphabet, exhaustion indicates a deeper problem.
pub const OTP_MAX_GENERATE_ATTEMPTS: usize = 3;
/// Fixed _id of the singleton otp config document
pub const OTP_CONFIG_ID: i32 = 1;
/// Audit trail file name inside the storage directory
pub const OTP_AUDIT_FILE: &str = "otp_codes.log";
/// Default audit storage directory, override with OTP_STORAGE_PATH
pub const OTP_STORAGE_PATH_DEFAULT: &str = "./otp-storage";

// SWEEP_JOB_INTERVAL_SECS default is mentioned in seconds
pub const SWEEP_JOB_INTERVAL: u64 = 60;

// per channel timeout for outbound notification calls
pub const NOTIFICATION_SEND_TIMEOUT_SECS: u64 = 10;

pub const DB_NAME: &str = "otpservice";

pub const COLL_SEQUENCES: &str = "sequences";
pub const COLL_USERS: &str = "users";
pub const COLL_OTP_CODES: &str = "otpCodes";
pub const COLL_OTP_CONFIG: &str = "otpConfig";

pub const USER_ID_SEQ: &str = "USER_ID_SEQ";
