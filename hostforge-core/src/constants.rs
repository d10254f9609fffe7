/// Rate-limit window length in seconds.
pub const RATE_WINDOW_SECS: u64 = 60;

/// Requests per window for authentication endpoints.
pub const RATE_LIMIT_AUTH: u32 = 10;

/// Requests per window for order and payment endpoints.
pub const RATE_LIMIT_ORDER: u32 = 20;

/// Requests per window for everything else.
pub const RATE_LIMIT_GENERAL: u32 = 100;

/// Login session lifetime in seconds (24 hours).
pub const SESSION_TTL_SECS: u64 = 86_400;

/// Checkout session idle lifetime in seconds (45 minutes).
pub const CHECKOUT_TTL_SECS: u64 = 2_700;

/// Maximum email address length accepted at registration.
pub const MAX_EMAIL_LEN: usize = 254;

/// Maximum person-name length.
pub const MAX_NAME_LEN: usize = 80;

/// Ticket subject length bound.
pub const MAX_SUBJECT_LEN: usize = 150;

/// Ticket message body length bound.
pub const MAX_MESSAGE_LEN: usize = 5_000;

/// Currency every catalog price is denominated in.
pub const CURRENCY: &str = "usd";
