use thiserror::Error;

#[derive(Error, Debug)]
pub enum CoreError {
    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Unknown product: {0}")]
    UnknownProduct(String),

    #[error("Unknown plan: {0}")]
    UnknownPlan(String),

    #[error("Unknown billing cycle: {0}")]
    UnknownBillingCycle(String),

    #[error("Checkout state error: {0}")]
    CheckoutState(String),

    #[error("Rate limited: retry in {retry_after_secs}s")]
    RateLimited { retry_after_secs: u64 },
}

pub type Result<T> = std::result::Result<T, CoreError>;
