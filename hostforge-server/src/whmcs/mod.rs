pub mod client;
pub mod mock;

pub use client::WhmcsClient;
