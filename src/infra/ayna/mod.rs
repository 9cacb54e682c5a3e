pub mod client;

pub use client::AynaClient;
