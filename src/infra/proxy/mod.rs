mod client;

pub use client::{DEFAULT_PROXY_URL, ProxyClient};
