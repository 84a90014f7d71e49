pub mod http;
pub mod metrics;
pub mod network;
pub mod process;
pub mod simulated;
