//! Building blocks for [`clap`]-driven configuration of the universal client.
pub mod client;
