pub mod anchor;
pub mod config;
pub mod error;
pub mod frame;
pub mod session;
pub mod state;
