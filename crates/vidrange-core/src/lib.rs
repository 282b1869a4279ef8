pub mod config;
pub mod logging;

pub mod range;
pub mod response;
pub mod server;
pub mod storage;
pub mod window;
