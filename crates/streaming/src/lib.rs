pub mod client;
pub mod config;
pub mod error;
pub mod in_flight;
pub mod policy;
pub mod request;
pub mod transport;

pub use client::*;
pub use config::*;
pub use error::*;
pub use in_flight::*;
pub use policy::*;
pub use request::*;
pub use transport::*;
