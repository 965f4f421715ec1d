mod audit;
mod issuer;
mod log;
mod tls;

pub use audit::*;
pub use issuer::*;
pub use log::*;
pub use tls::*;
