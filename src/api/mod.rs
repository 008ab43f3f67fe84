pub mod media;
pub mod routes;
pub mod system;
pub mod upload;

pub use routes::{router, ApiState};
