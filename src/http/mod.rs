//! HTTP types shared by edge functions and the local origin runtime.

mod request;
mod response;

pub use request::{Method, ViewerRequest};
pub use response::{OriginResponse, StatusCode};
