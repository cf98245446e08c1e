//! Local origin runtime that exercises the viewer-request hook.

mod config;
mod server;

pub use config::SiteConfig;
pub use server::{BoundSiteServer, SiteServer};
