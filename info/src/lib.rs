//! Build metadata reported by the logger and the admin health check.
//! Versioned in lockstep with the server.

pub const NAME: &str = "cookbook";

pub const VERSION: &str = env!("CARGO_PKG_VERSION");

pub const REVISION: Option<&str> = option_env!("COOKBOOK_REVISION");

pub const BUILD_TIMESTAMP: Option<&str> = option_env!("COOKBOOK_BUILD_TIMESTAMP");
