//! Token secrets and the token set produced by the authorization-code exchange.

pub mod secret;
pub mod set;
