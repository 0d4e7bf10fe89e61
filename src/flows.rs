//! Relay flows: the direct OAuth authorizer, credential sources, and the request forwarder.
//!
//! Two deployment variants share one [`RequestForwarder`]:
//!
//! - **direct**: an [`Authorizer`] runs the authorization-code flow and identifiers come from
//!   configuration through [`StaticCredentials`].
//! - **delegated**: a [`CredentialsCache`] fetches the identifiers from the remote endpoint once
//!   and memoizes them for the process lifetime.

pub mod authorization;
pub mod credentials;
pub mod forward;

pub use authorization::*;
pub use credentials::*;
pub use forward::*;
