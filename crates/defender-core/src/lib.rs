//! # Defender Core
//!
//! The governance layer placed in front of paginated listing endpoints.
//! This crate decides admission, quota accounting, conditional-GET caching,
//! Link-header pagination and CORS headers, with zero infrastructure
//! dependencies: storage, token lookup and data fetching are ports.

pub mod domain;
pub mod error;
pub mod governance;
pub mod ports;

pub use error::{GovernanceError, RepoError};
pub use governance::{GovernedResponse, GovernorConfig, InboundRequest, Outcome, RequestGovernor};
