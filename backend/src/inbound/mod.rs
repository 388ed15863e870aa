//! Inbound adapters that translate external requests into domain service
//! calls while keeping framework details at the edge.
//!
//! Every service speaks HTTP; handlers for all four live under [`http`].

pub mod http;
