//! This project is split in 2 main modules:
//!
//! - [gateway] (Mundipagg charge API adapter)
//! - [connect] (HTTP surface exposing the gateway operations)
#![doc = include_str!("../README.md")]

/// Gateway configuration
pub mod config;
/// Implementation of the connect API
///
/// This module defines the types and endpoints through which callers reach the gateway over HTTP.
pub mod connect;
/// Gateway integration implementation
///
/// This module defines the types and methods to communicate with the external processor. In this
/// case it is Mundipagg
pub mod gateway;
pub mod state;
