//! Command handlers for memdump CLI

pub mod configure;
pub mod dump;
