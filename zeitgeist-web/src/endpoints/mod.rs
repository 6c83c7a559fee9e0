//! Web handlers for the trends API.

pub mod trends;
