//! Integrations with systems outside the terminal, currently the document
//! backend's HTTP API.

pub mod clients;
