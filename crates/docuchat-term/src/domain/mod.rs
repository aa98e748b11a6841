//! Session logic for chatting with an uploaded document.
//!
//! Models describe documents, messages and backend results; services own the
//! session state, the background request worker and the content renderers.

pub mod models;
pub mod services;
