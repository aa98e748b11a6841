//! Terminal client for chatting with uploaded documents.
//!
//! Questions and summary requests go to a document backend over HTTP; answers
//! are rendered as markdown with inline diagrams next to a panel of document
//! insights and a keyword chart.

pub mod application;
pub mod configuration;
pub mod domain;
pub mod infrastructure;
#[cfg(test)]
pub mod test_utils;

pub use application::ui::destruct_terminal_for_panic;
pub use application::ui::start_loop;
pub use configuration::Config;
pub use configuration::ConfigKey;
pub use domain::models::Action;
pub use domain::models::BackendClient;
pub use domain::models::DocumentId;
pub use domain::models::Event;
pub use domain::services::Session;
pub use domain::services::SessionProps;
pub use infrastructure::clients::BackendClientManager;
