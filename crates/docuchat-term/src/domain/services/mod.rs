mod actions;
mod content;
mod diagram;
mod events;
mod extractor;
mod insights;
mod keyword_chart;
mod markdown;
mod sanitizer;
mod session;

pub use actions::*;
pub use content::*;
pub use diagram::*;
pub use events::*;
pub use extractor::*;
pub use insights::*;
pub use keyword_chart::*;
pub use markdown::*;
pub use sanitizer::*;
pub use session::*;
