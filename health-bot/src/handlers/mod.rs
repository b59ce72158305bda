//! Chain handlers: request logging and the health assistant itself.

mod health_handler;
mod logging;

pub use health_handler::HealthAssistantHandler;
pub use logging::LoggingHandler;
