pub mod gemini_gateway;
pub mod prompts;
pub mod schema;

pub use gemini_gateway::GeminiGateway;
