pub mod errors;
pub mod message;
pub mod request;
pub mod streaming;
pub mod traits;

pub use errors::{CompletionError, MessageError, PromptError};
pub use message::{AssistantContent, Message};
pub use request::*;
pub use streaming::*;
pub use traits::{Chat, Completion, CompletionModel, GetTokenUsage, Prompt};
