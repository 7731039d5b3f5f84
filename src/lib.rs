//! Powerdrill - ask questions about your data from any tool host
//!
//! Forwards a user's question to the Powerdrill data-analysis API, keeps one
//! upstream session per user so follow-up questions share context, and turns
//! the answer blocks into text, image and citation messages.

pub mod api;
pub mod config;
pub mod dispatch;
pub mod error;
pub mod session;
pub mod tools;

pub use dispatch::{BlockDispatcher, ToolMessage};
pub use error::{PowerdrillError, Result};
pub use session::SessionCache;
pub use tools::{PowerdrillChatTool, Tool};
