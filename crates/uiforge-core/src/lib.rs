#![deny(unsafe_code)]

//! uiforge core runtime.
//!
//! Turns a natural-language UI request into component code. The model reads
//! a catalog of design-system documentation through three tools, picks the
//! components it needs, and answers with a fenced code block that the
//! extractor pulls out. The HTTP surface and the CLI both drive the same
//! [`ConversationEngine`].

use std::future::Future;
use std::pin::Pin;

/// A type-erased, `Send`-safe, boxed future: the return type for async trait
/// methods that must stay object-safe (`dyn LlmProvider`, `dyn ToolExecutor`).
pub type BoxFuture<'a, T> = Pin<Box<dyn Future<Output = T> + Send + 'a>>;

/// Compile-time build metadata (version, git hash, profile).
pub mod build_info;
/// Component documentation directory reader.
pub mod catalog;
/// Token cost estimates.
pub mod cost;
/// Tool-use conversation loop.
pub mod engine;
/// Fenced code block extraction.
pub mod extract;
/// LLM provider abstraction and the Anthropic client.
pub mod llm;
/// Fixed system instruction.
pub mod prompt;
/// HTTP router and handlers.
pub mod server;
/// Caller identity resolution.
pub mod session;
/// Catalog tools offered to the model.
pub mod tools;

pub use catalog::{Catalog, CatalogRead, ComponentMetadata, Degradation};
pub use cost::{CostBreakdown, PricingModel, TokenUsage};
pub use engine::{ConversationEngine, ConversationOutcome, EngineError, EngineSettings};
pub use extract::CodeExtractor;
pub use llm::{LlmError, LlmProvider};
pub use server::{ApiError, AppState};
pub use session::{HeaderSessionProvider, Identity, SessionProvider};
pub use tools::{ToolError, ToolRegistry};
