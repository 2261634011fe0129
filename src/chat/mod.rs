//! Chat assistant session: sends messages through the completion-service
//! proxy, keeps the thread handle across restarts and degrades to canned
//! replies when the service is unreachable.

pub mod fallback;
pub mod model;
pub mod session;
pub mod thread_store;
pub mod transport;

pub use fallback::FallbackTable;
pub use model::{ChatMessage, ChatReply, ChatRole, ThreadHandle};
pub use session::ChatSession;
pub use thread_store::{DEFAULT_NAMESPACE, FileThreadStore, MemoryThreadStore, ThreadStore};
pub use transport::{CompletionTransport, HttpTransport, ProxyMessage, ProxyRequest, ProxyResponse};
