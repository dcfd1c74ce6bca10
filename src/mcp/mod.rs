//! Backend collaborators for the tool registry.
//!
//! Submodules:
//! - `types`: JSON-RPC 2.0 message types and server process configuration
//! - `errors`: backend error taxonomy
//! - `transport`: line-delimited JSON-RPC over a child process's stdio
//! - `scoped`: per-call server lifecycle (spawn → initialize → call → shutdown)
//! - `remote`: JSON-RPC over HTTP for the remote hello endpoint

pub mod errors;
pub mod remote;
pub mod scoped;
pub mod transport;
pub mod types;

pub use errors::McpError;
pub use remote::RemoteEndpoint;
pub use scoped::ScopedServer;
pub use types::ServerConfig;
