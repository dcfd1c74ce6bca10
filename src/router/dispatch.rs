//! Tool registry and dispatch.
//!
//! The registry maps stable tool names to boxed invocations with one fixed
//! signature. It is built once at startup and never changes. Dispatch on an
//! unknown name returns `None` — a distinguishable no-op, not an error — so
//! the session loop can report an omitted action instead of failing.

use std::collections::HashMap;

use async_trait::async_trait;
use serde_json::Value;

use crate::mcp::McpError;

use super::normalize::ToolOutput;

// ─── Tool ────────────────────────────────────────────────────────────────────

/// A single named tool invocation.
///
/// Implementations validate and default their own arguments; the dispatcher
/// never rejects a call for missing optional fields.
#[async_trait]
pub trait Tool: Send + Sync {
    /// Stable name, as advertised in the router's system prompt.
    fn name(&self) -> &'static str;

    /// Forward the arguments to the backend and classify its result.
    async fn invoke(&self, args: Value) -> Result<ToolOutput, McpError>;
}

// ─── ToolRegistry ────────────────────────────────────────────────────────────

/// Fixed name → invocation mapping.
#[derive(Default)]
pub struct ToolRegistry {
    tools: HashMap<String, Box<dyn Tool>>,
}

impl ToolRegistry {
    /// Create an empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a tool under its own name.
    pub fn register<T>(&mut self, tool: T)
    where
        T: Tool + 'static,
    {
        self.register_boxed(Box::new(tool));
    }

    /// Register an already-boxed tool under its own name.
    pub fn register_boxed(&mut self, tool: Box<dyn Tool>) {
        self.tools.insert(tool.name().to_string(), tool);
    }

    /// Invoke a tool by name.
    ///
    /// `None` means the name is not in the registry. Backend failures are
    /// returned, not handled — the session loop owns recovery.
    pub async fn dispatch(
        &self,
        tool: &str,
        args: Value,
    ) -> Option<Result<ToolOutput, McpError>> {
        let entry = self.tools.get(tool)?;
        Some(entry.invoke(args).await)
    }

    /// Whether a tool name is registered.
    pub fn contains(&self, tool: &str) -> bool {
        self.tools.contains_key(tool)
    }

    /// Sorted registered names.
    pub fn names(&self) -> Vec<&str> {
        let mut names: Vec<&str> = self.tools.keys().map(String::as_str).collect();
        names.sort_unstable();
        names
    }

    /// Number of registered tools.
    pub fn len(&self) -> usize {
        self.tools.len()
    }

    /// Whether the registry is empty.
    pub fn is_empty(&self) -> bool {
        self.tools.is_empty()
    }
}

// ─── Tests ───────────────────────────────────────────────────────────────────
