//! Sealed route table.
//!
//! # Responsibilities
//! - Store resolved handler records keyed by exposed path
//! - Exact path lookup for the dispatcher
//!
//! # Design Decisions
//! - Immutable after construction (shared via `Arc` without locks)
//! - Exact match only; no prefixes, no patterns
//! - Explicit `None` on miss rather than a silent default

use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

use crate::chain::callback::CallbackChain;
use crate::routing::procedure::Procedure;

/// A message ready to serve: procedure plus its resolved chains.
pub struct HandlerRecord {
    name: String,
    path: String,
    procedure: Arc<dyn Procedure>,
    pre_chain: CallbackChain,
    post_chain: CallbackChain,
}

impl HandlerRecord {
    pub(crate) fn new(
        name: String,
        path: String,
        procedure: Arc<dyn Procedure>,
        pre_chain: CallbackChain,
        post_chain: CallbackChain,
    ) -> Self {
        Self {
            name,
            path,
            procedure,
            pre_chain,
            post_chain,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn path(&self) -> &str {
        &self.path
    }

    pub fn procedure(&self) -> &dyn Procedure {
        self.procedure.as_ref()
    }

    pub fn pre_chain(&self) -> &CallbackChain {
        &self.pre_chain
    }

    pub fn post_chain(&self) -> &CallbackChain {
        &self.post_chain
    }
}

impl fmt::Debug for HandlerRecord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("HandlerRecord")
            .field("name", &self.name)
            .field("path", &self.path)
            .field("pre_chain", &self.pre_chain)
            .field("post_chain", &self.post_chain)
            .finish()
    }
}

/// All served messages, keyed by path.
#[derive(Debug, Default)]
pub struct RouteTable {
    routes: HashMap<String, Arc<HandlerRecord>>,
}

impl RouteTable {
    pub(crate) fn new(routes: HashMap<String, Arc<HandlerRecord>>) -> Self {
        Self { routes }
    }

    /// Record served at exactly `path`.
    pub fn lookup(&self, path: &str) -> Option<&Arc<HandlerRecord>> {
        self.routes.get(path)
    }

    pub fn len(&self) -> usize {
        self.routes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.routes.is_empty()
    }

    /// Exposed paths, sorted.
    pub fn paths(&self) -> Vec<&str> {
        let mut paths: Vec<&str> = self.routes.keys().map(String::as_str).collect();
        paths.sort_unstable();
        paths
    }
}
