//! Procedure registry.
//!
//! # Responsibilities
//! - Collect message registrations and global callbacks while configuring
//! - Resolve each message's effective pre/post chains at seal time
//! - Detect duplicate message names
//! - Hand the dispatcher an immutable [`RouteTable`]
//!
//! # Design Decisions
//! - Registration only records; resolution is deferred to [`Registry::start_serving`],
//!   so global callbacks added after a message still apply to it
//! - Misuse (bad prefix, late registration, duplicate names) is fatal, see [`fault`]

use std::collections::hash_map::Entry;
use std::collections::HashMap;
use std::sync::Arc;

use axum::body::Bytes;
use serde::Serialize;
use thiserror::Error;

use crate::chain::callback::{Callback, CallbackChain};
use crate::chain::context::RequestContext;
use crate::config::RoutingConfig;
use crate::lifecycle::state::{fault, LifecycleError, LifecycleGuard, LifecycleState};
use crate::routing::prefix::{PrefixError, UrlPrefix};
use crate::routing::procedure::{JsonProcedure, Procedure, Reply};
use crate::routing::table::{HandlerRecord, RouteTable};

/// Registry configuration and sealing errors.
#[derive(Debug, Error)]
pub enum RegistryError {
    #[error(transparent)]
    Lifecycle(#[from] LifecycleError),

    #[error("invalid URL prefix: {0}")]
    InvalidPrefix(#[from] PrefixError),

    #[error("message {name:?} registered more than once (path {path})")]
    DuplicateMessage { name: String, path: String },
}

/// Per-message options.
#[derive(Clone, Default)]
pub struct RegistrationOptions {
    clear_pre_callbacks: bool,
    clear_post_callbacks: bool,
    pre_callbacks: CallbackChain,
    post_callbacks: CallbackChain,
}

impl RegistrationOptions {
    pub fn new() -> Self {
        Self::default()
    }

    /// Skip the global pre-chain for this message.
    pub fn clear_global_pre(mut self) -> Self {
        self.clear_pre_callbacks = true;
        self
    }

    /// Skip the global post-chain for this message.
    pub fn clear_global_post(mut self) -> Self {
        self.clear_post_callbacks = true;
        self
    }

    /// Append a pre-callback that runs after the global ones.
    pub fn pre_callback<C: Callback>(mut self, callback: C) -> Self {
        self.pre_callbacks.push(Arc::new(callback));
        self
    }

    /// Append a post-callback that runs after the global ones.
    pub fn post_callback<C: Callback>(mut self, callback: C) -> Self {
        self.post_callbacks.push(Arc::new(callback));
        self
    }
}

struct PendingHandler {
    name: String,
    procedure: Arc<dyn Procedure>,
    options: RegistrationOptions,
}

/// Application-lifetime registry of messages and global callbacks.
pub struct Registry {
    lifecycle: LifecycleGuard,
    prefix: UrlPrefix,
    pre_callbacks: CallbackChain,
    post_callbacks: CallbackChain,
    pending: Vec<PendingHandler>,
}

impl Registry {
    pub fn new() -> Self {
        Self {
            lifecycle: LifecycleGuard::new(),
            prefix: UrlPrefix::default(),
            pre_callbacks: CallbackChain::new(),
            post_callbacks: CallbackChain::new(),
            pending: Vec::new(),
        }
    }

    /// Registry using the configured prefix.
    pub fn from_config(config: &RoutingConfig) -> Self {
        let mut registry = Self::new();
        registry.set_url_prefix(&config.url_prefix);
        registry
    }

    pub fn prefix(&self) -> &UrlPrefix {
        &self.prefix
    }

    pub fn state(&self) -> LifecycleState {
        self.lifecycle.state()
    }

    /// Number of messages registered so far.
    pub fn pending_len(&self) -> usize {
        self.pending.len()
    }

    /// Set the prefix messages are exposed under. A missing trailing `/` is added.
    ///
    /// # Panics
    /// If the prefix is empty or lacks a leading `/`, or the registry is sealed.
    pub fn set_url_prefix(&mut self, prefix: &str) {
        self.ensure_configuring("set_url_prefix");
        match UrlPrefix::parse(prefix) {
            Ok(prefix) => self.prefix = prefix,
            Err(e) => fault(RegistryError::from(e)),
        }
    }

    /// Append a callback to the global pre-chain.
    ///
    /// # Panics
    /// If the registry is sealed.
    pub fn add_pre_callback<C: Callback>(&mut self, callback: C) {
        self.ensure_configuring("add_pre_callback");
        self.pre_callbacks.push(Arc::new(callback));
    }

    /// Append a callback to the global post-chain.
    ///
    /// # Panics
    /// If the registry is sealed.
    pub fn add_post_callback<C: Callback>(&mut self, callback: C) {
        self.ensure_configuring("add_post_callback");
        self.post_callbacks.push(Arc::new(callback));
    }

    /// Register a message with default options.
    pub fn register<F, T>(&mut self, name: impl Into<String>, procedure: F)
    where
        F: Fn(&mut RequestContext, &Bytes) -> Reply<T> + Send + Sync + 'static,
        T: Serialize + 'static,
    {
        self.register_with(name, procedure, RegistrationOptions::default());
    }

    /// Register a message. Duplicate names are reported when the registry is sealed.
    ///
    /// # Panics
    /// If the registry is sealed.
    pub fn register_with<F, T>(&mut self, name: impl Into<String>, procedure: F, options: RegistrationOptions)
    where
        F: Fn(&mut RequestContext, &Bytes) -> Reply<T> + Send + Sync + 'static,
        T: Serialize + 'static,
    {
        self.ensure_configuring("register");
        self.pending.push(PendingHandler {
            name: name.into(),
            procedure: Arc::new(JsonProcedure::new(procedure)),
            options,
        });
    }

    /// Seal the registry and enter serving mode. Call exactly once.
    ///
    /// # Panics
    /// On duplicate message names, or if called more than once.
    pub fn start_serving(&mut self) -> Arc<RouteTable> {
        let table = match self.seal() {
            Ok(table) => table,
            Err(e) => fault(e),
        };
        if let Err(e) = self.lifecycle.serve() {
            fault(RegistryError::from(e));
        }
        tracing::info!(routes = table.len(), prefix = %self.prefix, "Registry sealed, serving");
        Arc::new(table)
    }

    fn seal(&mut self) -> Result<RouteTable, RegistryError> {
        self.lifecycle.seal()?;

        let mut routes = HashMap::with_capacity(self.pending.len());
        for pending in std::mem::take(&mut self.pending) {
            let path = self.prefix.path_for(&pending.name);
            let options = &pending.options;
            let pre_chain = CallbackChain::resolve(
                &self.pre_callbacks,
                options.clear_pre_callbacks,
                &options.pre_callbacks,
            );
            let post_chain = CallbackChain::resolve(
                &self.post_callbacks,
                options.clear_post_callbacks,
                &options.post_callbacks,
            );

            match routes.entry(path.clone()) {
                Entry::Occupied(_) => {
                    return Err(RegistryError::DuplicateMessage {
                        name: pending.name,
                        path,
                    });
                }
                Entry::Vacant(slot) => {
                    tracing::info!(
                        message = %pending.name,
                        path = %path,
                        pre_callbacks = pre_chain.len(),
                        post_callbacks = post_chain.len(),
                        "Message exposed"
                    );
                    slot.insert(Arc::new(HandlerRecord::new(
                        pending.name,
                        path,
                        pending.procedure,
                        pre_chain,
                        post_chain,
                    )));
                }
            }
        }

        Ok(RouteTable::new(routes))
    }

    #[track_caller]
    fn ensure_configuring(&self, operation: &'static str) {
        if let Err(e) = self.lifecycle.ensure_configuring(operation) {
            fault(RegistryError::from(e));
        }
    }
}

impl Default for Registry {
    fn default() -> Self {
        Self::new()
    }
}
