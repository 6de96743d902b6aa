//! Variable store and listener registry
//!
//! The store maps canonical identifiers to variables; the registry maps
//! identifiers to the display-site callbacks that must re-evaluate when
//! that variable's value changes. Both are plain single-threaded state
//! owned by one session; evaluation and notification run synchronously on
//! the caller's thread.

use std::rc::Rc;

use fxhash::FxHashMap;

use crate::utils::idgen::{IdGen, RandomIdGen};

/// Cap on nested notification cascades. Definitions are cycle-checked, so
/// a cascade deeper than this indicates a listener graph the definition
/// syntax cannot express; the cascade stops and a warning is recorded.
pub const MAX_NOTIFY_DEPTH: u32 = 64;

/// One stored variable: its current value and the canonical alias forms
/// that resolve to it.
#[derive(Debug, Clone, PartialEq)]
pub struct Variable {
    pub value: f64,
    pub aliases: Vec<String>,
}

/// Mapping from canonical identifier to variable, with an injected
/// identifier generator for minting fresh slots.
pub struct VariableStore {
    vars: FxHashMap<String, Variable>,
    idgen: Box<dyn IdGen>,
}

impl VariableStore {
    pub fn new() -> Self {
        Self::with_idgen(Box::new(RandomIdGen::new()))
    }

    pub fn with_idgen(idgen: Box<dyn IdGen>) -> Self {
        Self {
            vars: FxHashMap::default(),
            idgen,
        }
    }

    pub fn get(&self, identifier: &str) -> Option<&Variable> {
        self.vars.get(identifier)
    }

    /// Write a variable. Redefining an existing identifier updates the
    /// slot in place; the identifier never changes.
    pub fn insert(&mut self, identifier: String, variable: Variable) {
        self.vars.insert(identifier, variable);
    }

    pub fn contains(&self, identifier: &str) -> bool {
        self.vars.contains_key(identifier)
    }

    pub fn len(&self) -> usize {
        self.vars.len()
    }

    pub fn is_empty(&self) -> bool {
        self.vars.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&String, &Variable)> {
        self.vars.iter()
    }

    /// Fresh opaque identifier for a new variable or display site.
    pub fn mint_identifier(&mut self) -> String {
        self.idgen.generate()
    }

    /// Current numeric bindings, as handed to the expression parser.
    pub fn bindings(&self) -> FxHashMap<String, f64> {
        self.vars
            .iter()
            .map(|(id, var)| (id.clone(), var.value))
            .collect()
    }
}

impl Default for VariableStore {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for VariableStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("VariableStore")
            .field("vars", &self.vars)
            .finish()
    }
}

/// Callback invoked when a subscribed variable is redefined. It receives
/// the store and registry so it can re-run the evaluator, which may itself
/// redefine variables and notify further listeners.
pub type UpdateCallback = Rc<dyn Fn(&mut VariableStore, &mut ListenerRegistry)>;

/// One registered listener
#[derive(Clone)]
pub struct ListenerEntry {
    pub subscriber: String,
    pub callback: UpdateCallback,
}

/// Per-identifier listener lists, in registration order.
#[derive(Default)]
pub struct ListenerRegistry {
    listeners: FxHashMap<String, Vec<ListenerEntry>>,
    depth: u32,
    pub warnings: Vec<String>,
}

impl ListenerRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a callback under one identifier. A subscriber may appear
    /// under several identifiers, one per variable it used.
    pub fn register(&mut self, identifier: &str, subscriber: &str, callback: UpdateCallback) {
        self.listeners
            .entry(identifier.to_string())
            .or_default()
            .push(ListenerEntry {
                subscriber: subscriber.to_string(),
                callback,
            });
    }

    /// Remove the subscriber from every identifier's list (site teardown).
    pub fn unregister(&mut self, subscriber: &str) {
        for entries in self.listeners.values_mut() {
            entries.retain(|entry| entry.subscriber != subscriber);
        }
        self.listeners.retain(|_, entries| !entries.is_empty());
    }

    /// Number of listeners currently registered for an identifier.
    pub fn listener_count(&self, identifier: &str) -> usize {
        self.listeners
            .get(identifier)
            .map(|entries| entries.len())
            .unwrap_or(0)
    }

    /// Identifiers a subscriber is currently registered under.
    pub fn subscriptions_of(&self, subscriber: &str) -> Vec<String> {
        let mut ids: Vec<String> = self
            .listeners
            .iter()
            .filter(|(_, entries)| entries.iter().any(|e| e.subscriber == subscriber))
            .map(|(id, _)| id.clone())
            .collect();
        ids.sort();
        ids
    }
}

/// Invoke every callback registered for `identifier`, in registration
/// order. Iterates a snapshot: callbacks may register, unregister and
/// evaluate (and thereby notify) re-entrantly.
pub fn notify_listeners(
    store: &mut VariableStore,
    registry: &mut ListenerRegistry,
    identifier: &str,
) {
    if registry.depth >= MAX_NOTIFY_DEPTH {
        registry.warnings.push(format!(
            "notification cascade for '{}' exceeded depth {}; stopped",
            identifier, MAX_NOTIFY_DEPTH
        ));
        return;
    }

    let snapshot: Vec<UpdateCallback> = registry
        .listeners
        .get(identifier)
        .map(|entries| entries.iter().map(|e| e.callback.clone()).collect())
        .unwrap_or_default();

    registry.depth += 1;
    for callback in snapshot {
        callback(store, registry);
    }
    registry.depth -= 1;
}
