//! Per-variable enable/disable selection.
//!
//! The catalog is seeded from the variable names the solver reports for the
//! primary state file and then edited by the user. Entries keep their
//! insertion order, which is also the order enabled variables are written
//! to the solver settings file.
//!
//! Every effective mutation sets the dirty flag and notifies subscribed
//! [`CatalogObserver`]s, so the host can re-offer execution.

use std::fmt;

use indexmap::IndexMap;

use crate::error::CatalogError;

/// Variables that start out enabled when first discovered.
pub const DEFAULT_ENABLED: [&str; 2] = ["Density", "ElemData:FV_Elems"];

/// A change applied to a [`VariableCatalog`].
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum CatalogEvent {
    /// A new variable was added.
    Inserted {
        /// Variable name.
        name: String,
        /// Initial status.
        enabled: bool,
    },
    /// An existing variable changed status.
    StatusChanged {
        /// Variable name.
        name: String,
        /// New status.
        enabled: bool,
    },
    /// Every variable was set to the same status.
    AllSet {
        /// New status.
        enabled: bool,
    },
}

/// Receives catalog change notifications.
///
/// Implemented for any `FnMut(&CatalogEvent) + Send` closure.
pub trait CatalogObserver: Send {
    /// Called after the change has been applied.
    fn catalog_changed(&mut self, event: &CatalogEvent);
}

impl<F> CatalogObserver for F
where
    F: FnMut(&CatalogEvent) + Send,
{
    fn catalog_changed(&mut self, event: &CatalogEvent) {
        self(event)
    }
}

/// Token returned by [`VariableCatalog::subscribe`].
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct SubscriptionId(u64);

/// Ordered mapping from variable name to enabled status.
///
/// A name is inserted at most once. Status changes never remove or
/// renumber entries.
pub struct VariableCatalog {
    entries: IndexMap<String, bool>,
    dirty: bool,
    observers: Vec<(SubscriptionId, Box<dyn CatalogObserver>)>,
    next_subscription: u64,
}

impl VariableCatalog {
    /// Create an empty, clean catalog.
    pub fn new() -> Self {
        Self {
            entries: IndexMap::new(),
            dirty: false,
            observers: Vec::new(),
            next_subscription: 0,
        }
    }

    /// Insert every name not yet present.
    ///
    /// New names start disabled unless they appear in [`DEFAULT_ENABLED`].
    /// Names already in the catalog keep their current status, so repeated
    /// discovery is idempotent. Returns the number of names inserted.
    pub fn discover<I, S>(&mut self, names: I) -> usize
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut inserted = 0;
        for name in names {
            let name = name.as_ref();
            if self.entries.contains_key(name) {
                continue;
            }
            let enabled = DEFAULT_ENABLED.iter().any(|d| *d == name);
            self.entries.insert(name.to_owned(), enabled);
            inserted += 1;
            self.notify(CatalogEvent::Inserted {
                name: name.to_owned(),
                enabled,
            });
        }
        inserted
    }

    /// Set the status of `name`, inserting it if absent.
    pub fn set_enabled(&mut self, name: &str, enabled: bool) {
        match self.entries.get_mut(name) {
            Some(status) if *status == enabled => {}
            Some(status) => {
                *status = enabled;
                self.notify(CatalogEvent::StatusChanged {
                    name: name.to_owned(),
                    enabled,
                });
            }
            None => {
                self.entries.insert(name.to_owned(), enabled);
                self.notify(CatalogEvent::Inserted {
                    name: name.to_owned(),
                    enabled,
                });
            }
        }
    }

    /// Status of `name`. Unknown names are reported as disabled.
    pub fn is_enabled(&self, name: &str) -> bool {
        self.entries.get(name).copied().unwrap_or(false)
    }

    /// Returns `true` if `name` is in the catalog.
    pub fn contains(&self, name: &str) -> bool {
        self.entries.contains_key(name)
    }

    /// Number of variables.
    pub fn count(&self) -> usize {
        self.entries.len()
    }

    /// Returns `true` if no variable has been discovered.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Name at position `index` in insertion order.
    pub fn name_at(&self, index: usize) -> Result<&str, CatalogError> {
        self.entries
            .get_index(index)
            .map(|(name, _)| name.as_str())
            .ok_or(CatalogError::IndexOutOfBounds {
                index,
                len: self.entries.len(),
            })
    }

    /// Enable every variable.
    pub fn enable_all(&mut self) {
        self.set_all(true);
    }

    /// Disable every variable.
    pub fn disable_all(&mut self) {
        self.set_all(false);
    }

    fn set_all(&mut self, enabled: bool) {
        let mut changed = false;
        for status in self.entries.values_mut() {
            changed |= *status != enabled;
            *status = enabled;
        }
        if changed {
            self.notify(CatalogEvent::AllSet { enabled });
        }
    }

    /// `(name, enabled)` pairs in insertion order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, bool)> {
        self.entries.iter().map(|(name, &on)| (name.as_str(), on))
    }

    /// Enabled names in insertion order.
    pub fn enabled_names(&self) -> impl Iterator<Item = &str> {
        self.iter().filter(|(_, on)| *on).map(|(name, _)| name)
    }

    /// Returns `true` if the catalog changed since the last [`mark_clean`](Self::mark_clean).
    pub fn is_dirty(&self) -> bool {
        self.dirty
    }

    /// Clear the dirty flag after the selection has been loaded.
    pub fn mark_clean(&mut self) {
        self.dirty = false;
    }

    /// Register an observer for future changes.
    pub fn subscribe(&mut self, observer: impl CatalogObserver + 'static) -> SubscriptionId {
        let id = SubscriptionId(self.next_subscription);
        self.next_subscription += 1;
        self.observers.push((id, Box::new(observer)));
        id
    }

    /// Drop an observer. Returns `false` if `id` was not subscribed.
    pub fn unsubscribe(&mut self, id: SubscriptionId) -> bool {
        let before = self.observers.len();
        self.observers.retain(|(sub, _)| *sub != id);
        self.observers.len() != before
    }

    fn notify(&mut self, event: CatalogEvent) {
        self.dirty = true;
        for (_, observer) in &mut self.observers {
            observer.catalog_changed(&event);
        }
    }
}

impl Default for VariableCatalog {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for VariableCatalog {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("VariableCatalog")
            .field("entries", &self.entries)
            .field("dirty", &self.dirty)
            .field("observers", &self.observers.len())
            .finish()
    }
}
