//! Named binds sharing one registry and observer.

use std::fmt;
use std::rc::Rc;

use indexmap::IndexMap;
use tether_convert::ConverterRegistry;
use tether_core::BindId;

use crate::bind::Bind;
use crate::config::{BindOptions, ConfigError};
use crate::observer::{PropagationObserver, TracingObserver};

/// A name → [`Bind`] map.
///
/// Every bind it creates shares the directory's registry, observer, and
/// options. Nothing here is global; construct one per context that needs
/// binds looked up by name.
///
/// # Examples
///
/// ```
/// use std::rc::Rc;
/// use tether_converters::default_registry;
/// use tether_engine::BindDirectory;
///
/// let mut dir = BindDirectory::new(Rc::new(default_registry()));
/// let a = dir.get_or_create("player.health");
/// let b = dir.get_or_create("player.health");
/// assert_eq!(a.id(), b.id());
/// assert_eq!(dir.names().collect::<Vec<_>>(), ["player.health"]);
/// ```
pub struct BindDirectory {
    registry: Rc<ConverterRegistry>,
    observer: Rc<dyn PropagationObserver>,
    options: BindOptions,
    binds: IndexMap<String, Bind>,
}

impl BindDirectory {
    /// Directory whose binds log failures through [`TracingObserver`].
    pub fn new(registry: Rc<ConverterRegistry>) -> Self {
        Self::with_observer(registry, Rc::new(TracingObserver))
    }

    /// Directory whose binds report to `observer`.
    pub fn with_observer(
        registry: Rc<ConverterRegistry>,
        observer: Rc<dyn PropagationObserver>,
    ) -> Self {
        Self {
            registry,
            observer,
            options: BindOptions::default(),
            binds: IndexMap::new(),
        }
    }

    /// Directory whose binds use `options`.
    pub fn with_options(
        registry: Rc<ConverterRegistry>,
        observer: Rc<dyn PropagationObserver>,
        options: BindOptions,
    ) -> Result<Self, ConfigError> {
        options.validate()?;
        Ok(Self {
            options,
            ..Self::with_observer(registry, observer)
        })
    }

    /// The shared registry.
    pub fn registry(&self) -> &Rc<ConverterRegistry> {
        &self.registry
    }

    /// The bind named `name`, created on first use.
    pub fn get_or_create(&mut self, name: &str) -> Bind {
        if let Some(bind) = self.binds.get(name) {
            return bind.clone();
        }
        let bind = Bind::build(
            name.to_owned(),
            Rc::clone(&self.registry),
            Rc::clone(&self.observer),
            self.options,
        );
        tracing::debug!(bind = %bind.id(), name, "bind created");
        self.binds.insert(name.to_owned(), bind.clone());
        bind
    }

    /// The bind named `name`, if any.
    pub fn get(&self, name: &str) -> Option<Bind> {
        self.binds.get(name).cloned()
    }

    /// The bind with id `id`, if this directory holds it.
    pub fn get_by_id(&self, id: BindId) -> Option<Bind> {
        self.binds.values().find(|b| b.id() == id).cloned()
    }

    /// Remove the bind named `name` and detach all its members.
    pub fn remove(&mut self, name: &str) -> Option<Bind> {
        let bind = self.binds.shift_remove(name)?;
        let detached = bind.detach_all();
        tracing::debug!(bind = %bind.id(), name, detached, "bind removed");
        Some(bind)
    }

    /// Bind names in creation order.
    pub fn names(&self) -> impl Iterator<Item = &str> + '_ {
        self.binds.keys().map(String::as_str)
    }

    /// Number of binds.
    pub fn len(&self) -> usize {
        self.binds.len()
    }

    /// Whether the directory holds no binds.
    pub fn is_empty(&self) -> bool {
        self.binds.is_empty()
    }
}

impl fmt::Debug for BindDirectory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("BindDirectory")
            .field("binds", &self.binds.keys().collect::<Vec<_>>())
            .field("converters", &self.registry.len())
            .field("options", &self.options)
            .finish()
    }
}
