//! The host integration layer: owns the registry and the live instances and
//! drives their lifecycle the way a browser drives custom elements.

use crate::component::{Component, Construct, Element, Lifecycle, Mounted};
use crate::config::Config;
use crate::error::{Error, Result};
use crate::host::{Host, NodeId};
use crate::key::{Key, KeyGenerator};
use crate::registry::Registry;
use crate::Shared;
use indexmap::IndexMap;
use std::rc::Rc;
use tracing::debug;

type Definition = Rc<dyn Fn(Construct) -> Result<Box<dyn Lifecycle>>>;

/// Connects registered components to the nodes of a [`Host`].
pub struct Runtime {
    host: Shared<dyn Host>,
    config: Config,
    registry: Registry<Definition>,
    keys: KeyGenerator,
    instances: IndexMap<NodeId, Box<dyn Lifecycle>>,
}

impl Runtime {
    /// Create a runtime over `host`.
    pub fn new<H: Host + 'static>(host: Shared<H>, config: Config) -> Runtime {
        let keys = KeyGenerator::new(config.key_prefix.clone());
        let host: Shared<dyn Host> = host;
        Runtime {
            host,
            config,
            registry: Registry::new(),
            keys,
            instances: IndexMap::new(),
        }
    }

    /// The host this runtime renders into.
    pub fn host(&self) -> &Shared<dyn Host> {
        &self.host
    }

    #[allow(missing_docs)]
    pub fn config(&self) -> &Config {
        &self.config
    }

    /// Register `C` for `tag`, building each instance with `C::default()`.
    pub fn define<C: Component + Default>(&mut self, tag: &str) -> Result<()> {
        self.define_with(tag, C::default)
    }

    /// Register `C` for `tag`, building each instance with `factory`.
    pub fn define_with<C, F>(&mut self, tag: &str, factory: F) -> Result<()>
    where
        C: Component,
        F: Fn() -> C + 'static,
    {
        let definition: Definition = Rc::new(move |init: Construct| {
            let element = Element::create(factory(), init)?;
            Ok(Box::new(Mounted::new(element)) as Box<dyn Lifecycle>)
        });
        self.registry.register(tag, definition)?;
        debug!(tag, "element defined");
        Ok(())
    }

    /// Whether `tag` has an implementation.
    pub fn is_defined(&self, tag: &str) -> bool {
        self.registry.contains(tag)
    }

    /// Build the instance for `node` and run its connected callback. The
    /// instance stays registered even if connecting fails.
    pub fn connect(&mut self, node: NodeId) -> Result<Key> {
        self.prune()?;
        if self.instances.contains_key(&node) {
            return Err(Error::AlreadyConnected(node.to_string()));
        }
        let tag = self.host.borrow().tag_name(node)?;
        let definition = self
            .registry
            .get(&tag)
            .cloned()
            .ok_or_else(|| Error::UnknownTag(tag.clone()))?;

        let key = self.keys.next_key();
        debug!(%tag, %node, %key, "constructing element");
        let instance = definition(Construct {
            key: key.clone(),
            root: node,
            host: Rc::clone(&self.host),
            strict_listeners: self.config.strict_listeners,
        })?;
        self.instances.insert(node, instance);
        self.instances[&node].connected()?;
        Ok(key)
    }

    /// Connect every registered, not yet connected element in `root`'s
    /// subtree, `root` included, in document order. Elements rendered by a
    /// freshly connected parent are picked up as well. Returns how many were
    /// connected.
    pub fn upgrade(&mut self, root: NodeId) -> Result<usize> {
        self.prune()?;
        let mut connected = 0;
        while let Some(node) = self.next_pending(root)? {
            self.connect(node)?;
            connected += 1;
        }
        Ok(connected)
    }

    fn next_pending(&self, root: NodeId) -> Result<Option<NodeId>> {
        let host = self.host.borrow();
        for node in host.elements(root)? {
            if !self.instances.contains_key(&node)
                && self.registry.contains(&host.tag_name(node)?)
            {
                return Ok(Some(node));
            }
        }
        Ok(None)
    }

    /// Disconnect every instance whose root node the host dropped, typically
    /// children replaced by a re-render of their parent. Returns how many
    /// were removed.
    pub fn prune(&mut self) -> Result<usize> {
        let stale: Vec<NodeId> = {
            let host = self.host.borrow();
            self.instances
                .keys()
                .copied()
                .filter(|&node| !host.contains(node))
                .collect()
        };
        for node in stale.iter() {
            debug!(%node, "pruning instance of a dropped node");
            self.disconnect(*node)?;
        }
        Ok(stale.len())
    }

    /// Run the disconnected callback of `node`'s instance and drop it.
    pub fn disconnect(&mut self, node: NodeId) -> Result<()> {
        let instance = self
            .instances
            .shift_remove(&node)
            .ok_or_else(|| Error::UnknownNode(node.to_string()))?;
        instance.disconnected()
    }

    /// The key of the instance living on `node`.
    pub fn instance_key(&self, node: NodeId) -> Option<&Key> {
        if !self.host.try_borrow().ok()?.contains(node) {
            return None;
        }
        self.instances.get(&node).map(|instance| instance.key())
    }

    /// The typed instance living on `node`. Instances of dropped nodes are
    /// not handed out.
    pub fn instance<C: Component>(&self, node: NodeId) -> Option<Shared<Element<C>>> {
        if !self.host.try_borrow().ok()?.contains(node) {
            return None;
        }
        self.instances
            .get(&node)?
            .as_any()
            .downcast_ref::<Mounted<C>>()
            .map(|mounted| Rc::clone(mounted.element()))
    }

    /// Number of live instances.
    pub fn instance_count(&self) -> usize {
        self.instances.len()
    }
}
