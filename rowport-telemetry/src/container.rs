use std::rc::{Rc, Weak};

/// The rendered subtree whose nodes are counted on every sample.
///
/// `node_count` includes the container itself. Returning `None` means the handle no longer
/// refers to a live subtree (e.g. it was removed from the tree); the sampler reports `0`.
pub trait NodeContainer {
    fn node_count(&self) -> Option<usize>;
}

/// Shared handle the sampler holds for the duration of a monitoring session.
pub type ContainerHandle = Rc<dyn NodeContainer>;

impl<T: NodeContainer + ?Sized> NodeContainer for Rc<T> {
    fn node_count(&self) -> Option<usize> {
        (**self).node_count()
    }
}

/// A weak handle degrades to `None` once the container is dropped.
impl<T: NodeContainer + ?Sized> NodeContainer for Weak<T> {
    fn node_count(&self) -> Option<usize> {
        self.upgrade()?.node_count()
    }
}

/// Adapts a closure into a [`NodeContainer`].
pub struct CountFn<F>(pub F);

impl<F: Fn() -> Option<usize>> NodeContainer for CountFn<F> {
    fn node_count(&self) -> Option<usize> {
        (self.0)()
    }
}

/// Wraps `count` as a container handle.
pub fn container_fn(count: impl Fn() -> Option<usize> + 'static) -> ContainerHandle {
    Rc::new(CountFn(count))
}

/// Wraps a weak reference so the sampler does not keep the container alive.
pub fn weak_container<T: NodeContainer + 'static>(container: &Rc<T>) -> ContainerHandle {
    Rc::new(Rc::downgrade(container))
}
