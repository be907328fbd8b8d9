//! Observers get notified about every declaration the injector introspects - types about to be
//! constructed and methods about to be called. This allows collecting declaration markers without
//! the injector itself caring about them.

use crate::inspectable::Declaration;
#[cfg(test)]
use mockall::automock;
use std::cell::RefCell;
use std::rc::Rc;

pub type ReflectionObserverPtr = Rc<dyn ReflectionObserver>;

#[cfg_attr(test, automock)]
pub trait ReflectionObserver {
    fn observe(&self, declaration: &Declaration);
}

/// Observer accumulating markers of all observed declarations.
#[derive(Default, Debug)]
pub struct AttributeWatcher {
    attributes: RefCell<Vec<&'static str>>,
}

impl AttributeWatcher {
    /// Returns markers collected so far, in observation order.
    pub fn attributes(&self) -> Vec<&'static str> {
        self.attributes.borrow().clone()
    }

    #[inline]
    pub fn has_attribute(&self, attribute: &str) -> bool {
        self.attributes.borrow().contains(&attribute)
    }

    /// Clears any stored markers.
    pub fn clear(&self) {
        self.attributes.borrow_mut().clear();
    }
}

impl ReflectionObserver for AttributeWatcher {
    fn observe(&self, declaration: &Declaration) {
        self.attributes
            .borrow_mut()
            .extend_from_slice(declaration.markers());
    }
}
