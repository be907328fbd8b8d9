//! Extension point for overriding construction. When a [ReflectionInterrupt] is installed, the
//! injector asks it first, before resolving parameters and constructing a type or invoking a
//! method. Any value it supplies is used instead, and still passes through post-resolve hooks.

use crate::inspectable::{MethodDeclaration, TypeToken};
use crate::instance::AnyPtr;
#[cfg(test)]
use mockall::automock;

pub type ReflectionInterruptPtr = Box<dyn ReflectionInterrupt>;

#[cfg_attr(test, automock)]
pub trait ReflectionInterrupt {
    /// Returns an instance to use instead of constructing the given type.
    fn interrupt_type(&self, token: &TypeToken) -> Option<AnyPtr>;

    /// Returns a result to use instead of invoking the given method on the instance. The inner
    /// value is the method result itself, which can be empty.
    fn interrupt_method(
        &self,
        instance: &AnyPtr,
        declaration: &MethodDeclaration,
    ) -> Option<Option<AnyPtr>>;
}
