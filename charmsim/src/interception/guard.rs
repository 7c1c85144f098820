use std::fmt;

use crate::interception::{InterceptorId, stack};

/// Keeps an interceptor installed for as long as it lives.
///
/// Dropping the guard removes the interceptor. [`remove`](Self::remove) does
/// the same explicitly and reports whether it was still installed.
#[must_use = "dropping the guard removes the interceptor immediately"]
pub struct InterceptorGuard {
    id: InterceptorId,
    active: bool,
}

impl InterceptorGuard {
    pub(crate) fn new(id: InterceptorId) -> Self {
        Self { id, active: true }
    }

    pub fn id(&self) -> InterceptorId {
        self.id
    }

    /// Remove the interceptor now.
    ///
    /// Returns false if it was already gone, e.g. removed after a panic.
    pub fn remove(mut self) -> bool {
        self.release()
    }

    fn release(&mut self) -> bool {
        if !self.active {
            return false;
        }
        self.active = false;
        stack::remove(self.id)
    }
}

impl Drop for InterceptorGuard {
    fn drop(&mut self) {
        self.release();
    }
}

impl fmt::Debug for InterceptorGuard {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("InterceptorGuard")
            .field("id", &self.id)
            .field("active", &self.active)
            .finish()
    }
}
