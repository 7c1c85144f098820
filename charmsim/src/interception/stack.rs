use std::{
    cell::RefCell,
    fmt,
    panic::{AssertUnwindSafe, catch_unwind},
    rc::Rc,
};

use crate::interception::{Interceptor, InterceptorGuard, InterceptorId};

struct Entry {
    id: InterceptorId,
    interceptor: Rc<dyn Interceptor>,
}

struct InterceptorStack {
    entries: Vec<Entry>,
    last_id: InterceptorId,
}

impl InterceptorStack {
    const fn new() -> Self {
        Self {
            entries: Vec::new(),
            last_id: 0,
        }
    }

    fn push(&mut self, interceptor: Rc<dyn Interceptor>) -> InterceptorId {
        self.last_id = self.last_id.wrapping_add(1);
        let id = self.last_id;
        self.entries.push(Entry { id, interceptor });
        id
    }

    fn remove(&mut self, id: InterceptorId) -> bool {
        let before = self.entries.len();
        self.entries.retain(|e| e.id != id);
        self.entries.len() != before
    }

    fn snapshot(&self) -> Vec<(InterceptorId, Rc<dyn Interceptor>)> {
        self.entries
            .iter()
            .map(|e| (e.id, Rc::clone(&e.interceptor)))
            .collect()
    }
}

impl fmt::Debug for InterceptorStack {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("InterceptorStack")
            .field("entries.len()", &self.entries.len())
            .field("last_id", &self.last_id)
            .finish()
    }
}

thread_local! {
    static STACK: RefCell<InterceptorStack> = const { RefCell::new(InterceptorStack::new()) };
}

/// Install an interceptor on the current thread.
///
/// It sees every emission on this thread until the returned guard is
/// dropped or removed.
pub fn install<I: Interceptor + 'static>(interceptor: I) -> InterceptorGuard {
    install_shared(Rc::new(interceptor))
}

/// Install an interceptor the caller keeps a handle to.
pub fn install_shared(interceptor: Rc<dyn Interceptor>) -> InterceptorGuard {
    let id = STACK.with_borrow_mut(|stack| stack.push(interceptor));
    tracing::trace!(interceptor_id = id, "interceptor installed");
    InterceptorGuard::new(id)
}

/// Number of interceptors installed on the current thread.
pub fn installed() -> usize {
    STACK.with_borrow(|stack| stack.entries.len())
}

pub(crate) fn remove(id: InterceptorId) -> bool {
    // The stack may already be gone if a guard outlives thread-local teardown.
    let removed = STACK
        .try_with(|stack| stack.borrow_mut().remove(id))
        .unwrap_or(false);
    if removed {
        tracing::trace!(interceptor_id = id, "interceptor removed");
    }
    removed
}

/// Run `f` against every installed interceptor, in installation order.
///
/// The stack is not borrowed while callbacks run, so a callback may install
/// or remove interceptors; the change applies from the next emission.
pub(crate) fn notify(f: impl Fn(&dyn Interceptor)) {
    let active = STACK.with_borrow(|stack| {
        if stack.entries.is_empty() {
            Vec::new()
        } else {
            stack.snapshot()
        }
    });

    for (id, interceptor) in active {
        let result = catch_unwind(AssertUnwindSafe(|| f(interceptor.as_ref())));
        if result.is_err() {
            tracing::error!(interceptor_id = id, "Interceptor panicked, removing");
            remove(id);
        }
    }
}
