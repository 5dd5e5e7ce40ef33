//! Resolution depth tracking.
//!
//! Cycles between beans are not rejected up front: each nested resolution
//! on a thread consumes one unit of a depth budget and a cycle exhausts it,
//! surfacing as `UnboundedRecursion` rather than a stack overflow.

use std::cell::RefCell;
use std::marker::PhantomData;

use crate::error::{DiError, DiResult};

/// Default budget for nested resolutions on one thread.
pub const DEFAULT_MAX_DEPTH: usize = 64;

// Thread-local stack of bean names currently being resolved
thread_local! {
    static RESOLUTION_STACK: RefCell<Vec<String>> = const { RefCell::new(Vec::new()) };
}

/// Guard for one level of the thread-local resolution stack.
///
/// Pops its entry on drop, including during unwinding.
pub(crate) struct ResolutionGuard {
    // Tied to the thread whose stack it pushed onto
    _not_send: PhantomData<*const ()>,
}

impl ResolutionGuard {
    /// Pushes `name`, or fails when the stack already holds `max_depth` names.
    pub(crate) fn enter(name: &str, max_depth: usize) -> DiResult<Self> {
        RESOLUTION_STACK.with(|stack| {
            let mut stack = stack.borrow_mut();
            if stack.len() >= max_depth {
                let mut path = stack.clone();
                path.push(name.to_string());
                return Err(DiError::UnboundedRecursion {
                    bean: name.to_string(),
                    depth: stack.len(),
                    path,
                });
            }
            stack.push(name.to_string());
            Ok(ResolutionGuard {
                _not_send: PhantomData,
            })
        })
    }
}

impl Drop for ResolutionGuard {
    fn drop(&mut self) {
        RESOLUTION_STACK.with(|stack| {
            stack.borrow_mut().pop();
        });
    }
}

/// Number of resolutions in progress on the current thread.
pub(crate) fn current_depth() -> usize {
    RESOLUTION_STACK.with(|stack| stack.borrow().len())
}
