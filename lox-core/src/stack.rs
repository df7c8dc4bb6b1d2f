//! Stack growth for the recursive parser and evaluator.
//!
//! Deeply nested expressions recurse once per nesting level. Instead of
//! imposing a depth limit, recursive entry points run inside
//! [`ensure_sufficient_stack`], which moves execution onto a freshly
//! allocated stack segment when the current one runs low.

/// If less than this much stack remains, a new segment is allocated.
const RED_ZONE: usize = 100 * 1024;

/// Size of each newly allocated stack segment.
const STACK_PER_RECURSION: usize = 1024 * 1024;

#[inline]
#[cfg(not(target_arch = "wasm32"))]
pub fn ensure_sufficient_stack<R>(f: impl FnOnce() -> R) -> R {
    stacker::maybe_grow(RED_ZONE, STACK_PER_RECURSION, f)
}

#[inline]
#[cfg(target_arch = "wasm32")]
pub fn ensure_sufficient_stack<R>(f: impl FnOnce() -> R) -> R {
    f()
}
