//! Stack growth for the recursive tree walks
//!
//! Parsing, resolution, printing, evaluation and even dropping a tree all
//! recurse once per nesting level. Each of those recursion points goes
//! through [`ensure_sufficient_stack`], which moves onto a freshly
//! allocated stack segment when the current one runs low, so nesting depth
//! is bounded by memory instead of the caller's thread stack.

/// Run `f`, first growing the stack if less than the red zone remains
#[inline]
#[cfg(not(target_arch = "wasm32"))]
pub fn ensure_sufficient_stack<R>(f: impl FnOnce() -> R) -> R {
    /// Minimum stack space to keep available (100KB red zone)
    const RED_ZONE: usize = 100 * 1024;

    /// Size of each newly allocated segment (1MB)
    const STACK_PER_RECURSION: usize = 1024 * 1024;

    stacker::maybe_grow(RED_ZONE, STACK_PER_RECURSION, f)
}

/// WASM manages its own stack
#[inline]
#[cfg(target_arch = "wasm32")]
pub fn ensure_sufficient_stack<R>(f: impl FnOnce() -> R) -> R {
    f()
}
