//! Queue module: the priority-ordered container of pending tasks.

mod ordered;

pub use ordered::OrderedQueue;
