use std::sync::Arc;

use parking_lot::RwLock;

/// Single-slot cell holding the current rendered sidebar markup.
///
/// Writers replace the whole value; readers clone the inner `Arc`. A
/// concurrent reader therefore always observes either the fully-old or the
/// fully-new markup, never a partial write.
#[derive(Clone)]
pub struct SidebarCell {
    inner: Arc<RwLock<Arc<str>>>,
}

impl SidebarCell {
    pub fn new(markup: String) -> Self {
        Self {
            inner: Arc::new(RwLock::new(markup.into())),
        }
    }

    /// Current markup. Cheap: clones the `Arc`, not the string.
    pub fn current(&self) -> Arc<str> {
        self.inner.read().clone()
    }

    /// Replace the current markup in a single atomic swap.
    pub fn replace(&self, markup: String) {
        *self.inner.write() = markup.into();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn current_returns_initial_value() {
        let cell = SidebarCell::new("initial".to_string());
        assert_eq!(&*cell.current(), "initial");
    }

    #[test]
    fn replace_swaps_whole_value() {
        let cell = SidebarCell::new("old".to_string());
        cell.replace("new".to_string());
        assert_eq!(&*cell.current(), "new");
    }

    #[test]
    fn clones_share_the_same_slot() {
        let cell = SidebarCell::new("one".to_string());
        let reader = cell.clone();
        cell.replace("two".to_string());
        assert_eq!(&*reader.current(), "two");
    }

    #[test]
    fn readers_keep_the_value_they_loaded() {
        let cell = SidebarCell::new("before".to_string());
        let held = cell.current();
        cell.replace("after".to_string());
        // The snapshot a reader already holds is unaffected by the swap.
        assert_eq!(&*held, "before");
        assert_eq!(&*cell.current(), "after");
    }
}
