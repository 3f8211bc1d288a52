/// A scoped handle for a global event listener (viewport resize,
/// pointer drag). The listener is released exactly once: when the
/// handle is dropped or explicitly released, never leaked past the
/// lifetime of the view that acquired it.
pub struct Subscription {
    release: Option<Box<dyn FnOnce() + Send>>,
}

impl Subscription {
    pub fn new(release: impl FnOnce() + Send + 'static) -> Self {
        Self {
            release: Some(Box::new(release)),
        }
    }

    /// Releases the subscription now instead of at drop.
    pub fn release(mut self) {
        if let Some(release) = self.release.take() {
            release();
        }
    }
}

impl Drop for Subscription {
    fn drop(&mut self) {
        if let Some(release) = self.release.take() {
            release();
        }
    }
}

impl std::fmt::Debug for Subscription {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Subscription")
            .field("released", &self.release.is_none())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::{
        atomic::{AtomicUsize, Ordering},
        Arc,
    };

    #[test]
    fn releases_exactly_once() {
        let released = Arc::new(AtomicUsize::new(0));
        let counter = released.clone();
        let subscription = Subscription::new(move || {
            counter.fetch_add(1, Ordering::SeqCst);
        });

        subscription.release();
        assert_eq!(released.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn releases_on_drop() {
        let released = Arc::new(AtomicUsize::new(0));
        let counter = released.clone();
        {
            let _subscription = Subscription::new(move || {
                counter.fetch_add(1, Ordering::SeqCst);
            });
        }
        assert_eq!(released.load(Ordering::SeqCst), 1);
    }
}
