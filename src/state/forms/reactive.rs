//! Change-tracked state for forms
//!
//! - [`Observable`]: a shared, version-tracked value with subscriber callbacks.
//! - [`Subscription`]: RAII guard that unsubscribes on drop.
//! - [`Computed`]: a memoized value derived from observables. It keeps the
//!   source versions it was computed against and recomputes on `get()` only
//!   when one of them moved, so a read is never stale.
//!
//! Everything here is single-threaded (`Rc<RefCell<..>>`); a form instance
//! and its observables live on one thread.
//!
//! Version increments exactly once per mutation that changes the value, and
//! writing an equal value is a no-op. Subscribers run in registration order
//! on a snapshot of the new value with no borrow held, so a subscriber may
//! read or write the observable that is notifying it.

use std::cell::RefCell;
use std::fmt;
use std::rc::{Rc, Weak};

type Callback<T> = dyn Fn(&T);

struct ObservableInner<T> {
    value: T,
    version: u64,
    subscribers: Vec<Weak<Callback<T>>>,
}

/// Shared, version-tracked value
pub struct Observable<T> {
    inner: Rc<RefCell<ObservableInner<T>>>,
}

impl<T> Clone for Observable<T> {
    fn clone(&self) -> Self {
        Self {
            inner: Rc::clone(&self.inner),
        }
    }
}

impl<T: fmt::Debug> fmt::Debug for Observable<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let inner = self.inner.borrow();
        f.debug_struct("Observable")
            .field("value", &inner.value)
            .field("version", &inner.version)
            .finish()
    }
}

impl<T> Observable<T> {
    pub fn new(value: T) -> Self {
        Self {
            inner: Rc::new(RefCell::new(ObservableInner {
                value,
                version: 0,
                subscribers: Vec::new(),
            })),
        }
    }

    /// Number of changing mutations applied so far
    pub fn version(&self) -> u64 {
        self.inner.borrow().version
    }

    /// Read the current value without cloning it
    pub fn with<R>(&self, f: impl FnOnce(&T) -> R) -> R {
        f(&self.inner.borrow().value)
    }

    /// Register a change callback. The callback stays active for as long as
    /// the returned guard is alive.
    pub fn subscribe(&self, callback: impl Fn(&T) + 'static) -> Subscription
    where
        T: 'static,
    {
        let callback: Rc<Callback<T>> = Rc::new(callback);
        self.inner
            .borrow_mut()
            .subscribers
            .push(Rc::downgrade(&callback));
        Subscription {
            _callback: Box::new(callback),
        }
    }

    fn notify(&self, value: &T) {
        let live: Vec<Rc<Callback<T>>> = {
            let mut inner = self.inner.borrow_mut();
            inner.subscribers.retain(|weak| weak.strong_count() > 0);
            inner.subscribers.iter().filter_map(Weak::upgrade).collect()
        };
        for callback in live {
            callback(value);
        }
    }
}

impl<T: Clone> Observable<T> {
    /// Clone the current value out
    pub fn get(&self) -> T {
        self.inner.borrow().value.clone()
    }
}

impl<T: Clone + PartialEq> Observable<T> {
    /// Replace the value
    pub fn set(&self, value: T) {
        self.update(|current| *current = value);
    }

    /// Mutate the value in place. Bumps the version and notifies only when
    /// the value actually changed.
    ///
    /// Change detection compares against a clone taken before `f` runs, and
    /// subscribers get a second clone, so `T` should stay cheap to clone.
    /// Form state (small maps and sets) is.
    pub fn update<R>(&self, f: impl FnOnce(&mut T) -> R) -> R {
        let (result, snapshot) = {
            let mut inner = self.inner.borrow_mut();
            let before = inner.value.clone();
            let result = f(&mut inner.value);
            if inner.value == before {
                (result, None)
            } else {
                inner.version += 1;
                (result, Some(inner.value.clone()))
            }
        };
        if let Some(value) = snapshot {
            self.notify(&value);
        }
        result
    }
}

/// Guard for an [`Observable::subscribe`] registration
pub struct Subscription {
    _callback: Box<dyn std::any::Any>,
}

impl fmt::Debug for Subscription {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("Subscription")
    }
}

/// Anything with a version that moves on every change
trait Versioned {
    fn version(&self) -> u64;
}

impl<T> Versioned for Observable<T> {
    fn version(&self) -> u64 {
        Observable::version(self)
    }
}

/// Memoized value derived from observables
pub struct Computed<T> {
    sources: Vec<Box<dyn Versioned>>,
    compute: Box<dyn Fn() -> T>,
    cache: RefCell<Option<(Vec<u64>, T)>>,
}

impl<T: Clone + 'static> Computed<T> {
    /// Derive from a single observable
    pub fn map<A: 'static>(source: &Observable<A>, f: impl Fn(&A) -> T + 'static) -> Self {
        let a = source.clone();
        Self {
            sources: vec![Box::new(source.clone())],
            compute: Box::new(move || a.with(&f)),
            cache: RefCell::new(None),
        }
    }

    /// Derive from two observables
    pub fn map2<A: 'static, B: 'static>(
        first: &Observable<A>,
        second: &Observable<B>,
        f: impl Fn(&A, &B) -> T + 'static,
    ) -> Self {
        let a = first.clone();
        let b = second.clone();
        Self {
            sources: vec![Box::new(first.clone()), Box::new(second.clone())],
            compute: Box::new(move || a.with(|a| b.with(|b| f(a, b)))),
            cache: RefCell::new(None),
        }
    }

    /// Current derived value, recomputed only if a source changed
    pub fn get(&self) -> T {
        let versions: Vec<u64> = self.sources.iter().map(|s| s.version()).collect();
        if let Some((seen, value)) = self.cache.borrow().as_ref() {
            if *seen == versions {
                return value.clone();
            }
        }
        let value = (self.compute)();
        *self.cache.borrow_mut() = Some((versions, value.clone()));
        value
    }
}

impl<T: fmt::Debug> fmt::Debug for Computed<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Computed")
            .field("cached", &self.cache.borrow().as_ref().map(|(_, v)| v))
            .finish()
    }
}
