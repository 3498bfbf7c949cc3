// ── Watch-backed slice cell ──

use tokio::sync::watch;

/// Where a slice value came from.
///
/// `Optimistic` marks a locally-applied command echo that the appliance
/// has not yet confirmed; the next accepted push for the slice flips it
/// back to `Authoritative`, whatever its content.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Provenance {
    #[default]
    Authoritative,
    Optimistic,
}

/// A slice value together with its provenance tag.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Tagged<T> {
    pub value: T,
    pub source: Provenance,
}

impl<T> Tagged<T> {
    pub fn authoritative(value: T) -> Self {
        Self {
            value,
            source: Provenance::Authoritative,
        }
    }

    pub fn optimistic(value: T) -> Self {
        Self {
            value,
            source: Provenance::Optimistic,
        }
    }
}

/// One slice of appliance state behind a `watch` channel.
///
/// Writes always replace the whole value (full-slice replace) and
/// notify subscribers synchronously. Reads are wait-free clones.
#[derive(Debug)]
pub struct SliceCell<T> {
    tx: watch::Sender<Tagged<T>>,
}

impl<T: Clone + Default> SliceCell<T> {
    pub fn new() -> Self {
        let (tx, _) = watch::channel(Tagged::default());
        Self { tx }
    }
}

impl<T: Clone> SliceCell<T> {
    /// Current value, provenance stripped.
    pub fn get(&self) -> T {
        self.tx.borrow().value.clone()
    }

    /// Current value with its provenance tag.
    pub fn get_tagged(&self) -> Tagged<T> {
        self.tx.borrow().clone()
    }

    /// Replace the slice with an appliance-confirmed value.
    pub fn replace(&self, value: T) {
        let _ = self.tx.send(Tagged::authoritative(value));
    }

    /// Replace the slice with a locally-predicted value.
    pub fn replace_optimistic(&self, value: T) {
        let _ = self.tx.send(Tagged::optimistic(value));
    }

    /// Mutate in place, keeping the slice authoritative.
    pub fn update(&self, f: impl FnOnce(&mut T)) {
        self.tx.send_modify(|tagged| {
            f(&mut tagged.value);
            tagged.source = Provenance::Authoritative;
        });
    }

    pub fn subscribe(&self) -> watch::Receiver<Tagged<T>> {
        self.tx.subscribe()
    }
}

impl<T: Clone + Default> Default for SliceCell<T> {
    fn default() -> Self {
        Self::new()
    }
}
