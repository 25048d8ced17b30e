//! The shared image slot and its change notifications.
//!
//! An [`ImageSource`] owns the current [`Volume`] together with its
//! [`NativeMapping`]. Loading or editing the image goes through the source,
//! which tells subscribers what happened via [`ImageEvent`]s.
//!
//! Subscriptions are scoped: [`ChangeNotifier::subscribe`] returns a
//! [`Subscription`] handle and the callback is unregistered when the handle
//! is dropped.
//!
//! # Example
//!
//! ```rust
//! use std::sync::atomic::{AtomicUsize, Ordering};
//! use std::sync::Arc;
//! use voxl_core::{ImageSource, NativeMapping, Volume};
//!
//! let mut source = ImageSource::new(
//!     Volume::from_samples([1, 1, 1], vec![0u8]).unwrap(),
//!     NativeMapping::identity(),
//! );
//! let hits = Arc::new(AtomicUsize::new(0));
//! let counter = Arc::clone(&hits);
//! let sub = source.subscribe(move |_| {
//!     counter.fetch_add(1, Ordering::Relaxed);
//! });
//!
//! source.set_sample([0, 0, 0], 0, 3.0).unwrap();
//! drop(sub);
//! source.set_sample([0, 0, 0], 0, 4.0).unwrap();
//! assert_eq!(hits.load(Ordering::Relaxed), 1);
//! ```

use std::sync::{Arc, Mutex, PoisonError, RwLock, Weak};

use tracing::debug;

use crate::native::NativeMapping;
use crate::volume::{Volume, VoxelIndex};
use crate::Result;

/// What changed about an image.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ImageEvent {
    /// A new buffer (and mapping) was loaded.
    Replaced {
        /// Version of the new buffer
        version: u64,
    },
    /// Samples of the current buffer were edited in place.
    Modified {
        /// Version after the edit
        version: u64,
    },
    /// The native mapping was swapped.
    NativeMappingChanged,
}

type Callback = Box<dyn Fn(&ImageEvent) + Send + Sync>;

#[derive(Default)]
struct Registry {
    next_id: u64,
    listeners: Vec<(u64, Callback)>,
}

/// Broadcasts [`ImageEvent`]s to registered callbacks.
#[derive(Clone, Default)]
pub struct ChangeNotifier {
    registry: Arc<Mutex<Registry>>,
}

impl std::fmt::Debug for ChangeNotifier {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ChangeNotifier")
            .field("listeners", &self.listener_count())
            .finish()
    }
}

impl ChangeNotifier {
    /// Creates a notifier without listeners.
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers a callback; it stays registered while the handle lives.
    ///
    /// Callbacks run synchronously inside [`notify`](Self::notify) and must
    /// not call back into the object that is notifying.
    pub fn subscribe<F>(&self, callback: F) -> Subscription
    where
        F: Fn(&ImageEvent) + Send + Sync + 'static,
    {
        let mut reg = self.registry.lock().unwrap_or_else(PoisonError::into_inner);
        let id = reg.next_id;
        reg.next_id += 1;
        reg.listeners.push((id, Box::new(callback)));
        Subscription {
            id,
            registry: Arc::downgrade(&self.registry),
        }
    }

    /// Calls every registered callback.
    pub fn notify(&self, event: &ImageEvent) {
        let reg = self.registry.lock().unwrap_or_else(PoisonError::into_inner);
        for (_, callback) in &reg.listeners {
            callback(event);
        }
    }

    /// Number of live subscriptions.
    pub fn listener_count(&self) -> usize {
        self.registry
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .listeners
            .len()
    }
}

/// Handle of a registered callback. Dropping it unsubscribes.
#[must_use = "dropping a Subscription unsubscribes immediately"]
#[derive(Debug)]
pub struct Subscription {
    id: u64,
    registry: Weak<Mutex<Registry>>,
}

impl Drop for Subscription {
    fn drop(&mut self) {
        if let Some(registry) = self.registry.upgrade() {
            let mut reg = registry.lock().unwrap_or_else(PoisonError::into_inner);
            reg.listeners.retain(|(id, _)| *id != self.id);
        }
    }
}

/// Current image of a layer plus its native mapping.
#[derive(Debug)]
pub struct ImageSource {
    volume: Volume,
    mapping: NativeMapping,
    notifier: ChangeNotifier,
}

/// Image slot shared between the loader, the layer and renderers.
pub type SharedImage = Arc<RwLock<ImageSource>>;

impl ImageSource {
    /// Creates a source holding `volume`.
    pub fn new(volume: Volume, mapping: NativeMapping) -> Self {
        Self {
            volume,
            mapping,
            notifier: ChangeNotifier::new(),
        }
    }

    /// Wraps the source for sharing.
    pub fn shared(self) -> SharedImage {
        Arc::new(RwLock::new(self))
    }

    /// Current volume.
    #[inline]
    pub fn volume(&self) -> &Volume {
        &self.volume
    }

    /// Current native mapping.
    #[inline]
    pub fn native_mapping(&self) -> NativeMapping {
        self.mapping
    }

    /// Registers for change notifications.
    pub fn subscribe<F>(&self, callback: F) -> Subscription
    where
        F: Fn(&ImageEvent) + Send + Sync + 'static,
    {
        self.notifier.subscribe(callback)
    }

    /// Number of live subscriptions.
    pub fn subscriber_count(&self) -> usize {
        self.notifier.listener_count()
    }

    /// Loads a new image, swapping volume and mapping together.
    pub fn replace(&mut self, volume: Volume, mapping: NativeMapping) {
        let mapping_changed = mapping != self.mapping;
        self.volume = volume;
        self.mapping = mapping;
        let version = self.volume.version();
        debug!(version, dims = ?self.volume.dims(), "image replaced");
        self.notifier.notify(&ImageEvent::Replaced { version });
        if mapping_changed {
            self.notifier.notify(&ImageEvent::NativeMappingChanged);
        }
    }

    /// Edits one sample in place.
    pub fn set_sample(&mut self, voxel: VoxelIndex, component: usize, value: f64) -> Result<()> {
        self.volume.set_sample(voxel, component, value)?;
        self.notifier.notify(&ImageEvent::Modified {
            version: self.volume.version(),
        });
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicBool, Ordering};

    #[test]
    fn test_events_and_unsubscribe() {
        let mut source = ImageSource::new(
            Volume::from_samples([1, 1, 1], vec![0u8]).unwrap(),
            NativeMapping::identity(),
        );
        let events = Arc::new(Mutex::new(Vec::new()));
        let sink = Arc::clone(&events);
        let sub = source.subscribe(move |e| sink.lock().unwrap().push(*e));
        assert_eq!(source.subscriber_count(), 1);

        let vol = Volume::from_samples([1, 1, 1], vec![1u8]).unwrap();
        let version = vol.version();
        source.replace(vol, NativeMapping::new(2.0, 0.0));
        assert_eq!(
            events.lock().unwrap().as_slice(),
            &[
                ImageEvent::Replaced { version },
                ImageEvent::NativeMappingChanged
            ]
        );

        drop(sub);
        assert_eq!(source.subscriber_count(), 0);
        source.set_sample([0, 0, 0], 0, 5.0).unwrap();
        assert_eq!(events.lock().unwrap().len(), 2);
    }

    #[test]
    fn test_subscription_outlives_source() {
        let flag = Arc::new(AtomicBool::new(false));
        let f = Arc::clone(&flag);
        let sub = {
            let source = ImageSource::new(Volume::empty(crate::SampleType::U8), NativeMapping::identity());
            source.subscribe(move |_| f.store(true, Ordering::Relaxed))
        };
        // Dropping after the registry is gone must be a no-op.
        drop(sub);
        assert!(!flag.load(Ordering::Relaxed));
    }
}
