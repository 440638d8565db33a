//! Paint lifecycle signals.
//!
//! The engine has no global event channels; interested parties register a
//! callback on the painter and receive events synchronously, in the frame
//! the underlying transition occurs.

use crate::brush::BrushFlags;
use crate::color::Rgba;
use std::collections::HashMap;
use std::sync::{Arc, Mutex};

/// Callback ID for registration/deregistration.
pub type CallbackId = u64;

/// Events emitted by the painter.
#[derive(Debug, Clone, PartialEq)]
pub enum PaintEvent {
    /// A stroke began; `brushes` holds every actuator now drawing.
    StrokeStarted { brushes: BrushFlags },
    /// A stroke ended; `brushes` holds the actuators still drawing.
    StrokeEnded { brushes: BrushFlags },
    /// The brush color changed.
    ColorChanged { color: Rgba },
    /// The brush size changed. The value is already clamped.
    BrushSizeChanged { size: i32 },
    /// Both buffers were reset to their base state.
    CanvasCleared,
}

/// Callback function type.
pub type PaintCallback = Arc<dyn Fn(&PaintEvent) + Send + Sync>;

/// Registry of paint event callbacks.
#[derive(Clone, Default)]
pub struct EventHub {
    callbacks: Arc<Mutex<HashMap<CallbackId, PaintCallback>>>,
    next_callback_id: Arc<Mutex<CallbackId>>,
}

impl EventHub {
    pub fn new() -> Self {
        Self {
            callbacks: Arc::new(Mutex::new(HashMap::new())),
            next_callback_id: Arc::new(Mutex::new(0)),
        }
    }

    /// Register a callback for paint events.
    pub fn register_callback<F>(&self, callback: F) -> CallbackId
    where
        F: Fn(&PaintEvent) + Send + Sync + 'static,
    {
        let mut callbacks = self.callbacks.lock().unwrap();
        let mut next_id = self.next_callback_id.lock().unwrap();

        let callback_id = *next_id;
        *next_id += 1;

        callbacks.insert(callback_id, Arc::new(callback));
        callback_id
    }

    /// Deregister a callback. Returns whether the id was registered.
    pub fn deregister_callback(&self, callback_id: CallbackId) -> bool {
        let mut callbacks = self.callbacks.lock().unwrap();
        callbacks.remove(&callback_id).is_some()
    }

    /// Number of registered callbacks.
    pub fn callback_count(&self) -> usize {
        self.callbacks.lock().unwrap().len()
    }

    /// Deliver an event to every registered callback.
    pub fn emit(&self, event: &PaintEvent) {
        let callbacks = self.callbacks.lock().unwrap();
        for callback in callbacks.values() {
            callback(event);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_register_and_emit() {
        let hub = EventHub::new();
        let seen = Arc::new(Mutex::new(Vec::new()));
        let seen_clone = Arc::clone(&seen);

        let id = hub.register_callback(move |event| {
            seen_clone.lock().unwrap().push(event.clone());
        });
        assert_eq!(hub.callback_count(), 1);

        hub.emit(&PaintEvent::CanvasCleared);
        hub.emit(&PaintEvent::BrushSizeChanged { size: 7 });

        let events = seen.lock().unwrap();
        assert_eq!(
            *events,
            vec![
                PaintEvent::CanvasCleared,
                PaintEvent::BrushSizeChanged { size: 7 }
            ]
        );
        drop(events);

        assert!(hub.deregister_callback(id));
        assert!(!hub.deregister_callback(id));
        assert_eq!(hub.callback_count(), 0);
    }

    #[test]
    fn test_deregistered_callback_not_called() {
        let hub = EventHub::new();
        let seen = Arc::new(Mutex::new(0usize));
        let seen_clone = Arc::clone(&seen);

        let id = hub.register_callback(move |_| {
            *seen_clone.lock().unwrap() += 1;
        });
        hub.emit(&PaintEvent::CanvasCleared);
        hub.deregister_callback(id);
        hub.emit(&PaintEvent::CanvasCleared);

        assert_eq!(*seen.lock().unwrap(), 1);
    }

    #[test]
    fn test_multiple_callbacks_all_receive() {
        let hub = EventHub::new();
        let counter = Arc::new(Mutex::new(0usize));

        for _ in 0..3 {
            let counter_clone = Arc::clone(&counter);
            hub.register_callback(move |_| {
                *counter_clone.lock().unwrap() += 1;
            });
        }
        hub.emit(&PaintEvent::CanvasCleared);
        assert_eq!(*counter.lock().unwrap(), 3);
    }
}
