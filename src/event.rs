//! Runtime events for monitoring playback health, and the control events
//! that drive the producer loop.
//!
//! [`PlayerEvent`]s are non-fatal notifications; playback continues after any
//! of them. [`ControlEvent`]s flow the other way, from the host's event source
//! into the producer.

use std::sync::Arc;

/// Runtime events emitted during playback.
///
/// These are informational, not errors. The audio callback keeps producing
/// output after every event. Note that decode events are emitted from the
/// audio thread, so the callback must be cheap and must not block.
///
/// # Example
///
/// ```
/// use stream_player::PlayerEvent;
///
/// fn handle_event(event: PlayerEvent) {
///     match event {
///         PlayerEvent::PacketDropped { bytes, reason } => {
///             eprintln!("dropped {bytes} byte packet: {reason}");
///         }
///         PlayerEvent::DeviceError { error } => {
///             eprintln!("device error: {error}");
///         }
///         PlayerEvent::QueueRejected { stream_index, bytes } => {
///             eprintln!("stream {stream_index}: {bytes} bytes not queued");
///         }
///         PlayerEvent::EndOfInput => eprintln!("input exhausted"),
///         PlayerEvent::ShutdownRequested => eprintln!("quit"),
///     }
/// }
/// ```
#[derive(Debug, Clone)]
pub enum PlayerEvent {
    /// A compressed audio packet failed to decode and was skipped.
    PacketDropped {
        /// Size of the undecoded remainder that was discarded.
        bytes: usize,
        /// Description of the codec error.
        reason: String,
    },

    /// The audio device reported a stream error.
    DeviceError {
        /// Description of the error.
        error: String,
    },

    /// The producer could not queue a packet and disposed of it.
    QueueRejected {
        /// Stream the packet belonged to.
        stream_index: usize,
        /// Payload size of the rejected packet.
        bytes: usize,
    },

    /// The demuxer has no more units.
    EndOfInput,

    /// The user asked to quit and the shutdown signal was set.
    ShutdownRequested,
}

/// Callback type for receiving runtime events.
///
/// Register one via [`PlayerBuilder::on_event()`].
///
/// [`PlayerBuilder::on_event()`]: crate::PlayerBuilder::on_event
pub type EventCallback = Arc<dyn Fn(PlayerEvent) + Send + Sync>;

/// Creates an [`EventCallback`] from a closure.
///
/// # Example
///
/// ```
/// use stream_player::{event_callback, PlayerEvent};
///
/// let callback = event_callback(|event| {
///     println!("Got event: {:?}", event);
/// });
/// callback(PlayerEvent::EndOfInput);
/// ```
pub fn event_callback<F>(f: F) -> EventCallback
where
    F: Fn(PlayerEvent) + Send + Sync + 'static,
{
    Arc::new(f)
}

/// Control notifications delivered by the host's event source.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ControlEvent {
    /// The user closed the window or pressed quit.
    Quit,
}

/// Source of [`ControlEvent`]s polled by the producer loop.
///
/// `poll` is called once per demuxed unit and must not block.
pub trait EventSource: Send {
    /// Returns the next pending event, if any.
    fn poll(&mut self) -> Option<ControlEvent>;
}

impl EventSource for tokio::sync::mpsc::UnboundedReceiver<ControlEvent> {
    fn poll(&mut self) -> Option<ControlEvent> {
        self.try_recv().ok()
    }
}

impl EventSource for tokio::sync::mpsc::Receiver<ControlEvent> {
    fn poll(&mut self) -> Option<ControlEvent> {
        self.try_recv().ok()
    }
}

/// An event source that never produces events.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoEvents;

impl EventSource for NoEvents {
    fn poll(&mut self) -> Option<ControlEvent> {
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_player_event_debug() {
        let event = PlayerEvent::PacketDropped {
            bytes: 417,
            reason: "bad frame header".to_string(),
        };
        let debug = format!("{event:?}");
        assert!(debug.contains("PacketDropped"));
        assert!(debug.contains("417"));
    }

    #[test]
    fn test_event_callback_helper() {
        use std::sync::atomic::{AtomicBool, Ordering};

        let called = Arc::new(AtomicBool::new(false));
        let called_clone = called.clone();

        let callback = event_callback(move |_| {
            called_clone.store(true, Ordering::SeqCst);
        });

        callback(PlayerEvent::EndOfInput);
        assert!(called.load(Ordering::SeqCst));
    }

    #[test]
    fn test_channel_event_source() {
        let (tx, mut rx) = tokio::sync::mpsc::unbounded_channel();
        assert_eq!(rx.poll(), None);

        tx.send(ControlEvent::Quit).unwrap();
        assert_eq!(rx.poll(), Some(ControlEvent::Quit));
        assert_eq!(rx.poll(), None);
    }

    #[test]
    fn test_no_events() {
        assert_eq!(NoEvents.poll(), None);
    }
}
