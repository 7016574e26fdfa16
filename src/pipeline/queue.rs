//! Thread-safe FIFO of compressed packets between the producer and the
//! audio thread.

use std::collections::VecDeque;
use std::sync::{Arc, Weak};

use parking_lot::{Condvar, Mutex};

use crate::shutdown::{ShutdownListener, ShutdownSignal};
use crate::{Packet, QueueError, QueueLimit};

/// Outcome of [`PacketQueue::pop`].
#[derive(Debug, PartialEq, Eq)]
pub enum Pop {
    /// The head packet; ownership moves to the caller.
    Packet(Packet),
    /// The queue was empty and the caller asked not to wait.
    Empty,
    /// Shutdown has been signalled. No further packets will be handed out.
    Terminated,
}

struct QueueState {
    packets: VecDeque<Packet>,
    size_bytes: usize,
}

struct Shared {
    state: Mutex<QueueState>,
    /// Signalled when a packet is pushed, and on shutdown.
    available: Condvar,
    /// Signalled when a packet is popped, and on shutdown (bounded mode).
    space: Condvar,
    limit: QueueLimit,
    shutdown: ShutdownSignal,
}

impl ShutdownListener for Shared {
    fn on_shutdown(&self) {
        // Taking the lock orders this wake-up after any waiter's flag check.
        let _state = self.state.lock();
        self.available.notify_all();
        self.space.notify_all();
    }
}

/// Packet queue shared between the producer loop and the audio decoder.
///
/// Cloning yields another handle to the same queue. The running byte total
/// always equals the sum of the lengths of the queued packets; both are only
/// touched under the queue's mutex.
///
/// # Example
///
/// ```
/// use stream_player::{Packet, PacketQueue, Pop, ShutdownSignal};
///
/// let queue = PacketQueue::new(ShutdownSignal::new());
/// queue.push(Packet::new(1, vec![0u8; 100])).unwrap();
/// queue.push(Packet::new(1, vec![0u8; 50])).unwrap();
/// assert_eq!(queue.size_bytes(), 150);
///
/// assert!(matches!(queue.pop(true), Pop::Packet(p) if p.len() == 100));
/// assert_eq!(queue.size_bytes(), 50);
/// ```
#[derive(Clone)]
pub struct PacketQueue {
    shared: Arc<Shared>,
}

impl PacketQueue {
    /// Creates an unbounded queue observing `shutdown`.
    pub fn new(shutdown: ShutdownSignal) -> Self {
        Self::with_limit(shutdown, QueueLimit::Unbounded)
    }

    /// Creates a queue with the given byte limit observing `shutdown`.
    pub fn with_limit(shutdown: ShutdownSignal, limit: QueueLimit) -> Self {
        let shared = Arc::new(Shared {
            state: Mutex::new(QueueState {
                packets: VecDeque::new(),
                size_bytes: 0,
            }),
            available: Condvar::new(),
            space: Condvar::new(),
            limit,
            shutdown: shutdown.clone(),
        });

        let listener: Weak<dyn ShutdownListener> = Arc::downgrade(&shared) as _;
        shutdown.register(listener);

        Self { shared }
    }

    /// Appends a packet to the tail and wakes one waiting consumer.
    ///
    /// In an unbounded queue this never waits. In a bounded queue it waits
    /// for room, and hands the packet back as [`QueueError::Terminated`] if
    /// shutdown arrives first.
    ///
    /// # Errors
    ///
    /// Returns the packet inside the error if it could not be queued.
    pub fn push(&self, packet: Packet) -> Result<(), QueueError> {
        let mut state = self.shared.state.lock();

        while !self.has_room(&state, packet.len()) {
            if self.shared.shutdown.is_triggered() {
                return Err(QueueError::Terminated(packet));
            }
            self.shared.space.wait(&mut state);
        }

        Self::enqueue(&mut state, packet)?;
        self.shared.available.notify_one();
        Ok(())
    }

    /// Appends a packet without ever waiting.
    ///
    /// # Errors
    ///
    /// Returns [`QueueError::Full`] with the packet if a bounded queue has no
    /// room for it.
    pub fn try_push(&self, packet: Packet) -> Result<(), QueueError> {
        let mut state = self.shared.state.lock();

        if !self.has_room(&state, packet.len()) {
            return Err(QueueError::Full(packet));
        }

        Self::enqueue(&mut state, packet)?;
        self.shared.available.notify_one();
        Ok(())
    }

    /// Removes the head packet.
    ///
    /// With `block` set, an empty queue suspends the caller until a packet is
    /// pushed or shutdown is signalled. The signal is checked on every pass of
    /// the wait loop, before the queue contents, so once it is set the queue
    /// reports [`Pop::Terminated`] even if packets remain.
    pub fn pop(&self, block: bool) -> Pop {
        let mut state = self.shared.state.lock();

        loop {
            if self.shared.shutdown.is_triggered() {
                return Pop::Terminated;
            }

            if let Some(packet) = state.packets.pop_front() {
                state.size_bytes -= packet.len();
                self.shared.space.notify_one();
                return Pop::Packet(packet);
            }

            if !block {
                return Pop::Empty;
            }

            self.shared.available.wait(&mut state);
        }
    }

    /// Returns the number of queued packets.
    pub fn len(&self) -> usize {
        self.shared.state.lock().packets.len()
    }

    /// Returns `true` if no packets are queued.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Returns the total payload bytes currently queued.
    pub fn size_bytes(&self) -> usize {
        self.shared.state.lock().size_bytes
    }

    /// Returns the configured byte limit.
    pub fn limit(&self) -> QueueLimit {
        self.shared.limit
    }

    fn has_room(&self, state: &QueueState, incoming: usize) -> bool {
        match self.shared.limit {
            QueueLimit::Unbounded => true,
            QueueLimit::Bounded { max_bytes } => {
                state.packets.is_empty() || state.size_bytes + incoming <= max_bytes
            }
        }
    }

    fn enqueue(state: &mut QueueState, packet: Packet) -> Result<(), QueueError> {
        if state.packets.try_reserve(1).is_err() {
            return Err(QueueError::AllocationFailed(packet));
        }
        state.size_bytes += packet.len();
        state.packets.push_back(packet);
        Ok(())
    }
}

impl std::fmt::Debug for PacketQueue {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let state = self.shared.state.lock();
        f.debug_struct("PacketQueue")
            .field("packets", &state.packets.len())
            .field("size_bytes", &state.size_bytes)
            .field("limit", &self.shared.limit)
            .finish()
    }
}
