//! Producer loop: demuxed packets in, audio into the queue.

use std::sync::Arc;

use crate::event::EventSource;
use crate::media::{Demuxer, StreamSelection, VideoPath};
use crate::pipeline::PacketQueue;
use crate::session::PlayerState;
use crate::{ControlEvent, EventCallback, PlayerError, PlayerEvent, QueueError, ShutdownSignal};

/// Why the producer loop returned.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProducerExit {
    /// The demuxer ran out of packets.
    EndOfInput,
    /// The event source delivered a quit; this loop set the shutdown signal.
    Quit,
    /// The shutdown signal was set by someone else.
    Shutdown,
}

/// What the producer loop did before returning.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ProducerSummary {
    /// Why the loop ended.
    pub exit: ProducerExit,
    /// Audio packets handed to the queue.
    pub audio_packets: u64,
    /// Video packets handed to the video path.
    pub video_packets: u64,
    /// Packets that belonged to no selected stream, or were rejected.
    pub discarded_packets: u64,
}

/// Reads packets from a demuxer and routes them by stream.
///
/// Audio packets for the selected stream move into the [`PacketQueue`];
/// video packets go to the [`VideoPath`] if one is attached; everything else
/// is dropped. The event source is polled after every packet.
pub struct ProducerLoop<E> {
    queue: PacketQueue,
    shutdown: ShutdownSignal,
    selection: StreamSelection,
    events: E,
    video: Option<Box<dyn VideoPath>>,
    state: Arc<PlayerState>,
    event_callback: Option<EventCallback>,
}

impl<E: EventSource> ProducerLoop<E> {
    /// Creates a producer feeding `queue` for the selected streams.
    pub fn new(
        queue: PacketQueue,
        shutdown: ShutdownSignal,
        selection: StreamSelection,
        events: E,
    ) -> Self {
        Self {
            queue,
            shutdown,
            selection,
            events,
            video: None,
            state: Arc::new(PlayerState::new()),
            event_callback: None,
        }
    }

    /// Attaches a receiver for video packets.
    #[must_use]
    pub fn with_video_path(mut self, video: impl VideoPath + 'static) -> Self {
        self.video = Some(Box::new(video));
        self
    }

    /// Sets the event callback.
    #[must_use]
    pub fn with_event_callback(mut self, callback: EventCallback) -> Self {
        self.event_callback = Some(callback);
        self
    }

    pub(crate) fn with_state(mut self, state: Arc<PlayerState>) -> Self {
        self.state = state;
        self
    }

    pub(crate) fn set_video_path(&mut self, video: Option<Box<dyn VideoPath>>) {
        self.video = video;
    }

    fn emit_event(&self, event: PlayerEvent) {
        if let Some(ref callback) = self.event_callback {
            callback(event);
        }
    }

    /// Runs until end of input, a quit event, or shutdown.
    ///
    /// # Errors
    ///
    /// Returns [`PlayerError::Demux`] if the demuxer fails to read.
    pub fn run<D: Demuxer + ?Sized>(
        &mut self,
        demuxer: &mut D,
    ) -> Result<ProducerSummary, PlayerError> {
        let mut summary = ProducerSummary {
            exit: ProducerExit::EndOfInput,
            audio_packets: 0,
            video_packets: 0,
            discarded_packets: 0,
        };

        loop {
            if self.shutdown.is_triggered() {
                summary.exit = ProducerExit::Shutdown;
                break;
            }

            let Some(packet) = demuxer.next_unit()? else {
                tracing::debug!("end of input");
                self.emit_event(PlayerEvent::EndOfInput);
                summary.exit = ProducerExit::EndOfInput;
                break;
            };

            if packet.stream_index == self.selection.audio {
                match self.queue.push(packet) {
                    Ok(()) => {
                        summary.audio_packets += 1;
                        self.state.record_audio_packet();
                    }
                    Err(e) => self.reject(&mut summary, e),
                }
            } else if Some(packet.stream_index) == self.selection.video {
                if let Some(video) = self.video.as_mut() {
                    video.present(packet);
                    summary.video_packets += 1;
                    self.state.record_video_packet();
                } else {
                    summary.discarded_packets += 1;
                    self.state.record_discarded();
                }
            } else {
                tracing::trace!(stream = packet.stream_index, "discarding packet");
                summary.discarded_packets += 1;
                self.state.record_discarded();
            }

            if self.poll_quit() {
                summary.exit = ProducerExit::Quit;
                break;
            }
        }

        tracing::debug!(?summary, "producer finished");
        Ok(summary)
    }

    fn poll_quit(&mut self) -> bool {
        if let Some(ControlEvent::Quit) = self.events.poll() {
            if self.shutdown.trigger() {
                self.emit_event(PlayerEvent::ShutdownRequested);
            }
            return true;
        }
        false
    }

    fn reject(&self, summary: &mut ProducerSummary, error: QueueError) {
        tracing::warn!(%error, "audio packet not queued");
        let packet = error.into_packet();
        summary.discarded_packets += 1;
        self.state.record_rejected();
        self.emit_event(PlayerEvent::QueueRejected {
            stream_index: packet.stream_index,
            bytes: packet.len(),
        });
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::event::NoEvents;
    use crate::media::mock::MockDemuxer;
    use crate::media::{select_streams, StreamInfo};
    use crate::{Packet, Pop};
    use parking_lot::Mutex;

    fn streams() -> Vec<StreamInfo> {
        vec![
            StreamInfo::video(0),
            StreamInfo::audio(1, 44100, 2),
            StreamInfo::other(2),
        ]
    }

    fn producer<E: EventSource>(events: E) -> (ProducerLoop<E>, PacketQueue, ShutdownSignal) {
        let shutdown = ShutdownSignal::new();
        let queue = PacketQueue::new(shutdown.clone());
        let selection = select_streams(&streams()).unwrap();
        let producer = ProducerLoop::new(queue.clone(), shutdown.clone(), selection, events);
        (producer, queue, shutdown)
    }

    #[test]
    fn test_routes_packets_by_stream() {
        let mut demuxer = MockDemuxer::new(streams());
        demuxer
            .add_packet(Packet::new(0, vec![0; 10]))
            .add_packet(Packet::new(1, vec![1; 20]))
            .add_packet(Packet::new(2, vec![2; 30]))
            .add_packet(Packet::new(1, vec![3; 40]));

        let presented = Arc::new(Mutex::new(Vec::new()));
        let sink = Arc::clone(&presented);
        let (producer, queue, _shutdown) = producer(NoEvents);
        let mut producer =
            producer.with_video_path(move |p: Packet| sink.lock().push(p.len()));

        let summary = producer.run(&mut demuxer).unwrap();

        assert_eq!(summary.exit, ProducerExit::EndOfInput);
        assert_eq!(summary.audio_packets, 2);
        assert_eq!(summary.video_packets, 1);
        assert_eq!(summary.discarded_packets, 1);
        assert_eq!(*presented.lock(), vec![10]);
        assert_eq!(queue.size_bytes(), 60);
        assert!(matches!(queue.pop(false), Pop::Packet(p) if p.data[0] == 1));
        assert!(matches!(queue.pop(false), Pop::Packet(p) if p.data[0] == 3));
    }

    #[test]
    fn test_video_discarded_without_path() {
        let mut demuxer = MockDemuxer::new(streams());
        demuxer.add_packet(Packet::new(0, vec![0; 10]));

        let (mut producer, queue, _shutdown) = producer(NoEvents);
        let summary = producer.run(&mut demuxer).unwrap();

        assert_eq!(summary.video_packets, 0);
        assert_eq!(summary.discarded_packets, 1);
        assert!(queue.is_empty());
    }

    #[test]
    fn test_quit_sets_shutdown_once() {
        let mut demuxer = MockDemuxer::new(streams());
        demuxer
            .add_packet(Packet::new(1, vec![1; 4]))
            .add_packet(Packet::new(1, vec![2; 4]));

        let (tx, rx) = tokio::sync::mpsc::unbounded_channel();
        tx.send(ControlEvent::Quit).unwrap();
        tx.send(ControlEvent::Quit).unwrap();

        let requests = Arc::new(Mutex::new(0));
        let counter = Arc::clone(&requests);
        let (producer, queue, shutdown) = producer(rx);
        let mut producer = producer.with_event_callback(crate::event_callback(move |event| {
            if matches!(event, PlayerEvent::ShutdownRequested) {
                *counter.lock() += 1;
            }
        }));

        let summary = producer.run(&mut demuxer).unwrap();

        assert_eq!(summary.exit, ProducerExit::Quit);
        assert_eq!(summary.audio_packets, 1);
        assert!(shutdown.is_triggered());
        assert_eq!(*requests.lock(), 1);
        assert_eq!(queue.len(), 1);
        assert_eq!(demuxer.remaining(), 1);
    }

    #[test]
    fn test_quit_after_end_of_input_is_rejected() {
        let mut demuxer = MockDemuxer::new(streams());
        demuxer.add_packet(Packet::new(1, vec![1; 4]));

        let (tx, rx) = tokio::sync::mpsc::unbounded_channel();
        let (mut producer, _queue, shutdown) = producer(rx);
        let summary = producer.run(&mut demuxer).unwrap();
        drop(producer);

        assert_eq!(summary.exit, ProducerExit::EndOfInput);
        assert!(tx.send(ControlEvent::Quit).is_err());
        assert!(!shutdown.is_triggered());
    }

    #[test]
    fn test_external_shutdown_stops_loop() {
        let mut demuxer = MockDemuxer::new(streams());
        demuxer.add_packet(Packet::new(1, vec![1; 4]));

        let (mut producer, _queue, shutdown) = producer(NoEvents);
        shutdown.trigger();

        let summary = producer.run(&mut demuxer).unwrap();
        assert_eq!(summary.exit, ProducerExit::Shutdown);
        assert_eq!(demuxer.remaining(), 1);
    }

    #[test]
    fn test_demux_error_propagates() {
        let mut demuxer = MockDemuxer::new(streams());
        demuxer.add_error("bad box");

        let (mut producer, _queue, _shutdown) = producer(NoEvents);
        assert!(matches!(
            producer.run(&mut demuxer),
            Err(PlayerError::Demux(_))
        ));
    }
}
