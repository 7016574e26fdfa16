//! Playback pipeline components.
//!
//! The pipeline bridges the demux thread and the audio device thread:
//!
//! ```text
//! Demuxer → Producer Loop → Packet Queue → Audio Decoder → Audio Callback → Device
//! ```
//!
//! - **Producer Loop**: Routes audio packets into the queue, watches for quit
//! - **Packet Queue**: Mutex + condvar FIFO, the only state shared by both threads
//! - **Audio Decoder**: Pulls packets on demand, carries partly decoded input
//! - **Audio Callback**: Delivers exactly what the device asks for, silence on underrun
//!
//! The two threads meet only at the queue and the shutdown signal.

mod callback;
mod decoder;
mod producer;
mod queue;

pub use callback::AudioCallback;
pub use decoder::{AudioDecoder, DecodeStatus};
pub use producer::{ProducerExit, ProducerLoop, ProducerSummary};
pub use queue::{PacketQueue, Pop};
