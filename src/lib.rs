//! # stream-player
//!
//! **Note:** This crate is under active development. The API may change before 1.0.
//!
//! Packet queue and pull-based audio callback for a demux/decode media player.
//!
//! `stream-player` connects a demuxer running on one thread to an audio
//! device that pulls PCM on its own real-time thread. Compressed audio
//! packets cross over through a thread-safe queue; the device callback
//! decodes them on demand and always hands the device exactly the number of
//! bytes it asked for, substituting silence when nothing is available.
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use stream_player::{ControlEvent, Player};
//! use tokio::sync::mpsc;
//!
//! let (quit_tx, quit_rx) = mpsc::unbounded_channel();
//!
//! let mut session = Player::builder()
//!     .on_event(|e| tracing::warn!(?e, "player event"))
//!     .start(demuxer, codec, quit_rx)
//!     .await?;
//!
//! // Input runs out, or somebody sends ControlEvent::Quit
//! session.wait_for_producer().await?;
//! session.stop().await?;
//! ```
//!
//! ## Architecture
//!
//! The crate maintains a strict thread boundary:
//!
//! - **Producer Thread**: Reads packets from the demuxer and queues audio
//! - **Packet Queue**: Mutex + condvar FIFO, the only shared mutable state
//! - **CPAL Thread**: Device callback that decodes on demand and fills buffers
//!
//! A one-shot [`ShutdownSignal`] releases both threads, including one parked
//! waiting for the next packet.

#![warn(missing_docs)]
// Audio code requires intentional numeric casts between sample formats
#![allow(
    clippy::cast_precision_loss,
    clippy::cast_possible_truncation,
    clippy::cast_sign_loss,
    clippy::cast_possible_wrap,
    clippy::cast_lossless
)]
#![cfg_attr(test, allow(clippy::unwrap_used, clippy::expect_used))]
// These doc lints are too strict for internal implementation details
#![allow(clippy::missing_panics_doc, clippy::missing_errors_doc)]

mod builder;
mod config;
mod context;
mod error;
mod event;
pub mod format;
pub mod media;
pub mod output;
mod packet;
mod pipeline;
mod session;
mod shutdown;

pub use builder::{Player, PlayerBuilder};
pub use config::{
    OutputFormat, PlayerConfig, QueueLimit, RetrievalMode, SilencePolicy,
    DEFAULT_AUDIO_BUFFER_SAMPLES, DEFAULT_MAX_AUDIO_FRAME_SIZE, DEFAULT_SILENCE_BLOCK_BYTES,
};
pub use context::PlayerContext;
pub use error::{CodecError, DemuxError, PlayerError, QueueError};
pub use event::{event_callback, ControlEvent, EventCallback, EventSource, NoEvents, PlayerEvent};
pub use output::{default_output_device_name, list_output_devices, AudioOutput, PlaybackStream};
pub use packet::Packet;
pub use pipeline::{
    AudioCallback, AudioDecoder, DecodeStatus, PacketQueue, Pop, ProducerExit, ProducerLoop,
    ProducerSummary,
};
pub use session::{PlayerStats, Session};
pub use shutdown::ShutdownSignal;
