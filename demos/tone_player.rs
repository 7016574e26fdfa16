//! Tone playback example.
//!
//! Plays a 440Hz tone through the default output device, with a fake video
//! stream interleaved to show packet routing.
//!
//! Run with: cargo run --example tone_player
//! Quit early by passing a duration in seconds: cargo run --example tone_player -- 1

use std::time::Duration;

use stream_player::media::mock::{tone_pcm, MockDemuxer, PassthroughCodec};
use stream_player::media::StreamInfo;
use stream_player::{
    ControlEvent, OutputFormat, Packet, Player, PlayerConfig, PlayerEvent, QueueLimit,
};
use tokio::sync::mpsc;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env().add_directive("stream_player=debug".parse()?))
        .init();

    let quit_after = std::env::args()
        .nth(1)
        .and_then(|s| s.parse::<u64>().ok())
        .map(Duration::from_secs);

    let format = OutputFormat {
        sample_rate: 44100,
        channels: 2,
    };
    let pcm = tone_pcm(format, 440.0, 3000);

    let mut demuxer = MockDemuxer::new(vec![
        StreamInfo::video(0),
        StreamInfo::audio(1, format.sample_rate, format.channels),
    ]);
    for (i, chunk) in pcm.chunks(4096).enumerate() {
        demuxer.add_packet(Packet::new(0, vec![0; 128]).with_pts(i as i64));
        demuxer.add_packet(Packet::new(1, chunk.to_vec()).with_pts(i as i64));
    }

    let (quit_tx, quit_rx) = mpsc::unbounded_channel();

    println!("Playing 3 seconds of 440Hz...");

    // Keep about a quarter second queued so the producer keeps polling for quit
    let mut session = Player::builder()
        .with_config(PlayerConfig {
            queue_limit: QueueLimit::Bounded {
                max_bytes: 44100 / 4 * format.bytes_per_frame(),
            },
            ..Default::default()
        })
        .video_path(|packet: Packet| tracing::trace!(pts = ?packet.pts, "video frame"))
        .on_event(|event| match event {
            PlayerEvent::PacketDropped { .. } | PlayerEvent::DeviceError { .. } => {
                tracing::warn!(?event, "player event");
            }
            _ => tracing::debug!(?event, "player event"),
        })
        .start(demuxer, PassthroughCodec::new(), quit_rx)
        .await?;

    if let Some(delay) = quit_after {
        tokio::time::sleep(delay).await;
        // The producer drops its receiver once input runs out
        if quit_tx.send(ControlEvent::Quit).is_err() {
            println!("Playback already finished");
        }
    }

    let summary = session.wait_for_producer().await?;
    println!("Producer finished: {summary:?}");

    session.wait_until_drained(Duration::from_millis(50)).await;
    // Let the device play out its last buffer
    tokio::time::sleep(Duration::from_millis(200)).await;

    let stats = session.stats();
    session.stop().await?;

    println!("Stats: {stats:?}");
    Ok(())
}
