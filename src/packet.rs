//! Compressed packet with stream metadata.

/// One unit of codec-compressed data belonging to a single elementary stream.
///
/// A `Packet` has exactly one owner at a time: the producer while reading,
/// the [`PacketQueue`](crate::PacketQueue) while enqueued, the
/// [`AudioDecoder`](crate::AudioDecoder) while being consumed. Queuing moves
/// the packet; nothing is copied or shared.
///
/// # Example
///
/// ```
/// use stream_player::Packet;
///
/// let packet = Packet::new(1, vec![0u8; 417]).with_pts(9000);
/// assert_eq!(packet.len(), 417);
/// assert_eq!(packet.pts, Some(9000));
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Packet {
    /// Index of the stream this packet belongs to.
    pub stream_index: usize,

    /// Compressed payload.
    pub data: Vec<u8>,

    /// Presentation timestamp in stream time base units, if the container
    /// provides one. Carried through but not interpreted.
    pub pts: Option<i64>,
}

impl Packet {
    /// Creates a new packet for the given stream.
    pub fn new(stream_index: usize, data: Vec<u8>) -> Self {
        Self {
            stream_index,
            data,
            pts: None,
        }
    }

    /// Sets the presentation timestamp.
    #[must_use]
    pub fn with_pts(mut self, pts: i64) -> Self {
        self.pts = Some(pts);
        self
    }

    /// Returns the payload size in bytes.
    pub fn len(&self) -> usize {
        self.data.len()
    }

    /// Returns `true` if the payload is empty.
    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_packet_len() {
        let packet = Packet::new(0, vec![1, 2, 3]);
        assert_eq!(packet.len(), 3);
        assert!(!packet.is_empty());
        assert_eq!(packet.pts, None);
    }

    #[test]
    fn test_empty_packet() {
        let packet = Packet::new(2, Vec::new());
        assert!(packet.is_empty());
        assert_eq!(packet.len(), 0);
    }
}
