use crate::color::RgbTriple;

/// ASCII protocol tag opening every frame
pub const PROTOCOL_NAME: &[u8; 9] = b"HueStream";
/// Streaming API version 1.0
pub const API_VERSION: [u8; 2] = [0x01, 0x00];
/// Color space selector for RGB frames
pub const COLOR_SPACE_RGB: u8 = 0x00;
/// Record type byte for a light
const DEVICE_TYPE_LIGHT: u8 = 0x00;

pub const HEADER_LEN: usize = 16;
pub const RECORD_LEN: usize = 9;

/// One streaming frame: the color of every light for a single tick.
///
/// Format (all integers big-endian):
/// - 16-byte header:
///   - 9 bytes: "HueStream"
///   - 2 bytes: API version (0x01, 0x00)
///   - 1 byte:  sequence number (ignored by the bridge)
///   - 2 bytes: reserved (0x00, 0x00)
///   - 1 byte:  color space (0x00 = RGB)
///   - 1 byte:  reserved (0x00)
/// - N x 9-byte light records:
///   - 1 byte:  device type (0x00 = light)
///   - 2 bytes: light id
///   - 6 bytes: red, green, blue as 16-bit values
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct StreamMessage {
    entries: Vec<(u16, RgbTriple)>,
}

impl StreamMessage {
    pub fn new() -> Self {
        Self::default()
    }

    /// Set a light's color. Re-adding an id replaces its color but keeps the
    /// position of its first insertion.
    pub fn add(&mut self, light_id: u16, rgb: RgbTriple) {
        match self.entries.iter_mut().find(|(id, _)| *id == light_id) {
            Some(entry) => entry.1 = rgb,
            None => self.entries.push((light_id, rgb)),
        }
    }

    pub fn get(&self, light_id: u16) -> Option<RgbTriple> {
        self.entries
            .iter()
            .find(|(id, _)| *id == light_id)
            .map(|(_, rgb)| *rgb)
    }

    pub fn entries(&self) -> &[(u16, RgbTriple)] {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Encode with a zero sequence byte
    pub fn to_bytes(&self) -> Vec<u8> {
        self.encode(0)
    }

    /// Encode with an explicit sequence byte
    pub fn encode(&self, sequence: u8) -> Vec<u8> {
        let mut buffer = Vec::with_capacity(HEADER_LEN + self.entries.len() * RECORD_LEN);

        buffer.extend_from_slice(PROTOCOL_NAME);
        buffer.extend_from_slice(&API_VERSION);
        buffer.push(sequence);
        buffer.extend_from_slice(&[0x00, 0x00]);
        buffer.push(COLOR_SPACE_RGB);
        buffer.push(0x00);

        // Insertion order, not sorted by id
        for (id, (r, g, b)) in &self.entries {
            buffer.push(DEVICE_TYPE_LIGHT);
            buffer.extend_from_slice(&id.to_be_bytes());
            buffer.extend_from_slice(&r.to_be_bytes());
            buffer.extend_from_slice(&g.to_be_bytes());
            buffer.extend_from_slice(&b.to_be_bytes());
        }

        buffer
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_header_layout() {
        let bytes = StreamMessage::new().to_bytes();
        assert_eq!(bytes.len(), HEADER_LEN);
        assert!(bytes.starts_with(b"HueStream"));
        assert_eq!(&bytes[9..11], &[0x01, 0x00]);
        assert_eq!(bytes[11], 0);
        assert_eq!(&bytes[12..16], &[0, 0, 0, 0]);
    }

    #[test]
    fn test_sequence_byte() {
        let bytes = StreamMessage::new().encode(0xAB);
        assert_eq!(bytes[11], 0xAB);
        assert_eq!(&bytes[..11], &StreamMessage::new().to_bytes()[..11]);
    }

    #[test]
    fn test_single_light_record() {
        let mut msg = StreamMessage::new();
        msg.add(5, (9865, 2048, 29398));
        let bytes = msg.to_bytes();
        assert_eq!(bytes.len(), HEADER_LEN + RECORD_LEN);
        assert!(bytes.ends_with(&[0x00, 0x00, 0x05, 0x26, 0x89, 0x08, 0x00, 0x72, 0xD6]));
    }

    #[test]
    fn test_records_in_insertion_order() {
        let mut msg = StreamMessage::new();
        msg.add(23, (9993, 2048, 29398));
        msg.add(9, (16, 255, 16385));
        let bytes = msg.to_bytes();

        assert_eq!(
            &bytes[HEADER_LEN..],
            &[
                0x00, 0x00, 0x17, 0x27, 0x09, 0x08, 0x00, 0x72, 0xD6, // light 23
                0x00, 0x00, 0x09, 0x00, 0x10, 0x00, 0xFF, 0x40, 0x01, // light 9
            ]
        );
    }

    #[test]
    fn test_last_add_wins() {
        let mut msg = StreamMessage::new();
        msg.add(1, (1, 1, 1));
        msg.add(2, (2, 2, 2));
        msg.add(1, (3, 3, 3));

        assert_eq!(msg.len(), 2);
        assert_eq!(msg.get(1), Some((3, 3, 3)));
        assert_eq!(msg.entries()[0].0, 1);
    }

    #[test]
    fn test_encoding_is_deterministic() {
        let mut msg = StreamMessage::new();
        msg.add(7, (100, 200, 300));
        assert_eq!(msg.to_bytes(), msg.clone().to_bytes());
    }
}
