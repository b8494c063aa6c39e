use crate::hal::CharacterOutput;
use crate::types::{PACKET_LEN, SAMPLE_HIGH_NIBBLE_MASK, Sample12, WINDOW_FLAG_BIT};

/// The two-byte measurement exchanged once per wake cycle.
///
/// Wire layout:
/// - byte 0: sample bits 0..=7
/// - byte 1: bit 7 = window flag, bits 0..=3 = sample bits 8..=11,
///   bits 4..=6 unused (zero)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct MeasurementPacket {
    bytes: [u8; PACKET_LEN],
}

impl MeasurementPacket {
    /// The cleared buffer a sampler cycle starts from.
    pub const EMPTY: Self = Self {
        bytes: [0; PACKET_LEN],
    };

    pub fn pack(sample: Sample12, window_satisfied: bool) -> Self {
        let value = sample.value();
        let mut byte1 = if window_satisfied { WINDOW_FLAG_BIT } else { 0 };
        byte1 |= ((value >> 8) as u8) & SAMPLE_HIGH_NIBBLE_MASK;
        Self {
            bytes: [(value & 0xFF) as u8, byte1],
        }
    }

    /// Wraps raw received bytes. Decoding masks out the unused bits, so any
    /// byte pair is accepted.
    pub const fn from_bytes(bytes: [u8; PACKET_LEN]) -> Self {
        Self { bytes }
    }

    pub const fn to_bytes(self) -> [u8; PACKET_LEN] {
        self.bytes
    }

    pub const fn as_bytes(&self) -> &[u8; PACKET_LEN] {
        &self.bytes
    }

    /// Byte 1 in the high half, byte 0 in the low half.
    pub fn raw_word(&self) -> u16 {
        u16::from_le_bytes(self.bytes)
    }

    pub fn window_satisfied(&self) -> bool {
        (self.raw_word() >> 15) & 0x01 == 1
    }

    pub fn sample(&self) -> Sample12 {
        Sample12::from_masked(self.raw_word())
    }

    /// Unpacks every reported field.
    pub fn report(&self) -> Report {
        Report {
            byte0: self.bytes[0],
            byte1: self.bytes[1],
            raw_word: self.raw_word(),
            window_satisfied: self.window_satisfied(),
            sample: self.sample(),
        }
    }
}

/// The unpacked view of a received packet, as printed by the responder.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Report {
    pub byte0: u8,
    pub byte1: u8,
    pub raw_word: u16,
    pub window_satisfied: bool,
    pub sample: Sample12,
}

impl Report {
    /// Emits one line per field followed by a blank separator line.
    pub fn write_to<O: CharacterOutput + ?Sized>(&self, out: &mut O) {
        out.write_line(format_args!("SPI Byte[1]: 0x{:02X}", self.byte1));
        out.write_line(format_args!("SPI Byte[0]: 0x{:02X}", self.byte0));
        out.write_line(format_args!("Results: 0x{:04X}", self.raw_word));
        out.write_line(format_args!("Window: {}", u8::from(self.window_satisfied)));
        out.write_line(format_args!("ADC: {}", self.sample));
        out.write_line(format_args!(""));
    }
}
