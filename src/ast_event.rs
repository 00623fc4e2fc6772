
use nom::number::complete::*;
use bitvec::prelude::*;
use ndarray::Array2;
use log::warn;

use super::constants::*;
use super::error::AstEventError;

/*
    Little parsing functions to handle the little-endian header and sample words
 */

fn parse_u16(buffer: &[u8]) -> Result<(&[u8], u16), AstEventError> {
    match le_u16::<&[u8], nom::error::Error<&[u8]>>(buffer) {
        Ok(b) => Ok(b),
        Err(_) => Err(AstEventError::ParsingError)
    }
}

fn parse_u32(buffer: &[u8]) -> Result<(&[u8], u32), AstEventError> {
    match le_u32::<&[u8], nom::error::Error<&[u8]>>(buffer) {
        Ok(b) => Ok(b),
        Err(_) => Err(AstEventError::ParsingError)
    }
}

/// # AstEventHeader
/// The fixed 20 byte header at the front of every event record. Five little-endian
/// 32-bit words: event number + tag (opaque), channel mask, size word, and the two
/// halves of the trigger timestamp. The timestamp halves are widened to u64 before
/// the shift so the combination cannot overflow.
#[derive(Debug, Clone, Default)]
pub struct AstEventHeader {
    pub event_tag: u32,
    pub channel_mask: u32,
    pub size_word: u32,
    pub timestamp: u64
}

impl AstEventHeader {

    pub fn read_from_buffer(buffer: &[u8]) -> Result<(&[u8], AstEventHeader), AstEventError> {
        let mut buf_slice: &[u8] = buffer;
        let mut header = AstEventHeader::default();
        let mut timestamp_high: u32;
        let mut timestamp_low: u32;
        (buf_slice, header.event_tag) = parse_u32(buf_slice)?;
        (buf_slice, header.channel_mask) = parse_u32(buf_slice)?;
        (buf_slice, header.size_word) = parse_u32(buf_slice)?;
        (buf_slice, timestamp_high) = parse_u32(buf_slice)?;
        (buf_slice, timestamp_low) = parse_u32(buf_slice)?;
        header.timestamp = ((timestamp_high as u64) << 32) | (timestamp_low as u64);

        Ok((buf_slice, header))
    }

    pub fn check_header(&self, buffer_length: usize) -> Result<(), AstEventError> {
        if self.channel_mask == 0 {
            return Err(AstEventError::EmptyChannelMask);
        }
        //The external size list is authoritative for reading; the in-band size is a consistency check only
        if self.event_size_bytes() as usize != buffer_length {
            warn!("Event header declares {} bytes but {} were supplied", self.event_size_bytes(), buffer_length);
        }
        Ok(())
    }

    pub fn is_zle(&self) -> bool {
        self.size_word & ZLE_FLAG_MASK != 0
    }

    /// Event size on disk (header plus body) as declared by the DAQ, with the ZLE flag masked off
    pub fn event_size_bytes(&self) -> u32 {
        self.size_word & EVENT_SIZE_MASK
    }

    /// Indices of the channels present in this event, ascending bit order
    pub fn active_channels(&self) -> Vec<usize> {
        self.channel_mask.view_bits::<Lsb0>().iter_ones().collect()
    }
}

/// # AstEvent
/// One decoded event record: the header, the ascending list of active channel indices,
/// and the sample block. The block is channel-major: row i holds the full contiguous
/// waveform of the i-th active channel, one u16 ADC code per sample.
#[derive(Debug)]
pub struct AstEvent {
    pub header: AstEventHeader,
    pub channels: Vec<usize>,
    pub samples: Array2<u16>
}

impl TryFrom<Vec<u8>> for AstEvent {
    type Error = AstEventError;

    fn try_from(buffer: Vec<u8>) -> Result<Self, Self::Error> {
        if buffer.len() < HEADER_SIZE_BYTES {
            return Err(AstEventError::HeaderTooShort(buffer.len()));
        }

        let (payload, header) = AstEventHeader::read_from_buffer(&buffer)?;
        header.check_header(buffer.len())?;

        let channels = header.active_channels();
        if payload.len() % (BYTES_PER_SAMPLE * channels.len()) != 0 {
            return Err(AstEventError::UnalignedPayload(payload.len(), channels.len()));
        }
        let samples_per_channel = payload.len() / BYTES_PER_SAMPLE / channels.len();

        let mut samples = Array2::<u16>::zeros((channels.len(), samples_per_channel));
        let mut buf_slice = payload;
        let mut value: u16;
        for mut row in samples.rows_mut() {
            for sample in row.iter_mut() {
                (buf_slice, value) = parse_u16(buf_slice)?;
                *sample = value;
            }
        }

        Ok(AstEvent { header, channels, samples })
    }
}

impl AstEvent {

    pub fn samples_per_channel(&self) -> usize {
        self.samples.ncols()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn encode_event(event_tag: u32, channel_mask: u32, is_zle: bool, timestamp: u64, rows: &[Vec<u16>]) -> Vec<u8> {
        let body_bytes: usize = rows.iter().map(|row| row.len() * BYTES_PER_SAMPLE).sum();
        let mut size_word = (HEADER_SIZE_BYTES + body_bytes) as u32;
        if is_zle {
            size_word |= ZLE_FLAG_MASK;
        }

        let mut buffer: Vec<u8> = Vec::new();
        buffer.extend(event_tag.to_le_bytes());
        buffer.extend(channel_mask.to_le_bytes());
        buffer.extend(size_word.to_le_bytes());
        buffer.extend(((timestamp >> 32) as u32).to_le_bytes());
        buffer.extend((timestamp as u32).to_le_bytes());
        for row in rows {
            for sample in row {
                buffer.extend(sample.to_le_bytes());
            }
        }
        buffer
    }

    #[test]
    fn decode_recovers_channels_and_samples() {
        let rows = vec![vec![16000u16; 4], vec![15990u16, 15991, 15992, 15993]];
        let buffer = encode_event(42, 0b0101, false, 100, &rows);

        let event = AstEvent::try_from(buffer).unwrap();
        assert_eq!(event.channels, vec![0, 2]);
        assert_eq!(event.samples_per_channel(), 4);
        assert_eq!(event.samples.row(0).to_vec(), rows[0]);
        assert_eq!(event.samples.row(1).to_vec(), rows[1]);
        assert_eq!(event.header.event_tag, 42);
        assert!(!event.header.is_zle());
    }

    #[test]
    fn decode_round_trip_is_bit_exact() {
        let rows = vec![
            vec![1u16, 2, 3, 4, 5],
            vec![16383u16, 0, 8192, 100, 7],
            vec![15990u16, 16000, 16001, 15999, 12345],
        ];
        let timestamp = (7u64 << 32) | 0xDEADBEEFu64;
        let buffer = encode_event(3, 0b1011, false, timestamp, &rows);

        let event = AstEvent::try_from(buffer).unwrap();
        assert_eq!(event.channels, vec![0, 1, 3]);
        assert_eq!(event.header.timestamp, timestamp);
        for (position, row) in rows.iter().enumerate() {
            assert_eq!(event.samples.row(position).to_vec(), *row);
        }
    }

    #[test]
    fn zle_flag_and_size_are_masked_apart() {
        let rows = vec![vec![100u16; 8]];
        let buffer = encode_event(0, 0b1, true, 0, &rows);

        let event = AstEvent::try_from(buffer).unwrap();
        assert!(event.header.is_zle());
        assert_eq!(event.header.event_size_bytes() as usize, HEADER_SIZE_BYTES + 16);
    }

    #[test]
    fn empty_channel_mask_is_rejected() {
        let buffer = encode_event(0, 0, false, 0, &[]);
        assert!(matches!(AstEvent::try_from(buffer), Err(AstEventError::EmptyChannelMask)));
    }

    #[test]
    fn unaligned_payload_is_rejected() {
        //10 samples cannot split evenly over 4 channels
        let mut buffer = encode_event(0, 0b1111, false, 0, &[]);
        buffer.extend([0u8; 20]);
        assert!(matches!(AstEvent::try_from(buffer), Err(AstEventError::UnalignedPayload(20, 4))));
    }

    #[test]
    fn short_buffer_is_rejected() {
        let buffer = vec![0u8; HEADER_SIZE_BYTES - 1];
        assert!(matches!(AstEvent::try_from(buffer), Err(AstEventError::HeaderTooShort(19))));
    }
}
