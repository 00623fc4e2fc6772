use std::fs::File;
use std::io::{BufReader, Read};
use std::path::Path;

use super::ast_event::AstEvent;
use super::error::AstFileError;

const DEFAULT_BUFFER_SIZE: usize = 1_000_000; // 1MB buffer per file?

/// # AstFile
/// Sequential reader for one .ast run file. Event records carry no authoritative
/// in-band framing, so the reader is driven by the per-event byte sizes from the
/// run metadata: each call reads exactly the next size entry and decodes it.
/// Events come back in file order; on success the total bytes consumed equals the
/// sum of the size list. Re-reading a run from the start means constructing a new
/// AstFile.
#[derive(Debug)]
pub struct AstFile {
    file_handle: BufReader<File>,
    event_sizes: Vec<usize>,
    next_index: usize,
    bytes_read: u64,
    is_eof: bool
}

impl AstFile {

    pub fn new(path: &Path, event_sizes: &[usize]) -> Result<Self, AstFileError> {
        if !path.exists() {
            return Err(AstFileError::BadFilePath(path.to_path_buf()));
        }

        let file = File::open(path)?;
        let handle = BufReader::with_capacity(DEFAULT_BUFFER_SIZE, file);

        Ok(AstFile { file_handle: handle, event_sizes: event_sizes.to_vec(), next_index: 0, bytes_read: 0, is_eof: false })
    }

    /// Read and decode the next event record. Returns None once the size list is
    /// exhausted. A short read is a hard error; a run with fewer bytes than its
    /// metadata promises is not usable.
    pub fn get_next_event(&mut self) -> Result<Option<AstEvent>, AstFileError> {
        if self.next_index == self.event_sizes.len() {
            self.is_eof = true;
            return Ok(None);
        }

        let read_size = self.event_sizes[self.next_index];
        let mut event_word: Vec<u8> = vec![0; read_size];
        match self.file_handle.read_exact(&mut event_word) {
            Err(e) => match e.kind() {
                std::io::ErrorKind::UnexpectedEof => {
                    self.is_eof = true;
                    return Err(AstFileError::TruncatedStream(self.next_index, self.bytes_read, read_size));
                },
                _ => {
                    return Err(AstFileError::IOError(e));
                }
            }
            Ok(()) => ()
        }

        match AstEvent::try_from(event_word) {
            Ok(event) => {
                self.bytes_read += read_size as u64;
                self.next_index += 1;
                Ok(Some(event))
            }
            Err(e) => Err(AstFileError::BadEvent(self.next_index, self.bytes_read, e))
        }
    }

    pub fn total_size_bytes(&self) -> u64 {
        self.event_sizes.iter().map(|size| *size as u64).sum()
    }

    #[allow(dead_code)]
    pub fn is_eof(&self) -> &bool {
        &self.is_eof
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::env;
    use std::io::Write;

    use crate::constants::HEADER_SIZE_BYTES;

    fn encode_event(channel_mask: u32, samples: &[u16]) -> Vec<u8> {
        let size_word = (HEADER_SIZE_BYTES + samples.len() * 2) as u32;
        let mut buffer: Vec<u8> = Vec::new();
        buffer.extend(0u32.to_le_bytes());
        buffer.extend(channel_mask.to_le_bytes());
        buffer.extend(size_word.to_le_bytes());
        buffer.extend(0u32.to_le_bytes());
        buffer.extend(0u32.to_le_bytes());
        for sample in samples {
            buffer.extend(sample.to_le_bytes());
        }
        buffer
    }

    fn write_run_file(name: &str, events: &[Vec<u8>]) -> std::path::PathBuf {
        let path = env::temp_dir().join(name);
        let mut file = File::create(&path).unwrap();
        for event in events {
            file.write_all(event).unwrap();
        }
        path
    }

    #[test]
    fn events_are_read_in_file_order() {
        let first = encode_event(0b1, &[1, 2, 3, 4]);
        let second = encode_event(0b1, &[5, 6]);
        let sizes = vec![first.len(), second.len()];
        let path = write_run_file("noise_monitor_order_test.ast", &[first, second]);

        let mut file = AstFile::new(&path, &sizes).unwrap();
        let event = file.get_next_event().unwrap().unwrap();
        assert_eq!(event.samples.row(0).to_vec(), vec![1, 2, 3, 4]);
        let event = file.get_next_event().unwrap().unwrap();
        assert_eq!(event.samples.row(0).to_vec(), vec![5, 6]);
        assert!(file.get_next_event().unwrap().is_none());
        assert!(*file.is_eof());

        std::fs::remove_file(path).unwrap();
    }

    #[test]
    fn short_read_is_a_truncated_stream() {
        let first = encode_event(0b1, &[1, 2]);
        let sizes = vec![first.len(), first.len()];
        let path = write_run_file("noise_monitor_truncated_test.ast", &[first]);

        let mut file = AstFile::new(&path, &sizes).unwrap();
        assert!(file.get_next_event().unwrap().is_some());
        assert!(matches!(
            file.get_next_event(),
            Err(AstFileError::TruncatedStream(1, offset, _)) if offset == 24
        ));

        std::fs::remove_file(path).unwrap();
    }

    #[test]
    fn missing_file_is_rejected() {
        let path = env::temp_dir().join("noise_monitor_no_such_file.ast");
        assert!(matches!(AstFile::new(&path, &[]), Err(AstFileError::BadFilePath(_))));
    }
}
