//! Fully-buffered read payload shared by every backend.
//!
//! Read-mode opens pull the whole file into memory once; every subsequent
//! operation is a memory copy against that buffer. The cursor is an explicit
//! two-state enum: `Active(pos)` for positions `0..=len`, and `PastEnd` for
//! the size+1 sentinel a failed read leaves behind. End-of-file reports true
//! only in `PastEnd`, so a reader positioned exactly at the end has not hit
//! EOF until it actually attempts a read.

use crate::error::{Result, VfsError};
use crate::mode::Whence;
use crate::scan::{scan_bytes, ScanValue};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Cursor {
    Active(usize),
    PastEnd,
}

/// In-memory contents of one read-mode file.
#[derive(Debug)]
pub struct ReadBuffer {
    data: Vec<u8>,
    cursor: Cursor,
    /// A pushback is pending; cleared by any forward read or reposition.
    pushed_back: bool,
}

impl ReadBuffer {
    pub fn new(data: Vec<u8>) -> Self {
        ReadBuffer {
            data,
            cursor: Cursor::Active(0),
            pushed_back: false,
        }
    }

    /// Total buffer size in bytes.
    pub fn len(&self) -> usize {
        self.data.len()
    }

    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    /// Borrow the raw contents, ignoring the cursor.
    pub fn bytes(&self) -> &[u8] {
        &self.data
    }

    /// Read up to `count` elements of `size` bytes into `out`.
    ///
    /// Returns the number of complete elements copied. An element is never
    /// partially filled: if fewer than `size` bytes remain, the read stops,
    /// the cursor moves to the past-end sentinel, and the count of elements
    /// already copied is returned. `size == 1` merges the request into a
    /// single `count`-byte element, so a short tail yields 0 rather than a
    /// partial byte count, and a full read yields `count`.
    pub fn read_elements(&mut self, out: &mut [u8], size: usize, count: usize) -> usize {
        let (size, count, merged) = if size == 1 {
            (count, 1, true)
        } else {
            (size, count, false)
        };
        if size == 0 || count == 0 {
            return 0;
        }
        debug_assert!(out.len() >= size * count);

        for i in 0..count {
            let pos = match self.cursor {
                Cursor::Active(p) => p,
                Cursor::PastEnd => return if merged { 0 } else { i },
            };
            if self.data.len() - pos < size {
                self.cursor = Cursor::PastEnd;
                self.pushed_back = false;
                return if merged { 0 } else { i };
            }
            out[i * size..(i + 1) * size].copy_from_slice(&self.data[pos..pos + size]);
            self.cursor = Cursor::Active(pos + size);
            self.pushed_back = false;
        }
        if merged {
            size
        } else {
            count
        }
    }

    /// Read one byte, or `None` at end of buffer.
    pub fn read_char(&mut self) -> Option<u8> {
        match self.cursor {
            Cursor::Active(p) if p < self.data.len() => {
                let c = self.data[p];
                self.cursor = Cursor::Active(p + 1);
                self.pushed_back = false;
                Some(c)
            }
            _ => {
                self.cursor = Cursor::PastEnd;
                None
            }
        }
    }

    /// Push one byte back onto the stream.
    ///
    /// The slot is a single buffer edit: position steps back one and the byte
    /// there is overwritten. Rejected at position zero, on an empty buffer,
    /// past the end, or when a pushback is already pending.
    pub fn unread_char(&mut self, byte: u8) -> Option<u8> {
        if self.pushed_back || self.data.is_empty() {
            return None;
        }
        match self.cursor {
            Cursor::Active(p) if p > 0 => {
                self.cursor = Cursor::Active(p - 1);
                self.data[p - 1] = byte;
                self.pushed_back = true;
                Some(byte)
            }
            _ => None,
        }
    }

    /// Read one line, newline-inclusive, bounded by `capacity - 1` bytes.
    ///
    /// Returns `None` once the cursor is at or past the end (and parks it on
    /// the past-end sentinel, matching a failed read).
    pub fn read_line(&mut self, capacity: usize) -> Option<String> {
        let pos = match self.cursor {
            Cursor::Active(p) if p < self.data.len() => p,
            _ => {
                self.cursor = Cursor::PastEnd;
                return None;
            }
        };
        if capacity == 0 {
            return None;
        }
        let rest = &self.data[pos..];
        let line_len = match rest.iter().position(|&b| b == b'\n') {
            Some(i) => i + 1,
            None => rest.len(),
        };
        let copy = line_len.min(capacity - 1);
        let line = String::from_utf8_lossy(&rest[..copy]).into_owned();
        self.cursor = Cursor::Active(pos + copy);
        self.pushed_back = false;
        Some(line)
    }

    /// Reposition the cursor.
    ///
    /// Negative targets clamp to zero and succeed; targets beyond the end
    /// park the cursor on the past-end sentinel and fail. `Whence::End`
    /// ignores the offset and lands exactly at the end.
    pub fn seek(&mut self, offset: i64, whence: Whence) -> Result<()> {
        let len = self.data.len() as i64;
        let current = match self.cursor {
            Cursor::Active(p) => p as i64,
            Cursor::PastEnd => len + 1,
        };
        let target = match whence {
            Whence::Start => offset,
            Whence::Current => current + offset,
            Whence::End => len,
        };
        self.pushed_back = false;
        if target < 0 {
            self.cursor = Cursor::Active(0);
            Ok(())
        } else if target > len {
            self.cursor = Cursor::PastEnd;
            Err(VfsError::SeekPastEnd)
        } else {
            self.cursor = Cursor::Active(target as usize);
            Ok(())
        }
    }

    /// Current position, clamped to the buffer size when at or past the end.
    pub fn tell(&self) -> u64 {
        match self.cursor {
            Cursor::Active(p) if p < self.data.len() => p as u64,
            _ => self.data.len() as u64,
        }
    }

    pub fn rewind(&mut self) {
        self.cursor = Cursor::Active(0);
        self.pushed_back = false;
    }

    /// True only after a read has gone past the end.
    pub fn at_eof(&self) -> bool {
        self.cursor == Cursor::PastEnd
    }

    /// Run a formatted scan at the cursor and advance by the bytes consumed.
    pub fn scan(&mut self, format: &str) -> Vec<ScanValue> {
        let pos = match self.cursor {
            Cursor::Active(p) if p < self.data.len() => p,
            _ => return Vec::new(),
        };
        let (values, consumed) = scan_bytes(&self.data[pos..], format);
        if consumed > 0 {
            self.cursor = Cursor::Active(pos + consumed);
            self.pushed_back = false;
        }
        values
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn test_truncation_returns_complete_elements_only() {
        let mut buf = ReadBuffer::new(b"0123456789abcd".to_vec());
        let mut out = [0u8; 16];
        // 14 bytes hold three complete 4-byte elements.
        assert_eq!(buf.read_elements(&mut out, 4, 4), 3);
        assert_eq!(&out[..12], b"0123456789ab");
        assert!(buf.at_eof());
        assert_eq!(buf.tell(), 14);
    }

    #[test]
    fn test_single_byte_reads_are_all_or_nothing() {
        let mut buf = ReadBuffer::new(b"abc".to_vec());
        let mut out = [0u8; 8];
        assert_eq!(buf.read_elements(&mut out, 1, 3), 3);
        assert_eq!(&out[..3], b"abc");

        buf.rewind();
        assert_eq!(buf.read_elements(&mut out, 1, 4), 0);
        assert!(buf.at_eof());
    }

    #[test]
    fn test_read_at_exact_end_is_not_yet_eof() {
        let mut buf = ReadBuffer::new(b"xy".to_vec());
        let mut out = [0u8; 2];
        assert_eq!(buf.read_elements(&mut out, 2, 1), 1);
        assert!(!buf.at_eof());
        assert_eq!(buf.read_elements(&mut out, 2, 1), 0);
        assert!(buf.at_eof());
    }

    #[test]
    fn test_char_sequence_then_eof() {
        let mut buf = ReadBuffer::new(b"ab".to_vec());
        assert_eq!(buf.read_char(), Some(b'a'));
        assert!(!buf.at_eof());
        assert_eq!(buf.read_char(), Some(b'b'));
        assert!(!buf.at_eof());
        assert_eq!(buf.read_char(), None);
        assert!(buf.at_eof());
    }

    #[test]
    fn test_pushback_round_trip() {
        let mut buf = ReadBuffer::new(b"hello".to_vec());
        assert_eq!(buf.read_char(), Some(b'h'));
        assert_eq!(buf.unread_char(b'H'), Some(b'H'));
        assert_eq!(buf.read_char(), Some(b'H'));
    }

    #[test]
    fn test_second_consecutive_pushback_fails() {
        let mut buf = ReadBuffer::new(b"hello".to_vec());
        buf.read_char();
        buf.read_char();
        assert_eq!(buf.unread_char(b'x'), Some(b'x'));
        assert_eq!(buf.unread_char(b'y'), None);
        assert_eq!(buf.read_char(), Some(b'x'));
        // A forward read reopens the slot.
        assert_eq!(buf.unread_char(b'z'), Some(b'z'));
    }

    #[test]
    fn test_pushback_rejected_at_start_and_past_end() {
        let mut buf = ReadBuffer::new(b"ab".to_vec());
        assert_eq!(buf.unread_char(b'x'), None);
        buf.read_char();
        buf.read_char();
        buf.read_char(); // past end
        assert!(buf.at_eof());
        assert_eq!(buf.unread_char(b'x'), None);

        let mut empty = ReadBuffer::new(Vec::new());
        assert_eq!(empty.unread_char(b'x'), None);
    }

    #[test]
    fn test_line_reads_split_on_newline() {
        let mut buf = ReadBuffer::new(b"abc\ndef".to_vec());
        assert_eq!(buf.read_line(32).as_deref(), Some("abc\n"));
        assert_eq!(buf.read_line(32).as_deref(), Some("def"));
        assert_eq!(buf.read_line(32), None);
        assert!(buf.at_eof());
    }

    #[test]
    fn test_line_read_respects_capacity() {
        let mut buf = ReadBuffer::new(b"abcdefgh\n".to_vec());
        // capacity - 1 bytes at most
        assert_eq!(buf.read_line(4).as_deref(), Some("abc"));
        assert_eq!(buf.read_line(32).as_deref(), Some("defgh\n"));
    }

    #[test]
    fn test_seek_end_ignores_offset() {
        let mut buf = ReadBuffer::new(b"0123456789".to_vec());
        buf.seek(-4, Whence::End).unwrap();
        assert_eq!(buf.tell(), 10);
        assert!(!buf.at_eof());
    }

    #[test]
    fn test_seek_clamps_negative_and_flags_past_end() {
        let mut buf = ReadBuffer::new(b"0123".to_vec());
        buf.seek(-10, Whence::Start).unwrap();
        assert_eq!(buf.tell(), 0);

        assert!(matches!(
            buf.seek(5, Whence::Start),
            Err(VfsError::SeekPastEnd)
        ));
        assert!(buf.at_eof());
        assert_eq!(buf.tell(), 4);
    }

    #[test]
    fn test_relative_seek_from_past_end() {
        let mut buf = ReadBuffer::new(b"0123".to_vec());
        buf.read_char();
        buf.seek(100, Whence::Current).unwrap_err();
        // Sentinel is size+1, so stepping back one more than the size lands
        // at position zero... minus the extra sentinel slot.
        buf.seek(-5, Whence::Current).unwrap();
        assert_eq!(buf.tell(), 0);
        assert!(!buf.at_eof());
    }

    #[test]
    fn test_rewind_clears_eof() {
        let mut buf = ReadBuffer::new(b"z".to_vec());
        buf.read_char();
        buf.read_char();
        assert!(buf.at_eof());
        buf.rewind();
        assert!(!buf.at_eof());
        assert_eq!(buf.read_char(), Some(b'z'));
    }

    #[test]
    fn test_scan_advances_by_consumed_bytes() {
        let mut buf = ReadBuffer::new(b"42 rest".to_vec());
        let values = buf.scan("%d ");
        assert_eq!(values.len(), 1);
        assert_eq!(values[0].as_int(), Some(42));
        assert_eq!(buf.read_line(32).as_deref(), Some("rest"));
    }

    #[test]
    fn test_zero_match_scan_leaves_position_alone() {
        let mut buf = ReadBuffer::new(b"abc 1".to_vec());
        assert!(buf.scan("%d").is_empty());
        assert_eq!(buf.tell(), 0);
        assert!(!buf.at_eof());
    }

    #[test]
    fn test_scan_at_end_matches_nothing() {
        let mut buf = ReadBuffer::new(b"9".to_vec());
        assert_eq!(buf.scan("%d").len(), 1);
        assert!(buf.scan("%d").is_empty());
        assert!(!buf.at_eof());
    }

    proptest! {
        /// Truncation law: K complete elements remain, a read of N > K
        /// elements returns exactly K and parks the cursor past the end.
        #[test]
        fn prop_truncation_law(len in 0usize..64, size in 2usize..9, count in 1usize..17) {
            let data: Vec<u8> = (0..len).map(|i| i as u8).collect();
            let mut buf = ReadBuffer::new(data.clone());
            let mut out = vec![0u8; size * count];
            let complete = len / size;
            let got = buf.read_elements(&mut out, size, count);
            if complete >= count {
                prop_assert_eq!(got, count);
                prop_assert!(!buf.at_eof());
            } else {
                prop_assert_eq!(got, complete);
                prop_assert!(buf.at_eof());
            }
            prop_assert_eq!(&out[..got * size], &data[..got * size]);
        }
    }
}
