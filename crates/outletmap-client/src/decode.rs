//! Incremental UTF-8 decoding for streamed response bodies.

/// Decodes a byte stream chunk by chunk.
///
/// A multi-byte sequence split across two chunks is held back until the rest
/// arrives, so no replacement characters appear at chunk boundaries. Bytes that
/// can never form valid UTF-8 decode to U+FFFD.
#[derive(Debug, Default)]
pub struct Utf8Decoder {
    pending: Vec<u8>,
}

impl Utf8Decoder {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Decodes `bytes` after any carried-over partial sequence and returns the
    /// text that is complete so far.
    pub fn push(&mut self, bytes: &[u8]) -> String {
        self.pending.extend_from_slice(bytes);

        let mut out = String::new();
        let mut consumed = 0usize;
        loop {
            let rest = &self.pending[consumed..];
            match std::str::from_utf8(rest) {
                Ok(text) => {
                    out.push_str(text);
                    consumed = self.pending.len();
                    break;
                }
                Err(e) => {
                    let valid = e.valid_up_to();
                    // The prefix up to `valid` is known-good, so this is lossless.
                    out.push_str(&String::from_utf8_lossy(&rest[..valid]));
                    match e.error_len() {
                        Some(bad) => {
                            out.push(char::REPLACEMENT_CHARACTER);
                            consumed += valid + bad;
                        }
                        None => {
                            // Incomplete sequence at the end; wait for more bytes.
                            consumed += valid;
                            break;
                        }
                    }
                }
            }
        }

        self.pending.drain(..consumed);
        out
    }

    /// Flushes a dangling partial sequence at end of stream.
    pub fn finish(&mut self) -> String {
        if self.pending.is_empty() {
            return String::new();
        }
        let tail = String::from_utf8_lossy(&self.pending).into_owned();
        self.pending.clear();
        tail
    }

    /// Number of bytes held back waiting for the rest of a sequence.
    #[must_use]
    pub fn pending_len(&self) -> usize {
        self.pending.len()
    }
}
