// Keystroke decoder for barcode scanner wedges.
// A hardware wedge types the whole code in a fast burst and terminates with
// Enter; a human typing into the page leaves gaps longer than the burst
// threshold, which resets the buffer.

use crate::value_objects::ScanCode;

/// Gap above which the next keystroke starts a new scan.
pub const SCAN_GAP_MS: i64 = 500;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum KeyInput {
    Char(char),
    Enter,
}

/// Buffered decoder state for one attached scan session. Timestamps are
/// injected by the caller, so the burst boundary is fully deterministic.
#[derive(Debug)]
pub struct ScanDecoder {
    buffer: String,
    last_key_at: Option<i64>,
    gap_ms: i64,
}

impl Default for ScanDecoder {
    fn default() -> Self {
        Self::new(SCAN_GAP_MS)
    }
}

impl ScanDecoder {
    pub fn new(gap_ms: i64) -> Self {
        Self {
            buffer: String::new(),
            last_key_at: None,
            gap_ms,
        }
    }

    /// Feed one key event. Returns a code only when Enter closes a
    /// non-empty burst; partial input never emits.
    pub fn push_key(&mut self, key: KeyInput, at_millis: i64) -> Option<ScanCode> {
        if let Some(last) = self.last_key_at {
            if at_millis - last > self.gap_ms {
                self.buffer.clear();
            }
        }
        self.last_key_at = Some(at_millis);

        match key {
            KeyInput::Char(ch) => {
                if !ch.is_control() {
                    self.buffer.push(ch);
                }
                None
            }
            KeyInput::Enter => {
                if self.buffer.is_empty() {
                    return None;
                }
                let code = std::mem::take(&mut self.buffer);
                Some(ScanCode(code))
            }
        }
    }

    pub fn reset(&mut self) {
        self.buffer.clear();
        self.last_key_at = None;
    }

    pub fn pending(&self) -> &str {
        &self.buffer
    }
}
