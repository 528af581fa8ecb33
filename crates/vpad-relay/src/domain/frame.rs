//! The unit of data the relay forwards.
//!
//! The relay has no notion of message type, topic, or target.  A frame is
//! whatever a peer sent, kept as either text or bytes so it can be written
//! back out with the same WebSocket opcode.

/// One whole message received from a peer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RelayFrame {
    Text(String),
    Binary(Vec<u8>),
}

impl RelayFrame {
    /// Payload size in bytes.
    pub fn len(&self) -> usize {
        match self {
            RelayFrame::Text(text) => text.len(),
            RelayFrame::Binary(bytes) => bytes.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// `"text"` or `"binary"`, for log output.
    pub fn kind(&self) -> &'static str {
        match self {
            RelayFrame::Text(_) => "text",
            RelayFrame::Binary(_) => "binary",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_text_frame_len_is_byte_length() {
        let frame = RelayFrame::Text("é".to_string());
        assert_eq!(frame.len(), 2);
        assert_eq!(frame.kind(), "text");
    }

    #[test]
    fn test_binary_frame_len() {
        let frame = RelayFrame::Binary(vec![1, 2, 3]);
        assert_eq!(frame.len(), 3);
        assert_eq!(frame.kind(), "binary");
        assert!(!frame.is_empty());
    }

    #[test]
    fn test_empty_text_frame_is_empty() {
        assert!(RelayFrame::Text(String::new()).is_empty());
    }
}
