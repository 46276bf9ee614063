/// Convert a string to a null-terminated UTF-16 vector suitable for Windows API calls.
pub fn to_utf16(s: &str) -> Vec<u16> {
    s.encode_utf16().chain(std::iter::once(0)).collect()
}

/// Read back a null-terminated UTF-16 buffer filled by a Windows API call.
pub fn from_utf16_buf(buf: &[u16]) -> String {
    let len = buf.iter().position(|&c| c == 0).unwrap_or(buf.len());
    String::from_utf16_lossy(&buf[..len])
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;

    #[test]
    fn round_trips_through_a_padded_buffer() {
        let mut buf = to_utf16("Convert to HTML");
        buf.resize(64, 0);
        assert_eq!(from_utf16_buf(&buf), "Convert to HTML");
    }

    #[test]
    fn unterminated_buffer_is_taken_whole() {
        let buf: Vec<u16> = "abc".encode_utf16().collect();
        assert_eq!(from_utf16_buf(&buf), "abc");
    }
}
