//! ANSI escape stripping for captured simulator output.
//!
//! The simulator colorizes its terminal output; the persisted logs should
//! be plain text. Handles 7-bit C1 escapes (ESC Fe), bare 8-bit C1 bytes,
//! and CSI sequences in both 7-bit and 8-bit form.

use lazy_static::lazy_static;
use regex::bytes::Regex;
use std::borrow::Cow;

lazy_static! {
    static ref ANSI_ESCAPE: Regex = Regex::new(
        r"(?-u)(?:\x1B[@-Z\x5C-\x5F]|[\x80-\x9A\x9C-\x9F]|(?:\x1B\[|\x9B)[0-?]*[ -/]*[@-~])"
    )
    .expect("ANSI escape regex must compile");
}

/// Removes ANSI escape sequences from a captured output line.
pub fn strip_ansi(line: &[u8]) -> Cow<'_, [u8]> {
    ANSI_ESCAPE.replace_all(line, &b""[..])
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn plain_text_is_untouched() {
        let line = b"TCL: 12.5 node 2 received packet".as_slice();
        assert_eq!(strip_ansi(line).as_ref(), line);
    }

    #[test]
    fn strips_csi_color_sequences() {
        let line = b"\x1b[31mERROR\x1b[0m something failed".as_slice();
        assert_eq!(strip_ansi(line).as_ref(), b"ERROR something failed");
    }

    #[test]
    fn strips_eight_bit_csi() {
        let line = b"\x9b1mbold\x9b0m".as_slice();
        assert_eq!(strip_ansi(line).as_ref(), b"bold");
    }

    #[test]
    fn strips_bare_escapes_mid_line() {
        let line = b"a\x1bMb".as_slice(); // ESC M, reverse index
        assert_eq!(strip_ansi(line).as_ref(), b"ab");
    }
}
