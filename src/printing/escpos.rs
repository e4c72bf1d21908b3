//! ESC/POS command builder.
//!
//! Fluent API producing the raw bytes understood by thermal receipt printers.

use unicode_width::UnicodeWidthStr;

pub struct EscPosBuilder {
    buf: Vec<u8>,
    width: usize,
}

impl EscPosBuilder {
    /// New builder for a paper `width` in characters (32 for 58mm, 48 for 80mm).
    pub fn new(width: usize) -> Self {
        let mut buf = Vec::with_capacity(2048);
        // ESC @
        buf.extend_from_slice(&[0x1B, 0x40]);
        Self {
            buf,
            width: width.max(16),
        }
    }

    pub fn width(&self) -> usize {
        self.width
    }

    pub fn text(&mut self, s: &str) -> &mut Self {
        self.buf.extend_from_slice(s.as_bytes());
        self
    }

    pub fn line(&mut self, s: &str) -> &mut Self {
        self.text(s);
        self.buf.push(b'\n');
        self
    }

    pub fn newline(&mut self) -> &mut Self {
        self.buf.push(b'\n');
        self
    }

    /// ESC d n
    pub fn feed(&mut self, lines: u8) -> &mut Self {
        self.buf.extend_from_slice(&[0x1B, 0x64, lines]);
        self
    }

    pub fn left(&mut self) -> &mut Self {
        self.buf.extend_from_slice(&[0x1B, 0x61, 0x00]);
        self
    }

    pub fn center(&mut self) -> &mut Self {
        self.buf.extend_from_slice(&[0x1B, 0x61, 0x01]);
        self
    }

    pub fn right(&mut self) -> &mut Self {
        self.buf.extend_from_slice(&[0x1B, 0x61, 0x02]);
        self
    }

    pub fn bold(&mut self) -> &mut Self {
        self.buf.extend_from_slice(&[0x1B, 0x45, 0x01]);
        self
    }

    pub fn bold_off(&mut self) -> &mut Self {
        self.buf.extend_from_slice(&[0x1B, 0x45, 0x00]);
        self
    }

    /// Double width and height.
    pub fn double_size(&mut self) -> &mut Self {
        self.buf.extend_from_slice(&[0x1D, 0x21, 0x11]);
        self
    }

    pub fn reset_size(&mut self) -> &mut Self {
        self.buf.extend_from_slice(&[0x1D, 0x21, 0x00]);
        self
    }

    pub fn sep_single(&mut self) -> &mut Self {
        self.line(&"-".repeat(self.width))
    }

    pub fn sep_double(&mut self) -> &mut Self {
        self.line(&"=".repeat(self.width))
    }

    /// Left text flush left, right text flush right, on one line.
    pub fn line_lr(&mut self, left: &str, right: &str) -> &mut Self {
        let line = pad_lr(left, right, self.width);
        self.line(&line)
    }

    /// GS V 0, full cut.
    pub fn cut(&mut self) -> &mut Self {
        self.buf.extend_from_slice(&[0x1D, 0x56, 0x00]);
        self
    }

    /// GS V 66 n, feed `lines` then cut.
    pub fn cut_feed(&mut self, lines: u8) -> &mut Self {
        self.buf.extend_from_slice(&[0x1D, 0x56, 0x42, lines]);
        self
    }

    /// Pulse on drawer pin 2.
    pub fn open_drawer(&mut self) -> &mut Self {
        self.buf.extend_from_slice(&[0x1B, 0x70, 0x00, 25, 250]);
        self
    }

    pub fn build(&self) -> Vec<u8> {
        self.buf.clone()
    }

    pub fn into_bytes(self) -> Vec<u8> {
        self.buf
    }
}

/// Join `left` and `right` with enough spaces to fill `width` columns.
/// When both do not fit they are separated by a single space.
pub fn pad_lr(left: &str, right: &str, width: usize) -> String {
    let lw = UnicodeWidthStr::width(left);
    let rw = UnicodeWidthStr::width(right);

    if lw + rw >= width {
        format!("{left} {right}")
    } else {
        format!("{left}{}{right}", " ".repeat(width - lw - rw))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn starts_with_init_and_ends_with_cut() {
        let mut b = EscPosBuilder::new(32);
        b.center().bold().line("HELLO").bold_off().cut();
        let bytes = b.into_bytes();

        assert_eq!(&bytes[..2], &[0x1B, 0x40]);
        assert_eq!(&bytes[2..5], &[0x1B, 0x61, 0x01]);
        assert_eq!(&bytes[bytes.len() - 3..], &[0x1D, 0x56, 0x00]);
        assert!(bytes.windows(5).any(|w| w == b"HELLO"));
    }

    #[test]
    fn left_right_lines_fill_the_width() {
        assert_eq!(pad_lr("Cola x2", "300.00", 20), "Cola x2       300.00");
        assert_eq!(pad_lr("A very long product name", "1.00", 10), "A very long product name 1.00");
    }

    #[test]
    fn separators_use_paper_width() {
        let mut b = EscPosBuilder::new(32);
        b.sep_single();
        let bytes = b.into_bytes();
        let dashes = bytes.iter().filter(|&&c| c == b'-').count();
        assert_eq!(dashes, 32);
    }
}
