//! Random access to the text being highlighted.

/// Byte access to the editor's text buffer.
///
/// The engine never holds the text; it reads the bytes it needs, one line
/// at a time, through this trait. Any gap-buffer, rope or plain array can
/// implement it.
pub trait TextSource {
    fn len(&self) -> usize;

    fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Fill `buf` with the bytes starting at `offset`.
    ///
    /// # Panics
    /// May panic if `offset + buf.len()` exceeds [`len`](TextSource::len),
    /// like slice indexing.
    fn read(&self, offset: usize, buf: &mut [u8]);
}

impl TextSource for [u8] {
    fn len(&self) -> usize {
        <[u8]>::len(self)
    }

    fn read(&self, offset: usize, buf: &mut [u8]) {
        buf.copy_from_slice(&self[offset..offset + buf.len()]);
    }
}

impl TextSource for Vec<u8> {
    fn len(&self) -> usize {
        Vec::len(self)
    }

    fn read(&self, offset: usize, buf: &mut [u8]) {
        self.as_slice().read(offset, buf);
    }
}

impl<T: TextSource + ?Sized> TextSource for &T {
    fn len(&self) -> usize {
        (**self).len()
    }

    fn read(&self, offset: usize, buf: &mut [u8]) {
        (**self).read(offset, buf);
    }
}
