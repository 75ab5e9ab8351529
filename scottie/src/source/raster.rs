use std::{
    fs::File,
    io::{
        BufReader,
        ErrorKind,
        Read,
    },
    path::Path,
};

/// What the storage layer returns past the end of a raster stream.
pub const SENTINEL: u8 = 0xff;

/// Outcome of reading one scanline.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum LineRead {
    Full,
    /// The stream ended after `bytes` bytes. The rest of the line was filled
    /// with [`SENTINEL`].
    Short { bytes: usize },
}

impl LineRead {
    #[inline]
    pub fn is_short(&self) -> bool {
        matches!(self, LineRead::Short { .. })
    }
}

/// Reads a raster stream one interleaved RGB scanline at a time.
#[derive(derive_more::Debug)]
pub struct RasterReader<R> {
    #[debug(skip)]
    inner: R,
    line_bytes: usize,
}

impl<R> RasterReader<R>
where
    R: Read,
{
    pub fn new(inner: R, line_bytes: usize) -> Self {
        Self { inner, line_bytes }
    }

    #[inline]
    pub fn line_bytes(&self) -> usize {
        self.line_bytes
    }

    /// Fills `line` with the next scanline. End of stream is not an error:
    /// the missing bytes read as [`SENTINEL`].
    pub fn read_line(&mut self, line: &mut [u8]) -> std::io::Result<LineRead> {
        assert_eq!(line.len(), self.line_bytes);

        let mut filled = 0;
        while filled < line.len() {
            match self.inner.read(&mut line[filled..]) {
                Ok(0) => break,
                Ok(n) => filled += n,
                Err(error) if error.kind() == ErrorKind::Interrupted => {}
                Err(error) => return Err(error),
            }
        }

        if filled == line.len() {
            Ok(LineRead::Full)
        }
        else {
            line[filled..].fill(SENTINEL);
            Ok(LineRead::Short { bytes: filled })
        }
    }
}

impl RasterReader<BufReader<File>> {
    pub fn open(path: impl AsRef<Path>, line_bytes: usize) -> std::io::Result<Self> {
        let file = File::open(path)?;
        Ok(Self::new(BufReader::new(file), line_bytes))
    }
}

#[cfg(test)]
mod tests {
    use std::io::{
        Cursor,
        Read,
    };

    use super::*;

    #[test]
    fn reads_full_lines_then_sentinel() {
        let mut reader = RasterReader::new(Cursor::new(vec![7u8; 10]), 6);
        let mut line = [0u8; 6];

        assert_eq!(reader.read_line(&mut line).unwrap(), LineRead::Full);
        assert_eq!(line, [7; 6]);

        assert_eq!(reader.read_line(&mut line).unwrap(), LineRead::Short { bytes: 4 });
        assert_eq!(line, [7, 7, 7, 7, SENTINEL, SENTINEL]);

        assert_eq!(reader.read_line(&mut line).unwrap(), LineRead::Short { bytes: 0 });
        assert_eq!(line, [SENTINEL; 6]);
    }

    /// Yields one byte per call and an interruption in between.
    struct Trickle {
        data: Vec<u8>,
        interrupt: bool,
    }

    impl Read for Trickle {
        fn read(&mut self, buf: &mut [u8]) -> std::io::Result<usize> {
            self.interrupt = !self.interrupt;
            if self.interrupt {
                return Err(ErrorKind::Interrupted.into());
            }
            if self.data.is_empty() || buf.is_empty() {
                return Ok(0);
            }
            buf[0] = self.data.remove(0);
            Ok(1)
        }
    }

    #[test]
    fn retries_interrupted_and_partial_reads() {
        let mut reader = RasterReader::new(
            Trickle {
                data: vec![1, 2, 3],
                interrupt: false,
            },
            3,
        );
        let mut line = [0u8; 3];
        assert_eq!(reader.read_line(&mut line).unwrap(), LineRead::Full);
        assert_eq!(line, [1, 2, 3]);
    }

    #[test]
    fn propagates_io_errors() {
        struct Broken;
        impl Read for Broken {
            fn read(&mut self, _buf: &mut [u8]) -> std::io::Result<usize> {
                Err(ErrorKind::BrokenPipe.into())
            }
        }

        let error = RasterReader::new(Broken, 3).read_line(&mut [0; 3]).unwrap_err();
        assert_eq!(error.kind(), ErrorKind::BrokenPipe);
    }
}
