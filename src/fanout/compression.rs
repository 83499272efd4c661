use std::io::Write;

use flate2::write::GzEncoder;

/// Compression applied to run output files.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Compression {
    #[default]
    None,
    Gzip,
}

impl Compression {
    /// File name extension for a run output, including the leading dot.
    pub fn extension(&self) -> &'static str {
        match self {
            Compression::None => ".txt",
            Compression::Gzip => ".txt.gz",
        }
    }
}

pub enum Writer<T>
where
    T: Write,
{
    Uncompressed(T),
    Gzip(GzEncoder<T>),
}

impl<T> Writer<T>
where
    T: Write,
{
    pub fn new(compression: Compression, writer: T) -> Self {
        match compression {
            Compression::None => Self::Uncompressed(writer),
            Compression::Gzip => Self::Gzip(GzEncoder::new(writer, flate2::Compression::default())),
        }
    }

    /// Flush everything, writing the gzip trailer if compressing, and return
    /// the inner writer.
    pub fn finish(self) -> std::io::Result<T> {
        match self {
            Writer::Uncompressed(mut t) => {
                t.flush()?;
                Ok(t)
            }
            Writer::Gzip(t) => t.finish(),
        }
    }
}

impl<T> Write for Writer<T>
where
    T: Write,
{
    fn write(&mut self, buf: &[u8]) -> std::io::Result<usize> {
        match self {
            Writer::Uncompressed(t) => t.write(buf),
            Writer::Gzip(t) => t.write(buf),
        }
    }

    fn flush(&mut self) -> std::io::Result<()> {
        match self {
            Writer::Uncompressed(t) => t.flush(),
            Writer::Gzip(t) => t.flush(),
        }
    }
}
