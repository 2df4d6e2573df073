//! Streaming decompression for log input.
//!
//! Shadow log files routinely reach tens of gigabytes compressed, so input is
//! never materialized decompressed on disk. Gzip (1F 8B 08) and zstd
//! (28 B5 2F FD) are detected by magic bytes and decompressed inline; `.xz`
//! files are handled separately by piping through an external `xz` process
//! (see `readers`).

use anyhow::{anyhow, Result};
use flate2::read::MultiGzDecoder;
use std::fs::File;
use std::io::{BufRead, BufReader, Cursor, Read};
use std::path::Path;

const GZIP_MAGIC: [u8; 3] = [0x1F, 0x8B, 0x08];
const ZSTD_MAGIC: [u8; 4] = [0x28, 0xB5, 0x2F, 0xFD];

/// A buffered reader over a possibly-compressed source, with the compression
/// format detected from the first bytes of the stream.
pub struct DecompressionReader {
    inner: BufReader<Box<dyn Read + Send>>,
}

impl std::fmt::Debug for DecompressionReader {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "DecompressionReader")
    }
}

impl DecompressionReader {
    /// Open a file, sniffing its compression format from magic bytes.
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let file = File::open(path)
            .map_err(|e| anyhow!("failed to open log file '{}': {}", path.display(), e))?;
        Ok(Self {
            inner: BufReader::new(maybe_decompress(file)?),
        })
    }

    /// Wrap any readable source, sniffing its compression format.
    pub fn from_reader<R: Read + Send + 'static>(reader: R) -> Result<Self> {
        Ok(Self {
            inner: BufReader::new(maybe_decompress(reader)?),
        })
    }
}

impl Read for DecompressionReader {
    fn read(&mut self, buf: &mut [u8]) -> std::io::Result<usize> {
        self.inner.read(buf)
    }
}

impl BufRead for DecompressionReader {
    fn fill_buf(&mut self) -> std::io::Result<&[u8]> {
        self.inner.fill_buf()
    }

    fn consume(&mut self, amt: usize) {
        self.inner.consume(amt)
    }
}

/// Sniff the first bytes of `reader` and return a decompressing wrapper when
/// a gzip or zstd signature is present, or the raw stream otherwise. The
/// sniffed bytes are chained back in front so nothing is lost.
pub fn maybe_decompress<R: Read + Send + 'static>(
    mut reader: R,
) -> Result<Box<dyn Read + Send>> {
    let mut head = [0u8; 4];
    let mut filled = 0;
    while filled < head.len() {
        match reader.read(&mut head[filled..]) {
            Ok(0) => break,
            Ok(n) => filled += n,
            Err(e) => return Err(anyhow!("failed to sniff input stream: {}", e)),
        }
    }

    let prefix = Cursor::new(head[..filled].to_vec());
    let chained = prefix.chain(reader);

    if filled >= 3 && head[..3] == GZIP_MAGIC {
        Ok(Box::new(MultiGzDecoder::new(chained)))
    } else if filled >= 4 && head == ZSTD_MAGIC {
        let decoder =
            zstd::Decoder::new(chained).map_err(|e| anyhow!("failed to init zstd decoder: {}", e))?;
        Ok(Box::new(decoder))
    } else {
        Ok(Box::new(chained))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    #[test]
    fn test_plain_file_passthrough() -> Result<()> {
        let mut temp_file = NamedTempFile::new()?;
        writeln!(temp_file, "test line 1")?;
        writeln!(temp_file, "test line 2")?;
        temp_file.flush()?;

        let mut reader = DecompressionReader::open(temp_file.path())?;
        let mut content = String::new();
        reader.read_to_string(&mut content)?;

        assert!(content.contains("test line 1"));
        assert!(content.contains("test line 2"));
        Ok(())
    }

    #[test]
    fn test_gzip_roundtrip() -> Result<()> {
        let mut encoder =
            flate2::write::GzEncoder::new(Vec::new(), flate2::Compression::default());
        encoder.write_all(b"compressed line\n")?;
        let compressed = encoder.finish()?;

        let mut temp_file = NamedTempFile::new()?;
        temp_file.write_all(&compressed)?;
        temp_file.flush()?;

        let mut reader = DecompressionReader::open(temp_file.path())?;
        let mut content = String::new();
        reader.read_to_string(&mut content)?;
        assert_eq!(content, "compressed line\n");
        Ok(())
    }

    #[test]
    fn test_zstd_roundtrip() -> Result<()> {
        let compressed = zstd::encode_all(&b"zstd line\n"[..], 0)?;

        let mut temp_file = NamedTempFile::new()?;
        temp_file.write_all(&compressed)?;
        temp_file.flush()?;

        let mut reader = DecompressionReader::open(temp_file.path())?;
        let mut content = String::new();
        reader.read_to_string(&mut content)?;
        assert_eq!(content, "zstd line\n");
        Ok(())
    }

    #[test]
    fn test_short_input_passthrough() -> Result<()> {
        // Fewer bytes than any magic signature
        let mut reader = maybe_decompress(Cursor::new(b"ab".to_vec()))?;
        let mut content = String::new();
        reader.read_to_string(&mut content)?;
        assert_eq!(content, "ab");
        Ok(())
    }

    #[test]
    fn test_missing_file_errors() {
        let result = DecompressionReader::open("/definitely/not/here.log");
        assert!(result.is_err());
        assert!(result
            .unwrap_err()
            .to_string()
            .contains("failed to open log file"));
    }
}
