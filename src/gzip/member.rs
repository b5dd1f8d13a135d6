use crate::error::Result;
use std::io::Write;

/// Writes encoded blocks as independent gzip members.
///
/// Each block the engine produces is a self-contained final DEFLATE
/// stream, so wrapping one per member yields output any standard gzip
/// decompressor accepts (multi-member files decode as concatenation).
pub struct GzipMemberWriter<W: Write> {
    writer: W,
}

impl<W: Write> GzipMemberWriter<W> {
    pub fn new(writer: W) -> Self {
        Self { writer }
    }

    /// Write one member wrapping pre-encoded deflate data
    pub fn write_member(&mut self, deflate_data: &[u8], uncompressed: &[u8]) -> Result<()> {
        let crc = crc32fast::hash(uncompressed);
        self.write_member_with_crc(deflate_data, crc, uncompressed.len() as u32)
    }

    /// Write one member with a pre-computed CRC32 and uncompressed size
    pub fn write_member_with_crc(
        &mut self,
        deflate_data: &[u8],
        crc: u32,
        uncompressed_size: u32,
    ) -> Result<()> {
        self.write_header()?;
        self.writer.write_all(deflate_data)?;

        // Footer: CRC32 + ISIZE
        self.writer.write_all(&crc.to_le_bytes())?;
        self.writer.write_all(&uncompressed_size.to_le_bytes())?;

        Ok(())
    }

    /// Write the 10-byte gzip header (no optional fields)
    fn write_header(&mut self) -> Result<()> {
        let header = [
            0x1f, 0x8b, // gzip magic
            0x08, // compression method (DEFLATE)
            0x00, // flags
            0x00, 0x00, 0x00, 0x00, // mtime
            0x00, // extra flags
            0xff, // OS (unknown)
        ];
        self.writer.write_all(&header)?;
        Ok(())
    }

    /// Flush and finish writing
    pub fn finish(mut self) -> Result<W> {
        self.writer.flush()?;
        Ok(self.writer)
    }

    /// Get a reference to the inner writer
    pub fn get_ref(&self) -> &W {
        &self.writer
    }

    /// Get a mutable reference to the inner writer
    pub fn get_mut(&mut self) -> &mut W {
        &mut self.writer
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::gzip::{GZIP_FOOTER_SIZE, GZIP_HEADER_SIZE};

    #[test]
    fn test_member_layout() {
        let mut output = Vec::new();
        let mut writer = GzipMemberWriter::new(&mut output);

        // Empty stored DEFLATE block as placeholder payload
        let deflate = vec![0x03, 0x00];
        writer.write_member(&deflate, b"").unwrap();

        assert_eq!(output.len(), GZIP_HEADER_SIZE + deflate.len() + GZIP_FOOTER_SIZE);
        assert_eq!(output[0], 0x1f); // gzip magic
        assert_eq!(output[1], 0x8b);
        assert_eq!(output[2], 0x08); // DEFLATE
        assert_eq!(output[3], 0x00); // no flags

        // ISIZE of an empty payload
        let isize_bytes = &output[output.len() - 4..];
        assert_eq!(isize_bytes, &[0, 0, 0, 0]);
    }

    #[test]
    fn test_member_crc() {
        let mut output = Vec::new();
        let mut writer = GzipMemberWriter::new(&mut output);

        let payload = b"hello world";
        writer.write_member(&[0x03, 0x00], payload).unwrap();

        let crc_offset = output.len() - 8;
        let crc = u32::from_le_bytes(output[crc_offset..crc_offset + 4].try_into().unwrap());
        assert_eq!(crc, crc32fast::hash(payload));
    }
}
