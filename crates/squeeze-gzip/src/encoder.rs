//! Streaming gzip encoder
//!
//! Frames a raw DEFLATE stream from [`flate2::Compress`] with the gzip header
//! and CRC32/ISIZE trailer. Unlike `flate2::write::GzEncoder` the encoder does
//! not own its destination, so one instance can be [`reset`](GzipEncoder::reset)
//! and reused for any number of responses.

use crate::level::CompressionLevel;
use flate2::{Compress, Crc, FlushCompress, Status};
use std::fmt;
use std::io::{self, Write};

const OUTPUT_CAPACITY: usize = 32 * 1024;

const GZIP_MAGIC: [u8; 2] = [0x1f, 0x8b];
const METHOD_DEFLATE: u8 = 8;
const OS_UNKNOWN: u8 = 255;

/// Reusable gzip stream encoder
pub struct GzipEncoder {
    level: CompressionLevel,
    deflate: Compress,
    crc: Crc,
    buf: Vec<u8>,
    header_written: bool,
    finished: bool,
}

impl GzipEncoder {
    /// Create an encoder at the given level
    pub fn new(level: CompressionLevel) -> Self {
        Self {
            level,
            deflate: Compress::new(level.into(), false),
            crc: Crc::new(),
            buf: Vec::with_capacity(OUTPUT_CAPACITY),
            header_written: false,
            finished: false,
        }
    }

    /// Level this encoder was built with
    pub fn level(&self) -> CompressionLevel {
        self.level
    }

    /// Discard all stream state so the next write starts a new gzip member
    pub fn reset(&mut self) {
        self.deflate.reset();
        self.crc.reset();
        self.buf.clear();
        self.header_written = false;
        self.finished = false;
    }

    /// Whether [`finish`](GzipEncoder::finish) completed the stream
    pub fn is_finished(&self) -> bool {
        self.finished
    }

    /// Uncompressed bytes consumed since the last reset
    pub fn total_in(&self) -> u64 {
        self.deflate.total_in()
    }

    /// Compress `input` and write whatever output is ready to `dst`
    pub fn write<W: Write + ?Sized>(&mut self, input: &[u8], dst: &mut W) -> io::Result<usize> {
        if self.finished {
            return Err(io::Error::new(
                io::ErrorKind::BrokenPipe,
                "gzip stream already finished",
            ));
        }
        self.write_header(dst)?;

        let mut remaining = input;
        while !remaining.is_empty() {
            let before_out = self.deflate.total_out();
            let (consumed, _) = self.run(remaining, FlushCompress::None, dst)?;
            if consumed == 0 && self.deflate.total_out() == before_out {
                return Err(io::Error::new(
                    io::ErrorKind::WriteZero,
                    "deflate made no progress",
                ));
            }
            remaining = &remaining[consumed..];
        }

        self.crc.update(input);
        Ok(input.len())
    }

    /// Sync-flush pending output so everything written so far is decodable
    pub fn flush<W: Write + ?Sized>(&mut self, dst: &mut W) -> io::Result<()> {
        if self.finished {
            return Ok(());
        }
        self.write_header(dst)?;

        self.run(&[], FlushCompress::Sync, dst)?;
        loop {
            let before_out = self.deflate.total_out();
            self.run(&[], FlushCompress::None, dst)?;
            if self.deflate.total_out() == before_out {
                break;
            }
        }
        dst.flush()
    }

    /// Write the final block and the gzip trailer
    pub fn finish<W: Write + ?Sized>(&mut self, dst: &mut W) -> io::Result<()> {
        if self.finished {
            return Ok(());
        }
        self.write_header(dst)?;

        loop {
            let before_out = self.deflate.total_out();
            let (_, status) = self.run(&[], FlushCompress::Finish, dst)?;
            if status == Status::StreamEnd || self.deflate.total_out() == before_out {
                break;
            }
        }

        let mut trailer = [0u8; 8];
        trailer[..4].copy_from_slice(&self.crc.sum().to_le_bytes());
        trailer[4..].copy_from_slice(&self.crc.amount().to_le_bytes());
        dst.write_all(&trailer)?;

        self.finished = true;
        Ok(())
    }

    fn write_header<W: Write + ?Sized>(&mut self, dst: &mut W) -> io::Result<()> {
        if self.header_written {
            return Ok(());
        }
        // ID1 ID2 CM FLG MTIME(4) XFL OS
        let header = [
            GZIP_MAGIC[0],
            GZIP_MAGIC[1],
            METHOD_DEFLATE,
            0,
            0,
            0,
            0,
            0,
            self.level.extra_flags(),
            OS_UNKNOWN,
        ];
        dst.write_all(&header)?;
        self.header_written = true;
        Ok(())
    }

    fn run<W: Write + ?Sized>(
        &mut self,
        input: &[u8],
        flush: FlushCompress,
        dst: &mut W,
    ) -> io::Result<(usize, Status)> {
        self.buf.clear();
        let before_in = self.deflate.total_in();
        let status = self
            .deflate
            .compress_vec(input, &mut self.buf, flush)
            .map_err(|e| io::Error::new(io::ErrorKind::Other, e))?;
        let consumed = (self.deflate.total_in() - before_in) as usize;

        if !self.buf.is_empty() {
            dst.write_all(&self.buf)?;
        }
        Ok((consumed, status))
    }
}

impl fmt::Debug for GzipEncoder {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("GzipEncoder")
            .field("level", &self.level)
            .field("total_in", &self.deflate.total_in())
            .field("total_out", &self.deflate.total_out())
            .field("finished", &self.finished)
            .finish()
    }
}
