//! Streaming BMP transcoder.
//!
//! A conversion holds at most one source row and one output row in memory.
//! Output rows are produced bottom-up (the order a positive-height BMP stores
//! them), each output pixel sampling its nearest source pixel through
//! [`ResolvedGeometry::source_pixel`]. Source rows are fetched on demand into
//! a single-row cache; with rotation enabled consecutive pixels usually hit
//! different source rows, so the cache re-reads the same rows many times.

use alloc::string::{String, ToString};
use alloc::vec::Vec;

use enough::{Stop, Unstoppable};
use log::{debug, trace, warn};

use crate::bmp::{HEADER_LEN, HEADER_PROBE_LEN, SourceImage, decode_header, encode_header};
use crate::error::StaffError;
use crate::geometry::{OutputSpec, ResolvedGeometry};
use crate::limits::Limits;
use crate::storage::{SinkStream, SourceStream, Storage};

/// Outcome of [`process_bmp_to_staff`].
///
/// On success `message` is `"ok"` and the dimensions are those of the
/// written bitmap; on failure the dimensions are 0 and `message` is the
/// [`StaffError`] text.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ImageProcessResult {
    pub ok: bool,
    pub message: String,
    pub out_width: u16,
    pub out_height: u16,
}

impl From<Result<Converted, StaffError>> for ImageProcessResult {
    fn from(result: Result<Converted, StaffError>) -> Self {
        match result {
            Ok(done) => Self {
                ok: true,
                message: "ok".into(),
                out_width: u16::try_from(done.geometry.out_width).unwrap_or(u16::MAX),
                out_height: u16::try_from(done.geometry.out_height).unwrap_or(u16::MAX),
            },
            Err(e) => Self {
                ok: false,
                message: e.to_string(),
                out_width: 0,
                out_height: 0,
            },
        }
    }
}

/// A finished conversion.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Converted {
    pub source: SourceImage,
    pub geometry: ResolvedGeometry,
    /// Number of source row reads, counting re-reads of the same row.
    pub source_rows_read: u32,
    /// Bytes written to the destination, header included.
    pub bytes_written: u64,
}

/// Builder for a single conversion.
///
/// ```
/// use staffbmp::{ConvertRequest, MemStorage, Unstoppable};
///
/// let mut storage = MemStorage::new();
/// // storage.insert("/upload.bmp", bmp_bytes);
/// let result = ConvertRequest::new("/upload.bmp", "/staff.bmp", 72)
///     .max_height(800)
///     .rotate_cw(true)
///     .convert(&mut storage, Unstoppable);
/// assert_eq!(result.unwrap_err().to_string(), "Failed to open upload");
/// ```
#[derive(Clone, Debug)]
pub struct ConvertRequest<'a> {
    src: &'a str,
    dest: &'a str,
    spec: OutputSpec,
    limits: Option<&'a Limits>,
}

impl<'a> ConvertRequest<'a> {
    /// Convert `src` to a bitmap `out_width` pixels wide at `dest`.
    ///
    /// The height defaults to the aspect-preserving value, limited only by
    /// the output budget.
    pub fn new(src: &'a str, dest: &'a str, out_width: u16) -> Self {
        Self {
            src,
            dest,
            spec: OutputSpec::new(out_width, u16::MAX),
            limits: None,
        }
    }

    pub fn max_height(mut self, max_height: u16) -> Self {
        self.spec.max_height = max_height;
        self
    }

    pub fn rotate_cw(mut self, rotate_cw: bool) -> Self {
        self.spec.rotate_cw = rotate_cw;
        self
    }

    /// Explicit output height; 0 derives it from the aspect ratio.
    pub fn height(mut self, height: u16) -> Self {
        self.spec.requested_height = height;
        self
    }

    pub fn with_limits(mut self, limits: &'a Limits) -> Self {
        self.limits = Some(limits);
        self
    }

    /// Run the conversion.
    ///
    /// Either a complete bitmap exists at the destination afterwards, or
    /// (on error) nothing does: a destination created by this call is removed
    /// again when a later step fails.
    pub fn convert<S: Storage>(
        &self,
        storage: &mut S,
        stop: impl Stop,
    ) -> Result<Converted, StaffError> {
        let default_limits = Limits::default();
        let limits = self.limits.unwrap_or(&default_limits);

        stop.check()?;
        let mut source = storage.open_read(self.src).map_err(|e| {
            warn!("cannot open {}: {e}", self.src);
            StaffError::OpenSource(e)
        })?;

        let image = read_header(&mut source).inspect_err(|e| warn!("{}: {e}", self.src))?;
        limits.check_source(image.width, image.height)?;
        let geometry = self.spec.resolve(&image, limits)?;
        check_pixel_data(&mut source, &image).inspect_err(|e| warn!("{}: {e}", self.src))?;
        let cache = RowCache::new(image.row_size as usize)?;
        let out_row = alloc_row(geometry.out_row_size as usize)?;

        stop.check()?;
        let sink = storage.create(self.dest).map_err(|e| {
            warn!("cannot create {}: {e}", self.dest);
            StaffError::OpenOutput(e)
        })?;

        match stream_rows(&mut source, sink, cache, out_row, &image, &geometry, &stop) {
            Ok((source_rows_read, bytes_written)) => {
                debug!(
                    "wrote {} ({bytes_written} bytes, {source_rows_read} source row reads)",
                    self.dest
                );
                Ok(Converted {
                    source: image,
                    geometry,
                    source_rows_read,
                    bytes_written,
                })
            }
            Err(e) => {
                warn!("{} -> {}: {e}", self.src, self.dest);
                if let Err(rm) = storage.remove(self.dest) {
                    warn!("cannot remove partial output {}: {rm}", self.dest);
                }
                Err(e)
            }
        }
    }
}

/// Convert the 24-bit BMP at `src_path` into a bitmap at `dest_path`.
///
/// `requested_height` of 0 derives the height from the aspect ratio. The
/// height never exceeds `max_height` nor what fits the 64,000-byte output
/// budget. Failures are reported in the result, never panicked.
pub fn process_bmp_to_staff<S: Storage>(
    storage: &mut S,
    src_path: &str,
    dest_path: &str,
    out_width: u16,
    max_height: u16,
    rotate_cw: bool,
    requested_height: u16,
) -> ImageProcessResult {
    ConvertRequest::new(src_path, dest_path, out_width)
        .max_height(max_height)
        .rotate_cw(rotate_cw)
        .height(requested_height)
        .convert(storage, Unstoppable)
        .into()
}

fn read_header<R: SourceStream>(source: &mut R) -> Result<SourceImage, StaffError> {
    let mut buf = [0u8; HEADER_PROBE_LEN];
    let mut filled = 0;
    while filled < buf.len() {
        match source.read_bytes(&mut buf[filled..]).map_err(StaffError::Read)? {
            0 => break,
            n => filled += n,
        }
    }
    decode_header(&buf[..filled])
}

/// Fail unless every pixel row the header describes is present. Must run
/// before any buffer is sized from the header.
fn check_pixel_data<R: SourceStream>(
    source: &mut R,
    image: &SourceImage,
) -> Result<(), StaffError> {
    let start = u64::from(image.data_offset);
    source.seek_to(start).map_err(StaffError::Seek)?;
    let end = start + u64::from(image.row_size) * u64::from(image.height);
    source.seek_to(end).map_err(StaffError::Read)
}

/// Zeroed row buffer of `len` bytes; allocation failure is an error, not an abort.
fn alloc_row(len: usize) -> Result<Vec<u8>, StaffError> {
    let mut row = Vec::new();
    row.try_reserve_exact(len)
        .map_err(|_| StaffError::OutOfMemory)?;
    row.resize(len, 0);
    Ok(row)
}

/// Write header and pixel rows into `sink`, closing it on return.
///
/// Returns `(source row reads, bytes written)`.
fn stream_rows<R: SourceStream, W: SinkStream>(
    source: &mut R,
    mut sink: W,
    mut cache: RowCache,
    mut out_row: Vec<u8>,
    image: &SourceImage,
    geometry: &ResolvedGeometry,
    stop: &dyn Stop,
) -> Result<(u32, u64), StaffError> {
    let header = encode_header(geometry.out_width, geometry.out_height, geometry.out_size)
        .map_err(StaffError::Write)?;
    sink.write_all_bytes(&header).map_err(StaffError::Write)?;
    let mut written = HEADER_LEN as u64;


    for out_y in (0..geometry.out_height).rev() {
        if out_y % 16 == 0 {
            stop.check()?;
        }
        out_row.fill(0);
        for out_x in 0..geometry.out_width {
            let Some((src_x, src_y)) = geometry.source_pixel(image, out_x, out_y) else {
                continue;
            };
            let row = cache.fetch(source, image, src_y)?;
            let from = src_x as usize * 3;
            let to = out_x as usize * 3;
            out_row[to..to + 3].copy_from_slice(&row[from..from + 3]);
        }
        sink.write_all_bytes(&out_row).map_err(StaffError::Write)?;
        written += out_row.len() as u64;
    }

    sink.flush_bytes().map_err(StaffError::Write)?;
    Ok((cache.reads, written))
}

/// One decoded source row, tagged with the logical row it holds.
pub(crate) struct RowCache {
    row: Vec<u8>,
    index: Option<u32>,
    reads: u32,
}

impl RowCache {
    pub(crate) fn new(row_size: usize) -> Result<Self, StaffError> {
        Ok(Self {
            row: alloc_row(row_size)?,
            index: None,
            reads: 0,
        })
    }

    /// Row `y` of `image`, reading it from `source` unless already cached.
    pub(crate) fn fetch<R: SourceStream>(
        &mut self,
        source: &mut R,
        image: &SourceImage,
        y: u32,
    ) -> Result<&[u8], StaffError> {
        if self.index != Some(y) {
            // a failed read leaves the buffer in an unknown state
            self.index = None;
            trace!("reading source row {y}");
            source
                .seek_to(image.row_offset(y))
                .map_err(StaffError::Seek)?;
            source
                .read_exact_bytes(&mut self.row)
                .map_err(StaffError::Read)?;
            self.index = Some(y);
            self.reads += 1;
        }
        Ok(&self.row)
    }
}
