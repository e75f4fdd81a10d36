//! # staffbmp
//!
//! Bounded-memory BMP scaling and rotation for devices without room for a
//! full frame buffer.
//!
//! A 24-bit uncompressed BMP is read row by row from a [`Storage`] and
//! rewritten at a caller-chosen width, optionally rotated 90° clockwise.
//! The output never exceeds a 64,000-byte pixel budget ([`Limits`]); at any
//! time only one source row and one output row are held in memory.
//!
//! ## Supported Formats
//!
//! - Input: uncompressed 24-bit BMP, bottom-up or top-down
//! - Output: uncompressed 24-bit bottom-up BMP, 54-byte header, 72 DPI
//!
//! ## Non-Goals
//!
//! - Palette, RLE, bitfield or 16/32-bit BMP input
//! - Filtering beyond nearest neighbour, colour management
//! - Rotation by anything but 90° clockwise
//!
//! ## Usage
//!
//! ```
//! use staffbmp::{MemStorage, process_bmp_to_staff, upsert_image_in_list};
//!
//! let mut storage = MemStorage::new();
//! // 1x1 bottom-up BMP holding one blue pixel
//! let mut bmp = vec![0u8; 58];
//! bmp[0..2].copy_from_slice(b"BM");
//! bmp[10..14].copy_from_slice(&54u32.to_le_bytes());
//! bmp[14..18].copy_from_slice(&40u32.to_le_bytes());
//! bmp[18..22].copy_from_slice(&1i32.to_le_bytes());
//! bmp[22..26].copy_from_slice(&1i32.to_le_bytes());
//! bmp[26..28].copy_from_slice(&1u16.to_le_bytes());
//! bmp[28..30].copy_from_slice(&24u16.to_le_bytes());
//! bmp[54] = 0xff;
//! storage.insert("/upload.bmp", bmp);
//!
//! let result = process_bmp_to_staff(&mut storage, "/upload.bmp", "/staff.bmp", 4, 100, false, 0);
//! assert!(result.ok, "{}", result.message);
//! assert_eq!((result.out_width, result.out_height), (4, 4));
//!
//! upsert_image_in_list(&mut storage, "/images.txt", "staff.bmp")?;
//! # Ok::<(), staffbmp::StorageError>(())
//! ```

#![cfg_attr(not(feature = "std"), no_std)]
#![forbid(unsafe_code)]

extern crate alloc;

pub mod bmp;
mod cursor;
mod error;
mod geometry;
mod image_list;
mod limits;
mod storage;
mod transcode;

// Re-exports
pub use bmp::SourceImage;
pub use enough::{Stop, Unstoppable};
pub use error::{ErrorKind, StaffError, StorageError};
pub use geometry::{OutputSpec, ResolvedGeometry};
pub use image_list::{
    list_bmp_files, parse_image_list, read_image_list, upsert_image_in_list, write_image_list,
};
pub use limits::{DEFAULT_OUTPUT_BUDGET, Limits};
#[cfg(feature = "std")]
pub use storage::{FsSink, FsSource, FsStorage};
pub use storage::{MemSink, MemSource, MemStorage, SinkStream, SourceStream, Storage};
pub use transcode::{ConvertRequest, Converted, ImageProcessResult, process_bmp_to_staff};
