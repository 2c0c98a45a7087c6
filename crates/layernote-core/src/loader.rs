//! Image ingest: reading and decoding uploaded or dropped files.
//!
//! Decoding is the one asynchronous step in the system. The host drives the
//! returned futures and hands the result back to the editor together with the
//! [`LoadTicket`] it captured when the load started; the ticket carries the
//! note generation so a decode that finishes after a note switch is dropped
//! instead of mutating the newly active scene.

use crate::shapes::ImageFormat;
use crate::storage::BoxFuture;
use kurbo::Point;
use thiserror::Error;

/// Errors from reading or decoding an image file.
#[derive(Debug, Error)]
pub enum LoadError {
    /// The payload is not one of the accepted image formats. Callers treat
    /// this as "ignore the drop", not as a user-facing failure.
    #[error("unsupported file type")]
    UnsupportedType,
    #[error("failed to decode image: {0}")]
    Decode(String),
    #[error("io error: {0}")]
    Io(String),
}

/// A decoded image ready for insertion.
#[derive(Debug, Clone)]
pub struct LoadedImage {
    /// The original encoded bytes (kept verbatim for the scene snapshot).
    pub data: Vec<u8>,
    /// Pixel width.
    pub width: u32,
    /// Pixel height.
    pub height: u32,
    /// Detected format.
    pub format: ImageFormat,
}

/// Where an incoming image should land on the page.
#[derive(Debug, Clone, Copy)]
pub enum ImagePlacement {
    /// Picker upload with no pointer position.
    Default,
    /// Drop point; the image is centered under it.
    At(Point),
}

/// Issued by [`crate::Editor::begin_image_load`] when a load starts; redeemed
/// by `complete_image_load` when the decode finishes.
#[derive(Debug, Clone, Copy)]
pub struct LoadTicket {
    pub(crate) generation: u64,
    pub(crate) placement: ImagePlacement,
}

/// Decode image bytes, detecting the format from magic bytes. Non-image
/// payloads fail with [`LoadError::UnsupportedType`] before any decode work.
pub fn load_image_bytes(data: Vec<u8>) -> BoxFuture<'static, Result<LoadedImage, LoadError>> {
    Box::pin(async move {
        let format = ImageFormat::from_magic_bytes(&data).ok_or(LoadError::UnsupportedType)?;

        let decoded =
            image::load_from_memory(&data).map_err(|err| LoadError::Decode(err.to_string()))?;

        Ok(LoadedImage {
            width: decoded.width(),
            height: decoded.height(),
            format,
            data,
        })
    })
}

/// Read and decode an image file. The extension screen mirrors the file
/// picker's image-only filter; anything else is rejected without touching
/// the filesystem.
#[cfg(not(target_arch = "wasm32"))]
pub fn load_image_file(
    path: &std::path::Path,
) -> BoxFuture<'static, Result<LoadedImage, LoadError>> {
    let path = path.to_path_buf();
    Box::pin(async move {
        let ext = path.extension().and_then(|ext| ext.to_str()).unwrap_or("");
        if ImageFormat::from_extension(ext).is_none() {
            return Err(LoadError::UnsupportedType);
        }

        let data = std::fs::read(&path)
            .map_err(|err| LoadError::Io(format!("{}: {}", path.display(), err)))?;
        load_image_bytes(data).await
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn block_on<F: std::future::Future>(f: F) -> F::Output {
        // Simple blocking executor for tests
        use std::task::{Context, Poll, RawWaker, RawWakerVTable, Waker};

        fn dummy_raw_waker() -> RawWaker {
            fn no_op(_: *const ()) {}
            fn clone(_: *const ()) -> RawWaker {
                dummy_raw_waker()
            }
            static VTABLE: RawWakerVTable = RawWakerVTable::new(clone, no_op, no_op, no_op);
            RawWaker::new(std::ptr::null(), &VTABLE)
        }

        let waker = unsafe { Waker::from_raw(dummy_raw_waker()) };
        let mut cx = Context::from_waker(&waker);
        let mut f = std::pin::pin!(f);

        loop {
            match f.as_mut().poll(&mut cx) {
                Poll::Ready(result) => return result,
                Poll::Pending => {}
            }
        }
    }

    /// 1x1 transparent PNG.
    const PNG_1X1: [u8; 70] = [
        0x89, 0x50, 0x4E, 0x47, 0x0D, 0x0A, 0x1A, 0x0A, 0x00, 0x00, 0x00, 0x0D, 0x49, 0x48, 0x44,
        0x52, 0x00, 0x00, 0x00, 0x01, 0x00, 0x00, 0x00, 0x01, 0x08, 0x06, 0x00, 0x00, 0x00, 0x1F,
        0x15, 0xC4, 0x89, 0x00, 0x00, 0x00, 0x0D, 0x49, 0x44, 0x41, 0x54, 0x78, 0xDA, 0x63, 0x64,
        0x60, 0xF8, 0x5F, 0x0F, 0x00, 0x02, 0x87, 0x01, 0x80, 0xEB, 0x47, 0xBA, 0x92, 0x00, 0x00,
        0x00, 0x00, 0x49, 0x45, 0x4E, 0x44, 0xAE, 0x42, 0x60, 0x82,
    ];

    #[test]
    fn test_decode_png() {
        let loaded = block_on(load_image_bytes(PNG_1X1.to_vec())).unwrap();
        assert_eq!(loaded.width, 1);
        assert_eq!(loaded.height, 1);
        assert_eq!(loaded.format, ImageFormat::Png);
        assert_eq!(loaded.data, PNG_1X1.to_vec());
    }

    #[test]
    fn test_non_image_bytes_rejected() {
        let result = block_on(load_image_bytes(b"just some text".to_vec()));
        assert!(matches!(result, Err(LoadError::UnsupportedType)));
    }

    #[cfg(not(target_arch = "wasm32"))]
    #[test]
    fn test_non_image_extension_rejected() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("notes.txt");
        std::fs::write(&path, b"hello").unwrap();

        let result = block_on(load_image_file(&path));
        assert!(matches!(result, Err(LoadError::UnsupportedType)));
    }

    #[cfg(not(target_arch = "wasm32"))]
    #[test]
    fn test_load_image_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("pixel.png");
        std::fs::write(&path, PNG_1X1).unwrap();

        let loaded = block_on(load_image_file(&path)).unwrap();
        assert_eq!((loaded.width, loaded.height), (1, 1));
    }

    #[cfg(not(target_arch = "wasm32"))]
    #[test]
    fn test_missing_file_is_io_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("gone.png");

        let result = block_on(load_image_file(&path));
        assert!(matches!(result, Err(LoadError::Io(_))));
    }
}
