//! PNG read/write for captured frames

use crate::frame::{Frame, FrameError};
use std::fs::{self, File};
use std::io::{BufReader, BufWriter, Write};
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Directory recordings are written to unless configured otherwise
pub const DEFAULT_OUTPUT_DIR: &str = "resources";

/// Storage-related errors
#[derive(Error, Debug)]
pub enum StorageError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("PNG encoding error: {0}")]
    Encoding(#[from] png::EncodingError),

    #[error("PNG decoding error: {0}")]
    Decoding(#[from] png::DecodingError),

    #[error("Unsupported PNG color type: {0:?}")]
    UnsupportedColor(png::ColorType),

    #[error("Invalid frame: {0}")]
    InvalidFrame(#[from] FrameError),
}

/// A save that stopped part-way through.
///
/// Files written before the failure are left in place.
#[derive(Error, Debug)]
#[error("Saved {written} frame(s) before failing: {source}")]
pub struct SaveError {
    /// Number of frames successfully written
    pub written: usize,

    #[source]
    pub source: StorageError,
}

/// Path of the image file for the frame at `index`
pub fn frame_path(dir: &Path, index: usize) -> PathBuf {
    dir.join(format!("frame_{index}.png"))
}

/// Write every frame as `frame_<index>.png` into `dir`, creating it if needed.
///
/// Existing files with the same names are overwritten. Returns the written paths in
/// capture order.
pub fn save_frames_as_images<'a, I>(frames: I, dir: &Path) -> Result<Vec<PathBuf>, SaveError>
where
    I: IntoIterator<Item = &'a Frame>,
{
    fs::create_dir_all(dir).map_err(|e| SaveError {
        written: 0,
        source: e.into(),
    })?;

    let mut written = Vec::new();
    for (index, frame) in frames.into_iter().enumerate() {
        let path = frame_path(dir, index);
        write_frame(frame, &path).map_err(|source| SaveError {
            written: written.len(),
            source,
        })?;
        written.push(path);
    }

    tracing::debug!("Saved {} frame(s) to {:?}", written.len(), dir);

    Ok(written)
}

/// Write a single frame as an RGBA8 PNG file
pub fn write_frame(frame: &Frame, path: &Path) -> Result<(), StorageError> {
    let file = File::create(path)?;
    let mut out = BufWriter::new(file);
    encode_into(frame, &mut out)?;
    out.flush()?;
    Ok(())
}

/// Encode a frame into an in-memory PNG
pub fn encode_png(frame: &Frame) -> Result<Vec<u8>, StorageError> {
    let mut bytes = Vec::new();
    encode_into(frame, &mut bytes)?;
    Ok(bytes)
}

fn encode_into<W: Write>(frame: &Frame, out: W) -> Result<(), StorageError> {
    let mut encoder = png::Encoder::new(out, frame.width(), frame.height());
    encoder.set_color(png::ColorType::Rgba);
    encoder.set_depth(png::BitDepth::Eight);
    // Screen frames are large; favour speed over size.
    encoder.set_compression(png::Compression::Fast);

    let mut writer = encoder.write_header()?;
    writer.write_image_data(frame.pixels())?;
    writer.finish()?;
    Ok(())
}

/// Load a PNG file back into a frame
pub fn read_frame(path: &Path) -> Result<Frame, StorageError> {
    let file = File::open(path)?;
    let mut decoder = png::Decoder::new(BufReader::new(file));
    decoder.set_transformations(png::Transformations::EXPAND | png::Transformations::STRIP_16);
    let mut reader = decoder.read_info()?;

    let mut buf = vec![0; reader.output_buffer_size()];
    let info = reader.next_frame(&mut buf)?;

    let data = match info.color_type {
        png::ColorType::Rgba => {
            buf.truncate(info.buffer_size());
            buf
        }
        png::ColorType::Rgb => {
            // Add alpha channel
            let rgb = &buf[..info.buffer_size()];
            let mut rgba = Vec::with_capacity(rgb.len() / 3 * 4);
            for chunk in rgb.chunks(3) {
                rgba.extend_from_slice(chunk);
                rgba.push(255);
            }
            rgba
        }
        other => return Err(StorageError::UnsupportedColor(other)),
    };

    Ok(Frame::from_rgba(info.width, info.height, data)?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    fn gradient(width: u32, height: u32, seed: u8) -> Frame {
        let pixels = (0..width * height)
            .flat_map(|i| [seed, (i % 251) as u8, (i / 7) as u8, 255])
            .collect();
        Frame::from_rgba(width, height, pixels).unwrap()
    }

    #[test]
    fn test_frame_path_is_zero_based() {
        let dir = Path::new("out");
        assert_eq!(frame_path(dir, 0), Path::new("out/frame_0.png"));
        assert_eq!(frame_path(dir, 12), Path::new("out/frame_12.png"));
    }

    #[test]
    fn test_save_creates_directory_and_numbered_files() {
        let dir = tempdir().unwrap();
        let output = dir.path().join("nested").join("resources");
        let frames: Vec<Frame> = (0..3).map(|i| gradient(8, 5, i)).collect();

        let written = save_frames_as_images(&frames, &output).unwrap();

        assert_eq!(written.len(), 3);
        let mut names: Vec<String> = fs::read_dir(&output)
            .unwrap()
            .map(|e| e.unwrap().file_name().to_string_lossy().to_string())
            .collect();
        names.sort();
        assert_eq!(names, vec!["frame_0.png", "frame_1.png", "frame_2.png"]);

        for (index, frame) in frames.iter().enumerate() {
            let loaded = read_frame(&frame_path(&output, index)).unwrap();
            assert!(loaded.same_raster(frame), "frame {index} differs after reload");
        }
    }

    #[test]
    fn test_save_overwrites_existing_files() {
        let dir = tempdir().unwrap();
        save_frames_as_images(&[gradient(4, 4, 1)], dir.path()).unwrap();

        let replacement = gradient(6, 2, 9);
        save_frames_as_images(&[replacement.clone()], dir.path()).unwrap();

        let loaded = read_frame(&frame_path(dir.path(), 0)).unwrap();
        assert!(loaded.same_raster(&replacement));
    }

    #[test]
    fn test_save_empty_sequence_only_creates_directory() {
        let dir = tempdir().unwrap();
        let output = dir.path().join("resources");

        let written = save_frames_as_images(&Vec::<Frame>::new(), &output).unwrap();

        assert!(written.is_empty());
        assert!(output.is_dir());
        assert_eq!(fs::read_dir(&output).unwrap().count(), 0);
    }

    #[test]
    fn test_save_reports_partial_progress() {
        let dir = tempdir().unwrap();
        let output = dir.path().join("resources");
        fs::create_dir_all(&output).unwrap();
        // A directory squatting on frame_1.png makes the second write fail
        fs::create_dir_all(frame_path(&output, 1)).unwrap();

        let frames: Vec<Frame> = (0..3).map(|i| gradient(2, 2, i)).collect();
        let err = save_frames_as_images(&frames, &output).unwrap_err();

        assert_eq!(err.written, 1);
        assert!(matches!(err.source, StorageError::Io(_)));
        assert!(frame_path(&output, 0).is_file());
        assert!(!frame_path(&output, 2).exists());
    }

    #[test]
    fn test_save_fails_when_directory_is_a_file() {
        let dir = tempdir().unwrap();
        let output = dir.path().join("resources");
        fs::write(&output, b"not a directory").unwrap();

        let err = save_frames_as_images(&[gradient(2, 2, 0)], &output).unwrap_err();
        assert_eq!(err.written, 0);
    }

    #[test]
    fn test_encode_png_decodes_back() {
        let frame = gradient(3, 3, 42);
        let bytes = encode_png(&frame).unwrap();
        assert_eq!(&bytes[..8], b"\x89PNG\r\n\x1a\n");

        let dir = tempdir().unwrap();
        let path = dir.path().join("frame.png");
        fs::write(&path, &bytes).unwrap();
        assert!(read_frame(&path).unwrap().same_raster(&frame));
    }

    #[test]
    fn test_read_rgb_png_adds_alpha() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("rgb.png");
        {
            let file = File::create(&path).unwrap();
            let mut encoder = png::Encoder::new(BufWriter::new(file), 2, 1);
            encoder.set_color(png::ColorType::Rgb);
            encoder.set_depth(png::BitDepth::Eight);
            let mut writer = encoder.write_header().unwrap();
            writer.write_image_data(&[10, 20, 30, 40, 50, 60]).unwrap();
        }

        let frame = read_frame(&path).unwrap();
        assert_eq!(frame.pixels(), &[10, 20, 30, 255, 40, 50, 60, 255]);
    }
}
