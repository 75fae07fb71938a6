use super::CaptureSource;
use anyhow::{Context, Result};
use image::RgbImage;
use std::collections::VecDeque;
use std::path::{Path, PathBuf};

const IMAGE_EXTENSIONS: [&str; 5] = ["jpg", "jpeg", "png", "bmp", "webp"];

/// Replays still images as a frame sequence
///
/// Directories are expanded to the image files they contain, in name order.
pub struct ImageSequence {
    paths: VecDeque<PathBuf>,
    // Size of the most recent frame, (0, 0) before the first
    last_size: (u32, u32),
}

impl ImageSequence {
    pub fn new<P: AsRef<Path>>(inputs: &[P]) -> Result<Self> {
        let mut paths = VecDeque::new();
        for input in inputs {
            let input = input.as_ref();
            if input.is_dir() {
                let mut entries = std::fs::read_dir(input)
                    .with_context(|| format!("Failed to read directory {}", input.display()))?
                    .filter_map(|entry| entry.ok().map(|e| e.path()))
                    .filter(|path| is_image(path))
                    .collect::<Vec<_>>();
                entries.sort();
                paths.extend(entries);
            } else {
                paths.push_back(input.to_path_buf());
            }
        }

        tracing::info!("Image sequence with {} frames", paths.len());

        Ok(Self {
            paths,
            last_size: (0, 0),
        })
    }

    pub fn remaining(&self) -> usize {
        self.paths.len()
    }
}

fn is_image(path: &Path) -> bool {
    path.extension()
        .and_then(|ext| ext.to_str())
        .map(|ext| IMAGE_EXTENSIONS.contains(&ext.to_ascii_lowercase().as_str()))
        .unwrap_or(false)
}

impl CaptureSource for ImageSequence {
    fn capture_frame(&mut self) -> Result<Option<RgbImage>> {
        let Some(path) = self.paths.pop_front() else {
            return Ok(None);
        };

        let frame = image::open(&path)
            .with_context(|| format!("Failed to read image {}", path.display()))?
            .to_rgb8();
        self.last_size = frame.dimensions();
        Ok(Some(frame))
    }

    fn resolution(&self) -> (u32, u32) {
        self.last_size
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::Rgb;

    fn scratch_dir(name: &str) -> PathBuf {
        let dir = std::env::temp_dir().join(format!("gesturecam-{}-{}", name, std::process::id()));
        std::fs::create_dir_all(&dir).unwrap();
        dir
    }

    #[test]
    fn test_directory_in_name_order() {
        let dir = scratch_dir("sequence");
        RgbImage::from_pixel(4, 4, Rgb([255, 0, 0]))
            .save(dir.join("b.png"))
            .unwrap();
        RgbImage::from_pixel(6, 2, Rgb([0, 255, 0]))
            .save(dir.join("a.png"))
            .unwrap();
        std::fs::write(dir.join("notes.txt"), "skip me").unwrap();

        let mut source = ImageSequence::new(&[&dir]).unwrap();
        assert_eq!(source.remaining(), 2);
        assert_eq!(source.resolution(), (0, 0));

        let first = source.capture_frame().unwrap().unwrap();
        assert_eq!(first.dimensions(), (6, 2));
        assert_eq!(source.resolution(), (6, 2));
        let second = source.capture_frame().unwrap().unwrap();
        assert_eq!(*second.get_pixel(0, 0), Rgb([255, 0, 0]));
        assert!(source.capture_frame().unwrap().is_none());

        std::fs::remove_dir_all(&dir).unwrap();
    }

    #[test]
    fn test_missing_file_is_an_error() {
        let mut source = ImageSequence::new(&["/nonexistent/frame.png"]).unwrap();
        assert!(source.capture_frame().is_err());
    }

    #[test]
    fn test_is_image() {
        assert!(is_image(Path::new("frame.JPG")));
        assert!(is_image(Path::new("dir/frame.png")));
        assert!(!is_image(Path::new("frame")));
        assert!(!is_image(Path::new("frame.txt")));
    }
}
