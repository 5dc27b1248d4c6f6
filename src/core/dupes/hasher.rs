//! Perceptual hashing for duplicate detection.
//!
//! Uses the DCT-based pHash from the image_hasher crate: robust to
//! re-encoding and resizing, which is exactly what separates an exported
//! thumbnail from its original.

use image_hasher::{HashAlg, HasherConfig};
use std::path::Path;

/// A computed perceptual hash
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Phash {
    bytes: Vec<u8>,
}

impl Phash {
    /// Hamming distance: the number of differing bits
    pub fn distance(&self, other: &Phash) -> u32 {
        self.bytes
            .iter()
            .zip(other.bytes.iter())
            .map(|(a, b)| (a ^ b).count_ones())
            .sum()
    }

    /// Hexadecimal rendering for the report
    pub fn to_hex(&self) -> String {
        self.bytes.iter().map(|b| format!("{:02x}", b)).collect()
    }
}

/// Computes DCT-based perceptual hashes over normalized images
pub struct PerceptualHasher {
    hasher: image_hasher::Hasher,
    resize: u32,
}

impl PerceptualHasher {
    /// `hash_size` bits per side (8 -> 64-bit hash), `resize` is the square
    /// resolution images are normalized to before hashing.
    pub fn new(hash_size: u32, resize: u32) -> Self {
        let hasher = HasherConfig::new()
            .hash_size(hash_size, hash_size)
            .hash_alg(HashAlg::Mean)
            .preproc_dct()
            .to_hasher();
        Self { hasher, resize }
    }

    /// Hash an image file, or `None` if it cannot be decoded.
    ///
    /// A failed hash is a domain outcome - the entry is still reported,
    /// just without duplicate links.
    pub fn hash_file(&self, path: &Path) -> Option<Phash> {
        let img = match image::open(path) {
            Ok(img) => img,
            Err(e) => {
                tracing::debug!(path = %path.display(), error = %e, "image decode failed");
                return None;
            }
        };
        let normalized = img.resize_exact(
            self.resize,
            self.resize,
            image::imageops::FilterType::Triangle,
        );
        let hash = self.hasher.hash_image(&normalized);
        Some(Phash {
            bytes: hash.as_bytes().to_vec(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::{ImageBuffer, Rgb};
    use tempfile::TempDir;

    fn write_gradient(dir: &TempDir, name: &str, tint: u8) -> std::path::PathBuf {
        let img = ImageBuffer::from_fn(120, 120, |x, y| {
            Rgb([(x as u8).wrapping_add(tint), y as u8, 128u8])
        });
        let path = dir.path().join(name);
        img.save(&path).unwrap();
        path
    }

    #[test]
    fn identical_files_hash_identically() {
        let temp = TempDir::new().unwrap();
        let a = write_gradient(&temp, "a.png", 0);
        let b = write_gradient(&temp, "b.png", 0);

        let hasher = PerceptualHasher::new(8, 64);
        let hash_a = hasher.hash_file(&a).unwrap();
        let hash_b = hasher.hash_file(&b).unwrap();
        assert_eq!(hash_a.distance(&hash_b), 0);
    }

    #[test]
    fn slightly_tinted_copy_stays_close() {
        let temp = TempDir::new().unwrap();
        let a = write_gradient(&temp, "a.png", 0);
        let b = write_gradient(&temp, "b.png", 4);

        let hasher = PerceptualHasher::new(8, 64);
        let hash_a = hasher.hash_file(&a).unwrap();
        let hash_b = hasher.hash_file(&b).unwrap();
        assert!(hash_a.distance(&hash_b) <= 5);
    }

    #[test]
    fn unreadable_file_hashes_to_none() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("broken.jpg");
        std::fs::write(&path, b"definitely not an image").unwrap();

        let hasher = PerceptualHasher::new(8, 64);
        assert!(hasher.hash_file(&path).is_none());
    }

    #[test]
    fn hex_rendering_is_fixed_length() {
        let temp = TempDir::new().unwrap();
        let a = write_gradient(&temp, "a.png", 0);

        let hasher = PerceptualHasher::new(8, 64);
        let hex = hasher.hash_file(&a).unwrap().to_hex();
        // 64-bit hash -> 16 hex characters
        assert_eq!(hex.len(), 16);
        assert!(hex.chars().all(|c| c.is_ascii_hexdigit()));
    }
}
