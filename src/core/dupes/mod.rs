//! # Dupes Module
//!
//! Folder-local duplicate detection by perceptual hash.
//!
//! ## How It Works
//! 1. Hash every image in the folder (normalized to a fixed square size)
//! 2. Split into "big" and "small" pools at a size threshold
//! 3. Compare every big x small pair; close hashes link the small image to
//!    the big one it probably duplicates
//!
//! Only cross-pool pairs are compared - the point is to find re-exported
//! thumbnails of full-size originals, not to cluster albums. Pools never
//! cross folder boundaries.

mod hasher;

pub use hasher::{PerceptualHasher, Phash};

use rayon::prelude::*;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

use crate::core::config::TriageConfig;
use crate::core::scanner::MediaFile;

/// Duplicate classification of an image
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum DupeType {
    /// Not linked to anything
    #[default]
    None,
    /// A large image that at least one small image duplicates
    Big,
    /// A small image linked to a big original
    Small,
}

impl DupeType {
    /// Report spelling ("", "dupe_big", "dupe_small")
    pub fn as_str(&self) -> &'static str {
        match self {
            DupeType::None => "",
            DupeType::Big => "dupe_big",
            DupeType::Small => "dupe_small",
        }
    }
}

/// One report row of the duplicate scan
#[derive(Debug, Clone, Serialize)]
pub struct DupeEntry {
    /// Path to the image
    pub file: PathBuf,
    /// File size in bytes
    pub size: u64,
    /// Hex-rendered perceptual hash, or `None` if the image was unreadable
    pub phash: Option<String>,
    /// Duplicate classification
    pub dupe_type: DupeType,
    /// For `dupe_small` entries, the big image this one duplicates
    pub dupe_of: Option<PathBuf>,
}

/// Hash and cross-compare the images of a single folder.
///
/// `files` must already be filtered to supported extensions and skiplist
/// survivors. Output order is all big-pool entries in input order, then all
/// small-pool entries in input order.
pub fn evaluate_folder(
    files: &[MediaFile],
    hasher: &PerceptualHasher,
    config: &TriageConfig,
) -> Vec<DupeEntry> {
    // Hash in parallel; indexed collect keeps input order
    let hashes: Vec<Option<Phash>> = files
        .par_iter()
        .map(|file| hasher.hash_file(&file.path))
        .collect();

    let mut bigs: Vec<(DupeEntry, Option<Phash>)> = Vec::new();
    let mut smalls: Vec<(DupeEntry, Option<Phash>)> = Vec::new();

    for (file, phash) in files.iter().zip(hashes) {
        let entry = DupeEntry {
            file: file.path.clone(),
            size: file.size,
            phash: phash.as_ref().map(Phash::to_hex),
            dupe_type: DupeType::None,
            dupe_of: None,
        };
        if file.size >= config.size_threshold_bytes {
            bigs.push((entry, phash));
        } else {
            smalls.push((entry, phash));
        }
    }

    // Cross-pool comparison only. Iteration order is part of the contract:
    // a small matching several bigs keeps the last one.
    for (big, big_hash) in bigs.iter_mut() {
        let Some(big_hash) = big_hash else { continue };
        for (small, small_hash) in smalls.iter_mut() {
            let Some(small_hash) = small_hash else { continue };
            if big_hash.distance(small_hash) <= config.distance_threshold {
                big.dupe_type = DupeType::Big;
                small.dupe_type = DupeType::Small;
                small.dupe_of = Some(big.file.clone());
            }
        }
    }

    bigs.into_iter()
        .chain(smalls)
        .map(|(entry, _)| entry)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::{ImageBuffer, Rgb};
    use std::fs;
    use std::path::Path;
    use tempfile::TempDir;

    /// Write a gradient PNG and pad it to the requested size so the pool
    /// split is driven by file size, not pixel content.
    fn write_sized_image(dir: &Path, name: &str, tint: u8, pad_to: u64) -> MediaFile {
        let img = ImageBuffer::from_fn(120, 120, |x, y| {
            Rgb([(x as u8).wrapping_add(tint), y as u8, 64u8])
        });
        let path = dir.join(name);
        img.save(&path).unwrap();

        let current = fs::metadata(&path).unwrap().len();
        if current < pad_to {
            // PNG decoders ignore trailing bytes
            let mut bytes = fs::read(&path).unwrap();
            bytes.resize(pad_to as usize, 0);
            fs::write(&path, bytes).unwrap();
        }

        let metadata = fs::metadata(&path).unwrap();
        MediaFile {
            path,
            size: metadata.len(),
            modified: metadata.modified().unwrap(),
        }
    }

    fn test_config() -> TriageConfig {
        // Low threshold so the fixtures stay small
        TriageConfig::default().with_size_threshold(10 * 1024)
    }

    #[test]
    fn near_identical_pair_is_linked() {
        let temp = TempDir::new().unwrap();
        let big = write_sized_image(temp.path(), "original.png", 0, 20 * 1024);
        let small = write_sized_image(temp.path(), "thumb.png", 0, 0);

        let config = test_config();
        let hasher = PerceptualHasher::new(config.hash_size, config.phash_resize);
        let entries = evaluate_folder(&[big.clone(), small], &hasher, &config);

        assert_eq!(entries.len(), 2);
        assert_eq!(entries[0].dupe_type, DupeType::Big);
        assert_eq!(entries[1].dupe_type, DupeType::Small);
        assert_eq!(entries[1].dupe_of.as_ref(), Some(&big.path));
    }

    #[test]
    fn distant_pair_is_not_linked() {
        let temp = TempDir::new().unwrap();
        let big = write_sized_image(temp.path(), "original.png", 0, 20 * 1024);

        // Checkerboard against a smooth ramp: hashes far apart
        let other = ImageBuffer::from_fn(120, 120, |x, y| {
            let cell = ((x / 15) + (y / 15)) % 2;
            Rgb([if cell == 0 { 255 } else { 0 }, 32u8, 64u8])
        });
        let other_path = temp.path().join("other.png");
        other.save(&other_path).unwrap();
        let metadata = fs::metadata(&other_path).unwrap();
        let small = MediaFile {
            path: other_path,
            size: metadata.len(),
            modified: metadata.modified().unwrap(),
        };

        let config = test_config();
        let hasher = PerceptualHasher::new(config.hash_size, config.phash_resize);
        let entries = evaluate_folder(&[big, small], &hasher, &config);

        assert!(entries.iter().all(|e| e.dupe_type == DupeType::None));
        assert!(entries.iter().all(|e| e.dupe_of.is_none()));
    }

    #[test]
    fn same_pool_pairs_are_never_compared() {
        let temp = TempDir::new().unwrap();
        // Two identical big images: same pool, must not link to each other
        let a = write_sized_image(temp.path(), "a.png", 0, 20 * 1024);
        let b = write_sized_image(temp.path(), "b.png", 0, 20 * 1024);

        let config = test_config();
        let hasher = PerceptualHasher::new(config.hash_size, config.phash_resize);
        let entries = evaluate_folder(&[a, b], &hasher, &config);

        assert!(entries.iter().all(|e| e.dupe_type == DupeType::None));
    }

    #[test]
    fn unreadable_image_is_still_reported() {
        let temp = TempDir::new().unwrap();
        let big = write_sized_image(temp.path(), "original.png", 0, 20 * 1024);

        let broken_path = temp.path().join("broken.jpg");
        fs::write(&broken_path, b"not an image").unwrap();
        let broken = MediaFile {
            path: broken_path,
            size: 12,
            modified: std::time::SystemTime::UNIX_EPOCH,
        };

        let config = test_config();
        let hasher = PerceptualHasher::new(config.hash_size, config.phash_resize);
        let entries = evaluate_folder(&[big, broken], &hasher, &config);

        assert_eq!(entries.len(), 2);
        let broken_entry = entries.iter().find(|e| e.phash.is_none()).unwrap();
        assert_eq!(broken_entry.dupe_type, DupeType::None);
        assert!(broken_entry.dupe_of.is_none());
    }

    #[test]
    fn output_order_is_bigs_then_smalls_in_input_order() {
        let temp = TempDir::new().unwrap();
        let small_one = write_sized_image(temp.path(), "s1.png", 10, 0);
        let big_one = write_sized_image(temp.path(), "b1.png", 40, 20 * 1024);
        let small_two = write_sized_image(temp.path(), "s2.png", 70, 0);
        let big_two = write_sized_image(temp.path(), "b2.png", 100, 20 * 1024);

        let config = test_config();
        let hasher = PerceptualHasher::new(config.hash_size, config.phash_resize);
        let entries = evaluate_folder(
            &[small_one, big_one.clone(), small_two, big_two.clone()],
            &hasher,
            &config,
        );

        let names: Vec<_> = entries
            .iter()
            .map(|e| e.file.file_name().unwrap().to_string_lossy().to_string())
            .collect();
        assert_eq!(names, vec!["b1.png", "b2.png", "s1.png", "s2.png"]);
    }
}
