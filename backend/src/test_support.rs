//! Shared helpers for unit tests. Only compiled under `cfg(test)`.

use std::sync::{Mutex, MutexGuard};

use chrono::{DateTime, Local, TimeDelta, Utc};
use mockable::Clock;

/// Clock that only moves when told to.
pub struct MutableClock(Mutex<DateTime<Utc>>);

impl MutableClock {
    pub fn new(now: DateTime<Utc>) -> Self {
        Self(Mutex::new(now))
    }

    pub fn advance_seconds(&self, seconds: i64) {
        *self.lock_clock() += TimeDelta::seconds(seconds);
    }

    fn lock_clock(&self) -> MutexGuard<'_, DateTime<Utc>> {
        match self.0.lock() {
            Ok(guard) => guard,
            Err(_) => panic!("clock mutex"),
        }
    }
}

impl Clock for MutableClock {
    fn local(&self) -> DateTime<Local> {
        self.utc().with_timezone(&Local)
    }

    fn utc(&self) -> DateTime<Utc> {
        *self.lock_clock()
    }
}

/// Encode a blank RGB PNG of the given size.
pub fn png_bytes(width: u32, height: u32) -> Vec<u8> {
    let mut encoded = Vec::new();
    image::RgbImage::new(width, height)
        .write_to(&mut std::io::Cursor::new(&mut encoded), image::ImageFormat::Png)
        .expect("encode png");
    encoded
}

pub mod cap_fs {
    //! Capability-scoped reads for asserting on stored blobs.

    use std::io;
    use std::path::Path;

    use cap_std::{ambient_authority, fs::Dir};

    /// Read a file relative to `root`.
    pub fn read_relative(root: &Path, relative: &str) -> io::Result<Vec<u8>> {
        Dir::open_ambient_dir(root, ambient_authority())?.read(relative)
    }

    /// Whether a file exists relative to `root`.
    pub fn exists_relative(root: &Path, relative: &str) -> bool {
        Dir::open_ambient_dir(root, ambient_authority())
            .map(|dir| dir.exists(relative))
            .unwrap_or(false)
    }

    /// Number of entries in a subdirectory of `root`, or zero if it is absent.
    pub fn count_entries(root: &Path, relative: &str) -> usize {
        Dir::open_ambient_dir(root, ambient_authority())
            .and_then(|dir| dir.read_dir(relative))
            .map(|entries| entries.count())
            .unwrap_or(0)
    }
}
