use std::{
    fs::File,
    io::Read,
    path::{Path, PathBuf},
    sync::Arc,
};

use alloc::{string::String, vec, vec::Vec};

use crate::{
    error::Error,
    tz::{TimeZone, TimeZoneDatabase},
};

/// The directories searched by [`ZoneInfoDb::from_env`] after `TZDIR`.
const ZONEINFO_DIRECTORIES: &[&str] =
    &["/usr/share/zoneinfo", "/etc/zoneinfo"];

/// A time zone database backed by a zoneinfo directory of TZif files.
///
/// The names of all time zones are collected when the database is opened.
/// Each lookup then reads and parses the corresponding file, so changes to
/// the files on disk are picked up without reopening the database. Lookups
/// are case insensitive.
///
/// Cloning a `ZoneInfoDb` is cheap.
#[derive(Clone, Debug)]
pub struct ZoneInfoDb {
    inner: Arc<ZoneInfoDbInner>,
}

#[derive(Debug)]
struct ZoneInfoDbInner {
    dir: PathBuf,
    /// Sorted by `lower`.
    names: Vec<ZoneInfoName>,
}

/// A single TZif entry in a zoneinfo directory.
#[derive(Clone, Debug)]
struct ZoneInfoName {
    /// The name as it appears on the file system, e.g., `America/New_York`.
    original: String,
    /// The ASCII lowercase version of `original`, used for comparisons.
    lower: String,
}

impl ZoneInfoDb {
    /// Opens the zoneinfo database in the given directory.
    ///
    /// # Errors
    ///
    /// This returns an error when the directory cannot be read or when it
    /// does not contain any TZif files.
    pub fn from_dir(dir: impl AsRef<Path>) -> Result<ZoneInfoDb, Error> {
        let dir = dir.as_ref();
        let mut names = walk(dir)?;
        names.sort_by(|n1, n2| n1.lower.cmp(&n2.lower));
        names.dedup_by(|n1, n2| n1.lower == n2.lower);
        debug!(
            "found {} time zones in zoneinfo directory {}",
            names.len(),
            dir.display(),
        );
        let inner = ZoneInfoDbInner { dir: dir.to_path_buf(), names };
        Ok(ZoneInfoDb { inner: Arc::new(inner) })
    }

    /// Opens the system zoneinfo database.
    ///
    /// When the `TZDIR` environment variable is set, it is tried first.
    /// Then `/usr/share/zoneinfo` and `/etc/zoneinfo` are tried, in that
    /// order. The first directory that opens successfully is used.
    ///
    /// # Errors
    ///
    /// This returns an error when none of the directories could be opened.
    pub fn from_env() -> Result<ZoneInfoDb, Error> {
        if let Some(tzdir) = std::env::var_os("TZDIR") {
            let tzdir = PathBuf::from(tzdir);
            debug!("opening zoneinfo database at TZDIR={}", tzdir.display());
            match ZoneInfoDb::from_dir(&tzdir) {
                Ok(db) => return Ok(db),
                Err(_err) => {
                    warn!("failed opening TZDIR={}: {_err}", tzdir.display());
                }
            }
        }
        for dir in ZONEINFO_DIRECTORIES {
            debug!("opening zoneinfo database at {dir}");
            match ZoneInfoDb::from_dir(dir) {
                Ok(db) => return Ok(db),
                Err(_err) => {
                    debug!("failed opening {dir}: {_err}");
                }
            }
        }
        Err(crate::error::tz::db::Error::ZoneInfoNotFound.into())
    }

    /// Returns the directory this database reads from.
    pub fn dir(&self) -> &Path {
        &self.inner.dir
    }

    fn find(&self, query: &str) -> Option<&ZoneInfoName> {
        let names = &self.inner.names;
        names
            .binary_search_by(|n| cmp_ignore_ascii_case(&n.lower, query))
            .ok()
            .map(|i| &names[i])
    }
}

impl TimeZoneDatabase for ZoneInfoDb {
    fn lookup(&self, name: &str) -> Option<TimeZone> {
        if !is_valid_name(name) {
            trace!("rejecting invalid time zone name `{name}`");
            return None;
        }
        let Some(entry) = self.find(name) else {
            trace!(
                "time zone `{name}` not found in {}",
                self.inner.dir.display(),
            );
            return None;
        };
        let path = self.inner.dir.join(&entry.original);
        match read_tzif(&entry.original, &path) {
            Ok(tz) => Some(tz),
            Err(_err) => {
                warn!(
                    "failed to read time zone from {}: {_err}",
                    path.display(),
                );
                None
            }
        }
    }

    fn available(&self) -> Vec<String> {
        self.inner.names.iter().map(|n| n.original.clone()).collect()
    }
}

fn read_tzif(name: &str, path: &Path) -> Result<TimeZone, Error> {
    let mut data = vec![];
    File::open(path)
        .and_then(|mut file| file.read_to_end(&mut data))
        .map_err(|err| Error::io(err).path(path))?;
    TimeZone::tzif(name, &data).map_err(|err| err.path(path))
}

/// Recursively collects the names of all TZif files under `start`.
///
/// Files that are not TZif (e.g., `zone.tab`) are skipped. An error is
/// returned only when no names at all could be found.
fn walk(start: &Path) -> Result<Vec<ZoneInfoName>, Error> {
    let mut first_err: Option<Error> = None;
    let mut seterr = |path: &Path, err: Error| {
        if first_err.is_none() {
            first_err = Some(err.path(path));
        }
    };

    let mut names = vec![];
    let mut stack = vec![start.to_path_buf()];
    while let Some(dir) = stack.pop() {
        let readdir = match dir.read_dir() {
            Ok(readdir) => readdir,
            Err(err) => {
                info!("error reading {} as a directory: {err}", dir.display());
                seterr(&dir, Error::io(err));
                continue;
            }
        };
        for result in readdir {
            let dent = match result {
                Ok(dent) => dent,
                Err(err) => {
                    seterr(&dir, Error::io(err));
                    continue;
                }
            };
            let path = dent.path();
            match dent.file_type() {
                Ok(file_type) if file_type.is_dir() => {
                    stack.push(path);
                    continue;
                }
                Ok(_) => {}
                Err(err) => {
                    seterr(&path, Error::io(err));
                    continue;
                }
            }
            // Symlinks are assumed to be files.
            let mut magic = [0; 4];
            let read =
                File::open(&path).and_then(|mut f| f.read_exact(&mut magic));
            if let Err(err) = read {
                info!(
                    "failed to read first 4 bytes of {}: {err}",
                    path.display(),
                );
                seterr(&path, Error::io(err));
                continue;
            }
            if &magic != b"TZif" {
                trace!("skipping {} since it is not TZif", path.display());
                continue;
            }
            let Some(original) = relative_name(start, &path) else {
                info!(
                    "skipping {} since its name is not valid",
                    path.display(),
                );
                continue;
            };
            let lower = original.to_ascii_lowercase();
            names.push(ZoneInfoName { original, lower });
        }
    }
    if names.is_empty() {
        if let Some(err) = first_err {
            return Err(err);
        }
        return Err(Error::from_args(format_args!(
            "found no TZif files in {}",
            start.display(),
        )));
    }
    Ok(names)
}

/// Returns the path of `path` relative to `start`, with components joined
/// by `/`, as long as it is a valid time zone name.
fn relative_name(start: &Path, path: &Path) -> Option<String> {
    let relative = path.strip_prefix(start).ok()?;
    let mut name = String::new();
    for component in relative.components() {
        if !name.is_empty() {
            name.push('/');
        }
        name.push_str(component.as_os_str().to_str()?);
    }
    if !is_valid_name(&name) {
        return None;
    }
    Some(name)
}

/// Returns true when `name` is safe to use as a relative path into a
/// zoneinfo directory.
///
/// Identifiers are made of ASCII letters, digits, `/`, `_`, `-` and `+`.
/// Empty components, `.` and `..` are rejected.
fn is_valid_name(name: &str) -> bool {
    !name.is_empty()
        && name.len() <= 255
        && name.bytes().all(|b| {
            b.is_ascii_alphanumeric() || matches!(b, b'/' | b'_' | b'-' | b'+')
        })
        && name.split('/').all(|part| !part.is_empty())
}

fn cmp_ignore_ascii_case(s1: &str, s2: &str) -> core::cmp::Ordering {
    let it1 = s1.as_bytes().iter().map(|&b| b.to_ascii_lowercase());
    let it2 = s2.as_bytes().iter().map(|&b| b.to_ascii_lowercase());
    it1.cmp(it2)
}
