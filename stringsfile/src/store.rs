//! The in-memory strings store.
//!
//! [`StringsFile`] holds a byte-wise sorted `Vec<Pair>` behind a
//! reader-writer lock. Keyed lookups take the read lock and only upgrade to
//! the write lock when a previous insert left the vector unsorted.

use std::borrow::Cow;
use std::fs::File;
use std::io::Read;
use std::path::Path;
use std::sync::{Mutex, PoisonError, RwLock, RwLockReadGuard, RwLockWriteGuard};

use tracing::{debug, warn};

use crate::error::Error;
use crate::pair::{Pair, normalize_comment};
use crate::parser;
use crate::printf::{self, FormatArg};

/// Number of pairs reserved each time the vector runs out of room.
const GROWTH: usize = 32;

/// Maximum size of the last-error message, in bytes.
pub const MAX_ERROR_LEN: usize = 255;

/// Smallest buffer [`StringsFile::format_string`] accepts.
pub const MIN_FORMAT_CAPACITY: usize = 10;

const ALLOCATION_MESSAGE: &str = "Unable to allocate memory for pair.";

/// Pairs plus the needs-sort flag, guarded together by the store's lock.
#[derive(Debug, Default)]
pub(crate) struct Inner {
    pairs: Vec<Pair>,
    need_sort: bool,
}

impl Inner {
    pub(crate) fn pairs(&self) -> &[Pair] {
        &self.pairs
    }

    pub(crate) fn len(&self) -> usize {
        self.pairs.len()
    }

    pub(crate) fn is_empty(&self) -> bool {
        self.pairs.is_empty()
    }

    /// Sorts pairs appended since the last sort and drops later duplicates,
    /// so the first pair stored under a key wins.
    pub(crate) fn sort_if_needed(&mut self) {
        if self.need_sort {
            // Stable and linear for a sorted run followed by appended pairs.
            self.pairs.sort();
            self.pairs.dedup_by(|later, earlier| later.key == earlier.key);
            self.need_sort = false;
        }
    }

    /// Binary search by key. The pairs must be sorted.
    pub(crate) fn find_pair(&self, key: &str) -> Option<usize> {
        debug_assert!(!self.need_sort);
        self.pairs.binary_search_by(|pair| pair.cmp_key(key)).ok()
    }

    fn reserve_one(&mut self) -> Result<(), Error> {
        if self.pairs.len() == self.pairs.capacity() {
            self.pairs
                .try_reserve(GROWTH)
                .map_err(|_| Error::Allocation(ALLOCATION_MESSAGE.to_string()))?;
        }
        Ok(())
    }

    /// Appends a pair and marks the vector for sorting.
    ///
    /// Duplicates are resolved by the next [`sort_if_needed`](Self::sort_if_needed).
    pub(crate) fn add_pair(
        &mut self,
        key: String,
        text: String,
        comment: Option<String>,
    ) -> Result<(), Error> {
        self.reserve_one()?;
        self.pairs.push(Pair {
            key,
            text,
            comment: normalize_comment(comment),
        });
        if self.pairs.len() > 1 {
            self.need_sort = true;
        }
        Ok(())
    }

    /// Inserts a pair at its sorted position.
    ///
    /// Returns `false` without touching the store when the key is present.
    pub(crate) fn insert_pair(
        &mut self,
        key: String,
        text: String,
        comment: Option<String>,
    ) -> Result<bool, Error> {
        self.sort_if_needed();
        let Err(index) = self.pairs.binary_search_by(|pair| pair.cmp_key(&key)) else {
            return Ok(false);
        };
        self.reserve_one()?;
        self.pairs.insert(
            index,
            Pair {
                key,
                text,
                comment: normalize_comment(comment),
            },
        );
        Ok(true)
    }

    pub(crate) fn remove_pair(&mut self, index: usize) -> Pair {
        self.pairs.remove(index)
    }

    fn pair_mut(&mut self, key: &str) -> Option<&mut Pair> {
        self.sort_if_needed();
        let index = self.find_pair(key)?;
        self.pairs.get_mut(index)
    }
}

/// Truncates `s` to at most `max` bytes without splitting a character.
pub(crate) fn truncate_at_boundary(s: &mut String, max: usize) {
    if s.len() <= max {
        return;
    }
    let mut end = max;
    while !s.is_char_boundary(end) {
        end -= 1;
    }
    s.truncate(end);
}

/// A thread-safe collection of localized strings keyed by source text.
///
/// ```
/// use stringsfile::StringsFile;
///
/// let strings = StringsFile::new();
/// strings.load_from_str(r#""Hello" = "Bonjour";"#).unwrap();
/// assert_eq!(strings.get_string("Hello"), "Bonjour");
/// assert_eq!(strings.get_string("Goodbye"), "Goodbye");
/// ```
#[derive(Debug, Default)]
pub struct StringsFile {
    inner: RwLock<Inner>,
    error: Mutex<String>,
}

impl StringsFile {
    /// Creates an empty store.
    pub fn new() -> Self {
        Self::default()
    }

    fn read(&self) -> RwLockReadGuard<'_, Inner> {
        self.inner.read().unwrap_or_else(PoisonError::into_inner)
    }

    fn write(&self) -> RwLockWriteGuard<'_, Inner> {
        self.inner.write().unwrap_or_else(PoisonError::into_inner)
    }

    /// Runs `f` against sorted pairs, upgrading to the write lock only when a
    /// sort is pending.
    fn with_sorted<R>(&self, f: impl FnOnce(&Inner) -> R) -> R {
        {
            let guard = self.read();
            if !guard.need_sort {
                return f(&guard);
            }
        }

        let mut guard = self.write();
        guard.sort_if_needed();
        f(&guard)
    }

    /// Loads `.strings` data from a file.
    ///
    /// The file is read fully before the store is locked. A UTF-16 or UTF-8
    /// byte order mark is honored; without one the data is taken as UTF-8.
    pub fn load_from_file(&self, path: impl AsRef<Path>) -> Result<(), Error> {
        let path = non_empty_path(path.as_ref())?;
        debug!(path = %path.display(), "loading strings file");

        let data = match read_strings_file(path) {
            Ok(data) => data,
            Err(err) => {
                warn!(path = %path.display(), error = %err, "failed to read strings file");
                self.set_error(&err.to_string());
                return Err(err);
            }
        };

        self.load_from_bytes(&data)
    }

    /// Loads `.strings` data from a string.
    pub fn load_from_str(&self, data: &str) -> Result<(), Error> {
        self.load_from_bytes(data.as_bytes())
    }

    /// Loads `.strings` data from raw bytes.
    ///
    /// Keys already in the store keep their current text. On a syntax error
    /// the pairs parsed before the error stay loaded.
    pub fn load_from_bytes(&self, data: &[u8]) -> Result<(), Error> {
        let result = {
            let mut inner = self.write();
            let result = parser::parse(data, &mut inner);
            inner.sort_if_needed();
            result.map(|added| (added, inner.len()))
        };

        match result {
            Ok((added, total)) => {
                self.clear_error();
                debug!(added, total, "loaded strings");
                Ok(())
            }
            Err(err) => {
                warn!(error = %err, "strings parse failed");
                self.set_error(&err.to_string());
                Err(err)
            }
        }
    }

    /// Adds a new pair.
    ///
    /// Returns `false` when `key` or `text` is empty, the key already exists,
    /// or memory could not be allocated.
    pub fn add_string(&self, key: &str, text: &str, comment: Option<&str>) -> bool {
        if key.is_empty() || text.is_empty() {
            return false;
        }

        let added = self.write().insert_pair(
            key.to_string(),
            text.to_string(),
            comment.map(str::to_string),
        );

        match added {
            Ok(added) => added,
            Err(err) => {
                self.set_error(&err.to_string());
                false
            }
        }
    }

    /// Removes the pair for `key`. Returns `false` when it is not present.
    pub fn remove_string(&self, key: &str) -> bool {
        if key.is_empty() {
            return false;
        }

        let mut inner = self.write();
        inner.sort_if_needed();
        match inner.find_pair(key) {
            Some(index) => {
                inner.remove_pair(index);
                true
            }
            None => false,
        }
    }

    pub fn has_string(&self, key: &str) -> bool {
        !key.is_empty() && self.with_sorted(|inner| inner.find_pair(key).is_some())
    }

    /// Returns the localized text for `key`, or `key` itself when missing.
    pub fn get_string<'a>(&self, key: &'a str) -> Cow<'a, str> {
        if key.is_empty() {
            return Cow::Borrowed(key);
        }

        self.with_sorted(|inner| match inner.find_pair(key) {
            Some(index) => Cow::Owned(inner.pairs[index].text.clone()),
            None => Cow::Borrowed(key),
        })
    }

    /// Formats the localized text for `key` with printf-style `args`.
    ///
    /// Mirrors a C `snprintf` into a `capacity`-byte buffer: the result is at
    /// most `capacity - 1` bytes. Returns `None` when `capacity` is below
    /// [`MIN_FORMAT_CAPACITY`], `key` is empty, or formatting fails (the
    /// failure is recorded in [`error`](Self::error)).
    pub fn format_string(&self, capacity: usize, key: &str, args: &[FormatArg]) -> Option<String> {
        if capacity < MIN_FORMAT_CAPACITY || key.is_empty() {
            return None;
        }

        let format = self.get_string(key);
        match printf::snprintf(capacity - 1, &format, args) {
            Ok(formatted) => Some(formatted),
            Err(err) => {
                self.set_error(&err.to_string());
                None
            }
        }
    }

    /// Returns a copy of the pair for `key`.
    pub fn get_pair(&self, key: &str) -> Option<Pair> {
        self.with_sorted(|inner| inner.find_pair(key).map(|index| inner.pairs[index].clone()))
    }

    /// Replaces the text of an existing pair.
    pub fn set_text(&self, key: &str, text: &str) -> bool {
        if text.is_empty() {
            return false;
        }
        match self.write().pair_mut(key) {
            Some(pair) => {
                pair.text = text.to_string();
                true
            }
            None => false,
        }
    }

    /// Replaces the comment of an existing pair.
    pub fn set_comment(&self, key: &str, comment: Option<&str>) -> bool {
        match self.write().pair_mut(key) {
            Some(pair) => {
                pair.comment = normalize_comment(comment.map(str::to_string));
                true
            }
            None => false,
        }
    }

    /// Adds each pair whose key is not present yet, skipping empty keys and
    /// texts.
    ///
    /// Returns the number of pairs added. On allocation failure the pairs
    /// added so far stay and the error is recorded.
    pub fn add_pairs(&self, pairs: impl IntoIterator<Item = Pair>) -> Result<usize, Error> {
        self.merge_pairs(pairs, false)
    }

    /// Adds every pair of `other` whose key is not in `self`.
    ///
    /// With `overwrite`, pairs present in both take `other`'s text and
    /// comment. Returns the number of pairs added or changed.
    pub fn copy_from(&self, other: &StringsFile, overwrite: bool) -> Result<usize, Error> {
        // Snapshot first so copying a store into itself cannot deadlock.
        self.merge_pairs(other.pairs(), overwrite)
    }

    fn merge_pairs(
        &self,
        pairs: impl IntoIterator<Item = Pair>,
        overwrite: bool,
    ) -> Result<usize, Error> {
        let mut inner = self.write();
        let mut changed = 0;
        let mut result = Ok(());

        for pair in pairs {
            if pair.key.is_empty() || pair.text.is_empty() {
                continue;
            }
            inner.sort_if_needed();
            if let Some(index) = inner.find_pair(&pair.key) {
                let comment = normalize_comment(pair.comment);
                let existing = &mut inner.pairs[index];
                if overwrite && (existing.text != pair.text || existing.comment != comment) {
                    existing.text = pair.text;
                    existing.comment = comment;
                    changed += 1;
                }
                continue;
            }
            match inner.insert_pair(pair.key, pair.text, pair.comment) {
                Ok(_) => changed += 1,
                Err(err) => {
                    result = Err(err);
                    break;
                }
            }
        }
        drop(inner);

        match result {
            Ok(()) => Ok(changed),
            Err(err) => {
                self.set_error(&err.to_string());
                Err(err)
            }
        }
    }

    /// Sorted snapshot of all pairs.
    pub fn pairs(&self) -> Vec<Pair> {
        self.with_sorted(|inner| inner.pairs.clone())
    }

    /// Sorted snapshot of all keys.
    pub fn keys(&self) -> Vec<String> {
        self.with_sorted(|inner| inner.pairs.iter().map(|p| p.key.clone()).collect())
    }

    /// Calls `f` for each pair in key order while holding the read lock.
    ///
    /// `f` must not call back into this store's mutating methods.
    pub fn for_each_pair(&self, mut f: impl FnMut(&Pair)) {
        self.with_sorted(|inner| inner.pairs.iter().for_each(&mut f));
    }

    pub fn len(&self) -> usize {
        self.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.read().is_empty()
    }

    /// The most recent error message, if any.
    pub fn error(&self) -> Option<String> {
        let error = self.error.lock().unwrap_or_else(PoisonError::into_inner);
        (!error.is_empty()).then(|| error.clone())
    }

    pub(crate) fn set_error(&self, message: &str) {
        let mut error = self.error.lock().unwrap_or_else(PoisonError::into_inner);
        error.clear();
        error.push_str(message);
        truncate_at_boundary(&mut error, MAX_ERROR_LEN);
    }

    pub(crate) fn clear_error(&self) {
        self.error
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clear();
    }
}

/// Builds a store from pairs; the first pair for each key wins.
impl FromIterator<Pair> for StringsFile {
    fn from_iter<I: IntoIterator<Item = Pair>>(iter: I) -> Self {
        let strings = StringsFile::new();
        // A failure is kept in the error slot.
        let _ = strings.add_pairs(iter);
        strings
    }
}

/// Rejects an empty path before it reaches the filesystem.
pub(crate) fn non_empty_path(path: &Path) -> Result<&Path, Error> {
    if path.as_os_str().is_empty() {
        return Err(Error::InvalidArgument("empty path".to_string()));
    }
    Ok(path)
}

fn read_strings_file(path: &Path) -> Result<Vec<u8>, Error> {
    let name = path.display();

    let mut file = File::open(path)
        .map_err(|e| Error::io(format!("Unable to open '{}': {}", name, e), e))?;
    let size = file
        .metadata()
        .map_err(|e| Error::io(format!("Unable to stat '{}': {}", name, e), e))?
        .len() as usize;

    let mut raw = Vec::new();
    raw.try_reserve_exact(size).map_err(|e| {
        Error::io(
            format!("Unable to allocate {} bytes for '{}': {}", size, name, e),
            std::io::Error::new(std::io::ErrorKind::OutOfMemory, e.to_string()),
        )
    })?;
    file.read_to_end(&mut raw)
        .map_err(|e| Error::io(format!("Unable to read '{}': {}", name, e), e))?;

    // Transcode UTF-16 to UTF-8 when a BOM says so; other data passes through.
    let mut decoder = encoding_rs_io::DecodeReaderBytesBuilder::new()
        .bom_override(true)
        .utf8_passthru(true)
        .strip_bom(true)
        .build(raw.as_slice());
    let mut data = Vec::with_capacity(raw.len());
    decoder
        .read_to_end(&mut data)
        .map_err(|e| Error::io(format!("Unable to read '{}': {}", name, e), e))?;

    Ok(data)
}
