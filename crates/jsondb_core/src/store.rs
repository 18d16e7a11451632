//! The document store.

use crate::config::{Config, UpdateMode};
use crate::error::{StoreError, StoreResult};
use crate::locks::LockRegistry;
use crate::logger::Logger;
use crate::path;
use serde::de::DeserializeOwned;
use serde::Serialize;
use std::fmt;
use std::fs::{self, File};
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use uuid::Uuid;

/// A directory of collections, each a directory of JSON records.
///
/// # Consistency
///
/// `write`, `update`, `delete` and `delete_collection` take the target
/// collection's lock, so mutations of one collection execute in some total
/// order while different collections proceed in parallel. `read`,
/// `read_all` and `keys` take no lock: reads are not linearizable with
/// concurrent writes to the same key. A reader racing a
/// [`UpdateMode::DeleteThenWrite`] update may see a transient not-found.
///
/// Each record commit is a rename of a fully written temporary file, so a
/// record file is either absent or complete. There are no multi-record
/// transactions.
///
/// # Example
///
/// ```no_run
/// use jsondb_core::Store;
/// use serde::{Deserialize, Serialize};
///
/// #[derive(Serialize, Deserialize)]
/// struct User {
///     name: String,
///     age: u32,
/// }
///
/// let store = Store::open("./db")?;
/// store.write("users", "andra", &User { name: "Andra".into(), age: 10 })?;
/// let user: User = store.read_as("users", "andra")?;
/// assert_eq!(user.age, 10);
/// # Ok::<(), jsondb_core::StoreError>(())
/// ```
pub struct Store {
    root: PathBuf,
    locks: LockRegistry,
    config: Config,
}

impl fmt::Debug for Store {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Store")
            .field("root", &self.root)
            .field("locks", &self.locks.len())
            .field("config", &self.config)
            .finish()
    }
}

impl Store {
    /// Opens the store rooted at `root`, creating the directory if needed.
    ///
    /// # Errors
    ///
    /// Returns an error if the root exists but is not a directory, or if it
    /// cannot be created.
    pub fn open(root: impl AsRef<Path>) -> StoreResult<Self> {
        Self::open_with_config(root, Config::default())
    }

    /// Opens the store rooted at `root` with a custom configuration.
    ///
    /// Opening an existing directory performs no validation of its
    /// contents.
    ///
    /// # Errors
    ///
    /// - `NotFound` if the root is missing and `create_if_missing` is false
    /// - `Io` if the root is not a directory or cannot be created; a failed
    ///   creation is also logged at fatal level
    pub fn open_with_config(root: impl AsRef<Path>, config: Config) -> StoreResult<Self> {
        let root = path::clean(root.as_ref());
        let logger = &config.logger;

        match fs::metadata(&root) {
            Ok(metadata) if metadata.is_dir() => {
                logger.debug(format_args!("{} already exists", root.display()));
            }
            Ok(_) => {
                return Err(StoreError::io(
                    "opening",
                    &root,
                    io::Error::new(io::ErrorKind::AlreadyExists, "not a directory"),
                ));
            }
            Err(e) => {
                if !config.create_if_missing {
                    return Err(if e.kind() == io::ErrorKind::NotFound {
                        StoreError::not_found(root.display().to_string())
                    } else {
                        StoreError::io("opening", &root, e)
                    });
                }
                logger.debug(format_args!("creating {} database", root.display()));
                if let Err(e) = create_dir_all(&root) {
                    logger.fatal(format_args!("unable to create {}: {}", root.display(), e));
                    return Err(e);
                }
            }
        }

        Ok(Self {
            root,
            locks: LockRegistry::new(),
            config,
        })
    }

    /// Returns the (cleaned) root directory.
    #[must_use]
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Returns the configuration the store was opened with.
    #[must_use]
    pub fn config(&self) -> &Config {
        &self.config
    }

    /// Returns the directory backing `collection`.
    ///
    /// `collection` is joined as given; aliases such as `"users/"` resolve
    /// to the same directory as `"users"`.
    #[must_use]
    pub fn collection_path(&self, collection: &str) -> PathBuf {
        self.root.join(collection)
    }

    /// Number of collections that have been mutated through this handle.
    #[must_use]
    pub fn lock_count(&self) -> usize {
        self.locks.len()
    }

    fn logger(&self) -> &dyn Logger {
        self.config.logger.as_ref()
    }

    /// Writes `value` as `<collection>/<key>.json`, replacing any existing
    /// record, and returns the key.
    ///
    /// The collection directory is created on first use.
    ///
    /// # Errors
    ///
    /// - `InvalidArgument` for an empty or malformed collection or key
    /// - `Encode` if `value` cannot be serialized
    /// - `Io` if the directory, temporary file or rename fails
    ///
    /// A failed directory sync after the rename is logged at warn level;
    /// the record is committed and `Ok` is returned.
    pub fn write<T>(&self, collection: &str, key: &str, value: &T) -> StoreResult<String>
    where
        T: Serialize + ?Sized,
    {
        let collection = &path::validate_collection(collection)?;
        path::validate_key(key)?;
        let bytes = encode_record(collection, key, value)?;

        let lock = self.locks.get_or_create(collection);
        let _guard = lock.lock();

        let final_path = self
            .collection_path(collection)
            .join(path::record_file_name(key));
        self.commit(collection, key, &final_path, &bytes)?;
        Ok(key.to_string())
    }

    /// Writes `value` under a freshly generated UUID v4 key and returns it.
    ///
    /// The key is not injected into `value`; callers that keep the key in
    /// their records set it themselves.
    ///
    /// # Errors
    ///
    /// Same as [`Store::write`].
    pub fn insert<T>(&self, collection: &str, value: &T) -> StoreResult<String>
    where
        T: Serialize + ?Sized,
    {
        let key = Uuid::new_v4().to_string();
        self.write(collection, &key, value)
    }

    /// Returns the raw JSON text of a record.
    ///
    /// `key` may be given with or without the `.json` extension.
    ///
    /// # Errors
    ///
    /// - `InvalidArgument` for an empty or malformed collection or key
    /// - `NotFound` if neither `<key>` nor `<key>.json` is a file
    /// - `Io` if the file cannot be read
    pub fn read(&self, collection: &str, key: &str) -> StoreResult<String> {
        let collection = &path::validate_collection(collection)?;
        path::validate_key(key)?;

        let base = self.collection_path(collection).join(key);
        let file = path::find_record_file(&base)
            .map_err(|e| StoreError::io("resolving", &base, e))?
            .ok_or_else(|| StoreError::not_found(format!("{collection}/{key}")))?;

        match fs::read_to_string(&file) {
            Ok(content) => Ok(content),
            // Deleted between resolution and read.
            Err(e) if e.kind() == io::ErrorKind::NotFound => {
                Err(StoreError::not_found(format!("{collection}/{key}")))
            }
            Err(e) => Err(StoreError::io("reading", &file, e)),
        }
    }

    /// Reads a record and decodes it into `T`.
    ///
    /// # Errors
    ///
    /// Same as [`Store::read`], plus `Decode` if the content does not
    /// deserialize into `T`.
    pub fn read_as<T: DeserializeOwned>(&self, collection: &str, key: &str) -> StoreResult<T> {
        let content = self.read(collection, key)?;
        serde_json::from_str(&content).map_err(|source| StoreError::Decode {
            path: format!("{collection}/{key}"),
            source,
        })
    }

    /// Returns the raw JSON text of every record in `collection`, ordered
    /// by file name.
    ///
    /// Only committed `*.json` files are returned; leftover temporary files
    /// and nested collections are skipped.
    ///
    /// # Errors
    ///
    /// - `InvalidArgument` for an empty or malformed collection
    /// - `NotFound` if the collection directory does not exist
    /// - `Io` on the first entry that cannot be listed or read; no partial
    ///   result is returned
    pub fn read_all(&self, collection: &str) -> StoreResult<Vec<String>> {
        self.record_files(collection)?
            .into_iter()
            .map(|(_, file)| {
                fs::read_to_string(&file).map_err(|e| StoreError::io("reading", &file, e))
            })
            .collect()
    }

    /// Reads every record in `collection` and decodes each into `T`.
    ///
    /// # Errors
    ///
    /// Same as [`Store::read_all`], plus `Decode` for the first record that
    /// does not deserialize into `T`.
    pub fn read_all_as<T: DeserializeOwned>(&self, collection: &str) -> StoreResult<Vec<T>> {
        self.record_files(collection)?
            .into_iter()
            .map(|(key, file)| {
                let content =
                    fs::read_to_string(&file).map_err(|e| StoreError::io("reading", &file, e))?;
                serde_json::from_str(&content).map_err(|source| StoreError::Decode {
                    path: format!("{collection}/{key}"),
                    source,
                })
            })
            .collect()
    }

    /// Returns the keys of every record in `collection`, in the same order
    /// as [`Store::read_all`].
    ///
    /// # Errors
    ///
    /// Same as [`Store::read_all`], minus the per-file read failures.
    pub fn keys(&self, collection: &str) -> StoreResult<Vec<String>> {
        Ok(self
            .record_files(collection)?
            .into_iter()
            .map(|(key, _)| key)
            .collect())
    }

    /// Replaces an existing record and returns the key.
    ///
    /// Never creates: updating a missing record fails with `NotFound` and
    /// leaves no file behind. The value is encoded before anything is
    /// removed, so an `Encode` failure leaves the old record in place. The
    /// replacement strategy is set by [`Config::update_mode`]; see
    /// [`UpdateMode`] for the trade-off.
    ///
    /// # Errors
    ///
    /// - `NotFound` if the record does not exist
    /// - everything [`Store::write`] and [`Store::delete`] can return
    pub fn update<T>(&self, collection: &str, key: &str, value: &T) -> StoreResult<String>
    where
        T: Serialize + ?Sized,
    {
        let collection = &path::validate_collection(collection)?;
        path::validate_key(key)?;
        let bytes = encode_record(collection, key, value)?;

        match self.config.update_mode {
            UpdateMode::DeleteThenWrite => {
                let removed = self.remove(collection, Some(key))?;
                let final_path = match removed {
                    Removed::File(file) => file,
                    Removed::Tree(_) => self
                        .collection_path(collection)
                        .join(path::record_file_name(key)),
                };

                let lock = self.locks.get_or_create(collection);
                let _guard = lock.lock();
                self.commit(collection, key, &final_path, &bytes)?;
            }
            UpdateMode::Replace => {
                let lock = self.locks.get_or_create(collection);
                let _guard = lock.lock();

                let base = self.collection_path(collection).join(key);
                let final_path = path::find_record_file(&base)
                    .map_err(|e| StoreError::io("resolving", &base, e))?
                    .ok_or_else(|| StoreError::not_found(format!("{collection}/{key}")))?;
                self.commit(collection, key, &final_path, &bytes)?;
            }
        }

        Ok(key.to_string())
    }

    /// Deletes a record, or the nested collection directory named by `key`.
    ///
    /// `key` may be given with or without the `.json` extension.
    ///
    /// # Errors
    ///
    /// - `InvalidArgument` for an empty or malformed collection or key
    /// - `NotFound` if nothing exists at `<key>` or `<key>.json`
    /// - `Io` if the removal fails; the record is then still in place
    pub fn delete(&self, collection: &str, key: &str) -> StoreResult<()> {
        let collection = path::validate_collection(collection)?;
        path::validate_key(key)?;

        self.remove(&collection, Some(key)).map(|_| ())
    }

    /// Deletes a whole collection and every record in it.
    ///
    /// # Errors
    ///
    /// - `InvalidArgument` for an empty or malformed collection
    /// - `NotFound` if the collection directory does not exist
    /// - `Io` if the removal fails
    pub fn delete_collection(&self, collection: &str) -> StoreResult<()> {
        let collection = path::validate_collection(collection)?;

        self.remove(&collection, None).map(|_| ())
    }

    /// Lists `(key, path)` for every committed record file, sorted by file
    /// name.
    fn record_files(&self, collection: &str) -> StoreResult<Vec<(String, PathBuf)>> {
        let collection = &path::validate_collection(collection)?;

        let dir = self.collection_path(collection);
        let entries = match fs::read_dir(&dir) {
            Ok(entries) => entries,
            Err(e) if e.kind() == io::ErrorKind::NotFound => {
                return Err(StoreError::not_found(collection.as_str()));
            }
            Err(e) => return Err(StoreError::io("listing", &dir, e)),
        };

        let mut records = Vec::new();
        for entry in entries {
            let entry = entry.map_err(|e| StoreError::io("listing", &dir, e))?;
            let file = entry.path();
            let name = entry.file_name();
            let Some(key) = name.to_str().and_then(path::key_from_file_name) else {
                continue;
            };
            // Follows symlinks, unlike `DirEntry::file_type`.
            match fs::metadata(&file) {
                Ok(metadata) if metadata.is_file() => records.push((key.to_string(), file)),
                Ok(_) => {}
                // Deleted since the listing.
                Err(e) if e.kind() == io::ErrorKind::NotFound => {}
                Err(e) => return Err(StoreError::io("reading", &file, e)),
            }
        }
        records.sort_by(|a, b| a.1.cmp(&b.1));
        Ok(records)
    }

    /// Commits `bytes` to `final_path` via a temporary sibling and a
    /// rename. The caller holds the collection lock.
    fn commit(
        &self,
        collection: &str,
        key: &str,
        final_path: &Path,
        bytes: &[u8],
    ) -> StoreResult<()> {
        let dir = self.collection_path(collection);
        create_dir_all(&dir)?;

        let temp_path = path::temp_path(final_path);
        let result = self.write_temp(&temp_path, bytes).and_then(|()| {
            fs::rename(&temp_path, final_path)
                .map_err(|e| StoreError::io("renaming", &temp_path, e))
        });
        if let Err(e) = result {
            self.discard_temp(&temp_path);
            return Err(e);
        }
        self.sync_committed(&dir);

        self.logger()
            .info(format_args!("done creating: {collection}/{key}"));
        Ok(())
    }

    fn write_temp(&self, temp_path: &Path, bytes: &[u8]) -> StoreResult<()> {
        let mut file =
            File::create(temp_path).map_err(|e| StoreError::io("creating", temp_path, e))?;
        file.write_all(bytes)
            .map_err(|e| StoreError::io("writing", temp_path, e))?;
        if self.config.sync_writes {
            file.sync_all()
                .map_err(|e| StoreError::io("syncing", temp_path, e))?;
        }
        Ok(())
    }

    fn discard_temp(&self, temp_path: &Path) {
        match fs::remove_file(temp_path) {
            Ok(()) => {}
            Err(e) if e.kind() == io::ErrorKind::NotFound => {}
            Err(e) => self.logger().warn(format_args!(
                "unable to remove {}: {}",
                temp_path.display(),
                e
            )),
        }
    }

    /// Removes the record (or directory) at `<collection>/<key>`, or the
    /// collection directory itself when `key` is `None`.
    fn remove(&self, collection: &str, key: Option<&str>) -> StoreResult<Removed> {
        let lock = self.locks.get_or_create(collection);
        let _guard = lock.lock();

        let dir = self.collection_path(collection);
        let (target, is_dir) = match key {
            Some(key) => {
                let base = dir.join(key);
                let (target, metadata) = path::resolve_entry(&base)
                    .map_err(|e| StoreError::io("resolving", &base, e))?
                    .ok_or_else(|| StoreError::not_found(format!("{collection}/{key}")))?;
                (target, metadata.is_dir())
            }
            None => match fs::metadata(&dir) {
                Ok(metadata) if metadata.is_dir() => (dir.clone(), true),
                Ok(_) => return Err(StoreError::not_found(collection)),
                Err(e) if e.kind() == io::ErrorKind::NotFound => {
                    return Err(StoreError::not_found(collection));
                }
                Err(e) => return Err(StoreError::io("resolving", &dir, e)),
            },
        };

        let removed = if is_dir {
            fs::remove_dir_all(&target).map_err(|e| StoreError::io("removing", &target, e))?;
            Removed::Tree(target)
        } else {
            fs::remove_file(&target).map_err(|e| StoreError::io("removing", &target, e))?;
            Removed::File(target)
        };

        let parent = match &removed {
            Removed::File(file) | Removed::Tree(file) => file.parent().unwrap_or(self.root.as_path()),
        };
        self.sync_committed(parent);

        self.logger().debug(format_args!(
            "removed {collection}/{}",
            key.unwrap_or_default()
        ));
        Ok(removed)
    }

    /// Syncs `dir` after a rename or removal inside it has taken effect.
    /// The change is already visible, so a failure is only logged.
    fn sync_committed(&self, dir: &Path) {
        if !self.config.sync_writes {
            return;
        }
        if let Err(e) = sync_directory(dir) {
            self.logger()
                .warn(format_args!("unable to sync {}: {}", dir.display(), e));
        }
    }
}

/// What a removal deleted.
enum Removed {
    File(PathBuf),
    Tree(PathBuf),
}

fn encode_record<T>(collection: &str, key: &str, value: &T) -> StoreResult<Vec<u8>>
where
    T: Serialize + ?Sized,
{
    encode(value).map_err(|source| StoreError::Encode {
        collection: collection.to_string(),
        key: key.to_string(),
        source,
    })
}

/// Tab-indented JSON followed by a newline.
fn encode<T: Serialize + ?Sized>(value: &T) -> serde_json::Result<Vec<u8>> {
    let mut bytes = Vec::new();
    let formatter = serde_json::ser::PrettyFormatter::with_indent(b"\t");
    let mut serializer = serde_json::Serializer::with_formatter(&mut bytes, formatter);
    value.serialize(&mut serializer)?;
    bytes.push(b'\n');
    Ok(bytes)
}

/// Creates `dir` and its parents with owner rwx, group/other rx.
fn create_dir_all(dir: &Path) -> StoreResult<()> {
    let mut builder = fs::DirBuilder::new();
    builder.recursive(true);
    #[cfg(unix)]
    {
        use std::os::unix::fs::DirBuilderExt;
        builder.mode(0o755);
    }
    builder
        .create(dir)
        .map_err(|e| StoreError::io("creating", dir, e))
}

/// Makes entry creation, rename and removal inside `dir` durable.
#[cfg(unix)]
fn sync_directory(dir: &Path) -> io::Result<()> {
    File::open(dir)?.sync_all()
}

#[cfg(not(unix))]
fn sync_directory(_dir: &Path) -> io::Result<()> {
    // NTFS journals metadata; directories cannot be opened for fsync.
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorKind;
    use crate::logger::{LogLevel, NoopLogger};
    use parking_lot::Mutex;
    use serde::Deserialize;
    use std::sync::{mpsc, Arc};
    use std::thread;
    use std::time::Duration;
    use tempfile::tempdir;

    #[derive(Default)]
    struct Recorder {
        lines: Mutex<Vec<(LogLevel, String)>>,
    }

    impl Logger for Recorder {
        fn log(&self, level: LogLevel, args: fmt::Arguments<'_>) {
            self.lines.lock().push((level, args.to_string()));
        }
    }

    #[derive(Debug, PartialEq, Serialize, Deserialize)]
    struct User {
        name: String,
        age: u32,
    }

    fn quiet() -> Config {
        Config::new().logger(Arc::new(NoopLogger))
    }

    #[test]
    fn open_creates_root() {
        let temp = tempdir().unwrap();
        let root = temp.path().join("nested").join("db");

        let store = Store::open_with_config(&root, quiet()).unwrap();
        assert!(root.is_dir());
        assert_eq!(store.root(), root.as_path());
    }

    #[test]
    fn open_existing_is_idempotent() {
        let temp = tempdir().unwrap();
        let root = temp.path().join("db");

        let store = Store::open_with_config(&root, quiet()).unwrap();
        store.write("users", "a", &1).unwrap();
        drop(store);

        let store = Store::open_with_config(&root, quiet()).unwrap();
        assert_eq!(store.read("users", "a").unwrap(), "1\n");
    }

    #[test]
    fn open_cleans_root() {
        let temp = tempdir().unwrap();
        let messy = temp.path().join("a").join(".").join("b").join("..").join("db");

        let store = Store::open_with_config(&messy, quiet()).unwrap();
        assert_eq!(store.root(), temp.path().join("a").join("db").as_path());
    }

    #[test]
    fn open_rejects_file_root() {
        let temp = tempdir().unwrap();
        let root = temp.path().join("db");
        fs::write(&root, "not a dir").unwrap();

        let err = Store::open_with_config(&root, quiet()).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Io);
    }

    #[test]
    fn open_without_create() {
        let temp = tempdir().unwrap();
        let root = temp.path().join("missing");

        let err = Store::open_with_config(&root, quiet().create_if_missing(false)).unwrap_err();
        assert!(err.is_not_found());
        assert!(!root.exists());
    }

    #[test]
    fn write_layout_and_format() {
        let temp = tempdir().unwrap();
        let store = Store::open_with_config(temp.path(), quiet()).unwrap();

        let user = User {
            name: "Andra".into(),
            age: 10,
        };
        let key = store.write("users", "andra", &user).unwrap();
        assert_eq!(key, "andra");

        let content = fs::read_to_string(temp.path().join("users").join("andra.json")).unwrap();
        assert_eq!(content, "{\n\t\"name\": \"Andra\",\n\t\"age\": 10\n}\n");
        assert!(!temp.path().join("users").join("andra.json.tmp").exists());
    }

    #[test]
    fn read_as_decodes() {
        let temp = tempdir().unwrap();
        let store = Store::open_with_config(temp.path(), quiet()).unwrap();

        let user = User {
            name: "Anggun".into(),
            age: 15,
        };
        store.write("users", "anggun", &user).unwrap();

        let loaded: User = store.read_as("users", "anggun").unwrap();
        assert_eq!(loaded, user);

        let err = store.read_as::<Vec<u8>>("users", "anggun").unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Decode);
    }

    #[test]
    fn insert_generates_key() {
        let temp = tempdir().unwrap();
        let store = Store::open_with_config(temp.path(), quiet()).unwrap();

        let a = store.insert("users", &serde_json::json!({"n": 1})).unwrap();
        let b = store.insert("users", &serde_json::json!({"n": 2})).unwrap();
        assert_ne!(a, b);
        assert!(Uuid::parse_str(&a).is_ok());
        assert_eq!(store.keys("users").unwrap().len(), 2);
    }

    #[test]
    fn encode_failure_leaves_no_trace() {
        use std::collections::HashMap;

        let temp = tempdir().unwrap();
        let store = Store::open_with_config(temp.path(), quiet()).unwrap();

        // Non-string map keys cannot be JSON object keys.
        let mut bad = HashMap::new();
        bad.insert(vec![1u8], 1);

        let err = store.write("users", "bad", &bad).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Encode);
        assert!(!temp.path().join("users").exists());
    }

    #[test]
    fn replace_mode_updates_in_place() {
        let temp = tempdir().unwrap();
        let store =
            Store::open_with_config(temp.path(), quiet().update_mode(UpdateMode::Replace)).unwrap();

        store.write("users", "a", &1).unwrap();
        store.update("users", "a.json", &2).unwrap();
        assert_eq!(store.read("users", "a").unwrap(), "2\n");
        assert_eq!(store.keys("users").unwrap(), vec!["a"]);

        let err = store.update("users", "missing", &3).unwrap_err();
        assert!(err.is_not_found());
        assert!(!temp.path().join("users").join("missing.json").exists());
    }

    #[test]
    fn delete_nested_collection_by_key() {
        let temp = tempdir().unwrap();
        let store = Store::open_with_config(temp.path(), quiet()).unwrap();

        store.write("users/archive", "old", &1).unwrap();
        store.write("users", "new", &2).unwrap();

        store.delete("users", "archive").unwrap();
        assert!(!temp.path().join("users").join("archive").exists());
        assert_eq!(store.keys("users").unwrap(), vec!["new"]);
    }

    #[test]
    fn locks_are_per_collection() {
        let temp = tempdir().unwrap();
        let store = Store::open_with_config(temp.path(), quiet()).unwrap();
        assert_eq!(store.lock_count(), 0);

        store.write("users", "a", &1).unwrap();
        store.write("users", "b", &1).unwrap();
        store.write("posts", "a", &1).unwrap();
        store.read("users", "a").unwrap();
        assert_eq!(store.lock_count(), 2);
    }

    #[test]
    fn sync_disabled_still_commits() {
        let temp = tempdir().unwrap();
        let store = Store::open_with_config(temp.path(), quiet().sync_writes(false)).unwrap();

        store.write("users", "a", &true).unwrap();
        assert_eq!(store.read("users", "a").unwrap(), "true\n");
    }

    #[test]
    fn collection_aliases_share_one_lock() {
        let temp = tempdir().unwrap();
        let store = Store::open_with_config(temp.path(), quiet()).unwrap();

        store.write("users", "a", &1).unwrap();
        store.write("users/", "b", &2).unwrap();
        store.write("./users", "c", &3).unwrap();
        store.delete("users/.", "c").unwrap();
        assert_eq!(store.lock_count(), 1);
        assert_eq!(store.keys("./users/").unwrap(), vec!["a", "b"]);
    }

    #[test]
    fn collection_alias_waits_for_the_collection_lock() {
        let temp = tempdir().unwrap();
        let store = Store::open_with_config(temp.path(), quiet()).unwrap();
        store.write("users", "a", &1).unwrap();

        let lock = store.locks.get_or_create("users");
        let guard = lock.lock();
        let (done_tx, done_rx) = mpsc::channel();

        let writer = &store;
        thread::scope(|scope| {
            scope.spawn(move || {
                writer.write("users/", "b", &2).unwrap();
                done_tx.send(()).unwrap();
            });

            assert!(done_rx.recv_timeout(Duration::from_millis(200)).is_err());
            drop(guard);
            done_rx.recv_timeout(Duration::from_secs(10)).unwrap();
        });

        assert_eq!(store.keys("users").unwrap(), vec!["a", "b"]);
    }

    #[test]
    fn update_encode_failure_keeps_record() {
        use std::collections::HashMap;

        let temp = tempdir().unwrap();
        let store = Store::open_with_config(temp.path(), quiet()).unwrap();
        store.write("users", "a", &1).unwrap();

        let mut bad = HashMap::new();
        bad.insert(vec![1u8], 1);

        for mode in [UpdateMode::DeleteThenWrite, UpdateMode::Replace] {
            let store = Store::open_with_config(temp.path(), quiet().update_mode(mode)).unwrap();
            let err = store.update("users", "a", &bad).unwrap_err();
            assert_eq!(err.kind(), ErrorKind::Encode, "{mode:?}");
            assert_eq!(store.read("users", "a").unwrap(), "1\n", "{mode:?}");
        }
    }

    #[test]
    fn failed_directory_sync_is_logged_not_returned() {
        let temp = tempdir().unwrap();
        let recorder = Arc::new(Recorder::default());
        let store =
            Store::open_with_config(temp.path(), Config::new().logger(recorder.clone())).unwrap();

        store.sync_committed(&temp.path().join("vanished"));

        let lines = recorder.lines.lock();
        let warnings: Vec<_> = lines
            .iter()
            .filter(|(level, _)| *level == LogLevel::Warn)
            .collect();
        assert_eq!(warnings.len(), 1);
        assert!(warnings[0].1.contains("vanished"));
    }

    #[cfg(unix)]
    #[test]
    fn delete_reports_removal_failure() {
        use std::os::unix::fs::PermissionsExt;

        let temp = tempdir().unwrap();
        let store = Store::open_with_config(temp.path(), quiet()).unwrap();
        store.write("users", "a", &1).unwrap();

        let dir = temp.path().join("users");
        fs::set_permissions(&dir, fs::Permissions::from_mode(0o555)).unwrap();
        // Root ignores directory permissions; nothing to check then.
        let privileged = fs::write(dir.join("canary"), "").is_ok();
        let result = (!privileged).then(|| store.delete("users", "a"));
        fs::set_permissions(&dir, fs::Permissions::from_mode(0o755)).unwrap();

        let Some(result) = result else {
            return;
        };
        assert_eq!(result.unwrap_err().kind(), ErrorKind::Io);
        assert!(dir.join("a.json").is_file());
        assert_eq!(store.read("users", "a").unwrap(), "1\n");
    }
}
