/// Sequential renaming of the media files in a single folder.
///
/// A run has two phases. [`Renamer::plan`] lists the folder, classifies every
/// regular file by extension and assigns `Image_N` / `Video_N` names without
/// touching the filesystem. [`Renamer::execute`] then performs the planned
/// renames, one file at a time, and collects the outcome in a [`RenameReport`].
use crate::category::{Category, CategoryTable, normalize_extension};
use crate::config::{CompiledFilters, ConfigError, RenamerConfig};
use chrono::{DateTime, Utc};
use serde::Serialize;
use std::collections::{BTreeMap, HashMap, HashSet};
use std::fs;
use std::path::{Path, PathBuf};

/// A regular file found directly inside the target folder.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileEntry {
    /// The file name, without any directory component.
    pub name: String,
    /// The full path to the file.
    pub path: PathBuf,
    /// Lowercased extension with its leading dot, if the name has one.
    pub extension: Option<String>,
}

impl FileEntry {
    /// Builds an entry from a path inside the folder.
    pub fn from_path(path: PathBuf) -> Self {
        let name = path
            .file_name()
            .map(|n| n.to_string_lossy().to_string())
            .unwrap_or_default();
        let extension = path
            .extension()
            .map(|ext| normalize_extension(&ext.to_string_lossy()))
            .filter(|ext| !ext.is_empty());

        Self {
            name,
            path,
            extension,
        }
    }
}

/// Next number to hand out for each category.
///
/// Every category starts at 1 and only ever moves forward within a run.
#[derive(Debug, Clone)]
pub struct Counters {
    next: HashMap<Category, usize>,
}

impl Counters {
    /// Creates counters set to 1 for every given category.
    pub fn new(categories: impl IntoIterator<Item = Category>) -> Self {
        Self {
            next: categories.into_iter().map(|c| (c, 1)).collect(),
        }
    }

    /// Returns the current number for `category` and advances it.
    pub fn next(&mut self, category: Category) -> usize {
        let counter = self.next.entry(category).or_insert(1);
        let current = *counter;
        *counter += 1;
        current
    }
}

/// What will happen to a planned entry.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PlanStatus {
    /// The entry will be renamed.
    Ready,
    /// The entry already carries its new name; nothing to move.
    Unchanged,
    /// The new name is taken by something that stays in place.
    Conflict(String),
}

/// One entry of a [`RenamePlan`].
#[derive(Debug, Clone)]
pub struct PlannedRename {
    pub entry: FileEntry,
    pub category: Category,
    /// The per-category number assigned to this entry.
    pub index: usize,
    pub new_name: String,
    pub new_path: PathBuf,
    pub status: PlanStatus,
}

/// The full set of renames computed for a folder, before any mutation.
#[derive(Debug, Clone)]
pub struct RenamePlan {
    pub folder: PathBuf,
    /// Recognized files, in numbering order.
    pub renames: Vec<PlannedRename>,
    /// Files whose extension matched no category.
    pub untouched: Vec<FileEntry>,
}

impl RenamePlan {
    /// Entries that will actually end up under their new name.
    pub fn accepted(&self) -> impl Iterator<Item = &PlannedRename> {
        self.renames
            .iter()
            .filter(|r| !matches!(r.status, PlanStatus::Conflict(_)))
    }

    /// Entries skipped because of a name collision.
    pub fn conflicts(&self) -> impl Iterator<Item = &PlannedRename> {
        self.renames
            .iter()
            .filter(|r| matches!(r.status, PlanStatus::Conflict(_)))
    }

    /// Number of accepted renames per category.
    pub fn category_counts(&self) -> BTreeMap<Category, usize> {
        let mut counts = BTreeMap::new();
        for rename in self.accepted() {
            *counts.entry(rename.category).or_insert(0) += 1;
        }
        counts
    }

    /// Returns true if nothing in the folder would be renamed.
    pub fn is_empty(&self) -> bool {
        self.renames.is_empty()
    }
}

/// A file that was renamed (or already carried its new name).
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RenameRecord {
    pub original: String,
    pub renamed: String,
    pub category: Category,
}

/// A file that was skipped or could not be renamed, with the reason.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct EntryIssue {
    pub name: String,
    pub reason: String,
}

/// Outcome of a run.
#[derive(Debug, Clone, Serialize)]
pub struct RenameReport {
    pub timestamp: DateTime<Utc>,
    pub folder: PathBuf,
    pub renamed: Vec<RenameRecord>,
    pub skipped: Vec<EntryIssue>,
    pub failed: Vec<EntryIssue>,
    pub untouched: Vec<String>,
}

impl RenameReport {
    fn new(folder: PathBuf) -> Self {
        Self {
            timestamp: Utc::now(),
            folder,
            renamed: Vec::new(),
            skipped: Vec::new(),
            failed: Vec::new(),
            untouched: Vec::new(),
        }
    }

    /// Number of renamed files per category.
    pub fn category_counts(&self) -> BTreeMap<Category, usize> {
        let mut counts = BTreeMap::new();
        for record in &self.renamed {
            *counts.entry(record.category).or_insert(0) += 1;
        }
        counts
    }

    /// Returns true if at least one rename failed on the filesystem.
    pub fn has_failures(&self) -> bool {
        !self.failed.is_empty()
    }

    /// Looks up the new name given to `original`.
    pub fn renamed_to(&self, original: &str) -> Option<&str> {
        self.renamed
            .iter()
            .find(|r| r.original == original)
            .map(|r| r.renamed.as_str())
    }
}

/// Per-file notifications emitted while executing a plan.
#[derive(Debug, Clone, Copy)]
pub enum RenameEvent<'a> {
    Renamed(&'a RenameRecord),
    Skipped(&'a EntryIssue),
    Failed(&'a EntryIssue),
    Completed(&'a RenameReport),
}

/// Errors that stop a run before any file is touched.
#[derive(Debug)]
pub enum RenameError {
    /// The folder does not exist or is not a directory.
    FolderNotFound { path: PathBuf },
    /// The folder could not be listed.
    ReadDirFailed {
        path: PathBuf,
        source: std::io::Error,
    },
    /// The configuration could not be loaded or compiled.
    Config(ConfigError),
}

impl std::fmt::Display for RenameError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::FolderNotFound { path } => write!(
                f,
                "The folder '{}' does not exist. Please check the path.",
                path.display()
            ),
            Self::ReadDirFailed { path, source } => {
                write!(f, "Error reading directory {}: {}", path.display(), source)
            }
            Self::Config(e) => write!(f, "Error loading configuration: {}", e),
        }
    }
}

impl std::error::Error for RenameError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::ReadDirFailed { source, .. } => Some(source),
            Self::Config(e) => Some(e),
            Self::FolderNotFound { .. } => None,
        }
    }
}

impl From<ConfigError> for RenameError {
    fn from(e: ConfigError) -> Self {
        Self::Config(e)
    }
}

/// Result type for renaming operations.
pub type RenameResult<T> = Result<T, RenameError>;

/// Renames the images and videos of a folder to `<Category>_<n><ext>`.
#[derive(Debug, Clone)]
pub struct Renamer {
    table: CategoryTable,
    filters: CompiledFilters,
    sort_entries: bool,
}

impl Renamer {
    /// Creates a renamer with the given table and filters, sorting entries by name.
    pub fn new(table: CategoryTable, filters: CompiledFilters) -> Self {
        Self {
            table,
            filters,
            sort_entries: true,
        }
    }

    /// Creates a renamer from a loaded configuration.
    ///
    /// # Errors
    ///
    /// Returns an error if the configured filters do not compile.
    pub fn from_config(config: &RenamerConfig) -> RenameResult<Self> {
        let filters = config.compile_filters()?;
        Ok(Self::new(config.category_table(), filters).sort_entries(config.renamer.sort_entries))
    }

    /// Whether to number entries in name order (true) or directory order (false).
    pub fn sort_entries(mut self, sort: bool) -> Self {
        self.sort_entries = sort;
        self
    }

    /// Returns the category table in use.
    pub fn table(&self) -> &CategoryTable {
        &self.table
    }

    /// Plans and executes a run on `folder` without notifications.
    ///
    /// # Examples
    ///
    /// ```no_run
    /// use media_renamer::Renamer;
    /// use std::path::Path;
    ///
    /// match Renamer::default().rename(Path::new("/path/to/photos")) {
    ///     Ok(report) => println!("Renamed {} files", report.renamed.len()),
    ///     Err(e) => eprintln!("{}", e),
    /// }
    /// ```
    pub fn rename(&self, folder: &Path) -> RenameResult<RenameReport> {
        let plan = self.plan(folder)?;
        Ok(self.execute(&plan, |_| {}))
    }

    /// Computes the renames for `folder` without modifying anything.
    ///
    /// # Errors
    ///
    /// Returns `RenameError::FolderNotFound` if `folder` is not an existing directory,
    /// or `RenameError::ReadDirFailed` if it cannot be listed.
    pub fn plan(&self, folder: &Path) -> RenameResult<RenamePlan> {
        if !folder.is_dir() {
            return Err(RenameError::FolderNotFound {
                path: folder.to_path_buf(),
            });
        }

        let entries = self.scan(folder)?;
        let mut counters = Counters::new(self.table.categories());
        let mut renames = Vec::new();
        let mut untouched = Vec::new();

        for entry in entries {
            let classified = entry
                .extension
                .as_deref()
                .and_then(|ext| self.table.categorize(ext).map(|c| (c, ext.to_string())));

            let Some((category, ext)) = classified else {
                log::debug!("leaving {} untouched", entry.name);
                untouched.push(entry);
                continue;
            };

            let index = counters.next(category);
            let new_name = category.file_name(index, &ext);
            let new_path = folder.join(&new_name);
            let status = if new_path == entry.path {
                PlanStatus::Unchanged
            } else {
                PlanStatus::Ready
            };

            renames.push(PlannedRename {
                entry,
                category,
                index,
                new_name,
                new_path,
                status,
            });
        }

        detect_conflicts(&mut renames);

        Ok(RenamePlan {
            folder: folder.to_path_buf(),
            renames,
            untouched,
        })
    }

    /// Performs a plan, calling `notify` for every file and once at the end.
    ///
    /// Failures are recorded per file and never stop the run. Entries whose new
    /// name is still held by another file of the plan go through a staging name
    /// first, so a file is never overwritten before it has been moved itself.
    pub fn execute<F>(&self, plan: &RenamePlan, mut notify: F) -> RenameReport
    where
        F: FnMut(RenameEvent<'_>),
    {
        let mut report = RenameReport::new(plan.folder.clone());
        report.untouched = plan.untouched.iter().map(|e| e.name.clone()).collect();

        let mut staged: Vec<(&PlannedRename, PathBuf)> = Vec::new();

        for planned in &plan.renames {
            match &planned.status {
                PlanStatus::Conflict(reason) => {
                    log::warn!("skipping {}: {}", planned.entry.name, reason);
                    report.skipped.push(EntryIssue {
                        name: planned.entry.name.clone(),
                        reason: reason.clone(),
                    });
                    notify(RenameEvent::Skipped(last(&report.skipped)));
                }
                PlanStatus::Unchanged => {
                    report.renamed.push(record(planned));
                    notify(RenameEvent::Renamed(last(&report.renamed)));
                }
                PlanStatus::Ready if path_is_taken(&planned.new_path) => {
                    let staging = staging_path(planned);
                    match stage(planned, &staging) {
                        Ok(()) => staged.push((planned, staging)),
                        Err(reason) => {
                            fail(&mut report, planned, reason);
                            notify(RenameEvent::Failed(last(&report.failed)));
                        }
                    }
                }
                PlanStatus::Ready => match fs::rename(&planned.entry.path, &planned.new_path) {
                    Ok(()) => {
                        log::info!("renamed {} -> {}", planned.entry.name, planned.new_name);
                        report.renamed.push(record(planned));
                        notify(RenameEvent::Renamed(last(&report.renamed)));
                    }
                    Err(e) => {
                        fail(&mut report, planned, format!("Failed to rename: {}", e));
                        notify(RenameEvent::Failed(last(&report.failed)));
                    }
                },
            }
        }

        for (planned, staging) in staged {
            match unstage(planned, &staging) {
                Ok(()) => {
                    log::info!("renamed {} -> {}", planned.entry.name, planned.new_name);
                    report.renamed.push(record(planned));
                    notify(RenameEvent::Renamed(last(&report.renamed)));
                }
                Err(reason) => {
                    fail(&mut report, planned, reason);
                    notify(RenameEvent::Failed(last(&report.failed)));
                }
            }
        }

        notify(RenameEvent::Completed(&report));
        report
    }

    /// Lists the regular files of `folder` that pass the filters.
    fn scan(&self, folder: &Path) -> RenameResult<Vec<FileEntry>> {
        let entries = fs::read_dir(folder).map_err(|e| RenameError::ReadDirFailed {
            path: folder.to_path_buf(),
            source: e,
        })?;

        let mut files = Vec::new();
        for entry in entries.flatten() {
            let path = entry.path();
            // Follows symlinks: links to files count, links to directories do not.
            let is_file = fs::metadata(&path).map(|m| m.is_file()).unwrap_or(false);
            if !is_file {
                continue;
            }
            if !self.filters.should_include(&path) {
                log::debug!("excluded by filters: {}", path.display());
                continue;
            }
            files.push(FileEntry::from_path(path));
        }

        if self.sort_entries {
            files.sort_by(|a, b| a.path.file_name().cmp(&b.path.file_name()));
        }

        log::debug!("found {} files in {}", files.len(), folder.display());
        Ok(files)
    }
}

impl Default for Renamer {
    fn default() -> Self {
        Self::new(CategoryTable::default(), CompiledFilters::default())
    }
}

/// Marks planned renames whose destination is held by something that will not move.
///
/// Runs until stable: an entry that becomes a conflict stays where it is, which
/// can in turn block another entry that was aiming at its name.
fn detect_conflicts(renames: &mut [PlannedRename]) {
    let mut seen_targets = HashSet::new();
    for planned in renames.iter_mut() {
        if !seen_targets.insert(planned.new_name.to_lowercase()) {
            planned.status =
                PlanStatus::Conflict(format!("{} is planned twice", planned.new_name));
        }
    }

    loop {
        let moving: HashSet<FileKey> = renames
            .iter()
            .filter(|r| r.status == PlanStatus::Ready)
            .filter_map(|r| file_key(&r.entry.path))
            .collect();

        let mut changed = false;
        for planned in renames.iter_mut() {
            if planned.status != PlanStatus::Ready {
                continue;
            }
            let blocked = file_key(&planned.new_path).is_some_and(|key| !moving.contains(&key));
            if blocked {
                planned.status =
                    PlanStatus::Conflict(format!("{} already exists", planned.new_name));
                changed = true;
            }
        }

        if !changed {
            break;
        }
    }
}

fn path_is_taken(path: &Path) -> bool {
    fs::symlink_metadata(path).is_ok()
}

/// Identity of whatever sits at a path, without following symlinks.
///
/// Two names for one file (a different letter case on a case-insensitive
/// filesystem, or a hard link) share a key.
#[cfg(unix)]
type FileKey = (u64, u64);

#[cfg(not(unix))]
type FileKey = String;

#[cfg(unix)]
fn file_key(path: &Path) -> Option<FileKey> {
    use std::os::unix::fs::MetadataExt;
    fs::symlink_metadata(path)
        .ok()
        .map(|m| (m.dev(), m.ino()))
}

#[cfg(not(unix))]
fn file_key(path: &Path) -> Option<FileKey> {
    fs::symlink_metadata(path)
        .ok()
        .map(|_| path.to_string_lossy().to_lowercase())
}

fn staging_path(planned: &PlannedRename) -> PathBuf {
    planned
        .new_path
        .with_file_name(format!(".{}.renaming", planned.new_name))
}

fn stage(planned: &PlannedRename, staging: &Path) -> Result<(), String> {
    if path_is_taken(staging) {
        return Err(format!("Staging path {} already exists", staging.display()));
    }
    log::debug!("staging {} as {}", planned.entry.name, staging.display());
    fs::rename(&planned.entry.path, staging).map_err(|e| format!("Failed to rename: {}", e))
}

fn unstage(planned: &PlannedRename, staging: &Path) -> Result<(), String> {
    let result = if path_is_taken(&planned.new_path) {
        Err(format!("{} already exists", planned.new_name))
    } else {
        fs::rename(staging, &planned.new_path).map_err(|e| format!("Failed to rename: {}", e))
    };

    let Err(reason) = result else {
        return Ok(());
    };

    // The original name may already belong to another renamed file.
    if path_is_taken(&planned.entry.path) {
        return Err(format!(
            "{}; file left at {} because {} is taken",
            reason,
            staging.display(),
            planned.entry.name
        ));
    }
    if let Err(e) = fs::rename(staging, &planned.entry.path) {
        return Err(format!(
            "{}; could not restore from {}: {}",
            reason,
            staging.display(),
            e
        ));
    }
    Err(reason)
}

fn record(planned: &PlannedRename) -> RenameRecord {
    RenameRecord {
        original: planned.entry.name.clone(),
        renamed: planned.new_name.clone(),
        category: planned.category,
    }
}

fn fail(report: &mut RenameReport, planned: &PlannedRename, reason: String) {
    log::warn!("could not rename {}: {}", planned.entry.name, reason);
    report.failed.push(EntryIssue {
        name: planned.entry.name.clone(),
        reason,
    });
}

fn last<T>(items: &[T]) -> &T {
    &items[items.len() - 1]
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{ExcludeRules, FilterRules};
    use tempfile::TempDir;

    fn touch(dir: &Path, name: &str, content: &str) {
        fs::write(dir.join(name), content).expect("Failed to write test file");
    }

    fn names(dir: &Path) -> Vec<String> {
        let mut names: Vec<String> = fs::read_dir(dir)
            .expect("Failed to read directory")
            .flatten()
            .map(|e| e.file_name().to_string_lossy().to_string())
            .collect();
        names.sort();
        names
    }

    #[test]
    fn test_file_entry_extension() {
        let entry = FileEntry::from_path(PathBuf::from("/photos/PHOTO.JPG"));
        assert_eq!(entry.name, "PHOTO.JPG");
        assert_eq!(entry.extension.as_deref(), Some(".jpg"));

        let entry = FileEntry::from_path(PathBuf::from("/photos/backup.tar.gz"));
        assert_eq!(entry.extension.as_deref(), Some(".gz"));

        assert_eq!(
            FileEntry::from_path(PathBuf::from("/photos/README")).extension,
            None
        );
        assert_eq!(
            FileEntry::from_path(PathBuf::from("/photos/.jpg")).extension,
            None
        );
        assert_eq!(
            FileEntry::from_path(PathBuf::from("/photos/file.")).extension,
            None
        );
    }

    #[test]
    fn test_counters_start_at_one() {
        let mut counters = Counters::new(Category::ALL);
        assert_eq!(counters.next(Category::Image), 1);
        assert_eq!(counters.next(Category::Image), 2);
        assert_eq!(counters.next(Category::Video), 1);
        assert_eq!(counters.next(Category::Image), 3);
    }

    #[test]
    fn test_plan_missing_folder() {
        let result = Renamer::default().plan(Path::new("/non/existent/folder"));
        assert!(matches!(result, Err(RenameError::FolderNotFound { .. })));
    }

    #[test]
    fn test_plan_rejects_file_as_folder() {
        let temp_dir = TempDir::new().expect("Failed to create temp directory");
        touch(temp_dir.path(), "a.jpg", "a");

        let result = Renamer::default().plan(&temp_dir.path().join("a.jpg"));
        assert!(matches!(result, Err(RenameError::FolderNotFound { .. })));
    }

    #[test]
    fn test_plan_does_not_touch_files() {
        let temp_dir = TempDir::new().expect("Failed to create temp directory");
        touch(temp_dir.path(), "a.JPG", "a");
        touch(temp_dir.path(), "b.mp4", "b");

        let plan = Renamer::default().plan(temp_dir.path()).unwrap();

        assert_eq!(plan.renames.len(), 2);
        assert_eq!(names(temp_dir.path()), vec!["a.JPG", "b.mp4"]);
    }

    #[test]
    fn test_plan_sorted_numbering() {
        let temp_dir = TempDir::new().expect("Failed to create temp directory");
        for name in ["d.png", "c.txt", "b.mp4", "a.JPG"] {
            touch(temp_dir.path(), name, name);
        }

        let plan = Renamer::default().plan(temp_dir.path()).unwrap();
        let pairs: Vec<(&str, &str)> = plan
            .renames
            .iter()
            .map(|r| (r.entry.name.as_str(), r.new_name.as_str()))
            .collect();

        assert_eq!(
            pairs,
            vec![
                ("a.JPG", "Image_1.jpg"),
                ("b.mp4", "Video_1.mp4"),
                ("d.png", "Image_2.png"),
            ]
        );
        assert_eq!(plan.untouched.len(), 1);
        assert_eq!(plan.untouched[0].name, "c.txt");
    }

    #[test]
    fn test_plan_ignores_directories() {
        let temp_dir = TempDir::new().expect("Failed to create temp directory");
        fs::create_dir(temp_dir.path().join("album.jpg")).expect("Failed to create dir");
        touch(temp_dir.path(), "b.jpg", "b");

        let plan = Renamer::default().plan(temp_dir.path()).unwrap();
        assert_eq!(plan.renames.len(), 1);
        assert_eq!(plan.renames[0].entry.name, "b.jpg");
    }

    #[test]
    fn test_plan_marks_existing_name_unchanged() {
        let temp_dir = TempDir::new().expect("Failed to create temp directory");
        touch(temp_dir.path(), "Image_1.jpg", "a");

        let plan = Renamer::default().plan(temp_dir.path()).unwrap();
        assert_eq!(plan.renames[0].status, PlanStatus::Unchanged);
    }

    #[test]
    fn test_conflict_with_directory() {
        let temp_dir = TempDir::new().expect("Failed to create temp directory");
        fs::create_dir(temp_dir.path().join("Image_1.jpg")).expect("Failed to create dir");
        touch(temp_dir.path(), "a.jpg", "a");
        touch(temp_dir.path(), "b.jpg", "b");

        let plan = Renamer::default().plan(temp_dir.path()).unwrap();

        assert!(matches!(plan.renames[0].status, PlanStatus::Conflict(_)));
        assert_eq!(plan.renames[1].new_name, "Image_2.jpg");
        assert_eq!(plan.renames[1].status, PlanStatus::Ready);
        assert_eq!(plan.conflicts().count(), 1);
    }

    #[test]
    fn test_conflict_propagates_to_blocked_entries() {
        let temp_dir = TempDir::new().expect("Failed to create temp directory");
        fs::create_dir(temp_dir.path().join("Image_1.jpg")).expect("Failed to create dir");
        touch(temp_dir.path(), "Image_2.jpg", "two");
        touch(temp_dir.path(), "b.jpg", "b");

        let renamer = Renamer::default();
        let plan = renamer.plan(temp_dir.path()).unwrap();

        // Image_2.jpg cannot move, so b.jpg cannot take its name.
        assert_eq!(plan.conflicts().count(), 2);

        let report = renamer.execute(&plan, |_| {});
        assert!(report.renamed.is_empty());
        assert_eq!(report.skipped.len(), 2);
        assert_eq!(
            fs::read_to_string(temp_dir.path().join("Image_2.jpg")).unwrap(),
            "two"
        );
        assert_eq!(fs::read_to_string(temp_dir.path().join("b.jpg")).unwrap(), "b");
    }

    #[test]
    fn test_conflict_with_excluded_file() {
        let temp_dir = TempDir::new().expect("Failed to create temp directory");
        touch(temp_dir.path(), "Image_1.jpg", "keep");
        touch(temp_dir.path(), "a.jpg", "a");

        let config = RenamerConfig {
            filters: FilterRules {
                enable_hidden_files: true,
                exclude: ExcludeRules {
                    filenames: vec!["Image_1.jpg".to_string()],
                    ..Default::default()
                },
            },
            ..Default::default()
        };
        let renamer = Renamer::from_config(&config).unwrap();
        let report = renamer.rename(temp_dir.path()).unwrap();

        assert!(report.renamed.is_empty());
        assert_eq!(report.skipped.len(), 1);
        assert_eq!(
            fs::read_to_string(temp_dir.path().join("Image_1.jpg")).unwrap(),
            "keep"
        );
        assert_eq!(fs::read_to_string(temp_dir.path().join("a.jpg")).unwrap(), "a");
    }

    #[test]
    fn test_execute_stages_occupied_targets() {
        let temp_dir = TempDir::new().expect("Failed to create temp directory");
        touch(temp_dir.path(), "A.jpg", "a");
        touch(temp_dir.path(), "Image_1.jpg", "one");

        let report = Renamer::default().rename(temp_dir.path()).unwrap();

        assert_eq!(report.renamed.len(), 2);
        assert!(report.failed.is_empty());
        assert_eq!(names(temp_dir.path()), vec!["Image_1.jpg", "Image_2.jpg"]);
        assert_eq!(
            fs::read_to_string(temp_dir.path().join("Image_1.jpg")).unwrap(),
            "a"
        );
        assert_eq!(
            fs::read_to_string(temp_dir.path().join("Image_2.jpg")).unwrap(),
            "one"
        );
    }

    #[test]
    fn test_execute_emits_events() {
        let temp_dir = TempDir::new().expect("Failed to create temp directory");
        touch(temp_dir.path(), "a.jpg", "a");
        touch(temp_dir.path(), "b.avi", "b");
        touch(temp_dir.path(), "notes.txt", "n");

        let renamer = Renamer::default();
        let plan = renamer.plan(temp_dir.path()).unwrap();

        let mut renamed = Vec::new();
        let mut completed = 0;
        let report = renamer.execute(&plan, |event| match event {
            RenameEvent::Renamed(record) => {
                renamed.push((record.original.clone(), record.renamed.clone()))
            }
            RenameEvent::Completed(_) => completed += 1,
            _ => {}
        });

        assert_eq!(
            renamed,
            vec![
                ("a.jpg".to_string(), "Image_1.jpg".to_string()),
                ("b.avi".to_string(), "Video_1.avi".to_string()),
            ]
        );
        assert_eq!(completed, 1);
        assert_eq!(report.untouched, vec!["notes.txt"]);
        assert_eq!(report.renamed_to("b.avi"), Some("Video_1.avi"));
    }

    #[test]
    fn test_execute_records_failure_and_continues() {
        let temp_dir = TempDir::new().expect("Failed to create temp directory");
        touch(temp_dir.path(), "a.jpg", "a");
        touch(temp_dir.path(), "b.jpg", "b");

        let renamer = Renamer::default();
        let plan = renamer.plan(temp_dir.path()).unwrap();

        // The first file disappears between planning and execution.
        fs::remove_file(temp_dir.path().join("a.jpg")).unwrap();

        let report = renamer.execute(&plan, |_| {});
        assert_eq!(report.failed.len(), 1);
        assert_eq!(report.failed[0].name, "a.jpg");
        assert!(report.has_failures());
        assert_eq!(report.renamed_to("b.jpg"), Some("Image_2.jpg"));
        assert_eq!(names(temp_dir.path()), vec!["Image_2.jpg"]);
    }

    #[test]
    fn test_blocked_staged_file_keeps_its_content() {
        let temp_dir = TempDir::new().expect("Failed to create temp directory");
        touch(temp_dir.path(), "0.jpg", "zero");
        touch(temp_dir.path(), "Image_1.jpg", "one");

        let renamer = Renamer::default();
        let plan = renamer.plan(temp_dir.path()).unwrap();

        // Image_1.jpg is headed for Image_2.jpg, which gets taken after planning.
        fs::create_dir(temp_dir.path().join("Image_2.jpg")).unwrap();

        let report = renamer.execute(&plan, |_| {});

        assert_eq!(report.renamed_to("0.jpg"), Some("Image_1.jpg"));
        assert_eq!(report.failed.len(), 1);
        assert_eq!(report.failed[0].name, "Image_1.jpg");
        assert!(report.failed[0].reason.contains(".Image_2.jpg.renaming"));

        assert_eq!(
            fs::read_to_string(temp_dir.path().join("Image_1.jpg")).unwrap(),
            "zero"
        );
        assert_eq!(
            fs::read_to_string(temp_dir.path().join(".Image_2.jpg.renaming")).unwrap(),
            "one"
        );
    }

    #[test]
    fn test_blocked_staged_file_is_restored_when_possible() {
        let temp_dir = TempDir::new().expect("Failed to create temp directory");
        touch(temp_dir.path(), "A.jpg", "a");

        let renamer = Renamer::default();
        let plan = renamer.plan(temp_dir.path()).unwrap();

        // Taken after planning: A.jpg is staged, cannot reach its new name,
        // and goes back to its own.
        fs::create_dir(temp_dir.path().join("Image_1.jpg")).unwrap();

        let report = renamer.execute(&plan, |_| {});

        assert!(report.renamed.is_empty());
        assert_eq!(report.failed.len(), 1);
        assert_eq!(report.failed[0].reason, "Image_1.jpg already exists");
        assert_eq!(fs::read_to_string(temp_dir.path().join("A.jpg")).unwrap(), "a");
        assert!(!temp_dir.path().join(".Image_1.jpg.renaming").exists());
    }

    #[cfg(unix)]
    #[test]
    fn test_file_key_follows_identity_not_spelling() {
        let temp_dir = TempDir::new().expect("Failed to create temp directory");
        touch(temp_dir.path(), "a.jpg", "a");
        touch(temp_dir.path(), "b.jpg", "b");
        fs::hard_link(temp_dir.path().join("a.jpg"), temp_dir.path().join("alias.jpg")).unwrap();

        let a = file_key(&temp_dir.path().join("a.jpg"));
        assert!(a.is_some());
        assert_eq!(a, file_key(&temp_dir.path().join("alias.jpg")));
        assert_ne!(a, file_key(&temp_dir.path().join("b.jpg")));
        assert_eq!(file_key(&temp_dir.path().join("missing.jpg")), None);
    }

    #[cfg(unix)]
    #[test]
    fn test_target_held_by_the_moving_file_itself_is_not_a_conflict() {
        let temp_dir = TempDir::new().expect("Failed to create temp directory");
        touch(temp_dir.path(), "a.jpg", "a");
        // Another name for a.jpg, the way IMAGE_1.JPG and Image_1.jpg are one
        // file on a case-insensitive filesystem.
        fs::hard_link(temp_dir.path().join("a.jpg"), temp_dir.path().join("Image_1.jpg")).unwrap();

        let config = RenamerConfig {
            filters: FilterRules {
                enable_hidden_files: true,
                exclude: ExcludeRules {
                    filenames: vec!["Image_1.jpg".to_string()],
                    ..Default::default()
                },
            },
            ..Default::default()
        };
        let plan = Renamer::from_config(&config)
            .unwrap()
            .plan(temp_dir.path())
            .unwrap();

        assert_eq!(plan.renames.len(), 1);
        assert_eq!(plan.renames[0].new_name, "Image_1.jpg");
        assert_eq!(plan.renames[0].status, PlanStatus::Ready);
    }

    #[test]
    fn test_report_category_counts() {
        let temp_dir = TempDir::new().expect("Failed to create temp directory");
        for name in ["a.jpg", "b.png", "c.mkv"] {
            touch(temp_dir.path(), name, name);
        }

        let report = Renamer::default().rename(temp_dir.path()).unwrap();
        let counts = report.category_counts();

        assert_eq!(counts.get(&Category::Image), Some(&2));
        assert_eq!(counts.get(&Category::Video), Some(&1));
    }

    #[test]
    fn test_rename_error_display() {
        let err = RenameError::FolderNotFound {
            path: PathBuf::from("/missing"),
        };
        assert_eq!(
            err.to_string(),
            "The folder '/missing' does not exist. Please check the path."
        );
    }
}
