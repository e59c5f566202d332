/// Extension-based classification of media files.
///
/// This module maps file extensions to the categories that drive the new
/// file names (`Image_1.jpg`, `Video_1.mp4`).
///
/// # Examples
///
/// ```
/// use media_renamer::category::{Category, CategoryTable};
///
/// let table = CategoryTable::default();
/// assert_eq!(table.categorize(".jpg"), Some(Category::Image));
/// assert_eq!(table.categorize(".MKV"), Some(Category::Video));
/// assert_eq!(table.categorize(".txt"), None);
/// ```
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::fmt;

/// Represents a media category.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Category {
    /// Image files (JPG, PNG, GIF, etc.)
    Image,
    /// Video files (MP4, MKV, AVI, etc.)
    Video,
}

impl Category {
    /// Every category, in lookup order.
    pub const ALL: [Category; 2] = [Category::Image, Category::Video];

    /// Returns the prefix used when building new file names.
    ///
    /// # Examples
    ///
    /// ```
    /// use media_renamer::category::Category;
    ///
    /// assert_eq!(Category::Image.prefix(), "Image");
    /// assert_eq!(Category::Video.prefix(), "Video");
    /// ```
    pub fn prefix(&self) -> &'static str {
        match self {
            Category::Image => "Image",
            Category::Video => "Video",
        }
    }

    /// Builds the file name for the `index`-th file of this category.
    ///
    /// `ext` is expected to carry its leading dot.
    ///
    /// ```
    /// use media_renamer::category::Category;
    ///
    /// assert_eq!(Category::Video.file_name(3, ".mp4"), "Video_3.mp4");
    /// ```
    pub fn file_name(&self, index: usize, ext: &str) -> String {
        format!("{}_{}{}", self.prefix(), index, ext)
    }

    /// The extensions recognized for this category out of the box.
    pub fn default_extensions(&self) -> &'static [&'static str] {
        match self {
            Category::Image => &[".jpg", ".jpeg", ".png", ".bmp", ".tiff", ".gif"],
            Category::Video => &[".mp4", ".avi", ".mov", ".mkv", ".flv", ".wmv"],
        }
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.prefix())
    }
}

/// Normalizes an extension to lowercase with a single leading dot.
///
/// Returns an empty string for an empty (or dot-only) input.
///
/// ```
/// use media_renamer::category::normalize_extension;
///
/// assert_eq!(normalize_extension("JPG"), ".jpg");
/// assert_eq!(normalize_extension(".Png"), ".png");
/// assert_eq!(normalize_extension(""), "");
/// ```
pub fn normalize_extension(ext: &str) -> String {
    let trimmed = ext.trim().trim_start_matches('.');
    if trimmed.is_empty() {
        return String::new();
    }
    format!(".{}", trimmed.to_lowercase())
}

/// Ordered mapping from category to the extensions it recognizes.
///
/// Lookups test categories in insertion order, so with the default table an
/// extension listed under both Image and Video resolves to Image.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CategoryTable {
    entries: Vec<(Category, HashSet<String>)>,
}

impl CategoryTable {
    /// Creates a table with no categories.
    pub fn empty() -> Self {
        Self {
            entries: Vec::new(),
        }
    }

    /// Creates a table with the standard Image and Video extensions.
    pub fn new() -> Self {
        let mut table = Self::empty();
        for category in Category::ALL {
            table.set_extensions(category, category.default_extensions().iter().copied());
        }
        table
    }

    /// Replaces the extensions of `category`, appending it if missing.
    pub fn set_extensions<I, S>(&mut self, category: Category, extensions: I)
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let set: HashSet<String> = extensions
            .into_iter()
            .map(|ext| normalize_extension(ext.as_ref()))
            .filter(|ext| !ext.is_empty())
            .collect();

        match self.entries.iter_mut().find(|(c, _)| *c == category) {
            Some((_, existing)) => *existing = set,
            None => self.entries.push((category, set)),
        }
    }

    /// Categories in lookup order.
    pub fn categories(&self) -> impl Iterator<Item = Category> + '_ {
        self.entries.iter().map(|(c, _)| *c)
    }

    /// Maps an extension (with or without its dot, any case) to a category.
    pub fn categorize(&self, ext: &str) -> Option<Category> {
        let ext = normalize_extension(ext);
        if ext.is_empty() {
            return None;
        }
        self.entries
            .iter()
            .find(|(_, exts)| exts.contains(&ext))
            .map(|(category, _)| *category)
    }
}

impl Default for CategoryTable {
    fn default() -> Self {
        Self::new()
    }
}
