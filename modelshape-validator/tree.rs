use indexmap::IndexMap;
use modelshape_fs::{DELIMITER, is_directory_marker, join_segments, segments, strip_root};

pub type PathTreeChildren = IndexMap<String, PathTree, ahash::RandomState>;

/// Nested form of a flat file listing.
///
/// Directories are keyed by literal segment name, in the order they were first
/// listed. Every [`PathTree::File`] corresponds to exactly one listed file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PathTree {
    File,
    Dir(PathTreeChildren),
}

impl Default for PathTree {
    #[inline]
    fn default() -> Self {
        Self::empty_dir()
    }
}

impl PathTree {
    #[inline]
    #[must_use]
    pub fn empty_dir() -> Self {
        PathTree::Dir(PathTreeChildren::default())
    }

    /// Build a tree from `/`-separated paths relative to the validation root.
    pub fn from_paths<I, S>(paths: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        TreeBuilder::default().build(paths)
    }

    #[inline]
    #[must_use]
    pub fn is_file(&self) -> bool {
        matches!(self, PathTree::File)
    }

    #[inline]
    #[must_use]
    pub fn is_dir(&self) -> bool {
        matches!(self, PathTree::Dir(_))
    }

    #[inline]
    #[must_use]
    pub fn children(&self) -> Option<&PathTreeChildren> {
        match self {
            PathTree::Dir(children) => Some(children),
            PathTree::File => None,
        }
    }

    /// True if this is a directory with no entries.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.children().is_some_and(IndexMap::is_empty)
    }

    #[must_use]
    pub fn get(&self, segment: &str) -> Option<&PathTree> {
        self.children()?.get(segment)
    }

    /// Look up a `/`-separated path below this node.
    #[must_use]
    pub fn get_path(&self, path: &str) -> Option<&PathTree> {
        segments(path, DELIMITER).try_fold(self, |node, segment| node.get(segment))
    }

    /// Number of files below this node (1 for a file).
    #[must_use]
    pub fn file_count(&self) -> usize {
        match self {
            PathTree::File => 1,
            PathTree::Dir(children) => children.values().map(PathTree::file_count).sum(),
        }
    }

    /// All file paths below this node, `/`-separated, in tree order.
    #[must_use]
    pub fn files(&self) -> Vec<String> {
        fn collect<'a>(node: &'a PathTree, stack: &mut Vec<&'a str>, out: &mut Vec<String>) {
            match node {
                PathTree::File => out.push(join_segments(stack.iter(), DELIMITER)),
                PathTree::Dir(children) => {
                    for (name, child) in children {
                        stack.push(name);
                        collect(child, stack, out);
                        stack.pop();
                    }
                }
            }
        }

        let mut out = Vec::new();
        collect(self, &mut Vec::new(), &mut out);
        out
    }

    /// Directory contents, turning a file into an empty directory first.
    fn as_dir_mut(&mut self, key: &str) -> &mut PathTreeChildren {
        if self.is_file() {
            tracing::warn!("`{key}` is listed both as a file and as a directory; treating it as a directory");
            *self = PathTree::empty_dir();
        }
        match self {
            PathTree::Dir(children) => children,
            PathTree::File => unreachable!(),
        }
    }

    fn insert(&mut self, key: &str, path: &[&str], is_dir: bool) {
        let Some((last, parents)) = path.split_last() else {
            return;
        };

        let mut node = self;
        for segment in parents {
            node = node
                .as_dir_mut(key)
                .entry((*segment).to_owned())
                .or_insert_with(PathTree::empty_dir);
        }

        let children = node.as_dir_mut(key);
        if is_dir {
            children
                .entry((*last).to_owned())
                .or_insert_with(PathTree::empty_dir)
                .as_dir_mut(key);
        } else {
            let leaf = children
                .entry((*last).to_owned())
                .or_insert(PathTree::File);
            if leaf.is_dir() {
                tracing::warn!("`{key}` is listed both as a file and as a directory; treating it as a directory");
            }
        }
    }
}

/// Builds a [`PathTree`] from a flat listing rooted at a known prefix.
#[derive(Clone, Debug)]
pub struct TreeBuilder {
    root: String,
    delimiter: char,
}

impl Default for TreeBuilder {
    #[inline]
    fn default() -> Self {
        Self::new("")
    }
}

impl TreeBuilder {
    /// Paths passed to [`TreeBuilder::build()`] are expected to start with
    /// `root`. An empty root means the paths are already relative.
    #[must_use]
    pub fn new(root: impl Into<String>) -> Self {
        Self {
            root: root.into(),
            delimiter: DELIMITER,
        }
    }

    /// Use a different segment delimiter, e.g. `\` for Windows paths.
    #[must_use]
    pub fn with_delimiter(mut self, delimiter: char) -> Self {
        self.delimiter = delimiter;
        self
    }

    #[inline]
    #[must_use]
    pub fn root(&self) -> &str {
        &self.root
    }

    #[inline]
    #[must_use]
    pub fn delimiter(&self) -> char {
        self.delimiter
    }

    pub fn build<I, S>(&self, paths: I) -> PathTree
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut tree = PathTree::empty_dir();
        for path in paths {
            let path = path.as_ref();
            let Some(relative) = strip_root(path, &self.root, self.delimiter) else {
                tracing::warn!("Skipping `{path}`, which is not below `{}`", self.root);
                continue;
            };

            let path_segments: Vec<&str> = segments(relative, self.delimiter).collect();
            if path_segments.is_empty() {
                continue;
            }

            let is_dir = is_directory_marker(relative, self.delimiter);
            tree.insert(path, &path_segments, is_dir);
        }

        tracing::trace!("Built path tree with {} files", tree.file_count());
        tree
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn dir<const N: usize>(entries: [(&str, PathTree); N]) -> PathTree {
        PathTree::Dir(
            entries
                .into_iter()
                .map(|(name, node)| (name.to_owned(), node))
                .collect(),
        )
    }

    #[test]
    fn nests_and_merges() {
        let tree = PathTree::from_paths(["a/b/c.txt", "a/b/d.txt", "a/e.txt"]);
        assert_eq!(
            tree,
            dir([(
                "a",
                dir([
                    ("b", dir([("c.txt", PathTree::File), ("d.txt", PathTree::File)])),
                    ("e.txt", PathTree::File),
                ])
            )])
        );
        assert_eq!(tree.file_count(), 3);
        assert_eq!(tree.files(), ["a/b/c.txt", "a/b/d.txt", "a/e.txt"]);
    }

    #[test]
    fn idempotent() {
        let paths = ["a/b/c.txt", "a/b/d.txt"];
        assert_eq!(PathTree::from_paths(paths), PathTree::from_paths(paths));

        let doubled = PathTree::from_paths(["a/b/c.txt", "a/b/c.txt", "a/b/d.txt"]);
        assert_eq!(doubled, PathTree::from_paths(paths));
        assert_eq!(doubled.file_count(), 2);
    }

    #[test]
    fn empty_listing() {
        let tree = PathTree::from_paths(Vec::<String>::new());
        assert!(tree.is_dir());
        assert!(tree.is_empty());
        assert_eq!(tree.file_count(), 0);
    }

    #[test]
    fn root_prefix() {
        let builder = TreeBuilder::new("s3://bucket/models/iris");
        let tree = builder.build([
            "s3://bucket/models/iris/1/model.onnx",
            "s3://bucket/models/iris-v2/1/model.onnx",
            "s3://bucket/models/iris/",
        ]);
        assert_eq!(tree.files(), ["1/model.onnx"]);
        assert!(tree.get_path("1/model.onnx").is_some_and(PathTree::is_file));
    }

    #[test]
    fn directory_markers() {
        let tree = PathTree::from_paths(["1/", "1/variables/"]);
        assert_eq!(tree.file_count(), 0);
        assert!(tree.get_path("1/variables").is_some_and(PathTree::is_empty));
    }

    #[test]
    fn file_and_directory_collision() {
        let tree = PathTree::from_paths(["1", "1/model.pkl"]);
        assert_eq!(tree, dir([("1", dir([("model.pkl", PathTree::File)]))]));

        let tree = PathTree::from_paths(["1/model.pkl", "1"]);
        assert_eq!(tree, dir([("1", dir([("model.pkl", PathTree::File)]))]));
    }

    #[test]
    fn custom_delimiter() {
        let tree = TreeBuilder::new(r"C:\models\iris")
            .with_delimiter('\\')
            .build([r"C:\models\iris\1\model.pkl"]);
        assert!(tree.get("1").and_then(|v| v.get("model.pkl")).is_some());
    }
}
