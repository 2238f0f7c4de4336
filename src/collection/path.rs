/// Canonical absolute form of a caller-supplied collection path.
///
/// Leading and trailing separators are dropped and exactly one leading `/`
/// is added, so `"a/b"`, `"/a/b"` and `"a/b/"` all become `"/a/b"`. Interior
/// separators are left as given.
pub fn normalize_path(path: &str) -> String {
  let trimmed = path.trim_matches('/');
  let mut absolute = String::with_capacity(trimmed.len() + 1);
  absolute.push('/');
  absolute.push_str(trimmed);
  absolute
}
