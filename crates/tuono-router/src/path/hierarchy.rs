/// Lazy iterator over a path and each of its ancestors
///
/// For `/a/b/c` it yields `/a/b/c`, `/a/b`, `/a`, `/`. Every item borrows
/// from the input, so walking up the hierarchy never allocates.
///
/// # Examples
///
/// ```
/// use tuono_router::path::PathHierarchy;
///
/// let paths: Vec<&str> = PathHierarchy::new("/a/b/c").collect();
/// assert_eq!(paths, vec!["/a/b/c", "/a/b", "/a", "/"]);
/// ```
#[derive(Debug, Clone)]
pub struct PathHierarchy<'a> {
    current: Option<&'a str>,
}

impl<'a> PathHierarchy<'a> {
    /// Starts at `path` itself
    pub fn new(path: &'a str) -> Self {
        Self {
            current: Some(path),
        }
    }

    /// Starts at the parent of `path`, skipping `path` itself
    ///
    /// ```
    /// use tuono_router::path::PathHierarchy;
    ///
    /// let paths: Vec<&str> = PathHierarchy::above("/blog/posts").collect();
    /// assert_eq!(paths, vec!["/blog", "/"]);
    /// assert_eq!(PathHierarchy::above("/").next(), None);
    /// ```
    pub fn above(path: &'a str) -> Self {
        let mut iter = Self::new(path);
        iter.next();
        iter
    }
}

impl<'a> Iterator for PathHierarchy<'a> {
    type Item = &'a str;

    fn next(&mut self) -> Option<Self::Item> {
        let current = self.current?;

        self.current = match current.rfind('/') {
            _ if current == "/" => None,
            Some(0) => Some("/"),
            Some(pos) => Some(&current[..pos]),
            None => None,
        };

        Some(current)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn walks_to_root() {
        let paths: Vec<&str> = PathHierarchy::new("/a/b/c/d").collect();
        assert_eq!(paths, vec!["/a/b/c/d", "/a/b/c", "/a/b", "/a", "/"]);

        let paths: Vec<&str> = PathHierarchy::new("/").collect();
        assert_eq!(paths, vec!["/"]);
    }

    #[test]
    fn stops_early_with_find() {
        let mut iter = PathHierarchy::new("/a/b/c/d");
        assert_eq!(iter.find(|&p| p == "/a/b"), Some("/a/b"));
        assert_eq!(iter.next(), Some("/a"));
    }

    #[test]
    fn above_skips_self() {
        let paths: Vec<&str> = PathHierarchy::above("/users").collect();
        assert_eq!(paths, vec!["/"]);
    }
}
