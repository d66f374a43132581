use std::path::{Path, PathBuf};

/// A resolved workspace root together with the directory npw was invoked from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Workspace {
    pub root: PathBuf,
    pub cwd: PathBuf,
}

impl Workspace {
    #[must_use]
    pub fn new(root: PathBuf, cwd: PathBuf) -> Self {
        Self { root, cwd }
    }

    /// Path of the invocation directory relative to the root, or `None` when
    /// npw was invoked from the root itself.
    #[must_use]
    pub fn scope(&self) -> Option<PathBuf> {
        if self.root == self.cwd {
            return None;
        }
        relative_path(&self.root, &self.cwd)
    }

    /// Forwarded arguments with `scope_flag <scope>` spliced in after the
    /// sub-command, e.g. `run build` becomes `run -w pkgs/foo build`.
    #[must_use]
    pub fn scoped_args(&self, args: &[String], scope_flag: &str) -> Vec<String> {
        let Some(scope) = self.scope() else {
            return args.to_vec();
        };
        let at = args.len().min(1);
        let mut scoped = Vec::with_capacity(args.len() + 2);
        scoped.extend_from_slice(&args[..at]);
        scoped.push(scope_flag.to_string());
        scoped.push(scope.to_string_lossy().into_owned());
        scoped.extend_from_slice(&args[at..]);
        scoped
    }
}

/// `to` expressed relative to `from`, when `to` lies underneath `from`.
fn relative_path(from: &Path, to: &Path) -> Option<PathBuf> {
    to.strip_prefix(from)
        .ok()
        .filter(|rel| !rel.as_os_str().is_empty())
        .map(Path::to_path_buf)
}
