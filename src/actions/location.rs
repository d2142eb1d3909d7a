//! Where a file sync reads its source: local disk or a git repository.
//!
//! Both variants answer the same questions (content, local path, last
//! modified time) so [`FileSync`](super::FileSync) never needs to know which
//! one it holds. A remote location clones lazily on first use, under the
//! application directory it is handed, and caches the checkout for the rest
//! of the run.
use std::fmt;
use std::io;
use std::path::{Path, PathBuf};

use chrono::{DateTime, Utc};

use super::error::ActionFailure;
use super::fs::modified_time;
use crate::prompt::DecisionProvider;

/// Answer to a modified-date conflict.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ModifiedDateDecision {
    /// Abort the whole run.
    StopExecution,
    /// Leave the destination alone this time.
    SkipThisAction,
    /// Overwrite the destination this time.
    ProceedOnce,
    /// Overwrite and stop asking for the rest of the run.
    IgnoreInFuture,
}

/// Which side of a conflict was modified more recently.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NewerSide {
    /// The source changed since the destination was written.
    Source,
    /// The destination was edited after the last sync.
    Destination,
}

/// Details handed to a [`DecisionProvider`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ModifiedDateConflict {
    /// Description of the source location.
    pub source: String,
    /// Destination file on disk.
    pub destination: PathBuf,
    /// Source modified time.
    pub source_modified: DateTime<Utc>,
    /// Destination modified time.
    pub destination_modified: DateTime<Utc>,
    /// Which side is newer.
    pub newer: NewerSide,
}

/// Source of a file sync.
#[derive(Debug)]
pub enum FileLocation {
    /// A file on the local filesystem.
    Local(LocalFileLocation),
    /// A file inside a git repository.
    Remote(RemoteFileLocation),
}

impl FileLocation {
    /// Local file at `path`.
    #[must_use]
    pub fn local(path: impl Into<PathBuf>) -> Self {
        Self::Local(LocalFileLocation::new(path))
    }

    /// File `relative_path` inside `repository`.
    ///
    /// Returns `None` when the URL cannot name a checkout directory
    /// (see [`checkout_name`]).
    #[must_use]
    pub fn remote(repository: impl Into<String>, relative_path: impl Into<PathBuf>) -> Option<Self> {
        RemoteFileLocation::new(repository, relative_path).map(Self::Remote)
    }

    /// Raw file content.
    ///
    /// # Errors
    ///
    /// Remote locations only expose a path, so they fail with
    /// [`ActionFailure::NotSupported`]. Local reads fail with
    /// [`ActionFailure::NotFound`] or [`ActionFailure::Unreadable`].
    pub fn content(&self) -> Result<Vec<u8>, ActionFailure> {
        match self {
            Self::Local(local) => local.content(),
            Self::Remote(remote) => Err(ActionFailure::NotSupported {
                operation: "content",
                location: remote.to_string(),
            }),
        }
    }

    /// Local path of the file, fetching a remote location into `app_dir`
    /// first if needed. Local locations ignore `app_dir`.
    ///
    /// # Errors
    ///
    /// [`ActionFailure::PathNotFound`] when the file is absent and
    /// [`ActionFailure::FetchFailure`] when cloning fails.
    pub fn path(&mut self, app_dir: &Path) -> Result<PathBuf, ActionFailure> {
        match self {
            Self::Local(local) => local.path(),
            Self::Remote(remote) => remote.path(app_dir),
        }
    }

    /// Last modification time of the source: the file's mtime, or the commit
    /// time of a remote checkout under `app_dir`.
    ///
    /// # Errors
    ///
    /// [`ActionFailure::NotFound`] for a missing local file;
    /// [`ActionFailure::FetchFailure`] when a remote cannot be fetched.
    pub fn modified_date(&mut self, app_dir: &Path) -> Result<DateTime<Utc>, ActionFailure> {
        match self {
            Self::Local(local) => local.modified_date(),
            Self::Remote(remote) => remote.modified_date(app_dir),
        }
    }

    /// Compare the source against the file at `local_path` and ask
    /// `decisions` what to do when their modified times differ.
    ///
    /// Times are compared at whole-second precision; `None` means the two
    /// sides agree and no question was asked.
    ///
    /// # Errors
    ///
    /// Fails when either side's modified time cannot be read.
    pub fn compare_modified_date(
        &mut self,
        app_dir: &Path,
        local_path: &Path,
        decisions: &dyn DecisionProvider,
    ) -> Result<Option<ModifiedDateDecision>, ActionFailure> {
        let source_modified = self.modified_date(app_dir)?;
        let destination_modified =
            modified_time(local_path).map_err(|e| read_failure(local_path, e))?;

        if source_modified.timestamp() == destination_modified.timestamp() {
            return Ok(None);
        }

        let newer = if source_modified > destination_modified {
            NewerSide::Source
        } else {
            NewerSide::Destination
        };
        let conflict = ModifiedDateConflict {
            source: self.to_string(),
            destination: local_path.to_path_buf(),
            source_modified,
            destination_modified,
            newer,
        };
        Ok(Some(decisions.decide(&conflict)))
    }
}

impl fmt::Display for FileLocation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Local(local) => write!(f, "{local}"),
            Self::Remote(remote) => write!(f, "{remote}"),
        }
    }
}

/// Map an I/O error on `path` to the matching failure.
fn read_failure(path: &Path, err: io::Error) -> ActionFailure {
    if err.kind() == io::ErrorKind::NotFound {
        ActionFailure::NotFound {
            path: path.to_path_buf(),
        }
    } else {
        ActionFailure::Unreadable {
            path: path.to_path_buf(),
            source: err,
        }
    }
}

// ---------------------------------------------------------------------------
// Local
// ---------------------------------------------------------------------------

/// A file on the local filesystem.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LocalFileLocation {
    path: PathBuf,
}

impl LocalFileLocation {
    /// Location of the file at `path`.
    #[must_use]
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    fn content(&self) -> Result<Vec<u8>, ActionFailure> {
        std::fs::read(&self.path).map_err(|e| read_failure(&self.path, e))
    }

    fn path(&self) -> Result<PathBuf, ActionFailure> {
        if self.path.exists() {
            Ok(self.path.clone())
        } else {
            Err(ActionFailure::PathNotFound {
                path: self.path.clone(),
            })
        }
    }

    fn modified_date(&self) -> Result<DateTime<Utc>, ActionFailure> {
        modified_time(&self.path).map_err(|e| read_failure(&self.path, e))
    }
}

impl fmt::Display for LocalFileLocation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "local file {}", self.path.display())
    }
}

// ---------------------------------------------------------------------------
// Remote
// ---------------------------------------------------------------------------

/// Checkout produced by the first fetch of a run.
#[derive(Debug, Clone)]
struct Checkout {
    file: PathBuf,
    revision_time: DateTime<Utc>,
}

/// A file inside a git repository.
#[derive(Debug)]
pub struct RemoteFileLocation {
    repository: String,
    relative_path: PathBuf,
    checkout_name: String,
    fetched: Option<Checkout>,
}

impl RemoteFileLocation {
    /// Location of `relative_path` inside `repository`; `None` when the URL
    /// does not yield a checkout name.
    #[must_use]
    pub fn new(repository: impl Into<String>, relative_path: impl Into<PathBuf>) -> Option<Self> {
        let repository = repository.into();
        let checkout_name = checkout_name(&repository)?;
        Some(Self {
            repository,
            relative_path: relative_path.into(),
            checkout_name,
            fetched: None,
        })
    }

    /// Directory the repository is cloned into: `app_dir/<owner>.<repo>`.
    #[must_use]
    pub fn checkout_dir(&self, app_dir: &Path) -> PathBuf {
        app_dir.join(&self.checkout_name)
    }

    fn path(&mut self, app_dir: &Path) -> Result<PathBuf, ActionFailure> {
        Ok(self.fetch(app_dir)?.file)
    }

    fn modified_date(&mut self, app_dir: &Path) -> Result<DateTime<Utc>, ActionFailure> {
        Ok(self.fetch(app_dir)?.revision_time)
    }

    fn fetch(&mut self, app_dir: &Path) -> Result<Checkout, ActionFailure> {
        if let Some(checkout) = &self.fetched {
            return Ok(checkout.clone());
        }
        let checkout = self.clone_repository(&self.checkout_dir(app_dir))?;
        self.fetched = Some(checkout.clone());
        Ok(checkout)
    }

    /// Replace any previous checkout at `checkout_dir` with a fresh clone.
    fn clone_repository(&self, checkout_dir: &Path) -> Result<Checkout, ActionFailure> {
        let fetch_failure = |reason: String| ActionFailure::FetchFailure {
            repository: self.repository.clone(),
            reason,
        };

        if let Err(e) = std::fs::remove_dir_all(checkout_dir)
            && e.kind() != io::ErrorKind::NotFound
        {
            return Err(fetch_failure(format!(
                "cannot remove old checkout {}: {e}",
                checkout_dir.display()
            )));
        }

        tracing::debug!(
            "cloning {} into {}",
            self.repository,
            checkout_dir.display()
        );
        let repo = git2::Repository::clone(&self.repository, checkout_dir)
            .map_err(|e| fetch_failure(e.message().to_string()))?;
        let commit = repo
            .head()
            .and_then(|head| head.peel_to_commit())
            .map_err(|e| fetch_failure(e.message().to_string()))?;
        let revision_time = DateTime::from_timestamp(commit.time().seconds(), 0)
            .ok_or_else(|| fetch_failure("commit time out of range".to_string()))?;

        let file = checkout_dir.join(&self.relative_path);
        if !file.exists() {
            return Err(ActionFailure::PathNotFound { path: file });
        }
        Ok(Checkout {
            file,
            revision_time,
        })
    }
}

impl fmt::Display for RemoteFileLocation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} in {}",
            self.relative_path.display(),
            self.repository
        )
    }
}

/// Checkout directory name for a repository URL: `<owner>.<repo>`.
///
/// The URL needs a `scheme://` prefix and, after the host, at least an owner
/// and a repository segment (`file://` URLs have no host). A trailing `.git`
/// is dropped.
///
/// ```
/// use personalizer_cli::actions::location::checkout_name;
///
/// assert_eq!(
///     checkout_name("https://github.com/alice/dotfiles.git").as_deref(),
///     Some("alice.dotfiles")
/// );
/// assert_eq!(checkout_name("github.com/alice/dotfiles"), None);
/// ```
#[must_use]
pub fn checkout_name(repository: &str) -> Option<String> {
    let (scheme, rest) = repository.split_once("://")?;
    if scheme.is_empty()
        || !scheme
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || matches!(c, '+' | '-' | '.'))
    {
        return None;
    }

    let segments: Vec<&str> = rest.split('/').filter(|s| !s.is_empty()).collect();
    let min_segments = if scheme.eq_ignore_ascii_case("file") { 2 } else { 3 };
    if segments.len() < min_segments {
        return None;
    }
    let [.., owner, repo] = segments.as_slice() else {
        return None;
    };
    let repo = repo.strip_suffix(".git").unwrap_or(*repo);
    if repo.is_empty() {
        return None;
    }
    Some(format!("{owner}.{repo}"))
}
