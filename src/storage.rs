use std::fs;
use std::path::{Path, PathBuf};

use crate::config::find_dir_containing;
use crate::error::{Error, Result};
use crate::model::{Component, Issue, Project};

pub const PROJECT_FN: &str = "project.yaml";
const ISSUE_PREFIX: &str = "issue-";
const ISSUE_SUFFIX: &str = ".yaml";

/// Where the project lives and how it gets written back.
pub trait Storage {
    fn load(&self) -> Result<Project>;
    /// Persist the project metadata and every issue flagged as changed.
    fn save(&mut self, project: &Project) -> Result<()>;
}

/// One `project.yaml` plus one `issue-<id>.yaml` per issue, all in one directory.
#[derive(Debug, Clone)]
pub struct FileStorage {
    dir: PathBuf,
}

impl FileStorage {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    pub fn issue_path(&self, id: &str) -> PathBuf {
        self.dir.join(format!("{ISSUE_PREFIX}{id}{ISSUE_SUFFIX}"))
    }

    /// Create a new, empty project in `dir`.
    pub fn init(dir: impl Into<PathBuf>, name: &str, components: &[String]) -> Result<FileStorage> {
        let mut storage = FileStorage::new(dir);
        let project_path = storage.dir.join(PROJECT_FN);
        if project_path.exists() {
            return Err(Error::AlreadyInitialized(storage.dir.clone()));
        }
        fs::create_dir_all(&storage.dir).map_err(|e| Error::Write {
            path: storage.dir.clone(),
            source: e,
        })?;

        let components = if components.is_empty() {
            vec![Component::new(name)]
        } else {
            components.iter().map(Component::new).collect()
        };
        let project = Project::new(name, components);
        storage.save(&project)?;
        tracing::info!("initialized project {} in {}", name, storage.dir.display());
        Ok(storage)
    }

    fn read_yaml<T: serde::de::DeserializeOwned>(path: &Path) -> Result<T> {
        let text = fs::read_to_string(path).map_err(|e| Error::Read {
            path: path.to_path_buf(),
            source: e,
        })?;
        serde_yaml::from_str(&text).map_err(|e| Error::Parse {
            path: path.to_path_buf(),
            source: e,
        })
    }

    fn write_yaml<T: serde::Serialize>(path: &Path, value: &T) -> Result<()> {
        let text = serde_yaml::to_string(value)?;
        fs::write(path, text).map_err(|e| Error::Write {
            path: path.to_path_buf(),
            source: e,
        })
    }

    fn issue_files(&self) -> Result<Vec<PathBuf>> {
        let entries = fs::read_dir(&self.dir).map_err(|e| Error::Read {
            path: self.dir.clone(),
            source: e,
        })?;
        let mut files = Vec::new();
        for entry in entries {
            let entry = entry.map_err(|e| Error::Read {
                path: self.dir.clone(),
                source: e,
            })?;
            let file_name = entry.file_name();
            let file_name = file_name.to_string_lossy();
            if file_name.starts_with(ISSUE_PREFIX) && file_name.ends_with(ISSUE_SUFFIX) {
                files.push(entry.path());
            }
        }
        Ok(files)
    }
}

impl Storage for FileStorage {
    fn load(&self) -> Result<Project> {
        let project: Project = Self::read_yaml(&self.dir.join(PROJECT_FN))?;

        let mut issues = Vec::new();
        for path in self.issue_files()? {
            let issue: Issue = Self::read_yaml(&path)?;
            issues.push(issue);
        }
        // Directory order is arbitrary; creation order is what the list shows.
        issues.sort_by(|a, b| {
            a.creation_time
                .cmp(&b.creation_time)
                .then_with(|| a.id.cmp(&b.id))
        });

        let project = project.with_issues(issues)?;
        tracing::debug!(
            "loaded project {} with {} issues from {}",
            project.name,
            project.issues().len(),
            self.dir.display()
        );
        Ok(project)
    }

    fn save(&mut self, project: &Project) -> Result<()> {
        Self::write_yaml(&self.dir.join(PROJECT_FN), project)?;

        let mut written = 0;
        for issue in project.issues().iter().filter(|i| i.is_changed()) {
            Self::write_yaml(&self.issue_path(&issue.id), issue)?;
            written += 1;
        }
        tracing::debug!("saved {} changed issues to {}", written, self.dir.display());
        Ok(())
    }
}

/// Find the issue directory: `issue_dir` itself when absolute, otherwise the
/// nearest ancestor of `start` that contains `<issue_dir>/project.yaml`.
pub fn locate_issue_dir(start: &Path, issue_dir: &Path) -> Result<PathBuf> {
    let marker = issue_dir.join(PROJECT_FN);
    if issue_dir.is_absolute() {
        return if marker.exists() {
            Ok(issue_dir.to_path_buf())
        } else {
            Err(Error::ProjectNotFound(marker))
        };
    }
    find_dir_containing(start, &marker)
        .map(|root| root.join(issue_dir))
        .ok_or(Error::ProjectNotFound(marker))
}
