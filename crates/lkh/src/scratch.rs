//! Per-solve temporary files.
//!
//! A [`ScratchSpace`] owns a fresh directory under the system temp dir and the
//! files handed out from it. Dropping it removes the files in reverse
//! acquisition order and then the directory, on success and error paths
//! alike. Live directories are also registered for removal on Ctrl-C.

use std::{
    collections::HashSet,
    env, fs, io,
    path::{Path, PathBuf},
    process,
    sync::{
        Mutex, OnceLock,
        atomic::{AtomicUsize, Ordering},
    },
    time::{SystemTime, UNIX_EPOCH},
};

use crate::LkhResult;

static SHUTDOWN_WORKDIRS: OnceLock<Mutex<HashSet<PathBuf>>> = OnceLock::new();
static SHUTDOWN_HOOK_INSTALLED: OnceLock<()> = OnceLock::new();
static SCRATCH_COUNTER: AtomicUsize = AtomicUsize::new(0);

fn shutdown_workdirs() -> &'static Mutex<HashSet<PathBuf>> {
    SHUTDOWN_WORKDIRS.get_or_init(|| Mutex::new(HashSet::new()))
}

fn install_shutdown_hook_once() {
    SHUTDOWN_HOOK_INSTALLED.get_or_init(|| {
        if let Err(err) = ctrlc::set_handler(|| {
            let work_dirs: Vec<PathBuf> = match shutdown_workdirs().lock() {
                Ok(guard) => guard.iter().cloned().collect(),
                Err(_) => Vec::new(),
            };

            for work_dir in work_dirs {
                cleanup_workdir(&work_dir);
            }
            process::exit(130);
        }) {
            log::warn!("cleanup: failed to install shutdown hook err={err}");
        }
    });
}

fn register_workdir_for_shutdown_cleanup(work_dir: &Path) {
    install_shutdown_hook_once();
    if let Ok(mut guard) = shutdown_workdirs().lock() {
        guard.insert(work_dir.to_path_buf());
    }
}

fn unregister_workdir_for_shutdown_cleanup(work_dir: &Path) {
    if let Some(set) = SHUTDOWN_WORKDIRS.get()
        && let Ok(mut guard) = set.lock()
    {
        guard.remove(work_dir);
    }
}

fn is_registered_for_shutdown_cleanup(work_dir: &Path) -> bool {
    SHUTDOWN_WORKDIRS
        .get()
        .and_then(|set| set.lock().ok().map(|guard| guard.contains(work_dir)))
        .unwrap_or(false)
}

/// Removes `work_dir` and everything in it. A missing directory is not an
/// error.
pub fn cleanup_workdir(work_dir: &Path) {
    if !work_dir.exists() {
        unregister_workdir_for_shutdown_cleanup(work_dir);
        return;
    }

    if let Err(err) = fs::remove_dir_all(work_dir) {
        log::warn!(
            "cleanup: failed to remove workdir={} err={err}",
            work_dir.display()
        );
    } else {
        unregister_workdir_for_shutdown_cleanup(work_dir);
        log::debug!("cleanup: removed workdir={}", work_dir.display());
    }
}

/// Temporary directory plus the files acquired inside it.
#[derive(Debug)]
pub struct ScratchSpace {
    dir: PathBuf,
    artifacts: Vec<PathBuf>,
}

impl ScratchSpace {
    /// Creates a uniquely named directory under [`env::temp_dir`].
    pub fn create(prefix: &str) -> LkhResult<Self> {
        Self::create_in(&env::temp_dir(), prefix)
    }

    pub fn create_in(parent: &Path, prefix: &str) -> LkhResult<Self> {
        let nanos = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .map(|d| d.as_nanos())
            .unwrap_or_default();
        let seq = SCRATCH_COUNTER.fetch_add(1, Ordering::Relaxed);
        let dir = parent.join(format!("{prefix}-{}-{nanos}-{seq}", process::id()));

        fs::create_dir_all(&dir)?;
        register_workdir_for_shutdown_cleanup(&dir);
        log::debug!("scratch: created dir={}", dir.display());

        Ok(Self {
            dir,
            artifacts: Vec::new(),
        })
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Reserves `file_name` inside the scratch directory. The file itself is
    /// created by whoever writes to the returned path.
    pub fn acquire(&mut self, file_name: &str) -> PathBuf {
        let path = self.dir.join(file_name);
        self.artifacts.push(path.clone());
        path
    }

    fn release(&mut self) {
        while let Some(path) = self.artifacts.pop() {
            match fs::remove_file(&path) {
                Ok(()) => log::trace!("scratch: removed file={}", path.display()),
                Err(err) if err.kind() == io::ErrorKind::NotFound => {}
                Err(err) => log::warn!(
                    "scratch: failed to remove file={} err={err}",
                    path.display()
                ),
            }
        }
        cleanup_workdir(&self.dir);
    }
}

impl Drop for ScratchSpace {
    fn drop(&mut self) {
        self.release();
    }
}

#[cfg(test)]
mod tests {
    use std::{
        fs,
        path::PathBuf,
        time::{SystemTime, UNIX_EPOCH},
    };

    use super::{ScratchSpace, cleanup_workdir, is_registered_for_shutdown_cleanup};

    fn unique_temp_dir(name: &str) -> PathBuf {
        let nanos = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .expect("clock should be after epoch")
            .as_nanos();
        std::env::temp_dir().join(format!("lkh-tests-{name}-{nanos}"))
    }

    #[test]
    fn cleanup_workdir_removes_existing_directory() {
        let dir = unique_temp_dir("cleanup");
        fs::create_dir_all(&dir).expect("create temp dir");
        fs::write(dir.join("marker.txt"), b"ok").expect("write marker");

        cleanup_workdir(&dir);

        assert!(!dir.exists());
    }

    #[test]
    fn cleanup_workdir_ignores_missing_directory() {
        let dir = unique_temp_dir("missing");
        cleanup_workdir(&dir);
        assert!(!dir.exists());
    }

    #[test]
    fn scratch_space_removes_artifacts_and_dir_on_drop() {
        let (dir, files) = {
            let mut scratch = ScratchSpace::create("lkh-tests-scratch").expect("create scratch");
            let problem = scratch.acquire("problem.tsp");
            let params = scratch.acquire("problem.par");
            let tour = scratch.acquire("problem.tour");
            fs::write(&problem, "NAME: p\n").expect("write problem");
            fs::write(&params, "PROBLEM_FILE = p\n").expect("write params");

            assert!(is_registered_for_shutdown_cleanup(scratch.dir()));
            assert!(problem.starts_with(scratch.dir()));
            assert!(tour.starts_with(scratch.dir()));
            (scratch.dir().to_path_buf(), vec![problem, params, tour])
        };

        assert!(!dir.exists());
        assert!(files.iter().all(|f| !f.exists()));
        assert!(!is_registered_for_shutdown_cleanup(&dir));
    }

    #[test]
    fn scratch_space_cleans_up_while_unwinding() {
        let parent = unique_temp_dir("scratch-unwind");
        fs::create_dir_all(&parent).expect("create parent");

        let result = std::panic::catch_unwind(|| {
            let mut scratch =
                ScratchSpace::create_in(&parent, "scratch").expect("create scratch");
            fs::write(scratch.acquire("problem.tsp"), "x").expect("write problem");
            panic!("solver blew up");
        });

        assert!(result.is_err());
        let leftovers = fs::read_dir(&parent).expect("read parent").count();
        assert_eq!(leftovers, 0);

        fs::remove_dir_all(&parent).expect("cleanup parent");
    }

    #[test]
    fn scratch_spaces_get_distinct_directories() {
        let first = ScratchSpace::create("lkh-tests-distinct").expect("create first");
        let second = ScratchSpace::create("lkh-tests-distinct").expect("create second");
        assert_ne!(first.dir(), second.dir());
    }
}
