//! Embedded PostgreSQL for the marketplace persistence suites.
//!
//! Each bootstrap gets its own install and data directory under
//! `target/pg-embed`, unless the caller already exported `PG_RUNTIME_DIR`
//! and `PG_DATA_DIR`. Bootstraps run one at a time because the directory
//! override is process-wide environment state.

use std::path::{Path, PathBuf};
use std::sync::Mutex;
use std::time::Duration;

use pg_embedded_setup_unpriv::TestCluster;
use uuid::Uuid;

static BOOTSTRAP: Mutex<()> = Mutex::new(());

/// Attempts after the first when the binary download flakes.
const DOWNLOAD_RETRIES: u32 = 3;

const FIRST_BACKOFF: Duration = Duration::from_millis(500);

/// Substrings of cluster errors worth another download attempt.
const FLAKY_DOWNLOAD: &[&str] = &[
    "error decoding response body",
    "connection reset",
    "connection refused",
    "timed out",
    "temporarily unavailable",
    "dns error",
];

fn scratch_root() -> PathBuf {
    std::env::var_os("CARGO_TARGET_DIR")
        .map(PathBuf::from)
        .unwrap_or_else(|| Path::new(env!("CARGO_MANIFEST_DIR")).join("../target"))
        .join("pg-embed")
}

/// Install and data directories for one cluster.
struct ClusterDirs {
    install: PathBuf,
    data: PathBuf,
}

impl ClusterDirs {
    fn create() -> std::io::Result<Self> {
        let unique = format!("market-{}-{}", std::process::id(), Uuid::new_v4());
        let base = scratch_root().join(unique);
        let dirs = Self {
            install: base.join("install"),
            data: base.join("data"),
        };
        std::fs::create_dir_all(&dirs.install)?;
        std::fs::create_dir_all(&dirs.data)?;
        Ok(dirs)
    }

    fn env(&self) -> [(&'static str, Option<String>); 2] {
        [
            ("PG_RUNTIME_DIR", Some(self.install.display().to_string())),
            ("PG_DATA_DIR", Some(self.data.display().to_string())),
        ]
    }
}

fn caller_chose_dirs() -> bool {
    std::env::var_os("PG_RUNTIME_DIR").is_some() && std::env::var_os("PG_DATA_DIR").is_some()
}

fn is_flaky_download(message: &str) -> bool {
    let message = message.to_lowercase();
    FLAKY_DOWNLOAD.iter().any(|needle| message.contains(needle))
}

/// Start a cluster for the order lifecycle suites.
///
/// Download hiccups are retried with doubling backoff; any other failure is
/// returned immediately as its debug rendering.
pub fn test_cluster() -> Result<TestCluster, String> {
    let _serialised = BOOTSTRAP.lock().unwrap_or_else(|poisoned| poisoned.into_inner());

    let _env = if caller_chose_dirs() {
        None
    } else {
        let dirs = ClusterDirs::create().map_err(|err| err.to_string())?;
        Some(env_lock::lock_env(dirs.env()))
    };

    let mut backoff = FIRST_BACKOFF;
    let mut attempt = 0;
    loop {
        let message = match TestCluster::new() {
            Ok(cluster) => return Ok(cluster),
            Err(err) => format!("{err:?}"),
        };
        if attempt == DOWNLOAD_RETRIES || !is_flaky_download(&message) {
            return Err(message);
        }
        attempt += 1;
        eprintln!("pg-embed: attempt {attempt} failed, retrying in {backoff:?}: {message}");
        std::thread::sleep(backoff);
        backoff *= 2;
    }
}
