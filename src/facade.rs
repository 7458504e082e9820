//! Async entry points over the synchronous core.
//!
//! Every operation of the entry model blocks on its backend. These helpers
//! move a call onto tokio's blocking pool so async callers can await it.
//!
//! ```rust
//! # tokio_test::block_on(async {
//! use entryfs::FileOps;
//! use entryfs::FileSystem;
//! use entryfs::facade;
//!
//! let fs = FileSystem::in_memory();
//! let mut file = fs.file("/hello.txt");
//! let file = facade::unblock(move || {
//!     file.write_text("hi")?;
//!     Ok(file)
//! })
//! .await
//! .unwrap();
//! assert_eq!(file.read_text().unwrap(), "hi");
//! # })
//! ```

use std::sync::Arc;
use std::sync::atomic::AtomicBool;
use std::sync::atomic::Ordering;

use log::debug;

use crate::errors::Error;

/// A shared flag that stops calls which have not started yet.
///
/// Cancellation is checked before a call is dispatched and again right
/// before it runs. A call that already reached the backend runs to
/// completion.
#[derive(Debug, Clone, Default)]
pub struct CancellationToken(Arc<AtomicBool>);

impl CancellationToken {
    /// A token that is not cancelled.
    pub fn new() -> Self {
        Self::default()
    }

    /// Cancels every call guarded by this token or its clones.
    pub fn cancel(&self) {
        self.0.store(true, Ordering::SeqCst);
    }

    /// True once [`CancellationToken::cancel`] was called.
    pub fn is_cancelled(&self) -> bool {
        self.0.load(Ordering::SeqCst)
    }
}

/// Runs `f` on the blocking pool.
pub async fn unblock<F, T>(f: F) -> Result<T, Error>
where
    F: FnOnce() -> Result<T, Error> + Send + 'static,
    T: Send + 'static,
{
    tokio::task::spawn_blocking(f)
        .await
        .map_err(|e| Error::Task {
            what: "blocking call".to_string(),
            how: e.to_string(),
        })?
}

/// Runs `f` on the blocking pool unless `token` is cancelled first.
pub async fn unblock_with<F, T>(token: &CancellationToken, f: F) -> Result<T, Error>
where
    F: FnOnce() -> Result<T, Error> + Send + 'static,
    T: Send + 'static,
{
    if token.is_cancelled() {
        debug!("call cancelled before dispatch");
        return Err(Error::Cancelled);
    }
    let token = token.clone();
    unblock(move || {
        if token.is_cancelled() {
            debug!("call cancelled before it ran");
            return Err(Error::Cancelled);
        }
        f()
    })
    .await
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::CollisionOption;
    use crate::EntryOps;
    use crate::FileOps;
    use crate::FolderOps;
    use crate::SearchOption;
    use crate::memory_tree;

    #[test]
    fn runs_on_the_pool() {
        let fs = memory_tree(&[("/root/a.txt", false), ("/root/sub/b.txt", false)]);
        let root = fs.folder("/root");
        let names = tokio_test::block_on(unblock(move || {
            let files = root.get_files("*.txt", SearchOption::AllDirectories)?;
            Ok(files.iter().map(|f| f.file_name()).collect::<Vec<_>>())
        }));
        let mut names = names.unwrap();
        names.sort();
        assert_eq!(names, vec!["a.txt", "b.txt"]);
    }

    #[test]
    fn errors_pass_through() {
        let fs = memory_tree(&[]);
        let mut file = fs.file("/missing.txt");
        let err = tokio_test::block_on(unblock(move || {
            file.rename("x.txt", CollisionOption::FailIfExists)
        }))
        .unwrap_err();
        assert!(err.is_not_found());
    }

    #[test]
    fn cancelled_token_skips_the_call() {
        let fs = memory_tree(&[]);
        let token = CancellationToken::new();
        token.cancel();
        let mut file = fs.file("/never.txt");
        let result = tokio_test::block_on(unblock_with(&token, move || {
            file.write_text("nope")
        }));
        assert_eq!(result, Err(Error::Cancelled));
        assert!(!fs.file("/never.txt").exists().unwrap());
    }

    #[test]
    fn live_token_lets_the_call_run() {
        let fs = memory_tree(&[]);
        let token = CancellationToken::new();
        let mut file = fs.file("/yes.txt");
        let written = tokio_test::block_on(unblock_with(&token, move || file.write_text("ok")));
        assert_eq!(written, Ok(true));
        assert_eq!(fs.file("/yes.txt").read_text().unwrap(), "ok");
        assert!(!token.is_cancelled());
    }
}
