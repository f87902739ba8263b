use std::sync::{Mutex, MutexGuard, PoisonError};

use tracing::trace;

use crate::file::GeneratedFile;

/// Files staged during one generation run.
///
/// Append-only and safe to share between concurrently running generators.
/// Two files staged for the same path are both kept.
#[derive(Debug, Default)]
pub struct Context {
    files: Mutex<Vec<GeneratedFile>>,
}

impl Context {
    pub fn new() -> Self {
        Self::default()
    }

    /// Stages every file in order while holding the lock once.
    pub fn stage_all(&self, files: impl IntoIterator<Item = GeneratedFile>) {
        let mut staged = self.lock();
        for file in files {
            trace!(path = %file.path().display(), "staging file");
            staged.push(file);
        }
    }

    /// Snapshot of the staged files in staging order.
    pub fn files(&self) -> Vec<GeneratedFile> {
        self.lock().clone()
    }

    pub fn len(&self) -> usize {
        self.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.lock().is_empty()
    }

    pub fn into_files(self) -> Vec<GeneratedFile> {
        self.files.into_inner().unwrap_or_else(PoisonError::into_inner)
    }

    fn lock(&self) -> MutexGuard<'_, Vec<GeneratedFile>> {
        self.files.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    #[test]
    fn keeps_staging_order_and_duplicates() {
        let context = Context::new();
        assert!(context.is_empty());

        context.stage_all([GeneratedFile::new("./a.ts", "a")]);
        context.stage_all([
            GeneratedFile::new("./b.ts", "b"),
            GeneratedFile::new("./a.ts", "again"),
        ]);

        let paths: Vec<String> = context
            .files()
            .iter()
            .map(|f| f.path().display().to_string())
            .collect();
        assert_eq!(paths, ["./a.ts", "./b.ts", "./a.ts"]);
        assert_eq!(context.len(), 3);
    }

    #[test]
    fn concurrent_stages_are_all_kept() {
        let context = Arc::new(Context::new());
        let handles: Vec<_> = (0..8)
            .map(|i| {
                let context = Arc::clone(&context);
                std::thread::spawn(move || {
                    for j in 0..25 {
                        context.stage_all([GeneratedFile::new(format!("./{i}-{j}.ts"), "")]);
                    }
                })
            })
            .collect();
        for handle in handles {
            handle.join().unwrap();
        }

        assert_eq!(context.len(), 200);
    }
}
