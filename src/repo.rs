use std::sync::{Arc, Mutex, RwLock};

use async_trait::async_trait;
use rand::seq::SliceRandom;
use rand::Rng;

use crate::models::*;

#[derive(thiserror::Error, Debug)]
pub enum RepoError {
    #[error("not found")] NotFound,
    #[error("io: {0}")] Io(#[from] std::io::Error),
    #[error("csv: {0}")] Csv(#[from] csv::Error),
    #[error("lock poisoned")] Poisoned,
}

pub type RepoResult<T> = Result<T, RepoError>;

pub type Table = Arc<Vec<Question>>;

#[async_trait]
pub trait QuestionRepo: Send + Sync {
    /// Current in-memory table. Cheap: clones an `Arc`.
    async fn snapshot(&self) -> RepoResult<Table>;
    /// Re-read the backing storage and replace the snapshot. Returns the row count.
    async fn reload(&self) -> RepoResult<usize>;
    /// Store one question, then reload the whole table (reload-on-write).
    async fn append(&self, question: Question) -> RepoResult<Question>;
}

/// Filter `table` and draw up to `n` distinct rows uniformly at random.
///
/// Fails with `NotFound` when nothing matches. The draw is capped at the
/// number of matching rows, in which case `incomplete` is set.
pub fn filter_and_sample<R: Rng + ?Sized>(
    table: &[Question],
    filter: &QuizFilter,
    n: usize,
    rng: &mut R,
) -> RepoResult<Quiz> {
    let mut matching: Vec<&Question> = table.iter().filter(|q| filter.matches(q)).collect();
    if matching.is_empty() {
        return Err(RepoError::NotFound);
    }
    let incomplete = matching.len() < n;
    let take = n.min(matching.len());
    let (picked, _) = matching.partial_shuffle(rng, take);
    Ok(Quiz {
        questions: picked.iter().map(|q| (*q).clone()).collect(),
        incomplete,
    })
}

fn read_lock<T>(lock: &RwLock<T>) -> RepoResult<std::sync::RwLockReadGuard<'_, T>> {
    lock.read().map_err(|_| RepoError::Poisoned)
}

fn write_lock<T>(lock: &RwLock<T>) -> RepoResult<std::sync::RwLockWriteGuard<'_, T>> {
    lock.write().map_err(|_| RepoError::Poisoned)
}

pub mod csv_file {
    use super::*;
    use std::fs::{File, OpenOptions};
    use std::io::{Read, Seek, SeekFrom, Write};
    use std::path::{Path, PathBuf};
    use tracing::info;

    /// Question table backed by a CSV file on disk.
    pub struct CsvQuestionRepo {
        path: PathBuf,
        table: RwLock<Table>,
        write_guard: Mutex<()>,
    }

    impl CsvQuestionRepo {
        /// Load an existing file. Fails if it is missing or unreadable.
        pub fn open(path: impl Into<PathBuf>) -> RepoResult<Self> {
            let path = path.into();
            let rows = read_table(&path)?;
            info!("Loaded {} questions from '{}'", rows.len(), path.display());
            Ok(Self {
                path,
                table: RwLock::new(Arc::new(rows)),
                write_guard: Mutex::new(()),
            })
        }

        /// Write a header-only file if none exists, then open it.
        pub fn create(path: impl Into<PathBuf>) -> RepoResult<Self> {
            let path = path.into();
            if !path.exists() {
                if let Some(dir) = path.parent().filter(|d| !d.as_os_str().is_empty()) {
                    std::fs::create_dir_all(dir)?;
                }
                let mut wtr = csv::Writer::from_path(&path)?;
                wtr.write_record(COLUMNS)?;
                wtr.flush()?;
                info!("Created empty question table '{}'", path.display());
            }
            Self::open(path)
        }

        pub fn path(&self) -> &Path { &self.path }

        fn refresh(&self) -> RepoResult<usize> {
            let rows = read_table(&self.path)?;
            let count = rows.len();
            *write_lock(&self.table)? = Arc::new(rows);
            Ok(count)
        }
    }

    /// Short rows are padded with empty cells before mapping onto `Question`.
    fn read_table(path: &Path) -> RepoResult<Vec<Question>> {
        let mut rdr = csv::ReaderBuilder::new().flexible(true).from_path(path)?;
        let headers = rdr.headers()?.clone();
        let mut rows = Vec::new();
        for rec in rdr.records() {
            let mut rec = rec?;
            while rec.len() < headers.len() {
                rec.push_field("");
            }
            rows.push(rec.deserialize::<Question>(Some(&headers))?);
        }
        Ok(rows)
    }

    /// True when the file is non-empty and its last byte is not a newline.
    fn missing_trailing_newline(file: &mut File) -> std::io::Result<bool> {
        if file.metadata()?.len() == 0 {
            return Ok(false);
        }
        file.seek(SeekFrom::End(-1))?;
        let mut last = [0u8; 1];
        file.read_exact(&mut last)?;
        Ok(last[0] != b'\n')
    }

    fn append_row(path: &Path, q: &Question) -> RepoResult<()> {
        let mut file = OpenOptions::new().read(true).append(true).open(path)?;
        if missing_trailing_newline(&mut file)? {
            file.write_all(b"\n")?;
        }
        let mut wtr = csv::WriterBuilder::new().has_headers(false).from_writer(file);
        wtr.serialize(q)?;
        wtr.flush()?;
        Ok(())
    }

    #[async_trait]
    impl QuestionRepo for CsvQuestionRepo {
        async fn snapshot(&self) -> RepoResult<Table> {
            Ok(read_lock(&self.table)?.clone())
        }

        async fn reload(&self) -> RepoResult<usize> {
            self.refresh()
        }

        async fn append(&self, question: Question) -> RepoResult<Question> {
            let _guard = self.write_guard.lock().map_err(|_| RepoError::Poisoned)?;
            append_row(&self.path, &question)?;
            let count = self.refresh()?;
            info!(subject = %question.subject, rows = count, "appended question");
            Ok(question)
        }
    }
}

pub mod inmem {
    use super::*;

    /// Vec-backed store with no file behind it.
    #[derive(Default)]
    pub struct InMemRepo {
        table: RwLock<Table>,
    }

    impl InMemRepo {
        pub fn new() -> Self { Self::default() }

        pub fn with_questions(rows: Vec<Question>) -> Self {
            Self { table: RwLock::new(Arc::new(rows)) }
        }
    }

    #[async_trait]
    impl QuestionRepo for InMemRepo {
        async fn snapshot(&self) -> RepoResult<Table> {
            Ok(read_lock(&self.table)?.clone())
        }

        async fn reload(&self) -> RepoResult<usize> {
            Ok(read_lock(&self.table)?.len())
        }

        async fn append(&self, question: Question) -> RepoResult<Question> {
            let mut t = write_lock(&self.table)?;
            Arc::make_mut(&mut *t).push(question.clone());
            Ok(question)
        }
    }
}
