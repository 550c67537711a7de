use std::sync::Arc;

use tokio::sync::Mutex;

use oncomatch_domain::{
	query::Query, sample::SampleDocument, trial::TrialDocument, trial_match::TrialMatchDocument,
};
use oncomatch_storage::{db::Db, queries, run_lock::RunLock};

use crate::{BoxFuture, Result, SampleStore, TrialMatchStore, TrialStore};

/// Postgres-backed patient store: fetches the sample documents and applies
/// the compiled query in-process, preserving the store's sample-id order.
pub struct PgSampleStore {
	db: Arc<Db>,
}
impl PgSampleStore {
	pub fn new(db: Arc<Db>) -> Self {
		Self { db }
	}
}
impl SampleStore for PgSampleStore {
	fn find<'a>(&'a self, query: &'a Query) -> BoxFuture<'a, Result<Vec<SampleDocument>>> {
		Box::pin(async move {
			let mut samples = queries::fetch_samples(&self.db).await?;

			samples.retain(|sample| query.matches(sample));

			Ok(samples)
		})
	}
}

pub struct PgTrialStore {
	db: Arc<Db>,
}
impl PgTrialStore {
	pub fn new(db: Arc<Db>) -> Self {
		Self { db }
	}
}
impl TrialStore for PgTrialStore {
	fn find_all<'a>(&'a self) -> BoxFuture<'a, Result<Vec<TrialDocument>>> {
		Box::pin(async move { Ok(queries::fetch_trials(&self.db).await?) })
	}
}

/// Postgres-backed trial-match store. The run lock is a session advisory
/// lock held on a dedicated pooled connection for the whole run.
pub struct PgTrialMatchStore {
	db: Arc<Db>,
	run_lock: Mutex<Option<RunLock>>,
}
impl PgTrialMatchStore {
	pub fn new(db: Arc<Db>) -> Self {
		Self { db, run_lock: Mutex::new(None) }
	}
}
impl TrialMatchStore for PgTrialMatchStore {
	fn begin_run<'a>(&'a self) -> BoxFuture<'a, Result<()>> {
		Box::pin(async move {
			let mut guard = self.run_lock.lock().await;

			if guard.is_some() {
				return Err(crate::Error::RunInProgress);
			}

			*guard = Some(RunLock::acquire(&self.db).await?);

			Ok(())
		})
	}

	fn end_run<'a>(&'a self) -> BoxFuture<'a, Result<()>> {
		Box::pin(async move {
			if let Some(lock) = self.run_lock.lock().await.take() {
				lock.release().await?;
			}

			Ok(())
		})
	}

	fn replace_all<'a>(&'a self, docs: &'a [TrialMatchDocument]) -> BoxFuture<'a, Result<u64>> {
		Box::pin(async move { Ok(queries::replace_trial_matches(&self.db, docs).await?) })
	}

	fn fetch_all<'a>(&'a self) -> BoxFuture<'a, Result<Vec<TrialMatchDocument>>> {
		Box::pin(async move { Ok(queries::fetch_trial_matches(&self.db).await?) })
	}
}
