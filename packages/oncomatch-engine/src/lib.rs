pub mod combine;
pub mod compile;
pub mod execute;
pub mod rank;
pub mod record;
pub mod run;
pub mod stores;
pub mod trial;
pub mod validate;

mod error;

pub use error::{Error, Result};
pub use run::{RunSummary, SkippedTrial};

use std::{future::Future, pin::Pin, sync::Arc};

use oncomatch_config::Config;
use oncomatch_domain::{
	query::Query, sample::SampleDocument, taxonomy::DiagnosisTaxonomy, trial::TrialDocument,
	trial_match::TrialMatchDocument,
};
use oncomatch_storage::db::Db;

pub type BoxFuture<'a, T> = Pin<Box<dyn Future<Output = T> + Send + 'a>>;

/// The patient store seam. `find` is the engine's only suspension point: it
/// performs the store round-trip and returns the samples satisfying the
/// query, ordered by sample id.
pub trait SampleStore
where
	Self: Send + Sync,
{
	fn find<'a>(&'a self, query: &'a Query) -> BoxFuture<'a, Result<Vec<SampleDocument>>>;
}

pub trait TrialStore
where
	Self: Send + Sync,
{
	fn find_all<'a>(&'a self) -> BoxFuture<'a, Result<Vec<TrialDocument>>>;
}

pub trait TrialMatchStore
where
	Self: Send + Sync,
{
	/// Take the run's single-flight lock; `Error::RunInProgress` if another
	/// run holds it.
	fn begin_run<'a>(&'a self) -> BoxFuture<'a, Result<()>>;
	fn end_run<'a>(&'a self) -> BoxFuture<'a, Result<()>>;
	/// Replace the prior run's set with `docs`, staged so readers never see a
	/// partial result. Returns the number of documents written.
	fn replace_all<'a>(&'a self, docs: &'a [TrialMatchDocument]) -> BoxFuture<'a, Result<u64>>;
	fn fetch_all<'a>(&'a self) -> BoxFuture<'a, Result<Vec<TrialMatchDocument>>>;
}

#[derive(Clone)]
pub struct Stores {
	pub samples: Arc<dyn SampleStore>,
	pub trials: Arc<dyn TrialStore>,
	pub matches: Arc<dyn TrialMatchStore>,
}
impl Stores {
	pub fn new(
		samples: Arc<dyn SampleStore>,
		trials: Arc<dyn TrialStore>,
		matches: Arc<dyn TrialMatchStore>,
	) -> Self {
		Self { samples, trials, matches }
	}

	pub fn postgres(db: Arc<Db>) -> Self {
		Self {
			samples: Arc::new(stores::PgSampleStore::new(db.clone())),
			trials: Arc::new(stores::PgTrialStore::new(db.clone())),
			matches: Arc::new(stores::PgTrialMatchStore::new(db)),
		}
	}
}

pub struct MatchService {
	pub cfg: Config,
	pub stores: Stores,
	pub taxonomy: Arc<dyn DiagnosisTaxonomy>,
}
impl MatchService {
	pub fn new(cfg: Config, stores: Stores, taxonomy: Arc<dyn DiagnosisTaxonomy>) -> Self {
		Self { cfg, stores, taxonomy }
	}
}
