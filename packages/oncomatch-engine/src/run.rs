use std::{
	collections::BTreeMap,
	sync::Arc,
	time::{Duration, Instant},
};

use serde::Serialize;
use time::{Date, OffsetDateTime};
use tokio::{sync::Semaphore, task::JoinSet, time as tokio_time};

use oncomatch_domain::{
	taxonomy::DiagnosisTaxonomy,
	tree::{Graph, ROOT_ID},
	trial::TrialDocument,
	trial_match::TrialMatchDocument,
};

use crate::{
	Error, MatchService, Result, SampleStore, TrialMatchStore, TrialStore, combine,
	compile::QueryBuilder,
	execute, rank,
	record::MatchRecord,
	trial::{self, MatchTreeContext},
	validate,
};

const MAX_BACKOFF_MS: u64 = 30_000;

#[derive(Clone, Debug, Serialize)]
pub struct SkippedTrial {
	pub protocol_no: String,
	pub reason: String,
}

#[derive(Clone, Debug, Serialize)]
pub struct RunSummary {
	pub trials_matched: u64,
	pub trials_skipped: Vec<SkippedTrial>,
	pub matches_written: u64,
}

/// Everything a per-trial task needs; cheap to clone into spawned tasks.
#[derive(Clone)]
struct TrialWorker {
	samples: Arc<dyn SampleStore>,
	taxonomy: Arc<dyn DiagnosisTaxonomy>,
	today: Date,
	retry_attempts: u32,
	retry_base_ms: u64,
	deadline: Option<Instant>,
}

impl MatchService {
	/// One full matching run: evaluate every trial's match trees against the
	/// patient store, rank the accumulated matches, and atomically replace
	/// the prior run's trial-match set. Single-flight per store.
	pub async fn run_matching(&self) -> Result<RunSummary> {
		self.stores.matches.begin_run().await?;

		let result = self.run_matching_inner().await;

		if let Err(err) = self.stores.matches.end_run().await {
			tracing::warn!(error = %err, "Failed to release the run lock.");
		}

		result
	}

	async fn run_matching_inner(&self) -> Result<RunSummary> {
		let matching = &self.cfg.matching;
		let deadline =
			matching.run_deadline_secs.map(|secs| Instant::now() + Duration::from_secs(secs));
		let worker = TrialWorker {
			samples: self.stores.samples.clone(),
			taxonomy: self.taxonomy.clone(),
			today: OffsetDateTime::now_utc().date(),
			retry_attempts: matching.store_retry_attempts,
			retry_base_ms: matching.store_retry_base_ms,
			deadline,
		};
		let trials = self.fetch_trials_with_retry(&worker).await?;

		tracing::info!(count = trials.len(), "Retrieved trials from the store.");

		let semaphore = Arc::new(Semaphore::new(matching.max_concurrent_trials as usize));
		let mut join_set: JoinSet<(String, Result<Vec<TrialMatchDocument>>)> = JoinSet::new();
		let mut skipped = Vec::new();

		for trial_doc in trials {
			// The deadline is checked between trials; trials not started in
			// time are reported as skipped rather than silently dropped.
			if deadline_exceeded(deadline) {
				skipped.push(SkippedTrial {
					protocol_no: trial_doc.protocol_no.clone(),
					reason: "deadline exceeded".to_string(),
				});

				continue;
			}

			let permit = semaphore
				.clone()
				.acquire_owned()
				.await
				.map_err(|err| Error::Internal { message: err.to_string() })?;
			let worker = worker.clone();

			join_set.spawn(async move {
				let _permit = permit;
				let protocol_no = trial_doc.protocol_no.clone();
				let result = evaluate_trial_with_retry(&worker, &trial_doc).await;

				(protocol_no, result)
			});
		}

		let mut per_trial: BTreeMap<String, Vec<TrialMatchDocument>> = BTreeMap::new();

		while let Some(joined) = join_set.join_next().await {
			let (protocol_no, result) =
				joined.map_err(|err| Error::Internal { message: err.to_string() })?;

			match result {
				Ok(docs) => {
					per_trial.insert(protocol_no, docs);
				},
				// Store connectivity already exhausted its retries inside the
				// task; it is fatal for the whole run.
				Err(err) if err.is_retryable() => return Err(err),
				Err(err) => {
					tracing::warn!(protocol_no = %protocol_no, error = %err, "Trial skipped.");
					skipped.push(SkippedTrial { protocol_no, reason: err.to_string() });
				},
			}
		}

		let trials_matched = per_trial.len() as u64;
		let mut docs: Vec<TrialMatchDocument> = per_trial.into_values().flatten().collect();

		rank::add_sort_order(&mut docs, &matching.primary_coordinating_center);

		let matches_written = self.stores.matches.replace_all(&docs).await?;
		let summary = RunSummary { trials_matched, trials_skipped: skipped, matches_written };

		tracing::info!(
			trials_matched = summary.trials_matched,
			trials_skipped = summary.trials_skipped.len(),
			matches_written = summary.matches_written,
			"Matching run complete."
		);

		Ok(summary)
	}

	async fn fetch_trials_with_retry(&self, worker: &TrialWorker) -> Result<Vec<TrialDocument>> {
		let mut attempt = 1_u32;

		loop {
			match self.stores.trials.find_all().await {
				Ok(trials) => return Ok(trials),
				Err(err) if err.is_retryable() && attempt < worker.retry_attempts => {
					tracing::warn!(attempt, error = %err, "Trial fetch failed; retrying.");
					tokio_time::sleep(backoff_for_attempt(worker.retry_base_ms, attempt)).await;

					attempt += 1;
				},
				Err(err) => return Err(err),
			}
		}
	}
}

fn deadline_exceeded(deadline: Option<Instant>) -> bool {
	deadline.map(|deadline| Instant::now() >= deadline).unwrap_or(false)
}

fn backoff_for_attempt(base_ms: u64, attempt: u32) -> Duration {
	let exp = attempt.saturating_sub(1).min(6);
	let capped = base_ms.saturating_mul(1 << exp).min(MAX_BACKOFF_MS);

	Duration::from_millis(capped)
}

async fn evaluate_trial_with_retry(
	worker: &TrialWorker,
	trial_doc: &TrialDocument,
) -> Result<Vec<TrialMatchDocument>> {
	let mut attempt = 1_u32;

	loop {
		match evaluate_trial(worker, trial_doc).await {
			Ok(docs) => return Ok(docs),
			Err(err) if err.is_retryable() && attempt < worker.retry_attempts => {
				tracing::warn!(
					protocol_no = %trial_doc.protocol_no,
					attempt,
					error = %err,
					"Store error; retrying with backoff."
				);
				tokio_time::sleep(backoff_for_attempt(worker.retry_base_ms, attempt)).await;

				attempt += 1;
			},
			Err(err) => return Err(err),
		}
	}
}

async fn evaluate_trial(
	worker: &TrialWorker,
	trial_doc: &TrialDocument,
) -> Result<Vec<TrialMatchDocument>> {
	let contexts = trial::extract_match_trees(trial_doc);
	let builder = QueryBuilder::new(worker.taxonomy.as_ref(), worker.today);
	let mut docs = Vec::new();

	for context in contexts {
		// Also checked between match trees within a trial.
		if deadline_exceeded(worker.deadline) {
			tracing::warn!(
				protocol_no = %context.protocol_no,
				"Deadline reached; remaining match trees skipped."
			);

			break;
		}

		let records = evaluate_tree(&builder, worker.samples.as_ref(), &context).await?;
		let tree_docs = trial::create_trial_match_documents(records, &context);

		for doc in &tree_docs {
			validate::validate_document(doc)?;
		}

		if tree_docs.is_empty() {
			tracing::info!(
				protocol_no = %context.protocol_no,
				code = %context.tree_code(),
				"No trial matches."
			);
		} else {
			tracing::info!(
				protocol_no = %context.protocol_no,
				code = %context.tree_code(),
				count = tree_docs.len(),
				"Trial matches accumulated."
			);
		}

		docs.extend(tree_docs);
	}

	Ok(docs)
}

/// Post-order evaluation of one match tree: leaves compile and execute,
/// combinators merge their children's results, the root yields the final
/// match set.
async fn evaluate_tree(
	builder: &QueryBuilder<'_>,
	store: &dyn SampleStore,
	context: &MatchTreeContext,
) -> Result<Vec<MatchRecord>> {
	let graph = Graph::build(&context.tree)?;
	let mut results: BTreeMap<usize, Vec<MatchRecord>> = BTreeMap::new();

	for id in graph.post_order() {
		let node = graph.node(id);

		if node.node_type.is_leaf() {
			let leaf = builder.compile_leaf(node)?;

			results.insert(id, execute::execute(store, &leaf.query, &leaf.projection).await?);
		} else {
			let children: Vec<Vec<MatchRecord>> = node
				.children
				.iter()
				.map(|child| results.remove(child).unwrap_or_default())
				.collect();

			results.insert(id, combine::combine(node.node_type, &children)?);
		}
	}

	Ok(results.remove(&ROOT_ID).unwrap_or_default())
}
