//! Single-flight refresh coordination with generation gating and bounded waiter admission.
//!
//! The coordinator owns the credential state behind one mutex. Refresh admission, generation
//! bookkeeping, and slot lifecycle all happen inside that critical section; provider calls
//! never do. Each in-flight refresh publishes its outcome through a watch channel, so a
//! waiter admitted at any point before the slot is torn down observes the same result as the
//! leader that created it.

mod metrics;

pub use metrics::RefreshMetrics;

// crates.io
use tokio::sync::watch;
// self
use crate::{
	_prelude::*,
	auth::{Credential, Generation},
	error::ProviderError,
	obs::{self, RefreshResolution, StageKind, StageOutcome, StageSpan},
	provider::CredentialProvider,
};

type RefreshOutcome = Result<RefreshedCredential, ProviderError>;

/// Point-in-time read of the coordinator's credential state.
#[derive(Clone, Debug)]
pub struct CredentialSnapshot {
	/// Current credential, if one was ever loaded or refreshed.
	pub credential: Option<Credential>,
	/// Generation the credential belongs to.
	pub generation: Generation,
}

/// Credential obtained from a completed refresh or from generation gating.
#[derive(Clone, Debug)]
pub struct RefreshedCredential {
	/// The credential that is now current.
	pub credential: Credential,
	/// Generation the credential belongs to.
	pub generation: Generation,
}
impl RefreshedCredential {
	/// Converts the refreshed credential into a snapshot.
	pub fn into_snapshot(self) -> CredentialSnapshot {
		CredentialSnapshot { credential: Some(self.credential), generation: self.generation }
	}
}

struct CurrentState {
	credential: Option<Credential>,
	generation: Generation,
	initialized: bool,
}

struct RefreshSlot {
	id: u64,
	stale_generation: Generation,
	waiters: usize,
	outcome: watch::Receiver<Option<RefreshOutcome>>,
}

struct CoordinatorState {
	current: CurrentState,
	slot: Option<RefreshSlot>,
	next_slot_id: u64,
	queue_size: usize,
}

struct Shared {
	state: Mutex<CoordinatorState>,
	init_lock: AsyncMutex<()>,
	provider: Arc<dyn CredentialProvider>,
	metrics: Arc<RefreshMetrics>,
}

/// Coordinates single-flight credential refresh for one interceptor instance.
///
/// Cloning is cheap and every clone shares the same state. Refresh execution is detached
/// onto the Tokio runtime, so a cancelled caller never cancels a refresh other waiters are
/// attached to.
#[derive(Clone)]
pub struct RefreshCoordinator {
	shared: Arc<Shared>,
}
impl RefreshCoordinator {
	/// Creates a coordinator with an admission limit of one waiter per refresh.
	pub fn new(provider: Arc<dyn CredentialProvider>) -> Self {
		Self {
			shared: Arc::new(Shared {
				state: Mutex::new(CoordinatorState {
					current: CurrentState {
						credential: None,
						generation: Generation::ZERO,
						initialized: false,
					},
					slot: None,
					next_slot_id: 0,
					queue_size: 1,
				}),
				init_lock: AsyncMutex::new(()),
				provider,
				metrics: Default::default(),
			}),
		}
	}

	/// Overrides the maximum number of waiters (leader included) admitted per refresh.
	///
	/// Values below 1 are clamped to 1.
	pub fn with_queue_size(self, queue_size: usize) -> Self {
		self.shared.state.lock().queue_size = queue_size.max(1);

		self
	}

	/// Shared counters describing coordinator activity.
	pub fn metrics(&self) -> &Arc<RefreshMetrics> {
		&self.shared.metrics
	}

	/// Atomically reads the current credential and generation.
	pub fn snapshot(&self) -> CredentialSnapshot {
		let state = self.shared.state.lock();

		CredentialSnapshot {
			credential: state.current.credential.clone(),
			generation: state.current.generation,
		}
	}

	/// Lazily performs the one-time initial credential load.
	///
	/// A failed load leaves the state uninitialized, so the next caller retries it. The
	/// generation stays at [`Generation::ZERO`] whether or not an initial credential exists.
	pub async fn ensure_initialized(&self) -> Result<()> {
		if self.shared.state.lock().current.initialized {
			return Ok(());
		}

		let _exclusion = self.shared.init_lock.lock().await;

		if self.shared.state.lock().current.initialized {
			return Ok(());
		}

		const KIND: StageKind = StageKind::InitialLoad;

		let span = StageSpan::new(KIND, "ensure_initialized");

		obs::record_stage_outcome(KIND, StageOutcome::Attempt);

		let loaded = match span.instrument(self.shared.provider.load_initial()).await {
			Ok(loaded) => {
				obs::record_stage_outcome(KIND, StageOutcome::Success);

				loaded
			},
			Err(err) => {
				obs::record_stage_outcome(KIND, StageOutcome::Failure);

				return Err(err.into());
			},
		};
		let mut state = self.shared.state.lock();

		state.current.credential = loaded;
		state.current.initialized = true;

		Ok(())
	}

	/// Replaces the credential observed at `stale_generation`, or returns the newer one a
	/// completed refresh already produced.
	///
	/// The first caller for a generation becomes the leader: it creates the refresh slot and
	/// detaches the provider call onto the runtime. Later callers for the same generation
	/// join as followers, bounded by the queue size (the leader counts against it). Callers
	/// whose generation was already superseded short-circuit without consuming admission.
	pub async fn refresh(&self, stale_generation: Generation) -> Result<RefreshedCredential> {
		self.shared.metrics.record_attempt();

		let (mut outcome_rx, slot_id) = {
			let mut state = self.shared.state.lock();

			if state.current.generation > stale_generation {
				if let Some(credential) = state.current.credential.clone() {
					self.shared.metrics.record_gated();
					obs::record_refresh_resolution(RefreshResolution::Gated);

					return Ok(RefreshedCredential {
						credential,
						generation: state.current.generation,
					});
				}
			}

			let queue_size = state.queue_size;

			if let Some(slot) = state.slot.as_mut() {
				if slot.waiters >= queue_size {
					self.shared.metrics.record_queue_rejection();
					obs::record_refresh_resolution(RefreshResolution::QueueRejected);

					return Err(Error::QueueFull { queue_size });
				}

				slot.waiters += 1;

				(slot.outcome.clone(), slot.id)
			} else {
				let (outcome_tx, outcome_rx) = watch::channel(None);
				let id = state.next_slot_id;

				state.next_slot_id += 1;

				let previous = state
					.current
					.credential
					.as_ref()
					.map(|credential| credential.secret().expose().to_owned());

				state.slot = Some(RefreshSlot {
					id,
					stale_generation,
					waiters: 1,
					outcome: outcome_rx.clone(),
				});

				tokio::spawn(run_refresh(Arc::clone(&self.shared), outcome_tx, previous));

				(outcome_rx, id)
			}
		};
		// Frees this waiter's admission if the caller is cancelled while suspended below.
		let _detach = WaiterDetach { shared: Arc::clone(&self.shared), slot_id };
		let outcome = match outcome_rx.wait_for(|outcome| outcome.is_some()).await {
			Ok(published) => published.clone(),
			Err(_) => None,
		};

		match outcome {
			Some(Ok(refreshed)) => {
				self.shared.metrics.record_success();
				obs::record_refresh_resolution(RefreshResolution::Refreshed);

				Ok(refreshed)
			},
			Some(Err(err)) => {
				self.shared.metrics.record_failure();
				obs::record_refresh_resolution(RefreshResolution::Failed);

				Err(err.into())
			},
			None => {
				self.shared.metrics.record_failure();
				obs::record_refresh_resolution(RefreshResolution::Failed);

				Err(ProviderError::refresh("refresh task terminated before publishing a result")
					.into())
			},
		}
	}
}
impl Debug for RefreshCoordinator {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		let state = self.shared.state.lock();

		f.debug_struct("RefreshCoordinator")
			.field("generation", &state.current.generation)
			.field("initialized", &state.current.initialized)
			.field("queue_size", &state.queue_size)
			.field("refreshing", &state.slot.as_ref().map(|slot| slot.stale_generation))
			.finish()
	}
}

/// Detached refresh execution: runs the provider call, then tears down the slot, applies the
/// result, and publishes it in one critical section.
async fn run_refresh(
	shared: Arc<Shared>,
	outcome_tx: watch::Sender<Option<RefreshOutcome>>,
	previous: Option<String>,
) {
	const KIND: StageKind = StageKind::Refresh;

	let span = StageSpan::new(KIND, "run_refresh");

	obs::record_stage_outcome(KIND, StageOutcome::Attempt);

	let result = span.instrument(shared.provider.refresh(previous.as_deref())).await;

	match &result {
		Ok(_) => obs::record_stage_outcome(KIND, StageOutcome::Success),
		Err(_) => obs::record_stage_outcome(KIND, StageOutcome::Failure),
	}

	let mut state = shared.state.lock();

	state.slot = None;

	let outcome = match result {
		Ok(credential) => {
			state.current.credential = Some(credential.clone());
			state.current.generation = state.current.generation.next();

			Ok(RefreshedCredential { credential, generation: state.current.generation })
		},
		Err(err) => Err(err),
	};

	// Published while the state lock is still held: admission and teardown stay atomic with
	// respect to each other, so every admitted waiter's receiver already exists.
	let _ = outcome_tx.send(Some(outcome));
}

/// Drop guard that releases one admission slot if its waiter is cancelled while the refresh
/// is still in flight. Keyed on the slot id, so it never touches a successor slot created
/// for the same generation.
struct WaiterDetach {
	shared: Arc<Shared>,
	slot_id: u64,
}
impl Drop for WaiterDetach {
	fn drop(&mut self) {
		let mut state = self.shared.state.lock();

		if let Some(slot) = state.slot.as_mut() {
			if slot.id == self.slot_id {
				slot.waiters = slot.waiters.saturating_sub(1);
			}
		}
	}
}
