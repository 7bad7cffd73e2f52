//! Thread-safe in-memory [`SessionCache`] with least-recently-used eviction.

// self
use crate::{
	_prelude::*,
	cache::{CacheEntry, SessionCache, SessionKey},
	obs,
};

/// Bounded in-process cache guarded by a single mutex.
///
/// Every operation runs under the lock, so [`SessionCache::size_at`] observes a consistent
/// snapshot. Clones share the same underlying state.
#[derive(Clone, Debug)]
pub struct MemorySessionCache {
	capacity: NonZeroUsize,
	state: Arc<Mutex<LruState>>,
}
impl MemorySessionCache {
	/// Creates an empty cache holding at most `capacity` entries.
	pub fn new(capacity: NonZeroUsize) -> Self {
		Self { capacity, state: Default::default() }
	}

	/// Total entries currently held, expired or not.
	pub fn stored(&self) -> usize {
		self.state.lock().slots.len()
	}
}
impl SessionCache for MemorySessionCache {
	fn get_at(&self, key: &SessionKey, now: OffsetDateTime) -> Option<CacheEntry> {
		let mut state = self.state.lock();
		let expired = state.slots.get(key)?.entry.is_expired_at(now);

		if expired {
			state.remove(key);

			obs::debug_event!(key = key.as_str(), "Dropped expired session entry.");

			return None;
		}

		state.touch(key)
	}

	fn put_at(&self, key: SessionKey, ttl: Duration, now: OffsetDateTime) -> Option<CacheEntry> {
		let entry = CacheEntry::new(key, now, ttl)?;
		let mut state = self.state.lock();

		if !state.slots.contains_key(&entry.key) && state.slots.len() >= self.capacity.get() {
			state.purge_expired(now);

			if state.slots.len() >= self.capacity.get() {
				state.evict_least_recent();
			}
		}

		state.upsert(entry.clone());

		Some(entry)
	}

	fn size_at(&self, now: OffsetDateTime) -> usize {
		self.state.lock().slots.values().filter(|slot| !slot.entry.is_expired_at(now)).count()
	}

	fn capacity(&self) -> usize {
		self.capacity.get()
	}
}

#[derive(Debug)]
struct Slot {
	entry: CacheEntry,
	touched: u64,
}

/// Entries plus a recency index ordered by a monotonic touch counter.
#[derive(Debug, Default)]
struct LruState {
	slots: HashMap<SessionKey, Slot>,
	recency: BTreeMap<u64, SessionKey>,
	tick: u64,
}
impl LruState {
	fn next_tick(&mut self) -> u64 {
		self.tick += 1;

		self.tick
	}

	fn touch(&mut self, key: &SessionKey) -> Option<CacheEntry> {
		let tick = self.next_tick();
		let slot = self.slots.get_mut(key)?;

		self.recency.remove(&slot.touched);
		slot.touched = tick;
		self.recency.insert(tick, key.clone());

		Some(slot.entry.clone())
	}

	fn upsert(&mut self, entry: CacheEntry) {
		let tick = self.next_tick();
		let key = entry.key.clone();

		if let Some(previous) = self.slots.insert(key.clone(), Slot { entry, touched: tick }) {
			self.recency.remove(&previous.touched);
		}

		self.recency.insert(tick, key);
	}

	fn remove(&mut self, key: &SessionKey) {
		if let Some(slot) = self.slots.remove(key) {
			self.recency.remove(&slot.touched);
		}
	}

	fn purge_expired(&mut self, now: OffsetDateTime) {
		let expired = self
			.slots
			.iter()
			.filter(|(_, slot)| slot.entry.is_expired_at(now))
			.map(|(key, _)| key.clone())
			.collect::<Vec<_>>();

		for key in &expired {
			self.remove(key);
		}
	}

	fn evict_least_recent(&mut self) {
		if let Some((_, key)) = self.recency.pop_first() {
			self.slots.remove(&key);

			obs::debug_event!(key = key.as_str(), "Evicted least recently used session entry.");
		}
	}
}
