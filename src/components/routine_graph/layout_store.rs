//! Persisted manual layouts, one entry per dataset.
//!
//! Entries live under `{namespace}_layout_{dataset}_v{version}` and hold a
//! JSON envelope that repeats the schema version. Anything that does not
//! parse, or carries another version, loads as absent.
//!
//! The store never fails the caller. The first backend error is logged and
//! swaps the backend of the handle (and every clone of it) for an in-memory
//! one, so layouts still survive dataset switches until the page reloads.

use std::cell::{Cell, RefCell};
use std::collections::{BTreeMap, HashMap};
use std::rc::Rc;

use log::{debug, warn};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use super::types::{GraphNode, NodeId, Point};

#[derive(Debug, Error)]
pub enum LayoutStoreError {
	#[error("Layout storage is unavailable: {0}")]
	Unavailable(String),
	#[error("Failed to read layout entry {key}: {reason}")]
	Read { key: String, reason: String },
	#[error("Failed to write layout entry {key}: {reason}")]
	Write { key: String, reason: String },
	#[error("Failed to encode layout: {0}")]
	Encode(#[from] serde_json::Error),
}

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct LayoutState {
	positions: BTreeMap<NodeId, Point>,
}

impl LayoutState {
	/// Snapshot of every node that currently has a position.
	pub fn from_nodes(nodes: &[GraphNode]) -> Self {
		Self {
			positions: nodes
				.iter()
				.filter_map(|n| n.position.map(|p| (n.id.clone(), p)))
				.collect(),
		}
	}

	pub fn get(&self, id: &NodeId) -> Option<Point> {
		self.positions.get(id).copied()
	}

	pub fn insert(&mut self, id: NodeId, position: Point) {
		self.positions.insert(id, position);
	}

	pub fn len(&self) -> usize {
		self.positions.len()
	}

	pub fn is_empty(&self) -> bool {
		self.positions.is_empty()
	}

	/// Copies stored positions onto matching nodes and returns how many were
	/// restored. Keys without a node are ignored.
	pub fn apply_to(&self, nodes: &mut [GraphNode]) -> usize {
		let mut restored = 0;
		for node in nodes.iter_mut() {
			if let Some(p) = self.get(&node.id) {
				node.position = Some(p);
				restored += 1;
			}
		}
		restored
	}
}

/// Raw string key-value storage the layout store sits on.
pub trait StorageBackend {
	fn get(&self, key: &str) -> Result<Option<String>, LayoutStoreError>;
	fn set(&self, key: &str, value: &str) -> Result<(), LayoutStoreError>;
}

#[derive(Debug, Default)]
pub struct MemoryStorage {
	entries: RefCell<HashMap<String, String>>,
}

impl StorageBackend for MemoryStorage {
	fn get(&self, key: &str) -> Result<Option<String>, LayoutStoreError> {
		Ok(self.entries.borrow().get(key).cloned())
	}

	fn set(&self, key: &str, value: &str) -> Result<(), LayoutStoreError> {
		self.entries.borrow_mut().insert(key.to_owned(), value.to_owned());
		Ok(())
	}
}

/// `window.localStorage`.
pub struct BrowserStorage {
	storage: web_sys::Storage,
}

impl BrowserStorage {
	pub fn local() -> Result<Self, LayoutStoreError> {
		let window = web_sys::window()
			.ok_or_else(|| LayoutStoreError::Unavailable("no window".into()))?;
		let storage = window
			.local_storage()
			.map_err(|e| LayoutStoreError::Unavailable(format!("{e:?}")))?
			.ok_or_else(|| LayoutStoreError::Unavailable("localStorage disabled".into()))?;
		Ok(Self { storage })
	}
}

impl StorageBackend for BrowserStorage {
	fn get(&self, key: &str) -> Result<Option<String>, LayoutStoreError> {
		self.storage.get_item(key).map_err(|e| LayoutStoreError::Read {
			key: key.to_owned(),
			reason: format!("{e:?}"),
		})
	}

	fn set(&self, key: &str, value: &str) -> Result<(), LayoutStoreError> {
		self.storage.set_item(key, value).map_err(|e| LayoutStoreError::Write {
			key: key.to_owned(),
			reason: format!("{e:?}"),
		})
	}
}

#[derive(Serialize, Deserialize)]
struct StoredLayout {
	version: u32,
	positions: LayoutState,
}

type SharedBackend = Rc<RefCell<Rc<dyn StorageBackend>>>;

/// Cheap to clone; clones share the backend and the degraded flag.
#[derive(Clone)]
pub struct LayoutStore {
	backend: SharedBackend,
	namespace: Rc<str>,
	version: u32,
	degraded: Rc<Cell<bool>>,
}

impl LayoutStore {
	pub fn new(backend: impl StorageBackend + 'static, namespace: &str, version: u32) -> Self {
		Self {
			backend: Rc::new(RefCell::new(Rc::new(backend))),
			namespace: namespace.into(),
			version,
			degraded: Rc::new(Cell::new(false)),
		}
	}

	pub fn memory(namespace: &str, version: u32) -> Self {
		Self::new(MemoryStorage::default(), namespace, version)
	}

	/// `localStorage` when the browser grants it, memory otherwise. The
	/// memory fallback reports itself as degraded.
	pub fn browser_or_memory(namespace: &str, version: u32) -> Self {
		match BrowserStorage::local() {
			Ok(storage) => Self::new(storage, namespace, version),
			Err(e) => {
				warn!("{e}; layouts will not survive a reload");
				let store = Self::memory(namespace, version);
				store.degraded.set(true);
				store
			}
		}
	}

	pub fn key(&self, dataset: &str) -> String {
		format!("{}_layout_{}_v{}", self.namespace, dataset, self.version)
	}

	pub fn is_degraded(&self) -> bool {
		self.degraded.get()
	}

	fn backend(&self) -> Rc<dyn StorageBackend> {
		self.backend.borrow().clone()
	}

	pub fn try_save(&self, dataset: &str, layout: &LayoutState) -> Result<(), LayoutStoreError> {
		let value = serde_json::to_string(&StoredLayout {
			version: self.version,
			positions: layout.clone(),
		})?;
		self.backend().set(&self.key(dataset), &value)
	}

	/// `Ok(None)` covers both a missing entry and one that cannot be used.
	pub fn try_load(&self, dataset: &str) -> Result<Option<LayoutState>, LayoutStoreError> {
		let key = self.key(dataset);
		let Some(raw) = self.backend().get(&key)? else {
			return Ok(None);
		};
		match serde_json::from_str::<StoredLayout>(&raw) {
			Ok(stored) if stored.version == self.version => Ok(Some(stored.positions)),
			Ok(stored) => {
				warn!(
					"Ignoring layout {key}: schema version {} != {}",
					stored.version, self.version
				);
				Ok(None)
			}
			Err(e) => {
				warn!("Ignoring malformed layout {key}: {e}");
				Ok(None)
			}
		}
	}

	pub fn save(&self, dataset: &str, layout: &LayoutState) {
		let result = self.try_save(dataset, layout).or_else(|e| {
			self.degrade(&e);
			self.try_save(dataset, layout)
		});
		match result {
			Ok(()) => debug!("Saved {} positions for {dataset}", layout.len()),
			Err(e) => warn!("Layout for {dataset} was not kept: {e}"),
		}
	}

	pub fn load(&self, dataset: &str) -> Option<LayoutState> {
		self.try_load(dataset)
			.or_else(|e| {
				self.degrade(&e);
				self.try_load(dataset)
			})
			.ok()
			.flatten()
	}

	/// Switches every clone to a fresh in-memory backend. Only the first
	/// failure is logged; later calls find the memory backend already in place.
	fn degrade(&self, error: &LayoutStoreError) {
		if !self.degraded.replace(true) {
			warn!("{error}; layouts are kept in memory until the page reloads");
			*self.backend.borrow_mut() = Rc::new(MemoryStorage::default());
		}
	}
}
