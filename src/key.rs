#[cfg(not(feature = "std"))]
use alloc::collections::{BTreeMap, BTreeSet};
use alloc::string::String;
#[cfg(feature = "std")]
use std::collections::{HashMap, HashSet};

/// Row/bar id → value lookup owned by a single component (never global).
#[cfg(feature = "std")]
pub type IdMap<V> = HashMap<String, V>;
#[cfg(not(feature = "std"))]
pub type IdMap<V> = BTreeMap<String, V>;

#[cfg(feature = "std")]
pub type IdSet = HashSet<String>;
#[cfg(not(feature = "std"))]
pub type IdSet = BTreeSet<String>;
