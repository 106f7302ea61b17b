//! Hash collections used throughout the crate. FxHash is faster than the
//! default SipHash and we never hash untrusted input.

pub type HashMap<K, V> = rustc_hash::FxHashMap<K, V>;
pub type HashSet<T> = rustc_hash::FxHashSet<T>;
