//! In-process slot holding the token set granted to this deployment.

// self
use crate::{_prelude::*, auth::TokenSet};

/// Thread-safe single-slot store for the current [`TokenSet`].
///
/// The slot starts empty and is overwritten by every successful code exchange; nothing is
/// written to disk, so a restart always starts unauthorized.
#[derive(Clone, Debug, Default)]
pub struct TokenStore(Arc<RwLock<Option<TokenSet>>>);
impl TokenStore {
	/// Replaces the stored token set.
	pub fn save(&self, tokens: TokenSet) {
		*self.0.write() = Some(tokens);
	}

	/// Returns a copy of the stored token set, if any.
	pub fn fetch(&self) -> Option<TokenSet> {
		self.0.read().clone()
	}

	/// Returns `true` once a code exchange has succeeded.
	pub fn is_authorized(&self) -> bool {
		self.0.read().is_some()
	}
}
