//! Router Constants
//!
//! Reference values for the adapter router pallet. Runtime configurations and the pallet's
//! mock runtime both read from here so the bounds stay in one place.

/// Balance type alias for consistency across the workspace
pub type Balance = u128;

/// Signed balance reported by adapters (negative values are debt positions)
pub type SignedBalance = i128;

/// Pallet identifier used to derive the router's custody account
pub const PALLET_ID: &[u8; 8] = b"adptrout";

/// Bounds for router calls and storage.
pub mod params {
  /// Maximum number of registered protocol adapters.
  pub const MAX_ADAPTERS: u32 = 64;

  /// Maximum byte length of an adapter name.
  pub const MAX_ADAPTER_NAME_LEN: u32 = 32;

  /// Maximum number of actions in one batch.
  pub const MAX_ACTIONS: u32 = 16;

  /// Maximum number of tokens (and amounts) in one action.
  pub const MAX_TOKENS_PER_ACTION: u32 = 8;

  /// Maximum byte length of the opaque adapter payload.
  pub const MAX_ACTION_DATA_LEN: u32 = 1024;

  /// Maximum number of required outputs in one batch.
  pub const MAX_OUTPUTS: u32 = 16;

  /// Maximum depth of adapter-initiated nested actions.
  pub const MAX_NESTING_DEPTH: u32 = 4;

  /// Maximum number of distinct tokens runtime-call compositions may hand to one batch.
  pub const MAX_TOUCHED_TOKENS: u32 = 64;
}
