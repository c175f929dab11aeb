use codec::{Decode, DecodeWithMemTracking, Encode, MaxEncodedLen};
use scale_info::TypeInfo;
use serde::{Deserialize, Serialize};

/// Asset identifier shared by the router, its adapters and the runtime glue.
///
/// - `Native`: the chain's intrinsic currency (managed by pallet-balances). This is the
///   sentinel the router uses for native custody.
/// - `Local(u32)`: fungible asset managed by pallet-assets.
/// - `Foreign(u32)`: fungible asset managed by pallet-assets via an XCM mapping.
#[derive(
  Clone,
  Copy,
  Debug,
  Decode,
  DecodeWithMemTracking,
  Default,
  Encode,
  Eq,
  MaxEncodedLen,
  Ord,
  PartialEq,
  PartialOrd,
  TypeInfo,
  Serialize,
  Deserialize,
)]
pub enum AssetKind {
  /// Native token managed by pallet-balances
  #[default]
  Native,
  /// Local asset managed by pallet-assets
  Local(u32),
  /// Foreign asset managed by pallet-assets
  Foreign(u32),
}

impl From<u32> for AssetKind {
  fn from(asset_id: u32) -> Self {
    AssetKind::Local(asset_id)
  }
}

/// Helper trait to inspect AssetKind properties
pub trait AssetInspector {
  /// Ledger id of a fungible asset; `None` for the native sentinel.
  fn fungible_id(&self) -> Option<u32>;
}

impl AssetInspector for AssetKind {
  fn fungible_id(&self) -> Option<u32> {
    match self {
      AssetKind::Local(id) | AssetKind::Foreign(id) => Some(*id),
      AssetKind::Native => None,
    }
  }
}
