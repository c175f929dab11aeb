//! Call-scoped value types exchanged between callers, the router and protocol adapters.

use alloc::vec::Vec;
use frame::prelude::*;
use polkadot_sdk::sp_runtime::{Perquintill, traits::SaturatedConversion};

/// Parts representing 100% for [`AmountType::Relative`] amounts.
pub const RELATIVE_AMOUNT_BASE: u128 = 1_000_000_000_000_000_000;

#[derive(
  Clone,
  Copy,
  Debug,
  Default,
  Decode,
  DecodeWithMemTracking,
  Encode,
  Eq,
  PartialEq,
  TypeInfo,
  MaxEncodedLen,
)]
pub enum ActionType {
  /// Unset. Rejected by the router.
  #[default]
  None,
  Deposit,
  Withdraw,
}

/// How an adapter should read one entry of `Action::amounts`.
#[derive(
  Clone,
  Copy,
  Debug,
  Decode,
  DecodeWithMemTracking,
  Encode,
  Eq,
  PartialEq,
  TypeInfo,
  MaxEncodedLen,
)]
pub enum AmountType {
  /// Share of the currently held amount, in parts of [`RELATIVE_AMOUNT_BASE`].
  Relative,
  /// Exact amount in the asset's smallest unit.
  Absolute,
}

impl AmountType {
  /// Resolve `amount` against `held`.
  ///
  /// Returns `None` for relative amounts above 100%.
  pub fn resolve<Balance: AtLeast32BitUnsigned + Copy>(
    self,
    amount: Balance,
    held: Balance,
  ) -> Option<Balance> {
    match self {
      AmountType::Absolute => Some(amount),
      AmountType::Relative => {
        let parts: u128 = amount.saturated_into();
        if parts > RELATIVE_AMOUNT_BASE {
          return None;
        }
        let share = Perquintill::from_parts(parts as u64);
        let held: u128 = held.saturated_into();
        Some(share.mul_floor(held).saturated_into())
      }
    }
  }
}

/// One requested deposit or withdraw against a named adapter.
#[derive(Decode, DecodeWithMemTracking, Encode, TypeInfo, MaxEncodedLen)]
#[scale_info(skip_type_params(MaxNameLen, MaxTokens, MaxDataLen))]
pub struct Action<AssetId, Balance, MaxNameLen: Get<u32>, MaxTokens: Get<u32>, MaxDataLen: Get<u32>>
{
  pub protocol_adapter_name: BoundedVec<u8, MaxNameLen>,
  pub action_type: ActionType,
  pub tokens: BoundedVec<AssetId, MaxTokens>,
  pub amounts: BoundedVec<Balance, MaxTokens>,
  pub amount_types: BoundedVec<AmountType, MaxTokens>,
  /// Opaque adapter payload.
  pub data: BoundedVec<u8, MaxDataLen>,
}

impl<
  AssetId: Clone,
  Balance: Clone,
  MaxNameLen: Get<u32>,
  MaxTokens: Get<u32>,
  MaxDataLen: Get<u32>,
> Clone for Action<AssetId, Balance, MaxNameLen, MaxTokens, MaxDataLen>
{
  fn clone(&self) -> Self {
    Self {
      protocol_adapter_name: self.protocol_adapter_name.clone(),
      action_type: self.action_type,
      tokens: self.tokens.clone(),
      amounts: self.amounts.clone(),
      amount_types: self.amount_types.clone(),
      data: self.data.clone(),
    }
  }
}

impl<
  AssetId: core::fmt::Debug,
  Balance: core::fmt::Debug,
  MaxNameLen: Get<u32>,
  MaxTokens: Get<u32>,
  MaxDataLen: Get<u32>,
> core::fmt::Debug for Action<AssetId, Balance, MaxNameLen, MaxTokens, MaxDataLen>
{
  fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
    f.debug_struct("Action")
      .field("protocol_adapter_name", &self.protocol_adapter_name)
      .field("action_type", &self.action_type)
      .field("tokens", &self.tokens)
      .field("amounts", &self.amounts)
      .field("amount_types", &self.amount_types)
      .field("data", &self.data)
      .finish()
  }
}

impl<
  AssetId: PartialEq,
  Balance: PartialEq,
  MaxNameLen: Get<u32>,
  MaxTokens: Get<u32>,
  MaxDataLen: Get<u32>,
> PartialEq for Action<AssetId, Balance, MaxNameLen, MaxTokens, MaxDataLen>
{
  fn eq(&self, other: &Self) -> bool {
    self.protocol_adapter_name == other.protocol_adapter_name
      && self.action_type == other.action_type
      && self.tokens == other.tokens
      && self.amounts == other.amounts
      && self.amount_types == other.amount_types
      && self.data == other.data
  }
}

impl<AssetId: Eq, Balance: Eq, MaxNameLen: Get<u32>, MaxTokens: Get<u32>, MaxDataLen: Get<u32>> Eq
  for Action<AssetId, Balance, MaxNameLen, MaxTokens, MaxDataLen>
{
}

/// Minimum amount of `token` the caller demands at settlement.
///
/// After settlement the same shape carries the amount actually transferred.
#[derive(
  Clone,
  Copy,
  Debug,
  Decode,
  DecodeWithMemTracking,
  Encode,
  Eq,
  PartialEq,
  TypeInfo,
  MaxEncodedLen,
)]
pub struct Output<AssetId, Balance> {
  pub token: AssetId,
  pub amount: Balance,
}

#[derive(Clone, Copy, Debug, Decode, DecodeWithMemTracking, Encode, Eq, PartialEq, TypeInfo)]
pub struct TokenBalance<AssetId, SignedBalance> {
  pub token: AssetId,
  pub amount: SignedBalance,
}

#[derive(Clone, Debug, Decode, DecodeWithMemTracking, Encode, Eq, PartialEq, TypeInfo)]
pub struct AdapterBalance<Name, AssetId, SignedBalance> {
  pub protocol_adapter_name: Name,
  pub token_balances: Vec<TokenBalance<AssetId, SignedBalance>>,
}

/// Settlement failure with the context a pallet error cannot carry.
#[derive(Clone, Debug, Eq, PartialEq)]
pub enum SettlementError<AssetId, Balance> {
  /// Held balance of a required output is below the requested minimum.
  InsufficientOutput {
    token: AssetId,
    required: Balance,
    actual: Balance,
  },
  /// The ledger refused to move `token` to the beneficiary.
  TransferFailed {
    token: AssetId,
    reason: DispatchError,
  },
}
