//! Collaborator traits for the adapter router
//!
//! The router never moves funds itself except through [`AssetOps`], and never reaches
//! a protocol except through [`ProtocolAdapters`]. Both are implemented by the runtime.

use crate::{Config, ExecutionScope, types::AmountType};
use alloc::vec::Vec;
use frame::prelude::*;

/// Ledger operations over native and fungible assets.
///
/// `balance` of the native sentinel is the account's spendable native balance.
/// A failed `transfer` must be reported, never silently ignored.
pub trait AssetOps<AccountId, AssetId, Balance> {
  fn transfer(
    from: &AccountId,
    to: &AccountId,
    asset: AssetId,
    amount: Balance,
  ) -> Result<(), DispatchError>;

  fn balance(who: &AccountId, asset: AssetId) -> Balance;
}

/// Capability contract of the registered protocol adapters.
///
/// `deposit` and `withdraw` run with the router's custody: any transfer an adapter
/// performs from `scope.custodian()` spends the assets held for the current batch.
/// Both return the tokens the adapter touched, which settlement later sweeps to the
/// beneficiary. Errors are surfaced to the caller unchanged.
pub trait ProtocolAdapters<T: Config> {
  fn deposit(
    adapter: T::AdapterId,
    scope: &mut ExecutionScope<T>,
    tokens: &[T::AssetId],
    amounts: &[T::Balance],
    amount_types: &[AmountType],
    data: &[u8],
  ) -> Result<Vec<T::AssetId>, DispatchError>;

  fn withdraw(
    adapter: T::AdapterId,
    scope: &mut ExecutionScope<T>,
    tokens: &[T::AssetId],
    amounts: &[T::Balance],
    amount_types: &[AmountType],
    data: &[u8],
  ) -> Result<Vec<T::AssetId>, DispatchError>;

  /// Signed position of `account` in `token`. Negative values are debt.
  fn get_balance(
    adapter: T::AdapterId,
    token: T::AssetId,
    account: &T::AccountId,
  ) -> Result<T::SignedBalance, DispatchError>;

  fn supported_tokens(adapter: T::AdapterId) -> Vec<T::AssetId>;
}

/// No adapters: every action fails and no tokens are reported.
impl<T: Config> ProtocolAdapters<T> for () {
  fn deposit(
    _: T::AdapterId,
    _: &mut ExecutionScope<T>,
    _: &[T::AssetId],
    _: &[T::Balance],
    _: &[AmountType],
    _: &[u8],
  ) -> Result<Vec<T::AssetId>, DispatchError> {
    Err(DispatchError::Other("ProtocolAdapters not configured"))
  }

  fn withdraw(
    _: T::AdapterId,
    _: &mut ExecutionScope<T>,
    _: &[T::AssetId],
    _: &[T::Balance],
    _: &[AmountType],
    _: &[u8],
  ) -> Result<Vec<T::AssetId>, DispatchError> {
    Err(DispatchError::Other("ProtocolAdapters not configured"))
  }

  fn get_balance(
    _: T::AdapterId,
    _: T::AssetId,
    _: &T::AccountId,
  ) -> Result<T::SignedBalance, DispatchError> {
    Err(DispatchError::Other("ProtocolAdapters not configured"))
  }

  fn supported_tokens(_: T::AdapterId) -> Vec<T::AssetId> {
    Vec::new()
  }
}
