//! Read-only position aggregation across registered adapters.

use crate::{
  AdapterBalance, AdapterBalanceOf, AdapterNameOf, AdapterNames, AdapterRegistry, Config,
  LOG_TARGET, Pallet, ProtocolAdapters, TokenBalance,
};
use alloc::vec::Vec;
use frame::prelude::*;
use polkadot_sdk::sp_runtime::traits::Zero;

impl<T: Config> Pallet<T> {
  /// Nonzero positions of `account` across every registered adapter, in registration
  /// order.
  pub fn do_get_balances(account: &T::AccountId) -> Vec<AdapterBalanceOf<T>> {
    let balances = AdapterNames::<T>::get()
      .into_iter()
      .filter_map(|name| {
        let adapter = AdapterRegistry::<T>::get(&name)?;
        let tokens = T::Adapters::supported_tokens(adapter);
        Some(Self::query_adapter(name, adapter, &tokens, account))
      })
      .collect();
    compact_balances(balances)
  }

  pub fn do_get_adapter_balances(
    names: &[AdapterNameOf<T>],
    account: &T::AccountId,
  ) -> Result<Vec<AdapterBalanceOf<T>>, DispatchError> {
    names
      .iter()
      .map(|name| -> Result<AdapterBalanceOf<T>, DispatchError> {
        let adapter = Self::lookup_adapter(name)?;
        let tokens = T::Adapters::supported_tokens(adapter);
        Ok(Self::query_adapter(name.clone(), adapter, &tokens, account))
      })
      .collect()
  }

  pub fn do_get_adapter_balance(
    name: &AdapterNameOf<T>,
    tokens: &[T::AssetId],
    account: &T::AccountId,
  ) -> Result<AdapterBalanceOf<T>, DispatchError> {
    let adapter = Self::lookup_adapter(name)?;
    Ok(Self::query_adapter(name.clone(), adapter, tokens, account))
  }

  fn query_adapter(
    name: AdapterNameOf<T>,
    adapter: T::AdapterId,
    tokens: &[T::AssetId],
    account: &T::AccountId,
  ) -> AdapterBalanceOf<T> {
    let token_balances = tokens
      .iter()
      .map(|token| {
        let queried = T::Adapters::get_balance(adapter, *token, account).inspect_err(|err| {
          log::debug!(
            target: LOG_TARGET,
            "balance query for {:?} at adapter {:?} failed: {:?}",
            token,
            adapter,
            err,
          )
        });
        TokenBalance {
          token: *token,
          amount: absorb_query_failure(queried),
        }
      })
      .collect();
    AdapterBalance {
      protocol_adapter_name: name,
      token_balances,
    }
  }
}

/// A failed per-token balance query reads as a zero position.
pub fn absorb_query_failure<SignedBalance: Zero>(
  queried: Result<SignedBalance, DispatchError>,
) -> SignedBalance {
  queried.unwrap_or_else(|_| SignedBalance::zero())
}

/// Drop zero positions, then adapters left without any position.
///
/// Adapter and token order are preserved. Negative (debt) positions are kept and are
/// enough on their own to keep an adapter.
pub fn compact_balances<Name, AssetId, SignedBalance: Zero>(
  balances: Vec<AdapterBalance<Name, AssetId, SignedBalance>>,
) -> Vec<AdapterBalance<Name, AssetId, SignedBalance>> {
  let nonzero: Vec<usize> = balances
    .iter()
    .map(|balance| {
      balance
        .token_balances
        .iter()
        .filter(|entry| !entry.amount.is_zero())
        .count()
    })
    .collect();

  let mut compacted = Vec::with_capacity(nonzero.iter().filter(|count| **count > 0).count());
  for (balance, count) in balances.into_iter().zip(nonzero) {
    if count == 0 {
      continue;
    }
    let mut token_balances = Vec::with_capacity(count);
    token_balances.extend(
      balance
        .token_balances
        .into_iter()
        .filter(|entry| !entry.amount.is_zero()),
    );
    compacted.push(AdapterBalance {
      protocol_adapter_name: balance.protocol_adapter_name,
      token_balances,
    });
  }
  compacted
}
