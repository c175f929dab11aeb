use crate::{Config, Error, ExecutionDepth, ExecutionLock, ExternalTouched};
use core::marker::PhantomData;
use frame::prelude::*;

/// Holds the router's execution lock for as long as it lives.
///
/// The lock and the batch-scoped composition state are cleared on drop, so every exit
/// path of a guarded batch releases them, including early returns through `?`.
#[must_use = "the execution lock is released as soon as the guard is dropped"]
pub struct ExecutionGuard<T: Config>(PhantomData<T>);

impl<T: Config> ExecutionGuard<T> {
  /// Fails with `ReentrantCall` while another batch holds the lock.
  pub fn acquire() -> Result<Self, Error<T>> {
    ensure!(!ExecutionLock::<T>::get(), Error::<T>::ReentrantCall);
    ExecutionLock::<T>::put(true);
    Ok(Self(PhantomData))
  }
}

impl<T: Config> Drop for ExecutionGuard<T> {
  fn drop(&mut self) {
    ExecutionLock::<T>::kill();
    ExecutionDepth::<T>::kill();
    ExternalTouched::<T>::kill();
  }
}
