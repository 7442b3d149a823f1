//! Where refills come from.

use std::future::Future;
use std::marker::PhantomData;

use async_trait::async_trait;

use crate::error::ProviderError;

/// Source of new deck items. `Ok(None)` means "nothing more right now" and is
/// not an error.
#[async_trait]
pub trait ItemProvider<T>: Send + Sync {
    /// Fetch the next item for the back of the deck.
    async fn request_one(&self) -> Result<Option<T>, ProviderError>;
}

/// Provider that never yields anything. Useful when a deck is filled purely
/// through the initial load and manual appends.
#[derive(Debug, Default, Clone, Copy)]
pub struct ExhaustedProvider;

#[async_trait]
impl<T: Send + 'static> ItemProvider<T> for ExhaustedProvider {
    async fn request_one(&self) -> Result<Option<T>, ProviderError> {
        Ok(None)
    }
}

/// Adapts an async closure into an [`ItemProvider`].
pub struct FnProvider<F, T> {
    f: F,
    _item: PhantomData<fn() -> T>,
}

impl<F, T> FnProvider<F, T> {
    /// Wrap `f`, which is called once per request.
    pub fn new(f: F) -> Self {
        Self {
            f,
            _item: PhantomData,
        }
    }
}

impl<F, T> std::fmt::Debug for FnProvider<F, T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FnProvider").finish_non_exhaustive()
    }
}

#[async_trait]
impl<F, Fut, T> ItemProvider<T> for FnProvider<F, T>
where
    F: Fn() -> Fut + Send + Sync,
    Fut: Future<Output = Result<Option<T>, ProviderError>> + Send,
    T: Send + 'static,
{
    async fn request_one(&self) -> Result<Option<T>, ProviderError> {
        (self.f)().await
    }
}
