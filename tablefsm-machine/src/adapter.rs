use crate::error::Result;
use core::{future::Future, marker::PhantomData};

/// A consumer for the items a `Driver` flushes out of its context.
///
/// Adapters can be combined, and this is the wiring scheme for drivers: any
/// number can be merged for fan-out, and the item type can be adjusted with
/// `adapt_map`. All adapters are `Send` so they can live in the state of a
/// task on a multithreaded runtime.
pub trait Adapter: Send {
    type Item;

    /// Forward the given item to an asynchronous consumer.
    fn notify(&mut self, a: Self::Item) -> impl Future<Output = Result<()>> + Send
    where
        Self::Item: 'static;

    /// Combine this with another adapter. Both receive every item.
    fn merge<T>(self, other: T) -> impl Adapter<Item = Self::Item>
    where
        T: Adapter<Item = Self::Item>,
        Self: Sized + Send,
        Self::Item: Send + Clone,
    {
        Merge {
            first: self,
            second: other,
        }
    }

    /// Create an adapter that accepts another item type, converting each
    /// item with the given function before passing it on.
    fn adapt_map<A>(self, func: impl Fn(A) -> Self::Item + Send) -> impl Adapter<Item = A>
    where
        Self: Sized + Send,
        Self::Item: Send + 'static,
        A: Send,
    {
        Mapped {
            func,
            inner: self,
            marker: PhantomData,
        }
    }
}

/// A placeholder `Adapter` that discards every item.
///
/// `merge` on a placeholder yields the other adapter outright, so connecting
/// the first real output replaces the placeholder rather than stacking on it.
#[derive(Debug)]
pub struct Discard<A>(PhantomData<A>);

impl<A> Default for Discard<A> {
    fn default() -> Self {
        Self(PhantomData)
    }
}

impl<A> Adapter for Discard<A>
where
    A: Send,
{
    type Item = A;

    async fn notify(&mut self, _a: Self::Item) -> Result<()> {
        Ok(())
    }

    fn merge<T>(self, other: T) -> impl Adapter<Item = Self::Item>
    where
        T: Adapter<Item = Self::Item>,
    {
        other
    }
}

/// An `Adapter` that forwards each item to two downstream adapters.
#[derive(Debug)]
pub struct Merge<S, T> {
    first: S,
    second: T,
}

impl<A, S, T> Adapter for Merge<S, T>
where
    S: Adapter<Item = A> + Send,
    T: Adapter<Item = A> + Send,
    A: Send + Clone,
{
    type Item = A;

    async fn notify(&mut self, a: Self::Item) -> Result<()>
    where
        Self::Item: 'static,
    {
        self.first.notify(a.clone()).await?;
        self.second.notify(a).await
    }
}

/// An `Adapter` that converts each item with a function before passing it on.
#[derive(Debug)]
pub struct Mapped<A, F, G> {
    func: F,
    inner: G,
    marker: PhantomData<A>,
}

impl<F, G, A, B> Adapter for Mapped<A, F, G>
where
    F: Fn(A) -> B + Send,
    G: Adapter<Item = B> + Send,
    B: Send + 'static,
    A: Send,
{
    type Item = A;

    async fn notify(&mut self, a: Self::Item) -> Result<()>
    where
        Self::Item: 'static,
    {
        self.inner.notify((self.func)(a)).await
    }
}

/// Implement `Adapter` for a vector, collecting every item.
#[cfg(feature = "std")]
impl<A> Adapter for std::vec::Vec<A>
where
    A: Send,
{
    type Item = A;

    async fn notify(&mut self, a: Self::Item) -> Result<()>
    where
        Self::Item: 'static,
    {
        self.push(a);
        Ok(())
    }
}

/// Implementation of `Adapter` for tokio channels.
#[cfg(feature = "tokio")]
mod adapt_tokio {
    use crate::{adapter::Adapter, error::Result};
    use tokio::sync::mpsc;

    impl<A> Adapter for mpsc::Sender<A>
    where
        A: Send,
    {
        type Item = A;

        async fn notify(&mut self, a: Self::Item) -> Result<()> {
            self.send(a).await?;
            Ok(())
        }
    }
}
