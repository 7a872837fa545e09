use alloc::vec::Vec;
use tablefsm::Drain;

/// A growable buffer for the items state callbacks produce.
///
/// Contexts embed one of these and push diagnostic items from entry, run
/// and exit actions; the driver drains it after every step.
#[derive(Debug)]
pub struct OutputBuffer<A>(pub Vec<A>);

impl<A> OutputBuffer<A> {
    pub fn push(&mut self, item: A) {
        self.0.push(item);
    }
}

impl<A> Default for OutputBuffer<A> {
    fn default() -> Self {
        Self(Vec::new())
    }
}

impl<A> Drain for OutputBuffer<A>
where
    A: Send,
{
    type Item = A;

    fn drain_all(&mut self) -> impl Iterator<Item = Self::Item> + Send
    where
        Self::Item: Send,
    {
        self.0.drain(0..)
    }
}
