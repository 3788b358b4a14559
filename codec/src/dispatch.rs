//! Type-tag dispatch over incoming messages.

use std::fmt;
use std::sync::Arc;

use buffer::ByteReader;
use schema::MessageDescriptor;
use tracing::{trace, warn};

use crate::decode::decode_with_limits;
use crate::error::CodecResult;
use crate::limits::CodecLimits;
use crate::value::Message;

type Handler<'h, R> = Box<dyn FnMut(Message) -> R + 'h>;

/// A descriptor paired with the handler for messages of its type.
pub struct Visitor<'h, R> {
    desc: Arc<MessageDescriptor>,
    handler: Handler<'h, R>,
}

impl<'h, R> Visitor<'h, R> {
    /// Creates a visitor for messages of `desc`'s type.
    pub fn new(desc: &Arc<MessageDescriptor>, handler: impl FnMut(Message) -> R + 'h) -> Self {
        Self {
            desc: Arc::clone(desc),
            handler: Box::new(handler),
        }
    }

    /// Returns the visitor's descriptor.
    #[must_use]
    pub fn descriptor(&self) -> &Arc<MessageDescriptor> {
        &self.desc
    }

    fn visit(&mut self, bytes: &[u8], limits: &CodecLimits) -> CodecResult<R> {
        let message = decode_with_limits(bytes, &self.desc, limits)?;
        Ok((self.handler)(message))
    }
}

impl<R> fmt::Debug for Visitor<'_, R> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Visitor")
            .field("type_tag", &self.desc.type_tag())
            .finish_non_exhaustive()
    }
}

fn leading_tag(bytes: &[u8]) -> CodecResult<u8> {
    Ok(ByteReader::new(bytes).peek_u8()?)
}

/// Decodes `bytes` with the first visitor whose tag matches its leading
/// byte and returns that visitor's result.
///
/// Returns `Ok(None)` without invoking any handler if no visitor matches.
/// Visitors are tried in order; if two share a tag the earlier one wins.
///
/// # Errors
///
/// - [`CodecError::OutOfBounds`](crate::CodecError::OutOfBounds) if `bytes`
///   is empty or too short for the matched message
/// - any decode error from the matched descriptor
pub fn dispatch<R>(bytes: &[u8], visitors: &mut [Visitor<'_, R>]) -> CodecResult<Option<R>> {
    let tag = leading_tag(bytes)?;
    let count = visitors.len();
    match visitors
        .iter_mut()
        .find(|visitor| visitor.descriptor().type_tag().get() == tag)
    {
        Some(visitor) => visitor.visit(bytes, &CodecLimits::default()).map(Some),
        None => {
            trace!(tag, visitors = count, "no visitor for type tag");
            Ok(None)
        }
    }
}

/// A reusable visitor list with a precomputed tag table.
///
/// Lookup is one table index per message instead of a scan over the
/// visitors. The first visitor registered for a tag wins.
pub struct Dispatcher<'h, R> {
    visitors: Vec<Visitor<'h, R>>,
    table: [Option<usize>; 256],
    limits: CodecLimits,
}

impl<'h, R> Dispatcher<'h, R> {
    /// Creates an empty dispatcher with default limits.
    #[must_use]
    pub fn new() -> Self {
        Self::with_limits(CodecLimits::default())
    }

    /// Creates an empty dispatcher that decodes with `limits`.
    #[must_use]
    pub fn with_limits(limits: CodecLimits) -> Self {
        Self {
            visitors: Vec::new(),
            table: [None; 256],
            limits,
        }
    }

    /// Adds a visitor.
    ///
    /// A visitor whose tag is already registered is kept but never reached.
    pub fn register(
        &mut self,
        desc: &Arc<MessageDescriptor>,
        handler: impl FnMut(Message) -> R + 'h,
    ) -> &mut Self {
        self.push(Visitor::new(desc, handler));
        self
    }

    /// Adds a visitor, returning the dispatcher.
    #[must_use]
    pub fn with(
        mut self,
        desc: &Arc<MessageDescriptor>,
        handler: impl FnMut(Message) -> R + 'h,
    ) -> Self {
        self.register(desc, handler);
        self
    }

    fn push(&mut self, visitor: Visitor<'h, R>) {
        let tag = visitor.descriptor().type_tag().get();
        let idx = self.visitors.len();
        let slot = &mut self.table[usize::from(tag)];
        match *slot {
            Some(first) => warn!(tag, first, shadowed = idx, "type tag already registered"),
            None => *slot = Some(idx),
        }
        self.visitors.push(visitor);
    }

    /// Returns `true` if a visitor handles `tag`.
    #[must_use]
    pub fn handles(&self, tag: u8) -> bool {
        self.table[usize::from(tag)].is_some()
    }

    /// Returns the number of registered visitors.
    #[must_use]
    pub fn len(&self) -> usize {
        self.visitors.len()
    }

    /// Returns `true` if no visitors are registered.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.visitors.is_empty()
    }

    /// Decodes `bytes` with the visitor registered for its leading tag.
    ///
    /// Same contract as [`dispatch`].
    pub fn dispatch(&mut self, bytes: &[u8]) -> CodecResult<Option<R>> {
        let tag = leading_tag(bytes)?;
        match self.table[usize::from(tag)] {
            Some(idx) => self.visitors[idx].visit(bytes, &self.limits).map(Some),
            None => {
                trace!(tag, visitors = self.visitors.len(), "no visitor for type tag");
                Ok(None)
            }
        }
    }
}

impl<R> Default for Dispatcher<'_, R> {
    fn default() -> Self {
        Self::new()
    }
}

impl<R> fmt::Debug for Dispatcher<'_, R> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Dispatcher")
            .field("visitors", &self.visitors)
            .field("limits", &self.limits)
            .finish_non_exhaustive()
    }
}
