//! Listener declarations and the cached handler tables built from them

use crate::event::Event;
use plugin_system::BoxError;
use std::any::{type_name, Any, TypeId};
use std::fmt;
use std::marker::PhantomData;
use tracing::debug;

/// Result returned by event handlers
pub type HandlerResult = Result<(), BoxError>;

/// A type whose methods handle events.
///
/// `handlers` declares which methods are event handlers. Methods that are not
/// declared are never invoked by the dispatcher, even when their signature
/// would fit an event.
///
/// ```rust
/// use harness_event_system::{impl_event, HandlerResult, HandlerSet, Listener};
///
/// #[derive(Debug)]
/// struct ChatEvent {
///     message: String,
/// }
///
/// impl_event!(ChatEvent);
///
/// #[derive(Default)]
/// struct ChatLog {
///     lines: Vec<String>,
/// }
///
/// impl ChatLog {
///     fn on_chat(&mut self, event: &ChatEvent) -> HandlerResult {
///         self.lines.push(event.message.clone());
///         Ok(())
///     }
/// }
///
/// impl Listener for ChatLog {
///     fn handlers(set: &mut HandlerSet<Self>) {
///         set.on("on_chat", Self::on_chat);
///     }
/// }
/// ```
pub trait Listener: Sized + 'static {
    /// Declare this type's event handlers, in invocation order.
    fn handlers(set: &mut HandlerSet<Self>);
}

type ErasedInvoke = Box<dyn Fn(&mut dyn Any, &dyn Event) -> Option<HandlerResult>>;

/// One declared handler with its listener and event types erased.
pub(crate) struct ErasedHandler {
    name: &'static str,
    event_type: TypeId,
    event_name: &'static str,
    invoke: ErasedInvoke,
}

impl ErasedHandler {
    pub(crate) fn name(&self) -> &'static str {
        self.name
    }

    /// Whether `event` is of this handler's event type or descends from it.
    pub(crate) fn accepts(&self, event: &dyn Event) -> bool {
        event.view(self.event_type).is_some()
    }

    /// Run the handler, or return `None` when the listener or event is of
    /// the wrong type.
    pub(crate) fn invoke(&self, listener: &mut dyn Any, event: &dyn Event) -> Option<HandlerResult> {
        (self.invoke)(listener, event)
    }
}

/// Collects the handler declarations of a listener type `L`.
pub struct HandlerSet<L> {
    handlers: Vec<ErasedHandler>,
    _listener: PhantomData<fn(&mut L)>,
}

impl<L: Listener> HandlerSet<L> {
    fn new() -> Self {
        Self {
            handlers: Vec::new(),
            _listener: PhantomData,
        }
    }

    /// Declare `handler` as the handler named `name` for events of type `E`
    /// and all of its descendants.
    pub fn on<E: Event>(
        &mut self,
        name: &'static str,
        handler: fn(&mut L, &E) -> HandlerResult,
    ) -> &mut Self {
        self.handlers.push(ErasedHandler {
            name,
            event_type: TypeId::of::<E>(),
            event_name: type_name::<E>(),
            invoke: Box::new(move |listener: &mut dyn Any, event: &dyn Event| {
                let listener = listener.downcast_mut::<L>()?;
                let event = event.view_as::<E>()?;
                Some(handler(listener, event))
            }),
        });
        self
    }

    pub fn len(&self) -> usize {
        self.handlers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.handlers.is_empty()
    }
}

/// Public description of a discovered handler
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct HandlerInfo {
    pub name: &'static str,
    /// Type name of the event the handler was declared for
    pub event_type: &'static str,
}

/// The handlers of one listener type, discovered once and then shared by
/// every binding of that type.
pub struct HandlerTable {
    listener_type: &'static str,
    handlers: Vec<ErasedHandler>,
}

impl HandlerTable {
    pub(crate) fn discover<L: Listener>() -> Self {
        let mut set = HandlerSet::<L>::new();
        L::handlers(&mut set);

        let listener_type = type_name::<L>();
        debug!(
            "Discovered {} handler(s) on listener {}",
            set.len(),
            listener_type
        );

        Self {
            listener_type,
            handlers: set.handlers,
        }
    }

    pub fn listener_type(&self) -> &'static str {
        self.listener_type
    }

    /// Handler descriptions in declaration order
    pub fn handlers(&self) -> Vec<HandlerInfo> {
        self.handlers
            .iter()
            .map(|h| HandlerInfo {
                name: h.name,
                event_type: h.event_name,
            })
            .collect()
    }

    /// Handlers that accept `event`, in declaration order
    pub(crate) fn accepting<'a>(
        &'a self,
        event: &'a dyn Event,
    ) -> impl Iterator<Item = &'a ErasedHandler> + 'a {
        self.handlers.iter().filter(move |h| h.accepts(event))
    }

    pub fn len(&self) -> usize {
        self.handlers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.handlers.is_empty()
    }
}

impl fmt::Debug for HandlerTable {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("HandlerTable")
            .field("listener_type", &self.listener_type)
            .field("handlers", &self.handlers())
            .finish()
    }
}
