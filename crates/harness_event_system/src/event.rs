//! The event contract.
//!
//! Event hierarchies are expressed by embedding: a derived event stores its
//! parent event as a field and forwards [`Event::view`] requests it cannot
//! answer itself to that field. A handler declared for a parent type therefore
//! also receives every descendant, seeing the embedded parent record.

use std::any::{Any, TypeId};
use std::fmt;

/// Trait implemented by every dispatchable event.
///
/// Implement it with [`impl_event!`](crate::impl_event) rather than by hand.
pub trait Event: Any + fmt::Debug + 'static {
    /// Name used in logs and errors
    fn event_name(&self) -> &'static str;

    /// View this event as `target`, which is either its own type or the type
    /// of one of its ancestors.
    fn view(&self, target: TypeId) -> Option<&dyn Any>;
}

impl dyn Event {
    /// Whether this event is an `E` or descends from one
    pub fn is<E: Event>(&self) -> bool {
        self.view(TypeId::of::<E>()).is_some()
    }

    /// This event viewed as an `E`
    pub fn view_as<E: Event>(&self) -> Option<&E> {
        self.view(TypeId::of::<E>())?.downcast_ref::<E>()
    }
}

/// Implement [`Event`] for a root event or for an event derived from a parent
/// event embedded in one of its fields.
///
/// ```rust
/// use harness_event_system::{impl_event, Event};
///
/// #[derive(Debug)]
/// struct BlockEvent {
///     x: i32,
/// }
///
/// #[derive(Debug)]
/// struct BlockBreakEvent {
///     block: BlockEvent,
///     dropped_items: bool,
/// }
///
/// impl_event!(BlockEvent);
/// impl_event!(BlockBreakEvent: BlockEvent => block);
///
/// let event = BlockBreakEvent { block: BlockEvent { x: 4 }, dropped_items: true };
/// let event: &dyn Event = &event;
/// assert!(event.is::<BlockEvent>());
/// assert_eq!(event.view_as::<BlockEvent>().map(|b| b.x), Some(4));
/// ```
#[macro_export]
macro_rules! impl_event {
    ($event:ty) => {
        impl $crate::Event for $event {
            fn event_name(&self) -> &'static str {
                stringify!($event)
            }

            fn view(&self, target: ::std::any::TypeId) -> ::std::option::Option<&dyn ::std::any::Any> {
                if target == ::std::any::TypeId::of::<Self>() {
                    ::std::option::Option::Some(self as &dyn ::std::any::Any)
                } else {
                    ::std::option::Option::None
                }
            }
        }
    };
    ($event:ty : $parent:ty => $field:ident) => {
        impl $crate::Event for $event {
            fn event_name(&self) -> &'static str {
                stringify!($event)
            }

            fn view(&self, target: ::std::any::TypeId) -> ::std::option::Option<&dyn ::std::any::Any> {
                if target == ::std::any::TypeId::of::<Self>() {
                    ::std::option::Option::Some(self as &dyn ::std::any::Any)
                } else {
                    let parent: &$parent = &self.$field;
                    $crate::Event::view(parent, target)
                }
            }
        }
    };
}

impl fmt::Display for dyn Event {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.event_name())
    }
}
