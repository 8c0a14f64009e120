//! Named-channel publish/subscribe hub
//!
//! Handlers run synchronously, in registration order, on the caller's turn.
//! A handler receives the whole context (`&mut C`) so it can read and write
//! shared state and reach the view controllers. Handler errors are logged and
//! isolated: the remaining handlers of the same event still run.
//!
//! A handler may dispatch a *different* channel (nested dispatch runs to
//! completion before the outer loop resumes). Dispatching a channel whose
//! handlers are already running is refused.

use std::rc::Rc;
use tracing::{debug, error, trace, warn};

use super::error::{DispatchError, ViewError};
use super::events::{Channel, Event, SubscriptionId};

/// Shared handler signature.
pub type Handler<C> = Rc<dyn Fn(&mut C, &Event) -> Result<(), ViewError>>;

struct Registration<C> {
    key: String,
    handler: Handler<C>,
}

/// Outcome of one `dispatch`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct DispatchReport {
    pub delivered: usize,
    pub failed: usize,
}

pub struct Dispatcher<C> {
    channels: Vec<Vec<Registration<C>>>,
    in_flight: Vec<Channel>,
}

impl<C> Default for Dispatcher<C> {
    fn default() -> Self {
        Self::new()
    }
}

impl<C> Dispatcher<C> {
    pub fn new() -> Self {
        Self {
            channels: Channel::ALL.iter().map(|_| Vec::new()).collect(),
            in_flight: Vec::new(),
        }
    }

    /// Register `handler` under `id`, replacing any handler already there.
    ///
    /// A replaced handler is removed and the new one appended, so it runs
    /// after every handler registered before the replacement.
    pub fn on<F>(&mut self, id: SubscriptionId, handler: F)
    where
        F: Fn(&mut C, &Event) -> Result<(), ViewError> + 'static,
    {
        let slot = &mut self.channels[id.channel.index()];
        if let Some(pos) = slot.iter().position(|r| r.key == id.key) {
            slot.remove(pos);
            debug!(subscription = %id, "Replacing handler");
        } else {
            debug!(subscription = %id, "Registering handler");
        }
        slot.push(Registration {
            key: id.key,
            handler: Rc::new(handler),
        });
    }

    /// String form of [`on`](Self::on): `"countrySelected.radar"`.
    pub fn on_named<F>(&mut self, name: &str, handler: F) -> Result<(), DispatchError>
    where
        F: Fn(&mut C, &Event) -> Result<(), ViewError> + 'static,
    {
        let id = name.parse::<SubscriptionId>().map_err(|e| {
            error!(subscription = name, error = %e, "Rejected subscription");
            e
        })?;
        self.on(id, handler);
        Ok(())
    }

    pub fn handler_count(&self, channel: Channel) -> usize {
        self.channels[channel.index()].len()
    }

    pub fn is_registered(&self, id: &SubscriptionId) -> bool {
        self.channels[id.channel.index()]
            .iter()
            .any(|r| r.key == id.key)
    }

    pub fn is_in_flight(&self, channel: Channel) -> bool {
        self.in_flight.contains(&channel)
    }

    fn snapshot(&self, channel: Channel) -> Vec<(String, Handler<C>)> {
        self.channels[channel.index()]
            .iter()
            .map(|r| (r.key.clone(), Rc::clone(&r.handler)))
            .collect()
    }
}

/// Anything that owns a [`Dispatcher`] over itself.
pub trait DispatchContext: Sized {
    fn dispatcher(&mut self) -> &mut Dispatcher<Self>;
}

/// Deliver `event` to every handler registered on its channel.
///
/// The handler list is captured before the first handler runs: handlers
/// registered during delivery see the next event, not this one.
pub fn dispatch<C: DispatchContext>(ctx: &mut C, event: Event) -> Result<DispatchReport, DispatchError> {
    let channel = event.channel();
    if ctx.dispatcher().is_in_flight(channel) {
        error!(%channel, "Re-entrant dispatch refused");
        return Err(DispatchError::Reentrant(channel));
    }

    let handlers = ctx.dispatcher().snapshot(channel);
    if handlers.is_empty() {
        trace!(%channel, "No subscribers");
        return Ok(DispatchReport::default());
    }

    debug!(%channel, handlers = handlers.len(), "Dispatching");
    ctx.dispatcher().in_flight.push(channel);

    let mut report = DispatchReport::default();
    for (key, handler) in handlers {
        match handler(ctx, &event) {
            Ok(()) => report.delivered += 1,
            Err(e) => {
                report.failed += 1;
                warn!(%channel, key = %key, error = %e, "Handler failed");
            }
        }
    }

    let in_flight = &mut ctx.dispatcher().in_flight;
    if let Some(pos) = in_flight.iter().rposition(|c| *c == channel) {
        in_flight.remove(pos);
    }
    Ok(report)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::types::{ViewId, Year};
    use pretty_assertions::assert_eq;

    #[derive(Default)]
    struct Ctx {
        dispatcher: Dispatcher<Ctx>,
        log: Vec<String>,
    }

    impl DispatchContext for Ctx {
        fn dispatcher(&mut self) -> &mut Dispatcher<Self> {
            &mut self.dispatcher
        }
    }

    fn year(n: i64) -> Event {
        Event::YearChanged(Year::clamped(n))
    }

    fn logger(tag: &'static str) -> impl Fn(&mut Ctx, &Event) -> Result<(), ViewError> {
        move |ctx: &mut Ctx, _: &Event| {
            ctx.log.push(tag.to_string());
            Ok(())
        }
    }

    #[test]
    fn test_handlers_run_in_registration_order() {
        let mut ctx = Ctx::default();
        ctx.dispatcher.on(SubscriptionId::new(Channel::YearChanged, "a"), logger("a"));
        ctx.dispatcher.on(SubscriptionId::new(Channel::YearChanged, "b"), logger("b"));
        ctx.dispatcher.on(SubscriptionId::new(Channel::YearChanged, "c"), logger("c"));

        let report = dispatch(&mut ctx, year(1990)).unwrap();
        assert_eq!(report, DispatchReport { delivered: 3, failed: 0 });
        assert_eq!(ctx.log, vec!["a", "b", "c"]);
    }

    #[test]
    fn test_same_key_replaces_handler() {
        let mut ctx = Ctx::default();
        ctx.dispatcher.on(SubscriptionId::new(Channel::YearChanged, "x"), logger("old"));
        ctx.dispatcher.on(SubscriptionId::new(Channel::YearChanged, "y"), logger("y"));
        ctx.dispatcher.on(SubscriptionId::new(Channel::YearChanged, "x"), logger("new"));

        assert_eq!(ctx.dispatcher.handler_count(Channel::YearChanged), 2);
        dispatch(&mut ctx, year(2000)).unwrap();
        assert_eq!(ctx.log, vec!["y", "new"]);
    }

    #[test]
    fn test_keys_are_scoped_per_channel() {
        let mut ctx = Ctx::default();
        ctx.dispatcher.on_named("countrySelected.radar", logger("select")).unwrap();
        ctx.dispatcher.on_named("countryHighlighted.radar", logger("hover")).unwrap();
        dispatch(&mut ctx, Event::CountryHighlighted("Chad".into())).unwrap();
        assert_eq!(ctx.log, vec!["hover"]);
    }

    #[test]
    fn test_unknown_channel_is_rejected() {
        let mut ctx = Ctx::default();
        let err = ctx.dispatcher.on_named("countryClicked.radar", logger("x")).unwrap_err();
        assert!(matches!(err, DispatchError::UnknownChannel(_)));
        for &channel in Channel::ALL {
            assert_eq!(ctx.dispatcher.handler_count(channel), 0);
        }
    }

    #[test]
    fn test_no_subscribers_is_a_noop() {
        let mut ctx = Ctx::default();
        let report = dispatch(&mut ctx, Event::CountryUnhighlighted).unwrap();
        assert_eq!(report, DispatchReport::default());
    }

    #[test]
    fn test_failing_handler_does_not_block_siblings() {
        let mut ctx = Ctx::default();
        ctx.dispatcher.on(SubscriptionId::new(Channel::YearChanged, "first"), logger("first"));
        ctx.dispatcher.on(
            SubscriptionId::new(Channel::YearChanged, "broken"),
            |_: &mut Ctx, _: &Event| Err(ViewError::NotInitialized(ViewId::Radar)),
        );
        ctx.dispatcher.on(SubscriptionId::new(Channel::YearChanged, "last"), logger("last"));

        let report = dispatch(&mut ctx, year(1960)).unwrap();
        assert_eq!(report, DispatchReport { delivered: 2, failed: 1 });
        assert_eq!(ctx.log, vec!["first", "last"]);
    }

    #[test]
    fn test_nested_dispatch_completes_before_outer_resumes() {
        let mut ctx = Ctx::default();
        ctx.dispatcher.on(
            SubscriptionId::new(Channel::CountrySelected, "outer"),
            |ctx: &mut Ctx, _: &Event| {
                ctx.log.push("select:start".into());
                dispatch(ctx, Event::CountryHighlighted("Peru".into())).map_err(|e| ViewError::Data {
                    view: ViewId::Globe,
                    reason: e.to_string(),
                })?;
                ctx.log.push("select:end".into());
                Ok(())
            },
        );
        ctx.dispatcher.on(SubscriptionId::new(Channel::CountrySelected, "after"), logger("select:after"));
        ctx.dispatcher.on(SubscriptionId::new(Channel::CountryHighlighted, ""), logger("highlight"));

        dispatch(&mut ctx, Event::country_selected("PER", "Peru")).unwrap();
        assert_eq!(ctx.log, vec!["select:start", "highlight", "select:end", "select:after"]);
        assert!(!ctx.dispatcher.is_in_flight(Channel::CountrySelected));
    }

    #[test]
    fn test_same_channel_reentry_is_refused() {
        let mut ctx = Ctx::default();
        ctx.dispatcher.on(
            SubscriptionId::new(Channel::YearChanged, "loop"),
            |ctx: &mut Ctx, event: &Event| {
                ctx.log.push("tick".into());
                match dispatch(ctx, event.clone()) {
                    Err(DispatchError::Reentrant(Channel::YearChanged)) => {
                        ctx.log.push("refused".into());
                        Ok(())
                    }
                    other => panic!("expected re-entry refusal, got {other:?}"),
                }
            },
        );

        dispatch(&mut ctx, year(1975)).unwrap();
        assert_eq!(ctx.log, vec!["tick", "refused"]);

        // The guard is released once the outer dispatch returns.
        dispatch(&mut ctx, year(1976)).unwrap();
        assert_eq!(ctx.log.len(), 4);
    }

    #[test]
    fn test_registration_during_dispatch_applies_to_next_event() {
        let mut ctx = Ctx::default();
        ctx.dispatcher.on(
            SubscriptionId::new(Channel::DataLoaded, "boot"),
            |ctx: &mut Ctx, _: &Event| {
                ctx.log.push("boot".into());
                ctx.dispatcher.on(SubscriptionId::new(Channel::DataLoaded, "late"), logger("late"));
                Ok(())
            },
        );

        dispatch(&mut ctx, Event::DataLoaded(Default::default())).unwrap();
        assert_eq!(ctx.log, vec!["boot"]);
        dispatch(&mut ctx, Event::DataLoaded(Default::default())).unwrap();
        assert_eq!(ctx.log, vec!["boot", "boot", "late"]);
    }

    mod properties {
        use super::*;
        use proptest::prelude::*;
        use std::cell::Cell;

        proptest! {
            #[test]
            fn reregistration_never_duplicates(keys in proptest::collection::vec(0u8..4, 1..40)) {
                let mut ctx = Ctx::default();
                let calls = Rc::new(Cell::new(0usize));
                for key in &keys {
                    let calls = Rc::clone(&calls);
                    ctx.dispatcher.on(
                        SubscriptionId::new(Channel::CountryHighlighted, key.to_string()),
                        move |_: &mut Ctx, _: &Event| {
                            calls.set(calls.get() + 1);
                            Ok(())
                        },
                    );
                }
                let mut distinct = keys.clone();
                distinct.sort_unstable();
                distinct.dedup();

                dispatch(&mut ctx, Event::CountryHighlighted("Fiji".into())).unwrap();
                prop_assert_eq!(calls.get(), distinct.len());
                prop_assert_eq!(ctx.dispatcher.handler_count(Channel::CountryHighlighted), distinct.len());
            }
        }
    }
}
