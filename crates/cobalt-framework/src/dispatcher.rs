//! The top-level dispatcher.
//!
//! [`Dispatcher`] receives everything the platform client delivers and hands
//! it to the matching router:
//!
//! ```text
//! Inbound ─┬─ Interaction::Command       ─▶ CommandRegistry::route       ─▶ slash handler
//!          ├─ Interaction::Autocomplete  ─▶ CommandRegistry::route_autocomplete ─▶ provider
//!          ├─ Interaction::User/Message  ─▶ context action by name
//!          ├─ Interaction::Component     ─▶ ComponentRouter (longest prefix)
//!          └─ Event                      ─▶ EventDispatcher (fan-out)
//! ```
//!
//! Anything that matches nothing is dropped with a `debug` log line. The
//! registries are shared behind `Arc`s and never mutated after the dispatcher
//! is built, so cloning a dispatcher is cheap and dispatch takes no locks.
//!
//! The dispatcher is also a [`tower::Service`], so middleware can be stacked
//! in front of it:
//!
//! ```rust,ignore
//! let service = ServiceBuilder::new()
//!     .filter(only_in_group(GroupId(42)))
//!     .service(dispatcher);
//! ```

use std::future::Future;
use std::panic::AssertUnwindSafe;
use std::sync::Arc;
use std::task::{Context, Poll};

use futures::FutureExt;
use tower::Service;
use tracing::{Instrument, Level, debug, error, span};

use cobalt_core::{BoxedClient, Inbound, Interaction};

use crate::args::MAX_CHOICES;
use crate::command::CommandRegistry;
use crate::component::ComponentRouter;
use crate::context::{AutocompleteContext, MessageContext, SlashContext, UserContext};
use crate::error::{DispatchError, DispatchResult};
use crate::event::EventDispatcher;
use crate::executor::{WorkerPool, panic_message};
use crate::handler::BoxFuture;
use crate::sync::SchemaSynchronizer;

/// What happened to one inbound item.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Dispatched {
    /// A handler ran to completion.
    Handled,
    /// A threaded handler was queued on the worker pool.
    Submitted,
    /// An event was delivered to this many handlers.
    Events(usize),
    /// Nothing matched.
    Dropped,
}

/// Routes inbound interactions and events to their handlers.
#[derive(Clone)]
pub struct Dispatcher {
    commands: Arc<CommandRegistry>,
    components: Arc<ComponentRouter>,
    events: Arc<EventDispatcher>,
    pool: Option<Arc<WorkerPool>>,
}

impl Dispatcher {
    pub fn new(
        commands: CommandRegistry,
        components: ComponentRouter,
        events: EventDispatcher,
    ) -> Self {
        Self {
            commands: Arc::new(commands),
            components: Arc::new(components),
            events: Arc::new(events),
            pool: None,
        }
    }

    /// Runs threaded commands on `pool`.
    ///
    /// Without a pool, threaded commands run inline like any other.
    pub fn with_pool(mut self, pool: Arc<WorkerPool>) -> Self {
        self.pool = Some(pool);
        self
    }

    pub fn commands(&self) -> &CommandRegistry {
        &self.commands
    }

    pub fn components(&self) -> &ComponentRouter {
        &self.components
    }

    pub fn events(&self) -> &EventDispatcher {
        &self.events
    }

    pub fn pool(&self) -> Option<&Arc<WorkerPool>> {
        self.pool.as_ref()
    }

    /// Wire-format snapshot of the registered commands.
    pub fn synchronizer(&self) -> SchemaSynchronizer {
        SchemaSynchronizer::new(&self.commands)
    }

    /// Dispatches one inbound item.
    ///
    /// Routing misses are `Ok(Dispatched::Dropped)`. Errors are reserved for
    /// inconsistencies between the local and published declarations, a full
    /// worker queue, and client failures while answering autocomplete.
    pub async fn dispatch(
        &self,
        inbound: Inbound,
        client: BoxedClient,
    ) -> DispatchResult<Dispatched> {
        match inbound {
            Inbound::Interaction(interaction) => {
                let span = span!(
                    Level::DEBUG,
                    "interaction",
                    kind = interaction.kind_name(),
                    id = %interaction.meta().id
                );
                self.dispatch_interaction(interaction, client)
                    .instrument(span)
                    .await
            }
            Inbound::Event(event) => {
                let count = self.events.dispatch(event, client).await;
                Ok(Dispatched::Events(count))
            }
        }
    }

    async fn dispatch_interaction(
        &self,
        interaction: Interaction,
        client: BoxedClient,
    ) -> DispatchResult<Dispatched> {
        match interaction {
            Interaction::Command(command) => {
                let Some(node) = self.commands.route(&command.path) else {
                    debug!(command = %command.path, "No command matched");
                    return Ok(Dispatched::Dropped);
                };
                let path = command.path.to_string();
                let Some(prepared) = node.invoke(SlashContext::new(command, client)) else {
                    return Ok(Dispatched::Dropped);
                };
                let future = prepared.map_err(|source| {
                    error!(command = %path, "Failed to decode arguments: {source}");
                    DispatchError::Decode {
                        command: path.clone(),
                        source,
                    }
                })?;

                match &self.pool {
                    Some(pool) if node.is_threaded() => {
                        pool.submit(isolated(future, path)).await?;
                        Ok(Dispatched::Submitted)
                    }
                    _ => {
                        isolated(future, path).await;
                        Ok(Dispatched::Handled)
                    }
                }
            }

            Interaction::Autocomplete(request) => {
                let provider = match self
                    .commands
                    .route_autocomplete(&request.path, &request.focused.name)
                {
                    Ok(Some(provider)) => Arc::clone(provider),
                    Ok(None) => {
                        debug!(command = %request.path, "No command matched autocomplete");
                        return Ok(Dispatched::Dropped);
                    }
                    Err(e) => {
                        error!("{e}");
                        return Err(e);
                    }
                };

                let meta = request.meta.clone();
                let path = request.path.to_string();
                let suggest = provider.suggest(AutocompleteContext::new(request, client.clone()));
                let mut choices = match AssertUnwindSafe(suggest).catch_unwind().await {
                    Ok(choices) => choices,
                    Err(panic) => {
                        error!(
                            command = %path,
                            "Autocomplete provider panicked: {}",
                            panic_message(&*panic)
                        );
                        return Ok(Dispatched::Dropped);
                    }
                };
                choices.truncate(MAX_CHOICES);
                client.autocomplete_result(&meta, choices).await?;
                Ok(Dispatched::Handled)
            }

            Interaction::User(action) => {
                let Some(command) = self.commands.route_user(&action.name) else {
                    debug!(command = %action.name, "No user command matched");
                    return Ok(Dispatched::Dropped);
                };
                let label = action.name.clone();
                let future = command.handler().call((UserContext::new(action, client),));
                isolated(future, label).await;
                Ok(Dispatched::Handled)
            }

            Interaction::Message(action) => {
                let Some(command) = self.commands.route_message(&action.name) else {
                    debug!(command = %action.name, "No message command matched");
                    return Ok(Dispatched::Dropped);
                };
                let label = action.name.clone();
                let future = command
                    .handler()
                    .call((MessageContext::new(action, client),));
                isolated(future, label).await;
                Ok(Dispatched::Handled)
            }

            Interaction::Component(component) => {
                let label = format!("{}:{}", component.kind.as_str(), component.custom_id);
                match self.components.handle(component, client) {
                    Some(future) => {
                        isolated(future, label).await;
                        Ok(Dispatched::Handled)
                    }
                    None => {
                        debug!(component = %label, "No component prefix matched");
                        Ok(Dispatched::Dropped)
                    }
                }
            }
        }
    }
}

/// Runs a handler future, logging a panic instead of unwinding into the
/// caller.
fn isolated(
    future: BoxFuture<'static, ()>,
    label: String,
) -> impl Future<Output = ()> + Send + 'static {
    let run = AssertUnwindSafe(future).catch_unwind();
    async move {
        if let Err(panic) = run.await {
            error!(handler = %label, "Handler panicked: {}", panic_message(&*panic));
        }
    }
}

impl std::fmt::Debug for Dispatcher {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Dispatcher")
            .field("commands", &self.commands.len())
            .field("components", &self.components.len())
            .field("events", &self.events.len())
            .field("pool", &self.pool)
            .finish()
    }
}

impl Service<(Inbound, BoxedClient)> for Dispatcher {
    type Response = Dispatched;
    type Error = DispatchError;
    type Future = BoxFuture<'static, DispatchResult<Dispatched>>;

    fn poll_ready(&mut self, _cx: &mut Context<'_>) -> Poll<Result<(), Self::Error>> {
        Poll::Ready(Ok(()))
    }

    fn call(&mut self, (inbound, client): (Inbound, BoxedClient)) -> Self::Future {
        let this = self.clone();
        Box::pin(async move { this.dispatch(inbound, client).await })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::time::Duration;

    use tower::{BoxError, ServiceBuilder, ServiceExt};

    use cobalt_core::testing::RecordingClient;
    use cobalt_core::{
        AutocompleteInteraction, Choice, CommandInteraction, CommandPath, ComponentInteraction,
        ComponentKind, EventKind, FocusedOption, InteractionId, InteractionMeta, InteractionToken,
        OptionValue, PlatformEvent, RawOption, UserCommandInteraction, UserId, UserRef,
    };

    use crate::args::{ArgsDeclaration, CommandArgs, OptionReader};
    use crate::command::{SlashCommand, UserCommand};
    use crate::context::{ComponentContext, EventContext};
    use crate::error::{DecodeError, DecodeResult};
    use crate::executor::{PoolConfig, QueueFullPolicy};

    fn meta() -> InteractionMeta {
        InteractionMeta::new(InteractionId(7), InteractionToken::new("t"), UserId(1))
    }

    fn command(path: CommandPath, options: Vec<RawOption>) -> Inbound {
        Interaction::Command(CommandInteraction {
            meta: meta(),
            path,
            options,
        })
        .into()
    }

    #[derive(Debug, PartialEq)]
    struct Search {
        query: String,
    }

    impl CommandArgs for Search {
        fn declare(decl: ArgsDeclaration) -> ArgsDeclaration {
            decl.required::<String>("query", "search text")
        }

        fn decode(reader: &OptionReader<'_>) -> DecodeResult<Self> {
            Ok(Self {
                query: reader.required("query")?,
            })
        }

        fn encode(&self) -> Vec<RawOption> {
            vec![RawOption::new("query", OptionValue::String(self.query.clone()))]
        }
    }

    async fn search(_ctx: SlashContext, args: Search) -> String {
        format!("results for {}", args.query)
    }

    async fn many(_ctx: AutocompleteContext) -> Vec<Choice> {
        (0..40).map(|i| Choice::new(format!("item {i}"), i.to_string())).collect()
    }

    async fn explode(_ctx: SlashContext) {
        panic!("handler failure");
    }

    async fn broken(_ctx: AutocompleteContext) -> Vec<Choice> {
        panic!("provider failure")
    }

    fn dispatcher() -> Dispatcher {
        let mut commands = CommandRegistry::new();
        commands
            .register(
                SlashCommand::new("search", "Search")
                    .handler(search)
                    .autocomplete("query", many),
            )
            .unwrap()
            .register(SlashCommand::new("explode", "Panics").handler(explode))
            .unwrap()
            .register_user(UserCommand::new("Wave", |ctx: UserContext| async move {
                format!("hi {}", ctx.target.name)
            }))
            .unwrap();

        let mut components = ComponentRouter::new();
        components
            .button("page:", |_ctx: ComponentContext, rest: String| async move {
                format!("page {rest}")
            })
            .unwrap();

        let mut events = EventDispatcher::new();
        events.on(EventKind::Ready, |_ctx: EventContext| async {});

        Dispatcher::new(commands, components, events)
    }

    fn abc() -> Vec<RawOption> {
        vec![RawOption::new("query", OptionValue::String("abc".into()))]
    }

    #[tokio::test]
    async fn test_slash_command_is_decoded_and_answered() {
        let client = RecordingClient::new();
        let outcome = dispatcher()
            .dispatch(command(CommandPath::new("search"), abc()), client.boxed())
            .await
            .unwrap();

        assert_eq!(outcome, Dispatched::Handled);
        assert_eq!(client.replies(), vec!["results for abc".to_string()]);
    }

    #[tokio::test]
    async fn test_missing_required_option_is_decode_fault() {
        let client = RecordingClient::new();
        let err = dispatcher()
            .dispatch(command(CommandPath::new("search"), Vec::new()), client.boxed())
            .await
            .unwrap_err();

        assert!(matches!(
            err,
            DispatchError::Decode {
                source: DecodeError::MissingRequired { .. },
                ..
            }
        ));
        assert!(client.calls().is_empty());
    }

    #[tokio::test]
    async fn test_unknown_command_is_dropped() {
        let client = RecordingClient::new();
        let outcome = dispatcher()
            .dispatch(
                command(CommandPath::new("search").subcommand("nope"), abc()),
                client.boxed(),
            )
            .await
            .unwrap();
        assert_eq!(outcome, Dispatched::Dropped);
    }

    #[tokio::test]
    async fn test_handler_panic_is_contained() {
        let client = RecordingClient::new();
        let outcome = dispatcher()
            .dispatch(command(CommandPath::new("explode"), Vec::new()), client.boxed())
            .await
            .unwrap();
        assert_eq!(outcome, Dispatched::Handled);
    }

    #[tokio::test]
    async fn test_autocomplete_is_truncated() {
        let client = RecordingClient::new();
        let request = Interaction::Autocomplete(AutocompleteInteraction {
            meta: meta(),
            path: CommandPath::new("search"),
            options: Vec::new(),
            focused: FocusedOption {
                name: "query".into(),
                value: OptionValue::String("it".into()),
            },
        });

        let outcome = dispatcher()
            .dispatch(request.into(), client.boxed())
            .await
            .unwrap();

        assert_eq!(outcome, Dispatched::Handled);
        let suggestions = client.suggestions();
        assert_eq!(suggestions.len(), 1);
        assert_eq!(suggestions[0].len(), MAX_CHOICES);
    }

    #[tokio::test]
    async fn test_autocomplete_without_provider_fails() {
        let client = RecordingClient::new();
        let request = Interaction::Autocomplete(AutocompleteInteraction {
            meta: meta(),
            path: CommandPath::new("explode"),
            options: Vec::new(),
            focused: FocusedOption {
                name: "anything".into(),
                value: OptionValue::String(String::new()),
            },
        });

        let err = dispatcher()
            .dispatch(request.into(), client.boxed())
            .await
            .unwrap_err();
        assert!(matches!(err, DispatchError::MissingAutocompleteProvider { .. }));
    }

    #[tokio::test]
    async fn test_autocomplete_provider_panic_is_contained() {
        let client = RecordingClient::new();
        let mut commands = CommandRegistry::new();
        commands
            .register(
                SlashCommand::new("search", "Search")
                    .handler(search)
                    .autocomplete("query", broken),
            )
            .unwrap();
        let dispatcher = Dispatcher::new(commands, ComponentRouter::new(), EventDispatcher::new());

        let request = Interaction::Autocomplete(AutocompleteInteraction {
            meta: meta(),
            path: CommandPath::new("search"),
            options: Vec::new(),
            focused: FocusedOption {
                name: "query".into(),
                value: OptionValue::String("it".into()),
            },
        });

        let dispatched = AssertUnwindSafe(dispatcher.dispatch(request.into(), client.boxed()))
            .catch_unwind()
            .await;
        let outcome = dispatched.expect("dispatch must not unwind").unwrap();

        assert_eq!(outcome, Dispatched::Dropped);
        assert!(client.suggestions().is_empty());
    }

    #[tokio::test]
    async fn test_user_component_and_event_routes() {
        let client = RecordingClient::new();
        let dispatcher = dispatcher();

        let wave = Interaction::User(UserCommandInteraction {
            meta: meta(),
            name: "Wave".into(),
            target: UserRef {
                id: UserId(2),
                name: "ada".into(),
                member: true,
            },
        });
        let button = Interaction::Component(ComponentInteraction::new(
            meta(),
            ComponentKind::Button,
            "page:3",
        ));
        let ready = PlatformEvent::new(EventKind::Ready, serde_json::Value::Null);
        let resumed = PlatformEvent::new(EventKind::Resumed, serde_json::Value::Null);

        let outcomes = [
            dispatcher.dispatch(wave.into(), client.boxed()).await.unwrap(),
            dispatcher.dispatch(button.into(), client.boxed()).await.unwrap(),
            dispatcher.dispatch(ready.into(), client.boxed()).await.unwrap(),
            dispatcher.dispatch(resumed.into(), client.boxed()).await.unwrap(),
        ];

        assert_eq!(
            outcomes,
            [
                Dispatched::Handled,
                Dispatched::Handled,
                Dispatched::Events(1),
                Dispatched::Events(0),
            ]
        );
        assert_eq!(client.replies(), vec!["hi ada".to_string(), "page 3".to_string()]);
    }

    #[tokio::test]
    async fn test_threaded_command_goes_to_pool() {
        let client = RecordingClient::new();
        let count = Arc::new(AtomicUsize::new(0));
        let counter = Arc::clone(&count);

        let mut commands = CommandRegistry::new();
        commands
            .register(
                SlashCommand::new("slow", "Slow work")
                    .threaded(true)
                    .handler(move |_ctx: SlashContext| {
                        let counter = Arc::clone(&counter);
                        async move {
                            counter.fetch_add(1, Ordering::SeqCst);
                        }
                    }),
            )
            .unwrap();

        let pool = Arc::new(WorkerPool::start(PoolConfig {
            workers: 1,
            queue_capacity: 4,
            policy: QueueFullPolicy::Reject,
        }));
        let dispatcher = Dispatcher::new(commands, ComponentRouter::new(), EventDispatcher::new())
            .with_pool(Arc::clone(&pool));

        let outcome = dispatcher
            .dispatch(command(CommandPath::new("slow"), Vec::new()), client.boxed())
            .await
            .unwrap();
        assert_eq!(outcome, Dispatched::Submitted);

        assert!(pool.shutdown(Duration::from_secs(5)).await);
        assert_eq!(count.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_tower_filter_in_front() {
        let client = RecordingClient::new();
        let service = ServiceBuilder::new()
            .filter(|(inbound, client): (Inbound, BoxedClient)| {
                if matches!(inbound, Inbound::Event(_)) {
                    Err(BoxError::from("events are handled elsewhere"))
                } else {
                    Ok((inbound, client))
                }
            })
            .service(dispatcher());

        let ready = PlatformEvent::new(EventKind::Ready, serde_json::Value::Null);
        let rejected = service
            .clone()
            .oneshot((Inbound::from(ready), client.boxed()))
            .await;
        assert!(rejected.is_err());

        let outcome = service
            .oneshot((command(CommandPath::new("search"), abc()), client.boxed()))
            .await
            .unwrap();
        assert_eq!(outcome, Dispatched::Handled);
    }
}
