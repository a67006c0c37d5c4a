//! Handler system for the Cobalt framework.
//!
//! Handlers are plain async functions. The first parameter is always a
//! [`HandlerContext`](crate::context::HandlerContext); slash commands take
//! their typed arguments as a second parameter and component handlers take
//! the identifier payload:
//!
//! ```rust,ignore
//! async fn ping(ctx: SlashContext) -> &'static str {
//!     "pong"
//! }
//!
//! async fn greet(ctx: SlashContext, args: GreetArgs) -> String {
//!     format!("Hello, {}!", args.name)
//! }
//!
//! async fn confirm(ctx: ComponentContext, payload: String) -> Result<(), MyError> {
//!     // ...
//! }
//! ```
//!
//! Whatever the function returns is turned into a response through
//! [`HandlerResponse`].

use std::fmt::Display;
use std::future::Future;
use std::marker::PhantomData;
use std::pin::Pin;
use std::sync::Arc;

use async_trait::async_trait;
use tracing::{error, warn};

use cobalt_core::{BoxedClient, Choice, ClientResult, InteractionMeta, Reply};

use crate::args::{ArgumentSchema, CommandArgs};
use crate::context::{AutocompleteContext, ContextPayload, HandlerContext, SlashContext};
use crate::error::DecodeResult;

/// A type alias for a boxed, pinned future that is `Send`.
pub type BoxFuture<'a, T> = Pin<Box<dyn Future<Output = T> + Send + 'a>>;

// ============================================================================
// Responder / HandlerResponse
// ============================================================================

/// Answers the interaction a handler was invoked for.
#[derive(Clone)]
pub struct Responder {
    client: BoxedClient,
    meta: Option<InteractionMeta>,
}

impl Responder {
    pub fn new(client: BoxedClient, meta: Option<InteractionMeta>) -> Self {
        Self { client, meta }
    }

    pub fn meta(&self) -> Option<&InteractionMeta> {
        self.meta.as_ref()
    }

    pub async fn reply(&self, reply: Reply) -> ClientResult<()> {
        match &self.meta {
            Some(meta) => self.client.respond(meta, reply).await,
            None => {
                warn!(content = %reply.content, "Reply from an event handler ignored");
                Ok(())
            }
        }
    }
}

/// Values a handler may return.
#[async_trait]
pub trait HandlerResponse: Send {
    async fn into_response(self, responder: &Responder);
}

/// No response.
#[async_trait]
impl HandlerResponse for () {
    async fn into_response(self, _responder: &Responder) {}
}

/// Sends the reply.
#[async_trait]
impl HandlerResponse for Reply {
    async fn into_response(self, responder: &Responder) {
        if let Err(e) = responder.reply(self).await {
            error!("Failed to send reply: {e}");
        }
    }
}

/// Sends the text as a reply.
#[async_trait]
impl HandlerResponse for String {
    async fn into_response(self, responder: &Responder) {
        Reply::new(self).into_response(responder).await;
    }
}

#[async_trait]
impl HandlerResponse for &'static str {
    async fn into_response(self, responder: &Responder) {
        Reply::new(self).into_response(responder).await;
    }
}

/// On `Some`, the inner value is handled. On `None`, nothing happens.
#[async_trait]
impl<T: HandlerResponse> HandlerResponse for Option<T> {
    async fn into_response(self, responder: &Responder) {
        if let Some(t) = self {
            t.into_response(responder).await;
        }
    }
}

/// On `Ok`, the inner value is handled. On `Err`, the error is logged.
#[async_trait]
impl<T: HandlerResponse, E: Display + Send> HandlerResponse for Result<T, E> {
    async fn into_response(self, responder: &Responder) {
        match self {
            Ok(t) => t.into_response(responder).await,
            Err(e) => {
                error!("Handler error: {e}");
            }
        }
    }
}

// ============================================================================
// Handler Trait
// ============================================================================

/// An async function taking the input tuple `I`.
///
/// Implemented for functions of one or two parameters whose first parameter
/// is a [`HandlerContext`] and whose output implements [`HandlerResponse`].
pub trait Handler<I>: Clone + Send + Sync + 'static {
    fn call(self, input: I) -> BoxFuture<'static, ()>;
}

macro_rules! impl_handler {
    (
        $($ty:ident),*
    ) => {
        #[allow(non_snake_case)]
        impl<F, Fut, Res, P, $($ty,)*> Handler<(HandlerContext<P>, $($ty,)*)> for F
        where
            F: FnOnce(HandlerContext<P>, $($ty,)*) -> Fut + Clone + Send + Sync + 'static,
            Fut: Future<Output = Res> + Send + 'static,
            Res: HandlerResponse + 'static,
            P: ContextPayload,
            $( $ty: Send + 'static, )*
        {
            fn call(self, (ctx, $($ty,)*): (HandlerContext<P>, $($ty,)*)) -> BoxFuture<'static, ()> {
                Box::pin(async move {
                    let responder = ctx.responder();
                    let res = (self)(ctx, $($ty,)*).await;
                    res.into_response(&responder).await;
                })
            }
        }
    };
}

impl_handler!();
impl_handler!(T1);

// ============================================================================
// Type erasure
// ============================================================================

/// A wrapper that stores a handler function behind [`ErasedHandler`].
pub struct HandlerFn<F, I> {
    f: F,
    _marker: PhantomData<fn(I)>,
}

impl<F, I> HandlerFn<F, I> {
    pub fn new(f: F) -> Self {
        Self {
            f,
            _marker: PhantomData,
        }
    }
}

impl<F: Clone, I> Clone for HandlerFn<F, I> {
    fn clone(&self) -> Self {
        Self::new(self.f.clone())
    }
}

/// Type-erased handler trait for dynamic dispatch.
pub trait ErasedHandler<I>: Send + Sync {
    fn call(&self, input: I) -> BoxFuture<'static, ()>;
}

impl<F, I> ErasedHandler<I> for HandlerFn<F, I>
where
    F: Handler<I>,
{
    fn call(&self, input: I) -> BoxFuture<'static, ()> {
        self.f.clone().call(input)
    }
}

/// A type-erased handler that can be stored in collections.
pub type BoxedHandler<I> = Arc<dyn ErasedHandler<I>>;

/// Convert a handler function into a boxed handler.
pub fn into_handler<F, I>(f: F) -> BoxedHandler<I>
where
    F: Handler<I>,
    I: 'static,
{
    Arc::new(HandlerFn::new(f))
}

// ============================================================================
// Slash command handlers
// ============================================================================

/// Decodes options with the command's schema and returns the handler future.
pub type SlashInvoker =
    Arc<dyn Fn(SlashContext, &ArgumentSchema) -> DecodeResult<BoxFuture<'static, ()>> + Send + Sync>;

/// A slash command handler, with or without typed arguments.
///
/// `M` only disambiguates the two shapes: `async fn(SlashContext)` and
/// `async fn(SlashContext, A)` where `A: CommandArgs`.
pub trait SlashHandler<M>: Send + Sync + 'static {
    /// The argument record the handler takes, `()` for none.
    type Args: CommandArgs;

    fn into_invoker(self) -> SlashInvoker;
}

impl<F> SlashHandler<()> for F
where
    F: Handler<(SlashContext,)>,
{
    type Args = ();

    fn into_invoker(self) -> SlashInvoker {
        let handler = into_handler::<F, (SlashContext,)>(self);
        Arc::new(
            move |ctx: SlashContext, _schema: &ArgumentSchema| -> DecodeResult<BoxFuture<'static, ()>> {
                Ok(handler.call((ctx,)))
            },
        )
    }
}

impl<F, A> SlashHandler<(A,)> for F
where
    F: Handler<(SlashContext, A)>,
    A: CommandArgs,
{
    type Args = A;

    fn into_invoker(self) -> SlashInvoker {
        let handler = into_handler::<F, (SlashContext, A)>(self);
        Arc::new(
            move |ctx: SlashContext, schema: &ArgumentSchema| -> DecodeResult<BoxFuture<'static, ()>> {
                let args = schema.decode::<A>(&ctx.options)?;
                Ok(handler.call((ctx, args)))
            },
        )
    }
}

// ============================================================================
// Autocomplete providers
// ============================================================================

/// Supplies suggestions for one argument while the user is typing.
pub trait AutocompleteProvider: Send + Sync + 'static {
    fn suggest(&self, ctx: AutocompleteContext) -> BoxFuture<'static, Vec<Choice>>;
}

impl<F, Fut> AutocompleteProvider for F
where
    F: Fn(AutocompleteContext) -> Fut + Send + Sync + 'static,
    Fut: Future<Output = Vec<Choice>> + Send + 'static,
{
    fn suggest(&self, ctx: AutocompleteContext) -> BoxFuture<'static, Vec<Choice>> {
        Box::pin((self)(ctx))
    }
}

pub type BoxedAutocomplete = Arc<dyn AutocompleteProvider>;
