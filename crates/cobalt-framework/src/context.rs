//! Handler contexts.
//!
//! Every handler receives a [`HandlerContext`] wrapping the inbound payload
//! together with the platform client it arrived on. The context dereferences
//! to the payload, so `ctx.options`, `ctx.target` or `ctx.custom_id` read
//! straight through.

use std::ops::Deref;

use cobalt_core::{
    AutocompleteInteraction, BoxedClient, ClientResult, CommandInteraction, ComponentInteraction,
    InteractionMeta, MessageCommandInteraction, PlatformEvent, Reply, UserCommandInteraction,
};

use crate::handler::Responder;

/// Payloads a handler context can carry.
pub trait ContextPayload: Send + Sync + 'static {
    /// The interaction to answer, if the payload is an interaction.
    fn interaction_meta(&self) -> Option<&InteractionMeta>;
}

macro_rules! interaction_payload {
    ($($ty:ty),*) => {
        $(
            impl ContextPayload for $ty {
                fn interaction_meta(&self) -> Option<&InteractionMeta> {
                    Some(&self.meta)
                }
            }
        )*
    };
}

interaction_payload!(
    CommandInteraction,
    AutocompleteInteraction,
    UserCommandInteraction,
    MessageCommandInteraction,
    ComponentInteraction
);

impl ContextPayload for PlatformEvent {
    fn interaction_meta(&self) -> Option<&InteractionMeta> {
        None
    }
}

/// The context handed to a handler.
#[derive(Clone)]
pub struct HandlerContext<P> {
    payload: P,
    client: BoxedClient,
}

/// Context of a slash command or sub-command handler.
pub type SlashContext = HandlerContext<CommandInteraction>;
/// Context of an autocomplete provider.
pub type AutocompleteContext = HandlerContext<AutocompleteInteraction>;
/// Context of a user-context action.
pub type UserContext = HandlerContext<UserCommandInteraction>;
/// Context of a message-context action.
pub type MessageContext = HandlerContext<MessageCommandInteraction>;
/// Context of a button, select-menu or modal handler.
pub type ComponentContext = HandlerContext<ComponentInteraction>;
/// Context of a platform event handler.
pub type EventContext = HandlerContext<PlatformEvent>;

impl<P: ContextPayload> HandlerContext<P> {
    pub fn new(payload: P, client: BoxedClient) -> Self {
        Self { payload, client }
    }

    pub fn payload(&self) -> &P {
        &self.payload
    }

    pub fn into_payload(self) -> P {
        self.payload
    }

    pub fn client(&self) -> &BoxedClient {
        &self.client
    }

    /// A handle that can answer this context's interaction later.
    pub fn responder(&self) -> Responder {
        Responder::new(
            self.client.clone(),
            self.payload.interaction_meta().cloned(),
        )
    }

    /// Answers the interaction with a text reply.
    ///
    /// Event contexts have nothing to answer; the call is logged and ignored.
    pub async fn reply(&self, reply: impl Into<Reply>) -> ClientResult<()> {
        self.responder().reply(reply.into()).await
    }
}

impl<P> Deref for HandlerContext<P> {
    type Target = P;

    fn deref(&self) -> &Self::Target {
        &self.payload
    }
}

impl<P: std::fmt::Debug> std::fmt::Debug for HandlerContext<P> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("HandlerContext")
            .field("payload", &self.payload)
            .finish_non_exhaustive()
    }
}
