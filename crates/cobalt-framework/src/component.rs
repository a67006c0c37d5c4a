//! Prefix routing for buttons, select menus and modals.
//!
//! Component identifiers usually carry a fixed part chosen at declaration
//! time followed by a variable payload, e.g. `ticket:close:8812`. Handlers are
//! registered for a prefix, and an incoming identifier goes to the handler
//! with the longest matching prefix. The rest of the identifier is passed to
//! the handler as its payload:
//!
//! ```rust,ignore
//! let mut components = ComponentRouter::new();
//! components.button("ticket:", open_ticket)?;
//! components.button("ticket:close:", close_ticket)?;
//!
//! // "ticket:close:8812" -> close_ticket(ctx, "8812")
//! // "ticket:42"         -> open_ticket(ctx, "42")
//! ```

use cobalt_core::{BoxedClient, ComponentInteraction, ComponentKind};
use tracing::info;

use crate::context::ComponentContext;
use crate::error::{DeclarationError, DeclarationResult};
use crate::handler::{BoxFuture, BoxedHandler, Handler, into_handler};

/// A component handler: context plus the identifier remainder.
pub type ComponentHandler = BoxedHandler<(ComponentContext, String)>;

/// Prefixes of one namespace, kept sorted by descending length.
#[derive(Clone)]
pub struct PrefixTable<H> {
    entries: Vec<(String, H)>,
}

impl<H> Default for PrefixTable<H> {
    fn default() -> Self {
        Self {
            entries: Vec::new(),
        }
    }
}

impl<H> PrefixTable<H> {
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a prefix. Equal-length prefixes keep registration order.
    pub fn insert(
        &mut self,
        namespace: &'static str,
        prefix: impl Into<String>,
        handler: H,
    ) -> DeclarationResult<()> {
        let prefix = prefix.into();
        if self.entries.iter().any(|(p, _)| *p == prefix) {
            return Err(DeclarationError::DuplicatePrefix { namespace, prefix });
        }

        let at = self
            .entries
            .partition_point(|(p, _)| p.len() >= prefix.len());
        self.entries.insert(at, (prefix, handler));
        Ok(())
    }

    /// Finds the longest prefix of `id` and returns its handler and the
    /// remainder of `id`.
    pub fn find<'a>(&self, id: &'a str) -> Option<(&H, &'a str)> {
        self.entries
            .iter()
            .find_map(|(prefix, handler)| id.strip_prefix(prefix.as_str()).map(|rest| (handler, rest)))
    }

    pub fn prefixes(&self) -> impl Iterator<Item = &str> {
        self.entries.iter().map(|(p, _)| p.as_str())
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// Routes component interactions by identifier prefix.
#[derive(Clone, Default)]
pub struct ComponentRouter {
    buttons: PrefixTable<ComponentHandler>,
    select_menus: PrefixTable<ComponentHandler>,
    modals: PrefixTable<ComponentHandler>,
}

impl ComponentRouter {
    pub fn new() -> Self {
        Self::default()
    }

    fn table(&self, kind: ComponentKind) -> &PrefixTable<ComponentHandler> {
        match kind {
            ComponentKind::Button => &self.buttons,
            ComponentKind::SelectMenu => &self.select_menus,
            ComponentKind::Modal => &self.modals,
        }
    }

    /// Registers `handler` for identifiers of `kind` starting with `prefix`.
    pub fn on<F>(
        &mut self,
        kind: ComponentKind,
        prefix: impl Into<String>,
        handler: F,
    ) -> DeclarationResult<&mut Self>
    where
        F: Handler<(ComponentContext, String)>,
    {
        let prefix = prefix.into();
        let table = match kind {
            ComponentKind::Button => &mut self.buttons,
            ComponentKind::SelectMenu => &mut self.select_menus,
            ComponentKind::Modal => &mut self.modals,
        };
        table.insert(kind.as_str(), prefix.clone(), into_handler(handler))?;
        info!(kind = kind.as_str(), prefix = %prefix, "Registered component handler");
        Ok(self)
    }

    pub fn button<F>(&mut self, prefix: impl Into<String>, handler: F) -> DeclarationResult<&mut Self>
    where
        F: Handler<(ComponentContext, String)>,
    {
        self.on(ComponentKind::Button, prefix, handler)
    }

    pub fn select_menu<F>(
        &mut self,
        prefix: impl Into<String>,
        handler: F,
    ) -> DeclarationResult<&mut Self>
    where
        F: Handler<(ComponentContext, String)>,
    {
        self.on(ComponentKind::SelectMenu, prefix, handler)
    }

    pub fn modal<F>(&mut self, prefix: impl Into<String>, handler: F) -> DeclarationResult<&mut Self>
    where
        F: Handler<(ComponentContext, String)>,
    {
        self.on(ComponentKind::Modal, prefix, handler)
    }

    /// Resolves the handler for `custom_id` in the `kind` namespace.
    pub fn route<'a>(
        &self,
        kind: ComponentKind,
        custom_id: &'a str,
    ) -> Option<(&ComponentHandler, &'a str)> {
        self.table(kind).find(custom_id)
    }

    /// Builds the handler future for `interaction`, or `None` if no prefix
    /// matches.
    pub fn handle(
        &self,
        interaction: ComponentInteraction,
        client: BoxedClient,
    ) -> Option<BoxFuture<'static, ()>> {
        let (handler, rest) = self.route(interaction.kind, &interaction.custom_id)?;
        let (handler, rest) = (handler.clone(), rest.to_string());
        Some(handler.call((ComponentContext::new(interaction, client), rest)))
    }

    pub fn len(&self) -> usize {
        self.buttons.len() + self.select_menus.len() + self.modals.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl std::fmt::Debug for ComponentRouter {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ComponentRouter")
            .field("buttons", &self.buttons.prefixes().collect::<Vec<_>>())
            .field("select_menus", &self.select_menus.prefixes().collect::<Vec<_>>())
            .field("modals", &self.modals.prefixes().collect::<Vec<_>>())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use cobalt_core::testing::RecordingClient;
    use cobalt_core::{InteractionId, InteractionMeta, InteractionToken, UserId};

    fn component(kind: ComponentKind, id: &str) -> ComponentInteraction {
        ComponentInteraction::new(
            InteractionMeta::new(InteractionId(1), InteractionToken::new("t"), UserId(1)),
            kind,
            id,
        )
    }

    #[test]
    fn test_longest_prefix_wins() {
        let mut table = PrefixTable::new();
        table.insert("button", "a:", "short").unwrap();
        table.insert("button", "a:b:", "long").unwrap();

        assert_eq!(table.find("a:b:123"), Some((&"long", "123")));
        assert_eq!(table.find("a:c"), Some((&"short", "c")));
        assert_eq!(table.find("b:"), None);
    }

    #[test]
    fn test_order_independent_of_registration() {
        let mut table = PrefixTable::new();
        table.insert("button", "a:b:", "long").unwrap();
        table.insert("button", "a:", "short").unwrap();
        table.insert("button", "zz", "tie").unwrap();

        assert_eq!(table.prefixes().collect::<Vec<_>>(), vec!["a:b:", "a:", "zz"]);
        assert_eq!(table.find("a:b:"), Some((&"long", "")));
    }

    #[test]
    fn test_duplicate_prefix_rejected() {
        let mut table = PrefixTable::new();
        table.insert("modal", "x", 1).unwrap();
        assert_eq!(
            table.insert("modal", "x", 2),
            Err(DeclarationError::DuplicatePrefix {
                namespace: "modal",
                prefix: "x".into(),
            })
        );
    }

    #[tokio::test]
    async fn test_namespaces_are_independent() {
        let client = RecordingClient::new();
        let mut router = ComponentRouter::new();
        router
            .button("vote:", |_ctx: ComponentContext, rest: String| async move {
                format!("button {rest}")
            })
            .unwrap()
            .modal("vote:", |ctx: ComponentContext, rest: String| async move {
                format!("modal {rest} {}", ctx.field("reason").unwrap_or_default())
            })
            .unwrap();

        assert!(router.route(ComponentKind::SelectMenu, "vote:1").is_none());

        router
            .handle(component(ComponentKind::Button, "vote:7"), client.boxed())
            .unwrap()
            .await;

        let mut submit = component(ComponentKind::Modal, "vote:8");
        submit.fields.push(cobalt_core::ModalField {
            custom_id: "reason".into(),
            value: "spam".into(),
        });
        router.handle(submit, client.boxed()).unwrap().await;

        assert_eq!(
            client.replies(),
            vec!["button 7".to_string(), "modal 8 spam".to_string()]
        );
    }

    #[test]
    fn test_unmatched_is_dropped() {
        let client = RecordingClient::new();
        let router = ComponentRouter::new();
        assert!(
            router
                .handle(component(ComponentKind::Button, "nope"), client.boxed())
                .is_none()
        );
    }
}
