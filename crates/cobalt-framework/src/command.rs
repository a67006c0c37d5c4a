//! Command declarations and the command tree router.
//!
//! Slash commands are declared with [`SlashCommand`] builders and compiled
//! into [`CommandNode`]s when registered. A top-level command is either a
//! leaf with a handler or a container of sub-commands and sub-command
//! groups:
//!
//! ```text
//! /admin                      container
//! ├── ban <user> [reason]     sub-command
//! └── roles                   group
//!     ├── add <role>          sub-command
//!     └── remove <role>       sub-command
//! ```
//!
//! ```rust,ignore
//! registry.register(
//!     SlashCommand::container("admin", "Administration")
//!         .subcommand(SlashCommand::new("ban", "Ban a user").handler(ban))
//!         .group(
//!             SubcommandGroup::new("roles", "Role tools")
//!                 .subcommand(SlashCommand::new("add", "Add a role").handler(add_role))
//!                 .subcommand(SlashCommand::new("remove", "Remove a role").handler(remove_role)),
//!         ),
//! )?;
//! ```
//!
//! User and message context actions ([`UserCommand`], [`MessageCommand`]) are
//! routed by name only.

use std::collections::HashMap;
use std::sync::Arc;

use tracing::{info, warn};

use cobalt_core::CommandPath;

use crate::args::{
    ArgumentSchema, MAX_NAME_LEN, MAX_OPTIONS, derive, validate_description,
    validate_name,
};
use crate::context::{MessageContext, SlashContext, UserContext};
use crate::error::{DeclarationError, DeclarationResult, DecodeResult, DispatchError};
use crate::handler::{
    AutocompleteProvider, BoxFuture, BoxedAutocomplete, BoxedHandler, Handler, SlashHandler,
    SlashInvoker, into_handler,
};

// ============================================================================
// Builders
// ============================================================================

/// Declaration of a slash command or sub-command.
pub struct SlashCommand {
    name: String,
    description: String,
    invoker: Option<SlashInvoker>,
    schema: Arc<ArgumentSchema>,
    threaded: bool,
    autocomplete: Vec<(String, BoxedAutocomplete)>,
    subcommands: Vec<SlashCommand>,
    groups: Vec<SubcommandGroup>,
    error: Option<DeclarationError>,
}

impl SlashCommand {
    /// Declares a command. Attach a handler with [`handler`](Self::handler).
    pub fn new(name: impl Into<String>, description: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            description: description.into(),
            invoker: None,
            schema: Arc::default(),
            threaded: false,
            autocomplete: Vec::new(),
            subcommands: Vec::new(),
            groups: Vec::new(),
            error: None,
        }
    }

    /// Declares a command that only holds sub-commands and groups.
    pub fn container(name: impl Into<String>, description: impl Into<String>) -> Self {
        Self::new(name, description)
    }

    /// Sets the handler; its argument type decides the command's options.
    pub fn handler<H, M>(mut self, handler: H) -> Self
    where
        H: SlashHandler<M>,
    {
        match derive::<H::Args>() {
            Ok(schema) => self.schema = schema,
            Err(e) => self.fail(e),
        }
        self.invoker = Some(handler.into_invoker());
        self
    }

    /// Runs the handler on the worker pool instead of the dispatching task.
    pub fn threaded(mut self, threaded: bool) -> Self {
        self.threaded = threaded;
        self
    }

    /// Attaches a suggestion provider to the argument named `field`.
    pub fn autocomplete<P>(mut self, field: impl Into<String>, provider: P) -> Self
    where
        P: AutocompleteProvider,
    {
        self.autocomplete.push((field.into(), Arc::new(provider)));
        self
    }

    pub fn subcommand(mut self, subcommand: SlashCommand) -> Self {
        self.subcommands.push(subcommand);
        self
    }

    pub fn group(mut self, group: SubcommandGroup) -> Self {
        self.groups.push(group);
        self
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    fn fail(&mut self, error: DeclarationError) {
        self.error.get_or_insert(error);
    }

    fn compile(self, nested: bool) -> DeclarationResult<CommandNode> {
        if let Some(error) = self.error {
            return Err(error);
        }
        validate_name(&self.name)?;
        validate_description(&self.name, &self.description)?;

        let has_children = !self.subcommands.is_empty() || !self.groups.is_empty();
        if nested && has_children {
            return Err(DeclarationError::NestingTooDeep { command: self.name });
        }
        match (self.invoker.is_some(), has_children) {
            (true, true) => return Err(DeclarationError::HandlerOnContainer { command: self.name }),
            (false, false) => return Err(DeclarationError::MissingHandler { command: self.name }),
            _ => {}
        }

        let child_count = self.subcommands.len() + self.groups.len();
        if child_count > MAX_OPTIONS {
            return Err(DeclarationError::TooManyOptions {
                owner: self.name,
                count: child_count,
                max: MAX_OPTIONS,
            });
        }
        check_unique(
            &self.name,
            self.subcommands
                .iter()
                .map(SlashCommand::name)
                .chain(self.groups.iter().map(SubcommandGroup::name)),
        )?;

        let mut autocomplete = HashMap::with_capacity(self.autocomplete.len());
        for (field, provider) in self.autocomplete {
            if autocomplete.insert(field.clone(), provider).is_some() {
                return Err(DeclarationError::DuplicateName {
                    scope: format!("autocomplete providers of '{}'", self.name),
                    name: field,
                });
            }
        }
        let schema = if autocomplete.is_empty() {
            self.schema
        } else {
            Arc::new(
                self.schema
                    .with_autocomplete(&self.name, autocomplete.keys().map(String::as_str))?,
            )
        };

        let subcommands = self
            .subcommands
            .into_iter()
            .map(|sub| sub.compile(true))
            .collect::<DeclarationResult<Vec<_>>>()?;
        let groups = self
            .groups
            .into_iter()
            .map(SubcommandGroup::compile)
            .collect::<DeclarationResult<Vec<_>>>()?;

        Ok(CommandNode {
            name: self.name,
            description: self.description,
            invoker: self.invoker,
            schema,
            threaded: self.threaded,
            autocomplete,
            subcommands,
            groups,
        })
    }
}

impl std::fmt::Debug for SlashCommand {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SlashCommand")
            .field("name", &self.name)
            .field("has_handler", &self.invoker.is_some())
            .field("subcommands", &self.subcommands)
            .field("groups", &self.groups)
            .finish_non_exhaustive()
    }
}

/// Declaration of a sub-command group.
#[derive(Debug)]
pub struct SubcommandGroup {
    name: String,
    description: String,
    subcommands: Vec<SlashCommand>,
}

impl SubcommandGroup {
    pub fn new(name: impl Into<String>, description: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            description: description.into(),
            subcommands: Vec::new(),
        }
    }

    pub fn subcommand(mut self, subcommand: SlashCommand) -> Self {
        self.subcommands.push(subcommand);
        self
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    fn compile(self) -> DeclarationResult<GroupNode> {
        validate_name(&self.name)?;
        validate_description(&self.name, &self.description)?;
        if self.subcommands.is_empty() {
            return Err(DeclarationError::EmptyGroup { group: self.name });
        }
        if self.subcommands.len() > MAX_OPTIONS {
            return Err(DeclarationError::TooManyOptions {
                owner: self.name,
                count: self.subcommands.len(),
                max: MAX_OPTIONS,
            });
        }
        check_unique(&self.name, self.subcommands.iter().map(SlashCommand::name))?;

        let subcommands = self
            .subcommands
            .into_iter()
            .map(|sub| sub.compile(true))
            .collect::<DeclarationResult<Vec<_>>>()?;
        Ok(GroupNode {
            name: self.name,
            description: self.description,
            subcommands,
        })
    }
}

fn check_unique<'a>(scope: &str, names: impl Iterator<Item = &'a str>) -> DeclarationResult<()> {
    let mut seen = Vec::new();
    for name in names {
        if seen.contains(&name) {
            return Err(DeclarationError::DuplicateName {
                scope: format!("'{scope}'"),
                name: name.to_string(),
            });
        }
        seen.push(name);
    }
    Ok(())
}

// ============================================================================
// Compiled tree
// ============================================================================

/// A compiled slash command or sub-command.
pub struct CommandNode {
    name: String,
    description: String,
    invoker: Option<SlashInvoker>,
    schema: Arc<ArgumentSchema>,
    threaded: bool,
    autocomplete: HashMap<String, BoxedAutocomplete>,
    subcommands: Vec<CommandNode>,
    groups: Vec<GroupNode>,
}

impl CommandNode {
    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn description(&self) -> &str {
        &self.description
    }

    pub fn schema(&self) -> &ArgumentSchema {
        &self.schema
    }

    pub fn is_threaded(&self) -> bool {
        self.threaded
    }

    /// Returns `true` if the node has a handler.
    pub fn is_invocable(&self) -> bool {
        self.invoker.is_some()
    }

    pub fn subcommands(&self) -> &[CommandNode] {
        &self.subcommands
    }

    pub fn groups(&self) -> &[GroupNode] {
        &self.groups
    }

    pub fn subcommand(&self, name: &str) -> Option<&CommandNode> {
        self.subcommands.iter().find(|s| s.name == name)
    }

    pub fn group(&self, name: &str) -> Option<&GroupNode> {
        self.groups.iter().find(|g| g.name == name)
    }

    pub fn autocomplete_provider(&self, field: &str) -> Option<&BoxedAutocomplete> {
        self.autocomplete.get(field)
    }

    /// Decodes the invocation's options and returns the handler future.
    ///
    /// Returns `None` for a container.
    pub fn invoke(&self, ctx: SlashContext) -> Option<DecodeResult<BoxFuture<'static, ()>>> {
        self.invoker
            .as_ref()
            .map(|invoker| invoker(ctx, &*self.schema))
    }
}

impl std::fmt::Debug for CommandNode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CommandNode")
            .field("name", &self.name)
            .field("threaded", &self.threaded)
            .field("arguments", &self.schema.len())
            .field("subcommands", &self.subcommands)
            .field("groups", &self.groups)
            .finish_non_exhaustive()
    }
}

/// A compiled sub-command group.
#[derive(Debug)]
pub struct GroupNode {
    name: String,
    description: String,
    subcommands: Vec<CommandNode>,
}

impl GroupNode {
    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn description(&self) -> &str {
        &self.description
    }

    pub fn subcommands(&self) -> &[CommandNode] {
        &self.subcommands
    }

    pub fn subcommand(&self, name: &str) -> Option<&CommandNode> {
        self.subcommands.iter().find(|s| s.name == name)
    }
}

// ============================================================================
// Context-menu commands
// ============================================================================

fn validate_context_name(name: &str) -> DeclarationResult<()> {
    let invalid = |reason| DeclarationError::InvalidName {
        name: name.to_string(),
        reason,
    };
    if name.trim().is_empty() {
        return Err(invalid("name is empty"));
    }
    if name.chars().count() > MAX_NAME_LEN {
        return Err(invalid("name is longer than 32 characters"));
    }
    Ok(())
}

macro_rules! context_command {
    ($(#[$doc:meta])* $name:ident, $ctx:ty) => {
        $(#[$doc])*
        #[derive(Clone)]
        pub struct $name {
            name: String,
            handler: BoxedHandler<($ctx,)>,
        }

        impl $name {
            /// Context-menu names may contain spaces and capitals.
            pub fn new<F>(name: impl Into<String>, handler: F) -> Self
            where
                F: Handler<($ctx,)>,
            {
                Self {
                    name: name.into(),
                    handler: into_handler(handler),
                }
            }

            pub fn name(&self) -> &str {
                &self.name
            }

            pub fn handler(&self) -> &BoxedHandler<($ctx,)> {
                &self.handler
            }
        }

        impl std::fmt::Debug for $name {
            fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                f.debug_struct(stringify!($name))
                    .field("name", &self.name)
                    .finish_non_exhaustive()
            }
        }
    };
}

context_command!(
    /// A context-menu action on a user.
    UserCommand,
    UserContext
);
context_command!(
    /// A context-menu action on a message.
    MessageCommand,
    MessageContext
);

// ============================================================================
// Registry
// ============================================================================

/// All registered commands, built during setup and read-only afterwards.
#[derive(Default)]
pub struct CommandRegistry {
    slash: Vec<CommandNode>,
    index: HashMap<String, usize>,
    user: Vec<UserCommand>,
    message: Vec<MessageCommand>,
}

impl CommandRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Compiles and registers a slash command.
    ///
    /// Fails if the declaration is invalid or the name is already taken.
    pub fn register(&mut self, command: SlashCommand) -> DeclarationResult<&mut Self> {
        let node = command.compile(false)?;
        if self.index.contains_key(&node.name) {
            return Err(DeclarationError::DuplicateName {
                scope: "slash commands".to_string(),
                name: node.name,
            });
        }
        info!(command = %node.name, "Registered slash command");
        self.index.insert(node.name.clone(), self.slash.len());
        self.slash.push(node);
        Ok(self)
    }

    /// Compiles and registers a slash command, replacing any command with
    /// the same name. Returns the replaced command.
    pub fn replace(&mut self, command: SlashCommand) -> DeclarationResult<Option<CommandNode>> {
        let node = command.compile(false)?;
        match self.index.get(&node.name) {
            Some(&at) => {
                warn!(command = %node.name, "Replacing registered slash command");
                Ok(Some(std::mem::replace(&mut self.slash[at], node)))
            }
            None => {
                self.index.insert(node.name.clone(), self.slash.len());
                self.slash.push(node);
                Ok(None)
            }
        }
    }

    pub fn register_user(&mut self, command: UserCommand) -> DeclarationResult<&mut Self> {
        validate_context_name(&command.name)?;
        if self.user.iter().any(|c| c.name == command.name) {
            return Err(DeclarationError::DuplicateName {
                scope: "user commands".to_string(),
                name: command.name,
            });
        }
        info!(command = %command.name, "Registered user command");
        self.user.push(command);
        Ok(self)
    }

    pub fn register_message(&mut self, command: MessageCommand) -> DeclarationResult<&mut Self> {
        validate_context_name(&command.name)?;
        if self.message.iter().any(|c| c.name == command.name) {
            return Err(DeclarationError::DuplicateName {
                scope: "message commands".to_string(),
                name: command.name,
            });
        }
        info!(command = %command.name, "Registered message command");
        self.message.push(command);
        Ok(self)
    }

    pub fn get(&self, name: &str) -> Option<&CommandNode> {
        self.index.get(name).map(|&at| &self.slash[at])
    }

    /// Resolves the node an invocation targets.
    ///
    /// | group | sub-command | resolves to                          |
    /// |-------|-------------|--------------------------------------|
    /// | -     | -           | the top-level command                |
    /// | -     | `s`         | sub-command `s`                      |
    /// | `g`   | `s`         | sub-command `s` of group `g`         |
    /// | `g`   | -           | nothing                              |
    ///
    /// Containers are never returned.
    pub fn route(&self, path: &CommandPath) -> Option<&CommandNode> {
        let root = self.get(&path.name)?;
        let node = match (path.group.as_deref(), path.subcommand.as_deref()) {
            (None, None) => root,
            (None, Some(sub)) => root.subcommand(sub)?,
            (Some(group), Some(sub)) => root.group(group)?.subcommand(sub)?,
            (Some(_), None) => return None,
        };
        node.is_invocable().then_some(node)
    }

    /// Resolves the suggestion provider for `field` of the invoked command.
    ///
    /// An unknown command is `Ok(None)`. A known command without a provider
    /// for `field` is an error: the published schema only enables
    /// autocomplete where a provider exists.
    pub fn route_autocomplete(
        &self,
        path: &CommandPath,
        field: &str,
    ) -> Result<Option<&BoxedAutocomplete>, DispatchError> {
        let Some(node) = self.route(path) else {
            return Ok(None);
        };
        node.autocomplete_provider(field)
            .map(Some)
            .ok_or_else(|| DispatchError::MissingAutocompleteProvider {
                command: path.to_string(),
                field: field.to_string(),
            })
    }

    pub fn route_user(&self, name: &str) -> Option<&UserCommand> {
        self.user.iter().find(|c| c.name == name)
    }

    pub fn route_message(&self, name: &str) -> Option<&MessageCommand> {
        self.message.iter().find(|c| c.name == name)
    }

    /// Slash commands in registration order.
    pub fn slash_commands(&self) -> impl Iterator<Item = &CommandNode> {
        self.slash.iter()
    }

    pub fn user_commands(&self) -> impl Iterator<Item = &UserCommand> {
        self.user.iter()
    }

    pub fn message_commands(&self) -> impl Iterator<Item = &MessageCommand> {
        self.message.iter()
    }

    pub fn len(&self) -> usize {
        self.slash.len() + self.user.len() + self.message.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl std::fmt::Debug for CommandRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CommandRegistry")
            .field("slash", &self.slash)
            .field("user", &self.user)
            .field("message", &self.message)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use cobalt_core::testing::RecordingClient;
    use cobalt_core::{
        Choice, CommandInteraction, InteractionId, InteractionMeta, InteractionToken, OptionValue,
        RawOption, UserId,
    };

    use crate::args::{ArgsDeclaration, CommandArgs, OptionReader};
    use crate::context::AutocompleteContext;
    use crate::error::DecodeError;

    async fn ok(_ctx: SlashContext) -> &'static str {
        "ok"
    }

    async fn suggest(_ctx: AutocompleteContext) -> Vec<Choice> {
        vec![Choice::new("rust", "rust")]
    }

    #[derive(Debug, PartialEq)]
    struct Query {
        query: String,
    }

    impl CommandArgs for Query {
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

    async fn search(_ctx: SlashContext, args: Query) -> String {
        format!("searching {}", args.query)
    }

    fn three_level(group: bool, sub: bool) -> SlashCommand {
        let mut roles = SubcommandGroup::new("g", "group")
            .subcommand(SlashCommand::new("other", "other").handler(ok));
        if sub {
            roles = roles.subcommand(SlashCommand::new("s", "sub").handler(ok));
        }
        let root = SlashCommand::container("c", "command")
            .subcommand(SlashCommand::new("direct", "direct").handler(ok));
        if group { root.group(roles) } else { root }
    }

    fn invocation(path: CommandPath, options: Vec<RawOption>) -> CommandInteraction {
        CommandInteraction {
            meta: InteractionMeta::new(InteractionId(1), InteractionToken::new("t"), UserId(1)),
            path,
            options,
        }
    }

    #[test]
    fn test_three_level_route_requires_every_level() {
        let path = CommandPath::new("c").group("g").subcommand("s");

        let mut full = CommandRegistry::new();
        full.register(three_level(true, true)).unwrap();
        assert_eq!(full.route(&path).map(CommandNode::name), Some("s"));

        let mut no_group = CommandRegistry::new();
        no_group.register(three_level(false, true)).unwrap();
        assert!(no_group.route(&path).is_none());

        let mut no_sub = CommandRegistry::new();
        no_sub.register(three_level(true, false)).unwrap();
        assert!(no_sub.route(&path).is_none());

        assert!(CommandRegistry::new().route(&path).is_none());
    }

    #[test]
    fn test_route_shapes() {
        let mut registry = CommandRegistry::new();
        registry
            .register(three_level(true, true))
            .unwrap()
            .register(SlashCommand::new("ping", "Ping").handler(ok))
            .unwrap();

        assert_eq!(
            registry.route(&CommandPath::new("ping")).map(CommandNode::name),
            Some("ping")
        );
        assert_eq!(
            registry
                .route(&CommandPath::new("c").subcommand("direct"))
                .map(CommandNode::name),
            Some("direct")
        );
        // containers and groups are not invocable
        assert!(registry.route(&CommandPath::new("c")).is_none());
        assert!(registry.route(&CommandPath::new("c").group("g")).is_none());
        // a grouped sub-command is not reachable without its group
        assert!(registry.route(&CommandPath::new("c").subcommand("s")).is_none());
        assert!(registry.route(&CommandPath::new("ping").subcommand("x")).is_none());
    }

    #[test]
    fn test_duplicate_registration_rejected() {
        let mut registry = CommandRegistry::new();
        registry
            .register(SlashCommand::new("ping", "Ping").handler(ok))
            .unwrap();
        let err = registry
            .register(SlashCommand::new("ping", "Ping again").handler(ok))
            .unwrap_err();
        assert!(matches!(err, DeclarationError::DuplicateName { .. }));

        let previous = registry
            .replace(SlashCommand::new("ping", "Ping again").handler(ok))
            .unwrap();
        assert_eq!(previous.map(|n| n.description), Some("Ping".to_string()));
        assert_eq!(registry.get("ping").unwrap().description(), "Ping again");
        assert_eq!(registry.slash_commands().count(), 1);
    }

    #[test]
    fn test_duplicate_sibling_rejected() {
        let command = SlashCommand::container("c", "command")
            .subcommand(SlashCommand::new("x", "one").handler(ok))
            .group(SubcommandGroup::new("x", "two").subcommand(SlashCommand::new("y", "y").handler(ok)));
        let err = CommandRegistry::new().register(command).unwrap_err();
        assert_eq!(
            err,
            DeclarationError::DuplicateName {
                scope: "'c'".into(),
                name: "x".into(),
            }
        );
    }

    #[test]
    fn test_structure_validation() {
        let mut registry = CommandRegistry::new();

        let err = registry.register(SlashCommand::new("empty", "Nothing")).unwrap_err();
        assert!(matches!(err, DeclarationError::MissingHandler { .. }));

        let err = registry
            .register(
                SlashCommand::new("both", "Both")
                    .handler(ok)
                    .subcommand(SlashCommand::new("x", "x").handler(ok)),
            )
            .unwrap_err();
        assert!(matches!(err, DeclarationError::HandlerOnContainer { .. }));

        let nested = SlashCommand::container("deep", "Deep").subcommand(
            SlashCommand::container("mid", "Mid")
                .subcommand(SlashCommand::new("leaf", "Leaf").handler(ok)),
        );
        let err = registry.register(nested).unwrap_err();
        assert!(matches!(err, DeclarationError::NestingTooDeep { .. }));

        let err = registry
            .register(SlashCommand::new("ping", "").handler(ok))
            .unwrap_err();
        assert!(matches!(err, DeclarationError::EmptyDescription { .. }));
        assert!(registry.is_empty());
    }

    #[test]
    fn test_empty_group_is_named() {
        let mut registry = CommandRegistry::new();
        let err = registry
            .register(
                SlashCommand::container("admin", "Admin tools")
                    .group(SubcommandGroup::new("roles", "Role tools")),
            )
            .unwrap_err();
        assert_eq!(
            err,
            DeclarationError::EmptyGroup {
                group: "roles".into()
            }
        );
        assert_eq!(err.to_string(), "group 'roles' has no sub-commands");
    }

    #[test]
    fn test_autocomplete_routing() {
        let mut registry = CommandRegistry::new();
        registry
            .register(
                SlashCommand::new("search", "Search")
                    .handler(search)
                    .autocomplete("query", suggest),
            )
            .unwrap();

        let node = registry.get("search").unwrap();
        assert!(node.schema().get("query").unwrap().autocomplete);

        let path = CommandPath::new("search");
        assert!(registry.route_autocomplete(&path, "query").unwrap().is_some());
        assert!(matches!(
            registry.route_autocomplete(&path, "other"),
            Err(DispatchError::MissingAutocompleteProvider { .. })
        ));
        assert!(
            registry
                .route_autocomplete(&CommandPath::new("unknown"), "query")
                .unwrap()
                .is_none()
        );
    }

    #[test]
    fn test_autocomplete_for_unknown_field_rejected() {
        let err = CommandRegistry::new()
            .register(
                SlashCommand::new("search", "Search")
                    .handler(search)
                    .autocomplete("missing", suggest),
            )
            .unwrap_err();
        assert!(matches!(err, DeclarationError::UnknownAutocompleteField { .. }));
    }

    #[tokio::test]
    async fn test_invoke_decodes_arguments() {
        let client = RecordingClient::new();
        let mut registry = CommandRegistry::new();
        registry
            .register(SlashCommand::new("search", "Search").handler(search))
            .unwrap();
        let node = registry.route(&CommandPath::new("search")).unwrap();

        let ctx = SlashContext::new(
            invocation(
                CommandPath::new("search"),
                vec![RawOption::new("query", OptionValue::String("abc".into()))],
            ),
            client.boxed(),
        );
        node.invoke(ctx).unwrap().unwrap().await;
        assert_eq!(client.replies(), vec!["searching abc".to_string()]);

        let empty = SlashContext::new(invocation(CommandPath::new("search"), Vec::new()), client.boxed());
        assert!(matches!(
            node.invoke(empty),
            Some(Err(DecodeError::MissingRequired { .. }))
        ));
    }

    #[test]
    fn test_context_commands() {
        let mut registry = CommandRegistry::new();
        registry
            .register_user(UserCommand::new("Say Hi", |_ctx: UserContext| async {}))
            .unwrap()
            .register_message(MessageCommand::new("Quote", |_ctx: MessageContext| async {}))
            .unwrap();

        assert!(registry.route_user("Say Hi").is_some());
        assert!(registry.route_user("Quote").is_none());
        assert!(registry.route_message("Quote").is_some());
        assert!(
            registry
                .register_user(UserCommand::new("Say Hi", |_ctx: UserContext| async {}))
                .is_err()
        );
        assert_eq!(registry.len(), 2);
    }
}
