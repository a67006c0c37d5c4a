//! Error types for the Cobalt framework.

use thiserror::Error;

use cobalt_core::{ClientError, OptionKind};

/// A declaration that can never be published or routed.
///
/// These are raised while commands, components and arguments are being
/// registered, before any interaction is processed.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum DeclarationError {
    /// A command, group or argument was declared without a description.
    #[error("'{name}' has an empty description")]
    EmptyDescription { name: String },

    /// A description is longer than the platform accepts.
    #[error("description of '{name}' exceeds {max} characters")]
    DescriptionTooLong { name: String, max: usize },

    /// A name the platform would reject.
    #[error("invalid name '{name}': {reason}")]
    InvalidName { name: String, reason: &'static str },

    /// Two siblings share a name.
    #[error("duplicate name '{name}' in {scope}")]
    DuplicateName { scope: String, name: String },

    /// Two static choices of one argument share a label.
    #[error("argument '{argument}' has duplicate choice label '{label}'")]
    DuplicateChoice { argument: String, label: String },

    /// More static choices than the platform accepts.
    #[error("argument '{argument}' declares {count} choices (max {max})")]
    TooManyChoices {
        argument: String,
        count: usize,
        max: usize,
    },

    /// More options, sub-commands or groups than the platform accepts.
    #[error("'{owner}' declares {count} options (max {max})")]
    TooManyOptions {
        owner: String,
        count: usize,
        max: usize,
    },

    /// Required arguments must come before optional ones.
    #[error("required argument '{argument}' is declared after an optional one")]
    RequiredAfterOptional { argument: String },

    /// Static choices and autocomplete cannot be mixed on one argument.
    #[error("argument '{argument}' has both static choices and autocomplete")]
    ChoicesWithAutocomplete { argument: String },

    /// Autocomplete was attached to an argument kind that cannot suggest values.
    #[error("argument '{argument}' of kind {kind:?} cannot autocomplete")]
    AutocompleteUnsupported { argument: String, kind: OptionKind },

    /// An autocomplete provider names an argument the command does not have.
    #[error("command '{command}' has no argument '{field}' to autocomplete")]
    UnknownAutocompleteField { command: String, field: String },

    /// A leaf command has no handler, or a container has no children.
    #[error("command '{command}' has nothing to invoke")]
    MissingHandler { command: String },

    #[error("group '{group}' has no sub-commands")]
    EmptyGroup { group: String },

    /// A command holds both a handler and sub-commands.
    #[error("command '{command}' cannot have both a handler and sub-commands")]
    HandlerOnContainer { command: String },

    /// Sub-commands may not nest further.
    #[error("sub-command '{command}' cannot hold sub-commands or groups")]
    NestingTooDeep { command: String },

    /// A component prefix was registered twice in the same namespace.
    #[error("{namespace} prefix '{prefix}' is already registered")]
    DuplicatePrefix {
        namespace: &'static str,
        prefix: String,
    },
}

/// Failure to rebuild typed arguments from raw option values.
///
/// The remote schema guarantees required options are present, so any of
/// these means the local and remote declarations have diverged.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum DecodeError {
    /// A required option is absent.
    #[error("required option '{name}' is missing")]
    MissingRequired { name: String },

    /// An option carries a value of the wrong kind.
    #[error("option '{name}' expected {expected}, got {found}")]
    TypeMismatch {
        name: String,
        expected: &'static str,
        found: &'static str,
    },
}

/// Failure while dispatching one inbound item.
#[derive(Debug, Clone, Error)]
pub enum DispatchError {
    /// The focused option is marked for autocomplete but has no provider.
    #[error("command '{command}' has no autocomplete provider for '{field}'")]
    MissingAutocompleteProvider { command: String, field: String },

    /// Raw options did not match the declared arguments.
    #[error("failed to decode arguments of '{command}': {source}")]
    Decode {
        command: String,
        #[source]
        source: DecodeError,
    },

    /// A threaded handler could not be queued.
    #[error(transparent)]
    Submit(#[from] SubmitError),

    /// The platform client failed to deliver a response.
    #[error(transparent)]
    Client(#[from] ClientError),
}

/// A job could not be handed to the worker pool.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum SubmitError {
    /// The queue is full and the pool is configured to reject.
    #[error("worker queue is full")]
    QueueFull,

    /// The pool is shutting down.
    #[error("worker pool is shut down")]
    ShutDown,
}

/// Result type for declarations.
pub type DeclarationResult<T> = Result<T, DeclarationError>;

/// Result type for argument decoding.
pub type DecodeResult<T> = Result<T, DecodeError>;

/// Result type for dispatch.
pub type DispatchResult<T> = Result<T, DispatchError>;
