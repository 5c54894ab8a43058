//! The error type shared by every part of the framework.

use crate::props::PropKind;
use thiserror::Error;

/// Convenience alias used throughout the crate.
pub type Result<T> = std::result::Result<T, Error>;

/// Everything that can go wrong while defining, mounting or rendering an
/// element. None of these are recovered from locally: they surface to
/// whoever triggered the operation.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum Error {
    /// A markup template produced no usable node.
    #[error("failed to convert template to an element: {0:?}")]
    TemplateConversion(String),

    /// An attribute could not be coerced into its declared prop kind.
    #[error("prop `{name}` expects a {expected} but got {value:?}")]
    PropTypeMismatch {
        /// Name of the prop.
        name: String,
        /// Kind declared in the schema.
        expected: PropKind,
        /// Raw attribute value that failed to parse.
        value: String,
    },

    /// A prop declared as required has no attribute on the host node.
    #[error("required prop `{0}` is missing")]
    MissingProp(String),

    /// A listener selector matched nothing in the rendered subtree.
    #[error("no element with selector `{0}` was found")]
    ListenerTargetMissing(String),

    /// A state update was not a key-value record.
    #[error("state updates must be objects, got `{0}`")]
    InvalidState(String),

    /// A selector could not be parsed.
    #[error("invalid selector `{selector}`: {reason}")]
    Selector {
        /// The offending selector text.
        selector: String,
        /// What the parser choked on.
        reason: String,
    },

    /// The name is not a valid custom element name.
    #[error("`{0}` is not a valid custom element name")]
    InvalidTagName(String),

    /// The tag already has an implementation.
    #[error("`{0}` has already been registered")]
    AlreadyRegistered(String),

    /// No implementation has been registered for the tag.
    #[error("no element has been registered for `{0}`")]
    UnknownTag(String),

    /// The node already has a live instance attached.
    #[error("node {0} is already connected")]
    AlreadyConnected(String),

    /// The instance was removed from the document.
    #[error("element `{0}` has been disconnected")]
    Disconnected(String),

    /// The host has no node with that handle.
    #[error("unknown node {0}")]
    UnknownNode(String),

    /// An instance was re-entered while it was already being updated.
    #[error("element `{0}` is already being updated")]
    Reentrant(String),

    /// The configuration could not be read.
    #[error("invalid configuration: {0}")]
    Config(String),

    /// Error bubbled up from the host environment.
    #[error("host error: {0}")]
    Host(String),
}
