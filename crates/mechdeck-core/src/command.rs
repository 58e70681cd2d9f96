//! Command abstractions.

use uuid::Uuid;

/// Trait that all commands implement.
pub trait Command: Send + Sync + std::fmt::Debug {
    /// Stable command name, used as a tracing field.
    fn command_type(&self) -> &'static str;

    /// Correlation ID threading the command through the effects it produces.
    fn correlation_id(&self) -> Uuid;

    /// The player issuing the command.
    fn user_id(&self) -> Uuid;
}
