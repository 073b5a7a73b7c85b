//! Condition, update and projection expressions.
//!
//! Builders accumulate [`token::OperatorToken`]s produced by the [`operator`] functions;
//! an [`compiler::ExpressionCompiler`] renders them into wire expressions, substituting
//! reserved names and literal values with placeholders.

/// Token renderer and placeholder allocation.
pub mod compiler;

/// Condition builder with sticky `AND`/`OR` composition.
pub mod condition;

/// Token sequences for single predicates and mutations.
pub mod operator;

/// Projection builder.
pub mod projection;

/// Words that must be escaped in expressions.
pub mod reserved;

/// Abstract expression tokens.
pub mod token;

/// Update builder.
pub mod update;

mod path;
