//! Error taxonomy and message normalization for the transaction flows.
//!
//! Every error caught at a flow boundary goes through the same path: classify
//! it against one ordered substring table, then surface either a canonical
//! message for known kinds or the normalized raw text.

use thiserror::Error;

const RPC_INTERNAL_PREFIX: &str = "rpc error: code = Internal desc = ";
const MAX_MESSAGE_LEN: usize = 80;

pub const DEFAULT_FAILURE_MESSAGE: &str = "Transaction failed. Please try again.";
pub const DENOM_ALREADY_REGISTERED_MESSAGE: &str =
    "Denom metadata already registered, choose a unique base denomination";
pub const CIRCUIT_BREAKER_MESSAGE: &str =
    "Network is currently overloaded. Please try again in a few moments.";
pub const USER_REJECTED_MESSAGE: &str = "User denied transaction signature.";
pub const REVERTED_MESSAGE: &str = "Transaction reverted. Please try again.";
pub const INSUFFICIENT_FUNDS_MESSAGE: &str = "Insufficient funds for transaction.";

/// How a flow attempt ended when it did not complete. The display strings are
/// exactly what the feedback channel surfaces.
#[derive(Debug, Error)]
pub enum FlowError {
    #[error("a transaction is already in progress")]
    Busy,
    #[error("No wallet connected")]
    NoWallet,
    #[error("{0}")]
    Validation(String),
    #[error("{0}")]
    Simulation(String),
    #[error("User rejected the request")]
    UserRejected,
    #[error("{0}")]
    Submission(String),
    #[error("{0}")]
    Reverted(String),
}

/// Classification buckets for raw provider/node error text.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    UserRejected,
    DenomAlreadyRegistered,
    CircuitBreaker,
    /// Contract-side input validation, surfaced with the extracted reason.
    ContractValidation,
    Reverted,
    InsufficientFunds,
    Other,
}

/// Ordered substring table, evaluated top to bottom. First match wins, so the
/// specific entries must stay above the generic "reverted" catch-all.
const CLASSIFIERS: &[(&str, ErrorKind)] = &[
    ("User rejected", ErrorKind::UserRejected),
    ("user rejected", ErrorKind::UserRejected),
    ("User denied", ErrorKind::UserRejected),
    ("user denied", ErrorKind::UserRejected),
    ("ACTION_REJECTED", ErrorKind::UserRejected),
    ("denom metadata already registered", ErrorKind::DenomAlreadyRegistered),
    ("circuit breaker", ErrorKind::CircuitBreaker),
    ("cannot be empty", ErrorKind::ContractValidation),
    ("cannot contain spaces", ErrorKind::ContractValidation),
    ("length exceeds", ErrorKind::ContractValidation),
    ("total supply must be greater than zero", ErrorKind::ContractValidation),
    ("decimals cannot exceed", ErrorKind::ContractValidation),
    ("insufficient funds", ErrorKind::InsufficientFunds),
    ("reverted", ErrorKind::Reverted),
];

pub fn classify(message: &str) -> ErrorKind {
    for (needle, kind) in CLASSIFIERS {
        if message.contains(needle) {
            return *kind;
        }
    }
    ErrorKind::Other
}

/// Produces the user-facing message for a caught error: canonical text for
/// known kinds, normalized raw text otherwise.
pub fn surface_message(kind: ErrorKind, raw: &str) -> String {
    match kind {
        ErrorKind::UserRejected => USER_REJECTED_MESSAGE.to_string(),
        ErrorKind::DenomAlreadyRegistered => DENOM_ALREADY_REGISTERED_MESSAGE.to_string(),
        ErrorKind::CircuitBreaker => CIRCUIT_BREAKER_MESSAGE.to_string(),
        ErrorKind::ContractValidation => extract_revert_reason(raw),
        ErrorKind::Reverted => REVERTED_MESSAGE.to_string(),
        ErrorKind::InsufficientFunds => INSUFFICIENT_FUNDS_MESSAGE.to_string(),
        ErrorKind::Other => normalize_message(raw),
    }
}

/// Classify and surface in one step.
pub fn surface_error(raw: &str) -> String {
    surface_message(classify(raw), raw)
}

/// Strips the node's RPC prefix, truncates to a bounded length, sentence-cases
/// and terminates with a period.
pub fn normalize_message(raw: &str) -> String {
    let mut message = raw.replace(RPC_INTERNAL_PREFIX, "");
    if message.is_empty() {
        return DEFAULT_FAILURE_MESSAGE.to_string();
    }

    if message.chars().count() > MAX_MESSAGE_LEN {
        message = message.chars().take(MAX_MESSAGE_LEN - 3).collect::<String>() + "...";
    }

    let mut chars = message.chars();
    if let Some(first) = chars.next() {
        message = first.to_uppercase().collect::<String>() + chars.as_str();
    }
    if !message.ends_with('.') {
        message.push('.');
    }
    message
}

/// Pulls the human readable reason out of the node's wrapped revert formats:
/// `... desc = <reason>: ...` first, then `execution reverted: <reason>`,
/// otherwise the raw text untouched.
fn extract_revert_reason(raw: &str) -> String {
    if let Some(start) = raw.find("desc = ") {
        let tail = &raw[start + "desc = ".len()..];
        if let Some(end) = tail.find(':') {
            return tail[..end].to_string();
        }
    }
    if let Some(start) = raw.find("execution reverted: ") {
        return raw[start + "execution reverted: ".len()..].to_string();
    }
    raw.to_string()
}
