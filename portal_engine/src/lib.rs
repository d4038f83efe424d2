//! Core engine behind the portal UI: the transaction lifecycle orchestrator
//! shared by the bridge, wrapper, staking, governance and token deployer
//! flows, plus the read services those flows depend on (JSON-RPC client,
//! deduplicating token registry, preference store, recent deployments).
//!
//! Presentation is out of scope: everything here speaks plain data and
//! human readable status strings, rendering happens elsewhere.

pub mod chain_config;
pub mod error;
pub mod feedback;
pub mod flows;
pub mod orchestrator;
pub mod price;
pub mod recent_tokens;
pub mod rpc_client;
pub mod settings;
pub mod token_registry;
pub mod types;
pub mod wallet;

pub use error::{ErrorKind, FlowError};
pub use feedback::{Feedback, FeedbackChannel, FeedbackStatus};
pub use flows::{DataScope, TransactionIntent};
pub use orchestrator::{FlowConfig, FlowOutcome, FlowStage, Orchestrator};
pub use recent_tokens::{DeployedToken, RecentTokensStore, MAX_RECENT_TOKENS};
pub use rpc_client::RpcClient;
pub use settings::{GasPriceOption, SettingsStore};
pub use token_registry::{TokenRecord, TokenRegistry};
pub use wallet::{ContractCall, WalletProvider};
