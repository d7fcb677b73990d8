//! Usage classifier boundary.
//!
//! The classifier sits strictly downstream of replay. It consumes prompt
//! payloads, asks a [`UsageOracle`] whether the object was in use, and
//! records the answer. Oracle failures are retried under a [`RetryBudget`];
//! an exhausted budget yields [`ClassifierOutcome::Unresolved`] and never
//! touches the scene log.
//!
//! # Example
//!
//! ```rust
//! use scenegraph_usage::classifier::{
//!     classify, ClassifierRequest, OracleEnv, OracleError, RetryBudget, UsageOracle,
//! };
//!
//! struct AlwaysUsed;
//!
//! impl UsageOracle for AlwaysUsed {
//!     fn complete(&self, _system: &str, _user: &str) -> Result<String, OracleError> {
//!         Ok(r#"{"is_used": true, "explanation": "in hand"}"#.to_string())
//!     }
//! }
//!
//! let env = OracleEnv::new(AlwaysUsed);
//! let request = ClassifierRequest {
//!     system_prompt: "system".to_string(),
//!     user_prompt: "user".to_string(),
//! };
//! let outcome = tokio::runtime::Runtime::new()
//!     .unwrap()
//!     .block_on(classify(&env, &request, &RetryBudget::default()));
//! assert!(outcome.verdict().unwrap().is_used);
//! ```

mod budget;
mod examples;
mod label;
mod oracle;
mod response;
mod run;

pub use budget::{AttemptContext, BudgetViolation, RetryBudget, DEFAULT_NUM_TRIES};
pub use examples::{ExampleBank, FewShotExample};
pub use label::{processed_keys, UsageLabel};
pub use oracle::{OracleEnv, OracleError, UsageOracle};
pub use response::{parse_response, ResponseError, UsageVerdict};
pub use run::{
    attempt, classify, label_payload, label_payloads, AttemptError, ClassifierOutcome,
    ClassifierRequest,
};
