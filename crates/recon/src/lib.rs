//! `jeongsan-recon`: order-to-deposit reconciliation engine.
//!
//! Pure engine crate: receives pre-loaded tables, returns classified rows and
//! report sheets. No CLI or IO dependencies.

pub mod aggregate;
pub mod classify;
pub mod config;
pub mod engine;
pub mod error;
pub mod evidence;
pub mod matcher;
pub mod model;
pub mod normalize;
pub mod report;

pub use config::{EmptyKeyPolicy, ReconConfig};
pub use engine::{reconcile, run, ReconInput};
pub use error::ReconError;
pub use model::{
    CoercionWarning, MatchKind, MatchRow, ReconResult, ReconSummary, Report, SheetKind, Source,
    StyleIntent, Table,
};
