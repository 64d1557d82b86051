//! CLTV & ROI analytics engine — CSV ingest, metric computation, reallocation
//! simulation, and the in-memory dataset registry.

pub mod ingest;
pub mod kpi;
pub mod simulator;
pub mod store;

pub use simulator::{parse_allocation, simulate, Allocation, SimulationOutcome, DEFAULT_ALLOCATION};
pub use store::{DatasetSource, DatasetStore, LoadedDataset};
