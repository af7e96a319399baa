mod access_gate;

pub use access_gate::{AccessGateFactory, AccessGateService};
