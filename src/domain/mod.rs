// Domain layer: snapshot and result models, scenario selection, and the ports the rest of the crate plugs into.

pub mod model;
pub mod ports;
pub mod scenario;
