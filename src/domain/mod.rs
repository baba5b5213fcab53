// Domain layer: records, datasets, aggregate tables and the ports the adapters implement.

pub mod model;
pub mod ports;
