// Domain layer: models, lookup tables and ports. No I/O here.

pub mod model;
pub mod ports;
pub mod taxonomy;
