// Application boundary: the ports the pipeline core depends on.

pub mod ports;
