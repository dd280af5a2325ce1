pub mod charts;

pub use charts::{fonts_available, render, ChartKind};
