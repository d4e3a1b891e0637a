#![forbid(unsafe_code)]

mod report;

pub use report::{init_tracing, print_summary, render_top_down, TopDownConfig};
