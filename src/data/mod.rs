//! Data files: measurement tables and plot definitions
//!
//! ```text
//! ^^voltage \ Measured voltage
//! cols=t;U
//! &
//! 0.0 1.2
//! 0.5 1.9
//!
//! $$vplot \ Voltage over time
//! axes=t, s;U, V
//! curve=measured
//! .x=col(voltage, 0)
//! .y=col(voltage, 1)
//! $$
//! ```

mod error;
mod model;
mod parser;
mod registry;

pub use error::DataError;
pub use model::{AxisRange, Cell, Curve, CurveStyle, Plot, Table};
pub use parser::{parse_data_file, DataDefinition};
pub use registry::{DataItem, DataRegistry};
