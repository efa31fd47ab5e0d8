/*!

Generic structures that do not depend on anything specific to the PDR engine.

*/

pub mod statistics;

pub use statistics::{Statistic, Statistics};
