//! Plain data types shared by the registry, the pipeline engine and the displays.

pub mod order;
pub mod progress;
pub mod station;
pub mod venue;

pub use order::*;
pub use progress::*;
pub use station::*;
pub use venue::*;
