
#[allow(unused_imports)]
pub use fixtures::*;
