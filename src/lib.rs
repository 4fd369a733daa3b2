pub mod cli;
pub mod ctx;
pub mod filter;
pub mod io;
pub mod math;
pub mod pipeline;
pub mod scores;
pub mod store;

pub mod schema {
    pub mod v1;
}
