//! Configuration module

pub mod benchmark_config;
pub mod cli;

pub use benchmark_config::{requests_per_worker, BenchmarkConfig};
pub use cli::{
    AddArgs, BindArgs, CliArgs, Command, CommonArgs, DeleteArgs, IdRangeArgs, ModifyArgs,
    OutputFormat, SearchArgs, SearchScope, SetupBaseArgs, SetupCommand, SetupPersonArgs, TestArgs,
};
