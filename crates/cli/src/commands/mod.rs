pub mod decode;
pub mod metrics;
pub mod run;
