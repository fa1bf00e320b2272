//! Benchmark-only crate; see `benches/rawdev_bench.rs`.
