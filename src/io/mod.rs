pub mod sink;

pub use sink::{CountingSink, MemorySink, Sink, WriterSink};
