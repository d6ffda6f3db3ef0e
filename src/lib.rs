//! # chunkq
//!
//! Run a text corpus that is too large for one model request through a
//! chat-completion endpoint, chunk by chunk, and collect the JSON the model
//! returns into one array.
//!
//! ## Architecture
//!
//! ```text
//! ┌──────────┐   ┌─────────┐   ┌──────────────────────┐   ┌────────────┐   ┌─────────────┐
//! │  Source  │──▶│ Chunker │──▶│ prompt → completion  │──▶│ Aggregator │──▶│    Sink     │
//! │  (text)  │   │         │   │ → normalize, per     │   │            │   │ file/stdout │
//! └──────────┘   └─────────┘   │ chunk, in order      │   └────────────┘   └─────────────┘
//!                              └──────────────────────┘
//! ```
//!
//! Chunks are queried one at a time. A reply that is not JSON contributes
//! nothing and the run goes on; a failed request ends the run without
//! writing any output.
//!
//! ## Quick Start
//!
//! ```bash
//! chunkq split                 # write chunk files only
//! chunkq run                   # query every chunk, deliver the JSON array
//! chunkq run --resume          # query from existing chunk files
//! chunkq ask                   # single request with the whole source
//! ```
//!
//! ## Modules
//!
//! | Module | Purpose |
//! |--------|---------|
//! | [`config`] | TOML configuration parsing |
//! | [`models`] | Core data types |
//! | [`chunk`] | Fixed-width text chunking |
//! | [`chunk_store`] | Chunk files on disk |
//! | [`prompt`] | Prompt assembly |
//! | [`completion`] | Chat-completion client |
//! | [`normalize`] | JSON recovery from replies |
//! | [`aggregate`] | Ordered aggregation |
//! | [`sink`] | Result delivery |
//! | [`pipeline`] | Chunked and single-shot flows |

pub mod aggregate;
pub mod chunk;
pub mod chunk_store;
pub mod completion;
pub mod config;
pub mod models;
pub mod normalize;
pub mod pipeline;
pub mod prompt;
pub mod sink;
