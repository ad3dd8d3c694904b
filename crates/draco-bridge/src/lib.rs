//! File-based encode/decode front-end over the Draco codec.
//!
//! Two operations, [`encode`] and [`decode`], turn a mesh or point cloud file
//! into a Draco file and back. All file access is routed through the shim in
//! [`file_helper`], which the first call registers with the codec's file
//! factories.
//!
//! ```no_run
//! use draco_bridge::{decode, encode, EncodeOptions};
//!
//! let options = EncodeOptions { compression_level: 10, ..Default::default() };
//! assert!(encode("bunny.ply", "bunny.drc", &options));
//! assert!(decode("bunny.drc", "bunny.obj"));
//! ```

pub mod error;
pub mod file_helper;
pub mod module;
pub mod options;
pub mod utilities;

pub use error::{BridgeError, ErrorKind};
pub use file_helper::{register_file_io, BridgeFileReader, BridgeFileWriter};
pub use module::BridgeModule;
pub use options::EncodeOptions;
pub use utilities::{
    decode, decode_file, encode, encode_file, Advisory, DecodeReport, EncodeReport, OutputFormat,
};
