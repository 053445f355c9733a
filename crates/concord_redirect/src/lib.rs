//! CONCORD Stream Redirection
//!
//! Sends each rank's stdout and stderr to its own `<rank>.out` file so that
//! output from many processes does not interleave on a shared console.

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod error;
pub mod redirect;

pub use error::RedirectError;
pub use redirect::{
    rank_file_path, redirect_standard_streams_into, redirect_standard_streams_to_rank_file,
};
