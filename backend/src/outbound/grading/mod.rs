//! Grading service outbound adapters.
//!
//! This module provides a thin HTTP implementation of the `BagGrader` port.

mod dto;
mod http_grader;

pub use http_grader::HttpBagGrader;
