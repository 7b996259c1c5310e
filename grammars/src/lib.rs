// nacre. A grammar-driven parsing engine
// Copyright (c) 2026 The nacre contributors
//
// Licensed under the Apache License, Version 2.0
// <LICENSE-APACHE or http://www.apache.org/licenses/LICENSE-2.0> or the MIT
// license <LICENSE-MIT or http://opensource.org/licenses/MIT>, at your
// option. All files in the project carrying such notice may not be copied,
// modified, or distributed except according to those terms.

//! # nacre grammars
//!
//! Contains a series of ready-made grammars.

#![doc(html_root_url = "https://docs.rs/nacre_grammars")]
#![warn(missing_docs, rust_2018_idioms)]

pub mod json;
pub mod words;
