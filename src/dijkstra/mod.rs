// (c) Copyright 2025 Mikołaj Kuranowski
// SPDX-License-Identifier: MIT

mod result;
mod safest;

pub use result::{safety_score, PathResult};
pub use safest::find_safest_path;
