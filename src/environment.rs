//! The binding environment. Resolutions have a single flat scope: every
//! identifier is declared in a Whereas clause and visible everywhere after.

use std::collections::HashMap;

use crate::runtime::Value;

pub type Environment = HashMap<String, Value>;
