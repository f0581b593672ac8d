//! Built-in capacity function linked into the CLI.
//!
//! The engine treats the capacity function as an external collaborator;
//! this is the one the binary ships with.

/// Per-vertex capacity under a given capacity method.
///
/// Method 0 gives every vertex capacity 1 (plain maximum-weight matching).
/// Every other method gives vertices 0 and 1 capacity 2 and the rest 1.
#[must_use]
pub fn bvalue(method: u32, node: u64) -> u32 {
    match method {
        0 => 1,
        _ => match node {
            0 | 1 => 2,
            _ => 1,
        },
    }
}
