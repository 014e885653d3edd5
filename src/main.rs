// This binary crate is intentionally minimal.
// All training logic lives in the library (src/lib.rs and its modules).
// Run demos with:
//   cargo run --example xor
//   cargo run --example conv_demo
fn main() {
    println!("magnetite-nn: a from-scratch backpropagation trainer in Rust.");
    println!("Run `cargo run --example xor` or `cargo run --example conv_demo`.");
}
