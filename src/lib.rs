//! Workspace tooling package. It exists so `rusty-hook` installs the
//! pre-commit hooks configured in the root `Cargo.toml`; the routing code
//! lives in `crates/shelterroute-lib` and `crates/shelterroute-cli`.
