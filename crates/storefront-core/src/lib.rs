// Library root: the page workflow and everything it talks to. Front-ends
// supply a `HostBridge` and a `View`; integration tests use the same API.

pub mod api;
pub mod config;
pub mod context;
pub mod executor;
pub mod host;
pub mod listing;
pub mod page;
pub mod theme;
pub mod view;
pub mod workflow;

#[cfg(test)]
pub(crate) mod test_support;
