pub mod diagnostics;
pub mod host;
pub mod limiter;
pub mod render_loop;
pub mod scheduler;
pub mod session;
pub mod sizing;
