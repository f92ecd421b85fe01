//! Background jobs - account reconciliation and sshd wiring

mod scheduler;
mod ssh_integration;
mod sync_users;

pub use scheduler::spawn_periodic_sync;
pub use ssh_integration::{ensure_directive, wrapper_script, SshIntegration};
pub use sync_users::{SyncReport, UserSync};
