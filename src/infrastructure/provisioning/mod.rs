//! Provisioning infrastructure - local Linux accounts

mod linux;

pub use linux::{useradd_args, LinuxProvisioner};
