//! Provisioning domain - local accounts for team members

mod entity;
mod provisioner;

pub use entity::LocalAccount;
pub use provisioner::AccountProvisioner;

#[cfg(test)]
pub use provisioner::MockAccountProvisioner;
