//! Provisioning scenarios driven against the in-memory RDS control plane.

mod bdd_steps;
mod scenarios;
mod test_helpers;
