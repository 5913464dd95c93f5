// Hostkeep - Disclosure Gate Module

mod disclosure;

pub use disclosure::{Disclosure, DisclosureGate};
