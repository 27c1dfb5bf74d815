//! Inventory provider implementations

mod ec2;

pub use ec2::{parse_describe_instances, AwsCliInventory};
