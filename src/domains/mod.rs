pub mod coin;
pub mod events;
pub mod gossip;
pub mod muddy;
pub mod tiger;

use crate::bisim::Storages;
use crate::search::Task;

/// build a reference task by domain name, for the CLI driver
pub fn build(domain: &str) -> Option<(Task, Storages)> {
    match domain {
        "coin" => Some(coin::build()),
        "gossip" => Some(gossip::build()),
        "muddy" => Some(muddy::build()),
        "tiger" => Some(tiger::build()),
        _ => None,
    }
}

/// the domains the CLI can name
pub const DOMAINS: [&str; 4] = ["coin", "gossip", "muddy", "tiger"];
